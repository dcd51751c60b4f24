//! # NetBill shared client core
//!
//! The authentication/authorization boundary used by every NetBill front end:
//!
//! - [`session`] holds the signed-in user and bearer token and persists them.
//! - [`api`] wraps all calls to the billing server, attaching the token and
//!   reacting to session invalidation.
//! - [`access`] decides whether a view may be rendered for the current session.
//! - [`config`] carries the client settings shared by the web and CLI clients.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod api;
pub mod config;
pub mod models;
pub mod session;
