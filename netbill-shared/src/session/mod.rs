//! # Session
//!
//! The single source of truth for who is signed in. [`SessionStore`] owns the
//! current [`Session`], exposes the only three operations allowed to change it
//! (`set_auth`, `logout`, `update_user`), and writes every change through to a
//! [`SessionStorage`] backend so the session survives restarts.

pub mod state;
pub mod storage;
pub mod store;

pub use state::{SESSION_FORMAT_VERSION, Session};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, SessionStorage, StorageError};
pub use store::{SessionStore, SessionUnavailable, StoreOptions, SubscriptionId};
