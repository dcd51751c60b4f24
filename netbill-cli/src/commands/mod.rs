pub mod access;
pub mod completion;
pub mod config;
pub mod resource;
pub mod session;
