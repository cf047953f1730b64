//! key-bridge library crate.
//!
//! Tracks a fixed set of keys on the host keyboard and serves their state to a
//! remote device over a serial link, one 8-byte frame per request.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod keys;
pub mod protocol;
pub mod serial;
pub mod shutdown;
pub mod tracker;
