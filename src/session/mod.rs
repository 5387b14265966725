//! Operator session
//!
//! A persisted flag/token pair gates access to the dashboard. The gate is an
//! equality check against fixed sentinel values, not a cryptographic
//! verification: anyone who can write the session store can pass it.

pub mod gate;
pub mod store;

pub use gate::{AdminSession, SessionGate};
pub use store::{FileSessionStore, MemorySessionStore};

use crate::Result;

pub const AUTH_KEY: &str = "adminAuth";
pub const TOKEN_KEY: &str = "adminToken";
pub const AUTH_SENTINEL: &str = "authenticated";
pub const TOKEN_SENTINEL: &str = "admin-auth-token";

/// Persistence for the session's string values.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn clear(&self, key: &str) -> Result<()>;
}
