//! Durable, expiring session snapshots for resume-across-restarts.

pub mod store;

pub use store::{FileSessionStore, MemorySessionStore, SavedSession, SessionStore};
