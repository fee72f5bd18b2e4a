//! Identity attribute storage for Dualgate
//!
//! Supports a SQLite backend and an in-memory store.

pub mod memory;
pub mod repository;
pub mod traits;

pub use memory::MemoryIdentityStore;
pub use repository::SqlIdentityStore;
pub use traits::*;
