//! Infrastructure layer: adapters for the identity provider and record
//! store boundaries.
//!
//! The in-memory pair backs tests, the demo binary and local development;
//! the SQLite directory is the embedded persistent variant.

pub mod memory;
pub mod sqlite;


pub use memory::{InMemoryDirectory, InMemoryIdentityProvider};
pub use sqlite::SqliteDirectory;
