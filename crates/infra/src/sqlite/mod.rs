//! SQLite-backed record store adapter.

pub mod directory;

pub use directory::SqliteDirectory;
