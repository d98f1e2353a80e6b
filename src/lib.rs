//! # Friendstore - URI-addressed record store
//!
//! A small SQLite-backed store for a `friends` table (name, friend count),
//! reached through structured content URIs.
//!
//! Friendstore provides:
//! - Content URIs with a collection address and per-record item addresses
//! - An immutable URI matcher and the friends contract (columns, type descriptors, field rules)
//! - A validated CRUD facade with single-transaction bulk insert
//! - Change notification to observers keyed by URI
//! - A CLI and an HTTP server that runs the synchronous core on blocking workers

pub mod uri;
pub mod matcher;
pub mod values;
pub mod cursor;
pub mod contract;
pub mod friend;
pub mod storage;
pub mod notify;
pub mod provider;
pub mod server;
pub mod ui;
pub mod config;

// Re-exports for convenient access
pub use uri::ContentUri;
pub use values::{ContentValues, Value};
pub use cursor::Cursor;
pub use contract::{FriendsContract, UriMatch};
pub use friend::Friend;
pub use storage::{FriendsDatabase, Selection};
pub use notify::{ChangeEvent, ChangeNotifier, ChangeObserver};
pub use provider::FriendsProvider;

/// Result type alias for Friendstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Friendstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown uri: {0}")]
    UnsupportedUri(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
