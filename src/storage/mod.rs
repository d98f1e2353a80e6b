//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - friends(_id, name, num_friends)

pub mod schema;
pub mod selection;
pub mod sqlite;

pub use selection::Selection;
pub use sqlite::{FriendsDatabase, InsertOutcome};
