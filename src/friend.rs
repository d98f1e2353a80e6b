//! Typed view of one stored record

use crate::contract::{COLUMN_ID, COLUMN_NAME, COLUMN_NUM_FRIENDS};
use crate::cursor::{Cursor, CursorRow};
use crate::values::ContentValues;
use serde::{Deserialize, Serialize};

/// A row of the friends table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    /// Assigned by the store on insert, never reused
    pub id: i64,
    pub name: String,
    pub num_friends: i64,
}

impl Friend {
    /// Field set for inserting a new friend
    pub fn values(name: impl Into<String>, num_friends: i64) -> ContentValues {
        ContentValues::new()
            .with(COLUMN_NAME, name.into())
            .with(COLUMN_NUM_FRIENDS, num_friends)
    }

    /// Read a friend from a cursor row projected with all three columns
    pub fn from_row(row: &CursorRow<'_>) -> Option<Self> {
        Some(Self {
            id: row.get_i64(COLUMN_ID)?,
            name: row.get_str(COLUMN_NAME)?.to_string(),
            num_friends: row.get_i64(COLUMN_NUM_FRIENDS)?,
        })
    }

    /// Every complete friend in a cursor; rows missing a column are skipped
    pub fn all_from(cursor: &Cursor) -> Vec<Self> {
        cursor.rows().filter_map(|row| Self::from_row(&row)).collect()
    }
}
