//! Friends contract - table shape, address scheme and field rules
//!
//! Everything a caller needs to talk to the store lives here: the
//! authority and table path, column names, the MIME-like type descriptors,
//! and the validation applied to field sets before they reach SQLite.

use crate::matcher::UriMatcher;
use crate::uri::ContentUri;
use crate::values::{ContentValues, Value};
use crate::{Error, Result};

/// Scheme of every address the store hands out
pub const CONTENT_SCHEME: &str = "content";

/// Authority used when none is configured
pub const DEFAULT_AUTHORITY: &str = "com.example.android.exampleprovider.app";

/// Table name, also the first path segment of every address
pub const TABLE_NAME: &str = "friends";

/// Primary key column
pub const COLUMN_ID: &str = "_id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_NUM_FRIENDS: &str = "num_friends";

/// Every column, in table order
pub const ALL_COLUMNS: &[&str] = &[COLUMN_ID, COLUMN_NAME, COLUMN_NUM_FRIENDS];

const DIR_TYPE_PREFIX: &str = "vnd.cursor.dir";
const ITEM_TYPE_PREFIX: &str = "vnd.cursor.item";

/// Route codes registered in the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Friends,
    FriendWithId,
}

/// Classification of an address against the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// All records
    Collection,
    /// One record by id
    Item(i64),
    Unrecognized,
}

/// Outcome of checking a field set for insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertCheck {
    Complete,
    /// A required column is absent, null or blank
    Missing(&'static str),
}

/// Address registry for the friends table.
///
/// Holds the immutable matcher for one authority. Cheap to clone; build it
/// once and hand it to the provider.
#[derive(Debug, Clone)]
pub struct FriendsContract {
    authority: String,
    matcher: UriMatcher<Route>,
}

impl FriendsContract {
    pub fn new(authority: impl Into<String>) -> Self {
        let authority = authority.into();
        let matcher = UriMatcher::new()
            .with_route(&authority, TABLE_NAME, Route::Friends)
            .with_route(&authority, &format!("{}/#", TABLE_NAME), Route::FriendWithId);
        Self { authority, matcher }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Base address of the store, e.g. `content://<authority>`
    pub fn base_uri(&self) -> ContentUri {
        ContentUri::new(CONTENT_SCHEME, self.authority.clone())
    }

    /// Address of the whole table
    pub fn collection_uri(&self) -> ContentUri {
        self.base_uri().with_appended_path(TABLE_NAME)
    }

    /// Address of one record
    pub fn item_uri(&self, id: i64) -> ContentUri {
        self.collection_uri().with_appended_id(id)
    }

    /// Classify an address as collection, item or unrecognized
    pub fn classify(&self, uri: &ContentUri) -> UriMatch {
        if uri.scheme != CONTENT_SCHEME {
            return UriMatch::Unrecognized;
        }
        match self.matcher.match_uri(uri) {
            Some(Route::Friends) => UriMatch::Collection,
            Some(Route::FriendWithId) => match uri.parse_id() {
                Some(id) => UriMatch::Item(id),
                // all-digit segment too large for i64
                None => UriMatch::Unrecognized,
            },
            None => UriMatch::Unrecognized,
        }
    }

    /// Type descriptor for responses covering many records
    pub fn content_dir_type(&self) -> String {
        format!("{}/{}/{}", DIR_TYPE_PREFIX, self.authority, TABLE_NAME)
    }

    /// Type descriptor for responses covering a single record
    pub fn content_item_type(&self) -> String {
        format!("{}/{}/{}", ITEM_TYPE_PREFIX, self.authority, TABLE_NAME)
    }

    /// Type descriptor for an address
    pub fn type_of(&self, uri: &ContentUri) -> Result<String> {
        match self.classify(uri) {
            UriMatch::Collection => Ok(self.content_dir_type()),
            UriMatch::Item(_) => Ok(self.content_item_type()),
            UriMatch::Unrecognized => Err(unsupported(uri)),
        }
    }
}

impl Default for FriendsContract {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHORITY)
    }
}

/// Error for an address the operation cannot serve
pub fn unsupported(uri: &ContentUri) -> Error {
    Error::UnsupportedUri(uri.to_uri_string())
}

/// True for columns callers may project or filter on
pub fn is_known_column(column: &str) -> bool {
    ALL_COLUMNS.contains(&column)
}

/// Check a projection against the known columns
pub fn check_projection(projection: &[&str]) -> Result<()> {
    if projection.is_empty() {
        return Err(Error::InvalidArgument("empty projection".to_string()));
    }
    match projection.iter().find(|c| !is_known_column(c)) {
        Some(unknown) => Err(Error::InvalidArgument(format!("unknown column: {}", unknown))),
        None => Ok(()),
    }
}

/// Check an ORDER BY clause: comma-separated known columns, each
/// optionally followed by `ASC` or `DESC`
pub fn check_sort_order(sort_order: &str) -> Result<()> {
    for term in sort_order.split(',') {
        let mut words = term.split_whitespace();
        let column = words
            .next()
            .ok_or_else(|| Error::InvalidArgument(format!("empty sort term in: {}", sort_order)))?;
        if !is_known_column(column) {
            return Err(Error::InvalidArgument(format!("unknown sort column: {}", column)));
        }
        if let Some(direction) = words.next() {
            if !direction.eq_ignore_ascii_case("asc") && !direction.eq_ignore_ascii_case("desc") {
                return Err(Error::InvalidArgument(format!("bad sort direction: {}", direction)));
            }
        }
        if let Some(extra) = words.next() {
            return Err(Error::InvalidArgument(format!("unexpected sort token: {}", extra)));
        }
    }
    Ok(())
}

/// Check a field set for insertion.
///
/// Hard errors (`Err`) are values that can never be stored: unknown
/// columns, an explicit `_id`, wrong types, a negative friend count.
/// Absent, null or blank required fields yield [`InsertCheck::Missing`].
pub fn check_insert(values: &ContentValues) -> Result<InsertCheck> {
    check_columns(values)?;

    let name_ok = match values.get(COLUMN_NAME) {
        None | Some(Value::Null) => false,
        Some(Value::Text(name)) => !name.trim().is_empty(),
        Some(other) => return Err(wrong_type(COLUMN_NAME, "text", other)),
    };

    let count_ok = match values.get(COLUMN_NUM_FRIENDS) {
        None | Some(Value::Null) => false,
        Some(value) => {
            check_friend_count(value)?;
            true
        }
    };

    if !name_ok {
        return Ok(InsertCheck::Missing(COLUMN_NAME));
    }
    if !count_ok {
        return Ok(InsertCheck::Missing(COLUMN_NUM_FRIENDS));
    }
    Ok(InsertCheck::Complete)
}

/// Check a field set for updating one record
pub fn check_update(values: &ContentValues) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidArgument("empty values".to_string()));
    }
    check_columns(values)?;

    if let Some(value) = values.get(COLUMN_NAME) {
        match value {
            Value::Text(name) if !name.trim().is_empty() => {}
            Value::Text(_) | Value::Null => {
                return Err(Error::InvalidArgument("name must not be empty".to_string()));
            }
            other => return Err(wrong_type(COLUMN_NAME, "text", other)),
        }
    }

    if let Some(value) = values.get(COLUMN_NUM_FRIENDS) {
        check_friend_count(value)?;
    }
    Ok(())
}

fn check_columns(values: &ContentValues) -> Result<()> {
    for key in values.keys() {
        if key == COLUMN_ID {
            return Err(Error::InvalidArgument(format!("{} is assigned by the store", COLUMN_ID)));
        }
        if !is_known_column(key) {
            return Err(Error::InvalidArgument(format!("unknown column: {}", key)));
        }
    }
    Ok(())
}

fn check_friend_count(value: &Value) -> Result<()> {
    match value {
        Value::Integer(n) if *n >= 0 => Ok(()),
        Value::Integer(n) => Err(Error::InvalidArgument(format!(
            "{} must not be negative, got {}",
            COLUMN_NUM_FRIENDS, n
        ))),
        other => Err(wrong_type(COLUMN_NUM_FRIENDS, "integer", other)),
    }
}

fn wrong_type(column: &str, expected: &str, got: &Value) -> Error {
    Error::InvalidArgument(format!(
        "{} must be {}, got {}",
        column,
        expected,
        got.type_name()
    ))
}
