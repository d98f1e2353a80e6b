//! Database schema definitions

/// Bump when the table layout changes; older files are rebuilt on open
pub const DATABASE_VERSION: i32 = 1;

/// File name used when no database path is configured
pub const DATABASE_NAME: &str = "friends.db";

/// SQL to create the friends table
pub const CREATE_FRIENDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS friends (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    num_friends INTEGER NOT NULL
)
"#;

/// SQL to drop the friends table during a destructive upgrade
pub const DROP_FRIENDS_TABLE: &str = "DROP TABLE IF EXISTS friends";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_FRIENDS_TABLE]
}
