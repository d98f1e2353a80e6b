//! SQLite storage implementation

use super::schema;
use super::selection::Selection;
use crate::contract::{self, ALL_COLUMNS, COLUMN_ID, TABLE_NAME};
use crate::cursor::Cursor;
use crate::values::{ContentValues, Value};
use crate::{Error, Result};
use rusqlite::{Connection, ErrorCode, params_from_iter};
use std::path::Path;

/// Row id of a successful insert, or `None` when a constraint rejected the row
pub type InsertOutcome = Option<i64>;

/// SQLite-backed storage for the friends table
pub struct FriendsDatabase {
    conn: Connection,
}

impl FriendsDatabase {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Create the schema, rebuilding it when the stored version differs
    fn initialize_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version != 0 && version != schema::DATABASE_VERSION {
            tracing::info!(
                from = version,
                to = schema::DATABASE_VERSION,
                "Schema version changed, rebuilding friends table"
            );
            self.conn.execute(schema::DROP_FRIENDS_TABLE, [])?;
        }

        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }

        if version != schema::DATABASE_VERSION {
            self.conn
                .pragma_update(None, "user_version", schema::DATABASE_VERSION)?;
            tracing::info!(version = schema::DATABASE_VERSION, "Initialized friends schema");
        }
        Ok(())
    }

    /// Stored schema version
    pub fn schema_version(&self) -> Result<i32> {
        let version = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    // ========== Row Operations ==========

    pub fn query(
        &self,
        projection: Option<&[&str]>,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        query_rows(&self.conn, projection, selection, sort_order)
    }

    pub fn insert(&self, values: &ContentValues) -> Result<InsertOutcome> {
        insert_row(&self.conn, values)
    }

    pub fn update(&self, values: &ContentValues, selection: &Selection) -> Result<usize> {
        update_rows(&self.conn, values, selection)
    }

    pub fn delete(&self, selection: &Selection) -> Result<usize> {
        delete_rows(&self.conn, selection)
    }

    /// Count all rows
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", TABLE_NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ========== Bulk Operations ==========

    /// Run `f` inside one transaction.
    ///
    /// Commits when `f` returns `Ok`; any error rolls everything back.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self.conn.transaction()?;
        let out = f(&*tx)?;
        tx.commit()?;
        Ok(out)
    }
}

/// Select rows from the friends table; `None` projection means every column
pub fn query_rows(
    conn: &Connection,
    projection: Option<&[&str]>,
    selection: &Selection,
    sort_order: Option<&str>,
) -> Result<Cursor> {
    let columns = match projection {
        Some(columns) => {
            contract::check_projection(columns)?;
            columns.join(", ")
        }
        None => ALL_COLUMNS.join(", "),
    };
    let order = match sort_order.filter(|s| !s.trim().is_empty()) {
        Some(order) => {
            contract::check_sort_order(order)?;
            order
        }
        None => COLUMN_ID,
    };

    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        columns,
        TABLE_NAME,
        selection.where_sql(),
        order
    );
    tracing::debug!(%sql, "query");

    let mut stmt = conn.prepare(&sql)?;
    let cursor = Cursor::collect(&mut stmt, params_from_iter(selection.args.iter()))?;
    Ok(cursor)
}

/// Insert one row, returning its id
pub fn insert_row(conn: &Connection, values: &ContentValues) -> Result<InsertOutcome> {
    let (columns, args) = split_values(values)?;
    let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", TABLE_NAME)
    } else {
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            TABLE_NAME,
            columns.join(", "),
            placeholders
        )
    };

    match conn.execute(&sql, params_from_iter(args)) {
        Ok(_) => Ok(Some(conn.last_insert_rowid())),
        Err(err) if is_constraint_violation(&err) => {
            tracing::warn!("Insert rejected by constraint: {}", err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Update matching rows; a constraint violation changes nothing and reports 0
pub fn update_rows(conn: &Connection, values: &ContentValues, selection: &Selection) -> Result<usize> {
    let (columns, mut args) = split_values(values)?;
    if columns.is_empty() {
        return Err(Error::InvalidArgument("empty values".to_string()));
    }
    let assignments: Vec<String> = columns.iter().map(|c| format!("{} = ?", c)).collect();
    let sql = format!(
        "UPDATE {} SET {}{}",
        TABLE_NAME,
        assignments.join(", "),
        selection.where_sql()
    );
    args.extend(selection.args.iter().cloned());

    match conn.execute(&sql, params_from_iter(args)) {
        Ok(n) => Ok(n),
        Err(err) if is_constraint_violation(&err) => {
            tracing::warn!("Update rejected by constraint: {}", err);
            Ok(0)
        }
        Err(err) => Err(err.into()),
    }
}

/// Delete matching rows
pub fn delete_rows(conn: &Connection, selection: &Selection) -> Result<usize> {
    let sql = format!("DELETE FROM {}{}", TABLE_NAME, selection.where_sql());
    let n = conn.execute(&sql, params_from_iter(selection.args.iter()))?;
    Ok(n)
}

/// Split a field set into column names and bind values.
///
/// Column names end up in SQL text, so only known columns pass.
fn split_values(values: &ContentValues) -> Result<(Vec<&str>, Vec<Value>)> {
    let mut columns = Vec::with_capacity(values.len());
    let mut args = Vec::with_capacity(values.len());
    for (column, value) in values.iter() {
        if !contract::is_known_column(column) {
            return Err(Error::InvalidArgument(format!("unknown column: {}", column)));
        }
        columns.push(column);
        args.push(value.clone());
    }
    Ok((columns, args))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{COLUMN_NAME, COLUMN_NUM_FRIENDS};
    use crate::friend::Friend;

    #[test]
    fn test_friend_crud() {
        let db = FriendsDatabase::open_in_memory().unwrap();

        let id = db.insert(&Friend::values("Dan", 555)).unwrap().unwrap();
        let cursor = db.query(None, &Selection::by_id(COLUMN_ID, id), None).unwrap();
        let friends = Friend::all_from(&cursor);
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].name, "Dan");
        assert_eq!(friends[0].num_friends, 555);

        let changed = db
            .update(
                &ContentValues::new().with(COLUMN_NUM_FRIENDS, 600),
                &Selection::by_id(COLUMN_ID, id),
            )
            .unwrap();
        assert_eq!(changed, 1);

        assert_eq!(db.delete(&Selection::by_id(COLUMN_ID, id)).unwrap(), 1);
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_unique_name_is_soft_failure() {
        let db = FriendsDatabase::open_in_memory().unwrap();
        assert!(db.insert(&Friend::values("Dan", 1)).unwrap().is_some());
        assert_eq!(db.insert(&Friend::values("Dan", 2)).unwrap(), None);

        let kat = db.insert(&Friend::values("Kat", 3)).unwrap().unwrap();
        let renamed = db
            .update(
                &ContentValues::new().with(COLUMN_NAME, "Dan"),
                &Selection::by_id(COLUMN_ID, kat),
            )
            .unwrap();
        assert_eq!(renamed, 0);
        assert_eq!(db.count().unwrap(), 2);
    }

    #[test]
    fn test_not_null_is_soft_failure() {
        let db = FriendsDatabase::open_in_memory().unwrap();
        let only_name = ContentValues::new().with(COLUMN_NAME, "Sarah");
        assert_eq!(db.insert(&only_name).unwrap(), None);
        assert_eq!(db.insert(&ContentValues::new()).unwrap(), None);
    }

    #[test]
    fn test_ids_not_reused() {
        let db = FriendsDatabase::open_in_memory().unwrap();
        let first = db.insert(&Friend::values("A", 1)).unwrap().unwrap();
        db.delete(&Selection::all()).unwrap();
        let second = db.insert(&Friend::values("B", 1)).unwrap().unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_projection_filter_and_sort() {
        let db = FriendsDatabase::open_in_memory().unwrap();
        db.insert(&Friend::values("Dan", 523)).unwrap();
        db.insert(&Friend::values("Katherine", 554)).unwrap();
        db.insert(&Friend::values("Zed", 1)).unwrap();

        let selection = Selection::new("num_friends > ?", vec![Value::Integer(100)]);
        let cursor = db
            .query(Some(&[COLUMN_NAME][..]), &selection, Some("name DESC"))
            .unwrap();
        assert_eq!(cursor.columns().to_vec(), vec![COLUMN_NAME.to_string()]);
        let names: Vec<_> = cursor.rows().filter_map(|r| r.get_str(COLUMN_NAME)).collect();
        assert_eq!(names, vec!["Katherine", "Dan"]);

        assert!(db.query(Some(&["password"][..]), &Selection::all(), None).is_err());
    }

    #[test]
    fn test_sort_order_is_checked_before_running() {
        let db = FriendsDatabase::open_in_memory().unwrap();
        db.insert(&Friend::values("Dan", 523)).unwrap();

        let err = db
            .query(None, &Selection::all(), Some("name; DELETE FROM friends"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(db.count().unwrap(), 1);

        let cursor = db
            .query(None, &Selection::all(), Some("num_friends DESC, name asc"))
            .unwrap();
        assert_eq!(cursor.count(), 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let mut db = FriendsDatabase::open_in_memory().unwrap();
        let result: Result<()> = db.transaction(|conn| {
            insert_row(conn, &Friend::values("Dan", 1))?;
            Err(Error::InvalidArgument("abort".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(db.count().unwrap(), 0);

        let inserted = db
            .transaction(|conn| {
                insert_row(conn, &Friend::values("Dan", 1))?;
                insert_row(conn, &Friend::values("Kat", 2))?;
                Ok(2)
            })
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(db.count().unwrap(), 2);
    }

    #[test]
    fn test_schema_version_upgrade() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friends.db");

        {
            let db = FriendsDatabase::open(&path).unwrap();
            db.insert(&Friend::values("Dan", 1)).unwrap();
            assert_eq!(db.schema_version().unwrap(), schema::DATABASE_VERSION);
        }

        // reopening at the same version keeps data
        {
            let db = FriendsDatabase::open(&path).unwrap();
            assert_eq!(db.count().unwrap(), 1);
            db.conn.pragma_update(None, "user_version", 99).unwrap();
        }

        // a different stored version rebuilds the table
        let db = FriendsDatabase::open(&path).unwrap();
        assert_eq!(db.count().unwrap(), 0);
        assert_eq!(db.schema_version().unwrap(), schema::DATABASE_VERSION);
    }
}
