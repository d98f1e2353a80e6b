//! Caller-supplied row filters

use crate::values::Value;

/// A `WHERE` clause fragment with positional `?` arguments.
///
/// `clause` is passed to SQLite verbatim; `None` selects every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub clause: Option<String>,
    pub args: Vec<Value>,
}

impl Selection {
    /// Select every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(clause: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            clause: Some(clause.into()),
            args,
        }
    }

    /// Select one row by integer primary key
    pub fn by_id(column: &str, id: i64) -> Self {
        Self::new(format!("{} = ?", column), vec![Value::Integer(id)])
    }

    pub fn is_all(&self) -> bool {
        self.clause.is_none()
    }

    /// ` WHERE ...` suffix, or an empty string when selecting everything
    pub(crate) fn where_sql(&self) -> String {
        match &self.clause {
            Some(clause) => format!(" WHERE {}", clause),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_sql() {
        assert_eq!(Selection::all().where_sql(), "");
        assert!(Selection::all().is_all());

        let by_id = Selection::by_id("_id", 3);
        assert_eq!(by_id.where_sql(), " WHERE _id = ?");
        assert_eq!(by_id.args, vec![Value::Integer(3)]);
        assert!(!by_id.is_all());
    }
}
