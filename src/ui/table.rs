use crate::cursor::Cursor;
use crate::friend::Friend;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Tabled)]
struct FriendRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Friends")]
    num_friends: i64,
}

/// Render typed friends, one per row
pub fn friends_table(friends: &[Friend]) -> String {
    if friends.is_empty() {
        return String::new();
    }

    let rows: Vec<FriendRow> = friends
        .iter()
        .map(|f| FriendRow {
            id: f.id,
            name: f.name.clone(),
            num_friends: f.num_friends,
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render any cursor, using its projected columns as the header
pub fn cursor_table(cursor: &Cursor) -> String {
    if cursor.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(cursor.columns().iter().cloned());
    for row in cursor.rows() {
        builder.push_record(row.values().iter().map(|v| v.to_string()));
    }

    builder.build().with(Style::rounded()).to_string()
}
