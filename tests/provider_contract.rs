//! End-to-end checks of the friends provider against a database file

use friendstore::contract::{COLUMN_ID, COLUMN_NAME, COLUMN_NUM_FRIENDS};
use friendstore::{
    ChangeNotifier, ContentUri, ContentValues, Error, Friend, FriendsContract, FriendsDatabase,
    FriendsProvider, Selection,
};
use std::path::Path;
use std::time::Duration;

fn open(path: &Path) -> FriendsProvider {
    FriendsProvider::new(
        FriendsDatabase::open(path).unwrap(),
        FriendsContract::default(),
        ChangeNotifier::new(),
    )
}

fn count(provider: &FriendsProvider) -> usize {
    let table = provider.contract().collection_uri();
    provider.query(&table, None, &Selection::all(), None).unwrap().count()
}

fn assert_stored(provider: &FriendsProvider, uri: &ContentUri, expected: &ContentValues) {
    let cursor = provider.query(uri, None, &Selection::all(), None).unwrap();
    assert_eq!(cursor.count(), 1, "expected exactly one row at {}", uri);
    let row = cursor.first().unwrap();
    assert_eq!(row.get_str(COLUMN_NAME), expected.get_as_str(COLUMN_NAME));
    assert_eq!(row.get_i64(COLUMN_NUM_FRIENDS), expected.get_as_i64(COLUMN_NUM_FRIENDS));
}

#[test]
fn test_empty_table_and_bad_id() {
    let dir = tempfile::tempdir().unwrap();
    let provider = open(&dir.path().join("friends.db"));
    assert_eq!(count(&provider), 0);

    let bad = provider.contract().collection_uri().with_appended_path("-1");
    let err = provider.query(&bad, None, &Selection::all(), None).unwrap_err();
    assert!(matches!(err, Error::UnsupportedUri(_)));
}

#[test]
fn test_insert_rules() {
    let dir = tempfile::tempdir().unwrap();
    let provider = open(&dir.path().join("friends.db"));
    let table = provider.contract().collection_uri();

    let dan = Friend::values("Dan", 555);
    let uri = provider.insert(&table, Some(&dan)).unwrap().unwrap();
    assert_eq!(count(&provider), 1);
    assert_stored(&provider, &uri, &dan);

    assert!(matches!(provider.insert(&table, None), Err(Error::InvalidArgument(_))));

    let negative = Friend::values("Sarah", -42);
    assert!(matches!(
        provider.insert(&table, Some(&negative)),
        Err(Error::InvalidArgument(_))
    ));

    let no_count = ContentValues::new().with(COLUMN_NAME, "Sarah");
    assert_eq!(provider.insert(&table, Some(&no_count)).unwrap(), None);

    let no_name = ContentValues::new().with(COLUMN_NUM_FRIENDS, 42);
    assert_eq!(provider.insert(&table, Some(&no_name)).unwrap(), None);

    assert_eq!(count(&provider), 1);
}

#[test]
fn test_bulk_insert_update_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut provider = open(&dir.path().join("friends.db"));
    let table = provider.contract().collection_uri();

    let entries = [Friend::values("Katherine", 554), Friend::values("Dan", 523)];
    assert_eq!(provider.bulk_insert(&table, &entries).unwrap(), 2);

    let ids = provider
        .query(&table, Some(&[COLUMN_ID][..]), &Selection::all(), None)
        .unwrap();
    assert_eq!(ids.count(), 2);
    for (row, expected) in ids.rows().zip(entries.iter()) {
        let id = row.get_i64(COLUMN_ID).unwrap();
        assert_stored(&provider, &provider.contract().item_uri(id), expected);
    }

    let first = ids.first().unwrap().get_i64(COLUMN_ID).unwrap();
    let item = provider.contract().item_uri(first);
    let changed = ContentValues::new().with(COLUMN_NUM_FRIENDS, 555);
    assert_eq!(provider.update(&item, &changed, &Selection::all()).unwrap(), 1);
    let cursor = provider.query(&item, None, &Selection::all(), None).unwrap();
    assert_eq!(cursor.first().unwrap().get_i64(COLUMN_NUM_FRIENDS), Some(555));

    let last = ids.last().unwrap().get_i64(COLUMN_ID).unwrap();
    let last_uri = provider.contract().item_uri(last);
    assert_eq!(provider.delete(&last_uri, &Selection::all()).unwrap(), 1);
    assert_eq!(count(&provider), 1);
    assert!(provider
        .query(&last_uri, None, &Selection::all(), None)
        .unwrap()
        .is_empty());
}

#[test]
fn test_get_type() {
    let provider = FriendsProvider::open_in_memory().unwrap();
    let table = provider.contract().collection_uri();

    assert_eq!(
        provider.get_type(&table).unwrap(),
        "vnd.cursor.dir/com.example.android.exampleprovider.app/friends"
    );
    assert_eq!(
        provider.get_type(&table.with_appended_id(1)).unwrap(),
        "vnd.cursor.item/com.example.android.exampleprovider.app/friends"
    );

    let unknown = ContentUri::parse("content://com.example.android.exampleprovider.app/enemies").unwrap();
    assert!(matches!(provider.get_type(&unknown), Err(Error::UnsupportedUri(_))));
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("friends.db");

    {
        let mut provider = open(&path);
        assert_eq!(provider.seed_if_empty().unwrap(), 2);
    }

    let mut provider = open(&path);
    assert_eq!(provider.seed_if_empty().unwrap(), 0);
    let friends = Friend::all_from(
        &provider
            .query(&provider.contract().collection_uri(), None, &Selection::all(), Some("name ASC"))
            .unwrap(),
    );
    let names: Vec<_> = friends.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Dan", "Katherine"]);
}

#[test]
fn test_observer_sees_changes_from_another_thread() {
    let provider = FriendsProvider::open_in_memory().unwrap();
    let table = provider.contract().collection_uri();
    let observer = provider.register_observer(table.clone(), true);

    let handle = std::thread::spawn(move || {
        provider.insert(&table, Some(&Friend::values("Dan", 1))).unwrap();
    });
    handle.join().unwrap();

    let event = observer.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(event.uri.to_string(), "content://com.example.android.exampleprovider.app/friends");
}
