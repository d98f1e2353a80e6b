//! Friends provider - URI-routed facade over the friends table
//!
//! Every call classifies its address with the [`FriendsContract`], checks
//! the field set, runs one statement (or one transaction for bulk inserts)
//! and notifies observers when rows changed.

use crate::contract::{self, COLUMN_ID, FriendsContract, InsertCheck, UriMatch};
use crate::cursor::Cursor;
use crate::friend::Friend;
use crate::notify::{ChangeNotifier, ChangeObserver};
use crate::storage::{FriendsDatabase, Selection, sqlite};
use crate::uri::ContentUri;
use crate::values::ContentValues;
use crate::{Error, Result};

/// Record store facade for the friends table.
pub struct FriendsProvider {
    db: FriendsDatabase,
    contract: FriendsContract,
    notifier: ChangeNotifier,
}

impl FriendsProvider {
    pub fn new(db: FriendsDatabase, contract: FriendsContract, notifier: ChangeNotifier) -> Self {
        Self {
            db,
            contract,
            notifier,
        }
    }

    /// In-memory provider with the default authority (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(
            FriendsDatabase::open_in_memory()?,
            FriendsContract::default(),
            ChangeNotifier::new(),
        ))
    }

    pub fn contract(&self) -> &FriendsContract {
        &self.contract
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Shorthand for registering with this provider's notifier
    pub fn register_observer(&self, uri: ContentUri, notify_for_descendants: bool) -> ChangeObserver {
        self.notifier.register(uri, notify_for_descendants)
    }

    /// Read rows.
    ///
    /// For an item address the caller's selection is replaced by the id.
    pub fn query(
        &self,
        uri: &ContentUri,
        projection: Option<&[&str]>,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        let cursor = match self.contract.classify(uri) {
            UriMatch::Collection => self.db.query(projection, selection, sort_order)?,
            UriMatch::Item(id) => {
                self.db
                    .query(projection, &Selection::by_id(COLUMN_ID, id), sort_order)?
            }
            UriMatch::Unrecognized => return Err(contract::unsupported(uri)),
        };
        tracing::debug!(%uri, rows = cursor.count(), "query");
        Ok(cursor)
    }

    /// Insert one record into the collection.
    ///
    /// `None` values fail the call. Missing fields and duplicate names
    /// return `Ok(None)`; invalid values are errors.
    pub fn insert(&self, uri: &ContentUri, values: Option<&ContentValues>) -> Result<Option<ContentUri>> {
        self.require_collection(uri)?;
        let values =
            values.ok_or_else(|| Error::InvalidArgument("cannot insert null values".to_string()))?;

        if let InsertCheck::Missing(column) = contract::check_insert(values)? {
            tracing::warn!(%uri, column, "Insert skipped: required field missing");
            return Ok(None);
        }

        let Some(id) = self.db.insert(values)? else {
            return Ok(None);
        };

        self.notifier.notify_change(uri);
        let inserted = self.contract.item_uri(id);
        tracing::debug!(%inserted, "insert");
        Ok(Some(inserted))
    }

    /// Insert many records in one transaction.
    ///
    /// Entries that are incomplete, invalid or duplicate are skipped; the
    /// rest commit together. Returns how many were inserted.
    pub fn bulk_insert(&mut self, uri: &ContentUri, entries: &[ContentValues]) -> Result<usize> {
        self.require_collection(uri)?;

        let inserted = self.db.transaction(|conn| {
            let mut inserted = 0;
            for (index, values) in entries.iter().enumerate() {
                match contract::check_insert(values) {
                    Ok(InsertCheck::Complete) => {}
                    Ok(InsertCheck::Missing(column)) => {
                        tracing::warn!(index, column, "Bulk insert skipped entry: required field missing");
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(index, "Bulk insert skipped entry: {}", e);
                        continue;
                    }
                }
                if sqlite::insert_row(conn, values)?.is_some() {
                    inserted += 1;
                }
            }
            Ok(inserted)
        })?;

        if inserted > 0 {
            self.notifier.notify_change(uri);
        }
        tracing::debug!(%uri, requested = entries.len(), inserted, "bulk insert");
        Ok(inserted)
    }

    /// Update one record addressed by id.
    ///
    /// The caller's selection is ignored; the id decides the row.
    pub fn update(&self, uri: &ContentUri, values: &ContentValues, _selection: &Selection) -> Result<usize> {
        let id = match self.contract.classify(uri) {
            UriMatch::Item(id) => id,
            UriMatch::Collection | UriMatch::Unrecognized => return Err(contract::unsupported(uri)),
        };
        contract::check_update(values)?;

        let updated = self.db.update(values, &Selection::by_id(COLUMN_ID, id))?;
        if updated != 0 {
            self.notifier.notify_change(uri);
        }
        tracing::debug!(%uri, updated, "update");
        Ok(updated)
    }

    /// Delete every record (collection address) or one record (item address).
    ///
    /// A collection delete always notifies. An item delete notifies when no
    /// selection was given or the row was removed.
    pub fn delete(&self, uri: &ContentUri, selection: &Selection) -> Result<usize> {
        let (deleted, notify) = match self.contract.classify(uri) {
            UriMatch::Collection => (self.db.delete(&Selection::all())?, true),
            UriMatch::Item(id) => {
                let deleted = self.db.delete(&Selection::by_id(COLUMN_ID, id))?;
                (deleted, selection.is_all() || deleted != 0)
            }
            UriMatch::Unrecognized => return Err(contract::unsupported(uri)),
        };

        if notify {
            self.notifier.notify_change(uri);
        }
        tracing::debug!(%uri, deleted, "delete");
        Ok(deleted)
    }

    /// Type descriptor for an address
    pub fn get_type(&self, uri: &ContentUri) -> Result<String> {
        self.contract.type_of(uri)
    }

    /// Insert the sample friends when the table is empty.
    ///
    /// Returns how many rows were added.
    pub fn seed_if_empty(&mut self) -> Result<usize> {
        let collection = self.contract.collection_uri();
        let existing = self.query(&collection, Some(&[COLUMN_ID][..]), &Selection::all(), None)?;
        if !existing.is_empty() {
            return Ok(0);
        }
        let samples = [Friend::values("Dan", 500), Friend::values("Katherine", 500)];
        self.bulk_insert(&collection, &samples)
    }

    fn require_collection(&self, uri: &ContentUri) -> Result<()> {
        match self.contract.classify(uri) {
            UriMatch::Collection => Ok(()),
            UriMatch::Item(_) | UriMatch::Unrecognized => Err(contract::unsupported(uri)),
        }
    }
}
