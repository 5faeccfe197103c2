use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

use chrono::{DateTime, Utc};

use crate::account::TxId;

use super::{HistoryCursor, HistoryEntry, StateAccessor, StoreError, WriteOp, WriteSet};

#[derive(Debug, Clone)]
struct KeyVersion {
    value: Option<Vec<u8>>,
    tx_id: TxId,
    timestamp: DateTime<Utc>,
}

/// Versioned world state with full per-key history.
///
/// A key's version is the number of writes it has seen, 0 for never written.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    keys: RefCell<BTreeMap<String, Vec<KeyVersion>>>,
    open_cursors: Cell<usize>,
    unavailable: Cell<bool>,
}

impl InMemoryLedger {
    /// Opens a transaction executing under `tx_id` at the proposal `timestamp`.
    pub fn transaction(
        &self,
        tx_id: impl Into<TxId>,
        timestamp: DateTime<Utc>,
    ) -> InMemoryTransaction<'_> {
        InMemoryTransaction {
            ledger: self,
            tx_id: tx_id.into(),
            timestamp,
            reads: RefCell::new(BTreeMap::new()),
        }
    }

    /// Latest committed value, `None` if absent or deleted.
    pub fn current(&self, key: &str) -> Option<Vec<u8>> {
        self.keys
            .borrow()
            .get(key)
            .and_then(|versions| versions.last())
            .and_then(|version| version.value.clone())
    }

    /// Keys that currently hold a value, in key order.
    pub fn live_keys(&self) -> Vec<String> {
        self.keys
            .borrow()
            .iter()
            .filter(|(_, versions)| versions.last().is_some_and(|v| v.value.is_some()))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Commits `value` under `key` without any validation.
    pub fn write_raw(
        &self,
        key: &str,
        value: Option<Vec<u8>>,
        tx_id: impl Into<TxId>,
        timestamp: DateTime<Utc>,
    ) {
        self.keys
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .push(KeyVersion {
                value,
                tx_id: tx_id.into(),
                timestamp,
            });
    }

    pub fn open_cursors(&self) -> usize {
        self.open_cursors.get()
    }

    /// Makes every store call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    fn version(&self, key: &str) -> u64 {
        self.keys
            .borrow()
            .get(key)
            .map_or(0, |versions| versions.len() as u64)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.get() {
            Err(StoreError::Unavailable("in-memory store switched off".to_string()))
        } else {
            Ok(())
        }
    }
}

/// One invocation's view of an [`InMemoryLedger`].
///
/// Reads see committed state only. Every read records the key version, and
/// `submit` refuses to commit if any of those keys moved in the meantime.
pub struct InMemoryTransaction<'l> {
    ledger: &'l InMemoryLedger,
    tx_id: TxId,
    timestamp: DateTime<Utc>,
    reads: RefCell<BTreeMap<String, u64>>,
}

impl StateAccessor for InMemoryTransaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.ledger.check_available()?;
        // the first read of a key is the one the commit is validated against
        let version = self.ledger.version(key);
        self.reads
            .borrow_mut()
            .entry(key.to_string())
            .or_insert(version);
        Ok(self.ledger.current(key))
    }

    fn submit(&mut self, writes: WriteSet) -> Result<(), StoreError> {
        self.ledger.check_available()?;
        for (key, read) in self.reads.borrow().iter() {
            let current = self.ledger.version(key);
            if current != *read {
                return Err(StoreError::Conflict {
                    key: key.clone(),
                    read: *read,
                    current,
                });
            }
        }

        for op in writes {
            let (key, value) = match op {
                WriteOp::Put { key, value } => (key, Some(value)),
                WriteOp::Delete { key } => (key, None),
            };
            self.ledger
                .write_raw(&key, value, self.tx_id.clone(), self.timestamp);
            // our own writes must not invalidate a later submit in this transaction
            let version = self.ledger.version(&key);
            self.reads.borrow_mut().insert(key, version);
        }
        Ok(())
    }

    fn history_for_key(&self, key: &str) -> Result<HistoryCursor<'_>, StoreError> {
        self.ledger.check_available()?;
        let entries: Vec<HistoryEntry> = self
            .ledger
            .keys
            .borrow()
            .get(key)
            .map(|versions| {
                versions
                    .iter()
                    .map(|version| HistoryEntry {
                        is_delete: version.value.is_none(),
                        value: version.value.clone(),
                        tx_id: version.tx_id.clone(),
                        timestamp: version.timestamp,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let open = &self.ledger.open_cursors;
        open.set(open.get() + 1);
        Ok(Box::new(InMemoryHistoryCursor {
            entries: entries.into_iter(),
            open,
        }))
    }
}

struct InMemoryHistoryCursor<'a> {
    entries: std::vec::IntoIter<HistoryEntry>,
    open: &'a Cell<usize>,
}

impl Iterator for InMemoryHistoryCursor<'_> {
    type Item = Result<HistoryEntry, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Ok)
    }
}

impl Drop for InMemoryHistoryCursor<'_> {
    fn drop(&mut self) {
        self.open.set(self.open.get() - 1);
    }
}
