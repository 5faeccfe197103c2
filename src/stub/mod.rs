use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{account::TxId, policy::OrgId};

pub mod in_memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Ledger store is unavailable: {0}")]
    Unavailable(String),
    #[error("Read of `{key}` at version {read} is stale, current version is {current}")]
    Conflict { key: String, read: u64, current: u64 },
}

#[derive(Debug, Error)]
#[error("Cannot resolve the calling organization: {0}")]
pub struct IdentityError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

/// Writes of one invocation, handed to the store in a single `submit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    ops: Vec<WriteOp>,
}

impl WriteSet {
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value,
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete { key: key.into() });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

impl IntoIterator for WriteSet {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// A single committed version of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub value: Option<Vec<u8>>,
    pub tx_id: TxId,
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
}

/// Oldest-first versions of a key. Dropping the cursor releases it.
pub type HistoryCursor<'a> = Box<dyn Iterator<Item = Result<HistoryEntry, StoreError>> + 'a>;

/// The replicated key-value store as seen from one invocation.
pub trait StateAccessor {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Commits all writes together or none of them.
    fn submit(&mut self, writes: WriteSet) -> Result<(), StoreError>;

    fn history_for_key(&self, key: &str) -> Result<HistoryCursor<'_>, StoreError>;
}

pub trait IdentityResolver {
    fn organization(&self) -> Result<OrgId, IdentityError>;
}

/// Caller identity fixed up front, e.g. from an already verified certificate.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub OrgId);

impl IdentityResolver for StaticIdentity {
    fn organization(&self) -> Result<OrgId, IdentityError> {
        if self.0.is_empty() {
            Err(IdentityError("no organization attached to the caller".to_string()))
        } else {
            Ok(self.0.clone())
        }
    }
}
