use tracing::debug;

use crate::{
    account::{Account, TxRecord},
    codec::{self, CodecError},
    error::LedgerError,
    stub::{HistoryEntry, StateAccessor},
};

/// Replays every committed version of `id`, oldest first.
///
/// Deleted versions come back as a tombstone carrying only the id. The
/// history cursor is dropped on every return path, including a decode
/// failure halfway through.
pub fn account_history(
    state: &dyn StateAccessor,
    id: &str,
) -> Result<Vec<TxRecord>, LedgerError> {
    let cursor = state.history_for_key(id)?;
    let mut records = Vec::new();
    for entry in cursor {
        records.push(reconstruct(id, entry?)?);
    }
    debug!(account = id, versions = records.len(), "Account history replayed");
    Ok(records)
}

fn reconstruct(id: &str, entry: HistoryEntry) -> Result<TxRecord, CodecError> {
    let record = match entry.value {
        Some(bytes) if !entry.is_delete => codec::decode(&bytes)?,
        _ => Account::tombstone(id),
    };
    Ok(TxRecord {
        record,
        tx_id: entry.tx_id,
        timestamp: entry.timestamp,
        is_delete: entry.is_delete,
    })
}
