/// Account and history record types.
pub mod account;

/// Canonical byte encoding of accounts, identical on every replica.
pub mod codec;

/// Which organization may act on which account.
pub mod policy;

/// Interfaces to the replicated store and to caller identity, plus an
/// in-memory store implementation.
///
/// NOTE: the in-memory store is what tests and the replay binary run
/// against. A real deployment plugs the platform's store in behind the same
/// traits.
pub mod stub;

/// The per-invocation context handed to every engine call.
pub mod context;

/// Account create/read/delete/transfer rules.
pub mod engine;

/// Rebuilds an account's change history from the store's per-key log.
pub mod history;

/// Turns an operation name plus string arguments into a typed command.
pub mod command;

/// Deployment-time settings: organization to bank mapping, read policy, seed
/// accounts.
pub mod config;

/// Errors returned by ledger operations.
pub mod error;

/// CSV replay driver used by the binary and by integration tests.
pub mod bin_utils;
