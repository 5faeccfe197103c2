use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::AccountId,
    codec::CodecError,
    policy::AccessDenied,
    stub::{IdentityError, StoreError},
};

/// Which account of an operation a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    Subject,
    Source,
    Destination,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccountRole::Subject => "account",
            AccountRole::Source => "source account",
            AccountRole::Destination => "destination account",
        })
    }
}

/// Every way a ledger invocation can fail. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("The {role} `{id}` does not exist")]
    NotFound { id: AccountId, role: AccountRole },
    #[error("The account `{id}` already exists")]
    AlreadyExists { id: AccountId },
    #[error(transparent)]
    Unauthorized(#[from] AccessDenied),
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        amount: Decimal,
        reason: &'static str,
    },
    #[error("Insufficient balance on `{id}`: {balance} available, {requested} requested")]
    InsufficientBalance {
        id: AccountId,
        balance: Decimal,
        requested: Decimal,
    },
    #[error("Crediting {amount} to `{id}` would overflow its balance {balance}")]
    BalanceOverflow {
        id: AccountId,
        balance: Decimal,
        amount: Decimal,
    },
    #[error("Account id must not be empty")]
    InvalidAccountId,
    #[error(transparent)]
    MalformedRecord(#[from] CodecError),
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
    #[error(transparent)]
    IdentityUnavailable(#[from] IdentityError),
}
