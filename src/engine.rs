use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    account::{Account, TxRecord},
    codec,
    command::LedgerCommand,
    config::LedgerConfig,
    context::TxContext,
    error::{AccountRole, LedgerError},
    history,
    policy::{AuthorizationPolicy, Operation},
    stub::WriteSet,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LedgerResponse {
    Done,
    Exists(bool),
    Account(Account),
    History(Vec<TxRecord>),
}

/// Account transaction rules shared by every replica.
///
/// Each call validates everything against the state it read before it hands
/// at most one [`WriteSet`] to the store.
#[derive(Debug, Clone)]
pub struct AccountLedger {
    policy: AuthorizationPolicy,
    seed_accounts: Vec<Account>,
}

impl AccountLedger {
    pub fn new(policy: AuthorizationPolicy, seed_accounts: Vec<Account>) -> Self {
        Self {
            policy,
            seed_accounts,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(
            AuthorizationPolicy::from_config(config),
            config.seed_accounts.clone(),
        )
    }

    pub fn execute(
        &self,
        ctx: &mut TxContext<'_>,
        command: LedgerCommand,
    ) -> Result<LedgerResponse, LedgerError> {
        match command {
            LedgerCommand::InitLedger => self.init_ledger(ctx).map(|_| LedgerResponse::Done),
            LedgerCommand::AccountExists { id } => {
                self.account_exists(ctx, &id).map(LedgerResponse::Exists)
            }
            LedgerCommand::ReadAccount { id } => {
                self.read_account(ctx, &id).map(LedgerResponse::Account)
            }
            LedgerCommand::CreateAccount { id, balance, bank } => self
                .create_account(ctx, &id, balance, &bank)
                .map(|_| LedgerResponse::Done),
            LedgerCommand::DeleteAccount { id } => {
                self.delete_account(ctx, &id).map(|_| LedgerResponse::Done)
            }
            LedgerCommand::Transfer { from, to, amount } => self
                .transfer(ctx, &from, &to, amount)
                .map(|_| LedgerResponse::Done),
            LedgerCommand::GetAllTxs { id } => {
                self.get_all_txs(ctx, &id).map(LedgerResponse::History)
            }
        }
    }

    /// Writes the configured seed accounts that do not exist yet.
    ///
    /// Running it again only writes seeds that were missing, so it is safe to
    /// repeat. Returns the number of accounts written.
    pub fn init_ledger(&self, ctx: &mut TxContext<'_>) -> Result<usize, LedgerError> {
        let caller = ctx.caller()?;
        self.policy.authorize_bootstrap(&caller)?;

        let mut writes = WriteSet::default();
        let mut queued = BTreeSet::new();
        for seed in &self.seed_accounts {
            Self::validate_new(&seed.id, seed.balance)?;
            if queued.contains(seed.id.as_str()) || self.account_exists(ctx, &seed.id)? {
                debug!(account = %seed.id, "Seed account already present");
                continue;
            }
            writes.put(seed.id.clone(), codec::encode(seed)?);
            queued.insert(seed.id.as_str());
        }

        let written = writes.len();
        if !writes.is_empty() {
            ctx.state_mut().submit(writes)?;
        }
        info!(organization = %caller, written, "Ledger initialized");
        Ok(written)
    }

    /// True iff `id` currently holds a non-deleted record.
    pub fn account_exists(&self, ctx: &TxContext<'_>, id: &str) -> Result<bool, LedgerError> {
        Ok(ctx.state().get_state(id)?.is_some())
    }

    pub fn read_account(&self, ctx: &TxContext<'_>, id: &str) -> Result<Account, LedgerError> {
        let account = Self::load(ctx, id, AccountRole::Subject)?;
        if self.policy.reads_restricted() {
            let caller = ctx.caller()?;
            self.policy
                .authorize(Operation::Read, &caller, &account.bank)?;
        }
        Ok(account)
    }

    pub fn create_account(
        &self,
        ctx: &mut TxContext<'_>,
        id: &str,
        balance: Decimal,
        bank: &str,
    ) -> Result<(), LedgerError> {
        Self::validate_new(id, balance)?;
        if self.account_exists(ctx, id)? {
            return Err(LedgerError::AlreadyExists { id: id.to_string() });
        }
        let caller = ctx.caller()?;
        self.guard(Operation::Create, &caller, bank)?;

        let account = Account::new(id, balance, bank);
        let mut writes = WriteSet::default();
        writes.put(id, codec::encode(&account)?);
        ctx.state_mut().submit(writes)?;
        info!(account = id, %balance, bank, organization = %caller, "Account created");
        Ok(())
    }

    pub fn delete_account(&self, ctx: &mut TxContext<'_>, id: &str) -> Result<(), LedgerError> {
        let account = Self::load(ctx, id, AccountRole::Subject)?;
        let caller = ctx.caller()?;
        self.guard(Operation::Delete, &caller, &account.bank)?;

        let mut writes = WriteSet::default();
        writes.delete(id);
        ctx.state_mut().submit(writes)?;
        info!(account = id, organization = %caller, "Account deleted");
        Ok(())
    }

    /// Moves `amount` from `from_id` to `to_id`.
    ///
    /// Both accounts are read, and every check is done, before the two
    /// balance updates go out together in one write set. A transfer from an
    /// account to itself is validated the same way and then leaves the
    /// ledger untouched.
    pub fn transfer(
        &self,
        ctx: &mut TxContext<'_>,
        from_id: &str,
        to_id: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: "transfer amount must be positive",
            });
        }
        let mut from = Self::load(ctx, from_id, AccountRole::Source)?;
        let mut to = Self::load(ctx, to_id, AccountRole::Destination)?;
        let caller = ctx.caller()?;
        self.guard(Operation::Transfer, &caller, &from.bank)?;

        let Some(remaining) = from.remaining_after(amount) else {
            warn!(
                from = from_id,
                balance = %from.balance,
                %amount,
                "Transfer rejected, insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance {
                id: from.id,
                balance: from.balance,
                requested: amount,
            });
        };

        if from_id == to_id {
            debug!(account = from_id, %amount, "Self transfer, nothing to write");
            return Ok(());
        }

        let Some(credited) = to.credited_with(amount) else {
            warn!(
                to = to_id,
                balance = %to.balance,
                %amount,
                "Transfer rejected, balance overflow"
            );
            return Err(LedgerError::BalanceOverflow {
                id: to.id,
                balance: to.balance,
                amount,
            });
        };

        from.balance = remaining;
        to.balance = credited;

        let mut writes = WriteSet::default();
        writes
            .put(from_id, codec::encode(&from)?)
            .put(to_id, codec::encode(&to)?);
        ctx.state_mut().submit(writes)?;
        info!(
            from = from_id,
            to = to_id,
            %amount,
            organization = %caller,
            "Transfer committed"
        );
        Ok(())
    }

    pub fn get_all_txs(
        &self,
        ctx: &TxContext<'_>,
        id: &str,
    ) -> Result<Vec<TxRecord>, LedgerError> {
        let records = history::account_history(ctx.state(), id)?;
        if self.policy.reads_restricted() {
            // banks never change, but an id can be reused after a delete
            if let Some(latest) = records.iter().rev().find(|r| !r.is_delete) {
                let caller = ctx.caller()?;
                self.policy
                    .authorize(Operation::History, &caller, &latest.record.bank)?;
            }
        }
        Ok(records)
    }

    fn load(ctx: &TxContext<'_>, id: &str, role: AccountRole) -> Result<Account, LedgerError> {
        let Some(bytes) = ctx.state().get_state(id)? else {
            return Err(LedgerError::NotFound {
                id: id.to_string(),
                role,
            });
        };
        let account = codec::decode(&bytes)?;
        debug!(account = id, "Account loaded");
        Ok(account)
    }

    fn guard(&self, operation: Operation, caller: &str, bank: &str) -> Result<(), LedgerError> {
        self.policy
            .authorize(operation, caller, bank)
            .inspect_err(|err| warn!(%err, "Access denied"))?;
        Ok(())
    }

    fn validate_new(id: &str, balance: Decimal) -> Result<(), LedgerError> {
        if id.is_empty() {
            return Err(LedgerError::InvalidAccountId);
        }
        if balance < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                amount: balance,
                reason: "initial balance must not be negative",
            });
        }
        Ok(())
    }
}
