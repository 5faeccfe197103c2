//! This module could be a separate crate on its own, replaying invocation logs
//! against [`crate::engine`], but it lives here so integration tests can reuse it.

use std::io::{Read, Write};

use crate::{
    command::{InvocationError, LedgerCommand, LedgerFunction},
    config::LedgerConfig,
    context::TxContext,
    engine::AccountLedger,
    error::LedgerError,
    stub::{StaticIdentity, in_memory::InMemoryLedger},
};
use anyhow::Result;
use csv_parser::{CsvInvocationParser, Invocation};
use csv_printer::{InvocationResult, print_results, render_response};
use thiserror::Error;
use tracing::debug;

pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum InvocationProcessError {
    #[error("Unreadable invocation row: {0}")]
    Row(#[from] csv::Error),
    #[error(transparent)]
    Invocation(#[from] InvocationError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Failed to render response: {0}")]
    Render(#[from] serde_json::Error),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub config: LedgerConfig,
    pub error_printer: Box<dyn FnMut(u64, InvocationProcessError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvInvocationParser::new(self.input)?;

        let ledger = InMemoryLedger::default();
        let engine = AccountLedger::from_config(&self.config);
        let mut results = Vec::new();

        for (line, row) in parser {
            match row
                .map_err(InvocationProcessError::from)
                .and_then(|row| invoke(&ledger, &engine, row))
            {
                Ok(result) => results.push(result),
                Err(err) => (self.error_printer)(line, err),
            }
        }

        print_results(self.output, results.into_iter())
    }
}

fn invoke(
    ledger: &InMemoryLedger,
    engine: &AccountLedger,
    row: Invocation,
) -> Result<InvocationResult, InvocationProcessError> {
    let function: LedgerFunction = row.function.parse()?;
    let command = LedgerCommand::parse_command(function, &row.args())?;

    let identity = StaticIdentity(row.org);
    let mut tx = ledger.transaction(row.tx.clone(), row.timestamp);
    let mut ctx = TxContext::new(&identity, &mut tx);
    let response = engine.execute(&mut ctx, command)?;
    debug!(tx = %row.tx, %function, "Invocation succeeded");

    Ok(InvocationResult {
        tx: row.tx,
        function: function.to_string(),
        result: render_response(&response)?,
    })
}
