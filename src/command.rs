use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::AccountId;

/// Operation names accepted on the invocation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFunction {
    InitLedger,
    AccountExists,
    ReadAccount,
    CreateAccount,
    DeleteAccount,
    Transfer,
    GetAllTxs,
}

impl LedgerFunction {
    pub fn name(self) -> &'static str {
        match self {
            LedgerFunction::InitLedger => "InitLedger",
            LedgerFunction::AccountExists => "AccountExists",
            LedgerFunction::ReadAccount => "ReadAccount",
            LedgerFunction::CreateAccount => "CreateAccount",
            LedgerFunction::DeleteAccount => "DeleteAccount",
            LedgerFunction::Transfer => "Transfer",
            LedgerFunction::GetAllTxs => "GetAllTxs",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            LedgerFunction::InitLedger => 0,
            LedgerFunction::AccountExists
            | LedgerFunction::ReadAccount
            | LedgerFunction::DeleteAccount
            | LedgerFunction::GetAllTxs => 1,
            LedgerFunction::CreateAccount | LedgerFunction::Transfer => 3,
        }
    }

    const ALL: [LedgerFunction; 7] = [
        LedgerFunction::InitLedger,
        LedgerFunction::AccountExists,
        LedgerFunction::ReadAccount,
        LedgerFunction::CreateAccount,
        LedgerFunction::DeleteAccount,
        LedgerFunction::Transfer,
        LedgerFunction::GetAllTxs,
    ];
}

impl fmt::Display for LedgerFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LedgerFunction {
    type Err = InvocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| InvocationError::UnknownFunction(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Unknown function `{0}`")]
    UnknownFunction(String),
    #[error("{function} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        function: LedgerFunction,
        expected: usize,
        actual: usize,
    },
    #[error("Argument `{value}` of {function} is not a decimal amount")]
    InvalidDecimal {
        function: LedgerFunction,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    InitLedger,
    AccountExists {
        id: AccountId,
    },
    ReadAccount {
        id: AccountId,
    },
    CreateAccount {
        id: AccountId,
        balance: Decimal,
        bank: String,
    },
    DeleteAccount {
        id: AccountId,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
    GetAllTxs {
        id: AccountId,
    },
}

impl LedgerCommand {
    /// Builds a command from an operation name and its positional arguments.
    pub fn parse_command(
        function: LedgerFunction,
        args: &[String],
    ) -> Result<Self, InvocationError> {
        if args.len() != function.arity() {
            return Err(InvocationError::ArgumentCount {
                function,
                expected: function.arity(),
                actual: args.len(),
            });
        }
        let id = || args[0].clone();

        Ok(match function {
            LedgerFunction::InitLedger => Self::InitLedger,
            LedgerFunction::AccountExists => Self::AccountExists { id: id() },
            LedgerFunction::ReadAccount => Self::ReadAccount { id: id() },
            LedgerFunction::DeleteAccount => Self::DeleteAccount { id: id() },
            LedgerFunction::GetAllTxs => Self::GetAllTxs { id: id() },
            LedgerFunction::CreateAccount => Self::CreateAccount {
                id: id(),
                balance: Self::parse_decimal(function, &args[1])?,
                bank: args[2].clone(),
            },
            LedgerFunction::Transfer => Self::Transfer {
                from: id(),
                to: args[1].clone(),
                amount: Self::parse_decimal(function, &args[2])?,
            },
        })
    }

    pub fn function(&self) -> LedgerFunction {
        match self {
            Self::InitLedger => LedgerFunction::InitLedger,
            Self::AccountExists { .. } => LedgerFunction::AccountExists,
            Self::ReadAccount { .. } => LedgerFunction::ReadAccount,
            Self::CreateAccount { .. } => LedgerFunction::CreateAccount,
            Self::DeleteAccount { .. } => LedgerFunction::DeleteAccount,
            Self::Transfer { .. } => LedgerFunction::Transfer,
            Self::GetAllTxs { .. } => LedgerFunction::GetAllTxs,
        }
    }

    fn parse_decimal(function: LedgerFunction, value: &str) -> Result<Decimal, InvocationError> {
        Decimal::from_str(value.trim()).map_err(|_| InvocationError::InvalidDecimal {
            function,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn function_names() {
        assert_eq!(
            "GetAllTxs".parse::<LedgerFunction>().unwrap(),
            LedgerFunction::GetAllTxs
        );
        for function in LedgerFunction::ALL {
            assert_eq!(function.to_string().parse::<LedgerFunction>().unwrap(), function);
        }
        let err = "Mint".parse::<LedgerFunction>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown function `Mint`");
    }

    #[test]
    fn parse_commands() {
        assert_eq!(
            LedgerCommand::parse_command(LedgerFunction::InitLedger, &[]).unwrap(),
            LedgerCommand::InitLedger
        );
        assert_eq!(
            LedgerCommand::parse_command(
                LedgerFunction::CreateAccount,
                &args(&["a1", "100.50", "BankA"])
            )
            .unwrap(),
            LedgerCommand::CreateAccount {
                id: "a1".to_string(),
                balance: Decimal::new(10050, 2),
                bank: "BankA".to_string(),
            }
        );
        let transfer =
            LedgerCommand::parse_command(LedgerFunction::Transfer, &args(&["a1", "a2", "5"]))
                .unwrap();
        assert_eq!(transfer.function(), LedgerFunction::Transfer);
        assert!(matches!(
            transfer,
            LedgerCommand::Transfer { ref from, ref to, amount }
                if from == "a1" && to == "a2" && amount == Decimal::from(5)
        ));
    }

    #[test]
    fn reject_bad_arguments() {
        let err = LedgerCommand::parse_command(LedgerFunction::ReadAccount, &[]).unwrap_err();
        assert!(matches!(
            err,
            InvocationError::ArgumentCount {
                function: LedgerFunction::ReadAccount,
                expected: 1,
                actual: 0
            }
        ));
        assert_eq!(err.to_string(), "ReadAccount expects 1 argument(s), got 0");

        let err = LedgerCommand::parse_command(
            LedgerFunction::Transfer,
            &args(&["a1", "a2", "lots"]),
        )
        .unwrap_err();
        assert!(matches!(err, InvocationError::InvalidDecimal { .. }));
    }
}
