//! Deployment-time ledger configuration.
//!
//! Every replica must be started with the same configuration, otherwise
//! replicas disagree on authorization decisions.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{account::Account, policy::OrgId};

pub const JPMORGAN: &str = "JPMorgan Chase & Co.";
pub const BANK_OF_AMERICA: &str = "Bank of America Corp.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Organization id must not be empty")]
    EmptyOrganization,
    #[error("Organization `{organization}` is mapped to an empty bank name")]
    EmptyBank { organization: OrgId },
    #[error("Bank `{bank}` is claimed by both `{first}` and `{second}`")]
    SharedBank {
        bank: String,
        first: OrgId,
        second: OrgId,
    },
    #[error("Seed account `{id}` is invalid: {reason}")]
    InvalidSeed { id: String, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Organization id -> the bank it acts for.
    #[serde(default = "default_organizations")]
    pub organizations: BTreeMap<OrgId, String>,

    /// Limit reads and history to the owning organization.
    #[serde(default)]
    pub restrict_reads: bool,

    /// Accounts written by `InitLedger`.
    #[serde(default = "default_seed_accounts")]
    pub seed_accounts: Vec<Account>,
}

fn default_organizations() -> BTreeMap<OrgId, String> {
    BTreeMap::from([
        ("Org1MSP".to_string(), JPMORGAN.to_string()),
        ("Org2MSP".to_string(), BANK_OF_AMERICA.to_string()),
    ])
}

fn default_seed_accounts() -> Vec<Account> {
    (1..=5u32)
        .map(|n| {
            let bank = if n % 2 == 1 { JPMORGAN } else { BANK_OF_AMERICA };
            Account::new(format!("account{n}"), Decimal::from(n * 100), bank)
        })
        .collect()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            organizations: default_organizations(),
            restrict_reads: false,
            seed_accounts: default_seed_accounts(),
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for (organization, bank) in &self.organizations {
            if organization.is_empty() {
                return Err(ConfigError::EmptyOrganization);
            }
            if bank.is_empty() {
                return Err(ConfigError::EmptyBank {
                    organization: organization.clone(),
                });
            }
            if let Some(first) = owners.insert(bank, organization) {
                return Err(ConfigError::SharedBank {
                    bank: bank.clone(),
                    first: first.to_string(),
                    second: organization.clone(),
                });
            }
        }

        let mut seed_ids = BTreeSet::new();
        for seed in &self.seed_accounts {
            let reason = if seed.id.is_empty() {
                Some("empty id")
            } else if !seed_ids.insert(seed.id.as_str()) {
                Some("id listed more than once")
            } else if seed.balance < Decimal::ZERO {
                Some("negative balance")
            } else if !owners.contains_key(seed.bank.as_str()) {
                Some("bank is not owned by any organization")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidSeed {
                    id: seed.id.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LedgerConfig::default();
        config.validate().unwrap();
        assert!(!config.restrict_reads);
        assert_eq!(config.seed_accounts.len(), 5);
        assert_eq!(
            config.seed_accounts[1],
            Account::new("account2", Decimal::from(200), BANK_OF_AMERICA)
        );
        assert_eq!(config.seed_accounts[4].bank, JPMORGAN);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = LedgerConfig::from_json_str(r#"{"restrict_reads": true}"#).unwrap();
        assert!(config.restrict_reads);
        assert_eq!(config.organizations, default_organizations());
        assert_eq!(config.seed_accounts, default_seed_accounts());
    }

    #[test]
    fn custom_mapping() {
        let config = LedgerConfig::from_json_str(
            r#"{
                "organizations": {"Org1": "BankA", "Org2": "BankB"},
                "seed_accounts": [{"ID": "a1", "Balance": "10.5", "Bank": "BankB"}]
            }"#,
        )
        .unwrap();
        assert_eq!(config.organizations["Org1"], "BankA");
        assert_eq!(
            config.seed_accounts,
            vec![Account::new("a1", Decimal::new(105, 1), "BankB")]
        );
    }

    #[test]
    fn rejects_invalid_configs() {
        assert!(matches!(
            LedgerConfig::from_json_str(r#"{"organizations": {"Org1": "BankA", "Org2": "BankA"}}"#),
            Err(ConfigError::SharedBank { .. })
        ));
        assert!(matches!(
            LedgerConfig::from_json_str(r#"{"organizations": {"Org1": ""}}"#),
            Err(ConfigError::EmptyBank { .. })
        ));
        assert!(matches!(
            LedgerConfig::from_json_str(r#"{"organizations": {"": "BankA"}}"#),
            Err(ConfigError::EmptyOrganization)
        ));
        let err = LedgerConfig::from_json_str(
            r#"{"seed_accounts": [{"ID": "x", "Balance": "1", "Bank": "Nobody"}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Seed account `x` is invalid: bank is not owned by any organization"
        );
        let err = LedgerConfig::from_json_str(
            r#"{"seed_accounts": [
                {"ID": "x", "Balance": "1", "Bank": "JPMorgan Chase & Co."},
                {"ID": "x", "Balance": "999", "Bank": "Bank of America Corp."}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Seed account `x` is invalid: id listed more than once"
        );
        assert!(matches!(
            LedgerConfig::from_json_str("[1, 2]"),
            Err(ConfigError::Parse(_))
        ));
    }
}
