use std::{collections::BTreeMap, fmt};

use thiserror::Error;

use crate::config::LedgerConfig;

pub type OrgId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Delete,
    Transfer,
    History,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Delete => "delete",
            Operation::Transfer => "transfer from",
            Operation::History => "read the history of",
        })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Organization `{organization}` cannot {operation} an account held at `{bank}`")]
    ForeignBank {
        operation: Operation,
        organization: OrgId,
        bank: String,
    },
    #[error("Organization `{organization}` is not a ledger participant")]
    UnknownOrganization { organization: OrgId },
}

/// Decides which organization may act on which account.
///
/// An organization acts for exactly one bank. Reads are open to everyone
/// unless `restrict_reads` is set; mutations always require the caller to act
/// for the account's bank.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    banks: BTreeMap<OrgId, String>,
    restrict_reads: bool,
}

impl AuthorizationPolicy {
    pub fn new(banks: BTreeMap<OrgId, String>, restrict_reads: bool) -> Self {
        Self {
            banks,
            restrict_reads,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.organizations.clone(), config.restrict_reads)
    }

    pub fn bank_of(&self, organization: &str) -> Option<&str> {
        self.banks.get(organization).map(String::as_str)
    }

    pub fn reads_restricted(&self) -> bool {
        self.restrict_reads
    }

    pub fn authorize(
        &self,
        operation: Operation,
        organization: &str,
        bank: &str,
    ) -> Result<(), AccessDenied> {
        let gated = match operation {
            Operation::Read | Operation::History => self.restrict_reads,
            Operation::Create | Operation::Delete | Operation::Transfer => true,
        };
        if !gated || self.bank_of(organization) == Some(bank) {
            Ok(())
        } else {
            Err(AccessDenied::ForeignBank {
                operation,
                organization: organization.to_string(),
                bank: bank.to_string(),
            })
        }
    }

    /// Seeding the ledger is open to any configured organization.
    pub fn authorize_bootstrap(&self, organization: &str) -> Result<(), AccessDenied> {
        if self.banks.contains_key(organization) {
            Ok(())
        } else {
            Err(AccessDenied::UnknownOrganization {
                organization: organization.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(restrict_reads: bool) -> AuthorizationPolicy {
        AuthorizationPolicy::new(
            BTreeMap::from([
                ("Org1MSP".to_string(), "BankA".to_string()),
                ("Org2MSP".to_string(), "BankB".to_string()),
            ]),
            restrict_reads,
        )
    }

    #[test]
    fn mutations_require_owning_organization() {
        let policy = policy(false);
        for op in [Operation::Create, Operation::Delete, Operation::Transfer] {
            policy.authorize(op, "Org1MSP", "BankA").unwrap();
            policy.authorize(op, "Org2MSP", "BankB").unwrap();
            let err = policy.authorize(op, "Org2MSP", "BankA").unwrap_err();
            assert!(matches!(err, AccessDenied::ForeignBank { operation, .. } if operation == op));
            // unknown organizations own nothing
            assert!(policy.authorize(op, "Org3MSP", "BankA").is_err());
        }
        let err = policy
            .authorize(Operation::Delete, "Org1MSP", "BankB")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Organization `Org1MSP` cannot delete an account held at `BankB`"
        );
    }

    #[test]
    fn reads_open_by_default() {
        let policy = policy(false);
        assert!(!policy.reads_restricted());
        policy.authorize(Operation::Read, "Org2MSP", "BankA").unwrap();
        policy.authorize(Operation::History, "Org3MSP", "BankA").unwrap();
    }

    #[test]
    fn reads_gated_when_restricted() {
        let policy = policy(true);
        policy.authorize(Operation::Read, "Org1MSP", "BankA").unwrap();
        assert!(matches!(
            policy.authorize(Operation::Read, "Org2MSP", "BankA"),
            Err(AccessDenied::ForeignBank { .. })
        ));
        assert!(matches!(
            policy.authorize(Operation::History, "Org2MSP", "BankA"),
            Err(AccessDenied::ForeignBank { .. })
        ));
    }

    #[test]
    fn bootstrap_needs_known_organization() {
        let policy = policy(false);
        policy.authorize_bootstrap("Org2MSP").unwrap();
        assert_eq!(
            policy.authorize_bootstrap("Intruder").unwrap_err(),
            AccessDenied::UnknownOrganization {
                organization: "Intruder".to_string()
            }
        );
    }
}
