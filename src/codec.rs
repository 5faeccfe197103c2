use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::Account;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to encode account `{id}`: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Stored account bytes are not a valid record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Stored account record has an empty id")]
    EmptyId,
    #[error("Stored account `{id}` has a negative balance {balance}")]
    NegativeBalance { id: String, balance: Decimal },
    #[error("Stored account `{id}` has a non-canonical balance `{raw}`")]
    NonCanonicalBalance { id: String, raw: String },
}

// Field declaration order is the wire order. Keep it alphabetical by the
// upper-case key names used by every other replica: ID, Balance, Bank.
#[derive(Serialize)]
struct AccountRecordRef<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Balance")]
    balance: Decimal,
    #[serde(rename = "Bank")]
    bank: &'a str,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AccountRecord {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Balance")]
    balance: String,
    #[serde(rename = "Bank")]
    bank: String,
}

/// Canonical byte encoding of an account.
///
/// The balance is normalized first, so `100` and `100.00` produce the same
/// bytes.
pub fn encode(account: &Account) -> Result<Vec<u8>, CodecError> {
    let record = AccountRecordRef {
        id: &account.id,
        balance: account.balance.normalize(),
        bank: &account.bank,
    };
    serde_json::to_vec(&record).map_err(|source| CodecError::Encode {
        id: account.id.clone(),
        source,
    })
}

/// Inverse of [`encode`]. Rejects anything [`encode`] could not have produced
/// for a valid account: the balance must be a string in normalized form.
pub fn decode(bytes: &[u8]) -> Result<Account, CodecError> {
    let record: AccountRecord = serde_json::from_slice(bytes)?;
    if record.id.is_empty() {
        return Err(CodecError::EmptyId);
    }
    let balance = Decimal::from_str(&record.balance)
        .ok()
        .filter(|balance| balance.normalize().to_string() == record.balance);
    let Some(balance) = balance else {
        return Err(CodecError::NonCanonicalBalance {
            id: record.id,
            raw: record.balance,
        });
    };
    if balance < Decimal::ZERO {
        return Err(CodecError::NegativeBalance {
            id: record.id,
            balance,
        });
    }
    Ok(Account {
        id: record.id,
        balance,
        bank: record.bank,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    #[test]
    fn encode_uses_fixed_field_order() {
        let acc = Account::new("a1", Decimal::from_u32(100).unwrap(), "BankA");
        let bytes = encode(&acc).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"ID":"a1","Balance":"100","Bank":"BankA"}"#
        );
        assert_eq!(decode(&bytes).unwrap(), acc);
    }

    #[test]
    fn encode_is_scale_independent() {
        let plain = Account::new("a1", Decimal::from_u32(100).unwrap(), "BankA");
        let scaled = Account {
            bank: "BankA".to_string(),
            balance: Decimal::new(10000, 2),
            id: "a1".to_string(),
        };
        assert_eq!(encode(&plain).unwrap(), encode(&scaled).unwrap());

        let fractional = Account::new("a2", Decimal::new(1250, 3), "BankB");
        let bytes = encode(&fractional).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"ID":"a2","Balance":"1.25","Bank":"BankB"}"#
        );
        assert_eq!(decode(&bytes).unwrap(), fractional);
    }

    #[test]
    fn decode_accepts_any_key_order() {
        let acc = decode(br#"{"Bank":"BankA","ID":"a1","Balance":"7.5"}"#).unwrap();
        assert_eq!(acc, Account::new("a1", Decimal::new(75, 1), "BankA"));
    }

    #[test]
    fn decode_rejects_non_canonical_balances() {
        for raw in [
            br#"{"ID":"a1","Balance":"100.00","Bank":"B"}"#.as_slice(),
            br#"{"ID":"a1","Balance":"+5","Bank":"B"}"#,
            br#"{"ID":"a1","Balance":"abc","Bank":"B"}"#,
        ] {
            assert!(matches!(
                decode(raw),
                Err(CodecError::NonCanonicalBalance { .. })
            ));
        }
        // a bare number is not a string at all
        assert!(matches!(
            decode(br#"{"ID":"a1","Balance":1.5,"Bank":"B"}"#),
            Err(CodecError::Decode(_))
        ));
        assert_eq!(
            decode(br#"{"ID":"a1","Balance":"100","Bank":"B"}"#)
                .unwrap()
                .balance,
            Decimal::from(100)
        );
    }

    #[test]
    fn decode_rejects_malformed_records() {
        assert!(matches!(decode(b"not json"), Err(CodecError::Decode(_))));
        assert!(matches!(
            decode(br#"{"ID":"a1","Balance":"1"}"#),
            Err(CodecError::Decode(_))
        ));
        assert!(matches!(
            decode(br#"{"ID":"a1","Balance":"1","Bank":"B","Owner":"x"}"#),
            Err(CodecError::Decode(_))
        ));
        assert!(matches!(
            decode(br#"{"ID":"","Balance":"1","Bank":"B"}"#),
            Err(CodecError::EmptyId)
        ));
        let err = decode(br#"{"ID":"a1","Balance":"-3","Bank":"B"}"#).unwrap_err();
        assert!(matches!(err, CodecError::NegativeBalance { .. }));
        assert_eq!(
            err.to_string(),
            "Stored account `a1` has a negative balance -3"
        );
    }
}
