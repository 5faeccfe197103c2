use std::io::Write;

use csv::Writer;
use serde::Serialize;

use crate::engine::LedgerResponse;

#[derive(Debug, Serialize)]
pub struct InvocationResult {
    pub tx: String,
    pub function: String,
    pub result: String,
}

/// JSON rendering of a response; unit responses render as an empty string.
pub fn render_response(response: &LedgerResponse) -> serde_json::Result<String> {
    match response {
        LedgerResponse::Done => Ok(String::new()),
        other => serde_json::to_string(other),
    }
}

pub fn print_results<W>(
    output: &mut W,
    results: impl Iterator<Item = InvocationResult>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for result in results {
        if let Err(err) = writer.serialize(result) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::account::Account;

    use super::*;

    #[test]
    fn render_responses() {
        assert_eq!(render_response(&LedgerResponse::Done).unwrap(), "");
        assert_eq!(
            render_response(&LedgerResponse::Exists(false)).unwrap(),
            "false"
        );
        assert_eq!(
            render_response(&LedgerResponse::Account(Account::new(
                "a1",
                Decimal::from(3),
                "BankA"
            )))
            .unwrap(),
            r#"{"ID":"a1","Balance":"3","Bank":"BankA"}"#
        );
        assert_eq!(
            render_response(&LedgerResponse::History(Vec::new())).unwrap(),
            "[]"
        );
    }
}
