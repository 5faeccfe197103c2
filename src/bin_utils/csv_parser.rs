use std::io::Read;

use chrono::{DateTime, Utc};
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::Deserialize;

/// One row of an invocation log.
#[derive(Debug, Deserialize)]
pub struct Invocation {
    pub tx: String,
    pub timestamp: DateTime<Utc>,
    pub org: String,
    pub function: String,
    #[serde(default)]
    pub arg1: Option<String>,
    #[serde(default)]
    pub arg2: Option<String>,
    #[serde(default)]
    pub arg3: Option<String>,
}

impl Invocation {
    /// Positional arguments, stopping at the first empty column.
    pub fn args(&self) -> Vec<String> {
        [&self.arg1, &self.arg2, &self.arg3]
            .into_iter()
            .map_while(|arg| arg.clone())
            .collect()
    }
}

/// Parses an invocation log in CSV format, yielding each row with its line
/// number.
pub struct CsvInvocationParser<R> {
    iter: DeserializeRecordsIntoIter<R, Invocation>,
}

impl<R> CsvInvocationParser<R>
where
    R: Read,
{
    /// Reads the header row up front, so that line numbers reported for
    /// records are exact.
    pub fn new(source: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        reader.headers()?;

        Ok(Self {
            iter: reader.into_deserialize(),
        })
    }
}

impl<R> Iterator for CsvInvocationParser<R>
where
    R: Read,
{
    type Item = (u64, Result<Invocation, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
