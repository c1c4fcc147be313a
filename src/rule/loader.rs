//! Load historical cash-flow entries from CSV

use super::{Account, HistoricalCashFlowEntry};
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row: Date,Description,Amount,Category,Account
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "Account", default)]
    account: String,
}

impl CsvRow {
    fn to_entry(self, id: u64) -> HistoricalCashFlowEntry {
        HistoricalCashFlowEntry {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            category: self.category,
            account: Account::parse(&self.account),
        }
    }
}

/// Load all historical entries from a CSV file
pub fn load_historical_entries<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<HistoricalCashFlowEntry>, Box<dyn Error>> {
    let reader = Reader::from_path(path)?;
    collect_entries(reader)
}

/// Load historical entries from any reader (e.g., string buffer, network stream)
pub fn load_historical_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<HistoricalCashFlowEntry>, Box<dyn Error>> {
    collect_entries(Reader::from_reader(reader))
}

fn collect_entries<R: std::io::Read>(
    mut reader: Reader<R>,
) -> Result<Vec<HistoricalCashFlowEntry>, Box<dyn Error>> {
    let mut entries = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        entries.push(row.to_entry(idx as u64 + 1));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_reader() {
        let csv = "\
Date,Description,Amount,Category,Account
2025-01-03,Paycheck,2500.00,Salary,A
2025-01-05,Groceries,-120.50,Food,B
2025-01-07,Cash withdrawal,-60.00,Misc,
";
        let entries = load_historical_from_reader(csv.as_bytes()).expect("parse failed");
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].id, 1);
        assert_eq!(entries[0].description, "Paycheck");
        assert_eq!(entries[0].amount, 2500.0);
        assert_eq!(entries[0].account, Account::A);

        assert_eq!(entries[1].account, Account::B);
        assert_eq!(entries[2].account, Account::Other);
    }

    #[test]
    fn test_bad_amount_is_an_error() {
        let csv = "\
Date,Description,Amount,Category,Account
2025-01-03,Paycheck,not-a-number,Salary,A
";
        assert!(load_historical_from_reader(csv.as_bytes()).is_err());
    }
}
