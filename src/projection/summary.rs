//! Headline figures reduced from a computed daily table

use super::records::DailyCashFlowRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    /// Running balance as of `today` (or the latest earlier record)
    pub current_balance: f64,

    /// Running balance of the last record in the range
    pub projected_end_of_period: f64,

    /// Sum of the income bucket over the whole range
    pub total_income: f64,

    /// Magnitude of all expense buckets summed over the whole range
    pub total_expenses: f64,

    /// `current_balance - starting_balance`
    pub balance_change: f64,
}

/// Reduce `records` to headline figures.
///
/// `today` is passed explicitly so the reduction stays a pure function of its
/// inputs; callers supply the wall-clock date.
pub fn summarize(
    records: &[DailyCashFlowRecord],
    starting_balance: f64,
    today: NaiveDate,
) -> ProjectionSummary {
    if records.is_empty() {
        return ProjectionSummary {
            current_balance: starting_balance,
            projected_end_of_period: starting_balance,
            total_income: 0.0,
            total_expenses: 0.0,
            balance_change: 0.0,
        };
    }

    // Today's balance, else the latest record at or before today, else the
    // starting balance when the whole range is in the future.
    let current_balance = records
        .iter()
        .find(|r| r.date == today)
        .or_else(|| records.iter().filter(|r| r.date <= today).last())
        .map_or(starting_balance, |r| r.running_balance);

    let projected_end_of_period = records
        .last()
        .map_or(starting_balance, |r| r.running_balance);

    let total_income: f64 = records.iter().map(|r| r.income).sum();
    let total_expenses = records
        .iter()
        .map(|r| r.expense_total())
        .sum::<f64>()
        .abs();

    ProjectionSummary {
        current_balance,
        projected_end_of_period,
        total_income,
        total_expenses,
        balance_change: current_balance - starting_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(d: NaiveDate, income: f64, one_off: f64, balance: f64) -> DailyCashFlowRecord {
        DailyCashFlowRecord {
            income,
            one_off,
            net_cash_flow: income - one_off.abs(),
            running_balance: balance,
            ..DailyCashFlowRecord::new(d)
        }
    }

    fn sample() -> Vec<DailyCashFlowRecord> {
        vec![
            record(date(2025, 1, 1), 5000.0, 0.0, 20000.0),
            record(date(2025, 1, 2), 0.0, -300.0, 19700.0),
            record(date(2025, 1, 3), 0.0, 0.0, 19700.0),
        ]
    }

    #[test]
    fn test_empty_records_fall_back_to_starting_balance() {
        let summary = summarize(&[], 1500.0, date(2025, 1, 1));
        assert_relative_eq!(summary.current_balance, 1500.0);
        assert_relative_eq!(summary.projected_end_of_period, 1500.0);
        assert_relative_eq!(summary.total_income, 0.0);
        assert_relative_eq!(summary.total_expenses, 0.0);
        assert_relative_eq!(summary.balance_change, 0.0);
    }

    #[test]
    fn test_current_balance_on_exact_day() {
        let summary = summarize(&sample(), 15000.0, date(2025, 1, 2));
        assert_relative_eq!(summary.current_balance, 19700.0);
        assert_relative_eq!(summary.balance_change, 4700.0);
    }

    #[test]
    fn test_current_balance_uses_latest_past_record() {
        // Today is past the end of the range.
        let summary = summarize(&sample(), 15000.0, date(2025, 2, 15));
        assert_relative_eq!(summary.current_balance, 19700.0);
    }

    #[test]
    fn test_future_range_uses_starting_balance() {
        // The whole range is in the future relative to today.
        let summary = summarize(&sample(), 15000.0, date(2024, 12, 1));
        assert_relative_eq!(summary.current_balance, 15000.0);
        assert_relative_eq!(summary.balance_change, 0.0);
        // Projected end of period still reflects the last record.
        assert_relative_eq!(summary.projected_end_of_period, 19700.0);
    }

    #[test]
    fn test_totals() {
        let summary = summarize(&sample(), 15000.0, date(2025, 1, 3));
        assert_relative_eq!(summary.total_income, 5000.0);
        assert_relative_eq!(summary.total_expenses, 300.0);
    }
}
