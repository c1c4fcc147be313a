//! Daily output structures for projections

use crate::rule::RuleId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The bucket a transaction's amount is accumulated into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bucket {
    Income,
    AccountA,
    AccountB,
    Variable,
    Renovation,
    OneOff,
}

/// Where a breakdown entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Produced by a rule occurrence
    Rule { rule_id: RuleId },
    /// Injected verbatim from the historical ledger
    Historical,
}

/// Which phase of a multi-phase rule fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseInfo {
    /// 1-based position in the declared phase order
    pub number: usize,
    /// Total number of phases on the rule
    pub total: usize,
    /// The phase's display description
    pub description: String,
}

/// One contributing transaction in a day's breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    /// Rule name or historical description
    pub name: String,
    /// Signed amount after sign normalization
    pub amount: f64,
    /// Bucket the amount was accumulated into
    pub bucket: Bucket,
    pub origin: Origin,
    /// Draft marker carried from the rule
    pub is_draft: bool,
    /// Present when a phased rule fired
    pub phase: Option<PhaseInfo>,
}

/// One day of projection output
///
/// Records are never mutated once the engine emits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCashFlowRecord {
    pub date: NaiveDate,

    // Bucket totals (expense buckets hold non-positive values)
    pub income: f64,
    pub account_a: f64,
    pub account_b: f64,
    pub variable: f64,
    pub renovation: f64,
    pub one_off: f64,

    /// Income minus the magnitudes of every expense bucket
    pub net_cash_flow: f64,

    /// Balance carried day-to-day; pinned to the starting balance before the
    /// starting balance date
    pub running_balance: f64,

    /// Every contributing transaction, in application order
    pub transactions: Vec<TransactionDetail>,
}

impl DailyCashFlowRecord {
    /// Create a zeroed record for one day
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            income: 0.0,
            account_a: 0.0,
            account_b: 0.0,
            variable: 0.0,
            renovation: 0.0,
            one_off: 0.0,
            net_cash_flow: 0.0,
            running_balance: 0.0,
            transactions: Vec::new(),
        }
    }

    /// Accumulate `amount` into `bucket`
    pub fn add_to_bucket(&mut self, bucket: Bucket, amount: f64) {
        match bucket {
            Bucket::Income => self.income += amount,
            Bucket::AccountA => self.account_a += amount,
            Bucket::AccountB => self.account_b += amount,
            Bucket::Variable => self.variable += amount,
            Bucket::Renovation => self.renovation += amount,
            Bucket::OneOff => self.one_off += amount,
        }
    }

    /// Sum of the expense buckets (a non-positive value in normal operation)
    pub fn expense_total(&self) -> f64 {
        self.account_a + self.account_b + self.variable + self.renovation + self.one_off
    }
}

/// Complete projection result: one record per calendar day in range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// Starting balance the projection was seeded with
    pub starting_balance: f64,

    /// Daily records, ordered by date
    pub records: Vec<DailyCashFlowRecord>,
}

impl ProjectionResult {
    pub fn new(starting_balance: f64) -> Self {
        Self {
            starting_balance,
            records: Vec::new(),
        }
    }

    /// Append a daily record
    pub fn add_record(&mut self, record: DailyCashFlowRecord) {
        self.records.push(record);
    }

    /// Reduce the daily table to headline figures as of `today`
    pub fn summary(&self, today: NaiveDate) -> super::ProjectionSummary {
        super::summarize(&self.records, self.starting_balance, today)
    }
}
