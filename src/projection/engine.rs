//! Daily aggregation engine: drives the matcher across a date range and
//! accumulates bucket totals and a running balance

use super::matcher::occurrence;
use super::records::{Bucket, DailyCashFlowRecord, Origin, ProjectionResult, TransactionDetail};
use crate::overrides::EffectiveRule;
use crate::rule::{Account, HistoricalCashFlowEntry, Rule, RuleType};
use chrono::NaiveDate;

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// First day of the projected range (inclusive)
    pub range_start: NaiveDate,

    /// Last day of the projected range (inclusive)
    pub range_end: NaiveDate,

    /// Known balance at `starting_balance_date`
    pub starting_balance: f64,

    /// Day the running balance starts accumulating; earlier records are
    /// pinned to `starting_balance` verbatim
    pub starting_balance_date: NaiveDate,
}

impl ProjectionConfig {
    pub fn new(
        range_start: NaiveDate,
        range_end: NaiveDate,
        starting_balance: f64,
        starting_balance_date: NaiveDate,
    ) -> Self {
        Self {
            range_start,
            range_end,
            starting_balance,
            starting_balance_date,
        }
    }
}

/// Main projection engine
///
/// Pure and infallible: a projection is a function of the rule set, the
/// historical ledger, and the config, and always yields a complete record
/// sequence for the requested range.
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project every calendar day from `range_start` to `range_end` inclusive
    pub fn project(
        &self,
        rules: &[EffectiveRule],
        historical: &[HistoricalCashFlowEntry],
    ) -> ProjectionResult {
        let mut result = ProjectionResult::new(self.config.starting_balance);
        let mut running_balance = self.config.starting_balance;

        let mut date = self.config.range_start;
        while date <= self.config.range_end {
            let mut record = DailyCashFlowRecord::new(date);

            // Historical entries first, then rule occurrences.
            for entry in historical.iter().filter(|e| e.date == date) {
                apply_historical(entry, &mut record);
            }
            for effective in rules {
                if let Some(occ) = occurrence(&effective.rule, date) {
                    let (bucket, amount) = rule_bucket(&effective.rule, occ.amount);
                    record.add_to_bucket(bucket, amount);
                    record.transactions.push(TransactionDetail {
                        name: effective.rule.name.clone(),
                        amount,
                        bucket,
                        origin: Origin::Rule {
                            rule_id: effective.rule.id,
                        },
                        is_draft: effective.rule.is_draft,
                        phase: occ.phase,
                    });
                }
            }

            // Net CF = income - |A| - |B| - |variable| - |renovation| - |one-off|
            record.net_cash_flow = record.income
                - record.account_a.abs()
                - record.account_b.abs()
                - record.variable.abs()
                - record.renovation.abs()
                - record.one_off.abs();

            if date >= self.config.starting_balance_date {
                running_balance += record.net_cash_flow;
                record.running_balance = running_balance;
            } else {
                record.running_balance = self.config.starting_balance;
            }

            result.add_record(record);

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        result
    }
}

/// Bucket and normalize a historical entry: positive amounts are income,
/// negative amounts go to the entry's account bucket
fn apply_historical(entry: &HistoricalCashFlowEntry, record: &mut DailyCashFlowRecord) {
    let bucket = if entry.amount > 0.0 {
        Bucket::Income
    } else {
        account_bucket(entry.account)
    };
    record.add_to_bucket(bucket, entry.amount);
    record.transactions.push(TransactionDetail {
        name: entry.description.clone(),
        amount: entry.amount,
        bucket,
        origin: Origin::Historical,
        is_draft: false,
        phase: None,
    });
}

/// Bucket assignment and sign normalization by rule type
///
/// Income is forced non-negative, every expense type non-positive. Untyped
/// rules fall back to sign-based bucketing mirroring the cash-expense path.
fn rule_bucket(rule: &Rule, amount: f64) -> (Bucket, f64) {
    match rule.rule_type {
        Some(RuleType::Income) => (Bucket::Income, amount.abs()),
        Some(RuleType::VariableExpense) => (Bucket::Variable, -amount.abs()),
        Some(RuleType::RenovationCost) => (Bucket::Renovation, -amount.abs()),
        Some(RuleType::OneTimeExpense) => (Bucket::OneOff, -amount.abs()),
        Some(RuleType::CashExpense) => (account_bucket(rule.account), -amount.abs()),
        None => {
            if amount > 0.0 {
                (Bucket::Income, amount)
            } else {
                (account_bucket(rule.account), amount)
            }
        }
    }
}

fn account_bucket(account: Account) -> Bucket {
    match account {
        Account::A => Bucket::AccountA,
        Account::B => Bucket::AccountB,
        Account::Other => Bucket::OneOff,
    }
}
