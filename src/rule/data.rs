//! Rule data structures matching the persisted plan-document format

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable identifier of a rule
pub type RuleId = u64;

/// Stable identifier of a scenario
pub type ScenarioId = u64;

/// Cash-flow type of a rule; determines bucket and sign normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleType {
    /// Incoming cash; amounts are forced non-negative
    Income,
    /// Recurring cash expense bucketed by account
    CashExpense,
    /// Variable spending (groceries, utilities, ...)
    VariableExpense,
    /// Renovation or moving costs
    RenovationCost,
    /// One-off expense
    OneTimeExpense,
}

impl RuleType {
    /// Parse a type label leniently. Legacy documents carry display labels
    /// ("Variable Expense", "One Time Expenses"); unknown labels map to `None`
    /// and the engine falls back to sign/account-based bucketing.
    pub fn parse(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "income" => Some(RuleType::Income),
            "cashexpense" => Some(RuleType::CashExpense),
            "variableexpense" => Some(RuleType::VariableExpense),
            "renovationcost" | "renovationcosts" | "renovationmovingcost" | "renovationmovingcosts" => {
                Some(RuleType::RenovationCost)
            }
            "onetimeexpense" | "onetimeexpenses" => Some(RuleType::OneTimeExpense),
            _ => None,
        }
    }
}

/// Bank account a cash expense is drawn from
///
/// Only used to pick the expense bucket for `CashExpense` rules and for
/// historical entries; everything else ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Account {
    A,
    B,
    /// Catch-all; expenses land in the one-off bucket
    #[default]
    Other,
}

impl Account {
    /// Parse an account label leniently; unrecognized labels degrade to `Other`
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "A" | "a" => Account::A,
            "B" | "b" => Account::B,
            _ => Account::Other,
        }
    }
}

/// How often a rule fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Fires exactly once, on the rule's impact date
    OneTime,
    /// Every 7 days from the effective date
    Weekly,
    /// Every 14 days from the effective date
    BiWeekly,
    /// On the effective date's day-of-month. Anchor days past the end of a
    /// short month simply never fire that month.
    Monthly,
    /// Every `interval_days` days from the effective date
    CustomInterval {
        #[serde(rename = "intervalDays")]
        interval_days: u32,
    },
}

/// One segment of a multi-phase rule
///
/// Phases may be contiguous or overlapping; when several phases cover the
/// same date, the first one in declared order wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPhase {
    /// Signed amount for this phase; sign is normalized by the parent's type
    pub amount: f64,

    /// First day the phase covers (inclusive)
    pub start_date: NaiveDate,

    /// Last day the phase covers (inclusive); `None` = open-ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Display label ("Year 1 rate", ...)
    #[serde(default)]
    pub description: String,
}

impl PaymentPhase {
    /// Whether this phase's date range contains `date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }
}

/// A recurring or one-time cash-flow definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Unique, stable identifier
    pub id: RuleId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Display description
    #[serde(default)]
    pub description: String,

    /// Signed amount; the engine normalizes the sign from the type
    #[serde(default)]
    pub amount: f64,

    /// Cash-flow type; `None` for untyped legacy rules (the engine infers a
    /// bucket from sign and account)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<RuleType>,

    /// Account for `CashExpense` bucketing
    #[serde(default)]
    pub account: Account,

    /// Recurrence pattern
    pub frequency: Frequency,

    /// The single day a `OneTime` rule fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_date: Option<NaiveDate>,

    /// Anchor date for recurring rules; a recurring rule without one is inert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,

    /// Last day the rule may fire (inclusive); `None` = open-ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Multi-phase schedule; when non-empty it fully supersedes
    /// amount/effective_date/end_date
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_schedule: Vec<PaymentPhase>,

    /// Rules with `included == false` are ignored entirely
    pub included: bool,

    /// Draft marker, carried through to the breakdown for display
    #[serde(default)]
    pub is_draft: bool,

    /// Scenarios this rule is scoped to; empty = base rule, implicitly part
    /// of every scenario
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub scenario_ids: BTreeSet<ScenarioId>,

    /// Scenarios from which an otherwise-base rule is suppressed
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub excluded_from_scenarios: BTreeSet<ScenarioId>,
}

impl Rule {
    /// Create a minimal included rule; remaining fields via struct update
    pub fn new(id: RuleId, name: &str, amount: f64, rule_type: RuleType, frequency: Frequency) -> Self {
        Self {
            id,
            name: name.to_string(),
            amount,
            rule_type: Some(rule_type),
            frequency,
            ..Self::default()
        }
    }

    /// Whether this is a base rule (not scoped to any scenario)
    pub fn is_base(&self) -> bool {
        self.scenario_ids.is_empty()
    }

    /// Whether this rule carries a multi-phase payment schedule
    pub fn is_phased(&self) -> bool {
        !self.payment_schedule.is_empty()
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            amount: 0.0,
            rule_type: None,
            account: Account::Other,
            frequency: Frequency::Monthly,
            impact_date: None,
            effective_date: None,
            end_date: None,
            payment_schedule: Vec::new(),
            included: true,
            is_draft: false,
            scenario_ids: BTreeSet::new(),
            excluded_from_scenarios: BTreeSet::new(),
        }
    }
}

/// An already-realized transaction injected verbatim into the daily table
///
/// Never subject to rule matching; bucketed by sign and account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalCashFlowEntry {
    #[serde(default)]
    pub id: u64,

    /// The day the transaction happened
    pub date: NaiveDate,

    /// Display description
    #[serde(default)]
    pub description: String,

    /// Signed amount as realized; never re-normalized
    pub amount: f64,

    /// Display category
    #[serde(default)]
    pub category: String,

    /// Account the transaction hit; picks the expense bucket for negative
    /// amounts
    #[serde(default)]
    pub account: Account,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rule_type_parse() {
        assert_eq!(RuleType::parse("Income"), Some(RuleType::Income));
        assert_eq!(RuleType::parse("Cash Expense"), Some(RuleType::CashExpense));
        assert_eq!(RuleType::parse("Variable Expense"), Some(RuleType::VariableExpense));
        assert_eq!(RuleType::parse("Renovation/Moving Costs"), Some(RuleType::RenovationCost));
        assert_eq!(RuleType::parse("One Time Expenses"), Some(RuleType::OneTimeExpense));
        assert_eq!(RuleType::parse("OneTimeExpense"), Some(RuleType::OneTimeExpense));
        assert_eq!(RuleType::parse("Groceries"), None);
    }

    #[test]
    fn test_account_parse() {
        assert_eq!(Account::parse("A"), Account::A);
        assert_eq!(Account::parse(" b "), Account::B);
        assert_eq!(Account::parse("Checking"), Account::Other);
        assert_eq!(Account::parse(""), Account::Other);
    }

    #[test]
    fn test_phase_covers() {
        let phase = PaymentPhase {
            amount: 1000.0,
            start_date: date(2025, 1, 1),
            end_date: Some(date(2025, 1, 31)),
            description: String::new(),
        };
        assert!(phase.covers(date(2025, 1, 1)));
        assert!(phase.covers(date(2025, 1, 31)));
        assert!(!phase.covers(date(2024, 12, 31)));
        assert!(!phase.covers(date(2025, 2, 1)));

        let open = PaymentPhase {
            end_date: None,
            ..phase
        };
        assert!(open.covers(date(2030, 6, 15)));
    }

    #[test]
    fn test_rule_defaults() {
        let rule = Rule::new(7, "Salary", 5000.0, RuleType::Income, Frequency::Monthly);
        assert!(rule.included);
        assert!(rule.is_base());
        assert!(!rule.is_phased());
        assert!(!rule.is_draft);
    }
}
