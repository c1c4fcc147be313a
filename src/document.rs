//! The persisted plan document: the JSON contract shared with the
//! persistence/export collaborators
//!
//! Loading always goes through a lenient raw layer that performs the one-time
//! legacy migrations (single `scenarioId` to `scenarioIds`, display-label
//! types, string amounts) before the engine ever sees the data. Saving writes
//! the canonical typed shape; re-importing a saved document reproduces an
//! identical projection.

use crate::overrides::{OverrideId, OverridePatch, RuleOverride};
use crate::rule::{
    Account, Frequency, HistoricalCashFlowEntry, PaymentPhase, Rule, RuleId, RuleType, ScenarioId,
};
use crate::scenario::Scenario;
use chrono::{Local, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors surfaced by document IO; the projection engine itself never fails
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid plan document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A user's complete planning state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    pub starting_balance: f64,
    pub starting_balance_date: NaiveDate,
    pub scenarios: Vec<Scenario>,
    pub recurring_rules: Vec<Rule>,
    pub rule_overrides: Vec<RuleOverride>,
    pub historical_cash_flows: Vec<HistoricalCashFlowEntry>,
}

impl PlanDocument {
    /// Parse a document from JSON, migrating legacy shapes as needed
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let raw: RawDocument = serde_json::from_str(json)?;
        Ok(raw.migrate())
    }

    /// Load and migrate a document from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialize the document in its canonical shape
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| DocumentError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// The baseline scenario, if the document has one
    pub fn base_scenario(&self) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.is_baseline)
    }

    /// Look up a scenario by id
    pub fn scenario(&self, id: ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}

fn default_true() -> bool {
    true
}

/// Amount field that may arrive as a number or a string (form inputs)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    /// Parse to a float; unparseable text becomes NaN so the matcher can
    /// treat the contribution as malformed
    fn to_f64(&self) -> f64 {
        match self {
            RawAmount::Number(v) => *v,
            RawAmount::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }

    /// Parse to a float, falling back to zero for unparseable text
    fn to_f64_or_zero(&self) -> f64 {
        let v = self.to_f64();
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }
}

/// Frequency field that may arrive as a legacy label or the canonical enum
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFrequency {
    Name(String),
    Typed(Frequency),
}

fn frequency_from_raw(raw: Option<RawFrequency>, interval_days: Option<u32>) -> Frequency {
    match raw {
        Some(RawFrequency::Typed(frequency)) => frequency,
        Some(RawFrequency::Name(name)) => {
            let key: String = name
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();
            match key.as_str() {
                "onetime" => Frequency::OneTime,
                "weekly" => Frequency::Weekly,
                "biweekly" => Frequency::BiWeekly,
                "monthly" => Frequency::Monthly,
                // "Custom" and anything unrecognized: an interval rule, inert
                // when no interval was stored.
                _ => custom_interval(interval_days),
            }
        }
        None => custom_interval(interval_days),
    }
}

fn custom_interval(interval_days: Option<u32>) -> Frequency {
    Frequency::CustomInterval {
        interval_days: interval_days.unwrap_or(0),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    starting_balance: f64,
    #[serde(default)]
    starting_balance_date: Option<NaiveDate>,
    #[serde(default)]
    scenarios: Vec<RawScenario>,
    #[serde(default)]
    recurring_rules: Vec<RawRule>,
    #[serde(default)]
    rule_overrides: Vec<RawOverride>,
    #[serde(default)]
    historical_cash_flows: Vec<RawHistorical>,
}

impl RawDocument {
    fn migrate(self) -> PlanDocument {
        let starting_balance_date = self.starting_balance_date.unwrap_or_else(|| {
            let today = Local::now().date_naive();
            warn!("document has no startingBalanceDate, defaulting to {today}");
            today
        });

        let legacy_scoped = self
            .recurring_rules
            .iter()
            .filter(|r| r.scenario_ids.is_none() && r.scenario_id.is_some())
            .count();
        if legacy_scoped > 0 {
            info!("migrating {legacy_scoped} rule(s) from scenarioId to scenarioIds");
        }

        PlanDocument {
            starting_balance: self.starting_balance,
            starting_balance_date,
            scenarios: self.scenarios.into_iter().map(RawScenario::migrate).collect(),
            recurring_rules: self.recurring_rules.into_iter().map(RawRule::migrate).collect(),
            rule_overrides: self.rule_overrides.into_iter().map(RawOverride::migrate).collect(),
            historical_cash_flows: self
                .historical_cash_flows
                .into_iter()
                .map(RawHistorical::migrate)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScenario {
    id: ScenarioId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_baseline: bool,
}

impl RawScenario {
    fn migrate(self) -> Scenario {
        Scenario {
            id: self.id,
            name: self.name,
            is_baseline: self.is_baseline,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    id: RuleId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: Option<RawAmount>,
    #[serde(rename = "type", default)]
    rule_type: Option<String>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    frequency: Option<RawFrequency>,
    #[serde(default)]
    interval_days: Option<u32>,
    #[serde(default)]
    impact_date: Option<NaiveDate>,
    #[serde(default)]
    effective_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    payment_schedule: Vec<RawPhase>,
    #[serde(default = "default_true", alias = "include")]
    included: bool,
    #[serde(default)]
    is_draft: bool,
    /// Legacy single-scenario scoping, folded into `scenario_ids`
    #[serde(default)]
    scenario_id: Option<ScenarioId>,
    #[serde(default)]
    scenario_ids: Option<Vec<ScenarioId>>,
    #[serde(default)]
    excluded_from_scenarios: Vec<ScenarioId>,
}

impl RawRule {
    fn migrate(self) -> Rule {
        let scenario_ids: BTreeSet<ScenarioId> = match self.scenario_ids {
            Some(ids) => ids.into_iter().collect(),
            None => self.scenario_id.into_iter().collect(),
        };

        Rule {
            id: self.id,
            name: self.name,
            description: self.description,
            amount: self.amount.map_or(0.0, |a| a.to_f64_or_zero()),
            rule_type: self.rule_type.as_deref().and_then(RuleType::parse),
            account: self.account.as_deref().map(Account::parse).unwrap_or_default(),
            frequency: frequency_from_raw(self.frequency, self.interval_days),
            impact_date: self.impact_date,
            effective_date: self.effective_date,
            end_date: self.end_date,
            payment_schedule: self.payment_schedule.into_iter().map(RawPhase::migrate).collect(),
            included: self.included,
            is_draft: self.is_draft,
            scenario_ids,
            excluded_from_scenarios: self.excluded_from_scenarios.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPhase {
    /// May be a string or missing; non-numeric values become NaN and the
    /// matcher skips the phase
    #[serde(default)]
    amount: Option<RawAmount>,
    start_date: NaiveDate,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    description: String,
}

impl RawPhase {
    fn migrate(self) -> PaymentPhase {
        PaymentPhase {
            amount: self.amount.map_or(f64::NAN, |a| a.to_f64()),
            start_date: self.start_date,
            end_date: self.end_date,
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverride {
    #[serde(default)]
    id: OverrideId,
    base_rule_id: RuleId,
    scenario_id: ScenarioId,
    #[serde(default)]
    overrides: RawPatch,
}

impl RawOverride {
    fn migrate(self) -> RuleOverride {
        RuleOverride {
            id: self.id,
            base_rule_id: self.base_rule_id,
            scenario_id: self.scenario_id,
            patch: self.overrides.migrate(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPatch {
    #[serde(default)]
    amount: Option<RawAmount>,
    #[serde(default)]
    effective_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    frequency: Option<RawFrequency>,
    #[serde(default)]
    interval_days: Option<u32>,
}

impl RawPatch {
    fn migrate(self) -> OverridePatch {
        let frequency = self
            .frequency
            .map(|f| frequency_from_raw(Some(f), self.interval_days));
        OverridePatch {
            amount: self.amount.map(|a| a.to_f64_or_zero()),
            effective_date: self.effective_date,
            end_date: self.end_date,
            frequency,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHistorical {
    #[serde(default)]
    id: u64,
    date: NaiveDate,
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: Option<RawAmount>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    account: Option<String>,
}

impl RawHistorical {
    fn migrate(self) -> HistoricalCashFlowEntry {
        HistoricalCashFlowEntry {
            id: self.id,
            date: self.date,
            description: self.description,
            amount: self.amount.map_or(0.0, |a| a.to_f64_or_zero()),
            category: self.category,
            account: self.account.as_deref().map(Account::parse).unwrap_or_default(),
        }
    }
}
