//! Scenario-scoped rule overrides and their resolution
//!
//! An override patches specific fields of a base rule for one scenario
//! without touching the rule itself or any other scenario.

use crate::rule::{Frequency, Rule, RuleId, ScenarioId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable identifier of an override
pub type OverrideId = u64;

/// The patched field set; a present field replaces the rule's value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverridePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
}

/// A scenario-scoped patch to a base rule
///
/// At most one override should exist per (rule, scenario) pair; when that
/// application-level invariant is violated upstream, the first one in
/// declared order wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOverride {
    pub id: OverrideId,
    pub base_rule_id: RuleId,
    pub scenario_id: ScenarioId,
    #[serde(rename = "overrides")]
    pub patch: OverridePatch,
}

/// Pre-override values kept for display alongside an overridden rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalValues {
    pub amount: f64,
    pub effective_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub frequency: Frequency,
}

/// A rule as seen by one scenario, possibly with an override applied
///
/// The marker and snapshot are display metadata; the aggregator only reads
/// `rule`.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveRule {
    pub rule: Rule,
    pub is_overridden: bool,
    pub override_id: Option<OverrideId>,
    pub original_values: Option<OriginalValues>,
}

impl From<Rule> for EffectiveRule {
    fn from(rule: Rule) -> Self {
        Self {
            rule,
            is_overridden: false,
            override_id: None,
            original_values: None,
        }
    }
}

/// Find the override for a (rule, scenario) pair, if any
pub fn find_override<'a>(
    overrides: &'a [RuleOverride],
    rule_id: RuleId,
    scenario_id: ScenarioId,
) -> Option<&'a RuleOverride> {
    overrides
        .iter()
        .find(|o| o.base_rule_id == rule_id && o.scenario_id == scenario_id)
}

/// Produce the effective version of a base rule for one scenario.
///
/// No-op wrap unless an override exists for the pair; otherwise merges only
/// the fields present in the patch onto a copy of the rule and records the
/// pre-override values.
pub fn resolve(rule: &Rule, overrides: &[RuleOverride], scenario_id: ScenarioId) -> EffectiveRule {
    let Some(active) = find_override(overrides, rule.id, scenario_id) else {
        return EffectiveRule::from(rule.clone());
    };

    let original_values = OriginalValues {
        amount: rule.amount,
        effective_date: rule.effective_date,
        end_date: rule.end_date,
        frequency: rule.frequency,
    };

    let mut merged = rule.clone();
    if let Some(amount) = active.patch.amount {
        merged.amount = amount;
    }
    if let Some(effective_date) = active.patch.effective_date {
        merged.effective_date = Some(effective_date);
    }
    if let Some(end_date) = active.patch.end_date {
        merged.end_date = Some(end_date);
    }
    if let Some(frequency) = active.patch.frequency {
        merged.frequency = frequency;
    }

    EffectiveRule {
        rule: merged,
        is_overridden: true,
        override_id: Some(active.id),
        original_values: Some(original_values),
    }
}
