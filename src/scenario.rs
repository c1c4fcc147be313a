//! Scenarios: named what-if variants and the composition of their rule sets
//!
//! A scenario sees every included base rule (minus explicit exclusions, plus
//! its overrides) followed by the rules scoped to it alone. The baseline
//! scenario is exactly the base rule set with no overrides applied.

use crate::document::PlanDocument;
use crate::overrides::{resolve, EffectiveRule, RuleOverride};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use crate::rule::{Rule, ScenarioId};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A named what-if variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: ScenarioId,

    pub name: String,

    /// Exactly one scenario is the baseline; it projects the base rule set
    /// verbatim and is never subject to overrides
    #[serde(default)]
    pub is_baseline: bool,
}

impl Scenario {
    pub fn new(id: ScenarioId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_baseline: false,
        }
    }

    pub fn baseline(id: ScenarioId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_baseline: true,
        }
    }
}

/// Build the effective rule set a scenario feeds to the aggregator.
///
/// Order is base rules first (overridden for non-baseline scenarios), then
/// scenario-only rules; order affects only the breakdown display, never the
/// totals.
pub fn compose_rule_set(
    all_rules: &[Rule],
    overrides: &[RuleOverride],
    scenario: &Scenario,
) -> Vec<EffectiveRule> {
    let base_scope = all_rules
        .iter()
        .filter(|r| r.is_base() && r.included && !r.excluded_from_scenarios.contains(&scenario.id));

    if scenario.is_baseline {
        return base_scope.cloned().map(EffectiveRule::from).collect();
    }

    let mut rule_set: Vec<EffectiveRule> = base_scope
        .map(|r| resolve(r, overrides, scenario.id))
        .collect();

    rule_set.extend(
        all_rules
            .iter()
            .filter(|r| r.scenario_ids.contains(&scenario.id) && r.included)
            .cloned()
            .map(EffectiveRule::from),
    );

    rule_set
}

/// Pre-assembled snapshot for projecting one document across its scenarios
///
/// Holds the immutable plan document plus the projection config; each `run_*`
/// call is a pure function of that snapshot, so scenarios can be projected in
/// parallel.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    document: PlanDocument,
    config: ProjectionConfig,
}

impl ScenarioRunner {
    /// Create a runner over `[range_start, range_end]`, taking the starting
    /// balance and its date from the document
    pub fn new(document: PlanDocument, range_start: NaiveDate, range_end: NaiveDate) -> Self {
        let config = ProjectionConfig::new(
            range_start,
            range_end,
            document.starting_balance,
            document.starting_balance_date,
        );
        Self { document, config }
    }

    /// Create a runner with an explicit projection config
    pub fn with_config(document: PlanDocument, config: ProjectionConfig) -> Self {
        Self { document, config }
    }

    pub fn document(&self) -> &PlanDocument {
        &self.document
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a single scenario
    pub fn run(&self, scenario: &Scenario) -> ProjectionResult {
        let rule_set = compose_rule_set(
            &self.document.recurring_rules,
            &self.document.rule_overrides,
            scenario,
        );
        let engine = ProjectionEngine::new(self.config.clone());
        engine.project(&rule_set, &self.document.historical_cash_flows)
    }

    /// Project the scenario with the given id, if the document has it
    pub fn run_by_id(&self, scenario_id: ScenarioId) -> Option<ProjectionResult> {
        self.document
            .scenarios
            .iter()
            .find(|s| s.id == scenario_id)
            .map(|s| self.run(s))
    }

    /// Project the baseline scenario, if the document has one
    pub fn run_baseline(&self) -> Option<ProjectionResult> {
        self.document.base_scenario().map(|s| self.run(s))
    }

    /// Project every scenario of the document in parallel
    pub fn run_all(&self) -> Vec<(ScenarioId, ProjectionResult)> {
        self.document
            .scenarios
            .par_iter()
            .map(|scenario| (scenario.id, self.run(scenario)))
            .collect()
    }
}
