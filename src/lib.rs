//! Cash-Flow Planner - projection engine for recurring income/expense rules
//!
//! This library provides:
//! - Declarative recurring/one-time cash-flow rules with multi-phase schedules
//! - Day-by-day projection of bucket totals and a running balance
//! - What-if scenarios composed from base rules, overrides, and scoped rules
//! - Summary statistics over a projected range
//! - The persisted JSON plan-document contract, with legacy migration

pub mod document;
pub mod overrides;
pub mod projection;
pub mod rule;
pub mod scenario;

// Re-export commonly used types
pub use document::{DocumentError, PlanDocument};
pub use overrides::{EffectiveRule, OverridePatch, RuleOverride};
pub use projection::{
    DailyCashFlowRecord, ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionSummary,
};
pub use rule::{Account, Frequency, HistoricalCashFlowEntry, PaymentPhase, Rule, RuleType};
pub use scenario::{compose_rule_set, Scenario, ScenarioRunner};
