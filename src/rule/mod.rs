//! Cash-flow rules: recurring/one-time definitions and historical entries

mod data;
pub mod loader;

pub use data::{
    Account, Frequency, HistoricalCashFlowEntry, PaymentPhase, Rule, RuleId, RuleType, ScenarioId,
};
pub use loader::{load_historical_entries, load_historical_from_reader};
