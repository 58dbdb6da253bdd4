//! Alert rules configured per reporter and evaluated against report snapshots.
//!
//! Rules are compiled once when the configuration loads, so a bad `when`
//! expression or message template is a configuration error rather than a
//! surprise during a report cycle. Evaluation itself is soft: a rule that
//! fails is logged and skipped, and the remaining rules still fire.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod rule;

#[cfg(test)]
mod tests;

pub use config::{AlertConfig, AlertRuleConfig, CompiledAlerts, LogConfig, ReporterConfig};
pub use error::{ConfigError, Result};
pub use evaluator::AlertEvaluator;
pub use rule::AlertRule;
