use crate::config::AlertRuleConfig;
use oxreport_common::types::Severity;
use oxreport_expr::{Expression, Language, MessageTemplate};
use std::sync::Arc;

/// A compiled alert: when `trigger` holds for a snapshot, `message` is
/// rendered against the same snapshot and reported with `severity`.
#[derive(Debug, Clone)]
pub struct AlertRule {
    message: MessageTemplate,
    severity: Severity,
    trigger: Expression,
}

impl AlertRule {
    pub fn new(message: MessageTemplate, severity: Severity, trigger: Expression) -> Self {
        Self {
            message,
            severity,
            trigger,
        }
    }

    /// Compiles a configured rule with [`Language::full`].
    pub fn from_config(config: &AlertRuleConfig) -> oxreport_expr::Result<Self> {
        Self::from_config_with(&Language::full(), config)
    }

    /// Compiles the `when` expression and every message span.
    pub fn from_config_with(
        language: &Arc<Language>,
        config: &AlertRuleConfig,
    ) -> oxreport_expr::Result<Self> {
        let trigger = language.compile(config.when.trim())?;
        let message = MessageTemplate::new(&config.message);
        message.validate_with(language)?;
        Ok(Self::new(message, config.severity, trigger))
    }

    pub fn message(&self) -> &MessageTemplate {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn trigger(&self) -> &Expression {
        &self.trigger
    }
}
