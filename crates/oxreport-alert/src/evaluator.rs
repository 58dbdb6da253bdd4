use crate::rule::AlertRule;
use oxreport_common::types::{AlertDocument, FiredAlert, Severity};
use oxreport_expr::{ToValue, Value};
use tracing::Span;

/// Evaluates alert rules against one snapshot at a time.
///
/// Failures are isolated per rule: a rule whose condition or message fails
/// is logged under the evaluator's span and contributes nothing, while the
/// other rules of the batch still fire.
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    span: Span,
}

impl AlertEvaluator {
    /// Uses `span` as the parent of every event the evaluator emits.
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    pub fn for_reporter(reporter: &str) -> Self {
        Self::new(tracing::info_span!("alerts", reporter))
    }

    /// Fired alerts of `rules` against `context`, in rule order.
    pub fn evaluate(&self, rules: &[AlertRule], context: &Value) -> Vec<FiredAlert> {
        let mut fired = Vec::new();

        for rule in rules {
            let when = rule.trigger().source();
            match rule.trigger().evaluate_bool(context) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::error!(
                        parent: &self.span,
                        when,
                        error = %e,
                        "Failed to evaluate alert condition, skipping rule"
                    );
                    continue;
                }
            }

            let message = match rule.message().render(context) {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!(
                        parent: &self.span,
                        when,
                        template = rule.message().as_str(),
                        error = %e,
                        "Failed to render alert message, skipping rule"
                    );
                    continue;
                }
            };

            tracing::debug!(
                parent: &self.span,
                when,
                severity = %rule.severity(),
                rendered = %message,
                "Alert fired"
            );
            fired.push(FiredAlert::new(message, rule.severity()));
        }

        fired
    }

    /// Converts a typed snapshot once and evaluates `rules` against it.
    pub fn evaluate_snapshot<T: ToValue + ?Sized>(
        &self,
        rules: &[AlertRule],
        snapshot: &T,
    ) -> Vec<FiredAlert> {
        self.evaluate(rules, &snapshot.to_value())
    }

    /// Evaluates `rules` and stamps the result with the current time.
    pub fn document(&self, rules: &[AlertRule], context: &Value) -> AlertDocument {
        let doc = AlertDocument::new(self.evaluate(rules, context));
        tracing::info!(
            parent: &self.span,
            rules = rules.len(),
            fired = doc.alerts.len(),
            critical = doc.count(Severity::Critical),
            warning = doc.count(Severity::Warning),
            "Alert evaluation finished"
        );
        doc
    }
}
