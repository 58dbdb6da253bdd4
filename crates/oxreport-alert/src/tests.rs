use crate::config::AlertRuleConfig;
use crate::evaluator::AlertEvaluator;
use crate::rule::AlertRule;
use oxreport_common::snapshot::rabbitmq;
use oxreport_common::types::{FiredAlert, Severity};
use oxreport_expr::{compile, MessageTemplate, RecordBuilder, Value};
use std::io;
use std::sync::{Arc, Mutex};

fn rule(message: &str, severity: Severity, when: &str) -> AlertRule {
    AlertRule::from_config(&AlertRuleConfig {
        message: message.into(),
        severity,
        when: when.into(),
    })
    .unwrap()
}

fn bar(value: i64) -> Value {
    RecordBuilder::new().field("Bar", value).build()
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Runs `f` with a subscriber that records every event as text.
fn with_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, captured.text())
}

#[test]
fn rule_fires_only_when_condition_holds() {
    let rules = vec![rule("Bar is `Bar`", Severity::Warning, "Bar > 100")];
    let evaluator = AlertEvaluator::for_reporter("test");

    assert!(evaluator.evaluate(&rules, &bar(50)).is_empty());
    assert_eq!(
        evaluator.evaluate(&rules, &bar(150)),
        vec![FiredAlert::new("Bar is 150", Severity::Warning)]
    );
}

#[test]
fn failing_condition_skips_only_that_rule() {
    let rules = vec![
        rule("first", Severity::Info, "Bar > 1"),
        rule("broken", Severity::Critical, "Missing > 1"),
        rule("third", Severity::Critical, "Bar < 1000"),
    ];

    let (fired, logs) = with_logs(|| {
        AlertEvaluator::for_reporter("rabbitmq").evaluate(&rules, &bar(10))
    });

    assert_eq!(
        fired,
        vec![
            FiredAlert::new("first", Severity::Info),
            FiredAlert::new("third", Severity::Critical),
        ]
    );
    assert!(logs.contains("Failed to evaluate alert condition"), "{logs}");
    assert!(logs.contains("Missing > 1"), "{logs}");
    assert!(logs.contains("rabbitmq"), "{logs}");
}

#[test]
fn non_boolean_condition_is_skipped() {
    let rules = vec![
        rule("number", Severity::Info, "Bar + 1"),
        rule("ok", Severity::Info, "true"),
    ];
    let fired = AlertEvaluator::for_reporter("test").evaluate(&rules, &bar(1));
    assert_eq!(fired, vec![FiredAlert::new("ok", Severity::Info)]);
}

#[test]
fn failing_message_skips_only_that_rule() {
    let rules = vec![
        rule("value `Nope`", Severity::Critical, "Bar > 1"),
        rule("value `Bar`", Severity::Warning, "Bar > 1"),
    ];

    let (fired, logs) = with_logs(|| AlertEvaluator::for_reporter("pv").evaluate(&rules, &bar(5)));

    assert_eq!(fired, vec![FiredAlert::new("value 5", Severity::Warning)]);
    assert!(logs.contains("Failed to render alert message"), "{logs}");
    assert!(logs.contains("Alert fired"), "{logs}");
}

#[test]
fn output_follows_rule_order() {
    let severities = [Severity::Critical, Severity::Info, Severity::Warning, Severity::Info];
    let rules: Vec<_> = severities
        .iter()
        .enumerate()
        .map(|(i, sev)| rule(&format!("rule {i}"), *sev, "Bar >= 0"))
        .collect();

    let fired = AlertEvaluator::for_reporter("test").evaluate(&rules, &bar(0));
    let messages: Vec<_> = fired.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(messages, vec!["rule 0", "rule 1", "rule 2", "rule 3"]);
    assert_eq!(
        fired.iter().map(|a| a.severity).collect::<Vec<_>>(),
        severities.to_vec()
    );
}

#[test]
fn evaluator_uses_the_given_span() {
    let rules = vec![rule("m", Severity::Info, "Nope")];
    let (_, logs) = with_logs(|| {
        let span = tracing::info_span!("cycle", job = "nightly-report");
        AlertEvaluator::new(span).evaluate(&rules, &bar(1))
    });
    assert!(logs.contains("nightly-report"), "{logs}");
}

#[test]
fn typed_snapshot_and_document() {
    let metrics = rabbitmq::Metrics {
        is_cluster_up: false,
        queues: vec![rabbitmq::Queue {
            name: "orders".into(),
            messages: 5000,
            ..rabbitmq::Queue::default()
        }],
        ..rabbitmq::Metrics::default()
    };
    let rules = vec![
        rule("cluster is down", Severity::Critical, "!IsClusterUp"),
        rule(
            "backlog on `evalOnEach(Queues, \"Messages > 1000\", \"Name\")`",
            Severity::Warning,
            "sumUint64(Queues, \"Messages\") > 1000",
        ),
    ];
    let evaluator = AlertEvaluator::for_reporter("rabbitmq");

    let fired = evaluator.evaluate_snapshot(&rules, &metrics);
    assert_eq!(fired.len(), 2);
    assert_eq!(fired[1].message, "backlog on orders");

    let (doc, logs) = with_logs(|| {
        AlertEvaluator::for_reporter("rabbitmq").document(&rules, &oxreport_expr::ToValue::to_value(&metrics))
    });
    assert_eq!(doc.alerts, fired);
    assert_eq!(doc.max_severity(), Some(Severity::Critical));
    assert_eq!(doc.count(Severity::Warning), 1);
    assert!(logs.contains("Alert evaluation finished"), "{logs}");
    assert!(logs.contains("critical=1"), "{logs}");
}

#[test]
fn rules_are_shared_across_threads() {
    let rules = Arc::new(vec![AlertRule::new(
        MessageTemplate::new("Bar is `Bar`"),
        Severity::Info,
        compile("Bar % 2 == 0").unwrap(),
    )]);

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let rules = Arc::clone(&rules);
            std::thread::spawn(move || AlertEvaluator::for_reporter("test").evaluate(&rules, &bar(i)))
        })
        .collect();
    let fired: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap().len()).collect();
    assert_eq!(fired, vec![1, 0, 1, 0]);
}
