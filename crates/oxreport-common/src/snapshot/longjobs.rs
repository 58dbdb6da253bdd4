use chrono::{DateTime, Utc};
use oxreport_expr::{RecordBuilder, ToValue, Value};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Jobs that have been running longer than `older_than`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub older_than: Duration,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub active_pods: i32,
    #[serde(default)]
    pub failed_pods: i32,
    #[serde(default)]
    pub ready_pods: i32,
    #[serde(default)]
    pub age: Duration,
    #[serde(default)]
    pub pods: Vec<Pod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pod {
    pub name: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub is_init: bool,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub restart_count: i32,
}

impl ToValue for Metrics {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Timestamp", &self.timestamp)
            .field("OlderThan", self.older_than)
            .field("Jobs", &self.jobs)
            .build()
    }
}

impl ToValue for Job {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Namespace", &self.namespace)
            .field("Suspended", self.suspended)
            .field("ActivePods", self.active_pods)
            .field("FailedPods", self.failed_pods)
            .field("ReadyPods", self.ready_pods)
            .field("Age", self.age)
            .field("Pods", &self.pods)
            .build()
    }
}

impl ToValue for Pod {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Phase", &self.phase)
            .field("Reason", &self.reason)
            .field("Containers", &self.containers)
            .build()
    }
}

impl ToValue for Container {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("IsInit", self.is_init)
            .field("Ready", self.ready)
            .field("State", &self.state)
            .field("RestartCount", self.restart_count)
            .build()
    }
}
