use chrono::{DateTime, Utc};
use oxreport_expr::{RecordBuilder, ToValue, Value};
use serde::{Deserialize, Serialize};

/// Pod status of the watched deployments and statefulsets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub deployments: Vec<Workload>,
    #[serde(default)]
    pub statefulsets: Vec<Workload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workload {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub pods: Vec<Pod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pod {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub qos_class: String,
    pub start_time: Option<DateTime<Utc>>,
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
    #[serde(default)]
    pub last_termination_state: String,
}

impl Pod {
    pub fn restarts(&self) -> i64 {
        self.containers.iter().map(|c| i64::from(c.restart_count)).sum()
    }
}

impl ToValue for Metrics {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Timestamp", &self.timestamp)
            .field("Deployments", &self.deployments)
            .field("Statefulsets", &self.statefulsets)
            .build()
    }
}

impl ToValue for Workload {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Namespace", &self.namespace)
            .field("Pods", &self.pods)
            .build()
    }
}

impl ToValue for Pod {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Status", &self.status)
            .field("QOSClass", &self.qos_class)
            .field("StartTime", &self.start_time)
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
            .field("LastTerminationState", &self.last_termination_state)
            .build()
    }
}
