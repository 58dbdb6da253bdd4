use chrono::{DateTime, Utc};
use oxreport_expr::{RecordBuilder, ToValue, Value};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rollout status of deployments and statefulsets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub deployments: Vec<Resource>,
    #[serde(default)]
    pub statefulsets: Vec<Resource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub age: Duration,
    #[serde(default)]
    pub desired_replicas: i32,
    #[serde(default)]
    pub ready_replicas: i32,
    #[serde(default)]
    pub available_replicas: i32,
    #[serde(default)]
    pub updated_replicas: i32,
    /// Warning events recorded against the resource.
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub is_replica_failure: bool,
    #[serde(default)]
    pub is_available: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
    pub message: String,
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

impl ToValue for Resource {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Namespace", &self.namespace)
            .field("Age", self.age)
            .field("DesiredReplicas", self.desired_replicas)
            .field("ReadyReplicas", self.ready_replicas)
            .field("AvailableReplicas", self.available_replicas)
            .field("UpdatedReplicas", self.updated_replicas)
            .field("Events", &self.events)
            .field("IsReplicaFailure", self.is_replica_failure)
            .field("IsAvailable", self.is_available)
            .build()
    }
}

impl ToValue for Event {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Type", &self.kind)
            .field("Reason", &self.reason)
            .field("Message", &self.message)
            .build()
    }
}
