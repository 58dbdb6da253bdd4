use chrono::{DateTime, Utc};
use oxreport_expr::{RecordBuilder, ToValue, Value};
use serde::{Deserialize, Serialize};

/// Reachability of the platform's backing services.
///
/// A service whose check is disabled or failed keeps its default, so
/// `Mongodb.Reachable` is `false` for both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub vault: Vault,
    #[serde(default)]
    pub mongodb: Reachability,
    #[serde(default)]
    pub neo4j: Reachability,
    #[serde(default)]
    pub postgres: Reachability,
    #[serde(default)]
    pub redis: Reachability,
    #[serde(default)]
    pub metabase: Health,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vault {
    #[serde(default)]
    pub reachable: bool,
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub sealed: bool,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub cluster_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reachability {
    #[serde(default)]
    pub reachable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub healthy: bool,
}

impl ToValue for Metrics {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Timestamp", &self.timestamp)
            .field("Vault", &self.vault)
            .field("Mongodb", &self.mongodb)
            .field("Neo4j", &self.neo4j)
            .field("Postgres", &self.postgres)
            .field("Redis", &self.redis)
            .field("Metabase", &self.metabase)
            .build()
    }
}

impl ToValue for Vault {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Reachable", self.reachable)
            .field("Initialized", self.initialized)
            .field("Sealed", self.sealed)
            .field("Version", &self.version)
            .field("ClusterName", &self.cluster_name)
            .build()
    }
}

impl ToValue for Reachability {
    fn to_value(&self) -> Value {
        RecordBuilder::new().field("Reachable", self.reachable).build()
    }
}

impl ToValue for Health {
    fn to_value(&self) -> Value {
        RecordBuilder::new().field("Healthy", self.healthy).build()
    }
}
