use chrono::{DateTime, Utc};
use oxreport_expr::{RecordBuilder, ToValue, Value};
use serde::{Deserialize, Serialize};

/// CPU and memory usage of nodes and containers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub cpu_used_percent: f64,
    #[serde(default)]
    pub mem_used_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Container {
    pub pod_name: String,
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub cpu_limit: f64,
    #[serde(default)]
    pub mem_limit: f64,
    #[serde(default)]
    pub cpu_used: f64,
    #[serde(default)]
    pub mem_used: f64,
    #[serde(default)]
    pub cpu_used_percent: f64,
    #[serde(default)]
    pub mem_used_percent: f64,
}

impl ToValue for Metrics {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Timestamp", &self.timestamp)
            .field("Nodes", &self.nodes)
            .field("Containers", &self.containers)
            .build()
    }
}

impl ToValue for Node {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("CPUUsedPercent", self.cpu_used_percent)
            .field("MemUsedPercent", self.mem_used_percent)
            .build()
    }
}

impl ToValue for Container {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("PodName", &self.pod_name)
            .field("Namespace", &self.namespace)
            .field("Name", &self.name)
            .field("CPULimit", self.cpu_limit)
            .field("MemLimit", self.mem_limit)
            .field("CPUUsed", self.cpu_used)
            .field("MemUsed", self.mem_used)
            .field("CPUUsedPercent", self.cpu_used_percent)
            .field("MemUsedPercent", self.mem_used_percent)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxreport_expr::compile;

    #[test]
    fn busy_nodes_rule() {
        let metrics = Metrics {
            timestamp: Utc::now(),
            nodes: vec![
                Node {
                    name: "worker-1".into(),
                    cpu_used_percent: 97.5,
                    mem_used_percent: 60.0,
                },
                Node {
                    name: "worker-2".into(),
                    cpu_used_percent: 12.0,
                    mem_used_percent: 30.0,
                },
            ],
            containers: Vec::new(),
        };
        let snapshot = metrics.to_value();

        let busy = compile("evalOnEach(Nodes, \"CPUUsedPercent >= 90 || MemUsedPercent >= 90\", \"Name\")")
            .unwrap()
            .evaluate(&snapshot)
            .unwrap();
        assert_eq!(busy, vec!["worker-1"].to_value());
        assert_eq!(
            compile("len(Containers) == 0").unwrap().evaluate(&snapshot).unwrap(),
            Value::Bool(true)
        );
    }
}
