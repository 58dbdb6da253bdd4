use chrono::{DateTime, Utc};
use oxreport_expr::{RecordBuilder, ToValue, Value};
use serde::{Deserialize, Serialize};

/// RabbitMQ metrics included in a report. Field names on the wire follow the
/// management API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_cluster_up: bool,
    #[serde(default)]
    pub overview: Overview,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub queues: Vec<Queue>,
    #[serde(default)]
    pub consumers: Vec<Consumer>,
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overview {
    #[serde(rename = "rabbitmq_version", default)]
    pub version: String,
    #[serde(default)]
    pub queue_totals: QueueTotals,
    #[serde(default)]
    pub object_totals: ObjectTotals,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueTotals {
    #[serde(default)]
    pub messages: u64,
    #[serde(rename = "messages_ready", default)]
    pub ready_messages: u64,
    #[serde(rename = "messages_unacknowledged", default)]
    pub unacknowledged_messages: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectTotals {
    #[serde(default)]
    pub channels: u64,
    #[serde(default)]
    pub connections: u64,
    #[serde(default)]
    pub consumers: u64,
    #[serde(default)]
    pub exchanges: u64,
    #[serde(default)]
    pub queues: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub running: bool,
    #[serde(rename = "processors", default)]
    pub cpu_count: u64,
    #[serde(default)]
    pub mem_used: f64,
    #[serde(rename = "disk_free", default)]
    pub free_disk: f64,
    #[serde(default)]
    pub proc_used: u64,
    #[serde(default)]
    pub sockets_used: u64,
    #[serde(default)]
    pub fd_used: u64,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub enabled_plugins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Queue {
    pub name: String,
    #[serde(default)]
    pub durable: bool,
    #[serde(default)]
    pub messages: u64,
    #[serde(rename = "messages_unacknowledged", default)]
    pub unacknowledged_messages: u64,
    #[serde(rename = "messages_ready", default)]
    pub ready_messages: u64,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(default)]
    pub active: bool,
    #[serde(rename = "consumer_tag", default)]
    pub tag: String,
    #[serde(default)]
    pub prefetch_count: u64,
    /// Name of the queue consumed from.
    #[serde(default)]
    pub queue: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exchange {
    pub name: String,
    #[serde(default)]
    pub durable: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ToValue for Metrics {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Timestamp", &self.timestamp)
            .field("IsClusterUp", self.is_cluster_up)
            .field("Overview", &self.overview)
            .field("Nodes", &self.nodes)
            .field("Queues", &self.queues)
            .field("Consumers", &self.consumers)
            .field("Exchanges", &self.exchanges)
            .build()
    }
}

impl ToValue for Overview {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Version", &self.version)
            .field("QueueTotals", &self.queue_totals)
            .field("ObjectTotals", &self.object_totals)
            .build()
    }
}

impl ToValue for QueueTotals {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Messages", self.messages)
            .field("ReadyMessages", self.ready_messages)
            .field("UnacknowledgedMessages", self.unacknowledged_messages)
            .build()
    }
}

impl ToValue for ObjectTotals {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Channels", self.channels)
            .field("Connections", self.connections)
            .field("Consumers", self.consumers)
            .field("Exchanges", self.exchanges)
            .field("Queues", self.queues)
            .build()
    }
}

impl ToValue for Node {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Running", self.running)
            .field("CPUCount", self.cpu_count)
            .field("MemUsed", self.mem_used)
            .field("FreeDisk", self.free_disk)
            .field("ProcUsed", self.proc_used)
            .field("SocketsUsed", self.sockets_used)
            .field("FDUsed", self.fd_used)
            .field("Uptime", self.uptime)
            .field("EnabledPlugins", &self.enabled_plugins)
            .build()
    }
}

impl ToValue for Queue {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Durable", self.durable)
            .field("Messages", self.messages)
            .field("UnacknowledgedMessages", self.unacknowledged_messages)
            .field("ReadyMessages", self.ready_messages)
            .field("State", &self.state)
            .build()
    }
}

impl ToValue for Consumer {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Active", self.active)
            .field("Tag", &self.tag)
            .field("PrefetchCount", self.prefetch_count)
            .field("Queue", RecordBuilder::new().field("Name", &self.queue).build())
            .build()
    }
}

impl ToValue for Exchange {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Durable", self.durable)
            .field("Type", &self.kind)
            .build()
    }
}
