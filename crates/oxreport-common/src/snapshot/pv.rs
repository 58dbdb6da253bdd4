use chrono::{DateTime, Utc};
use oxreport_expr::{RecordBuilder, ToValue, Value};
use serde::{Deserialize, Serialize};

/// Persistent volume usage, keyed by claim and namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub pvs: Vec<Pv>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pv {
    pub pvc: String,
    pub pvc_namespace: String,
    #[serde(default)]
    pub capacity: f64,
    #[serde(default)]
    pub used: f64,
    #[serde(default)]
    pub available: f64,
    #[serde(default)]
    pub utilization_percent: f64,
}

impl Metrics {
    /// Entry for `pvc` in `namespace`, appended if absent.
    ///
    /// Usage series arrive one metric at a time, so each claim is filled in
    /// over several calls.
    pub fn entry(&mut self, pvc: &str, namespace: &str) -> &mut Pv {
        let idx = match self
            .pvs
            .iter()
            .position(|pv| pv.pvc == pvc && pv.pvc_namespace == namespace)
        {
            Some(idx) => idx,
            None => {
                self.pvs.push(Pv {
                    pvc: pvc.to_string(),
                    pvc_namespace: namespace.to_string(),
                    ..Pv::default()
                });
                self.pvs.len() - 1
            }
        };
        &mut self.pvs[idx]
    }
}

impl ToValue for Metrics {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Timestamp", &self.timestamp)
            .field("PVs", &self.pvs)
            .build()
    }
}

impl ToValue for Pv {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("PVC", &self.pvc)
            .field("PVCNamespace", &self.pvc_namespace)
            .field("Capacity", self.capacity)
            .field("Used", self.used)
            .field("Available", self.available)
            .field("UtilizationPercent", self.utilization_percent)
            .build()
    }
}
