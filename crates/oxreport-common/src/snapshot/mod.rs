//! Snapshot types produced by the reporters.
//!
//! Each type converts to a [`Value`](oxreport_expr::Value) record whose field
//! names are the PascalCase names alert expressions refer to, e.g.
//! `sumUint(Queues, "Messages")` or `findMany(PVs, "UtilizationPercent", 90.0)`.
//! Durations convert to whole seconds.

pub mod connectivity;
pub mod dass;
pub mod imagetag;
pub mod longjobs;
pub mod pod;
pub mod pv;
pub mod rabbitmq;
pub mod resource;
