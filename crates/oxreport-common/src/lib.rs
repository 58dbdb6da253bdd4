//! Types shared by reporters, the alert evaluator and the CLI.

pub mod snapshot;
pub mod types;
