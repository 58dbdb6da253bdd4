//! Alert expression and message-template engine.
//!
//! Expressions are compiled once against a [`Language`] and evaluated against
//! a snapshot [`Value`] whose shape is only known at runtime. Every operation
//! checks the kinds it is given and fails with an [`ExprError`] instead of
//! coercing.
//!
//! ```
//! use oxreport_expr::{compile, MessageTemplate, RecordBuilder};
//!
//! let snapshot = RecordBuilder::new()
//!     .field("Queues", vec![
//!         RecordBuilder::new().field("Name", "orders").field("Messages", 1200u64).build(),
//!         RecordBuilder::new().field("Name", "audit").field("Messages", 3u64).build(),
//!     ])
//!     .build();
//!
//! let when = compile("sumUint64(Queues, \"Messages\") > 1000").unwrap();
//! assert!(when.evaluate_bool(&snapshot).unwrap());
//!
//! let message = MessageTemplate::new("backlog on `Queues -> \"Name\"`");
//! assert_eq!(message.render(&snapshot).unwrap(), "backlog on orders, audit");
//! ```

mod builtins;
mod error;
mod eval;
pub mod functions;
mod language;
mod lexer;
pub mod operators;
mod parser;
mod template;
mod value;

pub use error::{ExprError, Result};
pub use language::{compile, evaluate, Expression, FunctionDef, Language, NativeFn};
pub use template::MessageTemplate;
pub use value::{Kind, Number, NumericKind, Record, RecordBuilder, ToValue, Value};
