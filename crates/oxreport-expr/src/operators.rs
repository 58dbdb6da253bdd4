//! The `->` access operator and the `|` pipe.
//!
//! Both bind looser than every base operator: `a | b` hands the whole left
//! side to the right side as its context, and `a -> "f"` takes the whole
//! right side as the field name.

use crate::error::{ExprError, Result};
use crate::language::{Language, OperatorKind};
use crate::value::Value;

pub(crate) const PIPE_PRECEDENCE: u8 = 0;
pub(crate) const ACCESS_PRECEDENCE: u8 = 5;

pub(crate) fn register(language: &mut Language) {
    language
        .operator("|", PIPE_PRECEDENCE, OperatorKind::Pipe)
        .infix("->", ACCESS_PRECEDENCE, access);
}

/// Reads field `field` off a record, or off every record of a list.
pub fn access(target: Value, field: Value) -> Result<Value> {
    let Value::String(field) = field else {
        return Err(ExprError::kind_mismatch(1, "string", field.kind()));
    };

    match target {
        Value::Record(mut fields) => fields
            .remove(&field)
            .ok_or_else(|| ExprError::field_not_found(field, "record(arg 0)")),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Record(mut fields) => fields
                    .remove(&field)
                    .ok_or_else(|| ExprError::field_not_found(field.as_str(), "list[](arg 0) -> item")),
                other => Err(ExprError::kind_mismatch(
                    "list[](arg 0) -> item",
                    "record",
                    other.kind(),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        other => Err(ExprError::kind_mismatch(0, "record|list", other.kind())),
    }
}
