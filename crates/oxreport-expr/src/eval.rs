use crate::error::{ExprError, Result};
use crate::language::Language;
use crate::parser::Node;
use crate::value::{Number, Value};

/// Evaluates a parsed tree against `context`.
pub(crate) fn evaluate(node: &Node, context: &Value, language: &Language) -> Result<Value> {
    match node {
        Node::Literal(value) => Ok(value.clone()),
        Node::Context => Ok(context.clone()),
        Node::Ident(name) => context.field(name).cloned(),
        Node::Field(target, name) => evaluate(target, context, language)?.field(name).cloned(),
        Node::Index(target, index) => {
            let target = evaluate(target, context, language)?;
            let index = evaluate(index, context, language)?;
            select(target, &index)
        }
        Node::List(items) => items
            .iter()
            .map(|item| evaluate(item, context, language))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Node::Call(function, args) => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, context, language))
                .collect::<Result<Vec<_>>>()?;
            (function.call)(language, &args)
        }
        Node::Not(operand) => {
            let value = evaluate(operand, context, language)?;
            Ok(Value::Bool(!boolean(&value, "!")?))
        }
        Node::Negate(operand) => negate(evaluate(operand, context, language)?),
        Node::Binary {
            symbol,
            apply,
            lhs,
            rhs,
        } => {
            let lhs = evaluate(lhs, context, language)?;
            let rhs = evaluate(rhs, context, language)?;
            apply(lhs, rhs).map_err(|e| match e {
                ExprError::Evaluation(message) => {
                    ExprError::Evaluation(format!("operator {symbol:?}: {message}"))
                }
                other => other,
            })
        }
        Node::And(lhs, rhs) => {
            if !boolean(&evaluate(lhs, context, language)?, "&&")? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(boolean(&evaluate(rhs, context, language)?, "&&")?))
        }
        Node::Or(lhs, rhs) => {
            if boolean(&evaluate(lhs, context, language)?, "||")? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(boolean(&evaluate(rhs, context, language)?, "||")?))
        }
        Node::Coalesce(lhs, rhs) => match evaluate(lhs, context, language)? {
            Value::Null => evaluate(rhs, context, language),
            value => Ok(value),
        },
        Node::Ternary {
            condition,
            then,
            otherwise,
        } => {
            if boolean(&evaluate(condition, context, language)?, "?:")? {
                evaluate(then, context, language)
            } else {
                evaluate(otherwise, context, language)
            }
        }
        Node::Pipe(lhs, rhs) => {
            let piped = evaluate(lhs, context, language)?;
            evaluate(rhs, &piped, language)
        }
    }
}

fn boolean(value: &Value, operator: &str) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| ExprError::kind_mismatch(format!("operand of {operator}"), "bool", value.kind()))
}

fn negate(value: Value) -> Result<Value> {
    let Value::Number(n) = value else {
        return Err(ExprError::kind_mismatch("operand of -", "number", value.kind()));
    };
    match n {
        Number::F32(f) => Ok(Value::from(-f)),
        Number::F64(f) => Ok(Value::from(-f)),
        other => other
            .as_i64()
            .and_then(i64::checked_neg)
            .map(Value::from)
            .ok_or_else(|| ExprError::evaluation(format!("cannot negate {other}"))),
    }
}

fn select(target: Value, index: &Value) -> Result<Value> {
    match (target, index) {
        (Value::List(items), Value::Number(n)) => {
            let len = items.len();
            n.as_i64()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| items.into_iter().nth(i))
                .ok_or_else(|| ExprError::evaluation(format!("index {n} out of range for list of length {len}")))
        }
        (Value::List(_), other) => Err(ExprError::kind_mismatch("index", "integer", other.kind())),
        (record @ Value::Record(_), Value::String(name)) => record.field(name).cloned(),
        (Value::Record(_), other) => Err(ExprError::kind_mismatch("index", "string", other.kind())),
        (other, _) => Err(ExprError::kind_mismatch("indexed value", "list|record", other.kind())),
    }
}
