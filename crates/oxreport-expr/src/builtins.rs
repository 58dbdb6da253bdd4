//! Operators of the base grammar: logic, comparison, membership, regex
//! matching and arithmetic.

use crate::error::{ExprError, Result};
use crate::language::{Language, OperatorKind};
use crate::value::{Number, Value};
use regex::Regex;
use std::cmp::Ordering;

pub(crate) fn register(language: &mut Language) {
    language
        .operator("??", 11, OperatorKind::Coalesce)
        .operator("||", 20, OperatorKind::Or)
        .operator("&&", 21, OperatorKind::And)
        .infix("==", 40, |l, r| Ok(Value::Bool(l == r)))
        .infix("!=", 40, |l, r| Ok(Value::Bool(l != r)))
        .infix("<", 40, |l, r| compare(&l, &r).map(|o| Value::Bool(o == Ordering::Less)))
        .infix("<=", 40, |l, r| compare(&l, &r).map(|o| Value::Bool(o != Ordering::Greater)))
        .infix(">", 40, |l, r| compare(&l, &r).map(|o| Value::Bool(o == Ordering::Greater)))
        .infix(">=", 40, |l, r| compare(&l, &r).map(|o| Value::Bool(o != Ordering::Less)))
        .infix("=~", 40, |l, r| matches(&l, &r).map(Value::Bool))
        .infix("!~", 40, |l, r| matches(&l, &r).map(|m| Value::Bool(!m)))
        .infix("in", 40, contains)
        .infix("+", 90, add)
        .infix("-", 90, |l, r| {
            arithmetic(&l, &r, i64::checked_sub, |a, b| a - b)
        })
        .infix("*", 100, |l, r| {
            arithmetic(&l, &r, i64::checked_mul, |a, b| a * b)
        })
        .infix("/", 100, divide)
        .infix("%", 100, remainder)
        .infix("**", 200, |l, r| {
            let (a, b) = numbers(&l, &r)?;
            Ok(Value::from(a.as_f64().powf(b.as_f64())))
        });
}

fn compare(lhs: &Value, rhs: &Value) -> Result<Ordering> {
    let ordering = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            return Err(ExprError::evaluation(format!(
                "cannot compare {} with {}",
                lhs.kind(),
                rhs.kind()
            )));
        }
    };
    ordering.ok_or_else(|| ExprError::evaluation(format!("cannot order {lhs} and {rhs}")))
}

fn matches(lhs: &Value, rhs: &Value) -> Result<bool> {
    let Value::String(subject) = lhs else {
        return Err(ExprError::kind_mismatch(0, "string", lhs.kind()));
    };
    let Value::String(pattern) = rhs else {
        return Err(ExprError::kind_mismatch(1, "string", rhs.kind()));
    };
    let regex = Regex::new(pattern).map_err(|source| ExprError::Regex {
        pattern: pattern.clone(),
        source,
    })?;
    Ok(regex.is_match(subject))
}

fn contains(needle: Value, haystack: Value) -> Result<Value> {
    match haystack {
        Value::List(items) => Ok(Value::Bool(items.contains(&needle))),
        other => Err(ExprError::kind_mismatch(1, "list", other.kind())),
    }
}

fn numbers(lhs: &Value, rhs: &Value) -> Result<(Number, Number)> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        (Value::Number(_), other) => Err(ExprError::kind_mismatch(1, "number", other.kind())),
        (other, _) => Err(ExprError::kind_mismatch(0, "number", other.kind())),
    }
}

/// Integer operands stay integral (as `i64`); anything else is computed in `f64`.
fn arithmetic(
    lhs: &Value,
    rhs: &Value,
    int: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Result<Value> {
    let (a, b) = numbers(lhs, rhs)?;
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => int(x, y)
            .map(Value::from)
            .ok_or_else(|| ExprError::evaluation(format!("integer overflow computing {a} and {b}"))),
        _ => Ok(Value::from(float(a.as_f64(), b.as_f64()))),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (lhs, rhs) => arithmetic(&lhs, &rhs, i64::checked_add, |a, b| a + b),
    }
}

fn divide(lhs: Value, rhs: Value) -> Result<Value> {
    let (a, b) = numbers(&lhs, &rhs)?;
    if b.as_f64() == 0.0 {
        return Err(ExprError::evaluation("division by zero"));
    }
    Ok(Value::from(a.as_f64() / b.as_f64()))
}

fn remainder(lhs: Value, rhs: Value) -> Result<Value> {
    let (_, b) = numbers(&lhs, &rhs)?;
    if b.as_f64() == 0.0 {
        return Err(ExprError::evaluation("division by zero"));
    }
    arithmetic(&lhs, &rhs, i64::checked_rem, |a, b| a % b)
}

#[cfg(test)]
mod tests {
    use crate::value::{Kind, NumericKind, RecordBuilder, Value};
    use crate::{evaluate, ExprError};

    fn eval(source: &str) -> Value {
        let ctx = RecordBuilder::new()
            .field("X", 10u32)
            .field("Y", 20i64)
            .field("Name", "rabbit-0")
            .field("Missing", Value::Null)
            .build();
        evaluate(source, &ctx).unwrap()
    }

    #[test]
    fn arithmetic_keeps_integers_integral() {
        assert_eq!(eval("X + Y * 2"), Value::from(50i64));
        assert_eq!(eval("X + Y").kind(), Kind::Number(NumericKind::I64));
        assert_eq!(eval("Y / 8"), Value::from(2.5f64));
        assert_eq!(eval("Y % 7"), Value::from(6i64));
        assert_eq!(eval("2 ** 10"), Value::from(1024.0f64));
        assert_eq!(eval("X + 0.5").kind(), Kind::Number(NumericKind::F64));
        assert_eq!(eval("-X"), Value::from(-10i64));
    }

    #[test]
    fn comparison_and_logic() {
        assert_eq!(eval("X < Y && Y >= 20"), Value::Bool(true));
        assert_eq!(eval("X == 10.0"), Value::Bool(true));
        assert_eq!(eval("!(X > Y) || false"), Value::Bool(true));
        assert_eq!(eval("\"abc\" < \"abd\""), Value::Bool(true));
        assert_eq!(eval("X > 5 ? \"high\" : \"low\""), Value::from("high"));
    }

    #[test]
    fn logic_short_circuits() {
        // The right operand would fail on a missing field.
        assert_eq!(eval("false && Nope > 1"), Value::Bool(false));
        assert_eq!(eval("true || Nope > 1"), Value::Bool(true));
    }

    #[test]
    fn membership_regex_and_coalesce() {
        assert_eq!(eval("X in [1, 10, 100]"), Value::Bool(true));
        assert_eq!(eval("Name =~ \"^rabbit-[0-9]+$\""), Value::Bool(true));
        assert_eq!(eval("Name !~ \"^kafka\""), Value::Bool(true));
        assert_eq!(eval("Missing ?? \"none\""), Value::from("none"));
        assert_eq!(eval("\"a\" + \"b\""), Value::from("ab"));
    }

    #[test]
    fn selectors() {
        assert_eq!(eval("[1, 2, 3][1]"), Value::from(2i64));
        assert_eq!(eval("@.Name"), Value::from("rabbit-0"));
        assert_eq!(eval("@[\"X\"]"), Value::from(10u32));
    }

    #[test]
    fn evaluation_errors() {
        let ctx = RecordBuilder::new().field("X", 1i32).build();
        assert!(matches!(
            evaluate("X / 0", &ctx).unwrap_err(),
            ExprError::Evaluation(_)
        ));
        assert!(matches!(
            evaluate("X < \"a\"", &ctx).unwrap_err(),
            ExprError::Evaluation(_)
        ));
        assert!(matches!(
            evaluate("X && true", &ctx).unwrap_err(),
            ExprError::KindMismatch { .. }
        ));
        assert!(matches!(
            evaluate("[1][5]", &ctx).unwrap_err(),
            ExprError::Evaluation(_)
        ));
        assert!(matches!(
            evaluate("\"a\" =~ \"(\"", &ctx).unwrap_err(),
            ExprError::Regex { .. }
        ));
        assert!(matches!(
            evaluate("Nope == 1", &ctx).unwrap_err(),
            ExprError::FieldNotFound { .. }
        ));
    }

    #[test]
    fn compile_errors() {
        for source in ["", "X <", "(X", "foo(1)", "has(1)", "X ? 1", "X..Y"] {
            let err = crate::compile(source).unwrap_err();
            assert!(err.is_compile(), "{source:?} should not compile: {err}");
        }
    }

    #[test]
    fn deep_nesting_is_compile_error() {
        let sources = [
            format!("{}true{}", "(".repeat(3_000), ")".repeat(3_000)),
            format!("{}true", "!".repeat(100_000)),
            format!("1{}", " + 1".repeat(100_000)),
            format!("@{}", ".Next".repeat(100_000)),
            format!("true{}", " ? true : false".repeat(10_000)),
        ];
        for source in &sources {
            match crate::compile(source) {
                Err(ExprError::Compile { message, .. }) => {
                    assert_eq!(message, "expression nested too deeply");
                }
                other => panic!("expected compile error, got {other:?}"),
            }
        }
    }

    #[test]
    fn moderate_nesting_still_compiles() {
        let source = format!("{}1{} + 1", "(".repeat(64), ")".repeat(64));
        let sum = crate::compile(&source).unwrap().evaluate(&Value::Null).unwrap();
        assert_eq!(sum, Value::from(2i64));

        let chain = format!("1{}", " + 1".repeat(100));
        let sum = crate::compile(&chain).unwrap().evaluate(&Value::Null).unwrap();
        assert_eq!(sum, Value::from(101i64));
    }
}
