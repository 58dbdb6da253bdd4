//! Reporting functions registered by [`Language::extended`].
//!
//! Every function validates argument kinds before doing any work and fails
//! with [`ExprError::KindMismatch`] instead of coercing.

use crate::error::{ExprError, Result};
use crate::eval;
use crate::language::Language;
use crate::parser::Node;
use crate::value::{Number, NumericKind, Record, Value};
use regex::Regex;

const ITEM: &str = "list[] -> item";

pub(crate) fn register(language: &mut Language) {
    language
        .function("has", 2, |_, args| {
            let [x, y] = args else { return Err(arity("has", 2, args)) };
            has(x, y).map(Value::Bool)
        })
        .function("len", 1, |_, args| {
            let [x] = args else { return Err(arity("len", 1, args)) };
            len(x).map(|n| Value::from(i64::try_from(n).unwrap_or(i64::MAX)))
        })
        .function("fieldsEq", 3, |_, args| {
            let [list, field, value] = args else { return Err(arity("fieldsEq", 3, args)) };
            fields_eq(list, str_arg(field, 1)?, value).map(Value::Bool)
        })
        .function("findOne", 3, |_, args| find_function(args, FindOpts::ONE))
        .function("findMany", 3, |_, args| find_function(args, FindOpts::MANY))
        .function("findOneRegex", 3, |_, args| find_function(args, FindOpts::ONE_REGEX))
        .function("findManyRegex", 3, |_, args| find_function(args, FindOpts::MANY_REGEX))
        .function("evalOnEach", 3, |language, args| {
            let [list, expr, ret] = args else { return Err(arity("evalOnEach", 3, args)) };
            eval_on_each(language, list, str_arg(expr, 1)?, str_arg(ret, 2)?)
        });

    for (name, kind) in [
        ("sumInt", NumericKind::Isize),
        ("sumInt8", NumericKind::I8),
        ("sumInt16", NumericKind::I16),
        ("sumInt32", NumericKind::I32),
        ("sumInt64", NumericKind::I64),
        ("sumUint", NumericKind::Usize),
        ("sumUint8", NumericKind::U8),
        ("sumUint16", NumericKind::U16),
        ("sumUint32", NumericKind::U32),
        ("sumUint64", NumericKind::U64),
        ("sumFloat32", NumericKind::F32),
        ("sumFloat64", NumericKind::F64),
    ] {
        language.function(name, 2, move |_, args| {
            let [list, field] = args else { return Err(arity(name, 2, args)) };
            sum(list, str_arg(field, 1)?, kind).map(Value::Number)
        });
    }
}

fn arity(name: &str, want: usize, args: &[Value]) -> ExprError {
    ExprError::evaluation(format!(
        "function {name:?} takes {want} argument(s), got {}",
        args.len()
    ))
}

fn str_arg(value: &Value, position: usize) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| ExprError::kind_mismatch(position, "string", value.kind()))
}

fn list_arg(value: &Value) -> Result<&[Value]> {
    value
        .as_list()
        .ok_or_else(|| ExprError::kind_mismatch(0, "list", value.kind()))
}

fn record_item(item: &Value) -> Result<&Record> {
    item.as_record()
        .ok_or_else(|| ExprError::kind_mismatch(ITEM, "record", item.kind()))
}

fn item_field<'a>(record: &'a Record, field: &str) -> Result<&'a Value> {
    record
        .get(field)
        .ok_or_else(|| ExprError::field_not_found(field, "list(arg 0)"))
}

/// Substring containment for strings, deep-equality membership for lists.
pub fn has(x: &Value, y: &Value) -> Result<bool> {
    match x {
        Value::String(haystack) => match y {
            Value::String(needle) => Ok(haystack.contains(needle.as_str())),
            other => Err(ExprError::kind_mismatch(1, "string", other.kind())),
        },
        Value::List(items) => Ok(items.iter().any(|item| item == y)),
        other => Err(ExprError::kind_mismatch(0, "string|list", other.kind())),
    }
}

/// Characters of a string, elements of a list, or fields of a record.
pub fn len(x: &Value) -> Result<usize> {
    match x {
        Value::String(s) => Ok(s.chars().count()),
        Value::List(items) => Ok(items.len()),
        Value::Record(fields) => Ok(fields.len()),
        other => Err(ExprError::kind_mismatch(0, "string|list|record", other.kind())),
    }
}

/// True when every record's `field` deep-equals `value`. Vacuously true for
/// an empty list.
pub fn fields_eq(list: &Value, field: &str, value: &Value) -> Result<bool> {
    for item in list_arg(list)? {
        let record = record_item(item)?;
        if item_field(record, field)? != value {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Options for [`find`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FindOpts {
    /// Stop after the first match and return it (or null).
    pub one: bool,
    /// Treat `value` as a regular expression matched against the field.
    pub regex: bool,
}

impl FindOpts {
    pub const ONE: FindOpts = FindOpts {
        one: true,
        regex: false,
    };
    pub const MANY: FindOpts = FindOpts {
        one: false,
        regex: false,
    };
    pub const ONE_REGEX: FindOpts = FindOpts {
        one: true,
        regex: true,
    };
    pub const MANY_REGEX: FindOpts = FindOpts {
        one: false,
        regex: true,
    };
}

fn find_function(args: &[Value], opts: FindOpts) -> Result<Value> {
    let [list, field, value] = args else { return Err(arity("find", 3, args)) };
    find(list, str_arg(field, 1)?, value, opts)
}

/// Linear scan of a list of records for elements whose `field` matches `value`.
pub fn find(list: &Value, field: &str, value: &Value, opts: FindOpts) -> Result<Value> {
    let mut matches = Vec::new();
    let mut pattern: Option<Regex> = None;

    for item in list_arg(list)? {
        if opts.one && !matches.is_empty() {
            break;
        }
        let record = record_item(item)?;
        let fval = item_field(record, field)?;

        let matched = if opts.regex {
            let Value::String(subject) = fval else {
                return Err(ExprError::kind_mismatch(1, "string", fval.kind()));
            };
            let Value::String(source) = value else {
                return Err(ExprError::kind_mismatch(2, "string", value.kind()));
            };
            let regex = match pattern.take() {
                Some(regex) => regex,
                None => Regex::new(source).map_err(|source_err| ExprError::Regex {
                    pattern: source.clone(),
                    source: source_err,
                })?,
            };
            let matched = regex.is_match(subject);
            pattern = Some(regex);
            matched
        } else {
            fval == value
        };

        if matched {
            matches.push(item.clone());
        }
    }

    if opts.one {
        return Ok(matches.into_iter().next().unwrap_or(Value::Null));
    }
    Ok(Value::List(matches))
}

/// Evaluates `expr` with each record as context and collects `ret` from the
/// records where it holds.
///
/// The sub-expression is compiled once, on the first element, so an empty
/// list never reports a compile error.
pub fn eval_on_each(language: &Language, list: &Value, expr: &str, ret: &str) -> Result<Value> {
    let mut compiled: Option<Node> = None;
    let mut positives = Vec::new();

    for item in list_arg(list)? {
        let record = record_item(item)?;
        if compiled.is_none() {
            let node = language
                .parse(expr.trim())
                .map_err(|e| ExprError::nested(expr, e))?;
            compiled = Some(node);
        }
        let Some(node) = compiled.as_ref() else {
            continue;
        };
        let is_true = match eval::evaluate(node, item, language) {
            Ok(Value::Bool(b)) => b,
            Ok(other) => {
                return Err(ExprError::nested(
                    expr,
                    ExprError::kind_mismatch("result", "bool", other.kind()),
                ));
            }
            Err(e) => return Err(ExprError::nested(expr, e)),
        };
        if !is_true {
            continue;
        }
        positives.push(item_field(record, ret)?.clone());
    }

    Ok(Value::List(positives))
}

/// Sums `field` across records. The field's numeric kind must equal `kind`
/// exactly; there is no widening between widths or families.
pub fn sum(list: &Value, field: &str, kind: NumericKind) -> Result<Number> {
    let mut total = Number::zero(kind);

    for item in list_arg(list)? {
        let record = record_item(item)?;
        let fval = item_field(record, field)?;
        let n = match fval {
            Value::Number(n) if n.kind() == kind => *n,
            other => {
                return Err(ExprError::kind_mismatch(
                    format!("{ITEM} -> {field}(field)"),
                    kind.to_string(),
                    other.kind(),
                ));
            }
        };
        total = total
            .checked_add(n)
            .ok_or_else(|| ExprError::evaluation(format!("overflow summing {kind} field {field:?}")))?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Kind, RecordBuilder, ToValue};

    fn item(foo: &str, bar: i64) -> Value {
        RecordBuilder::new()
            .field("Foo", foo)
            .field("Bar", bar)
            .field("Blah", bar % 2 == 0)
            .build()
    }

    fn items(entries: &[(&str, i64)]) -> Value {
        Value::List(entries.iter().map(|(foo, bar)| item(foo, *bar)).collect())
    }

    #[test]
    fn has_on_strings_and_lists() {
        assert!(has(&"foobar".to_value(), &"bar".to_value()).unwrap());
        assert!(!has(&"foo".to_value(), &"bar".to_value()).unwrap());
        assert!(has(&vec!["foo", "bar"].to_value(), &"bar".to_value()).unwrap());
        assert!(!has(&vec!["foo", "bar"].to_value(), &"blah".to_value()).unwrap());
        assert!(has(&vec![1i32, 2, 3].to_value(), &Value::from(2i64)).unwrap());
        assert!(!has(&vec![1i32, 2, 3].to_value(), &Value::from(0i64)).unwrap());
    }

    #[test]
    fn has_rejects_other_kinds() {
        let err = has(&Value::from(1i64), &Value::from(0i64)).unwrap_err();
        assert!(matches!(err, ExprError::KindMismatch { ref argument, .. } if argument == "0"));

        let err = has(&"foo".to_value(), &Value::from(1i64)).unwrap_err();
        assert!(matches!(err, ExprError::KindMismatch { ref argument, .. } if argument == "1"));
    }

    #[test]
    fn len_counts_elements() {
        assert_eq!(len(&"foobar".to_value()).unwrap(), 6);
        assert_eq!(len(&"".to_value()).unwrap(), 0);
        assert_eq!(len(&"héllo".to_value()).unwrap(), 5);
        assert_eq!(len(&vec!["foo", "bar"].to_value()).unwrap(), 2);
        assert_eq!(len(&Vec::<i32>::new().to_value()).unwrap(), 0);
        assert_eq!(len(&item("a", 1)).unwrap(), 3);
        assert!(len(&Value::from(1i64)).is_err());
        assert!(len(&Value::Bool(true)).is_err());
    }

    #[test]
    fn fields_eq_requires_every_element() {
        let all = items(&[("bar", 10), ("bar", 10), ("bar", 10)]);
        assert!(fields_eq(&all, "Foo", &"bar".to_value()).unwrap());
        assert!(fields_eq(&all, "Bar", &Value::from(10i64)).unwrap());

        let mixed = items(&[("foo", 10), ("bar", 10)]);
        assert!(!fields_eq(&mixed, "Foo", &"bar".to_value()).unwrap());

        assert!(matches!(
            fields_eq(&all, "Boo", &Value::from(10i64)).unwrap_err(),
            ExprError::FieldNotFound { .. }
        ));
    }

    #[test]
    fn fields_eq_empty_and_single() {
        assert!(fields_eq(&Value::List(vec![]), "Anything", &Value::Null).unwrap());

        let single = items(&[("x", 3)]);
        assert_eq!(
            fields_eq(&single, "Bar", &Value::from(3i64)).unwrap(),
            item("x", 3).field("Bar").unwrap() == &Value::from(3i64)
        );
    }

    #[test]
    fn fields_eq_rejects_non_records() {
        let err = fields_eq(&vec![1i32].to_value(), "Foo", &Value::Null).unwrap_err();
        assert!(matches!(err, ExprError::KindMismatch { want, .. } if want == "record"));

        let err = fields_eq(&Value::from("x"), "Foo", &Value::Null).unwrap_err();
        assert!(matches!(err, ExprError::KindMismatch { got: Kind::String, .. }));
    }

    #[test]
    fn find_many_collects_matches() {
        let list = items(&[("foo", 1), ("bar", 2), ("bar", 3)]);
        let found = find(&list, "Foo", &"bar".to_value(), FindOpts::MANY).unwrap();
        assert_eq!(found.as_list().map(<[Value]>::len), Some(2));

        let none = find(&list, "Foo", &"baz".to_value(), FindOpts::MANY).unwrap();
        assert_eq!(none, Value::List(vec![]));

        let empty = find(&Value::List(vec![]), "Foo", &"bar".to_value(), FindOpts::MANY).unwrap();
        assert_eq!(empty, Value::List(vec![]));
    }

    #[test]
    fn find_one_returns_first_match_or_null() {
        let list = items(&[("foo", 1), ("bar", 2), ("bar", 3)]);
        let found = find(&list, "Foo", &"bar".to_value(), FindOpts::ONE).unwrap();
        assert_eq!(found, item("bar", 2));

        let none = find(&list, "Foo", &"baz".to_value(), FindOpts::ONE).unwrap();
        assert!(none.is_null());

        assert!(matches!(
            find(&list, "Boo", &"foo".to_value(), FindOpts::ONE).unwrap_err(),
            ExprError::FieldNotFound { .. }
        ));
    }

    #[test]
    fn find_regex_matches_field_text() {
        let list = items(&[("foobar", 1), ("foobarblah", 2), ("bar", 3)]);
        let found = find(&list, "Foo", &"bar".to_value(), FindOpts::MANY_REGEX).unwrap();
        assert_eq!(found.as_list().map(<[Value]>::len), Some(3));

        let anchored = find(&list, "Foo", &"^bar$".to_value(), FindOpts::ONE_REGEX).unwrap();
        assert_eq!(anchored, item("bar", 3));
    }

    #[test]
    fn find_regex_validates_kinds_and_pattern() {
        let list = items(&[("bar", 10), ("bar", 20)]);
        assert!(matches!(
            find(&list, "Bar", &"foo".to_value(), FindOpts::MANY_REGEX).unwrap_err(),
            ExprError::KindMismatch { ref argument, .. } if argument == "1"
        ));
        assert!(matches!(
            find(&list, "Foo", &Value::from(10i64), FindOpts::MANY_REGEX).unwrap_err(),
            ExprError::KindMismatch { ref argument, .. } if argument == "2"
        ));
        assert!(matches!(
            find(&list, "Foo", &"(".to_value(), FindOpts::ONE_REGEX).unwrap_err(),
            ExprError::Regex { .. }
        ));
    }

    #[test]
    fn eval_on_each_collects_return_field() {
        let language = Language::extended();
        let list = items(&[("a", 1), ("b", 2), ("c", 4)]);
        let got = eval_on_each(&language, &list, "Bar >= 2 && Blah", "Foo").unwrap();
        assert_eq!(got, vec!["b", "c"].to_value());
    }

    #[test]
    fn eval_on_each_propagates_failures() {
        let language = Language::extended();
        let list = items(&[("a", 1)]);

        let err = eval_on_each(&language, &list, "Bar >", "Foo").unwrap_err();
        assert!(err.is_compile());

        let err = eval_on_each(&language, &list, "Nope == 1", "Foo").unwrap_err();
        assert!(matches!(err.root_cause(), ExprError::FieldNotFound { .. }));

        let err = eval_on_each(&language, &list, "Bar", "Foo").unwrap_err();
        assert!(matches!(err.root_cause(), ExprError::KindMismatch { .. }));

        let err = eval_on_each(&language, &list, "Bar == 1", "Nope").unwrap_err();
        assert!(matches!(err, ExprError::FieldNotFound { .. }));

        // Nothing to compile against an empty list.
        assert_eq!(
            eval_on_each(&language, &Value::List(vec![]), "Bar >", "Foo").unwrap(),
            Value::List(vec![])
        );
    }

    #[test]
    fn sum_is_exact_per_kind() {
        let list = Value::List(
            (0..4)
                .map(|_| RecordBuilder::new().field("Messages", 25u64).build())
                .collect(),
        );
        let total = sum(&list, "Messages", NumericKind::U64).unwrap();
        assert_eq!(total.kind(), NumericKind::U64);
        assert_eq!(Value::Number(total), Value::from(100u64));

        let err = sum(&list, "Messages", NumericKind::U32).unwrap_err();
        assert!(matches!(err, ExprError::KindMismatch { got: Kind::Number(NumericKind::U64), .. }));
        assert!(sum(&list, "Missing", NumericKind::U64).is_err());
    }

    struct Queue {
        name: &'static str,
        messages: u64,
    }

    impl ToValue for Queue {
        fn to_value(&self) -> Value {
            RecordBuilder::new()
                .field("Name", self.name)
                .field("Messages", self.messages)
                .build()
        }
    }

    fn queues() -> Vec<Queue> {
        vec![
            Queue { name: "orders", messages: 250 },
            Queue { name: "audit", messages: 3 },
            Queue { name: "mail", messages: 250 },
        ]
    }

    #[test]
    fn boxed_and_shared_elements_behave_like_owned() {
        let owned = RecordBuilder::new().field("Queues", queues()).build();
        let boxed = RecordBuilder::new()
            .field("Queues", queues().into_iter().map(Box::new).collect::<Vec<_>>())
            .build();
        let shared = RecordBuilder::new()
            .field("Queues", queues().into_iter().map(std::sync::Arc::new).collect::<Vec<_>>())
            .build();

        let busy = crate::compile("evalOnEach(Queues, \"Messages > 100\", \"Name\")").unwrap();
        let total = crate::compile("sumUint64(Queues, \"Messages\")").unwrap();
        let first = crate::compile("findOne(Queues, \"Name\", \"audit\") -> \"Messages\"").unwrap();

        for snapshot in [&owned, &boxed, &shared] {
            assert_eq!(busy.evaluate(snapshot).unwrap(), vec!["orders", "mail"].to_value());
            assert_eq!(total.evaluate(snapshot).unwrap(), Value::from(503u64));
            assert_eq!(first.evaluate(snapshot).unwrap(), Value::from(3u64));
        }

        let list = owned.field("Queues").unwrap();
        let matches = find(list, "Name", &"mail".to_value(), FindOpts::MANY).unwrap();
        assert_eq!(
            find(boxed.field("Queues").unwrap(), "Name", &"mail".to_value(), FindOpts::MANY).unwrap(),
            matches
        );
        assert_eq!(len(&matches).unwrap(), 1);
    }

    #[test]
    fn absent_element_is_kind_mismatch() {
        let snapshot = vec![Some(Queue { name: "orders", messages: 1 }), None].to_value();

        let err = find(&snapshot, "Name", &"x".to_value(), FindOpts::MANY).unwrap_err();
        match err {
            ExprError::KindMismatch { argument, want, got } => {
                assert_eq!(argument, ITEM);
                assert_eq!(want, "record");
                assert_eq!(got, Kind::Null);
            }
            other => panic!("expected KindMismatch, got {other}"),
        }
        assert!(matches!(
            sum(&snapshot, "Messages", NumericKind::U64).unwrap_err(),
            ExprError::KindMismatch { got: Kind::Null, .. }
        ));
    }

    #[test]
    fn sum_of_empty_list_is_zero() {
        for kind in [NumericKind::I8, NumericKind::Usize, NumericKind::F64] {
            let total = sum(&Value::List(vec![]), "Any", kind).unwrap();
            assert_eq!(total.kind(), kind);
            assert_eq!(total.as_f64(), 0.0);
        }
    }

    #[test]
    fn sum_reports_overflow() {
        let list = Value::List(
            (0..2)
                .map(|_| RecordBuilder::new().field("N", 200u8).build())
                .collect(),
        );
        assert!(matches!(
            sum(&list, "N", NumericKind::U8).unwrap_err(),
            ExprError::Evaluation(_)
        ));
    }
}
