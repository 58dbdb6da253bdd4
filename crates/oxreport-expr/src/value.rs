//! Runtime value model shared by every expression.
//!
//! Snapshots are converted into a [`Value`] at the evaluation boundary through
//! explicit [`ToValue`] adapters, one per snapshot type. All functions and
//! operators of the expression language work exclusively on this model.

use crate::error::{ExprError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Named-field container. Field order is the key order.
pub type Record = BTreeMap<String, Value>;

/// A dynamically typed value produced from a snapshot or by an expression.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Record(Record),
}

/// Runtime shape of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number(NumericKind),
    String,
    List,
    Record,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Null => write!(f, "null"),
            Kind::Bool => write!(f, "bool"),
            Kind::Number(kind) => write!(f, "{kind}"),
            Kind::String => write!(f, "string"),
            Kind::List => write!(f, "list"),
            Kind::Record => write!(f, "record"),
        }
    }
}

macro_rules! numbers {
    ($(($variant:ident, $ty:ty, $name:literal, $int:literal)),* $(,)?) => {
        /// Numeric kind tag carried by every [`Number`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NumericKind {
            $($variant),*
        }

        impl NumericKind {
            pub fn is_integer(self) -> bool {
                match self {
                    $(NumericKind::$variant => $int),*
                }
            }
        }

        impl fmt::Display for NumericKind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(NumericKind::$variant => write!(f, $name)),*
                }
            }
        }

        /// A number tagged with the exact width and family it was produced with.
        #[derive(Debug, Clone, Copy)]
        pub enum Number {
            $($variant($ty)),*
        }

        impl Number {
            pub fn kind(&self) -> NumericKind {
                match self {
                    $(Number::$variant(_) => NumericKind::$variant),*
                }
            }

            #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
            pub fn as_f64(&self) -> f64 {
                match self {
                    $(Number::$variant(n) => *n as f64),*
                }
            }

            /// Zero of the given kind, the identity of summation.
            pub fn zero(kind: NumericKind) -> Number {
                match kind {
                    $(NumericKind::$variant => Number::$variant(<$ty>::default())),*
                }
            }
        }

        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(n)
                }
            }

            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::$variant(n))
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

numbers! {
    (I8, i8, "i8", true),
    (I16, i16, "i16", true),
    (I32, i32, "i32", true),
    (I64, i64, "i64", true),
    (Isize, isize, "isize", true),
    (U8, u8, "u8", true),
    (U16, u16, "u16", true),
    (U32, u32, "u32", true),
    (U64, u64, "u64", true),
    (Usize, usize, "usize", true),
    (F32, f32, "f32", false),
    (F64, f64, "f64", false),
}

macro_rules! checked_int_add {
    ($lhs:expr, $rhs:expr, $($variant:ident),*) => {
        match ($lhs, $rhs) {
            $((Number::$variant(a), Number::$variant(b)) => a.checked_add(b).map(Number::$variant),)*
            (Number::F32(a), Number::F32(b)) => Some(Number::F32(a + b)),
            (Number::F64(a), Number::F64(b)) => Some(Number::F64(a + b)),
            _ => None,
        }
    };
}

impl Number {
    /// Integer value widened to `i128`; `None` for floating kinds.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Number::I8(n) => Some(i128::from(n)),
            Number::I16(n) => Some(i128::from(n)),
            Number::I32(n) => Some(i128::from(n)),
            Number::I64(n) => Some(i128::from(n)),
            Number::Isize(n) => i128::try_from(n).ok(),
            Number::U8(n) => Some(i128::from(n)),
            Number::U16(n) => Some(i128::from(n)),
            Number::U32(n) => Some(i128::from(n)),
            Number::U64(n) => Some(i128::from(n)),
            Number::Usize(n) => i128::try_from(n).ok(),
            Number::F32(_) | Number::F64(_) => None,
        }
    }

    /// Integer value if it fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|n| i64::try_from(n).ok())
    }

    /// Adds two numbers of the same kind. Returns `None` when the kinds
    /// differ or integer addition overflows.
    pub fn checked_add(self, rhs: Number) -> Option<Number> {
        checked_int_add!(self, rhs, I8, I16, I32, I64, Isize, U8, U16, U32, U64, Usize)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::F32(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
            other => match other.as_i128() {
                Some(n) => write!(f, "{n}"),
                None => write!(f, "{}", other.as_f64()),
            },
        }
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(n) => Kind::Number(n.kind()),
            Value::String(_) => Kind::String,
            Value::List(_) => Kind::List,
            Value::Record(_) => Kind::Record,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Iterates list elements; `None` when the value is not a list.
    pub fn iter(&self) -> Option<std::slice::Iter<'_, Value>> {
        self.as_list().map(<[Value]>::iter)
    }

    /// Reads a named field off a record.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::FieldNotFound`] when the value is not a record or
    /// has no field with that name.
    pub fn field(&self, name: &str) -> Result<&Value> {
        match self {
            Value::Record(fields) => fields
                .get(name)
                .ok_or_else(|| ExprError::field_not_found(name, "record")),
            other => Err(ExprError::field_not_found(name, other.kind().to_string())),
        }
    }
}

/// Deep structural equality. Numbers compare by value across kinds.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (idx, (name, value)) in fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(fields: Record) -> Self {
        Value::Record(fields)
    }
}

/// JSON documents map objects to records, integers to `i64`/`u64` and every
/// other number to `f64`.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::from(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    Value::from(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Record(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Converts a concrete snapshot type into a [`Value`].
///
/// Implement this once per snapshot type, usually with a [`RecordBuilder`].
/// Single-level indirection (`Option`, `Box`, `Arc`, `Rc`, references) is
/// transparent: a boxed record converts to the record itself and `None`
/// converts to [`Value::Null`].
///
/// # Examples
///
/// ```
/// use oxreport_expr::{RecordBuilder, ToValue, Value};
///
/// struct Queue {
///     name: String,
///     messages: u64,
/// }
///
/// impl ToValue for Queue {
///     fn to_value(&self) -> Value {
///         RecordBuilder::new()
///             .field("Name", &self.name)
///             .field("Messages", self.messages)
///             .build()
///     }
/// }
///
/// let queue = Queue { name: "events".into(), messages: 12 };
/// let value = Some(Box::new(queue)).to_value();
/// assert_eq!(value.field("Messages").unwrap(), &Value::from(12u64));
/// ```
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue, S> ToValue for HashMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::Record(
            self.iter()
                .map(|(name, value)| (name.clone(), value.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Record(
            self.iter()
                .map(|(name, value)| (name.clone(), value.to_value()))
                .collect(),
        )
    }
}

/// Timestamps render as RFC 3339 strings.
impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::String(self.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// Durations are whole seconds, so conditions read `Age > 3600`.
impl ToValue for Duration {
    fn to_value(&self) -> Value {
        Value::from(i64::try_from(self.as_secs()).unwrap_or(i64::MAX))
    }
}

/// Builds a [`Value::Record`] field by field.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: Record,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, value: impl ToValue) -> Self {
        self.fields.insert(name.to_string(), value.to_value());
        self
    }

    pub fn build(self) -> Value {
        Value::Record(self.fields)
    }
}
