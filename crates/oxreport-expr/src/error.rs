use crate::value::Kind;

/// Errors produced while compiling or evaluating expressions and templates.
///
/// # Examples
///
/// ```rust
/// use oxreport_expr::{ExprError, Kind};
///
/// let err = ExprError::kind_mismatch(0, "string|list", Kind::Bool);
/// assert_eq!(err.to_string(), "want kind of arg 0 \"string|list\", got \"bool\"");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ExprError {
    /// The source text is not a valid expression, or names an unknown
    /// function or calls one with the wrong number of arguments.
    #[error("invalid expression {expression:?}: {message} at offset {offset}")]
    Compile {
        expression: String,
        offset: usize,
        message: String,
    },

    /// An operation received a value whose shape does not satisfy its contract.
    #[error("want kind of arg {argument} {want:?}, got \"{got}\"")]
    KindMismatch {
        argument: String,
        want: String,
        got: Kind,
    },

    /// A named-field lookup targeted a record without that field.
    #[error("field {field:?} does not exist on {on:?}")]
    FieldNotFound { field: String, on: String },

    /// A regular expression argument failed to compile.
    #[error("compiling regex {pattern:?}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Failure of a nested expression, such as a template span or the
    /// sub-expression of `evalOnEach`.
    #[error("evaluating expr {expression:?}: {source}")]
    Nested {
        expression: String,
        #[source]
        source: Box<ExprError>,
    },

    /// Any other evaluation failure (division by zero, incomparable operands).
    #[error("{0}")]
    Evaluation(String),
}

impl ExprError {
    pub fn kind_mismatch(argument: impl ToString, want: impl Into<String>, got: Kind) -> Self {
        ExprError::KindMismatch {
            argument: argument.to_string(),
            want: want.into(),
            got,
        }
    }

    pub fn field_not_found(field: impl Into<String>, on: impl Into<String>) -> Self {
        ExprError::FieldNotFound {
            field: field.into(),
            on: on.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        ExprError::Evaluation(message.into())
    }

    pub(crate) fn nested(expression: &str, source: ExprError) -> Self {
        ExprError::Nested {
            expression: expression.to_string(),
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping `Nested` wrappers.
    pub fn root_cause(&self) -> &ExprError {
        match self {
            ExprError::Nested { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_compile(&self) -> bool {
        matches!(self.root_cause(), ExprError::Compile { .. })
    }
}

/// Convenience `Result` alias for expression operations.
pub type Result<T> = std::result::Result<T, ExprError>;
