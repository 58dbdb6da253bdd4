//! Function and operator registry, and compiled expressions.
//!
//! A [`Language`] is the grammar an expression is compiled against. The base
//! language knows literals, selectors, boolean logic, comparison and
//! arithmetic; [`Language::full`] adds the reporting extensions (`has`,
//! `findOne`, `sumUint64`, the `->` access operator, the `|` pipe, ...).

use crate::error::{ExprError, Result};
use crate::eval;
use crate::parser::{Node, Parser};
use crate::value::Value;
use crate::{builtins, functions, operators};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Signature of a registered function. Receives the language it was compiled
/// with so that it can compile nested expressions.
pub type NativeFn = Arc<dyn Fn(&Language, &[Value]) -> Result<Value> + Send + Sync>;

/// Signature of an eagerly evaluated infix operator.
pub type InfixFn = fn(Value, Value) -> Result<Value>;

/// A named callable with a fixed arity.
#[derive(Clone)]
pub struct FunctionDef {
    pub(crate) name: String,
    pub(crate) arity: usize,
    pub(crate) call: NativeFn,
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum OperatorKind {
    Infix(InfixFn),
    And,
    Or,
    Coalesce,
    /// Evaluates the right-hand side with the left-hand result as context.
    Pipe,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Operator {
    pub symbol: &'static str,
    pub precedence: u8,
    pub kind: OperatorKind,
}

/// Precedence of the `c ? a : b` conditional.
pub(crate) const TERNARY_PRECEDENCE: u8 = 10;

static FULL: LazyLock<Arc<Language>> = LazyLock::new(|| Arc::new(Language::extended()));

#[derive(Clone, Default)]
pub struct Language {
    functions: HashMap<String, FunctionDef>,
    operators: HashMap<&'static str, Operator>,
    /// Operator symbols, longest first, handed to the lexer.
    symbols: Vec<&'static str>,
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<_> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("Language")
            .field("functions", &functions)
            .field("operators", &self.symbols)
            .finish()
    }
}

impl Language {
    /// Literals, selectors, logic, comparison and arithmetic.
    pub fn base() -> Self {
        let mut language = Self::default();
        builtins::register(&mut language);
        language
    }

    /// The base grammar plus every reporting extension.
    pub fn extended() -> Self {
        let mut language = Self::base();
        functions::register(&mut language);
        operators::register(&mut language);
        language
    }

    /// Shared instance of [`Language::extended`].
    pub fn full() -> Arc<Language> {
        Arc::clone(&FULL)
    }

    /// Registers (or replaces) a function.
    pub fn function<F>(&mut self, name: &str, arity: usize, call: F) -> &mut Self
    where
        F: Fn(&Language, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(
            name.to_string(),
            FunctionDef {
                name: name.to_string(),
                arity,
                call: Arc::new(call),
            },
        );
        self
    }

    /// Registers (or replaces) an eagerly evaluated, left-associative infix operator.
    pub fn infix(&mut self, symbol: &'static str, precedence: u8, apply: InfixFn) -> &mut Self {
        self.operator(symbol, precedence, OperatorKind::Infix(apply))
    }

    pub(crate) fn operator(
        &mut self,
        symbol: &'static str,
        precedence: u8,
        kind: OperatorKind,
    ) -> &mut Self {
        self.operators.insert(
            symbol,
            Operator {
                symbol,
                precedence,
                kind,
            },
        );
        if !self.symbols.contains(&symbol) {
            self.symbols.push(symbol);
            self.symbols
                .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        }
        self
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub(crate) fn lookup_function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub(crate) fn lookup_operator(&self, symbol: &str) -> Option<&Operator> {
        self.operators.get(symbol)
    }

    pub(crate) fn symbols(&self) -> &[&'static str] {
        &self.symbols
    }

    pub(crate) fn parse(&self, source: &str) -> Result<Node> {
        Parser::new(self, source)?.parse()
    }

    /// Compiles `source` into a reusable [`Expression`].
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::Compile`] when the source is not a valid
    /// expression, names an unknown function, or calls one with the wrong
    /// number of arguments.
    pub fn compile(self: &Arc<Self>, source: &str) -> Result<Expression> {
        let root = self.parse(source)?;
        Ok(Expression {
            source: source.to_string(),
            root: Arc::new(root),
            language: Arc::clone(self),
        })
    }
}

/// An immutable, reusable compiled expression.
///
/// Cheap to clone and safe to evaluate concurrently against independent
/// contexts.
///
/// # Examples
///
/// ```
/// use oxreport_expr::{compile, RecordBuilder};
///
/// let expr = compile("Bar > 100").unwrap();
/// let ctx = RecordBuilder::new().field("Bar", 150u32).build();
/// assert!(expr.evaluate_bool(&ctx).unwrap());
/// ```
#[derive(Clone)]
pub struct Expression {
    source: String,
    root: Arc<Node>,
    language: Arc<Language>,
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.source).finish()
    }
}

impl Expression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, context: &Value) -> Result<Value> {
        eval::evaluate(&self.root, context, &self.language)
    }

    /// Evaluates and requires a boolean result.
    pub fn evaluate_bool(&self, context: &Value) -> Result<bool> {
        match self.evaluate(context)? {
            Value::Bool(b) => Ok(b),
            other => Err(ExprError::kind_mismatch("result", "bool", other.kind())),
        }
    }
}

/// Compiles `source` with [`Language::full`].
pub fn compile(source: &str) -> Result<Expression> {
    Language::full().compile(source)
}

/// One-shot compile and evaluate with [`Language::full`].
pub fn evaluate(source: &str, context: &Value) -> Result<Value> {
    compile(source)?.evaluate(context)
}
