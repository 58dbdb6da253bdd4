//! Message templates with backtick-delimited expression spans.
//!
//! ```text
//! Queue `Name` has `Messages` messages on `Nodes -> "Name"`
//! ```
//!
//! Each span is evaluated against the snapshot and replaced with its string
//! form. A pair of adjacent backticks is left as-is, as is a span containing
//! only whitespace.

use crate::error::{ExprError, Result};
use crate::language::Language;
use crate::value::Value;
use std::sync::Arc;

const DELIMITER: char = '`';

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    Span(&'a str),
}

fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    // Start of the literal run not yet pushed, and the scan position.
    let mut literal = 0;
    let mut pos = 0;
    while let Some(open) = text[pos..].find(DELIMITER).map(|i| pos + i) {
        let Some(close) = text[open + 1..].find(DELIMITER).map(|i| open + 1 + i) else {
            break;
        };
        let inner = &text[open + 1..close];
        pos = close + 1;
        if inner.trim().is_empty() {
            continue;
        }
        if open > literal {
            out.push(Segment::Literal(&text[literal..open]));
        }
        out.push(Segment::Span(inner));
        literal = pos;
    }
    if literal < text.len() {
        out.push(Segment::Literal(&text[literal..]));
    }
    out
}

fn display(value: &Value) -> String {
    match value {
        Value::List(items) => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Raw message text, rendered against a snapshot when its alert fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    text: String,
}

impl MessageTemplate {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Compiles every span with [`Language::full`] without evaluating it.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&Language::full())
    }

    pub fn validate_with(&self, language: &Language) -> Result<()> {
        for segment in segments(&self.text) {
            if let Segment::Span(source) = segment {
                language
                    .parse(source.trim())
                    .map_err(|e| ExprError::nested(source, e))?;
            }
        }
        Ok(())
    }

    /// Renders with [`Language::full`].
    pub fn render(&self, context: &Value) -> Result<String> {
        self.render_with(&Language::full(), context)
    }

    /// Renders every span, failing the whole template on the first span
    /// that does not compile or evaluate.
    pub fn render_with(&self, language: &Arc<Language>, context: &Value) -> Result<String> {
        let mut rendered = String::with_capacity(self.text.len());
        for segment in segments(&self.text) {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Span(source) => {
                    let value = language
                        .compile(source.trim())
                        .and_then(|expr| expr.evaluate(context))
                        .map_err(|e| ExprError::nested(source, e))?;
                    rendered.push_str(&display(&value));
                }
            }
        }
        Ok(rendered)
    }
}

impl From<&str> for MessageTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl std::fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
