//! Precedence-climbing parser producing an expression tree.
//!
//! Binary operators come from the [`Language`] operator table; function
//! calls are resolved and arity-checked here, so an [`Expression`] that
//! compiled never fails on an unknown name.
//!
//! [`Expression`]: crate::Expression

use crate::error::{ExprError, Result};
use crate::language::{FunctionDef, InfixFn, Language, OperatorKind, TERNARY_PRECEDENCE};
use crate::lexer::{Lexer, Spanned, Token};
use crate::value::Value;

/// Deepest tree the parser builds. Each nested group, prefix operator and
/// chained binary or selector step counts as one level, which keeps both
/// parsing and evaluation well inside a thread's stack.
const MAX_DEPTH: usize = 256;

#[derive(Debug)]
pub(crate) enum Node {
    Literal(Value),
    /// `@`
    Context,
    /// Bare identifier, a field of the current context.
    Ident(String),
    Field(Box<Node>, String),
    Index(Box<Node>, Box<Node>),
    List(Vec<Node>),
    Call(FunctionDef, Vec<Node>),
    Not(Box<Node>),
    Negate(Box<Node>),
    Binary {
        symbol: &'static str,
        apply: InfixFn,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Coalesce(Box<Node>, Box<Node>),
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Pipe(Box<Node>, Box<Node>),
}

pub(crate) struct Parser<'a> {
    language: &'a Language,
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(language: &'a Language, source: &'a str) -> Result<Self> {
        let tokens = Lexer::new(source, language.symbols()).tokenize()?;
        Ok(Self {
            language,
            source,
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    pub fn parse(mut self) -> Result<Node> {
        if self.peek() == &Token::Eof {
            return Err(self.error("empty expression"));
        }
        let node = self.expression(0)?;
        match self.peek() {
            Token::Eof => Ok(node),
            other => Err(self.error(format!("unexpected token {other:?}"))),
        }
    }

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof and `advance` never moves past it.
        self.tokens
            .get(self.pos)
            .map_or(&Token::Eof, |spanned| &spanned.token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |spanned| spanned.offset)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, want: &Token, what: &str) -> Result<()> {
        if self.peek() == want {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, found {:?}", self.peek())))
        }
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError::Compile {
            expression: self.source.to_string(),
            offset: self.offset(),
            message: message.into(),
        }
    }

    /// Counts one more level of nesting. Callers restore `self.depth` on
    /// success; a failure aborts the whole parse.
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn expression(&mut self, min_precedence: u8) -> Result<Node> {
        let depth = self.depth;
        self.descend()?;
        let mut lhs = self.unary()?;

        loop {
            let token = self.peek().clone();
            match token {
                Token::Question if TERNARY_PRECEDENCE >= min_precedence => {
                    self.advance();
                    self.descend()?;
                    let then = self.expression(TERNARY_PRECEDENCE + 1)?;
                    self.expect(&Token::Colon, "':' in conditional")?;
                    let otherwise = self.expression(TERNARY_PRECEDENCE)?;
                    lhs = Node::Ternary {
                        condition: Box::new(lhs),
                        then: Box::new(then),
                        otherwise: Box::new(otherwise),
                    };
                }
                Token::Op(symbol) => {
                    let Some(op) = self.language.lookup_operator(symbol).copied() else {
                        return Err(self.error(format!("operator {symbol:?} is not infix")));
                    };
                    if op.precedence < min_precedence {
                        break;
                    }
                    self.advance();
                    self.descend()?;
                    let lhs_node = Box::new(lhs);
                    lhs = match op.kind {
                        // The pipe consumes the whole remaining expression.
                        OperatorKind::Pipe => Node::Pipe(lhs_node, Box::new(self.expression(0)?)),
                        OperatorKind::Infix(apply) => Node::Binary {
                            symbol: op.symbol,
                            apply,
                            lhs: lhs_node,
                            rhs: Box::new(self.expression(op.precedence + 1)?),
                        },
                        OperatorKind::And => {
                            Node::And(lhs_node, Box::new(self.expression(op.precedence + 1)?))
                        }
                        OperatorKind::Or => {
                            Node::Or(lhs_node, Box::new(self.expression(op.precedence + 1)?))
                        }
                        OperatorKind::Coalesce => {
                            Node::Coalesce(lhs_node, Box::new(self.expression(op.precedence + 1)?))
                        }
                    };
                }
                _ => break,
            }
        }

        self.depth = depth;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Node> {
        let depth = self.depth;
        self.descend()?;
        let node = match self.peek() {
            Token::Bang => {
                self.advance();
                Node::Not(Box::new(self.unary()?))
            }
            Token::Op("-") => {
                self.advance();
                Node::Negate(Box::new(self.unary()?))
            }
            _ => self.postfix()?,
        };
        self.depth = depth;
        Ok(node)
    }

    fn postfix(&mut self) -> Result<Node> {
        let depth = self.depth;
        let mut node = self.primary()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    self.descend()?;
                    match self.advance() {
                        Token::Ident(name) => node = Node::Field(Box::new(node), name),
                        other => {
                            return Err(self.error(format!("expected field name after '.', found {other:?}")));
                        }
                    }
                }
                Token::LBracket => {
                    self.advance();
                    self.descend()?;
                    let index = self.expression(0)?;
                    self.expect(&Token::RBracket, "']'")?;
                    node = Node::Index(Box::new(node), Box::new(index));
                }
                _ => {
                    self.depth = depth;
                    return Ok(node);
                }
            }
        }
    }

    fn primary(&mut self) -> Result<Node> {
        let offset = self.offset();
        match self.advance() {
            Token::Int(n) => Ok(Node::Literal(Value::from(n))),
            Token::Float(n) => Ok(Node::Literal(Value::from(n))),
            Token::Str(s) => Ok(Node::Literal(Value::String(s))),
            Token::True => Ok(Node::Literal(Value::Bool(true))),
            Token::False => Ok(Node::Literal(Value::Bool(false))),
            Token::Nil => Ok(Node::Literal(Value::Null)),
            Token::At => Ok(Node::Context),
            Token::LParen => {
                let inner = self.expression(0)?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::LBracket => Ok(Node::List(self.arguments(&Token::RBracket, "']'")?)),
            Token::Ident(name) => {
                if self.peek() != &Token::LParen {
                    return Ok(Node::Ident(name));
                }
                self.advance();
                let args = self.arguments(&Token::RParen, "')'")?;
                let Some(function) = self.language.lookup_function(&name) else {
                    return Err(ExprError::Compile {
                        expression: self.source.to_string(),
                        offset,
                        message: format!("unknown function {name:?}"),
                    });
                };
                if function.arity != args.len() {
                    return Err(ExprError::Compile {
                        expression: self.source.to_string(),
                        offset,
                        message: format!(
                            "function {name:?} takes {} argument(s), got {}",
                            function.arity,
                            args.len()
                        ),
                    });
                }
                Ok(Node::Call(function.clone(), args))
            }
            Token::Eof => Err(self.error("unexpected end of expression")),
            other => Err(ExprError::Compile {
                expression: self.source.to_string(),
                offset,
                message: format!("unexpected token {other:?}"),
            }),
        }
    }

    /// Comma separated expressions up to and including `close`.
    fn arguments(&mut self, close: &Token, what: &str) -> Result<Vec<Node>> {
        let mut items = Vec::new();
        if self.peek() == close {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.expression(0)?);
            if self.peek() == &Token::Comma {
                self.advance();
            } else if self.peek() == close {
                self.advance();
                return Ok(items);
            } else {
                return Err(self.error(format!("expected ',' or {what}")));
            }
        }
    }
}
