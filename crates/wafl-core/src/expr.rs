// WAFL - Indentation-structured configuration document language
//
// Copyright (c) 2026 WAFL contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Restricted expression sub-language for `key = expr` values and
//! conditional guards.
//!
//! The grammar covers arithmetic, comparison, logical and/or, and two
//! reference forms: `$ENV.NAME` into the caller-supplied environment and
//! `$NAME` into the symbol table. Nothing here executes host code; an
//! expression is parsed into a small AST and evaluated against the
//! bindings it was given.
//!
//! ```text
//! or    = and ( "||" and )*
//! and   = cmp ( "&&" cmp )*
//! cmp   = add ( ("==" | "!=" | "<" | "<=" | ">" | ">=") add )?
//! add   = mul ( ("+" | "-") mul )*
//! mul   = unary ( ("*" | "/" | "%") unary )*
//! unary = ("!" | "-") unary | atom
//! atom  = number | string | true | false | null
//!       | "$ENV" "." ident | "$" ident | ident | "(" or ")"
//! ```
//!
//! `===` and `!==` are accepted as aliases for `==` and `!=`. An absent
//! environment or symbol binding evaluates to null, so `$ENV.PORT || 3000`
//! falls through to the default. A present binding is returned with its
//! native type even when falsy (`0`, `false`): only absent, null, or
//! empty-string bindings take the fallback. Evaluation failures are
//! reported as [`EvalError`] and are never fatal to a load: callers degrade
//! to the source text.

use crate::value::{Bindings, Value};
use std::fmt;

/// A non-fatal expression failure (syntax error, unknown identifier, type
/// mismatch). The resolver downgrades these to warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Value),
    /// `$ENV.NAME` — environment reference.
    EnvRef(String),
    /// `$NAME` — symbol-table reference.
    SymRef(String),
    /// A bare identifier (always an evaluation error; kept so the message
    /// can name it).
    Ident(String),
    /// Unary operator application.
    Unary { op: UnaryOp, expr: Box<Expr> },
    /// Binary operator application.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Parse and evaluate an expression against the given bindings.
pub fn evaluate(source: &str, env: &Bindings, symbols: &Bindings) -> Result<Value, EvalError> {
    let expr = parse(source)?;
    eval(&expr, env, symbols)
}

/// Parse an expression into its AST.
pub fn parse(source: &str) -> Result<Expr, EvalError> {
    let mut parser = ExprParser::new(source);
    let expr = parser.parse_or()?;
    parser.skip_whitespace();
    if let Some(ch) = parser.peek() {
        return Err(EvalError::new(format!(
            "unexpected character '{}' at position {}",
            ch, parser.pos
        )));
    }
    Ok(expr)
}

/// Evaluate a parsed expression. `||` and `&&` short-circuit; all other
/// operators evaluate both sides first.
pub fn eval(expr: &Expr, env: &Bindings, symbols: &Bindings) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::EnvRef(name) => Ok(env.get(name).cloned().unwrap_or(Value::Null)),
        Expr::SymRef(name) => Ok(symbols.get(name).cloned().unwrap_or(Value::Null)),
        Expr::Ident(name) => Err(EvalError::new(format!("unknown identifier '{}'", name))),
        Expr::Unary { op, expr } => {
            let v = eval(expr, env, symbols)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!v.is_truthy())),
                UnaryOp::Neg => match v {
                    Value::Int(n) => Ok(Value::Int(-n)),
                    Value::Float(n) => Ok(Value::Float(-n)),
                    other => Err(EvalError::new(format!("cannot negate {}", other))),
                },
            }
        }
        Expr::Binary { op: BinOp::Or, lhs, rhs } => {
            // The `$ENV.NAME || default` shorthand keeps a present binding
            // even when falsy: only absent, null, or empty-string bindings
            // fall through to the default.
            if let Expr::EnvRef(name) = lhs.as_ref() {
                return match env.get(name) {
                    None | Some(Value::Null) => eval(rhs, env, symbols),
                    Some(Value::String(s)) if s.is_empty() => eval(rhs, env, symbols),
                    Some(v) => Ok(v.clone()),
                };
            }
            let left = eval(lhs, env, symbols)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                eval(rhs, env, symbols)
            }
        }
        Expr::Binary { op: BinOp::And, lhs, rhs } => {
            let left = eval(lhs, env, symbols)?;
            if left.is_truthy() {
                eval(rhs, env, symbols)
            } else {
                Ok(left)
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let left = eval(lhs, env, symbols)?;
            let right = eval(rhs, env, symbols)?;
            apply_binary(*op, left, right)
        }
    }
}

fn apply_binary(op: BinOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Eq => Ok(Value::Bool(loosely_equal(&left, &right))),
        BinOp::Ne => Ok(Value::Bool(!loosely_equal(&left, &right))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => compare(op, &left, &right),
        BinOp::Add => add(left, right),
        BinOp::Sub => numeric(op, left, right, |a, b| a - b, i64::checked_sub),
        BinOp::Mul => numeric(op, left, right, |a, b| a * b, i64::checked_mul),
        BinOp::Div => divide(left, right),
        BinOp::Rem => remainder(left, right),
        BinOp::Or | BinOp::And => unreachable!("short-circuit ops handled in eval"),
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        _ => a == b,
    }
}

fn compare(op: BinOp, a: &Value, b: &Value) -> Result<Value, EvalError> {
    let ordering = match (a, b) {
        (Value::String(x), Value::String(y)) => x.partial_cmp(y),
        _ => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => {
                return Err(EvalError::new(format!("cannot compare {} with {}", a, b)));
            }
        },
    };
    let ord = match ordering {
        Some(o) => o,
        None => return Ok(Value::Bool(false)), // NaN comparisons
    };
    let result = match op {
        BinOp::Lt => ord.is_lt(),
        BinOp::Le => ord.is_le(),
        BinOp::Gt => ord.is_gt(),
        BinOp::Ge => ord.is_ge(),
        _ => unreachable!(),
    };
    Ok(Value::Bool(result))
}

fn add(left: Value, right: Value) -> Result<Value, EvalError> {
    if let (Value::String(a), Value::String(b)) = (&left, &right) {
        return Ok(Value::String(format!("{}{}", a, b)));
    }
    numeric(BinOp::Add, left, right, |a, b| a + b, i64::checked_add)
}

fn numeric(
    op: BinOp,
    left: Value,
    right: Value,
    float_op: fn(f64, f64) -> f64,
    int_op: fn(i64, i64) -> Option<i64>,
) -> Result<Value, EvalError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => match int_op(*a, *b) {
            Some(n) => Ok(Value::Int(n)),
            // Integer overflow widens to float
            None => Ok(Value::Float(float_op(*a as f64, *b as f64))),
        },
        _ => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
            _ => Err(EvalError::new(format!(
                "invalid operands for {:?}: {} and {}",
                op, left, right
            ))),
        },
    }
}

fn divide(left: Value, right: Value) -> Result<Value, EvalError> {
    match (left.as_float(), right.as_float()) {
        (Some(_), Some(b)) if b == 0.0 => Err(EvalError::new("division by zero")),
        (Some(a), Some(b)) => Ok(Value::Float(a / b)),
        _ => Err(EvalError::new(format!(
            "invalid operands for division: {} and {}",
            left, right
        ))),
    }
}

fn remainder(left: Value, right: Value) -> Result<Value, EvalError> {
    match (&left, &right) {
        (Value::Int(_), Value::Int(0)) => Err(EvalError::new("modulo by zero")),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a % b)),
        _ => match (left.as_float(), right.as_float()) {
            (Some(_), Some(b)) if b == 0.0 => Err(EvalError::new("modulo by zero")),
            (Some(a), Some(b)) => Ok(Value::Float(a % b)),
            _ => Err(EvalError::new(format!(
                "invalid operands for modulo: {} and {}",
                left, right
            ))),
        },
    }
}

// --- Recursive-descent parser ---

struct ExprParser {
    chars: Vec<char>,
    pos: usize,
}

impl ExprParser {
    fn new(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
            pos: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Consume `op` if the upcoming characters match it exactly.
    fn eat(&mut self, op: &str) -> bool {
        for (i, expected) in op.chars().enumerate() {
            if self.peek_at(i) != Some(expected) {
                return false;
            }
        }
        self.pos += op.chars().count();
        true
    }

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.eat("||") {
                let rhs = self.parse_and()?;
                expr = Expr::Binary {
                    op: BinOp::Or,
                    lhs: Box::new(expr),
                    rhs: Box::new(rhs),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_cmp()?;
        loop {
            self.skip_whitespace();
            if self.eat("&&") {
                let rhs = self.parse_cmp()?;
                expr = Expr::Binary {
                    op: BinOp::And,
                    lhs: Box::new(expr),
                    rhs: Box::new(rhs),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_cmp(&mut self) -> Result<Expr, EvalError> {
        let lhs = self.parse_add()?;
        self.skip_whitespace();
        // Longest operators first; === and !== alias the two-char forms.
        let op = if self.eat("===") || self.eat("==") {
            BinOp::Eq
        } else if self.eat("!==") || self.eat("!=") {
            BinOp::Ne
        } else if self.eat("<=") {
            BinOp::Le
        } else if self.eat(">=") {
            BinOp::Ge
        } else if self.eat("<") {
            BinOp::Lt
        } else if self.eat(">") {
            BinOp::Gt
        } else {
            return Ok(lhs);
        };
        let rhs = self.parse_add()?;
        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_add(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_mul()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('+') => BinOp::Add,
                Some('-') => BinOp::Sub,
                _ => return Ok(expr),
            };
            self.advance();
            let rhs = self.parse_mul()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_mul(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('*') => BinOp::Mul,
                Some('/') => BinOp::Div,
                Some('%') => BinOp::Rem,
                _ => return Ok(expr),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        self.skip_whitespace();
        match self.peek() {
            // `!` only when not part of `!=` / `!==`
            Some('!') if self.peek_at(1) != Some('=') => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(expr),
                })
            }
            Some('-') if self.peek_at(1).map_or(false, |c| !c.is_ascii_digit()) => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(expr),
                })
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, EvalError> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') | Some('\'') => {
                let s = self.parse_string()?;
                Ok(Expr::Literal(Value::String(s)))
            }
            Some(ch) if ch.is_ascii_digit() || ch == '-' => self.parse_number(),
            Some('$') => self.parse_reference(),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let ident = self.parse_identifier()?;
                match ident.as_str() {
                    "true" => Ok(Expr::Literal(Value::Bool(true))),
                    "false" => Ok(Expr::Literal(Value::Bool(false))),
                    "null" => Ok(Expr::Literal(Value::Null)),
                    _ => Ok(Expr::Ident(ident)),
                }
            }
            Some('(') => {
                self.advance();
                let expr = self.parse_or()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(EvalError::new("expected ')' after parenthesized expression"));
                }
                self.advance();
                Ok(expr)
            }
            Some(ch) => Err(EvalError::new(format!(
                "unexpected character '{}' in expression",
                ch
            ))),
            None => Err(EvalError::new("unexpected end of expression")),
        }
    }

    /// `$ENV.NAME` or `$NAME`.
    fn parse_reference(&mut self) -> Result<Expr, EvalError> {
        self.advance(); // consume '$'
        let ident = self.parse_identifier()?;
        if ident == "ENV" {
            if self.peek() != Some('.') {
                return Err(EvalError::new("expected '.' after $ENV"));
            }
            self.advance();
            let name = self.parse_identifier()?;
            Ok(Expr::EnvRef(name))
        } else {
            Ok(Expr::SymRef(ident))
        }
    }

    fn parse_identifier(&mut self) -> Result<String, EvalError> {
        let mut ident = String::new();
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                ident.push(ch);
                self.advance();
            }
            _ => return Err(EvalError::new("expected identifier")),
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Ok(ident)
    }

    fn parse_string(&mut self) -> Result<String, EvalError> {
        let quote = self.advance().unwrap_or('"');
        let mut result = String::new();
        loop {
            match self.advance() {
                Some(ch) if ch == quote => return Ok(result),
                Some(ch) => result.push(ch),
                None => return Err(EvalError::new("unterminated string literal")),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Expr, EvalError> {
        let mut num = String::new();
        let mut has_dot = false;
        if self.peek() == Some('-') {
            num.push('-');
            self.advance();
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot && self.peek_at(1).map_or(false, |c| c.is_ascii_digit())
            {
                has_dot = true;
                num.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if num.is_empty() || num == "-" {
            return Err(EvalError::new("expected number"));
        }
        if has_dot {
            num.parse::<f64>()
                .map(|n| Expr::Literal(Value::Float(n)))
                .map_err(|_| EvalError::new(format!("invalid number '{}'", num)))
        } else {
            num.parse::<i64>()
                .map(|n| Expr::Literal(Value::Int(n)))
                .map_err(|_| EvalError::new(format!("invalid number '{}'", num)))
        }
    }
}
