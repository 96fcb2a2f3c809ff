//! Test expressions for conditional nodes.
//!
//! A deliberately small language: literals, `:name` / `name` references,
//! `!`, comparisons (`==`, `!=`, `===`, `!==`, `<`, `<=`, `>`, `>=`) and the
//! short-circuiting connectives `&&` / `||`. There is no assignment, no calls
//! and no arithmetic.
//!
//! `:name` references read as `null` when the key is absent. Bare references
//! to absent keys are a fault. Conditions are fail-closed: [`test_passes`]
//! turns any fault into `false`.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sqlbatis::expr::test_passes;
//!
//! let data = json!({ "name": "alice", "age": 30 });
//! assert!(test_passes(":name != null && :age >= 18", &data));
//! assert!(!test_passes(":missing", &data));
//! assert!(!test_passes("age >", &data)); // malformed
//! ```

mod eval;
mod lexer;
mod parser;


use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

pub use eval::is_truthy;

/// Reasons a test expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
    #[error("literal substitution `::{0}` is not allowed in test expressions")]
    LiteralSubstitution(String),
    #[error("unexpected {found}, expected {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
    },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("'{0}' is not defined")]
    Undefined(String),
    #[error("cannot order {left} against {right}")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },
}

/// A parsed test expression, reusable across data contexts.
#[derive(Debug, Clone)]
pub struct TestExpr {
    ast: parser::Expr,
    defaults: HashSet<String>,
}

impl TestExpr {
    /// Parse `src`.
    pub fn parse(src: &str) -> Result<Self, ExprError> {
        let tokens = lexer::tokenize(src)?;
        let defaults = tokens
            .iter()
            .filter_map(|tok| match tok {
                lexer::Token::Bound(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        let ast = parser::Parser::new(tokens).parse()?;
        Ok(Self { ast, defaults })
    }

    /// Evaluate against `ctx` and coerce the result to a boolean.
    ///
    /// `ctx` is only read; absent `:name` keys are defaulted on the side.
    pub fn eval(&self, ctx: &Value) -> Result<bool, ExprError> {
        let value = eval::Evaluator::new(ctx, &self.defaults).eval(&self.ast)?;
        Ok(is_truthy(&value))
    }
}

/// Parse and evaluate `src` against `ctx`.
pub fn evaluate(src: &str, ctx: &Value) -> Result<bool, ExprError> {
    TestExpr::parse(src)?.eval(ctx)
}

/// Fail-closed evaluation: any fault counts as `false`.
pub fn test_passes(src: &str, ctx: &Value) -> bool {
    match evaluate(src, ctx) {
        Ok(passed) => passed,
        Err(err) => {
            tracing::debug!(
                target: "sqlbatis.render",
                test = src,
                error = %err,
                "condition could not be evaluated; treating as false"
            );
            false
        }
    }
}
