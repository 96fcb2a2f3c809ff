use super::ExprError;
use super::parser::{CmpOp, Expr};
use crate::context::lookup;
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Evaluates a parsed test expression against a data context.
///
/// `defaults` holds every name referenced as `:name` in the expression; such
/// names read as `null` when absent, even where they also appear bare.
pub(crate) struct Evaluator<'a> {
    ctx: &'a Value,
    defaults: &'a HashSet<String>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(ctx: &'a Value, defaults: &'a HashSet<String>) -> Self {
        Self { ctx, defaults }
    }

    pub(crate) fn eval(&self, expr: &Expr) -> Result<Value, ExprError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Ref { name, bound } => self.resolve(name, *bound).map(Cow::into_owned),
            Expr::Not(inner) => Ok(Value::Bool(!is_truthy(&self.eval(inner)?))),
            Expr::And(lhs, rhs) => {
                if !is_truthy(&self.eval(lhs)?) {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(is_truthy(&self.eval(rhs)?)))
            }
            Expr::Or(lhs, rhs) => {
                if is_truthy(&self.eval(lhs)?) {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(is_truthy(&self.eval(rhs)?)))
            }
            Expr::Compare(lhs, op, rhs) => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                compare(&l, *op, &r).map(Value::Bool)
            }
        }
    }

    fn resolve(&self, name: &str, bound: bool) -> Result<Cow<'a, Value>, ExprError> {
        if let Some(v) = lookup(self.ctx, name) {
            return Ok(v);
        }
        if bound || self.defaults.contains(name) {
            return Ok(Cow::Owned(Value::Null));
        }
        // A bare `a.b` whose root exists reads as undefined rather than faulting.
        if let Some((root, _)) = name.split_once('.') {
            if lookup(self.ctx, root).is_some() || self.defaults.contains(root) {
                return Ok(Cow::Owned(Value::Null));
            }
        }
        Err(ExprError::Undefined(name.to_string()))
    }
}

/// Truthiness used by conditions: `null`, `false`, `0`, NaN and empty
/// strings, arrays and objects are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn compare(l: &Value, op: CmpOp, r: &Value) -> Result<bool, ExprError> {
    Ok(match op {
        CmpOp::Eq => loose_eq(l, r),
        CmpOp::NotEq => !loose_eq(l, r),
        CmpOp::StrictEq => strict_eq(l, r),
        CmpOp::StrictNotEq => !strict_eq(l, r),
        CmpOp::Lt => ordering(l, r)? == Some(Ordering::Less),
        CmpOp::Le => matches!(ordering(l, r)?, Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => ordering(l, r)? == Some(Ordering::Greater),
        CmpOp::Ge => matches!(ordering(l, r)?, Some(Ordering::Greater | Ordering::Equal)),
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
            }
        }
        _ => None,
    }
}

fn loose_eq(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => l == r,
        _ => match (as_number(l), as_number(r)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn strict_eq(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => l == r,
    }
}

fn ordering(l: &Value, r: &Value) -> Result<Option<Ordering>, ExprError> {
    match (l, r) {
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::Number(_), Value::Number(_) | Value::String(_))
        | (Value::String(_), Value::Number(_)) => {
            let (a, b) = (as_number(l), as_number(r));
            Ok(a.zip(b).and_then(|(a, b)| a.partial_cmp(&b)))
        }
        _ => Err(ExprError::Incomparable {
            left: type_name(l),
            right: type_name(r),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
