use std::cmp::Ordering;

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::{InternalError, MintError, RuntimeError, RuntimeResult};
use crate::types::Type;
use crate::value::Value;

/// Applies a binary operator to two already evaluated operands.
pub fn binary(op: BinaryOp, left: Value, right: Value, line: usize) -> RuntimeResult<Value> {
    match op {
        BinaryOp::And | BinaryOp::Or => logical(op, &left, &right, line),
        BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::LowerThan
        | BinaryOp::LowerEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterEqual => relational(op, &left, &right, line),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            arithmetic(op, &left, &right, line)
        }
    }
}

pub fn unary(op: UnaryOp, operand: Value, line: usize) -> RuntimeResult<Value> {
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (_, other) => Err(RuntimeError::invalid_type(line, other.ty().to_string()).into()),
    }
}

fn logical(op: BinaryOp, left: &Value, right: &Value, line: usize) -> RuntimeResult<Value> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
            BinaryOp::And => *a && *b,
            _ => *a || *b,
        })),
        _ => Err(mismatch(left, right, |v| matches!(v, Value::Bool(_)), line)),
    }
}

fn relational(op: BinaryOp, left: &Value, right: &Value, line: usize) -> RuntimeResult<Value> {
    // None means unordered (a NaN operand).
    let ordering: Option<Ordering> = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
        _ => return Err(mismatch(left, right, is_comparable(left), line)),
    };

    let result = match op {
        BinaryOp::Equal => ordering == Some(Ordering::Equal),
        BinaryOp::NotEqual => ordering != Some(Ordering::Equal),
        BinaryOp::LowerThan => ordering == Some(Ordering::Less),
        BinaryOp::LowerEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::GreaterThan => ordering == Some(Ordering::Greater),
        BinaryOp::GreaterEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => return Err(InternalError(format!("{:?} is not relational", op)).into()),
    };
    Ok(Value::Bool(result))
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value, line: usize) -> RuntimeResult<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let n = match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Sub => a.wrapping_sub(b),
                BinaryOp::Mul => a.wrapping_mul(b),
                _ => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero { line }.into());
                    }
                    a.wrapping_div(b)
                }
            };
            Ok(Value::Int(n))
        }
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            _ => a / b,
        })),
        _ => Err(mismatch(
            left,
            right,
            |v| matches!(v, Value::Int(_) | Value::Float(_)),
            line,
        )),
    }
}

/// Predicate for the right operand of a comparison: it must share the left
/// operand's category, and that category must be Int, Float or Char.
fn is_comparable(left: &Value) -> impl Fn(&Value) -> bool {
    let category = match left {
        Value::Int(_) | Value::Float(_) | Value::Char(_) => Some(left.ty().category()),
        _ => None,
    };
    move |v: &Value| category.is_some() && Some(v.ty().category()) == category
}

/// InvalidType naming the first operand that fails `accepts`, or the right
/// operand when both are individually acceptable but do not pair up.
fn mismatch(
    left: &Value,
    right: &Value,
    accepts: impl Fn(&Value) -> bool,
    line: usize,
) -> MintError {
    let offending: Type = if accepts(left) { right.ty() } else { left.ty() };
    RuntimeError::invalid_type(line, offending.to_string()).into()
}
