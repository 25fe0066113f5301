//! Conversions behind `toBool`, `toInt`, `toFloat`, `toChar` and
//! `toString`.
//!
//! | from \ to | Bool    | Int         | Float    | Char       | String   |
//! |-----------|---------|-------------|----------|------------|----------|
//! | Bool      | =       | 1 / 0       | 1.0/0.0  | -          | text     |
//! | Int       | != 0    | =           | widen    | code point | decimal  |
//! | Float     | != 0.0  | round       | =        | -          | decimal  |
//! | Char      | != '\0' | code point  | -        | =          | 1 char   |
//! | String    | nonempty| parse       | parse    | -          | =        |
//!
//! `-` cells fail with InvalidType naming the source type. Array and Dict
//! values only convert to String. String to Float takes the same text that
//! Float to String produces, so `inf`, `-inf`, `NaN` and exponents parse.

use crate::ast::CastOp;
use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;

pub fn cast(op: CastOp, value: Value, line: usize) -> RuntimeResult<Value> {
    let converted = match op {
        CastOp::ToBool => to_bool(&value),
        CastOp::ToInt => to_int(&value, line)?,
        CastOp::ToFloat => to_float(&value, line)?,
        CastOp::ToChar => to_char(&value, line)?,
        CastOp::ToString => to_string(&value),
    };
    converted.ok_or_else(|| RuntimeError::invalid_type(line, value.ty().to_string()).into())
}

fn to_bool(value: &Value) -> Option<Value> {
    let b = match value {
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(x) => *x != 0.0,
        Value::Char(c) => *c != '\0',
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Dict(_) => return None,
    };
    Some(Value::Bool(b))
}

fn to_int(value: &Value, line: usize) -> RuntimeResult<Option<Value>> {
    let n = match value {
        Value::Bool(b) => i32::from(*b),
        Value::Int(n) => *n,
        // Saturates out of range, NaN becomes 0.
        Value::Float(x) => x.round() as i32,
        Value::Char(c) => *c as i32,
        Value::String(s) => s.parse::<i32>().map_err(|_| not_numeric(s, line))?,
        Value::Array(_) | Value::Dict(_) => return Ok(None),
    };
    Ok(Some(Value::Int(n)))
}

fn to_float(value: &Value, line: usize) -> RuntimeResult<Option<Value>> {
    let x = match value {
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Int(n) => *n as f32,
        Value::Float(x) => *x,
        Value::String(s) => s.parse::<f32>().map_err(|_| not_numeric(s, line))?,
        Value::Char(_) | Value::Array(_) | Value::Dict(_) => return Ok(None),
    };
    Ok(Some(Value::Float(x)))
}

fn to_char(value: &Value, line: usize) -> RuntimeResult<Option<Value>> {
    let c = match value {
        Value::Int(n) => u32::try_from(*n)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                RuntimeError::invalid_operation(line, format!("{} is not a character code", n))
            })?,
        Value::Char(c) => *c,
        _ => return Ok(None),
    };
    Ok(Some(Value::Char(c)))
}

fn to_string(value: &Value) -> Option<Value> {
    Some(Value::String(value.to_string()))
}

fn not_numeric(text: &str, line: usize) -> RuntimeError {
    RuntimeError::invalid_operation(line, format!("{:?} is not a number", text))
}
