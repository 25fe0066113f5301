use super::expressions::check_type;
use crate::ast::FunctionOp;
use crate::error::{InternalError, RuntimeError, RuntimeResult};
use crate::value::{ArrayRef, Value};

/// Dispatches a built-in method on an evaluated receiver.
pub fn call(op: FunctionOp, base: Value, arg: Option<Value>, line: usize) -> RuntimeResult<Value> {
    match (op, &base) {
        (FunctionOp::Count, Value::String(s)) => length(s.chars().count(), line),
        (FunctionOp::Count, Value::Array(array)) => length(array.len(), line),

        (FunctionOp::Empty, Value::String(s)) => Ok(Value::Bool(s.is_empty())),
        (FunctionOp::Empty, Value::Array(array)) => Ok(Value::Bool(array.is_empty())),
        (FunctionOp::Empty, Value::Dict(dict)) => Ok(Value::Bool(dict.is_empty())),

        (FunctionOp::Keys, Value::Dict(dict)) => Ok(Value::Array(ArrayRef::new(
            dict.key_type().clone(),
            dict.keys(),
        ))),
        (FunctionOp::Values, Value::Dict(dict)) => Ok(Value::Array(ArrayRef::new(
            dict.value_type().clone(),
            dict.values(),
        ))),

        (FunctionOp::Append, Value::Array(array)) => {
            let value = argument(op, arg)?;
            check_type(array.elem_type(), &value, line)?;
            array.push(value);
            Ok(base)
        }

        (FunctionOp::Contains, Value::Dict(dict)) => {
            let key = argument(op, arg)?;
            check_type(dict.key_type(), &key, line)?;
            Ok(Value::Bool(dict.contains_key(&key)))
        }

        _ => Err(RuntimeError::invalid_operation(
            line,
            format!("{}() on {}", op.name(), base.ty()),
        )
        .into()),
    }
}

fn length(len: usize, line: usize) -> RuntimeResult<Value> {
    i32::try_from(len).map(Value::Int).map_err(|_| {
        RuntimeError::invalid_operation(line, format!("length {} does not fit in Int", len)).into()
    })
}

fn argument(op: FunctionOp, arg: Option<Value>) -> RuntimeResult<Value> {
    arg.ok_or_else(|| InternalError(format!("{}() without an argument", op.name())).into())
}
