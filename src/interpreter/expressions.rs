use super::{casts, methods, operators, Interpreter};
use crate::ast::{ActionOp, Expr};
use crate::error::{MintResult, RuntimeError, RuntimeResult};
use crate::types::Type;
use crate::value::{ArrayRef, DictRef, Value};

impl Interpreter {
    /// Evaluate an expression to a value
    pub(crate) fn evaluate(&mut self, expr: &Expr) -> MintResult<Value> {
        match expr {
            Expr::Const { value, .. } => Ok(value.clone()),

            Expr::Binary {
                line,
                left,
                op,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                operators::binary(*op, left, right, *line)
            }

            Expr::Unary { line, op, operand } => {
                let operand = self.evaluate(operand)?;
                operators::unary(*op, operand, *line)
            }

            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                if self.evaluate_condition(condition)? {
                    self.evaluate(then_expr)
                } else {
                    self.evaluate(else_expr)
                }
            }

            Expr::Cast { line, op, expr } => {
                let value = self.evaluate(expr)?;
                casts::cast(*op, value, *line)
            }

            Expr::Action { line, op } => self.action(*op, *line),

            Expr::ArrayLiteral { elem, items, .. } => {
                let array = ArrayRef::new(elem.clone(), Vec::with_capacity(items.len()));
                for item in items {
                    let value = self.evaluate(item)?;
                    check_type(elem, &value, item.line())?;
                    array.push(value);
                }
                Ok(Value::Array(array))
            }

            Expr::DictLiteral {
                key, value, items, ..
            } => {
                let dict = DictRef::new(key.clone(), value.clone());
                for (key_expr, value_expr) in items {
                    let k = self.evaluate(key_expr)?;
                    check_type(key, &k, key_expr.line())?;
                    let v = self.evaluate(value_expr)?;
                    check_type(value, &v, value_expr.line())?;
                    dict.insert(k, v);
                }
                Ok(Value::Dict(dict))
            }

            Expr::Variable { line, id } => self.environment.read(*id, *line),

            Expr::Access { line, base, index } => {
                let container = self.evaluate(base)?;
                let key = self.evaluate(index)?;
                read_access(container, key, *line)
            }

            Expr::Function {
                line,
                op,
                base,
                arg,
            } => {
                let base = self.evaluate(base)?;
                let arg = match arg {
                    Some(arg) => Some(self.evaluate(arg)?),
                    None => None,
                };
                methods::call(*op, base, arg, *line)
            }
        }
    }

    /// Evaluates a condition of `if`, `while` or `?:`.
    pub(crate) fn evaluate_condition(&mut self, expr: &Expr) -> MintResult<bool> {
        match self.evaluate(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::invalid_type(expr.line(), other.ty().to_string()).into()),
        }
    }

    fn action(&mut self, op: ActionOp, line: usize) -> MintResult<Value> {
        match op {
            ActionOp::Read => match self.services.input.read_line()? {
                Some(text) => Ok(Value::String(text)),
                None => Err(RuntimeError::ReadError {
                    detail: "end of input".to_string(),
                    line,
                }
                .into()),
            },
            ActionOp::Random => Ok(Value::Float(self.services.random.next_f32())),
        }
    }
}

/// `container[key] = value`. Arrays are written in place; Dicts drop
/// any entry for the key and append the new one.
pub(super) fn write_access(
    container: Value,
    key: Value,
    value: Value,
    line: usize,
) -> MintResult<()> {
    match container {
        Value::Array(array) => {
            let index = element_index(&key, line)?;
            check_type(array.elem_type(), &value, line)?;
            if array.set(index, value) {
                Ok(())
            } else {
                Err(out_of_bounds(index, line).into())
            }
        }
        Value::Dict(dict) => {
            check_type(dict.key_type(), &key, line)?;
            check_type(dict.value_type(), &value, line)?;
            dict.insert(key, value);
            Ok(())
        }
        Value::String(_) => {
            Err(RuntimeError::invalid_operation(line, "String characters cannot be assigned").into())
        }
        other => Err(RuntimeError::invalid_type(line, other.ty().to_string()).into()),
    }
}

/// `container[key]` as a read.
fn read_access(container: Value, key: Value, line: usize) -> MintResult<Value> {
    match container {
        Value::Array(array) => {
            let index = element_index(&key, line)?;
            array.get(index).ok_or_else(|| out_of_bounds(index, line).into())
        }
        Value::String(text) => {
            let index = element_index(&key, line)?;
            text.chars()
                .nth(index)
                .map(Value::Char)
                .ok_or_else(|| out_of_bounds(index, line).into())
        }
        Value::Dict(dict) => dict.get(&key).ok_or_else(|| {
            RuntimeError::KeyNotFound {
                detail: key.repr(),
                line,
            }
            .into()
        }),
        other => Err(RuntimeError::invalid_type(line, other.ty().to_string()).into()),
    }
}

fn element_index(key: &Value, line: usize) -> RuntimeResult<usize> {
    match key {
        Value::Int(n) => usize::try_from(*n).map_err(|_| {
            RuntimeError::IndexOutOfBounds {
                detail: n.to_string(),
                line,
            }
            .into()
        }),
        other => Err(RuntimeError::invalid_type(line, other.ty().to_string()).into()),
    }
}

fn out_of_bounds(index: usize, line: usize) -> RuntimeError {
    RuntimeError::IndexOutOfBounds {
        detail: index.to_string(),
        line,
    }
}

/// Fails with InvalidType naming the value's type unless it fits `expected`.
pub(crate) fn check_type(expected: &Type, value: &Value, line: usize) -> RuntimeResult<()> {
    let actual = value.ty();
    if expected.matches(&actual) {
        Ok(())
    } else {
        Err(RuntimeError::invalid_type(line, actual.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{MintError, RuntimeError};
    use crate::run_with_input;

    fn run(source: &str) -> Result<String, MintError> {
        run_with_input(source, Vec::<String>::new(), 11)
    }

    fn run_lines(source: &str, lines: &[&str]) -> Result<String, MintError> {
        run_with_input(source, lines.iter().copied(), 11)
    }

    #[test]
    fn test_array_access_bounds() {
        assert_eq!(run("var a: Array<Int> = Array<Int>(4, 5)\nprint(a[1])").unwrap(), "5");
        assert!(matches!(
            run("var a: Array<Int> = Array<Int>(4, 5)\nprint(a[2])"),
            Err(MintError::Runtime(RuntimeError::IndexOutOfBounds { line: 2, .. }))
        ));
        assert!(matches!(
            run("var a: Array<Int> = Array<Int>(4, 5)\nprint(a[-1])"),
            Err(MintError::Runtime(RuntimeError::IndexOutOfBounds { .. }))
        ));
        assert!(matches!(
            run("var a: Array<Int> = Array<Int>(4, 5)\nprint(a[1.0])"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_string_access_yields_char() {
        assert_eq!(
            run("var s: String = \"abc\"\ndump(s[2])").unwrap(),
            "Char 'c'\n"
        );
        assert!(matches!(
            run("var s: String = \"abc\"\ns[0] = 'x'"),
            Err(MintError::Runtime(RuntimeError::InvalidOperation { line: 2, .. }))
        ));
    }

    #[test]
    fn test_dict_access_and_missing_key() {
        let program = "var d: Dict<String, Int> = Dict<String, Int>(\"a\": 1)\n\
                       d[\"b\"] = 2\n\
                       print(d[\"a\"] + d[\"b\"])\n\
                       print(d[\"z\"])";
        match run(program) {
            Err(MintError::Runtime(RuntimeError::KeyNotFound { detail, line })) => {
                assert_eq!(detail, "\"z\"");
                assert_eq!(line, 4);
            }
            other => panic!("Expected KeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_access_write_goes_through() {
        let out = run("var grid: Array<Array<Int>> = Array<Array<Int>>(Array<Int>(0, 0), Array<Int>(0, 0))\n\
                       grid[1][0] = 7\n\
                       print(grid)")
            .unwrap();
        assert_eq!(out, "[[0, 0], [7, 0]]");
    }

    #[test]
    fn test_access_write_checks_element_type() {
        assert!(matches!(
            run("var a: Array<Int> = Array<Int>(1)\na[0] = \"x\""),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
        assert!(matches!(
            run("var d: Dict<Int, Int>\nd['k'] = 1"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_access_on_scalar_is_invalid_type() {
        assert!(matches!(
            run("var x: Int = 3\nprint(x[0])"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_literal_elements_are_type_checked() {
        assert!(matches!(
            run("print(Array<Int>(1, 2.0))"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
        assert!(matches!(
            run("print(Dict<Char, Int>('a': true))"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_dict_literal_repeated_key_moves_to_end() {
        let out = run("println(Dict<Int, Char>(1: 'a', 2: 'b', 1: 'c'))").unwrap();
        assert_eq!(out, "{2: 'b', 1: 'c'}\n");
    }

    #[test]
    fn test_conditional_evaluates_taken_branch_only() {
        assert_eq!(run("print(1 < 2 ? 10 : 1 / 0)").unwrap(), "10");
        assert!(matches!(
            run("print(1 ? 2 : 3)"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_read_consumes_lines_then_fails() {
        assert_eq!(
            run_lines("println(read() + \"!\")", &["hello"]).unwrap_err().kind(),
            "InvalidType"
        );
        assert_eq!(
            run_lines("var s: String = read()\nprintln(s) println(toInt(read()) + 1)", &["hello", "41"])
                .unwrap(),
            "hello\n42\n"
        );
        assert!(matches!(
            run_lines("read()\nread()", &["only"]),
            Err(MintError::Runtime(RuntimeError::ReadError { line: 2, .. }))
        ));
    }

    #[test]
    fn test_random_is_a_float_in_unit_interval() {
        let out = run("var r: Float = random()\nprint(r >= 0.0 && r < 1.0)").unwrap();
        assert_eq!(out, "true");
    }
}
