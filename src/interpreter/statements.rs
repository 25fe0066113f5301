use tracing::trace;

use super::expressions::write_access;
use super::Interpreter;
use crate::ast::{Command, Expr};
use crate::error::{MintResult, RuntimeError};
use crate::value::Value;

impl Interpreter {
    /// Execute a single command
    pub(crate) fn execute(&mut self, command: &Command) -> MintResult<()> {
        match command {
            Command::Blocks {
                scope, commands, ..
            } => {
                let result = commands.iter().try_for_each(|command| self.execute(command));
                if let Some(scope) = *scope {
                    if scope != self.environment.global_scope() {
                        self.environment.release_scope(scope)?;
                    }
                }
                result
            }

            Command::Initialize {
                line,
                variable,
                expr,
            } => {
                let value = match expr {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::zero(&self.environment.variable(*variable)?.ty),
                };
                self.environment.initialize(*variable, value, *line)
            }

            Command::Assign { line, target, expr } => {
                let value = self.evaluate(expr)?;
                match target {
                    None => Ok(()),
                    Some(target) => self.store(target, value, *line),
                }
            }

            Command::Print {
                expr, newline, ..
            } => {
                let text = self.evaluate(expr)?.to_string();
                if *newline {
                    self.services.output.println(&text)?;
                } else {
                    self.services.output.print(&text)?;
                }
                Ok(())
            }

            Command::Dump { expr, .. } => {
                let value = self.evaluate(expr)?;
                let text = format!("{} {}", value.ty(), value.repr());
                self.services.output.println(&text)?;
                Ok(())
            }

            Command::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate_condition(condition)? {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }

            Command::While {
                condition, body, ..
            } => {
                while self.evaluate_condition(condition)? {
                    self.execute(body)?;
                }
                Ok(())
            }

            Command::For {
                line,
                variable,
                declared,
                iterable,
                body,
            } => {
                let items: Vec<Value> = match self.evaluate(iterable)? {
                    Value::String(text) => text.chars().map(Value::Char).collect(),
                    Value::Array(array) => array.snapshot(),
                    _ => {
                        return Err(RuntimeError::invalid_type(*line, "Iterable expected").into())
                    }
                };
                trace!(line, iterations = items.len(), "for loop");

                for item in items {
                    if *declared {
                        self.environment.initialize(*variable, item, *line)?;
                    } else {
                        self.environment.assign(*variable, item, *line)?;
                    }
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }

    /// Commit `value` to an assignable target.
    fn store(&mut self, target: &Expr, value: Value, line: usize) -> MintResult<()> {
        match target {
            Expr::Variable { id, .. } => self.environment.assign(*id, value, line),
            Expr::Access { base, index, .. } => {
                let container = self.evaluate(base)?;
                let key = self.evaluate(index)?;
                write_access(container, key, value, line)
            }
            _ => Err(RuntimeError::invalid_operation(line, "left side of '=' is not assignable").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{MintError, RuntimeError};
    use crate::run_with_input;

    fn run(source: &str) -> Result<String, MintError> {
        run_with_input(source, Vec::<String>::new(), 7)
    }

    #[test]
    fn test_uninitialized_declarations_get_zero_values() {
        let out = run("var b: Bool, i: Int, f: Float, s: String, a: Array<Int>, d: Dict<Int, Int>\n\
                       print(b) print(\" \") print(i) print(\" \") print(f) print(\" \")\n\
                       print(s.count()) print(a.count()) println(d.empty())")
            .unwrap();
        assert_eq!(out, "false 0 0.0 00true\n");
    }

    #[test]
    fn test_if_else_and_while() {
        let out = run("var i: Int = 0\n\
                       while i < 3 { if i == 1 print(\"one\") else print(i) i = i + 1 }")
            .unwrap();
        assert_eq!(out, "0one2");
    }

    #[test]
    fn test_condition_must_be_bool() {
        assert!(matches!(
            run("if 1 print(1)"),
            Err(MintError::Runtime(RuntimeError::InvalidType { line: 1, .. }))
        ));
        assert!(matches!(
            run("\nwhile \"x\" { }"),
            Err(MintError::Runtime(RuntimeError::InvalidType { line: 2, .. }))
        ));
    }

    #[test]
    fn test_let_inside_loop_body_is_fresh_each_iteration() {
        let out = run("for var i: Int in Array<Int>(1, 2, 3) { let sq: Int = i * i; print(sq) }")
            .unwrap();
        assert_eq!(out, "149");
    }

    #[test]
    fn test_let_loop_variable_is_rebound() {
        let out = run("for let c: Char in \"hey\" print(c)").unwrap();
        assert_eq!(out, "hey");
    }

    #[test]
    fn test_for_over_existing_let_variable_is_immutable() {
        assert!(matches!(
            run("let c: Char = 'x'\nfor c in \"ab\" print(c)"),
            Err(MintError::Runtime(RuntimeError::ImmutableAssignment { line: 2, .. }))
        ));
    }

    #[test]
    fn test_for_requires_iterable_and_matching_element_type() {
        assert!(matches!(
            run("for var x: Int in 5 print(x)"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
        assert!(matches!(
            run("for var x: Int in \"ab\" print(x)"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_for_iterates_snapshot_of_array() {
        let out = run("var a: Array<Int> = Array<Int>(1, 2)\n\
                       for var x: Int in a { a.append(x) print(x) }\n\
                       print(a.count())")
            .unwrap();
        assert_eq!(out, "124");
    }

    #[test]
    fn test_dump_shows_type_and_debug_form() {
        let out = run("dump(\"hi\") dump('c') dump(3) dump(Array<String>(\"a\"))").unwrap();
        assert_eq!(out, "String \"hi\"\nChar 'c'\nInt 3\nArray<String> [\"a\"]\n");
    }

    #[test]
    fn test_initializer_type_mismatch() {
        assert!(matches!(
            run("var x: Float = 1"),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_self_referencing_initializer_is_uninitialized_read() {
        assert!(matches!(
            run("var x: Int = x + 1"),
            Err(MintError::Runtime(RuntimeError::InvalidOperation { .. }))
        ));
    }

    #[test]
    fn test_bare_expression_statement_is_evaluated() {
        let out = run("var a: Array<Int>\na.append(4)\nprintln(a)").unwrap();
        assert_eq!(out, "[4]\n");
    }
}
