use std::collections::HashMap;

use tracing::trace;

use crate::error::{InternalError, MintResult, RuntimeError};
use crate::types::Type;
use crate::value::Value;

pub type ScopeId = usize;
pub type VariableId = usize;

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    value: Option<Value>,
}

impl Variable {
    pub fn new(name: String, ty: Type, mutable: bool) -> Self {
        Self {
            name,
            ty,
            mutable,
            value: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub variables: HashMap<String, VariableId>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            variables: HashMap::new(),
        }
    }

    pub fn get_variable(&self, name: &str) -> Option<VariableId> {
        self.variables.get(name).copied()
    }
}

/// The scope chain shared by the parser and the interpreter.
///
/// Scopes live in an arena and point at their parent by index. The parser
/// declares variables and opens/closes scopes while it reads the program;
/// the interpreter then reads and writes the same variables by id.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
    current_scope: ScopeId,
    global_scope: ScopeId,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None)],
            variables: Vec::new(),
            current_scope: 0,
            global_scope: 0,
        }
    }

    pub fn enter_scope(&mut self) -> ScopeId {
        let scope_id = self.scopes.len();
        let parent = self.current_scope;

        self.scopes.push(Scope::new(Some(parent)));
        self.current_scope = scope_id;
        trace!(scope = scope_id, parent, "entered scope");
        scope_id
    }

    pub fn exit_scope(&mut self) -> Result<ScopeId, InternalError> {
        if self.current_scope == self.global_scope {
            return Err(InternalError("cannot exit the global scope".to_string()));
        }

        let parent = self.scopes[self.current_scope]
            .parent
            .ok_or_else(|| InternalError("scope has no parent".to_string()))?;
        trace!(scope = self.current_scope, "exited scope");
        self.current_scope = parent;
        Ok(parent)
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current_scope
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global_scope
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn get_scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn declare(
        &mut self,
        name: &str,
        ty: Type,
        mutable: bool,
        line: usize,
    ) -> Result<VariableId, RuntimeError> {
        let scope = &mut self.scopes[self.current_scope];
        if scope.variables.contains_key(name) {
            return Err(RuntimeError::DuplicateDeclaration {
                name: name.to_string(),
                line,
            });
        }

        let id = self.variables.len();
        scope.variables.insert(name.to_string(), id);
        self.variables
            .push(Variable::new(name.to_string(), ty, mutable));
        Ok(id)
    }

    /// Look up a variable by name, searching from the current scope up to
    /// the global scope.
    pub fn lookup(&self, name: &str) -> Option<VariableId> {
        let mut scope_id = Some(self.current_scope);
        while let Some(id) = scope_id {
            let scope = self.scopes.get(id)?;
            if let Some(variable) = scope.get_variable(name) {
                return Some(variable);
            }
            scope_id = scope.parent;
        }
        None
    }

    pub fn get(&self, name: &str, line: usize) -> Result<VariableId, RuntimeError> {
        self.lookup(name)
            .ok_or_else(|| RuntimeError::UndeclaredVariable {
                name: name.to_string(),
                line,
            })
    }

    pub fn variable(&self, id: VariableId) -> Result<&Variable, InternalError> {
        self.variables
            .get(id)
            .ok_or_else(|| InternalError(format!("unknown variable id {}", id)))
    }

    fn variable_mut(&mut self, id: VariableId) -> Result<&mut Variable, InternalError> {
        self.variables
            .get_mut(id)
            .ok_or_else(|| InternalError(format!("unknown variable id {}", id)))
    }

    pub fn read(&self, id: VariableId, line: usize) -> MintResult<Value> {
        let variable = self.variable(id)?;
        match &variable.value {
            Some(value) => Ok(value.clone()),
            None => Err(RuntimeError::invalid_operation(
                line,
                format!("{} used before initialization", variable.name),
            )
            .into()),
        }
    }

    /// First write of a declaration. Allowed on `let` variables.
    pub fn initialize(&mut self, id: VariableId, value: Value, line: usize) -> MintResult<()> {
        let variable = self.variable_mut(id)?;
        check_type(variable, &value, line)?;
        variable.value = Some(value);
        Ok(())
    }

    /// Assignment through `=`. A `let` variable that already holds a value
    /// rejects the write.
    pub fn assign(&mut self, id: VariableId, value: Value, line: usize) -> MintResult<()> {
        let variable = self.variable_mut(id)?;
        if !variable.mutable && variable.value.is_some() {
            return Err(RuntimeError::ImmutableAssignment {
                name: variable.name.clone(),
                line,
            }
            .into());
        }
        check_type(variable, &value, line)?;
        variable.value = Some(value);
        Ok(())
    }

    /// Releases the values held by the variables of `scope`, so the block
    /// can run again from a clean state.
    pub fn release_scope(&mut self, scope: ScopeId) -> Result<(), InternalError> {
        let ids: Vec<VariableId> = self
            .get_scope(scope)
            .ok_or_else(|| InternalError(format!("unknown scope id {}", scope)))?
            .variables
            .values()
            .copied()
            .collect();
        for id in ids {
            self.variable_mut(id)?.value = None;
        }
        Ok(())
    }
}

fn check_type(variable: &Variable, value: &Value, line: usize) -> Result<(), RuntimeError> {
    let actual = value.ty();
    if variable.ty.matches(&actual) {
        Ok(())
    } else {
        Err(RuntimeError::invalid_type(line, actual.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MintError;

    #[test]
    fn test_environment_creation() {
        let env = Environment::new();
        assert_eq!(env.current_scope(), 0);
        assert_eq!(env.global_scope(), 0);
        assert_eq!(env.scope_count(), 1);
        assert_eq!(env.get_scope(0).unwrap().parent, None);
    }

    #[test]
    fn test_scope_management() {
        let mut env = Environment::new();

        let outer = env.enter_scope();
        assert_eq!(outer, 1);
        let inner = env.enter_scope();
        assert_eq!(inner, 2);
        assert_eq!(env.get_scope(inner).unwrap().parent, Some(outer));

        assert_eq!(env.exit_scope().unwrap(), outer);
        assert_eq!(env.exit_scope().unwrap(), 0);
        assert!(env.exit_scope().is_err());
    }

    #[test]
    fn test_scope_shadowing() {
        let mut env = Environment::new();
        let global = env.declare("x", Type::Int, false, 1).unwrap();

        env.enter_scope();
        let local = env.declare("x", Type::String, true, 2).unwrap();
        assert_eq!(env.get("x", 3).unwrap(), local);
        assert_ne!(local, global);

        env.exit_scope().unwrap();
        assert_eq!(env.get("x", 4).unwrap(), global);
        assert_eq!(env.variable(global).unwrap().ty, Type::Int);
    }

    #[test]
    fn test_block_variable_invisible_after_exit() {
        let mut env = Environment::new();
        env.enter_scope();
        env.declare("inner", Type::Bool, true, 1).unwrap();
        env.exit_scope().unwrap();

        assert_eq!(
            env.get("inner", 5),
            Err(RuntimeError::UndeclaredVariable {
                name: "inner".to_string(),
                line: 5
            })
        );
    }

    #[test]
    fn test_redeclaration_error() {
        let mut env = Environment::new();
        env.declare("x", Type::Int, false, 1).unwrap();
        assert!(matches!(
            env.declare("x", Type::String, false, 2),
            Err(RuntimeError::DuplicateDeclaration { line: 2, .. })
        ));
    }

    #[test]
    fn test_let_is_single_assignment() {
        let mut env = Environment::new();
        let x = env.declare("x", Type::Int, false, 1).unwrap();
        env.initialize(x, Value::Int(1), 1).unwrap();

        match env.assign(x, Value::Int(2), 2) {
            Err(MintError::Runtime(RuntimeError::ImmutableAssignment { name, line })) => {
                assert_eq!(name, "x");
                assert_eq!(line, 2);
            }
            other => panic!("Expected immutability error, got {:?}", other),
        }
        assert_eq!(env.read(x, 3).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_assign_checks_declared_type() {
        let mut env = Environment::new();
        let x = env.declare("x", Type::Float, true, 1).unwrap();
        assert!(matches!(
            env.assign(x, Value::Int(2), 1),
            Err(MintError::Runtime(RuntimeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_release_scope_clears_values() {
        let mut env = Environment::new();
        let block = env.enter_scope();
        let y = env.declare("y", Type::Int, false, 1).unwrap();
        env.initialize(y, Value::Int(5), 1).unwrap();
        env.exit_scope().unwrap();

        env.release_scope(block).unwrap();
        assert!(!env.variable(y).unwrap().is_initialized());
        // A released `let` can be initialized again.
        env.initialize(y, Value::Int(6), 1).unwrap();
    }
}
