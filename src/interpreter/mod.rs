pub mod casts;
pub mod expressions;
pub mod methods;
pub mod operators;
pub mod statements;

use tracing::debug;

use crate::ast::Command;
use crate::environment::Environment;
use crate::error::MintResult;
use crate::services::Services;

/// Tree-walking evaluator. Owns the environment the parser built and the
/// services the program talks to; `run` executes a parsed program once.
pub struct Interpreter {
    environment: Environment,
    services: Services,
}

impl Interpreter {
    pub fn new(environment: Environment, services: Services) -> Self {
        Self {
            environment,
            services,
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(line = program.line()))]
    pub fn run(&mut self, program: &Command) -> MintResult<()> {
        debug!("program started");
        let result = self.execute(program);
        match &result {
            Ok(()) => debug!("program finished"),
            Err(err) => debug!(kind = err.kind(), line = ?err.line(), "program failed"),
        }
        result
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn into_services(self) -> Services {
        self.services
    }
}
