use serde::Serialize;
use thiserror::Error;

// Parser Errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid lexeme [{lexeme}]")]
    InvalidLexeme { lexeme: String, line: usize },
    #[error("Unexpected end of file")]
    UnexpectedEof { line: usize },
    #[error("Unexpected lexeme [{lexeme}]")]
    UnexpectedLexeme { lexeme: String, line: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidLexeme { line, .. }
            | ParseError::UnexpectedEof { line }
            | ParseError::UnexpectedLexeme { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::InvalidLexeme { .. } => "InvalidLexeme",
            ParseError::UnexpectedEof { .. } => "UnexpectedEOF",
            ParseError::UnexpectedLexeme { .. } => "UnexpectedLexeme",
        }
    }
}

// Semantic and runtime errors, raised by the environment and the interpreter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Invalid type [{detail}]")]
    InvalidType { detail: String, line: usize },
    #[error("Invalid operation [{detail}]")]
    InvalidOperation { detail: String, line: usize },
    #[error("Undeclared variable [{name}]")]
    UndeclaredVariable { name: String, line: usize },
    #[error("Variable already declared [{name}]")]
    DuplicateDeclaration { name: String, line: usize },
    #[error("Cannot assign to immutable variable [{name}]")]
    ImmutableAssignment { name: String, line: usize },
    #[error("Index out of bounds [{detail}]")]
    IndexOutOfBounds { detail: String, line: usize },
    #[error("Key not found [{detail}]")]
    KeyNotFound { detail: String, line: usize },
    #[error("Division by zero")]
    DivisionByZero { line: usize },
    #[error("Read error [{detail}]")]
    ReadError { detail: String, line: usize },
}

impl RuntimeError {
    pub fn invalid_type(line: usize, detail: impl Into<String>) -> Self {
        RuntimeError::InvalidType {
            detail: detail.into(),
            line,
        }
    }

    pub fn invalid_operation(line: usize, detail: impl Into<String>) -> Self {
        RuntimeError::InvalidOperation {
            detail: detail.into(),
            line,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            RuntimeError::InvalidType { line, .. }
            | RuntimeError::InvalidOperation { line, .. }
            | RuntimeError::UndeclaredVariable { line, .. }
            | RuntimeError::DuplicateDeclaration { line, .. }
            | RuntimeError::ImmutableAssignment { line, .. }
            | RuntimeError::IndexOutOfBounds { line, .. }
            | RuntimeError::KeyNotFound { line, .. }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::ReadError { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::InvalidType { .. } => "InvalidType",
            RuntimeError::InvalidOperation { .. } => "InvalidOperation",
            RuntimeError::UndeclaredVariable { .. } => "UndeclaredVariable",
            RuntimeError::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            RuntimeError::ImmutableAssignment { .. } => "ImmutableAssignment",
            RuntimeError::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            RuntimeError::KeyNotFound { .. } => "KeyNotFound",
            RuntimeError::DivisionByZero { .. } => "DivisionByZero",
            RuntimeError::ReadError { .. } => "ReadError",
        }
    }
}

/// An implementation defect: a state the interpreter treats as unreachable.
/// Never produced by a well-formed or ill-formed user program.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("internal error: {0}")]
pub struct InternalError(pub String);

#[derive(Debug, Error)]
pub enum MintError {
    #[error("line {}: {}", .0.line(), .0)]
    Parse(#[from] ParseError),
    #[error("line {}: {}", .0.line(), .0)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MintError {
    pub fn line(&self) -> Option<usize> {
        match self {
            MintError::Parse(e) => Some(e.line()),
            MintError::Runtime(e) => Some(e.line()),
            MintError::Internal(_) | MintError::Io(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MintError::Parse(e) => e.kind(),
            MintError::Runtime(e) => e.kind(),
            MintError::Internal(_) => "Internal",
            MintError::Io(_) => "Io",
        }
    }

    /// Process exit status for this error. Internal faults are kept apart
    /// from language errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            MintError::Internal(_) => 2,
            _ => 1,
        }
    }
}

/// Machine-readable form of a `MintError`, used by `--error-format json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub kind: &'static str,
    pub message: String,
}

impl From<&MintError> for Diagnostic {
    fn from(err: &MintError) -> Self {
        let message = match err {
            MintError::Parse(e) => e.to_string(),
            MintError::Runtime(e) => e.to_string(),
            MintError::Internal(e) => e.0.clone(),
            MintError::Io(e) => e.to_string(),
        };
        Diagnostic {
            line: err.line(),
            kind: err.kind(),
            message,
        }
    }
}

// Result types
pub type ParseResult<T> = Result<T, MintError>;
pub type RuntimeResult<T> = Result<T, MintError>;
pub type MintResult<T> = Result<T, MintError>;
