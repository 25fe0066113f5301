use crate::environment::{ScopeId, VariableId};
use crate::types::Type;
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Command {
    /// Commands run in order. `scope` is set for `{ ... }` blocks and for
    /// the program root; declaration lists carry `None`.
    Blocks {
        line: usize,
        scope: Option<ScopeId>,
        commands: Vec<Command>,
    },
    Initialize {
        line: usize,
        variable: VariableId,
        expr: Option<Expr>,
    },
    /// `target = expr`, or a bare expression statement when `target` is
    /// `None`.
    Assign {
        line: usize,
        target: Option<Expr>,
        expr: Expr,
    },
    Print {
        line: usize,
        expr: Expr,
        newline: bool,
    },
    Dump {
        line: usize,
        expr: Expr,
    },
    If {
        line: usize,
        condition: Expr,
        then_branch: Box<Command>,
        else_branch: Option<Box<Command>>,
    },
    While {
        line: usize,
        condition: Expr,
        body: Box<Command>,
    },
    For {
        line: usize,
        variable: VariableId,
        /// The loop variable was declared by the `for` header itself.
        declared: bool,
        iterable: Expr,
        body: Box<Command>,
    },
}

impl Command {
    pub fn line(&self) -> usize {
        match self {
            Command::Blocks { line, .. }
            | Command::Initialize { line, .. }
            | Command::Assign { line, .. }
            | Command::Print { line, .. }
            | Command::Dump { line, .. }
            | Command::If { line, .. }
            | Command::While { line, .. }
            | Command::For { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Const {
        line: usize,
        value: Value,
    },
    Binary {
        line: usize,
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        line: usize,
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Conditional {
        line: usize,
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Cast {
        line: usize,
        op: CastOp,
        expr: Box<Expr>,
    },
    Action {
        line: usize,
        op: ActionOp,
    },
    ArrayLiteral {
        line: usize,
        elem: Type,
        items: Vec<Expr>,
    },
    DictLiteral {
        line: usize,
        key: Type,
        value: Type,
        items: Vec<(Expr, Expr)>,
    },
    Variable {
        line: usize,
        id: VariableId,
    },
    Access {
        line: usize,
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Function {
        line: usize,
        op: FunctionOp,
        base: Box<Expr>,
        arg: Option<Box<Expr>>,
    },
}

impl Expr {
    pub fn line(&self) -> usize {
        match self {
            Expr::Const { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Conditional { line, .. }
            | Expr::Cast { line, .. }
            | Expr::Action { line, .. }
            | Expr::ArrayLiteral { line, .. }
            | Expr::DictLiteral { line, .. }
            | Expr::Variable { line, .. }
            | Expr::Access { line, .. }
            | Expr::Function { line, .. } => *line,
        }
    }

    /// Whether the expression may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expr::Variable { .. } | Expr::Access { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Equal,
    NotEqual,
    LowerThan,
    LowerEqual,
    GreaterThan,
    GreaterEqual,
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOp {
    ToBool,
    ToInt,
    ToFloat,
    ToChar,
    ToString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOp {
    Read,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionOp {
    Count,
    Empty,
    Keys,
    Values,
    Append,
    Contains,
}

impl FunctionOp {
    pub fn name(self) -> &'static str {
        match self {
            FunctionOp::Count => "count",
            FunctionOp::Empty => "empty",
            FunctionOp::Keys => "keys",
            FunctionOp::Values => "values",
            FunctionOp::Append => "append",
            FunctionOp::Contains => "contains",
        }
    }
}
