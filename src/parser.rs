use tracing::debug;

use crate::ast::{ActionOp, BinaryOp, CastOp, Command, Expr, FunctionOp, UnaryOp};
use crate::environment::{Environment, ScopeId};
use crate::error::{InternalError, ParseError, ParseResult, RuntimeError};
use crate::lexer::{Token, TokenKind};
use crate::types::Type;
use crate::value::Value;

/// Tokens that may start a command.
const COMMAND_START: &[TokenKind] = &[
    TokenKind::OpenCur,
    TokenKind::Var,
    TokenKind::Let,
    TokenKind::Print,
    TokenKind::Println,
    TokenKind::Dump,
    TokenKind::If,
    TokenKind::While,
    TokenKind::For,
    TokenKind::Not,
    TokenKind::Sub,
    TokenKind::OpenPar,
    TokenKind::False,
    TokenKind::True,
    TokenKind::IntegerLiteral,
    TokenKind::FloatLiteral,
    TokenKind::CharLiteral,
    TokenKind::StringLiteral,
    TokenKind::Read,
    TokenKind::Random,
    TokenKind::ToBool,
    TokenKind::ToInt,
    TokenKind::ToFloat,
    TokenKind::ToChar,
    TokenKind::ToString,
    TokenKind::Array,
    TokenKind::Dict,
    TokenKind::Name,
];

/// Recursive-descent parser. Builds the command tree and, along the way,
/// the scope chain: declarations go into the current scope and every
/// `{ ... }` opens a child scope until its closing brace.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    environment: Environment,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::EndOfFile, String::new(), 1));
        }
        Self {
            tokens,
            current: 0,
            environment: Environment::new(),
        }
    }

    /// Get a reference to the environment built so far
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Take ownership of the environment (consumes the parser)
    pub fn into_environment(self) -> Environment {
        self.environment
    }

    /// Parses the whole program into a single root block bound to the
    /// global scope.
    pub fn parse(&mut self) -> ParseResult<Command> {
        let global = self.environment.global_scope();
        let root = self.proc_code(Some(global))?;
        self.eat(TokenKind::EndOfFile)?;
        debug!(scopes = self.environment.scope_count(), "parsed program");
        Ok(root)
    }

    // <code> ::= { <cmd> }
    fn proc_code(&mut self, scope: Option<ScopeId>) -> ParseResult<Command> {
        let line = self.peek().line;
        let mut commands = Vec::new();
        while self.check_any(COMMAND_START) {
            commands.push(self.proc_cmd()?);
        }
        Ok(Command::Blocks {
            line,
            scope,
            commands,
        })
    }

    // <cmd> ::= <block> | <decl> | <print> | <dump> | <if> | <while> | <for> | <assign>
    fn proc_cmd(&mut self) -> ParseResult<Command> {
        match self.peek().kind {
            TokenKind::OpenCur => self.proc_block(),
            TokenKind::Var => self.proc_var(),
            TokenKind::Let => self.proc_let(),
            TokenKind::Print | TokenKind::Println => self.proc_print(),
            TokenKind::Dump => self.proc_dump(),
            TokenKind::If => self.proc_if(),
            TokenKind::While => self.proc_while(),
            TokenKind::For => self.proc_for(),
            _ if self.check_any(COMMAND_START) => self.proc_assign(),
            _ => Err(self.report_error()),
        }
    }

    // <block> ::= '{' <code> '}'
    fn proc_block(&mut self) -> ParseResult<Command> {
        self.eat(TokenKind::OpenCur)?;
        let scope = self.environment.enter_scope();

        let block = self.proc_code(Some(scope))?;
        self.eat(TokenKind::CloseCur)?;

        self.environment.exit_scope()?;
        Ok(block)
    }

    // <var> ::= var <name> ':' <type> [ '=' <expr> ] { ',' <name> ':' <type> [ '=' <expr> ] } [';']
    fn proc_var(&mut self) -> ParseResult<Command> {
        let line = self.eat(TokenKind::Var)?.line;
        let mut commands = Vec::new();

        loop {
            let name = self.proc_name()?;
            self.eat(TokenKind::Colon)?;
            let ty = self.proc_type()?;
            let variable = self.environment.declare(&name.lexeme, ty, true, name.line)?;

            let expr = if self.matches(TokenKind::Assign) {
                Some(self.proc_expr()?)
            } else {
                None
            };
            commands.push(Command::Initialize {
                line: name.line,
                variable,
                expr,
            });

            if !self.matches(TokenKind::Comma) {
                break;
            }
        }

        self.matches(TokenKind::Semicolon);
        Ok(Command::Blocks {
            line,
            scope: None,
            commands,
        })
    }

    // <let> ::= let <name> ':' <type> '=' <expr> { ',' <name> ':' <type> '=' <expr> } [';']
    fn proc_let(&mut self) -> ParseResult<Command> {
        let line = self.eat(TokenKind::Let)?.line;
        let mut commands = Vec::new();

        loop {
            let name = self.proc_name()?;
            self.eat(TokenKind::Colon)?;
            let ty = self.proc_type()?;
            let variable = self.environment.declare(&name.lexeme, ty, false, name.line)?;

            self.eat(TokenKind::Assign)?;
            let expr = self.proc_expr()?;
            commands.push(Command::Initialize {
                line: name.line,
                variable,
                expr: Some(expr),
            });

            if !self.matches(TokenKind::Comma) {
                break;
            }
        }

        self.matches(TokenKind::Semicolon);
        Ok(Command::Blocks {
            line,
            scope: None,
            commands,
        })
    }

    // <print> ::= (print | println) '(' <expr> ')' [';']
    fn proc_print(&mut self) -> ParseResult<Command> {
        let token = self.advance();
        let newline = match token.kind {
            TokenKind::Print => false,
            TokenKind::Println => true,
            _ => return Err(InternalError(format!("print on {:?}", token.kind)).into()),
        };

        self.eat(TokenKind::OpenPar)?;
        let expr = self.proc_expr()?;
        self.eat(TokenKind::ClosePar)?;
        self.matches(TokenKind::Semicolon);

        Ok(Command::Print {
            line: token.line,
            expr,
            newline,
        })
    }

    // <dump> ::= dump '(' <expr> ')' [';']
    fn proc_dump(&mut self) -> ParseResult<Command> {
        let line = self.eat(TokenKind::Dump)?.line;
        self.eat(TokenKind::OpenPar)?;
        let expr = self.proc_expr()?;
        self.eat(TokenKind::ClosePar)?;
        self.matches(TokenKind::Semicolon);

        Ok(Command::Dump { line, expr })
    }

    // <if> ::= if <expr> <cmd> [ else <cmd> ]
    fn proc_if(&mut self) -> ParseResult<Command> {
        let line = self.eat(TokenKind::If)?.line;
        let condition = self.proc_expr()?;
        let then_branch = Box::new(self.proc_cmd()?);

        let else_branch = if self.matches(TokenKind::Else) {
            Some(Box::new(self.proc_cmd()?))
        } else {
            None
        };

        Ok(Command::If {
            line,
            condition,
            then_branch,
            else_branch,
        })
    }

    // <while> ::= while <expr> <cmd>
    fn proc_while(&mut self) -> ParseResult<Command> {
        let line = self.eat(TokenKind::While)?.line;
        let condition = self.proc_expr()?;
        let body = Box::new(self.proc_cmd()?);

        Ok(Command::While {
            line,
            condition,
            body,
        })
    }

    // <for> ::= for ( <name> | ( var | let ) <name> ':' <type> ) in <expr> <cmd>
    fn proc_for(&mut self) -> ParseResult<Command> {
        let line = self.eat(TokenKind::For)?.line;

        let (variable, declared) = if self.check_any(&[TokenKind::Var, TokenKind::Let]) {
            let mutable = self.advance().kind == TokenKind::Var;
            let name = self.proc_name()?;
            self.eat(TokenKind::Colon)?;
            let ty = self.proc_type()?;
            let id = self.environment.declare(&name.lexeme, ty, mutable, name.line)?;
            (id, true)
        } else {
            let name = self.proc_name()?;
            (self.environment.get(&name.lexeme, name.line)?, false)
        };

        self.eat(TokenKind::In)?;
        let iterable = self.proc_expr()?;
        let body = Box::new(self.proc_cmd()?);

        Ok(Command::For {
            line,
            variable,
            declared,
            iterable,
            body,
        })
    }

    // <assign> ::= [ <expr> '=' ] <expr> [ ';' ]
    fn proc_assign(&mut self) -> ParseResult<Command> {
        let line = self.peek().line;
        let expr = self.proc_expr()?;

        let command = if self.check(TokenKind::Assign) {
            let assign_line = self.advance().line;
            if !expr.is_assignable() {
                return Err(RuntimeError::invalid_operation(
                    assign_line,
                    "left side of '=' is not assignable",
                )
                .into());
            }
            let value = self.proc_expr()?;
            Command::Assign {
                line,
                target: Some(expr),
                expr: value,
            }
        } else {
            Command::Assign {
                line,
                target: None,
                expr,
            }
        };

        self.matches(TokenKind::Semicolon);
        Ok(command)
    }

    // <type> ::= <primitive> | <composed>
    fn proc_type(&mut self) -> ParseResult<Type> {
        let ty = match self.peek().kind {
            TokenKind::Bool => Type::Bool,
            TokenKind::Int => Type::Int,
            TokenKind::Float => Type::Float,
            TokenKind::Char => Type::Char,
            TokenKind::String => Type::String,
            TokenKind::Array => return Ok(Type::array(self.proc_array_type()?)),
            TokenKind::Dict => {
                let (key, value) = self.proc_dict_type()?;
                return Ok(Type::dict(key, value));
            }
            _ => return Err(self.report_error()),
        };
        self.advance();
        Ok(ty)
    }

    // <arraytype> ::= Array '<' <type> '>'
    // Returns the element type.
    fn proc_array_type(&mut self) -> ParseResult<Type> {
        self.eat(TokenKind::Array)?;
        self.eat(TokenKind::Lower)?;
        let elem = self.proc_type()?;
        self.eat(TokenKind::Greater)?;
        Ok(elem)
    }

    // <dicttype> ::= Dict '<' <type> ',' <type> '>'
    // Returns the key and value types.
    fn proc_dict_type(&mut self) -> ParseResult<(Type, Type)> {
        self.eat(TokenKind::Dict)?;
        self.eat(TokenKind::Lower)?;
        let key = self.proc_type()?;
        self.eat(TokenKind::Comma)?;
        let value = self.proc_type()?;
        self.eat(TokenKind::Greater)?;
        Ok((key, value))
    }

    // <expr> ::= <cond> [ '?' <expr> ':' <expr> ]
    fn proc_expr(&mut self) -> ParseResult<Expr> {
        let condition = self.proc_cond()?;

        if self.check(TokenKind::Ternary) {
            let line = self.advance().line;
            let then_expr = self.proc_expr()?;
            self.eat(TokenKind::Colon)?;
            let else_expr = self.proc_expr()?;
            return Ok(Expr::Conditional {
                line,
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            });
        }

        Ok(condition)
    }

    // <cond> ::= <rel> { ( '&&' | '||' ) <rel> }
    //
    // `&&` and `||` share one tier and fold left: `a || b && c` is
    // `(a || b) && c`.
    fn proc_cond(&mut self) -> ParseResult<Expr> {
        let mut left = self.proc_rel()?;

        while self.check_any(&[TokenKind::And, TokenKind::Or]) {
            let token = self.advance();
            let op = match token.kind {
                TokenKind::And => BinaryOp::And,
                TokenKind::Or => BinaryOp::Or,
                _ => return Err(InternalError(format!("logical op on {:?}", token.kind)).into()),
            };
            let right = self.proc_rel()?;
            left = Expr::Binary {
                line: token.line,
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    // <rel> ::= <arith> [ ( '<' | '>' | '<=' | '>=' | '==' | '!=' ) <arith> ]
    fn proc_rel(&mut self) -> ParseResult<Expr> {
        let left = self.proc_arith()?;

        let op = match self.peek().kind {
            TokenKind::Lower => BinaryOp::LowerThan,
            TokenKind::Greater => BinaryOp::GreaterThan,
            TokenKind::LowerEqual => BinaryOp::LowerEqual,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            TokenKind::Equals => BinaryOp::Equal,
            TokenKind::NotEquals => BinaryOp::NotEqual,
            _ => return Ok(left),
        };
        let line = self.advance().line;
        let right = self.proc_arith()?;

        Ok(Expr::Binary {
            line,
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    // <arith> ::= <term> { ( '+' | '-' ) <term> }
    fn proc_arith(&mut self) -> ParseResult<Expr> {
        let mut left = self.proc_term()?;

        while self.check_any(&[TokenKind::Add, TokenKind::Sub]) {
            let token = self.advance();
            let op = if token.kind == TokenKind::Add {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            let right = self.proc_term()?;
            left = Expr::Binary {
                line: token.line,
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    // <term> ::= <prefix> { ( '*' | '/' ) <prefix> }
    fn proc_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.proc_prefix()?;

        while self.check_any(&[TokenKind::Mul, TokenKind::Div]) {
            let token = self.advance();
            let op = if token.kind == TokenKind::Mul {
                BinaryOp::Mul
            } else {
                BinaryOp::Div
            };
            let right = self.proc_prefix()?;
            left = Expr::Binary {
                line: token.line,
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    // <prefix> ::= [ '!' | '-' ] <factor>
    fn proc_prefix(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Sub => Some(UnaryOp::Neg),
            _ => None,
        };

        match op {
            Some(op) => {
                let line = self.advance().line;
                let operand = self.proc_factor()?;
                Ok(Expr::Unary {
                    line,
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.proc_factor(),
        }
    }

    // <factor> ::= ( '(' <expr> ')' | <rvalue> ) <function>
    fn proc_factor(&mut self) -> ParseResult<Expr> {
        let expr = if self.matches(TokenKind::OpenPar) {
            let expr = self.proc_expr()?;
            self.eat(TokenKind::ClosePar)?;
            expr
        } else {
            self.proc_rvalue()?
        };

        self.proc_function(expr)
    }

    // <rvalue> ::= <const> | <action> | <cast> | <array> | <dict> | <lvalue>
    fn proc_rvalue(&mut self) -> ParseResult<Expr> {
        match self.peek().kind {
            TokenKind::False
            | TokenKind::True
            | TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral => self.proc_const(),
            TokenKind::Read | TokenKind::Random => self.proc_action(),
            TokenKind::ToBool
            | TokenKind::ToInt
            | TokenKind::ToFloat
            | TokenKind::ToChar
            | TokenKind::ToString => self.proc_cast(),
            TokenKind::Array => self.proc_array(),
            TokenKind::Dict => self.proc_dict(),
            TokenKind::Name => self.proc_lvalue(),
            _ => Err(self.report_error()),
        }
    }

    // <const> ::= <bool> | <int> | <float> | <char> | <string>
    fn proc_const(&mut self) -> ParseResult<Expr> {
        let token = self.advance();
        let value = match token.kind {
            TokenKind::False => Value::Bool(false),
            TokenKind::True => Value::Bool(true),
            _ => token.literal.ok_or_else(|| {
                InternalError(format!("literal token {:?} carries no value", token.lexeme))
            })?,
        };

        Ok(Expr::Const {
            line: token.line,
            value,
        })
    }

    // <action> ::= ( read | random ) '(' ')'
    fn proc_action(&mut self) -> ParseResult<Expr> {
        let token = self.advance();
        let op = match token.kind {
            TokenKind::Read => ActionOp::Read,
            TokenKind::Random => ActionOp::Random,
            _ => return Err(InternalError(format!("action on {:?}", token.kind)).into()),
        };

        self.eat(TokenKind::OpenPar)?;
        self.eat(TokenKind::ClosePar)?;

        Ok(Expr::Action {
            line: token.line,
            op,
        })
    }

    // <cast> ::= ( toBool | toInt | toFloat | toChar | toString ) '(' <expr> ')'
    fn proc_cast(&mut self) -> ParseResult<Expr> {
        let token = self.advance();
        let op = match token.kind {
            TokenKind::ToBool => CastOp::ToBool,
            TokenKind::ToInt => CastOp::ToInt,
            TokenKind::ToFloat => CastOp::ToFloat,
            TokenKind::ToChar => CastOp::ToChar,
            TokenKind::ToString => CastOp::ToString,
            _ => return Err(InternalError(format!("cast on {:?}", token.kind)).into()),
        };

        self.eat(TokenKind::OpenPar)?;
        let expr = self.proc_expr()?;
        self.eat(TokenKind::ClosePar)?;

        Ok(Expr::Cast {
            line: token.line,
            op,
            expr: Box::new(expr),
        })
    }

    // <array> ::= <arraytype> '(' [ <expr> { ',' <expr> } ] ')'
    fn proc_array(&mut self) -> ParseResult<Expr> {
        let line = self.peek().line;
        let elem = self.proc_array_type()?;

        self.eat(TokenKind::OpenPar)?;
        let mut items = Vec::new();
        if !self.check(TokenKind::ClosePar) {
            items.push(self.proc_expr()?);
            while self.matches(TokenKind::Comma) {
                items.push(self.proc_expr()?);
            }
        }
        self.eat(TokenKind::ClosePar)?;

        Ok(Expr::ArrayLiteral { line, elem, items })
    }

    // <dict> ::= <dicttype> '(' [ <expr> ':' <expr> { ',' <expr> ':' <expr> } ] ')'
    fn proc_dict(&mut self) -> ParseResult<Expr> {
        let line = self.peek().line;
        let (key, value) = self.proc_dict_type()?;

        self.eat(TokenKind::OpenPar)?;
        let mut items = Vec::new();
        if !self.check(TokenKind::ClosePar) {
            items.push(self.proc_dict_item()?);
            while self.matches(TokenKind::Comma) {
                items.push(self.proc_dict_item()?);
            }
        }
        self.eat(TokenKind::ClosePar)?;

        Ok(Expr::DictLiteral {
            line,
            key,
            value,
            items,
        })
    }

    fn proc_dict_item(&mut self) -> ParseResult<(Expr, Expr)> {
        let key = self.proc_expr()?;
        self.eat(TokenKind::Colon)?;
        let value = self.proc_expr()?;
        Ok((key, value))
    }

    // <lvalue> ::= <name> { '[' <expr> ']' }
    fn proc_lvalue(&mut self) -> ParseResult<Expr> {
        let name = self.proc_name()?;
        let id = self.environment.get(&name.lexeme, name.line)?;
        let mut expr = Expr::Variable {
            line: name.line,
            id,
        };

        while self.check(TokenKind::OpenBra) {
            let line = self.advance().line;
            let index = self.proc_expr()?;
            self.eat(TokenKind::CloseBra)?;
            expr = Expr::Access {
                line,
                base: Box::new(expr),
                index: Box::new(index),
            };
        }

        Ok(expr)
    }

    // <function> ::= { '.' ( <fnoargs> | <fonearg> ) }
    // <fnoargs>  ::= ( count | empty | keys | values ) '(' ')'
    // <fonearg>  ::= ( append | contains ) '(' <expr> ')'
    fn proc_function(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        while self.matches(TokenKind::Dot) {
            let (op, takes_arg) = match self.peek().kind {
                TokenKind::Count => (FunctionOp::Count, false),
                TokenKind::Empty => (FunctionOp::Empty, false),
                TokenKind::Keys => (FunctionOp::Keys, false),
                TokenKind::Values => (FunctionOp::Values, false),
                TokenKind::Append => (FunctionOp::Append, true),
                TokenKind::Contains => (FunctionOp::Contains, true),
                _ => return Err(self.report_error()),
            };
            let line = self.advance().line;

            self.eat(TokenKind::OpenPar)?;
            let arg = if takes_arg {
                Some(Box::new(self.proc_expr()?))
            } else {
                None
            };
            self.eat(TokenKind::ClosePar)?;

            expr = Expr::Function {
                line,
                op,
                base: Box::new(expr),
                arg,
            };
        }

        Ok(expr)
    }

    fn proc_name(&mut self) -> ParseResult<Token> {
        self.eat(TokenKind::Name)
    }

    fn report_error(&self) -> crate::error::MintError {
        let token = self.peek();
        let line = token.line;
        match token.kind {
            TokenKind::Invalid => ParseError::InvalidLexeme {
                lexeme: token.lexeme.clone(),
                line,
            },
            TokenKind::UnexpectedEof | TokenKind::EndOfFile => ParseError::UnexpectedEof { line },
            _ => ParseError::UnexpectedLexeme {
                lexeme: token.lexeme.clone(),
                line,
            },
        }
        .into()
    }

    fn eat(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            debug!(expected = ?kind, found = ?self.peek().kind, line = self.peek().line, "syntax error");
            Err(self.report_error())
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek().kind)
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
        token
    }
}
