use std::fmt;

use tracing::trace;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Special
    Invalid,
    UnexpectedEof,
    EndOfFile,

    // Symbols
    Semicolon,
    Comma,
    Dot,
    Colon,
    Ternary,
    Assign,
    OpenPar,
    ClosePar,
    OpenBra,
    CloseBra,
    OpenCur,
    CloseCur,

    // Operators
    And,
    Or,
    Lower,
    Greater,
    LowerEqual,
    GreaterEqual,
    Equals,
    NotEquals,
    Add,
    Sub,
    Mul,
    Div,
    Not,

    // Keywords
    Var,
    Let,
    Print,
    Println,
    Dump,
    If,
    Else,
    While,
    For,
    In,
    Read,
    Random,
    ToBool,
    ToInt,
    ToFloat,
    ToChar,
    ToString,
    Bool,
    Int,
    Float,
    Char,
    String,
    Array,
    Dict,
    False,
    True,
    Count,
    Empty,
    Keys,
    Values,
    Append,
    Contains,

    // Others
    Name,
    IntegerLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
}

fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "var" => TokenKind::Var,
        "let" => TokenKind::Let,
        "print" => TokenKind::Print,
        "println" => TokenKind::Println,
        "dump" => TokenKind::Dump,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "read" => TokenKind::Read,
        "random" => TokenKind::Random,
        "toBool" => TokenKind::ToBool,
        "toInt" => TokenKind::ToInt,
        "toFloat" => TokenKind::ToFloat,
        "toChar" => TokenKind::ToChar,
        "toString" => TokenKind::ToString,
        "Bool" => TokenKind::Bool,
        "Int" => TokenKind::Int,
        "Float" => TokenKind::Float,
        "Char" => TokenKind::Char,
        "String" => TokenKind::String,
        "Array" => TokenKind::Array,
        "Dict" => TokenKind::Dict,
        "false" => TokenKind::False,
        "true" => TokenKind::True,
        "count" => TokenKind::Count,
        "empty" => TokenKind::Empty,
        "keys" => TokenKind::Keys,
        "values" => TokenKind::Values,
        "append" => TokenKind::Append,
        "contains" => TokenKind::Contains,
        _ => return None,
    };
    Some(kind)
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    /// Pre-built value, present on literal tokens only.
    pub literal: Option<Value>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, line: usize) -> Self {
        Self {
            kind,
            lexeme,
            line,
            literal: None,
        }
    }

    fn literal(kind: TokenKind, lexeme: String, line: usize, value: Value) -> Self {
        Self {
            kind,
            lexeme,
            line,
            literal: Some(value),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:>4}  {:?} {:?}", self.line, self.kind, self.lexeme)?;
        if let Some(value) = &self.literal {
            write!(f, " = {}", value.repr())?;
        }
        Ok(())
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
        }
    }

    /// Scans the whole input. The last token is always `EndOfFile`, unless
    /// scanning stopped early on an `Invalid` or `UnexpectedEof` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let kind = token.kind;
            tokens.push(token);
            if matches!(
                kind,
                TokenKind::EndOfFile | TokenKind::Invalid | TokenKind::UnexpectedEof
            ) {
                break;
            }
        }
        trace!(count = tokens.len(), "scanned tokens");
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let line = self.line;
        if self.is_at_end() {
            return Token::new(TokenKind::EndOfFile, String::new(), line);
        }

        let ch = self.current_char();
        match ch {
            '"' => return self.read_string(),
            '\'' => return self.read_char(),
            _ if ch.is_ascii_digit() => return self.read_number(),
            _ if ch.is_alphabetic() || ch == '_' => return self.read_identifier(),
            _ => {}
        }

        let start = self.position;
        self.advance();
        let kind = match ch {
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Ternary,
            '(' => TokenKind::OpenPar,
            ')' => TokenKind::ClosePar,
            '[' => TokenKind::OpenBra,
            ']' => TokenKind::CloseBra,
            '{' => TokenKind::OpenCur,
            '}' => TokenKind::CloseCur,
            '+' => TokenKind::Add,
            '-' => TokenKind::Sub,
            '*' => TokenKind::Mul,
            '/' => TokenKind::Div,
            '=' => self.pick('=', TokenKind::Equals, TokenKind::Assign),
            '!' => self.pick('=', TokenKind::NotEquals, TokenKind::Not),
            '<' => self.pick('=', TokenKind::LowerEqual, TokenKind::Lower),
            '>' => self.pick('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '&' => self.pick('&', TokenKind::And, TokenKind::Invalid),
            '|' => self.pick('|', TokenKind::Or, TokenKind::Invalid),
            _ => TokenKind::Invalid,
        };

        let lexeme: String = self.input[start..self.position].iter().collect();
        Token::new(kind, lexeme, line)
    }

    // Consumes `next` when it follows, choosing between the two-char and
    // one-char token kinds.
    fn pick(&mut self, next: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if !self.is_at_end() && self.current_char() == next {
            self.advance();
            double
        } else {
            single
        }
    }

    fn read_string(&mut self) -> Token {
        let line = self.line;
        self.advance(); // Skip opening quote
        let mut value = String::new();
        let mut lexeme = String::from('"');

        loop {
            if self.is_at_end() {
                return Token::new(TokenKind::UnexpectedEof, lexeme, line);
            }
            let ch = self.current_char();
            self.advance();
            lexeme.push(ch);
            match ch {
                '"' => break,
                '\\' => {
                    if self.is_at_end() {
                        return Token::new(TokenKind::UnexpectedEof, lexeme, line);
                    }
                    let escaped = self.current_char();
                    self.advance();
                    lexeme.push(escaped);
                    match unescape(escaped, '"') {
                        Some(c) => value.push(c),
                        None => return Token::new(TokenKind::Invalid, lexeme, line),
                    }
                }
                _ => value.push(ch),
            }
        }

        Token::literal(TokenKind::StringLiteral, lexeme, line, Value::String(value))
    }

    fn read_char(&mut self) -> Token {
        let line = self.line;
        self.advance(); // Skip opening quote
        let mut lexeme = String::from('\'');

        if self.is_at_end() {
            return Token::new(TokenKind::UnexpectedEof, lexeme, line);
        }
        let mut ch = self.current_char();
        self.advance();
        lexeme.push(ch);
        if ch == '\'' {
            return Token::new(TokenKind::Invalid, lexeme, line);
        }
        if ch == '\\' {
            if self.is_at_end() {
                return Token::new(TokenKind::UnexpectedEof, lexeme, line);
            }
            let escaped = self.current_char();
            self.advance();
            lexeme.push(escaped);
            ch = match unescape(escaped, '\'') {
                Some(c) => c,
                None => return Token::new(TokenKind::Invalid, lexeme, line),
            };
        }

        if self.is_at_end() {
            return Token::new(TokenKind::UnexpectedEof, lexeme, line);
        }
        let closing = self.current_char();
        self.advance();
        lexeme.push(closing);
        if closing != '\'' {
            return Token::new(TokenKind::Invalid, lexeme, line);
        }

        Token::literal(TokenKind::CharLiteral, lexeme, line, Value::Char(ch))
    }

    fn read_identifier(&mut self) -> Token {
        let line = self.line;
        let mut value = String::new();

        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            value.push(self.current_char());
            self.advance();
        }

        let kind = keyword(&value).unwrap_or(TokenKind::Name);
        Token::new(kind, value, line)
    }

    fn read_number(&mut self) -> Token {
        let line = self.line;
        let mut value = String::new();

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        let is_float = !self.is_at_end()
            && self.current_char() == '.'
            && self.peek_char().map_or(false, |c| c.is_ascii_digit());

        if is_float {
            value.push('.');
            self.advance();
            while !self.is_at_end() && self.current_char().is_ascii_digit() {
                value.push(self.current_char());
                self.advance();
            }
            return match value.parse::<f32>() {
                Ok(x) => Token::literal(TokenKind::FloatLiteral, value, line, Value::Float(x)),
                Err(_) => Token::new(TokenKind::Invalid, value, line),
            };
        }

        match value.parse::<i32>() {
            Ok(n) => Token::literal(TokenKind::IntegerLiteral, value, line, Value::Int(n)),
            Err(_) => Token::new(TokenKind::Invalid, value, line),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_at_end() {
            match self.current_char() {
                ' ' | '\r' | '\t' | '\n' => self.advance(),
                '#' => {
                    while !self.is_at_end() && self.current_char() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn current_char(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.position]
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            if self.current_char() == '\n' {
                self.line += 1;
            }
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

fn unescape(escaped: char, quote: char) -> Option<char> {
    match escaped {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        c if c == quote => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).tokenize().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_names() {
        assert_eq!(
            kinds("var x: Array<Int>"),
            vec![
                TokenKind::Var,
                TokenKind::Name,
                TokenKind::Colon,
                TokenKind::Array,
                TokenKind::Lower,
                TokenKind::Int,
                TokenKind::Greater,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        let tokens = Lexer::new("a <= b && c != d || !e == f").tokenize();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(
            lexemes,
            vec!["a", "<=", "b", "&&", "c", "!=", "d", "||", "!", "e", "==", "f", ""]
        );
    }

    #[test]
    fn test_literals_carry_values() {
        let tokens = Lexer::new(r#"42 2.5 'a' '\n' "hi\tthere""#).tokenize();
        assert_eq!(tokens[0].literal, Some(Value::Int(42)));
        assert_eq!(tokens[1].literal, Some(Value::Float(2.5)));
        assert_eq!(tokens[2].literal, Some(Value::Char('a')));
        assert_eq!(tokens[3].literal, Some(Value::Char('\n')));
        assert_eq!(tokens[4].literal, Some(Value::String("hi\tthere".to_string())));
        assert_eq!(tokens[4].kind, TokenKind::StringLiteral);
    }

    #[test]
    fn test_number_followed_by_method_dot() {
        assert_eq!(
            kinds("1.count"),
            vec![TokenKind::IntegerLiteral, TokenKind::Dot, TokenKind::Count, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn test_lines_and_comments() {
        let tokens = Lexer::new("# header\nvar\n\n  x # trailing\n;").tokenize();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![2, 4, 5, 5]);
    }

    #[test]
    fn test_invalid_and_unterminated() {
        assert_eq!(kinds("x @"), vec![TokenKind::Name, TokenKind::Invalid]);
        assert_eq!(kinds("a | b"), vec![TokenKind::Name, TokenKind::Invalid]);
        assert_eq!(kinds("\"open"), vec![TokenKind::UnexpectedEof]);
        assert_eq!(kinds("'a"), vec![TokenKind::UnexpectedEof]);
        assert_eq!(kinds("99999999999"), vec![TokenKind::Invalid]);
    }
}
