//! Tokenizer for rule text.

use crate::{ConfigError, ConfigResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    /// `\.`, the key path marker.
    KeyPathStart,
    Dot,
    Question,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Bang,
    /// `=>`
    Arrow,
    /// `<=`
    Assign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Eof,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("`{name}`"),
            Self::Str(s) => format!("string {s:?}"),
            Self::Int(i) => format!("number {i}"),
            Self::Float(f) => format!("number {f}"),
            Self::KeyPathStart => "`\\.`".into(),
            Self::Dot => "`.`".into(),
            Self::Question => "`?`".into(),
            Self::EqEq => "`==`".into(),
            Self::NotEq => "`!=`".into(),
            Self::AndAnd => "`&&`".into(),
            Self::OrOr => "`||`".into(),
            Self::Bang => "`!`".into(),
            Self::Arrow => "`=>`".into(),
            Self::Assign => "`<=`".into(),
            Self::LParen => "`(`".into(),
            Self::RParen => "`)`".into(),
            Self::LBracket => "`[`".into(),
            Self::RBracket => "`]`".into(),
            Self::Comma => "`,`".into(),
            Self::Colon => "`:`".into(),
            Self::Semicolon => "`;`".into(),
            Self::Eof => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

pub(crate) fn tokenize(source: &str) -> ConfigResult<Vec<Token>> {
    Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    }
    .run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn run(mut self) -> ConfigResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek(0) else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };
            let kind = self.next_kind(c, line, column)?;
            tokens.push(Token { kind, line, column });
        }
    }

    fn next_kind(&mut self, c: char, line: usize, column: usize) -> ConfigResult<TokenKind> {
        let next = self.peek(1);
        let two = |a: char, b: char| c == a && next == Some(b);
        let kind = if two('\\', '.') {
            self.bump_n(2);
            TokenKind::KeyPathStart
        } else if two('=', '=') {
            self.bump_n(2);
            TokenKind::EqEq
        } else if two('!', '=') {
            self.bump_n(2);
            TokenKind::NotEq
        } else if two('&', '&') {
            self.bump_n(2);
            TokenKind::AndAnd
        } else if two('|', '|') {
            self.bump_n(2);
            TokenKind::OrOr
        } else if two('=', '>') {
            self.bump_n(2);
            TokenKind::Arrow
        } else if two('<', '=') {
            self.bump_n(2);
            TokenKind::Assign
        } else if c == '"' || c == '\'' {
            return self.string(c, line, column);
        } else if c.is_ascii_digit() || (c == '-' && next.is_some_and(|d| d.is_ascii_digit())) {
            return self.number(line, column);
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(ch) = self.peek(0) {
                if !(ch.is_ascii_alphanumeric() || ch == '_') {
                    break;
                }
                ident.push(ch);
                self.bump();
            }
            return Ok(TokenKind::Ident(ident));
        } else {
            let kind = match c {
                '.' => TokenKind::Dot,
                '?' => TokenKind::Question,
                '!' => TokenKind::Bang,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semicolon,
                other => {
                    return Err(ConfigError::Parse {
                        line,
                        column,
                        message: format!("unexpected character {other:?}"),
                    });
                }
            };
            self.bump();
            kind
        };
        Ok(kind)
    }

    fn string(&mut self, quote: char, line: usize, column: usize) -> ConfigResult<TokenKind> {
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(ConfigError::Parse {
                    line,
                    column,
                    message: "unterminated string".into(),
                });
            };
            match c {
                c if c == quote => return Ok(TokenKind::Str(out)),
                '\\' => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some(other @ ('\\' | '"' | '\'')) => other,
                        other => {
                            return Err(ConfigError::Parse {
                                line: self.line,
                                column: self.column,
                                message: format!("invalid escape {other:?}"),
                            });
                        }
                    };
                    out.push(escaped);
                }
                c => out.push(c),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) -> ConfigResult<TokenKind> {
        let mut text = String::new();
        if self.peek(0) == Some('-') {
            text.push('-');
            self.bump();
        }
        self.digits(&mut text);
        let is_float = self.peek(0) == Some('.') && self.peek(1).is_some_and(|d| d.is_ascii_digit());
        if is_float {
            text.push('.');
            self.bump();
            self.digits(&mut text);
            return text
                .parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|e| ConfigError::Parse {
                    line,
                    column,
                    message: format!("invalid number {text}: {e}"),
                });
        }
        text.parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|e| ConfigError::Parse {
                line,
                column,
                message: format!("invalid number {text}: {e}"),
            })
    }

    fn digits(&mut self, out: &mut String) {
        while let Some(d) = self.peek(0) {
            if !d.is_ascii_digit() {
                break;
            }
            out.push(d);
            self.bump();
        }
    }

    /// Whitespace and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek(0) {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek(1) == Some('/') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }
}
