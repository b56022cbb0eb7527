//! Parser for the textual rule format.
//!
//! ```text
//! // Comments run to the end of the line.
//! \.user?.username == "Mike" => \.visibleEntityNames <= [ "Actor", "Film" ],
//! \.platform == .phone && \.task == "inspect" => \.page <= CustomerView(),
//! \.propertyKey == "amount" => \.formatter <= currencyFormatter,
//! \.task == "list" => \.title <= \.object.rentalDate.string,
//! \.visibleEntityNames <= [ "Customer", "Actor" ],
//! ```
//!
//! `&&` binds tighter than `||`. Rules are separated by `,` or `;`.

use rulemodel_engine::{Predicate, Rule, RuleValue};
use rulemodel_types::{KeyPath, KeyShape, Platform, TargetKey, Value};
use std::collections::BTreeMap;

use crate::lexer::{Token, TokenKind, tokenize};
use crate::{ConfigError, ConfigResult};

/// Segment that turns a derived value into its display string.
const DISPLAY_SUFFIX: &str = "string";

/// Deepest allowed nesting of `!`, parentheses and brackets.
pub const MAX_NESTING: usize = 64;

/// Parses a whole rule model.
pub fn parse_rules(source: &str) -> ConfigResult<Vec<Rule>> {
    let mut parser = Parser::new(source)?;
    let mut rules = Vec::new();
    loop {
        while parser.eat(&TokenKind::Comma) || parser.eat(&TokenKind::Semicolon) {}
        if parser.at(&TokenKind::Eof) {
            return Ok(rules);
        }
        rules.push(parser.rule()?);
        if !(parser.eat(&TokenKind::Comma) || parser.eat(&TokenKind::Semicolon)) {
            parser.expect(&TokenKind::Eof, "`,` between rules")?;
            return Ok(rules);
        }
    }
}

/// Parses exactly one rule. A trailing separator is allowed.
pub fn parse_rule(source: &str) -> ConfigResult<Rule> {
    let mut parser = Parser::new(source)?;
    let rule = parser.rule()?;
    let _ = parser.eat(&TokenKind::Comma) || parser.eat(&TokenKind::Semicolon);
    parser.expect(&TokenKind::Eof, "end of rule")?;
    Ok(rule)
}

/// Parses a predicate on its own, as used by `when = "..."` in rule files.
pub fn parse_predicate(source: &str) -> ConfigResult<Predicate> {
    let mut parser = Parser::new(source)?;
    let predicate = parser.or_expr()?;
    parser.expect(&TokenKind::Eof, "end of condition")?;
    Ok(predicate)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(source: &str) -> ConfigResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            depth: 0,
        })
    }

    // ── Rules ────────────────────────────────────────────────────

    fn rule(&mut self) -> ConfigResult<Rule> {
        let start = self.pos;
        if self.starts_path() {
            self.path()?;
            let unconditional = self.at(&TokenKind::Assign);
            self.pos = start;
            if unconditional {
                return self.assignment(Predicate::True);
            }
        }
        let predicate = self.or_expr()?;
        self.expect(&TokenKind::Arrow, "`=>` after condition")?;
        self.assignment(predicate)
    }

    fn assignment(&mut self, predicate: Predicate) -> ConfigResult<Rule> {
        let key = self.target_key()?;
        self.expect(&TokenKind::Assign, "`<=` after key")?;
        let value = self.rule_value(key.shape())?;
        Ok(Rule::new(predicate, key, value))
    }

    fn target_key(&mut self) -> ConfigResult<TargetKey> {
        let token = self.peek().clone();
        let path = self.path()?;
        if path.len() == 1
            && let Some(key) = TargetKey::parse(path.root())
        {
            return Ok(key);
        }
        Err(error_at(&token, format!("unknown target key `{path}`")))
    }

    // ── Predicates ───────────────────────────────────────────────

    fn or_expr(&mut self) -> ConfigResult<Predicate> {
        let mut operands = vec![self.and_expr()?];
        while self.eat(&TokenKind::OrOr) {
            operands.push(self.and_expr()?);
        }
        Ok(collapse(operands, Predicate::Or))
    }

    fn and_expr(&mut self) -> ConfigResult<Predicate> {
        let mut operands = vec![self.unary()?];
        while self.eat(&TokenKind::AndAnd) {
            operands.push(self.unary()?);
        }
        Ok(collapse(operands, Predicate::And))
    }

    fn unary(&mut self) -> ConfigResult<Predicate> {
        if self.eat(&TokenKind::Bang) {
            return self.nested(|p| p.unary().map(Predicate::not));
        }
        if self.eat(&TokenKind::LParen) {
            return self.nested(|p| {
                let inner = p.or_expr()?;
                p.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            });
        }
        if self.eat_ident("true") {
            return Ok(Predicate::True);
        }
        if self.eat_ident("false") {
            return Ok(Predicate::not(Predicate::True));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ConfigResult<Predicate> {
        let path = self.path()?;
        let negated = if self.eat(&TokenKind::EqEq) {
            false
        } else if self.eat(&TokenKind::NotEq) {
            true
        } else {
            return Err(self.unexpected("`==` or `!=`"));
        };
        if self.eat_ident("nil") {
            let present = Predicate::present(path);
            return Ok(if negated { present } else { Predicate::not(present) });
        }
        let literal = self.literal()?;
        Ok(if negated {
            Predicate::ne(path, literal)
        } else {
            Predicate::eq(path, literal)
        })
    }

    fn starts_path(&self) -> bool {
        matches!(self.peek().kind, TokenKind::KeyPathStart | TokenKind::Ident(_))
    }

    /// `\.`? ident ( `?`? `.` ident )*
    fn path(&mut self) -> ConfigResult<KeyPath> {
        let start = self.peek().clone();
        let _ = self.eat(&TokenKind::KeyPathStart);
        let mut segments = vec![self.ident("attribute name")?];
        loop {
            let save = self.pos;
            let _ = self.eat(&TokenKind::Question);
            if self.eat(&TokenKind::Dot) && matches!(self.peek().kind, TokenKind::Ident(_)) {
                segments.push(self.ident("attribute name")?);
            } else {
                self.pos = save;
                break;
            }
        }
        KeyPath::from_segments(segments).map_err(|e| error_at(&start, e.to_string()))
    }

    // ── Values ───────────────────────────────────────────────────

    fn literal(&mut self) -> ConfigResult<Value> {
        let token = self.advance();
        match token.kind.clone() {
            TokenKind::Str(s) => Ok(Value::String(s)),
            TokenKind::Int(i) => Ok(Value::Int(i)),
            TokenKind::Float(f) => Ok(Value::Float(f)),
            TokenKind::Ident(word) if word == "true" => Ok(Value::Bool(true)),
            TokenKind::Ident(word) if word == "false" => Ok(Value::Bool(false)),
            TokenKind::Dot => {
                let case = self.ident("enum case")?;
                Platform::parse(&case)
                    .map(Value::Platform)
                    .ok_or_else(|| error_at(&token, format!("unknown enum case `.{case}`")))
            }
            other => Err(error_at(
                &token,
                format!("expected a literal, found {}", other.describe()),
            )),
        }
    }

    fn rule_value(&mut self, shape: KeyShape) -> ConfigResult<RuleValue> {
        if self.at(&TokenKind::KeyPathStart) {
            let path = self.path()?;
            return Ok(match path.parent() {
                Some(parent) if path.leaf() == DISPLAY_SUFFIX => RuleValue::Display(parent),
                _ => RuleValue::Path(path),
            });
        }
        self.value(shape).map(RuleValue::Literal)
    }

    fn value(&mut self, shape: KeyShape) -> ConfigResult<Value> {
        if self.eat(&TokenKind::LBracket) {
            return self.nested(Self::collection);
        }
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            if name == "nil" {
                return Err(self.unexpected("a value (`nil` is only valid in comparisons)"));
            }
            if name != "true" && name != "false" {
                self.advance();
                if self.eat(&TokenKind::LParen) {
                    self.expect(&TokenKind::RParen, "`)` after component name")?;
                    return Ok(Value::Component(name));
                }
                return Ok(match shape {
                    KeyShape::Formatter => Value::Formatter(name),
                    _ => Value::Component(name),
                });
            }
        }
        self.literal()
    }

    /// After `[`: `]`, `:]`, a list, or a map with string keys.
    fn collection(&mut self) -> ConfigResult<Value> {
        if self.eat(&TokenKind::RBracket) {
            return Ok(Value::List(Vec::new()));
        }
        if self.eat(&TokenKind::Colon) {
            self.expect(&TokenKind::RBracket, "`]` after `[:`")?;
            return Ok(Value::Map(BTreeMap::new()));
        }

        let first_token = self.peek().clone();
        let first = self.value(KeyShape::Component)?;
        if !self.eat(&TokenKind::Colon) {
            let mut items = vec![first];
            while self.eat(&TokenKind::Comma) {
                if self.at(&TokenKind::RBracket) {
                    break;
                }
                items.push(self.value(KeyShape::Component)?);
            }
            self.expect(&TokenKind::RBracket, "`]` or `,`")?;
            return Ok(Value::List(items));
        }

        let Value::String(first_key) = first else {
            return Err(error_at(&first_token, "map keys must be strings".into()));
        };
        let mut map = BTreeMap::new();
        map.insert(first_key, self.value(KeyShape::Component)?);
        while self.eat(&TokenKind::Comma) {
            if self.at(&TokenKind::RBracket) {
                break;
            }
            let key_token = self.advance();
            let TokenKind::Str(key) = key_token.kind.clone() else {
                return Err(error_at(&key_token, "map keys must be strings".into()));
            };
            self.expect(&TokenKind::Colon, "`:` after map key")?;
            map.insert(key, self.value(KeyShape::Component)?);
        }
        self.expect(&TokenKind::RBracket, "`]` or `,`")?;
        Ok(Value::Map(map))
    }

    /// Runs `inner` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(&mut self, inner: impl FnOnce(&mut Self) -> ConfigResult<T>) -> ConfigResult<T> {
        if self.depth >= MAX_NESTING {
            let token = self.peek().clone();
            return Err(error_at(
                &token,
                format!("nesting deeper than {MAX_NESTING} levels"),
            ));
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    // ── Token helpers ────────────────────────────────────────────

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if matches!(&self.peek().kind, TokenKind::Ident(name) if name == word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn ident(&mut self, what: &str) -> ConfigResult<String> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> ConfigResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> ConfigError {
        let token = self.peek();
        error_at(
            token,
            format!("expected {expected}, found {}", token.kind.describe()),
        )
    }
}

fn collapse(mut operands: Vec<Predicate>, combine: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        combine(operands)
    }
}

fn error_at(token: &Token, message: String) -> ConfigError {
    ConfigError::Parse {
        line: token.line,
        column: token.column,
        message,
    }
}
