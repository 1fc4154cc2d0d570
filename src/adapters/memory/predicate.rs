//! Query text evaluation for the in-memory store
//!
//! Supports the subset of the Cosmos DB SQL surface the walkthrough uses:
//!
//! ```text
//! [SELECT * FROM <alias>] [WHERE] <path> (= | !=) <literal> [AND ...]
//! ```
//!
//! Paths are dotted property names, optionally prefixed with the alias.
//! Literals are single-quoted strings (`''` escapes a quote), numbers,
//! `true`, `false` and `null`. An empty query matches every document.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Star,
    Dot,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    path: Vec<String>,
    comparison: Comparison,
    literal: Value,
}

/// Parsed query: a conjunction of property comparisons
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Parses query text
    ///
    /// # Errors
    ///
    /// Returns a description of the first syntax error.
    pub fn parse(text: &str) -> Result<Self, String> {
        let tokens = tokenize(text)?;
        Parser { tokens, pos: 0 }.parse()
    }

    /// Whether `document` satisfies every condition
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|condition| {
            let field = condition
                .path
                .iter()
                .try_fold(document, |value, segment| value.get(segment));
            match (field, condition.comparison) {
                (Some(field), Comparison::Eq) => values_equal(field, &condition.literal),
                (Some(field), Comparison::Ne) => !values_equal(field, &condition.literal),
                // Comparisons against undefined properties are never true
                (None, _) => false,
            }
        })
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some((_, '=')) => tokens.push(Token::Ne),
                    _ => return Err(format!("expected '=' after '!' at offset {offset}")),
                }
            }
            '\'' => {
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\'')) => {
                            if let Some(&(_, '\'')) = chars.peek() {
                                chars.next();
                                literal.push('\'');
                            } else {
                                break;
                            }
                        }
                        Some((_, ch)) => literal.push(ch),
                        None => {
                            return Err(format!("unterminated string literal at offset {offset}"))
                        }
                    }
                }
                tokens.push(Token::Str(literal));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut number = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '-' || (ch == '.' && !number.contains('.')) {
                        number.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let parsed = number
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{number}' at offset {offset}"))?;
                tokens.push(Token::Num(parsed));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{other}' at offset {offset}")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn parse(mut self) -> Result<Predicate, String> {
        let mut alias = None;

        if self.eat_keyword("SELECT") {
            self.expect(&Token::Star)?;
            if !self.eat_keyword("FROM") {
                return Err("expected FROM after SELECT *".to_string());
            }
            alias = Some(self.expect_ident()?);
            if !self.eat_keyword("WHERE") {
                self.expect_end()?;
                return Ok(Predicate { conditions: vec![] });
            }
        } else {
            self.eat_keyword("WHERE");
            if self.tokens.is_empty() {
                return Ok(Predicate { conditions: vec![] });
            }
        }

        let mut conditions = vec![self.condition(alias.as_deref())?];
        while self.eat_keyword("AND") {
            conditions.push(self.condition(alias.as_deref())?);
        }
        self.expect_end()?;

        Ok(Predicate { conditions })
    }

    fn condition(&mut self, alias: Option<&str>) -> Result<Condition, String> {
        let mut path = vec![self.expect_ident()?];
        while self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            path.push(self.expect_ident()?);
        }
        if path.len() > 1 && alias == Some(path[0].as_str()) {
            path.remove(0);
        }

        let comparison = match self.next() {
            Some(Token::Eq) => Comparison::Eq,
            Some(Token::Ne) => Comparison::Ne,
            other => return Err(format!("expected comparison operator, found {other:?}")),
        };

        let literal = match self.next() {
            Some(Token::Str(s)) => Value::String(s),
            Some(Token::Num(n)) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| format!("unsupported number literal {n}"))?,
            Some(Token::Ident(word)) => match word.to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                "null" => Value::Null,
                _ => return Err(format!("expected literal, found identifier '{word}'")),
            },
            other => return Err(format!("expected literal, found {other:?}")),
        };

        Ok(Condition {
            path,
            comparison,
            literal,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        match self.next() {
            Some(ref token) if token == expected => Ok(()),
            other => Err(format!("expected {expected:?}, found {other:?}")),
        }
    }

    fn expect_ident(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name),
            other => Err(format!("expected identifier, found {other:?}")),
        }
    }

    fn expect_end(&self) -> Result<(), String> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(format!("unexpected trailing token {token:?}")),
        }
    }
}
