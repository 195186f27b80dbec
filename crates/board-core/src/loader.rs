//! Reads artifacts back into descriptors.
//!
//! The grammar is small:
//!
//! ```text
//! artifact  := statement*
//! statement := "let" IDENT "=" value ";" | IDENT "=" value ";"
//! value     := INT | STRING | "null" | IDENT | "(" INT "," INT ")"
//!            | "[" (value ("," value)*)? "]"
//!            | "{" (STRING ":" value ("," STRING ":" value)*)? "}"
//! ```
//!
//! `#` starts a comment running to the end of the line. Statement order does
//! not matter. Fields without a statement take the builder defaults, so an
//! omitted optional field loads as absent.

use crate::descriptor::{BoardDescriptor, DescriptorBuilder, NestedSeq};
use crate::emitter::{field, FORMAT_VERSION};
use crate::hex::Point;
use crate::resource::{Resource, UnknownResource};
use crate::validate::ValidationError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Errors that can occur when reading an artifact
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("line {line}: unexpected character '{ch}'")]
    UnexpectedChar { line: usize, ch: char },

    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },

    #[error("line {line}: invalid escape sequence '{found}'")]
    BadEscape { line: usize, found: String },

    #[error("line {line}: integer '{text}' out of range")]
    IntegerOutOfRange { line: usize, text: String },

    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("unsupported artifact version {0}")]
    UnsupportedVersion(i32),

    #[error("artifact header is missing '{0}'")]
    MissingHeader(&'static str),

    #[error("line {line}: unknown field '{field}'")]
    UnknownField { line: usize, field: String },

    #[error("line {line}: field '{field}' is assigned more than once")]
    DuplicateField { line: usize, field: String },

    #[error("line {line}: binding '{name}' is defined more than once")]
    DuplicateBinding { line: usize, name: String },

    #[error("line {line}: binding '{name}' is not defined")]
    UndefinedBinding { line: usize, name: String },

    #[error("line {line}: key '{key}' appears more than once in '{field}'")]
    DuplicateKey {
        line: usize,
        field: String,
        key: String,
    },

    #[error("line {line}: field '{field}' expects {expected}")]
    TypeMismatch {
        line: usize,
        field: String,
        expected: &'static str,
    },

    #[error("line {line}: values are nested too deeply")]
    TooDeep { line: usize },

    #[error("line {line}: {source}")]
    UnknownLabel {
        line: usize,
        source: UnknownResource,
    },

    #[error("artifact is structurally invalid: {0}")]
    Invalid(#[from] ValidationError),
}

/// A successfully read artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedArtifact {
    /// Name given to the artifact when it was rendered
    pub artifact_name: String,
    /// The board it describes
    pub descriptor: BoardDescriptor,
}

/// Read an artifact and rebuild (and validate) its descriptor.
pub fn load(text: &str) -> Result<LoadedArtifact, LoadError> {
    let tokens = tokenize(text)?;
    let statements = Parser::new(tokens).parse_all()?;

    let mut bindings: HashMap<String, (Value, usize)> = HashMap::new();
    let mut assignments: Vec<(String, Value, usize)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for statement in statements {
        match statement {
            Statement::Let { name, value, line } => {
                if bindings.contains_key(&name) {
                    return Err(LoadError::DuplicateBinding { line, name });
                }
                bindings.insert(name, (value, line));
            }
            Statement::Assign { key, value, line } => {
                if !seen.insert(key.clone()) {
                    return Err(LoadError::DuplicateField { line, field: key });
                }
                assignments.push((key, value, line));
            }
        }
    }

    let mut version = None;
    let mut artifact_name = None;
    let mut builder = DescriptorBuilder::new();

    for (key, value, line) in assignments {
        let cx = Cx { field: &key, line };
        builder = match key.as_str() {
            field::VERSION => {
                version = Some(cx.int(&value)?);
                builder
            }
            field::ARTIFACT => {
                artifact_name = Some(cx.string(value)?);
                builder
            }
            field::NAME => builder.name(cx.string(value)?),
            field::TITLE => builder.title(cx.string(value)?),
            field::LOW_RESOURCE_NUMBER => builder.low_resource_number(cx.int(&value)?),
            field::HIGH_RESOURCE_NUMBER => builder.high_resource_number(cx.int(&value)?),
            field::LAND_GRID => builder.land_grid(cx.points(value)?),
            field::LAND_GRID_WHITELISTS => builder.land_grid_whitelists(cx.strings(value)?),
            field::LAND_GRID_PROBABILITIES => builder.land_grid_probabilities(cx.ints(value)?),
            field::LAND_GRID_RESOURCES => builder.land_grid_resources(cx.labels(value)?),
            field::WATER_GRID => builder.water_grid(cx.points(value)?),
            field::HARBOR_LINES => builder.harbor_lines(cx.nested(value)?),
            field::LAND_NEIGHBORS => builder.land_neighbors(cx.nested(value)?),
            field::WATER_NEIGHBORS => builder.water_neighbors(cx.nested(value)?),
            field::WATER_WATER_NEIGHBORS => builder.water_water_neighbors(cx.nested(value)?),
            field::LAND_INTERSECTIONS => builder.land_intersections(cx.nested(value)?),
            field::LAND_INTERSECTION_INDEXES => {
                builder.land_intersection_indexes(cx.nested(value)?)
            }
            field::PLACEMENT_INDEXES => builder.placement_indexes(cx.nested(value)?),
            field::AVAILABLE_RESOURCES => builder.available_resources(cx.labels(value)?),
            field::AVAILABLE_PROBABILITIES => builder.available_probabilities(cx.ints(value)?),
            field::AVAILABLE_HARBORS => builder.available_harbors(cx.labels(value)?),
            field::AVAILABLE_UNKNOWN_RESOURCES => {
                builder.available_unknown_resources(cx.labels(value)?)
            }
            field::AVAILABLE_UNKNOWN_PROBABILITIES => {
                builder.available_unknown_probabilities(cx.ints(value)?)
            }
            field::UNKNOWN_GRID => builder.unknown_grid(cx.points(value)?),
            field::LAND_RESOURCE_WHITELISTS => builder.land_resource_whitelists(
                cx.association(value, &bindings, |cx, v| cx.dense_labels(v))?,
            ),
            field::LAND_PROBABILITY_WHITELISTS => builder.land_probability_whitelists(
                cx.association(value, &bindings, |cx, v| cx.ints(v))?,
            ),
            field::PLACEMENT_BLACKLISTS => builder.placement_blacklists(cx.lists(value)?),
            field::LAND_GRID_ORDER => builder.land_grid_order(cx.ints(value)?),
            field::AVAILABLE_ORDERED_PROBABILITIES => {
                builder.available_ordered_probabilities(cx.ints(value)?)
            }
            field::ORDERED_HARBORS => builder.ordered_harbors(cx.ints(value)?),
            field::THEFT_ORDER => builder.theft_order(cx.ints(value)?),
            _ => {
                return Err(LoadError::UnknownField {
                    line,
                    field: key.clone(),
                })
            }
        };
    }

    match version {
        None => return Err(LoadError::MissingHeader(field::VERSION)),
        Some(v) if v != FORMAT_VERSION => return Err(LoadError::UnsupportedVersion(v)),
        Some(_) => {}
    }
    let artifact_name = artifact_name.ok_or(LoadError::MissingHeader(field::ARTIFACT))?;

    Ok(LoadedArtifact {
        artifact_name,
        descriptor: builder.build()?,
    })
}

// ── Tokens ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Int(i32),
    Str(String),
    Punct(char),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "'{s}'"),
            Token::Int(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "string {s:?}"),
            Token::Punct(c) => write!(f, "'{c}'"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

const PUNCTUATION: &str = "[](){},;=:";

fn tokenize(text: &str) -> Result<Vec<Spanned>, LoadError> {
    let mut chars = text.chars().peekable();
    let mut tokens = Vec::new();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while chars.peek().is_some_and(|&c| c != '\n') {
                    chars.next();
                }
            }
            '"' => {
                chars.next();
                let s = lex_string(&mut chars, line)?;
                tokens.push(Spanned {
                    token: Token::Str(s),
                    line,
                });
            }
            c if c == '-' || c.is_ascii_digit() => {
                let mut text = String::new();
                text.push(c);
                chars.next();
                while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    text.push(d);
                    chars.next();
                }
                if text == "-" {
                    return Err(LoadError::UnexpectedChar { line, ch: '-' });
                }
                let n = text
                    .parse::<i32>()
                    .map_err(|_| LoadError::IntegerOutOfRange { line, text })?;
                tokens.push(Spanned {
                    token: Token::Int(n),
                    line,
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek().filter(|d| d.is_ascii_alphanumeric() || **d == '_') {
                    ident.push(d);
                    chars.next();
                }
                tokens.push(Spanned {
                    token: Token::Ident(ident),
                    line,
                });
            }
            c if PUNCTUATION.contains(c) => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Punct(c),
                    line,
                });
            }
            ch => return Err(LoadError::UnexpectedChar { line, ch }),
        }
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}

/// Lex the rest of a string literal; the opening quote is already consumed.
fn lex_string(chars: &mut Peekable<Chars<'_>>, line: usize) -> Result<String, LoadError> {
    let mut s = String::new();
    loop {
        match chars.next() {
            None | Some('\n') => return Err(LoadError::UnterminatedString { line }),
            Some('"') => return Ok(s),
            Some('\\') => {
                let escaped = match chars.next() {
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('0') => '\0',
                    Some('u') => lex_unicode_escape(chars, line)?,
                    Some(other) => {
                        return Err(LoadError::BadEscape {
                            line,
                            found: format!("\\{other}"),
                        })
                    }
                    None => return Err(LoadError::UnterminatedString { line }),
                };
                s.push(escaped);
            }
            Some(c) => s.push(c),
        }
    }
}

/// `\u{XXXX}` with the `\u` already consumed
fn lex_unicode_escape(chars: &mut Peekable<Chars<'_>>, line: usize) -> Result<char, LoadError> {
    let mut hex = String::new();
    let bad = |hex: &str| LoadError::BadEscape {
        line,
        found: format!("\\u{hex}"),
    };

    if chars.next() != Some('{') {
        return Err(bad(""));
    }
    loop {
        match chars.next() {
            Some('}') => break,
            Some(c) if c.is_ascii_hexdigit() && hex.len() < 6 => hex.push(c),
            _ => return Err(bad(&hex)),
        }
    }

    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| bad(&format!("{{{hex}}}")))
}

// ── Parser ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Int(i32),
    Str(String),
    Null,
    Ident(String),
    Pair(i32, i32),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
}

#[derive(Debug)]
enum Statement {
    Let {
        name: String,
        value: Value,
        line: usize,
    },
    Assign {
        key: String,
        value: Value,
        line: usize,
    },
}

/// Deepest bracket nesting a value may have
const MAX_DEPTH: usize = 16;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Spanned {
        // tokenize always ends with Eof, and we never advance past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Spanned {
        let spanned = self.peek().clone();
        if spanned.token != Token::Eof {
            self.pos += 1;
        }
        spanned
    }

    fn unexpected(spanned: &Spanned, expected: &'static str) -> LoadError {
        LoadError::UnexpectedToken {
            line: spanned.line,
            expected,
            found: spanned.token.to_string(),
        }
    }

    fn expect_punct(&mut self, c: char, expected: &'static str) -> Result<(), LoadError> {
        let spanned = self.advance();
        if spanned.token == Token::Punct(c) {
            Ok(())
        } else {
            Err(Self::unexpected(&spanned, expected))
        }
    }

    fn expect_int(&mut self) -> Result<i32, LoadError> {
        let spanned = self.advance();
        match spanned.token {
            Token::Int(n) => Ok(n),
            _ => Err(Self::unexpected(&spanned, "an integer")),
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek().token == Token::Punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_all(mut self) -> Result<Vec<Statement>, LoadError> {
        let mut statements = Vec::new();
        while self.peek().token != Token::Eof {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement, LoadError> {
        let first = self.advance();
        let line = first.line;
        let word = match first.token {
            Token::Ident(word) => word,
            _ => return Err(Self::unexpected(&first, "a statement")),
        };

        let statement = if word == "let" {
            let name_token = self.advance();
            let name = match name_token.token {
                Token::Ident(name) => name,
                _ => return Err(Self::unexpected(&name_token, "a binding name")),
            };
            self.expect_punct('=', "'='")?;
            let value = self.parse_value(0)?;
            Statement::Let { name, value, line }
        } else {
            self.expect_punct('=', "'='")?;
            let value = self.parse_value(0)?;
            Statement::Assign {
                key: word,
                value,
                line,
            }
        };

        self.expect_punct(';', "';'")?;
        Ok(statement)
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value, LoadError> {
        let spanned = self.advance();
        if depth >= MAX_DEPTH && matches!(spanned.token, Token::Punct('[') | Token::Punct('{')) {
            return Err(LoadError::TooDeep { line: spanned.line });
        }
        match spanned.token {
            Token::Int(n) => Ok(Value::Int(n)),
            Token::Str(s) => Ok(Value::Str(s)),
            Token::Ident(ident) if ident == "null" => Ok(Value::Null),
            Token::Ident(ident) => Ok(Value::Ident(ident)),
            Token::Punct('(') => {
                let x = self.expect_int()?;
                self.expect_punct(',', "','")?;
                let y = self.expect_int()?;
                self.expect_punct(')', "')'")?;
                Ok(Value::Pair(x, y))
            }
            Token::Punct('[') => {
                let mut items = Vec::new();
                if !self.eat_punct(']') {
                    loop {
                        items.push(self.parse_value(depth + 1)?);
                        if self.eat_punct(']') {
                            break;
                        }
                        self.expect_punct(',', "',' or ']'")?;
                    }
                }
                Ok(Value::List(items))
            }
            Token::Punct('{') => {
                let mut entries = Vec::new();
                if !self.eat_punct('}') {
                    loop {
                        let key_token = self.advance();
                        let key = match key_token.token {
                            Token::Str(key) => key,
                            _ => return Err(Self::unexpected(&key_token, "a quoted key")),
                        };
                        self.expect_punct(':', "':'")?;
                        entries.push((key, self.parse_value(depth + 1)?));
                        if self.eat_punct('}') {
                            break;
                        }
                        self.expect_punct(',', "',' or '}'")?;
                    }
                }
                Ok(Value::Map(entries))
            }
            _ => Err(Self::unexpected(&spanned, "a value")),
        }
    }
}

// ── Value conversion ────────────────────────────────────────────

/// Field and line a value is being converted for
struct Cx<'a> {
    field: &'a str,
    line: usize,
}

impl Cx<'_> {
    fn mismatch(&self, expected: &'static str) -> LoadError {
        LoadError::TypeMismatch {
            line: self.line,
            field: self.field.to_string(),
            expected,
        }
    }

    fn int(&self, value: &Value) -> Result<i32, LoadError> {
        match value {
            Value::Int(n) => Ok(*n),
            _ => Err(self.mismatch("an integer")),
        }
    }

    fn string(&self, value: Value) -> Result<String, LoadError> {
        match value {
            Value::Str(s) => Ok(s),
            _ => Err(self.mismatch("a string")),
        }
    }

    fn list(&self, value: Value, expected: &'static str) -> Result<Vec<Value>, LoadError> {
        match value {
            Value::List(items) => Ok(items),
            _ => Err(self.mismatch(expected)),
        }
    }

    fn label(&self, value: Value) -> Result<Resource, LoadError> {
        match value {
            Value::Ident(label) => label.parse().map_err(|source| LoadError::UnknownLabel {
                line: self.line,
                source,
            }),
            _ => Err(self.mismatch("a list of resource labels")),
        }
    }

    fn ints(&self, value: Value) -> Result<Vec<i32>, LoadError> {
        const EXPECTED: &str = "a list of integers";
        self.list(value, EXPECTED)?
            .iter()
            .map(|v| self.int(v).map_err(|_| self.mismatch(EXPECTED)))
            .collect()
    }

    fn points(&self, value: Value) -> Result<Vec<Point>, LoadError> {
        const EXPECTED: &str = "a list of (x, y) pairs";
        self.list(value, EXPECTED)?
            .into_iter()
            .map(|v| match v {
                Value::Pair(x, y) => Ok(Point::new(x, y)),
                _ => Err(self.mismatch(EXPECTED)),
            })
            .collect()
    }

    fn strings(&self, value: Value) -> Result<Vec<Option<String>>, LoadError> {
        const EXPECTED: &str = "a list of strings or null";
        self.list(value, EXPECTED)?
            .into_iter()
            .map(|v| match v {
                Value::Null => Ok(None),
                Value::Str(s) => Ok(Some(s)),
                _ => Err(self.mismatch(EXPECTED)),
            })
            .collect()
    }

    fn labels(&self, value: Value) -> Result<Vec<Option<Resource>>, LoadError> {
        self.list(value, "a list of resource labels or null")?
            .into_iter()
            .map(|v| match v {
                Value::Null => Ok(None),
                v => self.label(v).map(Some),
            })
            .collect()
    }

    fn dense_labels(&self, value: Value) -> Result<Vec<Resource>, LoadError> {
        self.list(value, "a list of resource labels")?
            .into_iter()
            .map(|v| self.label(v))
            .collect()
    }

    fn nested(&self, value: Value) -> Result<NestedSeq, LoadError> {
        const EXPECTED: &str = "a list of integer lists or null";
        self.list(value, EXPECTED)?
            .into_iter()
            .map(|v| match v {
                Value::Null => Ok(None),
                v @ Value::List(_) => self.ints(v).map(Some),
                _ => Err(self.mismatch(EXPECTED)),
            })
            .collect()
    }

    fn lists(&self, value: Value) -> Result<Vec<Vec<i32>>, LoadError> {
        self.list(value, "a list of integer lists")?
            .into_iter()
            .map(|v| self.ints(v))
            .collect()
    }

    /// Resolve `{ "key": binding, ... }`, converting each bound sequence.
    fn association<T>(
        &self,
        value: Value,
        bindings: &HashMap<String, (Value, usize)>,
        convert: impl Fn(&Cx<'_>, Value) -> Result<Vec<T>, LoadError>,
    ) -> Result<Vec<(String, Vec<T>)>, LoadError> {
        let Value::Map(entries) = value else {
            return Err(self.mismatch("a keyed association"));
        };

        let mut keys = HashSet::new();
        let mut groups = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            if !keys.insert(key.clone()) {
                return Err(LoadError::DuplicateKey {
                    line: self.line,
                    field: self.field.to_string(),
                    key,
                });
            }

            let values = match entry {
                Value::Ident(name) => {
                    let Some((bound, bound_line)) = bindings.get(&name) else {
                        return Err(LoadError::UndefinedBinding {
                            line: self.line,
                            name,
                        });
                    };
                    let cx = Cx {
                        field: self.field,
                        line: *bound_line,
                    };
                    convert(&cx, bound.clone())?
                }
                inline => convert(self, inline)?,
            };
            groups.push((key, values));
        }
        Ok(groups)
    }
}
