//! Structural queries over documents
//!
//! A small subset of JMESPath, enough to pull scalars out of test-result documents:
//!
//! - `a.b.c` walks nested objects; a numeric segment (`a.0.b`) also indexes arrays
//! - `"quoted.key"` names keys that are not plain identifiers
//! - `[N]` indexes arrays, negative values count from the end
//! - `[?field=='v']` keeps the array elements whose `field` equals the literal and
//!   projects the rest of the expression over each match, dropping nulls
//! - `lhs | rhs` applies `rhs` to the result of `lhs`, ending any projection
//!
//! Literals in filters are raw strings (`'text'`) or JSON (`` `1` ``). Filters compare
//! with `==` or `!=`.
//!
//! Queries are compiled once into a [`PathQuery`]; evaluation never fails, a missing key, an
//! out-of-range index or a type mismatch anywhere along the path yields `None`.

use crate::Result;
use compact_str::{CompactString, format_compact};
use core::fmt;
use ohno::app_err;
use serde_json::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq)]
enum Step {
    /// Object key, or array index when the key is numeric and the value is an array.
    Key(CompactString),
    Index(i64),
    Filter(Filter),
}

#[derive(Debug, Clone, PartialEq)]
struct Filter {
    field: Vec<CompactString>,
    negated: bool,
    literal: Value,
}

impl Filter {
    fn matches(&self, element: &Value) -> bool {
        let mut current = element;
        for key in &self.field {
            match current.get(key.as_str()) {
                Some(v) => current = v,
                None => {
                    current = &Value::Null;
                    break;
                }
            }
        }

        (*current == self.literal) != self.negated
    }
}

/// A compiled path query.
#[derive(Debug, Clone, PartialEq)]
pub struct PathQuery {
    source: CompactString,
    stages: Vec<Vec<Step>>,
}

impl PathQuery {
    /// Compile a query string.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first syntax problem found.
    pub fn compile(source: &str) -> Result<Self> {
        let stages = Parser::new(source).parse()?;
        Ok(Self {
            source: source.into(),
            stages,
        })
    }

    /// Query for the value of a label in the document's `metadata.labels` list.
    #[must_use]
    pub fn label(label: &str) -> Self {
        Self {
            source: format_compact!("metadata.labels[?name=='{}'].value | [0]", escape_raw(label)),
            stages: vec![
                vec![
                    Step::Key("metadata".into()),
                    Step::Key("labels".into()),
                    Step::Filter(Filter {
                        field: vec!["name".into()],
                        negated: false,
                        literal: Value::String(label.into()),
                    }),
                    Step::Key("value".into()),
                ],
                vec![Step::Index(0)],
            ],
        }
    }

    /// Query for one aggregation of one measurement under `results.measurements`.
    #[must_use]
    pub fn measurement(measurement: &str, aggregation: &str) -> Self {
        Self {
            source: format_compact!(
                "results.measurements.\"{}\".\"{}\"",
                escape_quoted(measurement),
                escape_quoted(aggregation)
            ),
            stages: vec![vec![
                Step::Key("results".into()),
                Step::Key("measurements".into()),
                Step::Key(measurement.into()),
                Step::Key(aggregation.into()),
            ]],
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the query against a document. JSON `null` results are reported as `None`.
    #[must_use]
    pub fn search<'a>(&self, document: &'a Value) -> Option<Cow<'a, Value>> {
        let mut current = Cow::Borrowed(document);
        for stage in &self.stages {
            current = match current {
                Cow::Borrowed(value) => eval_steps(value, stage)?,
                Cow::Owned(value) => Cow::Owned(eval_steps(&value, stage)?.into_owned()),
            };
        }

        if current.is_null() { None } else { Some(current) }
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn eval_steps<'a>(value: &'a Value, steps: &[Step]) -> Option<Cow<'a, Value>> {
    let Some((first, rest)) = steps.split_first() else {
        return Some(Cow::Borrowed(value));
    };

    match first {
        Step::Key(key) => match value {
            Value::Object(map) => eval_steps(map.get(key.as_str())?, rest),
            Value::Array(items) => {
                let index = key.parse::<i64>().ok()?;
                eval_steps(items.get(resolve_index(index, items.len())?)?, rest)
            }
            _ => None,
        },
        Step::Index(index) => {
            let items = value.as_array()?;
            eval_steps(items.get(resolve_index(*index, items.len())?)?, rest)
        }
        Step::Filter(filter) => {
            let items = value.as_array()?;
            let projected = items
                .iter()
                .filter(|item| filter.matches(item))
                .filter_map(|item| eval_steps(item, rest))
                .filter(|v| !v.is_null())
                .map(Cow::into_owned)
                .collect();
            Some(Cow::Owned(Value::Array(projected)))
        }
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let magnitude = usize::try_from(index.unsigned_abs()).ok()?;
    let resolved = if index < 0 { len.checked_sub(magnitude)? } else { magnitude };
    (resolved < len).then_some(resolved)
}

fn escape_raw(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Vec<Vec<Step>>> {
        let mut stages = vec![self.stage()?];
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Ok(stages),
                Some('|') => {
                    self.pos += 1;
                    stages.push(self.stage()?);
                }
                Some(c) => return Err(self.error(&format!("unexpected '{c}'"))),
            }
        }
    }

    fn stage(&mut self) -> Result<Vec<Step>> {
        self.skip_ws();
        let mut steps = Vec::new();

        match self.peek() {
            Some('[') => steps.push(self.bracket()?),
            Some(_) => steps.push(Step::Key(self.segment()?)),
            None => return Err(self.error("expected an expression")),
        }

        loop {
            self.skip_ws();
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    self.skip_ws();
                    steps.push(Step::Key(self.segment()?));
                }
                Some('[') => steps.push(self.bracket()?),
                _ => return Ok(steps),
            }
        }
    }

    /// An identifier, a quoted identifier or a (possibly negative) number.
    fn segment(&mut self) -> Result<CompactString> {
        match self.peek() {
            Some('"') => self.quoted(),
            Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-' => {
                let start = self.pos;
                if c == '-' {
                    self.pos += 1;
                }
                while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                    self.pos += 1;
                }
                let segment: CompactString = self.chars[start..self.pos].iter().copied().collect();
                if segment == "-" {
                    return Err(self.error("expected a number after '-'"));
                }
                if segment.starts_with('-') && segment[1..].parse::<u64>().is_err() {
                    return Err(self.error("only numeric segments may start with '-'"));
                }
                Ok(segment)
            }
            Some(c) => Err(self.error(&format!("expected an identifier, found '{c}'"))),
            None => Err(self.error("expected an identifier")),
        }
    }

    fn bracket(&mut self) -> Result<Step> {
        self.expect('[')?;
        self.skip_ws();

        let step = if self.peek() == Some('?') {
            self.pos += 1;
            Step::Filter(self.filter()?)
        } else {
            Step::Index(self.number()?)
        };

        self.skip_ws();
        self.expect(']')?;
        Ok(step)
    }

    fn filter(&mut self) -> Result<Filter> {
        self.skip_ws();
        let mut field = vec![self.segment()?];
        while self.peek() == Some('.') {
            self.pos += 1;
            field.push(self.segment()?);
        }

        self.skip_ws();
        let negated = match (self.peek(), self.chars.get(self.pos + 1).copied()) {
            (Some('='), Some('=')) => false,
            (Some('!'), Some('=')) => true,
            _ => return Err(self.error("expected '==' or '!=' in filter")),
        };
        self.pos += 2;
        self.skip_ws();

        let literal = match self.peek() {
            Some('\'') => Value::String(self.raw_string()?.into()),
            Some('`') => self.json_literal()?,
            _ => return Err(self.error("expected a 'raw string' or `json` literal")),
        };

        Ok(Filter { field, negated, literal })
    }

    fn number(&mut self) -> Result<i64> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<i64>().map_err(|_| self.error("expected an array index"))
    }

    fn quoted(&mut self) -> Result<CompactString> {
        self.expect('"')?;
        let mut out = CompactString::default();
        loop {
            match self.next() {
                None => return Err(self.error("unterminated quoted identifier")),
                Some('"') => return Ok(out),
                Some('\\') => match self.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('"' | '\\' | '/')) => out.push(c),
                    Some(c) => return Err(self.error(&format!("invalid escape '\\{c}' in quoted identifier"))),
                    None => return Err(self.error("unterminated quoted identifier")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn raw_string(&mut self) -> Result<String> {
        self.expect('\'')?;
        let mut out = String::new();
        loop {
            match self.next() {
                None => return Err(self.error("unterminated raw string")),
                Some('\'') => return Ok(out),
                Some('\\') => match self.next() {
                    Some('\'') => out.push('\''),
                    Some('\\') => out.push('\\'),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.error("unterminated raw string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn json_literal(&mut self) -> Result<Value> {
        self.expect('`')?;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != '`') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        self.expect('`')?;
        serde_json::from_str(&text).map_err(|e| app_err!("invalid path query '{}': bad JSON literal `{text}`: {e}", self.source))
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(&format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(&format!("expected '{expected}'"))),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: &str) -> ohno::AppError {
        app_err!("invalid path query '{}': {message} at position {}", self.source, self.pos)
    }
}
