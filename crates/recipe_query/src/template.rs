use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use recipe_table::ScalarValue;

use crate::errors::{QueryError, Result};

/// A piece of a parsed SQL template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Raw SQL copied through unchanged.
    Text(String),
    /// A `:name` placeholder.
    Placeholder(String),
}

/// A SQL statement with named `:name` placeholders.
///
/// Text inside single quoted strings, double quoted identifiers, `--` line
/// comments and `/* */` block comments is never treated as a placeholder, and
/// `::` casts are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplate {
    sql: String,
    segments: Vec<Segment>,
}

/// A template with its placeholders rewritten to positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    /// SQL text to send to the driver.
    pub sql: String,
    /// Parameter values, where `params[0]` is bound to position 1.
    pub params: Vec<ScalarValue>,
}

impl SqlTemplate {
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let segments = parse_segments(&sql);
        SqlTemplate { sql, segments }
    }

    /// Read a template from a file, normalizing its whitespace.
    ///
    /// See [`normalize_whitespace`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(normalize_whitespace(&content)))
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Placeholder(name) = seg {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Rewrite placeholders to positional parameters.
    ///
    /// `placeholder` produces the driver's syntax for a 1-based position. A
    /// name used more than once reuses its position. Values for names the
    /// template doesn't reference are ignored.
    ///
    /// Errors with every unbound placeholder name if any are missing.
    pub fn bind<F>(
        &self,
        params: &HashMap<String, ScalarValue>,
        placeholder: F,
    ) -> Result<BoundQuery>
    where
        F: Fn(usize) -> String,
    {
        let names = self.placeholders();
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !params.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(QueryError::BindingError { missing });
        }

        // Positions are 1-based.
        let positions: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (*name, idx + 1))
            .collect();

        let mut sql = String::with_capacity(self.sql.len());
        for seg in &self.segments {
            match seg {
                Segment::Text(text) => sql.push_str(text),
                Segment::Placeholder(name) => {
                    sql.push_str(&placeholder(positions[name.as_str()]))
                }
            }
        }

        let params = names.iter().map(|name| params[*name].clone()).collect();

        Ok(BoundQuery { sql, params })
    }
}

impl fmt::Display for SqlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Copy a quoted section starting at `idx` (which points at the opening
/// quote) into `out`, returning the index just past the closing quote.
///
/// Doubled quotes are escapes. An unterminated quote runs to the end of the
/// input.
fn copy_quoted(chars: &[char], mut idx: usize, quote: char, out: &mut String) -> usize {
    out.push(chars[idx]);
    idx += 1;
    while idx < chars.len() {
        let c = chars[idx];
        out.push(c);
        idx += 1;
        if c == quote {
            if chars.get(idx) == Some(&quote) {
                out.push(quote);
                idx += 1;
            } else {
                break;
            }
        }
    }
    idx
}

fn parse_segments(sql: &str) -> Vec<Segment> {
    let chars: Vec<char> = sql.chars().collect();
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut idx = 0;

    while idx < chars.len() {
        let c = chars[idx];
        let next = chars.get(idx + 1).copied();

        match (c, next) {
            ('\'', _) | ('"', _) => {
                idx = copy_quoted(&chars, idx, c, &mut text);
            }
            ('-', Some('-')) => {
                while idx < chars.len() && chars[idx] != '\n' {
                    text.push(chars[idx]);
                    idx += 1;
                }
            }
            ('/', Some('*')) => {
                text.push_str("/*");
                idx += 2;
                while idx < chars.len() {
                    if chars[idx] == '*' && chars.get(idx + 1) == Some(&'/') {
                        text.push_str("*/");
                        idx += 2;
                        break;
                    }
                    text.push(chars[idx]);
                    idx += 1;
                }
            }
            (':', Some(':')) => {
                text.push_str("::");
                idx += 2;
            }
            (':', Some(n)) if is_ident_start(n) => {
                let start = idx + 1;
                let mut end = start;
                while end < chars.len() && is_ident_char(chars[end]) {
                    end += 1;
                }
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Placeholder(chars[start..end].iter().collect()));
                idx = end;
            }
            _ => {
                text.push(c);
                idx += 1;
            }
        }
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    segments
}

/// Normalize whitespace in a SQL script read from disk.
///
/// `--` comments are removed, runs of whitespace outside of quotes collapse
/// to a single space, and the result is trimmed. Quoted text is preserved
/// exactly.
pub fn normalize_whitespace(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut pending_space = false;
    let mut idx = 0;

    while idx < chars.len() {
        let c = chars[idx];
        let next = chars.get(idx + 1).copied();

        if c.is_whitespace() {
            pending_space = true;
            idx += 1;
            continue;
        }

        if c == '-' && next == Some('-') {
            while idx < chars.len() && chars[idx] != '\n' {
                idx += 1;
            }
            pending_space = true;
            continue;
        }

        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;

        if c == '\'' || c == '"' {
            idx = copy_quoted(&chars, idx, c, &mut out);
        } else {
            out.push(c);
            idx += 1;
        }
    }

    out
}
