//! Path template compilation and substitution.
//!
//! A path template is a string with zero or more `{name}` placeholders,
//! e.g. `accounts/{account_id}/external_accounts/{id}`. Compiling it once
//! yields a [`PathTemplate`] that records the ordered placeholder names and
//! can be applied repeatedly to substitution maps. Substituted values are
//! always percent-encoded; a parameter value can never inject path segments
//! or query fragments.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in substituted values, matching URI-component rules
/// (unreserved marks stay literal).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URI component.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Substitution map applied to a compiled template.
pub type Substitutions = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<Segment>,
    params: Vec<String>,
}

impl PathTemplate {
    /// Compile a template string.
    ///
    /// Control characters (newline, carriage return, quote, U+2028, U+2029)
    /// in the template text are escaped first, so the compiled form is safe
    /// to embed in diagnostics and logs. An unterminated `{` is kept as a
    /// literal.
    #[must_use]
    pub fn compile(template: &str) -> Self {
        let cleaned = escape_control(template);
        let mut segments = Vec::new();
        let mut params = Vec::new();
        let mut literal = String::new();

        let mut rest = cleaned.as_str();
        while let Some(open) = rest.find('{') {
            let after = open + 1;
            match rest.get(after..).and_then(|tail| tail.find('}')) {
                Some(close) => {
                    literal.push_str(rest.get(..open).unwrap_or_default());
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let name = rest
                        .get(after..after + close)
                        .unwrap_or_default()
                        .to_owned();
                    params.push(name.clone());
                    segments.push(Segment::Param(name));
                    rest = rest.get(after + close + 1..).unwrap_or_default();
                }
                None => {
                    literal.push_str(rest.get(..=open).unwrap_or_default());
                    rest = rest.get(after..).unwrap_or_default();
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments, params }
    }

    /// Ordered placeholder names as they appear in the template.
    ///
    /// Duplicates are preserved in order of appearance; every occurrence of
    /// a name substitutes the same mapped value.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Returns `true` if the template contains at least one placeholder.
    #[must_use]
    pub fn is_templated(&self) -> bool {
        !self.params.is_empty()
    }

    /// Apply a substitution map, yielding the literal path.
    ///
    /// Every placeholder is replaced; a missing key substitutes the empty
    /// string, never the literal placeholder. Values are percent-encoded.
    #[must_use]
    pub fn apply(&self, values: &Substitutions) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param(name) => {
                    if let Some(value) = values.get(name) {
                        out.push_str(&encode_component(value));
                    }
                }
            }
        }
        out
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => write!(f, "{text}")?,
                Segment::Param(name) => write!(f, "{{{name}}}")?,
            }
        }
        Ok(())
    }
}

fn escape_control(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    for c in template.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}
