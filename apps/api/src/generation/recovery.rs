//! Structured-response recovery — pulls one JSON object out of raw model output.
//!
//! Model output usually carries almost-valid JSON: wrapped in prose or a code fence,
//! or with raw newlines and tabs inside string values. Recovery runs in order:
//!
//! 1. strip a leading/trailing markdown fence
//! 2. find the first `{` and its matching `}`
//! 3. decode directly
//! 4. on failure, escape control characters, stray backslashes and interior quotes
//!    inside string literals, then decode once more
//! 5. validate the caller's required keys
//!
//! Every failure is a [`ParseFailure`] that keeps the raw text for diagnostics.

use serde_json::{Map, Value};
use thiserror::Error;

/// The untyped object recovered from model output.
pub type RecoveredObject = Map<String, Value>;

/// Expected JSON shape of a required key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// Non-empty string.
    Text,
    List,
    Number,
    Object,
}

impl KeyShape {
    fn expectation(self) -> &'static str {
        match self {
            KeyShape::Text => "must be a string",
            KeyShape::List => "must be a list",
            KeyShape::Number => "must be a number",
            KeyShape::Object => "must be an object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredKey {
    pub name: &'static str,
    pub shape: KeyShape,
}

impl RequiredKey {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            shape: KeyShape::Text,
        }
    }

    pub const fn list(name: &'static str) -> Self {
        Self {
            name,
            shape: KeyShape::List,
        }
    }

    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            shape: KeyShape::Number,
        }
    }

    pub const fn object(name: &'static str) -> Self {
        Self {
            name,
            shape: KeyShape::Object,
        }
    }
}

#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("no JSON object found in model output")]
    NoObjectStart,

    #[error("JSON object in model output is never closed")]
    UnbalancedBraces,

    #[error("malformed JSON after repair: {0}")]
    Malformed(String),

    #[error("model output is JSON but not an object")]
    NotAnObject,

    #[error("required field '{key}' {problem}")]
    InvalidField { key: &'static str, problem: &'static str },
}

/// Model output could not be recovered into a valid structured object.
#[derive(Debug, Error)]
#[error("failed to recover structured model output: {reason}")]
pub struct ParseFailure {
    pub reason: FailureReason,
    /// The untouched model output.
    pub raw: String,
}

/// Recovers a JSON object from `raw` and checks that every `required` key has the
/// declared shape.
pub fn recover(raw: &str, required: &[RequiredKey]) -> Result<RecoveredObject, ParseFailure> {
    recover_object(raw, required).map_err(|reason| ParseFailure {
        reason,
        raw: raw.to_string(),
    })
}

fn recover_object(raw: &str, required: &[RequiredKey]) -> Result<RecoveredObject, FailureReason> {
    let text = strip_code_fence(raw);
    let candidate = find_object(text)?;

    let object = match decode_object(candidate) {
        Ok(object) => object,
        Err(_) => {
            let repaired = escape_string_literals(candidate);
            decode_object(&repaired)?
        }
    };

    validate_required(&object, required)?;
    Ok(object)
}

/// Strips a leading ```` ```json ```` (or bare ```` ``` ````) and a trailing ```` ``` ````.
fn strip_code_fence(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // drop the info string on the fence line, e.g. `json`
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Slices from the first `{` to its matching `}`.
///
/// The string-aware scan runs first; when stray quotes keep it from closing, a plain
/// depth count over every brace is the fallback.
fn find_object(text: &str) -> Result<&str, FailureReason> {
    let start = text.find('{').ok_or(FailureReason::NoObjectStart)?;
    let tail = &text[start..];

    matching_brace(tail, true)
        .or_else(|| matching_brace(tail, false))
        .map(|end| &tail[..end])
        .ok_or(FailureReason::UnbalancedBraces)
}

/// Returns the byte offset just past the `}` closing the object that opens at
/// offset 0. Braces, quotes and backslashes are ASCII, so byte scanning is
/// safe on UTF-8 input.
fn matching_brace(text: &str, skip_strings: bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' if skip_strings => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

fn decode_object(candidate: &str) -> Result<RecoveredObject, FailureReason> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(FailureReason::NotAnObject),
        Err(e) => Err(FailureReason::Malformed(e.to_string())),
    }
}

/// Re-escapes the contents of every string literal.
///
/// Inside a string: raw `\n`, `\r`, `\t` and other control characters are escaped, a
/// backslash that does not start a valid JSON escape is doubled, and a quote only
/// closes the string when the next non-whitespace character could follow a JSON
/// string (`,` `:` `}` `]` or end of input); otherwise it is escaped.
fn escape_string_literals(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len() + 16);
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '\\' => match chars.get(i + 1) {
                Some(&next) if is_json_escape(next, &chars[i + 2..]) => {
                    out.push('\\');
                    out.push(next);
                    i += 1;
                }
                _ => out.push_str("\\\\"),
            },
            '"' if closes_string(&chars[i + 1..]) => {
                in_string = false;
                out.push('"');
            }
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
        i += 1;
    }

    out
}

/// `c` follows a backslash; `rest` is everything after `c`. `\u` only counts with
/// four hex digits ("C:\users" is a path, not an escape).
fn is_json_escape(c: char, rest: &[char]) -> bool {
    match c {
        '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => true,
        'u' => rest.len() >= 4 && rest[..4].iter().all(char::is_ascii_hexdigit),
        _ => false,
    }
}

fn closes_string(rest: &[char]) -> bool {
    match rest.iter().find(|c| !c.is_whitespace()) {
        None => true,
        Some(c) => matches!(c, ',' | ':' | '}' | ']'),
    }
}

fn validate_required(object: &RecoveredObject, required: &[RequiredKey]) -> Result<(), FailureReason> {
    for key in required {
        let problem = match (object.get(key.name), key.shape) {
            (None | Some(Value::Null), _) => Some("is missing"),
            (Some(Value::String(s)), KeyShape::Text) if s.trim().is_empty() => Some("is empty"),
            (Some(Value::String(_)), KeyShape::Text)
            | (Some(Value::Array(_)), KeyShape::List)
            | (Some(Value::Number(_)), KeyShape::Number)
            | (Some(Value::Object(_)), KeyShape::Object) => None,
            (Some(_), shape) => Some(shape.expectation()),
        };

        if let Some(problem) = problem {
            return Err(FailureReason::InvalidField {
                key: key.name,
                problem,
            });
        }
    }
    Ok(())
}
