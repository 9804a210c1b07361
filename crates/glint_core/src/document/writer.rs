//! Document serialization.
//!
//! Strings are written back verbatim between quotes. The parser keeps them
//! raw, so any escape sequence in the source survives a parse/write cycle
//! unchanged. Strings built in code may hold a bare `"` or end in a lone
//! backslash; those are escaped so the output always parses.

use std::fmt::{self, Write};

use super::value::Value;

const INDENT: &str = "  ";

/// Serialize `value` as compact document text.
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_compact(&mut out, value);
    out
}

/// Serialize `value` as indented, multi-line document text.
pub fn to_string_pretty(value: &Value) -> String {
    let mut out = String::new();
    let _ = write_pretty(&mut out, value, 0);
    out
}

/// Write compact text for `value` (no whitespace between tokens).
pub fn write_compact<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Array(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_compact(out, item)?;
            }
            out.write_char(']')
        }
        Value::Object(map) => {
            out.write_char('{')?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_string(out, key)?;
                out.write_char(':')?;
                write_compact(out, item)?;
            }
            out.write_char('}')
        }
        scalar => write_scalar(out, scalar),
    }
}

/// Write indented text for `value`, nested `depth` levels deep.
///
/// The first line is not indented (the caller has already positioned the
/// cursor); nested lines and the closing bracket are indented relative to
/// `depth`.
pub fn write_pretty<W: Write>(out: &mut W, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::Array(items) if items.is_empty() => out.write_str("[]"),
        Value::Object(map) if map.is_empty() => out.write_str("{}"),
        Value::Array(items) => {
            out.write_str("[\n")?;
            for (i, item) in items.iter().enumerate() {
                indent(out, depth + 1)?;
                write_pretty(out, item, depth + 1)?;
                out.write_str(if i + 1 < items.len() { ",\n" } else { "\n" })?;
            }
            indent(out, depth)?;
            out.write_char(']')
        }
        Value::Object(map) => {
            out.write_str("{\n")?;
            for (i, (key, item)) in map.iter().enumerate() {
                indent(out, depth + 1)?;
                write_string(out, key)?;
                out.write_str(": ")?;
                write_pretty(out, item, depth + 1)?;
                out.write_str(if i + 1 < map.len() { ",\n" } else { "\n" })?;
            }
            indent(out, depth)?;
            out.write_char('}')
        }
        scalar => write_scalar(out, scalar),
    }
}

fn indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    Ok(())
}

fn write_scalar<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Null => out.write_str("null"),
        Value::Bool(b) => write!(out, "{b}"),
        Value::Int(i) => write!(out, "{i}"),
        Value::Float(f) => write_float(out, *f),
        Value::String(s) => write_string(out, s),
        Value::Array(_) | Value::Object(_) => write_compact(out, value),
    }
}

/// Quote a raw string. Existing escape pairs pass through untouched.
fn write_string<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => {
                    out.write_char('\\')?;
                    out.write_char(escaped)?;
                }
                // A lone trailing backslash would swallow the closing quote
                None => out.write_str("\\\\")?,
            },
            '"' => out.write_str("\\\"")?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

/// Floats always carry a '.', so they re-parse as floats rather than ints.
fn write_float<W: Write>(out: &mut W, f: f64) -> fmt::Result {
    if !f.is_finite() {
        // No textual form in the document grammar
        return out.write_str("null");
    }
    let text = f.to_string();
    out.write_str(&text)?;
    if !text.contains(['.', 'e', 'E']) {
        out.write_str(".0")?;
    }
    Ok(())
}
