//! Recursive-descent document parser.
//!
//! The parser walks a byte cursor over UTF-8 text and dispatches on the next
//! non-whitespace character:
//!
//! - `{` object, `[` array, `"` string
//! - `-` or a digit: number
//! - anything else: one of the keywords `true`, `false`, `null`
//!
//! Strings are stored raw: escape sequences are not decoded, an escaped quote
//! simply does not terminate the string. Commas between elements are
//! optional, and a trailing comma before a closing bracket is accepted.

use thiserror::Error;

use super::value::{Map, Value};

/// Maximum container nesting before the parser gives up.
pub const MAX_DEPTH: usize = 512;

/// What went wrong while parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("expected ':' after object key, found '{0}'")]
    ExpectedColon(char),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unterminated array")]
    UnterminatedArray,

    #[error("unterminated object")]
    UnterminatedObject,

    #[error("malformed literal \"{0}\"")]
    MalformedLiteral(String),

    #[error("malformed number \"{0}\"")]
    MalformedNumber(String),

    #[error("trailing characters after document")]
    TrailingCharacters,

    #[error("nesting deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// A fatal parse failure at a byte offset.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse error at byte {offset}: {kind}")]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn is_number_byte(b: u8) -> bool {
    matches!(b, b'-' | b'+' | b'0'..=b'9' | b'.' | b'e' | b'E')
}

/// Document parser over a borrowed text buffer.
pub struct DocumentParser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> DocumentParser<'a> {
    /// Create a parser positioned at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Parse a complete document: one value followed only by whitespace.
    pub fn parse(&mut self) -> ParseResult<Value> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.text.len() {
            return Err(self.error(ParseErrorKind::TrailingCharacters));
        }
        Ok(value)
    }

    /// Parse the next value, leaving the cursor just past it.
    pub fn parse_value(&mut self) -> ParseResult<Value> {
        self.parse_nested(0)
    }

    fn parse_nested(&mut self, depth: usize) -> ParseResult<Value> {
        if depth > MAX_DEPTH {
            return Err(self.error(ParseErrorKind::TooDeep));
        }
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error(ParseErrorKind::UnexpectedEof)),
            Some(b'{') => self.parse_object(depth),
            Some(b'[') => self.parse_array(depth),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b) if b == b'-' || b.is_ascii_digit() => self.parse_number(),
            Some(_) => self.parse_keyword(),
        }
    }

    fn parse_object(&mut self, depth: usize) -> ParseResult<Value> {
        let start = self.pos;
        self.pos += 1; // '{'
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error_at(start, ParseErrorKind::UnterminatedObject)),
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                Some(b'"') => {}
                Some(_) => return Err(self.unexpected_char()),
            }

            let key = self.parse_string()?;

            self.skip_whitespace();
            match self.peek() {
                Some(b':') => self.pos += 1,
                Some(_) => {
                    let found = self.current_char();
                    return Err(self.error(ParseErrorKind::ExpectedColon(found)));
                }
                None => return Err(self.error_at(start, ParseErrorKind::UnterminatedObject)),
            }

            let value = self.parse_nested(depth + 1)?;
            map.insert(key, value);

            self.skip_whitespace();
            if self.peek() == Some(b',') {
                self.pos += 1;
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> ParseResult<Value> {
        let start = self.pos;
        self.pos += 1; // '['
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error_at(start, ParseErrorKind::UnterminatedArray)),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(_) => {}
            }

            items.push(self.parse_nested(depth + 1)?);

            self.skip_whitespace();
            if self.peek() == Some(b',') {
                self.pos += 1;
            }
        }
    }

    /// Raw string contents between the quotes; the cursor must be on `"`.
    fn parse_string(&mut self) -> ParseResult<String> {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        let mut i = start + 1;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    self.pos = i + 1;
                    // Both ends sit on ASCII quotes, so the slice is on char boundaries.
                    return Ok(self.text[start + 1..i].to_string());
                }
                _ => i += 1,
            }
        }

        Err(self.error_at(start, ParseErrorKind::UnterminatedString))
    }

    fn parse_number(&mut self) -> ParseResult<Value> {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        let mut end = start;
        while end < bytes.len() && is_number_byte(bytes[end]) {
            end += 1;
        }
        let lexeme = &self.text[start..end];

        let malformed = || ParseError {
            offset: start,
            kind: ParseErrorKind::MalformedNumber(lexeme.to_string()),
        };

        let value = if lexeme.contains(['.', 'e', 'E']) {
            Value::Float(lexeme.parse::<f64>().map_err(|_| malformed())?)
        } else {
            Value::Int(lexeme.parse::<i64>().map_err(|_| malformed())?)
        };

        self.pos = end;
        Ok(value)
    }

    fn parse_keyword(&mut self) -> ParseResult<Value> {
        let start = self.pos;
        let len = self.text.len();
        if start + 4 > len {
            return Err(self.error_at(len, ParseErrorKind::UnexpectedEof));
        }

        match self.text.get(start..start + 4) {
            Some("true") => {
                self.pos += 4;
                return Ok(Value::Bool(true));
            }
            Some("null") => {
                self.pos += 4;
                return Ok(Value::Null);
            }
            _ => {}
        }

        if self.text.get(start..start + 5) == Some("false") {
            self.pos += 5;
            return Ok(Value::Bool(false));
        }

        let lexeme: String = self.text[start..].chars().take(5).collect();
        Err(self.error_at(start, ParseErrorKind::MalformedLiteral(lexeme)))
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && is_whitespace(bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn current_char(&self) -> char {
        self.text[self.pos..].chars().next().unwrap_or('\0')
    }

    fn unexpected_char(&self) -> ParseError {
        self.error(ParseErrorKind::UnexpectedChar(self.current_char()))
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError { offset, kind }
    }
}

/// Parse a document string into a value tree.
pub fn parse_document(text: &str) -> ParseResult<Value> {
    DocumentParser::new(text).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(text: &str) -> ParseErrorKind {
        parse_document(text).unwrap_err().kind
    }

    #[test]
    fn test_parse_simple_object() {
        let v = parse_document(r#"{"a": 1, "b": [1,2,3], "c": "x"}"#).unwrap();

        assert_eq!(v.get("a").unwrap(), &Value::Int(1));
        assert_eq!(
            v.get("b").unwrap(),
            &Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(v.get("c").unwrap(), &Value::String("x".to_string()));
    }

    #[test]
    fn test_parse_keywords() {
        let v = parse_document("[true, false, null]").unwrap();
        assert_eq!(
            v,
            Value::Array(vec![Value::Bool(true), Value::Bool(false), Value::Null])
        );
    }

    #[test]
    fn test_parse_numbers() {
        let v = parse_document("[0, -12, 3.5, -0.25, 1e3, 2E-2, 9007199254740993]").unwrap();
        let items = v.as_array().unwrap();

        assert_eq!(items[0], Value::Int(0));
        assert_eq!(items[1], Value::Int(-12));
        assert_eq!(items[2], Value::Float(3.5));
        assert_eq!(items[3], Value::Float(-0.25));
        // Exponent notation is classified as float even without a decimal point
        assert_eq!(items[4], Value::Float(1000.0));
        assert_eq!(items[5], Value::Float(0.02));
        assert_eq!(items[6], Value::Int(9007199254740993));
    }

    #[test]
    fn test_parse_whitespace_variants() {
        let v = parse_document("\t{\r\n\"k\"\x0b:\x0c[ ]\n}\n  ").unwrap();
        assert_eq!(v.get("k").unwrap(), &Value::Array(vec![]));
    }

    #[test]
    fn test_strings_are_raw() {
        let v = parse_document(r#"["a\"b", "tab\t", "ünï"]"#).unwrap();
        let items = v.as_array().unwrap();

        assert_eq!(items[0].as_str().unwrap(), r#"a\"b"#);
        assert_eq!(items[1].as_str().unwrap(), r"tab\t");
        assert_eq!(items[2].as_str().unwrap(), "ünï");
    }

    #[test]
    fn test_trailing_and_missing_commas() {
        let v = parse_document("[1, 2,]").unwrap();
        assert_eq!(v.len().unwrap(), 2);

        let v = parse_document(r#"{"a": 1 "b": 2,}"#).unwrap();
        assert_eq!(v.len().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_keys_keep_last() {
        let v = parse_document(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(v.get("a").unwrap(), &Value::Int(2));
        assert_eq!(v.len().unwrap(), 1);
    }

    #[test]
    fn test_nested_structures() {
        let v = parse_document(r#"{"outer": {"inner": [{"x": [[]]}]}}"#).unwrap();
        let x = v
            .get("outer")
            .and_then(|o| o.get("inner"))
            .and_then(|i| i.at(0))
            .and_then(|e| e.get("x"))
            .unwrap();
        assert_eq!(x, &Value::Array(vec![Value::Array(vec![])]));
    }

    #[test]
    fn test_error_offsets() {
        let err = parse_document(r#"{"a" 1}"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedColon('1'));
        assert_eq!(err.offset, 5);

        let err = parse_document(r#"{"a": "open"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn test_unterminated_containers() {
        assert_eq!(kind_of("[1, 2"), ParseErrorKind::UnterminatedArray);
        assert_eq!(kind_of(r#"{"a": 1"#), ParseErrorKind::UnterminatedObject);
        assert_eq!(kind_of(r#"{"a""#), ParseErrorKind::UnterminatedObject);
        assert_eq!(kind_of(""), ParseErrorKind::UnexpectedEof);
        assert_eq!(kind_of(r#"{"a": "#), ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_malformed_literals() {
        assert_eq!(
            kind_of("[nope]"),
            ParseErrorKind::MalformedLiteral("nope]".to_string())
        );
        assert_eq!(kind_of("tru"), ParseErrorKind::UnexpectedEof);
        assert_eq!(
            kind_of("[1-2]"),
            ParseErrorKind::MalformedNumber("1-2".to_string())
        );
        assert_eq!(kind_of("-"), ParseErrorKind::MalformedNumber("-".to_string()));
        assert_eq!(kind_of("{1: 2}"), ParseErrorKind::UnexpectedChar('1'));
    }

    #[test]
    fn test_trailing_characters() {
        let err = parse_document("{} {}").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingCharacters);
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "[".repeat(MAX_DEPTH + 2);
        assert_eq!(kind_of(&deep), ParseErrorKind::TooDeep);

        let ok = format!("{}{}", "[".repeat(100), "]".repeat(100));
        assert!(parse_document(&ok).is_ok());
    }

    #[test]
    fn test_parser_cursor() {
        let mut parser = DocumentParser::new("  [1]  rest");
        let v = parser.parse_value().unwrap();
        assert_eq!(v, Value::Array(vec![Value::Int(1)]));
        assert_eq!(parser.offset(), 5);
    }
}
