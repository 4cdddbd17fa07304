//! Interpreter value model: what commands take as arguments and return.

use std::fmt;

use serde::Serialize;

/// A value exchanged with the host interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No result (serialises as `null`, displays as nothing).
    Empty,
    Int(i64),
    Bytes(Vec<u8>),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Integer view. Text is parsed with `parse_int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => parse_int(s),
            _ => None,
        }
    }

    /// Byte view. Text is parsed as hex, lists must hold values 0..=255.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Empty => Some(Vec::new()),
            Self::Bytes(b) => Some(b.clone()),
            Self::Text(s) => parse_hex_bytes(s),
            Self::List(items) => items
                .iter()
                .map(|v| v.as_int().and_then(|n| u8::try_from(n).ok()))
                .collect(),
            Self::Int(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bytes(bytes) => bytes.iter().try_for_each(|b| write!(f, "{b:02x}")),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    let element = item.to_string();
                    if needs_braces(&element) {
                        write!(f, "{{{element}}}")?;
                    } else {
                        f.write_str(&element)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn needs_braces(element: &str) -> bool {
    element.is_empty()
        || element
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '"' | ';' | '$' | '[' | ']'))
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

/// Parse an integer word: optional sign, then decimal or a `0x`, `0o`,
/// `0b` prefixed literal. Surrounding whitespace is ignored.
pub fn parse_int(word: &str) -> Option<i64> {
    let word = word.trim();
    let (negative, digits) = match word.as_bytes().first()? {
        b'-' => (true, &word[1..]),
        b'+' => (false, &word[1..]),
        _ => (false, word),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i128::from_str_radix(body, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

/// Parse a hex payload such as `0102ff`, `01 02 ff`, `01:02:ff`,
/// `0x0102ff` or `0x01 0x02 0xff`. Each separated group may carry its own
/// `0x` prefix. Empty input is an empty payload.
pub fn parse_hex_bytes(text: &str) -> Option<Vec<u8>> {
    let mut digits = Vec::new();
    for group in text.split([' ', '\t', '\r', '\n', ':', '-', '.']) {
        let group = group
            .strip_prefix("0x")
            .or_else(|| group.strip_prefix("0X"))
            .unwrap_or(group);
        digits.extend_from_slice(group.as_bytes());
    }
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_forms() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" -7 "), Some(-7));
        assert_eq!(parse_int("+3"), Some(3));
        assert_eq!(parse_int("0x7FF"), Some(0x7FF));
        assert_eq!(parse_int("0XfF"), Some(255));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("-0x10"), Some(-16));
        assert_eq!(parse_int("007"), Some(7));
    }

    #[test]
    fn parse_int_rejects_garbage() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("12ab"), None);
        assert_eq!(parse_int("--1"), None);
        assert_eq!(parse_int("0x-1"), None);
        assert_eq!(parse_int("99999999999999999999"), None);
    }

    #[test]
    fn parse_hex_forms() {
        assert_eq!(parse_hex_bytes("0102ff"), Some(vec![1, 2, 0xFF]));
        assert_eq!(parse_hex_bytes("01 02 FF"), Some(vec![1, 2, 0xFF]));
        assert_eq!(parse_hex_bytes("de:ad:be:ef"), Some(vec![0xDE, 0xAD, 0xBE, 0xEF]));
        assert_eq!(parse_hex_bytes("0xCAFE"), Some(vec![0xCA, 0xFE]));
        assert_eq!(parse_hex_bytes("0x01 0x02 0xff"), Some(vec![1, 2, 0xFF]));
        assert_eq!(parse_hex_bytes("0X0a:0b"), Some(vec![0x0A, 0x0B]));
        assert_eq!(parse_hex_bytes("  01 02  "), Some(vec![1, 2]));
        assert_eq!(parse_hex_bytes(""), Some(vec![]));
        assert_eq!(parse_hex_bytes("abc"), None);
        assert_eq!(parse_hex_bytes("zz"), None);
    }

    #[test]
    fn bytes_from_list_checks_range() {
        let ok = Value::List(vec![Value::Int(1), Value::from("0xff")]);
        assert_eq!(ok.as_bytes(), Some(vec![1, 255]));
        let bad = Value::List(vec![Value::Int(256)]);
        assert_eq!(bad.as_bytes(), None);
        assert_eq!(Value::Int(1).as_bytes(), None);
    }

    #[test]
    fn display_is_tcl_like() {
        let v = Value::List(vec![
            Value::Int(0x123),
            Value::Int(0),
            Value::Int(2),
            Value::Bytes(vec![0xAB, 0x01]),
        ]);
        assert_eq!(v.to_string(), "291 0 2 ab01");

        let nested = Value::List(vec![Value::from("a b"), Value::Bytes(vec![])]);
        assert_eq!(nested.to_string(), "{a b} {}");
        assert_eq!(Value::Empty.to_string(), "");
    }

    #[test]
    fn serializes_untagged() {
        let v = Value::List(vec![Value::Int(5), Value::Bytes(vec![1, 2]), Value::Empty]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[5,[1,2],null]");
        assert_eq!(
            serde_json::to_string(&Value::from("ID=x")).unwrap(),
            r#""ID=x""#
        );
    }
}
