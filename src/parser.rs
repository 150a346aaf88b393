//! Restricted literal parser
//!
//! Parses the textual form of a domain into a [`Raw`] tree. The grammar is
//! literals only: mappings `{k: v, ...}`, sets `{v, ...}`, sequences
//! `[v, ...]`, numbers, quoted strings, and `true`/`false`. There are no
//! identifiers, calls, or any other executable syntax, so untrusted input
//! can never smuggle code past the codec — anything outside the grammar
//! fails here, before structural validation runs.
//!
//! `{}` is the empty mapping; a brace group is a set exactly when no `:`
//! follows its first element.

use crate::error::{DomainError, DomainResult};
use crate::raw::Raw;
use crate::value::{Number, Value};

/// Parse a restricted literal expression into a `Raw` tree.
///
/// The entire input must be consumed; trailing non-whitespace is an error.
pub fn parse(input: &str) -> DomainResult<Raw> {
    let mut parser = Parser { src: input, pos: 0 };
    parser.skip_ws();
    let value = parser.parse_value()?;
    parser.skip_ws();
    if parser.pos < parser.src.len() {
        return Err(parser.error("trailing characters after literal"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> DomainError {
        DomainError::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> DomainResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn parse_value(&mut self) -> DomainResult<Raw> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.parse_braced(),
            Some('[') => self.parse_seq(),
            Some(_) => Ok(Raw::Scalar(self.parse_scalar()?)),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// `{...}`: empty mapping, mapping, or set, decided by whether a `:`
    /// follows the first element.
    fn parse_braced(&mut self) -> DomainResult<Raw> {
        self.expect('{')?;
        self.skip_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Raw::Map(Vec::new()));
        }

        let first = self.parse_value()?;
        self.skip_ws();
        if self.peek() == Some(':') {
            self.bump();
            let key = self.require_key(first)?;
            let value = self.parse_value()?;
            self.parse_map_rest(vec![(key, value)])
        } else {
            self.parse_set_rest(vec![first])
        }
    }

    fn parse_map_rest(&mut self, mut entries: Vec<(Value, Raw)>) -> DomainResult<Raw> {
        loop {
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    self.skip_ws();
                    if self.peek() == Some('}') {
                        self.bump();
                        return Ok(Raw::Map(entries));
                    }
                    let raw_key = self.parse_value()?;
                    self.skip_ws();
                    self.expect(':')?;
                    let key = self.require_key(raw_key)?;
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(self.error(format!("duplicate mapping key {key}")));
                    }
                    let value = self.parse_value()?;
                    entries.push((key, value));
                }
                Some('}') => {
                    self.bump();
                    return Ok(Raw::Map(entries));
                }
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{c}'"))),
                None => return Err(self.error("unterminated mapping")),
            }
        }
    }

    fn parse_set_rest(&mut self, mut items: Vec<Raw>) -> DomainResult<Raw> {
        loop {
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    self.skip_ws();
                    if self.peek() == Some('}') {
                        self.bump();
                        return Ok(Raw::Set(items));
                    }
                    items.push(self.parse_value()?);
                }
                Some('}') => {
                    self.bump();
                    return Ok(Raw::Set(items));
                }
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{c}'"))),
                None => return Err(self.error("unterminated set")),
            }
        }
    }

    fn parse_seq(&mut self) -> DomainResult<Raw> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(']') => {
                    self.bump();
                    return Ok(Raw::Seq(items));
                }
                Some(',') if !items.is_empty() => {
                    self.bump();
                    self.skip_ws();
                    if self.peek() == Some(']') {
                        self.bump();
                        return Ok(Raw::Seq(items));
                    }
                    items.push(self.parse_value()?);
                }
                Some(_) if items.is_empty() => {
                    items.push(self.parse_value()?);
                }
                Some(c) => return Err(self.error(format!("expected ',' or ']', found '{c}'"))),
                None => return Err(self.error("unterminated sequence")),
            }
        }
    }

    fn require_key(&self, raw: Raw) -> DomainResult<Value> {
        match raw {
            Raw::Scalar(v) => Ok(v),
            other => Err(self.error(format!(
                "mapping key must be a scalar, found {}",
                other.type_name()
            ))),
        }
    }

    fn parse_scalar(&mut self) -> DomainResult<Value> {
        match self.peek() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => {
                let word = self.parse_word();
                match word.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(self.error(format!(
                        "unexpected identifier '{word}': only literals are allowed"
                    ))),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_word(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn parse_string(&mut self) -> DomainResult<Value> {
        let quote = self.bump().unwrap_or('"');
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(Value::Str(out)),
                Some('\\') => match self.bump() {
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some('\'') => out.push('\''),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c) => return Err(self.error(format!("unknown escape '\\{c}'"))),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_number(&mut self) -> DomainResult<Value> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {
                    self.bump();
                }
                '.' => {
                    is_float = true;
                    self.bump();
                }
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('+') | Some('-')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        let text = &self.src[start..self.pos];
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Number(Number::Int(i)));
            }
        }
        match text.parse::<f64>() {
            // Overflowing literals like 1e999 parse to infinity; a
            // non-finite value has no literal form and can never round-trip.
            Ok(f) if f.is_finite() => Ok(Value::Number(Number::Float(f))),
            Ok(_) => Err(DomainError::Parse {
                offset: start,
                message: format!("number '{text}' is out of range"),
            }),
            Err(_) => Err(DomainError::Parse {
                offset: start,
                message: format!("malformed number '{text}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::Raw;

    #[test]
    fn parses_scalars() {
        assert_eq!(parse("2").unwrap(), Raw::Scalar(Value::from(2)));
        assert_eq!(parse("-3").unwrap(), Raw::Scalar(Value::from(-3)));
        assert_eq!(parse("0.1").unwrap(), Raw::Scalar(Value::from(0.1)));
        assert_eq!(parse("1e3").unwrap(), Raw::Scalar(Value::from(1000.0)));
        assert_eq!(parse("true").unwrap(), Raw::Scalar(Value::from(true)));
        assert_eq!(parse("\"op1\"").unwrap(), Raw::Scalar(Value::from("op1")));
        assert_eq!(parse("'op1'").unwrap(), Raw::Scalar(Value::from("op1")));
    }

    #[test]
    fn empty_braces_are_a_mapping() {
        assert_eq!(parse("{}").unwrap(), Raw::Map(Vec::new()));
    }

    #[test]
    fn colon_after_first_element_makes_a_mapping() {
        let parsed = parse(r#"{"a": [0, 1]}"#).unwrap();
        assert_eq!(parsed, Raw::map([("a", Raw::seq([0, 1]))]));
    }

    #[test]
    fn braces_without_colon_make_a_set() {
        assert_eq!(parse("{2, 3, 4}").unwrap(), Raw::set([2, 3, 4]));
    }

    #[test]
    fn parses_nested_structures() {
        let parsed = parse(r#"{"a": {"b": {0, 1}}, "c": [0, 0.1]}"#).unwrap();
        let expected = Raw::map([
            ("a", Raw::map([("b", Raw::set([0, 1]))])),
            (
                "c",
                Raw::Seq(vec![
                    Raw::Scalar(Value::from(0)),
                    Raw::Scalar(Value::from(0.1)),
                ]),
            ),
        ]);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn heterogeneous_sets_parse() {
        let parsed = parse(r#"{"op1", 0.1}"#).unwrap();
        assert_eq!(
            parsed,
            Raw::Set(vec![
                Raw::Scalar(Value::from("op1")),
                Raw::Scalar(Value::from(0.1)),
            ])
        );
    }

    #[test]
    fn non_string_keys_still_parse() {
        // Rejecting non-string keys is the validator's job, not the parser's.
        let parsed = parse(r#"{1: {"b": [2, 3]}}"#).unwrap();
        assert_eq!(
            parsed,
            Raw::Map(vec![(Value::from(1), Raw::map([("b", Raw::seq([2, 3]))]))])
        );
    }

    #[test]
    fn trailing_commas_are_accepted() {
        assert_eq!(parse("{2, 3,}").unwrap(), Raw::set([2, 3]));
        assert_eq!(parse("[0, 1,]").unwrap(), Raw::seq([0, 1]));
        assert_eq!(
            parse(r#"{"a": 1,}"#).unwrap(),
            Raw::Map(vec![(Value::Str("a".into()), Raw::Scalar(Value::from(1)))])
        );
    }

    #[test]
    fn rejects_identifiers() {
        let err = parse(r#"{"a": {"b": lambda x: x}, "c": [0, 0.1]}"#).unwrap_err();
        assert!(matches!(err, DomainError::Parse { .. }));
        assert!(err.to_string().contains("lambda"));
    }

    #[test]
    fn rejects_call_syntax() {
        assert!(matches!(parse("f(1, 2)"), Err(DomainError::Parse { .. })));
    }

    #[test]
    fn rejects_duplicate_mapping_keys() {
        let err = parse(r#"{"a": 1, "a": 2}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_overflowing_number_literals() {
        // 1e999 would parse to infinity, which has no literal form
        let err = parse("1e999").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse("-1e999").is_err());
        assert!(parse(r#"{"a": {1e999, 2}}"#).is_err());
    }

    #[test]
    fn rejects_unterminated_input() {
        assert!(parse(r#"{"a": [0, 1]"#).is_err());
        assert!(parse(r#""abc"#).is_err());
        assert!(parse("[0, 1").is_err());
    }

    #[test]
    fn rejects_trailing_characters() {
        let err = parse("{2, 3} extra").unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn parse_error_reports_offset() {
        let err = parse("      lambda").unwrap_err();
        match err {
            DomainError::Parse { offset, .. } => assert_eq!(offset, 12),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn string_escapes_roundtrip() {
        let parsed = parse(r#""a\"b\\c\n""#).unwrap();
        assert_eq!(parsed, Raw::Scalar(Value::from("a\"b\\c\n")));
    }
}
