//! A hand-written parser for the CUE subset invowkfiles are written in.
//!
//! CUE's concrete syntax is a superset of JSON (unquoted identifier
//! keys, `//` line comments, optional commas, and an implicit
//! top-level object are the only extensions this repo's invowkfiles
//! rely on). Rather than depend on a full CUE evaluator — invowk does
//! not need constraint solving, only a parsed tree (per the spec) —
//! this module parses that subset directly into a `serde_json::Value`,
//! which the rest of discovery then deserializes via `serde`. This
//! generalizes the teacher's manual `toml::Value` field-extraction
//! idiom (see `CmdConfig`'s custom `Deserialize`) to a richer document
//! shape.

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

pub fn parse(source: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(source);
    parser.skip_trivia();
    // Implicit top-level object: a document is a sequence of
    // `key: value` fields without the enclosing braces, unless the
    // author wrote the braces explicitly.
    let value = if parser.peek() == Some('{') {
        parser.parse_value()?
    } else {
        parser.parse_object_fields(None)?
    };
    parser.skip_trivia();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected trailing character '{c}'")));
    }
    Ok(value)
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    _source: &'a str,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            _source: source,
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(',') => {
                    // Commas are optional field/element separators in
                    // CUE; treat a bare comma as trivia too so callers
                    // don't need to special-case it everywhere.
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.skip_trivia();
        match self.peek() {
            Some('{') => self.parse_braced_object(),
            Some('[') => self.parse_array(),
            Some('"') => Ok(Value::String(self.parse_string()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(_) => self.parse_keyword_or_bare_string(),
            None => Err(self.error("unexpected end of input".into())),
        }
    }

    fn parse_braced_object(&mut self) -> Result<Value, ParseError> {
        self.expect('{')?;
        let value = self.parse_object_fields(Some('}'))?;
        self.skip_trivia();
        self.expect('}')?;
        Ok(value)
    }

    /// Parses `key: value` fields until `terminator` (or EOF if None).
    fn parse_object_fields(&mut self, terminator: Option<char>) -> Result<Value, ParseError> {
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            match (self.peek(), terminator) {
                (Some(c), Some(t)) if c == t => break,
                (None, None) => break,
                (None, Some(_)) => return Err(self.error("unexpected end of input".into())),
                _ => {}
            }
            let key = self.parse_key()?;
            self.skip_trivia();
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_trivia();
        }
        Ok(Value::Object(map))
    }

    fn parse_key(&mut self) -> Result<String, ParseError> {
        if self.peek() == Some('"') {
            return self.parse_string();
        }
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected a field name".into()));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(']') {
                break;
            }
            items.push(self.parse_value()?);
            self.skip_trivia();
        }
        self.expect(']')?;
        Ok(Value::Array(items))
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('/') => out.push('/'),
                    Some(other) => out.push(other),
                    None => return Err(self.error("unterminated escape sequence".into())),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string literal".into())),
            }
        }
        Ok(out)
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '+' || c == '-')
        {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .or_else(|_| {
                text.parse::<f64>()
                    .map(|f| serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
            })
            .map_err(|_| self.error(format!("invalid number literal '{text}'")))
    }

    fn parse_keyword_or_bare_string(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        match text.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            "" => Err(self.error(format!(
                "unexpected character '{}'",
                self.peek().unwrap_or('\0')
            ))),
            other => Ok(Value::String(other.to_string())),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_implicit_top_level_object() {
        let doc = r#"
            module: "acme.demo"
            version: "1.0.0"
        "#;
        let value = parse(doc).unwrap();
        assert_eq!(value["module"], Value::String("acme.demo".into()));
        assert_eq!(value["version"], Value::String("1.0.0".into()));
    }

    #[test]
    fn parses_nested_lists_and_objects_with_comments() {
        let doc = r#"
            cmds: [
                {
                    name: "build" // leaf command
                    implementations: [
                        { script: "cargo build", runtimes: ["native"], platforms: ["linux", "macos"] },
                    ]
                }
            ]
        "#;
        let value = parse(doc).unwrap();
        assert_eq!(value["cmds"][0]["name"], Value::String("build".into()));
        assert_eq!(
            value["cmds"][0]["implementations"][0]["runtimes"][0],
            Value::String("native".into())
        );
    }

    #[test]
    fn tolerates_trailing_commas() {
        let doc = r#"{ "a": 1, "b": [1, 2, 3,], }"#;
        let value = parse(doc).unwrap();
        assert_eq!(value["a"], Value::Number(1.into()));
        assert_eq!(value["b"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse("{ not valid ").unwrap_err();
        assert!(err.message.len() > 0);
    }
}
