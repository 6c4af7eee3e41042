//! Strict BibTeX parser.

use super::error::ParseError;
use super::record::{Record, Tags};

/// Directive blocks whose body is kept verbatim instead of parsed as fields.
const RAW_BLOCK_TYPES: [&str; 3] = ["comment", "preamble", "string"];

/// Parses a whole BibTeX document into records, in document order.
///
/// Text outside `@type{...}` blocks is ignored. Field names are lower-cased;
/// when a field repeats inside one entry the first value wins.
///
/// # Errors
///
/// Returns [`ParseError`] at the first grammar violation: missing entry type,
/// missing `=` or value, unbalanced braces, unterminated quotes, or a block
/// that never closes.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_records(input: &str) -> Result<Vec<Record>, ParseError> {
    let mut cursor = Cursor::new(input);
    let mut records = Vec::new();

    while cursor.skip_to('@') {
        records.push(parse_block(&mut cursor)?);
    }

    tracing::debug!(records = records.len(), "parsed BibTeX document");
    Ok(records)
}

fn parse_block(cursor: &mut Cursor) -> Result<Record, ParseError> {
    let start = cursor.pos;
    cursor.bump(); // '@'

    let entry_type = cursor.take_while(is_name_char);
    if entry_type.is_empty() {
        return Err(cursor.error("expected entry type after '@'"));
    }
    cursor.skip_whitespace();

    let closer = match cursor.peek() {
        Some('{') => '}',
        Some('(') => ')',
        Some(other) => {
            return Err(cursor.error(format!(
                "expected '{{' or '(' after `@{entry_type}`, found {other:?}"
            )));
        }
        None => return Err(cursor.error(format!("unexpected end of input after `@{entry_type}`"))),
    };
    cursor.bump();

    if RAW_BLOCK_TYPES.contains(&entry_type.to_ascii_lowercase().as_str()) {
        let body = cursor.take_balanced(closer, start)?;
        return Ok(Record::raw(entry_type, body.trim()));
    }

    cursor.skip_whitespace();
    let key = cursor.take_while(|c| !matches!(c, ',' | '{' | '}' | '(' | ')') && !c.is_whitespace());
    cursor.skip_whitespace();
    let citation_key = (!key.is_empty()).then_some(key);

    let mut tags = Tags::new();
    match cursor.peek() {
        Some(',') => cursor.bump(),
        Some(c) if c == closer => return Err(no_fields(cursor, &entry_type)),
        Some(other) => {
            return Err(cursor.error(format!(
                "expected ',' after citation key, found {other:?}"
            )));
        }
        None => return Err(cursor.unterminated(start)),
    }

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some(c) if c == closer => {
                cursor.bump();
                break;
            }
            None => return Err(cursor.unterminated(start)),
            Some(_) => {}
        }

        let name = cursor.take_while(is_name_char).to_ascii_lowercase();
        if name.is_empty() {
            let found = cursor.peek().unwrap_or(' ');
            return Err(cursor.error(format!("expected field name, found {found:?}")));
        }
        cursor.skip_whitespace();
        if cursor.peek() != Some('=') {
            return Err(cursor.error(format!("expected '=' after field name `{name}`")));
        }
        cursor.bump();
        cursor.skip_whitespace();

        let value = parse_value(cursor, &name, start)?;
        if !tags.contains(&name) {
            tags.insert(name.clone(), value);
        }

        cursor.skip_whitespace();
        match cursor.peek() {
            Some(',') => cursor.bump(),
            Some(c) if c == closer => {
                cursor.bump();
                break;
            }
            Some(other) => {
                return Err(cursor.error(format!(
                    "expected ',' or '{closer}' after value of `{name}`, found {other:?}"
                )));
            }
            None => return Err(cursor.unterminated(start)),
        }
    }

    if tags.is_empty() {
        return Err(no_fields(cursor, &entry_type));
    }
    Ok(Record::entry(entry_type, citation_key, tags))
}

fn no_fields(cursor: &Cursor, entry_type: &str) -> ParseError {
    cursor.error(format!("entry `@{entry_type}` has no fields"))
}

/// Parses `part (# part)*` where each part is braced, quoted or bare.
fn parse_value(cursor: &mut Cursor, name: &str, block_start: usize) -> Result<String, ParseError> {
    let mut value = String::new();
    loop {
        match cursor.peek() {
            Some('{') => {
                let open = cursor.pos;
                cursor.bump();
                value.push_str(&cursor.take_balanced('}', open)?);
            }
            Some('"') => {
                cursor.bump();
                value.push_str(&cursor.take_quoted()?);
            }
            Some(c) if is_name_char(c) => value.push_str(&cursor.take_while(is_name_char)),
            Some(_) => return Err(cursor.error(format!("expected value for field `{name}`"))),
            None => return Err(cursor.unterminated(block_start)),
        }

        cursor.skip_whitespace();
        if cursor.peek() == Some('#') {
            cursor.bump();
            cursor.skip_whitespace();
            continue;
        }
        return Ok(value.trim().to_string());
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '+' | '/' | '\'')
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Advances to the next `target`; false at end of input.
    fn skip_to(&mut self, target: char) -> bool {
        while let Some(c) = self.peek() {
            if c == target {
                return true;
            }
            self.bump();
        }
        false
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Consumes up to the `closer` matching an already-consumed opener.
    ///
    /// Nested `{}` are kept verbatim. The closer itself is consumed but not
    /// returned.
    fn take_balanced(&mut self, closer: char, open_pos: usize) -> Result<String, ParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            if c == closer && depth == 0 {
                let body = self.chars[start..self.pos].iter().collect();
                self.bump();
                return Ok(body);
            }
            match c {
                '{' => depth += 1,
                '}' => {
                    if depth == 0 {
                        return Err(self.error("closing brace without matching opening brace"));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
        }
        Err(self.unterminated(open_pos))
    }

    /// Consumes a quoted value after its opening quote.
    ///
    /// Braces nest exactly as in a braced value. Only `\"` is an escape, so
    /// every quoted value also reads back correctly once written in braces.
    fn take_quoted(&mut self) -> Result<String, ParseError> {
        let open_pos = self.pos.saturating_sub(1);
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            if c == '\\' && self.chars.get(self.pos + 1) == Some(&'"') {
                self.bump();
            } else if c == '{' {
                depth += 1;
            } else if c == '}' {
                if depth == 0 {
                    return Err(self.error("closing brace without matching opening brace"));
                }
                depth -= 1;
            } else if c == '"' && depth == 0 {
                let body = self.chars[start..self.pos].iter().collect();
                self.bump();
                return Ok(body);
            }
            self.bump();
        }
        let (line, column) = self.location(open_pos);
        Err(ParseError::new(line, column, "unterminated quoted value"))
    }

    fn location(&self, pos: usize) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for c in self.chars.iter().take(pos) {
            if *c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let (line, column) = self.location(self.pos);
        ParseError::new(line, column, message)
    }

    fn unterminated(&self, block_start: usize) -> ParseError {
        let (start_line, _) = self.location(block_start);
        self.error(format!(
            "unexpected end of input: block starting at line {start_line} is never closed"
        ))
    }
}
