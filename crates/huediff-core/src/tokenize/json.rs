//! JSON keys and values as tokens, in pre-order

use super::{SyntaxError, Token};
use serde::de::IgnoredAny;

pub(super) fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    if let Err(err) = serde_json::from_str::<IgnoredAny>(text) {
        let offset = line_col_offset(text, err.line(), err.column());
        let message = err.to_string();
        // serde_json appends its own position; keep only the description
        let message = match message.rfind(" at line ") {
            Some(i) => message[..i].to_string(),
            None => message,
        };
        return Err(SyntaxError::new(message, offset));
    }
    Walker::new(text).run()
}

/// serde_json counts columns in bytes
fn line_col_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let mut offset = (line_start + column.saturating_sub(1)).min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Walks text that serde_json has already accepted, recording node spans.
/// Node keys are qualified by their path so that equal values under
/// different members never match.
struct Walker<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Walker<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        self.skip_ws();
        if self.pos > 0 {
            self.tokens.push(Token::keyed(&self.src[..self.pos], ""));
        }
        self.value("")?;
        if self.pos < self.bytes.len() {
            return Err(SyntaxError::new("trailing characters", self.pos));
        }
        Ok(self.tokens)
    }

    fn value(&mut self, path: &str) -> Result<(), SyntaxError> {
        let start = self.pos;
        match self.bytes.get(start) {
            Some(b'{') => {
                self.pos += 1;
                self.finish_node(start, format!("{path}{{"));
                while self.bytes.get(self.pos) != Some(&b'}') {
                    self.member(path)?;
                }
                self.close(path, '}');
                Ok(())
            }
            Some(b'[') => {
                self.pos += 1;
                self.finish_node(start, format!("{path}["));
                let element_path = format!("{path}/[]");
                while self.bytes.get(self.pos) != Some(&b']') {
                    self.check_progress()?;
                    self.value(&element_path)?;
                }
                self.close(path, ']');
                Ok(())
            }
            Some(b'"') => {
                self.pos = self.string_end(start)?;
                let key = format!("{path}={}", &self.src[start..self.pos]);
                self.finish_node(start, key);
                Ok(())
            }
            Some(_) => {
                while let Some(&b) = self.bytes.get(self.pos) {
                    if matches!(b, b',' | b']' | b'}') || b.is_ascii_whitespace() {
                        break;
                    }
                    self.pos += 1;
                }
                if self.pos == start {
                    return Err(SyntaxError::new("expected a value", start));
                }
                let key = format!("{path}={}", &self.src[start..self.pos]);
                self.finish_node(start, key);
                Ok(())
            }
            None => Err(SyntaxError::new("unexpected end of input", start)),
        }
    }

    fn member(&mut self, path: &str) -> Result<(), SyntaxError> {
        let start = self.pos;
        if self.bytes.get(start) != Some(&b'"') {
            return Err(SyntaxError::new("expected a member name", start));
        }
        let name_end = self.string_end(start)?;
        let name: String = serde_json::from_str(&self.src[start..name_end])
            .map_err(|err| SyntaxError::new(err.to_string(), start))?;

        self.pos = name_end;
        self.skip_ws();
        if self.bytes.get(self.pos) != Some(&b':') {
            return Err(SyntaxError::new("expected ':'", self.pos));
        }
        self.pos += 1;

        let member_path = format!("{path}/{name}");
        self.finish_node(start, format!("{member_path}:"));
        self.value(&member_path)
    }

    fn close(&mut self, path: &str, closer: char) {
        let start = self.pos;
        self.pos += 1;
        self.finish_node(start, format!("{path}{closer}"));
    }

    /// Attach trailing whitespace and a separating comma to the node
    fn finish_node(&mut self, start: usize, key: String) {
        self.skip_ws();
        if self.bytes.get(self.pos) == Some(&b',') {
            self.pos += 1;
            self.skip_ws();
        }
        self.tokens.push(Token::keyed(&self.src[start..self.pos], key));
    }

    fn check_progress(&self) -> Result<(), SyntaxError> {
        if self.pos >= self.bytes.len() {
            return Err(SyntaxError::new("unexpected end of input", self.pos));
        }
        Ok(())
    }

    fn string_end(&self, start: usize) -> Result<usize, SyntaxError> {
        let mut i = start + 1;
        while let Some(&b) = self.bytes.get(i) {
            match b {
                b'\\' => i += 2,
                b'"' => return Ok(i + 1),
                _ => i += 1,
            }
        }
        Err(SyntaxError::new("unterminated string", start))
    }

    fn skip_ws(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }
}
