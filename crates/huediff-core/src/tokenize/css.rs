//! CSS rules and declarations as tokens

use super::{normalize_space, SyntaxError, Token};

/// Scan a stylesheet into prelude, declaration and block-closing nodes.
/// Whitespace and comments after a node belong to that node's text.
pub(super) fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    Scanner::new(text).run()
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            depth: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        self.skip_trivia()?;
        if self.pos > 0 {
            self.tokens.push(Token::keyed(&self.src[..self.pos], ""));
        }

        while self.pos < self.bytes.len() {
            let start = self.pos;
            let (end, terminator) = self.scan_chunk()?;
            let body = &self.src[start..end];

            match terminator {
                Some(b'{') => {
                    let key = format!("{}{{{}", self.depth, normalize_space(body));
                    self.depth += 1;
                    self.pos = end + 1;
                    self.push_node(start, key)?;
                }
                Some(b';') => {
                    let key = if body.trim_start().starts_with('@') {
                        format!("{}@{}", self.depth, normalize_space(body))
                    } else if self.depth == 0 {
                        return Err(SyntaxError::new(
                            "declaration outside of a rule block",
                            start,
                        ));
                    } else {
                        self.declaration_key(body, start)?
                    };
                    self.pos = end + 1;
                    self.push_node(start, key)?;
                }
                Some(_) => {
                    if self.depth == 0 {
                        return Err(SyntaxError::new("unexpected '}'", end));
                    }
                    if body.trim().is_empty() {
                        self.depth -= 1;
                        self.pos = end + 1;
                        let key = format!("{}}}", self.depth);
                        self.push_node(start, key)?;
                    } else {
                        // Last declaration of a block, without a semicolon
                        let key = self.declaration_key(body, start)?;
                        self.pos = end;
                        self.tokens.push(Token::keyed(body, key));
                    }
                }
                None => {
                    return Err(SyntaxError::new("unexpected end of input", start));
                }
            }
        }

        if self.depth > 0 {
            return Err(SyntaxError::new("unclosed block", self.bytes.len()));
        }
        Ok(self.tokens)
    }

    fn declaration_key(&self, body: &str, start: usize) -> Result<String, SyntaxError> {
        let Some((property, value)) = body.split_once(':') else {
            return Err(SyntaxError::new("expected ':' in declaration", start));
        };
        Ok(format!(
            "{}:{}:{}",
            self.depth,
            property.trim().to_ascii_lowercase(),
            normalize_space(value)
        ))
    }

    /// Consume trailing trivia and record the node spanning `start..pos`
    fn push_node(&mut self, start: usize, key: String) -> Result<(), SyntaxError> {
        self.skip_trivia()?;
        self.tokens.push(Token::keyed(&self.src[start..self.pos], key));
        Ok(())
    }

    fn skip_trivia(&mut self) -> Result<(), SyntaxError> {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if self.src[self.pos..].starts_with("/*") {
                self.pos = self.comment_end(self.pos)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn comment_end(&self, start: usize) -> Result<usize, SyntaxError> {
        self.src[start + 2..]
            .find("*/")
            .map(|i| start + 2 + i + 2)
            .ok_or_else(|| SyntaxError::new("unterminated comment", start))
    }

    /// Find the next `{`, `;` or `}` outside strings, comments and parentheses
    fn scan_chunk(&self) -> Result<(usize, Option<u8>), SyntaxError> {
        let mut i = self.pos;
        let mut parens = 0usize;

        while let Some(&b) = self.bytes.get(i) {
            match b {
                b'"' | b'\'' => i = self.string_end(i, b)?,
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => i = self.comment_end(i)?,
                b'(' => {
                    parens += 1;
                    i += 1;
                }
                b')' => {
                    parens = parens.saturating_sub(1);
                    i += 1;
                }
                b'{' | b';' | b'}' if parens == 0 => return Ok((i, Some(b))),
                _ => i += 1,
            }
        }

        Ok((i, None))
    }

    fn string_end(&self, start: usize, quote: u8) -> Result<usize, SyntaxError> {
        let mut i = start + 1;
        while let Some(&b) = self.bytes.get(i) {
            match b {
                b'\\' => i += 2,
                b'\n' => break,
                _ if b == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }
        Err(SyntaxError::new("unterminated string", start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nodes(text: &str) -> Vec<(String, String)> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| (t.text, t.key))
            .collect()
    }

    fn pair(text: &str, key: &str) -> (String, String) {
        (text.to_string(), key.to_string())
    }

    #[test]
    fn test_rule_with_declarations() {
        assert_eq!(
            nodes("a {\n  color: red;\n  margin:0\n}\n"),
            vec![
                pair("a {\n  ", "0{a"),
                pair("color: red;\n  ", "1:color:red"),
                pair("margin:0\n", "1:margin:0"),
                pair("}\n", "0}"),
            ]
        );
    }

    #[test]
    fn test_leading_trivia_and_comments() {
        assert_eq!(
            nodes("/* top */ @import url(\"a;b.css\");p{}"),
            vec![
                pair("/* top */ ", ""),
                pair("@import url(\"a;b.css\");", "0@@import url(\"a;b.css\")"),
                pair("p{", "0{p"),
                pair("}", "0}"),
            ]
        );
    }

    #[test]
    fn test_property_names_are_case_insensitive() {
        let upper = nodes("a{COLOR: red}");
        let lower = nodes("a{color:   red}");
        assert_eq!(upper[1].1, lower[1].1);
    }

    #[test]
    fn test_nested_blocks_track_depth() {
        let keys: Vec<String> = nodes("@media print{a{b:c}}")
            .into_iter()
            .map(|(_, key)| key)
            .collect();
        assert_eq!(keys, vec!["0{@media print", "1{a", "2:b:c", "1}", "0}"]);
    }

    #[test]
    fn test_parse_failures() {
        let cases = [
            ("a { color: red;", "unclosed block"),
            ("a { color: red; }}", "unexpected '}'"),
            ("color: red;", "declaration outside of a rule block"),
            ("a { color red; }", "expected ':' in declaration"),
            ("a { } /* open", "unterminated comment"),
            ("a { content: \"x; }", "unterminated string"),
            ("a { } b", "unexpected end of input"),
        ];
        for (input, message) in cases {
            let err = tokenize(input).unwrap_err();
            assert_eq!(err.message, message, "input {input:?}");
        }
    }
}
