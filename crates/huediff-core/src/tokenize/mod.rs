//! Splitting input text into comparable tokens
//!
//! Every token remembers the exact source text it covers, so concatenating
//! the tokens of an input always reproduces that input. Matching is done on
//! the token key instead, which lets a mode ignore whitespace or compare
//! parsed structure without losing the original text.

mod css;
mod json;

use crate::mode::Mode;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Sentence terminator run plus the whitespace (or end of input) after it
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(\s+|$)").expect("valid sentence regex"));

/// A comparable unit of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Source text covered by this token
    pub text: String,
    /// Identity used when matching tokens between inputs
    pub key: String,
}

impl Token {
    /// A token whose key is its text
    pub fn exact(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            key: text.clone(),
            text,
        }
    }

    pub fn keyed(text: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            key: key.into(),
        }
    }
}

/// Which of the two compared inputs something refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => f.write_str("first"),
            Side::New => f.write_str("second"),
        }
    }
}

/// A structural input that could not be parsed and was compared as text
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("invalid {mode} in {side} input: {message}")]
pub struct ParseFailure {
    pub side: Side,
    pub mode: Mode,
    pub message: String,
}

/// Syntax error from a structural scanner, at a byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    fn describe(&self, text: &str) -> String {
        let before = &text[..self.offset.min(text.len())];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        format!("{} at line {} column {}", self.message, line, column)
    }
}

/// Tokens for one input, plus the parse error if a structural mode fell back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub error: Option<String>,
}

impl Tokenized {
    fn ok(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            error: None,
        }
    }
}

/// Split `text` into tokens for `mode`
///
/// Structural modes that fail to parse fall back to character tokens and
/// report the parse error in [`Tokenized::error`].
pub fn tokenize(text: &str, mode: Mode) -> Tokenized {
    if text.is_empty() {
        return Tokenized::default();
    }

    let structural = match mode {
        Mode::Text => return Tokenized::ok(char_tokens(text)),
        Mode::Words => return Tokenized::ok(word_tokens(text, false)),
        Mode::WordsWithSpace => return Tokenized::ok(word_tokens(text, true)),
        Mode::Lines => return Tokenized::ok(line_tokens(text, false)),
        Mode::TrimmedLines => return Tokenized::ok(line_tokens(text, true)),
        Mode::Sentences => return Tokenized::ok(sentence_tokens(text)),
        Mode::Css => css::tokenize(text),
        Mode::Json => json::tokenize(text),
    };

    match structural {
        Ok(tokens) => Tokenized::ok(tokens),
        Err(err) => Tokenized {
            tokens: char_tokens(text),
            error: Some(err.describe(text)),
        },
    }
}

pub(crate) fn char_tokens(text: &str) -> Vec<Token> {
    text.chars().map(|ch| Token::exact(ch.to_string())).collect()
}

/// Word boundary tokens; without `keep_space`, whitespace is folded into the
/// preceding token and left out of its key
fn word_tokens(text: &str, keep_space: bool) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for piece in text.split_word_bounds() {
        let is_space = piece.chars().all(char::is_whitespace);
        if keep_space || !is_space {
            tokens.push(Token::exact(piece));
            continue;
        }
        match tokens.last_mut() {
            Some(last) => last.text.push_str(piece),
            None => tokens.push(Token::keyed(piece, "")),
        }
    }

    tokens
}

fn line_tokens(text: &str, trim: bool) -> Vec<Token> {
    text.split_inclusive('\n')
        .map(|line| {
            let content = match line.strip_suffix('\n') {
                Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
                None => line,
            };
            let key = if trim { content.trim() } else { content };
            Token::keyed(line, key)
        })
        .collect()
}

fn sentence_tokens(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in SENTENCE_END.captures_iter(text) {
        let (Some(whole), Some(space)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        tokens.push(Token::exact(&text[cursor..space.start()]));
        if !space.as_str().is_empty() {
            tokens.push(Token::exact(space.as_str()));
        }
        cursor = whole.end();
    }
    if cursor < text.len() {
        tokens.push(Token::exact(&text[cursor..]));
    }

    tokens
}

/// Collapse whitespace runs to single spaces, for structural keys
pub(crate) fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
