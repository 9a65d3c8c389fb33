//! Comparison granularity

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported mode: {0}")]
pub struct UnsupportedMode(pub String);

/// How input text is split into comparable units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// One token per Unicode character
    #[default]
    Text,
    /// Words and punctuation, whitespace ignored when matching
    Words,
    /// Words, punctuation and whitespace runs all compared
    WordsWithSpace,
    /// One token per line
    Lines,
    /// Lines compared with surrounding whitespace stripped
    TrimmedLines,
    /// Sentences ending in `.`, `!` or `?`
    Sentences,
    /// CSS rules and declarations
    Css,
    /// JSON keys and values
    Json,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::Text,
        Mode::Words,
        Mode::WordsWithSpace,
        Mode::Lines,
        Mode::TrimmedLines,
        Mode::Sentences,
        Mode::Css,
        Mode::Json,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Text => "text",
            Mode::Words => "words",
            Mode::WordsWithSpace => "wordsWithSpace",
            Mode::Lines => "lines",
            Mode::TrimmedLines => "trimmedLines",
            Mode::Sentences => "sentences",
            Mode::Css => "css",
            Mode::Json => "json",
        }
    }

    /// Structural modes parse their input and may fail
    pub fn is_structural(self) -> bool {
        matches!(self, Mode::Css | Mode::Json)
    }

    /// Parse a mode name, falling back to [`Mode::Text`] for unknown values
    pub fn resolve(name: &str) -> Mode {
        match name.parse() {
            Ok(mode) => mode,
            Err(UnsupportedMode(name)) => {
                tracing::warn!(mode = %name, "unsupported mode, using text");
                Mode::Text
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UnsupportedMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnsupportedMode(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Mode::resolve(&name))
    }
}
