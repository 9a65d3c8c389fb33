//! Diff computation engine

use crate::mode::Mode;
use crate::segment::{DiffResult, DiffSegment, SegmentKind};
use crate::tokenize::{tokenize, ParseFailure, Side, Token, Tokenized};
use serde::Serialize;
use similar::{Algorithm, DiffTag};

/// Outcome of comparing two inputs under one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub mode: Mode,
    pub result: DiffResult,
    /// Structural inputs that failed to parse; non-empty means the
    /// result is a character-level comparison
    pub failures: Vec<ParseFailure>,
}

impl Comparison {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// The main diff engine
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine {
    algorithm: Algorithm,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Myers,
        }
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Tokenize both inputs for `mode` and compare them
    ///
    /// If either side of a structural mode fails to parse, both sides are
    /// compared character by character and the failures are reported.
    pub fn diff(&self, old: &str, new: &str, mode: Mode) -> Comparison {
        let old_tokens = tokenize(old, mode);
        let new_tokens = tokenize(new, mode);

        let failures: Vec<ParseFailure> = [(Side::Old, &old_tokens), (Side::New, &new_tokens)]
            .into_iter()
            .filter_map(|(side, tokenized)| {
                tokenized.error.as_ref().map(|message| ParseFailure {
                    side,
                    mode,
                    message: message.clone(),
                })
            })
            .collect();

        let result = if failures.is_empty() {
            self.compute(&old_tokens.tokens, &new_tokens.tokens)
        } else {
            for failure in &failures {
                tracing::warn!(%failure, "comparing as text");
            }
            let old_tokens = degrade(old, old_tokens);
            let new_tokens = degrade(new, new_tokens);
            self.compute(&old_tokens, &new_tokens)
        };

        tracing::debug!(
            %mode,
            segments = result.len(),
            insertions = result.insertions,
            deletions = result.deletions,
            "computed diff"
        );

        Comparison {
            mode,
            result,
            failures,
        }
    }

    /// Compute the minimal edit script between two token sequences
    pub fn compute(&self, old: &[Token], new: &[Token]) -> DiffResult {
        let old_keys: Vec<&str> = old.iter().map(|t| t.key.as_str()).collect();
        let new_keys: Vec<&str> = new.iter().map(|t| t.key.as_str()).collect();
        let ops = similar::capture_diff_slices(self.algorithm, &old_keys, &new_keys);

        let mut builder = SegmentBuilder::default();
        for op in &ops {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            let old_run = &old[old_range];
            let new_run = &new[new_range];
            match tag {
                DiffTag::Equal => {
                    for (a, b) in old_run.iter().zip(new_run) {
                        builder.matched(&a.text, &b.text);
                    }
                }
                DiffTag::Delete => builder.removed(old_run),
                DiffTag::Insert => builder.added(new_run),
                DiffTag::Replace => {
                    builder.removed(old_run);
                    builder.added(new_run);
                }
            }
        }

        builder.finish()
    }
}

/// Character tokens for a side compared after a structural fallback
fn degrade(text: &str, tokenized: Tokenized) -> Vec<Token> {
    if tokenized.error.is_some() {
        tokenized.tokens
    } else {
        crate::tokenize::char_tokens(text)
    }
}

/// Compare two strings with the default engine
pub fn diff(old: &str, new: &str, mode: Mode) -> Comparison {
    DiffEngine::default().diff(old, new, mode)
}

/// Compute the edit script for two token sequences with the default engine
pub fn compute_diff(old: &[Token], new: &[Token]) -> DiffResult {
    DiffEngine::default().compute(old, new)
}

/// Folds aligned tokens into maximal segments. Removed and added text is
/// held back until the next common run so a change always reads
/// removed-then-added.
#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<DiffSegment>,
    pending_removed: String,
    pending_added: String,
    insertions: usize,
    deletions: usize,
}

impl SegmentBuilder {
    fn removed(&mut self, tokens: &[Token]) {
        self.deletions += tokens.len();
        for token in tokens {
            self.pending_removed.push_str(&token.text);
        }
    }

    fn added(&mut self, tokens: &[Token]) {
        self.insertions += tokens.len();
        for token in tokens {
            self.pending_added.push_str(&token.text);
        }
    }

    /// Two tokens with equal keys. Their texts can still differ (trimmed
    /// lines, folded whitespace); only the differing middle is a change.
    fn matched(&mut self, old: &str, new: &str) {
        if old == new {
            self.common(old);
            return;
        }

        let prefix: usize = old
            .chars()
            .zip(new.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        let (old_rest, new_rest) = (&old[prefix..], &new[prefix..]);
        let suffix: usize = old_rest
            .chars()
            .rev()
            .zip(new_rest.chars().rev())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();

        self.common(&old[..prefix]);
        self.pending_removed
            .push_str(&old_rest[..old_rest.len() - suffix]);
        self.pending_added
            .push_str(&new_rest[..new_rest.len() - suffix]);
        self.common(&old_rest[old_rest.len() - suffix..]);
    }

    fn common(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush_pending();
        match self.segments.last_mut() {
            Some(last) if last.kind == SegmentKind::Common => last.value.push_str(text),
            _ => self.segments.push(DiffSegment::common(text)),
        }
    }

    fn flush_pending(&mut self) {
        if !self.pending_removed.is_empty() {
            let value = std::mem::take(&mut self.pending_removed);
            self.segments.push(DiffSegment::removed(value));
        }
        if !self.pending_added.is_empty() {
            let value = std::mem::take(&mut self.pending_added);
            self.segments.push(DiffSegment::added(value));
        }
    }

    fn finish(mut self) -> DiffResult {
        self.flush_pending();
        DiffResult {
            segments: self.segments,
            insertions: self.insertions,
            deletions: self.deletions,
        }
    }
}
