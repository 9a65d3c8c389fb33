//! Segment representation for diff results

use serde::{Deserialize, Serialize};

/// How a segment relates the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Present only in the new input
    Added,
    /// Present only in the old input
    Removed,
    /// Present in both inputs
    Common,
}

/// A maximal run of text sharing one classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub value: String,
    pub kind: SegmentKind,
}

impl DiffSegment {
    pub fn new(kind: SegmentKind, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self::new(SegmentKind::Added, value)
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self::new(SegmentKind::Removed, value)
    }

    pub fn common(value: impl Into<String>) -> Self {
        Self::new(SegmentKind::Common, value)
    }

    /// Check if this is an actual change (not shared content)
    pub fn is_change(&self) -> bool {
        self.kind != SegmentKind::Common
    }
}

/// Ordered segments produced for one pair of inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub segments: Vec<DiffSegment>,
    /// Number of tokens only present in the new input
    pub insertions: usize,
    /// Number of tokens only present in the old input
    pub deletions: usize,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Rebuild the old input from removed and common segments
    pub fn old_text(&self) -> String {
        self.collect_text(SegmentKind::Removed)
    }

    /// Rebuild the new input from added and common segments
    pub fn new_text(&self) -> String {
        self.collect_text(SegmentKind::Added)
    }

    /// True when both inputs were equal (including both empty)
    pub fn is_identical(&self) -> bool {
        self.segments.iter().all(|s| !s.is_change())
    }

    /// Get all the changed (non-common) segments
    pub fn changes(&self) -> impl Iterator<Item = &DiffSegment> {
        self.segments.iter().filter(|s| s.is_change())
    }

    fn collect_text(&self, side: SegmentKind) -> String {
        self.segments
            .iter()
            .filter(|s| s.kind == side || s.kind == SegmentKind::Common)
            .map(|s| s.value.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruction() {
        let result = DiffResult {
            segments: vec![
                DiffSegment::common("ab"),
                DiffSegment::removed("c"),
                DiffSegment::added("d"),
            ],
            insertions: 1,
            deletions: 1,
        };

        assert_eq!(result.old_text(), "abc");
        assert_eq!(result.new_text(), "abd");
        assert!(!result.is_identical());
        assert_eq!(result.changes().count(), 2);
    }

    #[test]
    fn test_empty_result_is_identical() {
        let result = DiffResult::default();
        assert!(result.is_empty());
        assert!(result.is_identical());
        assert_eq!(result.old_text(), "");
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&DiffSegment::added("x")).unwrap();
        assert_eq!(json, r#"{"value":"x","kind":"added"}"#);
    }
}
