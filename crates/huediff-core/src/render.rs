//! Rendering diff results as highlighted markup

use crate::segment::{DiffResult, SegmentKind};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const DEFAULT_PLACEHOLDER: &str = "Difference";

/// Colour used for each segment kind, as CSS colour values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub added: String,
    pub removed: String,
    pub common: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            added: "green".to_string(),
            removed: "red".to_string(),
            common: "grey".to_string(),
        }
    }
}

impl Palette {
    pub fn color(&self, kind: SegmentKind) -> &str {
        match kind {
            SegmentKind::Added => &self.added,
            SegmentKind::Removed => &self.removed,
            SegmentKind::Common => &self.common,
        }
    }
}

/// Renders segments as inline coloured spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRenderer {
    palette: Palette,
    placeholder: String,
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl MarkupRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn render(&self, result: &DiffResult) -> String {
        if result.is_empty() {
            return self.placeholder();
        }

        let mut out = String::new();
        for segment in &result.segments {
            let _ = write!(
                out,
                "<span style=\"color:{}\">",
                escape(self.palette.color(segment.kind))
            );
            out.push_str(&escape(&segment.value));
            out.push_str("</span>");
        }
        out
    }

    /// Markup shown when there is nothing to compare
    pub fn placeholder(&self) -> String {
        format!(
            "<span class=\"placeholder\">{}</span>",
            escape(&self.placeholder)
        )
    }
}

/// Render with the default palette and placeholder
pub fn render(result: &DiffResult) -> String {
    MarkupRenderer::default().render(result)
}

/// Escape characters that are significant in HTML
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
