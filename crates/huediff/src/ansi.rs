//! Terminal colouring for diff results

use crossterm::style::{Color, Stylize};
use huediff_core::{DiffResult, Palette, SegmentKind};
use std::fmt::Write;

/// Map a palette colour value to a terminal colour
///
/// Accepts crossterm colour names (`green`, `dark_grey`, ...), `grey` and
/// `#rrggbb`; anything else yields `fallback`.
pub fn terminal_color(value: &str, fallback: Color) -> Color {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(fallback);
    }
    match value.to_ascii_lowercase().as_str() {
        "gray" => Color::Grey,
        name => Color::try_from(name).unwrap_or(fallback),
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        }),
        3 => {
            let short = |i: usize| channel(i..i + 1).map(|c| c * 17);
            Some(Color::Rgb {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
            })
        }
        _ => None,
    }
}

fn fallback_color(kind: SegmentKind) -> Color {
    match kind {
        SegmentKind::Added => Color::Green,
        SegmentKind::Removed => Color::Red,
        SegmentKind::Common => Color::Grey,
    }
}

pub fn render_ansi(result: &DiffResult, palette: &Palette, placeholder: &str) -> String {
    if result.is_empty() {
        return format!("{}", placeholder.dim());
    }

    let mut out = String::new();
    for segment in &result.segments {
        let color = terminal_color(palette.color(segment.kind), fallback_color(segment.kind));
        let _ = write!(out, "{}", segment.value.as_str().with(color));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use huediff_core::DiffSegment;

    #[test]
    fn test_terminal_color_names_and_hex() {
        assert_eq!(terminal_color("green", Color::Reset), Color::Green);
        assert_eq!(terminal_color("Gray", Color::Reset), Color::Grey);
        assert_eq!(
            terminal_color("#ff8000", Color::Reset),
            Color::Rgb { r: 255, g: 128, b: 0 }
        );
        assert_eq!(
            terminal_color("#0f0", Color::Reset),
            Color::Rgb { r: 0, g: 255, b: 0 }
        );
        assert_eq!(terminal_color("chartreuse", Color::Blue), Color::Blue);
        assert_eq!(terminal_color("#12", Color::Blue), Color::Blue);
    }

    #[test]
    fn test_render_ansi_keeps_text() {
        let result = DiffResult {
            segments: vec![DiffSegment::common("ab"), DiffSegment::added("<d>")],
            ..DiffResult::default()
        };
        let out = render_ansi(&result, &Palette::default(), "Difference");
        assert!(out.contains("ab"));
        assert!(out.contains("<d>"));
    }

    #[test]
    fn test_render_ansi_placeholder() {
        let out = render_ansi(&DiffResult::default(), &Palette::default(), "Difference");
        assert!(out.contains("Difference"));
    }
}
