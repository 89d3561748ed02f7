//! Grouping of spans into visual lines.

use crate::model::TextSpan;

/// Default maximum top-edge difference between spans on one line.
pub const DEFAULT_LINE_TOLERANCE: f32 = 5.0;

/// Group spans into lines, greedily and in the order given.
///
/// A span joins the current line when its top edge differs from the top edge
/// of the line's last span by less than `tolerance`; otherwise it starts a new
/// line. Spans are never reordered, so the result is deterministic for a given
/// input order.
pub fn group_into_lines(spans: &[TextSpan], tolerance: f32) -> Vec<Vec<TextSpan>> {
    let mut lines: Vec<Vec<TextSpan>> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        let same_line = current
            .last()
            .map(|last| (span.top() - last.top()).abs() < tolerance)
            .unwrap_or(true);

        if !same_line {
            lines.push(std::mem::take(&mut current));
        }
        current.push(span.clone());
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Joined text of a line: span texts separated by single spaces.
pub fn line_text(spans: &[TextSpan]) -> String {
    spans
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
