//! Outline assembly.

use crate::features::EncodedUnit;
use crate::model::{HeadingLevel, OutlineEntry};

use super::reading_order;

/// Build the outline from heading units and their levels.
///
/// Headings are stable-sorted into reading order; heading level plays no part
/// in the order. If `title` is non-empty and equals the text of the first
/// entry, that entry is dropped. Only the first entry is checked: a heading
/// further down with the same text as the title stays in the outline.
pub fn assemble_outline(
    mut headings: Vec<(&EncodedUnit, HeadingLevel)>,
    title: &str,
) -> Vec<OutlineEntry> {
    headings.sort_by(|a, b| reading_order(a.0, b.0));

    let mut outline: Vec<OutlineEntry> = headings
        .into_iter()
        .map(|(unit, level)| OutlineEntry::new(level, unit.text.clone(), unit.page))
        .collect();

    let duplicates_title = outline
        .first()
        .map(|entry| !title.is_empty() && entry.text == title)
        .unwrap_or(false);
    if duplicates_title {
        log::debug!("Dropping leading outline entry that repeats the title");
        outline.remove(0);
    }

    outline
}
