//! Title selection.

use crate::features::EncodedUnit;
use crate::model::BlockLabel;

use super::reading_order;

/// Which rule produced the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    /// Earliest, topmost unit labeled Title
    Classified,
    /// Largest text on page 1
    LargestOnFirstPage,
    /// Nothing to choose from
    None,
}

/// The chosen title and how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    /// Title text, empty when `source` is [`TitleSource::None`]
    pub text: String,
    /// Selection rule that fired
    pub source: TitleSource,
}

/// Pick the document title.
///
/// Units labeled Title win: the first in reading order is taken. Without any,
/// the unit with the largest `avg_size` on page 1 is taken, the topmost one on
/// ties. Both sorts are stable, so fully equal keys keep document order.
/// `units` and `labels` are parallel slices.
pub fn resolve_title(units: &[EncodedUnit], labels: &[BlockLabel]) -> ResolvedTitle {
    let mut titles: Vec<&EncodedUnit> = units
        .iter()
        .zip(labels)
        .filter(|(_, label)| **label == BlockLabel::Title)
        .map(|(unit, _)| unit)
        .collect();

    if !titles.is_empty() {
        titles.sort_by(|a, b| reading_order(a, b));
        log::debug!("Title from {} classified candidate(s)", titles.len());
        return ResolvedTitle {
            text: titles[0].text.clone(),
            source: TitleSource::Classified,
        };
    }

    let mut first_page: Vec<&EncodedUnit> = units.iter().filter(|u| u.page == 1).collect();
    first_page.sort_by(|a, b| {
        b.features
            .avg_size
            .total_cmp(&a.features.avg_size)
            .then_with(|| a.top().total_cmp(&b.top()))
    });

    match first_page.first() {
        Some(unit) => {
            log::debug!("No classified title, falling back to largest text on page 1");
            ResolvedTitle {
                text: unit.text.clone(),
                source: TitleSource::LargestOnFirstPage,
            }
        }
        None => ResolvedTitle {
            text: String::new(),
            source: TitleSource::None,
        },
    }
}
