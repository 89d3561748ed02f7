//! Title resolution and outline assembly.

mod assemble;
mod title;

pub use assemble::assemble_outline;
pub use title::{resolve_title, ResolvedTitle, TitleSource};

use std::cmp::Ordering;

use crate::features::EncodedUnit;

/// Reading order: page ascending, then top edge ascending.
pub(crate) fn reading_order(a: &EncodedUnit, b: &EncodedUnit) -> Ordering {
    a.page
        .cmp(&b.page)
        .then_with(|| a.top().total_cmp(&b.top()))
}
