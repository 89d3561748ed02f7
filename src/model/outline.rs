//! Structural labels and the extraction result.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Structural role of one encoded unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockLabel {
    /// Part of the document title
    Title,
    /// A section heading
    Heading,
    /// Body text and everything else
    Other,
}

impl fmt::Display for BlockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockLabel::Title => "Title",
            BlockLabel::Heading => "Heading",
            BlockLabel::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Heading depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Top-level section
    H1,
    /// Subsection
    H2,
    /// Sub-subsection
    H3,
}

impl HeadingLevel {
    /// Numeric depth (1-3).
    pub fn depth(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Label text as it appears in output ("H1", "H2", "H3").
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeadingLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "H1" => Ok(HeadingLevel::H1),
            "H2" => Ok(HeadingLevel::H2),
            "H3" => Ok(HeadingLevel::H3),
            other => Err(Error::InvalidInput(format!(
                "unknown heading level: {}",
                other
            ))),
        }
    }
}

/// One line of the document outline.
///
/// Field order is significant: it is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading depth
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// 1-based page number
    pub page: u32,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Title and outline of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Resolved title, empty when none could be determined
    pub title: String,
    /// Headings in reading order
    pub outline: Vec<OutlineEntry>,
}

impl ExtractionResult {
    /// Create a new result.
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// The result for a document with nothing extractable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether neither a title nor any heading was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.outline.is_empty()
    }
}
