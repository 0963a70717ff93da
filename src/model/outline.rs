//! The extracted outline.

use serde::{Deserialize, Serialize};

use super::HeadingCandidate;

/// Hierarchical heading level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a depth (1-based) to a level, capping at H3.
    pub fn from_depth(depth: u8) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Map a style rank (0 = most prominent) to a level.
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => HeadingLevel::H1,
            1 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Numeric depth (1-3).
    pub fn depth(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// An accepted candidate with its assigned level.
#[derive(Debug, Clone, PartialEq)]
pub struct LeveledHeading {
    pub level: HeadingLevel,
    pub candidate: HeadingCandidate,
}

/// A single outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

impl OutlineEntry {
    /// Create a new entry.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Document title plus ordered headings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title
    pub title: String,
    /// Headings in reading order
    #[serde(rename = "outline")]
    pub entries: Vec<OutlineEntry>,
}

impl Outline {
    /// Create an outline with no headings.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    /// Check if there are no headings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count headings at a given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_depth() {
        assert_eq!(HeadingLevel::from_depth(1), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_depth(2), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_depth(3), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_depth(7), HeadingLevel::H3);
    }

    #[test]
    fn test_outline_serialization() {
        let mut outline = Outline::new("Report");
        outline
            .entries
            .push(OutlineEntry::new(HeadingLevel::H1, "Introduction", 1));

        let json = serde_json::to_value(&outline).unwrap();
        assert_eq!(json["title"], "Report");
        assert_eq!(json["outline"][0]["level"], "H1");
        assert_eq!(json["outline"][0]["text"], "Introduction");
        assert_eq!(json["outline"][0]["page"], 1);
        assert!(json.get("entries").is_none());
    }

    #[test]
    fn test_outline_counts() {
        let outline = Outline {
            title: String::new(),
            entries: vec![
                OutlineEntry::new(HeadingLevel::H1, "A", 1),
                OutlineEntry::new(HeadingLevel::H2, "B", 1),
                OutlineEntry::new(HeadingLevel::H2, "C", 2),
            ],
        };
        assert_eq!(outline.len(), 3);
        assert_eq!(outline.count_level(HeadingLevel::H2), 2);
        assert_eq!(HeadingLevel::H3.to_string(), "H3");
    }
}
