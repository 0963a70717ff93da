//! Heading candidates.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The pattern family that produced a candidate.
///
/// Variants are listed in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Leading numbering token (`1.`, `2.3`, `A.`, `IV.`, `Chapter 2`)
    Numbered,
    /// Known section name (Introduction, References, ...)
    Semantic,
    /// Question / FAQ shape
    Question,
    /// Typography only: larger than body text
    FontOnly,
}

impl PatternType {
    /// Whether the family matched on text content rather than typography.
    pub fn is_textual(&self) -> bool {
        !matches!(self, PatternType::FontOnly)
    }

    /// Short label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            PatternType::Numbered => "numbered",
            PatternType::Semantic => "semantic",
            PatternType::Question => "question",
            PatternType::FontOnly => "font-only",
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A line provisionally identified as a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    /// Heading text (numbering token removed for numbered headings)
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Pattern family that matched
    pub pattern_type: PatternType,
    /// Number of numbering segments; only set for numbered headings
    pub numbering_depth: Option<u8>,
    /// Fused confidence in [0, 1]
    pub confidence: f32,
    /// Font size of the source line
    pub raw_font_size: f32,
    /// Index of the source line in the document line sequence
    pub line_index: usize,
    /// Whether the source line is bold
    pub is_bold: bool,
}

impl HeadingCandidate {
    /// Check the candidate's invariants.
    pub fn validate(&self) -> Result<()> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::MalformedCandidate(format!(
                "confidence {} out of range for {:?}",
                self.confidence, self.text
            )));
        }
        match (self.pattern_type, self.numbering_depth) {
            (PatternType::Numbered, None) => Err(Error::MalformedCandidate(format!(
                "numbered heading {:?} has no depth",
                self.text
            ))),
            (PatternType::Numbered, Some(_)) | (_, None) => Ok(()),
            (_, Some(_)) => Err(Error::MalformedCandidate(format!(
                "{} heading {:?} carries a numbering depth",
                self.pattern_type, self.text
            ))),
        }
    }
}
