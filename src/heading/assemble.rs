//! Final outline assembly.

use std::collections::BTreeSet;

use crate::model::{LeveledHeading, Outline, OutlineEntry};

/// Orders, deduplicates and packages leveled headings.
#[derive(Debug, Clone)]
pub struct OutlineAssembler {
    title_overlap: f32,
}

impl Default for OutlineAssembler {
    fn default() -> Self {
        Self { title_overlap: 0.8 }
    }
}

impl OutlineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the word overlap at which a heading repeats the title.
    pub fn with_title_overlap(mut self, overlap: f32) -> Self {
        self.title_overlap = overlap;
        self
    }

    /// Build the outline.
    ///
    /// Headings are sorted by (page, line order); headings repeating the
    /// title and adjacent duplicates with the same level and text are dropped.
    pub fn assemble(&self, title: impl Into<String>, mut headings: Vec<LeveledHeading>) -> Outline {
        let title = title.into();
        headings.sort_by_key(|h| (h.candidate.page, h.candidate.line_index));

        let entries = headings
            .into_iter()
            .filter(|h| !self.repeats_title(&title, &h.candidate.text))
            .map(|h| OutlineEntry::new(h.level, h.candidate.text.trim(), h.candidate.page))
            .collect();

        Outline {
            title,
            entries: dedup_adjacent(entries),
        }
    }

    /// Whether a heading repeats the title.
    pub fn repeats_title(&self, title: &str, text: &str) -> bool {
        let title_norm = normalize(title);
        if title_norm.is_empty() {
            return false;
        }
        if title_norm == normalize(text) {
            return true;
        }

        let title_words: BTreeSet<String> = title_norm.split(' ').map(str::to_string).collect();
        if title_words.len() < 2 {
            return false;
        }
        let text_norm = normalize(text);
        let text_words: BTreeSet<&str> = text_norm.split(' ').collect();
        let shared = title_words
            .iter()
            .filter(|w| text_words.contains(w.as_str()))
            .count();
        shared as f32 / title_words.len() as f32 >= self.title_overlap
    }
}

/// Drop entries whose (level, text) equals the entry right before them.
///
/// Applies across page boundaries, which removes running headers picked
/// up on consecutive pages.
pub fn dedup_adjacent(entries: Vec<OutlineEntry>) -> Vec<OutlineEntry> {
    let mut out: Vec<OutlineEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let duplicate = out
            .last()
            .map(|prev| prev.level == entry.level && normalize(&prev.text) == normalize(&entry.text))
            .unwrap_or(false);
        if !duplicate {
            out.push(entry);
        }
    }
    out
}

/// Lower-case, strip punctuation, collapse whitespace.
fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingCandidate, HeadingLevel, PatternType};

    fn heading(level: HeadingLevel, text: &str, page: u32, line_index: usize) -> LeveledHeading {
        LeveledHeading {
            level,
            candidate: HeadingCandidate {
                text: text.to_string(),
                page,
                pattern_type: PatternType::FontOnly,
                numbering_depth: None,
                confidence: 0.8,
                raw_font_size: 14.0,
                line_index,
                is_bold: false,
            },
        }
    }

    #[test]
    fn test_orders_by_page_then_line() {
        let outline = OutlineAssembler::new().assemble(
            "Report",
            vec![
                heading(HeadingLevel::H2, "Later", 2, 30),
                heading(HeadingLevel::H1, "First", 1, 3),
                heading(HeadingLevel::H1, "Second", 1, 10),
            ],
        );
        let texts: Vec<_> = outline.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["First", "Second", "Later"]);
    }

    #[test]
    fn test_adjacent_duplicates_collapse() {
        let outline = OutlineAssembler::new().assemble(
            "Report",
            vec![
                heading(HeadingLevel::H1, "Running Head", 1, 0),
                heading(HeadingLevel::H1, "Running Head", 2, 40),
                heading(HeadingLevel::H2, "Running Head", 3, 80),
                heading(HeadingLevel::H2, "Other", 3, 90),
            ],
        );
        assert_eq!(outline.len(), 3);
        assert_eq!(outline.entries[0].page, 1);
        assert_eq!(outline.entries[1].level, HeadingLevel::H2);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let entries = vec![
            OutlineEntry::new(HeadingLevel::H1, "Intro", 1),
            OutlineEntry::new(HeadingLevel::H1, "Intro", 1),
            OutlineEntry::new(HeadingLevel::H2, "Scope", 1),
        ];
        let once = dedup_adjacent(entries);
        assert_eq!(once.len(), 2);
        assert_eq!(dedup_adjacent(once.clone()), once);
    }

    #[test]
    fn test_title_repeats_dropped() {
        let assembler = OutlineAssembler::new();
        assert!(assembler.repeats_title("Annual Report 2024", "ANNUAL REPORT 2024"));
        assert!(assembler.repeats_title("RFP: Digital Library Plan", "Digital Library Plan RFP"));
        assert!(!assembler.repeats_title("Annual Report 2024", "Report Summary"));
        assert!(!assembler.repeats_title("Overview", "Overview of Costs"));
        assert!(!assembler.repeats_title("", "Anything"));

        let outline = assembler.assemble(
            "Annual Report 2024",
            vec![
                heading(HeadingLevel::H1, "Annual Report 2024", 1, 0),
                heading(HeadingLevel::H1, "Highlights", 1, 4),
            ],
        );
        assert_eq!(outline.len(), 1);
        assert_eq!(outline.entries[0].text, "Highlights");
    }
}
