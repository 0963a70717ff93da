//! Structural fragment filtering.
//!
//! Drops accepted candidates that are pieces of a larger sentence or sit in
//! a list/table region. The filter only removes; it never adds candidates.

use crate::model::{DocumentStats, HeadingCandidate, Line};

use super::config::FragmentConfig;

/// Words a heading never ends with.
const TRAILING_CONNECTIVES: &[&str] = &[
    "and", "or", "but", "nor", "of", "the", "a", "an", "to", "for", "with", "in", "on", "by", "at",
    "from",
];

/// Words that, at the end of a line, continue onto the next line.
const CONTINUING_CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "of", "the", "to", "with"];

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentReason {
    /// Ends with `,` `;` `-` `/` `&` or an opening bracket/quote
    TrailingPunctuation,
    /// Ends with a conjunction, article or preposition
    TrailingConnective,
    /// Starts with a lower-case `and`/`or`/`but`
    LeadingConjunction,
    /// Continues the sentence of the previous line
    Continuation,
    /// One of several aligned short lines (list or table)
    ListRegion,
}

/// Removes structurally incomplete candidates.
pub struct FragmentFilter<'a> {
    config: &'a FragmentConfig,
}

impl<'a> FragmentFilter<'a> {
    pub fn new(config: &'a FragmentConfig) -> Self {
        Self { config }
    }

    /// Keep only candidates that are not fragments.
    pub fn filter(
        &self,
        candidates: Vec<HeadingCandidate>,
        lines: &[Line],
        stats: &DocumentStats,
    ) -> Vec<HeadingCandidate> {
        let before = candidates.len();
        let kept: Vec<HeadingCandidate> = candidates
            .into_iter()
            .filter(|c| match self.check(c, lines, stats) {
                Some(reason) => {
                    log::debug!("Dropped fragment {:?} ({:?})", c.text, reason);
                    false
                }
                None => true,
            })
            .collect();
        log::debug!("Fragment filter kept {} of {} candidates", kept.len(), before);
        kept
    }

    /// The reason a candidate is a fragment, if it is one.
    pub fn check(
        &self,
        candidate: &HeadingCandidate,
        lines: &[Line],
        stats: &DocumentStats,
    ) -> Option<FragmentReason> {
        if let Some(reason) = text_fragment(&candidate.text) {
            return Some(reason);
        }

        let line = lines.get(candidate.line_index)?;
        if let Some(reason) = text_fragment(line.trimmed()) {
            return Some(reason);
        }

        let prev = candidate
            .line_index
            .checked_sub(1)
            .and_then(|i| lines.get(i))
            .filter(|p| {
                p.page == line.page
                    || (p.page + 1 == line.page
                        && (p.font_size - stats.modal_font_size).abs() <= self.config.size_tolerance)
            });
        if let Some(prev) = prev {
            let prev_text = prev.trimmed();
            if (line.starts_lowercase() && !prev.has_terminal_punctuation())
                || prev_text.ends_with(',')
                || last_word_in(prev_text, CONTINUING_CONJUNCTIONS)
            {
                return Some(FragmentReason::Continuation);
            }
        }

        if self.in_list_region(candidate, line, lines, stats) {
            return Some(FragmentReason::ListRegion);
        }

        None
    }

    fn in_list_region(
        &self,
        candidate: &HeadingCandidate,
        line: &Line,
        lines: &[Line],
        stats: &DocumentStats,
    ) -> bool {
        let prominent = candidate.is_bold && candidate.raw_font_size > stats.modal_font_size;
        if prominent {
            return false;
        }

        let idx = candidate.line_index;
        let start = idx.saturating_sub(self.config.window);
        let end = (idx + self.config.window + 1).min(lines.len());

        let aligned = (start..end)
            .filter(|&i| i != idx)
            .map(|i| &lines[i])
            .filter(|n| {
                n.page == line.page
                    && (n.x_indent - line.x_indent).abs() <= self.config.indent_tolerance
                    && (n.font_size - line.font_size).abs() <= self.config.size_tolerance
                    && n.word_count() <= self.config.list_max_words
                    && !n.has_terminal_punctuation()
            })
            .count();

        aligned >= self.config.list_min_neighbors
    }
}

/// Whether the text alone already reads as a fragment.
pub fn is_text_fragment(text: &str) -> bool {
    text_fragment(text).is_some()
}

/// Fragment checks that only need the text itself.
fn text_fragment(text: &str) -> Option<FragmentReason> {
    let text = text.trim();
    if matches!(
        text.chars().last(),
        Some(',' | ';' | '-' | '/' | '&' | '(' | '[' | '{' | '"')
    ) {
        return Some(FragmentReason::TrailingPunctuation);
    }
    if last_word_in(text, TRAILING_CONNECTIVES) {
        return Some(FragmentReason::TrailingConnective);
    }
    if ["and ", "or ", "but "].iter().any(|p| text.starts_with(p)) {
        return Some(FragmentReason::LeadingConjunction);
    }
    None
}

fn last_word_in(text: &str, words: &[&str]) -> bool {
    text.split_whitespace()
        .last()
        .map(|w| words.contains(&w.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatternType;

    fn candidate_for(lines: &[Line], index: usize) -> HeadingCandidate {
        let line = &lines[index];
        HeadingCandidate {
            text: line.text.clone(),
            page: line.page,
            pattern_type: PatternType::FontOnly,
            numbering_depth: None,
            confidence: 0.8,
            raw_font_size: line.font_size,
            line_index: index,
            is_bold: line.is_bold,
        }
    }

    fn body_stats() -> DocumentStats {
        let mut stats = DocumentStats::default();
        for _ in 0..10 {
            stats.add_size(11.0);
        }
        stats.analyze();
        stats
    }

    #[test]
    fn test_text_fragments() {
        assert_eq!(text_fragment("Results,"), Some(FragmentReason::TrailingPunctuation));
        assert_eq!(text_fragment("Costs (see"), None);
        assert_eq!(text_fragment("Costs ("), Some(FragmentReason::TrailingPunctuation));
        assert_eq!(text_fragment("Goals and"), Some(FragmentReason::TrailingConnective));
        assert_eq!(text_fragment("Review of the"), Some(FragmentReason::TrailingConnective));
        assert_eq!(text_fragment("and then some"), Some(FragmentReason::LeadingConjunction));
        assert_eq!(text_fragment("Research and Development"), None);
    }

    #[test]
    fn test_continuation_dropped() {
        let config = FragmentConfig::default();
        let filter = FragmentFilter::new(&config);
        let lines = vec![
            Line::new("The committee reviewed the proposal and", 11.0, 1).at(72.0, 100.0),
            Line::new("Funding Priorities", 16.0, 1).at(72.0, 114.0),
            Line::new("The plan covered", 11.0, 1).at(72.0, 200.0),
            Line::new("regional libraries", 16.0, 1).at(72.0, 214.0),
        ];
        let stats = body_stats();
        assert_eq!(
            filter.check(&candidate_for(&lines, 1), &lines, &stats),
            Some(FragmentReason::Continuation)
        );
        assert_eq!(
            filter.check(&candidate_for(&lines, 3), &lines, &stats),
            Some(FragmentReason::Continuation)
        );
    }

    #[test]
    fn test_heading_after_page_break_kept() {
        let config = FragmentConfig::default();
        let filter = FragmentFilter::new(&config);
        let lines = vec![
            Line::new("ends without a stop", 11.0, 1).at(72.0, 700.0),
            Line::new("Overview", 16.0, 2).at(72.0, 72.0),
        ];
        assert_eq!(filter.check(&candidate_for(&lines, 1), &lines, &body_stats()), None);
    }

    #[test]
    fn test_continuation_across_page_break() {
        let config = FragmentConfig::default();
        let filter = FragmentFilter::new(&config);
        let stats = body_stats();
        let lines = vec![
            Line::new("The survey also covered the", 11.0, 1).at(72.0, 700.0),
            Line::new("northern districts", 16.0, 2).at(72.0, 72.0),
            Line::new("Funding was approved for", 11.0, 2).at(72.0, 700.0),
            Line::new("regional libraries", 16.0, 3).at(72.0, 72.0),
        ];
        assert_eq!(
            filter.check(&candidate_for(&lines, 1), &lines, &stats),
            Some(FragmentReason::Continuation)
        );
        assert_eq!(
            filter.check(&candidate_for(&lines, 3), &lines, &stats),
            Some(FragmentReason::Continuation)
        );

        // A large heading ending a page does not swallow the next page
        let heading_end = vec![
            Line::new("Regional Summary", 18.0, 1).at(72.0, 700.0),
            Line::new("northern districts", 16.0, 2).at(72.0, 72.0),
        ];
        assert_eq!(
            filter.check(&candidate_for(&heading_end, 1), &heading_end, &stats),
            None
        );
    }

    #[test]
    fn test_list_region() {
        let config = FragmentConfig::default();
        let filter = FragmentFilter::new(&config);
        let lines = vec![
            Line::new("Apples", 11.0, 1).at(90.0, 100.0),
            Line::new("Oranges", 11.0, 1).at(90.0, 114.0),
            Line::new("Budget", 11.0, 1).at(90.0, 128.0),
            Line::new("Pears", 11.0, 1).at(90.0, 142.0),
        ];
        let stats = body_stats();
        assert_eq!(
            filter.check(&candidate_for(&lines, 2), &lines, &stats),
            Some(FragmentReason::ListRegion)
        );

        // Bold and larger than body text survives the list check
        let mut bold = lines.clone();
        bold[2] = Line::new("Budget", 14.0, 1).bold().at(90.0, 128.0);
        assert_eq!(filter.check(&candidate_for(&bold, 2), &bold, &stats), None);
    }

    #[test]
    fn test_filter_keeps_clean_headings() {
        let config = FragmentConfig::default();
        let filter = FragmentFilter::new(&config);
        let lines = vec![
            Line::new("Introduction", 16.0, 1).at(72.0, 72.0),
            Line::new("This report describes the project.", 11.0, 1).at(72.0, 100.0),
            Line::new("Goals and", 16.0, 1).at(72.0, 140.0),
        ];
        let candidates = vec![candidate_for(&lines, 0), candidate_for(&lines, 2)];
        let kept = filter.filter(candidates, &lines, &body_stats());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "Introduction");
    }
}
