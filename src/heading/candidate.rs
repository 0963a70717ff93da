//! Heading candidate generation.
//!
//! Each line is checked against the pattern families in priority order:
//! numbered, semantic, question, font-only. The first family that matches
//! decides the candidate; lines matching none produce nothing.

use regex::Regex;

use crate::model::{DocumentStats, HeadingCandidate, Line, PatternType};

use super::config::OutlineConfig;

/// Section names recognized by the semantic family.
pub const SEMANTIC_HEADINGS: &[&str] = &[
    // Document structure
    "executive summary",
    "abstract",
    "introduction",
    "background",
    "overview",
    "table of contents",
    "contents",
    "summary",
    "preface",
    "foreword",
    "acknowledgements",
    "acknowledgments",
    "methodology",
    "methods",
    "approach",
    "results",
    "findings",
    "analysis",
    "discussion",
    "conclusion",
    "conclusions",
    "recommendations",
    "references",
    "bibliography",
    "appendix",
    "appendices",
    "glossary",
    "index",
    // Business / proposals
    "business plan",
    "timeline",
    "schedule",
    "milestones",
    "budget",
    "evaluation",
    "requirements",
    "deliverables",
    "scope",
    "objectives",
    "goals",
    "strategy",
    "implementation",
    // Research
    "literature review",
    "related work",
    "experimental setup",
    "data collection",
    "case study",
    "future work",
    "limitations",
    // Technical documentation
    "installation",
    "configuration",
    "user guide",
    "troubleshooting",
    "api reference",
    "best practices",
    // Legal / policy
    "definitions",
    "terms and conditions",
    "privacy policy",
    "disclaimer",
    // FAQ
    "frequently asked questions",
    "questions and answers",
    "q&a",
    "faq",
];

/// Maximum words in a numbered heading's title text.
const NUMBERED_MAX_WORDS: usize = 20;

/// Result of matching one line against the pattern families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternMatch {
    /// Numbering token with its segment count and the remaining title
    Numbered { depth: u8, text: String },
    Semantic,
    Question,
    FontOnly,
}

impl PatternMatch {
    /// The pattern family of this match.
    pub fn pattern_type(&self) -> PatternType {
        match self {
            PatternMatch::Numbered { .. } => PatternType::Numbered,
            PatternMatch::Semantic => PatternType::Semantic,
            PatternMatch::Question => PatternType::Question,
            PatternMatch::FontOnly => PatternType::FontOnly,
        }
    }

    /// Build an unscored candidate for `line` at position `index`.
    pub fn into_candidate(self, line: &Line, index: usize) -> HeadingCandidate {
        let pattern_type = self.pattern_type();
        let (text, numbering_depth) = match self {
            PatternMatch::Numbered { depth, text } => (text, Some(depth)),
            _ => (line.trimmed().to_string(), None),
        };
        HeadingCandidate {
            text,
            page: line.page,
            pattern_type,
            numbering_depth,
            confidence: 0.0,
            raw_font_size: line.font_size,
            line_index: index,
            is_bold: line.is_bold,
        }
    }
}

/// Applies the pattern families to normalized lines.
pub struct CandidateGenerator {
    font_only_min_ratio: f32,
    font_only_max_words: usize,
    numbered: Regex,
    lettered: Regex,
    roman: Regex,
    chapter: Regex,
    question_start: Regex,
    answer_start: Regex,
    noise: Vec<Regex>,
    prose: Vec<Regex>,
}

impl CandidateGenerator {
    /// Create a generator for the given configuration.
    pub fn new(config: &OutlineConfig) -> Self {
        let noise = [
            r"^page\s+\d+(\s*(of|/)\s*\d+)?$",
            r"^-?\s*\d+(\s*/\s*\d+)?\s*-?$",
            r"^[ivxlc]{1,5}$",
            r"^copyright\b",
            r"^©",
            r"\(c\)\s*\d{4}",
            r"^version\s+\d",
            r"^www\.",
            r"https?://",
            r"[\w.+-]+@[\w-]+\.\w+",
            r"^(figure|fig\.|table|chart|exhibit)\s+\d+",
            r"^see page\b",
            r"^continued\b",
            r"^end of\b",
            r"^total\s*:",
            r"^\$\s?\d",
            r"^(date|time|location|address|email|e-mail|phone|tel|fax)\s*:",
            r"^(email|phone)$",
        ];
        let prose = [
            r"\b(however|therefore|furthermore|moreover|additionally|specifically|particularly)\b",
            r"\b(will|shall|must|should|can|may) be\b",
            r"\b(the purpose|in order to|according to|such as|for example)\b",
            r"\bthis (document|section|chapter) (is|will|describes|provides)\b",
            r"\bas (shown|described|mentioned) (in|above|below)\b",
        ];

        Self {
            font_only_min_ratio: config.font_only_min_ratio,
            font_only_max_words: config.font_only_max_words,
            numbered: Regex::new(r"^(\d{1,3}(?:\.\d{1,3}){1,3}\.?|\d{1,3}\.)\s+(\p{L}.+)$").unwrap(),
            lettered: Regex::new(r"^([A-Z])[.)]\s+(\p{L}.+)$").unwrap(),
            roman: Regex::new(r"^([IVXLC]{1,6})\.\s+(\p{L}.+)$").unwrap(),
            chapter: Regex::new(r"(?i)^(chapter|part|section|appendix)\s+(\d{1,3}|[IVXLC]{1,6}|[A-Z])\b")
                .unwrap(),
            question_start: Regex::new(r"(?i)^(q\d*\s*[:.]|question\b)").unwrap(),
            answer_start: Regex::new(r"(?i)^(a\d*\s*:|answer\b)").unwrap(),
            noise: noise
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
                .collect(),
            prose: prose
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
                .collect(),
        }
    }

    /// Produce at most one candidate per line, in line order.
    pub fn generate(&self, lines: &[Line], stats: &DocumentStats) -> Vec<HeadingCandidate> {
        let candidates: Vec<HeadingCandidate> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                self.classify(lines, i, stats)
                    .map(|m| m.into_candidate(line, i))
            })
            .collect();
        log::debug!(
            "Generated {} heading candidates from {} lines",
            candidates.len(),
            lines.len()
        );
        candidates
    }

    /// Match line `index` against the families in priority order.
    pub fn classify(&self, lines: &[Line], index: usize, stats: &DocumentStats) -> Option<PatternMatch> {
        let line = lines.get(index)?;
        let text = line.trimmed();

        if text.chars().count() < 3 || self.is_noise(text) {
            return None;
        }

        if let Some((depth, title)) = self.match_numbering(text) {
            return Some(PatternMatch::Numbered { depth, text: title });
        }

        // Explicit Q&A markers are questions whatever their wording
        let marked = self.is_marked_question(lines, index);
        if self.is_prose(text) {
            return marked.then_some(PatternMatch::Question);
        }

        let words = line.word_count();
        if words <= self.font_only_max_words
            && !text.ends_with('.')
            && semantic_keyword(text).is_some()
        {
            return Some(PatternMatch::Semantic);
        }

        if marked || text.ends_with('?') {
            return Some(PatternMatch::Question);
        }

        if words <= self.font_only_max_words
            && line.font_size >= stats.modal_font_size * self.font_only_min_ratio
        {
            return Some(PatternMatch::FontOnly);
        }

        None
    }

    /// Match a leading numbering token.
    ///
    /// Returns the numbering depth and the title text. `Chapter`/`Part`/
    /// `Section` headings keep their full text.
    pub fn match_numbering(&self, text: &str) -> Option<(u8, String)> {
        if let Some(caps) = self.numbered.captures(text) {
            let token = caps[1].trim_end_matches('.');
            let title = caps[2].trim();
            if is_title_text(title) {
                let depth = token.split('.').count().min(u8::MAX as usize) as u8;
                return Some((depth, title.to_string()));
            }
        }

        for re in [&self.lettered, &self.roman] {
            if let Some(caps) = re.captures(text) {
                let title = caps[2].trim();
                if is_title_text(title) {
                    return Some((1, title.to_string()));
                }
            }
        }

        if self.chapter.is_match(text)
            && text.split_whitespace().count() <= self.font_only_max_words
            && !text.ends_with('.')
        {
            return Some((1, text.to_string()));
        }

        None
    }

    /// Whether the text is a page number, URL, caption or similar noise.
    pub fn is_noise(&self, text: &str) -> bool {
        let text = text.trim();
        self.noise.iter().any(|re| re.is_match(text))
    }

    /// Whether the text reads like running prose rather than a heading.
    pub fn is_prose(&self, text: &str) -> bool {
        text.matches('.').count() > 2
            || text.matches(',').count() > 3
            || self.prose.iter().any(|re| re.is_match(text))
    }

    /// Whether line `index` starts with `Q:`/`Question` or is directly
    /// followed by an `A:`/`Answer` line.
    pub fn is_marked_question(&self, lines: &[Line], index: usize) -> bool {
        let Some(line) = lines.get(index) else {
            return false;
        };
        self.question_start.is_match(line.trimmed())
            || lines
                .get(index + 1)
                .map_or(false, |n| self.answer_start.is_match(n.trimmed()))
    }
}

/// Title text of a numbered heading: starts with a non-lower-case letter,
/// at least 2 characters, not a run-on sentence.
fn is_title_text(title: &str) -> bool {
    let mut chars = title.chars();
    let starts_ok = chars
        .next()
        .map(|c| c.is_alphabetic() && !c.is_lowercase())
        .unwrap_or(false);
    starts_ok && title.chars().count() >= 2 && title.split_whitespace().count() <= NUMBERED_MAX_WORDS
}

/// The vocabulary entry the text equals or starts with, if any.
pub fn semantic_keyword(text: &str) -> Option<&'static str> {
    let norm = text.trim().trim_end_matches(':').trim().to_lowercase();
    SEMANTIC_HEADINGS.iter().copied().find(|kw| {
        norm.strip_prefix(kw).map_or(false, |rest| {
            rest.chars().next().map_or(true, |c| !c.is_alphanumeric())
        })
    })
}
