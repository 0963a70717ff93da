//! Span-to-line normalization.
//!
//! Groups the spans of each page into visual lines, cleans up the text and
//! computes the document statistics the heading pipeline scores against.

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::{DocumentStats, Line, PageSpans, Span, DEFAULT_PAGE_HEIGHT};

use super::lopdf_provider::is_spaceless_script_char;
use super::provider::PageTextProvider;

/// Lines of one document plus their statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDocument {
    /// Lines in reading order; `lines[i].order == i`
    pub lines: Vec<Line>,
    /// Font statistics over `lines`
    pub stats: DocumentStats,
}

impl NormalizedDocument {
    /// Check if no text was extracted.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines on a given page (1-indexed).
    pub fn page_lines(&self, page: u32) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(move |l| l.page == page)
    }
}

/// Flattens per-page spans into [`Line`] records.
#[derive(Debug, Clone)]
pub struct FeatureNormalizer {
    /// Baseline tolerance as a fraction of the font size
    y_tolerance_ratio: f32,
    /// Horizontal gap (in font sizes) that splits one row into two lines
    column_gap_ratio: f32,
}

impl Default for FeatureNormalizer {
    fn default() -> Self {
        Self {
            y_tolerance_ratio: 0.3,
            column_gap_ratio: 4.0,
        }
    }
}

impl FeatureNormalizer {
    /// Create a normalizer with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline tolerance ratio.
    pub fn with_y_tolerance(mut self, ratio: f32) -> Self {
        self.y_tolerance_ratio = ratio;
        self
    }

    /// Set the horizontal gap ratio that splits a row.
    pub fn with_column_gap(mut self, ratio: f32) -> Self {
        self.column_gap_ratio = ratio;
        self
    }

    /// Read every page from a provider and normalize it.
    pub fn normalize<P: PageTextProvider + ?Sized>(&self, provider: &P) -> Result<NormalizedDocument> {
        let mut pages = Vec::new();
        for page in provider.get_pages()? {
            pages.push(page?);
        }
        let mut doc = self.normalize_pages(&pages);
        if let Some(total) = provider.page_count() {
            doc.stats.page_count = doc.stats.page_count.max(total);
        }
        Ok(doc)
    }

    /// Normalize pages already in memory.
    pub fn normalize_pages(&self, pages: &[PageSpans]) -> NormalizedDocument {
        let mut lines = Vec::new();
        for page in pages {
            lines.extend(self.normalize_page(page));
        }
        for (order, line) in lines.iter_mut().enumerate() {
            line.order = order;
        }

        // Page numbers stay absolute under a page selection
        let page_count = pages.iter().map(|p| p.index as u32 + 1).max().unwrap_or(0);
        let stats = DocumentStats::from_lines(&lines, page_count);
        log::debug!(
            "Normalized {} pages into {} lines (body {:.1}pt)",
            pages.len(),
            lines.len(),
            stats.modal_font_size
        );
        NormalizedDocument { lines, stats }
    }

    /// Group one page's spans into lines, top to bottom.
    pub fn normalize_page(&self, page: &PageSpans) -> Vec<Line> {
        let page_height = if page.height > 0.0 {
            page.height
        } else {
            DEFAULT_PAGE_HEIGHT
        };

        self.group_rows(page.spans.iter().filter(|s| !s.text.trim().is_empty()).collect())
            .into_iter()
            .flat_map(|row| self.split_row(row))
            .filter_map(|segment| build_line(&segment, page.index as u32 + 1, page_height))
            .collect()
    }

    /// Group spans sharing a baseline, sorted top-down.
    fn group_rows<'a>(&self, mut spans: Vec<&'a Span>) -> Vec<Vec<&'a Span>> {
        spans.sort_by(|a, b| {
            a.bbox
                .y1
                .total_cmp(&b.bbox.y1)
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        });

        let mut rows: Vec<Vec<&Span>> = Vec::new();
        let mut current: Vec<&Span> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in spans {
            let tolerance = span.font_size.max(1.0) * self.y_tolerance_ratio;
            match current_y {
                Some(y) if (span.bbox.y1 - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(std::mem::take(&mut current));
                    }
                    current_y = Some(span.bbox.y1);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            rows.push(current);
        }
        rows
    }

    /// Split a row at wide horizontal gaps (columns, table cells).
    fn split_row<'a>(&self, mut row: Vec<&'a Span>) -> Vec<Vec<&'a Span>> {
        row.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let mut segments: Vec<Vec<&Span>> = Vec::new();
        for span in row {
            let split = segments
                .last()
                .and_then(|seg| seg.last())
                .map(|prev| span.bbox.x0 - prev.bbox.x1 > prev.font_size.max(1.0) * self.column_gap_ratio)
                .unwrap_or(true);
            if split {
                segments.push(vec![span]);
            } else if let Some(seg) = segments.last_mut() {
                seg.push(span);
            }
        }
        segments
    }
}

/// Build a line from spans on one row, sorted by x.
fn build_line(spans: &[&Span], page: u32, page_height: f32) -> Option<Line> {
    let text = clean_text(&join_spans(spans));
    if text.is_empty() {
        return None;
    }

    // Dominant font size, weighted by character count
    let total_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
    let weighted: f32 = spans
        .iter()
        .map(|s| s.font_size * s.text.chars().count() as f32)
        .sum();
    let font_size = if total_chars > 0 {
        weighted / total_chars as f32
    } else {
        spans[0].font_size
    };

    let bold_chars: usize = spans
        .iter()
        .filter(|s| s.is_bold)
        .map(|s| s.text.chars().count())
        .sum();
    let is_bold = total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5;

    let y_position = spans
        .iter()
        .map(|s| s.bbox.y0)
        .fold(f32::INFINITY, f32::min);

    let mut line = Line::new(text, font_size, page)
        .at(spans[0].bbox.x0, y_position)
        .with_page_height(page_height);
    line.is_bold = is_bold;
    Some(line)
}

/// Join spans with gap-based space insertion.
fn join_spans(spans: &[&Span]) -> String {
    let mut result = String::new();

    for (i, span) in spans.iter().enumerate() {
        if i > 0 {
            let prev = spans[i - 1];
            let gap = span.bbox.x0 - prev.bbox.x1;

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.bbox.width() > 0.0 {
                span.bbox.width() / char_count as f32
            } else {
                span.font_size * 0.5
            };

            let prev_last = prev.text.chars().last();
            let curr_first = span.text.chars().next();
            let spaceless = prev_last.map(is_spaceless_script_char).unwrap_or(false)
                && curr_first.map(is_spaceless_script_char).unwrap_or(false);
            let has_space = prev_last.map(char::is_whitespace).unwrap_or(false)
                || curr_first.map(char::is_whitespace).unwrap_or(false);

            if gap > avg_char_width * 0.2 && !spaceless && !has_space {
                result.push(' ');
            }
        }
        result.push_str(&span.text);
    }

    result
}

const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Normalize line text: NFC, ligatures, typographic punctuation, whitespace.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        if let Some((_, rep)) = LIGATURES.iter().find(|(l, _)| *l == c) {
            out.push_str(rep);
            continue;
        }
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201F}' => out.push('"'),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{00A0}' => out.push(' '),
            // Replacement char and private-use glyphs carry no text
            '\u{FFFD}' => {}
            c if is_private_use(c) => {}
            c => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}
