//! Document title selection.

use std::collections::BTreeSet;
use std::path::Path;

use crate::model::{DocumentStats, Line};

use super::candidate::CandidateGenerator;
use super::config::TitleConfig;
use super::fragment::is_text_fragment;

/// Title used when nothing better is known.
pub const UNTITLED: &str = "Untitled";

/// A chosen title and the page-one lines it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSelection {
    pub text: String,
    pub lines: Vec<usize>,
}

/// Picks the title from page one.
pub struct TitleExtractor<'a> {
    config: &'a TitleConfig,
}

impl<'a> TitleExtractor<'a> {
    pub fn new(config: &'a TitleConfig) -> Self {
        Self { config }
    }

    /// Select the title text from page-one lines.
    ///
    /// `excluded` holds the line indices already accepted as textual
    /// headings. Returns `None` when page one has no usable line.
    pub fn extract(
        &self,
        lines: &[Line],
        stats: &DocumentStats,
        excluded: &BTreeSet<usize>,
        generator: &CandidateGenerator,
    ) -> Option<String> {
        self.select(lines, stats, excluded, generator).map(|t| t.text)
    }

    /// Like [`extract`](Self::extract), also reporting the lines used.
    pub fn select(
        &self,
        lines: &[Line],
        stats: &DocumentStats,
        excluded: &BTreeSet<usize>,
        generator: &CandidateGenerator,
    ) -> Option<TitleSelection> {
        let eligible: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(i, l)| {
                l.page == 1
                    && !excluded.contains(i)
                    && self.in_body_band(l)
                    && !generator.is_noise(l.trimmed())
            })
            .map(|(i, _)| i)
            .collect();

        if let Some(title) = self.typographic_title(lines, stats, &eligible) {
            log::debug!("Title from largest page-one text: {:?}", title.text);
            return Some(title);
        }

        eligible
            .iter()
            .copied()
            .find(|&i| {
                let t = lines[i].trimmed();
                !t.is_empty() && !is_text_fragment(t)
            })
            .map(|i| TitleSelection {
                text: lines[i].trimmed().to_string(),
                lines: vec![i],
            })
    }

    fn in_body_band(&self, line: &Line) -> bool {
        let y = line.relative_y();
        y >= self.config.header_band && y <= 1.0 - self.config.footer_band
    }

    /// Largest page-one text, merged across adjacent lines of the same size.
    fn typographic_title(
        &self,
        lines: &[Line],
        stats: &DocumentStats,
        eligible: &[usize],
    ) -> Option<TitleSelection> {
        let largest = eligible
            .iter()
            .map(|&i| lines[i].font_size)
            .fold(f32::NEG_INFINITY, f32::max);
        if !largest.is_finite() || largest < stats.modal_font_size * self.config.min_size_ratio {
            return None;
        }

        let same_size = |l: &Line| (l.font_size - largest).abs() <= self.config.size_tolerance;
        let start = eligible.iter().position(|&i| same_size(&lines[i]))?;

        let mut used = vec![eligible[start]];
        let mut prev = eligible[start];
        for &i in &eligible[start + 1..] {
            let line = &lines[i];
            let gap = line.y_position - lines[prev].y_position;
            if i != prev + 1 || !same_size(line) || gap > self.config.merge_gap_ratio * largest {
                break;
            }
            used.push(i);
            prev = i;
        }

        let text = used
            .iter()
            .map(|&i| lines[i].trimmed())
            .collect::<Vec<_>>()
            .join(" ");
        Some(TitleSelection { text, lines: used })
    }
}

/// Title derived from the source file name.
pub fn fallback_title(source: Option<&Path>) -> String {
    source
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNTITLED.to_string())
}
