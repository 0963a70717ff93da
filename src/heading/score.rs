//! Confidence scoring and the adaptive acceptance threshold.

use crate::error::Result;
use crate::model::{DocumentStats, HeadingCandidate, Line, PatternType};

use super::config::{OutlineConfig, ThresholdConfig};

/// Individual signal values for one candidate, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signals {
    pub pattern: f32,
    pub font_ratio: f32,
    pub style: f32,
    pub position: f32,
    pub isolation: f32,
    pub length_penalty: f32,
}

/// Fuses layout and pattern signals into a confidence.
pub struct ConfidenceScorer<'a> {
    config: &'a OutlineConfig,
}

impl<'a> ConfidenceScorer<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Compute every signal for a candidate.
    pub fn signals(&self, candidate: &HeadingCandidate, lines: &[Line], stats: &DocumentStats) -> Signals {
        let sig = &self.config.signals;
        let Some(line) = lines.get(candidate.line_index) else {
            return Signals {
                pattern: self.config.patterns.for_pattern(candidate.pattern_type),
                ..Signals::default()
            };
        };
        let prev = candidate
            .line_index
            .checked_sub(1)
            .and_then(|i| lines.get(i))
            .filter(|p| p.page == line.page);
        let next = lines
            .get(candidate.line_index + 1)
            .filter(|n| n.page == line.page);

        let ratio = stats.font_ratio(candidate.raw_font_size);
        let font_ratio = ((ratio - 1.0) / (sig.font_ratio_cap - 1.0)).clamp(0.0, 1.0);

        let style = if line.is_bold {
            1.0
        } else if line.is_all_caps() {
            0.6
        } else {
            0.0
        };

        let gap_before = prev.and_then(|p| line.gap_after(p));
        let position = match prev {
            None => 1.0,
            Some(_) if line.relative_y() <= sig.top_of_page_fraction => 1.0,
            Some(_) if gap_before.map_or(false, |g| g > sig.blank_gap_ratio * line.font_size) => 1.0,
            Some(_) => 0.0,
        };

        let isolation = match next {
            None => 0.5,
            Some(n) => {
                let gap = n.gap_after(line).unwrap_or(0.0);
                if gap > sig.blank_gap_ratio * line.font_size
                    || n.font_size <= line.font_size * sig.size_drop_ratio
                {
                    1.0
                } else {
                    0.0
                }
            }
        };

        let words = line.word_count();
        let long = sig.long_line_words.max(1);
        let length_penalty = if words > long {
            ((words - long) as f32 / long as f32).min(1.0)
        } else {
            0.0
        };

        Signals {
            pattern: self.config.patterns.for_pattern(candidate.pattern_type),
            font_ratio,
            style,
            position,
            isolation,
            length_penalty,
        }
    }

    /// Weighted confidence for a candidate, clamped to [0, 1].
    pub fn score(&self, candidate: &HeadingCandidate, lines: &[Line], stats: &DocumentStats) -> f32 {
        let s = self.signals(candidate, lines, stats);
        let w = &self.config.weights;
        let total = w.pattern * s.pattern
            + w.font_ratio * s.font_ratio
            + w.style * s.style
            + w.position * s.position
            + w.isolation * s.isolation
            - w.length_penalty * s.length_penalty;
        total.clamp(0.0, 1.0)
    }

    /// Score candidates in place and check their invariants.
    pub fn score_all(
        &self,
        candidates: &mut [HeadingCandidate],
        lines: &[Line],
        stats: &DocumentStats,
    ) -> Result<()> {
        for candidate in candidates.iter_mut() {
            candidate.confidence = self.score(candidate, lines, stats);
            candidate.validate()?;
        }
        Ok(())
    }

    /// Keep candidates at or above `threshold`.
    ///
    /// Semantic headings on the first pages get a small rescue margin, since
    /// front matter sections are often set in body size.
    pub fn apply_threshold(
        &self,
        candidates: Vec<HeadingCandidate>,
        threshold: f32,
    ) -> Vec<HeadingCandidate> {
        let t = &self.config.threshold;
        candidates
            .into_iter()
            .filter(|c| {
                c.confidence >= threshold
                    || (c.pattern_type == PatternType::Semantic
                        && c.page <= t.early_rescue_pages
                        && c.confidence >= threshold - t.early_rescue_margin)
            })
            .collect()
    }
}

/// Per-document acceptance threshold.
///
/// Grows with the number of candidates, their density among all lines and
/// the font size variation of the document, but never rises above the
/// confidence of the top `keep_top_fraction` of candidates. The result is
/// clamped to `[floor, ceiling]`.
pub fn adaptive_threshold(stats: &DocumentStats, confidences: &[f32], config: &ThresholdConfig) -> f32 {
    let n = confidences.len();
    if n == 0 {
        return config.base.clamp(config.floor, config.ceiling);
    }

    let tier = config
        .count_tiers
        .iter()
        .filter(|(count, _)| n > *count)
        .map(|(_, inc)| *inc)
        .fold(0.0_f32, f32::max);

    let lines = stats.line_count();
    let density = if n >= config.dense_min_candidates && lines > 0 {
        ((n as f32 / lines as f32 - config.density_knee) * config.density_slope)
            .clamp(0.0, config.density_cap)
    } else {
        0.0
    };

    let variance = ((stats.size_variation() - config.variance_knee) * config.variance_slope)
        .clamp(0.0, config.variance_cap);

    let raw = config.base + tier + density + variance;

    let mut sorted = confidences.to_vec();
    sorted.sort_by(f32::total_cmp);
    let keep = ((n as f32 * config.keep_top_fraction).ceil() as usize).clamp(1, n);
    let cap = sorted[n - keep];

    let threshold = raw.min(cap.max(config.floor)).clamp(config.floor, config.ceiling);
    log::debug!(
        "Threshold {:.3} (raw {:.3}, cap {:.3}) for {} candidates over {} lines",
        threshold,
        raw,
        cap,
        n,
        lines
    );
    threshold
}
