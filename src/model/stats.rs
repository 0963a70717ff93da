//! Document-level font statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Line;

/// Body size assumed when a document has no text at all.
pub const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Font size statistics for one document.
///
/// Computed once after normalization and passed by reference into every
/// scoring function; nothing here is shared between documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Most common line font size (body text)
    pub modal_font_size: f32,
    /// Line count per font size, keyed in tenths of a point
    pub font_size_histogram: BTreeMap<u32, usize>,
    /// Number of pages the provider yielded
    pub page_count: u32,
}

impl Default for DocumentStats {
    fn default() -> Self {
        Self {
            modal_font_size: DEFAULT_BODY_SIZE,
            font_size_histogram: BTreeMap::new(),
            page_count: 0,
        }
    }
}

/// Histogram key for a font size (0.1pt precision).
pub fn size_key(size: f32) -> u32 {
    (size.max(0.0) * 10.0).round() as u32
}

fn key_size(key: u32) -> f32 {
    key as f32 / 10.0
}

impl DocumentStats {
    /// Build statistics from normalized lines.
    pub fn from_lines(lines: &[Line], page_count: u32) -> Self {
        let mut stats = Self {
            page_count,
            ..Self::default()
        };
        for line in lines {
            stats.add_size(line.font_size);
        }
        stats.analyze();
        stats
    }

    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        if size.is_finite() && size > 0.0 {
            *self.font_size_histogram.entry(size_key(size)).or_insert(0) += 1;
        }
    }

    /// Recompute the modal font size. Ties resolve to the smaller size.
    pub fn analyze(&mut self) {
        let mut best: Option<(u32, usize)> = None;
        for (&key, &count) in &self.font_size_histogram {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((key, count));
            }
        }
        self.modal_font_size = best.map_or(DEFAULT_BODY_SIZE, |(key, _)| key_size(key));
    }

    /// Number of lines observed.
    pub fn line_count(&self) -> usize {
        self.font_size_histogram.values().sum()
    }

    /// Mean line font size.
    pub fn mean_font_size(&self) -> f32 {
        let n = self.line_count();
        if n == 0 {
            return self.modal_font_size;
        }
        let total: f32 = self
            .font_size_histogram
            .iter()
            .map(|(&k, &c)| key_size(k) * c as f32)
            .sum();
        total / n as f32
    }

    /// Population standard deviation of line font sizes.
    pub fn font_size_std_dev(&self) -> f32 {
        let n = self.line_count();
        if n == 0 {
            return 0.0;
        }
        let mean = self.mean_font_size();
        let var: f32 = self
            .font_size_histogram
            .iter()
            .map(|(&k, &c)| (key_size(k) - mean).powi(2) * c as f32)
            .sum::<f32>()
            / n as f32;
        var.sqrt()
    }

    /// Coefficient of variation of line font sizes (std / mean).
    pub fn size_variation(&self) -> f32 {
        let mean = self.mean_font_size();
        if mean > 0.0 {
            self.font_size_std_dev() / mean
        } else {
            0.0
        }
    }

    /// Ratio of a font size to the body size.
    pub fn font_ratio(&self, size: f32) -> f32 {
        if self.modal_font_size > 0.0 {
            size / self.modal_font_size
        } else {
            1.0
        }
    }

    /// Distinct sizes larger than body text, largest first.
    pub fn larger_sizes(&self) -> Vec<f32> {
        let body = size_key(self.modal_font_size);
        self.font_size_histogram
            .keys()
            .rev()
            .filter(|&&k| k > body)
            .map(|&k| key_size(k))
            .collect()
    }
}
