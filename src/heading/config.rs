//! Tuning parameters for heading detection.
//!
//! Every weight and threshold used by the pipeline lives here. All structs
//! deserialize with `#[serde(default)]`, so a JSON file only needs the keys
//! it overrides:
//!
//! ```json
//! { "weights": { "pattern": 0.5 }, "threshold": { "base": 0.35 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::PatternType;

/// Complete configuration for one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Minimum size ratio to body text for a font-only candidate
    pub font_only_min_ratio: f32,
    /// Maximum words in a font-only candidate
    pub font_only_max_words: usize,
    pub weights: ScoringWeights,
    pub patterns: PatternStrengths,
    pub signals: SignalConfig,
    pub threshold: ThresholdConfig,
    pub fragment: FragmentConfig,
    pub form: FormConfig,
    pub title: TitleConfig,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            font_only_min_ratio: 1.15,
            font_only_max_words: 12,
            weights: ScoringWeights::default(),
            patterns: PatternStrengths::default(),
            signals: SignalConfig::default(),
            threshold: ThresholdConfig::default(),
            fragment: FragmentConfig::default(),
            form: FormConfig::default(),
            title: TitleConfig::default(),
        }
    }
}

impl OutlineConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (partial) JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Render(e.to_string()))
    }

    /// Set the scoring weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the threshold parameters.
    pub fn with_threshold(mut self, threshold: ThresholdConfig) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the font-only minimum ratio.
    pub fn with_font_only_ratio(mut self, ratio: f32) -> Self {
        self.font_only_min_ratio = ratio;
        self
    }

    /// Check that every weight is in [0, 1] and the threshold bounds are ordered.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        let p = &self.patterns;
        let t = &self.threshold;
        let unit = [
            ("weights.pattern", w.pattern),
            ("weights.font_ratio", w.font_ratio),
            ("weights.style", w.style),
            ("weights.position", w.position),
            ("weights.isolation", w.isolation),
            ("weights.length_penalty", w.length_penalty),
            ("patterns.numbered", p.numbered),
            ("patterns.semantic", p.semantic),
            ("patterns.question", p.question),
            ("patterns.font_only", p.font_only),
            ("threshold.base", t.base),
            ("threshold.floor", t.floor),
            ("threshold.ceiling", t.ceiling),
            ("threshold.keep_top_fraction", t.keep_top_fraction),
            ("threshold.early_rescue_margin", t.early_rescue_margin),
            ("form.min_form_fraction", self.form.min_form_fraction),
            ("form.keyword_form_fraction", self.form.keyword_form_fraction),
            ("title.title_overlap", self.title.title_overlap),
        ];
        for (name, value) in unit {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if t.floor > t.ceiling {
            return Err(Error::InvalidConfig(format!(
                "threshold.floor ({}) is above threshold.ceiling ({})",
                t.floor, t.ceiling
            )));
        }
        if self.font_only_min_ratio < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "font_only_min_ratio must be at least 1.0, got {}",
                self.font_only_min_ratio
            )));
        }
        if self.signals.font_ratio_cap <= 1.0 {
            return Err(Error::InvalidConfig(format!(
                "signals.font_ratio_cap must be above 1.0, got {}",
                self.signals.font_ratio_cap
            )));
        }
        Ok(())
    }
}

/// Weight of each signal in the fused confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub pattern: f32,
    pub font_ratio: f32,
    pub style: f32,
    pub position: f32,
    pub isolation: f32,
    /// Subtracted, scaled by how far a line runs past `long_line_words`
    pub length_penalty: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            pattern: 0.40,
            font_ratio: 0.25,
            style: 0.10,
            position: 0.10,
            isolation: 0.15,
            length_penalty: 0.30,
        }
    }
}

/// Base strength of each pattern family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternStrengths {
    pub numbered: f32,
    pub semantic: f32,
    pub question: f32,
    pub font_only: f32,
}

impl Default for PatternStrengths {
    fn default() -> Self {
        Self {
            numbered: 1.0,
            semantic: 0.85,
            question: 0.70,
            font_only: 0.40,
        }
    }
}

impl PatternStrengths {
    /// Strength for a pattern family.
    pub fn for_pattern(&self, pattern: PatternType) -> f32 {
        match pattern {
            PatternType::Numbered => self.numbered,
            PatternType::Semantic => self.semantic,
            PatternType::Question => self.question,
            PatternType::FontOnly => self.font_only,
        }
    }
}

/// Shape of the individual scoring signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Font ratio at which the font signal saturates
    pub font_ratio_cap: f32,
    /// Word count above which the length penalty starts
    pub long_line_words: usize,
    /// Top band of the page that earns the position bonus
    pub top_of_page_fraction: f32,
    /// Vertical gap (in font sizes of the lower line) that counts as a blank line
    pub blank_gap_ratio: f32,
    /// Next line at or below this fraction of the size counts as a size drop
    pub size_drop_ratio: f32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            font_ratio_cap: 1.8,
            long_line_words: 15,
            top_of_page_fraction: 0.12,
            blank_gap_ratio: 0.8,
            size_drop_ratio: 0.9,
        }
    }
}

/// Parameters of the adaptive acceptance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub base: f32,
    pub floor: f32,
    pub ceiling: f32,
    /// Candidate count required before the density term applies
    pub dense_min_candidates: usize,
    pub density_knee: f32,
    pub density_slope: f32,
    pub density_cap: f32,
    pub variance_knee: f32,
    pub variance_slope: f32,
    pub variance_cap: f32,
    /// `(more than N candidates, increment)`; the largest matching tier applies
    pub count_tiers: Vec<(usize, f32)>,
    /// Fraction of candidates that must stay reachable (top quantile)
    pub keep_top_fraction: f32,
    /// Semantic headings on these first pages get a rescue margin
    pub early_rescue_pages: u32,
    pub early_rescue_margin: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base: 0.30,
            floor: 0.25,
            ceiling: 0.80,
            dense_min_candidates: 8,
            density_knee: 0.25,
            density_slope: 0.4,
            density_cap: 0.15,
            variance_knee: 0.25,
            variance_slope: 0.5,
            variance_cap: 0.10,
            count_tiers: vec![(10, 0.05), (20, 0.10), (30, 0.15), (50, 0.20), (80, 0.25)],
            keep_top_fraction: 0.25,
            early_rescue_pages: 3,
            early_rescue_margin: 0.10,
        }
    }
}

/// Fragment filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    /// Lines looked at on each side of a candidate
    pub window: usize,
    /// Aligned short neighbours that mark a list/table region
    pub list_min_neighbors: usize,
    pub list_max_words: usize,
    pub indent_tolerance: f32,
    pub size_tolerance: f32,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            window: 2,
            list_min_neighbors: 2,
            list_max_words: 4,
            indent_tolerance: 2.0,
            size_tolerance: 0.5,
        }
    }
}

/// Form detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Maximum words of a `Label:` line
    pub label_max_words: usize,
    pub min_form_fraction: f32,
    /// Numbered headings per line above which a document is not a form
    pub max_numbered_density: f32,
    /// Form-like fraction required when page one carries a form keyword
    pub keyword_form_fraction: f32,
    pub keywords: Vec<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            label_max_words: 6,
            min_form_fraction: 0.5,
            max_numbered_density: 0.02,
            keyword_form_fraction: 0.25,
            keywords: [
                "application form",
                "form no",
                "fill in",
                "check box",
                "employee id",
                "signature of",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Title extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// Top band of page one ignored as running header
    pub header_band: f32,
    /// Bottom band of page one ignored as running footer
    pub footer_band: f32,
    /// Minimum size ratio to body text for a typographic title
    pub min_size_ratio: f32,
    /// Maximum gap between title lines, in font sizes
    pub merge_gap_ratio: f32,
    pub size_tolerance: f32,
    /// Word overlap at which a heading counts as a title repeat
    pub title_overlap: f32,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            header_band: 0.06,
            footer_band: 0.08,
            min_size_ratio: 1.1,
            merge_gap_ratio: 1.6,
            size_tolerance: 0.5,
            title_overlap: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OutlineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weights.pattern, 0.40);
        assert_eq!(config.patterns.for_pattern(PatternType::Question), 0.70);
        assert_eq!(config.threshold.count_tiers.len(), 5);
    }

    #[test]
    fn test_partial_json_override() {
        let config =
            OutlineConfig::from_json_str(r#"{"weights": {"pattern": 0.5}, "font_only_min_ratio": 1.3}"#)
                .unwrap();
        assert_eq!(config.weights.pattern, 0.5);
        assert_eq!(config.weights.font_ratio, 0.25);
        assert_eq!(config.font_only_min_ratio, 1.3);
        assert_eq!(config.threshold, ThresholdConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range_weight() {
        let err = OutlineConfig::from_json_str(r#"{"weights": {"style": 1.5}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("weights.style"));
    }

    #[test]
    fn test_rejects_floor_above_ceiling() {
        let json = r#"{"threshold": {"floor": 0.9, "ceiling": 0.5}}"#;
        assert!(OutlineConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            OutlineConfig::from_json_str("{ not json"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.json");
        let config = OutlineConfig::default().with_font_only_ratio(1.25);
        std::fs::write(&path, config.to_json().unwrap()).unwrap();

        let loaded = OutlineConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(OutlineConfig::from_file(dir.path().join("missing.json")).is_err());
    }
}
