//! End-to-end outline extraction for one document.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{DocumentStats, HeadingCandidate, Line, Outline, PatternType};
use crate::parser::{FeatureNormalizer, NormalizedDocument, PageTextProvider};

use super::assemble::OutlineAssembler;
use super::candidate::CandidateGenerator;
use super::config::OutlineConfig;
use super::form::{FormAnalysis, FormDetector};
use super::fragment::FragmentFilter;
use super::level::LevelAssigner;
use super::score::{adaptive_threshold, ConfidenceScorer};
use super::title::{fallback_title, TitleExtractor};

/// How a document was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Headings were detected normally
    Ok,
    /// Classified as a fillable form; outline left empty
    Form,
    /// No extractable text
    Empty,
    /// Source could not be decoded
    Unreadable,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Ok => "ok",
            DocumentStatus::Form => "form",
            DocumentStatus::Empty => "empty",
            DocumentStatus::Unreadable => "unreadable",
        };
        write!(f, "{}", s)
    }
}

/// Per-document counters collected while running the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub line_count: usize,
    pub page_count: u32,
    pub modal_font_size: f32,
    /// Candidates produced by the pattern families
    pub candidates: usize,
    /// Candidates surviving the threshold and the fragment filter
    pub accepted: usize,
    /// Acceptance threshold, when candidates were scored
    pub threshold: Option<f32>,
    pub form_fraction: f32,
}

/// Outline plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineReport {
    pub outline: Outline,
    pub status: DocumentStatus,
    pub diagnostics: Diagnostics,
}

impl OutlineReport {
    /// Report for a source that could not be read.
    pub fn unreadable(source: Option<&Path>) -> Self {
        Self {
            outline: Outline::new(fallback_title(source)),
            status: DocumentStatus::Unreadable,
            diagnostics: Diagnostics::default(),
        }
    }
}

/// One line as seen by the pipeline, for tuning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineReport {
    pub index: usize,
    pub line: Line,
    pub pattern: Option<PatternType>,
    pub confidence: Option<f32>,
    pub accepted: bool,
}

/// Line-by-line view of a document's heading decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub lines: Vec<LineReport>,
    pub stats: DocumentStats,
    pub threshold: f32,
    pub form: FormAnalysis,
}

/// Runs every heading stage over one document.
pub struct OutlinePipeline {
    config: OutlineConfig,
    normalizer: FeatureNormalizer,
    generator: CandidateGenerator,
}

impl Default for OutlinePipeline {
    fn default() -> Self {
        Self::new(OutlineConfig::default())
    }
}

impl OutlinePipeline {
    pub fn new(config: OutlineConfig) -> Self {
        let generator = CandidateGenerator::new(&config);
        Self {
            config,
            normalizer: FeatureNormalizer::new(),
            generator,
        }
    }

    /// Replace the span-to-line normalizer.
    pub fn with_normalizer(mut self, normalizer: FeatureNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Extract the outline of everything the provider yields.
    ///
    /// `source` only feeds the fallback title.
    pub fn run<P: PageTextProvider + ?Sized>(
        &self,
        provider: &P,
        source: Option<&Path>,
    ) -> Result<OutlineReport> {
        let doc = self.normalizer.normalize(provider)?;
        self.run_normalized(&doc, source)
    }

    /// Extract the outline of already normalized lines.
    pub fn run_normalized(
        &self,
        doc: &NormalizedDocument,
        source: Option<&Path>,
    ) -> Result<OutlineReport> {
        let lines = &doc.lines;
        let stats = &doc.stats;
        let mut diagnostics = Diagnostics {
            line_count: lines.len(),
            page_count: stats.page_count,
            modal_font_size: stats.modal_font_size,
            ..Diagnostics::default()
        };

        if doc.is_empty() {
            let title = fallback_title(source);
            log::info!("{}: no extractable text", title);
            return Ok(OutlineReport {
                outline: Outline::new(title),
                status: DocumentStatus::Empty,
                diagnostics,
            });
        }

        let titles = TitleExtractor::new(&self.config.title);

        let form = FormDetector::new(&self.config.form).analyze(lines, stats, &self.generator);
        diagnostics.form_fraction = form.form_fraction();
        if form.is_form {
            let title = titles
                .extract(lines, stats, &BTreeSet::new(), &self.generator)
                .unwrap_or_else(|| fallback_title(source));
            log::info!("{}: form document, outline suppressed", title);
            return Ok(OutlineReport {
                outline: Outline::new(title),
                status: DocumentStatus::Form,
                diagnostics,
            });
        }

        let (candidates, threshold) = self.score(lines, stats)?;
        diagnostics.candidates = candidates.len();
        diagnostics.threshold = Some(threshold);
        let accepted = self.accept(candidates, threshold, lines, stats);
        diagnostics.accepted = accepted.len();

        let textual: BTreeSet<usize> = accepted
            .iter()
            .filter(|c| c.pattern_type.is_textual())
            .map(|c| c.line_index)
            .collect();
        let selection = titles.select(lines, stats, &textual, &self.generator);
        let title_lines: BTreeSet<usize> = selection
            .as_ref()
            .map(|s| s.lines.iter().copied().collect())
            .unwrap_or_default();
        let title = selection
            .map(|s| s.text)
            .unwrap_or_else(|| fallback_title(source));

        let headings: Vec<HeadingCandidate> = accepted
            .into_iter()
            .filter(|c| !title_lines.contains(&c.line_index))
            .collect();
        let leveled = LevelAssigner::new().assign(headings);
        let outline = OutlineAssembler::new()
            .with_title_overlap(self.config.title.title_overlap)
            .assemble(title, leveled);

        log::info!(
            "{}: {} headings from {} lines on {} pages (threshold {:.2})",
            outline.title,
            outline.len(),
            lines.len(),
            stats.page_count,
            threshold
        );
        Ok(OutlineReport {
            outline,
            status: DocumentStatus::Ok,
            diagnostics,
        })
    }

    /// Show the pattern, confidence and verdict of every line.
    pub fn inspect<P: PageTextProvider + ?Sized>(&self, provider: &P) -> Result<Inspection> {
        let doc = self.normalizer.normalize(provider)?;
        let lines = &doc.lines;
        let stats = &doc.stats;

        let form = FormDetector::new(&self.config.form).analyze(lines, stats, &self.generator);
        let (candidates, threshold) = self.score(lines, stats)?;
        let accepted: BTreeSet<usize> = self
            .accept(candidates.clone(), threshold, lines, stats)
            .iter()
            .map(|c| c.line_index)
            .collect();

        let mut reports: Vec<LineReport> = lines
            .iter()
            .enumerate()
            .map(|(index, line)| LineReport {
                index,
                line: line.clone(),
                pattern: None,
                confidence: None,
                accepted: false,
            })
            .collect();
        for c in &candidates {
            if let Some(r) = reports.get_mut(c.line_index) {
                r.pattern = Some(c.pattern_type);
                r.confidence = Some(c.confidence);
                r.accepted = !form.is_form && accepted.contains(&c.line_index);
            }
        }

        Ok(Inspection {
            lines: reports,
            stats: doc.stats,
            threshold,
            form,
        })
    }

    /// Generate and score candidates, returning them with the threshold.
    fn score(&self, lines: &[Line], stats: &DocumentStats) -> Result<(Vec<HeadingCandidate>, f32)> {
        let mut candidates = self.generator.generate(lines, stats);
        ConfidenceScorer::new(&self.config).score_all(&mut candidates, lines, stats)?;
        let confidences: Vec<f32> = candidates.iter().map(|c| c.confidence).collect();
        let threshold = adaptive_threshold(stats, &confidences, &self.config.threshold);
        Ok((candidates, threshold))
    }

    fn accept(
        &self,
        candidates: Vec<HeadingCandidate>,
        threshold: f32,
        lines: &[Line],
        stats: &DocumentStats,
    ) -> Vec<HeadingCandidate> {
        // Explicit Q&A pairs are accepted whatever their typography
        let (marked, rest): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|c| {
            c.pattern_type == PatternType::Question
                && self.generator.is_marked_question(lines, c.line_index)
        });
        if !marked.is_empty() {
            log::debug!("Accepting {} marked questions", marked.len());
        }
        let mut passed = ConfidenceScorer::new(&self.config).apply_threshold(rest, threshold);
        passed.extend(marked);
        passed.sort_by_key(|c| c.line_index);
        FragmentFilter::new(&self.config.fragment).filter(passed, lines, stats)
    }
}
