//! Heading detection.
//!
//! Turns normalized lines into a titled, leveled outline. The stages run in
//! a fixed order: candidate generation, confidence scoring against an
//! adaptive threshold, fragment filtering, title selection, level
//! assignment and assembly. A form check ahead of scoring can short-circuit
//! the whole run. [`OutlinePipeline`] wires them together.

mod assemble;
mod candidate;
mod config;
mod form;
mod fragment;
mod level;
mod pipeline;
mod score;
mod title;

pub use assemble::{dedup_adjacent, OutlineAssembler};
pub use candidate::{semantic_keyword, CandidateGenerator, PatternMatch, SEMANTIC_HEADINGS};
pub use config::{
    FormConfig, FragmentConfig, OutlineConfig, PatternStrengths, ScoringWeights, SignalConfig,
    ThresholdConfig, TitleConfig,
};
pub use form::{FormAnalysis, FormDetector};
pub use fragment::{is_text_fragment, FragmentFilter, FragmentReason};
pub use level::{LevelAssigner, StyleClass};
pub use pipeline::{
    Diagnostics, DocumentStatus, Inspection, LineReport, OutlinePipeline, OutlineReport,
};
pub use score::{adaptive_threshold, ConfidenceScorer, Signals};
pub use title::{fallback_title, TitleExtractor, TitleSelection, UNTITLED};
