//! Data model for outline extraction.
//!
//! Spans come out of a page text provider, get flattened into [`Line`]s with
//! [`DocumentStats`], turn into [`HeadingCandidate`]s and finally into an
//! [`Outline`]. Every value lives for a single document run.

mod candidate;
mod line;
mod outline;
mod span;
mod stats;

pub use candidate::{HeadingCandidate, PatternType};
pub use line::{ends_with_terminal, Line, DEFAULT_PAGE_HEIGHT};
pub use outline::{HeadingLevel, LeveledHeading, Outline, OutlineEntry};
pub use span::{font_name_is_bold, BBox, PageSpans, Span};
pub use stats::{size_key, DocumentStats, DEFAULT_BODY_SIZE};
