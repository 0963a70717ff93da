//! Reading PDFs into normalized lines.

mod lopdf_provider;
mod normalize;
mod options;
mod provider;

pub use lopdf_provider::LopdfProvider;
pub use normalize::{clean_text, FeatureNormalizer, NormalizedDocument};
pub use options::{ErrorMode, PageSelection, ParseOptions};
pub use provider::{MemoryProvider, PageIter, PageTextProvider};
