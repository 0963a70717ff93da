//! Rendering outlines to their output formats.

mod json;

pub use json::{to_json, write_json, JsonFormat};
