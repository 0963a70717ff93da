//! Normalized visual lines.

use serde::{Deserialize, Serialize};

/// Default page height used when a line is built without page geometry.
pub const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// One visual line of text with the layout features the heading pipeline
/// looks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Line text, whitespace-normalized
    pub text: String,
    /// Dominant font size in points
    pub font_size: f32,
    /// Whether most of the line is set in a bold font
    pub is_bold: bool,
    /// Page number (1-indexed)
    pub page: u32,
    /// Distance of the line's top edge from the top of the page
    pub y_position: f32,
    /// Left edge of the line
    pub x_indent: f32,
    /// Height of the page the line sits on
    pub page_height: f32,
    /// Position in the document-wide line sequence
    pub order: usize,
}

impl Line {
    /// Create a line at the top-left of a Letter page.
    pub fn new(text: impl Into<String>, font_size: f32, page: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold: false,
            page,
            y_position: 0.0,
            x_indent: 0.0,
            page_height: DEFAULT_PAGE_HEIGHT,
            order: 0,
        }
    }

    /// Mark the line as bold.
    pub fn bold(mut self) -> Self {
        self.is_bold = true;
        self
    }

    /// Set the line position.
    pub fn at(mut self, x_indent: f32, y_position: f32) -> Self {
        self.x_indent = x_indent;
        self.y_position = y_position;
        self
    }

    /// Set the page height.
    pub fn with_page_height(mut self, height: f32) -> Self {
        self.page_height = height;
        self
    }

    /// Trimmed text.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether the line ends a sentence or introduces something (`. ! ? :`).
    pub fn has_terminal_punctuation(&self) -> bool {
        ends_with_terminal(self.trimmed())
    }

    /// Whether the first letter of the line is lower-case.
    pub fn starts_lowercase(&self) -> bool {
        self.trimmed()
            .chars()
            .find(|c| c.is_alphabetic())
            .map(|c| c.is_lowercase())
            .unwrap_or(false)
    }

    /// Whether every letter of the line is upper-case (at least 3 letters).
    pub fn is_all_caps(&self) -> bool {
        let letters: Vec<char> = self.text.chars().filter(|c| c.is_alphabetic()).collect();
        letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase())
    }

    /// Approximate bottom edge of the line.
    pub fn bottom(&self) -> f32 {
        self.y_position + self.font_size
    }

    /// Whitespace between the bottom of `above` and the top of this line,
    /// when both sit on the same page.
    pub fn gap_after(&self, above: &Line) -> Option<f32> {
        (above.page == self.page).then(|| self.y_position - above.bottom())
    }

    /// Relative vertical position on the page (0 = top edge, 1 = bottom edge).
    pub fn relative_y(&self) -> f32 {
        if self.page_height > 0.0 {
            self.y_position / self.page_height
        } else {
            0.0
        }
    }
}

/// Whether the text ends with `. ! ? :` (or their full-width forms).
pub fn ends_with_terminal(text: &str) -> bool {
    matches!(
        text.trim_end().chars().last(),
        Some('.' | '!' | '?' | ':' | '。' | '！' | '？' | '：')
    )
}
