//! Raw text spans as yielded by a page text provider.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in top-down page coordinates.
///
/// `y0` is the distance of the top edge from the top of the page, `y1` the
/// distance of the bottom edge; both grow downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }
}

/// A run of text drawn with a single font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Position on the page
    pub bbox: BBox,
    /// Page index (0-based)
    pub page_index: usize,
}

impl Span {
    /// Create a span, deriving boldness from the font name.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
        bbox: BBox,
        page_index: usize,
    ) -> Self {
        let font_name = font_name.into();
        Self {
            text: text.into(),
            font_size,
            is_bold: font_name_is_bold(&font_name),
            font_name,
            bbox,
            page_index,
        }
    }
}

/// All spans of one page, in content-stream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpans {
    /// Page index (0-based)
    pub index: usize,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Spans drawn on the page
    pub spans: Vec<Span>,
}

impl PageSpans {
    /// Create an empty page.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            spans: Vec::new(),
        }
    }

    /// Create an empty US Letter page.
    pub fn letter(index: usize) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Add a span to the page.
    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Check if the page carries no text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }
}

/// Guess boldness from a PostScript font name.
pub fn font_name_is_bold(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("bold")
        || lower.contains("black")
        || lower.contains("heavy")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bold_detection() {
        let span = Span::new("Test", 12.0, "Helvetica-Bold", BBox::default(), 0);
        assert!(span.is_bold);

        let span = Span::new("Test", 12.0, "Helvetica-Oblique", BBox::default(), 0);
        assert!(!span.is_bold);

        assert!(font_name_is_bold("ABCDEF+Arial-BoldMT"));
        assert!(font_name_is_bold("Roboto-Black"));
    }

    #[test]
    fn test_bbox_dimensions() {
        let bbox = BBox::new(10.0, 20.0, 110.0, 32.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 12.0);
        assert_eq!(bbox.center_y(), 26.0);
    }

    #[test]
    fn test_page_is_empty() {
        let mut page = PageSpans::letter(0);
        assert!(page.is_empty());
        page.push(Span::new("  ", 12.0, "Helvetica", BBox::default(), 0));
        assert!(page.is_empty());
        page.push(Span::new("Hi", 12.0, "Helvetica", BBox::default(), 0));
        assert!(!page.is_empty());
    }
}
