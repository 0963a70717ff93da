//! Page text providers.

use crate::error::Result;
use crate::model::PageSpans;

/// Lazy iterator over the pages of one document.
pub type PageIter<'a> = Box<dyn Iterator<Item = Result<PageSpans>> + 'a>;

/// Source of per-page text spans.
///
/// Pages are yielded lazily and in order. A provider can be read again by
/// calling [`get_pages`](PageTextProvider::get_pages) a second time.
pub trait PageTextProvider {
    /// Start reading pages.
    fn get_pages(&self) -> Result<PageIter<'_>>;

    /// Total number of pages in the source, when known up front.
    fn page_count(&self) -> Option<u32> {
        None
    }
}

/// Provider over spans already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    pages: Vec<PageSpans>,
}

impl MemoryProvider {
    /// Create a provider from pages.
    pub fn new(pages: Vec<PageSpans>) -> Self {
        Self { pages }
    }

    /// Add a page.
    pub fn push(&mut self, page: PageSpans) {
        self.pages.push(page);
    }

    /// Borrow the pages.
    pub fn pages(&self) -> &[PageSpans] {
        &self.pages
    }
}

impl PageTextProvider for MemoryProvider {
    fn get_pages(&self) -> Result<PageIter<'_>> {
        Ok(Box::new(self.pages.iter().cloned().map(Ok)))
    }

    fn page_count(&self) -> Option<u32> {
        Some(self.pages.len() as u32)
    }
}

impl From<Vec<PageSpans>> for MemoryProvider {
    fn from(pages: Vec<PageSpans>) -> Self {
        Self::new(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Span};

    #[test]
    fn test_memory_provider_is_restartable() {
        let mut page = PageSpans::letter(0);
        page.push(Span::new("Hello", 12.0, "Helvetica", BBox::default(), 0));
        let provider = MemoryProvider::from(vec![page, PageSpans::letter(1)]);

        let first: Vec<_> = provider.get_pages().unwrap().collect();
        let second: Vec<_> = provider.get_pages().unwrap().collect();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(provider.page_count(), Some(2));
        assert_eq!(first[0].as_ref().unwrap().spans[0].text, "Hello");
    }
}
