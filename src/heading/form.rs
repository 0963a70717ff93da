//! Fillable form detection.

use std::collections::BTreeSet;

use regex::Regex;

use crate::model::{DocumentStats, Line};

use super::candidate::CandidateGenerator;
use super::config::FormConfig;

/// Document-level form measurements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormAnalysis {
    pub total_lines: usize,
    pub form_like_lines: usize,
    /// Distinct pages carrying at least one form-like line
    pub form_pages: usize,
    pub numbered_headings: usize,
    /// Form keyword found on page one
    pub keyword: Option<String>,
    pub is_form: bool,
}

impl FormAnalysis {
    /// Fraction of lines that look like labels or blank fields.
    pub fn form_fraction(&self) -> f32 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.form_like_lines as f32 / self.total_lines as f32
        }
    }

    /// Numbered headings per line.
    pub fn numbered_density(&self) -> f32 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.numbered_headings as f32 / self.total_lines as f32
        }
    }
}

/// Classifies documents dominated by labels and blank fields.
pub struct FormDetector<'a> {
    config: &'a FormConfig,
    fill_run: Regex,
    bare_field: Regex,
}

impl<'a> FormDetector<'a> {
    pub fn new(config: &'a FormConfig) -> Self {
        Self {
            config,
            fill_run: Regex::new(r"_{3,}|\.{4,}|[☐☑☒□■▢]").unwrap(),
            bare_field: Regex::new(r"^[\s_.\-|☐☑☒□■▢]+$").unwrap(),
        }
    }

    /// Whether a line is a field label or a blank field.
    pub fn is_form_like(&self, line: &Line) -> bool {
        let text = line.trimmed();
        if text.is_empty() {
            return false;
        }
        let label = line.word_count() <= self.config.label_max_words && text.ends_with(':');
        label || self.fill_run.is_match(text) || self.bare_field.is_match(text)
    }

    /// Measure the document and decide whether it is a form.
    pub fn analyze(
        &self,
        lines: &[Line],
        stats: &DocumentStats,
        generator: &CandidateGenerator,
    ) -> FormAnalysis {
        let mut analysis = FormAnalysis {
            total_lines: lines.len(),
            ..FormAnalysis::default()
        };
        if lines.is_empty() {
            return analysis;
        }

        let mut pages = BTreeSet::new();
        for line in lines {
            if self.is_form_like(line) {
                analysis.form_like_lines += 1;
                pages.insert(line.page);
            } else if generator.match_numbering(line.trimmed()).is_some() {
                analysis.numbered_headings += 1;
            }
        }
        analysis.form_pages = pages.len();

        let first_page = lines
            .iter()
            .filter(|l| l.page == 1)
            .map(|l| l.text.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        analysis.keyword = self
            .config
            .keywords
            .iter()
            .find(|k| first_page.contains(k.to_lowercase().as_str()))
            .cloned();

        let page_count = if stats.page_count > 0 {
            stats.page_count as usize
        } else {
            lines.iter().map(|l| l.page).max().unwrap_or(1) as usize
        };

        let fraction = analysis.form_fraction();
        let by_density = fraction >= self.config.min_form_fraction
            && analysis.numbered_density() <= self.config.max_numbered_density
            && analysis.form_pages >= page_count.min(2);
        let by_keyword =
            analysis.keyword.is_some() && fraction >= self.config.keyword_form_fraction;
        analysis.is_form = by_density || by_keyword;

        log::debug!(
            "Form check: {:.0}% form-like lines on {} pages, {} numbered, keyword {:?} => {}",
            fraction * 100.0,
            analysis.form_pages,
            analysis.numbered_headings,
            analysis.keyword,
            analysis.is_form
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::OutlineConfig;

    fn analyze(lines: &[Line], pages: u32) -> FormAnalysis {
        let config = OutlineConfig::default();
        let generator = CandidateGenerator::new(&config);
        let stats = DocumentStats::from_lines(lines, pages);
        FormDetector::new(&config.form).analyze(lines, &stats, &generator)
    }

    #[test]
    fn test_form_like_lines() {
        let config = FormConfig::default();
        let detector = FormDetector::new(&config);
        assert!(detector.is_form_like(&Line::new("Name:", 11.0, 1)));
        assert!(detector.is_form_like(&Line::new("Signature ____________", 11.0, 1)));
        assert!(detector.is_form_like(&Line::new("__________", 11.0, 1)));
        assert!(detector.is_form_like(&Line::new("☐ Yes ☐ No", 11.0, 1)));
        assert!(detector.is_form_like(&Line::new("Amount ........", 11.0, 1)));
        assert!(!detector.is_form_like(&Line::new("Introduction", 11.0, 1)));
        assert!(!detector.is_form_like(&Line::new(
            "The following items are required for the review process:",
            11.0,
            1
        )));
    }

    #[test]
    fn test_label_document_is_form() {
        let mut lines = Vec::new();
        for page in 1..=3 {
            lines.push(Line::new("Employee Details", 14.0, page));
            for label in ["Name:", "Designation:", "Date of Birth:", "Home Town:"] {
                lines.push(Line::new(label, 11.0, page));
                lines.push(Line::new("______________", 11.0, page));
            }
            lines.push(Line::new("Please complete all fields", 11.0, page));
        }
        let analysis = analyze(&lines, 3);
        assert!(analysis.form_fraction() >= 0.79);
        assert_eq!(analysis.form_pages, 3);
        assert!(analysis.is_form);
    }

    #[test]
    fn test_numbered_document_is_not_form() {
        let mut lines = Vec::new();
        for i in 1..=10 {
            lines.push(Line::new(format!("{}. Section Heading", i), 14.0, 1));
            lines.push(Line::new("Note:", 11.0, 1));
            lines.push(Line::new("Body text that explains the section.", 11.0, 1));
        }
        assert!(!analyze(&lines, 1).is_form);
    }

    #[test]
    fn test_keyword_rule() {
        let lines = vec![
            Line::new("Application Form for Grant of Leave", 16.0, 1),
            Line::new("Name:", 11.0, 1),
            Line::new("Reason for leave is described in full below.", 11.0, 1),
            Line::new("Approved by the head of department.", 11.0, 1),
        ];
        let analysis = analyze(&lines, 1);
        assert_eq!(analysis.keyword.as_deref(), Some("application form"));
        assert!(analysis.is_form);
    }

    #[test]
    fn test_narrative_document() {
        let lines = vec![
            Line::new("Annual Report", 20.0, 1),
            Line::new("Introduction", 14.0, 1),
            Line::new("This year we grew.", 11.0, 1),
        ];
        let analysis = analyze(&lines, 1);
        assert!(!analysis.is_form);
        assert_eq!(analysis.form_like_lines, 0);
        assert!(!analyze(&[], 0).is_form);
    }
}
