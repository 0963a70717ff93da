//! Heading level assignment.

use crate::model::{HeadingCandidate, HeadingLevel, LeveledHeading, PatternType};

/// Candidates sharing a size band and weight.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleClass {
    /// Largest size in the band
    pub size: f32,
    pub bold: bool,
    /// Index of the first candidate in this class
    pub first: usize,
    pub level: HeadingLevel,
}

/// Maps accepted candidates to H1/H2/H3.
///
/// Numbering depth decides first. Unnumbered questions are H2. Everything
/// else is ranked by style class (size band, then bold before regular); a
/// class in the same size band as numbered headings takes their level.
#[derive(Debug, Clone)]
pub struct LevelAssigner {
    size_tolerance: f32,
}

impl Default for LevelAssigner {
    fn default() -> Self {
        Self {
            size_tolerance: 0.5,
        }
    }
}

impl LevelAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size band width.
    pub fn with_size_tolerance(mut self, tolerance: f32) -> Self {
        self.size_tolerance = tolerance;
        self
    }

    /// Assign exactly one level to each candidate, preserving order.
    pub fn assign(&self, candidates: Vec<HeadingCandidate>) -> Vec<LeveledHeading> {
        let classes = self.style_classes(&candidates);

        candidates
            .into_iter()
            .map(|candidate| {
                let level = match (candidate.numbering_depth, candidate.pattern_type) {
                    (Some(depth), _) => HeadingLevel::from_depth(depth),
                    (None, PatternType::Question) => HeadingLevel::H2,
                    (None, _) => classes
                        .iter()
                        // Classes are in band order; the first band reaching down to
                        // this size is the candidate's own.
                        .find(|c| {
                            c.bold == candidate.is_bold
                                && c.size - candidate.raw_font_size <= self.size_tolerance
                        })
                        .map(|c| c.level)
                        .unwrap_or(HeadingLevel::H3),
                };
                LeveledHeading { level, candidate }
            })
            .collect()
    }

    /// Build the ranked style classes of the unnumbered, non-question candidates.
    pub fn style_classes(&self, candidates: &[HeadingCandidate]) -> Vec<StyleClass> {
        let styled: Vec<(usize, &HeadingCandidate)> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.numbering_depth.is_none() && c.pattern_type != PatternType::Question)
            .collect();

        let mut sizes: Vec<f32> = styled.iter().map(|(_, c)| c.raw_font_size).collect();
        sizes.sort_by(|a, b| b.total_cmp(a));
        let mut bands: Vec<f32> = Vec::new();
        for size in sizes {
            match bands.last() {
                Some(&rep) if rep - size <= self.size_tolerance => {}
                _ => bands.push(size),
            }
        }

        let mut classes: Vec<(usize, StyleClass)> = Vec::new();
        for (index, c) in styled {
            let band = bands
                .iter()
                .position(|&rep| rep - c.raw_font_size <= self.size_tolerance)
                .unwrap_or(bands.len());
            if !classes
                .iter()
                .any(|(b, class)| *b == band && class.bold == c.is_bold)
            {
                classes.push((
                    band,
                    StyleClass {
                        size: bands.get(band).copied().unwrap_or(c.raw_font_size),
                        bold: c.is_bold,
                        first: index,
                        level: HeadingLevel::H3,
                    },
                ));
            }
        }
        classes.sort_by(|(ba, a), (bb, b)| {
            ba.cmp(bb)
                .then(b.bold.cmp(&a.bold))
                .then(a.first.cmp(&b.first))
        });

        let anchors: Vec<(f32, HeadingLevel)> = candidates
            .iter()
            .filter_map(|c| {
                c.numbering_depth
                    .map(|d| (c.raw_font_size, HeadingLevel::from_depth(d)))
            })
            .collect();

        classes
            .into_iter()
            .enumerate()
            .map(|(rank, (_, mut class))| {
                class.level = self
                    .anchor_level(&anchors, class.size)
                    .unwrap_or_else(|| HeadingLevel::from_rank(rank));
                class
            })
            .collect()
    }

    /// Most common numbered level at this size; ties go to the outer level.
    fn anchor_level(&self, anchors: &[(f32, HeadingLevel)], size: f32) -> Option<HeadingLevel> {
        let mut counts = [0usize; 3];
        for (anchor_size, level) in anchors {
            if self.same_band(*anchor_size, size) {
                counts[level.depth() as usize - 1] += 1;
            }
        }
        let (best, count) = counts
            .iter()
            .enumerate()
            .fold((0, 0), |acc, (i, &n)| if n > acc.1 { (i, n) } else { acc });
        (count > 0).then(|| HeadingLevel::from_depth(best as u8 + 1))
    }

    fn same_band(&self, a: f32, b: f32) -> bool {
        (a - b).abs() <= self.size_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(pattern_type: PatternType, depth: Option<u8>, size: f32, bold: bool) -> HeadingCandidate {
        HeadingCandidate {
            text: format!("{:?} {}", pattern_type, size),
            page: 1,
            pattern_type,
            numbering_depth: depth,
            confidence: 0.7,
            raw_font_size: size,
            line_index: 0,
            is_bold: bold,
        }
    }

    fn levels(candidates: Vec<HeadingCandidate>) -> Vec<HeadingLevel> {
        LevelAssigner::new()
            .assign(candidates)
            .into_iter()
            .map(|h| h.level)
            .collect()
    }

    #[test]
    fn test_numbering_depth_levels() {
        let result = levels(vec![
            candidate(PatternType::Numbered, Some(1), 12.0, false),
            candidate(PatternType::Numbered, Some(2), 12.0, false),
            candidate(PatternType::Numbered, Some(3), 12.0, false),
            candidate(PatternType::Numbered, Some(4), 12.0, false),
        ]);
        assert_eq!(
            result,
            vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3, HeadingLevel::H3]
        );
    }

    #[test]
    fn test_question_defaults_to_h2() {
        let result = levels(vec![
            candidate(PatternType::Question, None, 24.0, true),
            candidate(PatternType::Numbered, Some(1), 11.0, false),
        ]);
        assert_eq!(result, vec![HeadingLevel::H2, HeadingLevel::H1]);
    }

    #[test]
    fn test_font_bands() {
        let result = levels(vec![
            candidate(PatternType::FontOnly, None, 20.0, true),
            candidate(PatternType::FontOnly, None, 16.0, true),
            candidate(PatternType::Semantic, None, 16.3, true),
            candidate(PatternType::FontOnly, None, 14.0, false),
            candidate(PatternType::FontOnly, None, 13.0, false),
        ]);
        assert_eq!(
            result,
            vec![
                HeadingLevel::H1,
                HeadingLevel::H2,
                HeadingLevel::H2,
                HeadingLevel::H3,
                HeadingLevel::H3
            ]
        );
    }

    #[test]
    fn test_bold_ranks_before_regular() {
        let result = levels(vec![
            candidate(PatternType::FontOnly, None, 16.0, false),
            candidate(PatternType::FontOnly, None, 16.0, true),
        ]);
        assert_eq!(result, vec![HeadingLevel::H2, HeadingLevel::H1]);
    }

    #[test]
    fn test_numbered_anchor() {
        let result = levels(vec![
            candidate(PatternType::Numbered, Some(1), 18.0, true),
            candidate(PatternType::Numbered, Some(2), 14.0, true),
            candidate(PatternType::Semantic, None, 14.0, true),
        ]);
        // The semantic heading shares the 14pt band with a depth-2 heading
        assert_eq!(
            result,
            vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H2]
        );
    }

    #[test]
    fn test_every_candidate_gets_a_level() {
        let candidates: Vec<_> = (0..10)
            .map(|i| candidate(PatternType::FontOnly, None, 12.0 + i as f32, i % 2 == 0))
            .collect();
        assert_eq!(LevelAssigner::new().assign(candidates).len(), 10);
    }
}
