//! Slide boundary location and insertion points

use log::{debug, warn};

use crate::span::{DepthMatcher, MatchFinder};

/// Opening marker of a plain slide
pub const SLIDE_OPEN: &str = "<div class=\"slide\">";

/// Opening marker of a slide already rewritten into the split layout
pub const SPLIT_SLIDE_OPEN: &str = "<div class=\"slide slide-split\">";

/// A located slide block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideSpan {
    /// Offset of the opening marker
    pub start: usize,
    /// Offset just past the matching `</div>`
    pub end: usize,
    /// `buffer[start..end]` at the time of location
    pub content: String,
}

impl SlideSpan {
    /// Whether `offset` falls inside the span, both ends inclusive
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Whether this slide uses the split layout
    pub fn is_split(&self) -> bool {
        self.content.starts_with(SPLIT_SLIDE_OPEN)
    }
}

/// Offsets of every slide opening marker, in document order
pub fn slide_starts(buffer: &str) -> Vec<(usize, &'static str)> {
    let mut starts: Vec<(usize, &'static str)> = [SLIDE_OPEN, SPLIT_SLIDE_OPEN]
        .iter()
        .flat_map(|marker| buffer.match_indices(marker).map(move |(i, _)| (i, *marker)))
        .collect();
    starts.sort_unstable_by_key(|(i, _)| *i);
    starts
}

/// Number of slide opening markers in the buffer
pub fn count_slides(buffer: &str) -> usize {
    buffer.matches(SLIDE_OPEN).count() + buffer.matches(SPLIT_SLIDE_OPEN).count()
}

/// Locate every terminated slide using the given finder
pub fn slide_spans_with<F: MatchFinder>(finder: &F, buffer: &str) -> Vec<SlideSpan> {
    slide_starts(buffer)
        .into_iter()
        .filter_map(|(start, marker)| {
            match finder.find_matching_end(buffer, start + marker.len()) {
                Some(end) => Some(SlideSpan {
                    start,
                    end,
                    content: buffer[start..end].to_string(),
                }),
                None => {
                    warn!("Skipping unterminated slide at offset {}", start);
                    None
                }
            }
        })
        .collect()
}

/// Locate every terminated slide in document order
pub fn slide_spans(buffer: &str) -> Vec<SlideSpan> {
    slide_spans_with(&DepthMatcher::div(), buffer)
}

/// Find the slide enclosing `cursor` using the given finder
pub fn locate_slide_with<F: MatchFinder>(
    finder: &F,
    buffer: &str,
    cursor: usize,
) -> Option<SlideSpan> {
    let found = slide_spans_with(finder, buffer)
        .into_iter()
        .find(|span| span.contains(cursor));

    match &found {
        Some(span) => debug!("Cursor {} is inside slide {}..{}", cursor, span.start, span.end),
        None => debug!("Cursor {} is outside every slide", cursor),
    }

    found
}

/// Find the slide enclosing `cursor`.
///
/// A cursor sitting exactly on a slide's end belongs to that slide, not to the
/// one that follows.
pub fn locate_slide(buffer: &str, cursor: usize) -> Option<SlideSpan> {
    locate_slide_with(&DepthMatcher::div(), buffer, cursor)
}

/// Offset at which new content should be inserted for a cursor position.
///
/// Returns the end of the enclosing slide, otherwise the end of the last slide,
/// otherwise the end of the buffer. When the last slide marker is never closed
/// the end of the buffer is used, even if earlier slides are well formed.
pub fn resolve_insert_offset(buffer: &str, cursor: usize) -> usize {
    let spans = slide_spans(buffer);

    if let Some(span) = spans.iter().find(|span| span.contains(cursor)) {
        return span.end;
    }

    let Some(&(last_start, _)) = slide_starts(buffer).last() else {
        return buffer.len();
    };
    spans
        .iter()
        .find(|span| span.start == last_start)
        .map(|span| span.end)
        .unwrap_or(buffer.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SLIDES: &str = "<body>\n<div class=\"slide\"><h1>A</h1><div class=\"footer\">1/2</div></div>\n<div class=\"slide\"><h1>B</h1><div class=\"footer\">2/2</div></div>\n</body>";

    fn first_end() -> usize {
        TWO_SLIDES.find("</div></div>").unwrap() + 12
    }

    #[test]
    fn test_no_slides() {
        let text = "<html><body><p>nothing</p></body></html>";
        for offset in 0..=text.len() {
            assert!(locate_slide(text, offset).is_none());
        }
        assert_eq!(resolve_insert_offset(text, 3), text.len());
    }

    #[test]
    fn test_locate_first_and_second() {
        let first = locate_slide(TWO_SLIDES, 10).unwrap();
        assert_eq!(first.start, 7);
        assert!(first.content.contains("<h1>A</h1>"));
        assert!(first.content.ends_with("</div></div>"));

        let second_h1 = TWO_SLIDES.find("<h1>B").unwrap();
        let second = locate_slide(TWO_SLIDES, second_h1).unwrap();
        assert!(second.content.contains("<h1>B</h1>"));
        assert!(second.start >= first.end);
    }

    #[test]
    fn test_end_boundary_belongs_to_earlier_slide() {
        let text = "<div class=\"slide\">a</div><div class=\"slide\">b</div>";
        let end = "<div class=\"slide\">a</div>".len();
        let span = locate_slide(text, end).unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(span.end, end);
    }

    #[test]
    fn test_cursor_outside_slides() {
        assert!(locate_slide(TWO_SLIDES, 0).is_none());
        assert!(locate_slide(TWO_SLIDES, TWO_SLIDES.len()).is_none());
    }

    #[test]
    fn test_spans_are_ordered_and_disjoint() {
        let spans = slide_spans(TWO_SLIDES);
        assert_eq!(spans.len(), 2);
        assert!(spans[0].end <= spans[1].start);
        for span in &spans {
            assert_eq!(&TWO_SLIDES[span.start..span.end], span.content);
            assert!(span.end > span.start);
        }
    }

    #[test]
    fn test_located_span_contains_cursor() {
        for offset in 0..=TWO_SLIDES.len() {
            if let Some(span) = locate_slide(TWO_SLIDES, offset) {
                assert!(span.start <= offset && offset <= span.end);
            }
        }
    }

    #[test]
    fn test_unterminated_slide_is_skipped() {
        let text = "<div class=\"slide\"><h1>Broken</h1><div class=\"footer\">1/1</div>";
        for offset in 0..=text.len() {
            assert!(locate_slide(text, offset).is_none());
        }
        assert_eq!(resolve_insert_offset(text, 5), text.len());
    }

    #[test]
    fn test_unterminated_last_slide_inserts_at_end() {
        let good = "<div class=\"slide\">ok</div>";
        let text = format!("{}\n<div class=\"slide\">broken", good);
        assert_eq!(slide_spans(&text).len(), 1);
        assert_eq!(resolve_insert_offset(&text, text.len()), text.len());
        // Inside the earlier slide the slide itself still wins
        assert_eq!(resolve_insert_offset(&text, 3), good.len());
    }

    #[test]
    fn test_unterminated_earlier_slide_uses_last_end() {
        let good = "<div class=\"slide\">ok</div>";
        let text = format!("<div class=\"slide\">broken\n{}\ntrailer", good);
        assert_eq!(
            resolve_insert_offset(&text, text.len()),
            text.len() - "\ntrailer".len()
        );
    }

    #[test]
    fn test_extra_attributes_are_not_slides() {
        let text = "<div class=\"slide\" id=\"x\">a</div><div class=\"intro slide\">b</div>";
        assert!(slide_spans(text).is_empty());
    }

    #[test]
    fn test_split_slides_are_located() {
        let text = "<div class=\"slide slide-split\"><div class=\"slide-split-content\"></div></div>";
        let span = locate_slide(text, 3).unwrap();
        assert!(span.is_split());
        assert_eq!(span.end, text.len());
    }

    #[test]
    fn test_count_slides() {
        assert_eq!(count_slides(TWO_SLIDES), 2);
        assert_eq!(count_slides("<div class=\"slide slide-split\"></div>"), 1);
        assert_eq!(count_slides(""), 0);
    }

    #[test]
    fn test_resolve_inside_slide() {
        assert_eq!(resolve_insert_offset(TWO_SLIDES, 12), first_end());
    }

    #[test]
    fn test_resolve_outside_uses_last_slide() {
        let last_end = TWO_SLIDES.rfind("</div></div>").unwrap() + 12;
        assert_eq!(resolve_insert_offset(TWO_SLIDES, 0), last_end);
        assert_eq!(resolve_insert_offset(TWO_SLIDES, TWO_SLIDES.len()), last_end);
    }
}
