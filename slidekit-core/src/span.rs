//! Depth-matching search for the closing marker of a nested block

/// Finds where a block that has just been opened ends.
///
/// `open_end` is the offset right after the opening marker. Implementations
/// return the offset just past the matching closing marker, or `None` when the
/// block is never closed.
pub trait MatchFinder {
    fn find_matching_end(&self, buffer: &str, open_end: usize) -> Option<usize>;
}

/// Pairs opening and closing markers of one tag name with a depth counter.
///
/// Any `<tag` counts as an opening marker, whatever its attributes, so for
/// `div` every nested div inside the block affects the depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthMatcher {
    open: String,
    close: String,
}

impl DepthMatcher {
    /// Create a matcher for `<tag` / `</tag>`
    pub fn new(tag: &str) -> Self {
        Self {
            open: format!("<{}", tag),
            close: format!("</{}>", tag),
        }
    }

    /// The matcher used for slide bounds
    pub fn div() -> Self {
        Self::new("div")
    }
}

impl Default for DepthMatcher {
    fn default() -> Self {
        Self::div()
    }
}

impl MatchFinder for DepthMatcher {
    fn find_matching_end(&self, buffer: &str, open_end: usize) -> Option<usize> {
        let mut depth = 1usize;
        let mut pos = open_end;

        while pos < buffer.len() {
            let rest = buffer.get(pos..)?;
            let next_close = pos + rest.find(&self.close)?;
            let next_open = rest.find(&self.open).map(|i| pos + i);

            match next_open {
                Some(open) if open < next_close => {
                    depth += 1;
                    pos = open + self.open.len();
                }
                _ => {
                    depth -= 1;
                    pos = next_close + self.close.len();
                    if depth == 0 {
                        return Some(pos);
                    }
                }
            }
        }

        None
    }
}
