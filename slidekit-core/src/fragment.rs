//! Title, body and footer fragments of a slide

use once_cell::sync::Lazy;
use regex::Regex;

use crate::span::{DepthMatcher, MatchFinder};

static SLIDE_WRAPPER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\A<div class="slide( slide-split)?"[^>]*>([\s\S]*)</div>\z"#)
        .expect("slide wrapper pattern is valid")
});
static FOOTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div class="footer">[\s\S]*?</div>"#).expect("footer pattern is valid")
});
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<h1[^>]*>[\s\S]*?</h1>").expect("title pattern is valid"));

/// Opening marker of the text column in a split slide
pub const TEXT_COLUMN_OPEN: &str = "<div class=\"slide-content\">";

/// The pieces of one slide
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragments<'a> {
    /// First `<h1>` block, markup included
    pub title: Option<&'a str>,
    /// First footer block, markup included
    pub footer: Option<&'a str>,
    /// Everything else, trimmed
    pub body: String,
}

impl<'a> Fragments<'a> {
    fn opaque(content: &str) -> Self {
        Self {
            title: None,
            footer: None,
            body: content.to_string(),
        }
    }
}

/// Whether `content` is exactly one slide block
pub fn is_slide_markup(content: &str) -> bool {
    SLIDE_WRAPPER_RE.is_match(content)
}

/// Split a slide's markup into title, footer and body.
///
/// Content that is not a single slide block comes back whole as the body.
/// Footers end at their first `</div>`, so a footer holding a nested div is cut
/// short.
pub fn extract_fragments(content: &str) -> Fragments<'_> {
    let Some(caps) = SLIDE_WRAPPER_RE.captures(content) else {
        return Fragments::opaque(content);
    };
    let is_split = caps.get(1).is_some();
    let Some(inner) = caps.get(2).map(|m| m.as_str()) else {
        return Fragments::opaque(content);
    };

    let footer = FOOTER_RE.find(inner).map(|m| m.as_str());
    let title = TITLE_RE.find(inner).map(|m| m.as_str());

    if is_split {
        if let Some(body) = text_column(inner) {
            return Fragments {
                title,
                footer,
                body: body.trim().to_string(),
            };
        }
    }

    let mut body = inner.to_string();
    if let Some(footer) = footer {
        body = body.replacen(footer, "", 1);
    }
    if let Some(title) = title {
        body = body.replacen(title, "", 1);
    }

    Fragments {
        title,
        footer,
        body: body.trim().to_string(),
    }
}

/// Inner markup of the text column of a split slide
fn text_column(inner: &str) -> Option<&str> {
    let open = inner.find(TEXT_COLUMN_OPEN)?;
    let content_start = open + TEXT_COLUMN_OPEN.len();
    let end = DepthMatcher::div().find_matching_end(inner, content_start)?;
    inner.get(content_start..end - "</div>".len())
}
