//! Footer page numbering

use chrono::Datelike;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locate::count_slides;

/// Token marking a footer whose page number has not been assigned yet
pub const PLACEHOLDER: &str = "PAGE_NUMBER_PLACEHOLDER";

static FOOTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div class="footer">([\s\S]*?)</div>"#).expect("footer pattern is valid")
});
static PAGE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+/\d+").expect("page number pattern is valid"));
static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}(?:年\d{1,2}月|-\d{1,2})?").expect("period pattern is valid")
});

/// How the period in a footer is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodStyle {
    /// `2025-09`
    Iso,
    /// `2025年9月`
    Japanese,
}

/// A calendar month stamped into footers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The current local month
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self::new(now.year(), now.month())
    }

    /// Render the period in the given style
    pub fn format(&self, style: PeriodStyle) -> String {
        match style {
            PeriodStyle::Iso => format!("{}-{:02}", self.year, self.month),
            PeriodStyle::Japanese => format!("{}年{}月", self.year, self.month),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(PeriodStyle::Iso))
    }
}

/// Wording of generated footers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStyle {
    /// Word placed before `k/N`
    pub label: String,
    pub period: PeriodStyle,
}

impl Default for PageStyle {
    fn default() -> Self {
        Self {
            label: "page".to_string(),
            period: PeriodStyle::Iso,
        }
    }
}

impl PageStyle {
    /// Footer text for a freshly numbered slide
    pub fn footer_text(&self, period: Period, page: usize, total: usize) -> String {
        format!(
            "{} - {} {}/{}",
            period.format(self.period),
            self.label,
            page,
            total
        )
    }
}

/// Wrap footer text in the footer block the documents use
pub fn footer_block(text: &str) -> String {
    format!("<div class=\"footer\">\n            {}\n        </div>", text)
}

/// Renumber every footer for the current month with the default wording
pub fn renumber_pages(buffer: &str) -> String {
    renumber_pages_with(buffer, &PageStyle::default(), Period::current())
}

/// Renumber every footer in document order as `k/N`.
///
/// N is the number of slide opening markers. Placeholder footers are replaced
/// whole; other footers only get their `digits/digits` rewritten, or a page
/// marker spliced after their period. Footers with neither are left untouched.
pub fn renumber_pages_with(buffer: &str, style: &PageStyle, period: Period) -> String {
    let total = count_slides(buffer);
    let mut page = 0usize;

    let renumbered = FOOTER_RE.replace_all(buffer, |caps: &Captures<'_>| {
        page += 1;
        let whole = &caps[0];
        let content = caps[1].trim();
        let page_number = format!("{}/{}", page, total);

        if content.contains(PLACEHOLDER) {
            debug!("Footer {} is a placeholder, numbering {}", page, page_number);
            return footer_block(&style.footer_text(period, page, total));
        }

        if PAGE_NUMBER_RE.is_match(content) {
            let updated = PAGE_NUMBER_RE.replace(content, page_number.as_str());
            return footer_block(&updated);
        }

        if let Some(found) = find_period(content) {
            let updated = format!(
                "{}{} - {} {}{}",
                &content[..found.start()],
                found.as_str(),
                style.label,
                page_number,
                &content[found.end()..]
            );
            return footer_block(&updated);
        }

        debug!("Footer {} has no page marker, leaving it unchanged", page);
        whole.to_string()
    });

    renumbered.into_owned()
}

/// First period in `content` that is not part of a longer run of digits
fn find_period(content: &str) -> Option<regex::Match<'_>> {
    let bytes = content.as_bytes();
    PERIOD_RE.find_iter(content).find(|m| {
        let digit_before = m.start() > 0 && bytes[m.start() - 1].is_ascii_digit();
        let digit_after = bytes.get(m.end()).is_some_and(|b| b.is_ascii_digit());
        !digit_before && !digit_after
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> Period {
        Period::new(2025, 9)
    }

    fn slide(footer: &str) -> String {
        format!(
            "<div class=\"slide\">\n<h1>T</h1>\n<div class=\"footer\">{}</div>\n</div>\n",
            footer
        )
    }

    fn footers(buffer: &str) -> Vec<String> {
        FOOTER_RE
            .captures_iter(buffer)
            .map(|c| c[1].trim().to_string())
            .collect()
    }

    #[test]
    fn test_placeholders_are_numbered_in_order() {
        let buffer = format!("{}{}", slide(PLACEHOLDER), slide(PLACEHOLDER));
        let out = renumber_pages_with(&buffer, &PageStyle::default(), period());
        assert_eq!(footers(&out), vec!["2025-09 - page 1/2", "2025-09 - page 2/2"]);
    }

    #[test]
    fn test_existing_numbers_keep_their_prefix() {
        let buffer = format!(
            "{}{}{}",
            slide("2025年9月 - スライド 1/3"),
            slide("2025年9月 - スライド 9/9"),
            slide("2025年9月 - スライド 3/3")
        );
        let out = renumber_pages_with(&buffer, &PageStyle::default(), period());
        assert_eq!(
            footers(&out),
            vec![
                "2025年9月 - スライド 1/3",
                "2025年9月 - スライド 2/3",
                "2025年9月 - スライド 3/3"
            ]
        );
    }

    #[test]
    fn test_period_without_number_gets_marker() {
        let buffer = slide("2024-03 Quarterly review");
        let out = renumber_pages_with(&buffer, &PageStyle::default(), period());
        assert_eq!(footers(&out), vec!["2024-03 - page 1/1 Quarterly review"]);
    }

    #[test]
    fn test_long_digit_runs_are_not_periods() {
        let buffer = format!("{}{}", slide("Batch 10000 units"), slide("Ref 120245 - 2024-03"));
        let out = renumber_pages_with(&buffer, &PageStyle::default(), period());
        assert_eq!(
            footers(&out),
            vec!["Batch 10000 units", "Ref 120245 - 2024-03 - page 2/2"]
        );
    }

    #[test]
    fn test_japanese_period_without_number() {
        let style = PageStyle {
            label: "スライド".to_string(),
            period: PeriodStyle::Japanese,
        };
        let out = renumber_pages_with(&slide("2025年9月"), &style, period());
        assert_eq!(footers(&out), vec!["2025年9月 - スライド 1/1"]);
    }

    #[test]
    fn test_footer_without_marker_is_untouched() {
        let buffer = format!("{}{}", slide("Confidential"), slide(PLACEHOLDER));
        let out = renumber_pages_with(&buffer, &PageStyle::default(), period());
        assert!(out.contains("<div class=\"footer\">Confidential</div>"));
        // the untouched footer still takes its ordinal
        assert_eq!(footers(&out)[1], "2025-09 - page 2/2");
    }

    #[test]
    fn test_idempotent_on_numbered_footers() {
        let buffer = format!("{}{}", slide("2025-09 - page 7/7"), slide("x 1/1"));
        let once = renumber_pages_with(&buffer, &PageStyle::default(), period());
        let twice = renumber_pages_with(&once, &PageStyle::default(), period());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_footers_is_identity() {
        let buffer = "<div class=\"slide\"><h1>T</h1></div>";
        assert_eq!(
            renumber_pages_with(buffer, &PageStyle::default(), period()),
            buffer
        );
    }

    #[test]
    fn test_split_slides_count_towards_total() {
        let buffer = format!(
            "<div class=\"slide slide-split\"><div class=\"footer\">1/1</div></div>{}",
            slide(PLACEHOLDER)
        );
        let out = renumber_pages_with(&buffer, &PageStyle::default(), period());
        assert_eq!(footers(&out), vec!["1/2", "2025-09 - page 2/2"]);
    }

    #[test]
    fn test_rewritten_footer_layout() {
        let out = renumber_pages_with(&slide("1/1"), &PageStyle::default(), period());
        assert!(out.contains("<div class=\"footer\">\n            1/1\n        </div>"));
    }

    #[test]
    fn test_period_formats() {
        assert_eq!(period().format(PeriodStyle::Iso), "2025-09");
        assert_eq!(period().format(PeriodStyle::Japanese), "2025年9月");
        assert_eq!(period().to_string(), "2025-09");
    }
}
