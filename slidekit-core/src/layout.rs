//! Two-column "text + image" slide layout

use crate::fragment::{extract_fragments, is_slide_markup};

/// Compose a split slide from its fragments.
///
/// Title and footer stay full width; body and image sit side by side. Nothing
/// is escaped and `image_src` is written verbatim into the `src` attribute.
pub fn to_split_layout(
    title: &str,
    body: &str,
    footer: &str,
    image_src: &str,
    caption: &str,
) -> String {
    format!(
        r#"<div class="slide slide-split">
        {title}
        <div class="slide-split-content">
            <div class="slide-content">
{body}
            </div>
            <div class="slide-image">
                <img src="{image_src}" alt="{caption}">
            </div>
        </div>
        {footer}
    </div>"#,
        title = title,
        body = body.trim(),
        footer = footer,
        image_src = image_src,
        caption = caption,
    )
}

/// Rewrite one located slide into the split layout with the given image.
///
/// Markup that does not parse as a slide is returned unchanged. A slide that is
/// already split gets its image replaced rather than a second layer of columns.
pub fn split_slide(content: &str, image_src: &str, caption: &str) -> String {
    if !is_slide_markup(content) {
        return content.to_string();
    }
    let fragments = extract_fragments(content);

    to_split_layout(
        fragments.title.unwrap_or_default(),
        &fragments.body,
        fragments.footer.unwrap_or_default(),
        image_src,
        caption,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_recovers_fragments() {
        let slide = to_split_layout(
            "<h1>T</h1>",
            "body text",
            "<div class=\"footer\">F</div>",
            "images/x.png",
            "caption",
        );
        let fragments = extract_fragments(&slide);

        assert_eq!(fragments.title, Some("<h1>T</h1>"));
        assert_eq!(fragments.body, "body text");
        assert_eq!(fragments.footer, Some("<div class=\"footer\">F</div>"));
    }

    #[test]
    fn test_template_shape() {
        let slide = to_split_layout("<h1>T</h1>", "b", "", "https://example.com/a.png", "A");
        assert!(slide.starts_with("<div class=\"slide slide-split\">"));
        assert!(slide.ends_with("</div>"));
        assert!(slide.contains("<div class=\"slide-split-content\">"));
        assert!(slide.contains("<img src=\"https://example.com/a.png\" alt=\"A\">"));
    }

    #[test]
    fn test_image_src_is_not_escaped() {
        let src = "data:image/png;base64,iVBORw0KGgo=";
        let slide = to_split_layout("", "", "", src, "<b>cap</b>");
        assert!(slide.contains(src));
        assert!(slide.contains("alt=\"<b>cap</b>\""));
    }

    #[test]
    fn test_split_plain_slide() {
        let slide = "<div class=\"slide\">\n<h1>Intro</h1>\n<p>Hello</p>\n<div class=\"footer\">2025-09 - page 1/1</div>\n</div>";
        let split = split_slide(slide, "images/a.png", "a.png");

        let fragments = extract_fragments(&split);
        assert_eq!(fragments.title, Some("<h1>Intro</h1>"));
        assert_eq!(fragments.body, "<p>Hello</p>");
        assert_eq!(
            fragments.footer,
            Some("<div class=\"footer\">2025-09 - page 1/1</div>")
        );
        assert!(split.contains("src=\"images/a.png\""));
    }

    #[test]
    fn test_split_non_slide_is_unchanged() {
        let content = "<p>loose</p>";
        assert_eq!(split_slide(content, "x.png", "x"), content);
    }

    #[test]
    fn test_resplit_replaces_image_without_nesting() {
        let slide = "<div class=\"slide\"><h1>T</h1><p>B</p><div class=\"footer\">1/1</div></div>";
        let once = split_slide(slide, "one.png", "one");
        let twice = split_slide(&once, "two.png", "two");

        assert_eq!(twice.matches("slide-split-content").count(), 1);
        assert!(twice.contains("src=\"two.png\""));
        assert!(!twice.contains("one.png"));
        assert_eq!(extract_fragments(&twice).body, "<p>B</p>");
    }

    #[test]
    fn test_slide_without_title_or_footer() {
        let slide = "<div class=\"slide\"><p>only body</p></div>";
        let split = split_slide(slide, "a.png", "a");
        let fragments = extract_fragments(&split);
        assert_eq!(fragments.body, "<p>only body</p>");
        assert_eq!(fragments.title, None);
    }
}
