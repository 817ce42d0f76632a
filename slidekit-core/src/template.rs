//! Starter document and new-slide template

use crate::paging::{footer_block, Period, PageStyle};

pub use crate::paging::PLACEHOLDER;

/// Markup inserted by "add slide"; its footer is numbered on the next renumber
pub const NEW_SLIDE_TEMPLATE: &str = r#"
    <!-- New slide -->
    <div class="slide">
        <h1>New slide</h1>

        <h2>Subtitle</h2>

        <ul>
            <li><span class="highlight">Point 1</span> - describe the first point</li>
            <li><span class="highlight">Point 2</span> - describe the second point</li>
            <li><span class="highlight">Point 3</span> - describe the third point</li>
        </ul>

        <p style="margin-top: 40px; font-size: 24px; padding-left: 20px;">
            Add further detail here.<br>
            <small style="color: #7f8c8d;">Inserting an image into this slide switches it to the two-column layout.</small>
        </p>

        <div class="footer">
            PAGE_NUMBER_PLACEHOLDER
        </div>
    </div>"#;

/// Heading the cursor lands on after a slide is added
pub const NEW_SLIDE_HEADING: &str = "<h1>New slide</h1>";

const STYLESHEET: &str = r#"        body {
            margin: 0;
            padding: 0;
            font-family: 'Helvetica Neue', 'Hiragino Kaku Gothic Pro', 'Meiryo', sans-serif;
            background: #f0f0f0;
        }

        .slide {
            width: 297mm;
            height: 210mm;
            background: white;
            box-shadow: 0 4px 20px rgba(0,0,0,0.15);
            margin: 20px auto;
            padding: 40px;
            box-sizing: border-box;
            display: flex;
            flex-direction: column;
            justify-content: center;
            position: relative;
            page-break-after: always;
            break-after: always;
            break-inside: avoid;
            overflow: hidden;
        }

        .slide.slide-split {
            flex-direction: column;
            justify-content: flex-start;
        }

        .slide-split-content {
            display: flex;
            flex-direction: row;
            align-items: stretch;
            gap: 40px;
            flex: 1;
        }

        .slide-content {
            flex: 1;
            display: flex;
            flex-direction: column;
            justify-content: center;
            min-width: 0;
        }

        .slide-image {
            flex: 1;
            display: flex;
            align-items: center;
            justify-content: center;
            min-width: 0;
        }

        .slide-image img {
            max-width: 100%;
            max-height: 100%;
            object-fit: contain;
            border-radius: 8px;
            box-shadow: 0 4px 20px rgba(0,0,0,0.15);
        }

        .slide:last-child {
            page-break-after: auto;
            break-after: auto;
        }

        .slide h1 {
            color: #2c3e50;
            font-size: 42px;
            border-bottom: 4px solid #3498db;
            padding-bottom: 12px;
        }

        .slide h2 {
            color: #34495e;
            font-size: 30px;
        }

        .slide ul {
            font-size: 22px;
            line-height: 1.8;
        }

        .highlight {
            color: #e74c3c;
            font-weight: bold;
        }

        .footer {
            position: absolute;
            bottom: 20px;
            right: 40px;
            font-size: 14px;
            color: #7f8c8d;
        }

        @media print {
            body { background: white; }
            .slide { margin: 0; box-shadow: none; }
        }

        @page {
            size: A4 landscape;
            margin: 0;
        }
"#;

struct StarterSlide {
    title: &'static str,
    subtitle: &'static str,
    points: [(&'static str, &'static str); 3],
}

const STARTER_SLIDES: [StarterSlide; 3] = [
    StarterSlide {
        title: "Presentation title",
        subtitle: "Overview",
        points: [
            ("Goal", "what this presentation sets out to do"),
            ("Audience", "who it is for"),
            ("Outline", "how the talk is structured"),
        ],
    },
    StarterSlide {
        title: "Key points",
        subtitle: "What matters",
        points: [
            ("Item 1", "the first important point"),
            ("Item 2", "the second point and why it matters"),
            ("Item 3", "the third point and its impact"),
        ],
    },
    StarterSlide {
        title: "Summary",
        subtitle: "Conclusion",
        points: [
            ("Results", "what was achieved"),
            ("Lessons", "what we learned on the way"),
            ("Next steps", "where this goes from here"),
        ],
    },
];

/// A complete starter deck of three numbered slides
pub fn default_document(style: &PageStyle, period: Period) -> String {
    let total = STARTER_SLIDES.len();
    let mut slides = String::new();

    for (idx, slide) in STARTER_SLIDES.iter().enumerate() {
        let page = idx + 1;
        let points: String = slide
            .points
            .iter()
            .map(|(name, text)| {
                format!(
                    "            <li><span class=\"highlight\">{}</span> - {}</li>\n",
                    name, text
                )
            })
            .collect();

        slides.push_str(&format!(
            "\n    <!-- Slide {page} -->\n    <div class=\"slide\">\n        <h1>{title}</h1>\n\n        <h2>{subtitle}</h2>\n\n        <ul>\n{points}        </ul>\n\n        {footer}\n    </div>\n",
            page = page,
            title = slide.title,
            subtitle = slide.subtitle,
            points = points,
            footer = footer_block(&style.footer_text(period, page, total)),
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    <title>A4 landscape slides</title>\n    <style>\n{}    </style>\n</head>\n<body>{}</body>\n</html>\n",
        STYLESHEET, slides
    )
}
