//! Image references inside slide documents

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static EMBEDDED_IMG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<img[^>]*src="(data:image/([^;"]+);base64,[^"]+)"[^>]*>"#)
        .expect("embedded image pattern is valid")
});
static ALT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"alt="([^"]*)""#).expect("alt pattern is valid"));

/// Where an inserted image's bytes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// http(s) URL referenced as-is
    Remote(String),
    /// File name inside the document's image folder
    Stored(String),
    /// Self-contained `data:` URI
    Embedded(String),
}

impl ImageRef {
    /// Value for the `src` attribute
    pub fn src(&self, folder: &str) -> String {
        match self {
            ImageRef::Remote(url) => url.clone(),
            ImageRef::Stored(name) => format!("{}{}", folder_prefix(folder), name),
            ImageRef::Embedded(uri) => uri.clone(),
        }
    }
}

/// An embedded base64 image found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// The whole `<img ...>` tag
    pub tag: String,
    /// The `data:` URI from its `src`
    pub data_uri: String,
    /// Image subtype from the URI, e.g. `png`
    pub subtype: String,
    /// Alt text, if the tag has one
    pub alt: Option<String>,
}

/// Decoded `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Only http and https URLs are accepted as remote images
pub fn is_valid_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest
                .split(|c: char| c == '/' || c == '?' || c == '#')
                .next()
                .unwrap_or_default();
            !host.is_empty() && !host.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// MIME type for a file extension, case-insensitive
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// File extension for an image MIME subtype such as `png` or `svg+xml`
pub fn extension_for_subtype(subtype: &str) -> &str {
    match subtype {
        "jpeg" => "jpg",
        "svg+xml" => "svg",
        other => other,
    }
}

/// Encode bytes as a base64 `data:` URI
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decode a base64 `data:` URI
pub fn parse_data_uri(uri: &str) -> Option<DataUri> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some(DataUri {
        mime: mime.to_string(),
        bytes,
    })
}

/// Replace `src="<folder>NAME"` references with the data URI `lookup` returns.
///
/// References `lookup` cannot resolve stay as they are.
pub fn inline_stored_images<F>(buffer: &str, folder: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let pattern = format!(r#"src="{}([^"/]+)""#, regex::escape(&folder_prefix(folder)));
    let Ok(re) = Regex::new(&pattern) else {
        return buffer.to_string();
    };

    re.replace_all(buffer, |caps: &Captures<'_>| match lookup(&caps[1]) {
        Some(uri) => format!("src=\"{}\"", uri),
        None => caps[0].to_string(),
    })
    .into_owned()
}

/// Every `<img>` whose `src` is an embedded base64 image, in document order
pub fn embedded_images(buffer: &str) -> Vec<EmbeddedImage> {
    EMBEDDED_IMG_RE
        .captures_iter(buffer)
        .map(|caps| {
            let tag = caps[0].to_string();
            let alt = ALT_RE.captures(&tag).map(|a| a[1].to_string());
            EmbeddedImage {
                data_uri: caps[1].to_string(),
                subtype: caps[2].to_string(),
                alt,
                tag,
            }
        })
        .collect()
}

/// Replace the first literal occurrence of `from`
pub fn replace_first(buffer: &str, from: &str, to: &str) -> String {
    buffer.replacen(from, to, 1)
}

/// Centred image block used when the cursor is not inside any slide
pub fn image_block(src: &str, caption: &str) -> String {
    format!(
        r#"
        <div style="text-align: center; margin: 30px 0;">
            <img src="{}" alt="{}"
                 style="max-width: 600px; max-height: 400px; width: auto; height: auto;
                        border-radius: 8px; box-shadow: 0 4px 15px rgba(0,0,0,0.2);">
            <p style="font-size: 16px; color: #7f8c8d; margin-top: 10px; font-style: italic;">{}</p>
        </div>"#,
        src, caption, caption
    )
}

fn folder_prefix(folder: &str) -> String {
    if folder.is_empty() || folder.ends_with('/') {
        folder.to_string()
    } else {
        format!("{}/", folder)
    }
}
