//! Editing session: the buffer, its cursor and the operations run on them

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use slidekit_core::config::ImageMode;
use slidekit_core::diff::map_offset;
use slidekit_core::images::{
    self, embedded_images, extension_for_subtype, image_block, inline_stored_images,
    is_valid_url, mime_for_extension, parse_data_uri, ImageRef,
};
use slidekit_core::template::{NEW_SLIDE_HEADING, NEW_SLIDE_TEMPLATE};
use slidekit_core::{
    locate_slide, renumber_pages_with, resolve_insert_offset, split_slide, Config, Document,
    Period,
};
use slidekit_core::locate::{count_slides, slide_starts};

use crate::image_store::ImageStore;

/// Where an image being inserted comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// A local image file
    File(PathBuf),
    /// A remote http(s) URL, referenced without downloading
    Url(String),
}

/// Result of inserting an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// How the image is referenced in the buffer
    pub image: ImageRef,
    /// Whether an enclosing slide was rewritten into the split layout
    pub split: bool,
}

/// One document being edited.
///
/// The session owns the image store for its lifetime; every operation replaces
/// the whole buffer and re-derives the cursor from the new text.
pub struct EditorSession {
    pub doc: Document,
    pub config: Config,
    store: ImageStore,
    cursor: usize,
}

impl EditorSession {
    pub fn new(doc: Document, config: Config, store: ImageStore) -> Self {
        Self {
            doc,
            config,
            store,
            cursor: 0,
        }
    }

    /// Open a document with the image store configured next to it
    pub fn open(path: &Path, config: Config) -> Result<Self> {
        let doc = Document::load(path)
            .with_context(|| format!("Failed to load document: {}", path.display()))?;
        let store = ImageStore::for_document(path, &config.images.folder);
        Ok(Self::new(doc, config, store))
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Cursor as a byte offset into the buffer
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to the buffer and snapped back to the start of
    /// the character it falls in
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = self.doc.char_to_offset(self.doc.offset_to_char(offset));
    }

    /// Move the cursor to a character offset
    pub fn set_cursor_char(&mut self, char_idx: usize) {
        self.cursor = self.doc.char_to_offset(char_idx);
    }

    /// Move the cursor to a 1-based line and column
    pub fn set_cursor_line_col(&mut self, line: usize, column: usize) {
        self.cursor = self.doc.line_col_to_offset(line, column);
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }

    /// Insert a new slide after the slide under the cursor and renumber.
    ///
    /// The cursor moves onto the new slide's heading. Returns the insertion
    /// offset, measured before renumbering.
    pub fn add_slide(&mut self) -> usize {
        let text = self.doc.text();
        let at = resolve_insert_offset(&text, self.cursor);
        let index = count_slides(&text[..at]);

        let mut updated = String::with_capacity(text.len() + NEW_SLIDE_TEMPLATE.len());
        updated.push_str(&text[..at]);
        updated.push_str(NEW_SLIDE_TEMPLATE);
        updated.push_str(&text[at..]);

        let renumbered = self.renumber_text(&updated);
        // Footers ahead of the new slide may change length when renumbered
        let cursor = nth_slide_start(&renumbered, index)
            .and_then(|start| {
                renumbered[start..]
                    .find(NEW_SLIDE_HEADING)
                    .map(|heading| start + heading)
            })
            .unwrap_or(at);
        self.commit(renumbered);
        self.set_cursor(cursor);

        info!("Added slide at offset {}", at);
        at
    }

    /// Remove the slide under the cursor and renumber.
    ///
    /// Returns `false` when the cursor is outside every slide.
    pub fn delete_slide(&mut self) -> bool {
        let text = self.doc.text();
        let Some(span) = locate_slide(&text, self.cursor) else {
            return false;
        };

        // Take the indentation in front of the slide along with it
        let line_start = text[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let start = if text[line_start..span.start].trim().is_empty() {
            line_start
        } else {
            span.start
        };

        let index = count_slides(&text[..span.start]);
        let mut updated = String::with_capacity(text.len());
        updated.push_str(&text[..start]);
        updated.push_str(&text[span.end..]);

        let renumbered = self.renumber_text(&updated);
        let cursor = nth_slide_start(&renumbered, index).unwrap_or(renumbered.len());
        self.commit(renumbered);
        self.set_cursor(cursor);

        info!("Deleted slide at {}..{}", span.start, span.end);
        true
    }

    /// Insert an image at the cursor.
    ///
    /// Inside a slide the slide is rewritten into the split layout; elsewhere a
    /// stand-alone image block is inserted at the cursor.
    pub fn insert_image(&mut self, input: &ImageInput) -> Result<Insertion> {
        let (image, caption) = self.acquire_image(input)?;
        let src = image.src(&self.config.images.folder);
        let text = self.doc.text();

        let split = match locate_slide(&text, self.cursor) {
            Some(span) => {
                let index = count_slides(&text[..span.start]);
                let replacement = split_slide(&span.content, &src, &caption);
                let mut updated = String::with_capacity(text.len() + replacement.len());
                updated.push_str(&text[..span.start]);
                updated.push_str(&replacement);
                updated.push_str(&text[span.end..]);

                let renumbered = self.renumber_text(&updated);
                let cursor = nth_slide_start(&renumbered, index).unwrap_or(span.start);
                self.commit(renumbered);
                self.set_cursor(cursor);
                true
            }
            None => {
                let block = image_block(&src, &caption);
                let at = self.cursor.min(text.len());
                let mut updated = String::with_capacity(text.len() + block.len());
                updated.push_str(&text[..at]);
                updated.push_str(&block);
                updated.push_str(&text[at..]);

                // Renumbering never touches the block, so find it again by occurrence
                let earlier = text[..at].matches(block.as_str()).count();
                let renumbered = self.renumber_text(&updated);
                let cursor = renumbered
                    .match_indices(block.as_str())
                    .nth(earlier)
                    .map(|(i, _)| i + block.len())
                    .unwrap_or(renumbered.len());
                self.commit(renumbered);
                self.set_cursor(cursor);
                false
            }
        };

        info!("Inserted image {} (split layout: {})", src, split);
        Ok(Insertion { image, split })
    }

    /// Move every embedded base64 image into the image store.
    ///
    /// Returns how many images were converted.
    pub fn externalize_images(&mut self) -> Result<usize> {
        let mut text = self.doc.text();
        let found = embedded_images(&text);
        let millis = chrono::Utc::now().timestamp_millis();
        let mut converted = 0;

        for image in found {
            let Some(decoded) = parse_data_uri(&image.data_uri) else {
                warn!("Skipping undecodable embedded image");
                continue;
            };

            let ext = extension_for_subtype(&image.subtype);
            let name = format!("converted_{}_{}.{}", millis, converted, ext);
            self.store.save(&name, &decoded.bytes)?;

            let src = ImageRef::Stored(name).src(&self.config.images.folder);
            let new_tag = images::replace_first(&image.tag, &image.data_uri, &src);
            text = images::replace_first(&text, &image.tag, &new_tag);
            converted += 1;
        }

        if converted > 0 {
            self.commit(text);
            info!("Moved {} embedded images to {}", converted, self.store.dir().display());
        }
        Ok(converted)
    }

    /// The buffer with stored images inlined, for previews and copies
    pub fn preview_html(&self) -> String {
        let store = &self.store;
        inline_stored_images(&self.doc.text(), &self.config.images.folder, |name| {
            store.data_uri(name)
        })
    }

    /// Renumber every footer
    pub fn renumber(&mut self) {
        let text = self.doc.text();
        self.commit(self.renumber_text(&text));
    }

    /// Empty the buffer
    pub fn clear(&mut self) {
        self.commit(String::new());
        self.cursor = 0;
    }

    /// Write the buffer back to disk
    pub fn save(&self) -> Result<()> {
        self.doc.save()
    }

    fn renumber_text(&self, text: &str) -> String {
        renumber_pages_with(text, &self.config.footer.page_style(), Period::current())
    }

    /// Replace the buffer, carrying the cursor over to the same spot in the new text
    fn commit(&mut self, text: String) {
        let old = self.doc.text();
        if text == old {
            return;
        }
        let cursor = map_offset(&old, &text, self.cursor);
        self.doc.replace(&text);
        self.set_cursor(cursor);
    }

    fn acquire_image(&mut self, input: &ImageInput) -> Result<(ImageRef, String)> {
        match input {
            ImageInput::Url(url) => {
                if !is_valid_url(url) {
                    anyhow::bail!("Not a valid http(s) URL: {}", url);
                }
                if !self.config.images.allow_remote {
                    anyhow::bail!("Remote images are disabled in the configuration");
                }
                Ok((ImageRef::Remote(url.clone()), "External image".to_string()))
            }
            ImageInput::File(path) => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .with_context(|| format!("Not a file path: {}", path.display()))?;
                let ext = path
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_string())
                    .unwrap_or_default();
                let Some(mime) = mime_for_extension(&ext) else {
                    anyhow::bail!("{} is not an image file", file_name);
                };

                let bytes = fs::read(path)
                    .with_context(|| format!("Failed to read image: {}", path.display()))?;

                let embed = self.config.images.mode == ImageMode::Embed;
                if embed && (bytes.len() as u64) <= self.config.images.max_embed_bytes {
                    return Ok((ImageRef::Embedded(images::data_uri(mime, &bytes)), file_name));
                }
                if embed {
                    warn!(
                        "{} is {} bytes, over the embed limit; storing it externally",
                        file_name,
                        bytes.len()
                    );
                }

                let name = self.store.generate_file_name(&file_name);
                self.store.save(&name, &bytes)?;
                Ok((ImageRef::Stored(name), file_name))
            }
        }
    }
}

/// Offset of the `index`-th slide opening marker
fn nth_slide_start(buffer: &str, index: usize) -> Option<usize> {
    slide_starts(buffer).get(index).map(|(start, _)| *start)
}
