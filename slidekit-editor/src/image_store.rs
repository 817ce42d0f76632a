//! On-disk store for images referenced by a deck

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use slidekit_core::images::{data_uri, mime_for_extension};

/// An image file held in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub name: String,
    pub size: u64,
}

/// Image folder next to a document.
///
/// One store lives for one editing session; its counter keeps generated names
/// unique even when several images are added within the same millisecond.
#[derive(Debug)]
pub struct ImageStore {
    dir: PathBuf,
    counter: u32,
}

impl ImageStore {
    /// Store rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: 1,
        }
    }

    /// Store for the image folder configured relative to a document
    pub fn for_document(doc_path: &Path, folder: &str) -> Self {
        let doc_dir = doc_path.parent().unwrap_or_else(|| Path::new("."));
        Self::new(doc_dir.join(folder.trim_end_matches('/')))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `image_<millis>_<counter>.<ext>` for an original file name
    pub fn generate_file_name(&mut self, original: &str) -> String {
        let ext = original
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && !ext.contains('/'))
            .unwrap_or_else(|| "png".to_string());
        let name = format!(
            "image_{}_{}.{}",
            chrono::Utc::now().timestamp_millis(),
            self.counter,
            ext
        );
        self.counter += 1;
        name
    }

    /// Write image bytes under `name`
    pub fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create image folder: {}", self.dir.display()))?;
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write image: {}", path.display()))?;
        info!("Stored image {} ({} bytes)", name, bytes.len());
        Ok(path)
    }

    /// Read the bytes stored under `name`
    pub fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        fs::read(&path).with_context(|| format!("Failed to read image: {}", path.display()))
    }

    /// The stored image as a data URI, or `None` when it is missing
    pub fn data_uri(&self, name: &str) -> Option<String> {
        let ext = name.rsplit_once('.').map(|(_, ext)| ext)?;
        let mime = mime_for_extension(ext)?;
        let bytes = self.load(name).ok()?;
        Some(data_uri(mime, &bytes))
    }

    /// Every stored image, sorted by name
    pub fn list(&self) -> Result<Vec<StoredImage>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut images = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list image folder: {}", self.dir.display()))?
        {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                images.push(StoredImage {
                    name: entry.file_name().to_string_lossy().to_string(),
                    size: metadata.len(),
                });
            }
        }
        images.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(images)
    }

    /// Remove a stored image
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete image: {}", path.display()))?;
        info!("Deleted image {}", name);
        Ok(())
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') || name.contains("..") {
            anyhow::bail!("Invalid image name: {}", name);
        }
        Ok(self.dir.join(name))
    }
}
