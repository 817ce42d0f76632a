//! Periodic snapshots of the buffer being edited

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONTENT_FILE: &str = "autosave.html";
const TIMESTAMP_FILE: &str = "autosave.timestamp";

/// A saved copy of the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub content: String,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Snapshot storage for one document
#[derive(Debug)]
pub struct AutoSave {
    dir: PathBuf,
    interval: Duration,
    last_content: String,
    last_saved: Option<DateTime<Utc>>,
}

impl AutoSave {
    /// Snapshots kept in `dir`
    pub fn new(dir: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            interval,
            last_content: String::new(),
            last_saved: None,
        }
    }

    /// Snapshots for a document, kept in the platform data directory
    pub fn for_document(doc_path: &Path, interval: Duration) -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "slidekit")
            .context("Could not determine a data directory")?;
        Ok(Self::for_document_in(&dirs.data_dir().join("autosave"), doc_path, interval))
    }

    /// Snapshots for a document under `root`, one folder per absolute path
    pub fn for_document_in(root: &Path, doc_path: &Path, interval: Duration) -> Self {
        Self::new(root.join(snapshot_key(doc_path)), interval)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the interval has passed since the last snapshot
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_saved {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .map(|elapsed| elapsed >= self.interval)
                .unwrap_or(false),
        }
    }

    /// Save `content` unless it is blank or unchanged since the last snapshot.
    ///
    /// Returns whether a snapshot was written.
    pub fn save_if_changed(&mut self, content: &str) -> Result<bool> {
        if content == self.last_content || content.trim().is_empty() {
            debug!("Autosave skipped, nothing new to save");
            return Ok(false);
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create autosave folder: {}", self.dir.display()))?;
        fs::write(self.dir.join(CONTENT_FILE), content).context("Failed to write autosave")?;

        let now = Utc::now();
        fs::write(self.dir.join(TIMESTAMP_FILE), now.to_rfc3339())
            .context("Failed to write autosave timestamp")?;

        self.last_content = content.to_string();
        self.last_saved = Some(now);
        info!("Autosaved {} bytes", content.len());
        Ok(true)
    }

    /// The last snapshot, if any
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let content_path = self.dir.join(CONTENT_FILE);
        if !content_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&content_path)
            .with_context(|| format!("Failed to read autosave: {}", content_path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let saved_at = fs::read_to_string(self.dir.join(TIMESTAMP_FILE))
            .ok()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts.trim()).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Ok(Some(Snapshot { content, saved_at }))
    }

    /// Whether `current` differs from the stored snapshot
    pub fn has_unsaved_changes(&self, current: &str) -> Result<bool> {
        let saved = self.load()?.map(|s| s.content).unwrap_or_default();
        Ok(saved != current)
    }

    /// Remove the stored snapshot
    pub fn clear(&mut self) -> Result<()> {
        for file in [CONTENT_FILE, TIMESTAMP_FILE] {
            let path = self.dir.join(file);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }
        self.last_content.clear();
        self.last_saved = None;
        info!("Cleared autosave in {}", self.dir.display());
        Ok(())
    }
}

/// Folder name for a document: its absolute path with separators escaped.
///
/// The document may not exist yet, so only its parent is canonicalized.
fn snapshot_key(doc_path: &Path) -> String {
    let absolute = match (doc_path.parent(), doc_path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::canonicalize(parent)
                .map(|dir| dir.join(name))
                .unwrap_or_else(|_| doc_path.to_path_buf())
        }
        _ => doc_path.to_path_buf(),
    };

    let mut key = String::new();
    for c in absolute.to_string_lossy().chars() {
        match c {
            '%' => key.push_str("%25"),
            '/' => key.push_str("%2F"),
            '\\' => key.push_str("%5C"),
            ':' => key.push_str("%3A"),
            other => key.push(other),
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn autosave(dir: &TempDir) -> AutoSave {
        AutoSave::new(dir.path().join("snap"), Duration::from_secs(30))
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new()?;
        let mut save = autosave(&dir);

        assert!(save.load()?.is_none());
        assert!(save.save_if_changed("<div class=\"slide\"></div>")?);

        let snapshot = save.load()?.unwrap();
        assert_eq!(snapshot.content, "<div class=\"slide\"></div>");
        assert!(snapshot.saved_at.is_some());
        Ok(())
    }

    #[test]
    fn test_unchanged_and_blank_content_is_skipped() -> Result<()> {
        let dir = TempDir::new()?;
        let mut save = autosave(&dir);

        assert!(!save.save_if_changed("   \n")?);
        assert!(save.save_if_changed("a")?);
        assert!(!save.save_if_changed("a")?);
        assert!(save.save_if_changed("b")?);
        Ok(())
    }

    #[test]
    fn test_unsaved_changes() -> Result<()> {
        let dir = TempDir::new()?;
        let mut save = autosave(&dir);

        assert!(save.has_unsaved_changes("x")?);
        save.save_if_changed("x")?;
        assert!(!save.has_unsaved_changes("x")?);
        assert!(save.has_unsaved_changes("y")?);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let dir = TempDir::new()?;
        let mut save = autosave(&dir);

        save.save_if_changed("x")?;
        save.clear()?;
        assert!(save.load()?.is_none());
        // Same content is saved again after clearing
        assert!(save.save_if_changed("x")?);
        Ok(())
    }

    #[test]
    fn test_same_file_name_in_different_folders() -> Result<()> {
        let dir = TempDir::new()?;
        let root = dir.path().join("snapshots");
        for sub in ["a", "b"] {
            fs::create_dir_all(dir.path().join(sub))?;
        }
        let interval = Duration::from_secs(30);
        let mut a = AutoSave::for_document_in(&root, &dir.path().join("a/deck.html"), interval);
        let b = AutoSave::for_document_in(&root, &dir.path().join("b/deck.html"), interval);

        assert_ne!(a.dir(), b.dir());
        a.save_if_changed("from a")?;
        assert!(b.load()?.is_none());
        Ok(())
    }

    #[test]
    fn test_same_deck_shares_snapshot() -> Result<()> {
        let dir = TempDir::new()?;
        let root = dir.path().join("snapshots");
        fs::create_dir_all(dir.path().join("a"))?;
        let interval = Duration::from_secs(30);

        let direct = AutoSave::for_document_in(&root, &dir.path().join("a/deck.html"), interval);
        let dotted = AutoSave::for_document_in(&root, &dir.path().join("a/./deck.html"), interval);
        assert_eq!(direct.dir(), dotted.dir());
        assert!(!snapshot_key(&dir.path().join("a/deck.html")).contains('/'));
        Ok(())
    }

    #[test]
    fn test_is_due() -> Result<()> {
        let dir = TempDir::new()?;
        let mut save = autosave(&dir);
        assert!(save.is_due(Utc::now()));

        save.save_if_changed("x")?;
        assert!(!save.is_due(Utc::now()));
        assert!(save.is_due(Utc::now() + chrono::Duration::seconds(31)));
        Ok(())
    }
}
