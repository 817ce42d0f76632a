//! Change notifications for a deck and its image folder

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What changed since the last report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeckChanges {
    /// The deck file was written, created or renamed into place
    pub deck: bool,
    /// A stored image was added, rewritten or removed
    pub images: bool,
}

impl DeckChanges {
    fn merge(&mut self, other: DeckChanges) {
        self.deck |= other.deck;
        self.images |= other.images;
    }
}

/// Files whose changes affect a rendered deck
#[derive(Debug, Clone)]
struct Targets {
    deck: PathBuf,
    images: PathBuf,
}

impl Targets {
    /// Which target an event touches, if any
    fn classify(&self, event: &Event) -> DeckChanges {
        let relevant = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        );
        if !relevant {
            return DeckChanges::default();
        }

        let mut changes = DeckChanges::default();
        for path in &event.paths {
            if path == &self.deck {
                // A removed deck is the first half of a save by rename
                changes.deck |= !matches!(event.kind, EventKind::Remove(_));
            } else if path.starts_with(&self.images) && path != &self.images {
                changes.images = true;
            }
        }
        changes
    }
}

/// Watches a deck and its image folder, reporting changes once they settle.
///
/// The deck's folder is watched rather than the file so that saves done by
/// renaming a temp file over the deck are seen. The image folder is only
/// watched when it exists at startup.
pub struct DeckWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<DeckChanges>,
    targets: Targets,
    pending: DeckChanges,
    settled_at: Option<Instant>,
}

impl DeckWatcher {
    pub fn new(deck: &Path, image_dir: &Path) -> Result<Self> {
        let targets = Targets {
            deck: absolute(deck),
            images: absolute(image_dir),
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut watcher = spawn_watcher(targets.clone(), tx)?;

        let deck_dir = targets
            .deck
            .parent()
            .context("Deck path has no parent folder")?
            .to_path_buf();
        watcher
            .watch(&deck_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", deck_dir.display()))?;

        if targets.images.is_dir() {
            watcher
                .watch(&targets.images, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {}", targets.images.display()))?;
        } else {
            debug!("No image folder at {}, not watching it", targets.images.display());
        }

        Ok(Self {
            _watcher: watcher,
            events: rx,
            targets,
            pending: DeckChanges::default(),
            settled_at: None,
        })
    }

    /// Changes seen so far, once no new event has arrived for `quiet`
    pub fn poll(&mut self, quiet: Duration) -> Option<DeckChanges> {
        for changes in self.events.try_iter() {
            self.pending.merge(changes);
            self.settled_at = Some(Instant::now() + quiet);
        }

        let settled_at = self.settled_at?;
        if Instant::now() < settled_at {
            return None;
        }
        self.settled_at = None;
        Some(std::mem::take(&mut self.pending))
    }

    pub fn deck(&self) -> &Path {
        &self.targets.deck
    }

    pub fn image_dir(&self) -> &Path {
        &self.targets.images
    }
}

fn spawn_watcher(targets: Targets, tx: Sender<DeckChanges>) -> Result<RecommendedWatcher> {
    notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let changes = targets.classify(&event);
            if changes != DeckChanges::default() {
                let _ = tx.send(changes);
            }
        }
        Err(e) => warn!("File watch error: {}", e),
    })
    .context("Failed to create file watcher")
}

/// Absolute form of a path, canonicalizing whatever part of it exists
fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            absolute(parent).join(name)
        }
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn targets() -> Targets {
        Targets {
            deck: PathBuf::from("/decks/talk.html"),
            images: PathBuf::from("/decks/images"),
        }
    }

    #[test]
    fn test_classify_deck_and_images() {
        let t = targets();

        let write = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(t.deck.clone());
        assert_eq!(t.classify(&write), DeckChanges { deck: true, images: false });

        let added = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/decks/images/image_1_1.png"));
        assert_eq!(t.classify(&added), DeckChanges { deck: false, images: true });

        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/decks/images/old.png"));
        assert!(t.classify(&removed).images);
    }

    #[test]
    fn test_classify_ignores_unrelated_files() {
        let t = targets();
        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/decks/other.html"));
        assert_eq!(t.classify(&other), DeckChanges::default());

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(t.deck.clone());
        assert_eq!(t.classify(&access), DeckChanges::default());

        let deck_removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(t.deck.clone());
        assert!(!t.classify(&deck_removed).deck);
    }

    #[test]
    fn test_rename_over_deck_counts_as_deck_change() {
        let t = targets();
        let rename = Event::new(EventKind::Modify(ModifyKind::Name(
            notify::event::RenameMode::Both,
        )))
        .add_path(PathBuf::from("/decks/.talk.html.tmp"))
        .add_path(t.deck.clone());
        assert!(t.classify(&rename).deck);
    }

    #[test]
    fn test_new_watcher_paths() -> Result<()> {
        let dir = TempDir::new()?;
        let deck = dir.path().join("deck.html");
        fs::write(&deck, "<div class=\"slide\"></div>")?;

        let mut watcher = DeckWatcher::new(&deck, &dir.path().join("images"))?;
        assert!(watcher.deck().is_absolute());
        assert!(watcher.image_dir().ends_with("images"));
        assert_eq!(watcher.poll(Duration::ZERO), None);
        Ok(())
    }

    #[test]
    #[ignore] // File system events can be unreliable in test environments
    fn test_image_change_is_reported() -> Result<()> {
        let dir = TempDir::new()?;
        let deck = dir.path().join("deck.html");
        let images = dir.path().join("images");
        fs::write(&deck, "")?;
        fs::create_dir_all(&images)?;

        let mut watcher = DeckWatcher::new(&deck, &images)?;
        fs::write(images.join("a.png"), b"png")?;

        for _ in 0..20 {
            thread::sleep(Duration::from_millis(100));
            if let Some(changes) = watcher.poll(Duration::from_millis(50)) {
                assert!(changes.images);
                return Ok(());
            }
        }
        panic!("no change reported in {}", images.display());
    }
}
