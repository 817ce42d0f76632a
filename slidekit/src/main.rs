//! slidekit - edit HTML slide decks from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use slidekit_core::config::ImageMode;
use slidekit_core::diff::{change_counts, unified_diff};
use slidekit_core::template::default_document;
use slidekit_core::{extract_fragments, locate_slide, slide_spans, Config, Document, Period};
use slidekit_editor::{AutoSave, EditorSession, ImageInput};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Edit HTML slide decks: add, delete and renumber slides, insert images
#[derive(Parser, Debug)]
#[command(name = "slidekit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Cursor position inside the deck
#[derive(clap::Args, Debug, Default)]
struct CursorArgs {
    /// Character offset
    #[arg(long, conflicts_with_all = ["line", "column"])]
    offset: Option<usize>,
    /// 1-based line
    #[arg(long, requires = "column")]
    line: Option<usize>,
    /// 1-based column, in characters
    #[arg(long, requires = "line")]
    column: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a starter deck
    New {
        file: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Add a slide after the slide under the cursor (default: after the last slide)
    AddSlide {
        file: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
        /// Print the change as a diff instead of saving it
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete the slide under the cursor
    DeleteSlide {
        file: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
        #[arg(long)]
        dry_run: bool,
    },
    /// Insert an image; the slide under the cursor switches to the split layout
    InsertImage {
        file: PathBuf,
        /// Local image file
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        image: Option<PathBuf>,
        /// Remote http(s) image
        #[arg(long)]
        url: Option<String>,
        /// Embed the image as a data URI
        #[arg(long)]
        embed: bool,
        #[command(flatten)]
        cursor: CursorArgs,
        /// Print the change as a diff (remote images only, files would be stored)
        #[arg(long, requires = "url")]
        dry_run: bool,
    },
    /// Renumber every footer
    Renumber {
        file: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Move embedded images into the image folder
    Externalize { file: PathBuf },
    /// Write a self-contained copy with stored images inlined
    Preview {
        file: PathBuf,
        /// Output file (default: <file>.preview.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Regenerate the preview whenever the deck changes
        #[arg(long)]
        watch: bool,
    },
    /// Copy the deck, with stored images inlined, to the clipboard
    Copy { file: PathBuf },
    /// Show the slide under the cursor
    Locate {
        file: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
    },
    /// List stored images
    Images {
        file: PathBuf,
        /// Delete a stored image
        #[arg(long, value_name = "NAME")]
        delete: Option<String>,
    },
    /// Put back the version saved before the last edit
    Restore {
        file: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().context("Failed to load configuration")?,
    };
    debug!("Using config {:?}", config);

    match args.command {
        Command::New { file, force } => new_deck(&file, &config, force),
        Command::AddSlide {
            file,
            cursor,
            dry_run,
        } => edit(&file, config, &cursor, dry_run, |session| {
            session.add_slide();
            Ok(format!("Added slide {}", current_slide_number(session)))
        }),
        Command::DeleteSlide {
            file,
            cursor,
            dry_run,
        } => {
            require_cursor(&cursor)?;
            edit(&file, config, &cursor, dry_run, |session| {
                if !session.delete_slide() {
                    anyhow::bail!("The cursor is not inside a slide");
                }
                Ok(format!("Deleted slide, {} left", session.doc.slide_count()))
            })
        }
        Command::InsertImage {
            file,
            image,
            url,
            embed,
            cursor,
            dry_run,
        } => {
            let mut config = config;
            if embed {
                config.images.mode = ImageMode::Embed;
            }
            let input = match (image, url) {
                (Some(path), _) => ImageInput::File(path),
                (None, Some(url)) => ImageInput::Url(url),
                (None, None) => anyhow::bail!("Either --image or --url is required"),
            };
            require_cursor(&cursor)?;
            edit(&file, config, &cursor, dry_run, |session| {
                let inserted = session.insert_image(&input)?;
                Ok(if inserted.split {
                    format!("Inserted image into slide {}", current_slide_number(session))
                } else {
                    "Cursor is not inside a slide, inserted a stand-alone image block".to_string()
                })
            })
        }
        Command::Renumber { file, dry_run } => {
            edit(&file, config, &CursorArgs::default(), dry_run, |session| {
                session.renumber();
                Ok(format!("Renumbered {} slides", session.doc.slide_count()))
            })
        }
        Command::Externalize { file } => {
            edit(&file, config, &CursorArgs::default(), false, |session| {
                let count = session.externalize_images()?;
                Ok(format!(
                    "Moved {} images to {}",
                    count,
                    session.store().dir().display()
                ))
            })
        }
        Command::Preview {
            file,
            output,
            watch,
        } => {
            let output = output.unwrap_or_else(|| file.with_extension("preview.html"));
            preview(&file, &output, &config)?;
            if watch {
                watch_preview(&file, &output, &config)?;
            }
            Ok(())
        }
        Command::Copy { file } => copy(&file, config),
        Command::Locate { file, cursor } => {
            require_cursor(&cursor)?;
            locate(&file, config, &cursor)
        }
        Command::Images { file, delete } => images(&file, config, delete.as_deref()),
        Command::Restore { file, dry_run } => restore(&file, &config, dry_run),
    }
}

fn new_deck(file: &Path, config: &Config, force: bool) -> Result<()> {
    if file.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", file.display());
    }
    let text = default_document(&config.footer.page_style(), Period::current());
    let doc = Document::from_text(file, &text);
    doc.save()?;
    println!("Created {} ({})", file.display(), doc.status_line());
    Ok(())
}

/// Open a session, run `op` on it and save, or print the diff on a dry run.
///
/// The previous contents go to the autosave snapshot so `restore` can undo.
fn edit<F>(file: &Path, config: Config, cursor: &CursorArgs, dry_run: bool, op: F) -> Result<()>
where
    F: FnOnce(&mut EditorSession) -> Result<String>,
{
    let autosave_enabled = config.autosave.enabled;
    let interval = Duration::from_secs(config.autosave.interval_secs);

    let mut session = EditorSession::open(file, config)?;
    place_cursor(&mut session, cursor);
    let before = session.text();

    let message = op(&mut session)?;
    let after = session.text();

    if dry_run {
        let diff = unified_diff(&before, &after, &file.display().to_string());
        if diff.is_empty() {
            println!("No changes");
        } else {
            let (inserted, deleted) = change_counts(&before, &after);
            print!("{}", diff);
            println!("{} ({} lines added, {} removed)", message, inserted, deleted);
        }
        return Ok(());
    }

    if before == after {
        println!("{} (no changes)", message);
        return Ok(());
    }

    if autosave_enabled {
        let mut autosave = AutoSave::for_document(file, interval)?;
        autosave.save_if_changed(&before)?;
    }
    session.save()?;
    info!("Saved {} (rev {})", file.display(), session.doc.rev);
    println!("{} - {}", message, session.doc.status_line());
    Ok(())
}

fn require_cursor(cursor: &CursorArgs) -> Result<()> {
    if cursor.offset.is_none() && cursor.line.is_none() {
        anyhow::bail!("A cursor position is required (--offset, or --line with --column)");
    }
    Ok(())
}

/// Without a position the cursor sits at the end of the deck
fn place_cursor(session: &mut EditorSession, cursor: &CursorArgs) {
    match (cursor.offset, cursor.line, cursor.column) {
        (Some(offset), _, _) => session.set_cursor_char(offset),
        (None, Some(line), Some(column)) => session.set_cursor_line_col(line, column),
        _ => session.set_cursor(usize::MAX),
    }
}

/// 1-based number of the slide under the session cursor, 0 if none
fn current_slide_number(session: &EditorSession) -> usize {
    let text = session.text();
    slide_spans(&text)
        .iter()
        .position(|span| span.contains(session.cursor()))
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

fn preview(file: &Path, output: &Path, config: &Config) -> Result<()> {
    let session = EditorSession::open(file, config.clone())?;
    fs::write(output, session.preview_html())
        .with_context(|| format!("Failed to write preview: {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

#[cfg(feature = "watch")]
fn watch_preview(file: &Path, output: &Path, config: &Config) -> Result<()> {
    use slidekit_editor::{DeckWatcher, ImageStore};

    let images = ImageStore::for_document(file, &config.images.folder);
    let mut watcher = DeckWatcher::new(file, images.dir())?;
    let interval = Duration::from_secs(config.autosave.interval_secs);
    let mut autosave = AutoSave::for_document(file, interval)?;
    println!(
        "Watching {} and {} (Ctrl-C to stop)",
        file.display(),
        images.dir().display()
    );

    loop {
        std::thread::sleep(Duration::from_millis(100));
        let Some(changes) = watcher.poll(Duration::from_millis(250)) else {
            continue;
        };
        debug!("Change detected: {:?}", changes);

        if let Err(e) = preview(file, output, config) {
            eprintln!("Failed to regenerate preview: {:#}", e);
            continue;
        }
        if changes.deck && config.autosave.enabled && autosave.is_due(chrono::Utc::now()) {
            let text = Document::load(file)?.text();
            autosave.save_if_changed(&text)?;
        }
    }
}

#[cfg(not(feature = "watch"))]
fn watch_preview(_file: &Path, _output: &Path, _config: &Config) -> Result<()> {
    anyhow::bail!("slidekit was built without the `watch` feature")
}

#[cfg(feature = "clipboard")]
fn copy(file: &Path, config: Config) -> Result<()> {
    let session = EditorSession::open(file, config)?;
    slidekit_editor::copy_to_clipboard(&session.preview_html())?;
    println!("Copied {} to the clipboard", file.display());
    Ok(())
}

#[cfg(not(feature = "clipboard"))]
fn copy(_file: &Path, _config: Config) -> Result<()> {
    anyhow::bail!("slidekit was built without the `clipboard` feature")
}

fn locate(file: &Path, config: Config, cursor: &CursorArgs) -> Result<()> {
    let mut session = EditorSession::open(file, config)?;
    place_cursor(&mut session, cursor);

    let text = session.text();
    let Some(span) = locate_slide(&text, session.cursor()) else {
        println!("The cursor is not inside a slide");
        return Ok(());
    };

    let number = current_slide_number(&session);
    let fragments = extract_fragments(&span.content);
    println!(
        "Slide {}/{}: chars {}..{}{}",
        number,
        session.doc.slide_count(),
        session.doc.offset_to_char(span.start),
        session.doc.offset_to_char(span.end),
        if span.is_split() { " (split layout)" } else { "" }
    );
    if let Some(title) = fragments.title {
        println!("  title:  {}", title);
    }
    if let Some(footer) = fragments.footer {
        println!("  footer: {}", footer.split_whitespace().collect::<Vec<_>>().join(" "));
    }
    Ok(())
}

fn images(file: &Path, config: Config, delete: Option<&str>) -> Result<()> {
    let session = EditorSession::open(file, config)?;
    let store = session.store();

    if let Some(name) = delete {
        store.delete(name)?;
        println!("Deleted {}", name);
        return Ok(());
    }

    let stored = store.list()?;
    if stored.is_empty() {
        println!("No stored images in {}", store.dir().display());
        return Ok(());
    }

    let text = session.text();
    for image in stored {
        let marker = if text.contains(&image.name) { "" } else { "  (unused)" };
        println!("{:>10}  {}{}", image.size, image.name, marker);
    }
    Ok(())
}

fn restore(file: &Path, config: &Config, dry_run: bool) -> Result<()> {
    let autosave = AutoSave::for_document(file, Duration::from_secs(config.autosave.interval_secs))?;
    let Some(snapshot) = autosave.load()? else {
        println!("Nothing to restore for {}", file.display());
        return Ok(());
    };

    let mut doc = Document::load(file)?;
    let current = doc.text();
    if !autosave.has_unsaved_changes(&current)? {
        println!("{} already matches the saved version", file.display());
        return Ok(());
    }

    if dry_run {
        print!("{}", unified_diff(&current, &snapshot.content, &file.display().to_string()));
        return Ok(());
    }

    doc.replace(&snapshot.content);
    doc.save()?;
    match snapshot.saved_at {
        Some(at) => println!("Restored {} from {}", file.display(), at.to_rfc3339()),
        None => println!("Restored {}", file.display()),
    }
    Ok(())
}
