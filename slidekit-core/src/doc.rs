//! Document model with Rope-based text storage

use anyhow::{Context, Result};
use ropey::Rope;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::locate::count_slides;

/// A slide deck held in memory
#[derive(Clone)]
pub struct Document {
    pub path: PathBuf,
    pub rope: Rope,
    pub rev: u64,
}

impl Document {
    /// Load a document from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            rope: Rope::from_str(&content),
            rev: 1,
        })
    }

    /// Create an unsaved document with the given text
    pub fn from_text(path: &Path, text: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            rope: Rope::from_str(text),
            rev: 1,
        }
    }

    /// Write the document back to its path.
    ///
    /// The text goes to a sibling temp file first and is then renamed over the
    /// target, so a failed write never leaves a truncated deck behind.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = self
            .path
            .file_name()
            .with_context(|| format!("Not a file path: {}", self.path.display()))?;
        let tmp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));

        {
            let mut file = fs::File::create(&tmp_path)
                .with_context(|| format!("Failed to create file: {}", tmp_path.display()))?;
            self.rope
                .write_to(&mut file)
                .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
            file.flush()?;
        }

        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace file: {}", self.path.display()))?;
        Ok(())
    }

    /// The whole buffer as a string
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the whole buffer
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.rev += 1;
    }

    /// Get the number of lines in the document
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Number of slide opening markers
    pub fn slide_count(&self) -> usize {
        count_slides(&self.text())
    }

    /// Byte offset of a character offset, clamped to the end of the buffer
    pub fn char_to_offset(&self, char_idx: usize) -> usize {
        let char_idx = char_idx.min(self.rope.len_chars());
        self.rope.char_to_byte(char_idx)
    }

    /// Character offset of a byte offset, clamped to the end of the buffer
    pub fn offset_to_char(&self, offset: usize) -> usize {
        let offset = offset.min(self.rope.len_bytes());
        self.rope.byte_to_char(offset)
    }

    /// Byte offset of a 1-based line and column (column counted in characters).
    ///
    /// Lines past the end clamp to the end of the buffer; columns past the end
    /// of a line clamp to that line's end.
    pub fn line_col_to_offset(&self, line: usize, column: usize) -> usize {
        let line_idx = line.saturating_sub(1);
        if line_idx >= self.rope.len_lines() {
            return self.rope.len_bytes();
        }

        let line_start = self.rope.line_to_char(line_idx);
        let line_slice = self.rope.line(line_idx);
        let mut line_len = line_slice.len_chars();
        if line_len > 0 && line_slice.char(line_len - 1) == '\n' {
            line_len -= 1;
        }

        let col = column.saturating_sub(1).min(line_len);
        self.rope.char_to_byte(line_start + col)
    }

    /// Short summary for status output
    pub fn status_line(&self) -> String {
        format!(
            "{} lines, {} chars, {} slides",
            self.line_count(),
            self.rope.len_chars(),
            self.slide_count()
        )
    }
}
