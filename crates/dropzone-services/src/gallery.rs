//! Gallery of completed uploads.

use dropzone_core::format::format_file_size;
use dropzone_core::{FileEntry, FileId};
use serde::Serialize;
use std::fmt;

/// Completed entries only, newest first, one per id.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    entries: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryStats {
    pub count: usize,
    pub total_size: u64,
    pub total_size_display: String,
}

impl fmt::Display for GalleryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.count == 1 { "file" } else { "files" };
        write!(
            f,
            "{} {}, {} total",
            self.count, noun, self.total_size_display
        )
    }
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from store records, dropping anything not completed.
    pub fn from_records(records: impl IntoIterator<Item = FileEntry>) -> Self {
        let mut gallery = Self::new();
        for record in records {
            gallery.insert(record);
        }
        gallery.sort();
        gallery
    }

    /// Add a store-confirmed completed entry. Replaces an existing entry with
    /// the same id. Returns `false` for entries that are not completed.
    pub fn promote(&mut self, entry: FileEntry) -> bool {
        if !self.insert(entry) {
            return false;
        }
        self.sort();
        true
    }

    pub fn remove(&mut self, id: FileId) -> Option<FileEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: FileId) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> GalleryStats {
        let total_size = self.entries.iter().map(|e| e.size).sum();
        GalleryStats {
            count: self.entries.len(),
            total_size,
            total_size_display: format_file_size(total_size),
        }
    }

    fn insert(&mut self, entry: FileEntry) -> bool {
        if !entry.is_completed() {
            return false;
        }
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        true
    }

    fn sort(&mut self) {
        // Missing timestamps sort last
        self.entries
            .sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
    }
}
