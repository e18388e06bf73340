use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dropzone_core::format::{format_file_size, format_uploaded_at};
use dropzone_core::validation::content_type_for_extension;
use dropzone_core::{CandidateFile, FileEntry, FileKind, FileValidator};

const PROGRESS_BAR_WIDTH: usize = 20;

/// Truncate a string to `max_len` characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Build an intake candidate from a file on disk.
///
/// The media type comes from the extension. Bytes are only read for images
/// that `validator` would accept, since only those get a preview.
pub fn candidate_from_path(path: &Path, validator: &FileValidator) -> Result<CandidateFile> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = content_type_for_extension(&name);

    let mut candidate = CandidateFile::new(name, metadata.len(), media_type);
    if candidate.is_image() && validator.validate_file(&candidate).is_ok() {
        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        candidate.content = Some(content);
    }
    Ok(candidate)
}

/// Candidates for every readable path, plus the paths that could not be read.
pub fn collect_candidates(
    paths: &[PathBuf],
    validator: &FileValidator,
) -> (Vec<CandidateFile>, Vec<(PathBuf, anyhow::Error)>) {
    let mut candidates = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match candidate_from_path(path, validator) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => unreadable.push((path.clone(), e)),
        }
    }
    (candidates, unreadable)
}

/// Render `[#########-----------]  45%`.
pub fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100);
    let filled = PROGRESS_BAR_WIDTH * percent as usize / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        percent
    )
}

pub fn print_file_table(entries: &[FileEntry]) {
    if entries.is_empty() {
        println!("No files found.");
        return;
    }

    println!(
        "{:>6}  {:<30} {:<12} {:>10} {:<10} {:>4}  {:<24}",
        "ID", "Name", "Kind", "Size", "Status", "%", "Uploaded At"
    );
    println!("{}", "-".repeat(104));

    for entry in entries {
        println!(
            "{:>6}  {:<30} {:<12} {:>10} {:<10} {:>4}  {:<24}",
            entry.id.to_string(),
            truncate_string(&entry.name, 30),
            FileKind::from_media_type(&entry.media_type).label(),
            format_file_size(entry.size),
            entry.status.as_str(),
            entry.progress,
            entry
                .uploaded_at
                .as_ref()
                .map(format_uploaded_at)
                .unwrap_or_else(|| "-".to_string()),
        );
    }
}

pub fn print_file_details(entry: &FileEntry) {
    println!("ID:          {}", entry.id);
    println!("Name:        {}", entry.name);
    println!("Type:        {}", entry.media_type);
    println!(
        "Kind:        {}",
        FileKind::from_media_type(&entry.media_type).label()
    );
    println!("Size:        {}", format_file_size(entry.size));
    println!("Status:      {}", entry.status);
    println!("Progress:    {}%", entry.progress);
    if let Some(uploaded_at) = &entry.uploaded_at {
        println!("Uploaded At: {}", format_uploaded_at(uploaded_at));
    }
    match &entry.preview {
        Some(preview) => println!("Preview:     {}", truncate_string(preview, 48)),
        None => println!("Preview:     none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
        assert_eq!(truncate_string("résumé-final.pdf", 9), "résumé...");
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0), format!("[{}]   0%", "-".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}]  50%", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(20)));
    }

    #[test]
    fn candidate_reads_image_bytes_only() {
        let dir = tempfile::tempdir().unwrap();

        let png_path = dir.path().join("Photo.PNG");
        std::fs::File::create(&png_path)
            .unwrap()
            .write_all(&[0x89, b'P', b'N', b'G'])
            .unwrap();
        let validator = FileValidator::default();
        let png = candidate_from_path(&png_path, &validator).unwrap();
        assert_eq!(png.name, "Photo.PNG");
        assert_eq!(png.media_type, "image/png");
        assert_eq!(png.size, 4);
        assert!(png.preview_data_url().is_some());

        let csv_path = dir.path().join("data.csv");
        std::fs::write(&csv_path, "a,b\n1,2\n").unwrap();
        let csv = candidate_from_path(&csv_path, &validator).unwrap();
        assert_eq!(csv.media_type, "text/csv");
        assert!(csv.content.is_none());

        assert!(candidate_from_path(dir.path(), &validator).is_err());
        assert!(candidate_from_path(&dir.path().join("missing.txt"), &validator).is_err());
    }

    #[test]
    fn oversized_image_is_not_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let validator = FileValidator::new(8, vec!["image/png".to_string()]);
        let candidate = candidate_from_path(&path, &validator).unwrap();
        assert_eq!(candidate.size, 16);
        assert!(candidate.content.is_none());
        assert!(validator.validate_file(&candidate).is_err());
    }

    #[test]
    fn unreadable_paths_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("notes.txt");
        std::fs::write(&good, "hello").unwrap();
        let missing = dir.path().join("missing.pdf");

        let (candidates, unreadable) = collect_candidates(
            &[missing.clone(), good, dir.path().to_path_buf()],
            &FileValidator::default(),
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "notes.txt");
        assert_eq!(unreadable.len(), 2);
        assert_eq!(unreadable[0].0, missing);
    }
}
