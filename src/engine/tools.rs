//! Path, classification and filter utilities

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ThumbError;
use crate::utils::config::SNIFF_LEN;

/// MIME reported for content no image format matched: text when the head is printable UTF-8.
const TEXT_MIME: &str = "text/plain";
const BINARY_MIME: &str = "application/octet-stream";

/// Sniff the content type of the file at `path` from its first [`SNIFF_LEN`] bytes.
/// Only read failures are errors; unknown content yields a non-image MIME.
pub fn classify(path: &Path) -> Result<String, ThumbError> {
    let classify_err = |source| ThumbError::Classification {
        path: path.to_path_buf(),
        source: Arc::new(source),
    };
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)
        .map_err(classify_err)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .map_err(classify_err)?;
    Ok(sniff_mime(&head).to_string())
}

/// Content type for a file head.
pub fn sniff_mime(head: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(head) {
        return format.to_mime_type();
    }
    if looks_like_text(head) {
        TEXT_MIME
    } else {
        BINARY_MIME
    }
}

fn looks_like_text(head: &[u8]) -> bool {
    // A multi-byte char may be cut at the sniff boundary.
    let valid = match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    };
    valid
        && !head
            .iter()
            .any(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c))
}

/// Where the thumbnail for `source` goes: `output_dir` joined with the source's base filename.
pub fn destination_for(output_dir: &Path, source: &Path) -> Option<PathBuf> {
    source.file_name().map(|name| output_dir.join(name))
}

/// True if `path` is `dir` or lies beneath it. Both should be canonical.
pub fn is_within(path: &Path, dir: &Path) -> bool {
    path.starts_with(dir)
}

/// Canonicalize the walk root and make sure it is a directory.
pub fn canonicalize_root(root: &Path) -> Result<PathBuf> {
    let canonical = root
        .canonicalize()
        .with_context(|| format!("canonicalize root {}", root.display()))?;
    if !canonical.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }
    Ok(canonical)
}

/// Canonical form of the output directory if it already exists (used to keep the walk out of it).
pub fn canonical_output_dir(output_dir: &Path) -> Option<PathBuf> {
    output_dir.canonicalize().ok()
}
