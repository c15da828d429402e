use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::config::Config;
use crate::model::document::TaskDocument;
use crate::parse::parse_document;

/// Error type for document I/O operations
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse reqmark.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Legacy status-marker spellings and their canonical forms.
const LEGACY_MARKERS: [(&str, &str); 2] = [
    ("[Finished]", "[completed]"),
    ("[Processing]", "[in_progress]"),
];

/// Rewrite legacy status markers to their canonical spellings.
/// Returns `None` when the text is already canonical.
pub fn normalize_status_markers(text: &str) -> Option<String> {
    let mut out = text.to_string();
    let mut changed = false;
    for (legacy, canonical) in LEGACY_MARKERS {
        if out.contains(legacy) {
            out = out.replace(legacy, canonical);
            changed = true;
        }
    }
    changed.then_some(out)
}

/// Write via a temp file in the same directory, then rename into place, so
/// a crash mid-write never leaves a truncated document.
pub fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a document's text. With `normalize` set, legacy status markers are
/// rewritten to canonical spellings and the file is updated on disk before
/// the text is returned, so parsing always sees canonical markers.
pub fn read_document_text(path: &Path, normalize: bool) -> Result<String, DocumentError> {
    let text = fs::read_to_string(path).map_err(|e| DocumentError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if normalize
        && let Some(normalized) = normalize_status_markers(&text)
    {
        atomic_write(path, normalized.as_bytes()).map_err(|e| DocumentError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        return Ok(normalized);
    }

    Ok(text)
}

/// Load and parse a task document.
pub fn load_document(path: &Path, config: &Config) -> Result<TaskDocument, DocumentError> {
    let text = read_document_text(path, config.parse.normalize_legacy)?;
    Ok(parse_document(&text, path))
}
