use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Link totals for one task: how many `[text](target)` constructs were
/// found, and how many targets resolve to an existing filesystem entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub count: usize,
    pub exists: usize,
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]\(([^)]*)\)").expect("invalid link regex"))
}

/// Collect the targets of all link constructs in `text`, in order.
/// In-document anchors (`#...`) and `mailto:` targets are not filesystem
/// references and are excluded entirely.
pub fn scan_targets(text: &str) -> Vec<String> {
    link_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|target| !target.starts_with('#') && !target.starts_with("mailto:"))
        .map(|target| target.to_string())
        .collect()
}

/// Decode percent escapes, at most twice, tolerating double-encoded targets.
/// A decode pass that fails (bad hex, invalid UTF-8) leaves the value as it
/// was; the target then simply fails the existence test.
fn decode_target(target: &str) -> String {
    let mut current = target.to_string();
    for _ in 0..2 {
        match percent_decode(&current) {
            Some(decoded) if decoded != current => current = decoded,
            _ => break,
        }
    }
    current
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16))?;
            let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16))?;
            out.push((hi * 16 + lo) as u8);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Windows-style drive-rooted path (`C:\...` or `C:/...`), which must not be
/// joined onto the base directory even though it is not absolute on Unix.
fn is_drive_rooted(target: &str) -> bool {
    let bytes = target.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Resolve a link target to the path whose existence should be tested.
/// A `file://` scheme prefix is stripped; relative targets resolve against
/// `base_dir`, the directory containing the owning document.
pub fn resolve_target(target: &str, base_dir: &Path) -> PathBuf {
    let stripped = target.strip_prefix("file://").unwrap_or(target);
    let decoded = decode_target(stripped);
    let path = Path::new(&decoded);
    if path.is_absolute() || is_drive_rooted(&decoded) {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Does the target resolve to an existing filesystem entry? Filesystem
/// errors during the check count as "does not exist".
pub fn target_exists(target: &str, base_dir: &Path) -> bool {
    std::fs::metadata(resolve_target(target, base_dir)).is_ok()
}

/// Compute link stats for arbitrary text against a base directory. One of
/// the two pure helper entry points used by external edit logic.
pub fn link_stats(text: &str, base_dir: &Path) -> LinkStats {
    let targets = scan_targets(text);
    let exists = targets
        .iter()
        .filter(|target| target_exists(target, base_dir))
        .count();
    LinkStats {
        count: targets.len(),
        exists,
    }
}

/// Targets in `text` that do not resolve to an existing entry, in order.
pub fn broken_targets(text: &str, base_dir: &Path) -> Vec<String> {
    scan_targets(text)
        .into_iter()
        .filter(|target| !target_exists(target, base_dir))
        .collect()
}
