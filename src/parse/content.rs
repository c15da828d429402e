use regex::Regex;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use crate::model::task::TaskNode;
use crate::parse::links;
use crate::parse::tokenizer::{Token, TokenKind, tokenize};

/// Error from the caller-visible boundary lookup. Not finding a task is a
/// recoverable condition the caller reports to its user, not a panic path.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
}

fn status_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(?:completed|in_progress)\]").expect("invalid status regex"))
}

fn inline_ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"R\d+(?:\.\d+)*").expect("invalid identifier regex"))
}

fn link_construct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]\([^)]*\)").expect("invalid link regex"))
}

/// Build a complete task node from its declaration token. The body spans
/// every line strictly between the declaration and `next_decl_line`, the
/// line of the next task declaration in document order (of any depth).
pub fn make_task(
    id: &str,
    decl: &Token,
    next_decl_line: usize,
    lines: &[&str],
    path: &Path,
) -> TaskNode {
    let body = body_text(lines, decl.line + 1, next_decl_line);
    let completed = decl.raw.contains("[completed]");
    let in_progress = decl.raw.contains("[in_progress]");

    let base_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
    let scan_text = format!("{}\n{}", decl.raw, body);
    let stats = links::link_stats(&scan_text, &base_dir);

    TaskNode {
        id: id.to_string(),
        title: display_title(&decl.raw),
        body,
        completed,
        in_progress,
        children: Vec::new(),
        line: decl.line,
        file_path: path.to_path_buf(),
        link_count: stats.count,
        link_exists: stats.exists,
    }
}

/// Join the body lines, each trimmed of trailing whitespace, with leading
/// and trailing blank lines dropped and interior blanks preserved.
pub fn body_text(lines: &[&str], start: usize, end: usize) -> String {
    let end = end.min(lines.len());
    if start >= end {
        return String::new();
    }
    let trimmed: Vec<&str> = lines[start..end].iter().map(|l| l.trim_end()).collect();
    let mut lo = 0;
    let mut hi = trimmed.len();
    while lo < hi && trimmed[lo].is_empty() {
        lo += 1;
    }
    while hi > lo && trimmed[hi - 1].is_empty() {
        hi -= 1;
    }
    trimmed[lo..hi].join("\n")
}

/// Derive the display title from a declaration line: mask link constructs
/// so their literal brackets survive, drop status markers, drop the first
/// identifier occurrence, drop the leading `#` markers, then unmask.
pub fn display_title(raw: &str) -> String {
    let mut masked: Vec<String> = Vec::new();
    let working = link_construct_re()
        .replace_all(raw, |caps: &regex::Captures| {
            masked.push(caps[0].to_string());
            format!("\u{0}{}\u{0}", masked.len() - 1)
        })
        .into_owned();

    let working = status_marker_re().replace_all(&working, "").into_owned();
    let working = inline_ident_re().replace(&working, "").into_owned();
    let working = working.trim_start().trim_start_matches('#');

    let mut title = working.to_string();
    for (index, link) in masked.iter().enumerate() {
        title = title.replace(&format!("\u{0}{}\u{0}", index), link);
    }
    title.trim().to_string()
}

/// Locate the exact line range owned by identifier `id` in `text`: from its
/// declaration line through all of its dot-descendants, ending at the next
/// declaration whose identifier is not prefixed by `id + "."`. This is the
/// boundary used by external splice-edit logic; the prefix check keeps `R10`
/// from reading as a descendant of `R1`. 0-indexed, exclusive end.
pub fn locate(text: &str, id: &str) -> Result<Range<usize>, LocateError> {
    let tokens = tokenize(text);
    let decls: Vec<(usize, &str)> = tokens
        .iter()
        .filter_map(|t| match &t.kind {
            TokenKind::TaskDecl { id } => Some((t.line, id.as_str())),
            _ => None,
        })
        .collect();

    let pos = decls
        .iter()
        .position(|(_, decl_id)| *decl_id == id)
        .ok_or_else(|| LocateError::TaskNotFound(id.to_string()))?;

    let prefix = format!("{}.", id);
    let end = decls[pos + 1..]
        .iter()
        .find(|(_, decl_id)| !decl_id.starts_with(&prefix))
        .map(|(line, _)| *line)
        .unwrap_or(tokens.len());

    Ok(decls[pos].0..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_strips_everything() {
        assert_eq!(display_title("## R1 Deploy pipeline"), "Deploy pipeline");
        assert_eq!(
            display_title("### R1.2 [completed] Ship the thing"),
            "Ship the thing"
        );
        assert_eq!(
            display_title("## R3 [in_progress] Wire up [docs](./d.md)"),
            "Wire up [docs](./d.md)"
        );
    }

    #[test]
    fn test_display_title_preserves_link_with_identifier_shape() {
        // The identifier inside the masked link must survive; only the
        // declaration's own identifier is removed.
        assert_eq!(
            display_title("## R2 Supersedes [R1 overview](./r1.md)"),
            "Supersedes [R1 overview](./r1.md)"
        );
    }

    #[test]
    fn test_display_title_removes_only_first_identifier() {
        assert_eq!(
            display_title("## R1 Merge R2 into the new layout"),
            "Merge R2 into the new layout"
        );
    }

    #[test]
    fn test_body_text_boundaries() {
        let lines = vec!["## R1 t", "", "alpha", "", "beta  ", "", "## R2 u"];
        // Lines strictly between the declarations, outer blanks dropped,
        // interior blank and trailing-whitespace trim applied
        assert_eq!(body_text(&lines, 1, 6), "alpha\n\nbeta");
    }

    #[test]
    fn test_body_text_empty_when_adjacent() {
        let lines = vec!["## R1 t", "### R1.1 u"];
        assert_eq!(body_text(&lines, 1, 1), "");
        let lines = vec!["## R1 t", "", "### R1.1 u"];
        assert_eq!(body_text(&lines, 1, 2), "");
    }

    #[test]
    fn test_status_flags_both_recorded() {
        let tokens = tokenize("## R1 [completed] [in_progress] odd\n");
        let lines = vec!["## R1 [completed] [in_progress] odd"];
        let task = make_task("R1", &tokens[0], 1, &lines, Path::new("/tmp/d.md"));
        assert!(task.completed);
        assert!(task.in_progress);
        assert_eq!(task.title, "odd");
    }

    #[test]
    fn test_locate_includes_descendants() {
        let text = "\
## R1 Parent
body
### R1.1 Child
### R1.2 Child
## R2 Next
";
        assert_eq!(locate(text, "R1").unwrap(), 0..4);
        assert_eq!(locate(text, "R1.1").unwrap(), 2..3);
        assert_eq!(locate(text, "R2").unwrap(), 4..5);
    }

    #[test]
    fn test_locate_numeric_prefix_is_not_descendant() {
        let text = "\
## R1 One
### R1.1 Sub
## R10 Ten
body of ten
";
        // R10 is not a dot-descendant of R1, so R1's range stops there
        assert_eq!(locate(text, "R1").unwrap(), 0..2);
        assert_eq!(locate(text, "R10").unwrap(), 2..4);
    }

    #[test]
    fn test_locate_last_task_runs_to_end() {
        let text = "prose\n## R1 Only\ntail\n";
        assert_eq!(locate(text, "R1").unwrap(), 1..3);
    }

    #[test]
    fn test_locate_missing_is_recoverable() {
        let err = locate("## R1 x\n", "R7").unwrap_err();
        assert!(matches!(err, LocateError::TaskNotFound(ref id) if id == "R7"));
        assert_eq!(err.to_string(), "task not found: R7");
    }
}
