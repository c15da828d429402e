use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A task parsed from a document heading carrying a dotted identifier.
///
/// Nesting is derived from the identifier's dot structure (`R1.2` is a child
/// of `R1`), never from how many `#` markers the heading happened to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    /// Dotted identifier like `R1` or `R1.2.3`
    pub id: String,
    /// Display title: markers, identifier, and status markers stripped;
    /// inline formatting and links preserved
    pub title: String,
    /// Body text between this declaration and the next one
    pub body: String,
    /// `[completed]` marker present on the declaration line
    pub completed: bool,
    /// `[in_progress]` marker present on the declaration line
    pub in_progress: bool,
    /// Child tasks in document order
    pub children: Vec<TaskNode>,
    /// Declaration line in the source document (0-indexed)
    pub line: usize,
    /// Document this task was parsed from
    pub file_path: PathBuf,
    /// Number of link constructs in the declaration and body
    pub link_count: usize,
    /// How many of those link targets exist on disk
    pub link_exists: usize,
}

impl TaskNode {
    /// Identifier depth: number of dot separators (`R1` = 0, `R1.2.3` = 2)
    pub fn depth(&self) -> usize {
        self.id.matches('.').count()
    }

    /// Parent identifier, or `None` for a root task
    pub fn parent_id(&self) -> Option<&str> {
        self.id.rsplit_once('.').map(|(parent, _)| parent)
    }

    /// The character used in the rendered status glyph `[x]` / `[>]` / `[ ]`.
    /// `[completed]` wins when both markers are present.
    pub fn status_char(&self) -> char {
        if self.completed {
            'x'
        } else if self.in_progress {
            '>'
        } else {
            ' '
        }
    }
}

/// A contiguous span of non-task content preceding the first task declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProseBlock {
    /// Synthetic id derived from the starting line, e.g. `prose-0`
    pub id: String,
    /// Trimmed display content
    pub content: String,
    /// Untrimmed content for faithful re-editing
    pub raw_content: String,
    /// Starting line in the source document (0-indexed)
    pub line: usize,
}

impl ProseBlock {
    pub fn new(line: usize, raw_content: String) -> Self {
        ProseBlock {
            id: format!("prose-{}", line),
            content: raw_content.trim().to_string(),
            raw_content,
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> TaskNode {
        TaskNode {
            id: id.to_string(),
            title: String::new(),
            body: String::new(),
            completed: false,
            in_progress: false,
            children: Vec::new(),
            line: 0,
            file_path: PathBuf::from("/tmp/doc.md"),
            link_count: 0,
            link_exists: 0,
        }
    }

    #[test]
    fn test_depth_counts_dots() {
        assert_eq!(node("R1").depth(), 0);
        assert_eq!(node("R1.2").depth(), 1);
        assert_eq!(node("R1.2.3").depth(), 2);
    }

    #[test]
    fn test_parent_id() {
        assert_eq!(node("R1").parent_id(), None);
        assert_eq!(node("R1.2").parent_id(), Some("R1"));
        assert_eq!(node("R1.2.3").parent_id(), Some("R1.2"));
    }

    #[test]
    fn test_status_char_completed_wins() {
        let mut n = node("R1");
        assert_eq!(n.status_char(), ' ');
        n.in_progress = true;
        assert_eq!(n.status_char(), '>');
        n.completed = true;
        assert_eq!(n.status_char(), 'x');
    }

    #[test]
    fn test_prose_block_id_and_trim() {
        let block = ProseBlock::new(4, "\n  Some preamble.  \n".to_string());
        assert_eq!(block.id, "prose-4");
        assert_eq!(block.content, "Some preamble.");
        assert_eq!(block.raw_content, "\n  Some preamble.  \n");
        assert_eq!(block.line, 4);
    }

    #[test]
    fn test_task_serializes_with_camel_case_fields() {
        let n = node("R1.1");
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"linkCount\""));
        assert!(json.contains("\"linkExists\""));
        assert!(json.contains("\"filePath\""));
        assert!(json.contains("\"inProgress\""));
    }
}
