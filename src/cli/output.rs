use indexmap::IndexMap;

use crate::model::document::TaskDocument;
use crate::model::task::TaskNode;
use crate::ops::check::{CheckReport, CheckWarning};
use crate::parse::links::LinkStats;

/// Render a full document: header line, then the task tree.
pub fn render_document(doc: &TaskDocument) -> String {
    let stats = doc.stats();
    let mut out = format!(
        "{}\n{} tasks ({} completed, {} in progress), {} prose block(s)\n",
        doc.file_path.display(),
        stats.total,
        stats.completed,
        stats.in_progress,
        doc.prose.len(),
    );
    if !doc.tasks.is_empty() {
        out.push('\n');
        out.push_str(&render_tree(&doc.tasks));
    }
    out
}

/// Render the forest as an indented outline with status glyphs.
pub fn render_tree(tasks: &[TaskNode]) -> String {
    let mut out = String::new();
    for task in tasks {
        render_task_line(task, 0, &mut out);
    }
    out
}

fn render_task_line(task: &TaskNode, indent: usize, out: &mut String) {
    out.push_str(&" ".repeat(indent));
    out.push_str(&format!("[{}] {} {}", task.status_char(), task.id, task.title));
    if task.link_count > 0 {
        out.push_str(&format!(" ({}/{} links)", task.link_exists, task.link_count));
    }
    out.push('\n');
    for child in &task.children {
        render_task_line(child, indent + 2, out);
    }
}

/// Multi-line detail view of one task.
pub fn render_task_detail(task: &TaskNode) -> String {
    let status = if task.completed {
        "completed"
    } else if task.in_progress {
        "in progress"
    } else {
        "open"
    };
    let mut out = format!(
        "{} {}\n  status: {}\n  line: {}\n  links: {}/{}\n",
        task.id, task.title, status, task.line, task.link_exists, task.link_count
    );
    if !task.body.is_empty() {
        out.push_str("  body:\n");
        for line in task.body.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    if !task.children.is_empty() {
        let ids: Vec<&str> = task.children.iter().map(|c| c.id.as_str()).collect();
        out.push_str(&format!("  children: {}\n", ids.join(", ")));
    }
    out
}

/// One line per task: identifier and its exists/count tally.
pub fn render_link_report(report: &IndexMap<String, LinkStats>) -> String {
    let mut out = String::new();
    for (id, stats) in report {
        out.push_str(&format!("{}  {}/{}\n", id, stats.exists, stats.count));
    }
    out
}

pub fn render_check(report: &CheckReport) -> String {
    let mut out = String::new();
    for broken in &report.broken {
        out.push_str(&format!("broken: {} -> {}\n", broken.task_id, broken.target));
    }
    for warning in &report.warnings {
        match warning {
            CheckWarning::ConflictingStatus { task_id } => {
                out.push_str(&format!("warning: {} carries both status markers\n", task_id));
            }
        }
    }
    if report.valid && report.warnings.is_empty() {
        out.push_str("ok\n");
    } else if !report.valid {
        out.push_str(&format!("{} broken link(s)\n", report.broken.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;
    use std::path::Path;

    #[test]
    fn test_render_tree_snapshot() {
        let doc = parse_document(
            "## R1 [in_progress] Build parser\n\
             ### R1.1 [completed] Tokenizer\n\
             ### R1.2 Hierarchy\n\
             ## R2 Ship it\n",
            Path::new("/tmp/doc.md"),
        );
        insta::assert_snapshot!(render_tree(&doc.tasks), @r"
        [>] R1 Build parser
          [x] R1.1 Tokenizer
          [ ] R1.2 Hierarchy
        [ ] R2 Ship it
        ");
    }

    #[test]
    fn test_render_document_header() {
        let doc = parse_document(
            "intro\n\n## R1 [completed] Done\n",
            Path::new("/tmp/doc.md"),
        );
        let rendered = render_document(&doc);
        assert!(rendered.starts_with("/tmp/doc.md\n"));
        assert!(rendered.contains("1 tasks (1 completed, 0 in progress), 1 prose block(s)"));
        assert!(rendered.contains("[x] R1 Done"));
    }

    #[test]
    fn test_render_task_detail_includes_body_and_children() {
        let doc = parse_document(
            "## R1 Parent\nsome body\n\n### R1.1 Kid\n### R1.2 Kid\n",
            Path::new("/tmp/doc.md"),
        );
        let detail = render_task_detail(&doc.tasks[0]);
        insta::assert_snapshot!(detail, @r"
        R1 Parent
          status: open
          line: 0
          links: 0/0
          body:
            some body
          children: R1.1, R1.2
        ");
    }
}
