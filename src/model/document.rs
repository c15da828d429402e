use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::task::{ProseBlock, TaskNode};

/// The full parsed model of one task document: an ordered forest of tasks
/// plus the free-standing prose blocks that belong to no task.
///
/// Rebuilt wholesale on every full parse; never mutated incrementally except
/// for the link-counter refresh (see `io::rediff`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument {
    /// Absolute path of the source document
    pub file_path: PathBuf,
    /// Root tasks in document order
    pub tasks: Vec<TaskNode>,
    /// Prose blocks in document order
    pub prose: Vec<ProseBlock>,
}

/// Aggregate counts over a document's task forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub link_count: usize,
    pub link_exists: usize,
}

impl TaskDocument {
    /// Find a task by identifier, depth-first in document order.
    /// Nodes hold no parent back-reference; consumers that need the parent
    /// resolve it through `TaskNode::parent_id` and another `find`.
    pub fn find(&self, id: &str) -> Option<&TaskNode> {
        fn walk<'a>(tasks: &'a [TaskNode], id: &str) -> Option<&'a TaskNode> {
            for task in tasks {
                if task.id == id {
                    return Some(task);
                }
                if let Some(found) = walk(&task.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.tasks, id)
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, id: &str) -> Option<&mut TaskNode> {
        fn walk<'a>(tasks: &'a mut [TaskNode], id: &str) -> Option<&'a mut TaskNode> {
            for task in tasks {
                if task.id == id {
                    return Some(task);
                }
                if let Some(found) = walk(&mut task.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&mut self.tasks, id)
    }

    /// Visit every task mutably, depth-first in document order.
    pub fn for_each_task_mut<F: FnMut(&mut TaskNode)>(&mut self, mut f: F) {
        fn walk<F: FnMut(&mut TaskNode)>(tasks: &mut [TaskNode], f: &mut F) {
            for task in tasks {
                f(task);
                walk(&mut task.children, f);
            }
        }
        walk(&mut self.tasks, &mut f);
    }

    /// Visit every task immutably, depth-first in document order.
    pub fn for_each_task<F: FnMut(&TaskNode)>(&self, mut f: F) {
        fn walk<F: FnMut(&TaskNode)>(tasks: &[TaskNode], f: &mut F) {
            for task in tasks {
                f(task);
                walk(&task.children, f);
            }
        }
        walk(&self.tasks, &mut f);
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        self.for_each_task(|task| {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            } else if task.in_progress {
                stats.in_progress += 1;
            }
            stats.link_count += task.link_count;
            stats.link_exists += task.link_exists;
        });
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;
    use std::path::Path;

    fn doc(source: &str) -> TaskDocument {
        parse_document(source, Path::new("/tmp/doc.md"))
    }

    #[test]
    fn test_find_nested() {
        let d = doc("## R1 Top\n\n### R1.1 Middle\n\n#### R1.1.2 Leaf\n");
        assert!(d.find("R1").is_some());
        assert_eq!(d.find("R1.1.2").unwrap().title, "Leaf");
        assert!(d.find("R9").is_none());
    }

    #[test]
    fn test_find_mut_updates_in_place() {
        let mut d = doc("## R1 Top\n\n### R1.1 Middle\n");
        d.find_mut("R1.1").unwrap().link_count = 7;
        assert_eq!(d.find("R1.1").unwrap().link_count, 7);
    }

    #[test]
    fn test_stats_counts_states() {
        let d = doc(
            "## R1 [completed] Done thing\n\
             ## R2 [in_progress] Working\n\
             ## R3 Waiting\n",
        );
        let stats = d.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
    }
}
