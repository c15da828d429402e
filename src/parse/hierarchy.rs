use std::path::Path;

use crate::model::task::TaskNode;
use crate::parse::content;
use crate::parse::tokenizer::{Token, TokenKind};

/// An entry on the builder stack: a task whose subtree is still open.
/// `child_of_below` records the prefix check made at push time; when it
/// failed, the node stays a root no matter what the depth arithmetic said.
struct OpenNode {
    node: TaskNode,
    depth: usize,
    child_of_below: bool,
}

/// Build the task forest from the token stream. The stack is keyed by
/// identifier dot-depth: two declarations with the same number of heading
/// markers can sit at different tree depths, and vice versa. Marker counts
/// never decide nesting.
pub fn build_forest(tokens: &[Token], lines: &[&str], path: &Path) -> Vec<TaskNode> {
    let decls: Vec<(&Token, &str)> = tokens
        .iter()
        .filter_map(|token| match &token.kind {
            TokenKind::TaskDecl { id } => Some((token, id.as_str())),
            _ => None,
        })
        .collect();

    let mut roots: Vec<TaskNode> = Vec::new();
    let mut stack: Vec<OpenNode> = Vec::new();

    for (index, &(decl, id)) in decls.iter().enumerate() {
        let next_decl_line = decls
            .get(index + 1)
            .map(|(token, _)| token.line)
            .unwrap_or(lines.len());
        let node = content::make_task(id, decl, next_decl_line, lines, path);
        let depth = node.depth();

        // Discard siblings and deeper descendants of prior branches
        while stack.last().is_some_and(|top| top.depth >= depth) {
            close_top(&mut stack, &mut roots);
        }

        // Depth said "child of the top"; verify it textually before
        // attaching, and fall back to a root when the check fails rather
        // than nesting under an unrelated branch.
        let child_of_below = stack
            .last()
            .is_some_and(|top| id.starts_with(&format!("{}.", top.node.id)));

        stack.push(OpenNode {
            node,
            depth,
            child_of_below,
        });
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    // The defensive fallback can close a root after a later-declared one;
    // forest order is document order
    roots.sort_by_key(|node| node.line);
    roots
}

fn close_top(stack: &mut Vec<OpenNode>, roots: &mut Vec<TaskNode>) {
    if let Some(open) = stack.pop() {
        if open.child_of_below
            && let Some(parent) = stack.last_mut()
        {
            parent.node.children.push(open.node);
        } else {
            roots.push(open.node);
        }
    }
}
