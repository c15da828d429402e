pub mod content;
pub mod hierarchy;
pub mod links;
pub mod prose;
pub mod tokenizer;

pub use content::{LocateError, body_text, display_title, locate};
pub use hierarchy::build_forest;
pub use links::{LinkStats, link_stats};
pub use prose::extract_prose;
pub use tokenizer::{Token, TokenKind, tokenize};

use std::path::Path;

use crate::model::document::TaskDocument;

/// Parse a full document into its model: one tokenize pass, then two
/// independent passes over the same immutable token list. The only I/O is
/// the per-link existence stat inside task construction.
pub fn parse_document(text: &str, path: &Path) -> TaskDocument {
    let tokens = tokenize(text);
    let lines: Vec<&str> = text.lines().collect();
    let tasks = build_forest(&tokens, &lines, path);
    let prose = extract_prose(&tokens);
    TaskDocument {
        file_path: path.to_path_buf(),
        tasks,
        prose,
    }
}
