use crate::model::task::ProseBlock;
use crate::parse::tokenizer::{Token, TokenKind};

/// Second pass over the token list, independent of the hierarchy builder.
///
/// Content before the first task declaration (text, blank lines, and
/// identifier-less headings alike) accumulates into a single block, so a
/// preamble keeps its sub-headings and exact blank-line layout for
/// round-trip editing. Once a declaration has been seen, accumulation stops
/// for good: task body text is never a prose block, however it looks.
pub fn extract_prose(tokens: &[Token]) -> Vec<ProseBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;

    for token in tokens {
        match &token.kind {
            TokenKind::TaskDecl { .. } => break,
            TokenKind::Heading | TokenKind::Text | TokenKind::Empty => {
                let (_, lines) = current.get_or_insert_with(|| (token.line, Vec::new()));
                lines.push(token.raw.as_str());
            }
        }
    }

    if let Some((line, lines)) = current {
        let block = ProseBlock::new(line, lines.join("\n"));
        if !block.content.is_empty() {
            blocks.push(block);
        }
    }

    blocks
}
