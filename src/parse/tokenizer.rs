use regex::Regex;
use std::sync::OnceLock;

/// Classification of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Heading line whose text starts with a dotted task identifier
    TaskDecl { id: String },
    /// Heading line without an identifier (including the `#` document title)
    Heading,
    /// Any other non-blank line
    Text,
    /// Blank or whitespace-only line
    Empty,
}

/// One logical line of the document. Tokens are produced once per parse
/// pass and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The line verbatim (without its terminator)
    pub raw: String,
    /// Count of leading `#` markers. A display hint only; tree depth comes
    /// from the identifier.
    pub markers: usize,
    /// 0-indexed line number
    pub line: usize,
}

/// Identifier grammar: `R` then digits, then zero or more `.digits`,
/// anchored at the start and required to be followed by whitespace, `]`,
/// or end-of-line. The anchoring keeps an identifier inside a link target
/// (`[R1](./path)`) from reading as a declaration.
fn ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(R\d+(?:\.\d+)*)(?:\s|\]|$)").expect("invalid identifier regex"))
}

/// Extract the task identifier from heading text (markers already stripped),
/// if the text starts with one.
pub fn leading_identifier(text: &str) -> Option<&str> {
    ident_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Count the `#` markers at the very start of a line.
fn count_markers(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b'#').count()
}

/// Classify every line of a document. Pure and restartable: no state
/// survives the call, and the same input always yields the same tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.lines()
        .enumerate()
        .map(|(line, raw)| {
            let markers = count_markers(raw);
            let after = &raw[markers..];
            let kind = if markers >= 2 && after.starts_with(char::is_whitespace) {
                match leading_identifier(after.trim_start()) {
                    Some(id) => TokenKind::TaskDecl { id: id.to_string() },
                    None => TokenKind::Heading,
                }
            } else if markers == 1 && after.starts_with(char::is_whitespace) {
                // Single-marker heading: document title signal, never a task
                TokenKind::Heading
            } else if raw.trim().is_empty() {
                TokenKind::Empty
            } else {
                TokenKind::Text
            };
            Token {
                kind,
                raw: raw.to_string(),
                markers,
                line,
            }
        })
        .collect()
}
