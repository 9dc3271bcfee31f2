//! Textual comment removal ahead of declaration matching
//!
//! This is an approximation, not a lexer: comment-like sequences inside string
//! literals are removed too (`"http://host"` loses everything after `//`).

use regex::Regex;
use std::sync::OnceLock;

pub fn strip_comments(contents: &str) -> String {
    static BLOCK_COMMENT: OnceLock<Regex> = OnceLock::new();
    let block = BLOCK_COMMENT
        .get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid block comment regex"));

    static LINE_COMMENT: OnceLock<Regex> = OnceLock::new();
    let line = LINE_COMMENT.get_or_init(|| Regex::new(r"(?m)//.*$").expect("Invalid line comment regex"));

    let without_blocks = block.replace_all(contents, "");
    line.replace_all(&without_blocks, "").into_owned()
}
