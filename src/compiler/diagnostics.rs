//! Structured diagnostics from the compiler's error stream
//!
//! Each message is three lines:
//!
//! ```text
//! path/to/file.js:12: ERROR - message text
//!   var x = foo(;
//!               ^
//! ```
//!
//! Blocks may follow one another directly or be separated by other output.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use tracing::warn;

const TAB_WIDTH: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Case-insensitive keyword lookup; surrounding whitespace is ignored
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub severity: Severity,
    pub file: String,
    /// 1-based
    pub line: u32,
    pub message: String,
    /// Offending source line with tabs expanded; empty when the tool gave none
    pub snippet: String,
    /// Caret column within `snippet`; 0 without a snippet
    pub offset: usize,
}

pub struct DiagnosticParser;

impl DiagnosticParser {
    fn message_regex() -> &'static Regex {
        static MESSAGE: OnceLock<Regex> = OnceLock::new();
        MESSAGE.get_or_init(|| {
            Regex::new(r"(?m)^(.*):(\d+):([^\-\n]*)-(.*)\n(.*)\n(.*)\n")
                .expect("Invalid diagnostic regex")
        })
    }

    fn header_regex() -> &'static Regex {
        static HEADER: OnceLock<Regex> = OnceLock::new();
        HEADER.get_or_init(|| Regex::new(r"(?m)^.*:\d+:.*$").expect("Invalid header regex"))
    }

    /// Parses every well-formed message block; malformed blocks are skipped
    pub fn parse(stderr: &str) -> Vec<DiagnosticRecord> {
        let mut text = stderr.replace("\r\n", "\n");
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }

        let mut records = Vec::new();
        let mut blocks = Vec::new();

        for caps in Self::message_regex().captures_iter(&text) {
            if let Some(block) = caps.get(0) {
                blocks.push(block.range());
            }

            let file = caps[1].trim();
            let keyword = &caps[3];

            let Some(severity) = Severity::from_keyword(keyword) else {
                warn!(file, keyword = keyword.trim(), "Skipping diagnostic with unknown severity");
                continue;
            };
            let Ok(line) = caps[2].parse::<u32>() else {
                warn!(file, line = &caps[2], "Skipping diagnostic with unreadable line number");
                continue;
            };

            let snippet = caps[5].replace('\t', TAB_WIDTH);
            let caret = caps[6].replace('\t', TAB_WIDTH);

            let (snippet, offset) = if snippet.trim().is_empty() {
                (String::new(), 0)
            } else {
                let offset = caret.chars().take_while(|c| c.is_whitespace()).count();
                (snippet, offset)
            };

            records.push(DiagnosticRecord {
                severity,
                file: file.to_string(),
                line,
                message: caps[4].trim().to_string(),
                snippet,
                offset,
            });
        }

        for header in Self::header_regex().find_iter(&text) {
            if !blocks.iter().any(|block| block.contains(&header.start())) {
                warn!(line = header.as_str(), "Skipping incomplete diagnostic");
            }
        }

        records
    }
}
