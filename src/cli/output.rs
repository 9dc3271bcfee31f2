//! Output formatting for dependency lists and compile results

use crate::compiler::CompileOutput;
use crate::resolve::DependencyList;
use anyhow::{Context, Result};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_dependencies(&self, list: &DependencyList) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(list).context("Failed to serialize dependency list")
            }
            OutputFormat::Human => Ok(list
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    pub fn format_compile(&self, output: &CompileOutput) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(output).context("Failed to serialize compile output")
            }
            OutputFormat::Human => Ok(self.format_compile_human(output)),
        }
    }

    fn format_compile_human(&self, output: &CompileOutput) -> String {
        let mut text = String::new();

        if !output.stdout.is_empty() {
            text.push_str(output.stdout.trim_end());
            text.push('\n');
        }

        for diagnostic in &output.diagnostics {
            let _ = writeln!(
                text,
                "{}:{}: {} - {}",
                diagnostic.file, diagnostic.line, diagnostic.severity, diagnostic.message
            );
            if !diagnostic.snippet.is_empty() {
                let _ = writeln!(text, "  {}", diagnostic.snippet);
                let _ = writeln!(text, "  {}^", " ".repeat(diagnostic.offset));
            }
        }

        let _ = write!(
            text,
            "{} error(s), {} warning(s), exit code {}",
            output.error_count, output.warning_count, output.exit_code
        );
        text
    }
}
