//! Command-line assembly for the external tools
//!
//! Both tools are jars launched as `<java> -jar "<jar>" ...`. Builders keep a
//! display string, quoted the way a shell user would type it, and the argv
//! actually handed to the OS.

use crate::project::{CompilationMode, ProjectSpec, Settings};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully built tool command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerInvocation {
    pub executable: PathBuf,
    pub args: Vec<String>,
    /// Argument string as rendered for logs and error messages
    pub command_line: String,
}

impl fmt::Display for CompilerInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.executable.display(), self.command_line)
    }
}

#[derive(Debug, Clone)]
pub struct JarParams {
    display: Vec<String>,
    argv: Vec<String>,
}

impl JarParams {
    pub fn new(jar: &Path) -> Self {
        let jar = jar.display().to_string();
        Self {
            display: vec!["-jar".to_string(), quote(&jar)],
            argv: vec!["-jar".to_string(), jar],
        }
    }

    /// `--name`, followed by `value` when it is non-empty
    pub fn add_param(&mut self, name: &str, value: &str) {
        let flag = format!("--{}", name);
        self.display.push(flag.clone());
        self.argv.push(flag);
        if !value.is_empty() {
            self.display.push(value.to_string());
            self.argv.push(value.to_string());
        }
    }

    /// `--name "value"`; nothing at all when `value` is empty
    pub fn add_quoted_param(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let flag = format!("--{}", name);
        self.display.push(flag.clone());
        self.display.push(quote(value));
        self.argv.push(flag);
        self.argv.push(value.to_string());
    }

    /// Bare quoted positional argument
    pub fn add_quoted_value(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.display.push(quote(value));
        self.argv.push(value.to_string());
    }

    /// Caller-formatted options, appended verbatim
    pub fn add_raw_options(&mut self, options: &str) {
        let options = options.trim();
        if options.is_empty() {
            return;
        }
        self.display.push(options.to_string());
        self.argv.extend(split_args(options));
    }

    pub fn params(&self) -> String {
        self.display.join(" ")
    }

    pub fn into_invocation(self, executable: &Path) -> CompilerInvocation {
        CompilerInvocation {
            executable: executable.to_path_buf(),
            command_line: self.params(),
            args: self.argv,
        }
    }
}

/// Arguments for the JavaScript optimizer
#[derive(Debug, Clone)]
pub struct ClosureParams {
    inner: JarParams,
}

impl ClosureParams {
    pub fn new(compiler_jar: &Path) -> Self {
        Self {
            inner: JarParams::new(compiler_jar),
        }
    }

    pub fn add_js_file(&mut self, path: &Path) {
        self.inner.add_quoted_param("js", &path.display().to_string());
    }

    pub fn add_externs_file(&mut self, path: &Path) {
        self.inner.add_quoted_param("externs", &path.display().to_string());
    }

    pub fn add_compilation_level(&mut self, mode: Option<CompilationMode>) {
        self.inner
            .add_param("compilation_level", mode.unwrap_or_default().keyword());
    }

    pub fn add_output_file(&mut self, path: &Path) {
        self.inner
            .add_quoted_param("js_output_file", &path.display().to_string());
    }

    pub fn add_raw_options(&mut self, options: &str) {
        self.inner.add_raw_options(options);
    }

    /// Optimizer command for `files`, which must already be in build order
    pub fn for_project(settings: &Settings, spec: &ProjectSpec, files: &[PathBuf]) -> CompilerInvocation {
        let mut builder = Self::new(&settings.compiler_jar);

        for file in files {
            builder.add_js_file(file);
        }
        for extern_file in &spec.externs {
            builder.add_externs_file(extern_file);
        }
        builder.add_raw_options(&spec.compiler_custom_params);
        if let Some(output) = &spec.output_file {
            builder.add_output_file(output);
        }
        builder.add_compilation_level(spec.mode);

        builder.inner.into_invocation(&settings.java_path)
    }
}

/// Arguments for the template-to-JS compiler
#[derive(Debug, Clone)]
pub struct TemplateParams {
    inner: JarParams,
}

impl TemplateParams {
    const PROVIDE_REQUIRE_NAMESPACES: &'static str = "shouldProvideRequireSoyNamespaces";

    pub fn new(template_jar: &Path) -> Self {
        Self {
            inner: JarParams::new(template_jar),
        }
    }

    /// Template compile of `template` into `output`
    pub fn for_file(
        settings: &Settings,
        custom_params: &str,
        template: &Path,
        output: &Path,
    ) -> CompilerInvocation {
        let mut builder = Self::new(&settings.template_jar);

        builder.inner.add_raw_options(custom_params);
        builder.inner.add_param("codeStyle", "concat");
        builder.inner.add_param("shouldGenerateJsdoc", "");
        builder
            .inner
            .add_quoted_param("outputPathFormat", &output.display().to_string());
        // the base runtime is always first in the build list, so generated code may use it
        builder
            .inner
            .add_quoted_param(Self::PROVIDE_REQUIRE_NAMESPACES, "true");
        builder.inner.add_quoted_value(&template.display().to_string());

        builder.inner.into_invocation(&settings.java_path)
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value)
}

/// Splits on whitespace, keeping double-quoted runs together
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }

    args
}
