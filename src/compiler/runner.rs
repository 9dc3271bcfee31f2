use super::diagnostics::{DiagnosticParser, DiagnosticRecord, Severity};
use super::params::{ClosureParams, TemplateParams};
use super::process::{ProcessOutput, ProcessRunner};
use crate::error::{BuildError, Result};
use crate::project::{ProjectSpec, Settings};
use crate::resolve::{resolve_project, ResolvedProject};
use serde::Serialize;
use std::env;
use std::panic;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of one optimizer run
///
/// A non-zero `exit_code` is an ordinary outcome: the compiled sources had
/// errors, and `diagnostics` says which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub diagnostics: Vec<DiagnosticRecord>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl CompileOutput {
    pub fn from_process(output: ProcessOutput) -> Self {
        let diagnostics = DiagnosticParser::parse(&output.stderr);
        let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity == severity).count();
        let error_count = count(Severity::Error);
        let warning_count = count(Severity::Warning);

        Self {
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            diagnostics,
            error_count,
            warning_count,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Drives the template-to-JS compiler
pub struct TemplateCompiler<'a> {
    settings: &'a Settings,
    custom_params: &'a str,
    runner: ProcessRunner,
}

impl<'a> TemplateCompiler<'a> {
    pub fn new(settings: &'a Settings, custom_params: &'a str, runner: ProcessRunner) -> Self {
        Self {
            settings,
            custom_params,
            runner,
        }
    }

    /// Compiles `template` into a temporary JS file, removed when the handle drops
    pub async fn compile(&self, template: &Path) -> Result<NamedTempFile> {
        let output = tempfile::Builder::new()
            .prefix("nsbuild-")
            .suffix(".js")
            .tempfile()
            .map_err(|source| BuildError::Filesystem {
                path: env::temp_dir(),
                source,
            })?;

        let invocation =
            TemplateParams::for_file(self.settings, self.custom_params, template, output.path());
        let result = self.runner.run(&invocation).await?;

        if !result.success() {
            return Err(BuildError::TemplateCompile {
                file: template.to_path_buf(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        debug!(
            template = %template.display(),
            output = %output.path().display(),
            "Template compiled"
        );

        Ok(output)
    }

    /// Compiles `template` and returns the generated JavaScript
    pub async fn render(&self, template: &Path) -> Result<String> {
        let output = self.compile(template).await?;
        tokio::fs::read_to_string(output.path())
            .await
            .map_err(|source| BuildError::Filesystem {
                path: output.path().to_path_buf(),
                source,
            })
    }
}

/// Drives the JavaScript optimizer for one project
pub struct ClosureCompiler<'a> {
    settings: &'a Settings,
    spec: &'a ProjectSpec,
    runner: ProcessRunner,
}

impl<'a> ClosureCompiler<'a> {
    pub fn new(settings: &'a Settings, spec: &'a ProjectSpec) -> Self {
        Self {
            settings,
            spec,
            runner: ProcessRunner::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.runner = ProcessRunner::with_cancellation(token);
        self
    }

    /// Resolves the project on the blocking pool and compiles it
    pub async fn build(&self) -> Result<CompileOutput> {
        let spec = self.spec.clone();
        let settings = self.settings.clone();
        let resolved = match task::spawn_blocking(move || resolve_project(&spec, &settings)).await {
            Ok(resolved) => resolved?,
            Err(e) if e.is_panic() => panic::resume_unwind(e.into_panic()),
            Err(_) => return Err(BuildError::Cancelled),
        };
        self.compile(&resolved).await
    }

    /// Compiles an already resolved build list
    pub async fn compile(&self, resolved: &ResolvedProject) -> Result<CompileOutput> {
        let templates = TemplateCompiler::new(
            self.settings,
            &self.spec.template_custom_params,
            self.runner.clone(),
        );

        // keeps the generated files alive until the optimizer has read them
        let mut generated = Vec::new();
        let mut inputs: Vec<PathBuf> = Vec::with_capacity(resolved.dependencies.len());

        for dependency in resolved.dependencies.iter() {
            if resolved.templates.contains(dependency) {
                let compiled = templates.compile(dependency).await?;
                inputs.push(compiled.path().to_path_buf());
                generated.push(compiled);
            } else {
                inputs.push(dependency.clone());
            }
        }

        let invocation = ClosureParams::for_project(self.settings, self.spec, &inputs);
        let output = CompileOutput::from_process(self.runner.run(&invocation).await?);

        info!(
            inputs = inputs.len(),
            templates = generated.len(),
            exit_code = output.exit_code,
            errors = output.error_count,
            warnings = output.warning_count,
            "Compilation finished"
        );

        Ok(output)
    }
}
