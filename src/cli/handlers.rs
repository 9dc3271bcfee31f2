//! Subcommand handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 when the
//! external compiler reported failure, 2 when the build could not run at all.

use super::commands::{ProjectArgs, TemplateArgs};
use super::output::OutputFormatter;
use crate::compiler::{ClosureCompiler, ProcessRunner, TemplateCompiler};
use crate::config::ProjectFile;
use crate::project::{ProjectSpec, Settings};
use crate::resolve::resolve_project;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_COMPILE_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

pub async fn handle_list(args: &ProjectArgs) -> i32 {
    match run_list(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_error(e),
    }
}

pub async fn handle_compile(args: &ProjectArgs) -> i32 {
    match run_compile(args).await {
        Ok(code) => code,
        Err(e) => report_error(e),
    }
}

pub async fn handle_template(args: &TemplateArgs) -> i32 {
    match run_template(args).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_error(e),
    }
}

fn report_error(e: anyhow::Error) -> i32 {
    error!("{:#}", e);
    eprintln!("Error: {:#}", e);
    EXIT_ERROR
}

fn load_settings() -> Result<Settings> {
    let settings = Settings::default();
    settings.validate().context("Invalid tool settings")?;
    debug!(?settings, "Loaded settings");
    Ok(settings)
}

/// Loads the project file, resolving its paths against `--root` or the file's directory
pub fn load_project(args: &ProjectArgs) -> Result<ProjectSpec> {
    let web_root = args
        .root
        .clone()
        .unwrap_or_else(|| default_web_root(&args.config));

    let spec = ProjectFile::load(&args.config)?
        .into_spec(&web_root)
        .with_context(|| format!("Invalid project file {}", args.config.display()))?;

    info!(
        config = %args.config.display(),
        web_root = %web_root.display(),
        roots = spec.search_paths.len(),
        namespaces = spec.namespaces.len(),
        inputs = spec.entry_files.len(),
        "Loaded project"
    );
    Ok(spec)
}

fn default_web_root(config: &Path) -> PathBuf {
    match config.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn run_list(args: &ProjectArgs) -> Result<()> {
    let settings = load_settings()?;
    let spec = load_project(args)?;

    let resolved = resolve_project(&spec, &settings).context("Failed to resolve dependencies")?;
    let formatter = OutputFormatter::new(args.format.into());
    println!("{}", formatter.format_dependencies(&resolved.dependencies)?);
    Ok(())
}

async fn run_compile(args: &ProjectArgs) -> Result<i32> {
    let settings = load_settings()?;
    let spec = load_project(args)?;

    let token = CancellationToken::new();
    let ctrl_c = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping compiler");
                token.cancel();
            }
        })
    };

    let result = ClosureCompiler::new(&settings, &spec)
        .with_cancellation(token)
        .build()
        .await;
    ctrl_c.abort();

    let output = result.context("Compilation could not run")?;
    let formatter = OutputFormatter::new(args.format.into());
    println!("{}", formatter.format_compile(&output)?);

    if output.success() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_COMPILE_FAILED)
    }
}

async fn run_template(args: &TemplateArgs) -> Result<()> {
    let settings = load_settings()?;
    let compiler = TemplateCompiler::new(&settings, &args.custom_params, ProcessRunner::new());
    let js = compiler
        .render(&args.file)
        .await
        .with_context(|| format!("Failed to compile template {}", args.file.display()))?;
    print!("{}", js);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OutputFormatArg;
    use std::fs;
    use tempfile::TempDir;

    fn project_args(config: PathBuf, root: Option<PathBuf>) -> ProjectArgs {
        ProjectArgs {
            config,
            root,
            format: OutputFormatArg::Human,
        }
    }

    #[test]
    fn test_default_web_root() {
        assert_eq!(default_web_root(Path::new("p.json")), PathBuf::from("."));
        assert_eq!(
            default_web_root(Path::new("/srv/www/p.json")),
            PathBuf::from("/srv/www")
        );
    }

    #[test]
    fn test_load_project_relative_to_config_dir() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("project.json");
        fs::write(&config, r#"{"paths": "~/js", "namespaces": ["app"]}"#).unwrap();

        let spec = load_project(&project_args(config, None)).unwrap();
        assert_eq!(spec.search_paths, vec![dir.path().join("js")]);
        assert_eq!(spec.namespaces, vec!["app".to_string()]);
    }

    #[test]
    fn test_load_project_with_explicit_root() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("project.json");
        fs::write(&config, r#"{"paths": "js", "inputs": "main.js"}"#).unwrap();

        let spec = load_project(&project_args(config, Some(PathBuf::from("/srv/www")))).unwrap();
        assert_eq!(spec.search_paths, vec![PathBuf::from("/srv/www/js")]);
        assert_eq!(spec.entry_files, vec![PathBuf::from("/srv/www/main.js")]);
    }

    #[test]
    fn test_load_project_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_project(&project_args(dir.path().join("absent.json"), None));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_reports_infrastructure_error() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("project.json");
        fs::write(&config, r#"{"paths": "~/missing", "namespaces": "app"}"#).unwrap();

        assert_eq!(handle_list(&project_args(config, None)).await, EXIT_ERROR);
    }
}
