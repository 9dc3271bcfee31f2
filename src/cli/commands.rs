use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Namespace dependency resolver and Closure Compiler driver
#[derive(Parser, Debug)]
#[command(
    name = "nsbuild",
    about = "Namespace dependency resolver and Closure Compiler driver",
    version,
    long_about = "nsbuild scans JavaScript and template sources for goog.provide / goog.require \
                  declarations, resolves an ordered build list for the requested namespaces, \
                  and drives the Closure Compiler and template compiler over it."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Print the resolved dependency list",
        long_about = "Resolves the project's namespaces and inputs into the ordered list of \
                      files the compiler would receive.\n\n\
                      Examples:\n  \
                      nsbuild list --config project.json\n  \
                      nsbuild list --config project.json --root /srv/www --format json"
    )]
    List(ProjectArgs),

    #[command(
        about = "Resolve and compile a project",
        long_about = "Resolves the project, compiles templates, runs the Closure Compiler and \
                      reports its diagnostics. Exits 1 when the compiler reports failure.\n\n\
                      Examples:\n  \
                      nsbuild compile --config project.json\n  \
                      nsbuild compile --config project.json --format json"
    )]
    Compile(ProjectArgs),

    #[command(about = "Compile a single template file and print the generated JavaScript")]
    Template(TemplateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(short = 'c', long, value_name = "FILE", help = "JSON project file")]
    pub config: PathBuf,

    #[arg(
        short = 'r',
        long,
        value_name = "DIR",
        help = "Directory that '~' and relative project paths resolve against (defaults to the project file's directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct TemplateArgs {
    #[arg(value_name = "FILE", help = "Template file to compile")]
    pub file: PathBuf,

    #[arg(long, value_name = "PARAMS", default_value = "", help = "Extra template compiler options")]
    pub custom_params: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_list_args() {
        let args = CliArgs::parse_from(["nsbuild", "list", "--config", "p.json"]);
        match args.command {
            Commands::List(list_args) => {
                assert_eq!(list_args.config, PathBuf::from("p.json"));
                assert_eq!(list_args.format, OutputFormatArg::Human);
                assert!(list_args.root.is_none());
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_compile_with_options() {
        let args = CliArgs::parse_from([
            "nsbuild", "compile", "-c", "p.json", "--root", "/srv/www", "--format", "json",
        ]);
        match args.command {
            Commands::Compile(compile_args) => {
                assert_eq!(compile_args.root, Some(PathBuf::from("/srv/www")));
                assert_eq!(compile_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Compile command"),
        }
    }

    #[test]
    fn test_template_command() {
        let args = CliArgs::parse_from(["nsbuild", "template", "views/page.soy"]);
        match args.command {
            Commands::Template(template_args) => {
                assert_eq!(template_args.file, PathBuf::from("views/page.soy"));
                assert!(template_args.custom_params.is_empty());
            }
            _ => panic!("Expected Template command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["nsbuild", "-v", "--log-level", "trace", "list", "-c", "p.json"]);
        assert!(args.verbose);
        assert!(!args.quiet);
        assert_eq!(args.log_level, Some("trace".to_string()));
    }
}
