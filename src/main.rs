use nsbuild::cli::commands::{CliArgs, Commands};
use nsbuild::cli::handlers::{handle_compile, handle_list, handle_template};
use nsbuild::util::{init_logging, parse_level, LoggingConfig};
use nsbuild::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("nsbuild v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::List(list_args) => handle_list(list_args).await,
        Commands::Compile(compile_args) => handle_compile(compile_args).await,
        Commands::Template(template_args) => handle_template(template_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}
