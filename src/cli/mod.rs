pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, OutputFormatArg, ProjectArgs, TemplateArgs};
pub use handlers::{handle_compile, handle_list, handle_template};
pub use output::{OutputFormat, OutputFormatter};
