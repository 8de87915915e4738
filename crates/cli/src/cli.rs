use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "declarative")]
#[command(version, about, long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug          Enable debug logging\n    DECLARATIVE_STRICT=1    Fail on unresolved declarations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a build file to the reference model and print the result as JSON
    #[command(visible_alias = "a")]
    Apply {
        /// Project directory or build file
        path: PathBuf,

        /// Fail on declarations that cannot be resolved instead of skipping them
        #[arg(short, long)]
        strict: bool,

        /// Directory relative file paths resolve against (defaults to the project directory)
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// Skip firing variant callbacks
        #[arg(long)]
        no_variants: bool,
    },
    /// Apply every build file under a directory and report failures
    #[command(visible_alias = "c")]
    Check {
        /// Root directory to search
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Fail on declarations that cannot be resolved instead of skipping them
        #[arg(short, long)]
        strict: bool,
    },
    /// Print the discovered shape of a model type
    Shape {
        /// Type name, e.g. BuildType; all types when omitted
        type_name: Option<String>,
    },
}
