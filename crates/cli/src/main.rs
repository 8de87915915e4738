use anyhow::Result;
use clap::Parser;
use declarative_cli::commands::{apply_command, check_command, shape_command};
use declarative_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Apply {
            path,
            strict,
            project_root,
            no_variants,
        } => apply_command(&path, strict, project_root.as_deref(), !no_variants),
        Commands::Check { root, strict } => check_command(&root, strict),
        Commands::Shape { type_name } => shape_command(type_name.as_deref()),
    }
}
