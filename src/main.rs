mod commands;
mod core;

use clap::Parser;
use std::io::IsTerminal;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "yaml-schema-validator",
    version,
    about = "Validate YAML documents against a JSON Schema"
)]
struct Cli {
    #[command(flatten)]
    validate: commands::validate::ValidateArgs,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    process::exit(commands::validate::run(cli.validate));
}
