//! gizi - nutrition facts scraper CLI

use clap::Parser;

use gizi::cli::{Cli, Commands, ConfigCommands};
use gizi::error::Result;

mod commands;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }
}

/// Install the tracing subscriber; logs always go to stderr
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "gizi=debug".to_string()
    } else {
        std::env::var("GIZI_LOG").unwrap_or_else(|_| "gizi=warn".to_string())
    };
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if json_logs {
        builder.with_target(false).json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Facts { name, json } => commands::cmd_facts(&name, json),
        Commands::Portions { name, json } => commands::cmd_portions(&name, json),
        Commands::Search { query, limit, json } => commands::cmd_search(&query, limit, json),

        Commands::Config(ConfigCommands::Path) => commands::cmd_config_path(),
        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(),
        Commands::Config(ConfigCommands::Init { force }) => commands::cmd_config_init(force),
    }
}
