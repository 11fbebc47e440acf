mod api;
mod assistant;
mod cli;
mod columns;
mod conversation;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod parsing;
mod reports;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "caixa=debug,tower_http=debug"
    } else {
        "caixa=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import { file } => cli::import::run(&file),
        Commands::Records { limit } => cli::records::run(limit),
        Commands::Report { command } => cli::report::run(command),
        Commands::Ask {
            question,
            conversation,
        } => cli::ask::run(&question, conversation.as_deref()),
        Commands::History { conversation } => cli::history::run(&conversation),
        Commands::Clear { yes } => cli::clear::run(yes),
        Commands::Status => cli::status::run(),
        Commands::Serve { bind } => cli::serve::run(bind),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
