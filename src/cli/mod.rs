pub mod ask;
pub mod clear;
pub mod history;
pub mod import;
pub mod init;
pub mod records;
pub mod report;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::settings::Settings;

/// Open the configured store, creating the data directory and schema on first use.
pub(crate) fn open_store(settings: &Settings) -> Result<Connection> {
    std::fs::create_dir_all(settings.data_path())?;
    db::open(&settings.db_path())
}

#[derive(Parser)]
#[command(
    name = "caixa",
    version,
    about = "Financial assistant for small businesses: spreadsheet import, indicators and an advisor."
)]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for caixa data (default: ~/.local/share/caixa)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a CSV spreadsheet of financial records.
    Import {
        /// Path to the CSV file
        file: String,
    },
    /// List stored records, newest upload first.
    Records {
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Financial reports over every stored record.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Ask the financial advisor a question.
    Ask {
        /// The question
        question: String,
        /// Continue an existing conversation
        #[arg(long)]
        conversation: Option<String>,
    },
    /// Show the messages of a conversation.
    History {
        /// Conversation id (printed by `caixa ask`)
        conversation: String,
    },
    /// Delete every stored financial record.
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Show current database and summary statistics.
    Status,
    /// Run the HTTP API.
    Serve {
        /// Address to listen on (default from settings: 127.0.0.1:8000)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum ReportCommands {
    /// Income, expenses, net profit and margin.
    Indicators {
        #[arg(long)]
        json: bool,
    },
    /// Monthly income and expense totals.
    Trends {
        #[arg(long)]
        json: bool,
    },
    /// Expense totals per category.
    Distribution {
        #[arg(long)]
        json: bool,
    },
    /// Share of expense records per category.
    Types {
        #[arg(long)]
        json: bool,
    },
    /// Monthly net cash flow.
    Cashflow {
        #[arg(long)]
        json: bool,
    },
}
