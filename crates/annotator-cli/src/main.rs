//! Data Annotator CLI
//!
//! Command-line interface for importing, labelling and exporting tabular data.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use annotator_core::{
    ClassifyError, Config, ExportError, PrepareError, RecordId, StorageError, StoreHandle,
};

mod commands;
mod logging;
mod output;
mod prompt;

use commands::import::ImportArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "annotator")]
#[command(about = "Data Annotator - label spreadsheet and CSV rows locally")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a spreadsheet (.xlsx) or CSV file, replacing stored data
    Import {
        /// File to import
        file: PathBuf,
        /// Primary display column (name or 1-based position)
        #[arg(short, long)]
        primary: Option<String>,
        /// Secondary display columns
        #[arg(short, long)]
        secondary: Vec<String>,
        /// Classification labels (2 to 5)
        #[arg(short, long)]
        label: Vec<String>,
        /// Replace stored data without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// List columns and their display roles
    Columns,
    /// List labels with document counts
    Labels,
    /// Show a page of documents
    #[command(alias = "ls")]
    Page {
        /// Page number, starting at 1
        #[arg(default_value_t = 1)]
        page: usize,
    },
    /// Show one document
    Show {
        /// Document ID
        id: RecordId,
    },
    /// Assign a label to a document
    Label {
        /// Document ID
        id: RecordId,
        /// Label name
        label: String,
    },
    /// Remove a document's label
    Unlabel {
        /// Document ID
        id: RecordId,
    },
    /// Export labelled data in the imported file's format
    Export {
        /// Directory to write into (default: current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Delete all stored data
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show stored data and storage status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, page_size, display_mode, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(&config);

    let result = run(cli.command, &config, &output).await;
    if let Err(e) = &result {
        if let Some(hint) = storage_error(e).and_then(StorageError::recovery_suggestion) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

async fn run(command: Commands, config: &Config, output: &Output) -> Result<()> {
    let handle = StoreHandle::open(config.clone())
        .await
        .with_context(|| format!("Failed to open store at {}", config.data_dir.display()))?;

    match command {
        Commands::Import {
            file,
            primary,
            secondary,
            label,
            yes,
        } => {
            let args = ImportArgs {
                file,
                primary,
                secondary,
                labels: label,
                yes,
            };
            commands::import::run(&handle, config, args, output).await
        }
        Commands::Columns => commands::columns::list(&handle, output).await,
        Commands::Labels => commands::classify::labels(&handle, config, output).await,
        Commands::Page { page } => commands::classify::page(&handle, config, page, output).await,
        Commands::Show { id } => commands::classify::show(&handle, config, id, output).await,
        Commands::Label { id, label } => {
            commands::classify::label(&handle, config, id, label, output).await
        }
        Commands::Unlabel { id } => {
            commands::classify::unlabel(&handle, config, id, output).await
        }
        Commands::Export { output_dir } => {
            commands::export::run(&handle, output_dir, output).await
        }
        Commands::Clear { yes } => commands::clear::run(&handle, yes, output).await,
        Commands::Status => commands::status::show(&handle, config, output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// The storage failure behind an error, if there is one
fn storage_error(err: &anyhow::Error) -> Option<&StorageError> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<StorageError>() {
            return Some(e);
        }
        match cause.downcast_ref::<ClassifyError>() {
            Some(ClassifyError::Storage(e)) => return Some(e),
            Some(_) => return None,
            None => {}
        }
        match cause.downcast_ref::<PrepareError>() {
            Some(PrepareError::Storage(e)) => return Some(e),
            Some(_) => return None,
            None => {}
        }
        match cause.downcast_ref::<ExportError>() {
            Some(ExportError::Storage(e)) => Some(e),
            _ => None,
        }
    })
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
