//! Dropboard - keep a list of airdrops in a GitHub-hosted JSON file.
//!
//! # Usage
//!
//! ```bash
//! DROPBOARD_GITHUB_TOKEN=... dropboard --owner alvin --repo airdrops
//! dropboard --owner alvin --repo airdrops --branch drops --save
//! dropboard --list
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dropboard::app::App;
use dropboard::config::{
    ConfigFlags, StoreConfig, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use dropboard::document::Document;
use dropboard::editor::Placement;
use dropboard::store::{ContentApi, DocumentStore, GithubContents};
use dropboard::worker::{Mode, StoreWorker};

/// Browse and add airdrop entries stored in a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "dropboard", version, about, long_about = None)]
struct Cli {
    /// Repository owner (user or organization)
    #[arg(long, value_name = "OWNER")]
    owner: Option<String>,

    /// Repository name
    #[arg(long, value_name = "REPO")]
    repo: Option<String>,

    /// Path of the JSON file inside the repository [default: data.json]
    #[arg(long, value_name = "PATH")]
    path: Option<String>,

    /// Branch to read from and commit to [default: main]
    #[arg(long, value_name = "BRANCH")]
    branch: Option<String>,

    /// Access token (prefer DROPBOARD_GITHUB_TOKEN; never saved)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// API base URL, for GitHub Enterprise [default: https://api.github.com]
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds [default: 30]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Keep edited entries at their position instead of moving them to the end
    #[arg(long)]
    edit_in_place: bool,

    /// Create the file on the first submit if it does not exist
    #[arg(long)]
    create_missing: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the stored entries and exit
    #[arg(long)]
    list: bool,

    /// Save current command-line flags (except the token) as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    /// The settings given on this command line, for layering over rc files.
    fn config_flags(&self) -> ConfigFlags {
        ConfigFlags {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            path: self.path.clone(),
            branch: self.branch.clone(),
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            timeout_secs: self.timeout,
            edit_in_place: self.edit_in_place,
            create_missing: self.create_missing,
            log_file: self.log_file.clone(),
        }
    }
}

/// Where log records go.
#[derive(Debug, PartialEq, Eq)]
enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    /// The terminal UI owns the screen; anything written there would
    /// corrupt the frame.
    Discard,
}

fn log_target(log_file: Option<&Path>, interactive: bool) -> LogTarget<'_> {
    match log_file {
        Some(path) => LogTarget::File(path),
        None if interactive => LogTarget::Discard,
        None => LogTarget::Stderr,
    }
}

fn init_logging(target: &LogTarget<'_>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    match target {
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogTarget::Discard => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

fn print_entries(document: &Document) {
    if document.is_empty() {
        println!("(no entries)");
        return;
    }
    for entry in &document.items {
        println!("{}  [{}]", entry.title, entry.created_at);
        for (n, step) in entry.steps.iter().enumerate() {
            if step.link.is_empty() {
                println!("  {}. {}", n + 1, step.text);
            } else {
                println!("  {}. {} <{}>", n + 1, step.text, step.link);
            }
        }
        for line in entry.info.lines() {
            println!("  {line}");
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.config_flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let env_flags = ConfigFlags::from_env(|name| std::env::var(name).ok());
    let effective = file_flags.union(&env_flags).union(&cli_flags);

    init_logging(&log_target(effective.log_file.as_deref(), !cli.list))?;

    if (cli.save || cli.clear) && effective.owner.is_none() && effective.repo.is_none() {
        return Ok(());
    }

    let config = StoreConfig::resolve(&effective)?;
    tracing::debug!(?config, "resolved configuration");

    let api: Arc<dyn ContentApi> = Arc::new(GithubContents::new(&config)?);
    let store = DocumentStore::new(api).with_create_missing(effective.create_missing);

    if cli.list {
        let (document, version) = store
            .fetch()
            .with_context(|| format!("Failed to read {}", config.location()))?;
        tracing::debug!(%version, "listing document");
        print_entries(&document);
        return Ok(());
    }

    let placement = if effective.edit_in_place {
        Placement::InPlace
    } else {
        Placement::MoveToEnd
    };
    let worker = StoreWorker::new(Arc::new(store), Mode::Threaded);
    let mut app = App::new(worker, config.location())
        .with_placement(placement)
        .with_config_paths(
            Some(global_path),
            if local_path.exists() {
                Some(local_path)
            } else {
                None
            },
        );

    app.run().context("Application error")
}
