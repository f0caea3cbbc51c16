//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod ask;
pub mod listing;

use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::Client;

use crate::cli::ask::run_ask;
use crate::cli::listing::{list_topics, print_history, toggle_favorite};
use crate::core::app::{apply_action, App, AppAction};
use crate::core::config::data::{path_display, ConfigKey};
use crate::core::config::Config;
use crate::core::storage::{FileStore, SharedStore};
use crate::ui::chat_loop::run_chat;
use crate::utils::url::resolve_endpoint;

#[derive(Parser)]
#[command(name = "hikmat")]
#[command(about = "A terminal client for the Unani Firdous Ul Hikmat assistant")]
#[command(
    long_about = "Hikmat is a full-screen terminal client for a Unani medicine assistant. \
Pick a topic from the side panel or type a question; answers stream in as Markdown and \
the conversation is kept between sessions.\n\n\
Controls:\n\
  Enter             Send the message (or ask the highlighted topic)\n\
  Tab               Move focus between input, topic search and topic list\n\
  Up/Down/Mouse     Scroll the transcript or move through topics\n\
  Space / Ctrl+F    Star or unstar the highlighted topic\n\
  Alt+1..9          Ask a favorite topic\n\
  Ctrl+T            Toggle light/dark theme\n\
  Ctrl+Up/Down      Change font size\n\
  Ctrl+P            Show or hide the topic panel\n\
  Ctrl+N / Ctrl+L   Start a new chat / clear the history\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Assistant base URL (overrides the configured endpoint)
    #[arg(short = 'e', long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Write diagnostic logs to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask a single question and stream the answer to stdout
    Ask {
        /// Question to ask (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        question: Vec<String>,
    },
    /// List topics, optionally filtered by a search query
    Topics {
        /// Case-insensitive text to match against topic names
        query: Option<String>,
    },
    /// Star or unstar a topic
    Favorite {
        /// Exact topic name, e.g. "Fever (Humma)"
        #[arg(trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Print the saved conversation
    History,
    /// Clear the saved conversation
    Clear,
    /// Set configuration values
    Set {
        /// Configuration key to set (endpoint, data-dir); prints all values when omitted
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = args.log.as_deref() {
        if let Err(e) = crate::logging::init(path) {
            eprintln!("❌ Failed to open log file {path}: {e}");
            std::process::exit(1);
        }
    }

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let Some(key) = key else {
                config.print_all();
                return Ok(());
            };
            let Some(config_key) = parse_key(&key) else {
                eprintln!("❌ Unknown config key: {key}");
                std::process::exit(1);
            };
            match value.map(|parts| parts.join(" ")) {
                Some(val) if !val.trim().is_empty() => {
                    config.set(config_key, &val);
                    config.save()?;
                    println!("✅ Set {} to: {}", config_key.as_str(), val.trim());
                }
                _ => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            let Some(config_key) = parse_key(&key) else {
                eprintln!("❌ Unknown config key: {key}");
                std::process::exit(1);
            };
            config.unset(config_key);
            config.save()?;
            println!("✅ Unset {}", config_key.as_str());
            Ok(())
        }
        Commands::Chat => {
            let app = open_app(args.endpoint.as_deref())?;
            run_chat(app).await
        }
        Commands::Ask { question } => {
            let app = open_app(args.endpoint.as_deref())?;
            run_ask(app, question).await
        }
        Commands::Topics { query } => {
            let app = open_app(args.endpoint.as_deref())?;
            list_topics(&app, query.as_deref())
        }
        Commands::Favorite { name } => {
            let name = name.join(" ");
            if name.trim().is_empty() {
                eprintln!("Usage: hikmat favorite <topic name>");
                std::process::exit(1);
            }
            let mut app = open_app(args.endpoint.as_deref())?;
            match toggle_favorite(&mut app, &name) {
                Ok(true) => println!("✅ Added to favorites: {}", name.trim()),
                Ok(false) => println!("✅ Removed from favorites: {}", name.trim()),
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::History => {
            let mut app = open_app(args.endpoint.as_deref())?;
            app.transcript.load_read_only();
            print_history(&app)
        }
        Commands::Clear => {
            let mut app = open_app(args.endpoint.as_deref())?;
            app.initialize();
            apply_action(&mut app, AppAction::ClearHistory);
            if let Some(status) = app.ui.status.take() {
                eprintln!("❌ {status}");
                std::process::exit(1);
            }
            println!("✅ Cleared chat history");
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Option<ConfigKey> {
    ConfigKey::parse(key.trim())
}

/// Build the application over the on-disk store, resolving the endpoint from
/// the command line, then the config file, then the default.
fn open_app(endpoint_override: Option<&str>) -> Result<App, Box<dyn Error>> {
    let config = Config::load()?;
    let endpoint = resolve_endpoint(endpoint_override, config.endpoint.as_deref());
    let store_path = FileStore::resolve_path(config.data_dir.as_deref())?;
    tracing::info!(
        endpoint = %endpoint,
        storage = %path_display(&store_path),
        "opening session"
    );
    let storage: SharedStore = Arc::new(FileStore::open(store_path));
    Ok(App::new(storage, endpoint, Client::new()))
}
