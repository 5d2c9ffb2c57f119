//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;


use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tokio::io::{BufReader, Stdin};
use tracing::debug;

use crate::auth::AuthManager;
use crate::cli::say::run_say;
use crate::core::app::{ControllerOptions, ConversationController};
use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::core::memory::MemoryStore;
use crate::core::model_adapter::{GeminiClient, GeminiSettings};
use crate::ui::{render_message, run_shell};
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "gemchat", version)]
#[command(about = "A terminal chat with a Gemini model that remembers the conversation")]
#[command(
    long_about = "Gemchat is a small terminal chat front-end for a hosted Gemini model. \
Every turn is saved to a local snapshot, so the conversation picks up where it left off \
the next time you start it.\n\n\
Authentication:\n\
  Set GEMINI_API_KEY, or run 'gemchat auth' to store a key in the system keyring.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (takes precedence over the keyring)\n\
  GEMCHAT_LOG       Log filter, e.g. 'debug' or 'gemchat=info' (logs go to stderr)\n\n\
Chat commands:\n\
  /clear            Forget the conversation and start over\n\
  /history          Show the whole conversation again\n\
  /quit             Exit (Ctrl+D works too)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this run (overrides the configured model)
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Conversation snapshot to use (overrides the configured location)
    #[arg(long, global = true, value_name = "PATH")]
    pub memory_file: Option<PathBuf>,

    /// Let the assistant follow up on its own when a saved conversation resumes
    #[arg(short = 'a', long, global = true)]
    pub autoreply: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Start the chat shell (default)
    Chat,
    /// Send one message and print the reply
    Say {
        /// Message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
    },
    /// Print the saved conversation without contacting the model
    History,
    /// Delete the saved conversation
    Clear,
    /// Store a Gemini API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
    /// Show the effective configuration
    Config,
    /// Set a configuration value
    Set {
        /// Configuration key (base-url, model, memory-file, autoreply, greeting, system-instruction)
        key: String,
        /// Value to set (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

/// Effective per-run settings: the config file with CLI overrides applied.
pub fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(model) = &args.model {
        config.model = Some(model.clone());
    }
    if let Some(path) = &args.memory_file {
        config.memory_file = Some(path.clone());
    }
    if args.autoreply {
        config.autoreply = Some(true);
    }
    config
}

pub fn controller_options(config: &Config) -> ControllerOptions {
    ControllerOptions {
        greeting: config.greeting().to_string(),
        autoreply: config.autoreply_enabled(),
    }
}

fn build_controller(
    config: &Config,
) -> Result<ConversationController<GeminiClient>, Box<dyn Error>> {
    let (api_key, source) = AuthManager::new().resolve_api_key()?;
    debug!(source = %source, "resolved API key");

    let settings = GeminiSettings {
        base_url: config.base_url().to_string(),
        model: config.model().to_string(),
        system_instruction: config.system_instruction().to_string(),
        ..GeminiSettings::new(api_key)
    };
    let client = GeminiClient::new(settings)?;
    debug!(endpoint = %client.settings().endpoint(), "using generation endpoint");
    let store = MemoryStore::new(config.memory_file_path());

    Ok(ConversationController::new(
        store,
        client,
        controller_options(config),
    ))
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.clone().unwrap_or(Commands::Chat);

    match command {
        Commands::Auth => {
            AuthManager::new().interactive_auth()?;
            Ok(())
        }
        Commands::Deauth => {
            AuthManager::new().interactive_deauth()?;
            Ok(())
        }
        Commands::Config => {
            apply_overrides(Config::load()?, &args).print_all();
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let value = value.join(" ");
            config.set_value(&key, &value)?;
            let path = config.save()?;
            println!("✅ Set {key} to: {value} ({})", path_display(path));
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            config.unset_value(&key)?;
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::History => {
            let config = apply_overrides(Config::load()?, &args);
            print_history(&MemoryStore::new(config.memory_file_path()));
            Ok(())
        }
        Commands::Clear => {
            let config = apply_overrides(Config::load()?, &args);
            let store = MemoryStore::new(config.memory_file_path());
            store.clear();
            println!("🗑️  Cleared conversation at {}", path_display(store.path()));
            Ok(())
        }
        Commands::Say { prompt } => {
            let config = apply_overrides(Config::load()?, &args);
            let mut controller = build_controller(&config)?;
            let mut stdout = std::io::stdout();
            run_say(&mut controller, &prompt, &mut stdout).await
        }
        Commands::Chat => {
            let config = apply_overrides(Config::load()?, &args);
            let mut controller = build_controller(&config)?;
            controller.start_session();
            let mut stdout = std::io::stdout();
            run_shell(&mut controller, stdin_lines(), &mut stdout).await
        }
    }
}

fn stdin_lines() -> BufReader<Stdin> {
    BufReader::new(tokio::io::stdin())
}

fn print_history(store: &MemoryStore) {
    match store.read_snapshot() {
        Ok(Some(conversation)) if !conversation.is_empty() => {
            for message in &conversation {
                println!("{}", render_message(message));
                println!();
            }
        }
        Ok(_) => println!("No saved conversation at {}", path_display(store.path())),
        Err(err) => {
            eprintln!("⚠️  {err}");
            println!("The saved conversation is unreadable and will be treated as empty.");
        }
    }
}
