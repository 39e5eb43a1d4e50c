//! Command-line interface parsing and handling.

pub mod memories;
pub mod say;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::api::HttpBackend;
use crate::cli::memories::run_memories;
use crate::cli::say::run_say;
use crate::core::config::Config;
use crate::ui::chat_loop::{run_chat, ChatOptions};
use crate::utils::logging::{self, LogTarget};

#[derive(Parser)]
#[command(name = "sous", version)]
#[command(about = "A terminal chat client for a personal cooking assistant")]
#[command(
    long_about = "Sous is a full-screen terminal client for a cooking assistant server. \
Enter your name to start a session, then chat in the Message field.\n\n\
Environment Variables:\n\
  SOUS_BASE_URL     Assistant server URL (defaults to http://localhost:8000)\n\
  SOUS_LOG          Log filter, e.g. sous=debug (used with --log)\n\n\
Controls:\n\
  Enter             Start the session (Name) or send (Message)\n\
  Tab               Switch between the Name and Message fields\n\
  PageUp/PageDown   Scroll the transcript\n\
  Esc, Ctrl+C       Quit\n\n\
Commands:\n\
  /memories         List what the assistant remembers about you\n\
  /clear            Clear the transcript\n\
  /help             Show help\n\
  /quit             Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Assistant server URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Write logs to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat {
        /// Start a session for this user right away
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Send one message without the chat interface and print the reply
    Say {
        /// User id to start the session with (defaults to default-user)
        #[arg(short, long)]
        user: Option<String>,
        /// The message to send
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
    /// List what the assistant remembers about a user
    Memories {
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Set configuration values; with no arguments, print the configuration
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
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

fn resolve_user(flag: Option<String>, config: &Config) -> Result<String, Box<dyn Error>> {
    flag.or_else(|| config.default_user.clone())
        .filter(|user| !user.trim().is_empty())
        .ok_or_else(|| "No user given. Pass --user or run 'sous set default-user <id>'.".into())
}

fn http_backend(args_base_url: Option<&str>, config: &Config) -> Result<HttpBackend, Box<dyn Error>> {
    let base_url = config.base_url_from_env(args_base_url);
    Ok(HttpBackend::new(base_url, config.request_timeout())?)
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = Config::load()?;
    let command = args.command.unwrap_or(Commands::Chat { user: None });

    let log_file = args.log.clone().or_else(|| config.log_file.clone());
    let target = match (&command, log_file.as_deref()) {
        (_, Some(path)) => LogTarget::File(path),
        (Commands::Chat { .. }, None) => LogTarget::Off,
        (_, None) => LogTarget::Stderr,
    };
    logging::init(target)?;

    match command {
        Commands::Chat { user } => {
            let auto_start = user.is_some();
            run_chat(ChatOptions {
                base_url: config.base_url_from_env(args.base_url.as_deref()),
                user: user.or_else(|| config.default_user.clone()),
                auto_start,
                timeout: config.request_timeout(),
            })
            .await
        }
        Commands::Say { user, prompt } => {
            let user = resolve_user(user, &config)?;
            let backend = http_backend(args.base_url.as_deref(), &config)?;
            let stdout = std::io::stdout();
            run_say(&backend, &user, &prompt.join(" "), &mut stdout.lock()).await
        }
        Commands::Memories { user } => {
            let user = resolve_user(user, &config)?;
            let backend = http_backend(args.base_url.as_deref(), &config)?;
            let stdout = std::io::stdout();
            run_memories(&backend, &user, &mut stdout.lock()).await
        }
        Commands::Set { key, value } => {
            let path = Config::get_config_path()?;
            match key.filter(|_| !value.is_empty()) {
                Some(key) => println!("✅ {}", set_config_value(&path, &key, &value.join(" "))?),
                None => Config::load_from_path(&path)?.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let path = Config::get_config_path()?;
            println!("✅ {}", unset_config_value(&path, &key)?);
            Ok(())
        }
    }
}

pub fn set_config_value(path: &Path, key: &str, value: &str) -> Result<String, Box<dyn Error>> {
    let mut config = Config::load_from_path(path)?;
    config.set_value(key, value)?;
    config.save_to_path(path)?;
    Ok(format!("Set {key} to: {}", value.trim()))
}

pub fn unset_config_value(path: &Path, key: &str) -> Result<String, Box<dyn Error>> {
    let mut config = Config::load_from_path(path)?;
    config.unset_value(key)?;
    config.save_to_path(path)?;
    Ok(format!("Unset {key}"))
}
