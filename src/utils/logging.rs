//! Tracing setup. The chat UI owns the terminal, so its events go to a file
//! or nowhere; one-shot commands report warnings on stderr.

use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "SOUS_LOG";

#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Off,
}

impl LogTarget<'_> {
    fn default_directive(&self) -> &'static str {
        match self {
            LogTarget::File(_) => "sous=info",
            LogTarget::Stderr | LogTarget::Off => "sous=warn",
        }
    }
}

fn filter_for(target: &LogTarget<'_>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(target.default_directive()))
}

/// Open `path` for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Calling it twice is an error.
pub fn init(target: LogTarget<'_>) -> Result<(), Box<dyn Error>> {
    let filter = filter_for(&target);
    match target {
        LogTarget::Off => {}
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).compact().with_writer(io::stderr))
                .try_init()?;
        }
    }
    Ok(())
}
