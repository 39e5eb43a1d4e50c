use std::io::{self, Write};

use crate::core::config::data::{Config, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::core::config::path_display;

impl Config {
    pub fn print_all(&self) {
        let stdout = io::stdout();
        let _ = self.write_summary(&mut stdout.lock());
    }

    pub fn write_summary(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Current configuration:")?;
        match &self.base_url {
            Some(url) => writeln!(out, "  base-url: {url}")?,
            None => writeln!(out, "  base-url: (unset, using {DEFAULT_BASE_URL})")?,
        }
        match &self.default_user {
            Some(user) => writeln!(out, "  default-user: {user}")?,
            None => writeln!(out, "  default-user: (unset)")?,
        }
        match self.request_timeout_secs {
            Some(0) => writeln!(out, "  request-timeout: off")?,
            Some(secs) => writeln!(out, "  request-timeout: {secs}s")?,
            None => writeln!(
                out,
                "  request-timeout: (unset, using {DEFAULT_REQUEST_TIMEOUT_SECS}s)"
            )?,
        }
        match &self.log_file {
            Some(path) => writeln!(out, "  log-file: {}", path_display(path))?,
            None => writeln!(out, "  log-file: (unset)")?,
        }
        Ok(())
    }
}
