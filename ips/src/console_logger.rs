//! Concrete `Logger` backed by `tracing`, plus an optional plain-text file
//! sink.
//!
//! Grounded on `original_source/src/logger/logger.cpp`'s dual console+file
//! sink, wired through the teacher's declared-but-unused `tracing`
//! dependency (`synaptik-core/src/config.rs` calls `tracing::info!` but the
//! workspace never registers a subscriber) — this binary is where that gap
//! is closed with a `tracing-subscriber` `fmt` layer.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;
use ips_core::logger::Logger;

pub struct TracingLogger {
    verbose: bool,
    file: Option<Mutex<File>>,
}

impl TracingLogger {
    pub fn new(verbose: bool, log_path: Option<&PathBuf>) -> Result<Self> {
        let file = match log_path {
            Some(path) => {
                let f = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening log file {}", path.display()))?;
                Some(Mutex::new(f))
            }
            None => None,
        };
        Ok(Self { verbose, file })
    }

    fn append_to_file(&self, level: &str, message: &str) {
        let Some(file) = &self.file else { return };
        if let Ok(mut f) = file.lock() {
            let _ = writeln!(f, "{} - {level} - {message}", Utc::now().to_rfc3339());
        }
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
        self.append_to_file("INFO", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
        self.append_to_file("WARN", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
        self.append_to_file("ERROR", message);
    }

    fn verbose(&self, message: &str) {
        if !self.verbose {
            return;
        }
        tracing::debug!("{message}");
        self.append_to_file("VERBOSE", message);
    }

    fn alert(&self, message: &str) {
        tracing::warn!(target: "alert", "{message}");
        self.append_to_file("ALRT", message);
        println!("{message}");
    }

    fn write_raw(&self, message: &str) {
        println!("{message}");
        self.append_to_file("RAW", message);
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}
