use anyhow::Result;
use chrono::Utc;
use senpai_core::{EventEnvelope, EventKind};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct Observer {
    log_path: PathBuf,
    verbose: bool,
}

impl Observer {
    pub fn new(config_dir: &Path) -> Result<Self> {
        fs::create_dir_all(config_dir)?;
        Ok(Self {
            log_path: config_dir.join("senpai.log"),
            verbose: false,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn record_event(&self, event: &EventEnvelope) -> Result<()> {
        self.append_log_line(&format!(
            "{} EVENT {}",
            event.at.to_rfc3339(),
            serde_json::to_string(event)?
        ))
    }

    /// Records an event stamped now. Failures only surface in verbose mode.
    pub fn record(&self, kind: EventKind) {
        if let Err(err) = self.record_event(&EventEnvelope::now(kind)) {
            self.verbose_log(&format!("failed to write {}: {err}", self.log_path.display()));
        }
    }

    /// Enable or disable verbose logging to stderr.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Log a message to stderr with `[senpai]` prefix when verbose mode is on.
    pub fn verbose_log(&self, msg: &str) {
        if self.verbose {
            eprintln!("[senpai] {msg}");
        }
    }

    /// Log a warning to stderr and the log file.
    pub fn warn_log(&self, msg: &str) {
        eprintln!("[senpai WARN] {msg}");
        let _ = self.append_log_line(&format!("{} WARN {msg}", Utc::now().to_rfc3339()));
    }

    fn append_log_line(&self, line: &str) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}
