use anyhow::Result;
use senpai_core::{AppConfig, History, Palette, config_dir, normalize_color_spec};
use senpai_llm::{ClientConfig, HttpClient};
use senpai_observe::Observer;
use std::path::PathBuf;

/// Everything one invocation needs: the config directory and what lives in it.
pub(crate) struct CliContext {
    pub(crate) dir: PathBuf,
    pub(crate) config: AppConfig,
    pub(crate) observer: Observer,
}

impl CliContext {
    pub(crate) fn load(verbose: bool) -> Result<Self> {
        let dir = config_dir()?;
        let mut observer = Observer::new(&dir)?;
        observer.set_verbose(verbose);
        let config = AppConfig::ensure(&dir)?;
        observer.verbose_log(&format!(
            "config loaded from {}",
            AppConfig::config_path(&dir).display()
        ));
        Ok(Self {
            dir,
            config,
            observer,
        })
    }

    /// Validates and stores the color options given on the command line.
    pub(crate) fn apply_colors(
        &mut self,
        command: Option<&[String]>,
        comment: Option<&[String]>,
    ) -> Result<()> {
        if let Some(words) = command {
            self.config.main.command_color = normalize_color_spec(words)?;
        }
        if let Some(words) = comment {
            self.config.main.comment_color = normalize_color_spec(words)?;
        }
        Ok(())
    }

    pub(crate) fn save_config(&self) -> Result<()> {
        self.config.save(&self.dir)
    }

    pub(crate) fn palette(&self) -> Result<Palette> {
        Ok(Palette::from_config(&self.config.main)?)
    }

    pub(crate) fn client(&self) -> Result<HttpClient> {
        HttpClient::new(ClientConfig {
            host: self.config.api_host(),
            timeout_seconds: self.config.api.timeout_seconds,
            token: self.config.token().map(str::to_string),
            version: self.config.main.version.clone(),
            persona: self.config.main.persona.clone(),
        })
    }

    /// Stored history, or an empty one when the file cannot be read.
    pub(crate) fn history(&self) -> History {
        match History::load(&self.dir) {
            Ok(history) => history,
            Err(err) => {
                self.observer
                    .warn_log(&format!("ignoring unreadable history: {err:#}"));
                History::empty(&self.dir)
            }
        }
    }

    pub(crate) fn clear_history(&self) -> Result<()> {
        History::empty(&self.dir).write()?;
        self.observer.verbose_log("history cleared");
        Ok(())
    }
}
