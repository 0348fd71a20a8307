//! Run settings loaded from an optional YAML file.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides:
//!
//! ```yaml
//! sources:
//!   - https://thehackernews.com/search/label/Cyber%20Attack
//! summarizer:
//!   remote_endpoint: https://summarizer.internal/v1/summarize
//! smtp:
//!   port: 2525
//! ```
//!
//! Secrets (API key, SMTP credentials, addresses) never live here; they come
//! from the CLI or the environment, see [`crate::cli::Cli`].

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// Index pages scraped when no config file overrides them.
pub const DEFAULT_SOURCES: [&str; 2] = [
    "https://www.channelnewsasia.com/topic/cybersecurity",
    "https://thehackernews.com/search/label/Cyber%20Attack",
];

/// User agents tried in order when a site answers 403.
pub const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.85 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:88.0) Gecko/20100101 Firefox/88.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1 Safari/605.1.15",
];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Index pages to scrape, in order.
    pub sources: Vec<String>,
    /// Identifier pool for 403 rotation, in order.
    pub user_agents: Vec<String>,
    pub summarizer: SummarizerSettings,
    pub smtp: SmtpSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerSettings {
    /// Summarization API taking `{"text": ...}` and answering `{"summary": ...}`.
    pub remote_endpoint: Option<String>,
    /// Locally hosted sequence-to-sequence generation server.
    pub local_endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub subject: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            summarizer: SummarizerSettings::default(),
            smtp: SmtpSettings::default(),
        }
    }
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            subject: "Your Daily Cyber News Summary".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid YAML, or leaves the
    /// user agent pool empty.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let settings = Self::from_yaml(&raw)?;
                info!(path = %path.display(), "Loaded configuration");
                settings
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.user_agents.is_empty() {
            return Err("config must list at least one user agent".into());
        }
        Ok(())
    }
}
