use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::mail::gmail::GMAIL_API_BASE;
use crate::summarize::{DEFAULT_API_URL, DEFAULT_MODEL};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
pub const DEFAULT_MAX_RESULTS: u32 = 10;
// Gmail rejects maxResults above 500
const MAX_RESULTS_CEILING: u32 = 500;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    pub client_secret_path: Option<String>,
    pub token_path: Option<String>,
    pub redirect_uri: Option<String>,
    pub max_results: Option<u32>,
    pub gmail_api_base: Option<String>,
    pub openai_api_url: Option<String>,
    pub openai_model: Option<String>,
    pub openai_api_key: Option<String>,
    pub report_dir: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("mail_digest"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            client_secret_path: None,
            token_path: None,
            redirect_uri: Some(DEFAULT_REDIRECT_URI.to_string()),
            max_results: Some(DEFAULT_MAX_RESULTS),
            gmail_api_base: None,
            openai_api_url: None,
            openai_model: Some(DEFAULT_MODEL.to_string()),
            openai_api_key: None,
            report_dir: Some(".".to_string()),
            http_timeout_secs: Some(DEFAULT_HTTP_TIMEOUT_SECS),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(path, tom)?;
        return Err(anyhow::anyhow!(
            "Created template config at {}. Edit it and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)?;
    Ok(cfg)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Config {
    pub fn client_secret_path(&self) -> Result<PathBuf> {
        match non_empty(&self.client_secret_path) {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(config_dir()?.join("credentials.json")),
        }
    }

    pub fn token_path(&self) -> Result<PathBuf> {
        match non_empty(&self.token_path) {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(config_dir()?.join("token.json")),
        }
    }

    pub fn redirect_uri(&self) -> String {
        non_empty(&self.redirect_uri)
            .unwrap_or(DEFAULT_REDIRECT_URI)
            .to_string()
    }

    /// Batch size for one run, clamped to what the provider accepts.
    pub fn max_results(&self) -> u32 {
        self.max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_CEILING)
    }

    pub fn gmail_api_base(&self) -> String {
        non_empty(&self.gmail_api_base)
            .unwrap_or(GMAIL_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn openai_api_url(&self) -> String {
        non_empty(&self.openai_api_url)
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }

    pub fn openai_model(&self) -> String {
        non_empty(&self.openai_model)
            .unwrap_or(DEFAULT_MODEL)
            .to_string()
    }

    /// Key from config, falling back to `OPENAI_API_KEY`.
    pub fn openai_api_key(&self) -> Option<String> {
        non_empty(&self.openai_api_key)
            .map(str::to_string)
            .or_else(|| {
                std::env::var("OPENAI_API_KEY")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
            })
    }

    pub fn report_dir(&self) -> PathBuf {
        PathBuf::from(non_empty(&self.report_dir).unwrap_or("."))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(match self.http_timeout_secs {
            Some(secs) if secs > 0 => secs,
            _ => DEFAULT_HTTP_TIMEOUT_SECS,
        })
    }
}
