use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_ENV: &str = "MAIL_DIGEST_CONFIG";
const API_BASE_ENV: &str = "OPENAI_API_BASE";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub imap_port: u16,
    pub mailbox: String,
    pub max_messages: usize,
    pub max_body_tokens: usize,
    pub api_key_file: PathBuf,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub summary_max_tokens: u32,
    pub brief_max_tokens: u32,
    /// Unset means completion requests never time out.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            imap_port: 993,
            mailbox: "INBOX".to_string(),
            max_messages: 10,
            max_body_tokens: 1950,
            api_key_file: PathBuf::from("api_key"),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo-instruct".to_string(),
            temperature: 0.5,
            summary_max_tokens: 200,
            brief_max_tokens: 1000,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("mail_digest"))
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(p));
    }
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config file if there is one; defaults otherwise.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    let mut cfg = if path.exists() {
        let s = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        parse_config(&s).with_context(|| format!("parsing {}", path.display()))?
    } else {
        log::debug!("no config at {}, using defaults", path.display());
        Config::default()
    };

    if let Ok(base) = std::env::var(API_BASE_ENV) {
        cfg.api_base = base;
    }
    Ok(cfg)
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    if cfg.max_body_tokens == 0 {
        anyhow::bail!("max_body_tokens must be at least 1");
    }
    Ok(cfg)
}
