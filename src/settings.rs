use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use tracing::debug;

use crate::submit::form::DEFAULT_BASE_URL;

const ENV_PREFIX: &str = "LEADS";

/// Environment-backed settings (`LEADS_*`, optionally from a local `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub session_cookie: Option<String>,
    /// Industry the form page has selected, used when no `--industry` is given.
    pub industry: Option<String>,
    pub location: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        let cfg = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read LEADS_* settings")?;
        Ok(Self::from_config(&cfg))
    }

    fn from_config(cfg: &Config) -> Self {
        let get = |key: &str| {
            cfg.get_string(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            base_url: get("base_url").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            session_cookie: get("session_cookie"),
            industry: get("industry"),
            location: get("location"),
        }
    }

    /// The form authenticates by session cookie; without one there is nothing to submit to.
    pub fn require_session_cookie(&self) -> Result<String> {
        match &self.session_cookie {
            Some(cookie) => Ok(cookie.clone()),
            None => bail!(
                "No session cookie. Log in to the lead form and set {}_SESSION_COOKIE.",
                ENV_PREFIX
            ),
        }
    }
}
