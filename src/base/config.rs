//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::{Res, Void};

/// Default address to bind the ingress listener to.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default port for the ingress listener.
fn default_port() -> u16 {
    8080
}

/// Default timeout, in seconds, for a single webhook delivery.
fn default_delivery_timeout_secs() -> u64 {
    10
}

/// Default base URL for incoming webhooks.
fn default_webhook_base_url() -> String {
    "https://hooks.slack.com/services".to_string()
}

/// Configuration for the slackline application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared settings.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Settings as read from the environment and the config file.
#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Teams as `TEAM_ID:API_TOKEN:INCOMING_TOKEN,...` (`SLACKLINE_TEAMS`).
    #[serde(default)]
    pub teams: String,
    /// Channel groups as `TID/CID:TID/CID,...` (`SLACKLINE_CHANNEL_MAP`).
    /// Each comma-separated entry is one group of mirrored channels.
    #[serde(default)]
    pub channel_map: String,
    /// Outgoing-webhook tokens as `TID/CID:TOKEN,...` (`SLACKLINE_OUTBOUND_TOKENS`).
    #[serde(default)]
    pub outbound_tokens: String,
    /// Address to bind (`SLACKLINE_HOST`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind (`SLACKLINE_PORT`, or plain `PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timeout for each webhook delivery (`SLACKLINE_DELIVERY_TIMEOUT_SECS`).
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
    /// Base URL incoming-webhook paths are appended to (`SLACKLINE_WEBHOOK_BASE_URL`).
    #[serde(default = "default_webhook_base_url")]
    pub webhook_base_url: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            teams: String::new(),
            channel_map: String::new(),
            outbound_tokens: String::new(),
            host: default_host(),
            port: default_port(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
            webhook_base_url: default_webhook_base_url(),
        }
    }
}

impl Config {
    /// Wrap already-built settings.
    pub fn new(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// Load settings from `SLACKLINE_*` variables, then the given TOML file
    /// (or `.hidden/config.toml`), then a bare `PORT`, and validate them.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("SLACKLINE"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        // Hosting platforms hand out the port as a bare `PORT`.
        cfg = cfg.set_override_option("port", std::env::var("PORT").ok())?;

        let result = Config::new(cfg.build()?.try_deserialize()?);
        result.validate()?;

        Ok(result)
    }

    /// Check the scalar settings; the routing lists are checked when parsed.
    pub fn validate(&self) -> Void {
        if self.port == 0 {
            return Err(anyhow::anyhow!("Port must be non-zero."));
        }

        if self.delivery_timeout_secs < 1 || self.delivery_timeout_secs > 300 {
            return Err(anyhow::anyhow!("Delivery timeout must be between 1 and 300 seconds."));
        }

        if self.webhook_base_url.is_empty() {
            return Err(anyhow::anyhow!("Webhook base URL must not be empty."));
        }

        Ok(())
    }
}
