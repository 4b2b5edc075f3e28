//! Incoming-webhook delivery over plain HTTPS.

use std::time::Duration;

use anyhow::anyhow;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::base::types::{Res, Team, Void, WebhookPayload};

/// Posts payloads to `{base_url}/{team_id}/{incoming_token}`.
#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    base_url: String,
}

impl WebhookClient {
    /// Create a webhook client whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Res<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, team: &Team) -> String {
        format!("{}/{}/{}", self.base_url, team.id, team.incoming_token())
    }

    /// Deliver `payload` into `team`; only a `200 OK` counts as delivered.
    #[instrument(name = "WebhookClient::post", skip_all, fields(team = %team.id, channel = %payload.channel))]
    pub async fn post(&self, team: &Team, payload: &WebhookPayload) -> Void {
        let response = self
            .http
            .post(self.url_for(team))
            .json(payload)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to post webhook: {}", e.without_url()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} - {}", status, body));
        }

        debug!("Webhook delivered.");

        Ok(())
    }
}

// Tests.
