//! Chat service integration for Slack.
//!
//! User lookups go through the Web API (`users.info`) with each team's API
//! token; deliveries go through each team's incoming webhook.

use std::{ops::Deref, sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::instrument;

use crate::base::{
    config::Config,
    types::{ChatUser, Res, Team, Void, WebhookPayload},
};

use super::{ChatClient, GenericChatClient, webhook::WebhookClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub client: Arc<FullClient>,
    pub webhook: WebhookClient,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Initialize the webhook poster.

        let webhook = WebhookClient::new(&config.webhook_base_url, Duration::from_secs(config.delivery_timeout_secs))?;

        Ok(Self { client, webhook })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self, team), fields(team = %team.id))]
    async fn user_info(&self, team: &Team, user: &str) -> Res<ChatUser> {
        let token = SlackApiToken::new(SlackApiTokenValue(team.api_token().to_string()));
        let session = self.open_session(&token);

        let request = SlackApiUsersInfoRequest::new(SlackUserId(user.to_string()));
        let response = session.users_info(&request).await.map_err(|e| anyhow!("Failed to look up user `{}`: {}", user, e))?;

        Ok(user_from_slack(response.user))
    }

    async fn post_webhook(&self, team: &Team, payload: &WebhookPayload) -> Void {
        self.webhook.post(team, payload).await
    }
}

/// Map a Slack user to its name and original-size avatar.
fn user_from_slack(user: SlackUser) -> ChatUser {
    let image_url = user.profile.as_ref().and_then(|p| p.icon.as_ref()).and_then(|i| i.image_original.clone());
    let name = user.name.unwrap_or(user.id.0);

    ChatUser { name, image_url }
}

// Tests.
