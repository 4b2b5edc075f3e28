//! Common types and result aliases.

use std::{fmt, str::FromStr};

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Error type used across the crate.
pub type Err = anyhow::Error;
/// Result with the crate error type.
pub type Res<T> = Result<T, Err>;
/// Result carrying no value.
pub type Void = Res<()>;

/// A channel within a team, displayed and parsed as `TEAM/CHANNEL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Channel {
    /// Team the channel lives in.
    pub team_id: String,
    /// Channel id within the team.
    pub channel_id: String,
}

impl Channel {
    /// Create a channel from its team and channel ids.
    pub fn new(team_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.team_id, self.channel_id)
    }
}

impl FromStr for Channel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedChannel(s.to_string());

        let (team_id, channel_id) = s.trim().split_once('/').ok_or_else(malformed)?;

        if team_id.is_empty() || channel_id.is_empty() || channel_id.contains('/') {
            return Err(malformed());
        }

        Ok(Self::new(team_id, channel_id))
    }
}

/// A chat team and the credentials used to talk to it.
///
/// Both tokens are kept behind [`Secret`] so they never end up in logs.
#[derive(Debug)]
pub struct Team {
    /// Team id (`Txxxxxxx`).
    pub id: String,
    api_token: Secret<String>,
    incoming_token: Secret<String>,
}

impl Team {
    /// Create a team from its id and both tokens.
    pub fn new(id: impl Into<String>, api_token: impl Into<String>, incoming_token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            api_token: Secret::new(api_token.into()),
            incoming_token: Secret::new(incoming_token.into()),
        }
    }

    /// Web API token used for user lookups.
    pub fn api_token(&self) -> &str {
        self.api_token.expose_secret()
    }

    /// Incoming-webhook token (`Bxxxxxxx/xxxxxxxx`) used to post into the team.
    pub fn incoming_token(&self) -> &str {
        self.incoming_token.expose_secret()
    }
}

impl FromStr for Team {
    type Err = ConfigError;

    /// Parses `TEAM_ID:API_TOKEN:INCOMING_TOKEN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();

        match parts.as_slice() {
            [id, api_token, incoming_token] if !id.is_empty() && !api_token.is_empty() && !incoming_token.is_empty() => Ok(Self::new(*id, *api_token, *incoming_token)),
            // Never echo the entry back, it carries tokens.
            _ => Err(ConfigError::MalformedTeam(parts.first().copied().unwrap_or_default().to_string())),
        }
    }
}

/// A message received from a channel's outgoing webhook, on its way to the peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeMessage {
    /// The channel the message was posted in.
    pub channel: Channel,
    /// Username of the sender.
    pub username: String,
    /// Message body.
    pub text: String,
    /// Sender avatar, if one could be found.
    pub icon_url: Option<String>,
}

impl BridgeMessage {
    /// Create a message without an avatar.
    pub fn new(channel: Channel, username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel,
            username: username.into(),
            text: text.into(),
            icon_url: None,
        }
    }

    /// Build the webhook body for a delivery into `destination`.
    pub fn payload_for(&self, destination: &Channel) -> WebhookPayload {
        WebhookPayload {
            channel: destination.channel_id.clone(),
            username: self.username.clone(),
            text: self.text.clone(),
            icon_url: self.icon_url.clone(),
            link_names: true,
        }
    }
}

/// JSON body posted to an incoming webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Destination channel id.
    pub channel: String,
    /// Name shown as the sender.
    pub username: String,
    /// Message body.
    pub text: String,
    /// Avatar shown next to the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Ask the receiving side to linkify `@name` mentions.
    pub link_names: bool,
}

/// The parts of a chat user profile the bridge cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatUser {
    /// Username.
    pub name: String,
    /// Original-size profile image.
    pub image_url: Option<String>,
}
