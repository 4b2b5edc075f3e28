//! Startup configuration errors.

use thiserror::Error;

use super::types::Channel;

/// A fatal problem with the routing configuration.
///
/// Any of these aborts startup; the bridge never runs with a partial table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required list was not configured.
    #[error("Configuration `{0}` is missing or empty.")]
    Missing(&'static str),
    /// A team entry is not three non-empty `:`-separated parts.
    #[error("Team entry for `{0}` must be `TEAM_ID:API_TOKEN:INCOMING_TOKEN`.")]
    MalformedTeam(String),
    /// A channel is not `TEAM_ID/CHANNEL_ID`.
    #[error("Channel `{0}` must be `TEAM_ID/CHANNEL_ID`.")]
    MalformedChannel(String),
    /// An outbound token entry has no `:` or an empty token.
    #[error("Outbound token entry for `{0}` must be `TEAM_ID/CHANNEL_ID:TOKEN`.")]
    MalformedToken(String),
    /// Two team entries share an id.
    #[error("Team `{0}` is configured more than once.")]
    DuplicateTeam(String),
    /// A channel belongs to more than one group.
    #[error("{0} already present in channel map configuration.")]
    DuplicateChannel(Channel),
    /// A channel has more than one outbound token.
    #[error("Outbound token for {0} is configured more than once.")]
    DuplicateToken(Channel),
}
