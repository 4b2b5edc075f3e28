//! Outgoing-webhook tokens: proof that a post really came from a channel.

use std::collections::HashMap;

use secrecy::{ExposeSecret, Secret};

use crate::base::{error::ConfigError, types::Channel};

/// Channel → expected outgoing-webhook token.
#[derive(Debug, Default)]
pub struct OutboundTokenTable {
    tokens: HashMap<Channel, Secret<String>>,
}

impl OutboundTokenTable {
    pub fn new(entries: impl IntoIterator<Item = (Channel, String)>) -> Result<Self, ConfigError> {
        let mut tokens = HashMap::new();

        for (channel, token) in entries {
            if tokens.contains_key(&channel) {
                return Err(ConfigError::DuplicateToken(channel));
            }

            tokens.insert(channel, Secret::new(token));
        }

        Ok(Self { tokens })
    }

    /// Parse `TID/CID:TOKEN,...`.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let entries = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (channel, token) = entry.split_once(':').ok_or_else(|| ConfigError::MalformedToken(entry.to_string()))?;

                if token.is_empty() {
                    return Err(ConfigError::MalformedToken(channel.to_string()));
                }

                Ok((channel.parse::<Channel>()?, token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(entries)
    }

    /// Whether `presented` is the token registered for `channel`.
    ///
    /// Channels without a registered token reject everything.
    pub fn verify(&self, channel: &Channel, presented: &str) -> bool {
        self.tokens
            .get(channel)
            .is_some_and(|expected| constant_time_eq(expected.expose_secret().as_bytes(), presented.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
