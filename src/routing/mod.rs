//! Routing tables for the bridge.
//!
//! Everything here is built once at startup and read-only afterwards:
//! - Teams and their credentials.
//! - Channel groups that mirror each other.
//! - Outgoing-webhook tokens used to authenticate inbound posts.

pub mod groups;
pub mod teams;
pub mod tokens;

use std::{ops::Deref, sync::Arc};

use tracing::{info, instrument, warn};

use crate::base::{config::Config, error::ConfigError};

use groups::ChannelGroupTable;
use teams::TeamRegistry;
use tokens::OutboundTokenTable;

/// The complete routing configuration.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Debug, Clone)]
pub struct Routing {
    inner: Arc<RoutingInner>,
}

impl Deref for Routing {
    type Target = RoutingInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug)]
pub struct RoutingInner {
    pub teams: TeamRegistry,
    pub groups: ChannelGroupTable,
    pub tokens: OutboundTokenTable,
}

impl Routing {
    pub fn new(teams: TeamRegistry, groups: ChannelGroupTable, tokens: OutboundTokenTable) -> Self {
        for channel in groups.channels() {
            if teams.resolve(&channel.team_id).is_none() {
                warn!("Channel {} belongs to an unconfigured team; deliveries to it will fail.", channel);
            }
        }

        Self {
            inner: Arc::new(RoutingInner { teams, groups, tokens }),
        }
    }

    /// Parse the routing lists out of the application configuration.
    #[instrument(name = "Routing::from_config", skip_all)]
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let teams = TeamRegistry::parse(&config.teams)?;
        if teams.is_empty() {
            return Err(ConfigError::Missing("teams"));
        }

        let groups = ChannelGroupTable::parse(&config.channel_map)?;
        if groups.is_empty() {
            return Err(ConfigError::Missing("channel_map"));
        }

        let tokens = OutboundTokenTable::parse(&config.outbound_tokens)?;
        if tokens.is_empty() {
            return Err(ConfigError::Missing("outbound_tokens"));
        }

        info!("Loaded {} teams, {} channel groups and {} outbound tokens.", teams.len(), groups.len(), tokens.len());

        Ok(Self::new(teams, groups, tokens))
    }
}
