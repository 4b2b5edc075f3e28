//! Team registry: credentials per team, and user lookups through them.

use std::collections::HashMap;

use anyhow::anyhow;
use tracing::instrument;

use crate::{
    base::{
        error::ConfigError,
        types::{ChatUser, Res, Team},
    },
    service::chat::GenericChatClient,
};

/// Team id → team credentials.
#[derive(Debug, Default)]
pub struct TeamRegistry {
    teams: HashMap<String, Team>,
}

impl TeamRegistry {
    pub fn new(teams: Vec<Team>) -> Result<Self, ConfigError> {
        let mut map = HashMap::with_capacity(teams.len());

        for team in teams {
            if map.contains_key(&team.id) {
                return Err(ConfigError::DuplicateTeam(team.id));
            }

            map.insert(team.id.clone(), team);
        }

        Ok(Self { teams: map })
    }

    /// Parse `TEAM_ID:API_TOKEN:INCOMING_TOKEN,...`.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let teams = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Team>, _>>()?;

        Self::new(teams)
    }

    pub fn resolve(&self, team_id: &str) -> Option<&Team> {
        self.teams.get(team_id)
    }

    /// Look up `user` (an id or a username) in `team_id` with that team's API token.
    #[instrument(skip(self, chat))]
    pub async fn lookup_user(&self, chat: &dyn GenericChatClient, team_id: &str, user: &str) -> Res<ChatUser> {
        let team = self.resolve(team_id).ok_or_else(|| anyhow!("Team `{}` is not configured.", team_id))?;

        chat.user_info(team, user).await
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
