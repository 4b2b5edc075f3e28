//! Attaches the sender's avatar to a message.

use tracing::{instrument, warn};

use crate::{base::types::BridgeMessage, routing::teams::TeamRegistry, service::chat::GenericChatClient};

/// Look the sender up in the origin team and set `icon_url` from their profile.
///
/// A failed lookup leaves the message without an avatar.
#[instrument(skip_all, fields(channel = %message.channel, user = %message.username))]
pub async fn fetch_avatar(message: &mut BridgeMessage, teams: &TeamRegistry, chat: &dyn GenericChatClient) {
    match teams.lookup_user(chat, &message.channel.team_id, &message.username).await {
        Ok(user) => {
            if user.image_url.is_some() {
                message.icon_url = user.image_url;
            }
        }
        Err(err) => warn!("Unable to fetch avatar for {}: {}", message.username, err),
    }
}
