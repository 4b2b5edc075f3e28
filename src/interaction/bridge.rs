//! Handles one post received from a channel's outgoing webhook.

use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info, instrument, warn};

use crate::{
    base::types::BridgeMessage,
    interaction::{
        avatar::fetch_avatar,
        forward::{ForwardReport, forward},
        mentions::rewrite_mentions,
    },
    routing::Routing,
    service::chat::{ChatClient, GenericChatClient},
};

/// Username the chat provider posts its own automated messages as.
///
/// Relaying those would echo bridged messages back and forth.
pub const BOT_USERNAME: &str = "slackbot";

/// How a single inbound post was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The token did not match the channel's registered token.
    Rejected,
    /// The post came from the provider's bot user.
    Suppressed,
    /// The post was forwarded to the channel's peers.
    Forwarded(ForwardReport),
}

/// Relays an inbound post in the background.
///
/// The caller never waits on, or can cancel, the relay. The task is
/// registered on `tasks` so shutdown can drain it.
#[instrument(skip_all)]
pub fn handle_bridge_post(message: BridgeMessage, token: String, routing: Routing, chat: ChatClient, tasks: &TaskTracker) {
    tasks.spawn(
        async move {
            let outcome = relay_message(message, &token, &routing, &*chat).await;
            debug!("Relay finished: {:?}", outcome);
        }
        .in_current_span(),
    );
}

/// Verify, enrich and forward one inbound post.
#[instrument(skip_all, fields(channel = %message.channel, user = %message.username))]
pub async fn relay_message(mut message: BridgeMessage, token: &str, routing: &Routing, chat: &dyn GenericChatClient) -> RelayOutcome {
    if !routing.tokens.verify(&message.channel, token) {
        warn!("Incorrect webhook token for {}.", message.channel);
        return RelayOutcome::Rejected;
    }

    if message.username == BOT_USERNAME {
        debug!("Ignoring message from {}.", BOT_USERNAME);
        return RelayOutcome::Suppressed;
    }

    info!("Relaying message ...");

    fetch_avatar(&mut message, &routing.teams, chat).await;
    rewrite_mentions(&mut message, &routing.teams, chat).await;

    RelayOutcome::Forwarded(forward(&message, routing, chat).await)
}

// Tests.
