//! Fans a message out to every other channel in its group.

use anyhow::anyhow;
use futures::future::join_all;
use tracing::{error, info, instrument};

use crate::{
    base::types::{BridgeMessage, Channel, Void},
    routing::Routing,
    service::chat::GenericChatClient,
};

/// What happened to each peer of a forwarded message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ForwardReport {
    pub delivered: Vec<Channel>,
    pub failed: Vec<Channel>,
}

impl ForwardReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Deliver `message` to every peer of its channel, except the channel itself.
///
/// Deliveries run concurrently and fail independently; each failure is logged
/// and reported, never retried, and never stops the other deliveries.
#[instrument(skip_all, fields(channel = %message.channel))]
pub async fn forward(message: &BridgeMessage, routing: &Routing, chat: &dyn GenericChatClient) -> ForwardReport {
    let peers = routing.groups.peers_of(&message.channel).iter().filter(|peer| **peer != message.channel);

    let deliveries = peers.map(|peer| async move {
        let result = deliver(message, peer, routing, chat).await;
        (peer, result)
    });

    let mut report = ForwardReport::default();

    for (peer, result) in join_all(deliveries).await {
        match result {
            Ok(()) => report.delivered.push(peer.clone()),
            Err(err) => {
                error!("Failed to forward message to {}: {}", peer, err);
                report.failed.push(peer.clone());
            }
        }
    }

    if report.attempted() > 0 {
        info!("Forwarded to {} of {} peers.", report.delivered.len(), report.attempted());
    }

    report
}

async fn deliver(message: &BridgeMessage, peer: &Channel, routing: &Routing, chat: &dyn GenericChatClient) -> Void {
    let team = routing.teams.resolve(&peer.team_id).ok_or_else(|| anyhow!("Team `{}` is not configured.", peer.team_id))?;

    chat.post_webhook(team, &message.payload_for(peer)).await
}

// Tests.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        routing::{groups::ChannelGroupTable, teams::TeamRegistry, tokens::OutboundTokenTable},
        service::chat::tests::MockChat,
    };

    fn routing(channel_map: &str) -> Routing {
        Routing::new(
            TeamRegistry::parse("T1:xoxb-1:B1/x,T2:xoxb-2:B2/y,T3:xoxb-3:B3/z").unwrap(),
            ChannelGroupTable::parse(channel_map).unwrap(),
            OutboundTokenTable::default(),
        )
    }

    fn message() -> BridgeMessage {
        BridgeMessage::new(Channel::new("T1", "C1"), "alice", "hello")
    }

    fn recording_chat(fail_team: Option<&'static str>) -> (MockChat, Arc<Mutex<Vec<(String, String)>>>) {
        let posts = Arc::new(Mutex::new(Vec::new()));
        let recorded = posts.clone();

        let mut chat = MockChat::new();
        chat.expect_post_webhook().returning(move |team, payload| {
            recorded.lock().unwrap().push((team.id.clone(), payload.channel.clone()));

            if Some(team.id.as_str()) == fail_team {
                Err(anyhow!("connection refused"))
            } else {
                Ok(())
            }
        });

        (chat, posts)
    }

    #[tokio::test]
    async fn delivers_to_every_peer_but_the_origin() {
        let routing = routing("T1/C1:T2/C2:T3/C3");
        let (chat, posts) = recording_chat(None);

        let report = forward(&message(), &routing, &chat).await;

        let mut posts = posts.lock().unwrap().clone();
        posts.sort();
        assert_eq!(posts, vec![("T2".to_string(), "C2".to_string()), ("T3".to_string(), "C3".to_string())]);
        assert_eq!(report.delivered, vec![Channel::new("T2", "C2"), Channel::new("T3", "C3")]);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn one_failed_peer_does_not_stop_the_others() {
        let routing = routing("T1/C1:T2/C2:T3/C3");
        let (chat, posts) = recording_chat(Some("T2"));

        let report = forward(&message(), &routing, &chat).await;

        assert_eq!(posts.lock().unwrap().len(), 2);
        assert_eq!(report.delivered, vec![Channel::new("T3", "C3")]);
        assert_eq!(report.failed, vec![Channel::new("T2", "C2")]);
    }

    #[tokio::test]
    async fn ungrouped_channel_is_a_no_op() {
        let routing = routing("T2/C2:T3/C3");
        let mut chat = MockChat::new();
        chat.expect_post_webhook().never();

        let report = forward(&message(), &routing, &chat).await;

        assert_eq!(report, ForwardReport::default());
    }

    #[tokio::test]
    async fn peer_in_unconfigured_team_fails_alone() {
        let routing = routing("T1/C1:T9/C9:T2/C2");
        let (chat, posts) = recording_chat(None);

        let report = forward(&message(), &routing, &chat).await;

        assert_eq!(*posts.lock().unwrap(), vec![("T2".to_string(), "C2".to_string())]);
        assert_eq!(report.failed, vec![Channel::new("T9", "C9")]);
    }

    #[tokio::test]
    async fn payload_carries_sender_text_and_avatar() {
        let routing = routing("T1/C1:T2/C2");

        let mut chat = MockChat::new();
        chat.expect_post_webhook()
            .withf(|team, payload| {
                team.incoming_token() == "B2/y"
                    && payload.channel == "C2"
                    && payload.username == "alice"
                    && payload.text == "hello"
                    && payload.icon_url.as_deref() == Some("https://example.com/a.png")
                    && payload.link_names
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut msg = message();
        msg.icon_url = Some("https://example.com/a.png".to_string());

        let report = forward(&msg, &routing, &chat).await;

        assert_eq!(report.delivered.len(), 1);
    }
}
