#![cfg(test)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mockall::mock;
use slackline::{
    base::types::{ChatUser, Res, Team, Void, WebhookPayload},
    ingress::{self, IngressState},
    routing::{Routing, groups::ChannelGroupTable, teams::TeamRegistry, tokens::OutboundTokenTable},
    service::chat::{ChatClient, GenericChatClient},
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

// Mocks.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn user_info(&self, team: &Team, user: &str) -> Res<ChatUser>;
        async fn post_webhook(&self, team: &Team, payload: &WebhookPayload) -> Void;
    }
}

/// A chat client that knows nobody and reports every delivery on a channel.
///
/// Deliveries into `failing_team` fail after being reported.
fn get_mock_chat(failing_team: Option<&'static str>) -> (MockChat, UnboundedReceiver<(String, String)>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut mock = MockChat::new();

    mock.expect_user_info().returning(|_, user| Err(anyhow::anyhow!("user_not_found: {user}")));
    mock.expect_post_webhook().returning(move |team, payload| {
        let _ = tx.send((team.id.clone(), payload.channel.clone()));

        if Some(team.id.as_str()) == failing_team {
            Err(anyhow::anyhow!("connection reset"))
        } else {
            Ok(())
        }
    });

    (mock, rx)
}

/// Helper function to setup the test router.
fn setup_test_router(chat: MockChat) -> axum::Router {
    let routing = Routing::new(
        TeamRegistry::parse("T1:xoxb-1:B1/x,T2:xoxb-2:B2/y,T3:xoxb-3:B3/z").unwrap(),
        ChannelGroupTable::parse("T1/C1:T2/C2:T3/C3,T1/C7:T2/C7").unwrap(),
        OutboundTokenTable::parse("T1/C1:tok-1,T2/C2:tok-2").unwrap(),
    );

    ingress::router(IngressState {
        routing,
        chat: ChatClient::new(Arc::new(chat)),
        tasks: TaskTracker::new(),
    })
}

fn post_bridge(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/bridge")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect deliveries until none arrive for a short while.
async fn collect_deliveries(rx: &mut UnboundedReceiver<(String, String)>) -> Vec<(String, String)> {
    let mut deliveries = Vec::new();

    while let Ok(Some(delivery)) = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
        deliveries.push(delivery);
    }

    deliveries.sort();
    deliveries
}

#[tokio::test]
async fn test_verified_post_reaches_every_other_channel() {
    let (chat, mut rx) = get_mock_chat(None);
    let router = setup_test_router(chat);

    let response = router
        .oneshot(post_bridge("team_id=T1&channel_id=C1&user_name=alice&text=hello+%3C%40U1%3E&token=tok-1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        collect_deliveries(&mut rx).await,
        vec![("T2".to_string(), "C2".to_string()), ("T3".to_string(), "C3".to_string())]
    );
}

#[tokio::test]
async fn test_failed_delivery_does_not_stop_the_rest() {
    let (chat, mut rx) = get_mock_chat(Some("T2"));
    let router = setup_test_router(chat);

    let response = router.oneshot(post_bridge("team_id=T1&channel_id=C1&user_name=alice&text=hi&token=tok-1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        collect_deliveries(&mut rx).await,
        vec![("T2".to_string(), "C2".to_string()), ("T3".to_string(), "C3".to_string())]
    );
}

#[tokio::test]
async fn test_bad_token_still_returns_ok() {
    let (chat, mut rx) = get_mock_chat(None);
    let router = setup_test_router(chat);

    let response = router.oneshot(post_bridge("team_id=T1&channel_id=C1&user_name=alice&text=hi&token=nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(collect_deliveries(&mut rx).await.is_empty());
}

#[tokio::test]
async fn test_channel_without_token_is_dropped() {
    let (chat, mut rx) = get_mock_chat(None);
    let router = setup_test_router(chat);

    let response = router.oneshot(post_bridge("team_id=T1&channel_id=C7&user_name=alice&text=hi&token=")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(collect_deliveries(&mut rx).await.is_empty());
}

#[tokio::test]
async fn test_slackbot_posts_are_not_relayed() {
    let (chat, mut rx) = get_mock_chat(None);
    let router = setup_test_router(chat);

    let response = router.oneshot(post_bridge("team_id=T1&channel_id=C1&user_name=slackbot&text=hi&token=tok-1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(collect_deliveries(&mut rx).await.is_empty());
}

#[tokio::test]
async fn test_undecodable_body_still_returns_ok() {
    let (chat, mut rx) = get_mock_chat(None);
    let router = setup_test_router(chat);

    let request = Request::builder().method("POST").uri("/bridge").header("content-type", "application/json").body(Body::from("{}")).unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(collect_deliveries(&mut rx).await.is_empty());
}

#[tokio::test]
async fn test_health() {
    let (chat, _rx) = get_mock_chat(None);
    let router = setup_test_router(chat);

    let response = router.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
