//! HTTP ingress: the endpoint outgoing webhooks post to.

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tokio_util::task::TaskTracker;
use tower_http::trace::TraceLayer;
use tracing::{instrument, warn};

use crate::{
    base::types::{BridgeMessage, Channel},
    interaction::bridge::handle_bridge_post,
    routing::Routing,
    service::chat::ChatClient,
};

/// Shared state for the ingress handlers.
#[derive(Clone)]
pub struct IngressState {
    pub routing: Routing,
    pub chat: ChatClient,
    /// Relays still in flight.
    pub tasks: TaskTracker,
}

/// Form fields sent by an outgoing webhook. Missing fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BridgeForm {
    pub team_id: String,
    pub channel_id: String,
    pub user_name: String,
    pub text: String,
    pub token: String,
}

impl BridgeForm {
    /// Split the form into the message and the presented token.
    pub fn into_parts(self) -> (BridgeMessage, String) {
        let message = BridgeMessage::new(Channel::new(self.team_id, self.channel_id), self.user_name, self.text);
        (message, self.token)
    }
}

/// Build the ingress router.
pub fn router(state: IngressState) -> Router {
    Router::new()
        .route("/bridge", post(bridge))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Accept a post and relay it in the background.
///
/// The poster always gets `200 OK`; problems only show up in the logs.
#[instrument(skip_all)]
async fn bridge(State(state): State<IngressState>, form: Result<Form<BridgeForm>, FormRejection>) -> StatusCode {
    match form {
        Ok(Form(form)) => {
            let (message, token) = form.into_parts();
            handle_bridge_post(message, token, state.routing.clone(), state.chat.clone(), &state.tasks);
        }
        Err(rejection) => warn!("Unable to decode bridge post: {}", rejection),
    }

    StatusCode::OK
}

async fn health() -> StatusCode {
    StatusCode::OK
}
