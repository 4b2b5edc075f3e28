pub mod slack;
pub mod webhook;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ChatUser, Res, Team, Void, WebhookPayload};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This is the narrow surface the bridge needs from a chat provider: looking
/// users up, and posting into a team through its incoming webhook.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Look up a user in `team` by id or username.
    ///
    /// Used to resolve bare mentions to names and to find sender avatars.
    async fn user_info(&self, team: &Team, user: &str) -> Res<ChatUser>;

    /// Post a message into `team` through its incoming webhook.
    ///
    /// Anything other than a confirmed delivery is an error.
    async fn post_webhook(&self, team: &Team, payload: &WebhookPayload) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}

// Tests.
