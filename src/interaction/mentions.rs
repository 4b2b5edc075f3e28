//! Rewrites `<@ID>` / `<@ID|name>` mention markup into plain `@name` text.
//!
//! Peers live in other teams, so user ids from the origin team mean nothing
//! there; a plain `@name` is linkified by the receiving side instead.

use std::{
    collections::{BTreeSet, HashMap},
    sync::LazyLock,
};

use futures::future::join_all;
use regex::{Captures, Regex};
use tracing::{instrument, warn};

use crate::{base::types::BridgeMessage, routing::teams::TeamRegistry, service::chat::GenericChatClient};

/// `<@ID>` or `<@ID|name>`; anything after a second `|` is dropped.
static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<@([^>|]*)(?:\|([^>|]*)[^>]*)?>").expect("mention pattern is valid"));

/// Inline display name of a mention, if it carries a non-empty one.
fn inline_name<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(2).map(|m| m.as_str()).filter(|name| !name.is_empty())
}

/// Id a mention refers to; empty for markup such as `<@>` or `<@|>`.
fn mention_id<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1).map_or("", |m| m.as_str())
}

/// Replace every mention in the message text.
///
/// Inline names are used as-is. Bare ids are looked up in the origin team
/// (once per distinct id); an id that cannot be resolved stays as `@ID`.
#[instrument(skip_all, fields(channel = %message.channel))]
pub async fn rewrite_mentions(message: &mut BridgeMessage, teams: &TeamRegistry, chat: &dyn GenericChatClient) {
    let team_id = message.channel.team_id.as_str();

    let ids: BTreeSet<&str> = MENTION
        .captures_iter(&message.text)
        .filter(|caps| inline_name(caps).is_none())
        .map(|caps| mention_id(&caps))
        .filter(|id| !id.is_empty())
        .collect();

    let lookups = ids.into_iter().map(|id| async move {
        match teams.lookup_user(chat, team_id, id).await {
            Ok(user) => Some((id.to_string(), user.name)),
            Err(err) => {
                warn!("Unable to map {} to username: {}", id, err);
                None
            }
        }
    });

    let names: HashMap<String, String> = join_all(lookups).await.into_iter().flatten().collect();

    let text = MENTION
        .replace_all(&message.text, |caps: &Captures| {
            let id = mention_id(caps);

            match inline_name(caps) {
                Some(name) => format!("@{name}"),
                // Nothing to name; leave the markup as it was.
                None if id.is_empty() => caps[0].to_string(),
                None => format!("@{}", names.get(id).map_or(id, String::as_str)),
            }
        })
        .into_owned();

    message.text = text;
}

// Tests.
