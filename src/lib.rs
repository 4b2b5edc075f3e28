//! Library root for `slackline`.
//!
//! Slackline links channels across Slack teams. A message posted in one
//! channel of a group is relayed to every other channel in that group:
//! - Posts arrive from each channel's outgoing webhook and are verified by token
//! - Mentions are rewritten to plain names and the sender avatar is attached
//! - Each peer receives the message through its own team's incoming webhook
//!
//! All routing is configured up front and held in memory for the process lifetime.

#[deny(missing_docs)]
pub mod base;
pub mod ingress;
pub mod interaction;
pub mod routing;
pub mod runtime;
pub mod service;

use anyhow::anyhow;
use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the slackline runtime:
/// - Initializes the crypto provider
/// - Builds the routing tables and the chat client
/// - Serves the ingress endpoint
pub async fn start(config: Config) -> Void {
    info!("Starting slackline ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().map_err(|_| anyhow!("Failed to install the crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
