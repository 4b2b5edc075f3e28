//! Service integrations for external APIs and clients.
//!
//! This module contains the chat provider integration used by slackline.
//! It defines a generic trait and a concrete Slack implementation,
//! allowing for extensibility and easy testing.

pub mod chat;
