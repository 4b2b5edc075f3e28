//! Message handling for slackline.
//!
//! This module provides the steps an inbound post goes through:
//! - Verifying and relaying the post
//! - Attaching the sender avatar and rewriting mentions
//! - Forwarding to every peer channel

pub mod avatar;
pub mod bridge;
pub mod forward;
pub mod mentions;
