//! Core components, types, and utilities for slackline.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Startup configuration errors.
//! - Common types and result handling.

pub mod config;
pub mod error;
pub mod types;
