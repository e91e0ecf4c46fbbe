//! Invite Bot Library
//!
//! A Matrix bot that joins rooms it is invited to and answers a small set
//! of admin commands.
//!
//! This crate provides the core functionality for:
//! - Loading and validating the connector configuration
//! - Talking to a Matrix homeserver over the client-server API
//! - Accepting room invites while auto-accept is enabled
//! - Handling `!` commands sent from the designated admin room

pub mod bot;
pub mod commands;
pub mod config;
pub mod invite;
pub mod matrix;
