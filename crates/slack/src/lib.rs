//! Slack Integration - slash-command bot interface
//!
//! This crate provides the Slack interface for shelfcheck:
//! - **Socket Mode** (`socket`) - event loop over a pluggable transport
//! - **Transport** (`transport`) - the Slack websocket behind that loop
//! - **Slash Commands** (`commands`) - `/info`, `/storestockcheck`, `/sync`
//! - **Events** (`events`) - envelope dispatch to handlers
//! - **Block Kit** (`blocks`) - product and stock cards
//! - **Responder** (`responder`) - immediate, deferred and follow-up replies
//! - **Registry** (`registry`) - the command manifest re-published by `/sync`
//!
//! # Architecture
//!
//! ```text
//! Slack Envelope → EventDispatcher → SlashCommandHandler → CommandRouter
//!                                                              ↓
//!                      InteractionResponder ← Block Kit ← CatalogCommandService
//! ```

pub mod blocks;
pub mod commands;
pub mod events;
pub mod registry;
pub mod responder;
pub mod socket;
pub mod transport;
