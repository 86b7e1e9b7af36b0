//! # IO Module
//!
//! Adapters at the edges of the engine:
//!
//! - **rest**: the axum HTTP API the family app talks to
//! - **completion_client**: the outbound chat-completions client behind
//!   `TextCompletion`

pub mod completion_client;
pub mod rest;

pub use completion_client::ChatCompletionClient;
pub use rest::*;
