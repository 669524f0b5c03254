//! Todow - command-line client
//!
//! Talks to a todow server over its JSON API and renders the results as
//! text.

pub mod client;
pub mod render;

pub use client::{ClientConfig, ClientError, Listing, TodowClient};
