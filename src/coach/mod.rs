//! AI coaching flows: training plans and footage analysis.
//!
//! The generative model is an external service reached over Ollama's
//! HTTP API.

pub mod client;
pub mod prompts;
#[cfg(test)]
pub(crate) mod stub;

pub use client::{CoachClient, CoachConfig, CoachError};
