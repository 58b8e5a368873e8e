//! LLM client abstraction for the agent runtime.
//!
//! The runtime depends on the narrow [`LLMClient`](client::LLMClient) trait;
//! the concrete client is OpenAI-backed and built per session from the
//! credentials supplied with the start request.

/// Client trait.
pub mod client;
/// OpenAI-backed client.
pub mod openai;

pub use client::LLMClient;
pub use openai::OpenAIClient;
