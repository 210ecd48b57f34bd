//! API client for the OpenAI HTTP API.
//!
//! `client` owns the transport and error classification; `chat`, `models` and
//! `usage` each add one endpoint to [`ApiClient`].

mod chat;
mod client;
mod models;
mod types;
mod usage;

pub use client::ApiClient;
pub use types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ModelList, UsageResponse,
};

#[cfg(test)]
pub use types::ApiStatus;
