//! Chat completion endpoint.

use anyhow::Result;
use reqwest::Method;
use tracing::debug;

use super::client::ApiClient;
use super::types::{ChatCompletionRequest, ChatCompletionResponse};

impl ApiClient {
    /// Call `POST chat/completions` with a non-streaming request.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!("Requesting chat completion from {}", request.model);
        self.call_api(Method::POST, "chat/completions", &[], Some(request))
            .await
    }
}
