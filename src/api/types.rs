//! API request and response types for the OpenAI HTTP API.
//!
//! Only the fields the probes read are modelled. Everything the service may
//! omit is an `Option` or defaults to empty.

use serde::{Deserialize, Serialize};

// ============================================================================
// Chat Completion Types
// ============================================================================

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// Single-turn request with one user message.
    pub fn single(model: &str, prompt: &str, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        }
    }
}

/// One choice in a chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token accounting returned with a completion
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

impl ChatCompletionResponse {
    /// Why generation stopped for the first choice
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref())
    }

    /// Content of the first choice's message, if the service sent any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }
}

// ============================================================================
// Model Listing Types
// ============================================================================

/// Single entry of the model catalogue
#[derive(Debug, Clone, Deserialize)]
pub struct Model {
    pub id: String,
}

/// Response of `GET models`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<Model>,
}

impl ModelList {
    /// Model identifiers in response order.
    pub fn ids(&self) -> Vec<String> {
        self.data.iter().map(|m| m.id.clone()).collect()
    }
}

// ============================================================================
// Usage Types
// ============================================================================

/// One aggregation bucket from the usage endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UsageBucket {
    #[serde(default)]
    pub n_requests: Option<u64>,
    #[serde(default)]
    pub n_context_tokens_total: Option<u64>,
    #[serde(default)]
    pub n_generated_tokens_total: Option<u64>,
}

/// Response of `GET usage?date=YYYY-MM-DD`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageResponse {
    #[serde(default)]
    pub data: Vec<UsageBucket>,
}

impl UsageResponse {
    /// Sum of requests across all buckets
    pub fn total_requests(&self) -> u64 {
        self.data
            .iter()
            .filter_map(|b| b.n_requests)
            .fold(0u64, u64::saturating_add)
    }

    /// Sum of context plus generated tokens across all buckets
    pub fn total_tokens(&self) -> u64 {
        self.data
            .iter()
            .map(|b| {
                b.n_context_tokens_total
                    .unwrap_or(0)
                    .saturating_add(b.n_generated_tokens_total.unwrap_or(0))
            })
            .fold(0u64, u64::saturating_add)
    }
}

// ============================================================================
// API Status Codes
// ============================================================================

/// Classified outcome of a failed HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    /// Invalid request arguments (400)
    InvalidArgument,
    /// Missing or wrong API key (401)
    Unauthenticated,
    /// Key lacks permission or the region/org is blocked (403)
    PermissionDenied,
    /// Endpoint or model not found (404)
    NotFound,
    /// Too many requests (429)
    RateLimited,
    /// Account has run out of credits (429 with `insufficient_quota`)
    QuotaExceeded,
    /// Server side failure (5xx)
    Unavailable,
    /// Anything else
    Unknown,
}

impl ApiStatus {
    /// Convert from HTTP status code plus the optional OpenAI error code
    pub fn from_http_status(http_status: u16, code: Option<&str>) -> Self {
        match (http_status, code) {
            (429, Some("insufficient_quota")) => ApiStatus::QuotaExceeded,
            (400, _) => ApiStatus::InvalidArgument,
            (401, _) => ApiStatus::Unauthenticated,
            (403, _) => ApiStatus::PermissionDenied,
            (404, _) => ApiStatus::NotFound,
            (429, _) => ApiStatus::RateLimited,
            (500..=599, _) => ApiStatus::Unavailable,
            _ => ApiStatus::Unknown,
        }
    }

    /// Get the error message for this status
    pub fn error_message(&self) -> &'static str {
        match self {
            ApiStatus::InvalidArgument => "Invalid request",
            ApiStatus::Unauthenticated => "Authentication failed",
            ApiStatus::PermissionDenied => "Permission denied",
            ApiStatus::NotFound => "Not found",
            ApiStatus::RateLimited => "Rate limit exceeded",
            ApiStatus::QuotaExceeded => "Quota exceeded",
            ApiStatus::Unavailable => "Service temporarily unavailable",
            ApiStatus::Unknown => "Unknown error occurred",
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error_message())
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Error body as sent by the service: `{"error": {...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// API error with status code and details.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// Classified status
    pub status: ApiStatus,
    /// HTTP status code
    pub http_status: u16,
    /// Error message
    pub message: String,
    /// OpenAI error `type`, e.g. `invalid_request_error`
    pub error_type: Option<String>,
    /// OpenAI error `code`, e.g. `invalid_api_key`
    pub code: Option<String>,
}

impl ApiError {
    /// Create from HTTP status code and raw response body
    pub fn from_http_response(http_status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
        let (detail, error_type, code) = match parsed {
            Some(err) => (err.message, err.error_type, err.code),
            None => (None, None, None),
        };

        let status = ApiStatus::from_http_status(http_status, code.as_deref());
        let detail = detail
            .filter(|m| !m.trim().is_empty())
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| status.error_message().to_string());

        Self {
            status,
            http_status,
            message: format!("{} (HTTP {}): {}", status, http_status, detail),
            error_type,
            code,
        }
    }

    /// Whether this error says the credential itself is unusable
    pub fn is_credential_problem(&self) -> bool {
        matches!(
            self.status,
            ApiStatus::Unauthenticated | ApiStatus::PermissionDenied | ApiStatus::QuotaExceeded
        )
    }

    /// Get a hint message for the user
    pub fn user_hint(&self) -> &'static str {
        match self.status {
            ApiStatus::Unauthenticated => {
                "The API key was rejected. Check that it is copied correctly and has not been revoked."
            }
            ApiStatus::PermissionDenied => {
                "The key does not have permission for this request. Check its project and role settings."
            }
            ApiStatus::QuotaExceeded => {
                "The account has no remaining credits. Add a payment method or top up your balance."
            }
            ApiStatus::RateLimited => "You have exceeded the rate limit. Wait a moment and try again.",
            ApiStatus::Unavailable => "The service is temporarily unavailable. Try again later.",
            ApiStatus::NotFound => "The requested model or endpoint is not available to this key.",
            _ => "An unexpected error occurred.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiStatus::from_http_status(401, None), ApiStatus::Unauthenticated);
        assert_eq!(ApiStatus::from_http_status(403, None), ApiStatus::PermissionDenied);
        assert_eq!(ApiStatus::from_http_status(429, None), ApiStatus::RateLimited);
        assert_eq!(
            ApiStatus::from_http_status(429, Some("insufficient_quota")),
            ApiStatus::QuotaExceeded
        );
        assert_eq!(ApiStatus::from_http_status(503, None), ApiStatus::Unavailable);
        assert_eq!(ApiStatus::from_http_status(418, None), ApiStatus::Unknown);
    }

    #[test]
    fn test_api_error_from_openai_body() {
        let body = r#"{"error":{"message":"Incorrect API key provided: sk-abc.","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#;
        let err = ApiError::from_http_response(401, body);

        assert_eq!(err.status, ApiStatus::Unauthenticated);
        assert_eq!(err.http_status, 401);
        assert_eq!(err.code.as_deref(), Some("invalid_api_key"));
        assert_eq!(err.error_type.as_deref(), Some("invalid_request_error"));
        assert!(err.message.contains("Incorrect API key provided"));
        assert!(err.is_credential_problem());
    }

    #[test]
    fn test_api_error_quota() {
        let body = r#"{"error":{"message":"You exceeded your current quota.","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        let err = ApiError::from_http_response(429, body);
        assert_eq!(err.status, ApiStatus::QuotaExceeded);
        assert!(err.is_credential_problem());
    }

    #[test]
    fn test_api_error_non_json_body() {
        let err = ApiError::from_http_response(502, "Bad Gateway");
        assert_eq!(err.status, ApiStatus::Unavailable);
        assert!(err.message.contains("Bad Gateway"));
        assert!(!err.is_credential_problem());

        let err = ApiError::from_http_response(500, "");
        assert!(err.message.contains("Service temporarily unavailable"));
    }

    #[test]
    fn test_first_content() {
        let json = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo-0125",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Hello, OpenAI API is working!"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 20, "completion_tokens": 8, "total_tokens": 28}
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.first_content(), Some("Hello, OpenAI API is working!"));
        assert_eq!(resp.usage.unwrap().total_tokens, 28);

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(empty.first_content(), None);

        let null_content: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap();
        assert_eq!(null_content.first_content(), None);
    }

    #[test]
    fn test_request_skips_unset_fields() {
        let mut req = ChatCompletionRequest::single("gpt-4", "What is 2+2?", 10, 0.0);
        req.max_tokens = None;
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("max_tokens").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["temperature"], 0.0);
    }

    #[test]
    fn test_usage_totals() {
        let json = r#"{"object":"list","data":[
            {"aggregation_timestamp": 1700000000, "n_requests": 2, "operation": "completion", "n_context_tokens_total": 40, "n_generated_tokens_total": 10},
            {"aggregation_timestamp": 1700000300, "n_requests": 1, "operation": "completion", "n_context_tokens_total": 5}
        ]}"#;
        let usage: UsageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(usage.total_requests(), 3);
        assert_eq!(usage.total_tokens(), 55);
    }

    #[test]
    fn test_usage_totals_saturate() {
        let json = r#"{"data":[
            {"n_requests": 18446744073709551615, "n_context_tokens_total": 18446744073709551615, "n_generated_tokens_total": 1},
            {"n_requests": 5, "n_context_tokens_total": 10}
        ]}"#;
        let usage: UsageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(usage.total_requests(), u64::MAX);
        assert_eq!(usage.total_tokens(), u64::MAX);
    }
}
