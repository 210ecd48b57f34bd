//! Usage endpoint.
//!
//! Not every key can read usage; session keys and project keys commonly get
//! 401/403 or 404 here even when completions work.

use anyhow::Result;
use chrono::NaiveDate;
use reqwest::Method;

use super::client::ApiClient;
use super::types::UsageResponse;

impl ApiClient {
    /// Fetch usage buckets for one UTC day.
    pub async fn usage(&self, date: NaiveDate) -> Result<UsageResponse> {
        let query = [("date", date.format("%Y-%m-%d").to_string())];
        self.call_api(Method::GET, "usage", &query, None::<&()>)
            .await
    }
}
