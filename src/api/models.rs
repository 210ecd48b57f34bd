//! Model listing endpoint.

use anyhow::Result;
use reqwest::Method;
use tracing::debug;

use super::client::ApiClient;
use super::types::ModelList;

impl ApiClient {
    /// List every model the key can access.
    pub async fn list_models(&self) -> Result<ModelList> {
        let models: ModelList = self
            .call_api(Method::GET, "models", &[], None::<&()>)
            .await?;
        debug!("Catalogue contains {} models", models.data.len());
        Ok(models)
    }
}
