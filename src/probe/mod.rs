//! Probe sequence against the live API.
//!
//! Each probe returns a [`ProbeOutcome`]. Only a failed completion probe is
//! fatal; the runner turns it into [`crate::error::ProbeError::CredentialInvalid`].

mod runner;

pub use runner::ProbeRunner;

use anyhow::Result;
use chrono::NaiveDate;

use crate::api::{ApiClient, ChatCompletionRequest, ChatCompletionResponse, ModelList, UsageResponse};

/// Number of catalogue entries printed before summarising the rest
pub const CATALOGUE_PREVIEW_LIMIT: usize = 10;

/// The remote calls the probes need.
///
/// [`ApiClient`] is the real implementation; tests substitute an in-memory one.
#[allow(async_fn_in_trait)]
pub trait ProbeApi {
    async fn chat_completion(&self, request: &ChatCompletionRequest)
        -> Result<ChatCompletionResponse>;

    async fn list_models(&self) -> Result<ModelList>;

    async fn usage(&self, date: NaiveDate) -> Result<UsageResponse>;
}

impl ProbeApi for ApiClient {
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        ApiClient::chat_completion(self, request).await
    }

    async fn list_models(&self) -> Result<ModelList> {
        ApiClient::list_models(self).await
    }

    async fn usage(&self, date: NaiveDate) -> Result<UsageResponse> {
        ApiClient::usage(self, date).await
    }
}

/// Which probe an outcome belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Completion,
    Catalogue,
    AdvancedModel,
    Usage,
}

/// Model identifiers the key can see, sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueSummary {
    ids: Vec<String>,
}

impl CatalogueSummary {
    pub fn new(mut ids: Vec<String>) -> Self {
        ids.sort();
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.binary_search_by(|probe| probe.as_str().cmp(id)).is_ok()
    }

    /// First `limit` identifiers plus how many were left out.
    pub fn preview(&self, limit: usize) -> CataloguePreview<'_> {
        let shown = &self.ids[..self.ids.len().min(limit)];
        CataloguePreview {
            shown,
            remaining: self.ids.len() - shown.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CataloguePreview<'a> {
    pub shown: &'a [String],
    pub remaining: usize,
}

/// Totals from the usage endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSummary {
    pub buckets: usize,
    pub requests: u64,
    pub tokens: u64,
}

impl From<&UsageResponse> for UsageSummary {
    fn from(usage: &UsageResponse) -> Self {
        Self {
            buckets: usage.data.len(),
            requests: usage.total_requests(),
            tokens: usage.total_tokens(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeValue {
    /// Message content of a completion, exactly as returned
    Text(String),
    Catalogue(CatalogueSummary),
    Usage(UsageSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success(ProbeValue),
    /// The probe was not attempted
    Skipped(String),
    Failure(String),
}

impl ProbeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ProbeOutcome::Failure(_))
    }
}

/// One finished probe
#[derive(Debug, Clone)]
pub struct ProbeEntry {
    pub kind: ProbeKind,
    /// Model or endpoint the probe targeted, for display
    pub subject: String,
    pub outcome: ProbeOutcome,
}

/// Ordered outcomes of a run whose completion probe passed
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    entries: Vec<ProbeEntry>,
}

impl ProbeReport {
    pub(crate) fn push(&mut self, entry: ProbeEntry) {
        self.entries.push(entry);
    }

    #[cfg(test)]
    pub fn get(&self, kind: ProbeKind) -> Option<&ProbeOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| &entry.outcome)
    }

    /// Number of non-fatal probes that failed
    pub fn degraded_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome.is_failure())
            .count()
    }
}
