use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::{
    CatalogueSummary, ProbeApi, ProbeEntry, ProbeKind, ProbeOutcome, ProbeReport, ProbeValue,
    UsageSummary,
};
use crate::api::ChatCompletionRequest;
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::report;

const COMPLETION_PROMPT: &str = "Say 'Hello, OpenAI API is working!' in exactly those words.";
const COMPLETION_MAX_TOKENS: u32 = 50;
const COMPLETION_TEMPERATURE: f32 = 0.1;

const ADVANCED_PROMPT: &str = "What is 2+2? Answer in one word.";
const ADVANCED_MAX_TOKENS: u32 = 10;
const ADVANCED_TEMPERATURE: f32 = 0.0;

/// Runs the four probes in order and prints each result as it lands.
pub struct ProbeRunner<'a, A> {
    api: &'a A,
    config: &'a ProbeConfig,
    today: NaiveDate,
}

impl<'a, A: ProbeApi> ProbeRunner<'a, A> {
    pub fn new(api: &'a A, config: &'a ProbeConfig) -> Self {
        Self {
            api,
            config,
            today: Utc::now().date_naive(),
        }
    }

    /// Pin the date the usage probe asks for.
    #[cfg(test)]
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Run every probe.
    ///
    /// Returns `CredentialInvalid` as soon as the completion probe fails; no
    /// further calls are made in that case.
    pub async fn run(&self) -> Result<ProbeReport, ProbeError> {
        let mut report = ProbeReport::default();

        let completion = self.completion_probe().await?;
        self.record(&mut report, completion);

        let catalogue_entry = self.catalogue_probe().await;
        let catalogue = match &catalogue_entry.outcome {
            ProbeOutcome::Success(ProbeValue::Catalogue(catalogue)) => Some(catalogue.clone()),
            _ => None,
        };
        self.record(&mut report, catalogue_entry);

        let advanced = self.advanced_probe(catalogue.as_ref()).await;
        self.record(&mut report, advanced);

        let usage = self.usage_probe().await;
        self.record(&mut report, usage);

        info!(degraded = report.degraded_count(), "Probe run finished");
        Ok(report)
    }

    fn record(&self, into: &mut ProbeReport, entry: ProbeEntry) {
        report::print_outcome(&entry);
        into.push(entry);
    }

    async fn completion_probe(&self) -> Result<ProbeEntry, ProbeError> {
        let model = &self.config.baseline_model;
        report::print_section(ProbeKind::Completion, model);

        let request = ChatCompletionRequest::single(
            model,
            COMPLETION_PROMPT,
            COMPLETION_MAX_TOKENS,
            COMPLETION_TEMPERATURE,
        );

        match self.api.chat_completion(&request).await {
            Ok(response) => {
                debug!(
                    id = ?response.id,
                    model = ?response.model,
                    finish_reason = ?response.finish_reason(),
                    prompt_tokens = ?response.usage.as_ref().map(|u| u.prompt_tokens),
                    completion_tokens = ?response.usage.as_ref().map(|u| u.completion_tokens),
                    total_tokens = ?response.usage.as_ref().map(|u| u.total_tokens),
                    "Completion received"
                );
                let text = response.first_content().unwrap_or_default().to_string();
                if response.first_content().is_none() {
                    warn!("Completion from {} carried no message content", model);
                }
                Ok(ProbeEntry {
                    kind: ProbeKind::Completion,
                    subject: model.clone(),
                    outcome: ProbeOutcome::Success(ProbeValue::Text(text)),
                })
            }
            Err(e) => {
                debug!("Completion probe failed: {:#}", e);
                Err(ProbeError::credential_invalid(&e))
            }
        }
    }

    async fn catalogue_probe(&self) -> ProbeEntry {
        report::print_section(ProbeKind::Catalogue, "models");

        let outcome = match self.api.list_models().await {
            Ok(models) => {
                let catalogue = CatalogueSummary::new(models.ids());
                debug!("Catalogue has {} models", catalogue.len());
                ProbeOutcome::Success(ProbeValue::Catalogue(catalogue))
            }
            Err(e) => {
                warn!("Catalogue probe failed: {:#}", e);
                ProbeOutcome::Failure(format!("{:#}", e))
            }
        };

        ProbeEntry {
            kind: ProbeKind::Catalogue,
            subject: "models".to_string(),
            outcome,
        }
    }

    async fn advanced_probe(&self, catalogue: Option<&CatalogueSummary>) -> ProbeEntry {
        let model = &self.config.advanced_model;
        report::print_section(ProbeKind::AdvancedModel, model);

        let entry = |outcome| ProbeEntry {
            kind: ProbeKind::AdvancedModel,
            subject: model.clone(),
            outcome,
        };

        let Some(catalogue) = catalogue else {
            debug!("Skipping {} probe: catalogue unavailable", model);
            return entry(ProbeOutcome::Skipped(format!(
                "{} not checked because the model list is unavailable",
                model
            )));
        };

        if !catalogue.contains(model) {
            debug!("Skipping {} probe: not in catalogue", model);
            return entry(ProbeOutcome::Skipped(format!(
                "{} not available with this API key",
                model
            )));
        }

        let request = ChatCompletionRequest::single(
            model,
            ADVANCED_PROMPT,
            ADVANCED_MAX_TOKENS,
            ADVANCED_TEMPERATURE,
        );

        match self.api.chat_completion(&request).await {
            Ok(response) => {
                let text = response.first_content().unwrap_or_default().to_string();
                entry(ProbeOutcome::Success(ProbeValue::Text(text)))
            }
            Err(e) => {
                warn!("{} probe failed: {:#}", model, e);
                entry(ProbeOutcome::Failure(format!("{:#}", e)))
            }
        }
    }

    async fn usage_probe(&self) -> ProbeEntry {
        report::print_section(ProbeKind::Usage, "usage");

        let outcome = match self.api.usage(self.today).await {
            Ok(usage) => ProbeOutcome::Success(ProbeValue::Usage(UsageSummary::from(&usage))),
            Err(e) => {
                warn!("Usage probe failed: {:#}", e);
                ProbeOutcome::Failure(format!("{:#}", e))
            }
        };

        ProbeEntry {
            kind: ProbeKind::Usage,
            subject: "usage".to_string(),
            outcome,
        }
    }
}
