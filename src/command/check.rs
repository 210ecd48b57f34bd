use std::process::ExitCode;

use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::ProbeConfig;
use crate::credential::{self, Credential};
use crate::error::ProbeError;
use crate::probe::{ProbeApi, ProbeReport, ProbeRunner};
use crate::report;

/// Resolve the key, then run every probe against the live API.
///
/// Nothing touches the network until a non-empty key has been found.
pub async fn run_check(arg_key: Option<&str>) -> Result<ProbeReport, ProbeError> {
    run_check_with(
        |key| std::env::var(key).ok(),
        arg_key,
        |config, credential| ApiClient::new(config, credential).map_err(ProbeError::Client),
    )
    .await
}

/// Same as [`run_check`], with the environment and the client supplied by the caller.
///
/// `connect` is only called once a key and a valid configuration exist.
async fn run_check_with<L, C, A>(
    lookup: L,
    arg_key: Option<&str>,
    connect: C,
) -> Result<ProbeReport, ProbeError>
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(&ProbeConfig, &Credential) -> Result<A, ProbeError>,
    A: ProbeApi,
{
    report::print_intro();

    let credential = credential::resolve_with(&lookup, arg_key)?;
    report::print_credential(&credential);

    let config = ProbeConfig::from_lookup(&lookup)?;

    println!();
    println!("🤖 Initializing OpenAI client...");
    let api = connect(&config, &credential)?;
    info!(base_url = %config.base_url, "Probing API");

    ProbeRunner::new(&api, &config).run().await
}

/// Print the final banner and pick the exit code.
pub fn conclude(result: &Result<ProbeReport, ProbeError>) -> ExitCode {
    match result {
        Ok(report) => {
            report::print_success(report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            debug!("Probe run failed: {:?}", err);
            report::print_failure(err);
            ExitCode::FAILURE
        }
    }
}
