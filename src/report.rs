//! Console output.
//!
//! Line builders are pure so tests can check the wording; the `print_*`
//! functions write them to stdout.

use crate::config::API_KEY_ENV;
use crate::credential::{Credential, CredentialSource};
use crate::error::ProbeError;
use crate::probe::{
    ProbeEntry, ProbeKind, ProbeOutcome, ProbeReport, ProbeValue, CATALOGUE_PREVIEW_LIMIT,
};

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

pub fn print_intro() {
    println!("🧪 OpenAI API Key Test Script");
    println!("Checking that your OpenAI API key works");
    println!();
    println!("🔑 Testing OpenAI API Key...");
    println!("{}", rule());
}

pub fn credential_lines(credential: &Credential) -> Vec<String> {
    match credential.source() {
        CredentialSource::Environment => {
            vec![format!("✅ Found API key: {}", credential.masked())]
        }
        CredentialSource::Argument => vec![
            format!("ℹ️  {} not set", API_KEY_ENV),
            format!(
                "🔑 Using API key from command line argument: {}",
                credential.masked()
            ),
        ],
    }
}

pub fn print_credential(credential: &Credential) {
    print_lines(&credential_lines(credential));
}

pub fn missing_credential_lines() -> Vec<String> {
    vec![
        format!("❌ Error: {} environment variable not found!", API_KEY_ENV),
        String::new(),
        "To set your API key:".to_string(),
        format!("1. Export it: export {}='your-key-here'", API_KEY_ENV),
        format!("2. Or add to .env file: {}=your-key-here", API_KEY_ENV),
        "3. Or pass directly: keyprobe your-key-here".to_string(),
    ]
}

/// Header printed before each probe runs
pub fn section_line(kind: ProbeKind, subject: &str) -> String {
    match kind {
        ProbeKind::Completion => "📝 Test 1: Simple text completion...".to_string(),
        ProbeKind::Catalogue => "🔍 Test 2: Checking available models...".to_string(),
        ProbeKind::AdvancedModel => {
            format!("🚀 Test 3: Testing with {} (if available)...", subject)
        }
        ProbeKind::Usage => "📊 Test 4: Checking API usage...".to_string(),
    }
}

pub fn print_section(kind: ProbeKind, subject: &str) {
    println!();
    println!("{}", section_line(kind, subject));
}

/// Lines describing a finished probe
pub fn outcome_lines(entry: &ProbeEntry) -> Vec<String> {
    let subject = entry.subject.as_str();
    match (&entry.kind, &entry.outcome) {
        (_, ProbeOutcome::Success(ProbeValue::Catalogue(catalogue))) => {
            let preview = catalogue.preview(CATALOGUE_PREVIEW_LIMIT);
            let mut lines = vec![
                format!("✅ Found {} available models", catalogue.len()),
                "📋 Available models:".to_string(),
            ];
            lines.extend(preview.shown.iter().map(|id| format!("   - {}", id)));
            if preview.remaining > 0 {
                lines.push(format!("   ... and {} more", preview.remaining));
            }
            lines
        }
        (_, ProbeOutcome::Success(ProbeValue::Usage(usage))) => vec![
            "✅ API usage retrieved successfully".to_string(),
            format!(
                "   {} request(s), {} token(s) across {} bucket(s) today",
                usage.requests, usage.tokens, usage.buckets
            ),
        ],
        (ProbeKind::AdvancedModel, ProbeOutcome::Success(ProbeValue::Text(text))) => {
            vec![format!("✅ {} Response: {}", subject, display_text(text))]
        }
        (_, ProbeOutcome::Success(ProbeValue::Text(text))) => {
            vec![format!("✅ Response: {}", display_text(text))]
        }
        (_, ProbeOutcome::Skipped(reason)) => vec![format!("ℹ️  {}", reason)],
        (ProbeKind::AdvancedModel, ProbeOutcome::Failure(msg)) => {
            vec![format!("⚠️  {} test failed: {}", subject, msg)]
        }
        (ProbeKind::Usage, ProbeOutcome::Failure(msg)) => {
            vec![format!("ℹ️  Usage info not available: {}", msg)]
        }
        (ProbeKind::Catalogue, ProbeOutcome::Failure(msg)) => {
            vec![format!("⚠️  Model listing failed: {}", msg)]
        }
        (ProbeKind::Completion, ProbeOutcome::Failure(msg)) => {
            vec![format!("❌ Completion failed: {}", msg)]
        }
    }
}

fn display_text(text: &str) -> &str {
    if text.is_empty() {
        "<empty reply>"
    } else {
        text
    }
}

pub fn print_outcome(entry: &ProbeEntry) {
    print_lines(&outcome_lines(entry));
}

pub fn success_lines(report: &ProbeReport) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        rule(),
        "🎉 SUCCESS! Your OpenAI API key is working correctly!".to_string(),
    ];
    let degraded = report.degraded_count();
    if degraded > 0 {
        lines.push(format!(
            "⚠️  {} optional check(s) reported problems; see above",
            degraded
        ));
    }
    lines.extend([
        String::new(),
        "🚀 Next Steps:".to_string(),
        "1. Install the OpenAI SDK in your project".to_string(),
        format!("2. Add {} to your project's environment file", API_KEY_ENV),
        "3. Start building AI content generation features!".to_string(),
    ]);
    lines
}

pub fn print_success(report: &ProbeReport) {
    print_lines(&success_lines(report));
}

/// Steps worth checking for each kind of fatal error
fn troubleshooting_steps(err: &ProbeError) -> Vec<String> {
    match err {
        ProbeError::MissingCredential => vec![
            format!("Check that {} is exported in this shell", API_KEY_ENV),
            "Check that .env sits in this directory or a parent".to_string(),
            "Check the key was copied in full from the API keys page".to_string(),
        ],
        ProbeError::CredentialInvalid { .. } => vec![
            "Check if your API key is correct".to_string(),
            "Verify you have credits in your OpenAI account".to_string(),
            "Check if your API key has the right permissions".to_string(),
            "Make sure you have an active OpenAI account".to_string(),
        ],
        ProbeError::Config(_) => vec![
            "Check OPENAI_BASE_URL is an http(s) URL".to_string(),
            "Check KEYPROBE_TIMEOUT_SECS is a positive whole number".to_string(),
            "Unset the override to fall back to the default".to_string(),
        ],
        ProbeError::Client(_) => vec![
            "Check the system TLS and network setup".to_string(),
            "Check proxy environment variables such as HTTPS_PROXY".to_string(),
        ],
    }
}

pub fn failure_lines(err: &ProbeError) -> Vec<String> {
    let mut lines = Vec::new();

    match err {
        ProbeError::MissingCredential => {
            lines.extend(missing_credential_lines());
        }
        ProbeError::CredentialInvalid { .. } => {
            lines.push(String::new());
            lines.push(format!("❌ {}", err));
            if let Some(hint) = err.hint() {
                lines.push(format!("   {}", hint));
            }
        }
        ProbeError::Config(_) | ProbeError::Client(_) => {
            lines.push(format!("❌ {}", err));
        }
    }

    lines.push(String::new());
    lines.push("🔧 Troubleshooting:".to_string());
    lines.extend(
        troubleshooting_steps(err)
            .into_iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step)),
    );

    lines.extend([
        String::new(),
        "💡 Need Help?".to_string(),
        "1. Get API key: https://platform.openai.com/api-keys".to_string(),
        "2. Check billing: https://platform.openai.com/account/billing".to_string(),
        "3. View docs: https://platform.openai.com/docs".to_string(),
    ]);
    lines
}

pub fn print_failure(err: &ProbeError) {
    print_lines(&failure_lines(err));
}
