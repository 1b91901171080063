//! The text-completion capability and the two-pass insight run built on it.

use std::future::Future;

use serde::Serialize;

use crate::error::InsightError;
use crate::format::tidy_response;
use crate::prompt::{build_prompt, PromptInput, PromptKind};

/// Something that turns a prompt into response text.
///
/// [`crate::AnthropicClient`] is the production implementation; tests
/// substitute canned responders.
pub trait InsightService {
    fn complete(&self, prompt: &str)
        -> impl Future<Output = Result<String, InsightError>> + Send;
}

/// One titled, tidied analysis section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightSection {
    pub kind: PromptKind,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsightReport {
    pub sections: Vec<InsightSection>,
}

/// Runs the performance pass, then the strategy pass, and collects the
/// tidied replies. The first failure aborts the run.
///
/// # Errors
///
/// Returns [`InsightError::PromptTooLarge`] from prompt building, or whatever
/// the service returns.
pub async fn request_insights<S: InsightService>(
    service: &S,
    input: &PromptInput,
    max_prompt_chars: usize,
) -> Result<InsightReport, InsightError> {
    let mut report = InsightReport::default();
    for kind in PromptKind::ALL {
        let prompt = build_prompt(input, kind, max_prompt_chars)?;
        tracing::info!(%kind, prompt_chars = prompt.chars().count(), "requesting insight");
        let text = service.complete(&prompt).await?;
        report.sections.push(InsightSection {
            kind,
            title: kind.title().to_string(),
            body: tidy_response(&text),
        });
    }
    Ok(report)
}
