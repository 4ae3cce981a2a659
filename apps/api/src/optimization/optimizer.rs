//! Resume optimizer — one operation for both passes.
//!
//! The first pass parses raw resume text into a structured document; the
//! final pass polishes an already-structured document. Both are the same
//! model call with a different input shape, expressed as `OptimizeInput`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::errors::AppError;
use crate::llm_client::prompts::{FACTUALITY_INSTRUCTION, RESUME_SHAPE_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::resume::{ResumeDocument, UserType};
use crate::optimization::prompts::{
    EXPERIENCED_GUIDANCE, FRESHER_GUIDANCE, OPTIMIZE_PROMPT_TEMPLATE, OPTIMIZE_SYSTEM,
};

/// What the optimizer rewrites: free text on the first pass, a document on the final pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OptimizeInput {
    RawText(String),
    Document(ResumeDocument),
}

impl OptimizeInput {
    fn describe(&self) -> &'static str {
        match self {
            OptimizeInput::RawText(_) => "plain text extracted from the candidate's resume",
            OptimizeInput::Document(_) => "a JSON resume that was already optimized once; polish it",
        }
    }

    fn render(&self) -> Result<String, AppError> {
        match self {
            OptimizeInput::RawText(text) => Ok(text.clone()),
            OptimizeInput::Document(doc) => serde_json::to_string_pretty(doc).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to serialize resume document: {e}"))
            }),
        }
    }
}

/// Job-side parameters shared by both optimize passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeContext {
    pub job_description: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub target_role: Option<String>,
}

/// The optimize collaborator. Implementations may fail with `AppError::Unauthorized`
/// when the caller's session is rejected; the controller treats that separately.
#[async_trait]
pub trait ResumeOptimizer: Send + Sync {
    async fn optimize(
        &self,
        input: &OptimizeInput,
        context: &OptimizeContext,
    ) -> Result<ResumeDocument, AppError>;
}

pub struct LlmResumeOptimizer {
    llm: LlmClient,
}

impl LlmResumeOptimizer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeOptimizer for LlmResumeOptimizer {
    async fn optimize(
        &self,
        input: &OptimizeInput,
        context: &OptimizeContext,
    ) -> Result<ResumeDocument, AppError> {
        let prompt = build_optimize_prompt(input, context)?;
        debug!("Optimize prompt built ({} chars)", prompt.len());

        let optimized: ResumeDocument = self
            .llm
            .call_json(&prompt, OPTIMIZE_SYSTEM)
            .await
            .map_err(|e| {
                if e.is_auth() {
                    error!("Model provider rejected the configured API key");
                }
                AppError::Llm(format!("Resume optimization failed: {e}"))
            })?;

        let document = finalize_document(optimized, input, context)?;
        info!(
            "Optimized resume: {} roles, {} projects, {} skill groups",
            document.work_experience.len(),
            document.projects.len(),
            document.skills.len()
        );
        Ok(document)
    }
}

fn build_optimize_prompt(
    input: &OptimizeInput,
    context: &OptimizeContext,
) -> Result<String, AppError> {
    let guidance = match context.user_type {
        UserType::Fresher => FRESHER_GUIDANCE,
        UserType::Experienced => EXPERIENCED_GUIDANCE,
    };
    let links: Vec<&str> = [context.linkedin_url.as_deref(), context.github_url.as_deref()]
        .into_iter()
        .flatten()
        .filter(|l| !l.trim().is_empty())
        .collect();

    let body = OPTIMIZE_PROMPT_TEMPLATE
        .replace("{input_kind}", input.describe())
        .replace("{job_description}", &context.job_description)
        .replace("{user_type}", context.user_type.as_str())
        .replace("{user_type_guidance}", guidance)
        .replace(
            "{target_role}",
            context.target_role.as_deref().unwrap_or("not specified"),
        )
        .replace(
            "{links}",
            &if links.is_empty() {
                "none".to_string()
            } else {
                links.join(", ")
            },
        )
        // Resume last: its text must not be scanned for the other placeholders.
        .replace("{resume}", &input.render()?);

    Ok(format!(
        "{body}\n{FACTUALITY_INSTRUCTION}\n{RESUME_SHAPE_INSTRUCTION}"
    ))
}

/// Fills fields the model tends to drop and rejects documents that cannot render.
fn finalize_document(
    mut document: ResumeDocument,
    input: &OptimizeInput,
    context: &OptimizeContext,
) -> Result<ResumeDocument, AppError> {
    if let OptimizeInput::Document(previous) = input {
        if !document.has_name() {
            document.name = previous.name.clone();
        }
    }
    if !document.has_name() {
        return Err(AppError::Llm(
            "Optimized resume is missing the candidate name".to_string(),
        ));
    }

    if document.linkedin.trim().is_empty() {
        if let Some(url) = &context.linkedin_url {
            document.linkedin = url.clone();
        }
    }
    if document.github.trim().is_empty() {
        if let Some(url) = &context.github_url {
            document.github = url.clone();
        }
    }
    if document.target_role.is_none() {
        document.target_role = context.target_role.clone();
    }
    Ok(document)
}
