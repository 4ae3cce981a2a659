//! Project analyzer — scores each project's fit for the role and proposes replacements.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::FACTUALITY_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::resume::{Project, ResumeDocument};
use crate::optimization::prompts::{PROJECT_ANALYSIS_PROMPT_TEMPLATE, PROJECT_ANALYSIS_SYSTEM};

/// Suitability of one existing project, 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectScore {
    pub title: String,
    #[serde(deserialize_with = "percent_score")]
    pub score: u32,
}

/// The model sometimes answers `72.5` or `120`; round and clamp instead of
/// failing the whole analysis.
fn percent_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(0.0, 100.0) as u32)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectAnalysis {
    pub projects_to_replace: Vec<ProjectScore>,
    pub replacement_suggestions: Vec<Project>,
}

impl ProjectAnalysis {
    /// Score recorded for a project title, compared case-insensitively.
    pub fn score_for(&self, title: &str) -> Option<u32> {
        self.projects_to_replace
            .iter()
            .find(|p| p.title.trim().eq_ignore_ascii_case(title.trim()))
            .map(|p| p.score)
    }
}

#[async_trait]
pub trait ProjectAnalyzer: Send + Sync {
    async fn analyze_projects(
        &self,
        document: &ResumeDocument,
        target_role: &str,
        job_description: &str,
    ) -> Result<ProjectAnalysis, AppError>;
}

pub struct LlmProjectAnalyzer {
    llm: LlmClient,
}

impl LlmProjectAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ProjectAnalyzer for LlmProjectAnalyzer {
    async fn analyze_projects(
        &self,
        document: &ResumeDocument,
        target_role: &str,
        job_description: &str,
    ) -> Result<ProjectAnalysis, AppError> {
        let projects = serde_json::to_string_pretty(&document.projects).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to serialize projects: {e}"))
        })?;
        let prompt = PROJECT_ANALYSIS_PROMPT_TEMPLATE
            .replace("{target_role}", target_role)
            .replace("{job_description}", job_description)
            .replace("{projects}", &projects);
        let prompt = format!("{prompt}\n{FACTUALITY_INSTRUCTION}");

        let analysis: ProjectAnalysis = self
            .llm
            .call_json(&prompt, PROJECT_ANALYSIS_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Project analysis failed: {e}")))?;

        info!(
            "Project analysis: {} scored, {} suggestions",
            analysis.projects_to_replace.len(),
            analysis.replacement_suggestions.len()
        );
        Ok(analysis)
    }
}
