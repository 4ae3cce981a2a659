//! Resume scoring — pluggable, trait-based evaluator.
//!
//! Default: `RubricScoreEvaluator` (pure Rust, deterministic).
//! `AppState` holds an `Arc<dyn ScoreEvaluator>` so the backend can be swapped
//! without touching the workflow controller.

pub mod impact;
pub mod models;
pub mod rubric;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;

pub use models::{DetailedScore, MatchScore};
pub use rubric::RubricScoreEvaluator;

#[async_trait]
pub trait ScoreEvaluator: Send + Sync {
    /// Scores free text. Each call is an independent evaluation.
    async fn score_text(&self, resume_text: &str) -> Result<MatchScore, AppError>;

    /// Scores a structured document against a job description.
    async fn score_detailed(
        &self,
        document: &ResumeDocument,
        job_description: &str,
    ) -> Result<DetailedScore, AppError>;
}
