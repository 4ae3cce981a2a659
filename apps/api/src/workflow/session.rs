//! Workflow session: the single state value plus everything a run produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::WorkflowError;
use crate::models::resume::{Project, ResumeDocument};
use crate::models::subscription::SubscriptionState;
use crate::optimization::optimizer::OptimizeContext;
use crate::optimization::project_analyzer::ProjectAnalysis;
use crate::scoring::{DetailedScore, MatchScore};
use crate::workflow::gaps::MissingSection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WorkflowState {
    Idle,
    CheckingEntitlement,
    AwaitingPlan { error: WorkflowError },
    ParsingResume,
    DetectingGaps,
    AwaitingUserInput { missing: Vec<MissingSection> },
    ScoringInitial,
    AnalyzingProjects,
    AwaitingProjectChoice,
    FinalOptimization,
    CommittingUsage,
    Completed,
    Failed { error: WorkflowError },
}

impl WorkflowState {
    /// States in which the run loop stops and waits for the client.
    pub fn is_resting(&self) -> bool {
        matches!(
            self,
            WorkflowState::AwaitingPlan { .. }
                | WorkflowState::AwaitingUserInput { .. }
                | WorkflowState::AwaitingProjectChoice
                | WorkflowState::Completed
                | WorkflowState::Failed { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::CheckingEntitlement => "checkingEntitlement",
            WorkflowState::AwaitingPlan { .. } => "awaitingPlan",
            WorkflowState::ParsingResume => "parsingResume",
            WorkflowState::DetectingGaps => "detectingGaps",
            WorkflowState::AwaitingUserInput { .. } => "awaitingUserInput",
            WorkflowState::ScoringInitial => "scoringInitial",
            WorkflowState::AnalyzingProjects => "analyzingProjects",
            WorkflowState::AwaitingProjectChoice => "awaitingProjectChoice",
            WorkflowState::FinalOptimization => "finalOptimization",
            WorkflowState::CommittingUsage => "committingUsage",
            WorkflowState::Completed => "completed",
            WorkflowState::Failed { .. } => "failed",
        }
    }

    /// The blocking error, for `AwaitingPlan` and `Failed`.
    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            WorkflowState::AwaitingPlan { error } | WorkflowState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// How the user wants projects handled after seeing the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ProjectChoice {
    /// Apply the keep/replace policy to the analysis.
    Automatic,
    /// Add the user's own projects, then apply the policy.
    Manual { projects: Vec<Project> },
    /// Leave projects as they are.
    KeepCurrent,
}

/// Body of `POST /api/v1/optimizations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub resume_text: String,
    #[serde(flatten)]
    pub context: OptimizeContext,
    /// Pause after project analysis so the user can choose how to handle projects.
    #[serde(default)]
    pub review_projects: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub request: OptimizeRequest,
    pub state: WorkflowState,
    /// Working document between the two optimize passes.
    pub document: Option<ResumeDocument>,
    pub acknowledged_sections: Vec<MissingSection>,
    pub project_analysis: Option<ProjectAnalysis>,
    pub project_choice: Option<ProjectChoice>,
    pub initial_score: Option<DetailedScore>,
    pub final_document: Option<ResumeDocument>,
    pub before_score: Option<MatchScore>,
    pub after_score: Option<MatchScore>,
    pub final_score: Option<DetailedScore>,
    /// Non-fatal problems surfaced to the user (scoring outages).
    pub notices: Vec<WorkflowError>,
    pub subscription: Option<SubscriptionState>,
    pub remaining: Option<i32>,
    pub usage_committed: bool,
    pub commit_error: Option<WorkflowError>,
    pub archive_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowSession {
    pub fn new(user_id: Uuid, request: OptimizeRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            request,
            state: WorkflowState::Idle,
            document: None,
            acknowledged_sections: Vec::new(),
            project_analysis: None,
            project_choice: None,
            initial_score: None,
            final_document: None,
            before_score: None,
            after_score: None,
            final_score: None,
            notices: Vec::new(),
            subscription: None,
            remaining: None,
            usage_committed: false,
            commit_error: None,
            archive_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition(&mut self, next: WorkflowState) {
        tracing::debug!(
            "Workflow {}: {} -> {}",
            self.id,
            self.state.name(),
            next.name()
        );
        self.state = next;
        self.updated_at = Utc::now();
    }

    /// Discards everything produced by the previous attempt and returns to `Idle`.
    pub fn reset(&mut self) {
        let fresh = Self::new(self.user_id, self.request.clone());
        *self = Self {
            id: self.id,
            created_at: self.created_at,
            ..fresh
        };
    }

    pub fn view(&self) -> WorkflowView {
        WorkflowView {
            id: self.id,
            state: self.state.clone(),
            error: self.state.error().map(ToString::to_string),
            error_code: self.state.error().map(WorkflowError::code),
            document: self.final_document.clone().or_else(|| self.document.clone()),
            project_analysis: self.project_analysis.clone(),
            initial_score: self.initial_score.clone(),
            final_score: self.final_score.clone(),
            before_score: self.before_score.clone(),
            after_score: self.after_score.clone(),
            remaining: self.remaining,
            commit_error: self.commit_error.as_ref().map(ToString::to_string),
            notices: self.notices.iter().map(ToString::to_string).collect(),
            ui: UiFlags::from_state(&self.state),
            updated_at: self.updated_at,
        }
    }
}

/// Visibility flags for a thin client, derived from the state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiFlags {
    pub show_subscription_plans: bool,
    pub show_missing_sections: bool,
    pub show_project_analysis: bool,
    pub sign_in_required: bool,
    pub is_busy: bool,
}

impl UiFlags {
    pub fn from_state(state: &WorkflowState) -> Self {
        Self {
            show_subscription_plans: matches!(state, WorkflowState::AwaitingPlan { .. }),
            show_missing_sections: matches!(state, WorkflowState::AwaitingUserInput { .. }),
            show_project_analysis: matches!(state, WorkflowState::AwaitingProjectChoice),
            sign_in_required: matches!(
                state,
                WorkflowState::Failed {
                    error: WorkflowError::SessionInvalid
                }
            ),
            is_busy: !state.is_resting() && *state != WorkflowState::Idle,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
    pub id: Uuid,
    pub state: WorkflowState,
    pub error: Option<String>,
    pub error_code: Option<&'static str>,
    pub document: Option<ResumeDocument>,
    pub project_analysis: Option<ProjectAnalysis>,
    pub initial_score: Option<DetailedScore>,
    pub final_score: Option<DetailedScore>,
    pub before_score: Option<MatchScore>,
    pub after_score: Option<MatchScore>,
    pub remaining: Option<i32>,
    pub commit_error: Option<String>,
    pub notices: Vec<String>,
    pub ui: UiFlags,
    pub updated_at: DateTime<Utc>,
}
