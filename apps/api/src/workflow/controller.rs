//! The optimization workflow state machine.
//!
//! Each public operation loads the session, applies the client's input,
//! then runs steps until the workflow rests (waits for the client or ends).
//! The session is saved after every transition so a `GET` during a long
//! model call shows where the run is.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::archive::ResultArchive;
use crate::auth::AuthProvider;
use crate::entitlements::EntitlementService;
use crate::errors::{AppError, WorkflowError};
use crate::models::user::AuthUser;
use crate::optimization::optimizer::{OptimizeInput, ResumeOptimizer};
use crate::optimization::project_analyzer::ProjectAnalyzer;
use crate::render::render_plain_text;
use crate::scoring::ScoreEvaluator;
use crate::workflow::gaps::{outstanding_sections, MissingSectionsInput};
use crate::workflow::replacement::resolve_projects;
use crate::workflow::session::{
    OptimizeRequest, ProjectChoice, WorkflowSession, WorkflowState, WorkflowView,
};
use crate::workflow::store::{InFlight, WorkflowStore};

/// Everything the controller talks to.
pub struct WorkflowDeps {
    pub optimizer: Arc<dyn ResumeOptimizer>,
    pub scorer: Arc<dyn ScoreEvaluator>,
    pub analyzer: Arc<dyn ProjectAnalyzer>,
    pub entitlements: Arc<dyn EntitlementService>,
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn WorkflowStore>,
    pub archive: Arc<dyn ResultArchive>,
}

pub struct WorkflowController {
    deps: WorkflowDeps,
    in_flight: InFlight,
}

impl WorkflowController {
    pub fn new(deps: WorkflowDeps) -> Self {
        Self {
            deps,
            in_flight: InFlight::default(),
        }
    }

    /// Starts a new workflow and runs it until it rests.
    pub async fn submit(
        &self,
        user: &AuthUser,
        request: OptimizeRequest,
    ) -> Result<WorkflowView, AppError> {
        if request.resume_text.trim().is_empty() {
            return Err(WorkflowError::ValidationFailure(
                "Resume text cannot be empty".to_string(),
            )
            .into());
        }
        if request.context.job_description.trim().is_empty() {
            return Err(WorkflowError::ValidationFailure(
                "Job description cannot be empty".to_string(),
            )
            .into());
        }

        let mut session = WorkflowSession::new(user.user_id, request);
        let _guard = self.in_flight.acquire(session.id)?;
        info!("Workflow {} submitted by user {}", session.id, user.user_id);

        self.deps.store.save(&session).await?;
        self.run(&mut session, user).await?;
        Ok(session.view())
    }

    pub async fn get(&self, user: &AuthUser, id: Uuid) -> Result<WorkflowSession, AppError> {
        let session = self
            .deps
            .store
            .load(id)
            .await?
            .filter(|s| s.user_id == user.user_id)
            .ok_or_else(|| AppError::NotFound(format!("Optimization {id} not found")))?;
        Ok(session)
    }

    /// Merges user-supplied sections and re-checks for gaps.
    pub async fn provide_missing_sections(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: MissingSectionsInput,
    ) -> Result<WorkflowView, AppError> {
        if input.is_empty() {
            return Err(WorkflowError::ValidationFailure(
                "Provide at least one of workExperience, projects or certifications".to_string(),
            )
            .into());
        }

        let _guard = self.in_flight.acquire(id)?;
        let mut session = self.get(user, id).await?;
        if !matches!(session.state, WorkflowState::AwaitingUserInput { .. }) {
            return Err(not_waiting_for("missing sections", &session));
        }
        let document = session
            .document
            .as_ref()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Workflow {id} has no document")))?;

        session.document = Some(input.merge_into(document));
        for section in input.declined() {
            if !session.acknowledged_sections.contains(&section) {
                session.acknowledged_sections.push(section);
            }
        }
        session.transition(WorkflowState::DetectingGaps);
        self.deps.store.save(&session).await?;

        self.run(&mut session, user).await?;
        Ok(session.view())
    }

    /// Records the user's project choice and finishes the run.
    pub async fn choose_projects(
        &self,
        user: &AuthUser,
        id: Uuid,
        choice: ProjectChoice,
    ) -> Result<WorkflowView, AppError> {
        if let ProjectChoice::Manual { projects } = &choice {
            if projects.is_empty() || projects.iter().any(|p| p.title.trim().is_empty()) {
                return Err(WorkflowError::ValidationFailure(
                    "Manual projects need a title".to_string(),
                )
                .into());
            }
        }

        let _guard = self.in_flight.acquire(id)?;
        let mut session = self.get(user, id).await?;
        if session.state != WorkflowState::AwaitingProjectChoice {
            return Err(not_waiting_for("a project choice", &session));
        }

        if let ProjectChoice::Manual { projects } = &choice {
            if let Some(document) = &session.document {
                let mut combined = document.projects.clone();
                combined.extend(projects.iter().cloned());
                session.document = Some(document.with_projects(combined));
            }
        }
        session.project_choice = Some(choice);
        session.transition(WorkflowState::FinalOptimization);
        self.deps.store.save(&session).await?;

        self.run(&mut session, user).await?;
        Ok(session.view())
    }

    /// Starts a failed or plan-blocked workflow again from `Idle`.
    pub async fn retry(&self, user: &AuthUser, id: Uuid) -> Result<WorkflowView, AppError> {
        let _guard = self.in_flight.acquire(id)?;
        let mut session = self.get(user, id).await?;
        if !matches!(
            session.state,
            WorkflowState::Failed { .. } | WorkflowState::AwaitingPlan { .. }
        ) {
            return Err(not_waiting_for("a retry", &session));
        }

        info!("Workflow {id} retried");
        session.reset();
        self.deps.store.save(&session).await?;

        self.run(&mut session, user).await?;
        Ok(session.view())
    }

    /// Plain-text rendering of a workflow's final resume.
    ///
    /// A run whose last save was lost stays stored in `CommittingUsage`; its
    /// resume already exists and is exported like a completed one.
    pub async fn export(&self, user: &AuthUser, id: Uuid) -> Result<String, AppError> {
        let session = self.get(user, id).await?;
        match (&session.state, &session.final_document) {
            (WorkflowState::Completed | WorkflowState::CommittingUsage, Some(document)) => {
                render_plain_text(document, session.request.context.user_type)
            }
            _ => Err(not_waiting_for("export", &session)),
        }
    }

    /// Once a final resume exists a failed save no longer aborts the run: the
    /// caller still gets the resume, and the resting state is saved once more.
    async fn run(&self, session: &mut WorkflowSession, user: &AuthUser) -> Result<(), AppError> {
        let mut unsaved = false;
        loop {
            if session.state.is_resting() {
                if unsaved {
                    if let Err(e) = self.deps.store.save(session).await {
                        error!("Workflow {} could not be saved at rest: {e}", session.id);
                    }
                }
                info!(
                    "Workflow {} resting in {}",
                    session.id,
                    session.state.name()
                );
                return Ok(());
            }
            let next = self.step(session, user).await;
            session.transition(next);
            match self.deps.store.save(session).await {
                Ok(()) => unsaved = false,
                Err(e) if session.final_document.is_some() => {
                    error!(
                        "Saving workflow {} in {} failed: {e}",
                        session.id,
                        session.state.name()
                    );
                    unsaved = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn step(&self, session: &mut WorkflowSession, user: &AuthUser) -> WorkflowState {
        match session.state {
            WorkflowState::Idle => WorkflowState::CheckingEntitlement,
            WorkflowState::CheckingEntitlement => self.check_entitlement(session).await,
            WorkflowState::ParsingResume => self.parse_resume(session, user).await,
            WorkflowState::DetectingGaps => detect_gaps(session),
            WorkflowState::ScoringInitial => self.score_initial(session).await,
            WorkflowState::AnalyzingProjects => self.analyze_projects(session).await,
            WorkflowState::FinalOptimization => self.final_optimization(session).await,
            WorkflowState::CommittingUsage => self.commit_usage(session).await,
            _ => session.state.clone(),
        }
    }

    async fn check_entitlement(&self, session: &mut WorkflowSession) -> WorkflowState {
        let check = match self.deps.entitlements.can_optimize(session.user_id).await {
            Ok(check) => check,
            Err(e) => {
                error!("Entitlement check failed for workflow {}: {e}", session.id);
                return WorkflowState::Failed {
                    error: WorkflowError::ServiceUnavailable,
                };
            }
        };

        session.remaining = Some(check.remaining);
        session.subscription = check.subscription;
        if session.subscription.is_none() {
            WorkflowState::AwaitingPlan {
                error: WorkflowError::NoSubscription,
            }
        } else if !check.can_optimize {
            WorkflowState::AwaitingPlan {
                error: WorkflowError::QuotaExhausted,
            }
        } else {
            WorkflowState::ParsingResume
        }
    }

    async fn parse_resume(&self, session: &mut WorkflowSession, user: &AuthUser) -> WorkflowState {
        match self.deps.auth.ensure_valid_session(user).await {
            Ok(true) => {}
            Ok(false) | Err(AppError::Unauthorized) => {
                warn!("Session rejected before optimizing workflow {}", session.id);
                return session_invalid();
            }
            Err(e) => {
                error!("Session check failed for workflow {}: {e}", session.id);
                return WorkflowState::Failed {
                    error: WorkflowError::ServiceUnavailable,
                };
            }
        }

        let input = OptimizeInput::RawText(session.request.resume_text.clone());
        match self
            .deps
            .optimizer
            .optimize(&input, &session.request.context)
            .await
        {
            Ok(document) => {
                session.document = Some(document);
                WorkflowState::DetectingGaps
            }
            Err(e) => optimize_failed(session.id, e),
        }
    }

    async fn score_initial(&self, session: &mut WorkflowSession) -> WorkflowState {
        let Some(document) = session.document.clone() else {
            return missing_document(session.id);
        };

        match self
            .deps
            .scorer
            .score_detailed(&document, &session.request.context.job_description)
            .await
        {
            Ok(score) => session.initial_score = Some(score),
            Err(e) => {
                warn!("Initial scoring failed for workflow {}: {e}", session.id);
                push_notice(session, WorkflowError::ScoringFailure);
            }
        }

        if document.projects.is_empty() {
            WorkflowState::FinalOptimization
        } else {
            WorkflowState::AnalyzingProjects
        }
    }

    async fn analyze_projects(&self, session: &mut WorkflowSession) -> WorkflowState {
        let Some(document) = session.document.as_ref() else {
            return missing_document(session.id);
        };
        let context = &session.request.context;
        let target_role = context.target_role.as_deref().unwrap_or_default();

        match self
            .deps
            .analyzer
            .analyze_projects(document, target_role, &context.job_description)
            .await
        {
            Ok(analysis) => session.project_analysis = Some(analysis),
            Err(e) => {
                warn!(
                    "Project analysis failed for workflow {}, keeping original projects: {e}",
                    session.id
                );
                session.project_analysis = None;
            }
        }

        if session.request.review_projects
            && session.project_choice.is_none()
            && session.project_analysis.is_some()
        {
            WorkflowState::AwaitingProjectChoice
        } else {
            WorkflowState::FinalOptimization
        }
    }

    async fn final_optimization(&self, session: &mut WorkflowSession) -> WorkflowState {
        let Some(document) = session.document.as_ref() else {
            return missing_document(session.id);
        };
        let context = session.request.context.clone();

        // The analysis scored these exact titles; the final pass may reword them.
        let document = match session.project_choice {
            Some(ProjectChoice::KeepCurrent) => document.clone(),
            _ => document.with_projects(resolve_projects(
                &document.projects,
                session.project_analysis.as_ref(),
            )),
        };

        let final_document = match self
            .deps
            .optimizer
            .optimize(&OptimizeInput::Document(document), &context)
            .await
        {
            Ok(optimized) => optimized,
            Err(e) => return optimize_failed(session.id, e),
        };

        let rendered = match render_plain_text(&final_document, context.user_type) {
            Ok(text) => text,
            Err(e) => {
                error!("Final resume for workflow {} cannot render: {e}", session.id);
                return WorkflowState::Failed {
                    error: WorkflowError::OptimizeFailure,
                };
            }
        };

        let scorer = &self.deps.scorer;
        let before = scorer.score_text(&session.request.resume_text).await;
        let after = scorer.score_text(&rendered).await;
        let detailed = scorer
            .score_detailed(&final_document, &context.job_description)
            .await;

        match (before, after) {
            (Ok(before), Ok(after)) => {
                info!(
                    "Workflow {} match score {} -> {}",
                    session.id, before.score, after.score
                );
                session.before_score = Some(before);
                session.after_score = Some(after);
            }
            (before, after) => {
                if let Err(e) = before.as_ref().and(after.as_ref()) {
                    warn!("Match scoring failed for workflow {}: {e}", session.id);
                }
                session.before_score = before.ok();
                session.after_score = after.ok();
                push_notice(session, WorkflowError::ScoringFailure);
            }
        }
        match detailed {
            Ok(score) => session.final_score = Some(score),
            Err(e) => {
                warn!("Final scoring failed for workflow {}: {e}", session.id);
                push_notice(session, WorkflowError::ScoringFailure);
            }
        }

        session.final_document = Some(final_document);
        WorkflowState::CommittingUsage
    }

    async fn commit_usage(&self, session: &mut WorkflowSession) -> WorkflowState {
        match self.deps.entitlements.use_optimization(session.user_id).await {
            Ok(usage) if usage.success => {
                session.usage_committed = true;
                session.remaining = Some(usage.remaining);
                match self.deps.entitlements.get_subscription(session.user_id).await {
                    Ok(subscription) => session.subscription = subscription,
                    Err(e) => warn!("Subscription refresh failed after commit: {e}"),
                }
            }
            Ok(usage) => {
                warn!(
                    "Usage commit refused for workflow {} (remaining {})",
                    session.id, usage.remaining
                );
                session.remaining = Some(usage.remaining);
                session.commit_error = Some(WorkflowError::UsageCommitFailure);
            }
            Err(e) => {
                error!("Usage commit failed for workflow {}: {e}", session.id);
                session.commit_error = Some(WorkflowError::UsageCommitFailure);
            }
        }

        let mut archived = session.clone();
        archived.state = WorkflowState::Completed;
        match self.deps.archive.archive(&archived).await {
            Ok(key) => session.archive_key = Some(key),
            Err(e) => warn!("Archiving workflow {} failed: {e}", session.id),
        }
        WorkflowState::Completed
    }
}

fn detect_gaps(session: &WorkflowSession) -> WorkflowState {
    let Some(document) = session.document.as_ref() else {
        return missing_document(session.id);
    };
    let missing = outstanding_sections(document, &session.acknowledged_sections);
    if missing.is_empty() {
        WorkflowState::ScoringInitial
    } else {
        WorkflowState::AwaitingUserInput { missing }
    }
}

fn push_notice(session: &mut WorkflowSession, notice: WorkflowError) {
    if !session.notices.contains(&notice) {
        session.notices.push(notice);
    }
}

fn session_invalid() -> WorkflowState {
    WorkflowState::Failed {
        error: WorkflowError::SessionInvalid,
    }
}

fn optimize_failed(id: Uuid, err: AppError) -> WorkflowState {
    if matches!(err, AppError::Unauthorized) {
        warn!("Optimizer rejected the session for workflow {id}");
        return session_invalid();
    }
    error!("Optimization failed for workflow {id}: {err}");
    WorkflowState::Failed {
        error: WorkflowError::OptimizeFailure,
    }
}

fn missing_document(id: Uuid) -> WorkflowState {
    error!("Workflow {id} reached a document step without a document");
    WorkflowState::Failed {
        error: WorkflowError::OptimizeFailure,
    }
}

fn not_waiting_for(what: &str, session: &WorkflowSession) -> AppError {
    AppError::Conflict(format!(
        "Optimization {} is not waiting for {what} (state: {})",
        session.id,
        session.state.name()
    ))
}
