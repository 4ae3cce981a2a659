//! In-memory collaborators shared by controller and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::archive::{archive_key, ResultArchive};
use crate::auth::AuthProvider;
use crate::entitlements::EntitlementService;
use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::models::subscription::{SubscriptionState, UsageResult};
use crate::models::user::AuthUser;
use crate::optimization::optimizer::{OptimizeContext, OptimizeInput, ResumeOptimizer};
use crate::optimization::project_analyzer::{ProjectAnalysis, ProjectAnalyzer};
use crate::scoring::{DetailedScore, MatchScore, RubricScoreEvaluator, ScoreEvaluator};
use crate::state::AppState;
use crate::workflow::controller::{WorkflowController, WorkflowDeps};
use crate::workflow::session::{WorkflowSession, WorkflowState};
use crate::workflow::store::WorkflowStore;

pub const TEST_TOKEN: &str = "test-token";

const TEST_USER_ID: Uuid = Uuid::from_u128(0x5eed);

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Returns the configured document for raw text and echoes documents back,
/// optionally with a suffix on every project title.
#[derive(Default)]
pub struct FakeOptimizer {
    response: Mutex<Option<ResumeDocument>>,
    title_suffix: Mutex<Option<String>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeOptimizer {
    pub fn respond_with(&self, document: ResumeDocument) {
        *lock(&self.response) = Some(document);
        self.failing.store(false, Ordering::SeqCst);
    }

    /// Rewords project titles on the document pass, as the model does.
    pub fn retitle_projects(&self, suffix: &str) {
        *lock(&self.title_suffix) = Some(suffix.to_string());
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResumeOptimizer for FakeOptimizer {
    async fn optimize(
        &self,
        input: &OptimizeInput,
        _context: &OptimizeContext,
    ) -> Result<ResumeDocument, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Llm("model unavailable".to_string()));
        }
        match input {
            OptimizeInput::Document(document) => {
                let mut document = document.clone();
                if let Some(suffix) = lock(&self.title_suffix).as_deref() {
                    for project in &mut document.projects {
                        project.title.push_str(suffix);
                    }
                }
                Ok(document)
            }
            OptimizeInput::RawText(_) => Ok(lock(&self.response)
                .clone()
                .unwrap_or_else(|| ResumeDocument::named("Test User"))),
        }
    }
}

/// Rubric scoring unless told to fail.
#[derive(Default)]
pub struct FakeScorer {
    failing: AtomicBool,
}

impl FakeScorer {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Llm("scoring unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ScoreEvaluator for FakeScorer {
    async fn score_text(&self, resume_text: &str) -> Result<MatchScore, AppError> {
        self.check()?;
        RubricScoreEvaluator.score_text(resume_text).await
    }

    async fn score_detailed(
        &self,
        document: &ResumeDocument,
        job_description: &str,
    ) -> Result<DetailedScore, AppError> {
        self.check()?;
        RubricScoreEvaluator
            .score_detailed(document, job_description)
            .await
    }
}

#[derive(Default)]
pub struct FakeAnalyzer {
    response: Mutex<ProjectAnalysis>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeAnalyzer {
    pub fn respond_with(&self, analysis: ProjectAnalysis) {
        *lock(&self.response) = analysis;
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectAnalyzer for FakeAnalyzer {
    async fn analyze_projects(
        &self,
        _document: &ResumeDocument,
        _target_role: &str,
        _job_description: &str,
    ) -> Result<ProjectAnalysis, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Llm("analysis unavailable".to_string()));
        }
        Ok(lock(&self.response).clone())
    }
}

#[derive(Default)]
pub struct FakeEntitlements {
    subscription: Mutex<Option<SubscriptionState>>,
    failing_lookups: AtomicBool,
    failing_commits: AtomicBool,
    consumed: AtomicUsize,
}

impl FakeEntitlements {
    pub fn fail_lookups(&self) {
        self.failing_lookups.store(true, Ordering::SeqCst);
    }

    pub fn fail_commits(&self) {
        self.failing_commits.store(true, Ordering::SeqCst);
    }

    /// Optimizations consumed through this fake.
    pub fn used(&self) -> usize {
        self.consumed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntitlementService for FakeEntitlements {
    async fn get_subscription(
        &self,
        _user_id: Uuid,
    ) -> Result<Option<SubscriptionState>, AppError> {
        if self.failing_lookups.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("database unavailable")));
        }
        Ok(lock(&self.subscription).clone())
    }

    async fn use_optimization(&self, _user_id: Uuid) -> Result<UsageResult, AppError> {
        if self.failing_commits.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("database unavailable")));
        }
        let mut guard = lock(&self.subscription);
        let Some(subscription) = guard.as_mut() else {
            return Ok(UsageResult {
                success: false,
                remaining: 0,
            });
        };
        if subscription.remaining() <= 0 {
            return Ok(UsageResult {
                success: false,
                remaining: 0,
            });
        }
        subscription.optimizations_used += 1;
        self.consumed.fetch_add(1, Ordering::SeqCst);
        Ok(UsageResult {
            success: true,
            remaining: subscription.remaining(),
        })
    }
}

/// Accepts `TEST_TOKEN` only.
#[derive(Default)]
pub struct FakeAuth {
    expired: AtomicBool,
}

impl FakeAuth {
    pub fn expire_sessions(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AppError> {
        if token != TEST_TOKEN {
            return Err(AppError::Unauthorized);
        }
        Ok(test_user())
    }

    async fn ensure_valid_session(&self, _user: &AuthUser) -> Result<bool, AppError> {
        Ok(!self.expired.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct MemoryWorkflowStore {
    sessions: Mutex<HashMap<Uuid, WorkflowSession>>,
    failing_completed_saves: AtomicUsize,
}

impl MemoryWorkflowStore {
    /// The next `times` saves of a `Completed` session fail.
    pub fn fail_completed_saves(&self, times: usize) {
        self.failing_completed_saves.store(times, Ordering::SeqCst);
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn load(&self, id: Uuid) -> Result<Option<WorkflowSession>, AppError> {
        Ok(lock(&self.sessions).get(&id).cloned())
    }

    async fn save(&self, session: &WorkflowSession) -> Result<(), AppError> {
        if session.state == WorkflowState::Completed
            && self
                .failing_completed_saves
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(AppError::Internal(anyhow::anyhow!("redis unavailable")));
        }
        lock(&self.sessions).insert(session.id, session.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeArchive {
    failing: AtomicBool,
}

impl FakeArchive {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResultArchive for FakeArchive {
    async fn archive(&self, session: &WorkflowSession) -> Result<String, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::S3("bucket unavailable".to_string()));
        }
        Ok(archive_key(session))
    }
}

pub fn test_user() -> AuthUser {
    AuthUser {
        user_id: TEST_USER_ID,
        email: "ada@example.com".to_string(),
        token: TEST_TOKEN.to_string(),
    }
}

/// One set of fakes; the controller and app state built from it share them.
#[derive(Default)]
pub struct Fakes {
    pub optimizer: Arc<FakeOptimizer>,
    pub scorer: Arc<FakeScorer>,
    pub analyzer: Arc<FakeAnalyzer>,
    pub entitlements: Arc<FakeEntitlements>,
    pub auth: Arc<FakeAuth>,
    pub store: Arc<MemoryWorkflowStore>,
    pub archive: Arc<FakeArchive>,
}

impl Fakes {
    pub fn with_quota(total: i32, used: i32) -> Self {
        let fakes = Self::default();
        *lock(&fakes.entitlements.subscription) = Some(SubscriptionState {
            id: Uuid::new_v4(),
            user_id: TEST_USER_ID,
            plan_id: "pro".to_string(),
            optimizations_total: total,
            optimizations_used: used,
            expires_at: None,
        });
        fakes
    }

    pub fn without_subscription() -> Self {
        Self::default()
    }

    pub fn user(&self) -> AuthUser {
        test_user()
    }

    pub fn controller(&self) -> WorkflowController {
        WorkflowController::new(WorkflowDeps {
            optimizer: self.optimizer.clone(),
            scorer: self.scorer.clone(),
            analyzer: self.analyzer.clone(),
            entitlements: self.entitlements.clone(),
            auth: self.auth.clone(),
            store: self.store.clone(),
            archive: self.archive.clone(),
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            controller: Arc::new(self.controller()),
            entitlements: self.entitlements.clone(),
            auth: self.auth.clone(),
        }
    }
}
