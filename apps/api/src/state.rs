use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::entitlements::EntitlementService;
use crate::workflow::WorkflowController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<WorkflowController>,
    /// Also held by the controller; handlers use it for the subscription summary.
    pub entitlements: Arc<dyn EntitlementService>,
    /// Resolves bearer tokens for the `AuthUser` extractor.
    pub auth: Arc<dyn AuthProvider>,
}
