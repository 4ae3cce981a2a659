//! Entitlements — who may run an optimization, and how many remain.
//!
//! Checking and consuming are separate calls. The controller checks before
//! the first model call and consumes only after a run has produced a resume,
//! so two runs racing on the last unit can both pass the check; the consume
//! query still never lets `used` exceed `total`.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::subscription::{OptimizationCheck, SubscriptionState, UsageResult};

pub use postgres::PgEntitlementService;

#[async_trait]
pub trait EntitlementService: Send + Sync {
    /// The user's current active plan, if any.
    async fn get_subscription(&self, user_id: Uuid)
        -> Result<Option<SubscriptionState>, AppError>;

    async fn can_optimize(&self, user_id: Uuid) -> Result<OptimizationCheck, AppError> {
        let subscription = self.get_subscription(user_id).await?;
        Ok(OptimizationCheck::from_subscription(subscription))
    }

    /// Consumes one optimization. `success = false` when nothing was left to consume.
    async fn use_optimization(&self, user_id: Uuid) -> Result<UsageResult, AppError>;
}
