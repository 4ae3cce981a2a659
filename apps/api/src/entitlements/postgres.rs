use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entitlements::EntitlementService;
use crate::errors::AppError;
use crate::models::subscription::{SubscriptionState, UsageResult};

const ACTIVE_SUBSCRIPTION_QUERY: &str = r#"
    SELECT id, user_id, plan_id, optimizations_total, optimizations_used, expires_at
    FROM subscriptions
    WHERE user_id = $1
      AND status = 'active'
      AND (expires_at IS NULL OR expires_at > NOW())
    ORDER BY created_at DESC
    LIMIT 1
"#;

/// Subscriptions stored in PostgreSQL.
///
/// Table `subscriptions`: id, user_id, plan_id, status, optimizations_total,
/// optimizations_used, expires_at, created_at.
#[derive(Clone)]
pub struct PgEntitlementService {
    pool: PgPool,
}

impl PgEntitlementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementService for PgEntitlementService {
    async fn get_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionState>, AppError> {
        let subscription = sqlx::query_as::<_, SubscriptionState>(ACTIVE_SUBSCRIPTION_QUERY)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(subscription)
    }

    async fn use_optimization(&self, user_id: Uuid) -> Result<UsageResult, AppError> {
        let Some(subscription) = self.get_subscription(user_id).await? else {
            warn!("use_optimization called for user {user_id} without an active plan");
            return Ok(UsageResult {
                success: false,
                remaining: 0,
            });
        };

        // Conditional increment: a plan with nothing left is never touched.
        let updated: Option<(i32, i32)> = sqlx::query_as(
            r#"
            UPDATE subscriptions
            SET optimizations_used = optimizations_used + 1
            WHERE id = $1 AND optimizations_used < optimizations_total
            RETURNING optimizations_total, optimizations_used
            "#,
        )
        .bind(subscription.id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some((total, used)) => {
                let remaining = (total - used).max(0);
                info!("Consumed one optimization for user {user_id}; {remaining} remaining");
                Ok(UsageResult {
                    success: true,
                    remaining,
                })
            }
            None => {
                warn!("Plan {} for user {user_id} has no optimizations left", subscription.id);
                Ok(UsageResult {
                    success: false,
                    remaining: 0,
                })
            }
        }
    }
}
