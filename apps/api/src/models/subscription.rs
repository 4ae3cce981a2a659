use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's active plan and how much of it has been consumed.
///
/// `optimizations_used <= optimizations_total` is enforced by the consume query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: String,
    pub optimizations_total: i32,
    pub optimizations_used: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionState {
    /// Remaining optimizations, never negative.
    pub fn remaining(&self) -> i32 {
        (self.optimizations_total - self.optimizations_used).max(0)
    }
}

/// Result of an entitlement check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationCheck {
    pub can_optimize: bool,
    pub remaining: i32,
    pub subscription: Option<SubscriptionState>,
}

impl OptimizationCheck {
    pub fn from_subscription(subscription: Option<SubscriptionState>) -> Self {
        let remaining = subscription
            .as_ref()
            .map(SubscriptionState::remaining)
            .unwrap_or(0);
        Self {
            can_optimize: remaining > 0,
            remaining,
            subscription,
        }
    }
}

/// Result of consuming one optimization.
#[derive(Debug, Clone)]
pub struct UsageResult {
    pub success: bool,
    pub remaining: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(total: i32, used: i32) -> SubscriptionState {
        SubscriptionState {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_id: "pro".to_string(),
            optimizations_total: total,
            optimizations_used: used,
            expires_at: None,
        }
    }

    #[test]
    fn test_remaining_is_total_minus_used() {
        assert_eq!(subscription(5, 2).remaining(), 3);
    }

    #[test]
    fn test_remaining_never_negative() {
        assert_eq!(subscription(3, 7).remaining(), 0);
    }

    #[test]
    fn test_exhausted_plan_cannot_optimize() {
        let check = OptimizationCheck::from_subscription(Some(subscription(5, 5)));
        assert!(!check.can_optimize);
        assert_eq!(check.remaining, 0);
    }

    #[test]
    fn test_no_plan_cannot_optimize() {
        let check = OptimizationCheck::from_subscription(None);
        assert!(!check.can_optimize);
        assert!(check.subscription.is_none());
    }
}
