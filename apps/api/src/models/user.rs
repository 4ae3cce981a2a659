use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The signed-in user behind a request, resolved from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub token: String,
}
