use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::errors::AppError;
use crate::workflow::session::WorkflowSession;

/// Long-term storage for completed optimization results.
#[async_trait]
pub trait ResultArchive: Send + Sync {
    /// Stores the session and returns the object key.
    async fn archive(&self, session: &WorkflowSession) -> Result<String, AppError>;
}

pub struct S3ResultArchive {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ResultArchive {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

pub fn archive_key(session: &WorkflowSession) -> String {
    format!("optimizations/{}/{}.json", session.user_id, session.id)
}

#[async_trait]
impl ResultArchive for S3ResultArchive {
    async fn archive(&self, session: &WorkflowSession) -> Result<String, AppError> {
        let body = serde_json::to_vec_pretty(session).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to serialize result: {e}"))
        })?;
        let key = archive_key(session);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::S3(format!("Upload of {key} failed: {e}")))?;

        info!("Archived optimization result to s3://{}/{}", self.bucket, key);
        Ok(key)
    }
}
