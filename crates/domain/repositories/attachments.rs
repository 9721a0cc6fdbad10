use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

#[async_trait]
#[automock]
pub trait AttachmentUsageRepository {
    async fn count_user_attachments_since(&self, user_id: Uuid, since: DateTime<Utc>)
    -> Result<i64>;
}
