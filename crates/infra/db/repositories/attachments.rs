use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::repositories::attachments::AttachmentUsageRepository,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::message_attachments},
};

pub struct AttachmentUsagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AttachmentUsagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AttachmentUsageRepository for AttachmentUsagePostgres {
    async fn count_user_attachments_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let result = message_attachments::table
                .filter(message_attachments::user_id.eq(user_id))
                .filter(message_attachments::created_at.ge(since))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }
}
