use async_trait::async_trait;
use sqlx::PgPool;

use super::select_sql;
use crate::error::StoreError;
use crate::record::{NoteRecord, RecordFilter};
use crate::store::RecordStore;

const COLUMNS: &str = "id, user_id, content, description, updated_at";

pub struct NoteSql {
    pool: PgPool,
}

impl NoteSql {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<NoteRecord> for NoteSql {
    async fn save(&self, record: &NoteRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO notes (id, user_id, content, description, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET
                 content = EXCLUDED.content,
                 description = EXCLUDED.description,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.content)
        .bind(&record.description)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<NoteRecord>, StoreError> {
        let sql = select_sql("notes", COLUMNS, &filter)?;
        let mut query = sqlx::query_as::<_, NoteRecord>(&sql);
        if let Some(id) = filter.id {
            query = query.bind(id);
        }
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}
