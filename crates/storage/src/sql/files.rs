use async_trait::async_trait;
use sqlx::PgPool;

use super::select_sql;
use crate::error::StoreError;
use crate::record::{FileMetaRecord, RecordFilter};
use crate::store::RecordStore;

const COLUMNS: &str = "id, user_id, storage_key, hash_sum, description, updated_at";

pub struct FileMetaSql {
    pool: PgPool,
}

impl FileMetaSql {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<FileMetaRecord> for FileMetaSql {
    async fn save(&self, record: &FileMetaRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO files (id, user_id, storage_key, hash_sum, description, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                 storage_key = EXCLUDED.storage_key,
                 hash_sum = EXCLUDED.hash_sum,
                 description = EXCLUDED.description,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.storage_key)
        .bind(&record.hash_sum)
        .bind(&record.description)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<FileMetaRecord>, StoreError> {
        let sql = select_sql("files", COLUMNS, &filter)?;
        let mut query = sqlx::query_as::<_, FileMetaRecord>(&sql);
        if let Some(id) = filter.id {
            query = query.bind(id);
        }
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}
