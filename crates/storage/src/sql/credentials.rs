use async_trait::async_trait;
use sqlx::PgPool;

use super::select_sql;
use crate::error::StoreError;
use crate::record::{CredentialRecord, RecordFilter};
use crate::store::RecordStore;

const COLUMNS: &str = "id, user_id, login, password, description, updated_at";

pub struct CredentialSql {
    pool: PgPool,
}

impl CredentialSql {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<CredentialRecord> for CredentialSql {
    async fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO credentials (id, user_id, login, password, description, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                 login = EXCLUDED.login,
                 password = EXCLUDED.password,
                 description = EXCLUDED.description,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.login)
        .bind(&record.password)
        .bind(&record.description)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<CredentialRecord>, StoreError> {
        let sql = select_sql("credentials", COLUMNS, &filter)?;
        let mut query = sqlx::query_as::<_, CredentialRecord>(&sql);
        if let Some(id) = filter.id {
            query = query.bind(id);
        }
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}
