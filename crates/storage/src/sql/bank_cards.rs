use async_trait::async_trait;
use sqlx::PgPool;

use super::select_sql;
use crate::error::StoreError;
use crate::record::{BankCardRecord, RecordFilter};
use crate::store::RecordStore;

const COLUMNS: &str =
    "id, user_id, card_number, card_holder, expiry_month, expiry_year, cvv, description, updated_at";

pub struct BankCardSql {
    pool: PgPool,
}

impl BankCardSql {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<BankCardRecord> for BankCardSql {
    async fn save(&self, record: &BankCardRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO bank_cards
                 (id, user_id, card_number, card_holder, expiry_month, expiry_year, cvv, description, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO UPDATE SET
                 card_number = EXCLUDED.card_number,
                 card_holder = EXCLUDED.card_holder,
                 expiry_month = EXCLUDED.expiry_month,
                 expiry_year = EXCLUDED.expiry_year,
                 cvv = EXCLUDED.cvv,
                 description = EXCLUDED.description,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.card_number)
        .bind(&record.card_holder)
        .bind(&record.expiry_month)
        .bind(&record.expiry_year)
        .bind(&record.cvv)
        .bind(&record.description)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<BankCardRecord>, StoreError> {
        let sql = select_sql("bank_cards", COLUMNS, &filter)?;
        let mut query = sqlx::query_as::<_, BankCardRecord>(&sql);
        if let Some(id) = filter.id {
            query = query.bind(id);
        }
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}
