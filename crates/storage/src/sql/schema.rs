//! Embedded schema bootstrap.
//!
//! All sensitive columns are BYTEA: they only ever hold sealed envelopes.
//! Listings filter on `user_id`, hence the per-table owner index.

use sqlx::PgPool;
use tracing::info;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS bank_cards (
         id UUID PRIMARY KEY,
         user_id UUID NOT NULL,
         card_number BYTEA NOT NULL,
         card_holder BYTEA NOT NULL,
         expiry_month BYTEA NOT NULL,
         expiry_year BYTEA NOT NULL,
         cvv BYTEA NOT NULL,
         description BYTEA NOT NULL,
         updated_at TIMESTAMPTZ NOT NULL
     )",
    "CREATE INDEX IF NOT EXISTS idx_bank_cards_user_id ON bank_cards (user_id)",
    "CREATE TABLE IF NOT EXISTS credentials (
         id UUID PRIMARY KEY,
         user_id UUID NOT NULL,
         login BYTEA NOT NULL,
         password BYTEA NOT NULL,
         description BYTEA NOT NULL,
         updated_at TIMESTAMPTZ NOT NULL
     )",
    "CREATE INDEX IF NOT EXISTS idx_credentials_user_id ON credentials (user_id)",
    "CREATE TABLE IF NOT EXISTS notes (
         id UUID PRIMARY KEY,
         user_id UUID NOT NULL,
         content BYTEA NOT NULL,
         description BYTEA NOT NULL,
         updated_at TIMESTAMPTZ NOT NULL
     )",
    "CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes (user_id)",
    "CREATE TABLE IF NOT EXISTS files (
         id UUID PRIMARY KEY,
         user_id UUID NOT NULL,
         storage_key BYTEA NOT NULL,
         hash_sum BYTEA NOT NULL,
         description BYTEA NOT NULL,
         updated_at TIMESTAMPTZ NOT NULL
     )",
    "CREATE INDEX IF NOT EXISTS idx_files_user_id ON files (user_id)",
];

/// Create the vault tables and indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Vault schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
