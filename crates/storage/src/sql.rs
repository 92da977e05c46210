//! Raw SQL persistence. Ciphertext in, ciphertext out.
//!
//! One store per record kind, each a thin upsert/select pair over its table.
//! Nothing here knows about keys or plaintext; the crypt middleware sits on
//! top.

use crate::error::StoreError;
use crate::record::RecordFilter;

mod bank_cards;
mod credentials;
mod files;
mod notes;
pub mod schema;

pub use bank_cards::BankCardSql;
pub use credentials::CredentialSql;
pub use files::FileMetaSql;
pub use notes::NoteSql;

/// Build the filtered select for a table. Placeholders are numbered with the
/// id bind first, matching the bind order used by every store.
fn select_sql(table: &str, columns: &str, filter: &RecordFilter) -> Result<String, StoreError> {
    let clause = match (filter.id, filter.user_id) {
        (Some(_), Some(_)) => "WHERE id = $1 AND user_id = $2",
        (Some(_), None) => "WHERE id = $1",
        (None, Some(_)) => "WHERE user_id = $1",
        (None, None) => return Err(StoreError::QueryUnbounded),
    };
    Ok(format!(
        "SELECT {columns} FROM {table} {clause} ORDER BY updated_at, id"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn select_requires_a_filter() {
        assert!(matches!(
            select_sql("notes", "*", &RecordFilter::default()),
            Err(StoreError::QueryUnbounded)
        ));
    }

    #[test]
    fn select_shapes() {
        let id = Uuid::new_v4();
        let user = Uuid::new_v4();

        let both = select_sql("notes", "id", &RecordFilter::one(id, user)).unwrap();
        assert!(both.contains("WHERE id = $1 AND user_id = $2"));

        let owner_only = select_sql("notes", "id", &RecordFilter::owned_by(user)).unwrap();
        assert!(owner_only.contains("WHERE user_id = $1"));
        assert!(owner_only.ends_with("ORDER BY updated_at, id"));
    }
}
