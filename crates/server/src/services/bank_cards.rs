//! Bank card service.

use std::sync::Arc;

use uuid::Uuid;

use aegis_core::{BankCard, BankCardParams, RecordKind};
use aegis_storage::{BankCardRecord, RecordFilter, RecordStore};

use super::error::{tech, ServiceError};
use super::utf8;

const KIND: RecordKind = RecordKind::BankCard;

#[derive(Clone)]
pub struct BankCardService {
    repo: Arc<dyn RecordStore<BankCardRecord>>,
}

impl BankCardService {
    pub fn new(repo: Arc<dyn RecordStore<BankCardRecord>>) -> Self {
        Self { repo }
    }

    /// Fetch one card owned by `user_id`.
    pub async fn pull(&self, id: Uuid, user_id: Uuid) -> Result<BankCard, ServiceError> {
        let rows = self
            .repo
            .load(RecordFilter::one(id, user_id))
            .await
            .map_err(|e| tech(KIND, e))?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(ServiceError::NotFound { kind: KIND })?;
        to_entity(row)
    }

    /// Fetch every card owned by `user_id`, in storage order.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<BankCard>, ServiceError> {
        self.repo
            .load(RecordFilter::owned_by(user_id))
            .await
            .map_err(|e| tech(KIND, e))?
            .into_iter()
            .map(to_entity)
            .collect()
    }

    /// Validate and save. With `id` set this is an update and runs the
    /// ownership check first; the returned id is the saved record's id.
    pub async fn push(
        &self,
        user_id: Uuid,
        id: Option<Uuid>,
        params: BankCardParams,
    ) -> Result<Uuid, ServiceError> {
        let mut card = BankCard::new(user_id, params)?;
        if let Some(id) = id {
            self.check_access_to_update(id, user_id).await?;
            card.id = id;
        }
        self.repo
            .save(&to_record(&card))
            .await
            .map_err(|e| tech(KIND, e))?;
        Ok(card.id)
    }

    /// Refuse an update unless the record exists and the caller owns it.
    async fn check_access_to_update(&self, id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        let rows = self
            .repo
            .load(RecordFilter {
                id: Some(id),
                user_id: None,
            })
            .await
            .map_err(|e| tech(KIND, e))?;
        match rows.first() {
            None => Err(ServiceError::NotFound { kind: KIND }),
            Some(row) if row.user_id != user_id => Err(ServiceError::AccessDenied { kind: KIND }),
            Some(_) => Ok(()),
        }
    }
}

fn to_record(card: &BankCard) -> BankCardRecord {
    BankCardRecord {
        id: card.id,
        user_id: card.user_id,
        card_number: card.card_number.clone().into_bytes(),
        card_holder: card.card_holder.clone().into_bytes(),
        expiry_month: card.expiry_month.clone().into_bytes(),
        expiry_year: card.expiry_year.clone().into_bytes(),
        cvv: card.cvv.clone().into_bytes(),
        description: card.description.clone().into_bytes(),
        updated_at: card.updated_at,
    }
}

fn to_entity(record: BankCardRecord) -> Result<BankCard, ServiceError> {
    Ok(BankCard {
        id: record.id,
        user_id: record.user_id,
        card_number: utf8(KIND, record.card_number)?,
        card_holder: utf8(KIND, record.card_holder)?,
        expiry_month: utf8(KIND, record.expiry_month)?,
        expiry_year: utf8(KIND, record.expiry_year)?,
        cvv: utf8(KIND, record.cvv)?,
        description: utf8(KIND, record.description)?,
        updated_at: record.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MemStore;
    use aegis_core::Violation;

    fn service() -> BankCardService {
        BankCardService::new(Arc::new(MemStore::new(
            |r: &BankCardRecord| r.id,
            |r: &BankCardRecord| r.user_id,
        )))
    }

    fn params() -> BankCardParams {
        BankCardParams {
            card_number: "4532015112830366".into(),
            card_holder: "John Doe".into(),
            expiry_month: "12".into(),
            expiry_year: "2099".into(),
            cvv: "123".into(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn push_then_pull_roundtrips() {
        let service = service();
        let user = Uuid::new_v4();

        let id = service.push(user, None, params()).await.unwrap();
        let card = service.pull(id, user).await.unwrap();
        assert_eq!(card.id, id);
        assert_eq!(card.user_id, user);
        assert_eq!(card.card_number, "4532015112830366");
    }

    #[tokio::test]
    async fn pull_of_missing_card_is_not_found() {
        let service = service();
        let err = service
            .pull(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn validation_errors_propagate() {
        let service = service();
        let mut bad = params();
        bad.card_number = "4532015112830367".into();
        let err = service.push(Uuid::new_v4(), None, bad).await.unwrap_err();
        match err {
            ServiceError::Validation(v) => {
                assert_eq!(v.violations, vec![Violation::LuhnFailed]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_keeps_id_and_replaces_fields() {
        let service = service();
        let user = Uuid::new_v4();
        let id = service.push(user, None, params()).await.unwrap();

        let mut updated = params();
        updated.card_holder = "J. Doe".into();
        let saved = service.push(user, Some(id), updated).await.unwrap();
        assert_eq!(saved, id);

        let cards = service.list(user).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].card_holder, "J. Doe");
    }

    #[tokio::test]
    async fn update_of_foreign_card_is_denied() {
        let service = service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let id = service.push(owner, None, params()).await.unwrap();

        let err = service
            .push(stranger, Some(id), params())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied { .. }));
        // The owner's record is untouched.
        let card = service.pull(id, owner).await.unwrap();
        assert_eq!(card.card_holder, "John Doe");
    }

    #[tokio::test]
    async fn update_of_missing_card_is_not_found() {
        let service = service();
        let err = service
            .push(Uuid::new_v4(), Some(Uuid::new_v4()), params())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
