//! Note service.

use std::sync::Arc;

use uuid::Uuid;

use aegis_core::{Note, NoteParams, RecordKind};
use aegis_storage::{NoteRecord, RecordFilter, RecordStore};

use super::error::{tech, ServiceError};
use super::utf8;

const KIND: RecordKind = RecordKind::Note;

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn RecordStore<NoteRecord>>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn RecordStore<NoteRecord>>) -> Self {
        Self { repo }
    }

    pub async fn pull(&self, id: Uuid, user_id: Uuid) -> Result<Note, ServiceError> {
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

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Note>, ServiceError> {
        self.repo
            .load(RecordFilter::owned_by(user_id))
            .await
            .map_err(|e| tech(KIND, e))?
            .into_iter()
            .map(to_entity)
            .collect()
    }

    pub async fn push(
        &self,
        user_id: Uuid,
        id: Option<Uuid>,
        params: NoteParams,
    ) -> Result<Uuid, ServiceError> {
        let mut note = Note::new(user_id, params)?;
        if let Some(id) = id {
            self.check_access_to_update(id, user_id).await?;
            note.id = id;
        }
        self.repo
            .save(&to_record(&note))
            .await
            .map_err(|e| tech(KIND, e))?;
        Ok(note.id)
    }

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

fn to_record(note: &Note) -> NoteRecord {
    NoteRecord {
        id: note.id,
        user_id: note.user_id,
        content: note.content.clone().into_bytes(),
        description: note.description.clone().into_bytes(),
        updated_at: note.updated_at,
    }
}

fn to_entity(record: NoteRecord) -> Result<Note, ServiceError> {
    Ok(Note {
        id: record.id,
        user_id: record.user_id,
        content: utf8(KIND, record.content)?,
        description: utf8(KIND, record.description)?,
        updated_at: record.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MemStore;
    use aegis_core::Violation;

    fn service() -> NoteService {
        NoteService::new(Arc::new(MemStore::new(
            |r: &NoteRecord| r.id,
            |r: &NoteRecord| r.user_id,
        )))
    }

    #[tokio::test]
    async fn empty_content_is_rejected_before_the_store() {
        let service = service();
        let err = service
            .push(
                Uuid::new_v4(),
                None,
                NoteParams {
                    content: String::new(),
                    description: String::new(),
                },
            )
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(v) => {
                assert_eq!(v.violations, vec![Violation::InvalidNoteText]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn foreign_update_is_denied_and_nothing_is_saved() {
        let service = service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let id = service
            .push(
                owner,
                None,
                NoteParams {
                    content: "original".into(),
                    description: String::new(),
                },
            )
            .await
            .unwrap();

        let err = service
            .push(
                stranger,
                Some(id),
                NoteParams {
                    content: "overwritten".into(),
                    description: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied { .. }));
        assert_eq!(service.pull(id, owner).await.unwrap().content, "original");
    }
}
