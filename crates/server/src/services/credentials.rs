//! Credential service.

use std::sync::Arc;

use uuid::Uuid;

use aegis_core::{Credential, CredentialParams, RecordKind};
use aegis_storage::{CredentialRecord, RecordFilter, RecordStore};

use super::error::{tech, ServiceError};
use super::utf8;

const KIND: RecordKind = RecordKind::Credential;

#[derive(Clone)]
pub struct CredentialService {
    repo: Arc<dyn RecordStore<CredentialRecord>>,
}

impl CredentialService {
    pub fn new(repo: Arc<dyn RecordStore<CredentialRecord>>) -> Self {
        Self { repo }
    }

    pub async fn pull(&self, id: Uuid, user_id: Uuid) -> Result<Credential, ServiceError> {
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

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Credential>, ServiceError> {
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
        params: CredentialParams,
    ) -> Result<Uuid, ServiceError> {
        let mut credential = Credential::new(user_id, params)?;
        if let Some(id) = id {
            self.check_access_to_update(id, user_id).await?;
            credential.id = id;
        }
        self.repo
            .save(&to_record(&credential))
            .await
            .map_err(|e| tech(KIND, e))?;
        Ok(credential.id)
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

fn to_record(credential: &Credential) -> CredentialRecord {
    CredentialRecord {
        id: credential.id,
        user_id: credential.user_id,
        login: credential.login.clone().into_bytes(),
        password: credential.password.clone().into_bytes(),
        description: credential.description.clone().into_bytes(),
        updated_at: credential.updated_at,
    }
}

fn to_entity(record: CredentialRecord) -> Result<Credential, ServiceError> {
    Ok(Credential {
        id: record.id,
        user_id: record.user_id,
        login: utf8(KIND, record.login)?,
        password: utf8(KIND, record.password)?,
        description: utf8(KIND, record.description)?,
        updated_at: record.updated_at,
    })
}
