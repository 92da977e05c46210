//! Free-form text notes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ValidationError, Violation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteParams {
    pub content: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(user_id: Uuid, params: NoteParams) -> Result<Self, ValidationError> {
        if params.content.is_empty() {
            return Err(ValidationError {
                violations: vec![Violation::InvalidNoteText],
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            content: params.content,
            description: params.description,
            updated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_is_rejected() {
        let err = Note::new(
            Uuid::new_v4(),
            NoteParams {
                content: String::new(),
                description: "x".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err.violations, vec![Violation::InvalidNoteText]);
    }
}
