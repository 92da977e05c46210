//! Login/password records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ValidationError, Violation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialParams {
    pub login: String,
    pub password: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: Uuid,
    pub user_id: Uuid,
    pub login: String,
    pub password: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(user_id: Uuid, params: CredentialParams) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();
        if params.login.is_empty() {
            violations.push(Violation::EmptyLogin);
        }
        if params.password.is_empty() {
            violations.push(Violation::EmptyPassword);
        }
        ValidationError::check(violations)?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            login: params.login,
            password: params.password,
            description: params.description,
            updated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_login_and_password() {
        let err = Credential::new(
            Uuid::new_v4(),
            CredentialParams {
                login: String::new(),
                password: String::new(),
                description: "dev box".into(),
            },
        )
        .unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::EmptyLogin, Violation::EmptyPassword]
        );
    }

    #[test]
    fn description_may_be_empty() {
        let cred = Credential::new(
            Uuid::new_v4(),
            CredentialParams {
                login: "root".into(),
                password: "hunter2".into(),
                description: String::new(),
            },
        )
        .unwrap();
        assert_eq!(cred.login, "root");
        assert!(cred.description.is_empty());
    }
}
