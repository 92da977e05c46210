//! The error registry: typed service errors in, HTTP responses out.
//!
//! A registry is an ordered rule list. Each rule pairs a matcher with a
//! policy: status code, public message, whether the server logs the full
//! cause chain, whether the message may merge with other matches, and the
//! error class. Mapping is pure; the same registry and error always produce
//! the same response.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;

use aegis_core::RecordKind;

use crate::services::ServiceError;

/// The wire shape of every error response. Multiple messages appear only
/// when several validation rules merge.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub messages: Vec<String>,
}

/// Error classes ordered by severity: when one error matches both a
/// mergeable and a non-mergeable rule, the highest class wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorClass {
    Validation,
    Generic,
    Auth,
    Tech,
}

/// Where the public message comes from: a fixed sanitised string, or the
/// error's own display (which validation errors expand per violation).
#[derive(Debug, Clone, Copy)]
pub enum PublicMsg {
    Fixed(&'static str),
    FromError,
}

#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub status: StatusCode,
    pub public_msg: PublicMsg,
    pub log_it: bool,
    pub allow_merge: bool,
    pub class: ErrorClass,
}

pub struct Rule {
    matches: Box<dyn Fn(&ServiceError) -> bool + Send + Sync>,
    policy: Policy,
}

impl Rule {
    pub fn new(
        matches: impl Fn(&ServiceError) -> bool + Send + Sync + 'static,
        policy: Policy,
    ) -> Self {
        Self {
            matches: Box::new(matches),
            policy,
        }
    }
}

pub struct Registry {
    rules: Vec<Rule>,
}

impl Registry {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Append another registry's rules after this one's, for endpoints that
    /// span record kinds.
    pub fn merge(mut self, other: Registry) -> Registry {
        self.rules.extend(other.rules);
        self
    }

    /// Translate a service error into its HTTP response.
    pub fn respond(&self, err: &ServiceError) -> (StatusCode, Json<ErrorBody>) {
        // Bulk-sync wrappers carry context for the log line; rules match the
        // per-item error underneath.
        let root = err.root();

        let matched: Vec<&Rule> = self.rules.iter().filter(|r| (r.matches)(root)).collect();

        if matched.is_empty() {
            log_chain(err);
            return crate::api::internal_error();
        }

        // Any non-mergeable match wins over the mergeables; the highest
        // class takes it, registry order breaking ties.
        let non_mergeable: Vec<&&Rule> =
            matched.iter().filter(|r| !r.policy.allow_merge).collect();
        if let Some(top) = non_mergeable.iter().map(|r| r.policy.class).max() {
            let winner = non_mergeable
                .iter()
                .find(|r| r.policy.class == top)
                .expect("a rule of the max class exists");
            if winner.policy.log_it {
                log_chain(err);
            }
            let message = match winner.policy.public_msg {
                PublicMsg::Fixed(s) => s.to_string(),
                PublicMsg::FromError => root.to_string(),
            };
            return (
                winner.policy.status,
                Json(ErrorBody {
                    messages: vec![message],
                }),
            );
        }

        // All matches merge: concatenate their messages, deduplicated in
        // stable order, under the first rule's status.
        let status = matched[0].policy.status;
        let mut messages: Vec<String> = Vec::new();
        for rule in &matched {
            if rule.policy.log_it {
                log_chain(err);
            }
            let new = match rule.policy.public_msg {
                PublicMsg::Fixed(s) => vec![s.to_string()],
                PublicMsg::FromError => expand_messages(root),
            };
            for message in new {
                if !messages.contains(&message) {
                    messages.push(message);
                }
            }
        }
        (status, Json(ErrorBody { messages }))
    }
}

/// One message per violated rule for aggregated validation errors; the plain
/// display otherwise.
fn expand_messages(err: &ServiceError) -> Vec<String> {
    match err {
        ServiceError::Validation(v) => v.violations.iter().map(|v| v.to_string()).collect(),
        other => vec![other.to_string()],
    }
}

/// Log an error with its full cause chain.
fn log_chain(err: &ServiceError) {
    let mut line = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        source = cause.source();
    }
    error!("{line}");
}

// ── Registries ───────────────────────────────────────────────────

/// The rules shared by every record kind.
pub fn registry_for(kind: RecordKind) -> Registry {
    Registry::new(vec![
        Rule::new(
            |e| matches!(e, ServiceError::Validation(_)),
            Policy {
                status: StatusCode::BAD_REQUEST,
                public_msg: PublicMsg::FromError,
                log_it: false,
                allow_merge: true,
                class: ErrorClass::Validation,
            },
        ),
        Rule::new(
            move |e| matches!(e, ServiceError::NotFound { kind: k } if *k == kind),
            Policy {
                status: StatusCode::NOT_FOUND,
                public_msg: PublicMsg::FromError,
                log_it: false,
                allow_merge: false,
                class: ErrorClass::Generic,
            },
        ),
        Rule::new(
            move |e| matches!(e, ServiceError::AccessDenied { kind: k } if *k == kind),
            Policy {
                status: StatusCode::FORBIDDEN,
                public_msg: PublicMsg::FromError,
                log_it: false,
                allow_merge: false,
                class: ErrorClass::Auth,
            },
        ),
        Rule::new(
            move |e| matches!(e, ServiceError::Tech { kind: k, .. } if *k == kind),
            Policy {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                public_msg: PublicMsg::Fixed("Internal Server Error"),
                log_it: true,
                allow_merge: false,
                class: ErrorClass::Tech,
            },
        ),
    ])
}

/// File endpoints additionally recognise the rollback and hash failures.
pub fn file_registry() -> Registry {
    registry_for(RecordKind::File).merge(Registry::new(vec![
        Rule::new(
            |e| {
                matches!(
                    e,
                    ServiceError::RollbackFailed { .. } | ServiceError::HashMismatch
                )
            },
            Policy {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                public_msg: PublicMsg::Fixed("Internal Server Error"),
                log_it: true,
                allow_merge: false,
                class: ErrorClass::Tech,
            },
        ),
    ]))
}

/// The sync endpoints cover every kind: all four registries merged.
pub fn sync_registry() -> Registry {
    registry_for(RecordKind::BankCard)
        .merge(registry_for(RecordKind::Credential))
        .merge(registry_for(RecordKind::Note))
        .merge(file_registry())
}
