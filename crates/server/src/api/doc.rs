//! OpenAPI document, served at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aegis Vault",
        description = "Multi-user secret vault: cards, credentials, notes and files, encrypted per user at rest."
    ),
    paths(
        crate::api::health::health,
        crate::api::bank_cards::list,
        crate::api::bank_cards::get_one,
        crate::api::bank_cards::create,
        crate::api::bank_cards::update,
        crate::api::credentials::list,
        crate::api::credentials::get_one,
        crate::api::credentials::create,
        crate::api::credentials::update,
        crate::api::notes::list,
        crate::api::notes::get_one,
        crate::api::notes::create,
        crate::api::notes::update,
        crate::api::files::list,
        crate::api::files::get_one,
        crate::api::files::create,
        crate::api::files::update,
        crate::api::sync::pull,
        crate::api::sync::push,
    ),
    components(schemas(
        crate::api::ErrorBody,
        crate::api::PushResponse,
        crate::api::health::HealthResponse,
        crate::api::bank_cards::BankCardRequest,
        crate::api::bank_cards::BankCardResponse,
        crate::api::credentials::CredentialRequest,
        crate::api::credentials::CredentialResponse,
        crate::api::notes::NoteRequest,
        crate::api::notes::NoteResponse,
        crate::api::files::FileResponse,
        crate::api::sync::SyncRequest,
        crate::api::sync::SyncResponse,
        crate::api::sync::SyncBankCardItem,
        crate::api::sync::SyncCredentialItem,
        crate::api::sync::SyncNoteItem,
        crate::api::sync::SyncFileItem,
    )),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Bank cards", description = "Payment card records"),
        (name = "Credentials", description = "Login/password records"),
        (name = "Notes", description = "Free-form text records"),
        (name = "Files", description = "Binary file records"),
        (name = "Sync", description = "Whole-vault synchronisation")
    )
)]
pub struct ApiDoc;
