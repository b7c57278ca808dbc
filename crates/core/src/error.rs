use crate::page::{FormType, PageId};
use forms_uuid::DocumentId;

/// Errors raised by the forms core.
///
/// Validation failures are deliberately absent: a rejected submission is returned as a
/// [`crate::ValidationErrors`] map inside [`crate::SubmitOutcome::Invalid`], never as an error.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("page not found: {0}")]
    NotFound(String),

    #[error("page {0} is registered more than once")]
    DuplicatePage(PageId),

    #[error("registry configuration error: {0}")]
    Configuration(String),

    #[error("navigation from {from} leads to unregistered page '{to}'")]
    NavigationDeadEnd { from: PageId, to: String },

    #[error("no {0} form is registered")]
    UnknownForm(FormType),

    #[error("answer document {0} not found")]
    DocumentNotFound(DocumentId),

    #[error("answer document {document} belongs to the {actual} form, not {expected}")]
    FormMismatch {
        document: DocumentId,
        expected: FormType,
        actual: FormType,
    },

    #[error("page {page} could not read its answers: {message}")]
    InvalidBody { page: PageId, message: String },

    #[error("failed to create document directory: {0}")]
    DocumentDirCreation(std::io::Error),
    #[error("failed to write answer document: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read answer document: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize answer document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize answer document: {0}")]
    Deserialization(serde_json::Error),
    #[error("document store lock poisoned")]
    StoreLockPoisoned,
}

pub type FormResult<T> = std::result::Result<T, FormError>;
