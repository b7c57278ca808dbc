//! # Forms Core
//!
//! Core logic for multi-step placement forms and placement status.
//!
//! A form (application or assessment) is split into sections, sections into tasks, and tasks
//! into pages. Each page owns a handful of answer fields, validates them, and decides which page
//! comes next from its own answers and anything answered earlier. Answers accumulate in one
//! [`AnswerDocument`] per form, persisted through a [`DocumentStore`].
//!
//! This crate contains:
//! - the page contract ([`Page`]) and every concrete page of both forms,
//! - the [`PageRegistry`], built once at startup and shared read-only,
//! - navigation, validation and question/answer transcripts,
//! - the [`FormService`] workflow a controller drives,
//! - the placement status engine ([`status`]).
//!
//! **No transport concerns**: HTTP, sessions and rendering belong to callers such as `forms-cli`.

pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod navigation;
pub mod page;
pub mod pages;
pub mod registry;
pub mod response;
pub mod service;
pub mod status;
pub mod store;
pub mod task_list;
pub mod validation;

pub use config::CoreConfig;
pub use document::AnswerDocument;
pub use error::{FormError, FormResult};
pub use navigation::{Destination, Navigator};
pub use page::{FieldValues, FormType, Page, PageId, PageMetadata, PageType};
pub use registry::PageRegistry;
pub use response::{Response, Transcript};
pub use service::{FormService, PageView, SubmitOutcome};
pub use status::{DetailedStatus, OverallStatus, Placement, StatusError, StatusResult};
pub use store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
pub use task_list::{TaskList, TaskStatus};
pub use validation::ValidationErrors;

pub use forms_uuid::DocumentId;
