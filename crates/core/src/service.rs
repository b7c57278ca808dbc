//! The form workflow: start a form, show a page, accept a submission, go back, and review.
//!
//! One call is one unit of work. Each call reads the document from the store, and a submission
//! writes it back once. A submission only reports where to go next after the store has
//! confirmed the save.

use crate::document::AnswerDocument;
use crate::navigation::{Destination, Navigator};
use crate::page::{FieldValues, FormType, PageId};
use crate::registry::PageRegistry;
use crate::response::{Transcript, TranscriptPage, TranscriptTask};
use crate::store::DocumentStore;
use crate::task_list::{self, superseded_pages, walk_task, TaskList};
use crate::validation::ValidationErrors;
use crate::{FormError, FormResult};
use chrono::Utc;
use forms_uuid::DocumentId;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Result of submitting a page.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Answers were valid and saved.
    Advanced {
        destination: Destination,
        /// Entry page of the following task, when this submission finished a task.
        next_task: Option<PageId>,
    },
    /// Answers were rejected. Nothing was saved.
    Invalid {
        errors: ValidationErrors,
        /// The raw submission, for re-rendering the page with the user's input.
        submitted: FieldValues,
    },
}

impl SubmitOutcome {
    pub fn is_advanced(&self) -> bool {
        matches!(self, SubmitOutcome::Advanced { .. })
    }
}

/// What a controller needs to render a page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageView {
    pub id: PageId,
    pub title: String,
    /// Stored answers for the page, coerced through its typed body.
    pub body: Value,
    pub back: Destination,
    /// The stored answers are no longer on the task's current route.
    pub superseded: bool,
}

pub struct FormService<S> {
    registry: Arc<PageRegistry>,
    store: S,
}

impl<S: DocumentStore> FormService<S> {
    pub fn new(registry: Arc<PageRegistry>, store: S) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an empty answer document for `form`.
    pub fn start(&self, form: FormType) -> FormResult<AnswerDocument> {
        self.registry.outline(form)?;
        self.store.create(form)
    }

    /// Loads a document, checking it belongs to the form of the page being addressed.
    fn load_for(&self, document_id: &DocumentId, form: FormType) -> FormResult<AnswerDocument> {
        let document = self.store.load(document_id)?;
        if document.form() != form {
            return Err(FormError::FormMismatch {
                document: *document_id,
                expected: form,
                actual: document.form(),
            });
        }
        Ok(document)
    }

    pub fn page(&self, document_id: &DocumentId, id: &PageId) -> FormResult<PageView> {
        self.registry.lookup_id(id)?;
        let document = self.load_for(document_id, id.form)?;

        let page = self.registry.instantiate(id, &document)?;
        let back = Navigator::new(&self.registry).previous(id, page.as_ref(), &document)?;

        Ok(PageView {
            id: id.clone(),
            title: page.title(),
            body: page.body(),
            back,
            superseded: document.is_superseded(&id.task, &id.page),
        })
    }

    /// Validates a page submission and, if it is valid, merges it and saves the document.
    ///
    /// # Errors
    ///
    /// Unregistered pages, missing documents, dead ends and store failures are errors. Invalid
    /// answers are not: they come back as [`SubmitOutcome::Invalid`].
    pub fn submit(
        &self,
        document_id: &DocumentId,
        id: &PageId,
        fields: &FieldValues,
    ) -> FormResult<SubmitOutcome> {
        let registered = self.registry.lookup_id(id)?;
        let mut document = self.load_for(document_id, id.form)?;

        let page = registered.construct(&Value::Object(fields.clone()))?;
        let errors = page.errors();
        if !errors.is_empty() {
            tracing::debug!(page = %id, errors = errors.len(), "submission rejected");
            return Ok(SubmitOutcome::Invalid {
                errors,
                submitted: fields.clone(),
            });
        }

        let destination = Navigator::new(&self.registry).next(id, page.as_ref(), &document)?;

        document.merge(&id.task, &id.page, page.body(), Utc::now());
        self.mark_superseded(&mut document, id)?;
        self.store.save(&document)?;

        let next_task = match destination {
            Destination::TaskList => self.next_task(id)?,
            Destination::Page(_) => None,
        };

        tracing::info!(document = %document_id, page = %id, "page submitted");
        Ok(SubmitOutcome::Advanced {
            destination,
            next_task,
        })
    }

    /// Where the back link of a page leads, given the stored answers.
    pub fn back(&self, document_id: &DocumentId, id: &PageId) -> FormResult<Destination> {
        self.registry.lookup_id(id)?;
        let document = self.load_for(document_id, id.form)?;
        let page = self.registry.instantiate(id, &document)?;
        Navigator::new(&self.registry).previous(id, page.as_ref(), &document)
    }

    pub fn task_list(&self, document_id: &DocumentId) -> FormResult<TaskList> {
        let document = self.store.load(document_id)?;
        task_list::task_list(&self.registry, &document)
    }

    /// Question/answer record of every page on the current route of every task.
    pub fn transcript(&self, document_id: &DocumentId) -> FormResult<Transcript> {
        let document = self.store.load(document_id)?;
        let form = document.form();
        let outline = self.registry.outline(form)?;

        let mut tasks = Vec::new();
        for (section, task) in outline.tasks() {
            let walk = walk_task(&self.registry, form, section, task, &document)?;
            if walk.path.is_empty() {
                continue;
            }

            let pages = walk
                .path
                .iter()
                .map(|name| {
                    let id = PageId::new(form, section.meta.name, task.meta.name, name.as_str());
                    let page = self.registry.instantiate(&id, &document)?;
                    Ok(TranscriptPage {
                        page: name.clone(),
                        title: page.title(),
                        response: page.response(),
                    })
                })
                .collect::<FormResult<Vec<_>>>()?;

            tasks.push(TranscriptTask {
                section: section.meta.name.to_string(),
                section_title: section.meta.title.to_string(),
                task: task.meta.name.to_string(),
                task_title: task.meta.title.to_string(),
                pages,
            });
        }

        Ok(Transcript { tasks })
    }

    /// Recomputes which stored pages of the submitted task are off its current route.
    fn mark_superseded(&self, document: &mut AnswerDocument, id: &PageId) -> FormResult<()> {
        let outline = self.registry.outline(id.form)?;
        let (Some(section), Some(task)) = (
            outline.section(&id.section),
            outline.task(&id.section, &id.task),
        ) else {
            return Err(FormError::NotFound(id.to_string()));
        };

        let walk = walk_task(&self.registry, id.form, section, task, document)?;
        if !walk.contains(&id.page) {
            // The route does not reach this page yet, so it says nothing about the others.
            let kept: BTreeSet<String> = document
                .superseded_pages(&id.task)
                .filter(|page| *page != id.page)
                .map(str::to_string)
                .collect();
            tracing::debug!(
                document = %document.id(),
                page = %id,
                "page saved off the current route"
            );
            document.set_superseded(&id.task, kept);
            return Ok(());
        }
        let superseded = superseded_pages(document, &id.task, &walk);

        let newly: Vec<&str> = superseded
            .iter()
            .map(String::as_str)
            .filter(|page| !document.is_superseded(&id.task, page))
            .collect();
        if !newly.is_empty() {
            tracing::warn!(
                document = %document.id(),
                task = %id.task,
                pages = ?newly,
                "answers superseded by a change of route"
            );
        }

        document.set_superseded(&id.task, superseded);
        Ok(())
    }

    fn next_task(&self, id: &PageId) -> FormResult<Option<PageId>> {
        let outline = self.registry.outline(id.form)?;
        Ok(outline
            .task_after(&id.section, &id.task)
            .and_then(|(section, task)| {
                task.entry_page()
                    .map(|entry| PageId::new(id.form, section.meta.name, task.meta.name, entry))
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use crate::task_list::TaskStatus;
    use serde_json::json;

    const BI: &str = "basic-information";

    fn service() -> FormService<MemoryDocumentStore> {
        let registry = PageRegistry::standard().expect("registry");
        FormService::new(Arc::new(registry), MemoryDocumentStore::new())
    }

    fn fields(value: Value) -> FieldValues {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn bi(page: &str) -> PageId {
        PageId::new(FormType::Application, BI, BI, page)
    }

    fn submit(
        service: &FormService<MemoryDocumentStore>,
        doc: &DocumentId,
        page: &str,
        answers: Value,
    ) -> SubmitOutcome {
        service
            .submit(doc, &bi(page), &fields(answers))
            .expect("submit")
    }

    fn advanced_to(outcome: &SubmitOutcome) -> Option<&str> {
        match outcome {
            SubmitOutcome::Advanced {
                destination: Destination::Page(id),
                ..
            } => Some(id.page.as_str()),
            _ => None,
        }
    }

    #[test]
    fn missing_risk_level_is_rejected_without_saving() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");

        let outcome = submit(&service, &doc.id(), "risk-level", json!({"csrf": "token"}));
        let SubmitOutcome::Invalid { errors, submitted } = outcome else {
            panic!("expected invalid outcome");
        };
        assert!(errors.contains("riskLevel"));
        assert_eq!(submitted.get("csrf"), Some(&json!("token")));

        let stored = service.store().load(&doc.id()).expect("load");
        assert!(!stored.has_answers(BI, "risk-level"));
    }

    #[test]
    fn risk_level_routes_by_level() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");

        for (level, expected) in [
            ("medium", "not-eligible"),
            ("highRisk", "is-exceptional-case"),
            ("veryHighRisk", "is-exceptional-case"),
        ] {
            let outcome = submit(&service, &doc.id(), "risk-level", json!({ "riskLevel": level }));
            assert_eq!(advanced_to(&outcome), Some(expected), "riskLevel {level}");
        }
    }

    #[test]
    fn submission_stores_only_owned_typed_fields() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");

        submit(
            &service,
            &doc.id(),
            "release-date",
            json!({"knowReleaseDate": "yes", "releaseDate": "2025-06-01", "extra": "x"}),
        );

        let stored = service.store().load(&doc.id()).expect("load");
        assert_eq!(
            stored.page_answers(BI, "release-date"),
            Some(&json!({"knowReleaseDate": "yes", "releaseDate": "2025-06-01"}))
        );
    }

    #[test]
    fn changing_route_supersedes_but_keeps_downstream_answers() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");
        let id = doc.id();

        submit(&service, &id, "risk-level", json!({"riskLevel": "highRisk"}));
        submit(&service, &id, "is-exceptional-case", json!({"isExceptionalCase": "yes"}));

        // Going back and lowering the risk level takes the exceptional case page off the route.
        submit(&service, &id, "risk-level", json!({"riskLevel": "low"}));
        let stored = service.store().load(&id).expect("load");
        assert!(stored.has_answers(BI, "is-exceptional-case"));
        assert!(stored.is_superseded(BI, "is-exceptional-case"));

        let view = service.page(&id, &bi("is-exceptional-case")).expect("view");
        assert!(view.superseded);
        assert_eq!(view.body, json!({"isExceptionalCase": "yes"}));

        // Restoring the original answer brings it back.
        submit(&service, &id, "risk-level", json!({"riskLevel": "veryHighRisk"}));
        let stored = service.store().load(&id).expect("load");
        assert!(!stored.is_superseded(BI, "is-exceptional-case"));
    }

    #[test]
    fn finishing_a_task_names_the_next_task() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");
        let id = doc.id();

        submit(&service, &id, "risk-level", json!({"riskLevel": "low"}));
        let outcome = submit(&service, &id, "not-eligible", json!({}));

        assert_eq!(
            outcome,
            SubmitOutcome::Advanced {
                destination: Destination::TaskList,
                next_task: Some(PageId::new(
                    FormType::Application,
                    "risk-and-need-factors",
                    "risk-management-features",
                    "risk-management-features",
                )),
            }
        );

        let list = service.task_list(&id).expect("task list");
        assert_eq!(list.status_of(BI), Some(TaskStatus::Complete));
    }

    #[test]
    fn last_task_of_the_form_has_no_next_task() {
        let service = service();
        let doc = service.start(FormType::Assessment).expect("start");

        let outcome = service
            .submit(
                &doc.id(),
                &PageId::new(
                    FormType::Assessment,
                    "make-a-decision",
                    "make-a-decision",
                    "make-a-decision",
                ),
                &fields(json!({"decision": "accept"})),
            )
            .expect("submit");
        assert_eq!(
            outcome,
            SubmitOutcome::Advanced {
                destination: Destination::TaskList,
                next_task: None,
            }
        );
    }

    #[test]
    fn unregistered_page_is_not_found() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");

        let err = service
            .submit(&doc.id(), &bi("no-such-page"), &FieldValues::new())
            .expect_err("unregistered");
        assert!(matches!(err, FormError::NotFound(_)));
    }

    #[test]
    fn page_of_another_form_is_rejected() {
        let service = service();
        let doc = service.start(FormType::Assessment).expect("start");

        let err = service
            .submit(&doc.id(), &bi("risk-level"), &fields(json!({"riskLevel": "low"})))
            .expect_err("wrong form");
        assert!(matches!(err, FormError::FormMismatch { .. }));
    }

    #[test]
    fn back_follows_stored_answers() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");
        let id = doc.id();

        submit(&service, &id, "sentence-type", json!({"sentenceType": "bailPlacement"}));
        assert_eq!(
            service.back(&id, &bi("placement-date")).expect("back"),
            Destination::Page(bi("situation"))
        );
        assert_eq!(
            service.back(&id, &bi("risk-level")).expect("back"),
            Destination::TaskList
        );
    }

    #[test]
    fn answer_saved_before_entry_page_is_not_superseded() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");
        let id = doc.id();

        submit(&service, &id, "sentence-type", json!({"sentenceType": "life"}));

        let stored = service.store().load(&id).expect("load");
        assert!(!stored.is_superseded(BI, "sentence-type"));
        assert!(!service.page(&id, &bi("sentence-type")).expect("page").superseded);
        assert_eq!(
            service.task_list(&id).expect("task list").status_of(BI),
            Some(TaskStatus::InProgress)
        );
    }

    #[test]
    fn transcript_lists_current_route_only() {
        let service = service();
        let doc = service.start(FormType::Application).expect("start");
        let id = doc.id();

        submit(&service, &id, "risk-level", json!({"riskLevel": "highRisk"}));
        submit(&service, &id, "is-exceptional-case", json!({"isExceptionalCase": "no"}));
        submit(&service, &id, "not-eligible", json!({}));
        submit(&service, &id, "risk-level", json!({"riskLevel": "medium"}));

        let transcript = service.transcript(&id).expect("transcript");
        assert_eq!(transcript.tasks.len(), 1);
        let pages: Vec<_> = transcript.tasks[0].pages.iter().map(|p| p.page.as_str()).collect();
        assert_eq!(pages, ["risk-level", "not-eligible"]);
        assert_eq!(
            transcript.tasks[0].pages[0]
                .response
                .get("What is the person's current risk of serious harm level?"),
            Some("Medium")
        );
    }

    #[derive(Default)]
    struct FailingSaves(MemoryDocumentStore);

    impl DocumentStore for FailingSaves {
        fn create(&self, form: FormType) -> FormResult<AnswerDocument> {
            self.0.create(form)
        }

        fn load(&self, id: &DocumentId) -> FormResult<AnswerDocument> {
            self.0.load(id)
        }

        fn save(&self, _: &AnswerDocument) -> FormResult<()> {
            Err(FormError::FileWrite(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn failed_save_reports_an_error_not_a_destination() {
        let registry = PageRegistry::standard().expect("registry");
        let service = FormService::new(Arc::new(registry), FailingSaves::default());
        let doc = service.store().0.create(FormType::Application).expect("create");

        let err = service
            .submit(&doc.id(), &bi("risk-level"), &fields(json!({"riskLevel": "low"})))
            .expect_err("save fails");
        assert!(matches!(err, FormError::FileWrite(_)));
        assert!(!service.store().load(&doc.id()).expect("load").has_answers(BI, "risk-level"));
    }
}
