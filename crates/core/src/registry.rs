//! The page registry: every page of every form, built once at startup.
//!
//! Registration order defines order everywhere else: sections in the order they first appear,
//! tasks likewise within a section, and pages within a task (the first page is the task's entry
//! point). After [`PageRegistry::standard`] returns, the registry is never mutated and can be
//! shared behind an `Arc` without locking.

use crate::document::AnswerDocument;
use crate::page::{FormType, Page, PageId, PageMetadata, PageType};
use crate::pages;
use crate::{FormError, FormResult};
use serde_json::Value;
use std::collections::HashMap;

/// Builds a page from its raw answers.
pub type PageConstructor = fn(&PageId, &Value) -> FormResult<Box<dyn Page>>;

/// Name and heading of a section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionMeta {
    pub name: &'static str,
    pub title: &'static str,
}

/// Name and heading of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskMeta {
    pub name: &'static str,
    pub title: &'static str,
}

/// A registered page: its identity, metadata and constructor.
#[derive(Clone, Debug)]
pub struct RegisteredPage {
    id: PageId,
    metadata: PageMetadata,
    constructor: PageConstructor,
}

impl RegisteredPage {
    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn metadata(&self) -> &PageMetadata {
        &self.metadata
    }

    /// Builds a fresh page instance from raw answers.
    pub fn construct(&self, answers: &Value) -> FormResult<Box<dyn Page>> {
        (self.constructor)(&self.id, answers)
    }
}

#[derive(Clone, Debug)]
pub struct TaskOutline {
    pub meta: TaskMeta,
    pub pages: Vec<&'static str>,
}

impl TaskOutline {
    pub fn entry_page(&self) -> Option<&'static str> {
        self.pages.first().copied()
    }

    pub fn contains(&self, page: &str) -> bool {
        self.pages.iter().any(|p| *p == page)
    }
}

#[derive(Clone, Debug)]
pub struct SectionOutline {
    pub meta: SectionMeta,
    pub tasks: Vec<TaskOutline>,
}

/// Ordered sections and tasks of one form.
#[derive(Clone, Debug)]
pub struct FormOutline {
    pub form: FormType,
    pub sections: Vec<SectionOutline>,
}

impl FormOutline {
    pub fn section(&self, name: &str) -> Option<&SectionOutline> {
        self.sections.iter().find(|s| s.meta.name == name)
    }

    pub fn task(&self, section: &str, task: &str) -> Option<&TaskOutline> {
        self.section(section)
            .and_then(|s| s.tasks.iter().find(|t| t.meta.name == task))
    }

    /// Every task paired with its section, in form order.
    pub fn tasks(&self) -> impl Iterator<Item = (&SectionOutline, &TaskOutline)> {
        self.sections
            .iter()
            .flat_map(|s| s.tasks.iter().map(move |t| (s, t)))
    }

    pub fn first_task(&self) -> Option<(&SectionOutline, &TaskOutline)> {
        self.tasks().next()
    }

    /// The task that follows `task` in linear order, crossing into the next section if needed.
    pub fn task_after(&self, section: &str, task: &str) -> Option<(&SectionOutline, &TaskOutline)> {
        self.tasks()
            .skip_while(|(s, t)| !(s.meta.name == section && t.meta.name == task))
            .nth(1)
    }
}

#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: HashMap<PageId, RegisteredPage>,
    forms: Vec<FormOutline>,
}

fn construct_page<P: PageType>(id: &PageId, answers: &Value) -> FormResult<Box<dyn Page>> {
    Ok(Box::new(P::from_answers(id, answers)?))
}

impl PageRegistry {
    /// An empty registry. Most callers want [`PageRegistry::standard`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry holding the application and assessment forms.
    ///
    /// # Errors
    ///
    /// Any registration conflict is returned as an error; callers should treat it as fatal.
    pub fn standard() -> FormResult<Self> {
        let mut registry = Self::new();
        pages::application::register(&mut registry)?;
        pages::assessment::register(&mut registry)?;
        registry.verify()?;

        tracing::debug!(
            pages = registry.pages.len(),
            forms = registry.forms.len(),
            "page registry built"
        );
        Ok(registry)
    }

    /// Registers a page constructor and its metadata under a section and task.
    ///
    /// # Errors
    ///
    /// - [`FormError::DuplicatePage`] if the (section, task, name) triple is already taken,
    /// - [`FormError::Configuration`] if the section or task was declared earlier with a
    ///   different title, or the metadata declares a field twice.
    pub fn register(
        &mut self,
        form: FormType,
        section: SectionMeta,
        task: TaskMeta,
        constructor: PageConstructor,
        metadata: PageMetadata,
    ) -> FormResult<()> {
        let id = PageId::new(form, section.name, task.name, metadata.name);
        if self.pages.contains_key(&id) {
            tracing::error!(page = %id, "duplicate page registration");
            return Err(FormError::DuplicatePage(id));
        }

        for (i, field) in metadata.fields.iter().enumerate() {
            if metadata.fields[..i].contains(field) {
                return Err(FormError::Configuration(format!(
                    "page {id} declares field '{field}' twice"
                )));
            }
        }

        let outline = match self.forms.iter_mut().position(|f| f.form == form) {
            Some(index) => &mut self.forms[index],
            None => {
                self.forms.push(FormOutline {
                    form,
                    sections: Vec::new(),
                });
                let last = self.forms.len() - 1;
                &mut self.forms[last]
            }
        };

        let section_outline = match outline
            .sections
            .iter()
            .position(|s| s.meta.name == section.name)
        {
            Some(index) => &mut outline.sections[index],
            None => {
                outline.sections.push(SectionOutline {
                    meta: section,
                    tasks: Vec::new(),
                });
                let last = outline.sections.len() - 1;
                &mut outline.sections[last]
            }
        };
        if section_outline.meta != section {
            return Err(FormError::Configuration(format!(
                "section '{}' declared with conflicting titles",
                section.name
            )));
        }

        let task_outline = match section_outline
            .tasks
            .iter()
            .position(|t| t.meta.name == task.name)
        {
            Some(index) => &mut section_outline.tasks[index],
            None => {
                section_outline.tasks.push(TaskOutline {
                    meta: task,
                    pages: Vec::new(),
                });
                let last = section_outline.tasks.len() - 1;
                &mut section_outline.tasks[last]
            }
        };
        if task_outline.meta != task {
            return Err(FormError::Configuration(format!(
                "task '{}' declared with conflicting titles",
                task.name
            )));
        }

        task_outline.pages.push(metadata.name);
        self.pages.insert(
            id.clone(),
            RegisteredPage {
                id,
                metadata,
                constructor,
            },
        );
        Ok(())
    }

    /// Registers a page type using its declared metadata.
    pub fn register_page<P: PageType>(
        &mut self,
        form: FormType,
        section: SectionMeta,
        task: TaskMeta,
    ) -> FormResult<()> {
        self.register(form, section, task, construct_page::<P>, P::METADATA)
    }

    /// Finds a registered page.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotFound`] if no such page was registered.
    pub fn lookup(
        &self,
        form: FormType,
        section: &str,
        task: &str,
        page: &str,
    ) -> FormResult<&RegisteredPage> {
        self.lookup_id(&PageId::new(form, section, task, page))
    }

    pub fn lookup_id(&self, id: &PageId) -> FormResult<&RegisteredPage> {
        self.pages
            .get(id)
            .ok_or_else(|| FormError::NotFound(id.to_string()))
    }

    pub fn outline(&self, form: FormType) -> FormResult<&FormOutline> {
        self.forms
            .iter()
            .find(|f| f.form == form)
            .ok_or(FormError::UnknownForm(form))
    }

    pub fn forms(&self) -> impl Iterator<Item = &FormOutline> {
        self.forms.iter()
    }

    /// Registered pages of a form in form order.
    pub fn pages_in_order(&self, form: FormType) -> FormResult<Vec<&RegisteredPage>> {
        let outline = self.outline(form)?;
        outline
            .tasks()
            .flat_map(|(section, task)| {
                task.pages.iter().map(move |page| {
                    self.lookup(form, section.meta.name, task.meta.name, page)
                })
            })
            .collect()
    }

    /// Builds a page from the slice of the document it owns.
    pub fn instantiate(&self, id: &PageId, document: &AnswerDocument) -> FormResult<Box<dyn Page>> {
        let registered = self.lookup_id(id)?;
        let answers = document
            .page_answers(&id.task, &id.page)
            .cloned()
            .unwrap_or(Value::Null);
        registered.construct(&answers)
    }

    fn verify(&self) -> FormResult<()> {
        for outline in &self.forms {
            for (section, task) in outline.tasks() {
                if task.pages.is_empty() {
                    return Err(FormError::Configuration(format!(
                        "task {}/{}/{} has no pages",
                        outline.form, section.meta.name, task.meta.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;
    use crate::validation::ValidationErrors;

    #[derive(Debug)]
    struct Stub;

    impl Page for Stub {
        fn metadata(&self) -> PageMetadata {
            Self::METADATA
        }
        fn title(&self) -> String {
            "Stub".into()
        }
        fn body(&self) -> Value {
            Value::Object(Default::default())
        }
        fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
            None
        }
        fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
            None
        }
        fn errors(&self) -> ValidationErrors {
            ValidationErrors::new()
        }
        fn response(&self) -> Response {
            Response::new()
        }
    }

    impl PageType for Stub {
        const METADATA: PageMetadata = PageMetadata {
            name: "stub",
            display_name: "Stub",
            fields: &[],
        };

        fn from_answers(_: &PageId, _: &Value) -> FormResult<Self> {
            Ok(Stub)
        }
    }

    const SECTION: SectionMeta = SectionMeta {
        name: "section",
        title: "Section",
    };
    const TASK: TaskMeta = TaskMeta {
        name: "task",
        title: "Task",
    };

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = PageRegistry::new();
        registry
            .register_page::<Stub>(FormType::Application, SECTION, TASK)
            .expect("first registration");

        let err = registry
            .register_page::<Stub>(FormType::Application, SECTION, TASK)
            .expect_err("duplicate should fail");
        assert!(matches!(err, FormError::DuplicatePage(id) if id.page == "stub"));
    }

    #[test]
    fn same_page_name_may_appear_in_another_form() {
        let mut registry = PageRegistry::new();
        registry
            .register_page::<Stub>(FormType::Application, SECTION, TASK)
            .expect("application");
        registry
            .register_page::<Stub>(FormType::Assessment, SECTION, TASK)
            .expect("assessment");
        assert_eq!(registry.forms().count(), 2);
    }

    #[test]
    fn conflicting_section_titles_are_rejected() {
        let mut registry = PageRegistry::new();
        registry
            .register_page::<Stub>(FormType::Application, SECTION, TASK)
            .expect("first");

        let renamed = SectionMeta {
            name: "section",
            title: "Another title",
        };
        let other_task = TaskMeta {
            name: "other",
            title: "Other",
        };
        let err = registry
            .register_page::<Stub>(FormType::Application, renamed, other_task)
            .expect_err("conflict");
        assert!(matches!(err, FormError::Configuration(msg) if msg.contains("conflicting")));
    }

    #[test]
    fn lookup_of_unregistered_page_is_not_found() {
        let registry = PageRegistry::standard().expect("standard registry");
        let err = registry
            .lookup(FormType::Application, "basic-information", "basic-information", "nope")
            .expect_err("unregistered");
        assert!(matches!(err, FormError::NotFound(msg) if msg.ends_with("/nope")));
    }

    #[test]
    fn standard_registry_orders_sections_and_tasks() {
        let registry = PageRegistry::standard().expect("standard registry");
        let outline = registry.outline(FormType::Application).expect("application");

        let tasks: Vec<_> = outline.tasks().map(|(_, t)| t.meta.name).collect();
        assert_eq!(
            tasks,
            [
                "basic-information",
                "risk-management-features",
                "access-and-healthcare"
            ]
        );

        let (_, first) = outline.first_task().expect("first task");
        assert_eq!(first.entry_page(), Some("risk-level"));

        let (section, next) = outline
            .task_after("basic-information", "basic-information")
            .expect("next task");
        assert_eq!(section.meta.name, "risk-and-need-factors");
        assert_eq!(next.meta.name, "risk-management-features");
        assert!(outline
            .task_after("risk-and-need-factors", "access-and-healthcare")
            .is_none());
    }

    #[test]
    fn every_registered_page_constructs_from_empty_answers() {
        let registry = PageRegistry::standard().expect("standard registry");
        for form in FormType::ALL {
            for registered in registry.pages_in_order(form).expect("pages") {
                let page = registered
                    .construct(&Value::Null)
                    .unwrap_or_else(|e| panic!("{} failed: {e}", registered.id()));
                assert_eq!(page.metadata(), *registered.metadata());
            }
        }
    }
}
