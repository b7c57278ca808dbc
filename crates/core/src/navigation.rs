//! Navigation between pages.
//!
//! Pages decide their own next and previous page. The [`Navigator`] turns that decision into a
//! [`Destination`] and refuses to hand back a page name the registry cannot resolve: such a name
//! is a defect in a page definition and would otherwise become a broken link.

use crate::document::AnswerDocument;
use crate::page::{Page, PageId};
use crate::registry::PageRegistry;
use crate::{FormError, FormResult};

/// Where the user goes after a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Another page of the same task.
    Page(PageId),
    /// Back to the task list: the task's terminal page (forward) or entry page (backward).
    TaskList,
}

impl Destination {
    pub fn page(&self) -> Option<&PageId> {
        match self {
            Destination::Page(id) => Some(id),
            Destination::TaskList => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Navigator<'a> {
    registry: &'a PageRegistry,
}

impl<'a> Navigator<'a> {
    pub fn new(registry: &'a PageRegistry) -> Self {
        Self { registry }
    }

    /// Page after `page`, computed from its answers and the document.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NavigationDeadEnd`] if the page names an unregistered page.
    pub fn next(
        &self,
        id: &PageId,
        page: &dyn Page,
        document: &AnswerDocument,
    ) -> FormResult<Destination> {
        let target = page.next(document);
        tracing::debug!(from = %id, to = target.unwrap_or("<task list>"), "next page");
        self.resolve(id, target)
    }

    /// Page before `page`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NavigationDeadEnd`] if the page names an unregistered page.
    pub fn previous(
        &self,
        id: &PageId,
        page: &dyn Page,
        document: &AnswerDocument,
    ) -> FormResult<Destination> {
        let target = page.previous(document);
        tracing::debug!(from = %id, to = target.unwrap_or("<task list>"), "previous page");
        self.resolve(id, target)
    }

    fn resolve(&self, from: &PageId, target: Option<&str>) -> FormResult<Destination> {
        let Some(name) = target.filter(|name| !name.is_empty()) else {
            return Ok(Destination::TaskList);
        };

        let id = from.sibling(name);
        match self.registry.lookup_id(&id) {
            Ok(_) => Ok(Destination::Page(id)),
            Err(_) => {
                tracing::error!(from = %from, to = %name, "navigation dead end");
                Err(FormError::NavigationDeadEnd {
                    from: from.clone(),
                    to: name.to_string(),
                })
            }
        }
    }
}
