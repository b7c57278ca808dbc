//! Task progress, derived from the answer document.
//!
//! Progress is never stored. A task is walked from its entry page, following each page's own
//! `next` decision over the stored answers, until it runs out of answered pages, meets a page
//! that would not validate, or reaches the end of the task.

use crate::document::AnswerDocument;
use crate::navigation::{Destination, Navigator};
use crate::page::{FormType, PageId};
use crate::registry::{PageRegistry, SectionOutline, TaskOutline};
use crate::FormResult;
use serde::Serialize;
use std::collections::BTreeSet;

/// Where a walk through a task's stored answers stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkEnd {
    /// The terminal page was reached and every visited page is valid.
    Complete,
    /// The next page on the route has no stored answers yet.
    Unanswered,
    /// A stored body no longer passes its page's validation.
    Invalid,
    /// The route came back to a page already visited.
    Cycle,
}

/// Result of walking one task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskWalk {
    /// Valid answered pages on the current route, in the order reached.
    pub path: Vec<String>,
    pub end: WalkEnd,
}

impl TaskWalk {
    pub fn is_complete(&self) -> bool {
        self.end == WalkEnd::Complete
    }

    pub fn contains(&self, page: &str) -> bool {
        self.path.iter().any(|p| p == page)
    }
}

/// Follows a task's route through the stored answers.
///
/// # Errors
///
/// Propagates construction failures and [`crate::FormError::NavigationDeadEnd`].
pub fn walk_task(
    registry: &PageRegistry,
    form: FormType,
    section: &SectionOutline,
    task: &TaskOutline,
    document: &AnswerDocument,
) -> FormResult<TaskWalk> {
    let navigator = Navigator::new(registry);
    let mut path: Vec<String> = Vec::new();

    let Some(entry) = task.entry_page() else {
        return Ok(TaskWalk {
            path,
            end: WalkEnd::Unanswered,
        });
    };
    let mut current = PageId::new(form, section.meta.name, task.meta.name, entry);

    loop {
        if path.contains(&current.page) {
            tracing::warn!(page = %current, "navigation cycle in stored answers");
            return Ok(TaskWalk {
                path,
                end: WalkEnd::Cycle,
            });
        }

        if !document.has_answers(&current.task, &current.page) {
            return Ok(TaskWalk {
                path,
                end: WalkEnd::Unanswered,
            });
        }

        let page = registry.instantiate(&current, document)?;
        if !page.errors().is_empty() {
            return Ok(TaskWalk {
                path,
                end: WalkEnd::Invalid,
            });
        }

        path.push(current.page.clone());
        match navigator.next(&current, page.as_ref(), document)? {
            Destination::TaskList => {
                return Ok(TaskWalk {
                    path,
                    end: WalkEnd::Complete,
                })
            }
            Destination::Page(next) => current = next,
        }
    }
}

/// Stored pages of a task that are not on its current route.
pub fn superseded_pages(document: &AnswerDocument, task: &str, walk: &TaskWalk) -> BTreeSet<String> {
    document
        .answered_pages(task)
        .filter(|page| !walk.contains(page))
        .map(str::to_string)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Complete,
    CannotStart,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not started",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Complete => "Completed",
            TaskStatus::CannotStart => "Cannot start yet",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListEntry {
    pub section: &'static str,
    pub section_title: &'static str,
    pub task: &'static str,
    pub task_title: &'static str,
    pub entry_page: Option<&'static str>,
    pub status: TaskStatus,
}

/// Every task of a form with its status, in form order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub form: FormType,
    pub tasks: Vec<TaskListEntry>,
}

impl TaskList {
    pub fn completed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Complete)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.status == TaskStatus::Complete)
    }

    pub fn status_of(&self, task: &str) -> Option<TaskStatus> {
        self.tasks.iter().find(|t| t.task == task).map(|t| t.status)
    }
}

/// Builds the task list for a document.
///
/// Every task after the form's first task cannot be started until the first task is complete.
pub fn task_list(registry: &PageRegistry, document: &AnswerDocument) -> FormResult<TaskList> {
    let form = document.form();
    let outline = registry.outline(form)?;

    let mut tasks = Vec::new();
    let mut first_complete = None;

    for (section, task) in outline.tasks() {
        let walk = walk_task(registry, form, section, task, document)?;
        let started = document
            .answered_pages(task.meta.name)
            .any(|page| !document.is_superseded(task.meta.name, page));

        let mut status = if walk.is_complete() {
            TaskStatus::Complete
        } else if started {
            TaskStatus::InProgress
        } else {
            TaskStatus::NotStarted
        };

        match first_complete {
            None => first_complete = Some(status == TaskStatus::Complete),
            Some(false) => status = TaskStatus::CannotStart,
            Some(true) => {}
        }

        tasks.push(TaskListEntry {
            section: section.meta.name,
            section_title: section.meta.title,
            task: task.meta.name,
            task_title: task.meta.title,
            entry_page: task.entry_page(),
            status,
        });
    }

    Ok(TaskList { form, tasks })
}
