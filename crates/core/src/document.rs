//! The answer document: every answer given so far for one in-progress form.
//!
//! Answers are keyed by task and then by page name. A page's body is replaced wholesale when the
//! page is resubmitted; nothing is ever removed. Answers left behind when a user changes branch
//! are kept but flagged as superseded until the branch brings them back.

use crate::page::FormType;
use chrono::{DateTime, Utc};
use forms_uuid::DocumentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Page name to stored body.
pub type PageAnswers = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDocument {
    id: DocumentId,
    form: FormType,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    answers: BTreeMap<String, PageAnswers>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    superseded: BTreeMap<String, BTreeSet<String>>,
}

impl AnswerDocument {
    /// Starts an empty document.
    pub fn new(id: DocumentId, form: FormType, now: DateTime<Utc>) -> Self {
        Self {
            id,
            form,
            created_at: now,
            updated_at: now,
            answers: BTreeMap::new(),
            superseded: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn form(&self) -> FormType {
        self.form
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Raw body stored for a page, if it has ever been submitted.
    pub fn page_answers(&self, task: &str, page: &str) -> Option<&Value> {
        self.answers.get(task).and_then(|pages| pages.get(page))
    }

    pub fn has_answers(&self, task: &str, page: &str) -> bool {
        self.page_answers(task, page).is_some()
    }

    /// Whether anything at all has been stored for a task.
    pub fn task_started(&self, task: &str) -> bool {
        self.answers.get(task).is_some_and(|pages| !pages.is_empty())
    }

    /// A single stored answer, for pages whose branching depends on earlier pages.
    pub fn answer(&self, task: &str, page: &str, field: &str) -> Option<&Value> {
        self.page_answers(task, page)
            .and_then(|body| body.get(field))
    }

    pub fn answer_str(&self, task: &str, page: &str, field: &str) -> Option<&str> {
        self.answer(task, page, field).and_then(Value::as_str)
    }

    /// Names of the pages with stored answers in a task.
    pub fn answered_pages(&self, task: &str) -> impl Iterator<Item = &str> {
        self.answers
            .get(task)
            .into_iter()
            .flat_map(|pages| pages.keys().map(String::as_str))
    }

    /// Stores a page's body, replacing any previous body for that page.
    ///
    /// Non-object bodies are stored as an empty object so the document only ever holds
    /// answer maps.
    pub fn merge(&mut self, task: &str, page: &str, body: Value, now: DateTime<Utc>) {
        let body = match body {
            Value::Object(_) => body,
            _ => Value::Object(serde_json::Map::new()),
        };

        self.answers
            .entry(task.to_string())
            .or_default()
            .insert(page.to_string(), body);
        self.updated_at = now;
    }

    /// Replaces the superseded set for a task.
    pub fn set_superseded(&mut self, task: &str, pages: BTreeSet<String>) {
        if pages.is_empty() {
            self.superseded.remove(task);
        } else {
            self.superseded.insert(task.to_string(), pages);
        }
    }

    pub fn is_superseded(&self, task: &str, page: &str) -> bool {
        self.superseded
            .get(task)
            .is_some_and(|pages| pages.contains(page))
    }

    pub fn superseded_pages(&self, task: &str) -> impl Iterator<Item = &str> {
        self.superseded
            .get(task)
            .into_iter()
            .flat_map(|pages| pages.iter().map(String::as_str))
    }

    /// Answers on the current branch of every task, without superseded pages.
    ///
    /// This is the starting point for translating the document into a submission payload.
    pub fn current_answers(&self) -> BTreeMap<String, PageAnswers> {
        self.answers
            .iter()
            .map(|(task, pages)| {
                let current: PageAnswers = pages
                    .iter()
                    .filter(|(page, _)| !self.is_superseded(task, page))
                    .map(|(page, body)| (page.clone(), body.clone()))
                    .collect();
                (task.clone(), current)
            })
            .filter(|(_, pages)| !pages.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn document() -> AnswerDocument {
        AnswerDocument::new(DocumentId::new(), FormType::Application, at(9))
    }

    #[test]
    fn merge_overwrites_page_body_and_keeps_other_pages() {
        let mut doc = document();
        doc.merge("basic-information", "risk-level", json!({"riskLevel": "medium"}), at(10));
        doc.merge("basic-information", "not-eligible", json!({}), at(11));
        doc.merge("basic-information", "risk-level", json!({"riskLevel": "highRisk"}), at(12));

        assert_eq!(
            doc.answer_str("basic-information", "risk-level", "riskLevel"),
            Some("highRisk")
        );
        assert!(doc.has_answers("basic-information", "not-eligible"));
        assert_eq!(doc.updated_at(), at(12));
        assert_eq!(doc.created_at(), at(9));
    }

    #[test]
    fn merge_normalises_non_object_bodies() {
        let mut doc = document();
        doc.merge("task", "page", json!("oops"), at(10));
        assert_eq!(doc.page_answers("task", "page"), Some(&json!({})));
    }

    #[test]
    fn superseded_pages_are_kept_but_excluded_from_current_answers() {
        let mut doc = document();
        doc.merge("task", "a", json!({"x": "1"}), at(10));
        doc.merge("task", "b", json!({"y": "2"}), at(10));
        doc.set_superseded("task", BTreeSet::from(["b".to_string()]));

        assert!(doc.has_answers("task", "b"));
        assert!(doc.is_superseded("task", "b"));

        let current = doc.current_answers();
        assert!(current["task"].contains_key("a"));
        assert!(!current["task"].contains_key("b"));

        doc.set_superseded("task", BTreeSet::new());
        assert!(!doc.is_superseded("task", "b"));
    }

    #[test]
    fn round_trips_through_json() {
        let mut doc = document();
        doc.merge("task", "page", json!({"answer": "yes"}), at(10));

        let json = serde_json::to_string(&doc).expect("serialize");
        let back: AnswerDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, doc);
        assert!(!json.contains("superseded"));
    }
}
