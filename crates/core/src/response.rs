//! Question/answer rendering of page answers for read-only review views.

use crate::constants::NOT_PROVIDED;
use crate::page::YesOrNo;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

/// Question text to answer text for one page, in question order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Response(IndexMap<String, String>);

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one question/answer pair.
    pub fn answer(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.0.insert(question.into(), answer.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.0.get(question).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }
}

pub fn yes_no(answer: Option<YesOrNo>) -> String {
    answer.map_or(NOT_PROVIDED, YesOrNo::label).to_string()
}

/// Dates are shown the GOV.UK way, e.g. `1 March 2025`.
pub fn date(answer: Option<NaiveDate>) -> String {
    answer.map_or_else(
        || NOT_PROVIDED.to_string(),
        |d| d.format("%-d %B %Y").to_string(),
    )
}

pub fn text<T: AsRef<str>>(answer: &Option<T>) -> String {
    answer
        .as_ref()
        .map_or(NOT_PROVIDED, |t| t.as_ref())
        .to_string()
}

/// Coded answer rendered through its label.
pub fn coded<T: Copy>(answer: Option<T>, label: impl Fn(T) -> &'static str) -> String {
    answer.map_or(NOT_PROVIDED, label).to_string()
}

/// Checkbox answers rendered as a comma-separated list of labels.
pub fn list<T: Copy>(answers: &[T], label: impl Fn(T) -> &'static str) -> String {
    if answers.is_empty() {
        return NOT_PROVIDED.to_string();
    }
    answers
        .iter()
        .map(|a| label(*a))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One page of a review transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptPage {
    pub page: String,
    pub title: String,
    pub response: Response,
}

/// The answered pages of one task, in the order they were reached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptTask {
    pub section: String,
    pub section_title: String,
    pub task: String,
    pub task_title: String,
    pub pages: Vec<TranscriptPage>,
}

/// Read-only question/answer record of a whole form, in section and task order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub tasks: Vec<TranscriptTask>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.tasks.iter().all(|t| t.pages.is_empty())
    }
}
