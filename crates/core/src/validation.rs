//! Per-page validation results and the rules pages build them from.
//!
//! A [`ValidationErrors`] map is data, not an error: it is recomputed from scratch on every
//! submission attempt and advancement is blocked while it holds any entry.

use crate::constants::MAX_FREE_TEXT_CHARS;
use indexmap::IndexMap;
use serde::Serialize;

/// Field name to human-readable message, in the order the page's questions appear.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for `field`. Only the first message per field is kept.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Required-field check.
    pub fn require<T>(&mut self, field: &str, value: &Option<T>, message: &str) -> &mut Self {
        if value.is_none() {
            self.add(field, message);
        }
        self
    }

    /// Cross-field check: `value` is required only while `condition` holds.
    pub fn require_when<T>(
        &mut self,
        condition: bool,
        field: &str,
        value: &Option<T>,
        message: &str,
    ) -> &mut Self {
        if condition {
            self.require(field, value, message);
        }
        self
    }

    /// At least one option of a checkbox-style field must be chosen.
    pub fn require_any<T>(&mut self, field: &str, values: &[T], message: &str) -> &mut Self {
        if values.is_empty() {
            self.add(field, message);
        }
        self
    }

    /// Free-text answers are capped at [`MAX_FREE_TEXT_CHARS`] characters.
    pub fn limit_length<T: AsRef<str>>(&mut self, field: &str, value: &Option<T>) -> &mut Self {
        if let Some(text) = value {
            if text.as_ref().chars().count() > MAX_FREE_TEXT_CHARS {
                self.add(
                    field,
                    format!("Your answer must be {MAX_FREE_TEXT_CHARS} characters or fewer"),
                );
            }
        }
        self
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
