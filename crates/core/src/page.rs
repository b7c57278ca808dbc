//! The page contract and the helpers page definitions share.
//!
//! A page is constructed fresh for every request from the raw answers it owns. It is never
//! persisted as an object; only [`Page::body`] ends up in the answer document.

use crate::document::AnswerDocument;
use crate::response::Response;
use crate::validation::ValidationErrors;
use crate::{FormError, FormResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Raw submitted field values, as handed over by the controller layer.
pub type FieldValues = Map<String, Value>;

/// The two questionnaires the engine knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    /// Request for a residential placement, completed by the referrer.
    Application,
    /// Review of a submitted application, completed by an assessor.
    Assessment,
}

impl FormType {
    pub const ALL: [FormType; 2] = [FormType::Application, FormType::Assessment];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Application => "application",
            FormType::Assessment => "assessment",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "application" => Ok(FormType::Application),
            "assessment" => Ok(FormType::Assessment),
            other => Err(FormError::InvalidInput(format!("unknown form type: {other}"))),
        }
    }
}

/// Identity of a page: form, section, task and page name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    pub form: FormType,
    pub section: String,
    pub task: String,
    pub page: String,
}

impl PageId {
    pub fn new(
        form: FormType,
        section: impl Into<String>,
        task: impl Into<String>,
        page: impl Into<String>,
    ) -> Self {
        Self {
            form,
            section: section.into(),
            task: task.into(),
            page: page.into(),
        }
    }

    /// Another page in the same task.
    pub fn sibling(&self, page: impl Into<String>) -> Self {
        Self {
            form: self.form,
            section: self.section.clone(),
            task: self.task.clone(),
            page: page.into(),
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.form, self.section, self.task, self.page)
    }
}

/// Declared metadata of a page type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMetadata {
    /// Page name, unique within its task.
    pub name: &'static str,
    /// Short name used in task lists and transcripts.
    pub display_name: &'static str,
    /// Answer fields the page owns, in question order.
    pub fields: &'static [&'static str],
}

/// Capability contract every page satisfies.
///
/// `next` and `previous` return `None` to mean "end of task" and "start of task" respectively.
/// Both must be total over every body that [`Page::errors`] accepts.
pub trait Page: fmt::Debug + Send + Sync {
    fn metadata(&self) -> PageMetadata;

    /// Question or heading shown at the top of the page.
    fn title(&self) -> String;

    /// The typed body as JSON, with absent answers omitted.
    fn body(&self) -> Value;

    fn next(&self, document: &AnswerDocument) -> Option<&'static str>;

    fn previous(&self, document: &AnswerDocument) -> Option<&'static str>;

    fn errors(&self) -> ValidationErrors;

    fn response(&self) -> Response;
}

/// A concrete page type that can be registered.
pub trait PageType: Page + Sized + 'static {
    const METADATA: PageMetadata;

    /// Builds the page from its raw answers.
    fn from_answers(id: &PageId, answers: &Value) -> FormResult<Self>;
}

/// Yes/no radio answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesOrNo {
    Yes,
    No,
}

impl YesOrNo {
    pub fn label(self) -> &'static str {
        match self {
            YesOrNo::Yes => "Yes",
            YesOrNo::No => "No",
        }
    }
}

/// True only for an explicit "yes"; an absent answer follows the "no" branch.
pub fn is_yes(answer: Option<YesOrNo>) -> bool {
    answer == Some(YesOrNo::Yes)
}

/// Coerces raw answers into a page's typed body.
///
/// - fields the page does not own are ignored,
/// - blank strings (and blank list entries) count as absent,
/// - a value that does not fit its field type is dropped so it surfaces as a validation error.
///
/// # Errors
///
/// Returns [`FormError::InvalidBody`] if `answers` is neither an object nor null, or if the body
/// still fails to deserialize once every offending field has been dropped.
pub fn coerce_body<B: DeserializeOwned>(
    id: &PageId,
    metadata: &PageMetadata,
    answers: &Value,
) -> FormResult<B> {
    let mut fields = owned_fields(id, metadata, answers)?;

    loop {
        let attempt = Value::Object(fields.clone());
        match serde_path_to_error::deserialize::<_, B>(attempt) {
            Ok(body) => return Ok(body),
            Err(err) => {
                let offending = err.path().iter().find_map(|segment| match segment {
                    serde_path_to_error::Segment::Map { key } => Some(key.clone()),
                    _ => None,
                });

                match offending.and_then(|key| fields.remove(&key).map(|value| (key, value))) {
                    Some((key, value)) => {
                        tracing::debug!(page = %id, field = %key, %value, "dropping unparseable answer");
                    }
                    None => {
                        return Err(FormError::InvalidBody {
                            page: id.clone(),
                            message: err.into_inner().to_string(),
                        })
                    }
                }
            }
        }
    }
}

fn owned_fields(id: &PageId, metadata: &PageMetadata, answers: &Value) -> FormResult<FieldValues> {
    let raw = match answers {
        Value::Null => return Ok(FieldValues::new()),
        Value::Object(map) => map,
        other => {
            return Err(FormError::InvalidBody {
                page: id.clone(),
                message: format!("expected an object of answers, got {other}"),
            })
        }
    };

    let mut fields = FieldValues::new();
    for (key, value) in raw {
        if !metadata.fields.contains(&key.as_str()) {
            tracing::debug!(page = %id, field = %key, "ignoring field not owned by page");
            continue;
        }
        if let Some(value) = without_blanks(value.clone()) {
            fields.insert(key.clone(), value);
        }
    }
    Ok(fields)
}

fn without_blanks(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(without_blanks).collect();
            if items.is_empty() {
                None
            } else {
                Some(Value::Array(items))
            }
        }
        other => Some(other),
    }
}

/// Serialises a typed body, omitting absent (`null`) answers.
pub fn body_value<B: Serialize>(body: &B) -> Value {
    match serde_json::to_value(body) {
        Ok(Value::Object(map)) => Value::Object(
            map.into_iter()
                .filter(|(_, value)| !value.is_null())
                .collect(),
        ),
        Ok(_) | Err(_) => Value::Object(FieldValues::new()),
    }
}

/// Accepts either a single value or a list for checkbox-style fields.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static METADATA: PageMetadata = PageMetadata {
        name: "sample",
        display_name: "Sample",
        fields: &["answer", "details", "choices"],
    };

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(default, rename_all = "camelCase")]
    struct SampleBody {
        answer: Option<YesOrNo>,
        details: Option<String>,
        #[serde(deserialize_with = "one_or_many")]
        choices: Vec<YesOrNo>,
    }

    fn id() -> PageId {
        PageId::new(FormType::Application, "section", "task", "sample")
    }

    #[test]
    fn coerce_ignores_fields_the_page_does_not_own() {
        let body: SampleBody =
            coerce_body(&id(), &METADATA, &json!({"answer": "yes", "csrf": "abc"})).expect("body");
        assert_eq!(body.answer, Some(YesOrNo::Yes));
    }

    #[test]
    fn coerce_treats_blank_strings_as_absent() {
        let body: SampleBody =
            coerce_body(&id(), &METADATA, &json!({"answer": "", "details": "  "})).expect("body");
        assert_eq!(body, SampleBody::default());
    }

    #[test]
    fn coerce_drops_values_of_the_wrong_shape() {
        let body: SampleBody = coerce_body(
            &id(),
            &METADATA,
            &json!({"answer": "maybe", "details": "kept"}),
        )
        .expect("body");
        assert_eq!(body.answer, None);
        assert_eq!(body.details.as_deref(), Some("kept"));
    }

    #[test]
    fn coerce_accepts_single_value_for_list_fields() {
        let body: SampleBody =
            coerce_body(&id(), &METADATA, &json!({"choices": "no"})).expect("body");
        assert_eq!(body.choices, vec![YesOrNo::No]);
    }

    #[test]
    fn coerce_rejects_non_object_answers() {
        let err = coerce_body::<SampleBody>(&id(), &METADATA, &json!(["yes"]))
            .expect_err("arrays are not answer bodies");
        assert!(matches!(err, FormError::InvalidBody { .. }));
    }

    #[test]
    fn body_value_omits_absent_answers() {
        let body = SampleBody {
            answer: Some(YesOrNo::No),
            ..SampleBody::default()
        };
        assert_eq!(body_value(&body), json!({"answer": "no", "choices": []}));
    }

    #[test]
    fn form_type_parses_case_insensitively() {
        assert_eq!("Application".parse::<FormType>().expect("parse"), FormType::Application);
        assert_eq!("assessment".parse::<FormType>().expect("parse"), FormType::Assessment);
        assert!("appeal".parse::<FormType>().is_err());
    }
}
