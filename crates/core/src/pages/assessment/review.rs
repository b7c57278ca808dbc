use crate::document::AnswerDocument;
use crate::page::{body_value, Page, PageMetadata, PageType, YesOrNo};
use crate::response::{self, Response};
use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewBody {
    pub reviewed: Option<YesOrNo>,
}

/// Confirmation that the assessor has read the application before assessing it.
#[derive(Clone, Debug)]
pub struct Review {
    body: ReviewBody,
}

page_type!(
    Review,
    ReviewBody,
    name: "review",
    display_name: "Review application",
    fields: ["reviewed"],
);

impl Page for Review {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Have you reviewed all of the information provided in the application?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require(
            "reviewed",
            &self.body.reviewed,
            "You must confirm the information in the application has been reviewed",
        );
        errors
    }

    fn response(&self) -> Response {
        Response::new().answer(self.title(), response::yes_no(self.body.reviewed))
    }
}
