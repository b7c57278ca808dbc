use crate::document::AnswerDocument;
use crate::page::{body_value, Page, PageMetadata, PageType};
use crate::response::{self, Response};
use crate::validation::ValidationErrors;
use forms_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    Accept,
    RejectRisk,
    RejectInsufficientMoveOnPlan,
    RejectInsufficientInformation,
    OtherReasons,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Decision::Accept => "Accept the application",
            Decision::RejectRisk => "Reject, risk too high",
            Decision::RejectInsufficientMoveOnPlan => "Reject, insufficient move on plan",
            Decision::RejectInsufficientInformation => "Reject, insufficient information",
            Decision::OtherReasons => "Reject, other reasons",
        }
    }

    pub fn is_rejection(self) -> bool {
        !matches!(self, Decision::Accept)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MakeADecisionBody {
    pub decision: Option<Decision>,
    pub decision_rationale: Option<NonEmptyText>,
}

#[derive(Clone, Debug)]
pub struct MakeADecision {
    body: MakeADecisionBody,
}

page_type!(
    MakeADecision,
    MakeADecisionBody,
    name: "make-a-decision",
    display_name: "Decision",
    fields: ["decision", "decisionRationale"],
);

impl Page for MakeADecision {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Make a decision on this application".to_string()
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
        let rejected = self.body.decision.is_some_and(Decision::is_rejection);
        let mut errors = ValidationErrors::new();
        errors
            .require("decision", &self.body.decision, "You must select a decision")
            .require_when(
                rejected,
                "decisionRationale",
                &self.body.decision_rationale,
                "You must give a rationale for rejecting the application",
            )
            .limit_length("decisionRationale", &self.body.decision_rationale);
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer("Decision", response::coded(self.body.decision, Decision::label))
            .answer(
                "Rationale for the decision",
                response::text(&self.body.decision_rationale),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::FormType;
    use crate::pages::test_support::build;
    use serde_json::json;

    fn answered(answers: Value) -> MakeADecision {
        build(
            FormType::Assessment,
            "make-a-decision",
            "make-a-decision",
            answers,
        )
    }

    #[test]
    fn rejections_need_a_rationale() {
        for decision in [
            "rejectRisk",
            "rejectInsufficientMoveOnPlan",
            "rejectInsufficientInformation",
            "otherReasons",
        ] {
            let page = answered(json!({ "decision": decision }));
            assert_eq!(
                page.errors().fields().collect::<Vec<_>>(),
                ["decisionRationale"],
                "{decision}"
            );
        }
    }

    #[test]
    fn acceptance_needs_no_rationale() {
        let page = answered(json!({"decision": "accept"}));
        assert!(page.errors().is_empty());
        assert_eq!(page.response().get("Decision"), Some("Accept the application"));
    }
}
