//! Suitability of the application and whether it arrived in good time.

use crate::document::AnswerDocument;
use crate::page::{body_value, Page, PageMetadata, PageType, YesOrNo};
use crate::response::{self, Response};
use crate::validation::ValidationErrors;
use forms_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_no(answer: Option<YesOrNo>) -> bool {
    answer == Some(YesOrNo::No)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuitabilityAssessmentBody {
    pub risk_factors: Option<YesOrNo>,
    pub risk_factors_comments: Option<NonEmptyText>,
    pub risk_management: Option<YesOrNo>,
    pub risk_management_comments: Option<NonEmptyText>,
}

#[derive(Clone, Debug)]
pub struct SuitabilityAssessment {
    body: SuitabilityAssessmentBody,
}

page_type!(
    SuitabilityAssessment,
    SuitabilityAssessmentBody,
    name: "suitability-assessment",
    display_name: "Suitability assessment",
    fields: [
        "riskFactors",
        "riskFactorsComments",
        "riskManagement",
        "riskManagementComments",
    ],
);

impl Page for SuitabilityAssessment {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Suitability assessment".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("application-timeliness")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "riskFactors",
                &self.body.risk_factors,
                "You must confirm if the risk factors can be managed in an approved premises",
            )
            .require_when(
                is_no(self.body.risk_factors),
                "riskFactorsComments",
                &self.body.risk_factors_comments,
                "You must explain why the risk factors cannot be managed",
            )
            .limit_length("riskFactorsComments", &self.body.risk_factors_comments)
            .require(
                "riskManagement",
                &self.body.risk_management,
                "You must confirm if the risk management plan is suitable",
            )
            .require_when(
                is_no(self.body.risk_management),
                "riskManagementComments",
                &self.body.risk_management_comments,
                "You must explain why the risk management plan is not suitable",
            )
            .limit_length("riskManagementComments", &self.body.risk_management_comments);
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                "Can the risk factors be managed in an approved premises?",
                response::yes_no(self.body.risk_factors),
            )
            .answer(
                "Risk factors comments",
                response::text(&self.body.risk_factors_comments),
            )
            .answer(
                "Is the risk management plan suitable?",
                response::yes_no(self.body.risk_management),
            )
            .answer(
                "Risk management comments",
                response::text(&self.body.risk_management_comments),
            )
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationTimelinessBody {
    pub agree_with_short_notice_reason: Option<YesOrNo>,
    pub agree_with_short_notice_reason_comments: Option<NonEmptyText>,
    pub reason_for_late_application: Option<NonEmptyText>,
}

#[derive(Clone, Debug)]
pub struct ApplicationTimeliness {
    body: ApplicationTimelinessBody,
}

page_type!(
    ApplicationTimeliness,
    ApplicationTimelinessBody,
    name: "application-timeliness",
    display_name: "Application timeliness",
    fields: [
        "agreeWithShortNoticeReason",
        "agreeWithShortNoticeReasonComments",
        "reasonForLateApplication",
    ],
);

impl Page for ApplicationTimeliness {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Do you agree with the reason given for the late application?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("suitability-assessment")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "agreeWithShortNoticeReason",
                &self.body.agree_with_short_notice_reason,
                "You must confirm if you agree with the reason for the late application",
            )
            .require_when(
                is_no(self.body.agree_with_short_notice_reason),
                "agreeWithShortNoticeReasonComments",
                &self.body.agree_with_short_notice_reason_comments,
                "You must explain why you do not agree with the reason",
            )
            .limit_length(
                "agreeWithShortNoticeReasonComments",
                &self.body.agree_with_short_notice_reason_comments,
            )
            .limit_length(
                "reasonForLateApplication",
                &self.body.reason_for_late_application,
            );
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                self.title(),
                response::yes_no(self.body.agree_with_short_notice_reason),
            )
            .answer(
                "Comments on the reason for the late application",
                response::text(&self.body.agree_with_short_notice_reason_comments),
            )
            .answer(
                "What reason was given for the late application?",
                response::text(&self.body.reason_for_late_application),
            )
    }
}
