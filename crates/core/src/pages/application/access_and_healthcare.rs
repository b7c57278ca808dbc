//! Access, cultural and healthcare needs.

use crate::document::AnswerDocument;
use crate::page::{body_value, is_yes, one_or_many, Page, PageMetadata, PageType, YesOrNo};
use crate::response::{self, Response};
use crate::validation::ValidationErrors;
use forms_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdditionalNeed {
    Mobility,
    LearningDisability,
    NeurodivergentConditions,
    Hearing,
    Visual,
    Other,
    None,
}

impl AdditionalNeed {
    pub fn label(self) -> &'static str {
        match self {
            AdditionalNeed::Mobility => "Mobility needs",
            AdditionalNeed::LearningDisability => "Learning disability",
            AdditionalNeed::NeurodivergentConditions => "Neurodivergent conditions",
            AdditionalNeed::Hearing => "Hearing impairment",
            AdditionalNeed::Visual => "Visual impairment",
            AdditionalNeed::Other => "Other",
            AdditionalNeed::None => "None of the above",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CareActAssessment {
    Yes,
    No,
    IDontKnow,
}

impl CareActAssessment {
    pub fn label(self) -> &'static str {
        match self {
            CareActAssessment::Yes => "Yes",
            CareActAssessment::No => "No",
            CareActAssessment::IDontKnow => "I don't know",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessNeedsBody {
    #[serde(deserialize_with = "one_or_many")]
    pub additional_needs: Vec<AdditionalNeed>,
    pub religious_or_cultural_needs: Option<YesOrNo>,
    pub religious_or_cultural_needs_details: Option<NonEmptyText>,
    pub care_act_assessment_completed: Option<CareActAssessment>,
}

#[derive(Clone, Debug)]
pub struct AccessNeeds {
    body: AccessNeedsBody,
}

page_type!(
    AccessNeeds,
    AccessNeedsBody,
    name: "access-needs",
    display_name: "Access needs",
    fields: [
        "additionalNeeds",
        "religiousOrCulturalNeeds",
        "religiousOrCulturalNeedsDetails",
        "careActAssessmentCompleted",
    ],
);

impl Page for AccessNeeds {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Access, cultural and healthcare needs".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("covid")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require_any(
                "additionalNeeds",
                &self.body.additional_needs,
                "You must confirm whether the person has any additional needs",
            )
            .require(
                "religiousOrCulturalNeeds",
                &self.body.religious_or_cultural_needs,
                "You must confirm whether the person has any religious or cultural needs",
            )
            .require_when(
                is_yes(self.body.religious_or_cultural_needs),
                "religiousOrCulturalNeedsDetails",
                &self.body.religious_or_cultural_needs_details,
                "You must give details of the person's religious or cultural needs",
            )
            .limit_length(
                "religiousOrCulturalNeedsDetails",
                &self.body.religious_or_cultural_needs_details,
            )
            .require(
                "careActAssessmentCompleted",
                &self.body.care_act_assessment_completed,
                "You must confirm whether a Care Act assessment has been completed",
            );
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                "Does the person have any of the following needs?",
                response::list(&self.body.additional_needs, AdditionalNeed::label),
            )
            .answer(
                "Does the person have any religious or cultural needs?",
                response::yes_no(self.body.religious_or_cultural_needs),
            )
            .answer(
                "Details of religious or cultural needs",
                response::text(&self.body.religious_or_cultural_needs_details),
            )
            .answer(
                "Has a Care Act assessment been completed?",
                response::coded(
                    self.body.care_act_assessment_completed,
                    CareActAssessment::label,
                ),
            )
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CovidBody {
    pub fully_vaccinated: Option<YesOrNo>,
    pub high_risk: Option<YesOrNo>,
}

#[derive(Clone, Debug)]
pub struct Covid {
    body: CovidBody,
}

page_type!(
    Covid,
    CovidBody,
    name: "covid",
    display_name: "COVID information",
    fields: ["fullyVaccinated", "highRisk"],
);

impl Page for Covid {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Healthcare information".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("access-needs")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "fullyVaccinated",
                &self.body.fully_vaccinated,
                "You must confirm if the person has been fully vaccinated",
            )
            .require(
                "highRisk",
                &self.body.high_risk,
                "You must confirm if the person is at high risk from COVID-19",
            );
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                "Has the person been fully vaccinated for COVID-19?",
                response::yes_no(self.body.fully_vaccinated),
            )
            .answer(
                "Is the person at high risk from COVID-19?",
                response::yes_no(self.body.high_risk),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::FormType;
    use crate::pages::test_support::{assert_complete_response, build, empty_document};
    use serde_json::json;

    fn answered<P: PageType>(answers: Value) -> P {
        build::<P>(
            FormType::Application,
            "risk-and-need-factors",
            "access-and-healthcare",
            answers,
        )
    }

    #[test]
    fn cultural_needs_details_required_only_when_present() {
        let page: AccessNeeds = answered(json!({
            "additionalNeeds": "none",
            "religiousOrCulturalNeeds": "yes",
            "careActAssessmentCompleted": "no"
        }));
        assert_eq!(
            page.errors().fields().collect::<Vec<_>>(),
            ["religiousOrCulturalNeedsDetails"]
        );

        let page: AccessNeeds = answered(json!({
            "additionalNeeds": "none",
            "religiousOrCulturalNeeds": "no",
            "careActAssessmentCompleted": "iDontKnow"
        }));
        assert!(page.errors().is_empty());
        assert_complete_response(&page);
    }

    #[test]
    fn access_needs_flow_into_covid() {
        let doc = empty_document(FormType::Application);
        let page: AccessNeeds = answered(json!({}));
        assert_eq!(page.next(&doc), Some("covid"));
        assert_eq!(page.errors().len(), 3);

        let covid: Covid = answered(json!({"fullyVaccinated": "no", "highRisk": "yes"}));
        assert!(covid.errors().is_empty());
        assert_eq!(covid.next(&doc), None);
        assert_eq!(covid.previous(&doc), Some("access-needs"));
    }
}
