//! Risk management features and offending history.

use super::RISK_MANAGEMENT_FEATURES_TASK;
use crate::document::AnswerDocument;
use crate::page::{body_value, is_yes, one_or_many, Page, PageMetadata, PageType, YesOrNo};
use crate::response::{self, Response};
use crate::validation::ValidationErrors;
use chrono::NaiveDate;
use forms_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TASK: &str = RISK_MANAGEMENT_FEATURES_TASK.name;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskManagementFeaturesBody {
    pub manage_risk_details: Option<NonEmptyText>,
    pub additional_features_details: Option<NonEmptyText>,
}

#[derive(Clone, Debug)]
pub struct RiskManagementFeatures {
    body: RiskManagementFeaturesBody,
}

page_type!(
    RiskManagementFeatures,
    RiskManagementFeaturesBody,
    name: "risk-management-features",
    display_name: "Risk management features",
    fields: ["manageRiskDetails", "additionalFeaturesDetails"],
);

impl Page for RiskManagementFeatures {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "What features of the placement will help manage risk?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("convicted-offences")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "manageRiskDetails",
                &self.body.manage_risk_details,
                "You must describe the features that will help manage the person's risk",
            )
            .limit_length("manageRiskDetails", &self.body.manage_risk_details)
            .limit_length(
                "additionalFeaturesDetails",
                &self.body.additional_features_details,
            );
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                "Describe how the placement will help manage risk",
                response::text(&self.body.manage_risk_details),
            )
            .answer(
                "Provide details of any additional measures that will be needed",
                response::text(&self.body.additional_features_details),
            )
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConvictedOffencesBody {
    pub response: Option<YesOrNo>,
}

#[derive(Clone, Debug)]
pub struct ConvictedOffences {
    body: ConvictedOffencesBody,
}

page_type!(
    ConvictedOffences,
    ConvictedOffencesBody,
    name: "convicted-offences",
    display_name: "Convicted offences",
    fields: ["response"],
);

impl Page for ConvictedOffences {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Has the person ever been convicted of arson, sexual, hate or violent offences?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        if is_yes(self.body.response) {
            Some("type-of-convicted-offence")
        } else {
            Some("rehabilitative-interventions")
        }
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("risk-management-features")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require(
            "response",
            &self.body.response,
            "You must specify if the person has been convicted of any of these offences",
        );
        errors
    }

    fn response(&self) -> Response {
        Response::new().answer(self.title(), response::yes_no(self.body.response))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Offence {
    Arson,
    SexualOffence,
    HateCrimes,
    ViolentOffence,
    ChildNonSexualOffence,
}

impl Offence {
    pub fn label(self) -> &'static str {
        match self {
            Offence::Arson => "Arson offence",
            Offence::SexualOffence => "Sexual offence",
            Offence::HateCrimes => "Hate crimes",
            Offence::ViolentOffence => "Violent offence",
            Offence::ChildNonSexualOffence => "Non-sexual offences against children",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeOfConvictedOffenceBody {
    #[serde(deserialize_with = "one_or_many")]
    pub offence_convictions: Vec<Offence>,
}

#[derive(Clone, Debug)]
pub struct TypeOfConvictedOffence {
    body: TypeOfConvictedOffenceBody,
}

page_type!(
    TypeOfConvictedOffence,
    TypeOfConvictedOffenceBody,
    name: "type-of-convicted-offence",
    display_name: "Type of convicted offence",
    fields: ["offenceConvictions"],
);

impl Page for TypeOfConvictedOffence {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "What type of offence has the person been convicted of?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("date-of-offence")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("convicted-offences")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require_any(
            "offenceConvictions",
            &self.body.offence_convictions,
            "You must choose at least one type of offence",
        );
        errors
    }

    fn response(&self) -> Response {
        Response::new().answer(
            self.title(),
            response::list(&self.body.offence_convictions, Offence::label),
        )
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateOfOffenceBody {
    pub most_recent_offence_date: Option<NaiveDate>,
    pub is_current_offence: Option<YesOrNo>,
}

#[derive(Clone, Debug)]
pub struct DateOfOffence {
    body: DateOfOffenceBody,
}

page_type!(
    DateOfOffence,
    DateOfOffenceBody,
    name: "date-of-offence",
    display_name: "Date of offence",
    fields: ["mostRecentOffenceDate", "isCurrentOffence"],
);

impl Page for DateOfOffence {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "When was the most recent of these offences?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("rehabilitative-interventions")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("type-of-convicted-offence")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "mostRecentOffenceDate",
                &self.body.most_recent_offence_date,
                "You must enter the date of the most recent offence",
            )
            .require(
                "isCurrentOffence",
                &self.body.is_current_offence,
                "You must specify if this is a current offence",
            );
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                "Date of most recent offence",
                response::date(self.body.most_recent_offence_date),
            )
            .answer(
                "Is this a current offence?",
                response::yes_no(self.body.is_current_offence),
            )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Intervention {
    AccommodationSupport,
    DrugsAndAlcohol,
    ChildrenAndFamilies,
    Health,
    EducationTrainingAndEmployment,
    FinanceBenefitsAndDebt,
    AttitudesThinkingAndBehaviour,
    AbuseSurvivors,
    Other,
    None,
}

impl Intervention {
    pub fn label(self) -> &'static str {
        match self {
            Intervention::AccommodationSupport => "Accommodation",
            Intervention::DrugsAndAlcohol => "Drugs and alcohol",
            Intervention::ChildrenAndFamilies => "Children and families",
            Intervention::Health => "Health",
            Intervention::EducationTrainingAndEmployment => "Education, training and employment",
            Intervention::FinanceBenefitsAndDebt => "Finance, benefits and debt",
            Intervention::AttitudesThinkingAndBehaviour => "Attitudes, thinking and behaviour",
            Intervention::AbuseSurvivors => "Support for survivors of abuse",
            Intervention::Other => "Other",
            Intervention::None => "None",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RehabilitativeInterventionsBody {
    #[serde(deserialize_with = "one_or_many")]
    pub rehabilitative_interventions: Vec<Intervention>,
    pub other_intervention: Option<NonEmptyText>,
}

#[derive(Clone, Debug)]
pub struct RehabilitativeInterventions {
    body: RehabilitativeInterventionsBody,
}

page_type!(
    RehabilitativeInterventions,
    RehabilitativeInterventionsBody,
    name: "rehabilitative-interventions",
    display_name: "Rehabilitative interventions",
    fields: ["rehabilitativeInterventions", "otherIntervention"],
);

impl Page for RehabilitativeInterventions {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Which rehabilitative interventions will support the person's placement?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn previous(&self, document: &AnswerDocument) -> Option<&'static str> {
        if document.answer_str(TASK, ConvictedOffences::METADATA.name, "response") == Some("yes") {
            Some("date-of-offence")
        } else {
            Some("convicted-offences")
        }
    }

    fn errors(&self) -> ValidationErrors {
        let chosen = &self.body.rehabilitative_interventions;
        let mut errors = ValidationErrors::new();
        errors
            .require_any(
                "rehabilitativeInterventions",
                chosen,
                "You must choose at least one intervention, or 'None'",
            )
            .require_when(
                chosen.contains(&Intervention::Other),
                "otherIntervention",
                &self.body.other_intervention,
                "You must specify the other intervention",
            )
            .limit_length("otherIntervention", &self.body.other_intervention);

        if chosen.len() > 1 && chosen.contains(&Intervention::None) {
            errors.add(
                "rehabilitativeInterventions",
                "You cannot choose 'None' together with other interventions",
            );
        }
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                self.title(),
                response::list(&self.body.rehabilitative_interventions, Intervention::label),
            )
            .answer(
                "Other intervention",
                response::text(&self.body.other_intervention),
            )
    }
}
