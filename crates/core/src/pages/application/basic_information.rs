//! Basic information: eligibility, sentence and release details, and placement dates.
//!
//! The route through this task forks twice. Low and medium risk cases go straight to the
//! not-eligible page. High and very high risk cases continue only once an exception has been
//! agreed, and otherwise also end at not-eligible. Community and bail cases skip release details
//! and describe their situation instead.

use super::BASIC_INFORMATION_TASK;
use crate::document::AnswerDocument;
use crate::page::{body_value, is_yes, one_or_many, Page, PageMetadata, PageType, YesOrNo};
use crate::response::{self, Response};
use crate::validation::ValidationErrors;
use chrono::NaiveDate;
use forms_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TASK: &str = BASIC_INFORMATION_TASK.name;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskOfSeriousHarm {
    Low,
    Medium,
    HighRisk,
    VeryHighRisk,
}

impl RiskOfSeriousHarm {
    pub fn label(self) -> &'static str {
        match self {
            RiskOfSeriousHarm::Low => "Low",
            RiskOfSeriousHarm::Medium => "Medium",
            RiskOfSeriousHarm::HighRisk => "High",
            RiskOfSeriousHarm::VeryHighRisk => "Very high",
        }
    }

    /// High and very high risk cases may go on to ask for an exception; lower levels may not.
    pub fn is_eligible(self) -> bool {
        matches!(self, RiskOfSeriousHarm::HighRisk | RiskOfSeriousHarm::VeryHighRisk)
    }
}

/// Reads the stored risk level, if any.
fn stored_risk_level(document: &AnswerDocument) -> Option<RiskOfSeriousHarm> {
    document
        .answer(TASK, RiskLevel::METADATA.name, "riskLevel")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn stored_yes(document: &AnswerDocument, page: &str, field: &str) -> bool {
    document.answer_str(TASK, page, field) == Some("yes")
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskLevelBody {
    pub risk_level: Option<RiskOfSeriousHarm>,
}

#[derive(Clone, Debug)]
pub struct RiskLevel {
    body: RiskLevelBody,
}

page_type!(
    RiskLevel,
    RiskLevelBody,
    name: "risk-level",
    display_name: "Risk of serious harm level",
    fields: ["riskLevel"],
);

impl Page for RiskLevel {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "What is the person's current risk of serious harm level?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        match self.body.risk_level {
            Some(level) if level.is_eligible() => Some("is-exceptional-case"),
            _ => Some("not-eligible"),
        }
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require(
            "riskLevel",
            &self.body.risk_level,
            "You must choose a risk level",
        );
        errors
    }

    fn response(&self) -> Response {
        Response::new().answer(
            self.title(),
            response::coded(self.body.risk_level, RiskOfSeriousHarm::label),
        )
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IsExceptionalCaseBody {
    pub is_exceptional_case: Option<YesOrNo>,
}

#[derive(Clone, Debug)]
pub struct IsExceptionalCase {
    body: IsExceptionalCaseBody,
}

page_type!(
    IsExceptionalCase,
    IsExceptionalCaseBody,
    name: "is-exceptional-case",
    display_name: "Exceptional case",
    fields: ["isExceptionalCase"],
);

impl Page for IsExceptionalCase {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Is this an exceptional case?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        if is_yes(self.body.is_exceptional_case) {
            Some("exception-details")
        } else {
            Some("not-eligible")
        }
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("risk-level")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require(
            "isExceptionalCase",
            &self.body.is_exceptional_case,
            "You must state if this is an exceptional case",
        );
        errors
    }

    fn response(&self) -> Response {
        Response::new().answer(self.title(), response::yes_no(self.body.is_exceptional_case))
    }
}

/// Information page shown when the case cannot proceed. It owns no answers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NotEligibleBody {}

#[derive(Clone, Debug)]
pub struct NotEligible {
    body: NotEligibleBody,
}

page_type!(
    NotEligible,
    NotEligibleBody,
    name: "not-eligible",
    display_name: "Not eligible",
    fields: [],
);

impl Page for NotEligible {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "This application is not eligible".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn previous(&self, document: &AnswerDocument) -> Option<&'static str> {
        // Ineligible low risk cases arrive straight from the risk level page.
        if stored_risk_level(document).is_some_and(RiskOfSeriousHarm::is_eligible) {
            Some("is-exceptional-case")
        } else {
            Some("risk-level")
        }
    }

    fn errors(&self) -> ValidationErrors {
        ValidationErrors::new()
    }

    fn response(&self) -> Response {
        Response::new()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExceptionDetailsBody {
    pub manager_name: Option<NonEmptyText>,
    pub agreement_date: Option<NaiveDate>,
    pub agreement_summary: Option<NonEmptyText>,
}

#[derive(Clone, Debug)]
pub struct ExceptionDetails {
    body: ExceptionDetailsBody,
}

page_type!(
    ExceptionDetails,
    ExceptionDetailsBody,
    name: "exception-details",
    display_name: "Exception details",
    fields: ["managerName", "agreementDate", "agreementSummary"],
);

impl Page for ExceptionDetails {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Provide details of the agreement to make an exception".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("sentence-type")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("is-exceptional-case")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "managerName",
                &self.body.manager_name,
                "You must enter the name of the senior manager who agreed the exception",
            )
            .require(
                "agreementDate",
                &self.body.agreement_date,
                "You must enter the date the exception was agreed",
            )
            .require(
                "agreementSummary",
                &self.body.agreement_summary,
                "You must summarise why the exception was agreed",
            )
            .limit_length("agreementSummary", &self.body.agreement_summary);
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                "Name of senior manager",
                response::text(&self.body.manager_name),
            )
            .answer(
                "Date of agreement",
                response::date(self.body.agreement_date),
            )
            .answer(
                "Summary of agreement",
                response::text(&self.body.agreement_summary),
            )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sentence {
    StandardDeterminate,
    Life,
    Ipp,
    ExtendedDeterminate,
    CommunityOrder,
    BailPlacement,
    NonStatutory,
}

impl Sentence {
    pub fn label(self) -> &'static str {
        match self {
            Sentence::StandardDeterminate => "Standard determinate custody",
            Sentence::Life => "Life sentence",
            Sentence::Ipp => "Indeterminate Public Protection (IPP)",
            Sentence::ExtendedDeterminate => "Extended determinate sentence",
            Sentence::CommunityOrder => "Community Order (CO) / Suspended Sentence Order (SSO)",
            Sentence::BailPlacement => "Bail placement",
            Sentence::NonStatutory => "Non-statutory, MAPPA case",
        }
    }

    /// Community and bail cases are not released from custody.
    pub fn is_community_based(self) -> bool {
        matches!(self, Sentence::CommunityOrder | Sentence::BailPlacement)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SentenceTypeBody {
    pub sentence_type: Option<Sentence>,
}

#[derive(Clone, Debug)]
pub struct SentenceType {
    body: SentenceTypeBody,
}

page_type!(
    SentenceType,
    SentenceTypeBody,
    name: "sentence-type",
    display_name: "Sentence type",
    fields: ["sentenceType"],
);

impl Page for SentenceType {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Which of the following best describes the sentence type the person is on?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        match self.body.sentence_type {
            Some(sentence) if sentence.is_community_based() => Some("situation"),
            _ => Some("release-type"),
        }
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("exception-details")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require(
            "sentenceType",
            &self.body.sentence_type,
            "You must choose a sentence type",
        );
        errors
    }

    fn response(&self) -> Response {
        Response::new().answer(
            self.title(),
            response::coded(self.body.sentence_type, Sentence::label),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Release {
    Licence,
    Rotl,
    Hdc,
    Pss,
}

impl Release {
    pub fn label(self) -> &'static str {
        match self {
            Release::Licence => "Licence",
            Release::Rotl => "Release on Temporary Licence (ROTL)",
            Release::Hdc => "Home detention curfew (HDC)",
            Release::Pss => "Post Sentence Supervision (PSS)",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseTypeBody {
    pub release_type: Option<Release>,
}

#[derive(Clone, Debug)]
pub struct ReleaseType {
    body: ReleaseTypeBody,
}

page_type!(
    ReleaseType,
    ReleaseTypeBody,
    name: "release-type",
    display_name: "Release type",
    fields: ["releaseType"],
);

impl Page for ReleaseType {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "What type of release will the application support?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("release-date")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("sentence-type")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require(
            "releaseType",
            &self.body.release_type,
            "You must choose a release type",
        );
        errors
    }

    fn response(&self) -> Response {
        Response::new().answer(
            self.title(),
            response::coded(self.body.release_type, Release::label),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseSituation {
    RiskManagement,
    ResidencyManagement,
    BailAssessment,
    BailSentence,
}

impl CaseSituation {
    pub fn label(self) -> &'static str {
        match self {
            CaseSituation::RiskManagement => "Application for risk management or public protection",
            CaseSituation::ResidencyManagement => "Application for residency management",
            CaseSituation::BailAssessment => "Bail assessment for residency requirement",
            CaseSituation::BailSentence => "Bail placement",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SituationBody {
    pub situation: Option<CaseSituation>,
}

#[derive(Clone, Debug)]
pub struct Situation {
    body: SituationBody,
}

page_type!(
    Situation,
    SituationBody,
    name: "situation",
    display_name: "Situation",
    fields: ["situation"],
);

impl Page for Situation {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Which of the following options best describes the situation?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("placement-date")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("sentence-type")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require(
            "situation",
            &self.body.situation,
            "You must choose a situation",
        );
        errors
    }

    fn response(&self) -> Response {
        Response::new().answer(
            self.title(),
            response::coded(self.body.situation, CaseSituation::label),
        )
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseDateBody {
    pub know_release_date: Option<YesOrNo>,
    pub release_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct ReleaseDate {
    body: ReleaseDateBody,
}

page_type!(
    ReleaseDate,
    ReleaseDateBody,
    name: "release-date",
    display_name: "Release date",
    fields: ["knowReleaseDate", "releaseDate"],
);

impl Page for ReleaseDate {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Do you know the person's release date?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        if is_yes(self.body.know_release_date) {
            Some("placement-date")
        } else {
            Some("oral-hearing")
        }
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("release-type")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "knowReleaseDate",
                &self.body.know_release_date,
                "You must specify if you know the release date",
            )
            .require_when(
                is_yes(self.body.know_release_date),
                "releaseDate",
                &self.body.release_date,
                "You must enter a valid release date",
            );
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(self.title(), response::yes_no(self.body.know_release_date))
            .answer("Release date", response::date(self.body.release_date))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OralHearingBody {
    pub know_oral_hearing_date: Option<YesOrNo>,
    pub oral_hearing_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct OralHearing {
    body: OralHearingBody,
}

page_type!(
    OralHearing,
    OralHearingBody,
    name: "oral-hearing",
    display_name: "Oral hearing",
    fields: ["knowOralHearingDate", "oralHearingDate"],
);

impl Page for OralHearing {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Do you know the person's oral hearing date?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("placement-date")
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("release-date")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "knowOralHearingDate",
                &self.body.know_oral_hearing_date,
                "You must specify if you know when the oral hearing will be",
            )
            .require_when(
                is_yes(self.body.know_oral_hearing_date),
                "oralHearingDate",
                &self.body.oral_hearing_date,
                "You must enter the oral hearing date",
            );
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(self.title(), response::yes_no(self.body.know_oral_hearing_date))
            .answer("Oral hearing date", response::date(self.body.oral_hearing_date))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementDateBody {
    pub start_date_same_as_release_date: Option<YesOrNo>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct PlacementDate {
    body: PlacementDateBody,
}

page_type!(
    PlacementDate,
    PlacementDateBody,
    name: "placement-date",
    display_name: "Placement date",
    fields: ["startDateSameAsReleaseDate", "startDate"],
);

impl Page for PlacementDate {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "Is the placement start date the same as the release date?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("placement-purpose")
    }

    fn previous(&self, document: &AnswerDocument) -> Option<&'static str> {
        let community_based = document
            .answer(TASK, SentenceType::METADATA.name, "sentenceType")
            .and_then(|v| serde_json::from_value::<Sentence>(v.clone()).ok())
            .is_some_and(Sentence::is_community_based);

        if community_based {
            Some("situation")
        } else if stored_yes(document, ReleaseDate::METADATA.name, "knowReleaseDate") {
            Some("release-date")
        } else {
            Some("oral-hearing")
        }
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require(
                "startDateSameAsReleaseDate",
                &self.body.start_date_same_as_release_date,
                "You must specify if the start date is the same as the release date",
            )
            .require_when(
                self.body.start_date_same_as_release_date == Some(YesOrNo::No),
                "startDate",
                &self.body.start_date,
                "You must enter a start date",
            );
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                self.title(),
                response::yes_no(self.body.start_date_same_as_release_date),
            )
            .answer("Placement start date", response::date(self.body.start_date))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Purpose {
    PublicProtection,
    PreventContact,
    HelpIndividual,
    ReadjustCommunity,
    PreventSelfHarm,
    Drugs,
    Other,
}

impl Purpose {
    pub fn label(self) -> &'static str {
        match self {
            Purpose::PublicProtection => "Public protection",
            Purpose::PreventContact => "Prevent contact",
            Purpose::HelpIndividual => "Help individual",
            Purpose::ReadjustCommunity => "Aid readjustment to life in the community",
            Purpose::PreventSelfHarm => "Prevent self harm or suicide",
            Purpose::Drugs => "Remain drug or alcohol free",
            Purpose::Other => "Other",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementPurposeBody {
    #[serde(deserialize_with = "one_or_many")]
    pub placement_purposes: Vec<Purpose>,
    pub other_reason: Option<NonEmptyText>,
}

#[derive(Clone, Debug)]
pub struct PlacementPurpose {
    body: PlacementPurposeBody,
}

page_type!(
    PlacementPurpose,
    PlacementPurposeBody,
    name: "placement-purpose",
    display_name: "Placement purpose",
    fields: ["placementPurposes", "otherReason"],
);

impl Page for PlacementPurpose {
    fn metadata(&self) -> PageMetadata {
        Self::METADATA
    }

    fn title(&self) -> String {
        "What is the purpose of the placement?".to_string()
    }

    fn body(&self) -> Value {
        body_value(&self.body)
    }

    fn next(&self, _: &AnswerDocument) -> Option<&'static str> {
        None
    }

    fn previous(&self, _: &AnswerDocument) -> Option<&'static str> {
        Some("placement-date")
    }

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require_any(
                "placementPurposes",
                &self.body.placement_purposes,
                "You must choose at least one purpose of the placement",
            )
            .require_when(
                self.body.placement_purposes.contains(&Purpose::Other),
                "otherReason",
                &self.body.other_reason,
                "You must explain the other purpose of the placement",
            )
            .limit_length("otherReason", &self.body.other_reason);
        errors
    }

    fn response(&self) -> Response {
        Response::new()
            .answer(
                self.title(),
                response::list(&self.body.placement_purposes, Purpose::label),
            )
            .answer("Other purpose", response::text(&self.body.other_reason))
    }
}
