//! The assessment form, completed by an assessor reviewing a submitted application.

pub mod decision;
pub mod review;
pub mod suitability;

use crate::page::FormType;
use crate::registry::{PageRegistry, SectionMeta, TaskMeta};
use crate::FormResult;

pub const REVIEW_APPLICATION: SectionMeta = SectionMeta {
    name: "review-application",
    title: "Review application",
};

pub const ASSESS_APPLICATION: SectionMeta = SectionMeta {
    name: "assess-application",
    title: "Assess application",
};

pub const MAKE_A_DECISION: SectionMeta = SectionMeta {
    name: "make-a-decision",
    title: "Make a decision",
};

pub const REVIEW_APPLICATION_TASK: TaskMeta = TaskMeta {
    name: "review-application",
    title: "Review application and documents",
};

pub const SUITABILITY_ASSESSMENT_TASK: TaskMeta = TaskMeta {
    name: "suitability-assessment",
    title: "Assess suitability of application",
};

pub const MAKE_A_DECISION_TASK: TaskMeta = TaskMeta {
    name: "make-a-decision",
    title: "Make a decision",
};

/// Registers every assessment page.
pub fn register(registry: &mut PageRegistry) -> FormResult<()> {
    let form = FormType::Assessment;

    registry.register_page::<review::Review>(form, REVIEW_APPLICATION, REVIEW_APPLICATION_TASK)?;

    registry.register_page::<suitability::SuitabilityAssessment>(
        form,
        ASSESS_APPLICATION,
        SUITABILITY_ASSESSMENT_TASK,
    )?;
    registry.register_page::<suitability::ApplicationTimeliness>(
        form,
        ASSESS_APPLICATION,
        SUITABILITY_ASSESSMENT_TASK,
    )?;

    registry.register_page::<decision::MakeADecision>(form, MAKE_A_DECISION, MAKE_A_DECISION_TASK)?;

    Ok(())
}
