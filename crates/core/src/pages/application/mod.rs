//! The placement application form, completed by the referrer.

pub mod access_and_healthcare;
pub mod basic_information;
pub mod risk_management;

use crate::page::FormType;
use crate::registry::{PageRegistry, SectionMeta, TaskMeta};
use crate::FormResult;

pub const BASIC_INFORMATION: SectionMeta = SectionMeta {
    name: "basic-information",
    title: "Reasons for placement",
};

pub const RISK_AND_NEED_FACTORS: SectionMeta = SectionMeta {
    name: "risk-and-need-factors",
    title: "Risk and need factors",
};

pub const BASIC_INFORMATION_TASK: TaskMeta = TaskMeta {
    name: "basic-information",
    title: "Basic information",
};

pub const RISK_MANAGEMENT_FEATURES_TASK: TaskMeta = TaskMeta {
    name: "risk-management-features",
    title: "Add detail about managing risks and needs",
};

pub const ACCESS_AND_HEALTHCARE_TASK: TaskMeta = TaskMeta {
    name: "access-and-healthcare",
    title: "Add access, cultural and healthcare needs",
};

/// Registers every application page. Order here is the order of the task list.
pub fn register(registry: &mut PageRegistry) -> FormResult<()> {
    use access_and_healthcare::*;
    use basic_information::*;
    use risk_management::*;

    let form = FormType::Application;

    let section = BASIC_INFORMATION;
    let task = BASIC_INFORMATION_TASK;
    registry.register_page::<RiskLevel>(form, section, task)?;
    registry.register_page::<IsExceptionalCase>(form, section, task)?;
    registry.register_page::<NotEligible>(form, section, task)?;
    registry.register_page::<ExceptionDetails>(form, section, task)?;
    registry.register_page::<SentenceType>(form, section, task)?;
    registry.register_page::<ReleaseType>(form, section, task)?;
    registry.register_page::<Situation>(form, section, task)?;
    registry.register_page::<ReleaseDate>(form, section, task)?;
    registry.register_page::<OralHearing>(form, section, task)?;
    registry.register_page::<PlacementDate>(form, section, task)?;
    registry.register_page::<PlacementPurpose>(form, section, task)?;

    let section = RISK_AND_NEED_FACTORS;
    let task = RISK_MANAGEMENT_FEATURES_TASK;
    registry.register_page::<RiskManagementFeatures>(form, section, task)?;
    registry.register_page::<ConvictedOffences>(form, section, task)?;
    registry.register_page::<TypeOfConvictedOffence>(form, section, task)?;
    registry.register_page::<DateOfOffence>(form, section, task)?;
    registry.register_page::<RehabilitativeInterventions>(form, section, task)?;

    let task = ACCESS_AND_HEALTHCARE_TASK;
    registry.register_page::<AccessNeeds>(form, section, task)?;
    registry.register_page::<Covid>(form, section, task)?;

    Ok(())
}
