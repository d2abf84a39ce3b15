//! One service per listing flow. Each pairs a detection predicate with the
//! shared extraction engine plus any flow-specific enrichment.

mod commercial;
mod land;
mod residential;

pub use commercial::{
    CommercialCoworkingFlowService, CommercialRentFlowService, CommercialSaleFlowService,
};
pub use land::LandSaleFlowService;
pub use residential::{
    PgHostelFlowService, ResidentialFlatmatesFlowService, ResidentialRentFlowService,
    ResidentialSaleFlowService,
};

use super::base::BaseFlowService;
use super::domain::{FlowContext, FlowType, FormState, NormalizedForm, StepData};
use super::steps::{self, StepDefinition, StepSection};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub trait FlowService: Send + Sync {
    fn flow_type(&self) -> FlowType;

    /// Pure predicate over the form and context; never mutates either.
    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool;

    /// Flow-specific adjustments applied after the shared extraction.
    fn enrich_steps(&self, _steps: &mut BTreeMap<String, StepData>) {}

    fn format_data_at(&self, form: &FormState, now: DateTime<Utc>) -> NormalizedForm {
        let mut document = BaseFlowService::new(self.flow_type()).assemble(form, now);
        self.enrich_steps(&mut document.steps);
        document
    }

    fn format_data(&self, form: &FormState) -> NormalizedForm {
        self.format_data_at(form, Utc::now())
    }

    fn step_sequence(&self) -> &'static [StepDefinition] {
        steps::sequence(self.flow_type())
    }
}

impl std::fmt::Debug for dyn FlowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowService")
            .field("flow_type", &self.flow_type())
            .finish()
    }
}

/// Mutable access to the step of `section` in a formatted steps map.
pub(crate) fn step_mut<'a>(
    flow: FlowType,
    steps: &'a mut BTreeMap<String, StepData>,
    section: StepSection,
) -> Option<&'a mut StepData> {
    let definition = steps::step_for_section(flow, section)?;
    steps.get_mut(definition.id)
}
