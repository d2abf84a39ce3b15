//! Listing flow classification and normalization.
//!
//! Raw wizard state is classified into one of eight flows by
//! [`FlowServiceFactory`], then the matching [`FlowService`] folds scattered
//! fields into a step-keyed [`NormalizedForm`].

pub mod audit;
pub mod base;
pub(crate) mod detect;
pub mod domain;
pub mod error;
pub mod factory;
pub mod fields;
pub mod services;
pub mod steps;

#[cfg(test)]
mod tests;

pub use audit::{AuditEntry, AuditError, AuditOutcome, AuditReport, ClassificationAuditor};
pub use base::BaseFlowService;
pub use domain::{
    is_present, FlowContext, FlowDescriptor, FlowType, FormState, ListingMedia, ListingMeta,
    ListingStatus, ListingType, NormalizedForm, PropertyCategory, StepData,
};
pub use error::FlowError;
pub use factory::FlowServiceFactory;
pub use services::FlowService;
pub use steps::{StepDefinition, StepSection};
