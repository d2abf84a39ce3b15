use super::{step_mut, FlowService};
use crate::flows::detect::{self, contains_any, DetectionRules, UrlSignals};
use crate::flows::domain::{is_present, FlowContext, FlowType, FormState, StepData};
use crate::flows::steps::StepSection;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Tenant preference applied when a commercial rental names none.
pub const DEFAULT_COMMERCIAL_TENANTS: [&str; 2] = ["Company", "Startup"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CommercialCoworkingFlowService;

impl CommercialCoworkingFlowService {
    const RULES: DetectionRules = DetectionRules {
        url: |url: &UrlSignals| url.contains_any(&["coworking", "co-working", "co_working"]),
        context: detect::never,
        ad_type: |ad_type: &str| contains_any(ad_type, &["coworking", "co-working", "cowork"]),
    };
}

impl FlowService for CommercialCoworkingFlowService {
    fn flow_type(&self) -> FlowType {
        FlowType::CommercialCoworking
    }

    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool {
        detect::detect(self.flow_type(), &Self::RULES, form, context)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommercialSaleFlowService;

impl CommercialSaleFlowService {
    const RULES: DetectionRules = DetectionRules {
        url: |url: &UrlSignals| {
            url.has_segment(&["commercial"]) && url.has_segment(&["sale", "sell"])
        },
        context: |context: &FlowContext| {
            context.sale_mode() && UrlSignals::parse(&context.url_path).has_segment(&["commercial"])
        },
        ad_type: |ad_type: &str| {
            ad_type.contains("commercial") && contains_any(ad_type, &["sale", "sell"])
        },
    };
}

impl FlowService for CommercialSaleFlowService {
    fn flow_type(&self) -> FlowType {
        FlowType::CommercialSale
    }

    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool {
        detect::detect(self.flow_type(), &Self::RULES, form, context)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommercialRentFlowService;

impl CommercialRentFlowService {
    const RULES: DetectionRules = DetectionRules {
        url: |url: &UrlSignals| {
            url.has_segment(&["commercial"]) && url.has_segment(&["rent", "lease"])
        },
        context: detect::never,
        ad_type: |ad_type: &str| {
            ad_type.contains("commercial") && contains_any(ad_type, &["rent", "lease"])
        },
    };
}

impl FlowService for CommercialRentFlowService {
    fn flow_type(&self) -> FlowType {
        FlowType::CommercialRent
    }

    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool {
        detect::detect(self.flow_type(), &Self::RULES, form, context)
    }

    fn enrich_steps(&self, steps: &mut BTreeMap<String, StepData>) {
        let Some(rental) = step_mut(self.flow_type(), steps, StepSection::Rental) else {
            return;
        };

        let supplied = match rental.get("preferredTenants") {
            Some(Value::Array(tenants)) => tenants.iter().any(is_present),
            Some(other) => is_present(other),
            None => false,
        };
        if !supplied {
            rental.insert(
                "preferredTenants".to_string(),
                json!(DEFAULT_COMMERCIAL_TENANTS),
            );
        }
    }
}
