use super::FlowService;
use crate::flows::detect::{self, contains_any, DetectionRules, UrlSignals};
use crate::flows::domain::{FlowContext, FlowType, FormState};

#[derive(Debug, Clone, Copy, Default)]
pub struct PgHostelFlowService;

impl PgHostelFlowService {
    const RULES: DetectionRules = DetectionRules {
        url: |url: &UrlSignals| {
            url.contains_any(&["pghostel", "pg-hostel", "pg_hostel"])
                || url.has_segment(&["pg", "hostel"])
        },
        context: FlowContext::pg_hostel_mode,
        ad_type: |ad_type: &str| contains_any(ad_type, &["pg", "hostel"]),
    };
}

impl FlowService for PgHostelFlowService {
    fn flow_type(&self) -> FlowType {
        FlowType::ResidentialPgHostel
    }

    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool {
        detect::detect(self.flow_type(), &Self::RULES, form, context)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResidentialFlatmatesFlowService;

impl ResidentialFlatmatesFlowService {
    const RULES: DetectionRules = DetectionRules {
        url: |url: &UrlSignals| url.contains_any(&["flatmate"]),
        context: detect::never,
        ad_type: |ad_type: &str| ad_type.contains("flatmate"),
    };
}

impl FlowService for ResidentialFlatmatesFlowService {
    fn flow_type(&self) -> FlowType {
        FlowType::ResidentialFlatmates
    }

    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool {
        detect::detect(self.flow_type(), &Self::RULES, form, context)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResidentialSaleFlowService;

impl ResidentialSaleFlowService {
    const RULES: DetectionRules = DetectionRules {
        url: |url: &UrlSignals| url.has_segment(&["sale", "sell"]),
        context: FlowContext::sale_mode,
        ad_type: |ad_type: &str| contains_any(ad_type, &["sale", "sell"]),
    };
}

impl FlowService for ResidentialSaleFlowService {
    fn flow_type(&self) -> FlowType {
        FlowType::ResidentialSale
    }

    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool {
        detect::detect(self.flow_type(), &Self::RULES, form, context)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResidentialRentFlowService;

impl ResidentialRentFlowService {
    const RULES: DetectionRules = DetectionRules {
        url: |url: &UrlSignals| url.has_segment(&["rent"]),
        context: detect::never,
        ad_type: |ad_type: &str| ad_type.contains("rent"),
    };
}

impl FlowService for ResidentialRentFlowService {
    fn flow_type(&self) -> FlowType {
        FlowType::ResidentialRent
    }

    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool {
        detect::detect(self.flow_type(), &Self::RULES, form, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pg_detects_from_each_signal() {
        let service = PgHostelFlowService;
        let empty = FormState::new();

        assert!(service.detect_flow(
            &empty,
            &FlowContext::from_url("/properties/list/residential/pghostel/room_details")
        ));
        assert!(service.detect_flow(&empty, &FlowContext::default().with_pg_hostel_mode(true)));
        assert!(service.detect_flow(&empty, &FlowContext::default().with_ad_type("Hostel")));

        let with_step = FormState::from_value(json!({
            "steps": { "res_pg_pg_details": { "mealOption": "Both" } }
        }));
        assert!(service.detect_flow(&with_step, &FlowContext::default()));
        assert!(!service.detect_flow(&empty, &FlowContext::from_url("/properties/list/residential/rent")));
    }

    #[test]
    fn sale_mode_flag_selects_residential_sale() {
        let service = ResidentialSaleFlowService;
        assert!(service.detect_flow(&FormState::new(), &FlowContext::default().with_sale_mode(true)));
        assert!(!service.detect_flow(&FormState::new(), &FlowContext::default().with_sale_mode(false)));
    }

    #[test]
    fn rent_url_is_detected_by_segment() {
        let service = ResidentialRentFlowService;
        assert!(service.detect_flow(
            &FormState::new(),
            &FlowContext::from_url("/properties/list/residential/rent/rental")
        ));
        assert!(!service.detect_flow(
            &FormState::new(),
            &FlowContext::from_url("/properties/list/residential/rental-guide")
        ));
    }

    #[test]
    fn flatmates_detected_from_explicit_metadata() {
        let form = FormState::from_value(json!({
            "flow": { "category": "residential", "listingType": "flatmate" }
        }));
        assert!(ResidentialFlatmatesFlowService.detect_flow(&form, &FlowContext::default()));
    }
}
