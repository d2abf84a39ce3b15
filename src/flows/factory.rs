use super::detect::{self, UrlSignals};
use super::domain::{FlowContext, FlowType, FormState, ListingType, PropertyCategory};
use super::error::FlowError;
use super::services::{
    CommercialCoworkingFlowService, CommercialRentFlowService, CommercialSaleFlowService,
    FlowService, LandSaleFlowService, PgHostelFlowService, ResidentialFlatmatesFlowService,
    ResidentialRentFlowService, ResidentialSaleFlowService,
};
use tracing::debug;

static PG_HOSTEL: PgHostelFlowService = PgHostelFlowService;
static COMMERCIAL_COWORKING: CommercialCoworkingFlowService = CommercialCoworkingFlowService;
static LAND_SALE: LandSaleFlowService = LandSaleFlowService;
static RESIDENTIAL_FLATMATES: ResidentialFlatmatesFlowService = ResidentialFlatmatesFlowService;
static COMMERCIAL_SALE: CommercialSaleFlowService = CommercialSaleFlowService;
static COMMERCIAL_RENT: CommercialRentFlowService = CommercialRentFlowService;
static RESIDENTIAL_SALE: ResidentialSaleFlowService = ResidentialSaleFlowService;
static RESIDENTIAL_RENT: ResidentialRentFlowService = ResidentialRentFlowService;

/// Most specific first. Several detectors overlap (a commercial rent URL also
/// passes the generic rent check), so this order decides ambiguous input.
static PRIORITY: [&'static dyn FlowService; 8] = [
    &PG_HOSTEL,
    &COMMERCIAL_COWORKING,
    &LAND_SALE,
    &RESIDENTIAL_FLATMATES,
    &COMMERCIAL_SALE,
    &COMMERCIAL_RENT,
    &RESIDENTIAL_SALE,
    &RESIDENTIAL_RENT,
];

/// Resolves the flow service for a form, either by heuristics or by key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowServiceFactory;

impl FlowServiceFactory {
    pub fn priority_order() -> &'static [&'static dyn FlowService] {
        &PRIORITY
    }

    pub fn get_flow_service(
        form: &FormState,
        context: &FlowContext,
    ) -> Result<&'static dyn FlowService, FlowError> {
        if let Some(reason) = pg_hostel_shortcut(form, context) {
            debug!(flow = %FlowType::ResidentialPgHostel, reason, "flow classified");
            return Ok(&PG_HOSTEL);
        }

        for service in PRIORITY {
            if service.detect_flow(form, context) {
                debug!(flow = %service.flow_type(), url = %context.url_path, "flow classified");
                return Ok(service);
            }
        }

        debug!(url = %context.url_path, "no flow detector matched");
        Err(FlowError::Unclassified {
            url_path: context.url_path.clone(),
            ad_type: detect::raw_ad_type(form, context).map(str::to_owned),
            category: form.flow_field("category").map(str::to_owned),
            listing_type: form.flow_field("listingType").map(str::to_owned),
            flow_type: form.flow_field("flowType").map(str::to_owned),
        })
    }

    /// Direct lookup by flow key, tolerating aliases such as `residential_sell`.
    pub fn get_flow_service_by_type(flow_type: &str) -> Result<&'static dyn FlowService, FlowError> {
        FlowType::parse(flow_type)
            .map(Self::service_for)
            .ok_or_else(|| FlowError::unknown(flow_type))
    }

    pub fn get_service(
        category: &str,
        listing_type: &str,
    ) -> Result<&'static dyn FlowService, FlowError> {
        let flow = PropertyCategory::parse(category)
            .zip(ListingType::parse(listing_type))
            .and_then(|(category, listing_type)| FlowType::from_parts(category, listing_type));
        flow.map(Self::service_for)
            .ok_or_else(|| FlowError::unknown(format!("{category}_{listing_type}")))
    }

    pub fn service_for(flow: FlowType) -> &'static dyn FlowService {
        match flow {
            FlowType::ResidentialRent => &RESIDENTIAL_RENT,
            FlowType::ResidentialSale => &RESIDENTIAL_SALE,
            FlowType::ResidentialFlatmates => &RESIDENTIAL_FLATMATES,
            FlowType::ResidentialPgHostel => &PG_HOSTEL,
            FlowType::CommercialRent => &COMMERCIAL_RENT,
            FlowType::CommercialSale => &COMMERCIAL_SALE,
            FlowType::CommercialCoworking => &COMMERCIAL_COWORKING,
            FlowType::LandSale => &LAND_SALE,
        }
    }
}

/// PG/Hostel is hard to tell apart from ordinary rentals by structure alone,
/// so a few cheap signals are checked ahead of the chain.
fn pg_hostel_shortcut(form: &FormState, context: &FlowContext) -> Option<&'static str> {
    if UrlSignals::parse(&context.url_path).contains_any(&["pghostel", "pg-hostel", "pg_hostel"]) {
        return Some("url");
    }
    if context.pg_hostel_mode() {
        return Some("context flag");
    }

    let listing_type = form
        .flow_field("listingType")
        .or_else(|| context.signals.get("listingType").and_then(|value| value.as_str()))
        .map(str::to_ascii_lowercase);
    if listing_type.is_some_and(|value| value.contains("pg") || value.contains("hostel")) {
        return Some("listing type");
    }
    None
}
