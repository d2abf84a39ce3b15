use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::flows::domain::{FlowContext, FlowType, FormState};

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn form(value: Value) -> FormState {
    FormState::from_value(value)
}

pub(super) fn create_url(flow: FlowType, slug: &str) -> String {
    format!(
        "/properties/list/{}/{}/{}",
        flow.category().as_str(),
        flow.listing_type().as_str(),
        slug
    )
}

/// A half-migrated residential rental: some fields already live under
/// `steps`, others still sit in legacy objects or at the root.
pub(super) fn scattered_rental() -> FormState {
    form(json!({
        "flow": { "category": "residential", "listingType": "rent" },
        "meta": { "id": "prop-881", "owner": "owner-17", "status": "draft" },
        "steps": {
            "res_rent_basic_details": { "title": "Sunny 2BHK", "bhkType": "2BHK" },
            "res_rent_rental": { "rentAmount": 32000 }
        },
        "rental": { "rentAmount": 28000, "securityDeposit": 100000 },
        "rentDetails": { "maintenanceCharges": 2500 },
        "locationDetails": {
            "city": "Pune",
            "locality": "Baner",
            "coordinates": { "lat": 18.559, "lng": 73.786 }
        },
        "rentAmount": 25000,
        "availableFrom": "2025-04-01",
        "furnishing": "Semi-Furnished",
        "parking": "Both",
        "floor": 4,
        "photos": ["front.jpg", "kitchen.jpg"]
    }))
}

pub(super) fn contexts() -> Vec<FlowContext> {
    let mut contexts: Vec<FlowContext> = FlowType::ordered()
        .into_iter()
        .map(|flow| FlowContext::from_url(create_url(flow, "location")))
        .collect();
    contexts.push(FlowContext::default().with_sale_mode(true));
    contexts.push(FlowContext::default().with_pg_hostel_mode(true));
    contexts.push(FlowContext::default().with_ad_type("Commercial Lease"));
    contexts.push(FlowContext::from_url("/dashboard"));
    contexts
}
