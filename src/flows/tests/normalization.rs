use super::common::*;
use serde_json::{json, Map, Value};

use crate::flows::base::BaseFlowService;
use crate::flows::domain::{FlowType, ListingStatus};
use crate::flows::factory::FlowServiceFactory;
use crate::flows::steps;

#[test]
fn scattered_rental_collapses_into_steps() {
    let service = FlowServiceFactory::service_for(FlowType::ResidentialRent);
    let document = service.format_data_at(&scattered_rental(), fixed_now());

    assert_eq!(
        document.step("res_rent_rental").expect("rental"),
        json!({
            "rentAmount": 32000,
            "securityDeposit": 100000,
            "maintenanceCharges": 2500,
            "availableFrom": "2025-04-01"
        })
        .as_object()
        .expect("object")
    );

    let basic = document.step("res_rent_basic_details").expect("basic details");
    assert_eq!(basic["title"], json!("Sunny 2BHK"));
    assert_eq!(basic["floor"], json!(4));

    let location = document.step("res_rent_location").expect("location");
    assert_eq!(location["city"], json!("Pune"));
    assert_eq!(
        location["coordinates"],
        json!({ "latitude": 18.559, "longitude": 73.786 })
    );

    assert_eq!(
        document.step("res_rent_features").expect("features")["parking"],
        json!("Both")
    );

    assert_eq!(document.meta.id.as_deref(), Some("prop-881"));
    assert_eq!(document.meta.status, ListingStatus::Draft);
    assert_eq!(document.meta.updated_at, fixed_now());
    assert_eq!(document.media.photos.len(), 2);
}

#[test]
fn step_value_wins_over_root_value() {
    let service = FlowServiceFactory::service_for(FlowType::ResidentialRent);
    let form = form(json!({
        "steps": { "res_rent_rental": { "rentAmount": 40000 } },
        "rentAmount": 10000
    }));
    let document = service.format_data(&form);
    assert_eq!(
        document.step("res_rent_rental").expect("rental")["rentAmount"],
        json!(40000)
    );
}

#[test]
fn output_holds_only_the_flows_data_steps() {
    for flow in FlowType::ordered() {
        let document = FlowServiceFactory::service_for(flow).format_data(&scattered_rental());
        let expected: Vec<&str> = steps::data_steps(flow).map(|step| step.id).collect();
        let mut actual: Vec<&str> = document.steps.keys().map(String::as_str).collect();
        actual.sort_unstable();
        let mut expected_sorted = expected.clone();
        expected_sorted.sort_unstable();
        assert_eq!(actual, expected_sorted, "{flow}");
        assert_eq!(document.flow.flow_type, flow);
    }
}

#[test]
fn normalizing_twice_keeps_step_contents() {
    let inputs = [
        (FlowType::ResidentialRent, scattered_rental()),
        (
            FlowType::CommercialRent,
            form(json!({ "rentAmount": 50000, "location": { "latitude": "12.97", "longitude": "77.59" } })),
        ),
        (
            FlowType::LandSale,
            form(json!({ "landType": "Residential Plot", "plotLength": 60, "plotWidth": 40 })),
        ),
        (
            FlowType::ResidentialPgHostel,
            form(json!({ "pgDetails": { "pgName": "Green Nest", "mealOption": "Both" } })),
        ),
    ];

    for (flow, input) in inputs {
        let service = FlowServiceFactory::service_for(flow);
        let first = service.format_data_at(&input, fixed_now());

        let steps: Map<String, Value> = first
            .steps
            .iter()
            .map(|(id, data)| (id.clone(), Value::Object(data.clone())))
            .collect();
        let refed = form(json!({ "steps": steps }));
        let second = service.format_data_at(&refed, fixed_now());

        assert_eq!(first.steps, second.steps, "{flow}");
    }
}

#[test]
fn document_round_trips_through_form_state() {
    let service = FlowServiceFactory::service_for(FlowType::CommercialRent);
    let first = service.format_data_at(&form(json!({ "rentAmount": 50000 })), fixed_now());
    let second = service.format_data_at(&first.to_form_state(), fixed_now());
    assert_eq!(first.steps, second.steps);
    assert_eq!(first.flow, second.flow);
}

#[test]
fn migration_then_format_matches_direct_format() {
    let base = BaseFlowService::new(FlowType::ResidentialRent);
    let migrated = base.migrate_root_fields_to_steps(&scattered_rental());

    let step = migrated.step("res_rent_rental").expect("rental step");
    assert_eq!(step["rentAmount"], json!(32000));
    assert_eq!(step["securityDeposit"], json!(100000));
    assert_eq!(step["availableFrom"], json!("2025-04-01"));
    assert_eq!(migrated.get("rentAmount"), Some(&json!(25000)));

    let service = FlowServiceFactory::service_for(FlowType::ResidentialRent);
    assert_eq!(
        service.format_data_at(&migrated, fixed_now()).steps,
        service.format_data_at(&scattered_rental(), fixed_now()).steps,
    );
}

#[test]
fn migration_keeps_nested_values_ahead_of_root_conflicts() {
    let inputs = [
        (
            FlowType::ResidentialRent,
            form(json!({ "rental": { "securityDeposit": 100000 }, "securityDeposit": 50000 })),
        ),
        (
            FlowType::CommercialSale,
            form(json!({
                "saleDetails": { "expectedPrice": 9200000 },
                "expectedPrice": 8000000,
                "locationDetails": { "city": "Indore" },
                "city": "Bhopal"
            })),
        ),
        (
            FlowType::ResidentialPgHostel,
            form(json!({ "pgDetails": { "mealOption": "Both" }, "mealOption": "None" })),
        ),
    ];

    for (flow, input) in inputs {
        let service = FlowServiceFactory::service_for(flow);
        let migrated = BaseFlowService::new(flow).migrate_root_fields_to_steps(&input);
        assert_eq!(
            service.format_data_at(&migrated, fixed_now()).steps,
            service.format_data_at(&input, fixed_now()).steps,
            "{flow}"
        );
    }
}
