use listing_flow::flows::{FlowContext, FlowType, FormState};
use listing_flow::wizard::{property_info_from_url, WizardMode, WizardPaths, WizardSession};
use serde_json::json;

fn start(url: &str, form: serde_json::Value) -> WizardSession {
    WizardSession::new(
        FormState::from_value(form),
        FlowContext::from_url(url),
        WizardPaths::default(),
    )
}

#[test]
fn visible_steps_stay_within_each_flows_sequence() {
    for flow in FlowType::ordered() {
        let url = format!(
            "/properties/list/{}/{}",
            flow.category().as_str(),
            flow.listing_type().as_str()
        );
        let session = start(&url, json!({}));
        assert_eq!(session.active_flow(), flow, "{url}");

        let all: Vec<&str> = session.steps().iter().map(|step| step.id).collect();
        let visible = session.visible_steps();
        assert!(visible.iter().all(|step| all.contains(&step.id)));
        assert!(visible.iter().all(|step| step.slug != "review"));
        assert!(all.iter().any(|id| id.ends_with("_review")));
    }
}

#[test]
fn walking_the_coworking_wizard_keeps_url_in_sync() {
    let mut session = start("/properties/list/commercial/coworking/basic_details", json!({}));
    let mut seen = vec![session.url_path().to_string()];
    for _ in 0..4 {
        session.next_step();
        seen.push(session.url_path().to_string());
    }

    assert_eq!(
        seen,
        vec![
            "/properties/list/commercial/coworking/basic_details",
            "/properties/list/commercial/coworking/location",
            "/properties/list/commercial/coworking/coworking_details",
            "/properties/list/commercial/coworking/features",
            "/properties/list/commercial/coworking/photos",
        ]
    );

    let info = property_info_from_url(session.url_path());
    assert_eq!(info.mode, WizardMode::Create);
    assert_eq!(info.flow_type(), Some(FlowType::CommercialCoworking));
    assert_eq!(info.step.as_deref(), Some("photos"));
}

#[test]
fn sale_mode_context_switches_to_the_sale_sequence() {
    let session = WizardSession::new(
        FormState::new(),
        FlowContext::from_url("/properties/list").with_sale_mode(true),
        WizardPaths::default(),
    );
    assert_eq!(session.active_flow(), FlowType::ResidentialSale);
    assert!(session.flags().hides(listing_flow::flows::StepSection::Rental));
    let slugs: Vec<&str> = session.visible_steps().iter().map(|step| step.slug).collect();
    assert_eq!(slugs, vec!["basic_details", "location", "sale", "features", "photos"]);
}

#[test]
fn resume_uses_explicit_step_and_custom_paths() {
    let paths = WizardPaths::new("/owner/new", "/owner/listings");
    let session = WizardSession::resume(
        FormState::from_value(json!({ "flowType": "residential_flatmates" })),
        FlowContext::from_url("/owner/listings/abc/edit"),
        paths,
        "res_flat_flatmate_details",
    );
    assert_eq!(session.form_step(), 3);
    assert_eq!(
        session.url_path(),
        "/owner/listings/abc/edit?step=flatmate_details"
    );
}

#[test]
fn snapshot_serializes_for_the_client() {
    let session = start("/properties/list/residential/pghostel/location", json!({}));
    let snapshot = serde_json::to_value(session.snapshot()).expect("serializes");
    assert_eq!(snapshot["flowType"], json!("residential_pghostel"));
    assert_eq!(snapshot["flags"]["isPGHostelMode"], json!(true));
    assert_eq!(snapshot["currentStep"]["id"], json!("res_pg_location"));
    assert_eq!(snapshot["steps"].as_array().map(Vec::len), Some(6));
    let hidden: Vec<&str> = snapshot["hiddenSteps"]
        .as_array()
        .expect("hidden steps")
        .iter()
        .filter_map(|step| step["slug"].as_str())
        .collect();
    assert_eq!(hidden, vec!["basic_details", "rental", "sale", "flatmate_details"]);
}

#[test]
fn hidden_page_round_trip_returns_to_the_visible_sequence() {
    let mut session = start("/properties/list/commercial/rent/location", json!({}));
    assert!(session.go_to_step("coworking_details"));
    assert_eq!(
        session.current_step().map(|step| step.id),
        Some("com_cow_coworking_details")
    );
    assert_eq!(session.active_flow(), FlowType::CommercialRent);

    session.next_step();
    assert_eq!(session.current_step().map(|step| step.slug), Some("features"));
    assert_eq!(session.url_path(), "/properties/list/commercial/rent/features");
}
