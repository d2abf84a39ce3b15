use super::domain::{
    is_present, FlowType, FormState, ListingMedia, ListingMeta, ListingStatus, NormalizedForm,
    StepData,
};
use super::fields::{self, RESERVED_ROOT_KEYS};
use super::steps::{self, StepDefinition, StepSection};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Number, Value};
use std::collections::BTreeMap;

/// Shared extraction engine behind every flow service.
///
/// Fields are resolved through an ordered list of sources and the first present
/// value wins:
///
/// 1. the step's own entry in `steps` (copied wholesale),
/// 2. steps written under another flow's prefix for the same section,
/// 3. the section's flow object (e.g. `rental`),
/// 4. legacy nested objects, fixed names first, then root keys discovered by pattern,
/// 5. the flat root.
#[derive(Debug, Clone, Copy)]
pub struct BaseFlowService {
    flow: FlowType,
}

impl BaseFlowService {
    pub const fn new(flow: FlowType) -> Self {
        Self { flow }
    }

    pub const fn flow_type(&self) -> FlowType {
        self.flow
    }

    /// Fills each data step with the allowlisted fields it does not define yet.
    /// A field takes the value extraction would pick, so a flow object still
    /// beats the flat root. Root values are left in place for older readers.
    pub fn migrate_root_fields_to_steps(&self, form: &FormState) -> FormState {
        let mut migrated = form.clone();
        let mut step_map = form.steps().cloned().unwrap_or_default();

        for definition in steps::data_steps(self.flow) {
            let existing = step_map.get(definition.id).and_then(Value::as_object);
            let mut step = existing.cloned().unwrap_or_default();
            let mut copied = false;

            let mut sources: Vec<&Map<String, Value>> =
                form.object(definition.id).into_iter().collect();
            sources.extend(self.sources_for(form, definition));

            for field in fields::sources(definition.section).fields {
                if step.get(*field).is_some_and(is_present) {
                    continue;
                }
                let found = sources
                    .iter()
                    .find_map(|source| source.get(*field).filter(|value| is_present(value)));
                if let Some(value) = found {
                    step.insert((*field).to_string(), value.clone());
                    copied = true;
                }
            }

            if copied || existing.is_some() {
                step_map.insert(definition.id.to_string(), Value::Object(step));
            }
        }

        migrated.insert("steps", Value::Object(step_map));
        migrated
    }

    /// Builds the step-keyed map for every data step of the flow. Review and
    /// photos pages are never part of the output.
    pub fn format_steps_section(&self, form: &FormState) -> BTreeMap<String, StepData> {
        steps::data_steps(self.flow)
            .map(|definition| {
                (
                    definition.id.to_string(),
                    self.extract_step(form, definition),
                )
            })
            .collect()
    }

    /// Extracts the data for the flow's step of the given section, if the flow has one.
    pub fn extract_section(&self, form: &FormState, section: StepSection) -> Option<StepData> {
        steps::step_for_section(self.flow, section)
            .map(|definition| self.extract_step(form, definition))
    }

    pub fn extract_step(&self, form: &FormState, definition: &StepDefinition) -> StepData {
        match definition.section {
            StepSection::Location => self.extract_location_data(form, definition),
            StepSection::Review | StepSection::Photos => StepData::new(),
            _ => self.collect(form, definition),
        }
    }

    /// Location data with coordinates normalized into a single
    /// `{latitude, longitude}` object. Flat `latitude` / `longitude` stay when present.
    pub fn extract_location_data(&self, form: &FormState, definition: &StepDefinition) -> StepData {
        let mut data = self.collect(form, definition);

        let coordinates = data
            .get("coordinates")
            .and_then(parse_coordinates)
            .or_else(|| {
                self.sources_for(form, definition)
                    .iter()
                    .find_map(|source| source.get("coordinates").and_then(parse_coordinates))
            })
            .or_else(|| {
                let latitude = data.get("latitude").and_then(coordinate_number)?;
                let longitude = data.get("longitude").and_then(coordinate_number)?;
                Some((latitude, longitude))
            });

        match coordinates {
            Some((latitude, longitude)) => {
                data.insert(
                    "coordinates".to_string(),
                    json!({ "latitude": latitude, "longitude": longitude }),
                );
            }
            None => {
                data.remove("coordinates");
            }
        }

        data
    }

    pub fn format_meta(&self, form: &FormState, now: DateTime<Utc>) -> ListingMeta {
        let id = meta_value(form, &["id", "propertyId"]).and_then(identifier);
        let owner = meta_value(form, &["owner", "ownerId", "owner_id"]).and_then(identifier);
        let status = meta_value(form, &["status"])
            .and_then(Value::as_str)
            .map(ListingStatus::parse_lenient)
            .unwrap_or_default();
        let created_at = meta_value(form, &["createdAt", "created_at"])
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .unwrap_or(now);

        ListingMeta {
            id,
            owner,
            status,
            created_at,
            updated_at: now,
        }
    }

    pub fn format_media(&self, form: &FormState) -> ListingMedia {
        let media = form.object("media");
        let photos = media
            .and_then(|media| media.get("photos"))
            .filter(|value| is_present(value))
            .or_else(|| form.field("photos"))
            .or_else(|| form.field("images"));
        let videos = media
            .and_then(|media| media.get("videos"))
            .filter(|value| is_present(value))
            .or_else(|| form.field("videos"))
            .or_else(|| form.field("video"));

        ListingMedia {
            photos: as_list(photos),
            videos: as_list(videos),
        }
    }

    /// Assembles the `{meta, flow, steps, media}` document.
    pub fn assemble(&self, form: &FormState, now: DateTime<Utc>) -> NormalizedForm {
        NormalizedForm {
            meta: self.format_meta(form, now),
            flow: self.flow.into(),
            steps: self.format_steps_section(form),
            media: self.format_media(form),
        }
    }

    fn collect(&self, form: &FormState, definition: &StepDefinition) -> StepData {
        let mut data = StepData::new();

        let seeds = [form.step(definition.id), form.object(definition.id)];
        for seed in seeds.into_iter().flatten() {
            for (key, value) in seed {
                if is_present(value) && !data.contains_key(key) {
                    data.insert(key.clone(), value.clone());
                }
            }
        }

        let sources = self.sources_for(form, definition);
        for field in fields::sources(definition.section).fields {
            if data.contains_key(*field) {
                continue;
            }
            let found = sources
                .iter()
                .find_map(|source| source.get(*field).filter(|value| is_present(value)));
            if let Some(value) = found {
                data.insert((*field).to_string(), value.clone());
            }
        }

        data
    }

    /// Lower-priority sources for a step, in lookup order. The step's own
    /// entry is handled by seeding in `collect`.
    fn sources_for<'a>(
        &self,
        form: &'a FormState,
        definition: &StepDefinition,
    ) -> Vec<&'a Map<String, Value>> {
        let section = fields::sources(definition.section);
        let mut sources = Vec::new();

        if let Some(step_map) = form.steps() {
            for (key, value) in step_map {
                let Some(step) = value.as_object() else {
                    continue;
                };
                let Some((prefix, suffix)) = fields::split_step_id(key) else {
                    continue;
                };
                if prefix != self.flow.step_prefix() && definition.section.accepts_suffix(suffix) {
                    sources.push(step);
                }
            }
        }

        for name in section.flow_objects.iter().chain(section.legacy_objects) {
            if let Some(object) = form.object(name) {
                sources.push(object);
            }
        }

        for (key, value) in form.as_map() {
            let key = key.as_str();
            if RESERVED_ROOT_KEYS.contains(&key)
                || section.flow_objects.contains(&key)
                || section.legacy_objects.contains(&key)
                || fields::split_step_id(key).is_some()
            {
                continue;
            }
            if let Some(object) = value.as_object() {
                if fields::root_key_matches(definition.section, key) {
                    sources.push(object);
                }
            }
        }

        sources.push(form.as_map());
        sources
    }
}

fn meta_value<'a>(form: &'a FormState, keys: &[&str]) -> Option<&'a Value> {
    form.object("meta")
        .and_then(|meta| {
            keys.iter()
                .find_map(|key| meta.get(*key).filter(|value| is_present(value)))
        })
        .or_else(|| keys.iter().find_map(|key| form.field(key)))
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(object) => object.get("id").and_then(identifier),
        _ => None,
    }
}

fn as_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| is_present(item))
            .cloned()
            .collect(),
        Some(single) => vec![single.clone()],
        None => Vec::new(),
    }
}

fn parse_coordinates(value: &Value) -> Option<(Value, Value)> {
    let object = value.as_object()?;
    let latitude = ["latitude", "lat"]
        .iter()
        .find_map(|key| object.get(*key).and_then(coordinate_number))?;
    let longitude = ["longitude", "lng", "lon"]
        .iter()
        .find_map(|key| object.get(*key).and_then(coordinate_number))?;
    Some((latitude, longitude))
}

/// Numbers pass through untouched; numeric strings become JSON numbers.
fn coordinate_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn form(value: Value) -> FormState {
        FormState::from_value(value)
    }

    #[test]
    fn step_value_beats_every_other_source() {
        let form = form(json!({
            "steps": { "res_rent_rental": { "rentAmount": 18000 } },
            "rental": { "rentAmount": 17000, "securityDeposit": 50000 },
            "rentalDetails": { "rentAmount": 16000, "maintenanceCharges": 1500 },
            "rentAmount": 15000,
            "leaseDuration": "11 months"
        }));

        let service = BaseFlowService::new(FlowType::ResidentialRent);
        let rental = service
            .extract_section(&form, StepSection::Rental)
            .expect("rent flow has a rental step");

        assert_eq!(rental["rentAmount"], json!(18000));
        assert_eq!(rental["securityDeposit"], json!(50000));
        assert_eq!(rental["maintenanceCharges"], json!(1500));
        assert_eq!(rental["leaseDuration"], json!("11 months"));
    }

    #[test]
    fn blank_values_do_not_block_lower_sources() {
        let form = form(json!({
            "steps": { "res_sale_basic_details": { "title": "", "bhkType": null } },
            "title": "Sunny 2BHK",
            "bhkType": "2BHK"
        }));

        let service = BaseFlowService::new(FlowType::ResidentialSale);
        let basic = service
            .extract_section(&form, StepSection::BasicDetails)
            .expect("basic details");

        assert_eq!(basic["title"], json!("Sunny 2BHK"));
        assert_eq!(basic["bhkType"], json!("2BHK"));
    }

    #[test]
    fn discovered_root_objects_feed_their_section() {
        let form = form(json!({
            "pg_details_v1": { "pgName": "Green Nest", "mealOption": "Veg" },
            "pgName": "Ignored Root Name"
        }));

        let service = BaseFlowService::new(FlowType::ResidentialPgHostel);
        let pg = service
            .extract_section(&form, StepSection::PgDetails)
            .expect("pg details");

        assert_eq!(pg["pgName"], json!("Green Nest"));
        assert_eq!(pg["mealOption"], json!("Veg"));
    }

    #[test]
    fn foreign_flow_steps_carry_over_after_a_flow_switch() {
        let form = form(json!({
            "steps": {
                "res_rent_rental": { "rentAmount": 42000, "securityDeposit": 100000 },
                "res_rent_basic_details": { "title": "Office floor" }
            }
        }));

        let service = BaseFlowService::new(FlowType::CommercialRent);
        let steps = service.format_steps_section(&form);

        assert_eq!(steps["com_rent_rental"]["rentAmount"], json!(42000));
        assert_eq!(steps["com_rent_basic_details"]["title"], json!("Office floor"));
        assert!(!steps.contains_key("res_rent_rental"));
    }

    #[test]
    fn coordinates_normalize_from_each_shape() {
        let service = BaseFlowService::new(FlowType::ResidentialRent);

        let nested = form(json!({ "coordinates": { "lat": 12.97, "lng": 77.59 } }));
        let location = service
            .extract_section(&nested, StepSection::Location)
            .expect("location");
        assert_eq!(
            location["coordinates"],
            json!({ "latitude": 12.97, "longitude": 77.59 })
        );

        let under_location = form(json!({
            "location": { "city": "Pune", "coordinates": { "latitude": 18.52, "longitude": 73.85 } }
        }));
        let location = service
            .extract_section(&under_location, StepSection::Location)
            .expect("location");
        assert_eq!(location["city"], json!("Pune"));
        assert_eq!(
            location["coordinates"],
            json!({ "latitude": 18.52, "longitude": 73.85 })
        );

        let flat = form(json!({ "latitude": "19.07", "longitude": 72.87 }));
        let location = service
            .extract_section(&flat, StepSection::Location)
            .expect("location");
        assert_eq!(
            location["coordinates"],
            json!({ "latitude": 19.07, "longitude": 72.87 })
        );
        assert_eq!(location["latitude"], json!("19.07"));
        assert_eq!(location["longitude"], json!(72.87));
    }

    #[test]
    fn unparseable_coordinates_are_dropped() {
        let service = BaseFlowService::new(FlowType::ResidentialRent);
        let form = form(json!({ "coordinates": { "lat": "north" } }));
        let location = service
            .extract_section(&form, StepSection::Location)
            .expect("location");
        assert!(!location.contains_key("coordinates"));
    }

    #[test]
    fn migrate_root_fields_keeps_existing_step_values_and_root() {
        let form = form(json!({
            "steps": { "res_rent_basic_details": { "title": "Kept" } },
            "title": "Root title",
            "bathrooms": 2,
            "rentAmount": 25000
        }));

        let service = BaseFlowService::new(FlowType::ResidentialRent);
        let migrated = service.migrate_root_fields_to_steps(&form);

        let basic = migrated.step("res_rent_basic_details").expect("basic step");
        assert_eq!(basic["title"], json!("Kept"));
        assert_eq!(basic["bathrooms"], json!(2));
        let rental = migrated.step("res_rent_rental").expect("rental step");
        assert_eq!(rental["rentAmount"], json!(25000));
        assert_eq!(migrated.get("rentAmount"), Some(&json!(25000)));
        assert!(migrated.step("res_rent_location").is_none());
    }

    #[test]
    fn migration_prefers_flow_objects_over_the_root() {
        let form = form(json!({
            "rental": { "securityDeposit": 100000 },
            "rentDetails": { "maintenanceCharges": 1800 },
            "securityDeposit": 50000,
            "maintenanceCharges": 900
        }));

        let service = BaseFlowService::new(FlowType::ResidentialRent);
        let migrated = service.migrate_root_fields_to_steps(&form);

        let rental = migrated.step("res_rent_rental").expect("rental step");
        assert_eq!(rental["securityDeposit"], json!(100000));
        assert_eq!(rental["maintenanceCharges"], json!(1800));
        assert_eq!(migrated.get("securityDeposit"), Some(&json!(50000)));
    }

    #[test]
    fn meta_and_media_are_collected() {
        let form = form(json!({
            "meta": { "id": "prop-7", "status": "pending" },
            "ownerId": 42,
            "created_at": "2025-01-02T03:04:05Z",
            "images": ["a.jpg", "", "b.jpg"],
            "video": "tour.mp4"
        }));

        let service = BaseFlowService::new(FlowType::ResidentialSale);
        let document = service.assemble(&form, now());

        assert_eq!(document.meta.id.as_deref(), Some("prop-7"));
        assert_eq!(document.meta.owner.as_deref(), Some("42"));
        assert_eq!(document.meta.status, ListingStatus::PendingReview);
        assert_eq!(
            document.meta.created_at,
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
                .single()
                .expect("valid")
        );
        assert_eq!(document.meta.updated_at, now());
        assert_eq!(document.media.photos, vec![json!("a.jpg"), json!("b.jpg")]);
        assert_eq!(document.media.videos, vec![json!("tour.mp4")]);
        assert_eq!(document.flow.flow_type, FlowType::ResidentialSale);
    }

    #[test]
    fn output_never_contains_review_or_photos_steps() {
        let form = form(json!({
            "steps": { "res_rent_review": { "confirmed": true }, "res_rent_photos": { "count": 3 } }
        }));
        let steps = BaseFlowService::new(FlowType::ResidentialRent).format_steps_section(&form);
        assert_eq!(steps.len(), 4);
        assert!(steps.keys().all(|id| !id.ends_with("review") && !id.ends_with("photos")));
    }
}
