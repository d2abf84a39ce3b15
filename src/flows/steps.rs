use super::domain::FlowType;
use serde::Serialize;

/// Kind of content a wizard page collects. Decides which extractor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSection {
    BasicDetails,
    RoomDetails,
    LandDetails,
    Location,
    Rental,
    Sale,
    Features,
    Flatmate,
    PgDetails,
    Coworking,
    LandFeatures,
    Review,
    Photos,
}

impl StepSection {
    /// Trailing part of the step id (`res_rent_{suffix}`).
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::BasicDetails | Self::LandDetails => "basic_details",
            Self::RoomDetails => "room_details",
            Self::Location => "location",
            Self::Rental => "rental",
            Self::Sale => "sale_details",
            Self::Features => "features",
            Self::Flatmate => "flatmate_details",
            Self::PgDetails => "pg_details",
            Self::Coworking => "coworking_details",
            Self::LandFeatures => "land_features",
            Self::Review => "review",
            Self::Photos => "photos",
        }
    }

    /// Whether a step id suffix written by some flow feeds this section.
    /// Details pages are interchangeable so data survives a flow switch.
    pub fn accepts_suffix(self, suffix: &str) -> bool {
        match self {
            Self::BasicDetails | Self::RoomDetails | Self::LandDetails => matches!(
                suffix,
                "basic_details" | "room_details" | "land_details"
            ),
            Self::Sale => matches!(suffix, "sale_details" | "sale"),
            other => other.suffix() == suffix,
        }
    }

    /// Review and photos pages never carry step data.
    pub const fn is_data_section(self) -> bool {
        !matches!(self, Self::Review | Self::Photos)
    }
}

/// Static metadata describing one wizard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDefinition {
    pub id: &'static str,
    pub slug: &'static str,
    pub section: StepSection,
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

const fn step(
    id: &'static str,
    slug: &'static str,
    section: StepSection,
    title: &'static str,
    icon: &'static str,
    description: &'static str,
) -> StepDefinition {
    StepDefinition {
        id,
        slug,
        section,
        title,
        icon,
        description,
    }
}

const RESIDENTIAL_RENT: [StepDefinition; 6] = [
    step("res_rent_basic_details", "basic_details", StepSection::BasicDetails, "Basic Details", "home", "Property type, configuration, and size"),
    step("res_rent_location", "location", StepSection::Location, "Location", "map-pin", "Address and map position"),
    step("res_rent_rental", "rental", StepSection::Rental, "Rental Details", "wallet", "Rent, deposit, and tenant preferences"),
    step("res_rent_features", "features", StepSection::Features, "Amenities", "sparkles", "Amenities and additional features"),
    step("res_rent_review", "review", StepSection::Review, "Review", "clipboard-check", "Check everything before publishing"),
    step("res_rent_photos", "photos", StepSection::Photos, "Photos", "camera", "Upload photos and videos"),
];

const RESIDENTIAL_SALE: [StepDefinition; 6] = [
    step("res_sale_basic_details", "basic_details", StepSection::BasicDetails, "Basic Details", "home", "Property type, configuration, and size"),
    step("res_sale_location", "location", StepSection::Location, "Location", "map-pin", "Address and map position"),
    step("res_sale_sale_details", "sale", StepSection::Sale, "Sale Details", "tag", "Expected price and possession"),
    step("res_sale_features", "features", StepSection::Features, "Amenities", "sparkles", "Amenities and additional features"),
    step("res_sale_review", "review", StepSection::Review, "Review", "clipboard-check", "Check everything before publishing"),
    step("res_sale_photos", "photos", StepSection::Photos, "Photos", "camera", "Upload photos and videos"),
];

const RESIDENTIAL_FLATMATES: [StepDefinition; 6] = [
    step("res_flat_basic_details", "basic_details", StepSection::BasicDetails, "Basic Details", "home", "Property type, configuration, and size"),
    step("res_flat_location", "location", StepSection::Location, "Location", "map-pin", "Address and map position"),
    step("res_flat_flatmate_details", "flatmate_details", StepSection::Flatmate, "Flatmate Details", "users", "Rent share and flatmate preferences"),
    step("res_flat_features", "features", StepSection::Features, "Amenities", "sparkles", "Amenities and additional features"),
    step("res_flat_review", "review", StepSection::Review, "Review", "clipboard-check", "Check everything before publishing"),
    step("res_flat_photos", "photos", StepSection::Photos, "Photos", "camera", "Upload photos and videos"),
];

const RESIDENTIAL_PG_HOSTEL: [StepDefinition; 6] = [
    step("res_pg_room_details", "room_details", StepSection::RoomDetails, "Room Details", "bed", "Room types, capacity, and furnishing"),
    step("res_pg_location", "location", StepSection::Location, "Location", "map-pin", "Address and map position"),
    step("res_pg_pg_details", "pg_details", StepSection::PgDetails, "PG Details", "building", "Rent, meals, rules, and services"),
    step("res_pg_features", "features", StepSection::Features, "Amenities", "sparkles", "Amenities and additional features"),
    step("res_pg_review", "review", StepSection::Review, "Review", "clipboard-check", "Check everything before publishing"),
    step("res_pg_photos", "photos", StepSection::Photos, "Photos", "camera", "Upload photos and videos"),
];

const COMMERCIAL_RENT: [StepDefinition; 6] = [
    step("com_rent_basic_details", "basic_details", StepSection::BasicDetails, "Basic Details", "building", "Commercial property type and size"),
    step("com_rent_location", "location", StepSection::Location, "Location", "map-pin", "Address and map position"),
    step("com_rent_rental", "rental", StepSection::Rental, "Rental Details", "wallet", "Rent, deposit, lease, and tenant preferences"),
    step("com_rent_features", "features", StepSection::Features, "Amenities", "sparkles", "Amenities and additional features"),
    step("com_rent_review", "review", StepSection::Review, "Review", "clipboard-check", "Check everything before publishing"),
    step("com_rent_photos", "photos", StepSection::Photos, "Photos", "camera", "Upload photos and videos"),
];

const COMMERCIAL_SALE: [StepDefinition; 6] = [
    step("com_sale_basic_details", "basic_details", StepSection::BasicDetails, "Basic Details", "building", "Commercial property type and size"),
    step("com_sale_location", "location", StepSection::Location, "Location", "map-pin", "Address and map position"),
    step("com_sale_sale_details", "sale", StepSection::Sale, "Sale Details", "tag", "Expected price and possession"),
    step("com_sale_features", "features", StepSection::Features, "Amenities", "sparkles", "Amenities and additional features"),
    step("com_sale_review", "review", StepSection::Review, "Review", "clipboard-check", "Check everything before publishing"),
    step("com_sale_photos", "photos", StepSection::Photos, "Photos", "camera", "Upload photos and videos"),
];

const COMMERCIAL_COWORKING: [StepDefinition; 6] = [
    step("com_cow_basic_details", "basic_details", StepSection::BasicDetails, "Basic Details", "building", "Workspace type and size"),
    step("com_cow_location", "location", StepSection::Location, "Location", "map-pin", "Address and map position"),
    step("com_cow_coworking_details", "coworking_details", StepSection::Coworking, "Coworking Details", "briefcase", "Seats, pricing, and operating hours"),
    step("com_cow_features", "features", StepSection::Features, "Amenities", "sparkles", "Amenities and additional features"),
    step("com_cow_review", "review", StepSection::Review, "Review", "clipboard-check", "Check everything before publishing"),
    step("com_cow_photos", "photos", StepSection::Photos, "Photos", "camera", "Upload photos and videos"),
];

const LAND_SALE: [StepDefinition; 6] = [
    step("land_sale_basic_details", "land_details", StepSection::LandDetails, "Land Details", "trees", "Land type and plot dimensions"),
    step("land_sale_location", "location", StepSection::Location, "Location", "map-pin", "Address and map position"),
    step("land_sale_sale_details", "sale", StepSection::Sale, "Sale Details", "tag", "Expected price and ownership"),
    step("land_sale_land_features", "land_features", StepSection::LandFeatures, "Land Features", "ruler", "Approvals, access road, and utilities"),
    step("land_sale_review", "review", StepSection::Review, "Review", "clipboard-check", "Check everything before publishing"),
    step("land_sale_photos", "photos", StepSection::Photos, "Photos", "camera", "Upload photos and videos"),
];

/// Full ordered page list for a flow, review and photos included.
pub fn sequence(flow: FlowType) -> &'static [StepDefinition] {
    match flow {
        FlowType::ResidentialRent => &RESIDENTIAL_RENT,
        FlowType::ResidentialSale => &RESIDENTIAL_SALE,
        FlowType::ResidentialFlatmates => &RESIDENTIAL_FLATMATES,
        FlowType::ResidentialPgHostel => &RESIDENTIAL_PG_HOSTEL,
        FlowType::CommercialRent => &COMMERCIAL_RENT,
        FlowType::CommercialSale => &COMMERCIAL_SALE,
        FlowType::CommercialCoworking => &COMMERCIAL_COWORKING,
        FlowType::LandSale => &LAND_SALE,
    }
}

/// Pages that hold form data (everything except review and photos).
pub fn data_steps(flow: FlowType) -> impl Iterator<Item = &'static StepDefinition> {
    sequence(flow)
        .iter()
        .filter(|definition| definition.section.is_data_section())
}

/// Looks a step up by full id or by URL slug.
pub fn find_step(flow: FlowType, id_or_slug: &str) -> Option<&'static StepDefinition> {
    sequence(flow)
        .iter()
        .find(|definition| definition.id == id_or_slug || definition.slug == id_or_slug)
}

pub fn step_for_section(flow: FlowType, section: StepSection) -> Option<&'static StepDefinition> {
    sequence(flow)
        .iter()
        .find(|definition| definition.section == section)
}

pub fn position(flow: FlowType, id_or_slug: &str) -> Option<usize> {
    sequence(flow)
        .iter()
        .position(|definition| definition.id == id_or_slug || definition.slug == id_or_slug)
}

/// Index of a page within its own flow's sequence. Every flow puts its
/// details page first, location second and its main page third, so slots
/// line up across flows.
pub fn slot(definition: &StepDefinition) -> Option<usize> {
    FlowType::ordered().into_iter().find_map(|flow| {
        sequence(flow)
            .iter()
            .position(|candidate| candidate.id == definition.id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_id_uses_the_flow_prefix_and_suffix() {
        for flow in FlowType::ordered() {
            for definition in sequence(flow) {
                assert_eq!(
                    definition.id,
                    format!("{}_{}", flow.step_prefix(), definition.section.suffix()),
                    "{flow} step id must follow the naming convention"
                );
            }
        }
    }

    #[test]
    fn review_precedes_photos_in_every_flow() {
        for flow in FlowType::ordered() {
            let steps = sequence(flow);
            let len = steps.len();
            assert_eq!(steps[len - 2].section, StepSection::Review);
            assert_eq!(steps[len - 1].section, StepSection::Photos);
        }
    }

    #[test]
    fn pg_sequence_matches_wizard_pages() {
        let slugs: Vec<&str> = sequence(FlowType::ResidentialPgHostel)
            .iter()
            .map(|definition| definition.slug)
            .collect();
        assert_eq!(
            slugs,
            vec!["room_details", "location", "pg_details", "features", "review", "photos"]
        );
    }

    #[test]
    fn find_step_resolves_ids_and_slugs() {
        let by_slug = find_step(FlowType::LandSale, "land_details").expect("slug resolves");
        assert_eq!(by_slug.id, "land_sale_basic_details");
        let by_id = find_step(FlowType::CommercialCoworking, "com_cow_coworking_details")
            .expect("id resolves");
        assert_eq!(by_id.section, StepSection::Coworking);
        assert!(find_step(FlowType::ResidentialRent, "pg_details").is_none());
        assert_eq!(position(FlowType::ResidentialRent, "rental"), Some(2));
    }

    #[test]
    fn details_sections_accept_each_other() {
        assert!(StepSection::LandDetails.accepts_suffix("basic_details"));
        assert!(StepSection::BasicDetails.accepts_suffix("room_details"));
        assert!(StepSection::Sale.accepts_suffix("sale_details"));
        assert!(!StepSection::Rental.accepts_suffix("sale_details"));
    }

    #[test]
    fn slots_line_up_across_flows() {
        let rental = find_step(FlowType::ResidentialRent, "rental").expect("rental");
        let sale = find_step(FlowType::ResidentialSale, "sale").expect("sale");
        assert_eq!(slot(rental), Some(2));
        assert_eq!(slot(rental), slot(sale));
        for flow in FlowType::ordered() {
            for (index, definition) in sequence(flow).iter().enumerate() {
                assert_eq!(slot(definition), Some(index), "{}", definition.id);
            }
        }
    }
}
