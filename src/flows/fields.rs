use super::steps::StepSection;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Where a section's fields may be found, besides the step map and the flat root.
#[derive(Debug)]
pub struct SectionSources {
    /// Allowlist of field names owned by the section.
    pub fields: &'static [&'static str],
    /// Nested objects written by the current wizard for this section.
    pub flow_objects: &'static [&'static str],
    /// Nested objects written by older wizard versions.
    pub legacy_objects: &'static [&'static str],
}

pub const BASIC_DETAILS_FIELDS: &[&str] = &[
    "title",
    "propertyType",
    "bhkType",
    "floor",
    "totalFloors",
    "builtUpArea",
    "builtUpAreaUnit",
    "bathrooms",
    "balconies",
    "facing",
    "propertyAge",
    "propertyCondition",
];

pub const ROOM_DETAILS_FIELDS: &[&str] = &[
    "title",
    "propertyType",
    "roomType",
    "roomCapacity",
    "totalRooms",
    "availableRooms",
    "roomSize",
    "bathroomType",
    "furnishingStatus",
    "floor",
    "totalFloors",
];

pub const LAND_DETAILS_FIELDS: &[&str] = &[
    "title",
    "landType",
    "plotLength",
    "plotWidth",
    "plotDimensionUnit",
    "builtUpArea",
    "builtUpAreaUnit",
    "plotFacing",
];

pub const LOCATION_FIELDS: &[&str] = &[
    "address",
    "flatPlotNo",
    "landmark",
    "locality",
    "area",
    "city",
    "district",
    "state",
    "pinCode",
    "latitude",
    "longitude",
    "coordinates",
];

pub const RENTAL_FIELDS: &[&str] = &[
    "rentAmount",
    "rentNegotiable",
    "securityDeposit",
    "maintenanceCharges",
    "maintenanceChargeType",
    "availableFrom",
    "preferredTenants",
    "leaseDuration",
    "lockInPeriod",
    "furnishingStatus",
];

pub const SALE_FIELDS: &[&str] = &[
    "expectedPrice",
    "priceNegotiable",
    "maintenanceCost",
    "availableFrom",
    "furnishingStatus",
    "possessionStatus",
    "ownershipType",
];

pub const FEATURES_FIELDS: &[&str] = &[
    "amenities",
    "parking",
    "petFriendly",
    "nonVegAllowed",
    "waterSupply",
    "powerBackup",
    "gatedSecurity",
    "propertyShowOption",
    "description",
];

pub const FLATMATE_FIELDS: &[&str] = &[
    "preferredGender",
    "occupancy",
    "foodPreference",
    "tenantType",
    "roomSharing",
    "maxFlatmates",
    "currentFlatmates",
    "rentAmount",
    "securityDeposit",
    "availableFrom",
    "furnishingStatus",
];

pub const PG_FIELDS: &[&str] = &[
    "pgName",
    "rentAmount",
    "securityDeposit",
    "mealOption",
    "genderPreference",
    "occupancyTypes",
    "noticePeriod",
    "gateClosingTime",
    "pgRules",
    "availableServices",
    "availableFrom",
];

pub const COWORKING_FIELDS: &[&str] = &[
    "spaceType",
    "totalSeats",
    "availableSeats",
    "pricePerSeat",
    "minimumCommitment",
    "operatingHours",
    "meetingRooms",
    "cabins",
    "securityDeposit",
    "availableFrom",
];

pub const LAND_FEATURES_FIELDS: &[&str] = &[
    "approvalStatus",
    "boundaryWall",
    "cornerPlot",
    "roadWidth",
    "roadWidthUnit",
    "waterAvailability",
    "electricityStatus",
    "nearbyDevelopments",
];

const NO_FIELDS: SectionSources = SectionSources {
    fields: &[],
    flow_objects: &[],
    legacy_objects: &[],
};

pub fn sources(section: StepSection) -> &'static SectionSources {
    const BASIC: SectionSources = SectionSources {
        fields: BASIC_DETAILS_FIELDS,
        flow_objects: &["basicDetails"],
        legacy_objects: &["propertyDetails", "details", "property"],
    };
    const ROOM: SectionSources = SectionSources {
        fields: ROOM_DETAILS_FIELDS,
        flow_objects: &["roomDetails"],
        legacy_objects: &["basicDetails", "propertyDetails"],
    };
    const LAND: SectionSources = SectionSources {
        fields: LAND_DETAILS_FIELDS,
        flow_objects: &["landDetails"],
        legacy_objects: &["basicDetails", "plotDetails", "propertyDetails"],
    };
    const LOCATION: SectionSources = SectionSources {
        fields: LOCATION_FIELDS,
        flow_objects: &["location"],
        legacy_objects: &["locationDetails", "addressDetails"],
    };
    const RENTAL: SectionSources = SectionSources {
        fields: RENTAL_FIELDS,
        flow_objects: &["rental"],
        legacy_objects: &["rentalDetails", "rentDetails", "rent"],
    };
    const SALE: SectionSources = SectionSources {
        fields: SALE_FIELDS,
        flow_objects: &["sale"],
        legacy_objects: &["saleDetails", "priceDetails", "pricing"],
    };
    const FEATURES: SectionSources = SectionSources {
        fields: FEATURES_FIELDS,
        flow_objects: &["features"],
        legacy_objects: &["featureDetails", "amenitiesDetails", "additionalDetails"],
    };
    const FLATMATE: SectionSources = SectionSources {
        fields: FLATMATE_FIELDS,
        flow_objects: &["flatmate"],
        legacy_objects: &["flatmateDetails", "flatmates", "flatmatePreferences"],
    };
    const PG: SectionSources = SectionSources {
        fields: PG_FIELDS,
        flow_objects: &["pg"],
        legacy_objects: &["pgDetails", "pgHostelDetails", "hostel"],
    };
    const COWORKING: SectionSources = SectionSources {
        fields: COWORKING_FIELDS,
        flow_objects: &["coworking"],
        legacy_objects: &["coworkingDetails", "coworkingSpace"],
    };
    const LAND_FEATURES: SectionSources = SectionSources {
        fields: LAND_FEATURES_FIELDS,
        flow_objects: &["landFeatures"],
        legacy_objects: &["landFeatureDetails", "plotFeatures"],
    };

    match section {
        StepSection::BasicDetails => &BASIC,
        StepSection::RoomDetails => &ROOM,
        StepSection::LandDetails => &LAND,
        StepSection::Location => &LOCATION,
        StepSection::Rental => &RENTAL,
        StepSection::Sale => &SALE,
        StepSection::Features => &FEATURES,
        StepSection::Flatmate => &FLATMATE,
        StepSection::PgDetails => &PG,
        StepSection::Coworking => &COWORKING,
        StepSection::LandFeatures => &LAND_FEATURES,
        StepSection::Review | StepSection::Photos => &NO_FIELDS,
    }
}

/// Root keys that are never treated as section data.
pub const RESERVED_ROOT_KEYS: &[&str] = &["steps", "flow", "meta", "media"];

static SECTION_PATTERNS: OnceLock<HashMap<StepSection, Regex>> = OnceLock::new();
static STEP_ID_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Returns true when a root-level object key looks like it holds data for `section`,
/// e.g. `rentalInfo` or `pg_details_v1`.
pub fn root_key_matches(section: StepSection, key: &str) -> bool {
    section_patterns()
        .get(&section)
        .map(|pattern| pattern.is_match(key))
        .unwrap_or(false)
}

fn section_patterns() -> &'static HashMap<StepSection, Regex> {
    SECTION_PATTERNS.get_or_init(|| {
        const PATTERNS: &[(StepSection, &str)] = &[
            (StepSection::BasicDetails, r"(?i)^(basic|property)[_-]?(details|info|data)(_v\d+)?$"),
            (StepSection::RoomDetails, r"(?i)^rooms?[_-]?(details|info|data)(_v\d+)?$"),
            (StepSection::LandDetails, r"(?i)^(land|plot)[_-]?(details|info|data)(_v\d+)?$"),
            (StepSection::Location, r"(?i)^(location|address)[_-]?(details|info|data)?(_v\d+)?$"),
            (StepSection::Rental, r"(?i)^rent(al)?[_-]?(details|info|data|terms)?(_v\d+)?$"),
            (StepSection::Sale, r"(?i)^(sale|sell|price|pricing)[_-]?(details|info|data)?(_v\d+)?$"),
            (StepSection::Features, r"(?i)^(features?|amenit(y|ies))[_-]?(details|info|data)?(_v\d+)?$"),
            (StepSection::Flatmate, r"(?i)^flat[_-]?mates?[_-]?(details|info|data|preferences)?(_v\d+)?$"),
            (StepSection::PgDetails, r"(?i)^(pg|hostel|pg[_-]?hostel)[_-]?(details|info|data)?(_v\d+)?$"),
            (StepSection::Coworking, r"(?i)^co[_-]?working[_-]?(details|info|data|space)?(_v\d+)?$"),
            (StepSection::LandFeatures, r"(?i)^(land|plot)[_-]?features?(_v\d+)?$"),
        ];

        let mut map = HashMap::with_capacity(PATTERNS.len());
        for (section, pattern) in PATTERNS {
            if let Ok(regex) = Regex::new(pattern) {
                map.insert(*section, regex);
            }
        }
        map
    })
}

/// Splits a step id such as `com_rent_rental` into its flow prefix and suffix.
pub fn split_step_id(key: &str) -> Option<(&str, &str)> {
    let pattern = STEP_ID_PATTERN
        .get_or_init(|| {
            Regex::new(r"^((?:res|com|land)_(?:rent|sale|flat|pg|cow))_([a-z_]+)$").ok()
        })
        .as_ref()?;
    let captures = pattern.captures(key)?;
    let prefix = captures.get(1)?.as_str();
    let suffix = captures.get(2)?.as_str();
    Some((prefix, suffix))
}
