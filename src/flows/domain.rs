use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Field name to value mapping held by a single wizard step.
pub type StepData = Map<String, Value>;

/// Broad property category chosen at the start of the listing wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    Residential,
    Commercial,
    Land,
}

impl PropertyCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Land => "land",
        }
    }

    /// Prefix used when building step identifiers.
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Residential => "res",
            Self::Commercial => "com",
            Self::Land => "land",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Commercial => "Commercial",
            Self::Land => "Land",
        }
    }

    /// Parses a category, accepting the tolerated aliases.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "residential" | "res" => Some(Self::Residential),
            "commercial" | "com" => Some(Self::Commercial),
            "land" | "plot" => Some(Self::Land),
            _ => None,
        }
    }
}

/// How the property is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingType {
    #[serde(rename = "rent")]
    Rent,
    #[serde(rename = "sale")]
    Sale,
    #[serde(rename = "flatmates")]
    Flatmates,
    #[serde(rename = "pghostel")]
    PgHostel,
    #[serde(rename = "coworking")]
    Coworking,
}

impl ListingType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Sale => "sale",
            Self::Flatmates => "flatmates",
            Self::PgHostel => "pghostel",
            Self::Coworking => "coworking",
        }
    }

    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Sale => "sale",
            Self::Flatmates => "flat",
            Self::PgHostel => "pg",
            Self::Coworking => "cow",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rent => "Rent",
            Self::Sale => "Sale",
            Self::Flatmates => "Flatmates",
            Self::PgHostel => "PG/Hostel",
            Self::Coworking => "Coworking",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "rent" | "rental" => Some(Self::Rent),
            "sale" | "sell" => Some(Self::Sale),
            "flatmates" | "flatmate" | "flat" => Some(Self::Flatmates),
            "pghostel" | "pg_hostel" | "pg" | "hostel" => Some(Self::PgHostel),
            "coworking" | "co_working" | "cowork" | "cow" => Some(Self::Coworking),
            _ => None,
        }
    }
}

/// Every listing flow the wizard supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlowType {
    #[serde(rename = "residential_rent")]
    ResidentialRent,
    #[serde(rename = "residential_sale")]
    ResidentialSale,
    #[serde(rename = "residential_flatmates")]
    ResidentialFlatmates,
    #[serde(rename = "residential_pghostel")]
    ResidentialPgHostel,
    #[serde(rename = "commercial_rent")]
    CommercialRent,
    #[serde(rename = "commercial_sale")]
    CommercialSale,
    #[serde(rename = "commercial_coworking")]
    CommercialCoworking,
    #[serde(rename = "land_sale")]
    LandSale,
}

impl FlowType {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::ResidentialRent,
            Self::ResidentialSale,
            Self::ResidentialFlatmates,
            Self::ResidentialPgHostel,
            Self::CommercialRent,
            Self::CommercialSale,
            Self::CommercialCoworking,
            Self::LandSale,
        ]
    }

    pub const fn category(self) -> PropertyCategory {
        match self {
            Self::ResidentialRent
            | Self::ResidentialSale
            | Self::ResidentialFlatmates
            | Self::ResidentialPgHostel => PropertyCategory::Residential,
            Self::CommercialRent | Self::CommercialSale | Self::CommercialCoworking => {
                PropertyCategory::Commercial
            }
            Self::LandSale => PropertyCategory::Land,
        }
    }

    pub const fn listing_type(self) -> ListingType {
        match self {
            Self::ResidentialRent | Self::CommercialRent => ListingType::Rent,
            Self::ResidentialSale | Self::CommercialSale | Self::LandSale => ListingType::Sale,
            Self::ResidentialFlatmates => ListingType::Flatmates,
            Self::ResidentialPgHostel => ListingType::PgHostel,
            Self::CommercialCoworking => ListingType::Coworking,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResidentialRent => "residential_rent",
            Self::ResidentialSale => "residential_sale",
            Self::ResidentialFlatmates => "residential_flatmates",
            Self::ResidentialPgHostel => "residential_pghostel",
            Self::CommercialRent => "commercial_rent",
            Self::CommercialSale => "commercial_sale",
            Self::CommercialCoworking => "commercial_coworking",
            Self::LandSale => "land_sale",
        }
    }

    /// `{category_abbrev}_{listingType_abbrev}`, shared by every step id of the flow.
    pub const fn step_prefix(self) -> &'static str {
        match self {
            Self::ResidentialRent => "res_rent",
            Self::ResidentialSale => "res_sale",
            Self::ResidentialFlatmates => "res_flat",
            Self::ResidentialPgHostel => "res_pg",
            Self::CommercialRent => "com_rent",
            Self::CommercialSale => "com_sale",
            Self::CommercialCoworking => "com_cow",
            Self::LandSale => "land_sale",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ResidentialRent => "Residential Rent",
            Self::ResidentialSale => "Residential Sale",
            Self::ResidentialFlatmates => "Residential Flatmates",
            Self::ResidentialPgHostel => "PG/Hostel",
            Self::CommercialRent => "Commercial Rent",
            Self::CommercialSale => "Commercial Sale",
            Self::CommercialCoworking => "Commercial Coworking",
            Self::LandSale => "Land Sale",
        }
    }

    pub fn from_parts(category: PropertyCategory, listing_type: ListingType) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|flow| flow.category() == category && flow.listing_type() == listing_type)
    }

    /// Parses a canonical flow key or one of its aliases (`residential_sell`,
    /// `res_pg_hostel`, `commercial_co-working`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_token(raw);
        if let Some(flow) = Self::ordered()
            .into_iter()
            .find(|flow| flow.as_str() == normalized)
        {
            return Some(flow);
        }

        let (category, listing_type) = normalized.split_once('_')?;
        Self::from_parts(
            PropertyCategory::parse(category)?,
            ListingType::parse(listing_type)?,
        )
    }

    pub fn known_keys() -> Vec<&'static str> {
        Self::ordered().into_iter().map(Self::as_str).collect()
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace([' ', '-', '/'], "_")
}

/// Moderation lifecycle of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Draft,
    PendingReview,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingReview => "Pending Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Lenient parse; unknown values read as a draft.
    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "pending_review" | "pending" | "in_review" => Self::PendingReview,
            "approved" | "published" | "active" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Draft,
        }
    }
}

/// Signals the wizard hands to every flow detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowContext {
    #[serde(default)]
    pub url_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sale_mode: Option<bool>,
    #[serde(
        default,
        rename = "isPGHostelMode",
        alias = "isPgHostelMode",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_pg_hostel_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_type: Option<String>,
    #[serde(flatten)]
    pub signals: Map<String, Value>,
}

impl FlowContext {
    pub fn from_url(url_path: impl Into<String>) -> Self {
        Self {
            url_path: url_path.into(),
            ..Self::default()
        }
    }

    pub fn with_ad_type(mut self, ad_type: impl Into<String>) -> Self {
        self.ad_type = Some(ad_type.into());
        self
    }

    pub fn with_sale_mode(mut self, enabled: bool) -> Self {
        self.is_sale_mode = Some(enabled);
        self
    }

    pub fn with_pg_hostel_mode(mut self, enabled: bool) -> Self {
        self.is_pg_hostel_mode = Some(enabled);
        self
    }

    pub fn sale_mode(&self) -> bool {
        self.is_sale_mode.unwrap_or(false)
    }

    pub fn pg_hostel_mode(&self) -> bool {
        self.is_pg_hostel_mode.unwrap_or(false)
    }
}

/// In-progress wizard state. The same logical field may appear at the root, in
/// nested legacy objects, or under `steps`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState(Map<String, Value>);

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-object payloads become an empty form.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Root-level value that is actually present (see [`is_present`]).
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| is_present(value))
    }

    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    pub fn steps(&self) -> Option<&Map<String, Value>> {
        self.object("steps")
    }

    pub fn step(&self, step_id: &str) -> Option<&Map<String, Value>> {
        self.steps()
            .and_then(|steps| steps.get(step_id))
            .and_then(Value::as_object)
    }

    /// Reads a flow metadata field from `flow.{name}` first, then from the root.
    pub fn flow_field(&self, name: &str) -> Option<&str> {
        self.object("flow")
            .and_then(|flow| flow.get(name))
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                self.0
                    .get(name)
                    .and_then(Value::as_str)
                    .filter(|value| !value.trim().is_empty())
            })
    }
}

impl From<Map<String, Value>> for FormState {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// A value counts as present unless it is `null` or a blank string.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    }
}

/// Listing bookkeeping carried alongside the step data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingMeta {
    pub id: Option<String>,
    pub owner: Option<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDescriptor {
    pub category: PropertyCategory,
    pub listing_type: ListingType,
    pub flow_type: FlowType,
}

impl From<FlowType> for FlowDescriptor {
    fn from(flow_type: FlowType) -> Self {
        Self {
            category: flow_type.category(),
            listing_type: flow_type.listing_type(),
            flow_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingMedia {
    pub photos: Vec<Value>,
    pub videos: Vec<Value>,
}

/// Canonical, step-keyed listing document handed to the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedForm {
    pub meta: ListingMeta,
    pub flow: FlowDescriptor,
    pub steps: BTreeMap<String, StepData>,
    pub media: ListingMedia,
}

impl NormalizedForm {
    pub fn step(&self, step_id: &str) -> Option<&StepData> {
        self.steps.get(step_id)
    }

    /// Rebuilds wizard state from the document so it can be edited and re-normalized.
    pub fn to_form_state(&self) -> FormState {
        let mut form = FormState::new();
        form.insert(
            "flow",
            serde_json::to_value(self.flow).unwrap_or(Value::Null),
        );
        let steps = self
            .steps
            .iter()
            .map(|(id, data)| (id.clone(), Value::Object(data.clone())))
            .collect::<Map<String, Value>>();
        form.insert("steps", Value::Object(steps));
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flow_type_parse_accepts_aliases() {
        assert_eq!(FlowType::parse("residential_sell"), Some(FlowType::ResidentialSale));
        assert_eq!(
            FlowType::parse("residential_pg_hostel"),
            Some(FlowType::ResidentialPgHostel)
        );
        assert_eq!(FlowType::parse("res_pg"), Some(FlowType::ResidentialPgHostel));
        assert_eq!(
            FlowType::parse("Commercial Co-Working"),
            Some(FlowType::CommercialCoworking)
        );
        assert_eq!(FlowType::parse("plot_sell"), Some(FlowType::LandSale));
        assert_eq!(FlowType::parse("land_rent"), None);
        assert_eq!(FlowType::parse("garbage"), None);
    }

    #[test]
    fn step_prefixes_parse_back_to_their_flow() {
        for flow in FlowType::ordered() {
            assert_eq!(FlowType::parse(flow.step_prefix()), Some(flow), "{}", flow.step_prefix());
        }
        assert_eq!(FlowType::parse("res_flat"), Some(FlowType::ResidentialFlatmates));
        assert_eq!(FlowType::parse("com_cow"), Some(FlowType::CommercialCoworking));
    }

    #[test]
    fn flow_type_serializes_to_canonical_key() {
        let value = serde_json::to_value(FlowType::ResidentialPgHostel).expect("serializes");
        assert_eq!(value, json!("residential_pghostel"));
        let descriptor = FlowDescriptor::from(FlowType::CommercialCoworking);
        assert_eq!(
            serde_json::to_value(descriptor).expect("serializes"),
            json!({
                "category": "commercial",
                "listingType": "coworking",
                "flowType": "commercial_coworking"
            })
        );
    }

    #[test]
    fn context_reads_camel_case_signals() {
        let context: FlowContext = serde_json::from_value(json!({
            "urlPath": "/properties/list/residential/rent/rental",
            "isPGHostelMode": true,
            "adType": "PG",
            "source": "mobile"
        }))
        .expect("context parses");

        assert!(context.pg_hostel_mode());
        assert!(!context.sale_mode());
        assert_eq!(context.ad_type.as_deref(), Some("PG"));
        assert_eq!(context.signals.get("source"), Some(&json!("mobile")));
    }

    #[test]
    fn blank_strings_are_not_present() {
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!("  ")));
        assert!(is_present(&json!(0)));
        assert!(is_present(&json!([])));
    }

    #[test]
    fn flow_field_prefers_nested_flow_metadata() {
        let form = FormState::from_value(json!({
            "flow": { "category": "commercial" },
            "category": "residential",
            "listingType": "rent"
        }));
        assert_eq!(form.flow_field("category"), Some("commercial"));
        assert_eq!(form.flow_field("listingType"), Some("rent"));
        assert_eq!(form.flow_field("flowType"), None);
    }

    #[test]
    fn listing_status_parses_leniently() {
        assert_eq!(ListingStatus::parse_lenient("pending"), ListingStatus::PendingReview);
        assert_eq!(ListingStatus::parse_lenient("Published"), ListingStatus::Approved);
        assert_eq!(ListingStatus::parse_lenient("archived"), ListingStatus::Draft);
    }
}
