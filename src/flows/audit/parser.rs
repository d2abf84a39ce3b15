use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One exported listing row. Empty cells read as absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ListingRow {
    #[serde(rename = "Listing ID")]
    pub(crate) listing_id: String,
    #[serde(rename = "URL Path", default, deserialize_with = "empty_string_as_none")]
    pub(crate) url_path: Option<String>,
    #[serde(rename = "Ad Type", default, deserialize_with = "empty_string_as_none")]
    pub(crate) ad_type: Option<String>,
    #[serde(rename = "Category", default, deserialize_with = "empty_string_as_none")]
    pub(crate) category: Option<String>,
    #[serde(
        rename = "Listing Type",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) listing_type: Option<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ListingRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<ListingRow>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
