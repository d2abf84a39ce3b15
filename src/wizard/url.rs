use crate::flows::{FlowType, ListingType, PropertyCategory};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_PATH: &str = "/properties/list";
pub const DEFAULT_EDIT_BASE_PATH: &str = "/properties";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("create url for step '{step}' needs a property category")]
    MissingCategory { step: String },
    #[error("create url for step '{step}' needs a listing type")]
    MissingListingType { step: String },
    #[error("edit url for step '{step}' needs a property id")]
    MissingPropertyId { step: String },
}

/// Route prefixes the wizard lives under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardPaths {
    pub base_path: String,
    pub edit_base_path: String,
}

impl Default for WizardPaths {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH, DEFAULT_EDIT_BASE_PATH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardMode {
    Create,
    Edit,
    #[default]
    Unknown,
}

/// What a wizard URL says about the listing being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUrlInfo {
    pub mode: WizardMode,
    pub category: Option<PropertyCategory>,
    pub listing_type: Option<ListingType>,
    pub step: Option<String>,
    pub property_id: Option<String>,
}

impl PropertyUrlInfo {
    pub fn flow_type(&self) -> Option<FlowType> {
        FlowType::from_parts(self.category?, self.listing_type?)
    }
}

impl WizardPaths {
    pub fn new(base_path: impl Into<String>, edit_base_path: impl Into<String>) -> Self {
        Self {
            base_path: trim_path(base_path.into()),
            edit_base_path: trim_path(edit_base_path.into()),
        }
    }

    /// Reads `{base}/{category}/{listingType}/{step}` or
    /// `{edit_base}/{id}/edit?step={step}`. Anything else yields `Unknown`.
    pub fn property_info_from_url(&self, url: &str) -> PropertyUrlInfo {
        let (path, query) = match url.trim().split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url.trim(), None),
        };
        let path = path.split('#').next().unwrap_or_default();
        let query_step = query.and_then(step_param);

        if let Some(rest) = strip_prefix_segments(path, &self.base_path) {
            let mut segments = rest.into_iter();
            return PropertyUrlInfo {
                mode: WizardMode::Create,
                category: segments.next().and_then(PropertyCategory::parse),
                listing_type: segments.next().and_then(ListingType::parse),
                step: segments.next().map(str::to_owned).or(query_step),
                property_id: None,
            };
        }

        if let Some(rest) = strip_prefix_segments(path, &self.edit_base_path) {
            if let [id, "edit", tail @ ..] = rest.as_slice() {
                return PropertyUrlInfo {
                    mode: WizardMode::Edit,
                    category: None,
                    listing_type: None,
                    step: query_step.or_else(|| tail.first().map(|step| (*step).to_owned())),
                    property_id: Some((*id).to_owned()),
                };
            }
        }

        PropertyUrlInfo {
            step: query_step,
            ..PropertyUrlInfo::default()
        }
    }

    /// Builds the URL that shows `slug` for the listing described by `info`.
    /// Anything not in edit mode is treated as a create flow.
    pub fn url_for_step(&self, info: &PropertyUrlInfo, slug: &str) -> Result<String, UrlError> {
        if info.mode == WizardMode::Edit {
            let id = info
                .property_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| UrlError::MissingPropertyId { step: slug.to_owned() })?;
            return Ok(format!("{}/{}/edit?step={}", self.edit_base_path, id, slug));
        }

        let category = info
            .category
            .ok_or_else(|| UrlError::MissingCategory { step: slug.to_owned() })?;
        let listing_type = info
            .listing_type
            .ok_or_else(|| UrlError::MissingListingType { step: slug.to_owned() })?;
        Ok(format!(
            "{}/{}/{}/{}",
            self.base_path,
            category.as_str(),
            listing_type.as_str(),
            slug
        ))
    }

    pub fn create_url(&self, flow: FlowType, slug: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_path,
            flow.category().as_str(),
            flow.listing_type().as_str(),
            slug
        )
    }
}

pub fn property_info_from_url(url: &str) -> PropertyUrlInfo {
    WizardPaths::default().property_info_from_url(url)
}

pub fn url_for_step(info: &PropertyUrlInfo, slug: &str) -> Result<String, UrlError> {
    WizardPaths::default().url_for_step(info, slug)
}

fn trim_path(path: String) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Path segments after `prefix`, or `None` when the path is not under it.
fn strip_prefix_segments<'a>(path: &'a str, prefix: &str) -> Option<Vec<&'a str>> {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    for expected in prefix.split('/').filter(|segment| !segment.is_empty()) {
        let segment = segments.next()?;
        if !segment.eq_ignore_ascii_case(expected) {
            return None;
        }
    }
    Some(segments.collect())
}

fn step_param(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "step")
        .map(|(_, value)| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
