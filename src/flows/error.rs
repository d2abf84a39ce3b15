use super::domain::FlowType;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// No detector matched. Carries whatever signals the caller supplied so
    /// a misconfigured listing can be traced.
    #[error(
        "unable to classify listing flow (url: {url_path:?}, ad type: {ad_type:?}, category: {category:?}, listing type: {listing_type:?}, flow type: {flow_type:?})"
    )]
    Unclassified {
        url_path: String,
        ad_type: Option<String>,
        category: Option<String>,
        listing_type: Option<String>,
        flow_type: Option<String>,
    },
    #[error("unknown flow type '{requested}'; expected one of: {}", .known.join(", "))]
    UnknownFlowType {
        requested: String,
        known: Vec<&'static str>,
    },
}

impl FlowError {
    pub(crate) fn unknown(requested: impl Into<String>) -> Self {
        Self::UnknownFlowType {
            requested: requested.into(),
            known: FlowType::known_keys(),
        }
    }
}
