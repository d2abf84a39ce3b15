//! Batch check of the classifier against a CSV export of existing listings.
//! Each row's declared category and listing type is compared with what the
//! factory detects from the URL and ad type.

mod parser;

use super::detect;
use super::domain::{FlowContext, FlowType, FormState};
use super::factory::FlowServiceFactory;
use parser::ListingRow;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to read listing export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listing CSV data: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuditOutcome {
    Match { flow_type: FlowType },
    Mismatch { declared: FlowType, detected: FlowType },
    /// Classified, but the row declares no usable category and listing type.
    Undeclared { detected: FlowType },
    Unclassified { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub listing_id: String,
    pub url_path: Option<String>,
    #[serde(flatten)]
    pub outcome: AuditOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn matched(&self) -> usize {
        self.count(|outcome| matches!(outcome, AuditOutcome::Match { .. }))
    }

    pub fn mismatched(&self) -> usize {
        self.count(|outcome| matches!(outcome, AuditOutcome::Mismatch { .. }))
    }

    pub fn undeclared(&self) -> usize {
        self.count(|outcome| matches!(outcome, AuditOutcome::Undeclared { .. }))
    }

    pub fn unclassified(&self) -> usize {
        self.count(|outcome| matches!(outcome, AuditOutcome::Unclassified { .. }))
    }

    /// Rows that need attention: mismatches and unclassified listings.
    pub fn problems(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().filter(|entry| {
            matches!(
                entry.outcome,
                AuditOutcome::Mismatch { .. } | AuditOutcome::Unclassified { .. }
            )
        })
    }

    fn count(&self, predicate: impl Fn(&AuditOutcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.outcome))
            .count()
    }
}

pub struct ClassificationAuditor;

impl ClassificationAuditor {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<AuditReport, AuditError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<AuditReport, AuditError> {
        let entries = parser::parse_rows(reader)?
            .into_iter()
            .map(audit_row)
            .collect();
        Ok(AuditReport { entries })
    }
}

fn audit_row(row: ListingRow) -> AuditEntry {
    let (form, context) = classification_input(&row);
    let declared = detect::explicit_flow(&form);

    let outcome = match FlowServiceFactory::get_flow_service(&form, &context) {
        Ok(service) => {
            let detected = service.flow_type();
            match declared {
                Some(declared) if declared == detected => AuditOutcome::Match { flow_type: detected },
                Some(declared) => AuditOutcome::Mismatch { declared, detected },
                None => AuditOutcome::Undeclared { detected },
            }
        }
        Err(err) => {
            warn!(listing_id = %row.listing_id, error = %err, "listing could not be classified");
            AuditOutcome::Unclassified {
                reason: err.to_string(),
            }
        }
    };

    AuditEntry {
        listing_id: row.listing_id,
        url_path: row.url_path,
        outcome,
    }
}

/// Only the signals the export carries: the URL and ad type go into the
/// context, declared category and listing type become the form's flow block.
fn classification_input(row: &ListingRow) -> (FormState, FlowContext) {
    let mut flow = Map::new();
    if let Some(category) = &row.category {
        flow.insert("category".to_string(), Value::from(category.as_str()));
    }
    if let Some(listing_type) = &row.listing_type {
        flow.insert("listingType".to_string(), Value::from(listing_type.as_str()));
    }

    let mut form = FormState::new();
    if !flow.is_empty() {
        form.insert("flow", Value::Object(flow));
    }

    let mut context = FlowContext::from_url(row.url_path.clone().unwrap_or_default());
    if let Some(ad_type) = &row.ad_type {
        context = context.with_ad_type(ad_type.as_str());
    }
    (form, context)
}
