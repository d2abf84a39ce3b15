use super::domain::{is_present, FlowContext, FlowType, FormState, ListingType, PropertyCategory};

/// Lower-cased URL path split into segments; query and fragment are kept for
/// substring checks only.
#[derive(Debug, Clone)]
pub(crate) struct UrlSignals {
    lowered: String,
    segments: Vec<String>,
}

impl UrlSignals {
    pub(crate) fn parse(url: &str) -> Self {
        let lowered = url.trim().to_ascii_lowercase();
        let path = lowered.split(['?', '#']).next().unwrap_or_default();
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        Self { lowered, segments }
    }

    pub(crate) fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.lowered.contains(needle))
    }

    pub(crate) fn has_segment(&self, names: &[&str]) -> bool {
        self.segments
            .iter()
            .any(|segment| names.contains(&segment.as_str()))
    }
}

/// Independent checks a flow service runs, in order of confidence.
pub(crate) struct DetectionRules {
    pub(crate) url: fn(&UrlSignals) -> bool,
    pub(crate) context: fn(&FlowContext) -> bool,
    pub(crate) ad_type: fn(&str) -> bool,
}

pub(crate) fn never(_: &FlowContext) -> bool {
    false
}

/// Explicit metadata, then URL, then context flags, then ad type, then any
/// non-empty step written under this flow's prefix. First satisfied rule wins.
pub(crate) fn detect(
    flow: FlowType,
    rules: &DetectionRules,
    form: &FormState,
    context: &FlowContext,
) -> bool {
    if explicit_flow(form) == Some(flow) {
        return true;
    }

    let url = UrlSignals::parse(&context.url_path);
    if (rules.url)(&url) {
        return true;
    }

    if (rules.context)(context) {
        return true;
    }

    if let Some(ad_type) = ad_type(form, context) {
        if (rules.ad_type)(&ad_type) {
            return true;
        }
    }

    has_step_content(form, flow.step_prefix())
}

/// Flow declared on the form itself: `flowType`, or `category` + `listingType`.
pub(crate) fn explicit_flow(form: &FormState) -> Option<FlowType> {
    if let Some(flow) = form.flow_field("flowType").and_then(FlowType::parse) {
        return Some(flow);
    }

    let category = form
        .flow_field("category")
        .and_then(PropertyCategory::parse)?;
    let listing_type = form
        .flow_field("listingType")
        .and_then(ListingType::parse)?;
    FlowType::from_parts(category, listing_type)
}

/// Ad type exactly as supplied, from the context first, then the form.
pub(crate) fn raw_ad_type<'a>(form: &'a FormState, context: &'a FlowContext) -> Option<&'a str> {
    context
        .ad_type
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| form.flow_field("adType"))
}

/// Lower-cased form of [`raw_ad_type`], used for matching.
pub(crate) fn ad_type(form: &FormState, context: &FlowContext) -> Option<String> {
    raw_ad_type(form, context).map(|value| value.trim().to_ascii_lowercase())
}

pub(crate) fn has_step_content(form: &FormState, prefix: &str) -> bool {
    let Some(steps) = form.steps() else {
        return false;
    };
    let prefix = format!("{prefix}_");
    steps.iter().any(|(key, value)| {
        key.starts_with(&prefix)
            && value
                .as_object()
                .is_some_and(|step| step.values().any(is_present))
    })
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
