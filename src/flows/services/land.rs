use super::{step_mut, FlowService};
use crate::flows::detect::{self, contains_any, DetectionRules, UrlSignals};
use crate::flows::domain::{is_present, FlowContext, FlowType, FormState, StepData};
use crate::flows::steps::{self, StepSection};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Used in generated titles when the listing has no city or locality yet.
pub const FALLBACK_PLACE: &str = "Prime Location";

#[derive(Debug, Clone, Copy, Default)]
pub struct LandSaleFlowService;

impl LandSaleFlowService {
    const RULES: DetectionRules = DetectionRules {
        url: |url: &UrlSignals| url.has_segment(&["land", "plot"]),
        context: detect::never,
        ad_type: |ad_type: &str| contains_any(ad_type, &["land", "plot"]),
    };
}

impl FlowService for LandSaleFlowService {
    fn flow_type(&self) -> FlowType {
        FlowType::LandSale
    }

    fn detect_flow(&self, form: &FormState, context: &FlowContext) -> bool {
        detect::detect(self.flow_type(), &Self::RULES, form, context)
    }

    fn enrich_steps(&self, steps: &mut BTreeMap<String, StepData>) {
        let place = steps::step_for_section(self.flow_type(), StepSection::Location)
            .and_then(|definition| steps.get(definition.id))
            .and_then(|location| text(location, "city").or_else(|| text(location, "locality")))
            .unwrap_or(FALLBACK_PLACE)
            .to_string();

        let Some(details) = step_mut(self.flow_type(), steps, StepSection::LandDetails) else {
            return;
        };

        if !details.get("builtUpArea").is_some_and(is_present) {
            let area = details
                .get("plotLength")
                .zip(details.get("plotWidth"))
                .and_then(|(length, width)| plot_area(length, width));
            if let Some(area) = area {
                details.insert("builtUpArea".to_string(), area);
                if !details.get("builtUpAreaUnit").is_some_and(is_present) {
                    let unit = area_unit(text(details, "plotDimensionUnit"));
                    details.insert("builtUpAreaUnit".to_string(), Value::from(unit));
                }
            }
        }

        if !details.get("title").is_some_and(is_present) {
            let land_type = text(details, "landType").unwrap_or("Land").to_string();
            details.insert(
                "title".to_string(),
                Value::from(format!("{land_type} for Sale in {place}")),
            );
        }
    }
}

fn text<'a>(step: &'a StepData, key: &str) -> Option<&'a str> {
    step.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Length x width. Integer inputs keep integer output.
fn plot_area(length: &Value, width: &Value) -> Option<Value> {
    if let (Some(length), Some(width)) = (as_integer(length), as_integer(width)) {
        if length > 0 && width > 0 {
            return length.checked_mul(width).map(Value::from);
        }
        return None;
    }

    let length = as_float(length)?;
    let width = as_float(width)?;
    if length <= 0.0 || width <= 0.0 {
        return None;
    }
    Number::from_f64(length * width).map(Value::Number)
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn area_unit(dimension_unit: Option<&str>) -> &'static str {
    match dimension_unit.map(str::to_ascii_lowercase).as_deref() {
        Some("m" | "meter" | "meters" | "metre" | "metres") => "sq.m",
        Some("yd" | "yard" | "yards") => "sq.yd",
        _ => "sq.ft",
    }
}
