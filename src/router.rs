use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::flows::{
    FlowContext, FlowServiceFactory, FlowType, FormState, ListingType, PropertyCategory,
    StepDefinition,
};
use crate::wizard::{WizardPaths, WizardSession};

#[derive(Debug, Clone)]
pub struct ListingState {
    pub paths: WizardPaths,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    #[serde(default)]
    pub form_data: FormState,
    #[serde(default)]
    pub context: FlowContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeRequest {
    #[serde(default)]
    pub form_data: FormState,
    #[serde(default)]
    pub context: FlowContext,
    #[serde(default)]
    pub flow_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsRequest {
    #[serde(default)]
    pub form_data: FormState,
    #[serde(default)]
    pub context: FlowContext,
    #[serde(default)]
    pub current_step: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationView {
    pub flow_type: FlowType,
    pub category: PropertyCategory,
    pub listing_type: ListingType,
    pub label: &'static str,
}

impl From<FlowType> for ClassificationView {
    fn from(flow: FlowType) -> Self {
        Self {
            flow_type: flow,
            category: flow.category(),
            listing_type: flow.listing_type(),
            label: flow.label(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStepsView {
    pub flow_type: FlowType,
    pub steps: &'static [StepDefinition],
}

/// Router exposing classification, normalization, and wizard navigation.
pub fn listing_router(paths: WizardPaths) -> Router {
    Router::new()
        .route("/api/v1/listings/classify", post(classify_handler))
        .route("/api/v1/listings/normalize", post(normalize_handler))
        .route("/api/v1/listings/steps", post(steps_handler))
        .route("/api/v1/flows/:flow_type/steps", get(flow_steps_handler))
        .with_state(Arc::new(ListingState { paths }))
}

pub(crate) async fn classify_handler(axum::Json(request): axum::Json<ClassifyRequest>) -> Response {
    match FlowServiceFactory::get_flow_service(&request.form_data, &request.context) {
        Ok(service) => {
            let view = ClassificationView::from(service.flow_type());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn normalize_handler(axum::Json(request): axum::Json<NormalizeRequest>) -> Response {
    let service = match request.flow_type.as_deref() {
        Some(flow_type) => FlowServiceFactory::get_flow_service_by_type(flow_type),
        None => FlowServiceFactory::get_flow_service(&request.form_data, &request.context),
    };

    match service {
        Ok(service) => {
            debug!(flow = %service.flow_type(), "normalizing listing");
            let document = service.format_data(&request.form_data);
            (StatusCode::OK, axum::Json(document)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn steps_handler(
    State(state): State<Arc<ListingState>>,
    axum::Json(request): axum::Json<StepsRequest>,
) -> Response {
    let mut session = WizardSession::new(request.form_data, request.context, state.paths.clone());
    if let Some(step) = request.current_step.as_deref() {
        session.go_to_step(step);
    }
    (StatusCode::OK, axum::Json(session.snapshot())).into_response()
}

pub(crate) async fn flow_steps_handler(Path(flow_type): Path<String>) -> Response {
    match FlowServiceFactory::get_flow_service_by_type(&flow_type) {
        Ok(service) => {
            let view = FlowStepsView {
                flow_type: service.flow_type(),
                steps: service.step_sequence(),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}
