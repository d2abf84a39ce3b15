use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use listing_flow::config::AppConfig;
use listing_flow::error::AppError;
use listing_flow::flows::{
    AuditOutcome, ClassificationAuditor, FlowContext, FlowService, FlowServiceFactory, FormState,
};
use listing_flow::telemetry;
use listing_flow::wizard::WizardPaths;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "listing-flow",
    about = "Classify, normalize, and sequence property listing wizard data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Detect which listing flow a form belongs to
    Classify(ClassifyArgs),
    /// Produce the canonical step-keyed document for a form
    Normalize(NormalizeArgs),
    /// Print the wizard steps of a flow
    Steps(StepsArgs),
    /// Check declared flows in a listing CSV export against the classifier
    Audit(AuditArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct ContextArgs {
    /// Wizard URL path the form was captured on
    #[arg(long)]
    url: Option<String>,
    /// Ad type label chosen by the owner
    #[arg(long)]
    ad_type: Option<String>,
    /// Treat the wizard as being in sale mode
    #[arg(long)]
    sale: bool,
    /// Treat the wizard as being in PG/Hostel mode
    #[arg(long)]
    pg_hostel: bool,
}

impl ContextArgs {
    fn context(&self) -> FlowContext {
        let mut context = FlowContext::from_url(self.url.clone().unwrap_or_default());
        if let Some(ad_type) = &self.ad_type {
            context = context.with_ad_type(ad_type.as_str());
        }
        if self.sale {
            context = context.with_sale_mode(true);
        }
        if self.pg_hostel {
            context = context.with_pg_hostel_mode(true);
        }
        context
    }
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Form state as inline JSON, or @path to a JSON file
    #[arg(long, default_value = "{}")]
    form: String,
    #[command(flatten)]
    context: ContextArgs,
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    /// Form state as inline JSON, or @path to a JSON file
    #[arg(long, default_value = "{}")]
    form: String,
    /// Skip detection and normalize as this flow
    #[arg(long)]
    flow_type: Option<String>,
    /// Copy stray root fields into their steps before normalizing
    #[arg(long)]
    migrate: bool,
    #[command(flatten)]
    context: ContextArgs,
}

#[derive(Args, Debug)]
struct StepsArgs {
    /// Flow key such as residential_rent or land_sale
    #[arg(long)]
    flow_type: String,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// CSV export with Listing ID, URL Path, Ad Type, Category, Listing Type columns
    #[arg(long)]
    csv: PathBuf,
    /// Print every row instead of only the problems
    #[arg(long)]
    all: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Classify(args) => run_classify(args),
        Command::Normalize(args) => run_normalize(args),
        Command::Steps(args) => run_steps(args),
        Command::Audit(args) => run_audit(args),
    }
}

fn read_form(raw: &str) -> Result<FormState, AppError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => raw.to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(&text)?;
    Ok(FormState::from_value(value))
}

fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let form = read_form(&args.form)?;
    let service = FlowServiceFactory::get_flow_service(&form, &args.context.context())?;
    let flow = service.flow_type();
    println!("{} ({})", flow, flow.label());
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let form = read_form(&args.form)?;
    let service: &dyn FlowService = match args.flow_type.as_deref() {
        Some(flow_type) => FlowServiceFactory::get_flow_service_by_type(flow_type)?,
        None => FlowServiceFactory::get_flow_service(&form, &args.context.context())?,
    };

    let form = if args.migrate {
        listing_flow::flows::BaseFlowService::new(service.flow_type())
            .migrate_root_fields_to_steps(&form)
    } else {
        form
    };

    let document = service.format_data(&form);
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn run_steps(args: StepsArgs) -> Result<(), AppError> {
    let service = FlowServiceFactory::get_flow_service_by_type(&args.flow_type)?;
    let flow = service.flow_type();
    let paths = WizardPaths::default();

    println!("{} steps", flow.label());
    for (index, step) in service.step_sequence().iter().enumerate() {
        println!(
            "{}. {} [{}] {}",
            index + 1,
            step.title,
            step.id,
            paths.create_url(flow, step.slug)
        );
    }
    Ok(())
}

fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let report = ClassificationAuditor::from_path(&args.csv)?;

    println!("Classification audit: {}", args.csv.display());
    println!(
        "{} matched, {} mismatched, {} undeclared, {} unclassified",
        report.matched(),
        report.mismatched(),
        report.undeclared(),
        report.unclassified()
    );

    let rows: Vec<_> = if args.all {
        report.entries.iter().collect()
    } else {
        report.problems().collect()
    };
    for entry in rows {
        let detail = match &entry.outcome {
            AuditOutcome::Match { flow_type } => format!("ok {flow_type}"),
            AuditOutcome::Mismatch { declared, detected } => {
                format!("declared {declared}, detected {detected}")
            }
            AuditOutcome::Undeclared { detected } => format!("undeclared, detected {detected}"),
            AuditOutcome::Unclassified { reason } => format!("unclassified: {reason}"),
        };
        println!("- {}: {}", entry.listing_id, detail);
    }
    Ok(())
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = build_app(state, config.wizard.paths()).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, base_path = %config.wizard.base_path, "listing flow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app(state: AppState, paths: WizardPaths) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(listing_flow::listing_router(paths))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: PrometheusBuilder::new().build_recorder().handle(),
        }
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let app = build_app(state(false), WizardPaths::default());
        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn listing_routes_are_mounted() {
        let app = build_app(state(true), WizardPaths::default());
        let response = app
            .oneshot(
                Request::get("/api/v1/flows/land_sale/steps")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn inline_form_json_is_parsed() {
        let form = read_form(r#"{"rentAmount": 50000}"#).expect("valid json");
        assert_eq!(form.get("rentAmount"), Some(&json!(50000)));
        assert!(matches!(read_form("{not json"), Err(AppError::Json(_))));
        assert!(matches!(read_form("@/definitely/missing.json"), Err(AppError::Io(_))));
    }

    #[test]
    fn context_flags_build_the_flow_context() {
        let args = ContextArgs {
            url: Some("/properties/list/residential/rent".into()),
            ad_type: None,
            sale: false,
            pg_hostel: true,
        };
        let context = args.context();
        assert!(context.pg_hostel_mode());
        assert!(!context.sale_mode());
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["listing-flow", "steps", "--flow-type", "land_sale"]);
        assert!(matches!(cli.command, Some(Command::Steps(ref args)) if args.flow_type == "land_sale"));
        let cli = Cli::parse_from(["listing-flow"]);
        assert!(cli.command.is_none());
    }
}
