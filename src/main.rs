//! Wiring & DI. Entry point: bootstrap adapters, inject into the service, serve HTTP.
//! No business logic here.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use stride_plan::adapters::ai::{MockAiAdapter, OpenAiAdapter};
use stride_plan::adapters::context::HttpContextAdapter;
use stride_plan::adapters::http::{AppState, build_app, serve};
use stride_plan::ports::{PlanningPort, TextGenerationPort, UserContextPort};
use stride_plan::shared::config::AppConfig;
use stride_plan::usecases::PlanService;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "stride_plan=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    let cfg = AppConfig::load();
    let json_logs = cfg.as_ref().is_ok_and(AppConfig::json_logs);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = cfg.unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    // --- Text generation ---
    let generator: Arc<dyn TextGenerationPort> = if cfg.use_mock_ai() {
        warn!("PLANNER_AI_MOCK set, using mock text generator");
        Arc::new(MockAiAdapter::new())
    } else {
        let api_key = cfg.ai_api_key();
        if api_key.is_none() {
            warn!("no generator API key (PLANNER_AI_API_KEY / MISTRAL_API_KEY); plan requests will fail");
        }
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "text generation via OpenAI-compatible adapter"
        );
        Arc::new(OpenAiAdapter::new(
            cfg.ai_api_url_or_default(),
            api_key.unwrap_or_default(),
            cfg.ai_model_or_default(),
        ))
    };

    // --- User context ---
    let context_url = cfg.context_api_url_or_default();
    info!(url = %context_url, "user context provider");
    let context: Arc<dyn UserContextPort> = Arc::new(HttpContextAdapter::new(context_url)?);

    // --- Service ---
    let timeout = cfg.request_timeout();
    info!(timeout_secs = timeout.as_secs(), "plan request timeout");
    let planner: Arc<dyn PlanningPort> = Arc::new(PlanService::new(
        generator,
        context,
        cfg.default_user_id_or_default(),
        timeout,
    ));

    // --- Run ---
    let app = build_app(AppState::new(planner));
    serve(app, &cfg.bind_addr()).await
}
