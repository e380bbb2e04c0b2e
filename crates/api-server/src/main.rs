use std::sync::Arc;

use api_server::http::{self, AppState};
use api_server::sweep::spawn_session_sweeper;
use shared::config::{ApiConfig, load_dotenv};
use shared::conversation::{ConversationOrchestrator, SessionStore};
use shared::fetch::HttpContentFetcher;
use shared::llm::ProviderRegistry;
use tokio::signal;
use tracing::{error, info, info_span, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "api_server=debug,shared=info,tower_http=info";

#[tokio::main]
async fn main() {
    let dotenv = load_dotenv();

    if let Err(err) = init_tracing() {
        eprintln!("failed to initialize logging: {err}");
        std::process::exit(1);
    }

    match dotenv {
        Ok(true) => info!("loaded environment from .env"),
        Ok(false) => {}
        Err(err) => warn!("ignoring unreadable .env file: {err}"),
    }

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let llm_client = match reqwest::Client::builder()
        .timeout(config.llm_request_timeout())
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            error!("failed to build llm http client: {err}");
            std::process::exit(1);
        }
    };

    let fetcher = match HttpContentFetcher::new(
        config.fetch_timeout(),
        info_span!("page_fetcher"),
    ) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(err) => {
            error!("failed to build page fetcher: {err}");
            std::process::exit(1);
        }
    };

    let registry = Arc::new(ProviderRegistry::from_config(
        &config.llm,
        llm_client,
        info_span!("provider_registry"),
    ));
    let store = SessionStore::new(info_span!("session_store"));
    let orchestrator = ConversationOrchestrator::new(
        store.clone(),
        registry,
        fetcher.clone(),
        config.default_provider,
        info_span!("conversation"),
    );

    let sweeper = spawn_session_sweeper(
        store.clone(),
        config.session_sweep_interval(),
        config.session_retention(),
    );
    info!(
        "session sweeper running every {}s (retention {}s)",
        config.session_sweep_interval_seconds, config.session_retention_seconds
    );

    let app = http::build_router(AppState {
        orchestrator,
        store,
        fetcher,
    });

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {err}", config.bind_addr);
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {} (default provider {})",
        listener.local_addr().unwrap_or(config.bind_addr),
        config.default_provider
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {err}");
    }

    sweeper.abort();
    info!("api server stopped");
}

fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    }
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
