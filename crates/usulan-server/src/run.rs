use crate::config::ServerConfig;
use crate::error::Result;
use axum::http::StatusCode;
use axum::{Router, response::IntoResponse, routing::get};
use futures::FutureExt;
use tracing::{debug, info};
use usulan_app::state::{AppConfig, AppState};
use usulan_store::file_store::FileStore;

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if !args.no_cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

fn main_router(state: AppState) -> Router<()> {
    let upload_limit_kb = state.config().upload_limit_kb;
    Router::new()
        .nest(
            "/usulan-buku",
            usulan_app::rest_api::usulan::router(upload_limit_kb),
        )
        .nest("/storage", usulan_app::rest_api::storage::router())
        .with_state(state)
        .route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let app_config = AppConfig {
        base_url: config.base_url.clone(),
        file_store_path: config.files_dir(),
        default_page_size: config.default_page_size,
        upload_limit_kb: config.upload_limit_kb,
    };

    if !app_config.file_store_path.is_dir() {
        tokio::fs::create_dir_all(&app_config.file_store_path).await?;
        info!("Created directory for image files");
    }

    let pool = usulan_dal::new_pool(&config.database_url()).await?;
    usulan_dal::migrate(&pool).await?;

    let store = FileStore::new(&app_config.file_store_path);
    Ok(AppState::new(app_config, pool, store))
}
