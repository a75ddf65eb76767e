use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, FromRef, Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::{require_paste_scope, TokenKeys};
use crate::config::Config;
use crate::controllers::paste;
use crate::models::Paste;
use crate::storage::FileStorage;
use crate::types::api::PasteLink;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: FileStorage,
    pub keys: TokenKeys,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage = FileStorage::open(&config.directory)
            .await
            .context("failed to open paste directory")?;
        let keys = TokenKeys::new(&config.secret, &config.domain);

        Ok(AppState {
            config: Arc::new(config),
            storage,
            keys,
        })
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    if config.uses_default_secret() {
        warn!("using the built-in token secret, set JOTBIN_SECRET for real deployments");
    }

    let addr = SocketAddr::new(config.listen_addr, config.port);
    let state = AppState::new(config).await?;

    info!(
        "listening on http://{addr}, issuer '{}', pastes in {}",
        state.keys.issuer(),
        state.storage.dir().display()
    );

    axum::Server::bind(&addr)
        .serve(router(state).into_make_service())
        .await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/paste", post(upload_paste))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_paste_scope,
        ))
        .route("/get/:id", get(get_paste))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            state.config.limits.max_upload_size,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn upload_paste(
    State(config): State<Arc<Config>>,
    State(storage): State<FileStorage>,
    headers: HeaderMap,
    Json(data): Json<Paste>,
) -> crate::ApiResult<Json<PasteLink>> {
    let name = paste::create(&storage, &data).await?;

    let link = format!(
        "{scheme}://{domain}/get/{name}",
        scheme = request_scheme(&headers),
        domain = config.domain
    );

    Ok(Json(PasteLink { name, link }))
}

async fn get_paste(
    State(storage): State<FileStorage>,
    Path(id): Path<String>,
) -> crate::ApiResult<Json<Paste>> {
    Ok(Json(paste::fetch(&storage, &id).await?))
}

/// TLS is terminated in front of us, so trust the proxy's forwarded scheme.
fn request_scheme(headers: &HeaderMap) -> &'static str {
    let forwarded = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok());

    match forwarded {
        Some(proto) if proto.trim().eq_ignore_ascii_case("https") => "https",
        _ => "http",
    }
}
