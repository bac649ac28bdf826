//! # tessera-server
//!
//! HTTP API for managing skills:
//!
//! - `GET /health`
//! - `GET|POST /api/v1/skills`, `GET|DELETE /api/v1/skills/{name}`
//! - `POST /api/v1/skills/{name}/validate`
//! - `GET /api/v1/skills/{name}/files`, `GET|PUT|DELETE /api/v1/skills/{name}/files/{file}`
//!
//! `/api/v1/*` requires `Authorization: Bearer <key>` when `server.api_key` is set.

pub mod error;
pub mod skills;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use tessera_config::{ServerConfig, SkillsConfig};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared server state.
pub struct AppState {
    pub config: ServerConfig,
    /// Scan roots and the writable user root.
    pub skills: SkillsConfig,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Build the Axum router.
pub fn build_router(config: ServerConfig, skills: SkillsConfig) -> Router {
    let state = Arc::new(AppState {
        config: config.clone(),
        skills,
    });

    let api_routes = Router::new()
        .route(
            "/api/v1/skills",
            get(skills::list_skills).post(skills::create_skill),
        )
        .route(
            "/api/v1/skills/{name}",
            get(skills::get_skill).delete(skills::delete_skill),
        )
        .route("/api/v1/skills/{name}/validate", post(skills::validate_skill))
        .route("/api/v1/skills/{name}/files", get(skills::list_files))
        .route(
            "/api/v1/skills/{name}/files/{file}",
            get(skills::get_file)
                .put(skills::put_file)
                .delete(skills::delete_file),
        );

    // Apply API key auth if configured
    let api_routes = if config.api_key.is_some() {
        api_routes.layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
    } else {
        api_routes
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(api_routes)
        .with_state(state);

    if config.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(ref expected_key) = state.config.api_key {
        let provided = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match provided {
            Some(key) if key == expected_key => {}
            _ => {
                warn!(path = %request.uri().path(), "unauthorized API request, invalid or missing API key");
                return Err(StatusCode::UNAUTHORIZED);
            }
        }
    }
    Ok(next.run(request).await)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Bind `config.listen` and serve until the process exits.
pub async fn start_server(config: ServerConfig, skills: SkillsConfig) -> tessera_core::Result<()> {
    let listen = config.listen.clone();
    let roots = skills.roots();
    let router = build_router(config, skills);

    info!(listen = %listen, roots = ?roots, "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&listen).await.map_err(|e| {
        std::io::Error::new(e.kind(), format!("failed to bind {listen}: {e}"))
    })?;

    axum::serve(listener, router)
        .await
        .map_err(|e| std::io::Error::new(e.kind(), format!("server error: {e}")))?;

    Ok(())
}
