//! Application startup and lifecycle management.

use crate::config::Config;
use crate::error::AppError;
use crate::handlers;
use crate::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use crate::services::editor::openai::OpenAiImageEditor;
use crate::services::editor::ImageEditor;
use crate::services::ImageStore;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Multipart bodies past this size are rejected before the handler runs.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: ImageStore,
    pub editor: Arc<dyn ImageEditor>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the OpenAI-backed editor.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let editor = OpenAiImageEditor::new(config.editor.clone());
        if editor.is_configured() {
            tracing::info!(model = %config.editor.model, "Initialized image editor");
        } else {
            tracing::warn!("OPENAI_API_KEY is not set; edit requests will fail");
        }
        Self::with_editor(config, Arc::new(editor)).await
    }

    /// Build the application around a caller-supplied editor. Tests inject
    /// a double through this.
    pub async fn with_editor(
        config: Config,
        editor: Arc<dyn ImageEditor>,
    ) -> Result<Self, AppError> {
        let store = ImageStore::new(&config.storage.upload_dir, &config.storage.edited_dir)
            .await
            .map_err(|e| {
                tracing::error!("Failed to initialize image store: {}", e);
                e
            })?;
        let edited_dir = store.edited_dir().to_path_buf();

        let state = AppState {
            config: config.clone(),
            store,
            editor,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics))
            .route(
                "/api/edit-image",
                post(handlers::edit_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
            )
            .nest_service("/edited_image", ServeDir::new(edited_dir))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(from_fn(metrics_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .layer(from_fn(request_id_middleware))
            .with_state(state);

        // Port 0 binds a random free port, which tests rely on.
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("image-edit-service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}
