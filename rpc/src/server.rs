//! Axum-based HTTP server.

use std::future::Future;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use kycgate_crypto::WebhookSecret;
use kycgate_types::UserId;
use kycgate_verification::KycService;

use crate::{handlers, RpcError, ServerConfig};

/// Request header naming the acting user.
pub const USER_HEADER: &str = "x-user-id";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: KycService,
    pub secret: Option<WebhookSecret>,
    pub signature_header: HeaderName,
    pub default_user: UserId,
    pub enable_simulation: bool,
}

impl AppState {
    pub fn from_config(service: KycService, config: &ServerConfig) -> Result<Self, RpcError> {
        let signature_header = HeaderName::from_bytes(config.signature_header.as_bytes())
            .map_err(|e| RpcError::Config(format!("signature_header: {e}")))?;
        let default_user = UserId::new(config.default_user.as_str())
            .map_err(|e| RpcError::Config(format!("default_user: {e}")))?;
        let secret = config.webhook_secret.as_deref().and_then(WebhookSecret::new);
        if secret.is_none() {
            warn!("no webhook secret configured, every webhook will be rejected");
        }
        Ok(Self {
            service,
            secret,
            signature_header,
            default_user,
            enable_simulation: config.enable_simulation,
        })
    }

    /// The user named by `X-User-Id`, or the default user when absent or blank.
    pub fn user(&self, headers: &HeaderMap) -> Result<UserId, RpcError> {
        let Some(value) = headers.get(USER_HEADER) else {
            return Ok(self.default_user.clone());
        };
        let value = value
            .to_str()
            .map_err(|_| RpcError::Validation("X-User-Id header is not valid text".into()))?;
        if value.trim().is_empty() {
            return Ok(self.default_user.clone());
        }
        Ok(UserId::new(value)?)
    }
}

/// All routes, without middleware.
///
/// The `/api/kyc` prefix is optional: `/status` and `/kyc/...` are aliases.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/kyc/status", get(handlers::get_status))
        .route("/status", get(handlers::get_status))
        .route("/api/kyc/:role/complete", post(handlers::complete))
        .route("/kyc/:role/complete", post(handlers::complete))
        .route("/api/kyc/simulate", post(handlers::simulate))
        .route("/kyc/simulate", post(handlers::simulate))
        .route("/webhooks/verification-provider", post(handlers::webhook))
        .route("/health", get(handlers::health))
        .with_state(state)
}

pub struct RpcServer {
    config: ServerConfig,
    state: AppState,
    cors_origin: HeaderValue,
}

impl RpcServer {
    pub fn new(config: ServerConfig, service: KycService) -> Result<Self, RpcError> {
        let state = AppState::from_config(service, &config)?;
        let cors_origin = HeaderValue::from_str(&config.cors_origin)
            .map_err(|e| RpcError::Config(format!("cors_origin: {e}")))?;
        Ok(Self {
            config,
            state,
            cors_origin,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Routes with CORS and request tracing.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(self.cors_origin.clone())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE, HeaderName::from_static(USER_HEADER)])
            .allow_credentials(true);

        routes(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!(%addr, "HTTP API listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("HTTP API stopped");
        Ok(())
    }
}
