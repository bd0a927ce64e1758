//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use kycgate_crypto::SignatureError;
use kycgate_types::KycError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("webhook authentication failed: {0}")]
    Authentication(String),

    #[error("simulation is disabled")]
    SimulationDisabled,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl RpcError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRole(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::SimulationDisabled => StatusCode::FORBIDDEN,
            Self::Internal(_) | Self::Config(_) | Self::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::Authentication(_) => "AUTHENTICATION_ERROR",
            Self::SimulationDisabled => "SIMULATION_DISABLED",
            Self::Internal(_) | Self::Config(_) | Self::Server(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Authentication failures and server faults get generic messages.
        let message = match &self {
            Self::Authentication(_) => "Invalid signature".to_string(),
            Self::Internal(_) | Self::Config(_) | Self::Server(_) => {
                error!(error = %self, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: message,
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<KycError> for RpcError {
    fn from(e: KycError) -> Self {
        match e {
            KycError::Validation(msg) => RpcError::Validation(msg),
            KycError::InvalidRole(role) => RpcError::InvalidRole(role),
            KycError::Authentication(msg) => RpcError::Authentication(msg),
            KycError::Internal(msg) => RpcError::Internal(msg),
        }
    }
}

impl From<SignatureError> for RpcError {
    fn from(e: SignatureError) -> Self {
        RpcError::Authentication(e.to_string())
    }
}
