//! Request handlers and their wire types.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use kycgate_crypto::verify_webhook_signature;
use kycgate_types::{CorrelationId, KycStatus, Role, Timestamp, VerificationRecord};
use kycgate_verification::WebhookEvent;

use crate::server::AppState;
use crate::RpcError;

// ── Status ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub role: Role,
    /// `null` until a session has been reported.
    pub status: Option<KycStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_reason: Option<String>,
}

impl StatusResponse {
    pub fn new(role: Role, record: VerificationRecord) -> Self {
        Self {
            role,
            status: record.status.reported(),
            correlation_id: record.correlation_id,
            completed_at: record.completed_at,
            decision_reason: record.decision_reason,
        }
    }

    /// An unset response, for callers that could not reach the server.
    pub fn unset(role: Role) -> Self {
        Self::new(role, VerificationRecord::default())
    }

    pub fn status(&self) -> KycStatus {
        self.status.unwrap_or_default()
    }
}

// ── Completion ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(alias = "inquiryId")]
    pub correlation_id: String,
    /// Raw vendor status, normalized server-side.
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ── Simulation ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub role: String,
    pub status: String,
}

// ── Webhook ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: Timestamp,
}

// ── Handlers ─────────────────────────────────────────────────────────────

fn parse_role(role: Option<&str>) -> Result<Role, RpcError> {
    match role {
        Some(role) => Ok(role.parse::<Role>()?),
        None => Err(RpcError::InvalidRole("missing role parameter".into())),
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    body.map(|Json(value)| value)
        .map_err(|e| RpcError::Validation(format!("invalid request body: {}", e.body_text())))
}

pub async fn get_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, RpcError> {
    let role = parse_role(query.role.as_deref())?;
    let user = state.user(&headers)?;
    let record = state.service.get_status(&user, role)?;
    Ok(Json(StatusResponse::new(role, record)))
}

pub async fn complete(
    State(state): State<AppState>,
    Path(role): Path<String>,
    headers: HeaderMap,
    body: Result<Json<CompleteRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, RpcError> {
    let role = parse_role(Some(role.as_str()))?;
    let request = json_body(body)?;
    let user = state.user(&headers)?;
    let outcome = state
        .service
        .complete_local(&user, role, &request.correlation_id, &request.status)?;
    debug!(user = %user, role = %role, ?outcome, "completion recorded");
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn simulate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SimulateRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, RpcError> {
    if !state.enable_simulation {
        return Err(RpcError::SimulationDisabled);
    }
    let request = json_body(body)?;
    let role = parse_role(Some(request.role.as_str()))?;
    let user = state.user(&headers)?;
    state.service.simulate_decision(&user, role, &request.status)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Vendor callback. The signature is checked against the exact bytes
/// received before anything is parsed.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, RpcError> {
    let signature = match headers.get(&state.signature_header) {
        Some(value) => Some(value.to_str().map_err(|_| {
            RpcError::Authentication("signature header is not valid text".into())
        })?),
        None => None,
    };
    if let Err(e) = verify_webhook_signature(state.secret.as_ref(), &body, signature) {
        warn!(error = %e, "rejected webhook");
        return Err(e.into());
    }

    debug!(payload = %String::from_utf8_lossy(&body), "authenticated webhook");
    let event = WebhookEvent::from_slice(&body)?;
    let report = state.service.apply_webhook(&event)?;
    info!(
        event_id = ?event.event_id(),
        matched = report.matched.len(),
        changed = report.changed.len(),
        ignored = report.ignored,
        "webhook processed"
    );
    Ok(Json(WebhookAck { received: true }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: state.service.now(),
    })
}
