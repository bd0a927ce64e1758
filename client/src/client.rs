//! HTTP client for the status API.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use kycgate_rpc::error::ErrorBody;
use kycgate_rpc::handlers::{
    CompleteRequest, HealthResponse, SimulateRequest, StatusResponse, SuccessResponse,
};
use kycgate_rpc::USER_HEADER;
use kycgate_session::{SessionError, StatusReporter};
use kycgate_types::{Role, UserId};

use crate::ClientError;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default pause between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Client for one API server, acting as one user.
#[derive(Clone)]
pub struct ApiClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    base_url: String,
    /// Sent as `X-User-Id`; the server's default user when `None`.
    user: Option<UserId>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: None,
        }
    }

    /// Act as `user` instead of the server's default user.
    pub fn as_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/kyc/status?role=`
    pub async fn fetch_status(&self, role: Role) -> Result<StatusResponse, ClientError> {
        let request = self
            .http_client
            .get(self.url("/api/kyc/status"))
            .query(&[("role", role.as_str())]);
        self.send(request).await
    }

    /// Like [`fetch_status`](Self::fetch_status), but any failure reads as
    /// unset so callers can keep gating on a definite value.
    pub async fn fetch_status_or_unset(&self, role: Role) -> StatusResponse {
        match self.fetch_status(role).await {
            Ok(status) => status,
            Err(e) => {
                warn!(role = %role, error = %e, "failed to fetch verification status");
                StatusResponse::unset(role)
            }
        }
    }

    /// Report a finished session. `status` is the raw vendor string.
    pub async fn complete(
        &self,
        role: Role,
        correlation_id: &str,
        status: &str,
    ) -> Result<(), ClientError> {
        let body = CompleteRequest {
            correlation_id: correlation_id.to_string(),
            status: status.to_string(),
        };
        let request = self
            .http_client
            .post(self.url(&format!("/api/kyc/{role}/complete")))
            .json(&body);
        let _: SuccessResponse = self.send(request).await?;
        Ok(())
    }

    /// Ask the server to impose a decision. Fails with 403 unless the server
    /// has simulation enabled.
    pub async fn simulate(&self, role: Role, status: &str) -> Result<(), ClientError> {
        let body = SimulateRequest {
            role: role.as_str().to_string(),
            status: status.to_string(),
        };
        let request = self.http_client.post(self.url("/api/kyc/simulate")).json(&body);
        let _: SuccessResponse = self.send(request).await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(self.http_client.get(self.url("/health"))).await
    }

    /// Poll until the vendor (or a simulation) has decided, up to
    /// `max_attempts` reads `interval` apart.
    pub async fn poll_until_settled(
        &self,
        role: Role,
        interval: Duration,
        max_attempts: u32,
    ) -> Result<StatusResponse, ClientError> {
        let mut last = StatusResponse::unset(role);
        for attempt in 1..=max_attempts.max(1) {
            last = self.fetch_status(role).await?;
            if last.status().is_decision() {
                return Ok(last);
            }
            debug!(role = %role, attempt, status = %last.status(), "verification not settled yet");
            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }
        Err(ClientError::NotSettled {
            last: last.status(),
            attempts: max_attempts.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.user {
            Some(user) => request.header(USER_HEADER, user.as_str()),
            None => request,
        };
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Unreachable(format!("request timed out: {e}"))
            } else if e.is_connect() {
                ClientError::Unreachable(format!("connection failed: {e}"))
            } else {
                ClientError::RequestFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => ClientError::Api {
            status: status.as_u16(),
            code: body.code,
            message: body.error,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: "HTTP_ERROR".to_string(),
            message: status.to_string(),
        },
    }
}

impl StatusReporter for ApiClient {
    async fn complete_local(
        &self,
        role: Role,
        correlation_id: &str,
        status: &str,
    ) -> Result<(), SessionError> {
        self.complete(role, correlation_id, status)
            .await
            .map_err(|e| SessionError::Report(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3001/");
        assert_eq!(client.base_url(), "http://localhost:3001");
        assert_eq!(client.url("/health"), "http://localhost:3001/health");
    }
}
