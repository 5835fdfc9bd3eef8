//! Submission client — two-phase lead/account creation over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::types::{AccountPayload, ApiErrorBody, ApiResponse, LeadPayload};
use crate::error::SubmitError;
use crate::form::model::LoanFormData;

/// Per-request timeout for the submission calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the best-effort email existence check.
const EMAIL_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote lead/account API.
///
/// `create_account` must only be invoked after `submit_lead` returned a
/// success, with the `lead_id` that call produced. The calls are sequential,
/// never parallel.
#[async_trait]
pub trait LeadApi: Send + Sync {
    async fn submit_lead(&self, data: &LoanFormData) -> Result<ApiResponse, SubmitError>;

    async fn create_account(
        &self,
        lead_id: &str,
        data: &LoanFormData,
    ) -> Result<ApiResponse, SubmitError>;

    /// Best-effort duplicate check; any failure degrades to `false` so the
    /// user is never blocked on it.
    async fn check_email_exists(&self, email: &str) -> bool;
}

/// HTTP client for the lead/account endpoints.
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Client against `base_url` (e.g. `http://127.0.0.1:8777/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Normalize a response into success or a typed failure.
    ///
    /// Non-2xx with a structured body carries the server message; a 2xx body
    /// whose status is not "success" is equally a failure and never advances
    /// the wizard.
    async fn interpret(
        response: reqwest::Response,
        generic_message: &str,
    ) -> Result<ApiResponse, SubmitError> {
        let http_status = response.status();

        if !http_status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(err) => Err(SubmitError::Remote {
                    message: err.message,
                    code: err.code,
                }),
                Err(_) => Err(SubmitError::Network {
                    message: generic_message.to_string(),
                }),
            };
        }

        let parsed: ApiResponse =
            response
                .json()
                .await
                .map_err(|e| SubmitError::InvalidResponse {
                    message: format!("{generic_message}: {e}"),
                })?;

        if !parsed.is_success() {
            return Err(SubmitError::Remote {
                message: parsed
                    .message
                    .clone()
                    .unwrap_or_else(|| generic_message.to_string()),
                code: None,
            });
        }

        Ok(parsed)
    }
}

#[async_trait]
impl LeadApi for HttpApiClient {
    async fn submit_lead(&self, data: &LoanFormData) -> Result<ApiResponse, SubmitError> {
        let payload = LeadPayload::from_form(data);
        debug!(email = %payload.email, "Submitting lead");

        let response = self
            .client
            .post(self.endpoint("leads"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Lead submission transport failure");
                SubmitError::Network {
                    message: "Failed to submit lead".to_string(),
                }
            })?;

        Self::interpret(response, "Failed to submit lead").await
    }

    async fn create_account(
        &self,
        lead_id: &str,
        data: &LoanFormData,
    ) -> Result<ApiResponse, SubmitError> {
        let payload = AccountPayload::from_form(lead_id, data);
        debug!(lead_id, "Creating account");

        let response = self
            .client
            .post(self.endpoint("accounts"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Account creation transport failure");
                SubmitError::Network {
                    message: "Failed to create account".to_string(),
                }
            })?;

        Self::interpret(response, "Failed to create account").await
    }

    async fn check_email_exists(&self, email: &str) -> bool {
        let url = self.endpoint(&format!("check-email/{email}"));
        let result = self
            .client
            .get(url)
            .timeout(EMAIL_CHECK_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                #[derive(serde::Deserialize)]
                struct Exists {
                    exists: bool,
                }
                response
                    .json::<Exists>()
                    .await
                    .map(|b| b.exists)
                    .unwrap_or(false)
            }
            Ok(response) => {
                warn!(status = %response.status(), "Email check failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "Email check failed");
                false
            }
        }
    }
}
