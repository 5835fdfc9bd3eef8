//! Mocked lead/account backend for demo mode and integration tests.
//!
//! Simulates the CRM the wizard submits to: realistic latency, generated
//! identifiers, forced-error emails for manual testing, and an occasional
//! random failure. Behavior mirrors the demo backend the wizard ships
//! against; there is no real integration.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rand::Rng;
use serde_json::{Value, json};
use tracing::info;

type Response = axum::response::Response;

/// Tuning knobs for the simulated backend.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Probability of a random error response on lead/account creation.
    pub failure_rate: f64,
    /// Simulated latency range.
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.1,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(1500),
        }
    }
}

impl MockConfig {
    /// Zero latency, zero random failures, for tests that need determinism.
    pub fn deterministic() -> Self {
        Self {
            failure_rate: 0.0,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

/// Emails that always exist, for the duplicate check.
const EXISTING_EMAILS: [&str; 3] = ["test@example.com", "demo@test.com", "existing@email.com"];

/// Generate an identifier like `LEAD-1723012345678-0042`.
fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{prefix}-{millis}-{random:04}")
}

/// Generate a Salesforce-style record id: `003` plus 15 uppercase alphanumerics.
fn generate_salesforce_id() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..15)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("003{suffix}")
}

/// Forced error responses keyed by well-known test emails.
fn forced_error(email: &str) -> Option<(StatusCode, &'static str)> {
    match email {
        "test@error.com" => Some((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Forced server error for testing",
        )),
        "demo@500.com" => Some((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error. Please try again.",
        )),
        "user@422.com" => Some((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed. Please check your information.",
        )),
        "user@503.com" => Some((
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable. Please try again later.",
        )),
        _ => None,
    }
}

async fn simulate_delay(config: &MockConfig) {
    if config.max_delay.is_zero() {
        return;
    }
    let delay = {
        let mut rng = rand::thread_rng();
        rng.gen_range(config.min_delay..=config.max_delay)
    };
    tokio::time::sleep(delay).await;
}

fn should_fail(config: &MockConfig) -> bool {
    config.failure_rate > 0.0 && rand::thread_rng().gen_bool(config.failure_rate)
}

/// `POST /api/leads`
async fn create_lead(State(config): State<Arc<MockConfig>>, Json(body): Json<Value>) -> Response {
    simulate_delay(&config).await;

    let email = body["email"].as_str().unwrap_or_default();

    if let Some((status, message)) = forced_error(email) {
        info!(email = %email, status = %status, "Mock API: forcing lead error");
        return error_response(status, message, &format!("ERR_{}", status.as_u16()));
    }

    if should_fail(&config) {
        let (status, message) = random_error();
        info!(status = %status, "Mock API: random lead error");
        return error_response(status, message, &format!("ERR_{}", status.as_u16()));
    }

    let response = json!({
        "status": "success",
        "leadId": generate_id("LEAD"),
        "salesforceId": generate_salesforce_id(),
        "accountId": "",
        "message": "Lead submitted successfully"
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// `POST /api/accounts`
async fn create_account(
    State(config): State<Arc<MockConfig>>,
    Json(body): Json<Value>,
) -> Response {
    simulate_delay(&config).await;

    let email = body["email"].as_str().unwrap_or_default();

    if let Some((status, message)) = forced_error(email) {
        info!(email = %email, status = %status, "Mock API: forcing account error");
        return error_response(
            status,
            &format!("Account creation failed: {message}"),
            &format!("ERR_ACCOUNT_{}", status.as_u16()),
        );
    }

    if should_fail(&config) {
        info!("Mock API: random account error");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create account. Please contact support.",
            "ERR_ACCOUNT_CREATION",
        );
    }

    let response = json!({
        "status": "success",
        "leadId": body["leadId"].as_str().unwrap_or_default(),
        "salesforceId": generate_salesforce_id(),
        "accountId": generate_id("ACC"),
        "message": "Account created successfully"
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// `GET /api/check-email/{email}`
async fn check_email(Path(email): Path<String>) -> impl IntoResponse {
    let exists = EXISTING_EMAILS.contains(&email.as_str());
    Json(json!({ "exists": exists }))
}

/// `GET /api/health`
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn error_response(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "message": message,
            "code": code,
        })),
    )
        .into_response()
}

fn random_error() -> (StatusCode, &'static str) {
    let errors = [
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error. Please try again.",
        ),
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed. Please check your information.",
        ),
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable. Please try again later.",
        ),
    ];
    errors[rand::thread_rng().gen_range(0..errors.len())]
}

/// Build the mocked backend routes.
pub fn mock_routes(config: MockConfig) -> Router {
    let config = Arc::new(config);
    Router::new()
        .route("/api/leads", post(create_lead))
        .route("/api/accounts", post(create_account))
        .route("/api/check-email/{email}", get(check_email))
        .route("/api/health", get(health))
        .with_state(config)
}
