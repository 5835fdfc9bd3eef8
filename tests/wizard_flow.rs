//! Integration tests for the wizard against the mocked backend.
//!
//! Each test spins up the Axum mock on a random port and exercises the real
//! HTTP client + controller contract.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use ume_loans::api::mock::{MockConfig, mock_routes};
use ume_loans::api::{HttpApiClient, LeadApi};
use ume_loans::error::SubmitError;
use ume_loans::form::model::{LoanFormData, LoanFormPatch, LoanPurpose, LoanType, Personality};
use ume_loans::form::state::WizardStep;
use ume_loans::session::{FileSessionStore, SessionStore};
use ume_loans::wizard::Wizard;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start the deterministic mock backend on a random port, return its base URL.
async fn start_mock() -> String {
    let app = mock_routes(MockConfig::deterministic());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}/api")
}

fn contact_data(email: &str) -> LoanFormData {
    LoanFormData {
        personality: Some(Personality::Planner),
        loan_purpose: Some(LoanPurpose::Immediate),
        loan_amount: 25_000,
        loan_type: LoanType::Auto,
        name: "John Doe".into(),
        email: email.into(),
        phone: "0412345678".into(),
        ..LoanFormData::default()
    }
}

// ── Client-level contract ────────────────────────────────────────────

#[tokio::test]
async fn lead_submission_succeeds_against_mock() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let client = HttpApiClient::new(base);

        let response = client
            .submit_lead(&contact_data("john@example.com"))
            .await
            .unwrap();

        assert!(response.is_success());
        assert!(response.lead_id.starts_with("LEAD-"));
        assert!(response.salesforce_id.starts_with("003"));
        assert!(response.account_id.is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn forced_error_email_maps_to_remote_error() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let client = HttpApiClient::new(base);

        let err = client
            .submit_lead(&contact_data("user@422.com"))
            .await
            .unwrap_err();

        match err {
            SubmitError::Remote { message, code } => {
                assert_eq!(message, "Validation failed. Please check your information.");
                assert_eq!(code.as_deref(), Some("ERR_422"));
            }
            other => panic!("expected Remote error, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn account_creation_echoes_the_lead_id() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let client = HttpApiClient::new(base);
        let data = contact_data("john@example.com");

        let lead = client.submit_lead(&data).await.unwrap();
        let account = client.create_account(&lead.lead_id, &data).await.unwrap();

        assert_eq!(account.lead_id, lead.lead_id);
        assert!(account.account_id.starts_with("ACC-"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ok_response_with_error_status_is_a_failure() {
    timeout(TEST_TIMEOUT, async {
        // A backend that returns HTTP 200 with a non-success body.
        let app = Router::new().route(
            "/api/leads",
            post(|| async {
                Json(json!({
                    "status": "error",
                    "leadId": "",
                    "salesforceId": "",
                    "accountId": "",
                    "message": "Soft-declined"
                }))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let client = HttpApiClient::new(format!("http://127.0.0.1:{port}/api"));
        let err = client
            .submit_lead(&contact_data("john@example.com"))
            .await
            .unwrap_err();

        match err {
            SubmitError::Remote { message, .. } => assert_eq!(message, "Soft-declined"),
            other => panic!("expected Remote error, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_backend_maps_to_network_error() {
    timeout(TEST_TIMEOUT, async {
        // Nothing listens on this port.
        let client = HttpApiClient::new("http://127.0.0.1:9/api");
        let err = client
            .submit_lead(&contact_data("john@example.com"))
            .await
            .unwrap_err();

        match err {
            SubmitError::Network { message } => assert_eq!(message, "Failed to submit lead"),
            other => panic!("expected Network error, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn email_check_degrades_to_false_on_failure() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let client = HttpApiClient::new(base);

        assert!(client.check_email_exists("test@example.com").await);
        assert!(!client.check_email_exists("nobody@example.com").await);

        // Unreachable backend: never blocks the user.
        let dead = HttpApiClient::new("http://127.0.0.1:9/api");
        assert!(!dead.check_email_exists("test@example.com").await);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
    })
    .await
    .expect("test timed out");
}

// ── Full wizard flow ─────────────────────────────────────────────────

#[tokio::test]
async fn full_application_flow_end_to_end() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileSessionStore::new(dir.path().join("session.json")));
        let api: Arc<dyn LeadApi> = Arc::new(HttpApiClient::new(base));

        let mut wizard = Wizard::new(store.clone(), api);
        assert!(wizard.check_saved_session().is_none());

        // Quiz
        wizard.update_form(LoanFormPatch {
            personality: Some(Personality::Planner),
            ..LoanFormPatch::default()
        });
        wizard.update_form(LoanFormPatch {
            loan_purpose: Some(LoanPurpose::Immediate),
            ..LoanFormPatch::default()
        });
        wizard.advance();
        assert_eq!(wizard.state().current_step(), WizardStep::LoanDetails);

        // Loan details
        wizard.update_form(LoanFormPatch {
            loan_amount: Some(100_000),
            loan_type: Some(LoanType::Home),
            ..LoanFormPatch::default()
        });
        wizard.advance();
        assert_eq!(wizard.state().current_step(), WizardStep::Contact);

        // Progress is resumable at this point.
        let saved = store.get_progress().unwrap().expect("snapshot present");
        assert_eq!(saved.step, WizardStep::Contact);
        assert_eq!(saved.form_data.loan_amount, 100_000);

        // Contact + submit
        wizard.update_form(LoanFormPatch::contact(
            "John Doe",
            "john@example.com",
            "0412345678",
        ));
        wizard.set_agreed_to_terms(true);
        assert!(wizard.submit().await);

        let state = wizard.state();
        assert!(state.submission().is_success);
        assert_eq!(state.current_step(), WizardStep::Completed);
        assert!(
            state
                .form_data()
                .lead_id
                .as_deref()
                .unwrap()
                .starts_with("LEAD-")
        );
        assert!(
            state
                .form_data()
                .account_id
                .as_deref()
                .unwrap()
                .starts_with("ACC-")
        );
        assert!(
            state
                .form_data()
                .salesforce_id
                .as_deref()
                .unwrap()
                .starts_with("003")
        );

        // The finished application left no resumable session behind.
        assert!(store.get_progress().unwrap().is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failed_submission_leaves_session_resumable() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileSessionStore::new(dir.path().join("session.json")));
        let api: Arc<dyn LeadApi> = Arc::new(HttpApiClient::new(base));

        let mut wizard = Wizard::new(store.clone(), api);
        wizard.set_step(2);
        wizard.update_form(LoanFormPatch::contact(
            "John Doe",
            "demo@500.com",
            "0412345678",
        ));
        wizard.set_agreed_to_terms(true);

        assert!(!wizard.submit().await);
        assert_eq!(
            wizard.state().submission().error.as_deref(),
            Some("Internal server error. Please try again.")
        );
        assert_eq!(wizard.state().current_step(), WizardStep::Contact);

        // A fresh wizard over the same store still offers the session.
        let mut next = Wizard::new(store, Arc::new(HttpApiClient::new("http://127.0.0.1:9/api")));
        let prompt = next.check_saved_session().expect("resumable session");
        assert_eq!(prompt.step, WizardStep::Contact);
        assert_eq!(prompt.name.as_deref(), Some("John Doe"));
    })
    .await
    .expect("test timed out");
}
