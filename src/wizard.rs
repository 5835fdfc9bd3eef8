//! Wizard controller — wires the state container to persistence and the
//! submission client.
//!
//! The controller owns the restore-or-discard decision at startup, snapshots
//! progress after qualifying changes, and orchestrates the two-phase
//! submission. Storage failures degrade: the affected save or restore is
//! skipped and the wizard continues without persistence for that turn.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::api::LeadApi;
use crate::error::SubmitError;
use crate::form::model::LoanFormPatch;
use crate::form::state::{FormState, SubmissionPatch, WizardStep};
use crate::session::store::{SavedSession, SessionStore};

/// Summary of a resumable session, shown in the welcome-back prompt.
#[derive(Debug, Clone)]
pub struct ResumePrompt {
    pub step: WizardStep,
    /// Applicant name, when the saved session got that far.
    pub name: Option<String>,
    pub loan_amount: u32,
    pub saved_at: DateTime<Utc>,
}

/// UI-facing controller for the loan wizard.
pub struct Wizard {
    state: FormState,
    store: Arc<dyn SessionStore>,
    api: Arc<dyn LeadApi>,
    /// Snapshot held between the welcome-back prompt and the user's decision.
    pending_resume: Option<SavedSession>,
}

impl Wizard {
    pub fn new(store: Arc<dyn SessionStore>, api: Arc<dyn LeadApi>) -> Self {
        Self {
            state: FormState::new(),
            store,
            api,
            pending_resume: None,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    // ── Session restore decision ────────────────────────────────────

    /// Consult the session store at startup.
    ///
    /// A non-expired snapshot with wizard position past the quiz surfaces a
    /// [`ResumePrompt`]; the caller must resolve it with [`Self::restore_session`]
    /// or [`Self::start_fresh`]. There is no silent restore. A storage failure
    /// degrades to "no saved session".
    pub fn check_saved_session(&mut self) -> Option<ResumePrompt> {
        let session = match self.store.get_progress() {
            Ok(session) => session?,
            Err(e) => {
                warn!(error = %e, "Could not read saved session, starting fresh");
                return None;
            }
        };

        if session.step == WizardStep::Quiz {
            return None;
        }

        let prompt = ResumePrompt {
            step: session.step,
            name: (!session.form_data.name.is_empty()).then(|| session.form_data.name.clone()),
            loan_amount: session.form_data.loan_amount,
            saved_at: session.timestamp,
        };
        self.pending_resume = Some(session);
        self.state.set_show_welcome_back(true);
        Some(prompt)
    }

    /// Resume the pending saved session: merge its data into the container and
    /// jump to the saved step.
    pub fn restore_session(&mut self) {
        let Some(session) = self.pending_resume.take() else {
            self.state.set_show_welcome_back(false);
            return;
        };
        info!(step = %session.step, "Resuming saved session");
        self.state
            .restore_session(LoanFormPatch::from(session.form_data), session.step);
    }

    /// Discard the pending saved session and start over.
    pub fn start_fresh(&mut self) {
        self.pending_resume = None;
        self.state.set_show_welcome_back(false);
        self.clear_all_data();
    }

    /// Reset the container to defaults and delete the durable snapshot.
    pub fn clear_all_data(&mut self) {
        self.state.reset_form();
        if let Err(e) = self.store.clear_progress() {
            warn!(error = %e, "Could not clear saved session");
        }
    }

    // ── Form mutation + autosave ────────────────────────────────────

    /// Merge fields into the form data and snapshot progress.
    pub fn update_form(&mut self, patch: LoanFormPatch) {
        self.state.update_form_data(patch);
        self.save_progress();
    }

    /// Advance to the next step, or mark the form completed at the last one.
    pub fn advance(&mut self) {
        if self.state.current_step() < WizardStep::Completed {
            self.state.next_step();
            self.save_progress();
        } else {
            self.state.complete_form();
        }
    }

    pub fn go_back(&mut self) {
        self.state.previous_step();
        self.save_progress();
    }

    pub fn set_step(&mut self, index: u8) {
        self.state.set_step(index);
        self.save_progress();
    }

    pub fn set_agreed_to_terms(&mut self, agreed: bool) {
        self.state.set_agreed_to_terms(agreed);
    }

    /// Snapshot the durable subset. A failing store is logged and skipped; the
    /// wizard continues without persistence for this turn.
    fn save_progress(&mut self) {
        let (form_data, step) = self.state.snapshot();
        match self.store.save_progress(form_data, step) {
            Ok(()) => {}
            Err(e) => {
                warn!(error = %e, "Could not save progress");
                self.state.set_last_saved(None);
            }
        }
    }

    // ── Two-phase submission ────────────────────────────────────────

    /// Run the two-phase submission: create the lead, then the account.
    ///
    /// Returns `true` when both phases succeed; the wizard then advances to
    /// the success screen and the saved session is destroyed. On failure the
    /// user-facing message lands in the submission sub-state and the wizard
    /// stays on the contact step. Retrying re-runs the whole sequence from
    /// lead creation; a lead id from a failed attempt is discarded.
    ///
    /// Re-entry while a submission is in flight is refused.
    pub async fn submit(&mut self) -> bool {
        if self.state.submission().is_submitting {
            warn!("Submission already in flight, ignoring");
            return false;
        }

        self.state.set_submission(SubmissionPatch {
            is_submitting: Some(true),
            is_success: Some(false),
            error: Some(None),
            ..SubmissionPatch::default()
        });

        match self.run_two_phase().await {
            Ok(()) => {
                self.state.set_submission(SubmissionPatch {
                    is_submitting: Some(false),
                    is_success: Some(true),
                    error: Some(None),
                    ..SubmissionPatch::default()
                });
                // A finished application is not resumable.
                if let Err(e) = self.store.clear_progress() {
                    warn!(error = %e, "Could not clear saved session");
                }
                self.state.next_step();
                true
            }
            Err(e) => {
                warn!(error = %e, "Submission failed");
                self.state.set_submission(SubmissionPatch {
                    is_submitting: Some(false),
                    error: Some(Some(e.user_message().to_string())),
                    ..SubmissionPatch::default()
                });
                false
            }
        }
    }

    async fn run_two_phase(&mut self) -> Result<(), SubmitError> {
        let lead = self.api.submit_lead(self.state.form_data()).await?;
        info!(lead_id = %lead.lead_id, "Lead created");
        self.state.set_submission(SubmissionPatch {
            lead_response: Some(lead.clone()),
            ..SubmissionPatch::default()
        });

        let account = self
            .api
            .create_account(&lead.lead_id, self.state.form_data())
            .await?;
        info!(account_id = %account.account_id, "Account created");
        self.state.set_submission(SubmissionPatch {
            account_response: Some(account.clone()),
            ..SubmissionPatch::default()
        });

        // Lead id from the lead call; account and salesforce ids from the
        // account call, the later authoritative record.
        self.state.update_form_data(LoanFormPatch {
            lead_id: Some(lead.lead_id),
            account_id: Some(account.account_id),
            salesforce_id: Some(account.salesforce_id),
            ..LoanFormPatch::default()
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::types::{ApiResponse, ResponseStatus};
    use crate::form::model::{LoanFormData, LoanPurpose, Personality};
    use crate::session::store::MemorySessionStore;

    fn success_response(lead_id: &str, account_id: &str) -> ApiResponse {
        ApiResponse {
            status: ResponseStatus::Success,
            lead_id: lead_id.to_string(),
            salesforce_id: "003TESTSALESFORCE0".to_string(),
            account_id: account_id.to_string(),
            message: None,
        }
    }

    /// Stub API with scripted results and call recording.
    #[derive(Default)]
    struct StubApi {
        lead_results: Mutex<VecDeque<Result<ApiResponse, SubmitError>>>,
        account_results: Mutex<VecDeque<Result<ApiResponse, SubmitError>>>,
        lead_calls: Mutex<u32>,
        account_lead_ids: Mutex<Vec<String>>,
    }

    impl StubApi {
        fn queue_lead(&self, result: Result<ApiResponse, SubmitError>) {
            self.lead_results.lock().unwrap().push_back(result);
        }

        fn queue_account(&self, result: Result<ApiResponse, SubmitError>) {
            self.account_results.lock().unwrap().push_back(result);
        }
    }

    #[async_trait]
    impl LeadApi for StubApi {
        async fn submit_lead(&self, _data: &LoanFormData) -> Result<ApiResponse, SubmitError> {
            *self.lead_calls.lock().unwrap() += 1;
            self.lead_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(success_response("LEAD-1", "")))
        }

        async fn create_account(
            &self,
            lead_id: &str,
            _data: &LoanFormData,
        ) -> Result<ApiResponse, SubmitError> {
            self.account_lead_ids
                .lock()
                .unwrap()
                .push(lead_id.to_string());
            self.account_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(success_response(lead_id, "ACC-1")))
        }

        async fn check_email_exists(&self, _email: &str) -> bool {
            false
        }
    }

    /// Session store whose every operation fails.
    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn save_progress(
            &self,
            _form_data: &LoanFormData,
            _step: WizardStep,
        ) -> Result<(), crate::error::StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn get_progress(&self) -> Result<Option<SavedSession>, crate::error::StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn clear_progress(&self) -> Result<(), crate::error::StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    fn wizard_with(store: Arc<dyn SessionStore>, api: Arc<StubApi>) -> Wizard {
        Wizard::new(store, api)
    }

    fn fill_contact(wizard: &mut Wizard) {
        wizard.update_form(LoanFormPatch::contact(
            "John Doe",
            "john@example.com",
            "0412345678",
        ));
        wizard.set_agreed_to_terms(true);
    }

    #[test]
    fn quiz_flow_reaches_loan_details() {
        let store = Arc::new(MemorySessionStore::new());
        let mut wizard = wizard_with(store, Arc::new(StubApi::default()));

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
        assert_eq!(
            wizard.state().form_data().personality,
            Some(Personality::Planner)
        );
        assert_eq!(
            wizard.state().form_data().loan_purpose,
            Some(LoanPurpose::Immediate)
        );
    }

    #[tokio::test]
    async fn successful_submission_completes_the_wizard() {
        let store = Arc::new(MemorySessionStore::new());
        let api = Arc::new(StubApi::default());
        api.queue_lead(Ok(success_response("LEAD-42", "")));
        api.queue_account(Ok(success_response("LEAD-42", "ACC-7")));

        let mut wizard = wizard_with(store.clone(), api.clone());
        wizard.set_step(2);
        fill_contact(&mut wizard);

        assert!(wizard.submit().await);

        let state = wizard.state();
        assert!(state.submission().is_success);
        assert!(!state.submission().is_submitting);
        assert!(state.submission().error.is_none());
        assert_eq!(state.form_data().lead_id.as_deref(), Some("LEAD-42"));
        assert_eq!(state.form_data().account_id.as_deref(), Some("ACC-7"));
        assert!(state.form_data().salesforce_id.is_some());
        assert_eq!(state.current_step(), WizardStep::Completed);

        // Account creation used exactly the lead id the lead call returned.
        assert_eq!(*api.account_lead_ids.lock().unwrap(), vec!["LEAD-42"]);

        // A finished application leaves no resumable session behind.
        assert!(store.get_progress().unwrap().is_none());
    }

    #[tokio::test]
    async fn account_failure_keeps_wizard_at_contact_and_retry_restarts_from_lead() {
        let store = Arc::new(MemorySessionStore::new());
        let api = Arc::new(StubApi::default());
        api.queue_lead(Ok(success_response("LEAD-1", "")));
        api.queue_account(Err(SubmitError::Remote {
            message: "Email already exists".into(),
            code: Some("ERR_422".into()),
        }));
        // Retry succeeds on both phases.
        api.queue_lead(Ok(success_response("LEAD-2", "")));
        api.queue_account(Ok(success_response("LEAD-2", "ACC-9")));

        let mut wizard = wizard_with(store, api.clone());
        wizard.set_step(2);
        fill_contact(&mut wizard);

        assert!(!wizard.submit().await);
        assert_eq!(
            wizard.state().submission().error.as_deref(),
            Some("Email already exists")
        );
        assert!(!wizard.state().submission().is_submitting);
        assert!(!wizard.state().submission().is_success);
        assert_eq!(wizard.state().current_step(), WizardStep::Contact);
        assert!(wizard.state().form_data().lead_id.is_none());

        assert!(wizard.submit().await);
        // Both calls re-issued from lead creation; the retry's account call
        // used the fresh lead id, not the stale one.
        assert_eq!(*api.lead_calls.lock().unwrap(), 2);
        assert_eq!(
            *api.account_lead_ids.lock().unwrap(),
            vec!["LEAD-1", "LEAD-2"]
        );
        assert_eq!(wizard.state().form_data().lead_id.as_deref(), Some("LEAD-2"));
    }

    #[tokio::test]
    async fn lead_failure_never_reaches_account_creation() {
        let api = Arc::new(StubApi::default());
        api.queue_lead(Err(SubmitError::Network {
            message: "Failed to submit lead".into(),
        }));

        let mut wizard = wizard_with(Arc::new(MemorySessionStore::new()), api.clone());
        wizard.set_step(2);
        fill_contact(&mut wizard);

        assert!(!wizard.submit().await);
        assert!(api.account_lead_ids.lock().unwrap().is_empty());
        assert_eq!(
            wizard.state().submission().error.as_deref(),
            Some("Failed to submit lead")
        );
    }

    #[tokio::test]
    async fn reentrant_submit_is_refused() {
        let api = Arc::new(StubApi::default());
        let mut wizard = wizard_with(Arc::new(MemorySessionStore::new()), api.clone());
        fill_contact(&mut wizard);

        // Simulate an in-flight submission.
        wizard.state.set_submission(SubmissionPatch {
            is_submitting: Some(true),
            ..SubmissionPatch::default()
        });

        assert!(!wizard.submit().await);
        assert_eq!(*api.lead_calls.lock().unwrap(), 0);
    }

    #[test]
    fn welcome_back_round_trip() {
        let store = Arc::new(MemorySessionStore::new());

        // First visit gets to the contact step.
        let mut first = wizard_with(store.clone(), Arc::new(StubApi::default()));
        first.update_form(LoanFormPatch {
            personality: Some(Personality::Dreamer),
            loan_amount: Some(100_000),
            name: Some("John Doe".into()),
            ..LoanFormPatch::default()
        });
        first.set_step(2);

        // Second visit is offered the saved session.
        let mut second = wizard_with(store.clone(), Arc::new(StubApi::default()));
        let prompt = second.check_saved_session().expect("resumable session");
        assert_eq!(prompt.step, WizardStep::Contact);
        assert_eq!(prompt.name.as_deref(), Some("John Doe"));
        assert_eq!(prompt.loan_amount, 100_000);
        assert!(second.state().show_welcome_back());

        second.restore_session();
        assert!(!second.state().show_welcome_back());
        assert_eq!(second.state().current_step(), WizardStep::Contact);
        assert_eq!(second.state().form_data().loan_amount, 100_000);
        assert_eq!(
            second.state().form_data().personality,
            Some(Personality::Dreamer)
        );
    }

    #[test]
    fn start_fresh_discards_the_snapshot() {
        let store = Arc::new(MemorySessionStore::new());

        let mut first = wizard_with(store.clone(), Arc::new(StubApi::default()));
        first.update_form(LoanFormPatch {
            name: Some("Jane Roe".into()),
            ..LoanFormPatch::default()
        });
        first.set_step(1);

        let mut second = wizard_with(store.clone(), Arc::new(StubApi::default()));
        assert!(second.check_saved_session().is_some());
        second.start_fresh();

        assert!(!second.state().show_welcome_back());
        assert!(second.state().form_data().name.is_empty());
        assert_eq!(second.state().current_step(), WizardStep::Quiz);
        assert!(store.get_progress().unwrap().is_none());
    }

    #[test]
    fn quiz_position_is_not_offered_for_resume() {
        let store = Arc::new(MemorySessionStore::new());

        let mut first = wizard_with(store.clone(), Arc::new(StubApi::default()));
        first.update_form(LoanFormPatch {
            personality: Some(Personality::Balanced),
            ..LoanFormPatch::default()
        });

        let mut second = wizard_with(store, Arc::new(StubApi::default()));
        assert!(second.check_saved_session().is_none());
        assert!(!second.state().show_welcome_back());
    }

    #[test]
    fn broken_store_degrades_without_crashing() {
        let mut wizard = wizard_with(Arc::new(BrokenStore), Arc::new(StubApi::default()));

        assert!(wizard.check_saved_session().is_none());

        wizard.update_form(LoanFormPatch {
            name: Some("John Doe".into()),
            ..LoanFormPatch::default()
        });
        // The edit itself sticks even though the snapshot was skipped.
        assert_eq!(wizard.state().form_data().name, "John Doe");
        assert!(wizard.state().last_saved().is_none());

        wizard.advance();
        assert_eq!(wizard.state().current_step(), WizardStep::LoanDetails);
    }
}
