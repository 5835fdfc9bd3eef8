//! Wizard state container — single source of truth for form data and progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiResponse;
use crate::form::model::{LoanFormData, LoanFormPatch};

/// Wizard position: which screen the applicant is on.
///
/// Progresses linearly: Quiz → LoanDetails → Contact → Completed.
/// Serialized as its integer index so stored sessions stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum WizardStep {
    Quiz,
    LoanDetails,
    Contact,
    Completed,
}

impl WizardStep {
    /// Integer index of this step (0..=3).
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Step for an arbitrary index, clamped to the valid range.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Quiz,
            1 => Self::LoanDetails,
            2 => Self::Contact,
            _ => Self::Completed,
        }
    }

    /// The following step, saturating at Completed.
    pub fn next(&self) -> Self {
        Self::from_index(self.index().saturating_add(1))
    }

    /// The preceding step, saturating at Quiz.
    pub fn previous(&self) -> Self {
        Self::from_index(self.index().saturating_sub(1))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::Quiz
    }
}

impl From<u8> for WizardStep {
    fn from(index: u8) -> Self {
        Self::from_index(index)
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.index()
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Quiz => "quiz",
            Self::LoanDetails => "loan_details",
            Self::Contact => "contact",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Tracks the two-phase network submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionState {
    pub is_submitting: bool,
    pub is_success: bool,
    /// Last user-facing failure message.
    pub error: Option<String>,
    pub lead_response: Option<ApiResponse>,
    pub account_response: Option<ApiResponse>,
}

/// Partial update over [`SubmissionState`]; overwrite-if-present per field.
#[derive(Debug, Clone, Default)]
pub struct SubmissionPatch {
    pub is_submitting: Option<bool>,
    pub is_success: Option<bool>,
    /// `Some(None)` clears the error; `None` leaves it unchanged.
    pub error: Option<Option<String>>,
    pub lead_response: Option<ApiResponse>,
    pub account_response: Option<ApiResponse>,
}

/// Single authoritative in-memory store for wizard data and progress.
///
/// Fields are private: every mutation goes through an action method so the
/// loan-amount range and step-clamping invariants hold at all times. The
/// container performs no I/O; the controller persists the durable subset
/// after qualifying changes.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    form_data: LoanFormData,
    current_step: WizardStep,
    is_completed: bool,
    show_welcome_back: bool,
    last_saved: Option<DateTime<Utc>>,
    agreed_to_terms: bool,
    submission: SubmissionState,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Read access ─────────────────────────────────────────────────

    pub fn form_data(&self) -> &LoanFormData {
        &self.form_data
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn show_welcome_back(&self) -> bool {
        self.show_welcome_back
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn agreed_to_terms(&self) -> bool {
        self.agreed_to_terms
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    /// The durable subset of the state: what gets snapshotted to storage.
    ///
    /// Submission state, the terms flag, and the welcome-back prompt are
    /// ephemeral UI state and are never persisted.
    pub fn snapshot(&self) -> (&LoanFormData, WizardStep) {
        (&self.form_data, self.current_step)
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Merge the given fields into the current form data and stamp last-saved.
    ///
    /// No field validation happens here; that is each step's responsibility
    /// before calling. The loan amount is clamped into range regardless.
    pub fn update_form_data(&mut self, patch: LoanFormPatch) {
        patch.apply_to(&mut self.form_data);
        self.last_saved = Some(Utc::now());
    }

    /// Set the wizard position directly, clamped to the valid range.
    pub fn set_step(&mut self, index: u8) {
        self.current_step = WizardStep::from_index(index);
    }

    /// Advance one step, saturating at Completed.
    pub fn next_step(&mut self) {
        self.current_step = self.current_step.next();
    }

    /// Retreat one step, saturating at Quiz.
    pub fn previous_step(&mut self) {
        self.current_step = self.current_step.previous();
    }

    /// Mark the application completed. Does not reset data.
    pub fn complete_form(&mut self) {
        self.is_completed = true;
    }

    /// Restore form data and step to defaults; clears submission sub-state,
    /// the terms flag, and the last-saved stamp.
    pub fn reset_form(&mut self) {
        self.form_data = LoanFormData::default();
        self.current_step = WizardStep::Quiz;
        self.is_completed = false;
        self.agreed_to_terms = false;
        self.submission = SubmissionState::default();
        self.last_saved = None;
    }

    /// Merge a saved session back in: patch the form data, jump to the saved
    /// step, dismiss the welcome-back prompt, stamp last-saved.
    pub fn restore_session(&mut self, patch: LoanFormPatch, step: WizardStep) {
        patch.apply_to(&mut self.form_data);
        self.current_step = step;
        self.show_welcome_back = false;
        self.last_saved = Some(Utc::now());
    }

    pub fn set_show_welcome_back(&mut self, show: bool) {
        self.show_welcome_back = show;
    }

    pub fn set_agreed_to_terms(&mut self, agreed: bool) {
        self.agreed_to_terms = agreed;
    }

    pub fn set_last_saved(&mut self, at: Option<DateTime<Utc>>) {
        self.last_saved = at;
    }

    /// Merge fields into the submission sub-state.
    pub fn set_submission(&mut self, patch: SubmissionPatch) {
        if let Some(is_submitting) = patch.is_submitting {
            self.submission.is_submitting = is_submitting;
        }
        if let Some(is_success) = patch.is_success {
            self.submission.is_success = is_success;
        }
        if let Some(error) = patch.error {
            self.submission.error = error;
        }
        if let Some(lead) = patch.lead_response {
            self.submission.lead_response = Some(lead);
        }
        if let Some(account) = patch.account_response {
            self.submission.account_response = Some(account);
        }
    }

    pub fn reset_submission(&mut self) {
        self.submission = SubmissionState::default();
    }
}
