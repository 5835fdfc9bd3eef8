//! Form data model, wizard state container, and contact validation.

pub mod model;
pub mod state;
pub mod validate;

pub use model::{LoanFormData, LoanFormPatch, LoanPurpose, LoanType, Personality};
pub use state::{FormState, SubmissionPatch, SubmissionState, WizardStep};
