//! The loan application data model.
//!
//! `LoanFormData` accumulates the wizard's answers; mutation happens only
//! through [`LoanFormPatch`] applied by the state container. Wire and storage
//! formats are camelCase and must stay stable across reloads.

use serde::{Deserialize, Serialize};

/// Lower bound of the loan amount slider.
pub const MIN_LOAN_AMOUNT: u32 = 1_000;
/// Upper bound of the loan amount slider.
pub const MAX_LOAN_AMOUNT: u32 = 500_000;
/// Slider increment.
pub const LOAN_AMOUNT_STEP: u32 = 1_000;
/// Default loan amount for a fresh application.
pub const DEFAULT_LOAN_AMOUNT: u32 = 50_000;
/// Quick-select amounts offered on the loan details step.
pub const QUICK_AMOUNTS: [u32; 5] = [10_000, 25_000, 50_000, 100_000, 250_000];

/// Financial personality, from quiz question one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Planner,
    Balanced,
    Dreamer,
}

/// When the applicant needs the funds, from quiz question two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoanPurpose {
    Immediate,
    ShortTerm,
    Planning,
}

/// Loan product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Personal,
    Auto,
    Home,
    Business,
}

impl LoanType {
    /// Human-readable product label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "Personal Loan",
            Self::Auto => "Auto Loan",
            Self::Home => "Home Loan",
            Self::Business => "Business Loan",
        }
    }
}

impl Default for LoanType {
    fn default() -> Self {
        Self::Personal
    }
}

impl std::fmt::Display for LoanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Accumulated wizard answers plus post-submission identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanFormData {
    /// Set by quiz step one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<Personality>,
    /// Set by quiz step two.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_purpose: Option<LoanPurpose>,

    /// Always within [`MIN_LOAN_AMOUNT`]..=[`MAX_LOAN_AMOUNT`].
    pub loan_amount: u32,
    pub loan_type: LoanType,

    pub name: String,
    pub email: String,
    pub phone: String,

    /// Populated only after both submission calls succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesforce_id: Option<String>,
}

impl Default for LoanFormData {
    fn default() -> Self {
        Self {
            personality: None,
            loan_purpose: None,
            loan_amount: DEFAULT_LOAN_AMOUNT,
            loan_type: LoanType::default(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            lead_id: None,
            account_id: None,
            salesforce_id: None,
        }
    }
}

/// Clamp an arbitrary amount into the valid loan range.
pub fn clamp_loan_amount(amount: u32) -> u32 {
    amount.clamp(MIN_LOAN_AMOUNT, MAX_LOAN_AMOUNT)
}

/// A partial update over [`LoanFormData`].
///
/// Every field is overwrite-if-present; unspecified fields are left unchanged.
/// `loan_amount` is clamped into range on application so an out-of-range value
/// can never be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanFormPatch {
    pub personality: Option<Personality>,
    pub loan_purpose: Option<LoanPurpose>,
    pub loan_amount: Option<u32>,
    pub loan_type: Option<LoanType>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lead_id: Option<String>,
    pub account_id: Option<String>,
    pub salesforce_id: Option<String>,
}

impl From<LoanFormData> for LoanFormPatch {
    /// A patch that overwrites every field with the given data's values.
    fn from(data: LoanFormData) -> Self {
        Self {
            personality: data.personality,
            loan_purpose: data.loan_purpose,
            loan_amount: Some(data.loan_amount),
            loan_type: Some(data.loan_type),
            name: Some(data.name),
            email: Some(data.email),
            phone: Some(data.phone),
            lead_id: data.lead_id,
            account_id: data.account_id,
            salesforce_id: data.salesforce_id,
        }
    }
}

impl LoanFormPatch {
    /// Patch carrying only the contact fields.
    pub fn contact(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            phone: Some(phone.into()),
            ..Self::default()
        }
    }

    /// Apply this patch to `data`, field by field.
    pub fn apply_to(self, data: &mut LoanFormData) {
        if let Some(personality) = self.personality {
            data.personality = Some(personality);
        }
        if let Some(purpose) = self.loan_purpose {
            data.loan_purpose = Some(purpose);
        }
        if let Some(amount) = self.loan_amount {
            data.loan_amount = clamp_loan_amount(amount);
        }
        if let Some(loan_type) = self.loan_type {
            data.loan_type = loan_type;
        }
        if let Some(name) = self.name {
            data.name = name;
        }
        if let Some(email) = self.email {
            data.email = email;
        }
        if let Some(phone) = self.phone {
            data.phone = phone;
        }
        if let Some(lead_id) = self.lead_id {
            data.lead_id = Some(lead_id);
        }
        if let Some(account_id) = self.account_id {
            data.account_id = Some(account_id);
        }
        if let Some(salesforce_id) = self.salesforce_id {
            data.salesforce_id = Some(salesforce_id);
        }
    }
}
