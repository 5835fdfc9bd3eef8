//! Wire types for the lead and account endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::model::{LoanFormData, LoanPurpose, LoanType, Personality};

/// Split a full name into `(first, last)` CRM tokens.
///
/// First whitespace token becomes the first name; the remainder joined with
/// spaces becomes the last name. A single-token name is used for both.
pub fn split_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let rest = tokens.collect::<Vec<_>>().join(" ");
    let last = if rest.is_empty() {
        name.trim().to_string()
    } else {
        rest
    };
    (first, last)
}

/// `POST /api/leads` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub loan_amount: u32,
    pub loan_type: LoanType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<Personality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_purpose: Option<LoanPurpose>,
    pub source: String,
    pub status: String,
    pub created_date: DateTime<Utc>,
}

impl LeadPayload {
    /// Map form data to the CRM lead shape. Identifier fields are never sent.
    pub fn from_form(data: &LoanFormData) -> Self {
        let (first_name, last_name) = split_name(&data.name);
        Self {
            first_name,
            last_name,
            email: data.email.clone(),
            phone: data.phone.clone(),
            loan_amount: data.loan_amount,
            loan_type: data.loan_type,
            personality: data.personality,
            loan_purpose: data.loan_purpose,
            source: "Web Form".to_string(),
            status: "New".to_string(),
            created_date: Utc::now(),
        }
    }
}

/// `POST /api/accounts` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    pub lead_id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub account_type: String,
    pub status: String,
    pub created_date: DateTime<Utc>,
}

impl AccountPayload {
    pub fn from_form(lead_id: &str, data: &LoanFormData) -> Self {
        Self {
            lead_id: lead_id.to_string(),
            email: data.email.clone(),
            name: data.name.clone(),
            phone: data.phone.clone(),
            account_type: "Individual".to_string(),
            status: "Active".to_string(),
            created_date: Utc::now(),
        }
    }
}

/// Response status discriminator. Anything other than `success`, including
/// values this client does not know, is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// Success-shaped response from either endpoint.
///
/// `account_id` is empty on the lead call and populated on the account call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: ResponseStatus,
    pub lead_id: String,
    pub salesforce_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Structured error body: `{status:"error", message, code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}
