//! Contact-step validation and display formatting.
//!
//! Validation is the step's responsibility: errors surface inline next to the
//! offending input and never reach the state container.

use regex::Regex;

use crate::error::ValidationError;
use crate::form::model::LoanFormData;

/// Validates the contact fields against the step's rules.
pub struct ContactValidator {
    email_re: Regex,
    phone_re: Regex,
}

impl ContactValidator {
    pub fn new() -> Self {
        Self {
            email_re: Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap(),
            phone_re: Regex::new(r"^\d{10}$").unwrap(),
        }
    }

    /// Name must be at least 2 characters after trimming.
    pub fn validate_name(&self, name: &str) -> Result<(), ValidationError> {
        if name.trim().chars().count() < 2 {
            return Err(ValidationError::NameTooShort);
        }
        Ok(())
    }

    pub fn validate_email(&self, email: &str) -> Result<(), ValidationError> {
        if !self.email_re.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }

    /// Phone must be exactly 10 digits, numbers only.
    pub fn validate_phone(&self, phone: &str) -> Result<(), ValidationError> {
        if !self.phone_re.is_match(phone) {
            return Err(ValidationError::InvalidPhone);
        }
        Ok(())
    }

    /// Check all contact fields, collecting every failure so each input can
    /// show its own message.
    pub fn validate_contact(&self, data: &LoanFormData) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = self.validate_name(&data.name) {
            errors.push(e);
        }
        if let Err(e) = self.validate_email(&data.email) {
            errors.push(e);
        }
        if let Err(e) = self.validate_phone(&data.phone) {
            errors.push(e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for ContactValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip a raw input down to at most 10 digits for storage.
pub fn normalize_phone(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).take(10).collect()
}

/// Group a stored phone number for display: "0412345678" → "0412 345 678".
///
/// Partial input is grouped as far as it goes; the stored value itself is
/// never reformatted.
pub fn format_phone_display(phone: &str) -> String {
    let digits = normalize_phone(phone);
    match digits.len() {
        0..=4 => digits,
        5..=7 => format!("{} {}", &digits[..4], &digits[4..]),
        _ => format!("{} {} {}", &digits[..4], &digits[4..7], &digits[7..]),
    }
}
