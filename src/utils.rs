use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::CreateAddress;

/// Validate a US ZIP code: at least 5 characters, digits only
pub fn validate_zip_code(zip_code: &str) -> Result<(), String> {
    let zip_code = zip_code.trim();
    if zip_code.is_empty() {
        return Err("Zip code can't be blank".to_string());
    }
    if zip_code.len() < 5 {
        return Err(format!("Zip code is too short: {}. Minimum is 5 characters", zip_code));
    }
    if !zip_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Zip code is not a number: {}", zip_code));
    }
    Ok(())
}

/// Validate every field of a submitted address, collecting all problems
pub fn validate_address(address: &CreateAddress) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (label, value) in [
        ("Street address", &address.street_address),
        ("City", &address.city),
        ("State", &address.state),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("{} can't be blank", label));
        }
    }

    if let Err(e) = validate_zip_code(&address.zip_code) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Cap an upstream response body before it goes into an error message
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

/// Error response helper
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
            errors: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}
