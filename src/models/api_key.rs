//! API key availability

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shipped in sample environments; treated as no key at all.
pub const API_KEY_PLACEHOLDER: &str = "YOUR_GEMINI_API_KEY";

/// Whether a usable credential for the AI service was provided at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatus {
    Ok,
    #[default]
    Missing,
}

impl ApiKeyStatus {
    /// Evaluate a credential: missing when absent, blank, or the placeholder.
    pub fn from_credential(credential: Option<&str>) -> Self {
        match credential {
            Some(key) if !key.trim().is_empty() && key != API_KEY_PLACEHOLDER => ApiKeyStatus::Ok,
            _ => ApiKeyStatus::Missing,
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == ApiKeyStatus::Ok
    }
}

impl fmt::Display for ApiKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeyStatus::Ok => write!(f, "ok"),
            ApiKeyStatus::Missing => write!(f, "missing"),
        }
    }
}
