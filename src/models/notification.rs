//! Notification and toast models
//!
//! Notifications are persisted and capped; toasts are transient and
//! expire on their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum number of notifications kept, newest first
pub const MAX_NOTIFICATIONS: usize = 20;

/// Severity shared by notifications and toasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A persisted user notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Severity,
    /// Creation time, stored as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    /// Create an unread notification stamped now.
    pub fn new(message: impl Into<String>, kind: Severity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            kind,
            timestamp: Utc::now(),
            read: false,
        }
    }
}

/// A transient toast shown until dismissed or expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastMessage {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Severity,
}

impl ToastMessage {
    pub fn new(message: impl Into<String>, kind: Severity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            kind,
        }
    }
}
