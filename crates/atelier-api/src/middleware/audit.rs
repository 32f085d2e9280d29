//! Security audit logging
//!
//! Every security-relevant event (sanitized user input, blocked uploads,
//! authentication failures, artwork creation and deletion) becomes one
//! [`SecurityAuditEntry`], logged as JSON on the `audit` tracing target so it
//! can be routed separately from application logs.

use atelier_core::validation::matched_dangerous_patterns;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Audited action
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    InputSanitized,
    UploadBlocked,
    ArtworkUploaded,
    ArtworkDeleted,
    AuthenticationFailure,
}

/// Structured audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct SecurityAuditEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    /// Raw input as received (user text, filename, or a short description)
    pub input: String,
    /// What was kept after sanitization
    pub sanitized: String,
    /// Whether the input contained a denylisted construct
    pub dangerous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SecurityAuditEntry {
    pub fn new(action: AuditAction, input: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: None,
            action,
            input: input.into(),
            sanitized: String::new(),
            dangerous: false,
            ip_address: None,
            details: None,
        }
    }

    pub fn with_user_id(mut self, user_id: Option<Uuid>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_sanitized(mut self, sanitized: impl Into<String>) -> Self {
        self.sanitized = sanitized.into();
        self
    }

    pub fn with_dangerous(mut self, dangerous: bool) -> Self {
        self.dangerous = dangerous;
        self
    }

    pub fn with_ip_address(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_failure(&self) -> bool {
        matches!(
            self.action,
            AuditAction::UploadBlocked | AuditAction::AuthenticationFailure
        )
    }

    /// Emit the entry on the `audit` target. Dangerous input and failures log at WARN.
    pub fn log(&self) {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());

        if self.dangerous || self.is_failure() {
            tracing::event!(
                target: "audit",
                tracing::Level::WARN,
                audit_entry = %json,
                action = ?self.action,
                user_id = ?self.user_id,
                dangerous = self.dangerous,
                "Security audit log - suspicious"
            );
        } else {
            tracing::event!(
                target: "audit",
                tracing::Level::INFO,
                audit_entry = %json,
                action = ?self.action,
                user_id = ?self.user_id,
                "Security audit log"
            );
        }
    }
}

/// Log a sanitized text field. Quiet (nothing logged) when sanitization
/// changed nothing.
pub fn log_sanitization(
    user_id: Option<Uuid>,
    field: &str,
    original: &str,
    sanitized: &str,
    ip_address: Option<String>,
) {
    if original.trim() == sanitized {
        return;
    }

    let patterns = matched_dangerous_patterns(original);
    SecurityAuditEntry::new(AuditAction::InputSanitized, original)
        .with_user_id(user_id)
        .with_sanitized(sanitized)
        .with_dangerous(!patterns.is_empty())
        .with_ip_address(ip_address)
        .with_details(serde_json::json!({
            "field": field,
            "patterns": patterns,
        }))
        .log();
}

pub fn log_upload_blocked(
    user_id: Uuid,
    filename: &str,
    reason: &str,
    ip_address: Option<String>,
) {
    SecurityAuditEntry::new(AuditAction::UploadBlocked, filename)
        .with_user_id(Some(user_id))
        .with_dangerous(true)
        .with_ip_address(ip_address)
        .with_details(serde_json::json!({ "reason": reason }))
        .log();
}

pub fn log_artwork_uploaded(
    user_id: Uuid,
    artwork_id: Uuid,
    original_filename: &str,
    stored_filename: &str,
    file_size: i64,
    ip_address: Option<String>,
) {
    SecurityAuditEntry::new(AuditAction::ArtworkUploaded, original_filename)
        .with_user_id(Some(user_id))
        .with_sanitized(stored_filename)
        .with_dangerous(contains_dangerous_filename(original_filename))
        .with_ip_address(ip_address)
        .with_details(serde_json::json!({
            "artwork_id": artwork_id,
            "file_size": file_size,
        }))
        .log();
}

pub fn log_artwork_deleted(user_id: Uuid, artwork_id: Uuid, ip_address: Option<String>) {
    SecurityAuditEntry::new(AuditAction::ArtworkDeleted, artwork_id.to_string())
        .with_user_id(Some(user_id))
        .with_ip_address(ip_address)
        .log();
}

pub fn log_authentication_failure(reason: &str, ip_address: Option<String>) {
    SecurityAuditEntry::new(AuditAction::AuthenticationFailure, reason)
        .with_ip_address(ip_address)
        .log();
}

fn contains_dangerous_filename(name: &str) -> bool {
    name.contains("..") || name.contains('/') || name.contains('\\') || name.contains('\0')
}
