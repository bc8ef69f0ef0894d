// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core event types for the security audit log.
//!
//! This module provides the foundational types for the audit subsystem:
//!
//! - [`AuditEventType`]: Closed enumeration of all auditable events
//! - [`AuditSeverity`]: Four-level risk classification driving flush urgency
//! - [`AuditEvent`]: Complete audit record, immutable once built
//! - [`AuditEventBuilder`]: Fluent API for constructing records
//!
//! Timestamps are assigned when a record is built, never when it is flushed,
//! so forensic timing survives a delayed or retried flush.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Types of events that can be recorded in the security audit log.
///
/// This set is closed: event types are never inferred from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	// Authentication events
	LoginSuccess,
	LoginFailed,
	Logout,
	PasswordChanged,
	PasswordResetRequested,

	// Two-factor lifecycle events
	TwoFactorEnabled,
	TwoFactorDisabled,
	TwoFactorSuccess,
	TwoFactorFailed,
	BackupCodeUsed,

	// User and role administration events
	UserCreated,
	UserUpdated,
	UserDeleted,
	UserLocked,
	UserUnlocked,
	RoleAssigned,
	RoleRemoved,

	// Authorization events
	PermissionGranted,
	PermissionRevoked,
	AccessDenied,

	// Data operation events
	DataExported,
	DataImported,
	BulkDelete,
	SensitiveDataAccessed,

	// System operation events
	ConfigChanged,
	ApiKeyCreated,
	ApiKeyRevoked,
	RateLimitExceeded,
	SuspiciousActivity,
}

impl fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			// Authentication events
			AuditEventType::LoginSuccess => "login_success",
			AuditEventType::LoginFailed => "login_failed",
			AuditEventType::Logout => "logout",
			AuditEventType::PasswordChanged => "password_changed",
			AuditEventType::PasswordResetRequested => "password_reset_requested",

			// Two-factor lifecycle events
			AuditEventType::TwoFactorEnabled => "two_factor_enabled",
			AuditEventType::TwoFactorDisabled => "two_factor_disabled",
			AuditEventType::TwoFactorSuccess => "two_factor_success",
			AuditEventType::TwoFactorFailed => "two_factor_failed",
			AuditEventType::BackupCodeUsed => "backup_code_used",

			// User and role administration events
			AuditEventType::UserCreated => "user_created",
			AuditEventType::UserUpdated => "user_updated",
			AuditEventType::UserDeleted => "user_deleted",
			AuditEventType::UserLocked => "user_locked",
			AuditEventType::UserUnlocked => "user_unlocked",
			AuditEventType::RoleAssigned => "role_assigned",
			AuditEventType::RoleRemoved => "role_removed",

			// Authorization events
			AuditEventType::PermissionGranted => "permission_granted",
			AuditEventType::PermissionRevoked => "permission_revoked",
			AuditEventType::AccessDenied => "access_denied",

			// Data operation events
			AuditEventType::DataExported => "data_exported",
			AuditEventType::DataImported => "data_imported",
			AuditEventType::BulkDelete => "bulk_delete",
			AuditEventType::SensitiveDataAccessed => "sensitive_data_accessed",

			// System operation events
			AuditEventType::ConfigChanged => "config_changed",
			AuditEventType::ApiKeyCreated => "api_key_created",
			AuditEventType::ApiKeyRevoked => "api_key_revoked",
			AuditEventType::RateLimitExceeded => "rate_limit_exceeded",
			AuditEventType::SuspiciousActivity => "suspicious_activity",
		};
		write!(f, "{s}")
	}
}

impl AuditEventType {
	/// Returns the inherent severity for this event type.
	///
	/// Severity reflects the risk of the situation itself, not the outcome:
	/// - `Low`: Routine operations (login success, logout)
	/// - `Medium`: Security-relevant changes and failures worth batching
	/// - `High`: Events that must reach durable storage immediately
	/// - `Critical`: Active threat indicators
	pub fn default_severity(&self) -> AuditSeverity {
		match self {
			// Low: Routine operations
			AuditEventType::LoginSuccess
			| AuditEventType::Logout
			| AuditEventType::TwoFactorEnabled
			| AuditEventType::TwoFactorSuccess
			| AuditEventType::UserCreated
			| AuditEventType::UserUpdated => AuditSeverity::Low,

			// Medium: Security-relevant changes and recoverable failures
			AuditEventType::LoginFailed
			| AuditEventType::PasswordChanged
			| AuditEventType::PasswordResetRequested
			| AuditEventType::TwoFactorDisabled
			| AuditEventType::BackupCodeUsed
			| AuditEventType::UserDeleted
			| AuditEventType::UserLocked
			| AuditEventType::UserUnlocked
			| AuditEventType::RoleAssigned
			| AuditEventType::RoleRemoved
			| AuditEventType::PermissionGranted
			| AuditEventType::PermissionRevoked
			| AuditEventType::DataExported
			| AuditEventType::DataImported
			| AuditEventType::SensitiveDataAccessed
			| AuditEventType::ConfigChanged
			| AuditEventType::ApiKeyCreated
			| AuditEventType::ApiKeyRevoked => AuditSeverity::Medium,

			// High: Must not be lost to a crash between append and timer
			AuditEventType::TwoFactorFailed
			| AuditEventType::AccessDenied
			| AuditEventType::BulkDelete
			| AuditEventType::RateLimitExceeded => AuditSeverity::High,

			// Critical: Active threat indicators
			AuditEventType::SuspiciousActivity => AuditSeverity::Critical,
		}
	}

	/// Returns the inherent outcome flag for this event type.
	///
	/// Outcome is independent of severity: a low-severity event can be a
	/// failure and a critical one a success.
	pub fn default_success(&self) -> bool {
		!matches!(
			self,
			AuditEventType::LoginFailed
				| AuditEventType::TwoFactorFailed
				| AuditEventType::AccessDenied
				| AuditEventType::RateLimitExceeded
				| AuditEventType::SuspiciousActivity
		)
	}
}

/// Severity levels for audit events.
///
/// The ordering `Low < Medium < High < Critical` drives flush urgency:
/// `High` and `Critical` events are flushed synchronously on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
	Low,
	Medium,
	High,
	Critical,
}

impl AuditSeverity {
	/// Whether an event of this severity forces a synchronous flush.
	pub fn requires_immediate_flush(&self) -> bool {
		matches!(self, AuditSeverity::High | AuditSeverity::Critical)
	}

	/// Returns all severity levels from least to most severe.
	pub fn all() -> &'static [AuditSeverity] {
		&[
			AuditSeverity::Low,
			AuditSeverity::Medium,
			AuditSeverity::High,
			AuditSeverity::Critical,
		]
	}
}

impl fmt::Display for AuditSeverity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditSeverity::Low => "low",
			AuditSeverity::Medium => "medium",
			AuditSeverity::High => "high",
			AuditSeverity::Critical => "critical",
		};
		write!(f, "{s}")
	}
}

/// A numeric identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
	pub fn new(id: i64) -> Self {
		Self(id)
	}

	pub fn into_inner(self) -> i64 {
		self.0
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<i64> for UserId {
	fn from(id: i64) -> Self {
		Self(id)
	}
}

impl From<UserId> for i64 {
	fn from(id: UserId) -> Self {
		id.0
	}
}

/// One normalized entry in the security audit log.
///
/// Immutable once built: the buffer only ever appends or drains records,
/// never mutates them in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
	/// Unique identifier for this record.
	pub id: Uuid,
	/// When the event occurred (assigned at construction, not at flush).
	pub timestamp: DateTime<Utc>,
	/// The type of event.
	pub event_type: AuditEventType,
	/// The severity level of this event.
	pub severity: AuditSeverity,

	/// The user who performed the action (if resolved).
	pub user_id: Option<UserId>,
	/// Display identity; may be present without a resolved `user_id`,
	/// e.g. failed logins against unknown accounts.
	pub username: Option<String>,

	/// IP address of the request origin.
	pub ip_address: Option<String>,
	/// User agent string from the request.
	pub user_agent: Option<String>,

	/// The entity or endpoint affected (e.g. "invoice:1042", "/api/exports").
	pub resource: Option<String>,
	/// Human-readable description of the action.
	pub action: Option<String>,
	/// Additional event-specific details (reason codes, record counts, ...).
	pub details: serde_json::Value,

	/// Outcome flag, independent of severity.
	pub success: bool,
}

impl AuditEvent {
	/// Create a new audit event builder for the given event type.
	pub fn builder(event_type: AuditEventType) -> AuditEventBuilder {
		AuditEventBuilder::new(event_type)
	}
}

/// Builder for constructing audit events with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditEventBuilder {
	event_type: AuditEventType,
	severity: Option<AuditSeverity>,
	user_id: Option<UserId>,
	username: Option<String>,
	ip_address: Option<String>,
	user_agent: Option<String>,
	resource: Option<String>,
	action: Option<String>,
	details: serde_json::Value,
	success: Option<bool>,
}

impl AuditEventBuilder {
	/// Create a new builder for the given event type.
	pub fn new(event_type: AuditEventType) -> Self {
		Self {
			event_type,
			severity: None,
			user_id: None,
			username: None,
			ip_address: None,
			user_agent: None,
			resource: None,
			action: None,
			details: serde_json::Value::Null,
			success: None,
		}
	}

	/// Set the severity level. Defaults to the event type's inherent severity.
	pub fn severity(mut self, severity: AuditSeverity) -> Self {
		self.severity = Some(severity);
		self
	}

	/// Set the acting user's numeric identifier.
	pub fn user(mut self, user_id: UserId) -> Self {
		self.user_id = Some(user_id);
		self
	}

	/// Set the acting user's display identity.
	pub fn username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());
		self
	}

	/// Set the IP address of the request origin.
	pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
		self.ip_address = Some(ip.into());
		self
	}

	/// Set the user agent string from the request.
	pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
		self.user_agent = Some(ua.into());
		self
	}

	/// Set the entity or endpoint affected by this event.
	pub fn resource(mut self, resource: impl Into<String>) -> Self {
		self.resource = Some(resource.into());
		self
	}

	/// Set the human-readable action description.
	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	/// Set additional event-specific details.
	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}

	/// Set the outcome flag. Defaults to the event type's inherent outcome.
	pub fn success(mut self, success: bool) -> Self {
		self.success = Some(success);
		self
	}

	/// Build the audit event, stamping id and timestamp.
	pub fn build(self) -> AuditEvent {
		AuditEvent {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			event_type: self.event_type,
			severity: self
				.severity
				.unwrap_or_else(|| self.event_type.default_severity()),
			user_id: self.user_id,
			username: self.username,
			ip_address: self.ip_address,
			user_agent: self.user_agent,
			resource: self.resource,
			action: self.action,
			details: self.details,
			success: self
				.success
				.unwrap_or_else(|| self.event_type.default_success()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	const ALL_EVENT_TYPES: [AuditEventType; 29] = [
		AuditEventType::LoginSuccess,
		AuditEventType::LoginFailed,
		AuditEventType::Logout,
		AuditEventType::PasswordChanged,
		AuditEventType::PasswordResetRequested,
		AuditEventType::TwoFactorEnabled,
		AuditEventType::TwoFactorDisabled,
		AuditEventType::TwoFactorSuccess,
		AuditEventType::TwoFactorFailed,
		AuditEventType::BackupCodeUsed,
		AuditEventType::UserCreated,
		AuditEventType::UserUpdated,
		AuditEventType::UserDeleted,
		AuditEventType::UserLocked,
		AuditEventType::UserUnlocked,
		AuditEventType::RoleAssigned,
		AuditEventType::RoleRemoved,
		AuditEventType::PermissionGranted,
		AuditEventType::PermissionRevoked,
		AuditEventType::AccessDenied,
		AuditEventType::DataExported,
		AuditEventType::DataImported,
		AuditEventType::BulkDelete,
		AuditEventType::SensitiveDataAccessed,
		AuditEventType::ConfigChanged,
		AuditEventType::ApiKeyCreated,
		AuditEventType::ApiKeyRevoked,
		AuditEventType::RateLimitExceeded,
		AuditEventType::SuspiciousActivity,
	];

	mod audit_event_type {
		use super::*;

		#[test]
		fn display_returns_snake_case() {
			assert_eq!(AuditEventType::LoginSuccess.to_string(), "login_success");
			assert_eq!(AuditEventType::LoginFailed.to_string(), "login_failed");
			assert_eq!(
				AuditEventType::TwoFactorFailed.to_string(),
				"two_factor_failed"
			);
			assert_eq!(AuditEventType::AccessDenied.to_string(), "access_denied");
			assert_eq!(
				AuditEventType::SensitiveDataAccessed.to_string(),
				"sensitive_data_accessed"
			);
			assert_eq!(
				AuditEventType::SuspiciousActivity.to_string(),
				"suspicious_activity"
			);
		}

		#[test]
		fn serde_matches_display() {
			for event in ALL_EVENT_TYPES {
				let json = serde_json::to_string(&event).unwrap();
				assert_eq!(json, format!("\"{event}\""));
			}
		}

		#[test]
		fn fixed_severity_pairings() {
			assert_eq!(
				AuditEventType::LoginSuccess.default_severity(),
				AuditSeverity::Low
			);
			assert_eq!(
				AuditEventType::LoginFailed.default_severity(),
				AuditSeverity::Medium
			);
			assert_eq!(
				AuditEventType::TwoFactorFailed.default_severity(),
				AuditSeverity::High
			);
			assert_eq!(
				AuditEventType::AccessDenied.default_severity(),
				AuditSeverity::High
			);
			assert_eq!(
				AuditEventType::RateLimitExceeded.default_severity(),
				AuditSeverity::High
			);
			assert_eq!(
				AuditEventType::DataExported.default_severity(),
				AuditSeverity::Medium
			);
			assert_eq!(
				AuditEventType::SuspiciousActivity.default_severity(),
				AuditSeverity::Critical
			);
		}

		#[test]
		fn fixed_outcome_pairings() {
			assert!(AuditEventType::LoginSuccess.default_success());
			assert!(AuditEventType::DataExported.default_success());
			assert!(!AuditEventType::LoginFailed.default_success());
			assert!(!AuditEventType::TwoFactorFailed.default_success());
			assert!(!AuditEventType::AccessDenied.default_success());
			assert!(!AuditEventType::RateLimitExceeded.default_success());
			assert!(!AuditEventType::SuspiciousActivity.default_success());
		}
	}

	mod audit_severity {
		use super::*;

		#[test]
		fn ordering_low_to_critical() {
			assert!(AuditSeverity::Low < AuditSeverity::Medium);
			assert!(AuditSeverity::Medium < AuditSeverity::High);
			assert!(AuditSeverity::High < AuditSeverity::Critical);
		}

		#[test]
		fn immediate_flush_only_for_high_and_critical() {
			assert!(!AuditSeverity::Low.requires_immediate_flush());
			assert!(!AuditSeverity::Medium.requires_immediate_flush());
			assert!(AuditSeverity::High.requires_immediate_flush());
			assert!(AuditSeverity::Critical.requires_immediate_flush());
		}

		#[test]
		fn all_returns_ascending() {
			let all = AuditSeverity::all();
			assert_eq!(all.len(), 4);
			for pair in all.windows(2) {
				assert!(pair[0] < pair[1]);
			}
		}

		#[test]
		fn serializes_snake_case() {
			assert_eq!(
				serde_json::to_string(&AuditSeverity::Critical).unwrap(),
				"\"critical\""
			);
			let parsed: AuditSeverity = serde_json::from_str("\"medium\"").unwrap();
			assert_eq!(parsed, AuditSeverity::Medium);
		}
	}

	mod audit_event_builder {
		use super::*;

		#[test]
		fn builds_minimal_event() {
			let event = AuditEvent::builder(AuditEventType::Logout).build();

			assert_eq!(event.event_type, AuditEventType::Logout);
			assert_eq!(event.severity, AuditSeverity::Low);
			assert!(event.success);
			assert!(event.user_id.is_none());
			assert!(event.username.is_none());
			assert!(event.ip_address.is_none());
			assert!(event.user_agent.is_none());
			assert!(event.resource.is_none());
			assert!(event.action.is_none());
			assert_eq!(event.details, serde_json::Value::Null);
		}

		#[test]
		fn builds_full_event() {
			let event = AuditEvent::builder(AuditEventType::AccessDenied)
				.user(UserId::new(42))
				.username("jdoe")
				.ip_address("10.0.0.1")
				.user_agent("Mozilla/5.0")
				.resource("invoice:1042")
				.action("Attempted to open another company's invoice")
				.details(json!({"required_permission": "invoice.read"}))
				.build();

			assert_eq!(event.event_type, AuditEventType::AccessDenied);
			assert_eq!(event.severity, AuditSeverity::High);
			assert!(!event.success);
			assert_eq!(event.user_id, Some(UserId::new(42)));
			assert_eq!(event.username, Some("jdoe".to_string()));
			assert_eq!(event.ip_address, Some("10.0.0.1".to_string()));
			assert_eq!(event.resource, Some("invoice:1042".to_string()));
			assert_eq!(event.details["required_permission"], "invoice.read");
		}

		#[test]
		fn username_without_user_id() {
			// Failed logins against unknown accounts carry only the attempted name.
			let event = AuditEvent::builder(AuditEventType::LoginFailed)
				.username("not-a-real-user")
				.build();

			assert!(event.user_id.is_none());
			assert_eq!(event.username, Some("not-a-real-user".to_string()));
			assert!(!event.success);
		}

		#[test]
		fn explicit_severity_and_success_override_defaults() {
			let event = AuditEvent::builder(AuditEventType::DataExported)
				.severity(AuditSeverity::High)
				.success(false)
				.build();

			assert_eq!(event.severity, AuditSeverity::High);
			assert!(!event.success);
		}

		#[test]
		fn sets_timestamp_at_construction() {
			let before = Utc::now();
			let event = AuditEvent::builder(AuditEventType::LoginSuccess).build();
			let after = Utc::now();

			assert!(event.timestamp >= before);
			assert!(event.timestamp <= after);
		}

		#[test]
		fn generates_unique_ids() {
			let a = AuditEvent::builder(AuditEventType::LoginSuccess).build();
			let b = AuditEvent::builder(AuditEventType::LoginSuccess).build();
			assert_ne!(a.id, b.id);
		}

		#[test]
		fn serde_roundtrip() {
			let original = AuditEvent::builder(AuditEventType::RoleAssigned)
				.user(UserId::new(7))
				.resource("user:19")
				.details(json!({"role": "accountant"}))
				.build();

			let json = serde_json::to_string(&original).unwrap();
			let restored: AuditEvent = serde_json::from_str(&json).unwrap();

			assert_eq!(restored.id, original.id);
			assert_eq!(restored.event_type, AuditEventType::RoleAssigned);
			assert_eq!(restored.severity, AuditSeverity::Medium);
			assert_eq!(restored.user_id, Some(UserId::new(7)));
			assert_eq!(restored.details["role"], "accountant");
		}
	}

	mod proptest_tests {
		use super::*;

		fn arb_event_type() -> impl Strategy<Value = AuditEventType> {
			prop::sample::select(ALL_EVENT_TYPES.to_vec())
		}

		proptest! {
			#[test]
			fn every_type_has_severity_and_outcome(event_type in arb_event_type()) {
				// Exercise the exhaustive matches; the compiler keeps them closed.
				let _ = event_type.default_severity();
				let _ = event_type.default_success();
			}

			#[test]
			fn builder_with_arbitrary_strings(
				username in "[a-z0-9._-]{1,32}",
				ip in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
			) {
				let event = AuditEvent::builder(AuditEventType::LoginFailed)
					.username(&username)
					.ip_address(&ip)
					.build();

				prop_assert_eq!(event.username, Some(username));
				prop_assert_eq!(event.ip_address, Some(ip));
				prop_assert_eq!(event.severity, AuditSeverity::Medium);
				prop_assert!(!event.success);
			}
		}
	}
}
