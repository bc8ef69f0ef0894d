// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Named emitters for every auditable situation.
//!
//! Call sites never hand-assemble a raw [`AuditEvent`]: each emitter fixes
//! the type/severity/success pairing for its situation, forwards the caller's
//! request context, and submits through the same path as direct submission.
//! A malformed record (missing type, inconsistent pairing) is structurally
//! unreachable from this vocabulary.

use serde_json::Value;

use crate::event::{AuditEvent, AuditEventType, UserId};
use crate::pipeline::AuditService;

/// Caller identity and network origin forwarded into every emitted record.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	pub user_id: Option<UserId>,
	/// May be set without a resolved `user_id`, e.g. a failed login against
	/// an unknown account.
	pub username: Option<String>,
	pub ip_address: Option<String>,
	pub user_agent: Option<String>,
}

impl RequestContext {
	/// Context for an unauthenticated request.
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// Context for a resolved user.
	pub fn for_user(user_id: UserId, username: impl Into<String>) -> Self {
		Self {
			user_id: Some(user_id),
			username: Some(username.into()),
			..Self::default()
		}
	}

	pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
		self.ip_address = Some(ip.into());
		self
	}

	pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
		self.user_agent = Some(ua.into());
		self
	}
}

impl AuditService {
	async fn emit(
		&self,
		event_type: AuditEventType,
		ctx: RequestContext,
		resource: Option<String>,
		details: Value,
	) {
		let mut builder = AuditEvent::builder(event_type).details(details);
		if let Some(user_id) = ctx.user_id {
			builder = builder.user(user_id);
		}
		if let Some(username) = ctx.username {
			builder = builder.username(username);
		}
		if let Some(ip) = ctx.ip_address {
			builder = builder.ip_address(ip);
		}
		if let Some(ua) = ctx.user_agent {
			builder = builder.user_agent(ua);
		}
		if let Some(resource) = resource {
			builder = builder.resource(resource);
		}
		self.submit(builder.build()).await;
	}

	// Authentication events

	pub async fn login_success(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::LoginSuccess, ctx, None, details).await;
	}

	/// Recorded for every rejected credential check, known account or not.
	pub async fn login_failed(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::LoginFailed, ctx, None, details).await;
	}

	pub async fn logout(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::Logout, ctx, None, details).await;
	}

	pub async fn password_changed(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::PasswordChanged, ctx, None, details).await;
	}

	pub async fn password_reset_requested(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::PasswordResetRequested, ctx, None, details)
			.await;
	}

	// Two-factor lifecycle events

	pub async fn two_factor_enabled(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::TwoFactorEnabled, ctx, None, details).await;
	}

	pub async fn two_factor_disabled(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::TwoFactorDisabled, ctx, None, details).await;
	}

	pub async fn two_factor_success(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::TwoFactorSuccess, ctx, None, details).await;
	}

	/// High severity: flushed synchronously before this call returns.
	pub async fn two_factor_failed(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::TwoFactorFailed, ctx, None, details).await;
	}

	pub async fn backup_code_used(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::BackupCodeUsed, ctx, None, details).await;
	}

	// User and role administration events
	//
	// `target` names the account or role binding being administered, which is
	// usually not the acting user.

	pub async fn user_created(&self, ctx: RequestContext, target: impl Into<String>, details: Value) {
		self.emit(AuditEventType::UserCreated, ctx, Some(target.into()), details)
			.await;
	}

	pub async fn user_updated(&self, ctx: RequestContext, target: impl Into<String>, details: Value) {
		self.emit(AuditEventType::UserUpdated, ctx, Some(target.into()), details)
			.await;
	}

	pub async fn user_deleted(&self, ctx: RequestContext, target: impl Into<String>, details: Value) {
		self.emit(AuditEventType::UserDeleted, ctx, Some(target.into()), details)
			.await;
	}

	pub async fn user_locked(&self, ctx: RequestContext, target: impl Into<String>, details: Value) {
		self.emit(AuditEventType::UserLocked, ctx, Some(target.into()), details)
			.await;
	}

	pub async fn user_unlocked(
		&self,
		ctx: RequestContext,
		target: impl Into<String>,
		details: Value,
	) {
		self.emit(AuditEventType::UserUnlocked, ctx, Some(target.into()), details)
			.await;
	}

	pub async fn role_assigned(
		&self,
		ctx: RequestContext,
		target: impl Into<String>,
		details: Value,
	) {
		self.emit(AuditEventType::RoleAssigned, ctx, Some(target.into()), details)
			.await;
	}

	pub async fn role_removed(&self, ctx: RequestContext, target: impl Into<String>, details: Value) {
		self.emit(AuditEventType::RoleRemoved, ctx, Some(target.into()), details)
			.await;
	}

	// Authorization events

	pub async fn permission_granted(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(
			AuditEventType::PermissionGranted,
			ctx,
			Some(resource.into()),
			details,
		)
		.await;
	}

	pub async fn permission_revoked(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(
			AuditEventType::PermissionRevoked,
			ctx,
			Some(resource.into()),
			details,
		)
		.await;
	}

	/// High severity: flushed synchronously before this call returns.
	pub async fn access_denied(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(AuditEventType::AccessDenied, ctx, Some(resource.into()), details)
			.await;
	}

	// Data operation events

	pub async fn data_exported(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(AuditEventType::DataExported, ctx, Some(resource.into()), details)
			.await;
	}

	pub async fn data_imported(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(AuditEventType::DataImported, ctx, Some(resource.into()), details)
			.await;
	}

	/// High severity: flushed synchronously before this call returns.
	pub async fn bulk_delete(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(AuditEventType::BulkDelete, ctx, Some(resource.into()), details)
			.await;
	}

	pub async fn sensitive_data_accessed(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(
			AuditEventType::SensitiveDataAccessed,
			ctx,
			Some(resource.into()),
			details,
		)
		.await;
	}

	// System operation events

	pub async fn config_changed(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(AuditEventType::ConfigChanged, ctx, Some(resource.into()), details)
			.await;
	}

	pub async fn api_key_created(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::ApiKeyCreated, ctx, None, details).await;
	}

	pub async fn api_key_revoked(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::ApiKeyRevoked, ctx, None, details).await;
	}

	/// High severity: flushed synchronously before this call returns.
	pub async fn rate_limit_exceeded(
		&self,
		ctx: RequestContext,
		resource: impl Into<String>,
		details: Value,
	) {
		self.emit(
			AuditEventType::RateLimitExceeded,
			ctx,
			Some(resource.into()),
			details,
		)
		.await;
	}

	/// Critical severity: flushed synchronously before this call returns.
	pub async fn suspicious_activity(&self, ctx: RequestContext, details: Value) {
		self.emit(AuditEventType::SuspiciousActivity, ctx, None, details).await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::AuditSeverity;
	use crate::sink::{AuditSink, MemoryAuditSink};
	use abacus_server_config::AuditConfig;
	use serde_json::json;
	use std::sync::Arc;

	fn service_with_sink() -> (Arc<AuditService>, Arc<MemoryAuditSink>) {
		let sink = Arc::new(MemoryAuditSink::new());
		let config = AuditConfig {
			enabled: true,
			buffer_size: 100,
			flush_interval_secs: 3600,
			write_timeout_ms: 5000,
		};
		let service = AuditService::new(Arc::clone(&sink) as Arc<dyn AuditSink>, config);
		(service, sink)
	}

	#[tokio::test]
	async fn test_login_failed_fixed_pairing() {
		// The pairing holds regardless of what details the caller passes.
		for details in [
			json!(null),
			json!({"reason": "bad_password", "attempt": 3}),
			json!({"anything": "goes"}),
		] {
			let (service, sink) = service_with_sink();
			service
				.login_failed(
					RequestContext::anonymous().ip_address("198.51.100.7"),
					details,
				)
				.await;
			service.flush().await;

			let event = &sink.events()[0];
			assert_eq!(event.event_type, crate::event::AuditEventType::LoginFailed);
			assert_eq!(event.severity, AuditSeverity::Medium);
			assert!(!event.success);
		}
	}

	#[tokio::test]
	async fn test_context_and_details_forwarded() {
		let (service, sink) = service_with_sink();

		let ctx = RequestContext::for_user(UserId::new(42), "jdoe")
			.ip_address("10.1.2.3")
			.user_agent("abacus-web/2.4");
		service
			.data_exported(ctx, "customers.csv", json!({"rows": 812}))
			.await;
		service.flush().await;

		let event = &sink.events()[0];
		assert_eq!(event.user_id, Some(UserId::new(42)));
		assert_eq!(event.username.as_deref(), Some("jdoe"));
		assert_eq!(event.ip_address.as_deref(), Some("10.1.2.3"));
		assert_eq!(event.user_agent.as_deref(), Some("abacus-web/2.4"));
		assert_eq!(event.resource.as_deref(), Some("customers.csv"));
		assert_eq!(event.details["rows"], 812);
		assert_eq!(event.severity, AuditSeverity::Medium);
		assert!(event.success);
	}

	#[tokio::test]
	async fn test_suspicious_activity_flushes_immediately() {
		let (service, sink) = service_with_sink();

		service
			.suspicious_activity(
				RequestContext::anonymous().ip_address("203.0.113.50"),
				json!({"reason": "journal_entry_tampering"}),
			)
			.await;

		// No explicit flush: the Critical severity forced one.
		assert_eq!(sink.batch_count(), 1);
		let event = &sink.events()[0];
		assert_eq!(event.severity, AuditSeverity::Critical);
		assert!(!event.success);
	}

	#[tokio::test]
	async fn test_access_denied_carries_resource() {
		let (service, sink) = service_with_sink();

		service
			.access_denied(
				RequestContext::for_user(UserId::new(9), "intern"),
				"journal:2026-08",
				json!({"required_role": "controller"}),
			)
			.await;

		// High severity also flushes inline.
		let event = &sink.events()[0];
		assert_eq!(event.event_type, crate::event::AuditEventType::AccessDenied);
		assert_eq!(event.resource.as_deref(), Some("journal:2026-08"));
		assert_eq!(event.severity, AuditSeverity::High);
		assert!(!event.success);
	}

	#[tokio::test]
	async fn test_low_severity_emitters_batch() {
		let (service, sink) = service_with_sink();

		let ctx = RequestContext::for_user(UserId::new(1), "alice");
		service.login_success(ctx.clone(), json!(null)).await;
		service.logout(ctx, json!(null)).await;

		assert_eq!(sink.batch_count(), 0);
		assert_eq!(service.pending(), 2);
	}
}
