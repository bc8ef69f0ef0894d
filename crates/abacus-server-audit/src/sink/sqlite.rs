// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![cfg(feature = "sink-sqlite")]

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::AuditSinkError;
use crate::event::AuditEvent;
use crate::sink::AuditSink;

pub struct SqliteAuditSink {
	pool: SqlitePool,
	name: String,
}

impl SqliteAuditSink {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			pool,
			name: "sqlite".to_string(),
		}
	}

	/// Create the audit table if it does not exist yet.
	pub async fn ensure_schema(&self) -> Result<(), AuditSinkError> {
		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS audit_events (
				id TEXT PRIMARY KEY,
				timestamp TEXT NOT NULL,
				event_type TEXT NOT NULL,
				severity TEXT NOT NULL,
				user_id INTEGER,
				username TEXT,
				ip_address TEXT,
				user_agent TEXT,
				resource TEXT,
				action TEXT,
				details TEXT NOT NULL,
				success INTEGER NOT NULL,
				created_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await
		.map_err(map_sqlx_error)?;

		Ok(())
	}
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
	fn name(&self) -> &str {
		&self.name
	}

	async fn write_batch(&self, batch: &[AuditEvent]) -> Result<(), AuditSinkError> {
		// One transaction per batch: either every event lands or none do,
		// so a failed batch can be requeued without duplication.
		let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

		let now = chrono::Utc::now();

		for event in batch {
			let details_json = serde_json::to_string(&event.details)
				.map_err(|e| AuditSinkError::Permanent(format!("failed to serialize details: {e}")))?;

			sqlx::query(
				r#"
				INSERT INTO audit_events (
					id, timestamp, event_type, severity, user_id, username,
					ip_address, user_agent, resource, action, details, success,
					created_at
				) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
				"#,
			)
			.bind(event.id.to_string())
			.bind(event.timestamp.to_rfc3339())
			.bind(event.event_type.to_string())
			.bind(event.severity.to_string())
			.bind(event.user_id.map(i64::from))
			.bind(&event.username)
			.bind(&event.ip_address)
			.bind(&event.user_agent)
			.bind(&event.resource)
			.bind(&event.action)
			.bind(&details_json)
			.bind(event.success)
			.bind(now.to_rfc3339())
			.execute(&mut *tx)
			.await
			.map_err(map_sqlx_error)?;
		}

		tx.commit().await.map_err(map_sqlx_error)?;

		Ok(())
	}

	async fn health_check(&self) -> Result<(), AuditSinkError> {
		sqlx::query("SELECT 1")
			.execute(&self.pool)
			.await
			.map_err(|e| AuditSinkError::Transient(format!("health check failed: {e}")))?;
		Ok(())
	}
}

fn map_sqlx_error(e: sqlx::Error) -> AuditSinkError {
	if is_transient_error(&e) {
		AuditSinkError::Transient(format!("database error: {e}"))
	} else {
		AuditSinkError::Permanent(format!("database error: {e}"))
	}
}

fn is_transient_error(e: &sqlx::Error) -> bool {
	match e {
		sqlx::Error::Io(_) => true,
		sqlx::Error::PoolTimedOut => true,
		sqlx::Error::PoolClosed => true,
		sqlx::Error::Database(db_err) => {
			let msg = db_err.message().to_lowercase();
			msg.contains("busy") || msg.contains("locked") || msg.contains("timeout")
		}
		_ => false,
	}
}
