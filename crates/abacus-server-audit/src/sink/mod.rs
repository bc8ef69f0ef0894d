// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod memory;
#[cfg(feature = "sink-sqlite")]
pub mod sqlite;

use async_trait::async_trait;

use crate::error::AuditSinkError;
use crate::event::AuditEvent;

pub use memory::MemoryAuditSink;
#[cfg(feature = "sink-sqlite")]
pub use sqlite::SqliteAuditSink;

/// Destination for durable audit batches.
///
/// The flush controller hands over an ordered batch and expects an
/// all-or-nothing answer; partial writes must be reported as failure so the
/// whole batch can be requeued. Storage layout is the sink's own business.
#[async_trait]
pub trait AuditSink: Send + Sync {
	fn name(&self) -> &str;

	/// Persist an ordered batch of events as one unit.
	async fn write_batch(&self, batch: &[AuditEvent]) -> Result<(), AuditSinkError>;

	async fn health_check(&self) -> Result<(), AuditSinkError> {
		Ok(())
	}
}
