// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory sink retaining each written batch, mainly for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AuditSinkError;
use crate::event::AuditEvent;
use crate::sink::AuditSink;

#[derive(Debug, Default)]
pub struct MemoryAuditSink {
	batches: Mutex<Vec<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
	pub fn new() -> Self {
		Self::default()
	}

	/// All batches written so far, in write order.
	pub fn batches(&self) -> Vec<Vec<AuditEvent>> {
		self.batches.lock().expect("memory sink lock poisoned").clone()
	}

	/// All events written so far, flattened across batches.
	pub fn events(&self) -> Vec<AuditEvent> {
		self.batches().into_iter().flatten().collect()
	}

	pub fn batch_count(&self) -> usize {
		self.batches.lock().expect("memory sink lock poisoned").len()
	}
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
	fn name(&self) -> &str {
		"memory"
	}

	async fn write_batch(&self, batch: &[AuditEvent]) -> Result<(), AuditSinkError> {
		self.batches
			.lock()
			.expect("memory sink lock poisoned")
			.push(batch.to_vec());
		Ok(())
	}
}
