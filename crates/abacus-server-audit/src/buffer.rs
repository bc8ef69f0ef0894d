// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process buffer for audit events awaiting a durable write.
//!
//! The buffer is append-only: records enter at the tail, leave only through
//! [`EventBuffer::drain_all`], and re-enter at the front via
//! [`EventBuffer::requeue`] when a write fails. There is no hard capacity;
//! the flush controller treats a soft threshold as a trigger, not a limit.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::event::AuditEvent;

#[derive(Debug, Default)]
pub struct EventBuffer {
	queue: Mutex<VecDeque<AuditEvent>>,
}

impl EventBuffer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append one event to the tail, returning the new buffer length.
	///
	/// Safe under concurrent calls; the lock is held only for the push.
	pub fn append(&self, event: AuditEvent) -> usize {
		let mut queue = self.queue.lock().expect("audit buffer lock poisoned");
		queue.push_back(event);
		queue.len()
	}

	/// Atomically remove and return every buffered event in submission order.
	///
	/// Events appended concurrently with a drain end up either in the
	/// returned batch or cleanly left behind for the next one.
	pub fn drain_all(&self) -> Vec<AuditEvent> {
		let mut queue = self.queue.lock().expect("audit buffer lock poisoned");
		Vec::from(std::mem::take(&mut *queue))
	}

	/// Reinsert a previously drained batch at the front of the buffer.
	///
	/// The batch keeps its internal order and precedes anything appended
	/// after the drain, so the eventual durable log stays chronological.
	pub fn requeue(&self, batch: Vec<AuditEvent>) {
		let mut queue = self.queue.lock().expect("audit buffer lock poisoned");
		for event in batch.into_iter().rev() {
			queue.push_front(event);
		}
	}

	pub fn len(&self) -> usize {
		self.queue.lock().expect("audit buffer lock poisoned").len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
