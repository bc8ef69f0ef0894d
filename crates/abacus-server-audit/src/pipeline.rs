// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Buffered flush pipeline for security audit events.
//!
//! [`AuditService`] owns the in-process buffer, a durable sink, and a
//! background task that flushes on a timer. Three triggers drain the buffer,
//! evaluated independently:
//!
//! 1. High/Critical severity: flushed synchronously before `submit` returns,
//!    so a crash cannot swallow the event.
//! 2. Buffer reaching `buffer_size`: flushed by the crossing append.
//! 3. The periodic timer: bounds staleness of batched low-severity events.
//!
//! A failed or timed-out write requeues the whole batch at the front of the
//! buffer; audit failures never propagate to the business caller.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};

use abacus_server_config::AuditConfig;

use crate::buffer::EventBuffer;
use crate::event::{AuditEvent, AuditSeverity};
use crate::sink::AuditSink;

pub struct AuditService {
	config: AuditConfig,
	buffer: EventBuffer,
	sink: Arc<dyn AuditSink>,
	flush_gate: Mutex<()>,
	shutdown_tx: broadcast::Sender<()>,
}

impl AuditService {
	/// Construct the service and start its periodic flush task.
	///
	/// Built once at process start; call [`AuditService::shutdown`] during
	/// teardown to stop the timer and drain whatever is still buffered.
	pub fn new(sink: Arc<dyn AuditSink>, config: AuditConfig) -> Arc<Self> {
		let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

		let service = Arc::new(Self {
			config,
			buffer: EventBuffer::new(),
			sink,
			flush_gate: Mutex::new(()),
			shutdown_tx,
		});

		tokio::spawn(Self::run_periodic_flush(
			Arc::clone(&service),
			shutdown_rx,
		));

		service
	}

	async fn run_periodic_flush(service: Arc<Self>, mut shutdown_rx: broadcast::Receiver<()>) {
		let interval = service.config.flush_interval();
		loop {
			tokio::select! {
				_ = sleep(interval) => {
					service.flush().await;
				}
				_ = shutdown_rx.recv() => {
					debug!("periodic audit flush task stopping");
					break;
				}
			}
		}
	}

	/// Record one audit event.
	///
	/// The event is mirrored to the operational log, appended to the buffer,
	/// and, for High/Critical severities or a full buffer, flushed before
	/// this call returns. A flush failure is requeued and logged, never
	/// surfaced to the caller.
	#[instrument(skip(self, event), fields(event_type = %event.event_type, severity = %event.severity))]
	pub async fn submit(&self, event: AuditEvent) {
		self.mirror(&event);

		if !self.config.enabled {
			return;
		}

		let severity = event.severity;
		let buffered = self.buffer.append(event);

		if severity.requires_immediate_flush() || buffered >= self.config.buffer_size {
			self.flush().await;
		}
	}

	/// Drain the buffer and write the batch to the durable sink.
	///
	/// Single-flight: concurrent triggers queue on the flush gate, so a
	/// logical batch is never split across interleaved drains. The buffer
	/// lock is held only for the drain itself, never across the write.
	pub async fn flush(&self) {
		let _flushing = self.flush_gate.lock().await;

		loop {
			let batch = self.buffer.drain_all();
			if batch.is_empty() {
				return;
			}

			let written = timeout(self.config.write_timeout(), self.sink.write_batch(&batch)).await;

			match written {
				Ok(Ok(())) => {
					debug!(
						sink = self.sink.name(),
						events = batch.len(),
						"audit batch persisted"
					);
					// Appends that crossed the threshold during the write get
					// their flush now instead of waiting for the next trigger.
					if self.buffer.len() < self.config.buffer_size {
						return;
					}
				}
				Ok(Err(e)) => {
					let count = batch.len();
					self.buffer.requeue(batch);
					warn!(
						sink = self.sink.name(),
						error = %e,
						events = count,
						"audit batch write failed, requeued"
					);
					return;
				}
				Err(_) => {
					let count = batch.len();
					self.buffer.requeue(batch);
					warn!(
						sink = self.sink.name(),
						timeout_ms = self.config.write_timeout_ms,
						events = count,
						"audit batch write timed out, requeued"
					);
					return;
				}
			}
		}
	}

	/// Stop the periodic task and drain whatever is still buffered.
	pub async fn shutdown(&self) {
		let _ = self.shutdown_tx.send(());
		self.flush().await;
	}

	/// Number of events currently buffered and not yet durably written.
	pub fn pending(&self) -> usize {
		self.buffer.len()
	}

	/// Mirror a submission to the human-readable operational trace.
	///
	/// Best effort and non-authoritative; emitted whether or not the event
	/// ever reaches durable storage.
	fn mirror(&self, event: &AuditEvent) {
		match event.severity {
			AuditSeverity::Low | AuditSeverity::Medium => info!(
				event_type = %event.event_type,
				severity = %event.severity,
				user_id = ?event.user_id,
				username = ?event.username,
				success = event.success,
				details = %event.details,
				"security event"
			),
			AuditSeverity::High => warn!(
				event_type = %event.event_type,
				severity = %event.severity,
				user_id = ?event.user_id,
				username = ?event.username,
				success = event.success,
				details = %event.details,
				"security event"
			),
			AuditSeverity::Critical => error!(
				event_type = %event.event_type,
				severity = %event.severity,
				user_id = ?event.user_id,
				username = ?event.username,
				success = event.success,
				details = %event.details,
				"security event"
			),
		}
	}
}
