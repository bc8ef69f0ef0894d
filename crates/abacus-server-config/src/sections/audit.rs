// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit logging configuration section.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_BUFFER_SIZE: usize = 100;
const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 30;
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5000;

fn default_buffer_size() -> usize {
	DEFAULT_BUFFER_SIZE
}

fn default_flush_interval_secs() -> u64 {
	DEFAULT_FLUSH_INTERVAL_SECS
}

fn default_write_timeout_ms() -> u64 {
	DEFAULT_WRITE_TIMEOUT_MS
}

/// Audit logging configuration (runtime, fully resolved).
///
/// `buffer_size` is a soft threshold: the buffer is allowed to grow past it
/// while a flush is in progress, and the crossing append triggers the next
/// flush. `flush_interval_secs` bounds the staleness of batched low-severity
/// events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
	pub enabled: bool,
	pub buffer_size: usize,
	pub flush_interval_secs: u64,
	pub write_timeout_ms: u64,
}

impl AuditConfig {
	pub fn flush_interval(&self) -> Duration {
		Duration::from_secs(self.flush_interval_secs)
	}

	pub fn write_timeout(&self) -> Duration {
		Duration::from_millis(self.write_timeout_ms)
	}
}

impl Default for AuditConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			buffer_size: default_buffer_size(),
			flush_interval_secs: default_flush_interval_secs(),
			write_timeout_ms: default_write_timeout_ms(),
		}
	}
}

/// Audit configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AuditConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub buffer_size: Option<usize>,
	#[serde(default)]
	pub flush_interval_secs: Option<u64>,
	#[serde(default)]
	pub write_timeout_ms: Option<u64>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.buffer_size.is_some() {
			self.buffer_size = other.buffer_size;
		}
		if other.flush_interval_secs.is_some() {
			self.flush_interval_secs = other.flush_interval_secs;
		}
		if other.write_timeout_ms.is_some() {
			self.write_timeout_ms = other.write_timeout_ms;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		AuditConfig {
			enabled: self.enabled.unwrap_or(true),
			buffer_size: self.buffer_size.unwrap_or_else(default_buffer_size),
			flush_interval_secs: self
				.flush_interval_secs
				.unwrap_or_else(default_flush_interval_secs),
			write_timeout_ms: self.write_timeout_ms.unwrap_or_else(default_write_timeout_ms),
		}
	}
}
