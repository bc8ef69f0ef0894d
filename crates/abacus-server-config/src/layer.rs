// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{AuditConfigLayer, DatabaseConfigLayer, LoggingConfigLayer};

/// Partial server configuration, mergeable across sources.
///
/// Every field is optional; later sources override earlier ones field by field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub audit: Option<AuditConfigLayer>,
}

impl ServerConfigLayer {
	pub fn merge(&mut self, other: ServerConfigLayer) {
		match (&mut self.database, other.database) {
			(Some(base), Some(overlay)) => base.merge(overlay),
			(base @ None, overlay @ Some(_)) => *base = overlay,
			_ => {}
		}
		match (&mut self.logging, other.logging) {
			(Some(base), Some(overlay)) => base.merge(overlay),
			(base @ None, overlay @ Some(_)) => *base = overlay,
			_ => {}
		}
		match (&mut self.audit, other.audit) {
			(Some(base), Some(overlay)) => base.merge(overlay),
			(base @ None, overlay @ Some(_)) => *base = overlay,
			_ => {}
		}
	}
}
