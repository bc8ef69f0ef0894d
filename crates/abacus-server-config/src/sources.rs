// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{AuditConfigLayer, DatabaseConfigLayer, LogFormat, LoggingConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/abacus/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: ABACUS_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			database: Some(load_database_from_env()?),
			logging: Some(load_logging_from_env()?),
			audit: Some(load_audit_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("ABACUS_SERVER_DATABASE_URL"),
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = env_var("ABACUS_SERVER_LOG_FORMAT").map(|v| match v.to_lowercase().as_str() {
		"json" => LogFormat::Json,
		_ => LogFormat::Pretty,
	});

	Ok(LoggingConfigLayer {
		level: env_var("ABACUS_SERVER_LOG_LEVEL"),
		format,
	})
}

fn load_audit_from_env() -> Result<AuditConfigLayer, ConfigError> {
	Ok(AuditConfigLayer {
		enabled: env_bool("ABACUS_SERVER_AUDIT_ENABLED"),
		buffer_size: env_usize("ABACUS_SERVER_AUDIT_BUFFER_SIZE")?,
		flush_interval_secs: env_u64("ABACUS_SERVER_AUDIT_FLUSH_INTERVAL_SECS")?,
		write_timeout_ms: env_u64("ABACUS_SERVER_AUDIT_WRITE_TIMEOUT_MS")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_toml_source_missing_file_is_empty_layer() {
		let source = TomlSource::new("/nonexistent/abacus-server.toml");
		let layer = source.load().unwrap();
		assert!(layer.audit.is_none());
		assert!(layer.database.is_none());
	}

	#[test]
	fn test_toml_source_parses_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
			[database]
			url = "sqlite:/tmp/abacus-test.db"

			[audit]
			buffer_size = 42
			flush_interval_secs = 5
			"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(
			layer.database.unwrap().url,
			Some("sqlite:/tmp/abacus-test.db".to_string())
		);
		let audit = layer.audit.unwrap();
		assert_eq!(audit.buffer_size, Some(42));
		assert_eq!(audit.flush_interval_secs, Some(5));
	}

	#[test]
	fn test_toml_source_rejects_malformed_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "this is not toml [[").unwrap();

		let result = TomlSource::new(file.path()).load();
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	// Single test for all ABACUS_SERVER_AUDIT_* env handling: the loader
	// reads every audit variable, so parallel tests must not share them.
	#[test]
	fn test_env_audit_section() {
		std::env::set_var("ABACUS_SERVER_AUDIT_BUFFER_SIZE", "77");
		std::env::set_var("ABACUS_SERVER_AUDIT_ENABLED", "true");

		let layer = load_audit_from_env().unwrap();
		assert_eq!(layer.buffer_size, Some(77));
		assert_eq!(layer.enabled, Some(true));
		assert_eq!(layer.flush_interval_secs, None);

		std::env::set_var("ABACUS_SERVER_AUDIT_FLUSH_INTERVAL_SECS", "soon");
		let result = load_audit_from_env();
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

		std::env::remove_var("ABACUS_SERVER_AUDIT_BUFFER_SIZE");
		std::env::remove_var("ABACUS_SERVER_AUDIT_ENABLED");
		std::env::remove_var("ABACUS_SERVER_AUDIT_FLUSH_INTERVAL_SECS");
	}
}
