// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{CompileError, Result, return_error};
use serde::{Deserialize, Serialize};

/// Settings shared by every statement compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
	/// Zone used for objects without a location time zone.
	pub default_time_zone: String,
	/// Upper bound for a filter's `max`. Larger requests are rejected.
	pub max_page_size: Option<u64>,
	/// Claims stale rows with `FOR UPDATE ... SKIP LOCKED`.
	pub lock_stale_rows: bool,
}

impl Default for CompilerConfig {
	fn default() -> Self {
		Self {
			default_time_zone: "UTC".to_string(),
			max_page_size: None,
			lock_stale_rows: false,
		}
	}
}

impl CompilerConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_default_time_zone(mut self, zone: impl Into<String>) -> Self {
		self.default_time_zone = zone.into();
		self
	}

	pub fn with_max_page_size(mut self, max: u64) -> Self {
		self.max_page_size = Some(max);
		self
	}

	pub fn with_lock_stale_rows(mut self, lock: bool) -> Self {
		self.lock_stale_rows = lock;
		self
	}

	pub fn from_json(json: &str) -> Result<Self> {
		let config: CompilerConfig = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		let zone = self.default_time_zone.trim();
		if zone.is_empty() {
			return_error!(CompileError::InvalidConfig {
				message: "default_time_zone must not be empty".to_string(),
			});
		}
		// zone names are rendered as a literal, so only IANA name characters pass
		if !zone.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '+' | ':')) {
			return_error!(CompileError::InvalidConfig {
				message: format!("default_time_zone '{}' is not a time zone name", self.default_time_zone),
			});
		}
		if self.max_page_size == Some(0) {
			return_error!(CompileError::InvalidConfig {
				message: "max_page_size must be positive".to_string(),
			});
		}
		Ok(())
	}

	/// `COALESCE(l.time_zone, '<zone>')` for a location table aliased `l`.
	pub(crate) fn time_zone_expr(&self) -> String {
		format!("COALESCE(l.time_zone, '{}')", self.default_time_zone.trim().replace('\'', "''"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = CompilerConfig::default();
		assert_eq!(config.default_time_zone, "UTC");
		assert_eq!(config.max_page_size, None);
		assert!(!config.lock_stale_rows);
		assert_eq!(config.time_zone_expr(), "COALESCE(l.time_zone, 'UTC')");
	}

	#[test]
	fn test_from_json_partial_document() {
		let config = CompilerConfig::from_json(r#"{"default_time_zone":"Pacific/Auckland","max_page_size":500}"#)
			.unwrap();
		assert_eq!(config.default_time_zone, "Pacific/Auckland");
		assert_eq!(config.max_page_size, Some(500));
		assert!(!config.lock_stale_rows);
	}

	#[test]
	fn test_invalid_zone_rejected() {
		let err = CompilerConfig::from_json(r#"{"default_time_zone":"UTC'; DROP"}"#).unwrap_err();
		assert_eq!(err.code(), "CONFIG_001");

		let err = CompilerConfig::new().with_default_time_zone(" ").validate().unwrap_err();
		assert_eq!(err.code(), "CONFIG_001");
	}

	#[test]
	fn test_malformed_json_is_config_error() {
		let err = CompilerConfig::from_json("{").unwrap_err();
		assert_eq!(err.code(), "CONFIG_001");
	}
}
