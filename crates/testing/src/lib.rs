// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Test support for the datum query compiler.

pub mod binder;
pub mod identity;
pub mod util;

use std::sync::Once;

use datumql_sql::CompiledStatement;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a fmt subscriber writing to the test harness, once per process.
///
/// The filter comes from `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
	TRACING.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
			.with_test_writer()
			.try_init();
	});
}

/// Number of `?` placeholders in SQL text.
pub fn count_placeholders(sql: &str) -> usize {
	sql.matches('?').count()
}

/// Panics unless every placeholder has exactly one parameter.
#[track_caller]
pub fn assert_balanced(stmt: &CompiledStatement) {
	assert_eq!(
		count_placeholders(&stmt.sql),
		stmt.params.len(),
		"placeholder/parameter mismatch in:\n{}",
		stmt.sql
	);
}
