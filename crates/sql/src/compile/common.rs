// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{CompileError, Error, Result, return_error};
use tracing::debug;

use crate::{
	config::CompilerConfig,
	filter::{DatumCriteria, SortDescriptor, SortKey},
	plan::SqlPlan,
};

pub(crate) fn rejected(compiler: &'static str, err: Error) -> Error {
	debug!(compiler, code = err.code(), "filter rejected");
	err
}

pub(crate) fn check_paging(filter: &DatumCriteria, config: &CompilerConfig) -> Result<()> {
	if let (Some(max), Some(limit)) = (filter.max, config.max_page_size) {
		if max > limit {
			return_error!(CompileError::PageSizeExceeded {
				max,
				limit
			});
		}
	}
	Ok(())
}

/// `WITH a AS (...)\n, b AS (...)\n`
pub(crate) fn with_ctes(ctes: Vec<(&'static str, SqlPlan)>) -> SqlPlan {
	let mut plan = SqlPlan::new();
	for (index, (name, body)) in ctes.into_iter().enumerate() {
		let open = if index == 0 {
			format!("WITH {name} AS (\n")
		} else {
			format!(", {name} AS (\n")
		};
		plan = plan.sql(open).append(body).sql("\n)\n");
	}
	plan
}

/// `\nORDER BY ...` from the requested sorts followed by any tie breakers
/// not already named.
pub(crate) fn order_by(
	sorts: &[SortDescriptor],
	column: impl Fn(SortKey) -> &'static str,
	tie_breakers: &[&'static str],
) -> SqlPlan {
	let mut named: Vec<&'static str> = Vec::new();
	let mut terms: Vec<String> = Vec::new();
	for sort in sorts {
		let col = column(sort.key);
		if named.contains(&col) {
			continue;
		}
		named.push(col);
		terms.push(if sort.descending {
			format!("{col} DESC")
		} else {
			col.to_string()
		});
	}
	for &col in tie_breakers {
		if !named.contains(&col) {
			named.push(col);
			terms.push(col.to_string());
		}
	}

	if terms.is_empty() {
		return SqlPlan::new();
	}
	SqlPlan::text(format!("\nORDER BY {}", terms.join(", ")))
}

pub(crate) fn paging(filter: &DatumCriteria) -> SqlPlan {
	let mut plan = SqlPlan::new();
	if let Some(max) = filter.max {
		plan = plan.sql("\nLIMIT ").bind(max);
	}
	if let Some(offset) = filter.offset {
		plan = plan.sql("\nOFFSET ").bind(offset);
	}
	plan
}

/// `SELECT COUNT(*)` over an unordered, unpaged projection.
pub(crate) fn count_of(projection: SqlPlan) -> SqlPlan {
	SqlPlan::text("SELECT COUNT(*)\nFROM (\n").append(projection).sql("\n) q")
}
