// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{Aggregation, CompileError, Result, return_error};
use tracing::{debug, instrument};

use super::{
	StatementCompiler, body,
	common::{check_paging, rejected},
	statement::DatumStatement,
};
use crate::{
	config::CompilerConfig,
	filter::{DatumCriteria, RollupType},
	plan::{CompiledStatement, SqlPlan},
	table::AuditTable,
};

const TS_COLUMN: &str = "ts_start";

#[derive(Debug, Clone)]
struct AuditSelect {
	name: &'static str,
	accumulative: bool,
	filter: DatumCriteria,
	config: CompilerConfig,
}

impl AuditSelect {
	fn table(&self) -> Result<AuditTable> {
		let aggregation = self.filter.aggregation();
		let table = match (self.accumulative, aggregation) {
			(true, Aggregation::None | Aggregation::Day) => Some(AuditTable::AccumulativeDaily),
			(false, Aggregation::Hour) => Some(AuditTable::Hourly),
			(false, Aggregation::Day) => Some(AuditTable::Daily),
			(false, Aggregation::Month) => Some(AuditTable::Monthly),
			_ => None,
		};
		table.ok_or_else(|| {
			CompileError::UnsupportedAggregation {
				compiler: self.name,
				aggregation,
			}
			.into()
		})
	}

	fn validate(&self) -> Result<AuditTable> {
		let filter = &self.filter;
		self.config.validate()?;
		filter.validate()?;
		check_paging(filter, &self.config)?;

		if filter.combining_type.is_some() {
			return_error!(CompileError::InvalidArgument {
				field: "combining_type",
				message: format!("{} does not combine streams", self.name),
			});
		}
		if filter.selects_single_record() && !self.accumulative {
			return_error!(CompileError::InvalidArgument {
				field: "most_recent",
				message: format!("{} does not support most recent or earliest selections", self.name),
			});
		}
		self.table()
	}

	fn body(&self, table: AuditTable) -> SqlPlan {
		let range = self.filter.date_range();
		if self.filter.selects_single_record() {
			body::latest(table.name(), TS_COLUMN, table.columns(), &range, self.filter.most_recent)
		} else if self.filter.rollup_type() == RollupType::All {
			body::grouped(table.name(), TS_COLUMN, table.rollup_columns(), &range, "datum.stream_id")
		} else {
			body::rows(table.name(), TS_COLUMN, table.columns(), &range)
		}
	}

	fn statement(&self, table: AuditTable) -> DatumStatement<'_> {
		DatumStatement {
			filter: &self.filter,
			config: &self.config,
			virtual_plan: None,
			body: self.body(table),
			rollup: false,
		}
	}

	fn compile(&self) -> Result<CompiledStatement> {
		let table = self.validate().map_err(|err| rejected(self.name, err))?;
		let stmt = self.statement(table).select().render();
		debug!(compiler = self.name, table = table.name(), params = stmt.params.len(), "compiled audit select");
		Ok(stmt)
	}

	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		let table = self.validate().map_err(|err| rejected(self.name, err))?;
		if self.filter.without_total_results_count || self.filter.selects_single_record() {
			return Ok(None);
		}
		Ok(Some(self.statement(table).count().render()))
	}
}

/// Audit counts of property and datum activity per stream.
#[derive(Debug, Clone)]
pub struct SelectAuditDatum(AuditSelect);

impl SelectAuditDatum {
	pub fn new(filter: DatumCriteria) -> Self {
		Self::with_config(filter, CompilerConfig::default())
	}

	pub fn with_config(filter: DatumCriteria, config: CompilerConfig) -> Self {
		Self(AuditSelect {
			name: "SelectAuditDatum",
			accumulative: false,
			filter,
			config,
		})
	}
}

impl StatementCompiler for SelectAuditDatum {
	#[instrument(name = "sql::select_audit::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		self.0.compile()
	}

	#[instrument(name = "sql::select_audit::compile_count", level = "trace", skip(self))]
	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		self.0.compile_count()
	}
}

/// Running datum storage totals, one row per stream and day.
#[derive(Debug, Clone)]
pub struct SelectAccumulativeAuditDatum(AuditSelect);

impl SelectAccumulativeAuditDatum {
	pub fn new(filter: DatumCriteria) -> Self {
		Self::with_config(filter, CompilerConfig::default())
	}

	pub fn with_config(filter: DatumCriteria, config: CompilerConfig) -> Self {
		Self(AuditSelect {
			name: "SelectAccumulativeAuditDatum",
			accumulative: true,
			filter,
			config,
		})
	}
}

impl StatementCompiler for SelectAccumulativeAuditDatum {
	#[instrument(name = "sql::select_accumulative_audit::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		self.0.compile()
	}

	#[instrument(name = "sql::select_accumulative_audit::compile_count", level = "trace", skip(self))]
	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		self.0.compile_count()
	}
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};

	use super::*;

	#[test]
	fn test_audit_tables_by_level() {
		for (aggregation, table) in [
			(Aggregation::Hour, "solardatm.aud_datm_io"),
			(Aggregation::Day, "solardatm.aud_datm_daily"),
			(Aggregation::Month, "solardatm.aud_datm_monthly"),
		] {
			let stmt = SelectAuditDatum::new(DatumCriteria::new().with_aggregation(aggregation)).compile().unwrap();
			assert!(stmt.sql.contains(&format!("FROM {table} datum")), "{aggregation:?}");
		}
		let err = SelectAuditDatum::new(DatumCriteria::new()).compile().unwrap_err();
		assert_eq!(err.code(), "AGG_002");
	}

	#[test]
	fn test_audit_rollup_sums_per_stream() {
		let filter = DatumCriteria::new()
			.with_node_ids(vec![1])
			.with_aggregation(Aggregation::Day)
			.with_rollup_type(RollupType::All)
			.with_start_date(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
		let stmt = SelectAuditDatum::new(filter).compile().unwrap();
		assert!(stmt.sql.contains("sum(datum.prop_count)::BIGINT AS prop_count"));
		assert!(stmt.sql.contains("WHERE datum.ts_start >= ?\nGROUP BY datum.stream_id"));
		assert_eq!(stmt.placeholder_count(), 2);
	}

	#[test]
	fn test_accumulative_most_recent() {
		let compiler = SelectAccumulativeAuditDatum::new(DatumCriteria::new().with_most_recent(true));
		let stmt = compiler.compile().unwrap();
		assert!(stmt.sql.contains("FROM solardatm.aud_acc_datm_daily datum\nWHERE datum.stream_id = s.stream_id"));
		assert!(stmt.sql.contains("ORDER BY datum.ts_start DESC\nLIMIT 1"));
		assert_eq!(compiler.compile_count().unwrap(), None);

		let err = SelectAuditDatum::new(DatumCriteria::new().with_aggregation(Aggregation::Day).with_most_recent(true))
			.compile()
			.unwrap_err();
		assert_eq!(err.code(), "FILTER_006");
	}

	#[test]
	fn test_accumulative_rejects_hour() {
		let filter = DatumCriteria::new().with_aggregation(Aggregation::Hour);
		assert_eq!(SelectAccumulativeAuditDatum::new(filter).compile().unwrap_err().code(), "AGG_002");
	}
}
