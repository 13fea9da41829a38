// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use datumql_type::{AggregateDatumId, Aggregation, CompileError, KindCheck, ObjectDatumKind, Result, return_error};
use tracing::{debug, instrument};

use super::{
	StatementCompiler,
	common::{check_paging, count_of, paging, rejected, with_ctes},
};
use crate::{
	config::CompilerConfig,
	filter::DatumCriteria,
	meta::StreamMetadataQuery,
	plan::{CompiledStatement, SqlPlan},
	predicate,
	table::StaleTable,
};

#[derive(Debug, Clone)]
struct StaleIds {
	ids: Vec<AggregateDatumId>,
	expected_kind: ObjectDatumKind,
	check: KindCheck,
}

#[derive(Debug, Clone)]
struct StaleSelect {
	name: &'static str,
	table: StaleTable,
	filter: DatumCriteria,
	config: CompilerConfig,
	ids: Option<StaleIds>,
}

impl StaleSelect {
	fn validate(&self) -> Result<()> {
		let filter = &self.filter;
		self.config.validate()?;
		filter.validate()?;
		check_paging(filter, &self.config)?;

		let aggregation = filter.aggregation();
		if !matches!(aggregation, Aggregation::None | Aggregation::Hour | Aggregation::Day | Aggregation::Month) {
			return_error!(CompileError::UnsupportedAggregation {
				compiler: self.name,
				aggregation
			});
		}
		if filter.combining_type.is_some() {
			return_error!(CompileError::InvalidArgument {
				field: "combining_type",
				message: format!("{} does not combine streams", self.name),
			});
		}
		if filter.selects_single_record() {
			return_error!(CompileError::InvalidArgument {
				field: "most_recent",
				message: format!("{} does not support most recent or earliest selections", self.name),
			});
		}

		if let Some(stale) = &self.ids {
			if stale.ids.is_empty() {
				return_error!(CompileError::InvalidArgument {
					field: "ids",
					message: "at least one stale aggregate id is required".to_string(),
				});
			}
			if let Some(id) =
				stale.ids.iter().find(|id| !id.is_valid_aggregate_object_id(stale.expected_kind, stale.check))
			{
				return_error!(CompileError::InvalidArgument {
					field: "ids",
					message: format!("{:?} is not a complete {} aggregate id", id, stale.expected_kind),
				});
			}
		}
		Ok(())
	}

	/// The filter with the object and source ids of any explicit row ids.
	fn effective_filter(&self) -> DatumCriteria {
		let Some(stale) = &self.ids else {
			return self.filter.clone();
		};
		let objects: BTreeSet<i64> = stale.ids.iter().filter_map(|id| id.object_id).collect();
		let sources: BTreeSet<&String> = stale.ids.iter().filter_map(|id| id.source_id.as_ref()).collect();
		self.filter
			.clone()
			.with_object_kind(stale.expected_kind)
			.with_object_ids(objects.into_iter().collect())
			.with_source_ids(sources.into_iter().cloned().collect())
	}

	fn ctes(&self, filter: &DatumCriteria) -> SqlPlan {
		let meta = StreamMetadataQuery::for_filter(filter, &self.config, &filter.object_ids, &filter.source_ids);
		with_ctes(vec![("s", meta.render())])
	}

	fn selection(&self, filter: &DatumCriteria) -> SqlPlan {
		let kind_col = format!("datum.{}", self.table.kind_column());
		let mut predicates = predicate::date_range("datum.ts_start", &filter.date_range(), "s.time_zone");

		let aggregation = filter.aggregation();
		if aggregation != Aggregation::None {
			predicates.push(predicate::aggregation_kind(&kind_col, aggregation));
		}
		if let Some(stale) = &self.ids {
			let rows = stale.ids.iter().filter_map(|id| {
				let (Some(object_id), Some(source_id), Some(ts), Some(aggregation)) =
					(id.object_id, &id.source_id, id.timestamp, id.aggregation)
				else {
					return None;
				};
				Some(
					SqlPlan::text("(s.obj_id = ")
						.bind(object_id)
						.sql(" AND s.source_id = ")
						.bind(source_id.clone())
						.sql(" AND datum.ts_start = ")
						.bind(ts)
						.sql(format!(" AND {kind_col} = "))
						.bind(aggregation.key())
						.sql(")"),
				)
			});
			predicates.push(SqlPlan::text("(").append(SqlPlan::join(rows, "\nOR ")).sql(")"));
		}

		let mut plan = SqlPlan::text(format!(
			"SELECT datum.stream_id, s.obj_id, s.source_id, datum.ts_start, {kind_col}, datum.created\n\
			 FROM {} datum\n\
			 INNER JOIN s ON s.stream_id = datum.stream_id",
			self.table.name()
		));
		if !predicates.is_empty() {
			plan = plan.sql("\n").append(predicate::where_clause(predicates));
		}
		plan
	}

	fn select(&self) -> SqlPlan {
		let filter = self.effective_filter();
		let kind_col = self.table.kind_column();
		let mut plan = self
			.ctes(&filter)
			.append(self.selection(&filter))
			.sql(format!("\nORDER BY datum.{kind_col}, datum.ts_start, datum.stream_id"))
			.append(paging(&filter));
		if self.config.lock_stale_rows {
			plan = plan.sql("\nFOR UPDATE OF datum SKIP LOCKED");
		}
		plan
	}

	fn count(&self) -> SqlPlan {
		let filter = self.effective_filter();
		self.ctes(&filter).append(count_of(self.selection(&filter)))
	}

	fn compile(&self) -> Result<CompiledStatement> {
		self.validate().map_err(|err| rejected(self.name, err))?;
		let stmt = self.select().render();
		debug!(
			compiler = self.name,
			params = stmt.params.len(),
			locked = self.config.lock_stale_rows,
			"compiled stale select"
		);
		Ok(stmt)
	}

	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		self.validate().map_err(|err| rejected(self.name, err))?;
		if self.filter.without_total_results_count {
			return Ok(None);
		}
		Ok(Some(self.count().render()))
	}
}

/// Stale aggregate rows waiting to be recomputed.
#[derive(Debug, Clone)]
pub struct SelectStaleAggregateDatum(StaleSelect);

impl SelectStaleAggregateDatum {
	const NAME: &'static str = "SelectStaleAggregateDatum";

	pub fn new(filter: DatumCriteria) -> Self {
		Self::with_config(filter, CompilerConfig::default())
	}

	pub fn with_config(filter: DatumCriteria, config: CompilerConfig) -> Self {
		Self(StaleSelect {
			name: Self::NAME,
			table: StaleTable::Aggregate,
			filter,
			config,
			ids: None,
		})
	}

	/// Specific stale rows. Every id must name a complete aggregate row of
	/// `expected_kind`, as judged by `check`.
	pub fn for_ids(ids: Vec<AggregateDatumId>, expected_kind: ObjectDatumKind, check: KindCheck) -> Self {
		let mut select = Self::new(DatumCriteria::new());
		select.0.ids = Some(StaleIds {
			ids,
			expected_kind,
			check,
		});
		select
	}

	pub fn using_config(mut self, config: CompilerConfig) -> Self {
		self.0.config = config;
		self
	}
}

impl StatementCompiler for SelectStaleAggregateDatum {
	#[instrument(name = "sql::select_stale_aggregate::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		self.0.compile()
	}

	#[instrument(name = "sql::select_stale_aggregate::compile_count", level = "trace", skip(self))]
	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		self.0.compile_count()
	}
}

/// Stale audit rows waiting to be recounted.
#[derive(Debug, Clone)]
pub struct SelectStaleAuditDatum(StaleSelect);

impl SelectStaleAuditDatum {
	const NAME: &'static str = "SelectStaleAuditDatum";

	pub fn new(filter: DatumCriteria) -> Self {
		Self::with_config(filter, CompilerConfig::default())
	}

	pub fn with_config(filter: DatumCriteria, config: CompilerConfig) -> Self {
		Self(StaleSelect {
			name: Self::NAME,
			table: StaleTable::Audit,
			filter,
			config,
			ids: None,
		})
	}
}

impl StatementCompiler for SelectStaleAuditDatum {
	#[instrument(name = "sql::select_stale_audit::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		self.0.compile()
	}

	#[instrument(name = "sql::select_stale_audit::compile_count", level = "trace", skip(self))]
	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		self.0.compile_count()
	}
}

#[cfg(test)]
mod tests {
	use chrono::{DateTime, TimeZone, Utc};
	use datumql_type::BindValue;

	use super::*;

	fn ts(hour: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2021, 1, 1, hour, 0, 0).unwrap()
	}

	#[test]
	fn test_stale_aggregate_by_kind() {
		let filter = DatumCriteria::new().with_aggregation(Aggregation::Hour).with_max(100);
		let stmt = SelectStaleAggregateDatum::new(filter).compile().unwrap();
		assert!(stmt.sql.contains("FROM solardatm.agg_stale_datm datum"));
		assert!(stmt.sql.contains("WHERE datum.agg_kind = ?"));
		assert!(stmt.sql.ends_with("ORDER BY datum.agg_kind, datum.ts_start, datum.stream_id\nLIMIT ?"));
		assert_eq!(stmt.params.into_inner(), vec![BindValue::Text("h".to_string()), BindValue::Int8(100)]);
	}

	#[test]
	fn test_stale_audit_claims_rows() {
		let compiler = SelectStaleAuditDatum::with_config(
			DatumCriteria::new().with_max(1),
			CompilerConfig::default().with_lock_stale_rows(true),
		);
		let stmt = compiler.compile().unwrap();
		assert!(stmt.sql.contains("datum.aud_kind, datum.created\nFROM solardatm.aud_stale_datm datum"));
		assert!(stmt.sql.ends_with("LIMIT ?\nFOR UPDATE OF datum SKIP LOCKED"));

		let count = compiler.compile_count().unwrap().unwrap();
		assert!(!count.sql.contains("FOR UPDATE"));
		assert!(!count.sql.contains("LIMIT"));
	}

	#[test]
	fn test_stale_rejects_computed_levels() {
		let filter = DatumCriteria::new().with_aggregation(Aggregation::Week);
		assert_eq!(SelectStaleAggregateDatum::new(filter).compile().unwrap_err().code(), "AGG_002");
	}

	#[test]
	fn test_for_ids_matches_each_row() {
		let ids = vec![
			AggregateDatumId::new(ObjectDatumKind::Node, 1, "a", ts(0), Aggregation::Hour),
			AggregateDatumId::new(ObjectDatumKind::Node, 2, "b", ts(1), Aggregation::Day),
		];
		let stmt =
			SelectStaleAggregateDatum::for_ids(ids, ObjectDatumKind::Node, KindCheck::Expected).compile().unwrap();

		assert!(stmt.sql.contains("WHERE m.node_id = ANY(?)\nAND m.source_id = ANY(?)"));
		assert!(stmt.sql.contains(
			"((s.obj_id = ? AND s.source_id = ? AND datum.ts_start = ? AND datum.agg_kind = ?)\n\
			 OR (s.obj_id = ? AND s.source_id = ? AND datum.ts_start = ? AND datum.agg_kind = ?))"
		));
		assert_eq!(stmt.params.len(), 10);
		assert_eq!(stmt.params.get(1), Some(&BindValue::Int8Array(vec![1, 2])));
		assert_eq!(stmt.params.get(10), Some(&BindValue::Text("d".to_string())));
	}

	#[test]
	fn test_for_ids_kind_check() {
		let ids = vec![AggregateDatumId::new(ObjectDatumKind::Location, 1, "a", ts(0), Aggregation::Hour)];

		let err = SelectStaleAggregateDatum::for_ids(ids.clone(), ObjectDatumKind::Node, KindCheck::Expected)
			.compile()
			.unwrap_err();
		assert_eq!(err.code(), "FILTER_006");

		let stmt =
			SelectStaleAggregateDatum::for_ids(ids, ObjectDatumKind::Node, KindCheck::Receiver).compile().unwrap();
		assert!(stmt.sql.contains("FROM solardatm.da_datm_meta m"));

		let err = SelectStaleAggregateDatum::for_ids(vec![], ObjectDatumKind::Node, KindCheck::Expected)
			.compile()
			.unwrap_err();
		assert_eq!(err.code(), "FILTER_006");
	}
}
