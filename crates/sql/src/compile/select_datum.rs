// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{CompileError, Result};
use tracing::{debug, instrument};

use super::{
	StatementCompiler,
	body::DatumBody,
	common::{check_paging, rejected},
	statement::DatumStatement,
};
use crate::{
	config::CompilerConfig, filter::DatumCriteria, plan::CompiledStatement, virtual_id::VirtualStreamPlan,
};

const NAME: &str = "SelectDatum";

/// Datum rows for a filter, at the filter's aggregation level.
#[derive(Debug, Clone)]
pub struct SelectDatum {
	filter: DatumCriteria,
	config: CompilerConfig,
}

struct Validated<'a> {
	filter: &'a DatumCriteria,
	config: &'a CompilerConfig,
	body: DatumBody,
	virtual_plan: Option<VirtualStreamPlan>,
}

impl Validated<'_> {
	fn statement(&self) -> DatumStatement<'_> {
		DatumStatement {
			filter: self.filter,
			config: self.config,
			virtual_plan: self.virtual_plan.as_ref(),
			body: self.body.render(&self.filter.date_range()),
			rollup: matches!(self.body, DatumBody::Rollup(_)),
		}
	}
}

impl SelectDatum {
	pub fn new(filter: DatumCriteria) -> Self {
		Self::with_config(filter, CompilerConfig::default())
	}

	pub fn with_config(filter: DatumCriteria, config: CompilerConfig) -> Self {
		Self {
			filter,
			config,
		}
	}

	pub fn filter(&self) -> &DatumCriteria {
		&self.filter
	}

	fn validate(&self) -> Result<Validated<'_>> {
		self.config.validate()?;
		self.filter.validate()?;
		check_paging(&self.filter, &self.config)?;

		let aggregation = self.filter.aggregation();
		if aggregation.is_minute_level() {
			return Err(CompileError::UnsupportedAggregation {
				compiler: NAME,
				aggregation,
			}
			.into());
		}
		if let Some(partial) = self.filter.partial_aggregation {
			return Err(CompileError::UnsupportedPartialAggregation {
				compiler: NAME,
				partial,
			}
			.into());
		}

		Ok(Validated {
			filter: &self.filter,
			config: &self.config,
			body: DatumBody::for_filter(&self.filter, NAME)?,
			virtual_plan: VirtualStreamPlan::from_filter(&self.filter)?,
		})
	}
}

impl StatementCompiler for SelectDatum {
	#[instrument(name = "sql::select_datum::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		let validated = self.validate().map_err(|err| rejected(NAME, err))?;
		let stmt = validated.statement().select().render();
		debug!(params = stmt.params.len(), "compiled select datum");
		Ok(stmt)
	}

	#[instrument(name = "sql::select_datum::compile_count", level = "trace", skip(self))]
	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		let validated = self.validate().map_err(|err| rejected(NAME, err))?;
		if self.filter.without_total_results_count || self.filter.selects_single_record() {
			return Ok(None);
		}
		Ok(Some(validated.statement().count().render()))
	}
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};
	use datumql_type::{Aggregation, BindValue};

	use super::*;
	use crate::filter::{CombiningType, RollupType, SortDescriptor, SortKey};

	#[test]
	fn test_raw_datum_query() {
		let filter = DatumCriteria::new()
			.with_node_ids(vec![1])
			.with_source_id("a")
			.with_start_date(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap())
			.with_end_date(Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap())
			.with_max(10);
		let stmt = SelectDatum::new(filter).compile().unwrap();

		assert!(stmt.sql.starts_with("WITH s AS (\nSELECT m.stream_id, m.node_id AS obj_id"));
		assert!(stmt.sql.contains(", d AS (\nSELECT datum.stream_id, datum.ts, datum.received"));
		assert!(stmt.sql.contains(
			"FROM solardatm.da_datm datum\n\
			 INNER JOIN s ON s.stream_id = datum.stream_id\n\
			 WHERE datum.ts >= ?\n\
			 AND datum.ts < ?"
		));
		assert!(stmt.sql.ends_with(
			"SELECT d.*\nFROM d\nINNER JOIN s ON s.stream_id = d.stream_id\nORDER BY d.stream_id, d.ts\nLIMIT ?"
		));
		assert_eq!(stmt.params.len(), 5);
		assert_eq!(stmt.placeholder_count(), stmt.params.len());
		assert_eq!(stmt.params.get(5), Some(&BindValue::Int8(10)));
	}

	#[test]
	fn test_most_recent_uses_lateral_and_no_count() {
		let compiler = SelectDatum::new(DatumCriteria::new().with_node_ids(vec![1, 2]).with_most_recent(true));
		let stmt = compiler.compile().unwrap();
		assert!(stmt.sql.contains("INNER JOIN LATERAL ("));
		assert!(stmt.sql.contains("ORDER BY datum.ts DESC\nLIMIT 1"));
		assert_eq!(stmt.params.get(1), Some(&BindValue::Int8Array(vec![1, 2])));
		assert_eq!(compiler.compile_count().unwrap(), None);
	}

	#[test]
	fn test_minute_levels_rejected() {
		for aggregation in [Aggregation::Minute, Aggregation::FiveMinute, Aggregation::ThirtyMinute] {
			let err = SelectDatum::new(DatumCriteria::new().with_aggregation(aggregation)).compile().unwrap_err();
			assert_eq!(err.code(), "AGG_002");
		}
	}

	#[test]
	fn test_partial_aggregation_rejected() {
		let filter =
			DatumCriteria::new().with_aggregation(Aggregation::Month).with_partial_aggregation(Aggregation::Day);
		assert_eq!(SelectDatum::new(filter).compile().unwrap_err().code(), "AGG_005");
	}

	#[test]
	fn test_year_rollup_body() {
		let stmt = SelectDatum::new(DatumCriteria::new().with_aggregation(Aggregation::Year)).compile().unwrap();
		assert!(stmt.sql.contains(
			"date_trunc('year', datum.ts_start AT TIME ZONE s.time_zone) AT TIME ZONE s.time_zone AS ts"
		));
		assert!(stmt.sql.contains("FROM solardatm.agg_datm_monthly datum"));
		assert!(stmt.sql.contains("GROUP BY datum.stream_id, ts"));
	}

	#[test]
	fn test_sorted_count_and_rollup() {
		let filter = DatumCriteria::new()
			.with_aggregation(Aggregation::Day)
			.with_rollup_type(RollupType::All)
			.with_sort(SortDescriptor::asc(SortKey::Source))
			.with_max(5)
			.with_offset(5);
		let compiler = SelectDatum::new(filter);

		let stmt = compiler.compile().unwrap();
		assert!(stmt.sql.contains("min(datum.ts_start) AS ts"));
		assert!(stmt.sql.contains("ORDER BY s.source_id, d.stream_id, d.ts\nLIMIT ?\nOFFSET ?"));

		let count = compiler.compile_count().unwrap().unwrap();
		assert!(count.sql.ends_with(
			"SELECT COUNT(*)\nFROM (\nSELECT d.*\nFROM d\nINNER JOIN s ON s.stream_id = d.stream_id\n) q"
		));
		assert!(!count.sql.contains("LIMIT"));
		assert_eq!(count.placeholder_count(), count.params.len());
	}

	#[test]
	fn test_combined_node_streams() {
		let filter = DatumCriteria::new()
			.with_node_ids(vec![1, 2, 3])
			.with_aggregation(Aggregation::Hour)
			.with_combining_type(CombiningType::Sum)
			.with_object_id_maps(vec!["100:1,2,3".to_string()]);
		let stmt = SelectDatum::new(filter).compile().unwrap();

		assert!(stmt.sql.contains(", vs AS (\nSELECT s.stream_id, vom.vid AS obj_id"));
		assert!(stmt.sql.contains("ORDER BY vs.obj_rank, vs.obj_id, vs.source_rank, vs.source_id, d.ts"));
		let params = stmt.params.into_inner();
		assert_eq!(params[0], BindValue::Int8Array(vec![1, 2, 3]));
		assert_eq!(params[1], BindValue::Int8Array(vec![1, 2, 3]));
		assert_eq!(params[2], BindValue::Int8Array(vec![100, 100, 100]));
		assert_eq!(params[3], BindValue::Int8Array(vec![100]));
		assert_eq!(params[4], BindValue::Text("sum".to_string()));
	}

	#[test]
	fn test_page_size_limit_from_config() {
		let compiler = SelectDatum::with_config(
			DatumCriteria::new().with_max(1000),
			CompilerConfig::default().with_max_page_size(100),
		);
		assert_eq!(compiler.compile().unwrap_err().code(), "FILTER_007");
	}
}
