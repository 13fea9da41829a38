// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{Aggregation, CompileError, Result, return_error};
use tracing::{debug, instrument};

use super::{
	StatementCompiler,
	common::{check_paging, count_of, order_by, paging, rejected},
};
use crate::{
	config::CompilerConfig,
	filter::{DatumCriteria, SortDescriptor, SortKey},
	meta::StreamMetadataQuery,
	plan::{CompiledStatement, SqlPlan},
	predicate,
	table::DatumTable,
};

const NAME: &str = "SelectObjectStreamMetadata";

/// Metadata of the streams a filter matches.
///
/// A date range keeps only streams with at least one raw datum in range.
#[derive(Debug, Clone)]
pub struct SelectObjectStreamMetadata {
	filter: DatumCriteria,
	config: CompilerConfig,
}

impl SelectObjectStreamMetadata {
	pub fn new(filter: DatumCriteria) -> Self {
		Self::with_config(filter, CompilerConfig::default())
	}

	pub fn with_config(filter: DatumCriteria, config: CompilerConfig) -> Self {
		Self {
			filter,
			config,
		}
	}

	fn validate(&self) -> Result<()> {
		let filter = &self.filter;
		self.config.validate()?;
		filter.validate()?;
		check_paging(filter, &self.config)?;

		let aggregation = filter.aggregation();
		if aggregation != Aggregation::None {
			return_error!(CompileError::UnsupportedAggregation {
				compiler: NAME,
				aggregation
			});
		}
		if filter.combining_type.is_some() {
			return_error!(CompileError::InvalidArgument {
				field: "combining_type",
				message: format!("{NAME} does not combine streams"),
			});
		}
		if filter.selects_single_record() {
			return_error!(CompileError::InvalidArgument {
				field: "most_recent",
				message: format!("{NAME} does not support most recent or earliest selections"),
			});
		}
		Ok(())
	}

	fn metadata(&self) -> SqlPlan {
		let filter = &self.filter;
		let mut query = StreamMetadataQuery::for_filter(filter, &self.config, &filter.object_ids, &filter.source_ids);

		let range = filter.date_range();
		if !range.is_unbounded() {
			let raw = DatumTable::Raw;
			let mut predicates = vec![SqlPlan::text("datum.stream_id = m.stream_id")];
			predicates.extend(predicate::date_range(
				&format!("datum.{}", raw.ts_column()),
				&range,
				query.time_zone_expr(),
			));
			let exists = SqlPlan::text(format!("EXISTS (SELECT 1 FROM {} datum ", raw.name()))
				.append(predicate::where_clause(predicates))
				.sql(")");
			query = query.with_predicate(exists);
		}
		query.render()
	}

	fn order(&self) -> SqlPlan {
		let sorts: Vec<SortDescriptor> =
			self.filter.sorts.iter().copied().filter(|sort| sort.key != SortKey::Time).collect();
		order_by(
			&sorts,
			|key| match key {
				SortKey::Object => "obj_id",
				SortKey::Source => "source_id",
				SortKey::Stream | SortKey::Time => "stream_id",
			},
			&["obj_id", "source_id"],
		)
	}
}

impl StatementCompiler for SelectObjectStreamMetadata {
	#[instrument(name = "sql::select_stream_metadata::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		self.validate().map_err(|err| rejected(NAME, err))?;
		let stmt = self.metadata().append(self.order()).append(paging(&self.filter)).render();
		debug!(params = stmt.params.len(), "compiled select stream metadata");
		Ok(stmt)
	}

	#[instrument(name = "sql::select_stream_metadata::compile_count", level = "trace", skip(self))]
	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		self.validate().map_err(|err| rejected(NAME, err))?;
		if self.filter.without_total_results_count {
			return Ok(None);
		}
		Ok(Some(count_of(self.metadata()).render()))
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;
	use datumql_type::BindValue;

	use super::*;

	#[test]
	fn test_metadata_ordered_by_object_and_source() {
		let stmt = SelectObjectStreamMetadata::new(DatumCriteria::new().with_node_ids(vec![1, 2])).compile().unwrap();
		assert!(stmt.sql.starts_with("SELECT m.stream_id, m.node_id AS obj_id"));
		assert!(stmt.sql.ends_with("WHERE m.node_id = ANY(?)\nORDER BY obj_id, source_id"));
		assert_eq!(stmt.params.len(), 1);
	}

	#[test]
	fn test_local_range_uses_location_zone() {
		let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
		let filter = DatumCriteria::new().with_location_ids(vec![3]).with_local_start_date(start);
		let stmt = SelectObjectStreamMetadata::new(filter).compile().unwrap();
		assert!(stmt.sql.contains(
			"AND EXISTS (SELECT 1 FROM solardatm.da_datm datum WHERE datum.stream_id = m.stream_id\n\
			 AND datum.ts >= ? AT TIME ZONE COALESCE(l.time_zone, 'UTC'))"
		));
		assert_eq!(stmt.params.get(2), Some(&BindValue::LocalTimestamp(start)));
	}

	#[test]
	fn test_rejects_aggregation_and_most_recent() {
		let filter = DatumCriteria::new().with_aggregation(datumql_type::Aggregation::Day);
		assert_eq!(SelectObjectStreamMetadata::new(filter).compile().unwrap_err().code(), "AGG_002");

		let filter = DatumCriteria::new().with_most_recent(true);
		assert_eq!(SelectObjectStreamMetadata::new(filter).compile().unwrap_err().code(), "FILTER_006");
	}

	#[test]
	fn test_count_wraps_metadata() {
		let filter = DatumCriteria::new().with_source_id("/a/*").with_max(10);
		let count = SelectObjectStreamMetadata::new(filter).compile_count().unwrap().unwrap();
		assert!(count.sql.starts_with("SELECT COUNT(*)\nFROM (\nSELECT m.stream_id"));
		assert!(count.sql.ends_with("WHERE m.source_id ~ solarcommon.ant_pattern_to_regexp(?)\n) q"));
		assert_eq!(count.params.len(), 1);
	}
}
