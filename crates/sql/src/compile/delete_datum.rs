// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{Aggregation, CompileError, DatumPK, ObjectDatumId, Result, StreamIdentity, return_error};
use tracing::{debug, instrument};

use super::{
	StatementCompiler,
	common::{rejected, with_ctes},
};
use crate::{
	config::CompilerConfig,
	filter::DatumCriteria,
	meta::StreamMetadataQuery,
	plan::{CompiledStatement, SqlPlan},
	predicate,
	table::DatumTable,
};

/// Deletes the raw datum of matching streams within a date range.
#[derive(Debug, Clone)]
pub struct DeleteDatum {
	filter: DatumCriteria,
	config: CompilerConfig,
}

impl DeleteDatum {
	const NAME: &'static str = "DeleteDatum";

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

		let aggregation = filter.aggregation();
		if aggregation != Aggregation::None {
			return_error!(CompileError::UnsupportedAggregation {
				compiler: Self::NAME,
				aggregation
			});
		}
		if filter.combining_type.is_some() {
			return_error!(CompileError::InvalidArgument {
				field: "combining_type",
				message: "deletes apply to stored streams only".to_string(),
			});
		}
		if filter.selects_single_record() {
			return_error!(CompileError::InvalidArgument {
				field: "most_recent",
				message: format!("{} does not support most recent or earliest selections", Self::NAME),
			});
		}
		if filter.object_ids.is_empty() && filter.stream_ids.is_empty() {
			return_error!(CompileError::InvalidArgument {
				field: "object_ids",
				message: "deleting datum requires object or stream ids".to_string(),
			});
		}
		if !filter.date_range().is_complete() {
			return_error!(CompileError::MissingDateRange {
				compiler: Self::NAME,
				expected: "a start and end date",
			});
		}
		Ok(())
	}
}

impl StatementCompiler for DeleteDatum {
	#[instrument(name = "sql::delete_datum::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		self.validate().map_err(|err| rejected(Self::NAME, err))?;
		let filter = &self.filter;
		let raw = DatumTable::Raw;

		let meta = StreamMetadataQuery::for_filter(filter, &self.config, &filter.object_ids, &filter.source_ids);
		let mut predicates = vec![SqlPlan::text("datum.stream_id = s.stream_id")];
		predicates.extend(predicate::date_range(
			&format!("datum.{}", raw.ts_column()),
			&filter.date_range(),
			"s.time_zone",
		));

		let stmt = with_ctes(vec![("s", meta.render())])
			.sql(format!("DELETE FROM {} datum\nUSING s\n", raw.name()))
			.append(predicate::where_clause(predicates))
			.render();
		debug!(params = stmt.params.len(), "compiled delete datum");
		Ok(stmt)
	}
}

/// Deletes raw datum rows by primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteDatumById {
	ids: Vec<DatumPK>,
}

impl DeleteDatumById {
	const NAME: &'static str = "DeleteDatumById";

	pub fn new(ids: Vec<DatumPK>) -> Self {
		Self {
			ids,
		}
	}

	/// Ids whose object/source pair has no stream are dropped.
	pub fn resolve(ids: &[ObjectDatumId], identity: &dyn StreamIdentity) -> Self {
		let resolved: Vec<DatumPK> = ids.iter().filter_map(|id| id.resolve(identity)).collect();
		if resolved.len() < ids.len() {
			debug!(skipped = ids.len() - resolved.len(), "unresolved datum ids dropped");
		}
		Self::new(resolved)
	}

	pub fn ids(&self) -> &[DatumPK] {
		&self.ids
	}
}

impl StatementCompiler for DeleteDatumById {
	#[instrument(name = "sql::delete_datum_by_id::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		if self.ids.is_empty() {
			return Err(rejected(
				Self::NAME,
				CompileError::InvalidArgument {
					field: "ids",
					message: "at least one datum id is required".to_string(),
				}
				.into(),
			));
		}

		let raw = DatumTable::Raw;
		let rows = self.ids.iter().map(|id| {
			SqlPlan::text("(stream_id = ")
				.bind(id.stream_id)
				.sql(format!(" AND {} = ", raw.ts_column()))
				.bind(id.timestamp)
				.sql(")")
		});
		let stmt = SqlPlan::text(format!("DELETE FROM {}\nWHERE ", raw.name()))
			.append(SqlPlan::join(rows, "\nOR "))
			.render();
		debug!(rows = self.ids.len(), "compiled delete datum by id");
		Ok(stmt)
	}
}

#[cfg(test)]
mod tests {
	use chrono::{DateTime, TimeZone, Utc};
	use datumql_type::{BindValue, ObjectDatumKind, ObjectStreamId};
	use uuid::Uuid;

	use super::*;

	fn ts(day: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2021, 1, day, 0, 0, 0).unwrap()
	}

	#[test]
	fn test_delete_range() {
		let filter = DatumCriteria::new().with_node_ids(vec![1]).with_start_date(ts(1)).with_end_date(ts(2));
		let stmt = DeleteDatum::new(filter).compile().unwrap();
		assert!(stmt.sql.starts_with("WITH s AS (\nSELECT m.stream_id"));
		assert!(stmt.sql.ends_with(
			"DELETE FROM solardatm.da_datm datum\n\
			 USING s\n\
			 WHERE datum.stream_id = s.stream_id\n\
			 AND datum.ts >= ?\n\
			 AND datum.ts < ?"
		));
		assert_eq!(stmt.params.len(), 3);
	}

	#[test]
	fn test_delete_requires_ids_and_full_range() {
		let filter = DatumCriteria::new().with_start_date(ts(1)).with_end_date(ts(2));
		assert_eq!(DeleteDatum::new(filter).compile().unwrap_err().code(), "FILTER_006");

		let filter = DatumCriteria::new().with_node_ids(vec![1]).with_start_date(ts(1));
		assert_eq!(DeleteDatum::new(filter).compile().unwrap_err().code(), "FILTER_003");
	}

	#[test]
	fn test_delete_rejects_most_recent_by_field() {
		let filter = DatumCriteria::new()
			.with_node_ids(vec![1])
			.with_start_date(ts(1))
			.with_end_date(ts(2))
			.with_most_recent(true);
		let err = DeleteDatum::new(filter).compile().unwrap_err();
		assert_eq!(err.code(), "FILTER_006");
		assert_eq!(err.field.as_deref(), Some("most_recent"));
	}

	#[test]
	fn test_delete_by_id() {
		let a = Uuid::new_v4();
		let stmt = DeleteDatumById::new(vec![DatumPK::new(a, ts(1)), DatumPK::new(a, ts(2))]).compile().unwrap();
		assert_eq!(
			stmt.sql,
			"DELETE FROM solardatm.da_datm\nWHERE (stream_id = ? AND ts = ?)\nOR (stream_id = ? AND ts = ?)"
		);
		assert_eq!(stmt.params.get(4), Some(&BindValue::Timestamp(ts(2))));

		assert_eq!(DeleteDatumById::new(vec![]).compile().unwrap_err().code(), "FILTER_006");
	}

	struct Known(Uuid);

	impl StreamIdentity for Known {
		fn resolve(&self, _kind: ObjectDatumKind, object_id: i64, _source_id: &str) -> Option<Uuid> {
			(object_id == 1).then_some(self.0)
		}

		fn reverse(&self, _stream_id: Uuid) -> Option<ObjectStreamId> {
			None
		}
	}

	#[test]
	fn test_resolve_skips_unknown_streams() {
		let identity = Known(Uuid::new_v4());
		let ids = vec![
			ObjectDatumId::new(ObjectStreamId::node(1, "a"), ts(1)),
			ObjectDatumId::new(ObjectStreamId::node(2, "a"), ts(1)),
		];
		let delete = DeleteDatumById::resolve(&ids, &identity);
		assert_eq!(delete.ids(), &[DatumPK::new(identity.0, ts(1))]);
	}
}
