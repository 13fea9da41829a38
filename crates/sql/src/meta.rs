// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Stream metadata selection.
//!
//! Every datum query starts from the streams a filter matches: their object
//! and source ids, property names and effective time zone. Statements embed
//! this select as the `s` CTE.

use datumql_type::ObjectDatumKind;

use crate::{
	config::CompilerConfig,
	filter::DatumCriteria,
	plan::SqlPlan,
	predicate,
	table::{meta_table, object_column},
};

#[derive(Debug, Clone)]
pub struct StreamMetadataQuery {
	kind: ObjectDatumKind,
	time_zone: String,
	predicates: Vec<SqlPlan>,
	user_join: bool,
}

impl StreamMetadataQuery {
	pub fn new(kind: ObjectDatumKind, config: &CompilerConfig) -> Self {
		Self {
			kind,
			time_zone: config.time_zone_expr(),
			predicates: Vec::new(),
			user_join: false,
		}
	}

	/// Metadata restricted by the filter's stream-level criteria.
	///
	/// `object_ids` and `source_ids` replace the filter's own ids, so virtual
	/// members can stand in when no explicit ids were given.
	pub fn for_filter(
		filter: &DatumCriteria,
		config: &CompilerConfig,
		object_ids: &[i64],
		source_ids: &[String],
	) -> Self {
		let mut query = Self::new(filter.object_kind(), config);
		let object_col = query.object_column();

		query.predicates.extend(predicate::object_ids(&object_col, object_ids));
		query.predicates.extend(predicate::stream_ids("m.stream_id", &filter.stream_ids));
		query.predicates.extend(predicate::source_ids("m.source_id", source_ids));
		if let Some(users) = predicate::user_ids("un.user_id", &filter.user_ids) {
			query.user_join = true;
			query.predicates.push(users);
		}
		query.predicates.extend(predicate::token_ids(&object_col, &filter.token_ids));
		query
	}

	pub fn with_predicate(mut self, predicate: SqlPlan) -> Self {
		self.predicates.push(predicate);
		self
	}

	pub fn kind(&self) -> ObjectDatumKind {
		self.kind
	}

	/// Qualified object id column, e.g. `m.node_id`.
	pub fn object_column(&self) -> String {
		format!("m.{}", object_column(self.kind))
	}

	/// Expression for a stream's time zone, valid where `l` is joined.
	pub fn time_zone_expr(&self) -> &str {
		&self.time_zone
	}

	pub fn render(self) -> SqlPlan {
		let object_col = self.object_column();
		let mut plan = SqlPlan::text(format!(
			"SELECT m.stream_id, {object_col} AS obj_id, m.source_id, m.names_i, m.names_a, m.names_s, m.jdata, \
			 {} AS time_zone\nFROM {} m\n",
			self.time_zone,
			meta_table(self.kind)
		));

		plan = match self.kind {
			ObjectDatumKind::Node => plan.sql(
				"LEFT OUTER JOIN solarnet.sn_node n ON n.node_id = m.node_id\n\
				 LEFT OUTER JOIN solarnet.sn_loc l ON l.id = n.loc_id",
			),
			ObjectDatumKind::Location => plan.sql("LEFT OUTER JOIN solarnet.sn_loc l ON l.id = m.loc_id"),
		};
		if self.user_join {
			plan = plan.sql("\nINNER JOIN solaruser.user_node un ON un.node_id = m.node_id");
		}
		if !self.predicates.is_empty() {
			plan = plan.sql("\n").append(predicate::where_clause(self.predicates));
		}
		plan
	}
}

#[cfg(test)]
mod tests {
	use datumql_type::BindValue;

	use super::*;

	#[test]
	fn test_node_metadata_with_users() {
		let filter = DatumCriteria::new().with_node_ids(vec![1, 2]).with_source_id("a").with_user_ids(vec![9]);
		let config = CompilerConfig::default();
		let stmt = StreamMetadataQuery::for_filter(&filter, &config, &filter.object_ids, &filter.source_ids)
			.render()
			.render();

		assert!(stmt.sql.starts_with("SELECT m.stream_id, m.node_id AS obj_id"));
		assert!(stmt.sql.contains("COALESCE(l.time_zone, 'UTC') AS time_zone"));
		assert!(stmt.sql.contains("INNER JOIN solaruser.user_node un ON un.node_id = m.node_id"));
		assert!(stmt.sql.ends_with("WHERE m.node_id = ANY(?)\nAND m.source_id = ?\nAND un.user_id = ?"));
		assert_eq!(
			stmt.params.into_inner(),
			vec![BindValue::Int8Array(vec![1, 2]), BindValue::Text("a".to_string()), BindValue::Int8(9)]
		);
	}

	#[test]
	fn test_location_metadata() {
		let filter = DatumCriteria::new().with_location_ids(vec![5]);
		let config = CompilerConfig::default().with_default_time_zone("Pacific/Auckland");
		let stmt = StreamMetadataQuery::for_filter(&filter, &config, &filter.object_ids, &[]).render().render();

		assert!(stmt.sql.contains("m.loc_id AS obj_id"));
		assert!(stmt.sql.contains("FROM solardatm.da_loc_datm_meta m"));
		assert!(stmt.sql.contains("LEFT OUTER JOIN solarnet.sn_loc l ON l.id = m.loc_id"));
		assert!(stmt.sql.contains("COALESCE(l.time_zone, 'Pacific/Auckland')"));
		assert!(!stmt.sql.contains("sn_node"));
		assert!(stmt.sql.ends_with("WHERE m.loc_id = ?"));
	}

	#[test]
	fn test_unrestricted_metadata_has_no_where() {
		let stmt = StreamMetadataQuery::new(ObjectDatumKind::Node, &CompilerConfig::default()).render().render();
		assert!(!stmt.sql.contains("WHERE"));
		assert!(stmt.params.is_empty());
	}
}
