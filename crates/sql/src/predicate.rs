// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! WHERE-clause fragments.
//!
//! A single value is compared with `=`, several with `= ANY(array)`. Empty
//! inputs produce no predicate at all.

use datumql_type::{Aggregation, IntoBindValue};
use uuid::Uuid;

use crate::{filter::DateRange, plan::SqlPlan};

fn equal_or_any<T>(column: &str, values: &[T]) -> Option<SqlPlan>
where
	T: Clone + IntoBindValue,
	Vec<T>: IntoBindValue,
{
	match values {
		[] => None,
		[value] => Some(SqlPlan::text(format!("{column} = ")).bind(value.clone())),
		_ => Some(SqlPlan::text(format!("{column} = ANY(")).bind(values.to_vec()).sql(")")),
	}
}

pub fn object_ids(column: &str, ids: &[i64]) -> Option<SqlPlan> {
	equal_or_any(column, ids)
}

pub fn stream_ids(column: &str, ids: &[Uuid]) -> Option<SqlPlan> {
	equal_or_any(column, ids)
}

pub fn user_ids(column: &str, ids: &[i64]) -> Option<SqlPlan> {
	equal_or_any(column, ids)
}

/// Source ids containing `*` or `?` are Ant-style patterns.
pub fn is_wildcard(source_id: &str) -> bool {
	source_id.contains(['*', '?'])
}

pub fn source_ids(column: &str, ids: &[String]) -> Option<SqlPlan> {
	if !ids.iter().any(|id| is_wildcard(id)) {
		return equal_or_any(column, ids);
	}
	match ids {
		[pattern] => Some(
			SqlPlan::text(format!("{column} ~ solarcommon.ant_pattern_to_regexp("))
				.bind(pattern.clone())
				.sql(")"),
		),
		_ => Some(
			SqlPlan::text(format!(
				"{column} ~ ANY(ARRAY(SELECT solarcommon.ant_pattern_to_regexp(unnest("
			))
			.bind(ids.to_vec())
			.sql("))))"),
		),
	}
}

/// Restricts to nodes a security token grants access to.
pub fn token_ids(node_column: &str, tokens: &[String]) -> Option<SqlPlan> {
	let token = equal_or_any("ut.auth_token", tokens)?;
	Some(SqlPlan::text(format!(
		"EXISTS (SELECT 1 FROM solaruser.user_auth_token_node ut WHERE ut.node_id = {node_column} AND "
	))
	.append(token)
	.sql(")"))
}

/// Half-open date bounds on `column`.
///
/// Local dates are converted with `time_zone`, an SQL expression naming the
/// zone of the row being compared.
pub fn date_range(column: &str, range: &DateRange, time_zone: &str) -> Vec<SqlPlan> {
	let mut predicates = Vec::new();
	match *range {
		DateRange::Unbounded => {}
		DateRange::Absolute {
			start,
			end,
		} => {
			if let Some(start) = start {
				predicates.push(SqlPlan::text(format!("{column} >= ")).bind(start));
			}
			if let Some(end) = end {
				predicates.push(SqlPlan::text(format!("{column} < ")).bind(end));
			}
		}
		DateRange::Local {
			start,
			end,
		} => {
			if let Some(start) = start {
				predicates.push(
					SqlPlan::text(format!("{column} >= ")).bind(start).sql(format!(" AT TIME ZONE {time_zone}")),
				);
			}
			if let Some(end) = end {
				predicates.push(
					SqlPlan::text(format!("{column} < ")).bind(end).sql(format!(" AT TIME ZONE {time_zone}")),
				);
			}
		}
	}
	predicates
}

pub fn aggregation_kind(column: &str, aggregation: Aggregation) -> SqlPlan {
	SqlPlan::text(format!("{column} = ")).bind(aggregation.key())
}

/// `WHERE a\nAND b ...`, or nothing when there are no predicates.
pub fn where_clause(predicates: Vec<SqlPlan>) -> SqlPlan {
	if predicates.is_empty() {
		return SqlPlan::new();
	}
	SqlPlan::text("WHERE ").append(SqlPlan::join(predicates, "\nAND "))
}

#[cfg(test)]
mod tests {
	use chrono::{NaiveDate, TimeZone, Utc};
	use datumql_type::BindValue;

	use super::*;

	fn render(plan: Option<SqlPlan>) -> (String, Vec<BindValue>) {
		let stmt = plan.unwrap().render();
		(stmt.sql, stmt.params.into_inner())
	}

	#[test]
	fn test_single_and_multiple_ids() {
		assert_eq!(render(object_ids("m.node_id", &[1])), ("m.node_id = ?".to_string(), vec![BindValue::Int8(1)]));
		assert_eq!(
			render(object_ids("m.node_id", &[1, 2])),
			("m.node_id = ANY(?)".to_string(), vec![BindValue::Int8Array(vec![1, 2])])
		);
		assert!(object_ids("m.node_id", &[]).is_none());
	}

	#[test]
	fn test_source_patterns() {
		let (sql, params) = render(source_ids("m.source_id", &["/a/**".to_string()]));
		assert_eq!(sql, "m.source_id ~ solarcommon.ant_pattern_to_regexp(?)");
		assert_eq!(params, vec![BindValue::Text("/a/**".to_string())]);

		let (sql, _) = render(source_ids("m.source_id", &["a".to_string(), "b".to_string()]));
		assert_eq!(sql, "m.source_id = ANY(?)");

		let (sql, params) = render(source_ids("m.source_id", &["a".to_string(), "b?".to_string()]));
		assert_eq!(sql, "m.source_id ~ ANY(ARRAY(SELECT solarcommon.ant_pattern_to_regexp(unnest(?))))");
		assert_eq!(params, vec![BindValue::TextArray(vec!["a".to_string(), "b?".to_string()])]);
	}

	#[test]
	fn test_token_exists() {
		let (sql, _) = render(token_ids("m.node_id", &["t1".to_string()]));
		assert_eq!(
			sql,
			"EXISTS (SELECT 1 FROM solaruser.user_auth_token_node ut WHERE ut.node_id = m.node_id AND ut.auth_token = ?)"
		);
	}

	#[test]
	fn test_local_dates_bind_local_timestamps() {
		let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
		let range = DateRange::Local {
			start: Some(start),
			end: None,
		};
		let predicates = date_range("datum.ts", &range, "s.time_zone");
		assert_eq!(predicates.len(), 1);
		let stmt = predicates.into_iter().next().unwrap().render();
		assert_eq!(stmt.sql, "datum.ts >= ? AT TIME ZONE s.time_zone");
		assert_eq!(stmt.params.get(1), Some(&BindValue::LocalTimestamp(start)));
	}

	#[test]
	fn test_absolute_dates_and_where() {
		let range = DateRange::Absolute {
			start: Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()),
			end: Some(Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap()),
		};
		let stmt = where_clause(date_range("datum.ts", &range, "s.time_zone")).render();
		assert_eq!(stmt.sql, "WHERE datum.ts >= ?\nAND datum.ts < ?");
		assert_eq!(stmt.params.len(), 2);
		assert!(where_clause(vec![]).is_empty());
	}
}
