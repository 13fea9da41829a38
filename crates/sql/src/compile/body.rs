// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Bodies of the `d` CTE: rows read from one physical table per stream in `s`.

use chrono::NaiveDateTime;
use datumql_type::{Aggregation, CompileError, Result, return_error};

use crate::{
	filter::{DateRange, DatumCriteria, RollupType},
	plan::SqlPlan,
	predicate,
	table::{DatumTable, ROLLUP_DATA},
};

/// Local time of an aggregate row in its stream's zone.
const LOCAL_TS_START: &str = "datum.ts_start AT TIME ZONE s.time_zone";

const SEASON_MONTH: &str = "CASE \
	WHEN EXTRACT(month FROM datum.ts_start AT TIME ZONE s.time_zone) IN (12, 1, 2) THEN 1 \
	WHEN EXTRACT(month FROM datum.ts_start AT TIME ZONE s.time_zone) IN (3, 4, 5) THEN 4 \
	WHEN EXTRACT(month FROM datum.ts_start AT TIME ZONE s.time_zone) IN (6, 7, 8) THEN 7 \
	ELSE 10 END";

/// Day of the first Monday in the season's 2001 month: April and July start on a Sunday.
const SEASON_FIRST_MONDAY: &str = "CASE \
	WHEN EXTRACT(month FROM datum.ts_start AT TIME ZONE s.time_zone) BETWEEN 3 AND 8 THEN 2 \
	ELSE 1 END";

fn date_predicates(ts_column: &str, range: &DateRange) -> Vec<SqlPlan> {
	predicate::date_range(&format!("datum.{ts_column}"), range, "s.time_zone")
}

/// `SELECT <columns> FROM <table> datum` joined to `s`.
pub(crate) fn rows(table: &str, ts_column: &str, columns: &str, range: &DateRange) -> SqlPlan {
	SqlPlan::text(format!("SELECT {columns}\nFROM {table} datum\nINNER JOIN s ON s.stream_id = datum.stream_id"))
		.append(where_line(date_predicates(ts_column, range)))
}

/// Like [`rows`] with a trailing `GROUP BY`.
pub(crate) fn grouped(table: &str, ts_column: &str, columns: &str, range: &DateRange, group_by: &str) -> SqlPlan {
	rows(table, ts_column, columns, range).sql(format!("\nGROUP BY {group_by}"))
}

/// One row per stream: the latest (or earliest) row in range.
pub(crate) fn latest(table: &str, ts_column: &str, columns: &str, range: &DateRange, descending: bool) -> SqlPlan {
	let mut predicates = vec![SqlPlan::text("datum.stream_id = s.stream_id")];
	predicates.extend(date_predicates(ts_column, range));

	SqlPlan::text(format!("SELECT {columns}\nFROM s\nINNER JOIN LATERAL (\nSELECT datum.*\nFROM {table} datum\n"))
		.append(predicate::where_clause(predicates))
		.sql(format!(
			"\nORDER BY datum.{ts_column} {}\nLIMIT 1\n) datum ON TRUE",
			if descending {
				"DESC"
			} else {
				"ASC"
			}
		))
}

fn where_line(predicates: Vec<SqlPlan>) -> SqlPlan {
	if predicates.is_empty() {
		return SqlPlan::new();
	}
	SqlPlan::text("\n").append(predicate::where_clause(predicates))
}

/// How a datum aggregation is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DatumBody {
	/// Stored rows of the level itself.
	Rows(DatumTable),
	/// Finer rows rolled up into calendar buckets (`week`, `year`).
	Truncated {
		table: DatumTable,
		unit: &'static str,
	},
	/// Finer rows rolled up by a recurring calendar key.
	CalendarSlice {
		table: DatumTable,
		aggregation: Aggregation,
	},
	/// All rows of each stream rolled into one.
	Rollup(DatumTable),
	Latest {
		table: DatumTable,
		descending: bool,
	},
	/// Rows of a partial window rolled into one row stamped with `start`.
	Window {
		table: DatumTable,
		start: NaiveDateTime,
	},
}

impl DatumBody {
	pub(crate) fn for_filter(filter: &DatumCriteria, compiler: &'static str) -> Result<DatumBody> {
		let aggregation = filter.aggregation();
		Self::for_aggregation(filter, aggregation, compiler)
	}

	pub(crate) fn for_aggregation(
		filter: &DatumCriteria,
		aggregation: Aggregation,
		compiler: &'static str,
	) -> Result<DatumBody> {
		let unsupported = || -> datumql_type::Error {
			CompileError::UnsupportedAggregation {
				compiler,
				aggregation,
			}
			.into()
		};
		let table = DatumTable::source_for(aggregation).ok_or_else(unsupported)?;

		if filter.selects_single_record() {
			let table = DatumTable::for_aggregation(aggregation).ok_or_else(unsupported)?;
			return Ok(DatumBody::Latest {
				table,
				descending: filter.most_recent,
			});
		}

		if filter.rollup_type() == RollupType::All {
			if !matches!(aggregation, Aggregation::Hour | Aggregation::Day | Aggregation::Month) {
				return_error!(CompileError::InvalidArgument {
					field: "rollup_type",
					message: format!("rollup requires aggregation Hour, Day or Month, not {:?}", aggregation),
				});
			}
			return Ok(DatumBody::Rollup(table));
		}

		Ok(match aggregation {
			Aggregation::None | Aggregation::Hour | Aggregation::Day | Aggregation::Month => {
				DatumBody::Rows(table)
			}
			Aggregation::Week => DatumBody::Truncated {
				table,
				unit: "week",
			},
			Aggregation::Year => DatumBody::Truncated {
				table,
				unit: "year",
			},
			Aggregation::RunningTotal => DatumBody::Rollup(table),
			Aggregation::HourOfDay
			| Aggregation::SeasonalHourOfDay
			| Aggregation::DayOfWeek
			| Aggregation::SeasonalDayOfWeek
			| Aggregation::WeekOfYear => DatumBody::CalendarSlice {
				table,
				aggregation,
			},
			_ => return Err(unsupported()),
		})
	}

	pub(crate) fn render(&self, range: &DateRange) -> SqlPlan {
		match *self {
			DatumBody::Rows(table) => rows(table.name(), table.ts_column(), table.columns(), range),
			DatumBody::Truncated {
				table,
				unit,
			} => grouped(
				table.name(),
				table.ts_column(),
				&format!(
					"datum.stream_id, date_trunc('{unit}', {LOCAL_TS_START}) AT TIME ZONE s.time_zone AS ts, \
					 {ROLLUP_DATA}"
				),
				range,
				"datum.stream_id, ts",
			),
			DatumBody::CalendarSlice {
				table,
				aggregation,
			} => grouped(
				table.name(),
				table.ts_column(),
				&format!("datum.stream_id, {} AS ts, {ROLLUP_DATA}", calendar_key(aggregation)),
				range,
				"datum.stream_id, ts",
			),
			DatumBody::Rollup(table) => grouped(
				table.name(),
				table.ts_column(),
				&format!("datum.stream_id, min(datum.ts_start) AS ts, {ROLLUP_DATA}"),
				range,
				"datum.stream_id",
			),
			DatumBody::Latest {
				table,
				descending,
			} => latest(table.name(), table.ts_column(), table.columns(), range, descending),
			DatumBody::Window {
				table,
				start,
			} => SqlPlan::text("SELECT datum.stream_id, ")
				.bind(start)
				.sql(format!(
					" AT TIME ZONE s.time_zone AS ts, {ROLLUP_DATA}\n\
					 FROM {} datum\n\
					 INNER JOIN s ON s.stream_id = datum.stream_id",
					table.name()
				))
				.append(where_line(date_predicates(table.ts_column(), range)))
				.sql("\nGROUP BY datum.stream_id, s.time_zone"),
		}
	}
}

/// Grouping key of a calendar slice, a timestamp in 2001 standing for the slot.
fn calendar_key(aggregation: Aggregation) -> String {
	let hour = format!("EXTRACT(hour FROM {LOCAL_TS_START})::INTEGER");
	let isodow = format!("EXTRACT(isodow FROM {LOCAL_TS_START})::INTEGER");
	match aggregation {
		Aggregation::HourOfDay => format!("make_timestamp(2001, 1, 1, {hour}, 0, 0)"),
		Aggregation::SeasonalHourOfDay => format!("make_timestamp(2001, {SEASON_MONTH}, 1, {hour}, 0, 0)"),
		// 2001-01-01 is a Monday, so ISO day numbers land on matching weekdays
		Aggregation::DayOfWeek => format!("make_timestamp(2001, 1, {isodow}, 0, 0, 0)"),
		Aggregation::SeasonalDayOfWeek => {
			format!("make_timestamp(2001, {SEASON_MONTH}, {SEASON_FIRST_MONDAY} - 1 + {isodow}, 0, 0, 0)")
		}
		_ => format!(
			"make_timestamp(2001, 1, 1, 0, 0, 0) + \
			 make_interval(weeks => EXTRACT(week FROM {LOCAL_TS_START})::INTEGER - 1)"
		),
	}
}
