// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Physical datum tables.

use datumql_type::{Aggregation, ObjectDatumKind};

pub const RAW_COLUMNS: &str =
	"datum.stream_id, datum.ts, datum.received, datum.data_i, datum.data_a, datum.data_s, datum.data_t";

pub const AGGREGATE_COLUMNS: &str = "datum.stream_id, datum.ts_start AS ts, \
	datum.data_i, datum.data_a, datum.data_s, datum.data_t, datum.stat_i, datum.read_a";

/// Rolls aggregate rows into one `agg_data` record, expanded into its columns.
pub const ROLLUP_DATA: &str = "(solardatm.rollup_agg_data(\
	(datum.data_i, datum.data_a, datum.data_s, datum.data_t, datum.stat_i, datum.read_a)::solardatm.agg_data \
	ORDER BY datum.ts_start)).*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatumTable {
	Raw,
	Hourly,
	Daily,
	Monthly,
}

impl DatumTable {
	pub const fn name(&self) -> &'static str {
		match self {
			DatumTable::Raw => "solardatm.da_datm",
			DatumTable::Hourly => "solardatm.agg_datm_hourly",
			DatumTable::Daily => "solardatm.agg_datm_daily",
			DatumTable::Monthly => "solardatm.agg_datm_monthly",
		}
	}

	pub const fn ts_column(&self) -> &'static str {
		match self {
			DatumTable::Raw => "ts",
			_ => "ts_start",
		}
	}

	pub const fn columns(&self) -> &'static str {
		match self {
			DatumTable::Raw => RAW_COLUMNS,
			_ => AGGREGATE_COLUMNS,
		}
	}

	/// The table that stores rows of exactly this level.
	pub const fn for_aggregation(aggregation: Aggregation) -> Option<DatumTable> {
		match aggregation {
			Aggregation::None => Some(DatumTable::Raw),
			Aggregation::Hour => Some(DatumTable::Hourly),
			Aggregation::Day => Some(DatumTable::Daily),
			Aggregation::Month => Some(DatumTable::Monthly),
			_ => None,
		}
	}

	/// The stored level a computed aggregation is rolled up from.
	pub const fn source_for(aggregation: Aggregation) -> Option<DatumTable> {
		match aggregation {
			Aggregation::None => Some(DatumTable::Raw),
			Aggregation::Hour | Aggregation::HourOfDay | Aggregation::SeasonalHourOfDay => {
				Some(DatumTable::Hourly)
			}
			Aggregation::Day
			| Aggregation::DayOfWeek
			| Aggregation::SeasonalDayOfWeek
			| Aggregation::Week
			| Aggregation::WeekOfYear => Some(DatumTable::Daily),
			Aggregation::Month | Aggregation::Year | Aggregation::RunningTotal => Some(DatumTable::Monthly),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditTable {
	Hourly,
	Daily,
	Monthly,
	AccumulativeDaily,
}

impl AuditTable {
	pub const fn name(&self) -> &'static str {
		match self {
			AuditTable::Hourly => "solardatm.aud_datm_io",
			AuditTable::Daily => "solardatm.aud_datm_daily",
			AuditTable::Monthly => "solardatm.aud_datm_monthly",
			AuditTable::AccumulativeDaily => "solardatm.aud_acc_datm_daily",
		}
	}

	pub const fn columns(&self) -> &'static str {
		match self {
			AuditTable::Hourly => {
				"datum.stream_id, datum.ts_start AS ts, datum.prop_count, datum.prop_u_count, datum.datum_q_count, \
				 0::BIGINT AS datum_count, 0::INTEGER AS datum_hourly_count, 0::INTEGER AS datum_daily_count, \
				 0::INTEGER AS datum_monthly_count"
			}
			AuditTable::Daily => {
				"datum.stream_id, datum.ts_start AS ts, datum.prop_count, datum.prop_u_count, datum.datum_q_count, \
				 datum.datum_count, datum.datum_hourly_count, datum.datum_daily_pres::INTEGER AS datum_daily_count, \
				 0::INTEGER AS datum_monthly_count"
			}
			AuditTable::Monthly => {
				"datum.stream_id, datum.ts_start AS ts, datum.prop_count, datum.prop_u_count, datum.datum_q_count, \
				 datum.datum_count, datum.datum_hourly_count, datum.datum_daily_count, \
				 datum.datum_monthly_pres::INTEGER AS datum_monthly_count"
			}
			AuditTable::AccumulativeDaily => {
				"datum.stream_id, datum.ts_start AS ts, datum.datum_count, datum.datum_hourly_count, \
				 datum.datum_daily_count, datum.datum_monthly_count"
			}
		}
	}

	/// Per-stream sums used by a rollup over all rows.
	pub const fn rollup_columns(&self) -> &'static str {
		match self {
			AuditTable::AccumulativeDaily => {
				"datum.stream_id, min(datum.ts_start) AS ts, sum(datum.datum_count)::BIGINT AS datum_count, \
				 sum(datum.datum_hourly_count)::INTEGER AS datum_hourly_count, \
				 sum(datum.datum_daily_count)::INTEGER AS datum_daily_count, \
				 sum(datum.datum_monthly_count)::INTEGER AS datum_monthly_count"
			}
			_ => {
				"datum.stream_id, min(datum.ts_start) AS ts, sum(datum.prop_count)::BIGINT AS prop_count, \
				 sum(datum.prop_u_count)::BIGINT AS prop_u_count, sum(datum.datum_q_count)::BIGINT AS datum_q_count"
			}
		}
	}
}

/// Stale-row queue tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaleTable {
	Aggregate,
	Audit,
}

impl StaleTable {
	pub const fn name(&self) -> &'static str {
		match self {
			StaleTable::Aggregate => "solardatm.agg_stale_datm",
			StaleTable::Audit => "solardatm.aud_stale_datm",
		}
	}

	pub const fn kind_column(&self) -> &'static str {
		match self {
			StaleTable::Aggregate => "agg_kind",
			StaleTable::Audit => "aud_kind",
		}
	}
}

pub const fn meta_table(kind: ObjectDatumKind) -> &'static str {
	match kind {
		ObjectDatumKind::Node => "solardatm.da_datm_meta",
		ObjectDatumKind::Location => "solardatm.da_loc_datm_meta",
	}
}

/// Object id column of the metadata table, unqualified.
pub const fn object_column(kind: ObjectDatumKind) -> &'static str {
	match kind {
		ObjectDatumKind::Node => "node_id",
		ObjectDatumKind::Location => "loc_id",
	}
}
