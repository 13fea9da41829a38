// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Filter criteria accepted by the statement compilers.

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use datumql_type::{Aggregation, CompileError, Error, ObjectDatumKind, Result, return_error};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
	Object,
	Source,
	Time,
	Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDescriptor {
	pub key: SortKey,
	pub descending: bool,
}

impl SortDescriptor {
	pub fn asc(key: SortKey) -> Self {
		Self {
			key,
			descending: false,
		}
	}

	pub fn desc(key: SortKey) -> Self {
		Self {
			key,
			descending: true,
		}
	}
}

/// How the members of a virtual id are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombiningType {
	#[serde(rename = "sum")]
	Sum,
}

impl CombiningType {
	pub const fn key(&self) -> &'static str {
		match self {
			CombiningType::Sum => "sum",
		}
	}

	pub fn for_key(key: &str) -> Result<CombiningType> {
		match key.trim().to_ascii_lowercase().as_str() {
			"sum" => Ok(CombiningType::Sum),
			_ => Err(CompileError::UnknownCombiningType {
				key: key.to_string(),
			}
			.into()),
		}
	}
}

impl Display for CombiningType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

impl FromStr for CombiningType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		CombiningType::for_key(s)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RollupType {
	#[default]
	None,
	/// Collapse each stream's rows into a single row.
	All,
}

/// The date restriction a filter carries, after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
	Unbounded,
	Absolute {
		start: Option<DateTime<Utc>>,
		end: Option<DateTime<Utc>>,
	},
	/// Wall-clock dates, interpreted in each stream's own time zone.
	Local {
		start: Option<NaiveDateTime>,
		end: Option<NaiveDateTime>,
	},
}

impl DateRange {
	pub fn is_unbounded(&self) -> bool {
		matches!(self, DateRange::Unbounded)
	}

	pub fn is_complete(&self) -> bool {
		match self {
			DateRange::Unbounded => false,
			DateRange::Absolute {
				start,
				end,
			} => start.is_some() && end.is_some(),
			DateRange::Local {
				start,
				end,
			} => start.is_some() && end.is_some(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatumCriteria {
	pub object_kind: Option<ObjectDatumKind>,
	pub object_ids: Vec<i64>,
	pub stream_ids: Vec<Uuid>,
	pub source_ids: Vec<String>,
	pub user_ids: Vec<i64>,
	pub token_ids: Vec<String>,
	pub start_date: Option<DateTime<Utc>>,
	pub end_date: Option<DateTime<Utc>>,
	pub local_start_date: Option<NaiveDateTime>,
	pub local_end_date: Option<NaiveDateTime>,
	pub aggregation: Option<Aggregation>,
	pub partial_aggregation: Option<Aggregation>,
	pub combining_type: Option<CombiningType>,
	pub object_id_maps: Vec<String>,
	pub source_id_maps: Vec<String>,
	pub rollup_type: Option<RollupType>,
	pub sorts: Vec<SortDescriptor>,
	pub max: Option<u64>,
	pub offset: Option<u64>,
	pub most_recent: bool,
	pub earliest: bool,
	/// Skip the count statement.
	pub without_total_results_count: bool,
}

impl DatumCriteria {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_object_kind(mut self, kind: ObjectDatumKind) -> Self {
		self.object_kind = Some(kind);
		self
	}

	pub fn with_object_id(self, id: i64) -> Self {
		self.with_object_ids(vec![id])
	}

	pub fn with_object_ids(mut self, ids: Vec<i64>) -> Self {
		self.object_ids = ids;
		self
	}

	/// Node ids, which also selects the node kind.
	pub fn with_node_ids(self, ids: Vec<i64>) -> Self {
		self.with_object_kind(ObjectDatumKind::Node).with_object_ids(ids)
	}

	/// Location ids, which also selects the location kind.
	pub fn with_location_ids(self, ids: Vec<i64>) -> Self {
		self.with_object_kind(ObjectDatumKind::Location).with_object_ids(ids)
	}

	pub fn with_stream_id(self, id: Uuid) -> Self {
		self.with_stream_ids(vec![id])
	}

	pub fn with_stream_ids(mut self, ids: Vec<Uuid>) -> Self {
		self.stream_ids = ids;
		self
	}

	pub fn with_source_id(self, id: impl Into<String>) -> Self {
		self.with_source_ids(vec![id.into()])
	}

	pub fn with_source_ids(mut self, ids: Vec<String>) -> Self {
		self.source_ids = ids;
		self
	}

	pub fn with_user_ids(mut self, ids: Vec<i64>) -> Self {
		self.user_ids = ids;
		self
	}

	pub fn with_token_ids(mut self, ids: Vec<String>) -> Self {
		self.token_ids = ids;
		self
	}

	pub fn with_start_date(mut self, date: DateTime<Utc>) -> Self {
		self.start_date = Some(date);
		self
	}

	pub fn with_end_date(mut self, date: DateTime<Utc>) -> Self {
		self.end_date = Some(date);
		self
	}

	pub fn with_local_start_date(mut self, date: NaiveDateTime) -> Self {
		self.local_start_date = Some(date);
		self
	}

	pub fn with_local_end_date(mut self, date: NaiveDateTime) -> Self {
		self.local_end_date = Some(date);
		self
	}

	pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
		self.aggregation = Some(aggregation);
		self
	}

	pub fn with_partial_aggregation(mut self, partial: Aggregation) -> Self {
		self.partial_aggregation = Some(partial);
		self
	}

	pub fn with_combining_type(mut self, combining: CombiningType) -> Self {
		self.combining_type = Some(combining);
		self
	}

	pub fn with_object_id_maps(mut self, maps: Vec<String>) -> Self {
		self.object_id_maps = maps;
		self
	}

	pub fn with_source_id_maps(mut self, maps: Vec<String>) -> Self {
		self.source_id_maps = maps;
		self
	}

	pub fn with_rollup_type(mut self, rollup: RollupType) -> Self {
		self.rollup_type = Some(rollup);
		self
	}

	pub fn with_sort(mut self, sort: SortDescriptor) -> Self {
		self.sorts.push(sort);
		self
	}

	pub fn with_max(mut self, max: u64) -> Self {
		self.max = Some(max);
		self
	}

	pub fn with_offset(mut self, offset: u64) -> Self {
		self.offset = Some(offset);
		self
	}

	pub fn with_most_recent(mut self, most_recent: bool) -> Self {
		self.most_recent = most_recent;
		self
	}

	pub fn with_earliest(mut self, earliest: bool) -> Self {
		self.earliest = earliest;
		self
	}

	pub fn with_without_total_results_count(mut self, skip: bool) -> Self {
		self.without_total_results_count = skip;
		self
	}

	pub fn object_kind(&self) -> ObjectDatumKind {
		self.object_kind.unwrap_or_default()
	}

	pub fn aggregation(&self) -> Aggregation {
		self.aggregation.unwrap_or_default()
	}

	pub fn rollup_type(&self) -> RollupType {
		self.rollup_type.unwrap_or_default()
	}

	pub fn has_date_range(&self) -> bool {
		self.start_date.is_some() || self.end_date.is_some()
	}

	pub fn has_local_date_range(&self) -> bool {
		self.local_start_date.is_some() || self.local_end_date.is_some()
	}

	pub fn has_id_maps(&self) -> bool {
		!self.object_id_maps.is_empty() || !self.source_id_maps.is_empty()
	}

	/// True for a most recent or earliest selection.
	pub fn selects_single_record(&self) -> bool {
		self.most_recent || self.earliest
	}

	pub fn date_range(&self) -> DateRange {
		if self.has_local_date_range() {
			DateRange::Local {
				start: self.local_start_date,
				end: self.local_end_date,
			}
		} else if self.has_date_range() {
			DateRange::Absolute {
				start: self.start_date,
				end: self.end_date,
			}
		} else {
			DateRange::Unbounded
		}
	}

	/// Rules every compiler applies before building any SQL.
	pub fn validate(&self) -> Result<()> {
		if self.has_date_range() && self.has_local_date_range() {
			return_error!(CompileError::ConflictingDateRange);
		}
		if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
			if start >= end {
				return_error!(CompileError::EmptyDateRange {
					start: start.to_rfc3339(),
					end: end.to_rfc3339(),
				});
			}
		}
		if let (Some(start), Some(end)) = (self.local_start_date, self.local_end_date) {
			if start >= end {
				return_error!(CompileError::EmptyDateRange {
					start: start.to_string(),
					end: end.to_string(),
				});
			}
		}

		let aggregation = self.aggregation();
		if let Some(partial) = self.partial_aggregation {
			if aggregation == Aggregation::None {
				return_error!(CompileError::PartialAggregationWithoutAggregation {
					partial
				});
			}
			if !partial.is_finer_than(&aggregation) {
				return_error!(CompileError::PartialAggregationNotFiner {
					aggregation,
					partial
				});
			}
		}

		if self.most_recent && self.earliest {
			return_error!(CompileError::ConflictingRecordSelection);
		}
		if self.selects_single_record()
			&& !matches!(
				aggregation,
				Aggregation::None | Aggregation::Hour | Aggregation::Day | Aggregation::Month
			) {
			return_error!(CompileError::MostRecentUnsupported {
				aggregation
			});
		}

		match (self.combining_type.is_some(), self.has_id_maps()) {
			(true, false) => return_error!(CompileError::CombiningWithoutMaps),
			(false, true) => return_error!(CompileError::MapsWithoutCombining),
			_ => {}
		}

		if self.object_kind() == ObjectDatumKind::Location {
			if !self.user_ids.is_empty() {
				return_error!(CompileError::InvalidArgument {
					field: "user_ids",
					message: "user ids only apply to node streams".to_string(),
				});
			}
			if !self.token_ids.is_empty() {
				return_error!(CompileError::InvalidArgument {
					field: "token_ids",
					message: "token ids only apply to node streams".to_string(),
				});
			}
		}

		Ok(())
	}
}
