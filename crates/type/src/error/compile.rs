// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::{Diagnostic, IntoDiagnostic};
use crate::aggregation::Aggregation;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
	#[error("unknown aggregation '{key}'")]
	UnknownAggregation {
		key: String,
	},

	#[error("{compiler} does not support aggregation {aggregation:?}")]
	UnsupportedAggregation {
		compiler: &'static str,
		aggregation: Aggregation,
	},

	#[error("partial aggregation {partial:?} is not finer than aggregation {aggregation:?}")]
	PartialAggregationNotFiner {
		aggregation: Aggregation,
		partial: Aggregation,
	},

	#[error("partial aggregation {partial:?} requires an aggregation")]
	PartialAggregationWithoutAggregation {
		partial: Aggregation,
	},

	#[error("{compiler} does not support partial aggregation {partial:?}")]
	UnsupportedPartialAggregation {
		compiler: &'static str,
		partial: Aggregation,
	},

	#[error("most recent selection is not supported for aggregation {aggregation:?}")]
	MostRecentUnsupported {
		aggregation: Aggregation,
	},

	#[error("absolute and local date ranges cannot be combined")]
	ConflictingDateRange,

	#[error("{compiler} requires {expected}")]
	MissingDateRange {
		compiler: &'static str,
		expected: &'static str,
	},

	#[error("date range start {start} is not before end {end}")]
	EmptyDateRange {
		start: String,
		end: String,
	},

	#[error("most recent and earliest selections cannot be combined")]
	ConflictingRecordSelection,

	#[error("invalid {field}: {message}")]
	InvalidArgument {
		field: &'static str,
		message: String,
	},

	#[error("requested page size {max} exceeds the limit of {limit}")]
	PageSizeExceeded {
		max: u64,
		limit: u64,
	},

	#[error("malformed virtual id map '{entry}': {reason}")]
	MalformedVirtualIdMap {
		entry: String,
		reason: String,
	},

	#[error("combining type requires an object or source id map")]
	CombiningWithoutMaps,

	#[error("virtual id maps require a combining type")]
	MapsWithoutCombining,

	#[error("unknown object kind '{key}'")]
	UnknownObjectKind {
		key: String,
	},

	#[error("unknown combining type '{key}'")]
	UnknownCombiningType {
		key: String,
	},

	#[error("invalid compiler configuration: {message}")]
	InvalidConfig {
		message: String,
	},
}

impl IntoDiagnostic for CompileError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			CompileError::UnknownAggregation {
				..
			} => Diagnostic {
				code: "AGG_001".to_string(),
				message,
				field: Some("aggregation".to_string()),
				label: Some("no aggregation level has this key or name".to_string()),
				help: Some("use a level key such as 'h', 'd', 'M' or a level name such as 'Hour'".to_string()),
				notes: vec!["keys are case sensitive: 'm' is Minute, 'M' is Month".to_string()],
			},

			CompileError::UnsupportedAggregation {
				compiler,
				aggregation,
			} => Diagnostic {
				code: "AGG_002".to_string(),
				message,
				field: Some("aggregation".to_string()),
				label: Some(format!("{} cannot read aggregation {:?}", compiler, aggregation)),
				help: Some("choose an aggregation level supported by this statement".to_string()),
				notes: if aggregation.is_minute_level() {
					vec!["sub-hour levels are finer than the finest aggregate table".to_string()]
				} else {
					vec![]
				},
			},

			CompileError::PartialAggregationNotFiner {
				..
			} => Diagnostic {
				code: "AGG_003".to_string(),
				message,
				field: Some("partial_aggregation".to_string()),
				label: Some("partial aggregation must be strictly finer".to_string()),
				help: Some("pair levels like Year/Month, Month/Day or Day/Hour".to_string()),
				notes: vec![],
			},

			CompileError::PartialAggregationWithoutAggregation {
				..
			} => Diagnostic {
				code: "AGG_004".to_string(),
				message,
				field: Some("partial_aggregation".to_string()),
				label: None,
				help: Some("set an aggregation coarser than the partial aggregation".to_string()),
				notes: vec![],
			},

			CompileError::UnsupportedPartialAggregation {
				..
			} => Diagnostic {
				code: "AGG_005".to_string(),
				message,
				field: Some("partial_aggregation".to_string()),
				label: None,
				help: Some("partial aggregation must be one of Hour, Day or Month".to_string()),
				notes: vec![],
			},

			CompileError::MostRecentUnsupported {
				..
			} => Diagnostic {
				code: "FILTER_001".to_string(),
				message,
				field: Some("most_recent".to_string()),
				label: None,
				help: Some("most recent selection requires aggregation None, Hour, Day or Month".to_string()),
				notes: vec![],
			},

			CompileError::ConflictingDateRange => Diagnostic {
				code: "FILTER_002".to_string(),
				message,
				field: Some("start_date".to_string()),
				label: None,
				help: Some("use either start/end dates or local start/end dates".to_string()),
				notes: vec![],
			},

			CompileError::MissingDateRange {
				..
			} => Diagnostic {
				code: "FILTER_003".to_string(),
				message,
				field: Some("start_date".to_string()),
				label: None,
				help: None,
				notes: vec![],
			},

			CompileError::EmptyDateRange {
				..
			} => Diagnostic {
				code: "FILTER_004".to_string(),
				message,
				field: Some("end_date".to_string()),
				label: Some("date ranges are half-open: [start, end)".to_string()),
				help: Some("use an end date after the start date".to_string()),
				notes: vec![],
			},

			CompileError::ConflictingRecordSelection => Diagnostic {
				code: "FILTER_005".to_string(),
				message,
				field: Some("most_recent".to_string()),
				label: None,
				help: None,
				notes: vec![],
			},

			CompileError::InvalidArgument {
				field,
				..
			} => Diagnostic {
				code: "FILTER_006".to_string(),
				message,
				field: Some(field.to_string()),
				label: None,
				help: None,
				notes: vec![],
			},

			CompileError::PageSizeExceeded {
				limit,
				..
			} => Diagnostic {
				code: "FILTER_007".to_string(),
				message,
				field: Some("max".to_string()),
				label: None,
				help: Some(format!("request at most {} results per page", limit)),
				notes: vec![],
			},

			CompileError::MalformedVirtualIdMap {
				..
			} => Diagnostic {
				code: "VIRTUAL_001".to_string(),
				message,
				field: Some("object_id_maps".to_string()),
				label: None,
				help: Some("map entries look like '<virtual id>:<id>,<id>,...'".to_string()),
				notes: vec!["for example '100:1,2,3' combines ids 1, 2 and 3 as id 100".to_string()],
			},

			CompileError::CombiningWithoutMaps => Diagnostic {
				code: "VIRTUAL_002".to_string(),
				message,
				field: Some("combining_type".to_string()),
				label: None,
				help: Some("provide object_id_maps or source_id_maps".to_string()),
				notes: vec![],
			},

			CompileError::MapsWithoutCombining => Diagnostic {
				code: "VIRTUAL_003".to_string(),
				message,
				field: Some("combining_type".to_string()),
				label: None,
				help: Some("set a combining type such as Sum".to_string()),
				notes: vec![],
			},

			CompileError::UnknownObjectKind {
				..
			} => Diagnostic {
				code: "KIND_001".to_string(),
				message,
				field: Some("object_kind".to_string()),
				label: None,
				help: Some("use 'n' for node or 'l' for location".to_string()),
				notes: vec![],
			},

			CompileError::UnknownCombiningType {
				..
			} => Diagnostic {
				code: "KIND_002".to_string(),
				message,
				field: Some("combining_type".to_string()),
				label: None,
				help: Some("use 'sum'".to_string()),
				notes: vec![],
			},

			CompileError::InvalidConfig {
				..
			} => Diagnostic {
				code: "CONFIG_001".to_string(),
				message,
				field: None,
				label: None,
				help: None,
				notes: vec![],
			},
		}
	}
}
