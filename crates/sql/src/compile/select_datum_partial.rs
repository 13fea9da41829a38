// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{CompileError, Result, return_error};
use tracing::{debug, instrument};

use super::{
	StatementCompiler,
	body::DatumBody,
	common::{check_paging, rejected},
	statement::DatumStatement,
};
use crate::{
	config::CompilerConfig,
	filter::{DateRange, DatumCriteria, RollupType},
	partial::{self, PartialRangeSplit, WindowKind},
	plan::{CompiledStatement, SqlPlan},
	table::DatumTable,
	virtual_id::VirtualStreamPlan,
};

const NAME: &str = "SelectDatumPartialAggregate";

/// Aggregate rows over a local range that need not align with the
/// aggregation, with the unaligned ends read at a finer level.
#[derive(Debug, Clone)]
pub struct SelectDatumPartialAggregate {
	filter: DatumCriteria,
	config: CompilerConfig,
}

struct Validated<'a> {
	filter: &'a DatumCriteria,
	config: &'a CompilerConfig,
	split: PartialRangeSplit,
	main: Option<DatumBody>,
	virtual_plan: Option<VirtualStreamPlan>,
}

impl Validated<'_> {
	fn body(&self) -> SqlPlan {
		let bodies = self.split.windows().filter_map(|window| {
			let range = DateRange::Local {
				start: Some(window.start),
				end: Some(window.end),
			};
			match window.kind {
				WindowKind::Main => self.main.map(|body| body.render(&range)),
				WindowKind::Leading | WindowKind::Trailing => DatumTable::for_aggregation(window.aggregation)
					.map(|table| {
						DatumBody::Window {
							table,
							start: window.start,
						}
						.render(&range)
					}),
			}
		});
		SqlPlan::join(bodies, "\nUNION ALL\n")
	}

	fn statement(&self) -> DatumStatement<'_> {
		DatumStatement {
			filter: self.filter,
			config: self.config,
			virtual_plan: self.virtual_plan.as_ref(),
			body: self.body(),
			rollup: false,
		}
	}
}

impl SelectDatumPartialAggregate {
	pub fn new(filter: DatumCriteria) -> Self {
		Self::with_config(filter, CompilerConfig::default())
	}

	pub fn with_config(filter: DatumCriteria, config: CompilerConfig) -> Self {
		Self {
			filter,
			config,
		}
	}

	/// The windows the filter's range is split into.
	pub fn split(&self) -> Result<PartialRangeSplit> {
		self.validate().map(|validated| validated.split)
	}

	fn validate(&self) -> Result<Validated<'_>> {
		let filter = &self.filter;
		self.config.validate()?;
		filter.validate()?;
		check_paging(filter, &self.config)?;

		let aggregation = filter.aggregation();
		let Some(partial) = filter.partial_aggregation else {
			return_error!(CompileError::InvalidArgument {
				field: "partial_aggregation",
				message: format!("{NAME} requires a partial aggregation"),
			});
		};
		partial::check_levels(aggregation, partial)?;

		if filter.selects_single_record() {
			return_error!(CompileError::InvalidArgument {
				field: "most_recent",
				message: format!("{NAME} does not support most recent or earliest selections"),
			});
		}
		if filter.rollup_type() == RollupType::All {
			return_error!(CompileError::InvalidArgument {
				field: "rollup_type",
				message: format!("{NAME} does not support rollups"),
			});
		}

		let (Some(start), Some(end)) = (filter.local_start_date, filter.local_end_date) else {
			return_error!(CompileError::MissingDateRange {
				compiler: NAME,
				expected: "a local start and end date",
			});
		};

		let split = partial::split(start, end, aggregation, partial)?;
		let main = match split.main {
			Some(_) => Some(DatumBody::for_aggregation(filter, aggregation, NAME)?),
			None => None,
		};

		Ok(Validated {
			filter,
			config: &self.config,
			split,
			main,
			virtual_plan: VirtualStreamPlan::from_filter(filter)?,
		})
	}
}

impl StatementCompiler for SelectDatumPartialAggregate {
	#[instrument(name = "sql::select_datum_partial::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		let validated = self.validate().map_err(|err| rejected(NAME, err))?;
		let stmt = validated.statement().select().render();
		debug!(windows = validated.split.len(), params = stmt.params.len(), "compiled partial aggregate");
		Ok(stmt)
	}

	#[instrument(name = "sql::select_datum_partial::compile_count", level = "trace", skip(self))]
	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		let validated = self.validate().map_err(|err| rejected(NAME, err))?;
		if self.filter.without_total_results_count {
			return Ok(None);
		}
		Ok(Some(validated.statement().count().render()))
	}
}
