// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Partial-aggregation range splitting.
//!
//! A local range that does not line up with aggregation boundaries is split
//! into a leading window, a main window of whole aggregation buckets and a
//! trailing window. The leading and trailing windows are read at the finer
//! partial level.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use datumql_type::{Aggregation, CompileError, Result, return_error};

const COMPILER: &str = "SelectDatumPartialAggregate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
	Leading,
	Main,
	Trailing,
}

/// A half-open local range read at one aggregation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialWindow {
	pub kind: WindowKind,
	pub start: NaiveDateTime,
	pub end: NaiveDateTime,
	pub aggregation: Aggregation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRangeSplit {
	pub leading: Option<PartialWindow>,
	pub main: Option<PartialWindow>,
	pub trailing: Option<PartialWindow>,
}

impl PartialRangeSplit {
	/// Windows in time order: leading, main, trailing.
	pub fn windows(&self) -> impl Iterator<Item = &PartialWindow> {
		self.leading.iter().chain(self.main.iter()).chain(self.trailing.iter())
	}

	pub fn len(&self) -> usize {
		self.windows().count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

pub fn check_levels(aggregation: Aggregation, partial: Aggregation) -> Result<()> {
	if !matches!(aggregation, Aggregation::Day | Aggregation::Week | Aggregation::Month | Aggregation::Year) {
		return_error!(CompileError::UnsupportedAggregation {
			compiler: COMPILER,
			aggregation
		});
	}
	if !matches!(partial, Aggregation::Hour | Aggregation::Day | Aggregation::Month) {
		return_error!(CompileError::UnsupportedPartialAggregation {
			compiler: COMPILER,
			partial
		});
	}
	if !partial.is_finer_than(&aggregation) {
		return_error!(CompileError::PartialAggregationNotFiner {
			aggregation,
			partial
		});
	}
	Ok(())
}

pub fn split(
	start: NaiveDateTime,
	end: NaiveDateTime,
	aggregation: Aggregation,
	partial: Aggregation,
) -> Result<PartialRangeSplit> {
	check_levels(aggregation, partial)?;
	if start >= end {
		return Ok(PartialRangeSplit::default());
	}

	let main_start = ceil(aggregation, start)?;
	let main_end = floor(aggregation, end)?;

	let window = |kind, start: NaiveDateTime, end: NaiveDateTime, aggregation| {
		(start < end).then_some(PartialWindow {
			kind,
			start,
			end,
			aggregation,
		})
	};

	if main_start > main_end {
		// the whole range sits inside one bucket
		return Ok(PartialRangeSplit {
			leading: window(WindowKind::Leading, start, end, partial),
			main: None,
			trailing: None,
		});
	}

	Ok(PartialRangeSplit {
		leading: window(WindowKind::Leading, start, main_start, partial),
		main: window(WindowKind::Main, main_start, main_end, aggregation),
		trailing: window(WindowKind::Trailing, main_end, end, partial),
	})
}

fn out_of_range(date: NaiveDateTime) -> datumql_type::Error {
	CompileError::InvalidArgument {
		field: "local_end_date",
		message: format!("{date} is outside the supported calendar"),
	}
	.into()
}

fn first_of_month(date: NaiveDate, month: u32) -> Option<NaiveDateTime> {
	NaiveDate::from_ymd_opt(date.year(), month, 1).map(|d| d.and_time(NaiveTime::MIN))
}

/// Start of the bucket containing `date`.
pub fn floor(aggregation: Aggregation, date: NaiveDateTime) -> Result<NaiveDateTime> {
	let day = date.date();
	let floored = match aggregation {
		Aggregation::Hour => day.and_hms_opt(date.hour(), 0, 0),
		Aggregation::Day => Some(day.and_time(NaiveTime::MIN)),
		Aggregation::Week => day
			.checked_sub_signed(Duration::days(i64::from(day.weekday().num_days_from_monday())))
			.map(|monday| monday.and_time(NaiveTime::MIN)),
		Aggregation::Month => first_of_month(day, day.month()),
		Aggregation::Year => first_of_month(day, 1),
		_ => Some(date),
	};
	floored.ok_or_else(|| out_of_range(date))
}

/// Start of the bucket after the one starting at `boundary`.
fn next(aggregation: Aggregation, boundary: NaiveDateTime) -> Option<NaiveDateTime> {
	match aggregation {
		Aggregation::Hour => boundary.checked_add_signed(Duration::hours(1)),
		Aggregation::Day => boundary.checked_add_signed(Duration::days(1)),
		Aggregation::Week => boundary.checked_add_signed(Duration::days(7)),
		Aggregation::Month => boundary.checked_add_months(Months::new(1)),
		Aggregation::Year => boundary.checked_add_months(Months::new(12)),
		_ => Some(boundary),
	}
}

/// `date` when it is a bucket start, otherwise the next bucket start.
pub fn ceil(aggregation: Aggregation, date: NaiveDateTime) -> Result<NaiveDateTime> {
	let floored = floor(aggregation, date)?;
	if floored == date {
		return Ok(date);
	}
	next(aggregation, floored).ok_or_else(|| out_of_range(date))
}
