// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Aggregation levels.
//!
//! Each level has an approximate duration in seconds and a short external
//! key. Durations above one day are fixed approximations (week = 7 days,
//! month = 28 days, year = 365 days) so generated SQL and any duration math
//! done by callers agree exactly.

use std::{
	cmp::Ordering,
	collections::HashMap,
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Result, error::CompileError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Aggregation {
	#[default]
	None,
	Minute,
	FiveMinute,
	TenMinute,
	FifteenMinute,
	ThirtyMinute,
	Hour,
	HourOfDay,
	SeasonalHourOfDay,
	Day,
	DayOfWeek,
	SeasonalDayOfWeek,
	Week,
	WeekOfYear,
	Month,
	Year,
	RunningTotal,
}

static KEYS: Lazy<HashMap<&'static str, Aggregation>> =
	Lazy::new(|| Aggregation::ALL.iter().map(|agg| (agg.key(), *agg)).collect());

static NAMES: Lazy<HashMap<String, Aggregation>> =
	Lazy::new(|| Aggregation::ALL.iter().map(|agg| (agg.name().to_ascii_lowercase(), *agg)).collect());

impl Aggregation {
	pub const ALL: [Aggregation; 17] = [
		Aggregation::None,
		Aggregation::Minute,
		Aggregation::FiveMinute,
		Aggregation::TenMinute,
		Aggregation::FifteenMinute,
		Aggregation::ThirtyMinute,
		Aggregation::Hour,
		Aggregation::HourOfDay,
		Aggregation::SeasonalHourOfDay,
		Aggregation::Day,
		Aggregation::DayOfWeek,
		Aggregation::SeasonalDayOfWeek,
		Aggregation::Week,
		Aggregation::WeekOfYear,
		Aggregation::Month,
		Aggregation::Year,
		Aggregation::RunningTotal,
	];

	pub const fn seconds(&self) -> i64 {
		match self {
			Aggregation::None => 0,
			Aggregation::Minute => 60,
			Aggregation::FiveMinute => 300,
			Aggregation::TenMinute => 600,
			Aggregation::FifteenMinute => 900,
			Aggregation::ThirtyMinute => 1_800,
			Aggregation::Hour | Aggregation::HourOfDay | Aggregation::SeasonalHourOfDay => 3_600,
			Aggregation::Day | Aggregation::DayOfWeek | Aggregation::SeasonalDayOfWeek => 86_400,
			Aggregation::Week | Aggregation::WeekOfYear => 604_800,
			Aggregation::Month => 2_419_200,
			Aggregation::Year => 31_536_000,
			Aggregation::RunningTotal => i64::MAX,
		}
	}

	pub const fn key(&self) -> &'static str {
		match self {
			Aggregation::None => "0",
			Aggregation::Minute => "m",
			Aggregation::FiveMinute => "5m",
			Aggregation::TenMinute => "10m",
			Aggregation::FifteenMinute => "15m",
			Aggregation::ThirtyMinute => "30m",
			Aggregation::Hour => "h",
			Aggregation::HourOfDay => "hd",
			Aggregation::SeasonalHourOfDay => "shd",
			Aggregation::Day => "d",
			Aggregation::DayOfWeek => "wd",
			Aggregation::SeasonalDayOfWeek => "swd",
			Aggregation::Week => "w",
			Aggregation::WeekOfYear => "wy",
			Aggregation::Month => "M",
			Aggregation::Year => "y",
			Aggregation::RunningTotal => "rt",
		}
	}

	pub const fn name(&self) -> &'static str {
		match self {
			Aggregation::None => "None",
			Aggregation::Minute => "Minute",
			Aggregation::FiveMinute => "FiveMinute",
			Aggregation::TenMinute => "TenMinute",
			Aggregation::FifteenMinute => "FifteenMinute",
			Aggregation::ThirtyMinute => "ThirtyMinute",
			Aggregation::Hour => "Hour",
			Aggregation::HourOfDay => "HourOfDay",
			Aggregation::SeasonalHourOfDay => "SeasonalHourOfDay",
			Aggregation::Day => "Day",
			Aggregation::DayOfWeek => "DayOfWeek",
			Aggregation::SeasonalDayOfWeek => "SeasonalDayOfWeek",
			Aggregation::Week => "Week",
			Aggregation::WeekOfYear => "WeekOfYear",
			Aggregation::Month => "Month",
			Aggregation::Year => "Year",
			Aggregation::RunningTotal => "RunningTotal",
		}
	}

	/// Looks up a level by key, then by name.
	///
	/// Empty input is `None`. Keys are matched exactly since `m` and `M`
	/// are different levels; names are matched ignoring case.
	pub fn for_key(key: &str) -> Result<Aggregation> {
		let key = key.trim();
		if key.is_empty() {
			return Ok(Aggregation::None);
		}
		if let Some(agg) = KEYS.get(key) {
			return Ok(*agg);
		}
		if let Some(agg) = NAMES.get(&key.to_ascii_lowercase()) {
			return Ok(*agg);
		}
		Err(CompileError::UnknownAggregation {
			key: key.to_string(),
		}
		.into())
	}

	pub fn for_key_opt(key: Option<&str>) -> Result<Aggregation> {
		match key {
			Some(key) => Self::for_key(key),
			None => Ok(Aggregation::None),
		}
	}

	/// Three-way comparison by duration only.
	pub fn compare_level(&self, other: &Aggregation) -> Ordering {
		self.seconds().cmp(&other.seconds())
	}

	pub fn is_finer_than(&self, other: &Aggregation) -> bool {
		self.compare_level(other) == Ordering::Less
	}

	pub const fn is_minute_level(&self) -> bool {
		matches!(
			self,
			Aggregation::Minute
				| Aggregation::FiveMinute
				| Aggregation::TenMinute
				| Aggregation::FifteenMinute
				| Aggregation::ThirtyMinute
		)
	}

	/// Levels that group by a calendar field rather than a time bucket.
	pub const fn is_calendar_slice(&self) -> bool {
		matches!(
			self,
			Aggregation::HourOfDay
				| Aggregation::SeasonalHourOfDay
				| Aggregation::DayOfWeek
				| Aggregation::SeasonalDayOfWeek
				| Aggregation::WeekOfYear
		)
	}

	fn ordinal(&self) -> usize {
		Self::ALL.iter().position(|agg| agg == self).unwrap_or(0)
	}
}

impl PartialOrd for Aggregation {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Aggregation {
	fn cmp(&self, other: &Self) -> Ordering {
		self.compare_level(other).then_with(|| self.ordinal().cmp(&other.ordinal()))
	}
}

impl Display for Aggregation {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

impl FromStr for Aggregation {
	type Err = crate::Error;

	fn from_str(s: &str) -> Result<Self> {
		Aggregation::for_key(s)
	}
}

impl Serialize for Aggregation {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(self.key())
	}
}

impl<'de> Deserialize<'de> for Aggregation {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let key = String::deserialize(deserializer)?;
		Aggregation::for_key(&key).map_err(|err| serde::de::Error::custom(err.message.clone()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_key_round_trip() {
		for agg in Aggregation::ALL {
			assert_eq!(Aggregation::for_key(agg.key()).unwrap(), agg);
			assert_eq!(Aggregation::for_key(agg.name()).unwrap(), agg);
		}
	}

	#[test]
	fn test_keys_are_unique() {
		assert_eq!(KEYS.len(), Aggregation::ALL.len());
	}

	#[test]
	fn test_empty_key_is_none() {
		assert_eq!(Aggregation::for_key("").unwrap(), Aggregation::None);
		assert_eq!(Aggregation::for_key("  ").unwrap(), Aggregation::None);
		assert_eq!(Aggregation::for_key_opt(None).unwrap(), Aggregation::None);
	}

	#[test]
	fn test_minute_and_month_keys_differ() {
		assert_eq!(Aggregation::for_key("m").unwrap(), Aggregation::Minute);
		assert_eq!(Aggregation::for_key("M").unwrap(), Aggregation::Month);
	}

	#[test]
	fn test_name_lookup_ignores_case() {
		assert_eq!(Aggregation::for_key("fiveminute").unwrap(), Aggregation::FiveMinute);
		assert_eq!(Aggregation::for_key("RUNNINGTOTAL").unwrap(), Aggregation::RunningTotal);
	}

	#[test]
	fn test_unknown_key() {
		let err = Aggregation::for_key("fortnight").unwrap_err();
		assert_eq!(err.code(), "AGG_001");
	}

	#[test]
	fn test_fixed_durations() {
		assert_eq!(Aggregation::Week.seconds(), 604_800);
		assert_eq!(Aggregation::Month.seconds(), 2_419_200);
		assert_eq!(Aggregation::Year.seconds(), 31_536_000);
	}

	#[test]
	fn test_compare_level() {
		assert_eq!(Aggregation::Hour.compare_level(&Aggregation::Day), Ordering::Less);
		assert_eq!(Aggregation::Year.compare_level(&Aggregation::Month), Ordering::Greater);
		assert_eq!(Aggregation::Hour.compare_level(&Aggregation::HourOfDay), Ordering::Equal);
		assert!(Aggregation::Day.is_finer_than(&Aggregation::Month));
		assert!(!Aggregation::Day.is_finer_than(&Aggregation::DayOfWeek));
	}

	#[test]
	fn test_running_total_sorts_last() {
		let mut all = Aggregation::ALL.to_vec();
		all.reverse();
		all.sort();
		assert_eq!(all.first(), Some(&Aggregation::None));
		assert_eq!(all.last(), Some(&Aggregation::RunningTotal));
	}

	#[test]
	fn test_serde_uses_key() {
		let json = serde_json::to_string(&Aggregation::Month).unwrap();
		assert_eq!(json, "\"M\"");
		let agg: Aggregation = serde_json::from_str("\"Hour\"").unwrap();
		assert_eq!(agg, Aggregation::Hour);
	}
}
