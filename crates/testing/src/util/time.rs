// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Date shorthands for tests.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Midnight local time on the given date.
///
/// # Panics
/// Panics on an invalid date.
pub fn local(year: i32, month: u32, day: u32) -> NaiveDateTime {
	local_hour(year, month, day, 0)
}

pub fn local_hour(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
	NaiveDate::from_ymd_opt(year, month, day)
		.and_then(|date| date.and_hms_opt(hour, 0, 0))
		.unwrap_or_else(|| panic!("invalid local date {year}-{month}-{day} {hour}:00"))
}

/// Midnight UTC on the given date.
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
	utc_hour(year, month, day, 0)
}

pub fn utc_hour(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
	Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
		.single()
		.unwrap_or_else(|| panic!("invalid UTC date {year}-{month}-{day} {hour}:00"))
}
