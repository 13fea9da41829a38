// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

/// SQL types values are bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
	Bigint,
	Text,
	Uuid,
	Numeric,
	/// Timestamp without time zone, used for local dates.
	Timestamp,
	TimestampTz,
	Jsonb,
	Boolean,
}

impl SqlType {
	pub const fn name(&self) -> &'static str {
		match self {
			SqlType::Bigint => "bigint",
			SqlType::Text => "text",
			SqlType::Uuid => "uuid",
			SqlType::Numeric => "NUMERIC",
			SqlType::Timestamp => "timestamp",
			SqlType::TimestampTz => "timestamptz",
			SqlType::Jsonb => "jsonb",
			SqlType::Boolean => "boolean",
		}
	}
}

impl Display for SqlType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A value bound to one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
	Null(SqlType),
	Int8(i64),
	Text(String),
	Uuid(Uuid),
	Timestamp(DateTime<Utc>),
	LocalTimestamp(NaiveDateTime),
	Json(String),
	Boolean(bool),
	Int8Array(Vec<i64>),
	TextArray(Vec<String>),
	UuidArray(Vec<Uuid>),
	NumericArray(Vec<BigDecimal>),
}

impl BindValue {
	pub fn sql_type(&self) -> SqlType {
		match self {
			BindValue::Null(ty) => *ty,
			BindValue::Int8(_) | BindValue::Int8Array(_) => SqlType::Bigint,
			BindValue::Text(_) | BindValue::TextArray(_) => SqlType::Text,
			BindValue::Uuid(_) | BindValue::UuidArray(_) => SqlType::Uuid,
			BindValue::Timestamp(_) => SqlType::TimestampTz,
			BindValue::LocalTimestamp(_) => SqlType::Timestamp,
			BindValue::Json(_) => SqlType::Jsonb,
			BindValue::Boolean(_) => SqlType::Boolean,
			BindValue::NumericArray(_) => SqlType::Numeric,
		}
	}

	/// Element type for array values, which must be created as native
	/// database arrays before binding.
	pub fn array_element_type(&self) -> Option<SqlType> {
		match self {
			BindValue::Int8Array(_)
			| BindValue::TextArray(_)
			| BindValue::UuidArray(_)
			| BindValue::NumericArray(_) => Some(self.sql_type()),
			_ => None,
		}
	}

	pub fn is_array(&self) -> bool {
		self.array_element_type().is_some()
	}

	pub fn array_len(&self) -> Option<usize> {
		match self {
			BindValue::Int8Array(v) => Some(v.len()),
			BindValue::TextArray(v) => Some(v.len()),
			BindValue::UuidArray(v) => Some(v.len()),
			BindValue::NumericArray(v) => Some(v.len()),
			_ => None,
		}
	}
}

pub trait IntoBindValue {
	fn into_bind_value(self) -> BindValue;
}

impl IntoBindValue for BindValue {
	fn into_bind_value(self) -> BindValue {
		self
	}
}

impl IntoBindValue for i64 {
	fn into_bind_value(self) -> BindValue {
		BindValue::Int8(self)
	}
}

impl IntoBindValue for u64 {
	fn into_bind_value(self) -> BindValue {
		BindValue::Int8(i64::try_from(self).unwrap_or(i64::MAX))
	}
}

impl IntoBindValue for bool {
	fn into_bind_value(self) -> BindValue {
		BindValue::Boolean(self)
	}
}

impl IntoBindValue for &str {
	fn into_bind_value(self) -> BindValue {
		BindValue::Text(self.to_string())
	}
}

impl IntoBindValue for String {
	fn into_bind_value(self) -> BindValue {
		BindValue::Text(self)
	}
}

impl IntoBindValue for Uuid {
	fn into_bind_value(self) -> BindValue {
		BindValue::Uuid(self)
	}
}

impl IntoBindValue for DateTime<Utc> {
	fn into_bind_value(self) -> BindValue {
		BindValue::Timestamp(self)
	}
}

impl IntoBindValue for NaiveDateTime {
	fn into_bind_value(self) -> BindValue {
		BindValue::LocalTimestamp(self)
	}
}

impl IntoBindValue for Vec<i64> {
	fn into_bind_value(self) -> BindValue {
		BindValue::Int8Array(self)
	}
}

impl IntoBindValue for Vec<String> {
	fn into_bind_value(self) -> BindValue {
		BindValue::TextArray(self)
	}
}

impl IntoBindValue for Vec<Uuid> {
	fn into_bind_value(self) -> BindValue {
		BindValue::UuidArray(self)
	}
}

impl IntoBindValue for Vec<BigDecimal> {
	fn into_bind_value(self) -> BindValue {
		BindValue::NumericArray(self)
	}
}
