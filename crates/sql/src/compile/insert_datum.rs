// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use datumql_type::{
	BindValue, CompileError, ObjectDatumKind, Result, SqlType,
	datum::{DatumEntity, GeneralDatum},
	return_error,
};
use tracing::{debug, instrument};

use super::{StatementCompiler, common::rejected};
use crate::{
	plan::{CompiledStatement, SqlPlan},
	table::DatumTable,
};

fn numeric_array(values: &[BigDecimal]) -> BindValue {
	if values.is_empty() {
		BindValue::Null(SqlType::Numeric)
	} else {
		BindValue::NumericArray(values.to_vec())
	}
}

fn text_array(values: &[String]) -> BindValue {
	if values.is_empty() {
		BindValue::Null(SqlType::Text)
	} else {
		BindValue::TextArray(values.to_vec())
	}
}

/// Upserts a raw datum row for a known stream.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertDatum {
	datum: DatumEntity,
}

impl InsertDatum {
	pub fn new(datum: DatumEntity) -> Self {
		Self {
			datum,
		}
	}
}

impl StatementCompiler for InsertDatum {
	#[instrument(name = "sql::insert_datum::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		let datum = &self.datum;
		let props = &datum.properties;
		let stmt = SqlPlan::text(format!(
			"INSERT INTO {} (stream_id, ts, received, data_i, data_a, data_s, data_t)\nVALUES (",
			DatumTable::Raw.name()
		))
		.bind(datum.stream_id)
		.sql(", ")
		.bind(datum.timestamp)
		.sql(", ")
		.bind(datum.received)
		.sql(", ")
		.bind(numeric_array(&props.instantaneous))
		.sql(", ")
		.bind(numeric_array(&props.accumulating))
		.sql(", ")
		.bind(text_array(&props.status))
		.sql(", ")
		.bind(text_array(&props.tags))
		.sql(
			")\nON CONFLICT (stream_id, ts) DO UPDATE\n\
			 SET received = EXCLUDED.received, data_i = EXCLUDED.data_i, data_a = EXCLUDED.data_a, \
			 data_s = EXCLUDED.data_s, data_t = EXCLUDED.data_t",
		)
		.render();
		debug!(stream_id = %datum.stream_id, "compiled insert datum");
		Ok(stmt)
	}
}

/// Stores a datum by object and source, creating its stream as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDatum {
	datum: GeneralDatum,
	received: DateTime<Utc>,
}

impl StoreDatum {
	const NAME: &'static str = "StoreDatum";

	pub fn new(datum: GeneralDatum, received: DateTime<Utc>) -> Self {
		Self {
			datum,
			received,
		}
	}

	fn validate(&self) -> Result<String> {
		if self.datum.source_id.trim().is_empty() {
			return_error!(CompileError::InvalidArgument {
				field: "source_id",
				message: "a datum needs a source id".to_string(),
			});
		}
		if self.datum.samples.is_empty() {
			return_error!(CompileError::InvalidArgument {
				field: "samples",
				message: "a datum needs at least one sample".to_string(),
			});
		}
		serde_json::to_string(&self.datum.samples).map_err(|err| {
			CompileError::InvalidArgument {
				field: "samples",
				message: err.to_string(),
			}
			.into()
		})
	}
}

impl StatementCompiler for StoreDatum {
	#[instrument(name = "sql::store_datum::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		let json = self.validate().map_err(|err| rejected(Self::NAME, err))?;
		let function = match self.datum.kind {
			ObjectDatumKind::Node => "solardatm.store_datum",
			ObjectDatumKind::Location => "solardatm.store_loc_datum",
		};
		let stmt = SqlPlan::text(format!("SELECT {function}("))
			.bind(self.datum.created)
			.sql(", ")
			.bind(self.datum.object_id)
			.sql(", ")
			.bind(self.datum.source_id.clone())
			.sql(", ")
			.bind(self.received)
			.sql(", ")
			.bind(BindValue::Json(json))
			.sql(")")
			.render();
		debug!(function, "compiled store datum");
		Ok(stmt)
	}
}
