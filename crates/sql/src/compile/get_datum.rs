// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{Aggregation, CompileError, DatumPK, ObjectDatumId, Result, StreamIdentity};
use tracing::{debug, instrument};

use super::{StatementCompiler, common::rejected};
use crate::{
	plan::{CompiledStatement, SqlPlan},
	table::DatumTable,
};

const NAME: &str = "GetDatum";

/// A single datum row by primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct GetDatum {
	id: DatumPK,
	aggregation: Aggregation,
}

impl GetDatum {
	pub fn new(id: DatumPK, aggregation: Aggregation) -> Self {
		Self {
			id,
			aggregation,
		}
	}

	/// `None` when the object/source pair has no stream.
	pub fn resolve(id: &ObjectDatumId, aggregation: Aggregation, identity: &dyn StreamIdentity) -> Option<Self> {
		id.resolve(identity).map(|pk| Self::new(pk, aggregation))
	}

	pub fn id(&self) -> &DatumPK {
		&self.id
	}

	fn table(&self) -> Result<DatumTable> {
		DatumTable::for_aggregation(self.aggregation).ok_or_else(|| {
			CompileError::UnsupportedAggregation {
				compiler: NAME,
				aggregation: self.aggregation,
			}
			.into()
		})
	}
}

impl StatementCompiler for GetDatum {
	#[instrument(name = "sql::get_datum::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		let table = self.table().map_err(|err| rejected(NAME, err))?;
		let stmt = SqlPlan::text(format!(
			"SELECT {}\nFROM {} datum\nWHERE datum.stream_id = ",
			table.columns(),
			table.name()
		))
		.bind(self.id.stream_id)
		.sql(format!("\nAND datum.{} = ", table.ts_column()))
		.bind(self.id.timestamp)
		.render();
		debug!(table = table.name(), "compiled get datum");
		Ok(stmt)
	}
}
