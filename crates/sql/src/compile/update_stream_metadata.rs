// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Updates to a stream's metadata row.

use datumql_type::{BindValue, CompileError, ObjectDatumKind, Result, return_error};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{StatementCompiler, common::rejected};
use crate::{
	plan::{CompiledStatement, SqlPlan},
	table::{meta_table, object_column},
};

/// Replaces the JSON metadata of the stream for an object and source.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateObjectStreamMetadataJson {
	pub kind: ObjectDatumKind,
	pub object_id: i64,
	pub source_id: String,
	pub json: String,
}

impl UpdateObjectStreamMetadataJson {
	const NAME: &'static str = "UpdateObjectStreamMetadataJson";

	pub fn new(kind: ObjectDatumKind, object_id: i64, source_id: impl Into<String>, json: impl Into<String>) -> Self {
		Self {
			kind,
			object_id,
			source_id: source_id.into(),
			json: json.into(),
		}
	}

	fn validate(&self) -> Result<()> {
		if let Err(err) = serde_json::from_str::<serde_json::Value>(&self.json) {
			return_error!(CompileError::InvalidArgument {
				field: "jdata",
				message: err.to_string(),
			});
		}
		Ok(())
	}
}

impl StatementCompiler for UpdateObjectStreamMetadataJson {
	#[instrument(name = "sql::update_stream_metadata_json::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		self.validate().map_err(|err| rejected(Self::NAME, err))?;
		let stmt = SqlPlan::text(format!("UPDATE {}\nSET jdata = ", meta_table(self.kind)))
			.bind(BindValue::Json(self.json.clone()))
			.sql(format!("::jsonb\nWHERE {} = ", object_column(self.kind)))
			.bind(self.object_id)
			.sql(" AND source_id = ")
			.bind(self.source_id.clone())
			.render();
		debug!(kind = %self.kind, "compiled stream metadata json update");
		Ok(stmt)
	}
}

/// Moves a stream to a different object and/or source id.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateObjectStreamMetadataId {
	pub kind: ObjectDatumKind,
	pub stream_id: Uuid,
	pub object_id: Option<i64>,
	pub source_id: Option<String>,
}

impl UpdateObjectStreamMetadataId {
	const NAME: &'static str = "UpdateObjectStreamMetadataId";

	pub fn new(kind: ObjectDatumKind, stream_id: Uuid) -> Self {
		Self {
			kind,
			stream_id,
			object_id: None,
			source_id: None,
		}
	}

	pub fn with_object_id(mut self, id: i64) -> Self {
		self.object_id = Some(id);
		self
	}

	pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
		self.source_id = Some(id.into());
		self
	}
}

impl StatementCompiler for UpdateObjectStreamMetadataId {
	#[instrument(name = "sql::update_stream_metadata_id::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		let mut sets = Vec::new();
		if let Some(object_id) = self.object_id {
			sets.push(SqlPlan::text(format!("{} = ", object_column(self.kind))).bind(object_id));
		}
		if let Some(source_id) = &self.source_id {
			sets.push(SqlPlan::text("source_id = ").bind(source_id.clone()));
		}
		let stmt = set_by_stream(Self::NAME, self.kind, sets, self.stream_id)?;
		debug!(stream_id = %self.stream_id, "compiled stream metadata id update");
		Ok(stmt)
	}
}

/// Replaces a stream's property names.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateObjectStreamMetadataAttributes {
	pub kind: ObjectDatumKind,
	pub stream_id: Uuid,
	pub instantaneous: Option<Vec<String>>,
	pub accumulating: Option<Vec<String>>,
	pub status: Option<Vec<String>>,
}

impl UpdateObjectStreamMetadataAttributes {
	const NAME: &'static str = "UpdateObjectStreamMetadataAttributes";

	pub fn new(kind: ObjectDatumKind, stream_id: Uuid) -> Self {
		Self {
			kind,
			stream_id,
			instantaneous: None,
			accumulating: None,
			status: None,
		}
	}

	pub fn with_instantaneous(mut self, names: Vec<String>) -> Self {
		self.instantaneous = Some(names);
		self
	}

	pub fn with_accumulating(mut self, names: Vec<String>) -> Self {
		self.accumulating = Some(names);
		self
	}

	pub fn with_status(mut self, names: Vec<String>) -> Self {
		self.status = Some(names);
		self
	}
}

impl StatementCompiler for UpdateObjectStreamMetadataAttributes {
	#[instrument(name = "sql::update_stream_metadata_attributes::compile", level = "trace", skip(self))]
	fn compile(&self) -> Result<CompiledStatement> {
		let sets = [("names_i", &self.instantaneous), ("names_a", &self.accumulating), ("names_s", &self.status)]
			.into_iter()
			.filter_map(|(column, names)| {
				names.as_ref().map(|names| SqlPlan::text(format!("{column} = ")).bind(names.clone()))
			})
			.collect();
		let stmt = set_by_stream(Self::NAME, self.kind, sets, self.stream_id)?;
		debug!(stream_id = %self.stream_id, "compiled stream metadata attributes update");
		Ok(stmt)
	}
}

fn set_by_stream(
	compiler: &'static str,
	kind: ObjectDatumKind,
	sets: Vec<SqlPlan>,
	stream_id: Uuid,
) -> Result<CompiledStatement> {
	if sets.is_empty() {
		return Err(rejected(
			compiler,
			CompileError::InvalidArgument {
				field: "values",
				message: format!("{compiler} needs at least one value to set"),
			}
			.into(),
		));
	}
	Ok(SqlPlan::text(format!("UPDATE {}\nSET ", meta_table(kind)))
		.append(SqlPlan::join(sets, ", "))
		.sql("\nWHERE stream_id = ")
		.bind(stream_id)
		.render())
}
