// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Statement compilers.
//!
//! Each compiler validates its input completely before producing any SQL,
//! then renders a [`CompiledStatement`] whose placeholders line up with its
//! parameters.

mod body;
mod common;
mod delete_datum;
mod get_datum;
mod insert_datum;
mod select_audit;
mod select_datum;
mod select_datum_partial;
mod select_stale;
mod select_stream_metadata;
mod statement;
mod update_stream_metadata;

use datumql_type::Result;
pub use delete_datum::{DeleteDatum, DeleteDatumById};
pub use get_datum::GetDatum;
pub use insert_datum::{InsertDatum, StoreDatum};
pub use select_audit::{SelectAccumulativeAuditDatum, SelectAuditDatum};
pub use select_datum::SelectDatum;
pub use select_datum_partial::SelectDatumPartialAggregate;
pub use select_stale::{SelectStaleAggregateDatum, SelectStaleAuditDatum};
pub use select_stream_metadata::SelectObjectStreamMetadata;
pub use update_stream_metadata::{
	UpdateObjectStreamMetadataAttributes, UpdateObjectStreamMetadataId, UpdateObjectStreamMetadataJson,
};

use crate::plan::CompiledStatement;

pub trait StatementCompiler {
	fn compile(&self) -> Result<CompiledStatement>;

	/// Statement counting the rows `compile` would return without paging.
	///
	/// `None` when the statement has no meaningful total.
	fn compile_count(&self) -> Result<Option<CompiledStatement>> {
		Ok(None)
	}
}
