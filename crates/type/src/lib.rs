// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Shared types for the datum query compiler.
//!
//! Aggregation levels, object kinds, stream and datum identifiers, the
//! stream identity collaborator, positional bind values and the
//! diagnostics every compile-time failure is reported with.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod aggregation;
pub mod datum;
pub mod error;
pub mod id;
pub mod identity;
pub mod kind;
pub mod params;
pub mod value;

pub use aggregation::Aggregation;
pub use error::{CompileError, Diagnostic, Error, IntoDiagnostic};
pub use id::{AggregateDatumId, DatumPK, KindCheck, ObjectDatumId, ObjectStreamId};
pub use identity::StreamIdentity;
pub use kind::ObjectDatumKind;
pub use params::Params;
pub use value::{BindValue, IntoBindValue, SqlType};

pub type Result<T> = std::result::Result<T, Error>;
