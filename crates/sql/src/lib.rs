// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Compiles datum filter criteria into parameterized SQL.
//!
//! A statement compiler takes a [`DatumCriteria`] (or a set of ids), checks
//! it against what the statement supports, and produces SQL text with `?`
//! placeholders together with the values to bind to them.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod bind;
pub mod compile;
pub mod config;
pub mod filter;
pub mod meta;
pub mod partial;
pub mod plan;
pub mod predicate;
pub mod table;
pub mod virtual_id;

pub use bind::StatementBinder;
pub use compile::*;
pub use config::CompilerConfig;
pub use filter::{CombiningType, DateRange, DatumCriteria, RollupType, SortDescriptor, SortKey};
pub use partial::{PartialRangeSplit, PartialWindow, WindowKind};
pub use plan::{CompiledStatement, Fragment, SqlPlan};
pub use virtual_id::{VirtualIdMap, VirtualIdResolution, VirtualStreamPlan};
