// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Result, error::CompileError};

/// The kind of object a datum stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum ObjectDatumKind {
	#[default]
	#[serde(rename = "n")]
	Node,
	#[serde(rename = "l")]
	Location,
}

impl ObjectDatumKind {
	pub const fn key(&self) -> &'static str {
		match self {
			ObjectDatumKind::Node => "n",
			ObjectDatumKind::Location => "l",
		}
	}

	pub fn for_key(key: &str) -> Result<ObjectDatumKind> {
		match key.trim() {
			"n" | "N" | "node" | "Node" => Ok(ObjectDatumKind::Node),
			"l" | "L" | "location" | "Location" => Ok(ObjectDatumKind::Location),
			other => Err(CompileError::UnknownObjectKind {
				key: other.to_string(),
			}
			.into()),
		}
	}
}

impl Display for ObjectDatumKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_for_key() {
		assert_eq!(ObjectDatumKind::for_key("n").unwrap(), ObjectDatumKind::Node);
		assert_eq!(ObjectDatumKind::for_key("Location").unwrap(), ObjectDatumKind::Location);
		assert_eq!(ObjectDatumKind::for_key("x").unwrap_err().code(), "KIND_001");
	}
}
