// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter, Write};

use serde::{Deserialize, Serialize};

/// Structured description of a rejected filter or statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	/// Name of the filter field the failure is about, if any.
	pub field: Option<String>,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
}

pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl Diagnostic {
	pub fn render(&self) -> String {
		let mut out = String::new();
		let _ = write!(out, "[{}] {}", self.code, self.message);
		if let Some(field) = &self.field {
			let _ = write!(out, "\n  field: {}", field);
		}
		if let Some(label) = &self.label {
			let _ = write!(out, "\n  {}", label);
		}
		if let Some(help) = &self.help {
			let _ = write!(out, "\n  help: {}", help);
		}
		for note in &self.notes {
			let _ = write!(out, "\n  note: {}", note);
		}
		out
	}
}

impl Display for Diagnostic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.code)
	}
}
