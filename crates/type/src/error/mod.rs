// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

mod compile;
mod diagnostic;

pub use compile::CompileError;
pub use diagnostic::{Diagnostic, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Diagnostic);

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0.render())
	}
}

impl Error {
	pub fn diagnostic(self) -> Diagnostic {
		self.0
	}

	pub fn code(&self) -> &str {
		&self.0.code
	}
}

impl std::error::Error for Error {}

impl From<CompileError> for Error {
	fn from(err: CompileError) -> Self {
		Error(err.into_diagnostic())
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		CompileError::InvalidConfig {
			message: err.to_string(),
		}
		.into()
	}
}

/// Returns early with the given [`CompileError`] converted into an [`Error`].
#[macro_export]
macro_rules! return_error {
	($err:expr) => {
		return Err($crate::error::Error::from($err))
	};
}
