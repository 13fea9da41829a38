// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Ordered SQL fragment lists.
//!
//! A statement is assembled from text fragments and bound values. Rendering
//! projects the same list twice: every [`Fragment::Bind`] becomes a `?` in the
//! text and the next value in [`Params`], so the placeholder count always
//! equals the parameter count.

use std::borrow::Cow;

use datumql_type::{BindValue, IntoBindValue, Params};

use crate::bind::{self, StatementBinder};

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
	Sql(Cow<'static, str>),
	Bind(BindValue),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlPlan {
	fragments: Vec<Fragment>,
}

impl SqlPlan {
	pub fn new() -> Self {
		Self {
			fragments: Vec::new(),
		}
	}

	pub fn text(text: impl Into<Cow<'static, str>>) -> Self {
		Self::new().sql(text)
	}

	/// Appends SQL text. Text never carries placeholders of its own.
	pub fn sql(mut self, text: impl Into<Cow<'static, str>>) -> Self {
		let text = text.into();
		debug_assert!(!text.contains('?'), "placeholder in SQL text fragment: {text}");
		if !text.is_empty() {
			self.fragments.push(Fragment::Sql(text));
		}
		self
	}

	pub fn bind(mut self, value: impl IntoBindValue) -> Self {
		self.fragments.push(Fragment::Bind(value.into_bind_value()));
		self
	}

	pub fn append(mut self, other: SqlPlan) -> Self {
		self.fragments.extend(other.fragments);
		self
	}

	pub fn join(plans: impl IntoIterator<Item = SqlPlan>, separator: &'static str) -> SqlPlan {
		let mut result = SqlPlan::new();
		for (index, plan) in plans.into_iter().enumerate() {
			if index > 0 {
				result = result.sql(separator);
			}
			result = result.append(plan);
		}
		result
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	pub fn fragments(&self) -> &[Fragment] {
		&self.fragments
	}

	pub fn param_count(&self) -> usize {
		self.fragments.iter().filter(|f| matches!(f, Fragment::Bind(_))).count()
	}

	pub fn render(self) -> CompiledStatement {
		let mut sql = String::new();
		let mut values = Vec::with_capacity(self.param_count());
		for fragment in self.fragments {
			match fragment {
				Fragment::Sql(text) => sql.push_str(&text),
				Fragment::Bind(value) => {
					sql.push('?');
					values.push(value);
				}
			}
		}
		CompiledStatement {
			sql,
			params: Params::new(values),
		}
	}
}

/// SQL text with the positional values that must be bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
	pub sql: String,
	pub params: Params,
}

impl CompiledStatement {
	pub fn placeholder_count(&self) -> usize {
		self.sql.matches('?').count()
	}

	/// Binds every parameter in order, creating native arrays for array values.
	///
	/// The returned arrays must be handed back to [`bind::release`] once the
	/// statement has executed.
	pub fn bind_to<B: StatementBinder>(&self, binder: &mut B) -> Result<Vec<B::Array>, B::Error> {
		bind::bind_all(binder, &self.params)
	}
}
