// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_sql::StatementBinder;
use datumql_type::{BindValue, SqlType};

/// One call made against a [`RecordingBinder`].
#[derive(Debug, Clone, PartialEq)]
pub enum BindEvent {
	CreateArray {
		handle: usize,
		element_type: SqlType,
		len: usize,
	},
	BindArray {
		position: usize,
		handle: usize,
	},
	BindValue {
		position: usize,
		value: BindValue,
	},
	FreeArray {
		handle: usize,
	},
}

/// A native array handle issued by [`RecordingBinder`].
#[derive(Debug, PartialEq, Eq)]
pub struct ArrayHandle(pub usize);

/// Records binder calls in order, optionally failing at one position.
#[derive(Debug, Default)]
pub struct RecordingBinder {
	pub events: Vec<BindEvent>,
	fail_at: Option<usize>,
	next_handle: usize,
}

impl RecordingBinder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Binding at `position` fails with an error naming the position.
	pub fn failing_at(position: usize) -> Self {
		Self {
			fail_at: Some(position),
			..Self::default()
		}
	}

	/// Arrays created and not yet freed.
	pub fn live_arrays(&self) -> usize {
		let created = self.events.iter().filter(|e| matches!(e, BindEvent::CreateArray { .. })).count();
		let freed = self.events.iter().filter(|e| matches!(e, BindEvent::FreeArray { .. })).count();
		created - freed
	}

	/// Positions bound so far, arrays and values alike.
	pub fn bound_positions(&self) -> Vec<usize> {
		self.events
			.iter()
			.filter_map(|event| match event {
				BindEvent::BindArray {
					position,
					..
				}
				| BindEvent::BindValue {
					position,
					..
				} => Some(*position),
				_ => None,
			})
			.collect()
	}

	fn check(&self, position: usize) -> Result<(), String> {
		if self.fail_at == Some(position) {
			return Err(format!("bind failed at position {position}"));
		}
		Ok(())
	}
}

impl StatementBinder for RecordingBinder {
	type Array = ArrayHandle;
	type Error = String;

	fn create_array(&mut self, element_type: SqlType, value: &BindValue) -> Result<ArrayHandle, String> {
		self.next_handle += 1;
		self.events.push(BindEvent::CreateArray {
			handle: self.next_handle,
			element_type,
			len: value.array_len().unwrap_or(0),
		});
		Ok(ArrayHandle(self.next_handle))
	}

	fn bind_array(&mut self, position: usize, array: &ArrayHandle) -> Result<(), String> {
		self.check(position)?;
		self.events.push(BindEvent::BindArray {
			position,
			handle: array.0,
		});
		Ok(())
	}

	fn bind_value(&mut self, position: usize, value: &BindValue) -> Result<(), String> {
		self.check(position)?;
		self.events.push(BindEvent::BindValue {
			position,
			value: value.clone(),
		});
		Ok(())
	}

	fn free_array(&mut self, array: ArrayHandle) -> Result<(), String> {
		self.events.push(BindEvent::FreeArray {
			handle: array.0,
		});
		Ok(())
	}
}
