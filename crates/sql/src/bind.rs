// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_type::{BindValue, Params, SqlType};

/// Driver-side receiver of positional parameters.
///
/// Array values are created as native database arrays first, bound by
/// handle, and released by the caller once the statement has run.
pub trait StatementBinder {
	type Array;
	type Error;

	fn create_array(&mut self, element_type: SqlType, value: &BindValue) -> Result<Self::Array, Self::Error>;

	fn bind_array(&mut self, position: usize, array: &Self::Array) -> Result<(), Self::Error>;

	fn bind_value(&mut self, position: usize, value: &BindValue) -> Result<(), Self::Error>;

	fn free_array(&mut self, array: Self::Array) -> Result<(), Self::Error>;
}

pub(crate) fn bind_all<B: StatementBinder>(binder: &mut B, params: &Params) -> Result<Vec<B::Array>, B::Error> {
	let mut arrays = Vec::new();
	for (position, value) in params.iter_positions() {
		let result = match value.array_element_type() {
			Some(element_type) => binder.create_array(element_type, value).and_then(|array| {
				let bound = binder.bind_array(position, &array);
				arrays.push(array);
				bound
			}),
			None => binder.bind_value(position, value),
		};

		if let Err(err) = result {
			// arrays created so far are freed before reporting the bind failure
			let _ = release(binder, arrays);
			return Err(err);
		}
	}
	Ok(arrays)
}

/// Frees arrays returned by [`crate::CompiledStatement::bind_to`].
///
/// Every array is freed even when one fails; the first failure is reported.
pub fn release<B: StatementBinder>(binder: &mut B, arrays: Vec<B::Array>) -> Result<(), B::Error> {
	let mut first_err = None;
	for array in arrays {
		if let Err(err) = binder.free_array(array) {
			first_err.get_or_insert(err);
		}
	}
	match first_err {
		Some(err) => Err(err),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use datumql_type::params;

	use super::*;

	#[derive(Default)]
	struct Calls {
		log: Vec<String>,
		fail_at: Option<usize>,
		next_array: usize,
	}

	impl StatementBinder for Calls {
		type Array = usize;
		type Error = String;

		fn create_array(&mut self, element_type: SqlType, value: &BindValue) -> Result<usize, String> {
			self.next_array += 1;
			self.log.push(format!("create {} {}", element_type, value.array_len().unwrap_or(0)));
			Ok(self.next_array)
		}

		fn bind_array(&mut self, position: usize, array: &usize) -> Result<(), String> {
			if self.fail_at == Some(position) {
				return Err(format!("bind {position}"));
			}
			self.log.push(format!("array {position} #{array}"));
			Ok(())
		}

		fn bind_value(&mut self, position: usize, value: &BindValue) -> Result<(), String> {
			if self.fail_at == Some(position) {
				return Err(format!("bind {position}"));
			}
			self.log.push(format!("value {position} {}", value.sql_type()));
			Ok(())
		}

		fn free_array(&mut self, array: usize) -> Result<(), String> {
			self.log.push(format!("free #{array}"));
			Ok(())
		}
	}

	#[test]
	fn test_arrays_are_created_before_binding() {
		let mut binder = Calls::default();
		let arrays = bind_all(&mut binder, &params![1i64, vec![1i64, 2, 3], "a"]).unwrap();
		assert_eq!(arrays, vec![1]);
		assert_eq!(binder.log, vec!["value 1 bigint", "create bigint 3", "array 2 #1", "value 3 text"]);

		release(&mut binder, arrays).unwrap();
		assert_eq!(binder.log.last().map(String::as_str), Some("free #1"));
	}

	#[test]
	fn test_failed_bind_frees_created_arrays() {
		let mut binder = Calls {
			fail_at: Some(3),
			..Calls::default()
		};
		let err = bind_all(&mut binder, &params![vec!["a".to_string()], vec![2i64], 3i64]).unwrap_err();
		assert_eq!(err, "bind 3");
		assert!(binder.log.contains(&"free #1".to_string()));
		assert!(binder.log.contains(&"free #2".to_string()));
	}
}
