// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::value::BindValue;

/// Ordered positional bind values of a compiled statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<BindValue>);

impl Params {
	pub fn new(values: Vec<BindValue>) -> Self {
		Self(values)
	}

	pub fn empty() -> Params {
		Params(Vec::new())
	}

	/// Value bound at a 1-based placeholder position.
	pub fn get(&self, position: usize) -> Option<&BindValue> {
		position.checked_sub(1).and_then(|index| self.0.get(index))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn values(&self) -> &[BindValue] {
		&self.0
	}

	/// Iterates `(position, value)` with 1-based positions.
	pub fn iter_positions(&self) -> impl Iterator<Item = (usize, &BindValue)> {
		self.0.iter().enumerate().map(|(index, value)| (index + 1, value))
	}

	pub fn into_inner(self) -> Vec<BindValue> {
		self.0
	}
}

impl From<Vec<BindValue>> for Params {
	fn from(values: Vec<BindValue>) -> Self {
		Params(values)
	}
}

impl<const N: usize> From<[BindValue; N]> for Params {
	fn from(values: [BindValue; N]) -> Self {
		Params(values.to_vec())
	}
}

#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::empty()
    };

    [ $($value:expr),+ $(,)? ] => {
        {
            let values = vec![
                $($crate::IntoBindValue::into_bind_value($value)),*
            ];
            $crate::Params::new(values)
        }
    };
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_params_macro_positional() {
		let params = params![42i64, "hello", vec![1i64, 2]];
		assert_eq!(params.len(), 3);
		assert_eq!(params.get(1), Some(&BindValue::Int8(42)));
		assert_eq!(params.get(2), Some(&BindValue::Text("hello".to_string())));
		assert_eq!(params.get(3), Some(&BindValue::Int8Array(vec![1, 2])));
		assert_eq!(params.get(0), None);
		assert_eq!(params.get(4), None);
	}

	#[test]
	fn test_iter_positions_is_one_based() {
		let params = params![1i64, 2i64];
		let positions: Vec<usize> = params.iter_positions().map(|(p, _)| p).collect();
		assert_eq!(positions, vec![1, 2]);
		assert!(params!().is_empty());
	}
}
