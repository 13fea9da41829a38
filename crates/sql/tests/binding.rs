// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_sql::{CombiningType, DatumCriteria, SelectDatum, StatementCompiler, bind};
use datumql_testing::{
	binder::{BindEvent, RecordingBinder},
	init_tracing,
};
use datumql_type::{Aggregation, BindValue, SqlType};

fn combined() -> DatumCriteria {
	DatumCriteria::new()
		.with_node_ids(vec![1, 2, 3])
		.with_source_ids(vec!["a".to_string(), "b".to_string()])
		.with_aggregation(Aggregation::Day)
		.with_combining_type(CombiningType::Sum)
		.with_object_id_maps(vec!["100:1,2,3".to_string()])
		.with_max(5)
}

#[test]
fn test_arrays_created_with_element_types() {
	init_tracing();
	let stmt = SelectDatum::new(combined()).compile().unwrap();
	let mut binder = RecordingBinder::new();

	let arrays = stmt.bind_to(&mut binder).unwrap();
	assert_eq!(binder.bound_positions(), (1..=stmt.params.len()).collect::<Vec<_>>());

	let created: Vec<_> = binder
		.events
		.iter()
		.filter_map(|event| match event {
			BindEvent::CreateArray {
				element_type,
				len,
				..
			} => Some((*element_type, *len)),
			_ => None,
		})
		.collect();
	assert_eq!(
		created,
		vec![
			(SqlType::Bigint, 3),
			(SqlType::Text, 2),
			(SqlType::Bigint, 3),
			(SqlType::Bigint, 3),
			(SqlType::Bigint, 1),
		]
	);
	assert!(binder.events.contains(&BindEvent::BindValue {
		position: stmt.params.len(),
		value: BindValue::Int8(5),
	}));

	assert_eq!(arrays.len(), 5);
	assert_eq!(binder.live_arrays(), 5);
	bind::release(&mut binder, arrays).unwrap();
	assert_eq!(binder.live_arrays(), 0);
}

#[test]
fn test_failed_bind_frees_created_arrays() {
	let stmt = SelectDatum::new(combined()).compile().unwrap();
	let mut binder = RecordingBinder::failing_at(3);

	let err = stmt.bind_to(&mut binder).unwrap_err();
	assert_eq!(err, "bind failed at position 3");
	assert_eq!(binder.bound_positions(), vec![1, 2]);
	assert_eq!(binder.live_arrays(), 0);
}
