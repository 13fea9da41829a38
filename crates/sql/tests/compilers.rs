// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use datumql_sql::{
	CompilerConfig, DatumCriteria, DeleteDatum, DeleteDatumById, GetDatum, SelectAccumulativeAuditDatum,
	SelectAuditDatum, SelectObjectStreamMetadata, SelectStaleAggregateDatum, SelectStaleAuditDatum,
	StatementCompiler, UpdateObjectStreamMetadataAttributes, UpdateObjectStreamMetadataId,
	UpdateObjectStreamMetadataJson, VirtualIdResolution,
};
use datumql_testing::{
	assert_balanced, identity::MemoryStreamIdentity, init_tracing,
	util::time::{utc, utc_hour},
};
use datumql_type::{
	AggregateDatumId, Aggregation, BindValue, DatumPK, KindCheck, ObjectDatumId, ObjectDatumKind, ObjectStreamId,
};
use uuid::Uuid;

fn ranged() -> DatumCriteria {
	DatumCriteria::new().with_node_ids(vec![1, 2]).with_start_date(utc(2022, 1, 1)).with_end_date(utc(2022, 2, 1))
}

#[test]
fn test_every_compiler_balances_placeholders() {
	init_tracing();
	let config = CompilerConfig::new().with_lock_stale_rows(true);
	let compilers: Vec<Box<dyn StatementCompiler>> = vec![
		Box::new(SelectObjectStreamMetadata::new(ranged().with_source_id("/inv/*"))),
		Box::new(SelectStaleAggregateDatum::with_config(ranged().with_aggregation(Aggregation::Hour), config.clone())),
		Box::new(SelectStaleAuditDatum::with_config(ranged(), config.clone())),
		Box::new(SelectAuditDatum::new(ranged().with_aggregation(Aggregation::Month))),
		Box::new(SelectAccumulativeAuditDatum::new(ranged().with_aggregation(Aggregation::Day))),
		Box::new(GetDatum::new(DatumPK::new(Uuid::nil(), utc(2022, 1, 1)), Aggregation::Day)),
		Box::new(DeleteDatum::new(ranged())),
		Box::new(DeleteDatumById::new(vec![DatumPK::new(Uuid::nil(), utc(2022, 1, 1))])),
		Box::new(UpdateObjectStreamMetadataJson::new(ObjectDatumKind::Node, 1, "a", "{}")),
		Box::new(UpdateObjectStreamMetadataId::new(ObjectDatumKind::Node, Uuid::nil()).with_source_id("b")),
		Box::new(
			UpdateObjectStreamMetadataAttributes::new(ObjectDatumKind::Location, Uuid::nil())
				.with_instantaneous(vec!["temp".to_string()]),
		),
	];

	for compiler in &compilers {
		let stmt = compiler.compile().unwrap();
		assert_balanced(&stmt);
		if let Some(count) = compiler.compile_count().unwrap() {
			assert_balanced(&count);
		}
	}
}

#[test]
fn test_config_from_json_applies_defaults() {
	let config = CompilerConfig::from_json(r#"{"default_time_zone":"Pacific/Auckland","max_page_size":100}"#).unwrap();
	assert_eq!(config.default_time_zone, "Pacific/Auckland");
	assert_eq!(config.max_page_size, Some(100));
	assert!(!config.lock_stale_rows);

	let stmt = SelectObjectStreamMetadata::with_config(ranged(), config.clone()).compile().unwrap();
	assert!(stmt.sql.contains("COALESCE(l.time_zone, 'Pacific/Auckland')"));

	let err = SelectStaleAggregateDatum::with_config(ranged().with_aggregation(Aggregation::Day).with_max(500), config)
		.compile()
		.unwrap_err();
	assert_eq!(err.code(), "FILTER_007");

	assert!(CompilerConfig::from_json(r#"{"default_time_zone":"x';--"}"#).is_err());
}

#[test]
fn test_stale_for_ids_kind_check() {
	let ids =
		vec![AggregateDatumId::new(ObjectDatumKind::Location, 4, "w", utc_hour(2022, 1, 1, 5), Aggregation::Hour)];

	let err = SelectStaleAggregateDatum::for_ids(ids.clone(), ObjectDatumKind::Node, KindCheck::Expected)
		.compile()
		.unwrap_err();
	assert_eq!(err.code(), "FILTER_006");

	let stmt = SelectStaleAggregateDatum::for_ids(ids.clone(), ObjectDatumKind::Location, KindCheck::Expected)
		.compile()
		.unwrap();
	assert!(stmt.sql.contains("FROM solardatm.da_loc_datm_meta m"));
	assert_balanced(&stmt);

	let stmt = SelectStaleAggregateDatum::for_ids(ids, ObjectDatumKind::Node, KindCheck::Receiver).compile().unwrap();
	assert_balanced(&stmt);
}

#[test]
fn test_ids_resolved_through_stream_identity() {
	let mut identity = MemoryStreamIdentity::new();
	let stream = identity.register(ObjectDatumKind::Node, 1, "a");
	let ts = utc(2022, 1, 1);

	let ids = vec![
		ObjectDatumId::new(ObjectStreamId::node(1, "a"), ts),
		ObjectDatumId::new(ObjectStreamId::node(1, "missing"), ts),
	];
	let delete = DeleteDatumById::resolve(&ids, &identity);
	assert_eq!(delete.ids(), &[DatumPK::new(stream, ts)]);
	let stmt = delete.compile().unwrap();
	assert_eq!(stmt.params.get(1), Some(&BindValue::Uuid(stream)));

	let get = GetDatum::resolve(&ids[0], Aggregation::Hour, &identity).unwrap();
	assert_eq!(get.id(), &DatumPK::new(stream, ts));
	assert!(GetDatum::resolve(&ids[1], Aggregation::Hour, &identity).is_none());

	let unresolved = DeleteDatumById::resolve(&ids[1..], &identity);
	assert_eq!(unresolved.compile().unwrap_err().code(), "FILTER_006");
}

#[test]
fn test_virtual_id_resolution_is_idempotent() {
	let entries = vec!["100:1,2,3".to_string(), "200:4".to_string()];
	let first = VirtualIdResolution::<i64>::resolve(&entries).unwrap().unwrap();
	let second = VirtualIdResolution::<i64>::resolve(&entries).unwrap().unwrap();
	assert_eq!(first, second);
	assert_eq!(first.virtual_id_for(&4), Some(&200));
	assert_eq!(first.distinct_members(), vec![1, 2, 3, 4]);

	assert!(VirtualIdResolution::<i64>::resolve(&[]).unwrap().is_none());
}
