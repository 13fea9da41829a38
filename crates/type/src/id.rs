// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{aggregation::Aggregation, identity::StreamIdentity, kind::ObjectDatumKind};

/// The object/source pair a stream id stands for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectStreamId {
	pub kind: ObjectDatumKind,
	pub object_id: i64,
	pub source_id: String,
}

impl ObjectStreamId {
	pub fn new(kind: ObjectDatumKind, object_id: i64, source_id: impl Into<String>) -> Self {
		Self {
			kind,
			object_id,
			source_id: source_id.into(),
		}
	}

	pub fn node(object_id: i64, source_id: impl Into<String>) -> Self {
		Self::new(ObjectDatumKind::Node, object_id, source_id)
	}

	pub fn location(object_id: i64, source_id: impl Into<String>) -> Self {
		Self::new(ObjectDatumKind::Location, object_id, source_id)
	}
}

/// Primary key of a raw datum row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatumPK {
	pub stream_id: Uuid,
	pub timestamp: DateTime<Utc>,
}

impl DatumPK {
	pub fn new(stream_id: Uuid, timestamp: DateTime<Utc>) -> Self {
		Self {
			stream_id,
			timestamp,
		}
	}
}

/// A datum addressed by object and source rather than stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectDatumId {
	pub stream: ObjectStreamId,
	pub timestamp: DateTime<Utc>,
}

impl ObjectDatumId {
	pub fn new(stream: ObjectStreamId, timestamp: DateTime<Utc>) -> Self {
		Self {
			stream,
			timestamp,
		}
	}

	pub fn resolve(&self, identity: &dyn StreamIdentity) -> Option<DatumPK> {
		identity
			.resolve(self.stream.kind, self.stream.object_id, &self.stream.source_id)
			.map(|stream_id| DatumPK::new(stream_id, self.timestamp))
	}
}

/// How [`AggregateDatumId::is_valid_aggregate_object_id`] checks the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindCheck {
	/// Compare against the id's own kind, so the expected kind is ignored.
	Receiver,
	/// Compare against the expected kind.
	#[default]
	Expected,
}

/// Address of an aggregate or stale-aggregate row.
///
/// Ordered field by field in declaration order, absent values first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregateDatumId {
	pub kind: ObjectDatumKind,
	pub object_id: Option<i64>,
	pub source_id: Option<String>,
	pub timestamp: Option<DateTime<Utc>>,
	pub aggregation: Option<Aggregation>,
}

impl AggregateDatumId {
	pub fn new(
		kind: ObjectDatumKind,
		object_id: i64,
		source_id: impl Into<String>,
		timestamp: DateTime<Utc>,
		aggregation: Aggregation,
	) -> Self {
		Self {
			kind,
			object_id: Some(object_id),
			source_id: Some(source_id.into()),
			timestamp: Some(timestamp),
			aggregation: Some(aggregation),
		}
	}

	pub fn is_valid_object_id(&self, expected_kind: ObjectDatumKind) -> bool {
		self.kind == expected_kind && self.object_id.is_some() && self.source_id.is_some()
	}

	/// True when the object part is valid and both timestamp and aggregation are set.
	///
	/// With [`KindCheck::Receiver`] the kind comparison is made against the
	/// id's own kind, which always matches.
	pub fn is_valid_aggregate_object_id(&self, expected_kind: ObjectDatumKind, check: KindCheck) -> bool {
		let kind = match check {
			KindCheck::Receiver => self.kind,
			KindCheck::Expected => expected_kind,
		};
		self.is_valid_object_id(kind) && self.timestamp.is_some() && self.aggregation.is_some()
	}
}
