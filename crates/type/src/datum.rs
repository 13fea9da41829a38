// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, BTreeSet};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kind::ObjectDatumKind;

/// Property values of a raw datum row, positioned by the stream's property names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatumProperties {
	pub instantaneous: Vec<BigDecimal>,
	pub accumulating: Vec<BigDecimal>,
	pub status: Vec<String>,
	pub tags: Vec<String>,
}

/// A raw datum row keyed by stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DatumEntity {
	pub stream_id: Uuid,
	pub timestamp: DateTime<Utc>,
	pub received: DateTime<Utc>,
	pub properties: DatumProperties,
}

/// Named datum samples, serialized as the JSON document the store function accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatumSamples {
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub i: BTreeMap<String, BigDecimal>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub a: BTreeMap<String, BigDecimal>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub s: BTreeMap<String, String>,
	#[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
	pub t: BTreeSet<String>,
}

impl DatumSamples {
	pub fn is_empty(&self) -> bool {
		self.i.is_empty() && self.a.is_empty() && self.s.is_empty() && self.t.is_empty()
	}
}

/// A datum addressed by object and source, before it has a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralDatum {
	pub kind: ObjectDatumKind,
	pub object_id: i64,
	pub source_id: String,
	pub created: DateTime<Utc>,
	pub samples: DatumSamples,
}
