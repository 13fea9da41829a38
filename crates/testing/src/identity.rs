// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use datumql_type::{ObjectDatumKind, ObjectStreamId, StreamIdentity};
use uuid::Uuid;

/// Stream identities held in memory, registered up front.
#[derive(Debug, Default, Clone)]
pub struct MemoryStreamIdentity {
	by_object: HashMap<ObjectStreamId, Uuid>,
	by_stream: HashMap<Uuid, ObjectStreamId>,
}

impl MemoryStreamIdentity {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a stream for the object/source pair with a fresh id.
	pub fn register(&mut self, kind: ObjectDatumKind, object_id: i64, source_id: &str) -> Uuid {
		let stream_id = Uuid::new_v4();
		self.insert(stream_id, ObjectStreamId::new(kind, object_id, source_id));
		stream_id
	}

	pub fn insert(&mut self, stream_id: Uuid, stream: ObjectStreamId) {
		self.by_object.insert(stream.clone(), stream_id);
		self.by_stream.insert(stream_id, stream);
	}

	pub fn len(&self) -> usize {
		self.by_stream.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_stream.is_empty()
	}
}

impl StreamIdentity for MemoryStreamIdentity {
	fn resolve(&self, kind: ObjectDatumKind, object_id: i64, source_id: &str) -> Option<Uuid> {
		self.by_object.get(&ObjectStreamId::new(kind, object_id, source_id)).copied()
	}

	fn reverse(&self, stream_id: Uuid) -> Option<ObjectStreamId> {
		self.by_stream.get(&stream_id).cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_register_and_reverse() {
		let mut identity = MemoryStreamIdentity::new();
		let stream = identity.register(ObjectDatumKind::Node, 1, "a");

		assert_eq!(identity.resolve(ObjectDatumKind::Node, 1, "a"), Some(stream));
		assert_eq!(identity.resolve(ObjectDatumKind::Location, 1, "a"), None);
		assert_eq!(identity.reverse(stream), Some(ObjectStreamId::node(1, "a")));
		assert_eq!(identity.len(), 1);
	}
}
