// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use uuid::Uuid;

use crate::{id::ObjectStreamId, kind::ObjectDatumKind};

/// Maps object/source pairs to stream ids and back.
///
/// Provided by the persistence layer. The compiler only consumes resolved
/// stream ids; an unresolvable pair is not a compile error.
pub trait StreamIdentity {
	fn resolve(&self, kind: ObjectDatumKind, object_id: i64, source_id: &str) -> Option<Uuid>;

	fn reverse(&self, stream_id: Uuid) -> Option<ObjectStreamId>;
}

impl<T: StreamIdentity + ?Sized> StreamIdentity for &T {
	fn resolve(&self, kind: ObjectDatumKind, object_id: i64, source_id: &str) -> Option<Uuid> {
		(**self).resolve(kind, object_id, source_id)
	}

	fn reverse(&self, stream_id: Uuid) -> Option<ObjectStreamId> {
		(**self).reverse(stream_id)
	}
}
