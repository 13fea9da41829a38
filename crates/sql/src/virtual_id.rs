// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Virtual stream combining.
//!
//! A map entry `100:1,2,3` merges the streams of objects 1, 2 and 3 into a
//! single virtual object 100. Source maps do the same for source ids. The
//! resolved maps are bound as parallel arrays and joined against `s`.

use std::{collections::HashSet, fmt::Display, hash::Hash, str::FromStr};

use datumql_type::{CompileError, Error, Result};

use crate::{
	filter::{CombiningType, DatumCriteria},
	plan::SqlPlan,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualIdMap<T> {
	pub virtual_id: T,
	pub members: Vec<T>,
}

impl<T> VirtualIdMap<T>
where
	T: FromStr,
{
	/// Parses `<virtual id>:<member>,<member>,...`.
	pub fn parse(entry: &str) -> Result<Self> {
		let malformed = |reason: String| -> Error {
			CompileError::MalformedVirtualIdMap {
				entry: entry.to_string(),
				reason,
			}
			.into()
		};
		let parse_id = |text: &str| -> Result<T> {
			text.parse::<T>().map_err(|_| malformed(format!("invalid id '{text}'")))
		};

		let (virtual_id, members) =
			entry.split_once(':').ok_or_else(|| malformed("missing ':' after the virtual id".to_string()))?;

		let virtual_id = virtual_id.trim();
		if virtual_id.is_empty() {
			return Err(malformed("empty virtual id".to_string()));
		}
		let members = members.trim();
		if members.is_empty() {
			return Err(malformed("no member ids".to_string()));
		}

		let members = members
			.split(',')
			.map(str::trim)
			.map(|member| {
				if member.is_empty() {
					Err(malformed("empty member id".to_string()))
				} else {
					parse_id(member)
				}
			})
			.collect::<Result<Vec<T>>>()?;

		Ok(Self {
			virtual_id: parse_id(virtual_id)?,
			members,
		})
	}
}

/// Parallel arrays describing a set of virtual id maps.
///
/// `member_ids[i]` belongs to `member_virtual_ids[i]`. A member listed under
/// two virtual ids appears once per group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualIdResolution<T> {
	pub virtual_ids: Vec<T>,
	pub member_ids: Vec<T>,
	pub member_virtual_ids: Vec<T>,
}

impl<T> VirtualIdResolution<T>
where
	T: FromStr + Clone + Eq + Hash + Display,
{
	/// `None` when there are no entries.
	pub fn resolve(entries: &[String]) -> Result<Option<Self>> {
		if entries.is_empty() {
			return Ok(None);
		}

		let mut seen = HashSet::new();
		let mut resolution = Self {
			virtual_ids: Vec::with_capacity(entries.len()),
			member_ids: Vec::new(),
			member_virtual_ids: Vec::new(),
		};
		for entry in entries {
			let map = VirtualIdMap::<T>::parse(entry)?;
			if !seen.insert(map.virtual_id.clone()) {
				return Err(CompileError::MalformedVirtualIdMap {
					entry: entry.clone(),
					reason: format!("virtual id {} is mapped more than once", map.virtual_id),
				}
				.into());
			}
			for member in map.members {
				resolution.member_ids.push(member);
				resolution.member_virtual_ids.push(map.virtual_id.clone());
			}
			resolution.virtual_ids.push(map.virtual_id);
		}
		Ok(Some(resolution))
	}

	/// The first virtual id `member` is mapped to.
	pub fn virtual_id_for(&self, member: &T) -> Option<&T> {
		self.member_ids.iter().position(|id| id == member).map(|index| &self.member_virtual_ids[index])
	}

	/// Member ids in declared order without repeats.
	pub fn distinct_members(&self) -> Vec<T> {
		let mut seen = HashSet::new();
		self.member_ids.iter().filter(|id| seen.insert((*id).clone())).cloned().collect()
	}
}

/// Resolved combining request for a datum query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualStreamPlan {
	pub combining: CombiningType,
	pub objects: Option<VirtualIdResolution<i64>>,
	pub sources: Option<VirtualIdResolution<String>>,
}

impl VirtualStreamPlan {
	/// `None` when the filter does not combine streams.
	pub fn from_filter(filter: &DatumCriteria) -> Result<Option<Self>> {
		let Some(combining) = filter.combining_type else {
			return Ok(None);
		};
		if filter.aggregation() == datumql_type::Aggregation::None {
			return Err(CompileError::InvalidArgument {
				field: "combining_type",
				message: "combining streams requires an aggregation".to_string(),
			}
			.into());
		}
		if filter.selects_single_record() {
			return Err(CompileError::InvalidArgument {
				field: "combining_type",
				message: "combining streams cannot be used with a most recent or earliest selection".to_string(),
			}
			.into());
		}

		let objects = VirtualIdResolution::resolve(&filter.object_id_maps)?;
		let sources = VirtualIdResolution::resolve(&filter.source_id_maps)?;
		if objects.is_none() && sources.is_none() {
			return Err(CompileError::CombiningWithoutMaps.into());
		}
		Ok(Some(Self {
			combining,
			objects,
			sources,
		}))
	}

	/// Object ids for the metadata predicate: explicit ids win, otherwise
	/// the mapped members.
	pub fn object_ids(&self, explicit: &[i64]) -> Vec<i64> {
		match &self.objects {
			Some(objects) if explicit.is_empty() => objects.distinct_members(),
			_ => explicit.to_vec(),
		}
	}

	pub fn source_ids(&self, explicit: &[String]) -> Vec<String> {
		match &self.sources {
			Some(sources) if explicit.is_empty() => sources.distinct_members(),
			_ => explicit.to_vec(),
		}
	}

	/// Body of the `vs` CTE: each matched stream with its virtual ids and ranks.
	pub fn render_cte(&self) -> SqlPlan {
		let object_cols = if self.objects.is_some() {
			"vom.vid AS obj_id, vor.rank AS obj_rank"
		} else {
			"s.obj_id AS obj_id, 0::BIGINT AS obj_rank"
		};
		let source_cols = if self.sources.is_some() {
			"vsm.vid AS source_id, vsr.rank AS source_rank"
		} else {
			"s.source_id AS source_id, 0::BIGINT AS source_rank"
		};

		let mut plan = SqlPlan::text(format!(
			"SELECT s.stream_id, {object_cols}, {source_cols}, s.names_i, s.names_a, s.names_s\nFROM s"
		));
		if let Some(objects) = &self.objects {
			plan = plan
				.sql("\nINNER JOIN unnest(")
				.bind(objects.member_ids.clone())
				.sql("::BIGINT[], ")
				.bind(objects.member_virtual_ids.clone())
				.sql("::BIGINT[]) AS vom(rid, vid) ON vom.rid = s.obj_id\nINNER JOIN unnest(")
				.bind(objects.virtual_ids.clone())
				.sql("::BIGINT[]) WITH ORDINALITY AS vor(vid, rank) ON vor.vid = vom.vid");
		}
		if let Some(sources) = &self.sources {
			plan = plan
				.sql("\nINNER JOIN unnest(")
				.bind(sources.member_ids.clone())
				.sql("::TEXT[], ")
				.bind(sources.member_virtual_ids.clone())
				.sql("::TEXT[]) AS vsm(rid, vid) ON vsm.rid = s.source_id\nINNER JOIN unnest(")
				.bind(sources.virtual_ids.clone())
				.sql("::TEXT[]) WITH ORDINALITY AS vsr(vid, rank) ON vsr.vid = vsm.vid");
		}
		plan
	}

	/// Combined rows of `d`, one per virtual stream and time.
	///
	/// A `rollup` body holds one row per member stream, each with its own
	/// start, so the combined row takes the earliest start instead of
	/// grouping by it.
	pub fn render_projection(&self, rollup: bool) -> SqlPlan {
		let (ts, group_ts) = if rollup {
			("min(d.ts) AS ts", "")
		} else {
			("d.ts", ", d.ts")
		};
		SqlPlan::text(format!(
			"SELECT solardatm.virtual_stream_id(vs.obj_id, vs.source_id) AS stream_id, \
			 vs.obj_id, vs.source_id, {ts},\n\
			 (solardatm.combine_agg_data(\
			 (vs.names_i, vs.names_a, vs.names_s, d.data_i, d.data_a, d.data_s, d.data_t, d.stat_i, d.read_a)\
			 ::solardatm.named_agg_data, "
		))
		.bind(self.combining.key())
		.sql(format!(
			" ORDER BY vs.obj_rank, vs.source_rank)).*\n\
			 FROM d\n\
			 INNER JOIN vs ON vs.stream_id = d.stream_id\n\
			 GROUP BY vs.obj_id, vs.obj_rank, vs.source_id, vs.source_rank{group_ts}"
		))
	}
}
