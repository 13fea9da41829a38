// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::common::{count_of, order_by, paging, with_ctes};
use crate::{
	config::CompilerConfig,
	filter::{DatumCriteria, SortKey},
	meta::StreamMetadataQuery,
	plan::SqlPlan,
	virtual_id::VirtualStreamPlan,
};

/// `WITH s, [vs,] d` followed by the `d` projection.
pub(crate) struct DatumStatement<'a> {
	pub filter: &'a DatumCriteria,
	pub config: &'a CompilerConfig,
	pub virtual_plan: Option<&'a VirtualStreamPlan>,
	pub body: SqlPlan,
	/// `body` holds one row per stream rather than per stream and time.
	pub rollup: bool,
}

impl DatumStatement<'_> {
	fn ctes(&self) -> SqlPlan {
		let filter = self.filter;
		let meta = match self.virtual_plan {
			Some(plan) => StreamMetadataQuery::for_filter(
				filter,
				self.config,
				&plan.object_ids(&filter.object_ids),
				&plan.source_ids(&filter.source_ids),
			),
			None => StreamMetadataQuery::for_filter(filter, self.config, &filter.object_ids, &filter.source_ids),
		};

		let mut ctes = vec![("s", meta.render())];
		if let Some(plan) = self.virtual_plan {
			ctes.push(("vs", plan.render_cte()));
		}
		ctes.push(("d", self.body.clone()));
		with_ctes(ctes)
	}

	fn projection(&self) -> SqlPlan {
		match self.virtual_plan {
			Some(plan) => plan.render_projection(self.rollup),
			None => SqlPlan::text("SELECT d.*\nFROM d\nINNER JOIN s ON s.stream_id = d.stream_id"),
		}
	}

	fn order(&self) -> SqlPlan {
		if self.virtual_plan.is_some() {
			// a combined rollup is grouped without d.ts, so time sorts use its output column
			let (time, tie_breakers): (&'static str, &[&'static str]) = if self.rollup {
				("ts", &["vs.obj_rank", "vs.obj_id", "vs.source_rank", "vs.source_id"])
			} else {
				("d.ts", &["vs.obj_rank", "vs.obj_id", "vs.source_rank", "vs.source_id", "d.ts"])
			};
			order_by(
				&self.filter.sorts,
				|key| match key {
					SortKey::Object | SortKey::Stream => "vs.obj_rank",
					SortKey::Source => "vs.source_rank",
					SortKey::Time => time,
				},
				tie_breakers,
			)
		} else {
			order_by(
				&self.filter.sorts,
				|key| match key {
					SortKey::Object => "s.obj_id",
					SortKey::Source => "s.source_id",
					SortKey::Time => "d.ts",
					SortKey::Stream => "d.stream_id",
				},
				&["d.stream_id", "d.ts"],
			)
		}
	}

	pub fn select(&self) -> SqlPlan {
		self.ctes().append(self.projection()).append(self.order()).append(paging(self.filter))
	}

	pub fn count(&self) -> SqlPlan {
		self.ctes().append(count_of(self.projection()))
	}
}
