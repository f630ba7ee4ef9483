//! Route tree differ.
//!
//! The matcher only yields a leaf. A [`RouteChain`] is the per-navigation
//! view over the arena from the root-most ancestor down to that leaf; two
//! chains (active and candidate) are compared level by level, root-aligned,
//! to find the *start* level: the shallowest level whose component has to
//! be replaced rather than merely given new props.

use crate::route::Component;
use crate::table::{RouteId, RouteTable};
use crate::view::ViewHandle;

/// One level of a route chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
	/// Route record at this level.
	pub route: RouteId,
	/// Normalized path of the record.
	pub path: String,
	/// Component rendered at this level, if any.
	pub component: Option<Component>,
	/// Host instance currently rendering this level.
	pub view: Option<ViewHandle>,
}

/// Root-to-leaf sequence of levels for one navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteChain {
	levels: Vec<Level>,
}

impl RouteChain {
	/// Builds the unmounted chain ending at `leaf`.
	pub fn build(table: &RouteTable, leaf: RouteId) -> Self {
		let levels = table
			.lineage(leaf)
			.into_iter()
			.filter_map(|id| table.get(id))
			.map(|route| Level {
				route: route.id(),
				path: route.path().to_string(),
				component: route.component().cloned(),
				view: None,
			})
			.collect();
		Self { levels }
	}

	/// Levels, root first.
	pub fn levels(&self) -> &[Level] {
		&self.levels
	}

	/// Mutable access to the levels, root first.
	pub fn levels_mut(&mut self) -> &mut [Level] {
		&mut self.levels
	}

	/// Deepest level.
	pub fn leaf(&self) -> Option<&Level> {
		self.levels.last()
	}

	/// Number of levels.
	pub fn depth(&self) -> usize {
		self.levels.len()
	}

	/// Mounted instances, root first.
	pub fn views(&self) -> Vec<ViewHandle> {
		self.levels.iter().filter_map(|level| level.view).collect()
	}

	/// Level rendered by `view`.
	pub fn level_of(&self, view: ViewHandle) -> Option<&Level> {
		self.levels.iter().find(|level| level.view == Some(view))
	}
}

/// What has to happen to the view tree to display a new chain.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffPlan {
	/// The new chain, carrying every instance that is reused.
	pub chain: RouteChain,
	/// Shallowest level to (re)create; `None` means props update only.
	pub start: Option<usize>,
	/// Old instance occupying the slot the start level mounts into.
	pub replaced: Option<ViewHandle>,
	/// Old instances that no longer have a live level, deepest first.
	pub retired: Vec<ViewHandle>,
}

impl DiffPlan {
	/// Returns `true` when no component has to be replaced.
	pub fn is_update(&self) -> bool {
		self.start.is_none()
	}
}

/// Diffs `chain` against the active chain.
///
/// With no active chain every level is new and the start is the root.
pub fn diff_route(mut chain: RouteChain, active: Option<&RouteChain>) -> DiffPlan {
	let old = active.map(RouteChain::levels).unwrap_or(&[]);
	let start = match chain.depth() {
		0 => None,
		depth => climb(&mut chain.levels, old, depth - 1, None),
	};

	if let Some(start) = start {
		for level in &mut chain.levels[start..] {
			level.view = None;
		}
	}

	let kept = chain.views();
	let retired: Vec<ViewHandle> = old
		.iter()
		.rev()
		.filter_map(|level| level.view)
		.filter(|view| !kept.contains(view))
		.collect();

	// The outermost instance torn down at the start level, possibly found
	// deeper when the old tree had nothing mounted there.
	let replaced = start.and_then(|start| old.iter().skip(start).find_map(|level| level.view));

	tracing::debug!(
		"diff: depth {} -> {}, start {:?}, {} retired",
		old.len(),
		chain.depth(),
		start,
		retired.len()
	);

	DiffPlan {
		chain,
		start,
		replaced,
		retired,
	}
}

/// Walks one level up per call, from the leaf towards the root.
fn climb(levels: &mut [Level], old: &[Level], depth: usize, start: Option<usize>) -> Option<usize> {
	let level = &mut levels[depth];
	let start = match old.get(depth) {
		Some(previous) if previous.component == level.component => {
			level.view = previous.view;
			start
		}
		_ => Some(depth),
	};

	match depth {
		0 => start,
		_ => climb(levels, old, depth - 1, start),
	}
}
