//! URL → route resolution.
//!
//! Candidates are tried in registration order and the first match wins.
//! Lazy placeholders match on a segment-aware path prefix and report
//! [`MatchOutcome::Deferred`]: the caller runs the loader, swaps the
//! placeholder for the loaded routes and matches again with
//! [`match_within`].

use crate::codec::{QueryMap, parse_query, parse_scalar};
use crate::location::Location;
use crate::table::{LinkedRoute, RouteId, RouteTable, normalize_path};

/// Result of matching a raw URL.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
	/// A leaf route matched.
	Matched(RouteId, Location),
	/// A lazy placeholder must be loaded before a verdict is known.
	Deferred(RouteId),
	/// No candidate matched.
	Missing,
}

impl MatchOutcome {
	/// Returns the matched location, if any.
	pub fn location(&self) -> Option<&Location> {
		match self {
			Self::Matched(_, location) => Some(location),
			_ => None,
		}
	}
}

/// Matches `url` against every registered leaf.
pub fn match_url(table: &RouteTable, url: &str) -> MatchOutcome {
	match_within(table, table.leaves(), url)
}

/// Matches `url` against `candidates` only, in the order given.
pub fn match_within(table: &RouteTable, candidates: &[RouteId], url: &str) -> MatchOutcome {
	let (raw_path, search) = url.split_once('?').unwrap_or((url, ""));
	let path = normalize_path(raw_path);

	for route in candidates.iter().filter_map(|id| table.get(*id)) {
		let params = if route.is_dynamic() {
			match capture(route, &path) {
				Some(params) => params,
				None => continue,
			}
		} else if route.loader().is_some() {
			if !has_prefix(&path, route.path()) {
				continue;
			}
			QueryMap::new()
		} else if route.path() == path {
			QueryMap::new()
		} else {
			continue;
		};

		if route.loader().is_some() {
			tracing::debug!("{} hit lazy route {}", url, route.path());
			return MatchOutcome::Deferred(route.id());
		}

		let location = Location {
			url: url.to_string(),
			path: route.path().to_string(),
			params,
			query: parse_query(search),
		};
		return MatchOutcome::Matched(route.id(), location);
	}

	MatchOutcome::Missing
}

fn capture(route: &LinkedRoute, path: &str) -> Option<QueryMap> {
	let pattern: Vec<&str> = route.path().split('/').collect();
	let segments: Vec<&str> = path.split('/').collect();
	if pattern.len() != segments.len() {
		return None;
	}

	let mut params = QueryMap::new();
	for (expected, actual) in pattern.iter().zip(&segments) {
		match expected.strip_prefix(':') {
			Some(name) => {
				params.insert(name.to_string(), parse_scalar(actual));
			}
			None if expected == actual => {}
			None => return None,
		}
	}
	Some(params)
}

fn has_prefix(path: &str, prefix: &str) -> bool {
	prefix == "/"
		|| path == prefix
		|| path
			.strip_prefix(prefix)
			.is_some_and(|rest| rest.starts_with('/'))
}
