//! Resolved locations and navigation targets.

use crate::codec::{QueryMap, QueryValue};

/// A fully resolved navigation target.
///
/// Created fresh by the matcher on every successful match and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
	/// Raw URL exactly as pushed or read from the browser.
	pub url: String,
	/// Normalized path of the matched route (the pattern for dynamic routes).
	pub path: String,
	/// Values extracted from dynamic segments, scalar-coerced.
	pub params: QueryMap,
	/// Values parsed from the search string.
	pub query: Option<QueryMap>,
}

impl Location {
	/// Creates a location for a static route with no query.
	pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			path: path.into(),
			params: QueryMap::new(),
			query: None,
		}
	}

	/// Returns the value of a dynamic segment.
	pub fn param(&self, name: &str) -> Option<&QueryValue> {
		self.params.get(name)
	}

	/// Returns the value of a query key.
	pub fn query_value(&self, key: &str) -> Option<&QueryValue> {
		self.query.as_ref().and_then(|q| q.get(key))
	}
}

/// Where a `push`/`replace` call wants to go.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
	/// A raw URL (path plus optional `?query`), used verbatim.
	Url(String),
	/// A structured reference resolved through the route table.
	Route(RouteRef),
}

impl Target {
	/// Shorthand for [`Target::Url`].
	pub fn url(url: impl Into<String>) -> Self {
		Self::Url(url.into())
	}
}

impl From<&str> for Target {
	fn from(url: &str) -> Self {
		Self::Url(url.to_string())
	}
}

impl From<String> for Target {
	fn from(url: String) -> Self {
		Self::Url(url)
	}
}

impl From<RouteRef> for Target {
	fn from(route: RouteRef) -> Self {
		Self::Route(route)
	}
}

/// Structured `{path|name, params, query}` reference.
///
/// When both a name and a path are given the name wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteRef {
	/// Route name registered in the table.
	pub name: Option<String>,
	/// Route path, possibly containing `:param` segments.
	pub path: Option<String>,
	/// Values substituted into `:param` segments.
	pub params: QueryMap,
	/// Values written into the query string.
	pub query: QueryMap,
}

impl RouteRef {
	/// References a route by name.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Self::default()
		}
	}

	/// References a route by path.
	pub fn path(path: impl Into<String>) -> Self {
		Self {
			path: Some(path.into()),
			..Self::default()
		}
	}

	/// Sets a dynamic segment value.
	pub fn param(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
		self.params.insert(name.into(), value.into());
		self
	}

	/// Sets a query value.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
		self.query.insert(key.into(), value.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_target_conversions() {
		assert_eq!(Target::from("/a"), Target::Url("/a".to_string()));
		assert_eq!(
			Target::from(RouteRef::named("home")),
			Target::Route(RouteRef {
				name: Some("home".to_string()),
				..RouteRef::default()
			})
		);
	}

	#[rstest]
	fn test_route_ref_builder_keeps_order() {
		let target = RouteRef::path("/users/:id").param("id", 7).query("b", 1).query("a", 2);

		assert_eq!(target.params["id"], 7.0);
		assert_eq!(target.query.keys().collect::<Vec<_>>(), vec!["b", "a"]);
	}

	#[rstest]
	fn test_location_accessors() {
		let mut location = Location::new("/a?x=1", "/a");
		location.query = crate::codec::parse_query("x=1");

		assert_eq!(location.query_value("x"), Some(&QueryValue::Number(1.0)));
		assert!(location.param("id").is_none());
	}
}
