//! Route table: an arena of linked route records plus lookup indices.
//!
//! Records are addressed by [`RouteId`] and never move. Parent links are
//! plain ids into the same arena, so any number of route chains can be
//! compared without aliasing the records themselves.

use crate::codec::{QueryMap, stringify_query, stringify_scalar};
use crate::error::{Result, RouteTableError, RouterError};
use crate::hooks::Guards;
use crate::location::Target;
use crate::route::{Component, Loader, Redirect, RouteSpec, RouteView};
use std::collections::HashMap;

/// Stable index of a [`LinkedRoute`] in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(usize);

impl RouteId {
	/// Position of the record in the arena.
	pub fn index(self) -> usize {
		self.0
	}
}

/// Runtime record built from a [`RouteSpec`].
#[derive(Debug, Clone)]
pub struct LinkedRoute {
	id: RouteId,
	path: String,
	params: Vec<String>,
	name: Option<String>,
	parent: Option<RouteId>,
	view: Option<RouteView>,
	redirect: Option<Redirect>,
	guards: Guards,
	leaf: bool,
	loading: bool,
}

impl LinkedRoute {
	/// Id of this record.
	pub fn id(&self) -> RouteId {
		self.id
	}

	/// Normalized absolute path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Names of the `:param` segments, in path order.
	pub fn params(&self) -> &[String] {
		&self.params
	}

	/// Route name, for leaves that declare one.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Enclosing route, if any.
	pub fn parent(&self) -> Option<RouteId> {
		self.parent
	}

	/// Component rendered at this level.
	pub fn component(&self) -> Option<&Component> {
		match &self.view {
			Some(RouteView::Component(component)) => Some(component),
			_ => None,
		}
	}

	/// Loader of a lazy placeholder route.
	pub fn loader(&self) -> Option<&Loader> {
		match &self.view {
			Some(RouteView::Loader(loader)) => Some(loader),
			_ => None,
		}
	}

	/// Redirect declared on the route.
	pub fn redirect(&self) -> Option<&Redirect> {
		self.redirect.as_ref()
	}

	/// Route-tier hooks.
	pub fn guards(&self) -> &Guards {
		&self.guards
	}

	/// Returns `true` for records built from specs without children.
	pub fn is_leaf(&self) -> bool {
		self.leaf
	}

	/// Returns `true` when the path declares `:param` segments.
	pub fn is_dynamic(&self) -> bool {
		!self.params.is_empty()
	}
}

/// Collapses duplicate slashes and trims the trailing one (except for root).
pub fn normalize_path(path: &str) -> String {
	let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
	format!("/{}", segments.join("/"))
}

/// Resolves `child` against `parent`; absolute children ignore the parent.
pub fn join_path(parent: &str, child: &str) -> String {
	if child.starts_with('/') {
		normalize_path(child)
	} else {
		normalize_path(&format!("{}/{}", parent, child))
	}
}

fn extract_params(path: &str) -> Vec<String> {
	path.split('/')
		.filter_map(|segment| segment.strip_prefix(':'))
		.map(str::to_string)
		.collect()
}

/// Linked route records with `name → path` and `path → route` indices.
#[derive(Debug, Default)]
pub struct RouteTable {
	nodes: Vec<LinkedRoute>,
	leaves: Vec<RouteId>,
	name_to_path: HashMap<String, String>,
	path_to_route: HashMap<String, RouteId>,
	errors: Vec<RouteTableError>,
}

impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Links `spec` (and its descendants) under `parent`.
	///
	/// Only leaves are indexed. A leaf whose name or path collides with an
	/// existing entry is reported through [`RouteTable::errors`] and left
	/// unregistered. Returns the newly registered leaves.
	pub fn add(&mut self, spec: RouteSpec, parent: Option<RouteId>) -> Vec<RouteId> {
		let mut created = Vec::new();
		self.link(spec, parent, &mut None, &mut created);
		created
	}

	fn link(
		&mut self,
		spec: RouteSpec,
		parent: Option<RouteId>,
		slot: &mut Option<usize>,
		created: &mut Vec<RouteId>,
	) {
		let parent_path = parent
			.and_then(|id| self.get(id))
			.map(|route| route.path.as_str())
			.unwrap_or("/");
		let path = join_path(parent_path, &spec.path);
		let leaf = spec.is_leaf();
		let RouteSpec {
			name,
			children,
			view,
			redirect,
			guards,
			..
		} = spec;

		if !leaf {
			if matches!(view, Some(RouteView::Loader(_))) {
				self.report(RouteTableError::LoaderOnBranch(path));
				return;
			}
			if let Some(name) = &name {
				tracing::debug!("ignoring name '{}' on branch route {}", name, path);
			}
			let id = self.push_node(path, None, parent, view, redirect, guards, false);
			for child in children {
				self.link(child, Some(id), slot, created);
			}
			return;
		}

		if view.is_none() && redirect.is_none() {
			self.report(RouteTableError::MissingView(path));
			return;
		}
		if self.path_to_route.contains_key(&path) {
			self.report(RouteTableError::DuplicatePath(path));
			return;
		}
		if let Some(existing) = name.as_ref().and_then(|n| self.name_to_path.get(n)) {
			let err = RouteTableError::DuplicateName {
				name: name.clone().unwrap_or_default(),
				existing: existing.clone(),
			};
			self.report(err);
			return;
		}

		let id = self.push_node(path.clone(), name.clone(), parent, view, redirect, guards, true);
		self.path_to_route.insert(path.clone(), id);
		if let Some(name) = name {
			self.name_to_path.insert(name, path);
		}
		match slot {
			Some(index) => {
				self.leaves.insert(*index, id);
				*index += 1;
			}
			None => self.leaves.push(id),
		}
		created.push(id);
	}

	#[allow(clippy::too_many_arguments)]
	fn push_node(
		&mut self,
		path: String,
		name: Option<String>,
		parent: Option<RouteId>,
		view: Option<RouteView>,
		redirect: Option<Redirect>,
		guards: Guards,
		leaf: bool,
	) -> RouteId {
		let id = RouteId(self.nodes.len());
		self.nodes.push(LinkedRoute {
			id,
			params: extract_params(&path),
			path,
			name,
			parent,
			view,
			redirect,
			guards,
			leaf,
			loading: false,
		});
		id
	}

	fn report(&mut self, err: RouteTableError) {
		tracing::error!("route configuration error: {}", err);
		self.errors.push(err);
	}

	/// Unregisters a leaf from both indices and the flat route list.
	///
	/// Parent links of other records are left alone.
	pub fn remove(&mut self, id: RouteId) {
		self.leaves.retain(|leaf| *leaf != id);
		let Some(route) = self.nodes.get(id.0) else {
			return;
		};
		if self.path_to_route.get(&route.path) == Some(&id) {
			self.path_to_route.remove(&route.path);
		}
		if let Some(name) = &route.name
			&& self.name_to_path.get(name) == Some(&route.path)
		{
			self.name_to_path.remove(name);
		}
	}

	/// Marks a lazy placeholder as loading and hands out its loader.
	///
	/// Returns `None` when the route is not a placeholder or its loader has
	/// already been started.
	pub fn begin_load(&mut self, id: RouteId) -> Option<Loader> {
		let route = self.nodes.get_mut(id.0)?;
		if route.loading || !self.leaves.contains(&id) {
			return None;
		}
		let loader = route.loader()?.clone();
		route.loading = true;
		Some(loader)
	}

	/// Allows a placeholder whose load failed to be loaded again later.
	pub fn abandon_load(&mut self, id: RouteId) {
		if let Some(route) = self.nodes.get_mut(id.0) {
			route.loading = false;
		}
	}

	/// Replaces a lazy placeholder with the loaded `spec`.
	///
	/// The loaded routes take the placeholder's position in matching order
	/// and its parent; a loaded spec with an empty path inherits the
	/// placeholder's path. Returns `None` if the placeholder was already
	/// replaced.
	pub fn resolve_lazy(&mut self, placeholder: RouteId, mut spec: RouteSpec) -> Option<Vec<RouteId>> {
		let position = self.leaves.iter().position(|id| *id == placeholder)?;
		let route = self.nodes.get(placeholder.0)?;
		let parent = route.parent;
		if spec.path.is_empty() {
			spec.path = route.path.clone();
		}

		self.remove(placeholder);
		let mut created = Vec::new();
		self.link(spec, parent, &mut Some(position), &mut created);
		tracing::debug!(
			"lazy route {} resolved into {} route(s)",
			self.nodes[placeholder.0].path,
			created.len()
		);
		Some(created)
	}

	/// Looks up a record.
	pub fn get(&self, id: RouteId) -> Option<&LinkedRoute> {
		self.nodes.get(id.0)
	}

	/// Looks up the leaf registered at a normalized path.
	pub fn by_path(&self, path: &str) -> Option<&LinkedRoute> {
		self.path_to_route.get(path).and_then(|id| self.get(*id))
	}

	/// Path bound to a route name.
	pub fn path_for_name(&self, name: &str) -> Option<&str> {
		self.name_to_path.get(name).map(String::as_str)
	}

	/// Registered leaves in registration (matching) order.
	pub fn leaves(&self) -> &[RouteId] {
		&self.leaves
	}

	/// Number of registered leaves.
	pub fn len(&self) -> usize {
		self.leaves.len()
	}

	/// Returns `true` when no leaf is registered.
	pub fn is_empty(&self) -> bool {
		self.leaves.is_empty()
	}

	/// Configuration errors reported so far.
	pub fn errors(&self) -> &[RouteTableError] {
		&self.errors
	}

	/// Ids from the root-most ancestor down to `id`.
	pub fn lineage(&self, id: RouteId) -> Vec<RouteId> {
		let mut chain = Vec::new();
		let mut cursor = Some(id);
		while let Some(current) = cursor {
			chain.push(current);
			cursor = self.get(current).and_then(LinkedRoute::parent);
		}
		chain.reverse();
		chain
	}

	/// Builds the URL a target points at.
	///
	/// Raw URLs pass through untouched. Structured targets have their
	/// `:param` segments filled with scalar-stringified values and their
	/// query appended.
	pub fn resolve(&self, target: &Target) -> Result<String> {
		let route = match target {
			Target::Url(url) => return Ok(url.clone()),
			Target::Route(route) => route,
		};

		let (label, pattern) = match (&route.name, &route.path) {
			(Some(name), _) => {
				let path = self
					.path_for_name(name)
					.ok_or_else(|| RouterError::UnknownRouteName(name.clone()))?;
				(name.as_str(), path)
			}
			(None, Some(path)) => (path.as_str(), path.as_str()),
			(None, None) => ("/", "/"),
		};

		let mut url = fill_params(label, pattern, &route.params)?;
		let query = stringify_query(&route.query);
		if !query.is_empty() {
			url.push('?');
			url.push_str(&query);
		}
		Ok(url)
	}

	/// Builds the URL of the route registered under `name`.
	pub fn reverse(&self, name: &str, params: &QueryMap, query: &QueryMap) -> Result<String> {
		let target = Target::Route(crate::location::RouteRef {
			name: Some(name.to_string()),
			path: None,
			params: params.clone(),
			query: query.clone(),
		});
		self.resolve(&target)
	}
}

fn fill_params(label: &str, pattern: &str, params: &QueryMap) -> Result<String> {
	let segments = pattern
		.split('/')
		.map(|segment| match segment.strip_prefix(':') {
			Some(param) => {
				let value = params.get(param).ok_or_else(|| RouterError::MissingParameter {
					route: label.to_string(),
					param: param.to_string(),
				})?;
				stringify_scalar(value).ok_or_else(|| RouterError::UnencodableParameter {
					route: label.to_string(),
					param: param.to_string(),
				})
			}
			None => Ok(segment.to_string()),
		})
		.collect::<Result<Vec<_>>>()?;
	Ok(segments.join("/"))
}
