//! Declarative route configuration.
//!
//! A [`RouteSpec`] tree is what applications write; the
//! [`RouteTable`](crate::table::RouteTable) links it into runtime records.
//!
//! ```ignore
//! let routes = vec![
//!     RouteSpec::new("/").component(home),
//!     RouteSpec::new("/users").component(layout).children(vec![
//!         RouteSpec::new("").name("users").component(user_list),
//!         RouteSpec::new(":id").name("user").component(user_detail),
//!     ]),
//!     RouteSpec::new("/admin").loader(Loader::ready(admin_routes)),
//!     RouteSpec::new("/old").redirect(Redirect::to("/")),
//! ];
//! ```

use crate::hooks::{Guard, Guards, Transition};
use crate::location::{Location, Target};
use std::fmt;
use std::rc::Rc;

/// Opaque handle to a host view descriptor.
///
/// Identity is by handle: two clones of the same component compare equal,
/// two components created separately never do, whatever their names.
#[derive(Clone)]
pub struct Component(Rc<ComponentDef>);

struct ComponentDef {
	name: String,
	guards: Guards,
}

impl Component {
	/// Creates a component descriptor without lifecycle hooks.
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_guards(name, Guards::new())
	}

	/// Creates a component descriptor carrying component-tier hooks.
	pub fn with_guards(name: impl Into<String>, guards: Guards) -> Self {
		Self(Rc::new(ComponentDef {
			name: name.into(),
			guards,
		}))
	}

	/// Descriptor name, for hosts and diagnostics.
	pub fn name(&self) -> &str {
		&self.0.name
	}

	/// Component-tier hooks.
	pub fn guards(&self) -> &Guards {
		&self.0.guards
	}
}

impl PartialEq for Component {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for Component {}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Component").field(&self.0.name).finish()
	}
}

/// Consume-once handle through which a [`Loader`] delivers its route.
pub struct LoadHandle {
	resume: Box<dyn FnOnce(Result<RouteSpec, String>)>,
}

impl LoadHandle {
	/// Wraps a continuation.
	pub fn new<F>(resume: F) -> Self
	where
		F: FnOnce(Result<RouteSpec, String>) + 'static,
	{
		Self {
			resume: Box::new(resume),
		}
	}

	/// Delivers the loaded route definition.
	pub fn resolve(self, spec: RouteSpec) {
		(self.resume)(Ok(spec))
	}

	/// Reports that the definition could not be loaded.
	pub fn fail(self, reason: impl Into<String>) {
		(self.resume)(Err(reason.into()))
	}
}

impl fmt::Debug for LoadHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoadHandle").finish_non_exhaustive()
	}
}

/// Deferred supplier of a [`RouteSpec`].
///
/// The loader is invoked at most once; the spec it delivers replaces the
/// placeholder route in the table.
#[derive(Clone)]
pub struct Loader(Rc<dyn Fn(LoadHandle)>);

impl Loader {
	/// Creates a loader that answers through a [`LoadHandle`], possibly later.
	pub fn new<F>(load: F) -> Self
	where
		F: Fn(LoadHandle) + 'static,
	{
		Self(Rc::new(load))
	}

	/// Creates a loader that produces its spec synchronously.
	pub fn ready<F>(load: F) -> Self
	where
		F: Fn() -> RouteSpec + 'static,
	{
		Self::new(move |handle| handle.resolve(load()))
	}

	pub(crate) fn load(&self, handle: LoadHandle) {
		(self.0)(handle)
	}
}

impl fmt::Debug for Loader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Loader")
	}
}

/// What a route renders: a component, or a loader that will supply one.
#[derive(Debug, Clone)]
pub enum RouteView {
	/// Renders this component.
	Component(Component),
	/// Supplies the real route definition on first match.
	Loader(Loader),
}

/// Where a route sends the navigation instead of rendering.
#[derive(Clone)]
pub enum Redirect {
	/// Always redirect to this target.
	To(Target),
	/// Compute the target from the matched location; `None` renders normally.
	With(Rc<dyn Fn(&Location) -> Option<Target>>),
}

impl Redirect {
	/// Creates a fixed redirect.
	pub fn to(target: impl Into<Target>) -> Self {
		Self::To(target.into())
	}

	/// Creates a redirect computed from the matched location.
	pub fn with<F>(redirect: F) -> Self
	where
		F: Fn(&Location) -> Option<Target> + 'static,
	{
		Self::With(Rc::new(redirect))
	}

	/// Resolves the redirect for `location`.
	pub fn resolve(&self, location: &Location) -> Option<Target> {
		match self {
			Self::To(target) => Some(target.clone()),
			Self::With(redirect) => redirect(location),
		}
	}
}

impl fmt::Debug for Redirect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::To(target) => f.debug_tuple("Redirect::To").field(target).finish(),
			Self::With(_) => f.write_str("Redirect::With"),
		}
	}
}

/// A caller-declared route.
///
/// Paths may contain `:name` dynamic segments. Relative paths are joined to
/// the parent's path; paths starting with `/` are used as-is.
#[derive(Debug, Clone)]
pub struct RouteSpec {
	pub(crate) path: String,
	pub(crate) name: Option<String>,
	pub(crate) children: Vec<RouteSpec>,
	pub(crate) view: Option<RouteView>,
	pub(crate) redirect: Option<Redirect>,
	pub(crate) guards: Guards,
}

impl RouteSpec {
	/// Creates a route for `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			name: None,
			children: Vec::new(),
			view: None,
			redirect: None,
			guards: Guards::new(),
		}
	}

	/// Names the route for reverse lookups.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Renders `component`; replaces any loader.
	pub fn component(mut self, component: Component) -> Self {
		self.view = Some(RouteView::Component(component));
		self
	}

	/// Loads the route lazily; replaces any component.
	pub fn loader(mut self, loader: Loader) -> Self {
		self.view = Some(RouteView::Loader(loader));
		self
	}

	/// Redirects instead of rendering.
	pub fn redirect(mut self, redirect: Redirect) -> Self {
		self.redirect = Some(redirect);
		self
	}

	/// Sets the nested routes.
	pub fn children(mut self, children: Vec<RouteSpec>) -> Self {
		self.children = children;
		self
	}

	/// Appends one nested route.
	pub fn child(mut self, child: RouteSpec) -> Self {
		self.children.push(child);
		self
	}

	/// Sets all route-tier hooks at once.
	pub fn guards(mut self, guards: Guards) -> Self {
		self.guards = guards;
		self
	}

	/// Sets the route-tier before-enter guard.
	pub fn before_enter(mut self, guard: Guard) -> Self {
		self.guards = self.guards.before_enter(guard);
		self
	}

	/// Sets the route-tier before-update guard.
	pub fn before_update(mut self, guard: Guard) -> Self {
		self.guards = self.guards.before_update(guard);
		self
	}

	/// Sets the route-tier before-leave guard.
	pub fn before_leave(mut self, guard: Guard) -> Self {
		self.guards = self.guards.before_leave(guard);
		self
	}

	/// Sets the route-tier after-enter notification.
	pub fn after_enter<F: Fn(&Transition) + 'static>(mut self, hook: F) -> Self {
		self.guards = self.guards.after_enter(hook);
		self
	}

	/// Sets the route-tier after-update notification.
	pub fn after_update<F: Fn(&Transition) + 'static>(mut self, hook: F) -> Self {
		self.guards = self.guards.after_update(hook);
		self
	}

	/// Sets the route-tier after-leave notification.
	pub fn after_leave<F: Fn(&Transition) + 'static>(mut self, hook: F) -> Self {
		self.guards = self.guards.after_leave(hook);
		self
	}

	/// Declared (possibly relative) path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns `true` when the route has no children.
	pub fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}
}
