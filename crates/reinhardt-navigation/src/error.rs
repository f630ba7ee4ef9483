//! Error types for the navigation engine.
//!
//! Guard aborts and redirects are not errors; they travel as
//! [`Verdict`](crate::hooks::Verdict) values through the guard pipeline.

use thiserror::Error;

/// Result type for router operations.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// Errors surfaced synchronously by navigation calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// No route is registered under the given name.
	#[error("unknown route name: {0}")]
	UnknownRouteName(String),

	/// A named-route target did not supply a value for a dynamic segment.
	#[error("route '{route}' requires parameter '{param}'")]
	MissingParameter {
		/// Route name.
		route: String,
		/// Missing parameter name.
		param: String,
	},

	/// A named-route target supplied a parameter value with no wire form.
	#[error("parameter '{param}' of route '{route}' cannot be written into a path")]
	UnencodableParameter {
		/// Route name.
		route: String,
		/// Parameter name.
		param: String,
	},

	/// The view host could not attach to the configured mount target.
	#[error("mount target '{0}' does not resolve to an element")]
	MountTarget(String),

	/// The router was asked to navigate before `start` succeeded.
	#[error("router has not been started")]
	NotStarted,
}

/// Configuration errors detected while building the route table.
///
/// These are reported and retained, never fatal: the offending route is
/// simply not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouteTableError {
	/// Two leaf routes declare the same name.
	#[error("duplicate route name '{name}' (already bound to {existing})")]
	DuplicateName {
		/// Colliding name.
		name: String,
		/// Path the name is already bound to.
		existing: String,
	},

	/// Two leaf routes normalize to the same path.
	#[error("duplicate route path: {0}")]
	DuplicatePath(String),

	/// A leaf route declares neither a component, a loader nor a redirect.
	#[error("leaf route {0} has no component, loader or redirect")]
	MissingView(String),

	/// A route with children declares a loader.
	#[error("route {0} has children and cannot be lazily loaded")]
	LoaderOnBranch(String),
}

/// Errors raised while loading [`RouterOptions`](crate::config::RouterOptions).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
	/// The TOML document could not be parsed.
	#[error("invalid router options (toml): {0}")]
	Toml(#[from] toml::de::Error),

	/// The JSON document could not be parsed.
	#[error("invalid router options (json): {0}")]
	Json(#[from] serde_json::Error),
}
