//! # Reinhardt Navigator
//!
//! Nested, guarded client-side routing for Reinhardt frontends.
//!
//! This crate re-exports the navigation engine from `reinhardt-navigation`
//! and bundles the names most applications need in [`prelude`].
//!
//! ## Architecture
//!
//! - **Route table**: a tree of [`RouteSpec`]s linked into runtime records,
//!   with name and path indices and lazily loaded subtrees
//! - **Guard pipeline**: component, route and router tiers, each able to
//!   continue, abort or redirect a navigation, synchronously or later
//! - **View diffing**: only the levels of the nested view hierarchy that
//!   actually changed are torn down and recreated
//! - **Navigation modes**: fragment URLs, or History API URLs with an
//!   automatic fragment fallback
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_navigator::prelude::*;
//! use std::rc::Rc;
//!
//! let host = Rc::new(RecordingHost::new());
//! let router = Router::builder(host.clone())
//!     .route(RouteSpec::new("/").component(Component::new("Home")))
//!     .route(
//!         RouteSpec::new("/account")
//!             .component(Component::new("Account"))
//!             .before_enter(Guard::immediate(|_| Verdict::redirect("/"))),
//!     )
//!     .build();
//!
//! router.start().unwrap();
//! router.push("/account").unwrap();
//!
//! assert_eq!(router.current().unwrap().path, "/");
//! assert_eq!(host.live(), vec!["Home"]);
//! ```

// Re-export all reinhardt-navigation functionality
pub use reinhardt_navigation::*;

/// Commonly used types.
pub mod prelude {
	pub use reinhardt_navigation::{
		Advance, Component, Guard, Guards, Loader, Location, ModeKind, QueryMap, QueryValue,
		RecordingHost, Redirect, RouteRef, RouteSpec, Router, RouterError, RouterOptions, Target,
		Transition, Verdict, ViewHandle, ViewHost, ViewProps,
	};
}
