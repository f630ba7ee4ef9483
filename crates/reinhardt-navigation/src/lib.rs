//! Nested, guarded client-side navigation for Reinhardt frontends.
//!
//! The engine maps URLs onto a tree of declaratively configured routes,
//! negotiates every navigation through a chain of lifecycle guards, and
//! computes the smallest change to a nested view hierarchy when the active
//! route changes.
//!
//! ## Components
//!
//! - [`codec`]: query-string and path-segment wire format
//! - [`table`]: linked route records with name and path indices
//! - [`matcher`]: URL → route resolution, including lazy routes
//! - [`history`]: cursor-indexed log of committed locations
//! - [`hooks`]: the guard pipeline
//! - [`differ`]: start-level computation between two route chains
//! - [`mode`]: hash and History-API bindings to the address bar
//! - [`router`]: the orchestrator tying it all together
//!
//! The host UI framework plugs in through [`ViewHost`]; the address bar
//! through a [`NavigationMode`].
//!
//! ## Example
//!
//! ```
//! use reinhardt_navigation::{Component, RecordingHost, RouteSpec, Router};
//! use std::rc::Rc;
//!
//! let host = Rc::new(RecordingHost::new());
//! let router = Router::builder(host.clone())
//!     .route(RouteSpec::new("/").component(Component::new("Home")))
//!     .route(RouteSpec::new("/users/:id").name("user").component(Component::new("User")))
//!     .build();
//!
//! router.start().unwrap();
//! router.push("/users/5").unwrap();
//!
//! assert_eq!(router.current().unwrap().path, "/users/:id");
//! assert_eq!(host.live(), vec!["User"]);
//! ```

pub mod codec;
pub mod config;
pub mod differ;
pub mod error;
pub mod history;
pub mod hooks;
pub mod location;
pub mod matcher;
pub mod mode;
pub mod route;
pub mod router;
pub mod table;
pub mod view;

pub use codec::{QueryMap, QueryValue};
pub use config::{ModeKind, RouterOptions};
pub use error::{ConfigError, Result, RouteTableError, RouterError};
pub use hooks::{Advance, Guard, Guards, PipelineState, Transition, Verdict};
pub use location::{Location, RouteRef, Target};
pub use mode::{Browser, HashMode, Html5Mode, MemoryBrowser, NavigationMode};
pub use route::{Component, LoadHandle, Loader, Redirect, RouteSpec};
pub use router::{Router, RouterBuilder};
pub use view::{RecordingHost, ViewEvent, ViewHandle, ViewHost, ViewProps};
