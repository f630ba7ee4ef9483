//! Navigation modes: how the router reads and writes the browser URL.
//!
//! A [`NavigationMode`] is the only thing the router knows about the
//! address bar. Modes sit on top of a [`Browser`], the minimal set of
//! session-history primitives; [`MemoryBrowser`] provides them in-process
//! and, on `wasm32`, `WebBrowser` binds them to `window`.
//!
//! | Mode | URL lives in | Change notification |
//! |------|--------------|---------------------|
//! | [`HashMode`] | fragment after a prefix (`#!/users/5`) | `hashchange` |
//! | [`Html5Mode`] | path and search (`/users/5`) | `popstate` |

mod hash;
mod html5;
mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

pub use hash::HashMode;
pub use html5::{Html5Mode, history_mode};
pub use memory::MemoryBrowser;
#[cfg(target_arch = "wasm32")]
pub use web::WebBrowser;

use std::rc::Rc;

/// Callback invoked whenever the URL a mode reports may have changed.
pub type UrlListener = Rc<dyn Fn()>;

/// Strategy binding the router to URL and history primitives.
///
/// Implementations may notify synchronously from inside `push`, `replace`
/// or `go`; the router is reentrant with respect to its mode.
pub trait NavigationMode {
	/// Begins reporting URL changes to `listener`.
	fn start(&self, listener: UrlListener);

	/// Stops reporting URL changes.
	fn stop(&self);

	/// Records `url` as a new history entry.
	fn push(&self, url: &str);

	/// Overwrites the current history entry with `url`.
	fn replace(&self, url: &str);

	/// Moves the native history pointer by `delta`.
	fn go(&self, delta: isize);

	/// URL (path plus search) the mode currently reports.
	fn current(&self) -> String;
}

/// Session-history event kinds a [`Browser`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserEvent {
	/// The fragment changed.
	HashChange,
	/// The active history entry changed through traversal.
	PopState,
}

impl BrowserEvent {
	/// DOM event name.
	pub fn name(self) -> &'static str {
		match self {
			Self::HashChange => "hashchange",
			Self::PopState => "popstate",
		}
	}
}

/// Handle returned by [`Browser::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub(crate) u64);

/// Session-history primitives of a browsing context.
pub trait Browser {
	/// Path plus search of the active entry.
	fn location(&self) -> String;

	/// Fragment of the active entry, including its `#`, or empty.
	fn hash(&self) -> String;

	/// Navigates to a new fragment, creating a history entry.
	fn set_hash(&self, hash: &str);

	/// Swaps the fragment of the active entry in place.
	fn replace_hash(&self, hash: &str);

	/// Adds a history entry for `url` without any event.
	fn push_state(&self, url: &str);

	/// Rewrites the active entry to `url` without any event.
	fn replace_state(&self, url: &str);

	/// Traverses session history by `delta`.
	fn go(&self, delta: isize);

	/// Returns `true` when the History API is available.
	fn supports_history(&self) -> bool;

	/// Registers `listener` for `event`.
	fn subscribe(&self, event: BrowserEvent, listener: UrlListener) -> Subscription;

	/// Removes a listener registered through [`Browser::subscribe`].
	fn unsubscribe(&self, subscription: Subscription);
}
