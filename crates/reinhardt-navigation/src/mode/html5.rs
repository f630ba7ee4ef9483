//! History-API navigation mode.

use super::hash::HashMode;
use super::{Browser, BrowserEvent, NavigationMode, Subscription, UrlListener};
use std::cell::RefCell;
use std::rc::Rc;

/// Keeps the router URL in the path, using `pushState` and `popstate`.
///
/// `pushState` emits no event, so pushes and replaces notify the listener
/// directly; traversals are reported by the browser's `popstate`.
pub struct Html5Mode {
	browser: Rc<dyn Browser>,
	listener: RefCell<Option<UrlListener>>,
	subscription: RefCell<Option<Subscription>>,
}

impl Html5Mode {
	/// Creates a History-API mode over `browser`.
	pub fn new(browser: Rc<dyn Browser>) -> Self {
		Self {
			browser,
			listener: RefCell::new(None),
			subscription: RefCell::new(None),
		}
	}

	fn notify(&self) {
		let listener = self.listener.borrow().clone();
		if let Some(listener) = listener {
			listener();
		}
	}
}

/// History-API mode when `browser` supports it, hash mode with
/// `hash_prefix` otherwise.
pub fn history_mode(browser: Rc<dyn Browser>, hash_prefix: &str) -> Rc<dyn NavigationMode> {
	if browser.supports_history() {
		Rc::new(Html5Mode::new(browser))
	} else {
		tracing::warn!("History API unavailable, falling back to hash mode");
		Rc::new(HashMode::with_prefix(browser, hash_prefix))
	}
}

impl NavigationMode for Html5Mode {
	fn start(&self, listener: UrlListener) {
		self.stop();
		let subscription = self
			.browser
			.subscribe(BrowserEvent::PopState, Rc::clone(&listener));
		*self.subscription.borrow_mut() = Some(subscription);
		*self.listener.borrow_mut() = Some(listener);
		tracing::debug!("history mode started");
		self.notify();
	}

	fn stop(&self) {
		if let Some(subscription) = self.subscription.borrow_mut().take() {
			self.browser.unsubscribe(subscription);
		}
		self.listener.borrow_mut().take();
	}

	fn push(&self, url: &str) {
		self.browser.push_state(url);
		self.notify();
	}

	fn replace(&self, url: &str) {
		self.browser.replace_state(url);
		self.notify();
	}

	fn go(&self, delta: isize) {
		self.browser.go(delta);
	}

	fn current(&self) -> String {
		self.browser.location()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mode::MemoryBrowser;
	use rstest::rstest;
	use std::cell::Cell;

	fn recorder(mode: &Rc<Html5Mode>) -> Rc<RefCell<Vec<String>>> {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		let weak = Rc::downgrade(mode);
		mode.start(Rc::new(move || {
			if let Some(mode) = weak.upgrade() {
				sink.borrow_mut().push(mode.current());
			}
		}));
		seen
	}

	#[rstest]
	fn test_push_notifies_with_new_url() {
		let browser = Rc::new(MemoryBrowser::new("/"));
		let mode = Rc::new(Html5Mode::new(browser.clone()));
		let seen = recorder(&mode);

		mode.push("/a?x=1");
		mode.replace("/b");

		assert_eq!(*seen.borrow(), vec!["/", "/a?x=1", "/b"]);
		assert_eq!(browser.len(), 2);
	}

	#[rstest]
	fn test_traversal_reported_through_popstate() {
		let browser = Rc::new(MemoryBrowser::new("/"));
		let mode = Rc::new(Html5Mode::new(browser.clone()));
		mode.push("/a");
		let seen = recorder(&mode);

		browser.back();

		assert_eq!(*seen.borrow(), vec!["/a", "/"]);
	}

	#[rstest]
	fn test_stopped_mode_is_silent() {
		let browser = Rc::new(MemoryBrowser::new("/"));
		let mode = Html5Mode::new(browser.clone());
		let count = Rc::new(Cell::new(0));
		let sink = Rc::clone(&count);
		mode.start(Rc::new(move || sink.set(sink.get() + 1)));

		mode.stop();
		mode.push("/a");
		browser.back();

		assert_eq!(count.get(), 1);
	}

	#[rstest]
	#[case(true, "#!", "/a", "")]
	#[case(false, "#!", "/", "#!/a")]
	#[case(false, "#", "/", "#/a")]
	fn test_history_mode_fallback(
		#[case] supported: bool,
		#[case] prefix: &str,
		#[case] location: &str,
		#[case] hash: &str,
	) {
		let browser = Rc::new(if supported {
			MemoryBrowser::new("/")
		} else {
			MemoryBrowser::without_history("/")
		});
		let mode = history_mode(browser.clone(), prefix);

		mode.push("/a");

		assert_eq!(mode.current(), "/a");
		assert_eq!(browser.location(), location);
		assert_eq!(browser.hash(), hash);
	}
}
