//! Fragment-based navigation mode.

use super::{Browser, BrowserEvent, NavigationMode, Subscription, UrlListener};
use std::cell::RefCell;
use std::rc::Rc;

/// Default fragment prefix.
pub(crate) const DEFAULT_PREFIX: &str = "#!";

/// Keeps the router URL in the fragment, after a fixed prefix.
///
/// `https://host/app#!/users/5?tab=posts` reports `/users/5?tab=posts`.
pub struct HashMode {
	browser: Rc<dyn Browser>,
	prefix: String,
	subscription: RefCell<Option<Subscription>>,
}

impl HashMode {
	/// Creates a hash mode with the default `#!` prefix.
	pub fn new(browser: Rc<dyn Browser>) -> Self {
		Self::with_prefix(browser, DEFAULT_PREFIX)
	}

	/// Creates a hash mode with a custom fragment prefix.
	pub fn with_prefix(browser: Rc<dyn Browser>, prefix: impl Into<String>) -> Self {
		let mut prefix = prefix.into();
		if !prefix.starts_with('#') {
			prefix.insert(0, '#');
		}
		Self {
			browser,
			prefix,
			subscription: RefCell::new(None),
		}
	}

	/// Fragment prefix, including `#`.
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	fn fragment(&self, url: &str) -> String {
		format!("{}{}", self.prefix, url)
	}
}

impl NavigationMode for HashMode {
	fn start(&self, listener: UrlListener) {
		self.stop();
		let subscription = self
			.browser
			.subscribe(BrowserEvent::HashChange, Rc::clone(&listener));
		*self.subscription.borrow_mut() = Some(subscription);
		tracing::debug!("hash mode started with prefix {}", self.prefix);
		listener();
	}

	fn stop(&self) {
		if let Some(subscription) = self.subscription.borrow_mut().take() {
			self.browser.unsubscribe(subscription);
		}
	}

	fn push(&self, url: &str) {
		self.browser.set_hash(&self.fragment(url));
	}

	fn replace(&self, url: &str) {
		self.browser.replace_hash(&self.fragment(url));
	}

	fn go(&self, delta: isize) {
		self.browser.go(delta);
	}

	fn current(&self) -> String {
		self.browser
			.hash()
			.strip_prefix(self.prefix.as_str())
			.filter(|url| !url.is_empty())
			.map(str::to_string)
			.unwrap_or_else(|| "/".to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mode::MemoryBrowser;
	use rstest::rstest;
	use std::cell::Cell;

	fn counter() -> (Rc<Cell<usize>>, UrlListener) {
		let count = Rc::new(Cell::new(0));
		let sink = Rc::clone(&count);
		(count, Rc::new(move || sink.set(sink.get() + 1)))
	}

	#[rstest]
	fn test_start_notifies_synchronously() {
		let browser = Rc::new(MemoryBrowser::new("/app"));
		let mode = HashMode::new(browser);
		let (count, listener) = counter();

		mode.start(listener);

		assert_eq!(count.get(), 1);
		assert_eq!(mode.current(), "/");
	}

	#[rstest]
	fn test_push_writes_prefixed_fragment() {
		let browser = Rc::new(MemoryBrowser::new("/app"));
		let mode = HashMode::new(browser.clone());
		let (count, listener) = counter();
		mode.start(listener);

		mode.push("/users/5?tab=posts");

		assert_eq!(browser.hash(), "#!/users/5?tab=posts");
		assert_eq!(mode.current(), "/users/5?tab=posts");
		assert_eq!(count.get(), 2);
	}

	#[rstest]
	fn test_same_fragment_does_not_notify() {
		let browser = Rc::new(MemoryBrowser::new("/app#!/a"));
		let mode = HashMode::new(browser.clone());
		let (count, listener) = counter();
		mode.start(listener);

		mode.push("/a");

		assert_eq!(count.get(), 1);
		assert_eq!(browser.len(), 1);
	}

	#[rstest]
	fn test_stop_unsubscribes() {
		let browser = Rc::new(MemoryBrowser::new("/app"));
		let mode = HashMode::with_prefix(browser, "!");
		let (count, listener) = counter();
		mode.start(listener);

		mode.stop();
		mode.push("/b");

		assert_eq!(mode.prefix(), "#!");
		assert_eq!(mode.current(), "/b");
		assert_eq!(count.get(), 1);
	}

	#[rstest]
	fn test_replace_and_go() {
		let browser = Rc::new(MemoryBrowser::new("/app"));
		let mode = HashMode::new(browser.clone());
		mode.push("/a");
		mode.push("/b");
		mode.replace("/c");

		assert_eq!(browser.len(), 3);
		mode.go(-1);
		assert_eq!(mode.current(), "/a");
	}
}
