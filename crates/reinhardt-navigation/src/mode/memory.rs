//! In-process session history.

use super::{Browser, BrowserEvent, Subscription, UrlListener};
use std::cell::{Cell, RefCell};

/// Browser stand-in keeping session history in memory.
///
/// Events are delivered synchronously, from inside the call that caused
/// them. Fragment navigations to the current fragment are ignored, as in a
/// real browser.
pub struct MemoryBrowser {
	entries: RefCell<Vec<String>>,
	index: Cell<usize>,
	history_api: bool,
	listeners: RefCell<Vec<(Subscription, BrowserEvent, UrlListener)>>,
	next_id: Cell<u64>,
}

impl MemoryBrowser {
	/// Creates a browser whose only entry is `url`.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			entries: RefCell::new(vec![url.into()]),
			index: Cell::new(0),
			history_api: true,
			listeners: RefCell::new(Vec::new()),
			next_id: Cell::new(0),
		}
	}

	/// Creates a browser that reports no History API support.
	pub fn without_history(url: impl Into<String>) -> Self {
		Self {
			history_api: false,
			..Self::new(url)
		}
	}

	/// Full URL (including fragment) of the active entry.
	pub fn url(&self) -> String {
		self.entries.borrow()[self.index.get()].clone()
	}

	/// All entries, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.entries.borrow().clone()
	}

	/// Index of the active entry.
	pub fn index(&self) -> usize {
		self.index.get()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Returns `true` if there are no entries, which never happens.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	/// Simulates the back button.
	pub fn back(&self) {
		self.go(-1);
	}

	/// Simulates the forward button.
	pub fn forward(&self) {
		self.go(1);
	}

	/// Simulates typing a new fragment into the address bar.
	pub fn visit_hash(&self, hash: &str) {
		self.set_hash(hash);
	}

	fn split(url: &str) -> (&str, &str) {
		match url.find('#') {
			Some(at) => url.split_at(at),
			None => (url, ""),
		}
	}

	fn push_entry(&self, url: String) {
		let next = self.index.get() + 1;
		let mut entries = self.entries.borrow_mut();
		entries.truncate(next);
		entries.push(url);
		self.index.set(next);
	}

	fn replace_entry(&self, url: String) {
		self.entries.borrow_mut()[self.index.get()] = url;
	}

	fn emit(&self, event: BrowserEvent) {
		let listeners: Vec<UrlListener> = self
			.listeners
			.borrow()
			.iter()
			.filter(|(_, kind, _)| *kind == event)
			.map(|(_, _, listener)| listener.clone())
			.collect();
		for listener in listeners {
			listener();
		}
	}
}

impl Browser for MemoryBrowser {
	fn location(&self) -> String {
		let url = self.url();
		Self::split(&url).0.to_string()
	}

	fn hash(&self) -> String {
		let url = self.url();
		Self::split(&url).1.to_string()
	}

	fn set_hash(&self, hash: &str) {
		if self.hash() == hash {
			return;
		}
		self.push_entry(format!("{}{}", self.location(), hash));
		self.emit(BrowserEvent::PopState);
		self.emit(BrowserEvent::HashChange);
	}

	fn replace_hash(&self, hash: &str) {
		if self.hash() == hash {
			return;
		}
		self.replace_entry(format!("{}{}", self.location(), hash));
		self.emit(BrowserEvent::HashChange);
	}

	fn push_state(&self, url: &str) {
		self.push_entry(url.to_string());
	}

	fn replace_state(&self, url: &str) {
		self.replace_entry(url.to_string());
	}

	fn go(&self, delta: isize) {
		let Some(target) = self
			.index
			.get()
			.checked_add_signed(delta)
			.filter(|target| *target < self.len())
		else {
			return;
		};
		if delta == 0 {
			return;
		}

		let before = self.hash();
		self.index.set(target);
		self.emit(BrowserEvent::PopState);
		if self.hash() != before {
			self.emit(BrowserEvent::HashChange);
		}
	}

	fn supports_history(&self) -> bool {
		self.history_api
	}

	fn subscribe(&self, event: BrowserEvent, listener: UrlListener) -> Subscription {
		let subscription = Subscription(self.next_id.get());
		self.next_id.set(subscription.0 + 1);
		self.listeners.borrow_mut().push((subscription, event, listener));
		subscription
	}

	fn unsubscribe(&self, subscription: Subscription) {
		self.listeners.borrow_mut().retain(|(id, _, _)| *id != subscription);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::rc::Rc;

	fn log(browser: &MemoryBrowser) -> Rc<RefCell<Vec<BrowserEvent>>> {
		let events = Rc::new(RefCell::new(Vec::new()));
		for kind in [BrowserEvent::PopState, BrowserEvent::HashChange] {
			let sink = Rc::clone(&events);
			browser.subscribe(kind, Rc::new(move || sink.borrow_mut().push(kind)));
		}
		events
	}

	#[rstest]
	fn test_push_state_is_silent_and_truncates() {
		let browser = MemoryBrowser::new("/");
		let events = log(&browser);

		browser.push_state("/a");
		browser.push_state("/b");
		browser.back();
		browser.push_state("/c");

		assert_eq!(browser.entries(), vec!["/", "/a", "/c"]);
		assert_eq!(*events.borrow(), vec![BrowserEvent::PopState]);
	}

	#[rstest]
	fn test_hash_navigation_events() {
		let browser = MemoryBrowser::new("/app");
		let events = log(&browser);

		browser.set_hash("#x");
		browser.set_hash("#x");
		browser.replace_hash("#y");

		assert_eq!(browser.entries(), vec!["/app", "/app#y"]);
		assert_eq!(
			*events.borrow(),
			vec![
				BrowserEvent::PopState,
				BrowserEvent::HashChange,
				BrowserEvent::HashChange,
			]
		);
	}

	#[rstest]
	#[case(-1, 1)]
	#[case(1, 2)]
	#[case(-5, 2)]
	#[case(5, 2)]
	#[case(0, 2)]
	fn test_go_stays_in_bounds(#[case] delta: isize, #[case] expected: usize) {
		let browser = MemoryBrowser::new("/");
		browser.push_state("/a");
		browser.push_state("/b");

		browser.go(delta);

		assert_eq!(browser.index(), expected);
	}

	#[rstest]
	fn test_traversal_across_fragments_emits_hashchange() {
		let browser = MemoryBrowser::new("/app");
		browser.set_hash("#!/a");
		let events = log(&browser);

		browser.back();

		assert_eq!(browser.hash(), "");
		assert_eq!(
			*events.borrow(),
			vec![BrowserEvent::PopState, BrowserEvent::HashChange]
		);
	}

	#[rstest]
	fn test_unsubscribe() {
		let browser = MemoryBrowser::new("/");
		let count = Rc::new(Cell::new(0));
		let sink = Rc::clone(&count);
		let subscription = browser.subscribe(BrowserEvent::PopState, Rc::new(move || sink.set(sink.get() + 1)));
		browser.push_state("/a");

		browser.unsubscribe(subscription);
		browser.back();

		assert_eq!(count.get(), 0);
		assert!(!MemoryBrowser::without_history("/").supports_history());
	}
}
