//! `window`-backed [`Browser`] for `wasm32` targets.

use super::{Browser, BrowserEvent, Subscription, UrlListener};
use std::cell::{Cell, RefCell};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Event;

type EventClosure = Closure<dyn FnMut(Event)>;

/// Session-history primitives of the current browsing context.
pub struct WebBrowser {
	window: web_sys::Window,
	listeners: RefCell<Vec<(Subscription, BrowserEvent, EventClosure)>>,
	next_id: Cell<u64>,
}

impl WebBrowser {
	/// Binds to the global `window`; `None` outside a browsing context.
	pub fn new() -> Option<Self> {
		let window = web_sys::window()?;
		Some(Self {
			window,
			listeners: RefCell::new(Vec::new()),
			next_id: Cell::new(0),
		})
	}

	fn location_part(&self, read: impl Fn(&web_sys::Location) -> Result<String, JsValue>) -> String {
		read(&self.window.location()).unwrap_or_default()
	}
}

impl Browser for WebBrowser {
	fn location(&self) -> String {
		let path = self.location_part(|l| l.pathname());
		let search = self.location_part(|l| l.search());
		format!("{}{}", path, search)
	}

	fn hash(&self) -> String {
		self.location_part(|l| l.hash())
	}

	fn set_hash(&self, hash: &str) {
		if let Err(err) = self.window.location().set_hash(hash) {
			tracing::warn!("failed to set location hash: {:?}", err);
		}
	}

	fn replace_hash(&self, hash: &str) {
		let url = format!("{}{}", self.location(), hash);
		if let Err(err) = self.window.location().replace(&url) {
			tracing::warn!("failed to replace location: {:?}", err);
		}
	}

	fn push_state(&self, url: &str) {
		let result = self
			.window
			.history()
			.and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(url)));
		if let Err(err) = result {
			tracing::warn!("pushState failed: {:?}", err);
		}
	}

	fn replace_state(&self, url: &str) {
		let result = self
			.window
			.history()
			.and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(url)));
		if let Err(err) = result {
			tracing::warn!("replaceState failed: {:?}", err);
		}
	}

	fn go(&self, delta: isize) {
		let result = self
			.window
			.history()
			.and_then(|history| history.go_with_delta(delta as i32));
		if let Err(err) = result {
			tracing::warn!("history.go failed: {:?}", err);
		}
	}

	fn supports_history(&self) -> bool {
		self.window.history().is_ok()
	}

	fn subscribe(&self, event: BrowserEvent, listener: UrlListener) -> Subscription {
		let subscription = Subscription(self.next_id.get());
		self.next_id.set(subscription.0 + 1);

		let closure = Closure::wrap(Box::new(move |_event: Event| listener()) as Box<dyn FnMut(_)>);
		if let Err(err) = self
			.window
			.add_event_listener_with_callback(event.name(), closure.as_ref().unchecked_ref())
		{
			tracing::warn!("failed to listen for {}: {:?}", event.name(), err);
		}
		self.listeners.borrow_mut().push((subscription, event, closure));
		subscription
	}

	fn unsubscribe(&self, subscription: Subscription) {
		let mut listeners = self.listeners.borrow_mut();
		let Some(position) = listeners.iter().position(|(id, _, _)| *id == subscription) else {
			return;
		};
		let (_, event, closure) = listeners.remove(position);
		if let Err(err) = self
			.window
			.remove_event_listener_with_callback(event.name(), closure.as_ref().unchecked_ref())
		{
			tracing::warn!("failed to stop listening for {}: {:?}", event.name(), err);
		}
	}
}

impl Drop for WebBrowser {
	fn drop(&mut self) {
		let subscriptions: Vec<Subscription> = self.listeners.borrow().iter().map(|(id, _, _)| *id).collect();
		for subscription in subscriptions {
			self.unsubscribe(subscription);
		}
	}
}
