//! Seam to the host UI framework.
//!
//! The router never renders anything itself. After a navigation commits it
//! patches the host's view tree through three primitives: create, update
//! and destroy.

use crate::differ::DiffPlan;
use crate::location::Location;
use crate::route::Component;
use std::cell::{Cell, RefCell};

/// Opaque identifier of a host view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewHandle(u64);

impl ViewHandle {
	/// Wraps a host-chosen id.
	pub fn new(id: u64) -> Self {
		Self(id)
	}

	/// Host-chosen id.
	pub fn id(self) -> u64 {
		self.0
	}
}

/// Properties handed to a view for one level of the active chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewProps {
	/// Committed location.
	pub location: Location,
	/// Normalized path of the route rendered at this level.
	pub path: String,
	/// Level index, root is `0`.
	pub depth: usize,
	/// Old instance whose slot a newly created start view takes over.
	pub replaces: Option<ViewHandle>,
}

/// Host UI framework operations used by the router.
pub trait ViewHost {
	/// Binds the host to its mount target; `false` means it does not resolve.
	fn attach(&self, mount: Option<&str>) -> bool {
		let _ = mount;
		true
	}

	/// Instantiates `component`.
	fn create(&self, component: &Component, props: &ViewProps) -> ViewHandle;

	/// Pushes new props into a live instance.
	fn update(&self, view: ViewHandle, props: &ViewProps);

	/// Tears an instance down.
	fn destroy(&self, view: ViewHandle);
}

/// Applies `plan` to the host.
///
/// Levels above the start are updated, levels at or below it are created
/// top-down, and retired instances are destroyed last, deepest first.
pub fn patch(host: &dyn ViewHost, plan: &mut DiffPlan, location: &Location) {
	let start = plan.start;
	let mut replaces = plan.replaced;

	for (depth, level) in plan.chain.levels_mut().iter_mut().enumerate() {
		let mut props = ViewProps {
			location: location.clone(),
			path: level.path.clone(),
			depth,
			replaces: None,
		};

		if start.is_none_or(|start| depth < start) {
			if let Some(view) = level.view {
				host.update(view, &props);
			}
			continue;
		}

		if let Some(component) = &level.component {
			props.replaces = replaces.take();
			level.view = Some(host.create(component, &props));
		}
	}

	for view in &plan.retired {
		host.destroy(*view);
	}
}

/// Call recorded by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
	/// An instance was created.
	Create {
		/// Component name.
		component: String,
		/// New instance.
		view: ViewHandle,
		/// URL it was created for.
		url: String,
	},
	/// An instance received new props.
	Update {
		/// Updated instance.
		view: ViewHandle,
		/// URL of the new props.
		url: String,
	},
	/// An instance was torn down.
	Destroy {
		/// Destroyed instance.
		view: ViewHandle,
	},
}

/// Headless host that numbers instances and records every call.
#[derive(Debug)]
pub struct RecordingHost {
	next: Cell<u64>,
	events: RefCell<Vec<ViewEvent>>,
	live: RefCell<Vec<(ViewHandle, String)>>,
	mountable: bool,
}

impl Default for RecordingHost {
	fn default() -> Self {
		Self {
			next: Cell::new(1),
			events: RefCell::default(),
			live: RefCell::default(),
			mountable: true,
		}
	}
}

impl RecordingHost {
	/// Creates a host whose mount target always resolves.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a host whose mount target never resolves.
	pub fn unmountable() -> Self {
		Self {
			mountable: false,
			..Self::default()
		}
	}

	/// Calls recorded so far.
	pub fn events(&self) -> Vec<ViewEvent> {
		self.events.borrow().clone()
	}

	/// Returns and clears the recorded calls.
	pub fn take_events(&self) -> Vec<ViewEvent> {
		std::mem::take(&mut *self.events.borrow_mut())
	}

	/// Names of the components of live instances, in creation order.
	pub fn live(&self) -> Vec<String> {
		self.live.borrow().iter().map(|(_, name)| name.clone()).collect()
	}
}

impl ViewHost for RecordingHost {
	fn attach(&self, _mount: Option<&str>) -> bool {
		self.mountable
	}

	fn create(&self, component: &Component, props: &ViewProps) -> ViewHandle {
		let view = ViewHandle::new(self.next.get());
		self.next.set(view.id() + 1);
		self.live.borrow_mut().push((view, component.name().to_string()));
		self.events.borrow_mut().push(ViewEvent::Create {
			component: component.name().to_string(),
			view,
			url: props.location.url.clone(),
		});
		view
	}

	fn update(&self, view: ViewHandle, props: &ViewProps) {
		self.events.borrow_mut().push(ViewEvent::Update {
			view,
			url: props.location.url.clone(),
		});
	}

	fn destroy(&self, view: ViewHandle) {
		self.live.borrow_mut().retain(|(live, _)| *live != view);
		self.events.borrow_mut().push(ViewEvent::Destroy { view });
	}
}
