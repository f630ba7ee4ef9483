//! Navigation orchestrator.
//!
//! A navigation moves through these steps:
//!
//! 1. the target is resolved to a URL and a [`Pending`] navigation replaces
//!    whatever was in flight (one navigation wins, the other is dropped
//!    silently);
//! 2. the URL is matched, loading lazy routes on the way; a miss falls back
//!    to the not-found route;
//! 3. the URL is written to the navigation mode, unless it is already
//!    current, and the mode's change notification resumes the navigation;
//! 4. redirects declared on the route are followed;
//! 5. before-leave guards run for the old leaf (only if the path changed),
//!    the chains are diffed, and before-enter (start level) or
//!    before-update (leaf) guards run;
//! 6. history and active state are committed and the view host is patched.
//!
//! The router is single-threaded and reentrant: no state borrow is held
//! while guards, loaders, the navigation mode or the view host run, so any
//! of them may call back into the router.

use crate::codec::QueryMap;
use crate::config::{ModeKind, RouterOptions};
use crate::differ::{DiffPlan, Level, RouteChain, diff_route};
use crate::error::{Result, RouteTableError, RouterError};
use crate::history::HistoryStack;
use crate::hooks::{Advance, Guards, HookKind, Hooks, PipelineState, Transition, Verdict};
use crate::location::{Location, Target};
use crate::matcher::{MatchOutcome, match_url};
use crate::mode::{Browser, HashMode, MemoryBrowser, NavigationMode, history_mode};
use crate::route::{Component, LoadHandle, RouteSpec};
use crate::table::{LinkedRoute, RouteId, RouteTable, normalize_path};
use crate::view::{ViewHandle, ViewHost, patch};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, warn};

/// Redirects one navigation may follow before it is treated as a loop.
const MAX_REDIRECTS: u8 = 16;

type CompleteFn = Box<dyn FnOnce(&Location)>;
type AbortFn = Box<dyn FnOnce()>;

#[derive(Default)]
struct Callbacks {
	on_complete: Option<CompleteFn>,
	on_abort: Option<AbortFn>,
}

/// How the committed location is written into the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Record {
	Push,
	Replace,
	/// Write at `index`. `native_pending` means the router still has to
	/// move the native pointer by `delta` after commit.
	Traverse {
		index: usize,
		delta: isize,
		native_pending: bool,
	},
}

/// How the URL is written to the navigation mode before guards run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlWrite {
	Push,
	Replace,
	None,
}

/// What has already happened to native history for this navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Native {
	Clean,
	Pushed,
	Replaced { previous: String },
	Traversed { delta: isize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
	Matching,
	/// Waiting on the loader of this lazy placeholder.
	Loading(RouteId),
	AwaitingUrl,
	Leave,
	Enter,
}

/// The in-flight navigation.
struct Pending {
	token: u64,
	url: String,
	record: Record,
	write: UrlWrite,
	native: Native,
	stage: Stage,
	step: u64,
	redirects: u8,
	route: Option<RouteId>,
	location: Option<Location>,
	plan: Option<DiffPlan>,
	callbacks: Callbacks,
}

/// The last committed navigation.
struct Active {
	token: u64,
	location: Location,
	from: Option<Location>,
	chain: RouteChain,
	departed: Vec<Level>,
}

#[derive(Default)]
struct State {
	table: RouteTable,
	history: HistoryStack,
	hooks: Hooks,
	active: Option<Active>,
	pending: Option<Pending>,
	next_token: u64,
	started: bool,
}

impl State {
	fn is_current(&self, token: u64) -> bool {
		self.pending.as_ref().is_some_and(|p| p.token == token)
	}

	fn take_pending(&mut self, token: u64) -> Option<Pending> {
		if self.is_current(token) {
			self.pending.take()
		} else {
			None
		}
	}
}

struct RouterInner {
	state: RefCell<State>,
	mode: Rc<dyn NavigationMode>,
	host: Rc<dyn ViewHost>,
	guards: Guards,
	options: RouterOptions,
}

enum UrlChange {
	Ignore,
	Resume(u64),
	Cancel,
	External,
}

/// Handle to a router; clones share the same router.
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl Router {
	/// Starts configuring a router that renders through `host`.
	pub fn builder(host: Rc<dyn ViewHost>) -> RouterBuilder {
		RouterBuilder::new(host)
	}

	fn handle(weak: &Weak<RouterInner>) -> Option<Router> {
		weak.upgrade().map(|inner| Router { inner })
	}

	/// Attaches the view host and starts listening to the navigation mode.
	///
	/// The mode reports the current URL right away, which triggers the
	/// initial navigation.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MountTarget`] when the host cannot attach to
	/// the configured mount target; the router stays stopped.
	pub fn start(&self) -> Result<()> {
		let mount = self.inner.options.mount.clone();
		if !self.inner.host.attach(mount.as_deref()) {
			let target = mount.unwrap_or_else(|| "<default>".to_string());
			error!("mount target {} does not resolve, router not started", target);
			return Err(RouterError::MountTarget(target));
		}

		self.inner.state.borrow_mut().started = true;
		let weak = Rc::downgrade(&self.inner);
		self.inner.mode.start(Rc::new(move || {
			if let Some(router) = Router::handle(&weak) {
				router.on_url_change();
			}
		}));
		Ok(())
	}

	/// Stops listening to URL changes and drops any in-flight navigation.
	pub fn stop(&self) {
		self.inner.mode.stop();
		let mut state = self.inner.state.borrow_mut();
		state.started = false;
		state.pending = None;
		state.hooks.reset();
	}

	/// Navigates to `target`, adding a history entry.
	pub fn push(&self, target: impl Into<Target>) -> Result<()> {
		self.navigate(target.into(), UrlWrite::Push, Callbacks::default())
	}

	/// Navigates to `target`, overwriting the current history entry.
	pub fn replace(&self, target: impl Into<Target>) -> Result<()> {
		self.navigate(target.into(), UrlWrite::Replace, Callbacks::default())
	}

	/// [`Router::push`] with completion callbacks.
	///
	/// Exactly one of the callbacks runs, unless the navigation is
	/// superseded by a newer one or the router is stopped, in which case
	/// neither does. A native URL change that lands back on the current
	/// location while the navigation is pending aborts it.
	pub fn push_with<C, A>(&self, target: impl Into<Target>, on_complete: C, on_abort: A) -> Result<()>
	where
		C: FnOnce(&Location) + 'static,
		A: FnOnce() + 'static,
	{
		let callbacks = Callbacks {
			on_complete: Some(Box::new(on_complete)),
			on_abort: Some(Box::new(on_abort)),
		};
		self.navigate(target.into(), UrlWrite::Push, callbacks)
	}

	/// [`Router::replace`] with completion callbacks.
	pub fn replace_with<C, A>(&self, target: impl Into<Target>, on_complete: C, on_abort: A) -> Result<()>
	where
		C: FnOnce(&Location) + 'static,
		A: FnOnce() + 'static,
	{
		let callbacks = Callbacks {
			on_complete: Some(Box::new(on_complete)),
			on_abort: Some(Box::new(on_abort)),
		};
		self.navigate(target.into(), UrlWrite::Replace, callbacks)
	}

	/// Moves `delta` entries through history.
	///
	/// Does nothing when no entry exists there. Guards run before the
	/// native history pointer moves.
	pub fn go(&self, delta: isize) -> Result<()> {
		let (index, url) = {
			let state = self.inner.state.borrow();
			if !state.started {
				return Err(RouterError::NotStarted);
			}
			match state.history.offset_index(delta) {
				Some(index) if delta != 0 => (index, state.history.entries()[index].url.clone()),
				_ => {
					debug!("go({}) has no history entry to move to", delta);
					return Ok(());
				}
			}
		};

		let record = Record::Traverse {
			index,
			delta,
			native_pending: true,
		};
		let token = self.begin(url, record, UrlWrite::None, Native::Clean, Callbacks::default());
		self.dispatch(token);
		Ok(())
	}

	/// Shorthand for `go(-1)`.
	pub fn back(&self) -> Result<()> {
		self.go(-1)
	}

	/// Shorthand for `go(1)`.
	pub fn forward(&self) -> Result<()> {
		self.go(1)
	}

	/// Builds the URL `target` points at.
	pub fn resolve(&self, target: impl Into<Target>) -> Result<String> {
		self.inner.state.borrow().table.resolve(&target.into())
	}

	/// Builds the URL of the route registered under `name`.
	pub fn reverse(&self, name: &str, params: &QueryMap, query: &QueryMap) -> Result<String> {
		self.inner.state.borrow().table.reverse(name, params, query)
	}

	/// Last committed location.
	pub fn current(&self) -> Option<Location> {
		self.inner.state.borrow().active.as_ref().map(|a| a.location.clone())
	}

	/// Committed history entries, oldest first.
	pub fn history(&self) -> Vec<Location> {
		self.inner.state.borrow().history.entries().to_vec()
	}

	/// Index of the active history entry.
	pub fn cursor(&self) -> Option<usize> {
		self.inner.state.borrow().history.cursor()
	}

	/// Returns `true` while a navigation is in flight.
	pub fn is_pending(&self) -> bool {
		self.inner.state.borrow().pending.is_some()
	}

	/// State of the guard pipeline.
	pub fn pipeline_state(&self) -> PipelineState {
		self.inner.state.borrow().hooks.state()
	}

	/// Host instances of the active chain, root first.
	pub fn mounted_views(&self) -> Vec<ViewHandle> {
		self.inner
			.state
			.borrow()
			.active
			.as_ref()
			.map(|a| a.chain.views())
			.unwrap_or_default()
	}

	/// Route configuration errors reported while building the table.
	pub fn route_errors(&self) -> Vec<RouteTableError> {
		self.inner.state.borrow().table.errors().to_vec()
	}

	/// Returns `true` between a successful [`Router::start`] and [`Router::stop`].
	pub fn is_started(&self) -> bool {
		self.inner.state.borrow().started
	}

	/// Options the router was built with.
	pub fn options(&self) -> &RouterOptions {
		&self.inner.options
	}

	/// Host notification: `view` finished entering.
	pub fn view_entered(&self, view: ViewHandle) {
		self.notify(view, HookKind::AfterEnter);
	}

	/// Host notification: `view` finished updating.
	pub fn view_updated(&self, view: ViewHandle) {
		self.notify(view, HookKind::AfterUpdate);
	}

	/// Host notification: `view` finished leaving.
	pub fn view_left(&self, view: ViewHandle) {
		self.notify(view, HookKind::AfterLeave);
	}

	fn notify(&self, view: ViewHandle, kind: HookKind) {
		let found = {
			let state = self.inner.state.borrow();
			state.active.as_ref().and_then(|active| {
				let level = match kind {
					HookKind::AfterLeave => active.departed.iter().find(|l| l.view == Some(view)),
					_ => active.chain.level_of(view),
				}?;
				let transition = Transition {
					to: active.location.clone(),
					from: active.from.clone(),
				};
				let route_guards = state.table.get(level.route).map(|r| r.guards().clone());
				Some((transition, level.component.clone(), route_guards))
			})
		};
		let Some((transition, component, route_guards)) = found else {
			debug!("{:?} is not rendered by the active navigation", view);
			return;
		};

		let mut hooks = Hooks::new();
		hooks.clear(transition);
		hooks.add_tiers(
			kind,
			[
				component.as_ref().map(Component::guards),
				route_guards.as_ref(),
				Some(&self.inner.guards),
			],
		);
		debug!("running {} {:?} hook(s) for {:?}", hooks.len(), kind, view);
		hooks.drain(|| Advance::new(|_| {}));
	}

	fn navigate(&self, target: Target, write: UrlWrite, callbacks: Callbacks) -> Result<()> {
		let url = {
			let state = self.inner.state.borrow();
			if !state.started {
				return Err(RouterError::NotStarted);
			}
			state.table.resolve(&target)?
		};
		let record = match write {
			UrlWrite::Replace => Record::Replace,
			_ => Record::Push,
		};
		let token = self.begin(url, record, write, Native::Clean, callbacks);
		self.dispatch(token);
		Ok(())
	}

	/// Installs a new pending navigation, superseding the current one.
	///
	/// A router push or replace that supersedes a navigation whose URL is
	/// already written natively takes over that native entry: it writes
	/// with replace semantics and records a push onto a pushed entry, or a
	/// replace of a replaced one. Any other native write of the superseded
	/// navigation is undone once the new one is installed.
	fn begin(
		&self,
		url: String,
		mut record: Record,
		mut write: UrlWrite,
		mut native: Native,
		callbacks: Callbacks,
	) -> u64 {
		let (token, stale) = {
			let mut state = self.inner.state.borrow_mut();
			state.next_token += 1;
			let token = state.next_token;
			let mut stale = None;
			if let Some(previous) = state.pending.take() {
				warn!("navigation to {} superseded by {}", previous.url, url);
				match previous.native {
					Native::Clean => {}
					// The native change that caused this navigation owns the address bar.
					_ if native != Native::Clean => {}
					inherited @ (Native::Pushed | Native::Replaced { .. }) if write != UrlWrite::None => {
						record = match inherited {
							Native::Pushed => Record::Push,
							_ => Record::Replace,
						};
						write = UrlWrite::Replace;
						native = inherited;
					}
					written => stale = Some(written),
				}
			}
			state.hooks.reset();
			debug!("navigation {} to {} ({:?})", token, url, record);
			state.pending = Some(Pending {
				token,
				url,
				record,
				write,
				native,
				stage: Stage::Matching,
				step: 0,
				redirects: 0,
				route: None,
				location: None,
				plan: None,
				callbacks,
			});
			(token, stale)
		};
		if let Some(written) = stale {
			self.restore_native(&written);
		}
		token
	}

	fn dispatch(&self, token: u64) {
		let (outcome, url) = {
			let state = self.inner.state.borrow();
			let Some(pending) = state.pending.as_ref().filter(|p| p.token == token) else {
				return;
			};
			(match_url(&state.table, &pending.url), pending.url.clone())
		};

		match outcome {
			MatchOutcome::Matched(route, location) => self.matched(token, route, location),
			MatchOutcome::Deferred(placeholder) => self.load(token, placeholder),
			MatchOutcome::Missing => self.fall_back(token, &url),
		}
	}

	fn fall_back(&self, token: u64, url: &str) {
		let not_found = normalize_path(&self.inner.options.not_found);
		warn!("no route matches {}, falling back to {}", url, not_found);
		{
			let mut state = self.inner.state.borrow_mut();
			let path = url.split_once('?').map_or(url, |(path, _)| path);
			if normalize_path(path) == not_found {
				error!("not-found route {} is not registered", not_found);
				state.take_pending(token);
				state.hooks.reset();
				return;
			}
			let Some(pending) = state.pending.as_mut().filter(|p| p.token == token) else {
				return;
			};
			pending.url = not_found;
			// A missed URL already in the address bar is swapped for the fallback.
			if pending.write == UrlWrite::None && !matches!(pending.record, Record::Traverse { native_pending: true, .. }) {
				pending.write = UrlWrite::Replace;
			}
		}
		self.dispatch(token);
	}

	fn load(&self, token: u64, placeholder: RouteId) {
		let loader = {
			let mut guard = self.inner.state.borrow_mut();
			let state = &mut *guard;
			let Some(pending) = state.pending.as_mut().filter(|p| p.token == token) else {
				return;
			};
			pending.stage = Stage::Loading(placeholder);
			state.table.begin_load(placeholder)
		};
		let Some(loader) = loader else {
			debug!("route loader already running, waiting for it");
			return;
		};

		let weak = Rc::downgrade(&self.inner);
		loader.load(LoadHandle::new(move |result| {
			if let Some(router) = Router::handle(&weak) {
				router.finish_load(placeholder, result);
			}
		}));
	}

	fn finish_load(&self, placeholder: RouteId, result: Result<RouteSpec, String>) {
		let (waiting, loaded) = {
			let mut state = self.inner.state.borrow_mut();
			let loaded = match result {
				Ok(spec) => state.table.resolve_lazy(placeholder, spec).is_some(),
				Err(reason) => {
					warn!("failed to load lazy route: {}", reason);
					state.table.abandon_load(placeholder);
					false
				}
			};
			let waiting = state
				.pending
				.as_ref()
				.filter(|p| p.stage == Stage::Loading(placeholder))
				.map(|p| (p.token, p.url.clone()));
			(waiting, loaded)
		};

		match waiting {
			Some((token, _)) if loaded => self.dispatch(token),
			Some((token, url)) => self.fall_back(token, &url),
			None => {}
		}
	}

	fn matched(&self, token: u64, route: RouteId, location: Location) {
		let current = self.inner.mode.current();
		let write = {
			let mut guard = self.inner.state.borrow_mut();
			let state = &mut *guard;
			let active_url = state.active.as_ref().map(|a| a.location.url.as_str());
			let Some(pending) = state.pending.as_mut().filter(|p| p.token == token) else {
				return;
			};
			pending.route = Some(route);
			pending.location = Some(location);

			if pending.url == current {
				// Already in the address bar: nothing to write.
				if pending.record == Record::Push && active_url == Some(current.as_str()) {
					pending.record = Record::Replace;
				}
				None
			} else if pending.write == UrlWrite::None {
				None
			} else {
				pending.stage = Stage::AwaitingUrl;
				if pending.native == Native::Clean {
					pending.native = match pending.write {
						UrlWrite::Push => Native::Pushed,
						_ => Native::Replaced {
							previous: current.clone(),
						},
					};
				}
				Some((pending.write, pending.url.clone()))
			}
		};

		match write {
			None => self.set_route(token),
			Some((UrlWrite::Push, url)) => self.inner.mode.push(&url),
			Some((_, url)) => self.inner.mode.replace(&url),
		}
	}

	fn on_url_change(&self) {
		let url = self.inner.mode.current();
		let change = {
			let state = self.inner.state.borrow();
			if !state.started {
				return;
			}
			let at_active = state.active.as_ref().is_some_and(|a| a.location.url == url);
			match &state.pending {
				Some(pending) if pending.url == url => match pending.stage {
					Stage::AwaitingUrl => UrlChange::Resume(pending.token),
					_ => UrlChange::Ignore,
				},
				Some(pending) if at_active && pending.native != Native::Clean => UrlChange::Cancel,
				_ if at_active => UrlChange::Ignore,
				_ => UrlChange::External,
			}
		};

		match change {
			UrlChange::Ignore => {}
			UrlChange::Resume(token) => self.set_route(token),
			UrlChange::Cancel => {
				let pending = {
					let mut state = self.inner.state.borrow_mut();
					state.hooks.reset();
					state.pending.take()
				};
				if let Some(pending) = pending {
					warn!("navigation to {} cancelled by a native URL change", pending.url);
					if let Some(on_abort) = pending.callbacks.on_abort {
						on_abort();
					}
				}
			}
			UrlChange::External => self.external(url),
		}
	}

	/// Runs a URL change the router did not cause through the pipeline.
	fn external(&self, url: String) {
		let (record, native) = {
			let state = self.inner.state.borrow();
			let history = &state.history;
			let step = [-1, 1].into_iter().find_map(|delta| {
				let index = history.offset_index(delta)?;
				(history.entries()[index].url == url).then_some((index, delta))
			});
			match (state.active.is_some(), step) {
				(false, _) => (Record::Push, Native::Clean),
				(true, Some((index, delta))) => (
					Record::Traverse {
						index,
						delta,
						native_pending: false,
					},
					Native::Traversed { delta },
				),
				(true, None) => (Record::Push, Native::Pushed),
			}
		};
		debug!("external URL change to {}", url);
		let token = self.begin(url, record, UrlWrite::None, native, Callbacks::default());
		self.dispatch(token);
	}

	/// Follows route redirects, then queues the before-leave guards.
	///
	/// # Panics
	///
	/// Panics if the matched path has no entry in the route table, which
	/// means the matcher and the table disagree.
	fn set_route(&self, token: u64) {
		let (location, redirect) = {
			let state = self.inner.state.borrow();
			let Some(location) = state
				.pending
				.as_ref()
				.filter(|p| p.token == token)
				.and_then(|p| p.location.clone())
			else {
				return;
			};
			let route = state
				.table
				.by_path(&location.path)
				.unwrap_or_else(|| panic!("matched path {} is not in the route table", location.path));
			let redirect = route.redirect().cloned();
			(location, redirect)
		};

		if let Some(target) = redirect.and_then(|redirect| redirect.resolve(&location)) {
			let pending = {
				let mut state = self.inner.state.borrow_mut();
				let pending = state.take_pending(token);
				state.hooks.reset();
				pending
			};
			if let Some(pending) = pending {
				debug!("{} redirects", location.url);
				self.redirect(pending, target);
			}
			return;
		}

		{
			let mut guard = self.inner.state.borrow_mut();
			let state = &mut *guard;
			let Some(pending) = state.pending.as_mut().filter(|p| p.token == token) else {
				return;
			};
			pending.stage = Stage::Leave;
			state.hooks.clear(Transition {
				to: location.clone(),
				from: state.active.as_ref().map(|a| a.location.clone()),
			});

			if let Some(active) = state.active.as_ref().filter(|a| a.location.path != location.path) {
				let leaf = active.chain.leaf();
				state.hooks.add_tiers(
					HookKind::BeforeLeave,
					[
						leaf.and_then(|l| l.component.as_ref()).map(Component::guards),
						leaf.and_then(|l| state.table.get(l.route)).map(LinkedRoute::guards),
						Some(&self.inner.guards),
					],
				);
			}
		}
		self.run_hooks(token);
	}

	/// Diffs the chains and queues before-enter or before-update guards.
	fn enter(&self, token: u64) {
		{
			let mut guard = self.inner.state.borrow_mut();
			let state = &mut *guard;
			let Some(pending) = state.pending.as_mut().filter(|p| p.token == token) else {
				return;
			};
			let Some(route) = pending.route else {
				return;
			};

			let chain = RouteChain::build(&state.table, route);
			let plan = diff_route(chain, state.active.as_ref().map(|a| &a.chain));
			let (kind, level) = match plan.start {
				Some(start) => (HookKind::BeforeEnter, plan.chain.levels().get(start)),
				None => (HookKind::BeforeUpdate, plan.chain.leaf()),
			};
			state.hooks.add_tiers(
				kind,
				[
					level.and_then(|l| l.component.as_ref()).map(Component::guards),
					level.and_then(|l| state.table.get(l.route)).map(LinkedRoute::guards),
					Some(&self.inner.guards),
				],
			);
			pending.stage = Stage::Enter;
			pending.plan = Some(plan);
		}
		self.run_hooks(token);
	}

	fn run_hooks(&self, token: u64) {
		loop {
			let next = {
				let mut guard = self.inner.state.borrow_mut();
				let state = &mut *guard;
				let Some(pending) = state.pending.as_mut().filter(|p| p.token == token) else {
					return;
				};
				pending.step += 1;
				let step = pending.step;
				state.hooks.next().map(|(hook, transition)| (hook, transition, step))
			};
			let Some((hook, transition, step)) = next else {
				self.stage_drained(token);
				return;
			};

			debug!("navigation {}: invoking {:?}", token, hook);
			let weak = Rc::downgrade(&self.inner);
			let verdict = hook.invoke(&transition, move || {
				Advance::new(move |verdict| {
					if let Some(router) = Router::handle(&weak) {
						router.resume(token, step, verdict);
					}
				})
			});

			match verdict {
				Some(Verdict::Continue) => continue,
				Some(verdict) => return self.halt(token, verdict),
				None => return,
			}
		}
	}

	fn resume(&self, token: u64, step: u64, verdict: Verdict) {
		let live = self
			.inner
			.state
			.borrow()
			.pending
			.as_ref()
			.is_some_and(|p| p.token == token && p.step == step);
		if !live {
			warn!("ignoring advance for navigation {} step {}: no longer waiting", token, step);
			return;
		}
		match verdict {
			Verdict::Continue => self.run_hooks(token),
			verdict => self.halt(token, verdict),
		}
	}

	fn stage_drained(&self, token: u64) {
		let stage = {
			let state = self.inner.state.borrow();
			let Some(pending) = state.pending.as_ref().filter(|p| p.token == token) else {
				return;
			};
			pending.stage
		};
		match stage {
			Stage::Leave => self.enter(token),
			Stage::Enter => self.commit(token),
			_ => {}
		}
	}

	fn commit(&self, token: u64) {
		let committed = {
			let mut guard = self.inner.state.borrow_mut();
			let state = &mut *guard;
			let Some(pending) = state.take_pending(token) else {
				return;
			};
			state.hooks.commit();
			let (Some(location), Some(plan)) = (pending.location, pending.plan) else {
				state.hooks.reset();
				return;
			};

			match pending.record {
				Record::Push => state.history.set_history(location.clone(), None),
				Record::Replace => state.history.replace_history(location.clone()),
				Record::Traverse { index, .. } => state.history.set_history(location.clone(), Some(index)),
			}

			let previous = state.active.take();
			let departed = previous
				.as_ref()
				.map(|a| {
					a.chain
						.levels()
						.iter()
						.filter(|l| l.view.is_some_and(|v| plan.retired.contains(&v)))
						.cloned()
						.collect()
				})
				.unwrap_or_default();
			state.active = Some(Active {
				token,
				location: location.clone(),
				from: previous.map(|a| a.location),
				chain: plan.chain.clone(),
				departed,
			});

			let native_go = match pending.record {
				Record::Traverse {
					delta,
					native_pending: true,
					..
				} => Some(delta),
				_ => None,
			};
			(plan, location, native_go, pending.callbacks)
		};
		let (mut plan, location, native_go, callbacks) = committed;

		patch(self.inner.host.as_ref(), &mut plan, &location);
		{
			let mut state = self.inner.state.borrow_mut();
			if let Some(active) = state.active.as_mut().filter(|a| a.token == token) {
				active.chain = plan.chain;
			}
			if state.pending.is_none() {
				state.hooks.reset();
			}
		}

		if let Some(delta) = native_go
			&& self.inner.mode.current() != location.url
		{
			self.inner.mode.go(delta);
		}

		info!("navigated to {}", location.url);
		if let Some(on_complete) = callbacks.on_complete {
			on_complete(&location);
		}
	}

	fn halt(&self, token: u64, verdict: Verdict) {
		let Some(pending) = self.inner.state.borrow_mut().take_pending(token) else {
			return;
		};
		self.inner.state.borrow_mut().hooks.halt();

		match verdict {
			Verdict::Redirect(target) => self.redirect(pending, target),
			_ => self.abort(pending),
		}
	}

	fn abort(&self, pending: Pending) {
		info!("navigation to {} aborted", pending.url);
		self.restore_native(&pending.native);
		if let Some(on_abort) = pending.callbacks.on_abort {
			on_abort();
		}
	}

	fn restore_native(&self, native: &Native) {
		match native {
			Native::Clean => {}
			Native::Pushed => self.inner.mode.go(-1),
			Native::Replaced { previous } => self.inner.mode.replace(previous),
			Native::Traversed { delta } => self.inner.mode.go(-delta),
		}
	}

	/// Replaces `pending` with a navigation to `target`, keeping its callbacks.
	fn redirect(&self, pending: Pending, target: Target) {
		let redirects = pending.redirects + 1;
		if redirects > MAX_REDIRECTS {
			error!(
				"navigation to {} redirected {} times, aborting redirect loop",
				pending.url, MAX_REDIRECTS
			);
			return self.abort(pending);
		}
		let resolved = self.inner.state.borrow().table.resolve(&target);
		let url = match resolved {
			Ok(url) => url,
			Err(err) => {
				error!("redirect from {} cannot be resolved: {}", pending.url, err);
				return self.abort(pending);
			}
		};
		debug!("redirecting {} to {}", pending.url, url);

		// A URL already written natively is overwritten rather than stacked.
		let (record, write) = match (&pending.native, pending.record) {
			(Native::Clean, Record::Replace) => (Record::Replace, UrlWrite::Replace),
			(Native::Clean, _) => (Record::Push, UrlWrite::Push),
			(_, record) => (record, UrlWrite::Replace),
		};
		let token = self.begin(url, record, write, pending.native, pending.callbacks);
		if let Some(next) = self.inner.state.borrow_mut().pending.as_mut().filter(|p| p.token == token) {
			next.redirects = redirects;
		}
		self.dispatch(token);
	}
}

/// Assembles a [`Router`].
pub struct RouterBuilder {
	host: Rc<dyn ViewHost>,
	routes: Vec<RouteSpec>,
	options: RouterOptions,
	mode: Option<Rc<dyn NavigationMode>>,
	browser: Option<Rc<dyn Browser>>,
	guards: Guards,
}

impl RouterBuilder {
	/// Creates a builder rendering through `host`.
	pub fn new(host: Rc<dyn ViewHost>) -> Self {
		Self {
			host,
			routes: Vec::new(),
			options: RouterOptions::default(),
			mode: None,
			browser: None,
			guards: Guards::new(),
		}
	}

	/// Adds a top-level route.
	pub fn route(mut self, spec: RouteSpec) -> Self {
		self.routes.push(spec);
		self
	}

	/// Adds top-level routes.
	pub fn routes(mut self, specs: impl IntoIterator<Item = RouteSpec>) -> Self {
		self.routes.extend(specs);
		self
	}

	/// Sets the router options.
	pub fn options(mut self, options: RouterOptions) -> Self {
		self.options = options;
		self
	}

	/// Uses `mode` as is, ignoring `options.mode`.
	pub fn mode(mut self, mode: Rc<dyn NavigationMode>) -> Self {
		self.mode = Some(mode);
		self
	}

	/// Builds the mode selected by `options.mode` on top of `browser`.
	pub fn browser(mut self, browser: Rc<dyn Browser>) -> Self {
		self.browser = Some(browser);
		self
	}

	/// Sets the router-tier hooks.
	pub fn guards(mut self, guards: Guards) -> Self {
		self.guards = guards;
		self
	}

	/// Links the routes and wires the collaborators.
	///
	/// A not-found route rendering a `NotFound` component is added when
	/// none is registered at `options.not_found`.
	pub fn build(self) -> Router {
		let mut table = RouteTable::new();
		for spec in self.routes {
			table.add(spec, None);
		}
		let not_found = normalize_path(&self.options.not_found);
		if table.by_path(&not_found).is_none() {
			debug!("adding default not-found route at {}", not_found);
			table.add(RouteSpec::new(not_found).component(Component::new("NotFound")), None);
		}

		let options = self.options;
		let mode = self.mode.unwrap_or_else(|| {
			let browser = self.browser.unwrap_or_else(default_browser);
			let mode: Rc<dyn NavigationMode> = match options.mode {
				ModeKind::Hash => Rc::new(HashMode::with_prefix(browser, options.hash_prefix.clone())),
				ModeKind::History => history_mode(browser, &options.hash_prefix),
			};
			mode
		});

		Router {
			inner: Rc::new(RouterInner {
				state: RefCell::new(State {
					table,
					..State::default()
				}),
				mode,
				host: self.host,
				guards: self.guards,
				options,
			}),
		}
	}
}

#[cfg(target_arch = "wasm32")]
fn default_browser() -> Rc<dyn Browser> {
	match crate::mode::WebBrowser::new() {
		Some(browser) => Rc::new(browser),
		None => Rc::new(MemoryBrowser::new("/")),
	}
}

#[cfg(not(target_arch = "wasm32"))]
fn default_browser() -> Rc<dyn Browser> {
	Rc::new(MemoryBrowser::new("/"))
}
