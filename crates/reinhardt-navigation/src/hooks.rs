//! Guard pipeline.
//!
//! Every navigation step queues exactly three hooks in fixed priority order
//! (component tier, route tier, router tier) and drains them front to back.
//!
//! - A **guard** (`before-*`) decides the fate of the transition. Immediate
//!   guards return a [`Verdict`]; deferred guards receive an [`Advance`]
//!   handle and may answer later, which is how asynchronous confirmation
//!   and cancellation are expressed.
//! - A **notification** (`after-*`) cannot veto; the pipeline advances on
//!   its own right after calling it.
//!
//! A verdict means exactly one thing:
//!
//! | Verdict | Effect |
//! |---------|--------|
//! | `Continue` | run the next hook, or finish the step when the queue is empty |
//! | `Abort` | cancel the in-flight navigation and fall back to the last stable location |
//! | `Redirect(target)` | cancel the in-flight navigation and push `target` instead |

use crate::location::{Location, Target};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Outcome of a guard.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
	/// Proceed with the transition.
	Continue,
	/// Cancel the transition and stay where we are.
	Abort,
	/// Cancel the transition and navigate elsewhere.
	Redirect(Target),
}

impl Verdict {
	/// Shorthand for [`Verdict::Redirect`].
	pub fn redirect(target: impl Into<Target>) -> Self {
		Self::Redirect(target.into())
	}
}

/// The `to`/`from` pair of the transition being guarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
	/// Location being navigated to.
	pub to: Location,
	/// Last stable location, if any navigation has completed yet.
	pub from: Option<Location>,
}

/// Consume-once continuation handed to deferred guards.
///
/// Every method takes `self`, so a guard can answer at most once. Dropping
/// the handle without answering leaves the navigation stalled until another
/// navigation supersedes it.
pub struct Advance {
	resume: Box<dyn FnOnce(Verdict)>,
}

impl Advance {
	/// Wraps a continuation.
	pub fn new<F>(resume: F) -> Self
	where
		F: FnOnce(Verdict) + 'static,
	{
		Self {
			resume: Box::new(resume),
		}
	}

	/// Answers with an explicit verdict.
	pub fn resolve(self, verdict: Verdict) {
		(self.resume)(verdict)
	}

	/// Continues to the next hook.
	pub fn proceed(self) {
		self.resolve(Verdict::Continue)
	}

	/// Cancels the transition.
	pub fn abort(self) {
		self.resolve(Verdict::Abort)
	}

	/// Cancels the transition and navigates to `target`.
	pub fn redirect(self, target: impl Into<Target>) {
		self.resolve(Verdict::redirect(target))
	}
}

impl fmt::Debug for Advance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Advance").finish_non_exhaustive()
	}
}

/// A `before-*` lifecycle callback.
#[derive(Clone)]
pub enum Guard {
	/// Answers synchronously.
	Immediate(Rc<dyn Fn(&Transition) -> Verdict>),
	/// Answers through an [`Advance`] handle, possibly later.
	Deferred(Rc<dyn Fn(&Transition, Advance)>),
}

impl Guard {
	/// Creates a guard that answers synchronously.
	pub fn immediate<F>(guard: F) -> Self
	where
		F: Fn(&Transition) -> Verdict + 'static,
	{
		Self::Immediate(Rc::new(guard))
	}

	/// Creates a guard that answers through an [`Advance`] handle.
	pub fn deferred<F>(guard: F) -> Self
	where
		F: Fn(&Transition, Advance) + 'static,
	{
		Self::Deferred(Rc::new(guard))
	}
}

impl fmt::Debug for Guard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Immediate(_) => f.write_str("Guard::Immediate"),
			Self::Deferred(_) => f.write_str("Guard::Deferred"),
		}
	}
}

/// An `after-*` lifecycle callback.
pub type AfterHook = Rc<dyn Fn(&Transition)>;

/// The six lifecycle hook slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
	/// Before a new start route is entered.
	BeforeEnter,
	/// After a newly created view reports it is mounted.
	AfterEnter,
	/// Before an unchanged route tree receives new params/query.
	BeforeUpdate,
	/// After a reused view reports it was updated.
	AfterUpdate,
	/// Before the active route is left for a different path.
	BeforeLeave,
	/// After a destroyed view reports it was torn down.
	AfterLeave,
}

impl HookKind {
	/// Returns `true` for the `before-*` (guard-style) slots.
	pub fn is_guard(self) -> bool {
		matches!(
			self,
			Self::BeforeEnter | Self::BeforeUpdate | Self::BeforeLeave
		)
	}
}

/// The optional hook set attached to one tier (component, route or router).
#[derive(Clone, Default)]
pub struct Guards {
	before_enter: Option<Guard>,
	after_enter: Option<AfterHook>,
	before_update: Option<Guard>,
	after_update: Option<AfterHook>,
	before_leave: Option<Guard>,
	after_leave: Option<AfterHook>,
}

impl fmt::Debug for Guards {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Guards")
			.field("before_enter", &self.before_enter.is_some())
			.field("after_enter", &self.after_enter.is_some())
			.field("before_update", &self.before_update.is_some())
			.field("after_update", &self.after_update.is_some())
			.field("before_leave", &self.before_leave.is_some())
			.field("after_leave", &self.after_leave.is_some())
			.finish()
	}
}

impl Guards {
	/// Creates an empty hook set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the before-enter guard.
	pub fn before_enter(mut self, guard: Guard) -> Self {
		self.before_enter = Some(guard);
		self
	}

	/// Sets the before-update guard.
	pub fn before_update(mut self, guard: Guard) -> Self {
		self.before_update = Some(guard);
		self
	}

	/// Sets the before-leave guard.
	pub fn before_leave(mut self, guard: Guard) -> Self {
		self.before_leave = Some(guard);
		self
	}

	/// Sets the after-enter notification.
	pub fn after_enter<F: Fn(&Transition) + 'static>(mut self, hook: F) -> Self {
		self.after_enter = Some(Rc::new(hook));
		self
	}

	/// Sets the after-update notification.
	pub fn after_update<F: Fn(&Transition) + 'static>(mut self, hook: F) -> Self {
		self.after_update = Some(Rc::new(hook));
		self
	}

	/// Sets the after-leave notification.
	pub fn after_leave<F: Fn(&Transition) + 'static>(mut self, hook: F) -> Self {
		self.after_leave = Some(Rc::new(hook));
		self
	}

	/// Returns the hook registered for `kind`, if any.
	pub fn get(&self, kind: HookKind) -> Option<Hook> {
		match kind {
			HookKind::BeforeEnter => self.before_enter.clone().map(Hook::Guard),
			HookKind::BeforeUpdate => self.before_update.clone().map(Hook::Guard),
			HookKind::BeforeLeave => self.before_leave.clone().map(Hook::Guard),
			HookKind::AfterEnter => self.after_enter.clone().map(Hook::After),
			HookKind::AfterUpdate => self.after_update.clone().map(Hook::After),
			HookKind::AfterLeave => self.after_leave.clone().map(Hook::After),
		}
	}
}

/// One queued pipeline entry.
#[derive(Clone)]
pub enum Hook {
	/// A guard-style hook.
	Guard(Guard),
	/// A notification-style hook.
	After(AfterHook),
}

impl fmt::Debug for Hook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Guard(guard) => fmt::Debug::fmt(guard, f),
			Self::After(_) => f.write_str("Hook::After"),
		}
	}
}

impl Hook {
	/// Invokes the hook.
	///
	/// Returns the verdict when one is available right away. Deferred guards
	/// receive the handle built by `advance` and yield `None`: the pipeline
	/// is suspended until that handle is answered.
	pub fn invoke<A>(self, transition: &Transition, advance: A) -> Option<Verdict>
	where
		A: FnOnce() -> Advance,
	{
		match self {
			Self::Guard(Guard::Immediate(guard)) => Some(guard(transition)),
			Self::Guard(Guard::Deferred(guard)) => {
				guard(transition, advance());
				None
			}
			Self::After(hook) => {
				hook(transition);
				Some(Verdict::Continue)
			}
		}
	}
}

/// Where a transition stands in the guard pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
	/// No transition in progress.
	#[default]
	Idle,
	/// Draining hooks, possibly waiting on a deferred guard.
	AwaitingGuard,
	/// All guards passed; state is being committed.
	Committing,
	/// A guard aborted or redirected the transition.
	Aborted,
}

/// Result of draining a queue in one go.
#[derive(Debug, Clone, PartialEq)]
pub enum Drain {
	/// Every queued hook continued.
	Completed,
	/// A deferred guard holds the pipeline.
	Suspended,
	/// A guard aborted or redirected.
	Halted(Verdict),
}

/// Ordered queue of hooks for the transition in progress.
#[derive(Debug, Default)]
pub struct Hooks {
	queue: VecDeque<Hook>,
	transition: Option<Transition>,
	state: PipelineState,
}

impl Hooks {
	/// Creates an idle pipeline.
	pub fn new() -> Self {
		Self::default()
	}

	/// Empties the queue for a fresh step of `transition`.
	pub fn clear(&mut self, transition: Transition) {
		self.queue.clear();
		self.transition = Some(transition);
		self.state = PipelineState::AwaitingGuard;
	}

	/// Drops the queue and returns to [`PipelineState::Idle`].
	pub fn reset(&mut self) {
		self.queue.clear();
		self.transition = None;
		self.state = PipelineState::Idle;
	}

	/// Appends a hook; `None` is skipped so omitted hooks at any tier are legal.
	pub fn add(&mut self, hook: Option<Hook>) {
		if let Some(hook) = hook {
			self.queue.push_back(hook);
		}
	}

	/// Queues the `kind` hook of each tier, in the order given.
	pub fn add_tiers<'a, I>(&mut self, kind: HookKind, tiers: I)
	where
		I: IntoIterator<Item = Option<&'a Guards>>,
	{
		for tier in tiers {
			self.add(tier.and_then(|guards| guards.get(kind)));
		}
	}

	/// Pops the front entry together with the transition it guards.
	///
	/// `None` means the queue is drained.
	pub fn next(&mut self) -> Option<(Hook, Transition)> {
		let transition = self.transition.clone()?;
		self.queue.pop_front().map(|hook| (hook, transition))
	}

	/// Runs queued hooks until one suspends, halts, or the queue empties.
	///
	/// Only for callers that do not need to release a borrow between hooks;
	/// the router drives its own queue with [`Hooks::next`].
	pub fn drain<A>(&mut self, mut advance: A) -> Drain
	where
		A: FnMut() -> Advance,
	{
		while let Some((hook, transition)) = self.next() {
			match hook.invoke(&transition, &mut advance) {
				Some(Verdict::Continue) => continue,
				Some(verdict) => {
					self.halt();
					return Drain::Halted(verdict);
				}
				None => return Drain::Suspended,
			}
		}
		Drain::Completed
	}

	/// Marks the transition as aborted and drops what is left of the queue.
	pub fn halt(&mut self) {
		self.queue.clear();
		self.state = PipelineState::Aborted;
	}

	/// Marks the transition as committing.
	pub fn commit(&mut self) {
		self.queue.clear();
		self.state = PipelineState::Committing;
	}

	/// Current pipeline state.
	pub fn state(&self) -> PipelineState {
		self.state
	}

	/// Transition the queue belongs to.
	pub fn transition(&self) -> Option<&Transition> {
		self.transition.as_ref()
	}

	/// Number of hooks still queued.
	pub fn len(&self) -> usize {
		self.queue.len()
	}

	/// Returns `true` when nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::cell::RefCell;

	#[fixture]
	fn transition() -> Transition {
		Transition {
			to: Location::new("/b", "/b"),
			from: Some(Location::new("/a", "/a")),
		}
	}

	fn recording(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str, verdict: Verdict) -> Guards {
		let log = Rc::clone(log);
		Guards::new().before_enter(Guard::immediate(move |_| {
			log.borrow_mut().push(tag);
			verdict.clone()
		}))
	}

	fn no_advance() -> Advance {
		Advance::new(|_| {})
	}

	#[rstest]
	fn test_tiers_run_in_order(transition: Transition) {
		let log = Rc::new(RefCell::new(Vec::new()));
		let component = recording(&log, "component", Verdict::Continue);
		let route = recording(&log, "route", Verdict::Continue);
		let router = recording(&log, "router", Verdict::Continue);

		let mut hooks = Hooks::new();
		hooks.clear(transition);
		hooks.add_tiers(
			HookKind::BeforeEnter,
			[Some(&component), Some(&route), Some(&router)],
		);

		assert_eq!(hooks.drain(no_advance), Drain::Completed);
		assert_eq!(*log.borrow(), vec!["component", "route", "router"]);
	}

	#[rstest]
	fn test_abort_stops_remaining_tiers(transition: Transition) {
		let log = Rc::new(RefCell::new(Vec::new()));
		let component = recording(&log, "component", Verdict::Continue);
		let route = recording(&log, "route", Verdict::Abort);
		let router = recording(&log, "router", Verdict::Continue);

		let mut hooks = Hooks::new();
		hooks.clear(transition);
		hooks.add_tiers(
			HookKind::BeforeEnter,
			[Some(&component), Some(&route), Some(&router)],
		);

		assert_eq!(hooks.drain(no_advance), Drain::Halted(Verdict::Abort));
		assert_eq!(*log.borrow(), vec!["component", "route"]);
		assert_eq!(hooks.state(), PipelineState::Aborted);
		assert!(hooks.is_empty());
	}

	#[rstest]
	fn test_missing_tiers_are_skipped(transition: Transition) {
		let mut hooks = Hooks::new();
		hooks.clear(transition);
		hooks.add_tiers(HookKind::BeforeLeave, [None, Some(&Guards::new()), None]);

		assert!(hooks.is_empty());
		assert_eq!(hooks.drain(no_advance), Drain::Completed);
	}

	#[rstest]
	fn test_deferred_guard_suspends(transition: Transition) {
		let parked: Rc<RefCell<Option<Advance>>> = Rc::new(RefCell::new(None));
		let slot = Rc::clone(&parked);
		let guards = Guards::new().before_update(Guard::deferred(move |_, advance| {
			*slot.borrow_mut() = Some(advance);
		}));
		let answered = Rc::new(RefCell::new(None));
		let sink = Rc::clone(&answered);

		let mut hooks = Hooks::new();
		hooks.clear(transition);
		hooks.add(guards.get(HookKind::BeforeUpdate));

		let drained = hooks.drain(|| {
			let sink = Rc::clone(&sink);
			Advance::new(move |verdict| *sink.borrow_mut() = Some(verdict))
		});
		assert_eq!(drained, Drain::Suspended);
		assert_eq!(hooks.state(), PipelineState::AwaitingGuard);

		parked.borrow_mut().take().unwrap().redirect("/login");
		assert_eq!(*answered.borrow(), Some(Verdict::redirect("/login")));
	}

	#[rstest]
	fn test_after_hooks_advance_automatically(transition: Transition) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let first = Rc::clone(&seen);
		let second = Rc::clone(&seen);
		let a = Guards::new().after_enter(move |t| first.borrow_mut().push(t.to.url.clone()));
		let b = Guards::new().after_enter(move |t| second.borrow_mut().push(t.to.path.clone()));

		let mut hooks = Hooks::new();
		hooks.clear(transition);
		hooks.add_tiers(HookKind::AfterEnter, [Some(&a), Some(&b)]);

		assert_eq!(hooks.drain(no_advance), Drain::Completed);
		assert_eq!(*seen.borrow(), vec!["/b".to_string(), "/b".to_string()]);
	}

	#[rstest]
	fn test_next_without_transition_is_empty() {
		let mut hooks = Hooks::new();
		hooks.add(Some(Hook::After(Rc::new(|_: &Transition| {}))));
		assert!(hooks.next().is_none());
	}

	#[rstest]
	#[case(HookKind::BeforeEnter, true)]
	#[case(HookKind::BeforeUpdate, true)]
	#[case(HookKind::BeforeLeave, true)]
	#[case(HookKind::AfterEnter, false)]
	#[case(HookKind::AfterUpdate, false)]
	#[case(HookKind::AfterLeave, false)]
	fn test_hook_kind_is_guard(#[case] kind: HookKind, #[case] expected: bool) {
		assert_eq!(kind.is_guard(), expected);
	}
}
