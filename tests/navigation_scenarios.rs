//! End-to-end navigation scenarios
//!
//! Success Criteria:
//! 1. Guard tiers run component → route → router and stop at the first veto
//! 2. Sibling navigations only replace the differing leaf
//! 3. Unrelated navigations replace the whole hierarchy
//! 4. Parameter-only changes are updates, not re-entries
//! 5. Unmatched URLs render the not-found route and are recorded as such
//! 6. Back then forward restores the pushed location

use reinhardt_navigator::prelude::*;
use reinhardt_navigator::{MemoryBrowser, ViewEvent};
use rstest::{fixture, rstest};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

#[fixture]
fn log() -> Log {
	Rc::new(RefCell::new(Vec::new()))
}

fn start(routes: Vec<RouteSpec>, guards: Guards) -> (Router, Rc<RecordingHost>) {
	let host = Rc::new(RecordingHost::new());
	let router = Router::builder(host.clone())
		.routes(routes)
		.browser(Rc::new(MemoryBrowser::new("/")))
		.guards(guards)
		.build();
	router.start().unwrap();
	(router, host)
}

fn tracer(log: &Log, label: &'static str, verdict: Verdict) -> Guard {
	let log = Rc::clone(log);
	Guard::immediate(move |_| {
		log.borrow_mut().push(label.to_string());
		verdict.clone()
	})
}

// ============================================================================
// Guard ordering
// ============================================================================

#[rstest]
#[case::all_continue(Verdict::Continue, vec!["component", "route", "router"], "/page")]
#[case::route_vetoes(Verdict::Abort, vec!["component", "route"], "/")]
fn test_guard_tiers(
	log: Log,
	#[case] route_verdict: Verdict,
	#[case] expected: Vec<&str>,
	#[case] landed: &str,
) {
	let page = Component::with_guards(
		"Page",
		Guards::new().before_enter(tracer(&log, "component", Verdict::Continue)),
	);
	let routes = vec![
		RouteSpec::new("/").component(Component::new("Home")),
		RouteSpec::new("/page")
			.component(page)
			.before_enter(tracer(&log, "route", route_verdict)),
	];
	let (router, _) = start(routes, Guards::new().before_enter(tracer(&log, "router", Verdict::Continue)));
	log.borrow_mut().clear();

	router.push("/page").unwrap();

	assert_eq!(*log.borrow(), expected);
	assert_eq!(router.current().unwrap().url, landed);
}

// ============================================================================
// Diff boundaries
// ============================================================================

fn shop() -> Vec<RouteSpec> {
	vec![
		RouteSpec::new("/").component(Component::new("Home")),
		RouteSpec::new("/shop").component(Component::new("Shop")).children(vec![
			RouteSpec::new("cart").component(Component::new("Cart")),
			RouteSpec::new("orders").component(Component::new("Orders")),
		]),
		RouteSpec::new("/help").component(Component::new("Help")),
	]
}

#[rstest]
fn test_sibling_leaves_keep_shared_parent() {
	let (router, host) = start(shop(), Guards::new());
	router.push("/shop/cart").unwrap();
	host.take_events();

	router.push("/shop/orders").unwrap();

	let created: Vec<String> = host
		.events()
		.into_iter()
		.filter_map(|event| match event {
			ViewEvent::Create { component, .. } => Some(component),
			_ => None,
		})
		.collect();
	assert_eq!(created, vec!["Orders"]);
	assert_eq!(host.live(), vec!["Shop", "Orders"]);
}

#[rstest]
fn test_unrelated_routes_replace_from_root() {
	let (router, host) = start(shop(), Guards::new());
	router.push("/shop/cart").unwrap();
	host.take_events();

	router.push("/help").unwrap();

	let destroyed = host
		.events()
		.iter()
		.filter(|event| matches!(event, ViewEvent::Destroy { .. }))
		.count();
	assert_eq!(destroyed, 2);
	assert_eq!(host.live(), vec!["Help"]);
}

// ============================================================================
// Parameter updates
// ============================================================================

#[rstest]
fn test_param_change_is_an_update(log: Log) {
	let seen = Rc::clone(&log);
	let updates = Guard::immediate(move |t: &Transition| {
		let from = t.from.as_ref().and_then(|l| l.param("id")).cloned();
		let to = t.to.param("id").cloned();
		seen.borrow_mut().push(format!("update {:?} -> {:?}", from, to));
		Verdict::Continue
	});
	let routes = vec![
		RouteSpec::new("/").component(Component::new("Home")),
		RouteSpec::new("/a").component(Component::new("A")),
		RouteSpec::new("/a/:id")
			.component(Component::new("B"))
			.before_enter(tracer(&log, "enter B", Verdict::Continue))
			.before_update(updates),
	];
	let (router, host) = start(routes, Guards::new());

	router.push("/a").unwrap();
	router.push("/a/5").unwrap();
	let view = router.mounted_views();
	router.push("/a/6").unwrap();

	assert_eq!(
		*log.borrow(),
		vec![
			"enter B".to_string(),
			format!(
				"update {:?} -> {:?}",
				Some(QueryValue::Number(5.0)),
				Some(QueryValue::Number(6.0))
			),
		]
	);
	assert_eq!(router.mounted_views(), view);
	assert_eq!(router.current().unwrap().param("id"), Some(&QueryValue::Number(6.0)));
	assert_eq!(host.live(), vec!["B"]);
}

// ============================================================================
// Not found
// ============================================================================

#[rstest]
fn test_missing_route_renders_not_found() {
	let (router, host) = start(shop(), Guards::new());

	router.push("/missing").unwrap();

	let history: Vec<String> = router.history().into_iter().map(|l| l.url).collect();
	assert_eq!(history, vec!["/", "/404"]);
	assert_eq!(router.current().unwrap().path, "/404");
	assert_eq!(host.live(), vec!["NotFound"]);
}

// ============================================================================
// History
// ============================================================================

#[rstest]
#[case("/shop/cart")]
#[case("/help?topic=returns&page=2")]
fn test_back_then_forward_restores_location(#[case] url: &str) {
	let (router, _) = start(shop(), Guards::new());
	router.push(url).unwrap();
	let pushed = router.current().unwrap();

	router.back().unwrap();
	assert_eq!(router.current().unwrap().path, "/");
	router.forward().unwrap();

	let restored = router.current().unwrap();
	assert_eq!(restored.path, pushed.path);
	assert_eq!(restored.params, pushed.params);
	assert_eq!(restored.query, pushed.query);
}
