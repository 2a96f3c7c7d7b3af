//! Field-wise construction and the full wiring scenario.

use std::sync::Arc;

use injector::{Component, Container, Error, Inject};

trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> u64;
}

#[derive(Debug, Component)]
#[component(implements(dyn Clock))]
struct FixedClock {
    at: u64,
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.at
    }
}

#[derive(Debug, Component)]
struct Settings {
    name: &'static str,
}

#[derive(Debug, Component)]
struct Tracing {
    enabled: bool,
}

#[derive(Debug, Component, Inject)]
struct App {
    settings: Arc<Settings>,
    clock: Arc<dyn Clock>,
    tracing: Option<Arc<Tracing>>,
}

fn fixed_clock() -> FixedClock {
    FixedClock { at: 42 }
}

fn settings() -> Settings {
    Settings { name: "app" }
}

#[test]
fn inject_resolves_every_field() {
    let container = Container::new();
    container.provide_lazy(settings).unwrap();
    container
        .provide_lazy_as::<dyn Clock, _, _>(fixed_clock)
        .unwrap();

    let app = container.try_inject::<App>().unwrap();
    assert_eq!(app.settings.name, "app");
    assert_eq!(app.clock.now(), 42);
    assert!(app.tracing.is_none());
}

#[test]
fn injected_values_are_singletons_too() {
    let container = Container::new();
    container.provide_lazy(settings).unwrap();
    container
        .provide_lazy_as::<dyn Clock, _, _>(fixed_clock)
        .unwrap();

    let first = container.try_inject::<App>().unwrap();
    let second = container.try_inject::<App>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // The assembled value joined the instance cache under its own key, so
    // a plain resolve observes it as well.
    let resolved = container.resolve::<App>().unwrap();
    assert!(Arc::ptr_eq(&first, &resolved));
}

#[test]
fn missing_field_means_no_instance_at_all() {
    let container = Container::new();
    container.provide_lazy(settings).unwrap();
    // No clock registered: the second field cannot resolve.

    let err = container.try_inject::<App>().unwrap_err();
    assert!(matches!(err, Error::NoImplementationFound(_)));

    // Nothing partial was cached for App; only Settings resolved on the way.
    assert!(container.try_resolve::<App>().is_none());
}

#[test]
fn inject_field_order_follows_declaration() {
    let deps = <App as Inject>::dependencies();
    let names: Vec<&str> = deps.iter().map(|dep| dep.key.name()).collect();
    assert_eq!(deps.len(), 3);
    assert!(names[0].ends_with("Settings"));
    assert!(names[1].contains("Clock"));
    assert!(names[2].ends_with("Tracing"));
    assert!(!deps[2].required);
}

// The end-to-end wiring scenario: a concrete component that doubles as an
// interface implementation, consumed both ways along one chain.

trait Greeter: Send + Sync {
    fn greeting(&self) -> &'static str;
}

#[derive(Component)]
#[component(implements(dyn Greeter))]
struct A {
    greeting: &'static str,
}

impl Greeter for A {
    fn greeting(&self) -> &'static str {
        self.greeting
    }
}

#[derive(Component)]
struct B {
    a: Arc<A>,
}

#[derive(Component)]
struct C {
    text: String,
}

fn new_a() -> A {
    A { greeting: "hello" }
}

fn new_b(a: Arc<A>) -> B {
    B { a }
}

fn new_c(a: Arc<A>, greeter: Arc<dyn Greeter>, b: Arc<B>) -> C {
    assert_eq!(greeter.greeting(), "hello");
    assert!(Arc::ptr_eq(&a, &b.a));
    C { text: "ok".into() }
}

#[test]
fn full_chain_wires_one_instance_of_everything() {
    let container = Container::new();
    container
        .provide_lazy_as::<dyn Greeter, _, _>(new_a)
        .unwrap();
    container.provide_lazy(new_b).unwrap();
    container.provide_lazy(new_c).unwrap();
    container.validate().unwrap();

    let c = container.resolve::<C>().unwrap();
    assert_eq!(c.text, "ok");

    // The A used during C's construction is the cached singleton.
    let a = container.resolve::<A>().unwrap();
    let b = container.resolve::<B>().unwrap();
    assert!(Arc::ptr_eq(&a, &b.a));
}
