//! End-to-end resolution behavior: subtype fallback, parent chains,
//! locality, and the live shared map.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use silsila::{Registry, RegistryBuilder, RegistryError, TypeKey};

trait Fruit: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;
}

#[derive(Debug)]
struct Lemon;

impl Fruit for Lemon {
    fn name(&self) -> &'static str {
        "lemon"
    }
}

#[derive(Debug)]
struct Apple;

impl Fruit for Apple {
    fn name(&self) -> &'static str {
        "apple"
    }
}

trait Slicer: Send + Sync + std::fmt::Debug {
    fn blade(&self) -> &'static str;
}

#[derive(Debug)]
struct SteelSlicer;

impl Slicer for SteelSlicer {
    fn blade(&self) -> &'static str {
        "steel"
    }
}

#[derive(Debug)]
struct Vegetable {
    slicer: Arc<dyn Slicer>,
}

fn fruit_registry(builder: &mut RegistryBuilder) -> Registry {
    builder
        .register::<Lemon>(|_| Ok(Lemon))
        .implements::<Lemon, Arc<dyn Fruit>>(|lemon| Arc::new(lemon));
    builder.registry()
}

#[test]
fn subtype_fallback_resolves_through_upcast() {
    let mut builder = RegistryBuilder::new();
    let registry = fruit_registry(&mut builder);

    let fruit: Arc<dyn Fruit> = registry.get().unwrap();
    assert_eq!(fruit.name(), "lemon");
}

#[test]
fn exact_match_beats_subtype_match() {
    let mut builder = RegistryBuilder::new();
    fruit_registry(&mut builder);
    builder.register::<Arc<dyn Fruit>>(|_| Ok(Arc::new(Apple)));

    let fruit: Arc<dyn Fruit> = builder.registry().get().unwrap();
    assert_eq!(fruit.name(), "apple");
}

#[test]
fn missing_everywhere_fails_with_missing_type() {
    let registry = RegistryBuilder::new().registry();

    match registry.get::<Arc<dyn Fruit>>().unwrap_err() {
        RegistryError::MissingType(e) => {
            assert!(e.requested.type_name().contains("Fruit"));
        }
        other => panic!("expected MissingType, got: {other:?}"),
    }
}

#[test]
fn locality_beats_precision_across_levels() {
    // Parent has an exact Arc<dyn Fruit>; the child has only the Lemon
    // subtype. The child's local subtype match must win.
    let mut parent = RegistryBuilder::new();
    parent.register::<Arc<dyn Fruit>>(|_| Ok(Arc::new(Apple)));

    let mut child = RegistryBuilder::with_parent(parent.registry());
    let child_registry = fruit_registry(&mut child);

    let from_child: Arc<dyn Fruit> = child_registry.get().unwrap();
    assert_eq!(from_child.name(), "lemon");

    let from_parent: Arc<dyn Fruit> = parent.registry().get().unwrap();
    assert_eq!(from_parent.name(), "apple");
}

#[test]
fn local_miss_defers_to_parent_subtype_tier() {
    // The parent has no exact match either; its own subtype tier runs.
    let mut parent = RegistryBuilder::new();
    fruit_registry(&mut parent);

    let child = RegistryBuilder::with_parent(parent.registry());

    let fruit: Arc<dyn Fruit> = child.registry().get().unwrap();
    assert_eq!(fruit.name(), "lemon");
}

#[test]
fn parent_factory_uses_child_overrides() {
    struct Greeting(String);

    let mut parent = RegistryBuilder::new();
    parent
        .register_instance(String::from("hello from parent"))
        .register::<Greeting>(|r| Ok(Greeting(r.get()?)));

    let mut child = RegistryBuilder::with_parent(parent.registry());
    child.register_instance(String::from("hello from child"));

    let greeting: Greeting = child.registry().get().unwrap();
    assert_eq!(greeting.0, "hello from child");

    let greeting: Greeting = parent.registry().get().unwrap();
    assert_eq!(greeting.0, "hello from parent");
}

#[test]
fn child_registration_does_not_leak_into_parent() {
    let mut parent = RegistryBuilder::new();
    parent.register_instance(1i32);
    let parent_registry = parent.registry();

    let mut child = RegistryBuilder::with_parent(parent_registry.clone());
    let child_registry = child.registry();

    assert_eq!(child_registry.get::<i32>().unwrap(), 1);

    child.register_instance(2i32);
    assert_eq!(child_registry.get::<i32>().unwrap(), 2);
    assert_eq!(parent_registry.get::<i32>().unwrap(), 1);
}

#[test]
fn get_all_matches_local_map_only() {
    let mut parent = RegistryBuilder::new();
    fruit_registry(&mut parent);

    let mut child = RegistryBuilder::with_parent(parent.registry());
    child
        .register::<Apple>(|_| Ok(Apple))
        .implements::<Apple, Arc<dyn Fruit>>(|apple| Arc::new(apple));

    let fruits: Vec<Arc<dyn Fruit>> = child.registry().get_all().unwrap();
    assert_eq!(fruits.len(), 1);
    assert_eq!(fruits[0].name(), "apple");
}

#[test]
fn get_all_returns_matches_in_registration_order() {
    let mut builder = RegistryBuilder::new();
    builder
        .register::<Lemon>(|_| Ok(Lemon))
        .implements::<Lemon, Arc<dyn Fruit>>(|lemon| Arc::new(lemon))
        .register::<Apple>(|_| Ok(Apple))
        .implements::<Apple, Arc<dyn Fruit>>(|apple| Arc::new(apple));

    let fruits: Vec<Arc<dyn Fruit>> = builder.registry().get_all().unwrap();
    let names: Vec<_> = fruits.iter().map(|f| f.name()).collect();
    assert_eq!(names, ["lemon", "apple"]);
}

#[test]
fn get_all_with_no_matches_is_empty_not_an_error() {
    let registry = RegistryBuilder::new().registry();
    let fruits: Vec<Arc<dyn Fruit>> = registry.get_all().unwrap();
    assert!(fruits.is_empty());
}

#[test]
fn get_all_reinvokes_factories_each_call() {
    let counter = Arc::new(AtomicU32::new(0));

    let mut builder = RegistryBuilder::new();
    builder.register::<u32>({
        let counter = counter.clone();
        move |_| Ok(counter.fetch_add(1, Ordering::SeqCst))
    });

    let registry = builder.registry();
    let _ = registry.get_all::<u32>().unwrap();
    let _ = registry.get_all::<u32>().unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn singleton_keeps_identity_across_resolutions() {
    let calls = Arc::new(AtomicU32::new(0));

    let mut builder = RegistryBuilder::new();
    builder.register_singleton::<Arc<Lemon>>({
        let calls = calls.clone();
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Lemon))
        }
    });

    let registry = builder.registry();
    let first: Arc<Lemon> = registry.get().unwrap();
    let second: Arc<Lemon> = registry.get().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_dependency_is_reported_then_fixable() {
    let mut builder = RegistryBuilder::new();
    builder
        .register::<Lemon>(|_| Ok(Lemon))
        .register::<Vegetable>(|r| Ok(Vegetable { slicer: r.get()? }));

    let registry = builder.registry();

    // No Slicer yet: the failure names the missing dependency, not the
    // type that was asked for at the top level.
    match registry.get::<Vegetable>().unwrap_err() {
        RegistryError::MissingType(e) => {
            assert!(e.requested.type_name().contains("Slicer"));
        }
        other => panic!("expected MissingType, got: {other:?}"),
    }

    builder.register::<Arc<dyn Slicer>>(|_| Ok(Arc::new(SteelSlicer)));

    let vegetable: Vegetable = registry.get().unwrap();
    assert_eq!(vegetable.slicer.blade(), "steel");
}

#[test]
fn explicit_key_round_trip() {
    let mut builder = RegistryBuilder::new();
    builder.register_instance(9i64);

    let registry = builder.registry();
    let key = TypeKey::of::<i64>();
    let value = registry.get_key(&key).unwrap();
    assert_eq!(*value.downcast::<i64>().unwrap(), 9);

    assert!(registry.get_all_key(&key).unwrap().len() == 1);
}
