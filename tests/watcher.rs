use tether::{is_evaluating, observe, Object, Value, Watcher};

use crate::mock::SharedMock;

fn reactive(data: Object) -> Object {
	observe(&Value::Object(data.clone()));
	data
}

#[test]
fn callback_runs_only_for_the_path_read() {
	let data = reactive(Object::new().with("a", 1).with("b", 2));

	let on_a = SharedMock::new();
	let on_b = SharedMock::new();
	let a = Watcher::new(data.clone(), "a", on_a.callback()).unwrap();
	let _b = Watcher::new(data.clone(), "b", on_b.callback()).unwrap();
	assert_eq!(a.value(), Value::from(1));

	on_a.get()
		.expect_trigger()
		.withf(|value| value == "10")
		.times(1)
		.return_const(());
	on_b.get().expect_trigger().times(0).return_const(());

	data.set("a", 10);

	on_a.get().checkpoint();
	on_b.get().checkpoint();
	assert_eq!(a.value(), Value::from(10));
}

#[test]
fn unchanged_values_do_not_run_the_callback() {
	let data = reactive(Object::new().with("x", 1));
	let mock = SharedMock::new();
	let watcher = Watcher::new(data.clone(), "x", mock.callback()).unwrap();

	mock.get().expect_trigger().times(0).return_const(());
	assert_eq!(watcher.update(), Ok(false));
	assert_eq!(watcher.update(), Ok(false));
	mock.get().checkpoint();
}

#[test]
fn last_value_follows_every_change() {
	let data = reactive(Object::new().with("x", 1));
	let mock = SharedMock::new();
	let _watcher = Watcher::new(data.clone(), "x", mock.callback()).unwrap();

	mock.get().expect_trigger().times(2).return_const(());
	data.set("x", 2);
	data.set("x", 1);
	mock.get().checkpoint();
}

#[test]
fn missing_paths_resolve_once_they_exist() {
	let data = reactive(Object::new().with("user", Value::Null));
	let mock = SharedMock::new();
	let watcher = Watcher::new(data.clone(), "user.name", mock.callback()).unwrap();
	assert!(watcher.value().is_undefined());

	mock.get()
		.expect_trigger()
		.withf(|value| value == "Ada")
		.times(1)
		.return_const(());
	data.set("user", Object::new().with("name", "Ada"));
	mock.get().checkpoint();
}

#[test]
fn each_dependency_is_registered_once() {
	let data = reactive(Object::new().with("x", 1));
	let mock = SharedMock::new();
	let watcher = Watcher::new(data.clone(), "x", mock.callback()).unwrap();

	mock.get().expect_trigger().times(3).return_const(());
	data.set("x", 2);
	data.set("x", 3);
	data.set("x", 4);
	mock.get().checkpoint();

	assert_eq!(data.dependency("x").unwrap().len(), 1);
	assert_eq!(watcher.dependencies(), 1);
}

#[test]
fn stale_dependencies_are_dropped() {
	let old = Object::new().with("b", 1);
	let data = reactive(Object::new().with("a", old.clone()));
	let mock = SharedMock::new();
	let _watcher = Watcher::new(data.clone(), "a.b", mock.callback()).unwrap();
	assert_eq!(old.dependency("b").unwrap().len(), 1);

	let new = Object::new().with("b", 2);
	mock.get().expect_trigger().times(1).return_const(());
	data.set("a", new.clone());
	mock.get().checkpoint();

	assert_eq!(old.dependency("b").unwrap().len(), 0);
	assert_eq!(new.dependency("b").unwrap().len(), 1);

	mock.get().expect_trigger().times(0).return_const(());
	old.set("b", 5);
	mock.get().checkpoint();
}

#[test]
fn dispose_and_drop_unsubscribe() {
	let data = reactive(Object::new().with("x", 1));
	let dependency = data.dependency("x").unwrap();

	let mock = SharedMock::new();
	let disposed = Watcher::new(data.clone(), "x", mock.callback()).unwrap();
	let dropped = Watcher::new(data.clone(), "x", mock.callback()).unwrap();
	assert_eq!(dependency.len(), 2);

	disposed.dispose();
	assert!(disposed.is_disposed());
	assert_eq!(dependency.len(), 1);

	std::mem::drop(dropped);
	assert_eq!(dependency.len(), 0);

	mock.get().expect_trigger().times(0).return_const(());
	data.set("x", 2);
	assert_eq!(disposed.update(), Ok(false));
	mock.get().checkpoint();
}

#[test]
fn active_slot_is_cleared_after_every_evaluation() {
	let data = reactive(Object::new().with("x", 1));

	let _none = Watcher::new(Object::new(), "missing", |_: &Value| {}).unwrap();
	assert!(!is_evaluating());

	let _watcher = Watcher::new(data.clone(), "x", |_: &Value| assert!(!is_evaluating())).unwrap();
	assert!(!is_evaluating());

	data.set("x", 2);
	assert!(!is_evaluating());
}

#[test]
fn writes_during_an_evaluation_are_rejected() {
	crate::init_tracing();

	let data = reactive(Object::new().with("x", 1).with("hits", 0));
	data.define_computed(
		"sneaky",
		tether::computed!((data) cx => {
			let x = cx.get("x");
			data.set("hits", x.clone());
			x
		}),
	);

	let mock = SharedMock::new();
	let _hits = Watcher::new(data.clone(), "hits", mock.callback()).unwrap();

	// The write inside the computed notifies `hits` while `sneaky` is still
	// evaluating; that notification is dropped.
	mock.get().expect_trigger().times(0).return_const(());
	let sneaky = Watcher::new(data.clone(), "sneaky", |_: &Value| {}).unwrap();
	mock.get().checkpoint();

	assert_eq!(sneaky.value(), Value::from(1));
	assert!(!is_evaluating());
}
