use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tether::{is_evaluating, observe, Dependency, Error, Evaluation, Object, Subscriber, Value, Watcher};

use crate::mock::SharedMock;

struct Recorder {
	name: &'static str,
	log: Rc<RefCell<Vec<&'static str>>>,
}

impl Subscriber for Recorder {
	fn invalidate(self: Rc<Self>) {
		self.log.borrow_mut().push(self.name);
	}
}

fn recorder(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Rc<Recorder> {
	Rc::new(Recorder {
		name,
		log: log.clone(),
	})
}

fn weak(recorder: &Rc<Recorder>) -> Weak<dyn Subscriber> {
	Rc::downgrade(recorder) as Weak<dyn Subscriber>
}

#[test]
fn dependency_notifies_in_registration_order() {
	let log = Rc::new(RefCell::new(Vec::new()));
	let a = recorder("a", &log);
	let b = recorder("b", &log);

	let dependency = Dependency::new();
	dependency.register(weak(&b));
	dependency.register(weak(&a));
	dependency.register(weak(&b));
	dependency.notify_all();

	assert_eq!(*log.borrow(), vec!["b", "a", "b"]);
	assert_eq!(dependency.len(), 3);
}

#[test]
fn dependency_forgets_unregistered_and_dropped_subscribers() {
	let log = Rc::new(RefCell::new(Vec::new()));
	let a = recorder("a", &log);
	let b = recorder("b", &log);

	let dependency = Dependency::new();
	dependency.register(weak(&a));
	dependency.register(weak(&a));
	dependency.register(weak(&b));

	dependency.unregister(&weak(&a));
	assert_eq!(dependency.len(), 1);

	std::mem::drop(b);
	assert!(dependency.is_empty());

	dependency.notify_all();
	assert!(log.borrow().is_empty());
}

#[test]
fn observe_creates_one_dependency_per_property() {
	let user = Object::new().with("age", 1);
	let data = Object::new().with("name", "A").with("user", user.clone());

	assert!(!data.is_reactive("name"));

	observe(&Value::Object(data.clone()));
	assert!(data.is_reactive("name"));
	assert!(data.is_reactive("user"));
	assert!(user.is_reactive("age"));

	let before = user.dependency("age").unwrap();
	observe(&Value::Object(data.clone()));
	assert_eq!(user.dependency("age").unwrap(), before);
}

#[test]
fn observe_ignores_scalars_and_cycles() {
	observe(&Value::from(1));
	observe(&Value::Null);

	let node = Object::new().with("label", "root");
	node.set("parent", node.clone());
	observe(&Value::Object(node.clone()));

	assert!(node.is_reactive("label"));
	assert!(node.is_reactive("parent"));
}

#[test]
fn plain_properties_are_not_tracked() {
	let data = Object::new().with("x", 1);
	let mock = SharedMock::new();
	let _watcher = Watcher::new(data.clone(), "x", mock.callback()).unwrap();

	mock.get().expect_trigger().times(0).return_const(());
	data.set("x", 2);
	mock.get().checkpoint();
}

#[test]
fn writing_an_equal_value_does_not_notify() {
	let shared = Object::new().with("k", 1);
	let data = Object::new().with("x", 1).with("o", shared.clone());
	observe(&Value::Object(data.clone()));

	let mock = SharedMock::new();
	let _x = Watcher::new(data.clone(), "x", mock.callback()).unwrap();
	let _o = Watcher::new(data.clone(), "o", mock.callback()).unwrap();

	mock.get().expect_trigger().times(0).return_const(());
	data.set("x", 1);
	data.set("o", shared);
	mock.get().checkpoint();
}

#[test]
fn nested_objects_are_compared_by_identity() {
	let data = Object::new().with("o", Object::new().with("k", 1));
	observe(&Value::Object(data.clone()));

	let mock = SharedMock::new();
	let _o = Watcher::new(data.clone(), "o", mock.callback()).unwrap();

	// Mutating a field leaves the parent reference alone.
	mock.get().expect_trigger().times(0).return_const(());
	data.get_once("o").as_object().unwrap().set("k", 2);
	mock.get().checkpoint();

	mock.get()
		.expect_trigger()
		.withf(|value| value == "[object Object]")
		.times(1)
		.return_const(());
	data.set("o", Object::new().with("k", 2));
	mock.get().checkpoint();
}

#[test]
fn assigned_objects_become_reactive() {
	crate::init_tracing();

	let data = Object::new().with("a", Object::new().with("b", 1));
	observe(&Value::Object(data.clone()));

	let mock = SharedMock::new();
	let watcher = Watcher::new(data.clone(), "a.b.c", mock.callback()).unwrap();
	assert!(watcher.value().is_undefined());

	let b = Object::new().with("c", 1);
	assert!(!b.is_reactive("c"));

	mock.get()
		.expect_trigger()
		.withf(|value| value == "1")
		.times(1)
		.return_const(());
	data.get_once("a").as_object().unwrap().set("b", b.clone());
	mock.get().checkpoint();
	assert!(b.is_reactive("c"));

	mock.get()
		.expect_trigger()
		.withf(|value| value == "2")
		.times(1)
		.return_const(());
	b.set("c", 2);
	mock.get().checkpoint();
}

#[test]
fn computed_properties_track_what_they_read() {
	let data = Object::new().with("first", "Ada").with("last", "Lovelace");
	observe(&Value::Object(data.clone()));
	data.define_computed(
		"full",
		tether::computed!(cx => format!("{} {}", cx.get("first"), cx.get("last")).into()),
	);

	assert!(!data.is_reactive("full"));
	assert_eq!(data.get_once("full"), Value::from("Ada Lovelace"));

	let mock = SharedMock::new();
	let watcher = Watcher::new(data.clone(), "full", mock.callback()).unwrap();
	assert_eq!(watcher.dependencies(), 2);

	mock.get()
		.expect_trigger()
		.withf(|value| value == "Ada Byron")
		.times(1)
		.return_const(());
	data.set("last", "Byron");
	mock.get().checkpoint();

	// No setter.
	data.set("full", "x");
	assert_eq!(data.get_once("full"), Value::from("Ada Byron"));
}

#[test]
fn evaluations_are_not_reentrant() {
	let log = Rc::new(RefCell::new(Vec::new()));
	let a = recorder("a", &log);

	assert!(!is_evaluating());
	{
		let outer = Evaluation::enter(weak(&a)).unwrap();
		assert!(is_evaluating());
		assert_eq!(
			Evaluation::enter(weak(&a)).err(),
			Some(Error::ReentrantEvaluation)
		);
		std::mem::drop(outer);
	}
	assert!(!is_evaluating());

	let again = Evaluation::enter(weak(&a)).unwrap();
	let read = again.finish();
	assert!(read.is_empty());
	assert!(!is_evaluating());
}

#[test]
fn tracked_reads_subscribe_immediately() {
	let log = Rc::new(RefCell::new(Vec::new()));
	let a = recorder("a", &log);

	let data = Object::new().with("x", 1);
	observe(&Value::Object(data.clone()));
	let dependency = data.dependency("x").unwrap();

	let evaluation = Evaluation::enter(weak(&a)).unwrap();
	assert_eq!(data.get("x", &evaluation), Value::from(1));
	assert_eq!(dependency.len(), 1);
	data.get("x", &evaluation);
	assert_eq!(dependency.len(), 1);
	let read = evaluation.finish();

	assert_eq!(read.len(), 1);
	data.set("x", 2);
	assert_eq!(*log.borrow(), vec!["a"]);
}
