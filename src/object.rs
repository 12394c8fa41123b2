use std::cell::{OnceCell, RefCell};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::rc::Rc;

use fxhash::FxBuildHasher;
use indexmap::IndexMap;

use crate::dependency::Dependency;
use crate::evaluation::Evaluation;
use crate::path::Scope;
use crate::Value;

/// A read-only accessor evaluated on every read.
pub type ComputedFn = Rc<dyn Fn(&Scope<'_>) -> Value>;

/// A mapping node of a state tree.
///
/// Properties start out plain. [`observe`] turns every property reachable
/// from a value into a reactive one: reads made through an [`Evaluation`]
/// subscribe the evaluating unit, and writes of a different value notify
/// every subscriber.
#[derive(Clone, Default)]
pub struct Object {
	body: Rc<ObjectBody>,
}

#[derive(Default)]
struct ObjectBody {
	slots: RefCell<IndexMap<String, Slot, FxBuildHasher>>,
}

#[derive(Clone)]
enum Slot {
	Data(Property),
	Computed(ComputedFn),
}

#[derive(Clone)]
struct Property {
	body: Rc<PropertyBody>,
}

struct PropertyBody {
	value: RefCell<Value>,
	// Created once, the first time the property is observed.
	dependency: OnceCell<Dependency>,
}

impl Property {
	fn new(value: Value) -> Self {
		Property {
			body: Rc::new(PropertyBody {
				value: RefCell::new(value),
				dependency: OnceCell::new(),
			}),
		}
	}

	fn get(&self, eval: Option<&Evaluation>) -> Value {
		if let (Some(eval), Some(dependency)) = (eval, self.body.dependency.get()) {
			eval.based_on(dependency);
		}
		self.body.value.borrow().clone()
	}

	fn set(&self, value: Value) {
		{
			let mut current = self.body.value.borrow_mut();
			if *current == value {
				return;
			}
			*current = value.clone();
		}

		if let Some(dependency) = self.body.dependency.get() {
			observe(&value);
			dependency.notify_all();
		}
	}
}

impl Object {
	pub fn new() -> Self {
		Object::default()
	}

	/// Builder form of [`Object::set`].
	pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.set(key, value);
		self
	}

	/// Reads `key`, subscribing the evaluating unit if the property is reactive.
	pub fn get(&self, key: &str, eval: &impl AsRef<Evaluation>) -> Value {
		self.read(key, Some(eval.as_ref()))
	}

	/// Reads `key` without subscribing anything.
	pub fn get_once(&self, key: &str) -> Value {
		self.read(key, None)
	}

	pub(crate) fn read(&self, key: &str, eval: Option<&Evaluation>) -> Value {
		match self.slot(key) {
			None => Value::Undefined,
			Some(Slot::Data(property)) => property.get(eval),
			Some(Slot::Computed(func)) => func(&Scope::new(self, eval)),
		}
	}

	/// Writes `key`.
	///
	/// An existing property keeps its reactivity and notifies when the value
	/// changes. A missing key becomes a new plain property. Computed
	/// properties have no setter and ignore the write.
	pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
		let key = key.into();
		let value = value.into();
		match self.slot(&key) {
			Some(Slot::Data(property)) => property.set(value),
			Some(Slot::Computed(_)) => {
				tracing::warn!(key = %key, "ignoring write to a computed property");
			}
			None => {
				self.body
					.slots
					.borrow_mut()
					.insert(key, Slot::Data(Property::new(value)));
			}
		}
	}

	/// Installs a read-only accessor under `key`, replacing any property.
	pub fn define_computed(&self, key: impl Into<String>, func: ComputedFn) {
		self.body
			.slots
			.borrow_mut()
			.insert(key.into(), Slot::Computed(func));
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.body.slots.borrow().contains_key(key)
	}

	pub fn keys(&self) -> Vec<String> {
		self.body.slots.borrow().keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.body.slots.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The dependency of a reactive data property.
	pub fn dependency(&self, key: &str) -> Option<Dependency> {
		match self.slot(key)? {
			Slot::Data(property) => property.body.dependency.get().cloned(),
			Slot::Computed(_) => None,
		}
	}

	pub fn is_reactive(&self, key: &str) -> bool {
		self.dependency(key).is_some()
	}

	pub fn ptr_eq(&self, other: &Object) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}

	fn slot(&self, key: &str) -> Option<Slot> {
		self.body.slots.borrow().get(key).cloned()
	}
}

/// Makes every data property reachable from `value` reactive.
///
/// Each property gets exactly one dependency for its lifetime; observing an
/// already observed tree is a no-op. Non-object values are left alone.
pub fn observe(value: &Value) {
	if let Value::Object(object) = value {
		let mut visited = BTreeSet::new();
		make_reactive(object, &mut visited);
	}
}

fn make_reactive(object: &Object, visited: &mut BTreeSet<*const ObjectBody>) {
	if !visited.insert(Rc::as_ptr(&object.body)) {
		return;
	}

	let slots: Vec<Slot> = object.body.slots.borrow().values().cloned().collect();
	for slot in slots {
		if let Slot::Data(property) = slot {
			property.body.dependency.get_or_init(Dependency::new);
			let value = property.body.value.borrow().clone();
			if let Value::Object(nested) = &value {
				make_reactive(nested, visited);
			}
		}
	}
}

impl Debug for Object {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Object").field("keys", &self.keys()).finish()
	}
}
