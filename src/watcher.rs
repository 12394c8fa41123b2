use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use crate::dependency::Dependency;
use crate::evaluation::{self, Evaluation};
use crate::path::Path;
use crate::{Object, Result, Subscriber, Value};

pub type Callback = Rc<dyn Fn(&Value)>;

/// One binding: a path resolved against a data root, and a callback that
/// runs whenever the resolved value changes.
///
/// Construction evaluates the path once, which seeds the last known value
/// and subscribes the watcher to every property it read. The watcher stays
/// subscribed until it is disposed or dropped.
#[derive(Clone)]
pub struct Watcher {
	body: Rc<WatcherBody>,
}

struct WatcherBody {
	inner: RefCell<WatcherInner>,
}

struct WatcherInner {
	data: Object,
	path: Path,
	callback: Callback,
	value: Value,
	dependencies: BTreeSet<Dependency>,
	disposed: bool,
	this: Weak<WatcherBody>,
}

impl Drop for WatcherInner {
	fn drop(&mut self) {
		let this = self.this.clone() as Weak<dyn Subscriber>;
		for dependency in &self.dependencies {
			dependency.unregister(&this);
		}
	}
}

impl Watcher {
	pub fn new(data: Object, path: impl Into<Path>, callback: impl Fn(&Value) + 'static) -> Result<Self> {
		let body = Rc::new_cyclic(|this| WatcherBody {
			inner: RefCell::new(WatcherInner {
				data,
				path: path.into(),
				callback: Rc::new(callback),
				value: Value::Undefined,
				dependencies: BTreeSet::new(),
				disposed: false,
				this: this.clone(),
			}),
		});

		let value = body.evaluate()?;
		body.inner.borrow_mut().value = value;

		Ok(Watcher { body })
	}

	/// The value seen by the latest evaluation.
	pub fn value(&self) -> Value {
		self.body.inner.borrow().value.clone()
	}

	pub fn path(&self) -> Path {
		self.body.inner.borrow().path.clone()
	}

	/// Re-evaluates and runs the callback if the value changed.
	/// Returns whether it did.
	pub fn update(&self) -> Result<bool> {
		self.body.update()
	}

	/// Number of dependencies the watcher is subscribed to.
	pub fn dependencies(&self) -> usize {
		self.body.inner.borrow().dependencies.len()
	}

	/// Unsubscribes from every dependency. Later notifications and
	/// updates are ignored.
	pub fn dispose(&self) {
		let mut inner = self.body.inner.borrow_mut();
		let this = inner.this.clone() as Weak<dyn Subscriber>;
		for dependency in std::mem::take(&mut inner.dependencies) {
			dependency.unregister(&this);
		}
		inner.disposed = true;
	}

	pub fn is_disposed(&self) -> bool {
		self.body.inner.borrow().disposed
	}
}

impl WatcherBody {
	fn evaluate(&self) -> Result<Value> {
		let (data, path, this) = {
			let inner = self.inner.borrow();
			(
				inner.data.clone(),
				inner.path.clone(),
				inner.this.clone() as Weak<dyn Subscriber>,
			)
		};

		let evaluation = Evaluation::enter(this)?;
		let previous = std::mem::take(&mut self.inner.borrow_mut().dependencies);
		let evaluation = evaluation.with_previous(previous);

		tracing::trace!(path = %path, "evaluating");
		let value = path.resolve(&data, Some(&evaluation));

		self.inner.borrow_mut().dependencies = evaluation.finish();
		Ok(value)
	}

	fn update(&self) -> Result<bool> {
		if self.inner.borrow().disposed {
			return Ok(false);
		}

		let value = self.evaluate()?;
		let callback = {
			let mut inner = self.inner.borrow_mut();
			if inner.value == value {
				return Ok(false);
			}
			inner.value = value.clone();
			inner.callback.clone()
		};

		callback(&value);
		Ok(true)
	}
}

impl Subscriber for WatcherBody {
	fn invalidate(self: Rc<Self>) {
		if evaluation::is_evaluating() {
			tracing::error!(
				path = %self.inner.borrow().path,
				"rejected a notification raised during another evaluation"
			);
			return;
		}

		if let Err(error) = self.update() {
			tracing::error!(%error, "failed to update watcher");
		}
	}
}

impl std::fmt::Debug for Watcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.body.inner.borrow();
		f.debug_struct("Watcher")
			.field("path", &inner.path)
			.field("value", &inner.value)
			.finish()
	}
}
