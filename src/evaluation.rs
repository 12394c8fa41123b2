use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Weak;

use crate::dependency::Dependency;
use crate::{Error, Result, Subscriber};

thread_local! {
	static ACTIVE: RefCell<Option<Weak<dyn Subscriber>>> = RefCell::new(None);
}

/// Returns `true` while an [`Evaluation`] is alive on this thread.
pub fn is_evaluating() -> bool {
	ACTIVE.with(|active| active.borrow().is_some())
}

/// One running evaluation of a subscriber.
///
/// Creating an evaluation occupies the thread's active slot and dropping it
/// frees the slot again. The evaluation is passed to every tracked read;
/// reading a reactive property through it subscribes `parent` right away.
pub struct Evaluation {
	parent: Weak<dyn Subscriber>,
	previous: BTreeSet<Dependency>,
	current: RefCell<BTreeSet<Dependency>>,
}

impl AsRef<Evaluation> for Evaluation {
	fn as_ref(&self) -> &Evaluation {
		self
	}
}

impl Evaluation {
	pub fn enter(parent: Weak<dyn Subscriber>) -> Result<Self> {
		ACTIVE.with(|active| {
			let mut active = active.borrow_mut();
			if active.is_some() {
				return Err(Error::ReentrantEvaluation);
			}
			*active = Some(parent.clone());
			Ok(())
		})?;

		Ok(Evaluation {
			parent,
			previous: BTreeSet::new(),
			current: RefCell::new(BTreeSet::new()),
		})
	}

	/// Dependencies the parent is already registered with.
	/// They are not registered a second time when read again.
	pub fn with_previous(mut self, previous: BTreeSet<Dependency>) -> Self {
		self.previous = previous;
		self
	}

	pub(crate) fn based_on(&self, dependency: &Dependency) {
		let fresh = self.current.borrow_mut().insert(dependency.clone());
		if fresh && !self.previous.contains(dependency) {
			tracing::trace!("subscribing to dependency");
			dependency.register(self.parent.clone());
		}
	}

	/// Ends the evaluation, dropping subscriptions that were not
	/// read this time, and returns the dependencies that were.
	pub fn finish(mut self) -> BTreeSet<Dependency> {
		let current = std::mem::take(self.current.get_mut());
		for stale in self.previous.difference(&current) {
			stale.unregister(&self.parent);
		}
		current
	}
}

impl Drop for Evaluation {
	fn drop(&mut self) {
		let _ = ACTIVE.try_with(|active| {
			if let Ok(mut active) = active.try_borrow_mut() {
				*active = None;
			}
		});
	}
}
