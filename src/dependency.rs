use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::Subscriber;

type Subscribers = SmallVec<[Weak<dyn Subscriber>; 4]>;

/// The subscribers interested in a single reactive property.
///
/// Subscribers are held weakly: a dependency never keeps a unit alive.
/// Dependencies compare and order by address, so they can be kept in sets.
#[derive(Clone)]
pub struct Dependency {
	body: Rc<DependencyBody>,
}

struct DependencyBody {
	subscribers: RefCell<Subscribers>,
}

impl Default for Dependency {
	fn default() -> Self {
		Dependency::new()
	}
}

impl Dependency {
	pub fn new() -> Self {
		Dependency {
			body: Rc::new(DependencyBody {
				subscribers: RefCell::new(SmallVec::new_const()),
			}),
		}
	}

	/// Appends `subscriber` to the end of the list. No de-duplication.
	pub fn register(&self, subscriber: Weak<dyn Subscriber>) {
		self.body.subscribers.borrow_mut().push(subscriber);
	}

	/// Removes every entry pointing at `subscriber`.
	pub fn unregister(&self, subscriber: &Weak<dyn Subscriber>) {
		self.body
			.subscribers
			.borrow_mut()
			.retain(|item| !Weak::ptr_eq(item, subscriber));
	}

	/// Invalidates every live subscriber in registration order.
	///
	/// The list is snapshotted first: subscribers re-evaluate synchronously
	/// and may register or unregister themselves while we iterate.
	pub fn notify_all(&self) {
		let subscribers = {
			let mut subscribers = self.body.subscribers.borrow_mut();
			subscribers.retain(|item| item.strong_count() > 0);
			subscribers.clone()
		};

		tracing::debug!(subscribers = subscribers.len(), "notifying dependency");

		for item in subscribers {
			if let Some(item) = item.upgrade() {
				item.invalidate();
			}
		}
	}

	/// Number of live subscribers.
	pub fn len(&self) -> usize {
		self.body
			.subscribers
			.borrow()
			.iter()
			.filter(|item| item.strong_count() > 0)
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn addr(&self) -> *const DependencyBody {
		Rc::as_ptr(&self.body)
	}
}

impl PartialEq for Dependency {
	fn eq(&self, other: &Self) -> bool {
		self.addr().eq(&other.addr())
	}
}

impl Eq for Dependency {}

impl Ord for Dependency {
	fn cmp(&self, other: &Self) -> Ordering {
		self.addr().cmp(&other.addr())
	}
}

impl PartialOrd for Dependency {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl std::fmt::Debug for Dependency {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dependency")
			.field("subscribers", &self.len())
			.finish()
	}
}
