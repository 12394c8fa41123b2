use std::fmt::{self, Display};
use std::rc::Rc;

use crate::evaluation::Evaluation;
use crate::{Object, Value};

/// A dotted property path such as `user.address.city`.
///
/// Segments are trimmed, so `{{ user.name }}` reads the same property as
/// `{{user.name}}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
	source: Rc<str>,
	segments: Rc<[String]>,
}

impl Path {
	pub fn parse(source: &str) -> Self {
		let source = source.trim();
		Path {
			source: source.into(),
			segments: source.split('.').map(|s| s.trim().to_owned()).collect(),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.source
	}

	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	/// Walks the path from `root`.
	///
	/// Yields [`Value::Undefined`] as soon as a segment is missing or a
	/// non-object value is reached. Each property read along the way is
	/// tracked by `eval`, if given.
	pub fn resolve(&self, root: &Object, eval: Option<&Evaluation>) -> Value {
		let mut current = Value::Object(root.clone());
		for segment in self.segments.iter() {
			current = match current {
				Value::Object(object) => object.read(segment, eval),
				_ => return Value::Undefined,
			};
		}
		current
	}

	/// Writes `value` at the end of the path.
	///
	/// Returns `false` without touching anything when an intermediate
	/// segment does not resolve to an object.
	pub fn assign(&self, root: &Object, value: impl Into<Value>) -> bool {
		let Some((last, parents)) = self.segments.split_last() else {
			return false;
		};

		let mut current = root.clone();
		for segment in parents {
			current = match current.get_once(segment) {
				Value::Object(object) => object,
				_ => {
					tracing::debug!(path = %self, segment = %segment, "cannot assign through a missing segment");
					return false;
				}
			};
		}

		current.set(last.as_str(), value);
		true
	}
}

impl Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

impl From<&str> for Path {
	fn from(source: &str) -> Self {
		Path::parse(source)
	}
}

/// Read access to the data root handed to computed accessors.
///
/// Reads made through a scope belong to the evaluation that triggered the
/// accessor, so a binding on a computed property depends on whatever the
/// accessor reads.
pub struct Scope<'a> {
	data: &'a Object,
	eval: Option<&'a Evaluation>,
}

impl<'a> Scope<'a> {
	pub(crate) fn new(data: &'a Object, eval: Option<&'a Evaluation>) -> Self {
		Scope { data, eval }
	}

	pub fn get(&self, path: &str) -> Value {
		Path::parse(path).resolve(self.data, self.eval)
	}

	pub fn data(&self) -> &Object {
		self.data
	}
}
