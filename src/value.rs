use std::fmt::{self, Display};

use crate::Object;

/// A value stored in a state tree.
///
/// Comparison is shallow: primitives compare by value, objects by identity.
/// Two distinct objects with identical contents are *not* equal, which means
/// mutating a field of a nested object never changes the parent's value.
#[derive(Clone, Debug, Default)]
pub enum Value {
	#[default]
	Undefined,
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Object(Object),
}

impl Value {
	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}

	pub fn as_object(&self) -> Option<&Object> {
		match self {
			Value::Object(object) => Some(object),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(string) => Some(string),
			_ => None,
		}
	}

	pub fn as_number(&self) -> Option<f64> {
		match self {
			Value::Number(number) => Some(*number),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(value) => Some(*value),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Undefined, Value::Undefined) => true,
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			// NaN never equals itself, so assigning NaN always notifies.
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

/// Text form used by the rendering effects.
///
/// `undefined` and `null` render as an empty string so that a binding
/// whose path is not resolvable yet shows nothing.
impl Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Undefined | Value::Null => Ok(()),
			Value::Bool(value) => value.fmt(f),
			Value::Number(number) => fmt_number(*number, f),
			Value::String(string) => f.write_str(string),
			Value::Object(_) => f.write_str("[object Object]"),
		}
	}
}

fn fmt_number(number: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	if number.is_nan() {
		f.write_str("NaN")
	} else if number.is_infinite() {
		f.write_str(if number > 0.0 { "Infinity" } else { "-Infinity" })
	} else if number == 0.0 {
		f.write_str("0")
	} else {
		write!(f, "{}", number)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Number(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Number(value.into())
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Value::Number(value.into())
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<Object> for Value {
	fn from(value: Object) -> Self {
		Value::Object(value)
	}
}

impl<T> From<Option<T>> for Value
where
	T: Into<Value>,
{
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}
