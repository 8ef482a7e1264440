//! Prop values and event handlers.

use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// An event handler closure.
///
/// Handlers compare by identity, so re-using the same [`Handler`] across renders doesn't cause event invokers to be touched.
pub struct Handler<E>(Rc<dyn Fn(&E)>);
impl<E> Handler<E> {
	pub fn new(f: impl 'static + Fn(&E)) -> Self {
		Self(Rc::new(f))
	}

	pub fn call(&self, event: &E) {
		(self.0)(event)
	}
}
impl<E> Clone for Handler<E> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}
impl<E> PartialEq for Handler<E> {
	fn eq(&self, other: &Self) -> bool {
		// Only the data pointer. Vtable pointers aren't guaranteed to be unique.
		Rc::as_ptr(&self.0).cast::<()>() == Rc::as_ptr(&other.0).cast::<()>()
	}
}
impl<E> Debug for Handler<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Handler").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

/// The value of a single prop.
///
/// Equality is value equality for scalars, but identity for [`List`](`Value::List`), [`Map`](`Value::Map`) and [`Handler`](`Value::Handler`).
/// Rebuilding a class list on every render will therefore re-apply it, while cloning the previous [`Value`] won't.
pub enum Value<E> {
	Null,
	Bool(bool),
	Number(f64),
	Str(String),
	List(Rc<[Value<E>]>),
	Map(Rc<[(String, Value<E>)]>),
	Handler(Handler<E>),
}

impl<E> Value<E> {
	pub fn list(items: impl IntoIterator<Item = Value<E>>) -> Self {
		Self::List(items.into_iter().collect())
	}

	pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value<E>)>) -> Self {
		Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}

	pub fn handler(f: impl 'static + Fn(&E)) -> Self {
		Self::Handler(Handler::new(f))
	}

	/// `Null`, `false`, `0`, `NaN` and `""` are falsy, everything else is truthy.
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Null => false,
			Value::Bool(b) => *b,
			Value::Number(n) => *n != 0.0 && !n.is_nan(),
			Value::Str(s) => !s.is_empty(),
			Value::List(_) | Value::Map(_) | Value::Handler(_) => true,
		}
	}

	/// The string written when this value ends up as an attribute.
	#[must_use]
	pub fn to_attribute_string(&self) -> String {
		match self {
			Value::Null => String::new(),
			Value::Bool(b) => b.to_string(),
			Value::Number(n) => n.to_string(),
			Value::Str(s) => s.clone(),
			Value::List(items) => items.iter().map(Value::to_attribute_string).collect::<Vec<_>>().join(","),
			Value::Map(_) => "[object Object]".to_owned(),
			Value::Handler(_) => String::new(),
		}
	}

	/// Collects the handler(s) held by this value, in order.
	///
	/// Returns [`None`] if the value is falsy or contains no handler.
	#[must_use]
	pub fn handlers(&self) -> Option<Rc<[Handler<E>]>> {
		match self {
			Value::Handler(handler) => Some(Rc::from(vec![handler.clone()])),
			Value::List(items) => {
				let handlers: Rc<[Handler<E>]> = items
					.iter()
					.filter_map(|item| match item {
						Value::Handler(handler) => Some(handler.clone()),
						_ => None,
					})
					.collect();
				if handlers.is_empty() {
					None
				} else {
					Some(handlers)
				}
			}
			_ => None,
		}
	}
}

/// Normalizes a `class` prop value into a single space-separated class string.
///
/// Strings pass through, lists are flattened (skipping empty results) and maps contribute each key whose value is truthy.
/// The result is trimmed.
#[must_use]
pub fn normalize_class<E>(value: &Value<E>) -> String {
	let mut class = String::new();
	match value {
		Value::Str(s) => class.push_str(s),
		Value::List(items) => {
			for item in items.iter() {
				let normalized = normalize_class(item);
				if !normalized.is_empty() {
					class.push_str(&normalized);
					class.push(' ');
				}
			}
		}
		Value::Map(entries) => {
			for (name, value) in entries.iter() {
				if value.is_truthy() {
					class.push_str(name);
					class.push(' ');
				}
			}
		}
		Value::Null | Value::Bool(_) | Value::Number(_) | Value::Handler(_) => (),
	}
	class.trim().to_owned()
}

impl<E> Clone for Value<E> {
	fn clone(&self) -> Self {
		match self {
			Value::Null => Value::Null,
			Value::Bool(b) => Value::Bool(*b),
			Value::Number(n) => Value::Number(*n),
			Value::Str(s) => Value::Str(s.clone()),
			Value::List(items) => Value::List(Rc::clone(items)),
			Value::Map(entries) => Value::Map(Rc::clone(entries)),
			Value::Handler(handler) => Value::Handler(handler.clone()),
		}
	}
}

impl<E> PartialEq for Value<E> {
	#[allow(clippy::float_cmp)]
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
			(Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
			(Value::Handler(a), Value::Handler(b)) => a == b,
			_ => false,
		}
	}
}

impl<E> Debug for Value<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("Null"),
			Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
			Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
			Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
			Value::List(items) => f.debug_tuple("List").field(items).finish(),
			Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
			Value::Handler(handler) => handler.fmt(f),
		}
	}
}

impl<E> From<&str> for Value<E> {
	fn from(s: &str) -> Self {
		Value::Str(s.to_owned())
	}
}
impl<E> From<String> for Value<E> {
	fn from(s: String) -> Self {
		Value::Str(s)
	}
}
impl<E> From<bool> for Value<E> {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}
impl<E> From<f64> for Value<E> {
	fn from(n: f64) -> Self {
		Value::Number(n)
	}
}
impl<E> From<i32> for Value<E> {
	fn from(n: i32) -> Self {
		Value::Number(n.into())
	}
}
impl<E> From<Handler<E>> for Value<E> {
	fn from(handler: Handler<E>) -> Self {
		Value::Handler(handler)
	}
}
