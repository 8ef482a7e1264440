//! Per-key prop semantics: event handlers, `class`, properties and attributes.
//!
//! Host adapters implement [`PropHost`] and forward [`HostAdapter::patch_prop`] to [`patch_prop`].

use crate::{
	host::{HostAdapter, HostEvent},
	value::{normalize_class, Handler, Value},
};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::{instrument, trace, trace_span, warn};

/// What a host reports about a settable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
	/// The property currently holds a boolean.
	Boolean,
	Other,
}

/// The capabilities [`patch_prop`] needs from a host.
pub trait PropHost: HostAdapter {
	fn tag_name(&self, element: &Self::Node) -> String;

	/// Whether `key` names a settable property on this concrete `element`, and of which kind.
	fn property_kind(&self, element: &Self::Node, key: &str) -> Option<PropertyKind>;

	fn set_property(&mut self, element: &Self::Node, key: &str, value: Option<&Value<Self::Event>>) -> Result<(), Self::Error>;
	fn set_class_name(&mut self, element: &Self::Node, class: &str) -> Result<(), Self::Error>;
	fn set_attribute(&mut self, element: &Self::Node, key: &str, value: &str) -> Result<(), Self::Error>;
	fn remove_attribute(&mut self, element: &Self::Node, key: &str) -> Result<(), Self::Error>;

	/// The invoker registered for the prop `key` on `element`, if any.
	///
	/// Invokers are stored per prop key, so `onClick` and `onclick` get separate listeners for the same `click` event.
	fn invoker(&self, element: &Self::Node, key: &str) -> Option<Rc<Invoker<Self::Event>>>;

	/// Registers `invoker` for the prop `key` as listener for `event_name` on `element`. Called at most once per invoker.
	fn attach_invoker(&mut self, element: &Self::Node, key: &str, event_name: &str, invoker: Rc<Invoker<Self::Event>>) -> Result<(), Self::Error>;

	/// Unregisters and drops the invoker for the prop `key`, listening for `event_name`, on `element`.
	fn detach_invoker(&mut self, element: &Self::Node, key: &str, event_name: &str) -> Result<(), Self::Error>;

	/// The current time on the clock [`HostEvent::time_stamp`] uses.
	fn now(&self) -> f64;
}

/// A stable event listener that forwards to the current handler(s).
///
/// Events created before the invoker was attached are discarded.
/// This keeps a handler installed during an update from seeing the event that caused that update.
pub struct Invoker<E> {
	value: RefCell<Rc<[Handler<E>]>>,
	attached: f64,
}
impl<E: HostEvent> Invoker<E> {
	#[must_use]
	pub fn new(handlers: Rc<[Handler<E>]>, attached: f64) -> Self {
		Self { value: RefCell::new(handlers), attached }
	}

	#[must_use]
	pub fn attached(&self) -> f64 {
		self.attached
	}

	pub fn replace(&self, handlers: Rc<[Handler<E>]>) {
		*self.value.borrow_mut() = handlers;
	}

	pub fn invoke(&self, event: &E) {
		if event.time_stamp() < self.attached {
			return trace!("Discarding event from before the invoker was attached.");
		}

		// Cloned so handlers can replace the value while running.
		let handlers = Rc::clone(&self.value.borrow());
		for handler in handlers.iter() {
			handler.call(event)
		}
	}
}
impl<E> Debug for Invoker<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Invoker")
			.field("handlers", &self.value.borrow().len())
			.field("attached", &self.attached)
			.finish()
	}
}

/// Returns the event name for `on*` keys, lower-cased.
///
/// Several keys can map to the same name. Each of them still gets its own invoker.
#[must_use]
pub fn event_name(key: &str) -> Option<String> {
	match key.strip_prefix("on") {
		Some(name) if !name.is_empty() => Some(name.to_ascii_lowercase()),
		_ => None,
	}
}

/// `form` is read-only on `<input>`, so it (and its common misspelling) is only ever set as attribute.
fn should_set_as_prop<H: PropHost + ?Sized>(host: &H, element: &H::Node, key: &str) -> Option<PropertyKind> {
	if matches!(key, "form" | "from") && host.tag_name(element).eq_ignore_ascii_case("input") {
		return None;
	}
	host.property_kind(element, key)
}

/// Applies one prop change to `element`.
///
/// The previous value is only informational here. The host's current state is authoritative.
#[instrument(skip(host, element, _prev, next))]
pub fn patch_prop<H: PropHost + ?Sized>(host: &mut H, element: &H::Node, key: &str, _prev: Option<&Value<H::Event>>, next: Option<&Value<H::Event>>) -> Result<(), H::Error> {
	if let Some(name) = event_name(key) {
		return patch_event(host, element, key, &name, next);
	}

	if key == "class" {
		let class = next.map(normalize_class).unwrap_or_default();
		let span = trace_span!("Setting class", class = class.as_str());
		let _enter = span.enter();
		return host.set_class_name(element, &class);
	}

	if let Some(kind) = should_set_as_prop(host, element, key) {
		let span = trace_span!("Setting property", ?kind);
		let _enter = span.enter();
		return match (kind, next) {
			(PropertyKind::Boolean, Some(Value::Str(s))) if s.is_empty() => host.set_property(element, key, Some(&Value::Bool(true))),
			(_, next) => host.set_property(element, key, next),
		};
	}

	match next {
		None | Some(Value::Null | Value::Bool(false)) => {
			let span = trace_span!("Removing attribute");
			let _enter = span.enter();
			host.remove_attribute(element, key)
		}
		Some(Value::Handler(_)) => {
			warn!("Handler assigned to non-event key {:?}. Ignoring.", key);
			Ok(())
		}
		Some(value) => {
			let span = trace_span!("Setting attribute");
			let _enter = span.enter();
			host.set_attribute(element, key, &value.to_attribute_string())
		}
	}
}

fn patch_event<H: PropHost + ?Sized>(host: &mut H, element: &H::Node, key: &str, name: &str, next: Option<&Value<H::Event>>) -> Result<(), H::Error> {
	let handlers = match next {
		Some(value) if value.is_truthy() => {
			let handlers = value.handlers();
			if handlers.is_none() {
				warn!("Value for event {:?} contains no handler: {:?}. Removing the listener instead.", name, value);
			}
			handlers
		}
		_ => None,
	};

	match (host.invoker(element, key), handlers) {
		(Some(invoker), Some(handlers)) => {
			trace!("Replacing handlers of existing invoker.");
			invoker.replace(handlers);
			Ok(())
		}
		(None, Some(handlers)) => {
			let span = trace_span!("Attaching invoker", name);
			let _enter = span.enter();
			let invoker = Rc::new(Invoker::new(handlers, host.now()));
			host.attach_invoker(element, key, name, invoker)
		}
		(Some(_), None) => {
			let span = trace_span!("Detaching invoker", name);
			let _enter = span.enter();
			host.detach_invoker(element, key, name)
		}
		(None, None) => {
			trace!("No invoker to remove.");
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::event_name;

	#[test]
	fn event_names() {
		assert_eq!(event_name("onClick").as_deref(), Some("click"));
		assert_eq!(event_name("onkeydown").as_deref(), Some("keydown"));
		assert_eq!(event_name("on"), None);
		assert_eq!(event_name("id"), None);
		assert_eq!(event_name("ONCLICK"), None);
	}
}
