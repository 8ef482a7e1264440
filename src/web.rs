//! The browser DOM host adapter.
//!
//! Event invokers are wrapped in [`Closure`]s, which [`WebHost`] keeps alive until the element they're attached to is removed
//! through it, or until their handler is removed.
//! Each element with listeners is tagged with a numeric expando property to find them again.

use crate::{
	host::{HostAdapter, HostEvent},
	load::{LoadHost, LoadedKind},
	props::{self, Invoker, PropHost, PropertyKind},
	value::Value,
};
use core::fmt::{self, Debug, Display, Formatter};
use hashbrown::HashMap;
use js_sys::{Array, Object, Reflect};
use std::rc::Rc;
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

const EXPANDO: &str = "__sapwood_id";

/// A failed DOM call. Wraps whatever JavaScript threw.
#[derive(Debug, Clone)]
pub struct WebError(pub JsValue);
impl Display for WebError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "DOM call failed: {:?}", self.0)
	}
}
impl std::error::Error for WebError {}
impl From<JsValue> for WebError {
	fn from(value: JsValue) -> Self {
		Self(value)
	}
}

impl HostEvent for web_sys::Event {
	fn time_stamp(&self) -> f64 {
		web_sys::Event::time_stamp(self)
	}
}

struct Listener {
	event_name: String,
	invoker: Rc<Invoker<web_sys::Event>>,
	closure: Closure<dyn Fn(web_sys::Event)>,
}

/// Renders into a [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document).
///
/// # Safety
///
/// Listeners of elements that are removed *without* this host (e.g. by other scripts) stay registered,
/// and keep their [`Closure`]s alive until the [`WebHost`] is dropped.
/// After that, any such listener still attached to an element will throw when called.
pub struct WebHost {
	document: web_sys::Document,
	performance: Option<web_sys::Performance>,
	/// By element expando id, then by prop key.
	listeners: HashMap<u32, HashMap<String, Listener>>,
	next_id: u32,
}
impl WebHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			performance: web_sys::window().and_then(|window| window.performance()),
			listeners: HashMap::new(),
			next_id: 0,
		}
	}

	/// The host for the current window's document, if there is one.
	#[must_use]
	pub fn from_window() -> Option<Self> {
		web_sys::window().and_then(|window| window.document()).map(Self::new)
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	/// How many elements currently have listeners registered through this host.
	#[must_use]
	pub fn elements_with_listeners(&self) -> usize {
		self.listeners.len()
	}

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn expando_id(node: &web_sys::Node) -> Option<u32> {
		Reflect::get(node, &JsValue::from_str(EXPANDO)).ok().and_then(|id| id.as_f64()).map(|id| id as u32)
	}

	fn get_or_assign_id(&mut self, node: &web_sys::Node) -> Result<u32, WebError> {
		if let Some(id) = Self::expando_id(node) {
			return Ok(id);
		}
		self.next_id += 1;
		Reflect::set(node, &JsValue::from_str(EXPANDO), &JsValue::from(self.next_id))?;
		Ok(self.next_id)
	}

	/// Removes and releases all listeners in the subtree of `node`.
	#[instrument(skip(self))]
	fn forget(&mut self, node: &web_sys::Node) {
		if let Some(listeners) = Self::expando_id(node).and_then(|id| self.listeners.remove(&id)) {
			for listener in listeners.into_values() {
				if let Err(error) = node.remove_event_listener_with_callback(&listener.event_name, listener.closure.as_ref().unchecked_ref()) {
					error!("Failed to remove event listener {:?}: {:?}", listener.event_name, error);
				}
			}
		}

		let child_nodes = node.child_nodes();
		for i in 0..child_nodes.length() {
			if let Some(child) = child_nodes.item(i) {
				self.forget(&child);
			}
		}
	}
}
impl Debug for WebHost {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebHost")
			.field("document", &self.document)
			.field("elements with listeners", &self.listeners.len())
			.finish()
	}
}

fn to_js(value: &Value<web_sys::Event>) -> JsValue {
	match value {
		Value::Null => JsValue::NULL,
		Value::Bool(b) => JsValue::from_bool(*b),
		Value::Number(n) => JsValue::from_f64(*n),
		Value::Str(s) => JsValue::from_str(s),
		Value::List(items) => items.iter().map(to_js).collect::<Array>().into(),
		Value::Map(entries) => {
			let object = Object::new();
			for (name, value) in entries.iter() {
				if let Err(error) = Reflect::set(&object, &JsValue::from_str(name), &to_js(value)) {
					error!("Failed to convert map entry {:?}: {:?}", name, error);
				}
			}
			object.into()
		}
		Value::Handler(_) => {
			warn!("Handlers have no property representation. Using `undefined`.");
			JsValue::UNDEFINED
		}
	}
}

fn element(node: &web_sys::Node) -> Result<&web_sys::Element, WebError> {
	node.dyn_ref::<web_sys::Element>()
		.ok_or_else(|| WebError(JsValue::from_str("Expected an element.")))
}

impl HostAdapter for WebHost {
	type Node = web_sys::Node;
	type Event = web_sys::Event;
	type Error = WebError;

	fn create_element(&mut self, tag: &str) -> Result<Self::Node, Self::Error> {
		Ok(self.document.create_element(tag)?.into())
	}

	fn create_text_node(&mut self, text: &str) -> Result<Self::Node, Self::Error> {
		Ok(self.document.create_text_node(text).into())
	}

	fn create_comment_node(&mut self, text: &str) -> Result<Self::Node, Self::Error> {
		Ok(self.document.create_comment(text).into())
	}

	fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), Self::Error> {
		node.set_node_value(Some(text));
		Ok(())
	}

	fn set_element_text(&mut self, element: &Self::Node, text: &str) -> Result<(), Self::Error> {
		let child_nodes = element.child_nodes();
		for i in 0..child_nodes.length() {
			if let Some(child) = child_nodes.item(i) {
				self.forget(&child);
			}
		}
		element.set_text_content(Some(text));
		Ok(())
	}

	fn insert(&mut self, node: &Self::Node, parent: &Self::Node, anchor: Option<&Self::Node>) -> Result<(), Self::Error> {
		parent.insert_before(node, anchor)?;
		Ok(())
	}

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node> {
		node.parent_node()
	}

	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error> {
		self.forget(child);
		parent.remove_child(child)?;
		Ok(())
	}

	fn patch_prop(&mut self, element: &Self::Node, key: &str, prev: Option<&Value<Self::Event>>, next: Option<&Value<Self::Event>>) -> Result<(), Self::Error> {
		props::patch_prop(self, element, key, prev, next)
	}
}

impl PropHost for WebHost {
	fn tag_name(&self, element: &Self::Node) -> String {
		element.node_name()
	}

	/// `key in element`, with booleans detected by the current value.
	fn property_kind(&self, element: &Self::Node, key: &str) -> Option<PropertyKind> {
		let key = JsValue::from_str(key);
		if !Reflect::has(element, &key).unwrap_or(false) {
			return None;
		}
		match Reflect::get(element, &key) {
			Ok(current) if current.as_bool().is_some() => Some(PropertyKind::Boolean),
			Ok(_) => Some(PropertyKind::Other),
			Err(error) => {
				warn!("Failed to read property {:?}: {:?}", key, error);
				Some(PropertyKind::Other)
			}
		}
	}

	fn set_property(&mut self, element: &Self::Node, key: &str, value: Option<&Value<Self::Event>>) -> Result<(), Self::Error> {
		let value = value.map_or(JsValue::NULL, to_js);
		if !Reflect::set(element, &JsValue::from_str(key), &value)? {
			warn!("Property {:?} was not assigned.", key);
		}
		Ok(())
	}

	fn set_class_name(&mut self, element: &Self::Node, class: &str) -> Result<(), Self::Error> {
		self::element(element)?.set_class_name(class);
		Ok(())
	}

	fn set_attribute(&mut self, element: &Self::Node, key: &str, value: &str) -> Result<(), Self::Error> {
		self::element(element)?.set_attribute(key, value)?;
		Ok(())
	}

	fn remove_attribute(&mut self, element: &Self::Node, key: &str) -> Result<(), Self::Error> {
		self::element(element)?.remove_attribute(key)?;
		Ok(())
	}

	fn invoker(&self, element: &Self::Node, key: &str) -> Option<Rc<Invoker<Self::Event>>> {
		let id = Self::expando_id(element)?;
		self.listeners.get(&id)?.get(key).map(|listener| Rc::clone(&listener.invoker))
	}

	fn attach_invoker(&mut self, element: &Self::Node, key: &str, event_name: &str, invoker: Rc<Invoker<Self::Event>>) -> Result<(), Self::Error> {
		let id = self.get_or_assign_id(element)?;
		let closure = {
			let invoker = Rc::clone(&invoker);
			Closure::wrap(Box::new(move |event: web_sys::Event| invoker.invoke(&event)) as Box<dyn Fn(web_sys::Event)>)
		};
		element.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
		trace!("Added event listener.");
		let listener = Listener {
			event_name: event_name.to_owned(),
			invoker,
			closure,
		};
		if let Some(replaced) = self.listeners.entry(id).or_default().insert(key.to_owned(), listener) {
			error!("Replaced a listener for {:?} that was still attached.", key);
			element.remove_event_listener_with_callback(&replaced.event_name, replaced.closure.as_ref().unchecked_ref())?;
		}
		Ok(())
	}

	fn detach_invoker(&mut self, element: &Self::Node, key: &str, event_name: &str) -> Result<(), Self::Error> {
		let id = match Self::expando_id(element) {
			Some(id) => id,
			None => {
				warn!("No listener for {:?} to detach.", key);
				return Ok(());
			}
		};
		let listener = self.listeners.get_mut(&id).and_then(|listeners| listeners.remove(key));
		if self.listeners.get(&id).map_or(false, HashMap::is_empty) {
			self.listeners.remove(&id);
		}
		match listener {
			Some(listener) => element.remove_event_listener_with_callback(event_name, listener.closure.as_ref().unchecked_ref())?,
			None => warn!("No listener for {:?} to detach.", key),
		}
		Ok(())
	}

	fn now(&self) -> f64 {
		self.performance.as_ref().map_or_else(js_sys::Date::now, web_sys::Performance::now)
	}
}

impl LoadHost for WebHost {
	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node> {
		let child_nodes = node.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).collect()
	}

	fn node_kind(&self, node: &Self::Node) -> LoadedKind {
		if let Some(element) = node.dyn_ref::<web_sys::Element>() {
			LoadedKind::Element(element.local_name())
		} else if let Some(text) = node.dyn_ref::<web_sys::Text>() {
			LoadedKind::Text(text.data())
		} else if let Some(comment) = node.dyn_ref::<web_sys::Comment>() {
			LoadedKind::Comment(comment.data())
		} else {
			LoadedKind::Other
		}
	}

	fn attributes(&self, node: &Self::Node) -> Vec<(String, String)> {
		let element = match node.dyn_ref::<web_sys::Element>() {
			Some(element) => element,
			None => return Vec::new(),
		};
		let attributes = element.attributes();
		(0..attributes.length())
			.filter_map(|i| attributes.item(i))
			.map(|attribute| (attribute.local_name(), attribute.value()))
			.collect()
	}
}
