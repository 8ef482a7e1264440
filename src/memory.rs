//! A headless host tree kept in memory.
//!
//! [`MemoryHost`] records every adapter call as [`HostOp`], which makes it suitable for asserting on exactly which mutations a render pass
//! performed. Its nodes behave like DOM nodes where it matters: Inserting a node moves it out of its previous parent,
//! and removing a node removes its whole subtree.

use crate::{
	host::{HostAdapter, HostEvent},
	load::{LoadHost, LoadedKind},
	props::{self, Invoker, PropHost, PropertyKind},
	value::Value,
};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEvent {
	pub name: String,
	pub time_stamp: f64,
}
impl MemoryEvent {
	#[must_use]
	pub fn new(name: impl Into<String>, time_stamp: f64) -> Self {
		Self { name: name.into(), time_stamp }
	}
}
impl HostEvent for MemoryEvent {
	fn time_stamp(&self) -> f64 {
		self.time_stamp
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNodeKind {
	Element(String),
	Text,
	Comment,
}

struct Listener {
	key: String,
	event_name: String,
	invoker: Rc<Invoker<MemoryEvent>>,
}

struct NodeData {
	id: u64,
	kind: MemoryNodeKind,
	text: String,
	class_name: String,
	attributes: HashMap<String, String>,
	properties: HashMap<String, Value<MemoryEvent>>,
	/// In registration order.
	listeners: Vec<Listener>,
	children: Vec<MemoryNode>,
	parent: Weak<RefCell<NodeData>>,
}

/// A handle to a node in a [`MemoryHost`] tree. Clones refer to the same node.
#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);
impl MemoryNode {
	fn new(id: u64, kind: MemoryNodeKind, text: &str) -> Self {
		Self(Rc::new(RefCell::new(NodeData {
			id,
			kind,
			text: text.to_owned(),
			class_name: String::new(),
			attributes: HashMap::new(),
			properties: HashMap::new(),
			listeners: Vec::new(),
			children: Vec::new(),
			parent: Weak::new(),
		})))
	}

	/// Unique within the [`MemoryHost`] that created the node.
	#[must_use]
	pub fn id(&self) -> u64 {
		self.0.borrow().id
	}

	#[must_use]
	pub fn kind(&self) -> MemoryNodeKind {
		self.0.borrow().kind.clone()
	}

	/// The payload of a text or comment node.
	#[must_use]
	pub fn text(&self) -> String {
		self.0.borrow().text.clone()
	}

	#[must_use]
	pub fn class_name(&self) -> String {
		self.0.borrow().class_name.clone()
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<String> {
		self.0.borrow().attributes.get(name).cloned()
	}

	#[must_use]
	pub fn property(&self, name: &str) -> Option<Value<MemoryEvent>> {
		self.0.borrow().properties.get(name).cloned()
	}

	#[must_use]
	pub fn children(&self) -> Vec<MemoryNode> {
		self.0.borrow().children.clone()
	}

	#[must_use]
	pub fn parent(&self) -> Option<MemoryNode> {
		self.0.borrow().parent.upgrade().map(MemoryNode)
	}

	#[must_use]
	pub fn has_listener(&self, event_name: &str) -> bool {
		self.0.borrow().listeners.iter().any(|listener| listener.event_name == event_name)
	}

	/// Dispatches `event` to this node's listeners for [`event.name`](`MemoryEvent::name`), in registration order.
	///
	/// Events don't bubble.
	pub fn dispatch(&self, event: &MemoryEvent) {
		let invokers: Vec<_> = self
			.0
			.borrow()
			.listeners
			.iter()
			.filter(|listener| listener.event_name == event.name)
			.map(|listener| Rc::clone(&listener.invoker))
			.collect();
		if invokers.is_empty() {
			trace!("No listener for {:?}.", event.name);
		}
		for invoker in invokers {
			invoker.invoke(event);
		}
	}

	/// Serializes the subtree in an HTML-like notation.
	///
	/// Attributes are sorted by name, `class` comes first. Properties and listeners are not included.
	#[must_use]
	pub fn markup(&self) -> String {
		let mut markup = String::new();
		self.write_markup(&mut markup);
		markup
	}

	fn write_markup(&self, markup: &mut String) {
		let data = self.0.borrow();
		match &data.kind {
			MemoryNodeKind::Text => markup.push_str(&data.text),
			MemoryNodeKind::Comment => {
				markup.push_str("<!--");
				markup.push_str(&data.text);
				markup.push_str("-->");
			}
			MemoryNodeKind::Element(tag) => {
				markup.push('<');
				markup.push_str(tag);
				if !data.class_name.is_empty() {
					markup.push_str(&format!(" class={:?}", data.class_name));
				}
				let mut attributes: Vec<_> = data.attributes.iter().collect();
				attributes.sort();
				for (name, value) in attributes {
					markup.push_str(&format!(" {}={:?}", name, value));
				}
				markup.push('>');
				for child in &data.children {
					child.write_markup(markup);
				}
				markup.push_str("</");
				markup.push_str(tag);
				markup.push('>');
			}
		}
	}

	fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	fn detach(&self) {
		let parent = self.0.borrow().parent.upgrade();
		if let Some(parent) = parent {
			parent.borrow_mut().children.retain(|child| !child.ptr_eq(self));
		}
		self.0.borrow_mut().parent = Weak::new();
	}
}
impl PartialEq for MemoryNode {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}
impl Eq for MemoryNode {}
impl Debug for MemoryNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let data = self.0.borrow();
		match &data.kind {
			MemoryNodeKind::Element(tag) => write!(f, "MemoryNode#{}(<{}>)", data.id, tag),
			MemoryNodeKind::Text => write!(f, "MemoryNode#{}(#text)", data.id),
			MemoryNodeKind::Comment => write!(f, "MemoryNode#{}(#comment)", data.id),
		}
	}
}

/// One successful [`MemoryHost`] call. Nodes are identified by [`MemoryNode::id`].
///
/// Calls that fail are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
	CreateElement { tag: String },
	CreateTextNode { text: String },
	CreateCommentNode { text: String },
	SetText { node: u64, text: String },
	SetElementText { element: u64, text: String },
	Insert { node: u64, parent: u64, anchor: Option<u64> },
	RemoveChild { parent: u64, child: u64 },
	PatchProp {
		element: u64,
		key: String,
		prev: Option<Value<MemoryEvent>>,
		next: Option<Value<MemoryEvent>>,
	},
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
	#[error("invalid tag name {0:?}")]
	InvalidTagName(String),
	#[error("node #{0} can't have children")]
	NotAnElement(u64),
	#[error("node #{node} is not a child of node #{parent}")]
	NotAChild { parent: u64, node: u64 },
	#[error("inserting node #{node} into node #{parent} would create a cycle")]
	Cycle { parent: u64, node: u64 },
}

/// See the [module documentation](`self`).
#[derive(Debug, Default)]
pub struct MemoryHost {
	next_id: u64,
	time: f64,
	ops: Vec<HostOp>,
}
impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached element that isn't recorded, e.g. to use as [`Container`](`crate::Container`).
	#[must_use]
	pub fn root(&mut self, tag: &str) -> MemoryNode {
		self.create(MemoryNodeKind::Element(tag.to_owned()), "")
	}

	fn create(&mut self, kind: MemoryNodeKind, text: &str) -> MemoryNode {
		self.next_id += 1;
		MemoryNode::new(self.next_id, kind, text)
	}

	/// All calls recorded since creation or the last [`take_ops`](`MemoryHost::take_ops`).
	#[must_use]
	pub fn ops(&self) -> &[HostOp] {
		&self.ops
	}

	pub fn take_ops(&mut self) -> Vec<HostOp> {
		std::mem::take(&mut self.ops)
	}

	/// Sets the clock [`PropHost::now`] reads.
	pub fn set_time(&mut self, time: f64) {
		self.time = time;
	}

	pub fn advance(&mut self, delta: f64) {
		self.time += delta;
	}

	fn element_data<'a>(node: &'a MemoryNode) -> Result<core::cell::RefMut<'a, NodeData>, MemoryError> {
		let data = node.0.borrow_mut();
		if matches!(data.kind, MemoryNodeKind::Element(_)) {
			Ok(data)
		} else {
			Err(MemoryError::NotAnElement(data.id))
		}
	}
}

/// Properties that mirror the attribute of the same name, as far as loading is concerned.
fn reflects_attribute(key: &str) -> bool {
	matches!(key, "id" | "title")
}

/// Properties [`MemoryHost`] elements have, besides attributes.
fn known_property(tag: &str, key: &str) -> Option<PropertyKind> {
	match (tag, key) {
		(_, "id" | "title") => Some(PropertyKind::Other),
		(_, "hidden") => Some(PropertyKind::Boolean),
		("input", "value" | "type" | "form") => Some(PropertyKind::Other),
		("input", "checked" | "disabled") | ("button", "disabled") => Some(PropertyKind::Boolean),
		_ => None,
	}
}

impl HostAdapter for MemoryHost {
	type Node = MemoryNode;
	type Event = MemoryEvent;
	type Error = MemoryError;

	fn create_element(&mut self, tag: &str) -> Result<Self::Node, Self::Error> {
		if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
			return Err(MemoryError::InvalidTagName(tag.to_owned()));
		}
		self.ops.push(HostOp::CreateElement { tag: tag.to_owned() });
		Ok(self.create(MemoryNodeKind::Element(tag.to_owned()), ""))
	}

	fn create_text_node(&mut self, text: &str) -> Result<Self::Node, Self::Error> {
		self.ops.push(HostOp::CreateTextNode { text: text.to_owned() });
		Ok(self.create(MemoryNodeKind::Text, text))
	}

	fn create_comment_node(&mut self, text: &str) -> Result<Self::Node, Self::Error> {
		self.ops.push(HostOp::CreateCommentNode { text: text.to_owned() });
		Ok(self.create(MemoryNodeKind::Comment, text))
	}

	fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), Self::Error> {
		self.ops.push(HostOp::SetText { node: node.id(), text: text.to_owned() });
		node.0.borrow_mut().text = text.to_owned();
		Ok(())
	}

	fn set_element_text(&mut self, element: &Self::Node, text: &str) -> Result<(), Self::Error> {
		let removed = std::mem::take(&mut Self::element_data(element)?.children);
		self.ops.push(HostOp::SetElementText { element: element.id(), text: text.to_owned() });
		for child in removed {
			child.0.borrow_mut().parent = Weak::new();
		}
		if !text.is_empty() {
			let text_node = self.create(MemoryNodeKind::Text, text);
			text_node.0.borrow_mut().parent = Rc::downgrade(&element.0);
			element.0.borrow_mut().children.push(text_node);
		}
		Ok(())
	}

	fn insert(&mut self, node: &Self::Node, parent: &Self::Node, anchor: Option<&Self::Node>) -> Result<(), Self::Error> {
		let mut ancestor = Some(parent.clone());
		while let Some(current) = ancestor {
			if current.ptr_eq(node) {
				return Err(MemoryError::Cycle { parent: parent.id(), node: node.id() });
			}
			ancestor = current.parent();
		}
		drop(Self::element_data(parent)?);

		node.detach();
		let mut parent_data = Self::element_data(parent)?;
		let index = match anchor {
			None => parent_data.children.len(),
			Some(anchor) => parent_data
				.children
				.iter()
				.position(|child| child.ptr_eq(anchor))
				.ok_or(MemoryError::NotAChild { parent: parent_data.id, node: anchor.id() })?,
		};
		parent_data.children.insert(index, node.clone());
		drop(parent_data);
		node.0.borrow_mut().parent = Rc::downgrade(&parent.0);
		self.ops.push(HostOp::Insert {
			node: node.id(),
			parent: parent.id(),
			anchor: anchor.map(MemoryNode::id),
		});
		Ok(())
	}

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node> {
		node.parent()
	}

	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error> {
		if child.parent().as_ref() != Some(parent) {
			return Err(MemoryError::NotAChild { parent: parent.id(), node: child.id() });
		}
		child.detach();
		self.ops.push(HostOp::RemoveChild { parent: parent.id(), child: child.id() });
		Ok(())
	}

	fn patch_prop(&mut self, element: &Self::Node, key: &str, prev: Option<&Value<Self::Event>>, next: Option<&Value<Self::Event>>) -> Result<(), Self::Error> {
		props::patch_prop(self, element, key, prev, next)?;
		self.ops.push(HostOp::PatchProp {
			element: element.id(),
			key: key.to_owned(),
			prev: prev.cloned(),
			next: next.cloned(),
		});
		Ok(())
	}
}

impl PropHost for MemoryHost {
	fn tag_name(&self, element: &Self::Node) -> String {
		match element.kind() {
			MemoryNodeKind::Element(tag) => tag,
			MemoryNodeKind::Text => "#text".to_owned(),
			MemoryNodeKind::Comment => "#comment".to_owned(),
		}
	}

	fn property_kind(&self, element: &Self::Node, key: &str) -> Option<PropertyKind> {
		match element.kind() {
			MemoryNodeKind::Element(tag) => known_property(&tag, key),
			MemoryNodeKind::Text | MemoryNodeKind::Comment => None,
		}
	}

	fn set_property(&mut self, element: &Self::Node, key: &str, value: Option<&Value<Self::Event>>) -> Result<(), Self::Error> {
		Self::element_data(element)?.properties.insert(key.to_owned(), value.cloned().unwrap_or(Value::Null));
		Ok(())
	}

	fn set_class_name(&mut self, element: &Self::Node, class: &str) -> Result<(), Self::Error> {
		Self::element_data(element)?.class_name = class.to_owned();
		Ok(())
	}

	fn set_attribute(&mut self, element: &Self::Node, key: &str, value: &str) -> Result<(), Self::Error> {
		Self::element_data(element)?.attributes.insert(key.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove_attribute(&mut self, element: &Self::Node, key: &str) -> Result<(), Self::Error> {
		Self::element_data(element)?.attributes.remove(key);
		Ok(())
	}

	fn invoker(&self, element: &Self::Node, key: &str) -> Option<Rc<Invoker<Self::Event>>> {
		element.0.borrow().listeners.iter().find(|listener| listener.key == key).map(|listener| Rc::clone(&listener.invoker))
	}

	fn attach_invoker(&mut self, element: &Self::Node, key: &str, event_name: &str, invoker: Rc<Invoker<Self::Event>>) -> Result<(), Self::Error> {
		let mut data = Self::element_data(element)?;
		data.listeners.retain(|listener| listener.key != key);
		data.listeners.push(Listener {
			key: key.to_owned(),
			event_name: event_name.to_owned(),
			invoker,
		});
		Ok(())
	}

	fn detach_invoker(&mut self, element: &Self::Node, key: &str, _event_name: &str) -> Result<(), Self::Error> {
		Self::element_data(element)?.listeners.retain(|listener| listener.key != key);
		Ok(())
	}

	fn now(&self) -> f64 {
		self.time
	}
}

impl LoadHost for MemoryHost {
	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node> {
		node.children()
	}

	fn node_kind(&self, node: &Self::Node) -> LoadedKind {
		let data = node.0.borrow();
		match &data.kind {
			MemoryNodeKind::Element(tag) => LoadedKind::Element(tag.clone()),
			MemoryNodeKind::Text => LoadedKind::Text(data.text.clone()),
			MemoryNodeKind::Comment => LoadedKind::Comment(data.text.clone()),
		}
	}

	fn attributes(&self, node: &Self::Node) -> Vec<(String, String)> {
		let data = node.0.borrow();
		let mut attributes: Vec<_> = data.attributes.iter().map(|(name, value)| (name.clone(), value.clone())).collect();
		attributes.extend(data.properties.iter().filter(|(name, _)| reflects_attribute(name)).filter_map(|(name, value)| match value {
			Value::Str(value) => Some((name.clone(), value.clone())),
			_ => None,
		}));
		if !data.class_name.is_empty() {
			attributes.push(("class".to_owned(), data.class_name.clone()));
		}
		attributes.sort();
		attributes
	}
}
