//! Virtual nodes, the declarative input of a render pass.

use crate::{host::HostAdapter, value::Value};
use core::fmt::{self, Debug, Display, Formatter};
use hashbrown::HashMap;
use std::borrow::Cow;

/// Attribute, property and event handler values by name.
pub type Props<E> = HashMap<String, Value<E>>;

/// What kind of host node a [`VNode`] describes.
///
/// Nodes of different types are never diffed against each other. The old node is unmounted and the new one mounted instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VNodeType {
	/// A host element with the given tag name.
	Element(Cow<'static, str>),
	Text,
	Comment,
	/// Reserved for stateful components. Rendering one fails with [`RenderError::Unsupported`](`crate::RenderError::Unsupported`).
	Component(Cow<'static, str>),
	/// Reserved for other extensions. Rendering one fails with [`RenderError::Unsupported`](`crate::RenderError::Unsupported`).
	Other(Cow<'static, str>),
}
impl Display for VNodeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			VNodeType::Element(tag) => write!(f, "<{}>", tag),
			VNodeType::Text => f.write_str("#text"),
			VNodeType::Comment => f.write_str("#comment"),
			VNodeType::Component(name) => write!(f, "component {:?}", name),
			VNodeType::Other(name) => write!(f, "{:?}", name),
		}
	}
}

/// The content of a [`VNode`].
pub enum Children<H: HostAdapter> {
	None,
	/// Text content of an element, or the payload of a text or comment node.
	Text(String),
	List(Vec<VNode<H>>),
}
impl<H: HostAdapter> Children<H> {
	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Children::Text(text) => Some(text),
			Children::None | Children::List(_) => None,
		}
	}

	#[must_use]
	pub fn as_list(&self) -> Option<&[VNode<H>]> {
		match self {
			Children::List(list) => Some(list),
			Children::None | Children::Text(_) => None,
		}
	}
}
impl<H: HostAdapter> Default for Children<H> {
	fn default() -> Self {
		Children::None
	}
}
impl<H: HostAdapter> Clone for Children<H> {
	fn clone(&self) -> Self {
		match self {
			Children::None => Children::None,
			Children::Text(text) => Children::Text(text.clone()),
			Children::List(list) => Children::List(list.clone()),
		}
	}
}
impl<H: HostAdapter> Debug for Children<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Children::None => f.write_str("None"),
			Children::Text(text) => f.debug_tuple("Text").field(text).finish(),
			Children::List(list) => f.debug_tuple("List").field(list).finish(),
		}
	}
}

/// An immutable description of one host node, diffed against its previous version on each render.
///
/// The only mutable part is the host node slot, which is filled when the node is mounted or matched during a patch.
/// Clones start out with an empty slot.
pub struct VNode<H: HostAdapter> {
	pub node_type: VNodeType,
	pub props: Props<H::Event>,
	pub children: Children<H>,
	pub(crate) el: Option<H::Node>,
}
impl<H: HostAdapter> VNode<H> {
	#[must_use]
	pub fn new(node_type: VNodeType, props: Props<H::Event>, children: Children<H>) -> Self {
		Self { node_type, props, children, el: None }
	}

	#[must_use]
	pub fn element(tag: impl Into<Cow<'static, str>>) -> Self {
		Self::new(VNodeType::Element(tag.into()), Props::new(), Children::None)
	}

	#[must_use]
	pub fn text(text: impl Into<String>) -> Self {
		Self::new(VNodeType::Text, Props::new(), Children::Text(text.into()))
	}

	#[must_use]
	pub fn comment(comment: impl Into<String>) -> Self {
		Self::new(VNodeType::Comment, Props::new(), Children::Text(comment.into()))
	}

	#[must_use]
	pub fn component(name: impl Into<Cow<'static, str>>) -> Self {
		Self::new(VNodeType::Component(name.into()), Props::new(), Children::None)
	}

	#[must_use]
	pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value<H::Event>>) -> Self {
		self.props.insert(key.into(), value.into());
		self
	}

	#[must_use]
	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.children = Children::Text(text.into());
		self
	}

	#[must_use]
	pub fn with_children(mut self, children: impl IntoIterator<Item = VNode<H>>) -> Self {
		self.children = Children::List(children.into_iter().collect());
		self
	}

	/// The host node this [`VNode`] was realised into, if it was mounted or patched.
	#[must_use]
	pub fn el(&self) -> Option<&H::Node> {
		self.el.as_ref()
	}

	/// The payload of a text or comment node.
	pub(crate) fn payload(&self) -> &str {
		self.children.as_text().unwrap_or_default()
	}
}
impl<H: HostAdapter> Clone for VNode<H> {
	fn clone(&self) -> Self {
		Self::new(self.node_type.clone(), self.props.clone(), self.children.clone())
	}
}
impl<H: HostAdapter> Debug for VNode<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("VNode")
			.field("node_type", &self.node_type)
			.field("props", &self.props)
			.field("children", &self.children)
			.field("el", &self.el)
			.finish()
	}
}
