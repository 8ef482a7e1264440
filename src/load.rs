//! Constructing [`VNode`] trees from existing host trees, so that later renders patch them instead of replacing them.

use crate::{
	host::HostAdapter,
	render::Container,
	value::Value,
	vnode::{Children, Props, VNode, VNodeType},
};
use thiserror::Error;
use tracing::{instrument, trace_span, warn};

/// What a host node is, as far as loading is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedKind {
	Element(String),
	Text(String),
	Comment(String),
	/// Anything else, like processing instructions. Skipped.
	Other,
}

/// Read access to a host tree.
pub trait LoadHost: HostAdapter {
	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;
	fn node_kind(&self, node: &Self::Node) -> LoadedKind;
	/// Attribute names and values, including `class`.
	fn attributes(&self, node: &Self::Node) -> Vec<(String, String)>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
	#[error("a container can hold at most one rendered root, but {count} child nodes were found")]
	MultipleRoots { count: usize },
}

/// Loads `node` and its subtree. Every resulting [`VNode`] refers to the host node it was loaded from.
///
/// Returns [`None`] for [`LoadedKind::Other`] nodes.
#[instrument(skip(host))]
pub fn load_node<H: LoadHost>(host: &H, node: &H::Node) -> Option<VNode<H>> {
	let mut vnode = match host.node_kind(node) {
		LoadedKind::Element(tag) => {
			let span = trace_span!("Loading element", tag = tag.as_str());
			let _enter = span.enter();
			VNode::new(VNodeType::Element(tag.into()), load_attributes(host, node), load_child_nodes(host, node))
		}
		LoadedKind::Text(text) => VNode::text(text),
		LoadedKind::Comment(comment) => VNode::comment(comment),
		LoadedKind::Other => {
			warn!("Unrecognised host node {:?}. Skipping.", node);
			return None;
		}
	};
	vnode.el = Some(node.clone());
	Some(vnode)
}

/// A single text node becomes [`Children::Text`], no nodes become [`Children::None`] and anything else a list.
pub fn load_child_nodes<H: LoadHost>(host: &H, node: &H::Node) -> Children<H> {
	let child_nodes = host.child_nodes(node);
	if let [single] = child_nodes.as_slice() {
		if let LoadedKind::Text(text) = host.node_kind(single) {
			return Children::Text(text);
		}
	}
	if child_nodes.is_empty() {
		Children::None
	} else {
		Children::List(child_nodes.iter().filter_map(|child| load_node(host, child)).collect())
	}
}

pub fn load_attributes<H: LoadHost>(host: &H, node: &H::Node) -> Props<H::Event> {
	host.attributes(node).into_iter().map(|(name, value)| (name, Value::Str(value))).collect()
}

/// Wraps `node` as [`Container`] whose current tree is loaded from its content.
///
/// # Errors
///
/// Fails if `node` has more than one child node, as only one root is rendered into each container.
pub fn load_container<H: LoadHost>(host: &H, node: H::Node) -> Result<Container<H>, LoadError> {
	let child_nodes = host.child_nodes(&node);
	let vnode = match child_nodes.as_slice() {
		[] => None,
		[root] => load_node(host, root),
		_ => return Err(LoadError::MultipleRoots { count: child_nodes.len() }),
	};
	let mut container = Container::new(node);
	container.vnode = vnode;
	Ok(container)
}
