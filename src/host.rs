//! The boundary between the reconciler and a concrete display tree.

use crate::value::Value;
use core::fmt::Debug;

/// Primitive, synchronous operations on a host tree.
///
/// The reconciler never touches host nodes in any other way.
/// Implementations carry no diffing logic; [`patch_prop`](`HostAdapter::patch_prop`) usually forwards to [`props::patch_prop`](`crate::props::patch_prop`).
pub trait HostAdapter {
	/// A cheaply clonable handle to a host node.
	type Node: Clone + Debug;
	/// The event type passed to [`Handler`](`crate::value::Handler`)s.
	type Event: HostEvent;
	/// Failures of the underlying host, propagated unchanged.
	type Error: Debug;

	fn create_element(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;
	fn create_text_node(&mut self, text: &str) -> Result<Self::Node, Self::Error>;
	fn create_comment_node(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

	/// Overwrites the payload of a text or comment node.
	fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), Self::Error>;

	/// Replaces all children of `element` with a single text node (or none, if `text` is empty).
	fn set_element_text(&mut self, element: &Self::Node, text: &str) -> Result<(), Self::Error>;

	/// Inserts `node` into `parent` before `anchor`, or appends it if `anchor` is [`None`].
	fn insert(&mut self, node: &Self::Node, parent: &Self::Node, anchor: Option<&Self::Node>) -> Result<(), Self::Error>;

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Removes `child` and its entire subtree from `parent`.
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

	/// Applies a single prop change. `None` means absent.
	fn patch_prop(&mut self, element: &Self::Node, key: &str, prev: Option<&Value<Self::Event>>, next: Option<&Value<Self::Event>>) -> Result<(), Self::Error>;
}

/// An event dispatched by the host.
pub trait HostEvent {
	/// When the event was created, on the same clock as [`PropHost::now`](`crate::props::PropHost::now`).
	fn time_stamp(&self) -> f64;
}
