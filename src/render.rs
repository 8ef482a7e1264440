//! The per-container entry point.

use crate::{
	diff::{ChildrenStrategy, Reconciler, UnmountAllMountAll},
	error::RenderError,
	host::HostAdapter,
	vnode::VNode,
};
use core::fmt::{self, Debug, Formatter};
use tracing::{instrument, trace, trace_span};

/// A host node used as mount point, together with the [`VNode`] last rendered into it.
pub struct Container<H: HostAdapter> {
	node: H::Node,
	pub(crate) vnode: Option<VNode<H>>,
}
impl<H: HostAdapter> Container<H> {
	/// Wraps a host node that nothing was rendered into yet.
	#[must_use]
	pub fn new(node: H::Node) -> Self {
		Self { node, vnode: None }
	}

	#[must_use]
	pub fn node(&self) -> &H::Node {
		&self.node
	}

	/// The [`VNode`] currently represented by the host tree below [`node`](`Container::node`), if any.
	#[must_use]
	pub fn vnode(&self) -> Option<&VNode<H>> {
		self.vnode.as_ref()
	}

	#[must_use]
	pub fn into_node(self) -> H::Node {
		self.node
	}
}
impl<H: HostAdapter> Debug for Container<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Container").field("node", &self.node).field("vnode", &self.vnode).finish()
	}
}

/// Renders [`VNode`] trees into [`Container`]s through a host adapter.
///
/// Each [`render`](`Renderer::render`) call diffs against the tree previously rendered into the same container,
/// and only against that one.
///
/// # Correct Use
///
/// A [`Container`] must only ever be rendered into with the same [`Renderer`] (or at least the same host).
/// The host tree below it must not be modified in ways that would invalidate the host nodes stored in its [`VNode`].
pub struct Renderer<H, S = UnmountAllMountAll> {
	host: H,
	strategy: S,
	depth_limit: usize,
}
impl<H: HostAdapter> Renderer<H> {
	/// Trees within this depth fit the recursion into a default 2 MiB thread stack.
	pub const DEFAULT_DEPTH_LIMIT: usize = 128;

	#[must_use]
	pub fn new(host: H) -> Self {
		Self {
			host,
			strategy: UnmountAllMountAll,
			depth_limit: Self::DEFAULT_DEPTH_LIMIT,
		}
	}
}
impl<H, S> Renderer<H, S> {
	/// Replaces how lists of children are reconciled with each other.
	#[must_use]
	pub fn with_strategy<T>(self, strategy: T) -> Renderer<H, T> {
		let Self { host, strategy: _, depth_limit } = self;
		Renderer { host, strategy, depth_limit }
	}

	/// Limits how deeply nested trees may be. Deeper trees fail with [`RenderError::DepthLimit`].
	#[must_use]
	pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	#[must_use]
	pub fn depth_limit(&self) -> usize {
		self.depth_limit
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn into_host(self) -> H {
		self.host
	}
}
impl<H, S> Renderer<H, S>
where
	H: HostAdapter,
	S: ChildrenStrategy<H>,
{
	/// Renders `vnode` into `container`, or tears the previous tree down if `vnode` is [`None`].
	///
	/// On success, `vnode` becomes the container's current tree.
	///
	/// # Errors
	///
	/// Host errors and unsupported node types are propagated.
	/// The container then keeps its previous tree, but the host tree may already be partially updated.
	#[instrument(skip_all)]
	pub fn render(&mut self, vnode: Option<VNode<H>>, container: &mut Container<H>) -> Result<(), RenderError<H::Error>> {
		let previous = container.vnode.take();
		let mut reconciler = Reconciler::new(&mut self.host, &self.strategy, self.depth_limit);

		let result = match vnode {
			Some(mut vnode) => {
				let span = trace_span!("Patching", initial = previous.is_none());
				let _enter = span.enter();
				reconciler
					.patch(previous.as_ref(), &mut vnode, &container.node, self.depth_limit)
					.map(|()| Some(vnode))
			}
			None => match &previous {
				Some(previous) => {
					let span = trace_span!("Tearing down");
					let _enter = span.enter();
					reconciler.unmount(previous).map(|()| None)
				}
				None => {
					trace!("Nothing rendered before or now.");
					Ok(None)
				}
			},
		};

		match result {
			Ok(vnode) => {
				container.vnode = vnode;
				Ok(())
			}
			Err(error) => {
				container.vnode = previous;
				Err(error)
			}
		}
	}
}
impl<H: Debug, S: Debug> Debug for Renderer<H, S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Renderer")
			.field("host", &self.host)
			.field("strategy", &self.strategy)
			.field("depth_limit", &self.depth_limit)
			.finish()
	}
}
