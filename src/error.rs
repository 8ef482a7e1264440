use crate::vnode::VNodeType;
use thiserror::Error;

/// Why a render pass stopped.
///
/// The host tree isn't rolled back, so it may be partially updated after any of these.
#[derive(Debug, Error)]
pub enum RenderError<E> {
	/// The host adapter failed. Its error is passed through unchanged.
	#[error("host adapter error: {0:?}")]
	Host(#[from] E),

	/// Component (and other extension) nodes have no lifecycle in this renderer yet.
	#[error("cannot render {0}: no lifecycle is implemented for this node type")]
	Unsupported(VNodeType),

	/// A virtual node without host node was unmounted or patched against.
	#[error("virtual node was never mounted")]
	NotMounted,

	/// The tree is nested more deeply than [`Renderer::with_depth_limit`](`crate::Renderer::with_depth_limit`) allows.
	#[error("depth limit of {limit} reached")]
	DepthLimit { limit: usize },
}
