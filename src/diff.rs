//! The patch dispatcher, element and children reconciliation, mounting and unmounting.

use crate::{
	error::RenderError,
	host::HostAdapter,
	vnode::{Children, VNode, VNodeType},
};
use tracing::{error, instrument, trace, trace_span};

/// Text payloads are only logged with the `dangerous-logging` feature.
pub(crate) fn loggable(text: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		text
	} else {
		"<redacted>"
	}
}

/// Reconciles two child lists of the same parent.
///
/// Only called when both the old and new children are lists. Implementations must leave every node in `new` patched or mounted
/// (so that its host node is set) and every node in `old` that isn't reused unmounted.
pub trait ChildrenStrategy<H: HostAdapter> {
	#[allow(clippy::missing_errors_doc)]
	fn patch_lists(
		&self,
		reconciler: &mut Reconciler<'_, H, Self>,
		old: &[VNode<H>],
		new: &mut [VNode<H>],
		container: &H::Node,
		depth_limit: usize,
	) -> Result<(), RenderError<H::Error>>;
}

/// Unmounts all old children, then mounts all new ones.
///
/// Never reuses host nodes across list updates. Correct, but not minimal.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnmountAllMountAll;
impl<H: HostAdapter> ChildrenStrategy<H> for UnmountAllMountAll {
	fn patch_lists(
		&self,
		reconciler: &mut Reconciler<'_, H, Self>,
		old: &[VNode<H>],
		new: &mut [VNode<H>],
		container: &H::Node,
		depth_limit: usize,
	) -> Result<(), RenderError<H::Error>> {
		let span = trace_span!("Replacing list", "old.len()" = old.len(), "new.len()" = new.len());
		let _enter = span.enter();
		for child in old {
			reconciler.unmount(child)?;
		}
		for child in new {
			reconciler.patch(None, child, container, depth_limit)?;
		}
		Ok(())
	}
}

/// A single render pass over a host.
///
/// `depth_limit` parameters count the remaining nesting levels. Reaching zero fails with [`RenderError::DepthLimit`].
pub struct Reconciler<'a, H: HostAdapter, S: ?Sized> {
	host: &'a mut H,
	strategy: &'a S,
	limit: usize,
}
impl<'a, H, S> Reconciler<'a, H, S>
where
	H: HostAdapter,
	S: ChildrenStrategy<H> + ?Sized,
{
	pub(crate) fn new(host: &'a mut H, strategy: &'a S, limit: usize) -> Self {
		Self { host, strategy, limit }
	}

	pub fn host(&mut self) -> &mut H {
		self.host
	}

	/// Moves the host tree from `old` to `new` below `container`.
	///
	/// `old` must be the [`VNode`] previously patched or mounted at this position, if any.
	///
	/// # Errors
	///
	/// Host errors are propagated. Component and other extension nodes fail with [`RenderError::Unsupported`].
	#[instrument(skip_all, fields(node_type = %new.node_type, depth_limit = depth_limit))]
	pub fn patch(&mut self, old: Option<&VNode<H>>, new: &mut VNode<H>, container: &H::Node, depth_limit: usize) -> Result<(), RenderError<H::Error>> {
		if depth_limit == 0 {
			error!("Depth limit reached");
			return Err(RenderError::DepthLimit { limit: self.limit });
		}

		let old = match old {
			Some(old) if old.node_type != new.node_type => {
				let span = trace_span!("Replacing mismatching", old_type = %old.node_type);
				let _enter = span.enter();
				self.unmount(old)?;
				None
			}
			old => old,
		};

		match new.node_type {
			VNodeType::Element(_) => match old {
				None => self.mount(new, container, None, depth_limit),
				Some(old) => self.patch_element(old, new, depth_limit),
			},
			VNodeType::Text | VNodeType::Comment => self.patch_character_data(old, new, container),
			VNodeType::Component(_) | VNodeType::Other(_) => {
				error!("No lifecycle for {}", new.node_type);
				Err(RenderError::Unsupported(new.node_type.clone()))
			}
		}
	}

	/// Text and comment nodes.
	fn patch_character_data(&mut self, old: Option<&VNode<H>>, new: &mut VNode<H>, container: &H::Node) -> Result<(), RenderError<H::Error>> {
		let text = new.payload();
		match old {
			None => {
				let span = trace_span!("Creating character data", node_type = %new.node_type, text = loggable(text));
				let _enter = span.enter();
				let node = if new.node_type == VNodeType::Comment {
					self.host.create_comment_node(text)?
				} else {
					self.host.create_text_node(text)?
				};
				self.host.insert(&node, container, None)?;
				new.el = Some(node);
			}
			Some(old) => {
				let span = trace_span!("Diffing character data", node_type = %new.node_type, old = loggable(old.payload()), new = loggable(text));
				let _enter = span.enter();
				let node = old.el.clone().ok_or(RenderError::NotMounted)?;
				if old.payload() == text {
					trace!("Payload unchanged.");
				} else {
					self.host.set_text(&node, text)?;
				}
				new.el = Some(node);
			}
		}
		Ok(())
	}

	/// Updates the host element of `old` in place to match `new`.
	///
	/// # Errors
	///
	/// Fails with [`RenderError::NotMounted`] if `old` has no host node.
	#[instrument(skip_all, fields(node_type = %new.node_type))]
	pub fn patch_element(&mut self, old: &VNode<H>, new: &mut VNode<H>, depth_limit: usize) -> Result<(), RenderError<H::Error>> {
		let el = old.el.clone().ok_or(RenderError::NotMounted)?;
		new.el = Some(el.clone());

		for (key, next) in &new.props {
			let prev = old.props.get(key);
			if prev == Some(next) {
				continue;
			}
			self.host.patch_prop(&el, key, prev, Some(next))?;
		}
		for (key, prev) in &old.props {
			if !new.props.contains_key(key) {
				self.host.patch_prop(&el, key, Some(prev), None)?;
			}
		}

		self.patch_children(old, new, &el, depth_limit.saturating_sub(1))
	}

	/// Resolves the children shapes of `old` and `new`, with `container` being their shared host element.
	///
	/// The new shape alone decides what happens.
	///
	/// # Errors
	///
	/// Host errors and errors of nested patches are propagated.
	pub fn patch_children(&mut self, old: &VNode<H>, new: &mut VNode<H>, container: &H::Node, depth_limit: usize) -> Result<(), RenderError<H::Error>> {
		match &mut new.children {
			Children::Text(text) => {
				let span = trace_span!("Setting text content", text = loggable(text));
				let _enter = span.enter();
				if let Children::List(old_children) = &old.children {
					for child in old_children {
						self.unmount(child)?;
					}
				}
				self.host.set_element_text(container, text)?;
			}

			Children::List(new_children) => match &old.children {
				Children::List(old_children) => {
					let strategy = self.strategy;
					strategy.patch_lists(self, old_children, new_children, container, depth_limit)?;
				}
				Children::Text(_) | Children::None => {
					let span = trace_span!("Creating list", "new_children.len()" = new_children.len());
					let _enter = span.enter();
					self.host.set_element_text(container, "")?;
					for child in new_children {
						self.patch(None, child, container, depth_limit)?;
					}
				}
			},

			Children::None => match &old.children {
				Children::List(old_children) => {
					let span = trace_span!("Removing list", "old_children.len()" = old_children.len());
					let _enter = span.enter();
					for child in old_children {
						self.unmount(child)?;
					}
				}
				Children::Text(_) => {
					let span = trace_span!("Clearing text content");
					let _enter = span.enter();
					self.host.set_element_text(container, "")?;
				}
				Children::None => trace!("No children before or after."),
			},
		}
		Ok(())
	}

	/// Creates a new host subtree for the element `vnode` and inserts it into `container` before `anchor` (or at the end).
	///
	/// # Errors
	///
	/// Host errors are propagated. Fails with [`RenderError::Unsupported`] if `vnode` isn't an element.
	#[instrument(skip_all, fields(node_type = %vnode.node_type))]
	pub fn mount(&mut self, vnode: &mut VNode<H>, container: &H::Node, anchor: Option<&H::Node>, depth_limit: usize) -> Result<(), RenderError<H::Error>> {
		let el = match &vnode.node_type {
			VNodeType::Element(tag) => self.host.create_element(tag)?,
			node_type => return Err(RenderError::Unsupported(node_type.clone())),
		};

		match &mut vnode.children {
			Children::Text(text) => self.host.set_element_text(&el, text)?,
			Children::List(children) => {
				for child in children {
					self.patch(None, child, &el, depth_limit.saturating_sub(1))?;
				}
			}
			Children::None => (),
		}

		for (key, value) in &vnode.props {
			self.host.patch_prop(&el, key, None, Some(value))?;
		}

		self.host.insert(&el, container, anchor)?;
		vnode.el = Some(el);
		Ok(())
	}

	/// Removes the host subtree of `vnode` from its parent, if it still has one.
	///
	/// # Errors
	///
	/// Fails with [`RenderError::NotMounted`] if `vnode` has no host node.
	#[instrument(skip_all, fields(node_type = %vnode.node_type))]
	pub fn unmount(&mut self, vnode: &VNode<H>) -> Result<(), RenderError<H::Error>> {
		let el = vnode.el.as_ref().ok_or(RenderError::NotMounted)?;
		match self.host.parent_node(el) {
			Some(parent) => self.host.remove_child(&parent, el)?,
			None => trace!("Already detached."),
		}
		Ok(())
	}
}
