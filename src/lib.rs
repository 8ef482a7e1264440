#![doc(html_root_url = "https://docs.rs/sapwood/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A retained-tree VDOM reconciler.
//!
//! [`Renderer::render`] diffs a [`VNode`] tree against the one previously rendered into the same [`Container`]
//! and applies the difference through a [`HostAdapter`].
//! Host nodes are reused wherever a node keeps its type, so only changed props, text and child lists cause host mutations.
//!
//! Two adapters are included: [`memory::MemoryHost`], a headless tree that records each call,
//! and (with the `web` feature) `web::WebHost` for the browser DOM.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod diff;
mod error;
pub mod host;
pub mod load;
pub mod memory;
pub mod props;
mod render;
pub mod value;
pub mod vnode;
#[cfg(feature = "web")]
pub mod web;

pub use diff::{ChildrenStrategy, Reconciler, UnmountAllMountAll};
pub use error::RenderError;
pub use host::{HostAdapter, HostEvent};
pub use render::{Container, Renderer};
pub use value::{Handler, Value};
pub use vnode::{Children, Props, VNode, VNodeType};
