use sapwood::{
	memory::{HostOp, MemoryHost, MemoryNode},
	ChildrenStrategy, Container, Reconciler, RenderError, Renderer, VNode,
};
use std::{cell::Cell, rc::Rc};

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_test_writer().try_init();
}

fn setup() -> (Renderer<MemoryHost>, Container<MemoryHost>) {
	init_tracing();
	let mut renderer = Renderer::new(MemoryHost::new());
	let root = renderer.host_mut().root("body");
	(renderer, Container::new(root))
}

fn item(text: &str) -> VNode<MemoryHost> {
	VNode::element("li").with_text(text)
}

fn list(items: &[&str]) -> VNode<MemoryHost> {
	VNode::element("ul").with_children(items.iter().map(|text| item(text)))
}

fn ul(container: &Container<MemoryHost>) -> MemoryNode {
	container.node().children()[0].clone()
}

#[test]
fn list_to_list_replaces_all_children() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(list(&["A", "B"])), &mut container).unwrap();
	let ul = ul(&container);
	let old: Vec<_> = ul.children();
	renderer.host_mut().take_ops();

	renderer.render(Some(list(&["C"])), &mut container).unwrap();

	let ops = renderer.host().ops();
	assert_eq!(
		ops.iter().filter(|op| matches!(op, HostOp::RemoveChild { .. })).count(),
		2,
		"{:#?}",
		ops
	);
	assert_eq!(ops.iter().filter(|op| matches!(op, HostOp::CreateElement { .. })).count(), 1);
	assert_eq!(ops[0], HostOp::RemoveChild { parent: ul.id(), child: old[0].id() });
	assert_eq!(ops[1], HostOp::RemoveChild { parent: ul.id(), child: old[1].id() });

	assert_eq!(container.node().children()[0], ul);
	assert_eq!(ul.markup(), "<ul><li>C</li></ul>");
	assert!(old.iter().all(|li| li.parent().is_none()));
}

#[test]
fn list_children_keep_their_order() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(list(&["1", "2", "3"])), &mut container).unwrap();
	assert_eq!(container.node().markup(), "<body><ul><li>1</li><li>2</li><li>3</li></ul></body>");

	renderer.render(Some(list(&["3", "2", "1", "0"])), &mut container).unwrap();
	assert_eq!(container.node().markup(), "<body><ul><li>3</li><li>2</li><li>1</li><li>0</li></ul></body>");

	let vnode = container.vnode().unwrap();
	let children = vnode.children.as_list().unwrap();
	for (vnode, node) in children.iter().zip(ul(&container).children()) {
		assert_eq!(vnode.el(), Some(&node));
	}
}

#[test]
fn text_to_list() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(VNode::element("ul").with_text("loading")), &mut container).unwrap();
	let ul = ul(&container);
	renderer.host_mut().take_ops();

	renderer.render(Some(list(&["A"])), &mut container).unwrap();

	assert_eq!(renderer.host().ops()[0], HostOp::SetElementText { element: ul.id(), text: String::new() });
	assert_eq!(ul.markup(), "<ul><li>A</li></ul>");
}

#[test]
fn list_to_text() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(list(&["A", "B"])), &mut container).unwrap();
	let ul = ul(&container);
	let old = ul.children();
	renderer.host_mut().take_ops();

	renderer.render(Some(VNode::element("ul").with_text("empty")), &mut container).unwrap();

	let ops = renderer.host().ops();
	assert_eq!(ops.iter().filter(|op| matches!(op, HostOp::RemoveChild { .. })).count(), 2);
	assert_eq!(ops.last(), Some(&HostOp::SetElementText { element: ul.id(), text: "empty".to_owned() }));
	assert_eq!(ul.markup(), "<ul>empty</ul>");
	assert!(old.iter().all(|li| li.parent().is_none()));
}

#[test]
fn list_to_none() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(list(&["A", "B"])), &mut container).unwrap();
	let ul = ul(&container);

	renderer.render(Some(VNode::element("ul")), &mut container).unwrap();

	assert!(ul.children().is_empty());
	assert_eq!(container.node().children(), [ul]);
}

#[test]
fn text_to_none_and_back() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(item("A")), &mut container).unwrap();
	let li = ul(&container);
	renderer.host_mut().take_ops();

	renderer.render(Some(VNode::element("li")), &mut container).unwrap();
	assert_eq!(renderer.host_mut().take_ops(), [HostOp::SetElementText { element: li.id(), text: String::new() }]);
	assert_eq!(li.markup(), "<li></li>");

	renderer.render(Some(VNode::element("li")), &mut container).unwrap();
	assert!(renderer.host_mut().take_ops().is_empty());

	renderer.render(Some(item("B")), &mut container).unwrap();
	assert_eq!(li.markup(), "<li>B</li>");
	assert_eq!(ul(&container), li);
}

#[test]
fn nested_subtrees_are_removed_with_their_root() {
	let (mut renderer, mut container) = setup();

	let tree = VNode::element("section").with_children([list(&["A", "B"]), VNode::element("p").with_children([VNode::text("x"), VNode::element("b").with_text("y")])]);
	renderer.render(Some(tree), &mut container).unwrap();
	assert_eq!(container.node().markup(), "<body><section><ul><li>A</li><li>B</li></ul><p>x<b>y</b></p></section></body>");
	renderer.host_mut().take_ops();

	renderer.render(None, &mut container).unwrap();

	assert_eq!(renderer.host().ops().len(), 1);
	assert_eq!(container.node().markup(), "<body></body>");
}

/// Counts list reconciliations, then delegates to the default behaviour.
struct Counting {
	calls: Rc<Cell<usize>>,
}
impl ChildrenStrategy<MemoryHost> for Counting {
	fn patch_lists(
		&self,
		reconciler: &mut Reconciler<'_, MemoryHost, Self>,
		old: &[VNode<MemoryHost>],
		new: &mut [VNode<MemoryHost>],
		container: &MemoryNode,
		depth_limit: usize,
	) -> Result<(), RenderError<sapwood::memory::MemoryError>> {
		self.calls.set(self.calls.get() + 1);
		for child in old {
			reconciler.unmount(child)?;
		}
		for child in new {
			reconciler.patch(None, child, container, depth_limit)?;
		}
		Ok(())
	}
}

#[test]
fn custom_strategy() {
	init_tracing();
	let calls = Rc::new(Cell::new(0));
	let mut renderer = Renderer::new(MemoryHost::new()).with_strategy(Counting { calls: Rc::clone(&calls) });
	let root = renderer.host_mut().root("body");
	let mut container = Container::new(root);

	renderer.render(Some(list(&["A"])), &mut container).unwrap();
	renderer.render(Some(list(&["B", "C"])), &mut container).unwrap();
	renderer.render(Some(VNode::element("ul").with_text("done")), &mut container).unwrap();

	assert_eq!(container.node().markup(), "<body><ul>done</ul></body>");
	assert_eq!(calls.get(), 1);
}
