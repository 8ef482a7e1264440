use sapwood::{
	load::{load_container, LoadError},
	memory::{HostOp, MemoryHost},
	Container, HostAdapter, Renderer, VNode, Value,
};

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_test_writer().try_init();
}

/// Renders `vnode` with a separate renderer, so that only the host tree is shared.
fn prerender(host: MemoryHost, vnode: VNode<MemoryHost>) -> (MemoryHost, Container<MemoryHost>) {
	let mut renderer = Renderer::new(host);
	let root = renderer.host_mut().root("body");
	let mut container = Container::new(root);
	renderer.render(Some(vnode), &mut container).unwrap();
	let mut host = renderer.into_host();
	host.take_ops();
	(host, container)
}

#[test]
fn loaded_trees_are_patched_in_place() {
	init_tracing();
	let tree = VNode::element("main")
		.with_prop("class", "app")
		.with_prop("lang", "en")
		.with_children([VNode::element("h1").with_text("Title"), VNode::comment("slot")]);
	let (host, prerendered) = prerender(MemoryHost::new(), tree);
	let main = prerendered.node().children()[0].clone();

	let mut container = load_container(&host, prerendered.into_node()).unwrap();
	let loaded = container.vnode().unwrap();
	assert_eq!(loaded.props.get("class"), Some(&Value::from("app")));
	assert_eq!(loaded.el(), Some(&main));
	assert_eq!(loaded.children.as_list().map(<[_]>::len), Some(2));

	let mut renderer = Renderer::new(host);
	renderer
		.render(Some(VNode::element("main").with_prop("class", "app").with_prop("lang", "de")), &mut container)
		.unwrap();

	let ops = renderer.host().ops();
	assert!(!ops.iter().any(|op| matches!(op, HostOp::CreateElement { .. })), "{:#?}", ops);
	assert_eq!(container.node().children()[0], main);
	assert_eq!(main.markup(), r#"<main class="app" lang="de"></main>"#);
}

#[test]
fn equal_text_tree_after_loading_reuses_everything() {
	init_tracing();
	let tree = || VNode::element("p").with_prop("id", "x").with_prop("class", "lead").with_prop("lang", "en").with_text("hello");
	let (host, prerendered) = prerender(MemoryHost::new(), tree());
	let p = prerendered.node().children()[0].clone();

	let mut container = load_container(&host, prerendered.into_node()).unwrap();
	assert_eq!(container.vnode().unwrap().props.get("id"), Some(&Value::from("x")));

	let mut renderer = Renderer::new(host);
	renderer.render(Some(tree()), &mut container).unwrap();

	assert_eq!(renderer.host().ops(), [HostOp::SetElementText { element: p.id(), text: "hello".to_owned() }]);
	assert_eq!(container.node().children(), [p]);
}

#[test]
fn equal_list_tree_after_loading_remounts_only_the_list() {
	init_tracing();
	let tree = || VNode::element("ul").with_prop("id", "x").with_children([VNode::element("li").with_text("a")]);
	let (host, prerendered) = prerender(MemoryHost::new(), tree());
	let ul = prerendered.node().children()[0].clone();
	let old_li = ul.children()[0].clone();

	let mut container = load_container(&host, prerendered.into_node()).unwrap();
	let mut renderer = Renderer::new(host);
	renderer.render(Some(tree()), &mut container).unwrap();

	let new_li = ul.children()[0].clone();
	assert_ne!(new_li, old_li);
	assert_eq!(
		renderer.host().ops(),
		[
			HostOp::RemoveChild { parent: ul.id(), child: old_li.id() },
			HostOp::CreateElement { tag: "li".to_owned() },
			HostOp::SetElementText { element: new_li.id(), text: "a".to_owned() },
			HostOp::Insert { node: new_li.id(), parent: ul.id(), anchor: None },
		]
	);
	assert_eq!(container.node().children(), [ul]);
}

#[test]
fn single_text_child_loads_as_text() {
	init_tracing();
	let (host, prerendered) = prerender(MemoryHost::new(), VNode::element("p").with_text("hello"));

	let container = load_container(&host, prerendered.into_node()).unwrap();

	assert_eq!(container.vnode().unwrap().children.as_text(), Some("hello"));
}

#[test]
fn empty_container() {
	let mut host = MemoryHost::new();
	let root = host.root("body");

	let container = load_container(&host, root).unwrap();

	assert!(container.vnode().is_none());
}

#[test]
fn multiple_roots() {
	init_tracing();
	let (host, prerendered) = prerender(MemoryHost::new(), VNode::text("one"));
	let mut renderer = Renderer::new(host);
	let second = renderer.host_mut().root("aside");
	let node = prerendered.into_node();
	renderer.host_mut().insert(&second, &node, None).unwrap();

	let error = load_container(renderer.host(), node).unwrap_err();

	assert_eq!(error, LoadError::MultipleRoots { count: 2 });
}
