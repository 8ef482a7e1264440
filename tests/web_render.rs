#![cfg(all(target_arch = "wasm32", feature = "web"))]

use sapwood::{web::WebHost, Container, Renderer, VNode, Value};
use std::sync::Once;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INIT: Once = Once::new();

fn setup() -> (Renderer<WebHost>, Container<WebHost>) {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let host = WebHost::from_window().unwrap();
	let mount = host.document().create_element("div").unwrap();
	host.document().body().unwrap().append_child(&mount).unwrap();
	(Renderer::new(host), Container::new(mount.into()))
}

fn inner_html(container: &Container<WebHost>) -> String {
	container.node().dyn_ref::<HtmlElement>().unwrap().inner_html()
}

#[wasm_bindgen_test]
fn text() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(VNode::text("Hello sapwood!")), &mut container).unwrap();
	assert_eq!(inner_html(&container), "Hello sapwood!");
	let text = container.node().first_child().unwrap();

	renderer.render(Some(VNode::text("Bye sapwood!")), &mut container).unwrap();
	assert_eq!(inner_html(&container), "Bye sapwood!");
	assert!(container.node().first_child().unwrap().is_same_node(Some(&text)));

	renderer.render(None, &mut container).unwrap();
	assert_eq!(inner_html(&container), "");
}

#[wasm_bindgen_test]
fn comment() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(VNode::comment("Hello sapwood!")), &mut container).unwrap();
	assert_eq!(inner_html(&container), "<!--Hello sapwood!-->");

	renderer.render(None, &mut container).unwrap();
	assert_eq!(inner_html(&container), "");
}

#[wasm_bindgen_test]
fn element_create_diff_identical_remove() {
	let (mut renderer, mut container) = setup();
	let class = Value::<web_sys::Event>::list([Value::from("a"), Value::map([("b", Value::from(true)), ("c", Value::from(false))])]);
	let tree: VNode<WebHost> = VNode::element("ul")
		.with_prop("class", class)
		.with_prop("data-kind", "list")
		.with_children([VNode::element("li").with_text("one"), VNode::element("li").with_text("two")]);

	renderer.render(Some(tree.clone()), &mut container).unwrap();
	assert_eq!(inner_html(&container), r#"<ul class="a b" data-kind="list"><li>one</li><li>two</li></ul>"#);
	let ul = container.node().first_child().unwrap();

	renderer.render(Some(tree), &mut container).unwrap();
	assert_eq!(inner_html(&container), r#"<ul class="a b" data-kind="list"><li>one</li><li>two</li></ul>"#);
	assert!(container.node().first_child().unwrap().is_same_node(Some(&ul)));

	renderer.render(None, &mut container).unwrap();
	assert_eq!(inner_html(&container), "");
}

#[wasm_bindgen_test]
fn boolean_property() {
	let (mut renderer, mut container) = setup();

	renderer.render(Some(VNode::element("input").with_prop("disabled", "")), &mut container).unwrap();
	let input = container.node().first_child().unwrap().dyn_into::<web_sys::HtmlInputElement>().unwrap();
	assert!(input.disabled());

	renderer.render(Some(VNode::element("input").with_prop("disabled", false)), &mut container).unwrap();
	assert!(!input.disabled());
}
