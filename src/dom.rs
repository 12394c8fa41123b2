//! In-memory rendering surface.
//!
//! A small document model with just what bindings need: element, text and
//! fragment nodes, attributes, a form-control value, event listeners, and
//! markup serialization.

use std::cell::{Cell, RefCell};
use std::fmt::Write;
use std::rc::{Rc, Weak};

use crate::Result;

pub type Handler = Rc<dyn Fn(&Event)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
	Element(String),
	Text,
	Fragment,
}

#[derive(Clone)]
pub struct Node {
	body: Rc<NodeBody>,
}

struct NodeBody {
	kind: NodeKind,
	inner: RefCell<NodeInner>,
}

#[derive(Default)]
struct NodeInner {
	parent: Weak<NodeBody>,
	children: Vec<Node>,
	attributes: Vec<(String, String)>,
	text: String,
	value: String,
	listeners: Vec<Listener>,
}

struct Listener {
	id: ListenerId,
	event: String,
	handler: Handler,
}

thread_local! {
	static NEXT_LISTENER: Cell<u64> = Cell::new(0);
}

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

pub(crate) fn is_void(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

impl Node {
	fn new(kind: NodeKind) -> Self {
		Node {
			body: Rc::new(NodeBody {
				kind,
				inner: RefCell::new(NodeInner::default()),
			}),
		}
	}

	pub fn element(tag: impl Into<String>) -> Self {
		Node::new(NodeKind::Element(tag.into()))
	}

	pub fn text(text: impl Into<String>) -> Self {
		let node = Node::new(NodeKind::Text);
		node.body.inner.borrow_mut().text = text.into();
		node
	}

	pub fn fragment() -> Self {
		Node::new(NodeKind::Fragment)
	}

	/// Parses `markup` into a fragment.
	pub fn parse(markup: &str) -> Result<Self> {
		crate::markup::parse(markup)
	}

	pub fn kind(&self) -> &NodeKind {
		&self.body.kind
	}

	pub fn tag(&self) -> Option<&str> {
		match &self.body.kind {
			NodeKind::Element(tag) => Some(tag),
			_ => None,
		}
	}

	pub fn is_element(&self) -> bool {
		matches!(self.body.kind, NodeKind::Element(_))
	}

	pub fn is_text(&self) -> bool {
		self.body.kind == NodeKind::Text
	}

	pub fn ptr_eq(&self, other: &Node) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}

	pub fn parent(&self) -> Option<Node> {
		self.body
			.inner
			.borrow()
			.parent
			.upgrade()
			.map(|body| Node { body })
	}

	pub fn children(&self) -> Vec<Node> {
		self.body.inner.borrow().children.clone()
	}

	pub fn first_child(&self) -> Option<Node> {
		self.body.inner.borrow().children.first().cloned()
	}

	/// Moves `child` to the end of this node's children, detaching it from
	/// its previous parent. Appending a fragment moves the fragment's
	/// children instead.
	pub fn append_child(&self, child: &Node) {
		if child.body.kind == NodeKind::Fragment {
			for item in child.take_children() {
				self.append_child(&item);
			}
			return;
		}

		if let Some(parent) = child.parent() {
			parent.remove_child(child);
		}
		child.body.inner.borrow_mut().parent = Rc::downgrade(&self.body);
		self.body.inner.borrow_mut().children.push(child.clone());
	}

	pub fn remove_child(&self, child: &Node) -> bool {
		let mut inner = self.body.inner.borrow_mut();
		let Some(index) = inner.children.iter().position(|c| c.ptr_eq(child)) else {
			return false;
		};
		let removed = inner.children.remove(index);
		removed.body.inner.borrow_mut().parent = Weak::new();
		true
	}

	/// Detaches and returns every child.
	pub fn take_children(&self) -> Vec<Node> {
		let children = std::mem::take(&mut self.body.inner.borrow_mut().children);
		for child in &children {
			child.body.inner.borrow_mut().parent = Weak::new();
		}
		children
	}

	pub fn attributes(&self) -> Vec<(String, String)> {
		self.body.inner.borrow().attributes.clone()
	}

	pub fn attribute(&self, name: &str) -> Option<String> {
		self.body
			.inner
			.borrow()
			.attributes
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.clone())
	}

	pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		let mut inner = self.body.inner.borrow_mut();
		match inner.attributes.iter_mut().find(|(key, _)| *key == name) {
			Some((_, current)) => *current = value,
			None => inner.attributes.push((name, value)),
		}
	}

	/// Concatenated text of this node and its descendants.
	pub fn text_content(&self) -> String {
		let inner = self.body.inner.borrow();
		match self.body.kind {
			NodeKind::Text => inner.text.clone(),
			_ => inner.children.iter().map(Node::text_content).collect(),
		}
	}

	/// Replaces the text of a text node, or all children of an element
	/// with a single text node.
	pub fn set_text_content(&self, text: &str) {
		if self.is_text() {
			self.body.inner.borrow_mut().text = text.to_owned();
			return;
		}

		self.take_children();
		if !text.is_empty() {
			self.append_child(&Node::text(text));
		}
	}

	/// Replaces all children with the nodes parsed from `markup`.
	pub fn set_inner_html(&self, markup: &str) -> Result<()> {
		let fragment = Node::parse(markup)?;
		self.take_children();
		self.append_child(&fragment);
		Ok(())
	}

	pub fn inner_html(&self) -> String {
		let mut out = String::new();
		for child in self.children() {
			child.write_html(&mut out);
		}
		out
	}

	pub fn outer_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out);
		out
	}

	/// Current value of a form control.
	pub fn value(&self) -> String {
		self.body.inner.borrow().value.clone()
	}

	pub fn set_value(&self, value: &str) {
		self.body.inner.borrow_mut().value = value.to_owned();
	}

	pub fn add_event_listener(&self, event: impl Into<String>, handler: impl Fn(&Event) + 'static) -> ListenerId {
		let id = ListenerId(NEXT_LISTENER.with(|next| {
			let id = next.get();
			next.set(id + 1);
			id
		}));

		self.body.inner.borrow_mut().listeners.push(Listener {
			id,
			event: event.into(),
			handler: Rc::new(handler),
		});
		id
	}

	pub fn remove_event_listener(&self, id: ListenerId) -> bool {
		let mut inner = self.body.inner.borrow_mut();
		let before = inner.listeners.len();
		inner.listeners.retain(|listener| listener.id != id);
		inner.listeners.len() != before
	}

	pub fn listeners(&self) -> usize {
		self.body.inner.borrow().listeners.len()
	}

	/// Runs the listeners registered for the event's type on this node.
	pub fn dispatch(&self, event: &Event) {
		let handlers: Vec<Handler> = self
			.body
			.inner
			.borrow()
			.listeners
			.iter()
			.filter(|listener| listener.event == event.kind)
			.map(|listener| listener.handler.clone())
			.collect();

		for handler in handlers {
			handler(event);
		}
	}

	/// Sets the value of a form control and fires `input` on it.
	pub fn input(&self, value: &str) {
		self.set_value(value);
		self.dispatch(&Event::new("input", self));
	}

	fn write_html(&self, out: &mut String) {
		let inner = self.body.inner.borrow();
		match &self.body.kind {
			NodeKind::Text => escape(&inner.text, false, out),
			NodeKind::Fragment => {
				for child in &inner.children {
					child.write_html(out);
				}
			}
			NodeKind::Element(tag) => {
				let _ = write!(out, "<{}", tag);
				for (name, value) in &inner.attributes {
					let _ = write!(out, " {}=\"", name);
					escape(value, true, out);
					out.push('"');
				}
				out.push('>');
				if is_void(tag) {
					return;
				}
				for child in &inner.children {
					child.write_html(out);
				}
				let _ = write!(out, "</{}>", tag);
			}
		}
	}
}

fn escape(text: &str, attribute: bool, out: &mut String) {
	for ch in text.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' if attribute => out.push_str("&quot;"),
			_ => out.push(ch),
		}
	}
}

impl std::fmt::Debug for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.outer_html())
	}
}

/// An event delivered to listeners.
#[derive(Clone, Debug)]
pub struct Event {
	kind: String,
	target: Node,
}

impl Event {
	pub fn new(kind: impl Into<String>, target: &Node) -> Self {
		Event {
			kind: kind.into(),
			target: target.clone(),
		}
	}

	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn target(&self) -> &Node {
		&self.target
	}
}
