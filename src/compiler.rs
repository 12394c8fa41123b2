use std::rc::Rc;

use enclose::enclose;

use crate::directive::Directive;
use crate::dom::{ListenerId, Node};
use crate::template::Template;
use crate::vm::Context;
use crate::watcher::Watcher;
use crate::{Error, Result, Value};

/// Markup conventions recognized by the [`Compiler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerOptions {
	/// Prefix of directive attributes.
	pub prefix: String,
	/// Opening interpolation delimiter.
	pub open: String,
	/// Closing interpolation delimiter.
	pub close: String,
}

impl Default for CompilerOptions {
	fn default() -> Self {
		CompilerOptions {
			prefix: "v-".into(),
			open: "{{".into(),
			close: "}}".into(),
		}
	}
}

/// Discovers bindings in markup and wires them to watchers.
#[derive(Clone, Debug, Default)]
pub struct Compiler {
	options: CompilerOptions,
}

impl Compiler {
	pub fn new(options: CompilerOptions) -> Self {
		Compiler { options }
	}

	pub fn options(&self) -> &CompilerOptions {
		&self.options
	}

	/// Compiles the children of `root` against `cx`.
	///
	/// The children are moved into a detached fragment while they are being
	/// processed and put back afterwards, also when compilation fails. On
	/// failure every binding installed so far is torn down again.
	pub fn compile(&self, root: &Node, cx: &Context) -> Result<View> {
		if root.is_text() {
			return Err(Error::InvalidRoot);
		}

		let fragment = Node::fragment();
		for child in root.take_children() {
			fragment.append_child(&child);
		}

		let mut view = View::default();
		let result = self.compile_children(&fragment, cx, &mut view);
		root.append_child(&fragment);
		result?;

		tracing::debug!(
			watchers = view.watchers.len(),
			listeners = view.listeners.len(),
			"compiled view"
		);
		Ok(view)
	}

	fn compile_children(&self, node: &Node, cx: &Context, view: &mut View) -> Result<()> {
		for child in node.children() {
			if child.is_element() {
				self.compile_element(&child, cx, view)?;
				self.compile_children(&child, cx, view)?;
			} else if child.is_text() {
				self.compile_text(&child, cx, view)?;
			}
		}
		Ok(())
	}

	fn compile_element(&self, node: &Node, cx: &Context, view: &mut View) -> Result<()> {
		for (name, expr) in node.attributes() {
			if let Some(directive) = Directive::parse(&name, &self.options.prefix, &expr)? {
				tracing::trace!(?directive, "binding directive");
				directive.bind(node, cx, view)?;
			}
		}
		Ok(())
	}

	/// Every placeholder gets its own watcher, and each of them re-renders
	/// the whole text.
	fn compile_text(&self, node: &Node, cx: &Context, view: &mut View) -> Result<()> {
		let template = Template::parse(&node.text_content(), &self.options.open, &self.options.close);
		if !template.has_placeholders() {
			return Ok(());
		}

		let template = Rc::new(template);
		let data = cx.data();
		for path in template.placeholders() {
			let watcher = Watcher::new(
				data.clone(),
				path.clone(),
				enclose!((node, template, data) move |_: &Value| {
					node.set_text_content(&template.render(&data, None));
				}),
			)?;
			view.watch(watcher);
		}

		node.set_text_content(&template.render(data, None));
		Ok(())
	}
}

/// The live bindings of a compiled tree.
///
/// Dropping the view disposes every watcher and removes every listener
/// it installed.
#[derive(Default)]
pub struct View {
	watchers: Vec<Watcher>,
	listeners: Vec<(Node, ListenerId)>,
}

impl View {
	pub(crate) fn watch(&mut self, watcher: Watcher) {
		self.watchers.push(watcher);
	}

	pub(crate) fn listen(&mut self, node: Node, listener: ListenerId) {
		self.listeners.push((node, listener));
	}

	pub fn watchers(&self) -> &[Watcher] {
		&self.watchers
	}

	pub fn listeners(&self) -> usize {
		self.listeners.len()
	}

	pub fn dispose(&mut self) {
		for watcher in self.watchers.drain(..) {
			watcher.dispose();
		}
		for (node, listener) in self.listeners.drain(..) {
			node.remove_event_listener(listener);
		}
	}
}

impl Drop for View {
	fn drop(&mut self) {
		self.dispose();
	}
}

impl std::fmt::Debug for View {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("View")
			.field("watchers", &self.watchers)
			.field("listeners", &self.listeners.len())
			.finish()
	}
}
