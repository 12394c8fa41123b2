use enclose::enclose;

use crate::compiler::View;
use crate::dom::{Event, Node};
use crate::path::Path;
use crate::vm::Context;
use crate::watcher::Watcher;
use crate::{Error, Result, Value};

/// A binding declared by a prefixed attribute, e.g. `v-model="user.age"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
	/// `v-text`: text content follows the path.
	Text(Path),
	/// `v-html`: the path's value is parsed as markup into the element.
	Html(Path),
	/// `v-model`: form value follows the path, `input` events write back.
	Model(Path),
	/// `v-on:<event>`: the event calls a method.
	On { event: String, method: String },
}

impl Directive {
	/// Parses an attribute. Returns `None` for attributes without `prefix`.
	pub fn parse(attribute: &str, prefix: &str, expr: &str) -> Result<Option<Self>> {
		let Some(rest) = attribute.strip_prefix(prefix) else {
			return Ok(None);
		};

		let (name, argument) = match rest.split_once(':') {
			Some((name, argument)) => (name, Some(argument)),
			None => (rest, None),
		};

		let directive = match name {
			"text" => Directive::Text(Path::parse(expr)),
			"html" => Directive::Html(Path::parse(expr)),
			"model" => Directive::Model(Path::parse(expr)),
			"on" => match argument.filter(|event| !event.is_empty()) {
				Some(event) => Directive::On {
					event: event.to_owned(),
					method: expr.trim().to_owned(),
				},
				None => {
					return Err(Error::MissingEvent {
						name: attribute.to_owned(),
					})
				}
			},
			_ => {
				return Err(Error::UnknownDirective {
					name: attribute.to_owned(),
				})
			}
		};

		Ok(Some(directive))
	}

	/// Renders the directive once and installs what keeps it up to date.
	pub(crate) fn bind(&self, node: &Node, cx: &Context, view: &mut View) -> Result<()> {
		match self {
			Directive::Text(path) => {
				let watcher = Watcher::new(
					cx.data().clone(),
					path.clone(),
					enclose!((node) move |value: &Value| node.set_text_content(&value.to_string())),
				)?;
				node.set_text_content(&watcher.value().to_string());
				view.watch(watcher);
			}
			Directive::Html(path) => {
				let watcher = Watcher::new(
					cx.data().clone(),
					path.clone(),
					enclose!((node) move |value: &Value| render_html(&node, value)),
				)?;
				render_html(node, &watcher.value());
				view.watch(watcher);
			}
			Directive::Model(path) => {
				let data = cx.data().clone();
				let listener = node.add_event_listener(
					"input",
					enclose!((path) move |event: &Event| {
						path.assign(&data, event.target().value());
					}),
				);
				view.listen(node.clone(), listener);

				let watcher = Watcher::new(
					cx.data().clone(),
					path.clone(),
					enclose!((node) move |value: &Value| node.set_value(&value.to_string())),
				)?;
				node.set_value(&watcher.value().to_string());
				view.watch(watcher);
			}
			Directive::On { event, method } => {
				let func = cx
					.method(method)
					.ok_or_else(|| Error::UnknownMethod(method.clone()))?;
				let listener = node.add_event_listener(
					event.as_str(),
					enclose!((cx) move |event: &Event| func(&cx, event)),
				);
				view.listen(node.clone(), listener);
			}
		}
		Ok(())
	}
}

fn render_html(node: &Node, value: &Value) {
	let markup = value.to_string();
	if let Err(error) = node.set_inner_html(&markup) {
		tracing::warn!(%error, "rendering unparsable markup as text");
		node.set_text_content(&markup);
	}
}
