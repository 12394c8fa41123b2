use crate::dom::{is_void, Node};
use crate::{Error, Result};

/// Parses markup into a fragment node.
///
/// Understands elements, quoted and bare attributes, void elements,
/// self-closing tags, comments (dropped) and the basic character entities.
/// Tags must be balanced.
pub fn parse(source: &str) -> Result<Node> {
	let mut parser = Parser { source, pos: 0 };
	let fragment = Node::fragment();
	let mut stack: Vec<Node> = vec![fragment.clone()];

	while parser.pos < source.len() {
		let rest = parser.rest();
		if rest.starts_with("<!--") {
			let end = rest
				.find("-->")
				.ok_or_else(|| parser.error("unterminated comment"))?;
			parser.pos += end + 3;
		} else if rest.starts_with("</") {
			parser.pos += 2;
			let tag = parser.name().to_ascii_lowercase();
			parser.skip_whitespace();
			parser.expect('>')?;
			let open = stack.pop().and_then(|node| node.tag().map(str::to_owned));
			if stack.is_empty() || open.as_deref() != Some(tag.as_str()) {
				return Err(parser.error(&format!("unexpected closing tag `{}`", tag)));
			}
		} else if rest.starts_with('<') {
			parser.pos += 1;
			let element = parser.open_tag()?;
			let tag = element.node.tag().unwrap_or_default().to_owned();
			if let Some(parent) = stack.last() {
				parent.append_child(&element.node);
			}
			if !element.closed && !is_void(&tag) {
				stack.push(element.node);
			}
		} else {
			let end = rest.find('<').unwrap_or(rest.len());
			let text = decode(&rest[..end]);
			parser.pos += end;
			if let Some(parent) = stack.last() {
				parent.append_child(&Node::text(text));
			}
		}
	}

	if stack.len() > 1 {
		let tag = stack
			.last()
			.and_then(|node| node.tag().map(str::to_owned))
			.unwrap_or_default();
		return Err(parser.error(&format!("unclosed tag `{}`", tag)));
	}

	Ok(fragment)
}

struct Parser<'a> {
	source: &'a str,
	pos: usize,
}

struct OpenTag {
	node: Node,
	closed: bool,
}

impl<'a> Parser<'a> {
	fn rest(&self) -> &'a str {
		&self.source[self.pos..]
	}

	fn peek(&self) -> Option<char> {
		self.rest().chars().next()
	}

	fn error(&self, message: &str) -> Error {
		Error::Markup {
			position: self.pos,
			message: message.to_owned(),
		}
	}

	fn expect(&mut self, ch: char) -> Result<()> {
		if self.peek() == Some(ch) {
			self.pos += ch.len_utf8();
			Ok(())
		} else {
			Err(self.error(&format!("expected `{}`", ch)))
		}
	}

	fn skip_whitespace(&mut self) {
		let rest = self.rest();
		self.pos += rest.len() - rest.trim_start().len();
	}

	/// Tag or attribute name.
	fn name(&mut self) -> String {
		let rest = self.rest();
		let end = rest
			.find(|c: char| c.is_whitespace() || matches!(c, '>' | '/' | '=' | '"' | '\'' | '<'))
			.unwrap_or(rest.len());
		self.pos += end;
		rest[..end].to_owned()
	}

	fn open_tag(&mut self) -> Result<OpenTag> {
		let tag = self.name();
		if tag.is_empty() {
			return Err(self.error("expected a tag name"));
		}
		let node = Node::element(tag.to_ascii_lowercase());

		loop {
			self.skip_whitespace();
			match self.peek() {
				None => return Err(self.error("unterminated tag")),
				Some('>') => {
					self.pos += 1;
					return Ok(OpenTag { node, closed: false });
				}
				Some('/') => {
					self.pos += 1;
					self.expect('>')?;
					return Ok(OpenTag { node, closed: true });
				}
				Some(_) => {
					let name = self.name();
					if name.is_empty() {
						return Err(self.error("expected an attribute name"));
					}
					self.skip_whitespace();
					let value = if self.peek() == Some('=') {
						self.pos += 1;
						self.skip_whitespace();
						self.attribute_value()?
					} else {
						String::new()
					};
					node.set_attribute(name, value);
				}
			}
		}
	}

	fn attribute_value(&mut self) -> Result<String> {
		match self.peek() {
			Some(quote @ ('"' | '\'')) => {
				self.pos += 1;
				let rest = self.rest();
				let end = rest
					.find(quote)
					.ok_or_else(|| self.error("unterminated attribute value"))?;
				self.pos += end + 1;
				Ok(decode(&rest[..end]))
			}
			_ => {
				let rest = self.rest();
				let end = rest
					.find(|c: char| c.is_whitespace() || c == '>')
					.unwrap_or(rest.len());
				self.pos += end;
				Ok(decode(&rest[..end]))
			}
		}
	}
}

fn decode(text: &str) -> String {
	if !text.contains('&') {
		return text.to_owned();
	}

	const ENTITIES: &[(&str, char)] = &[
		("&amp;", '&'),
		("&lt;", '<'),
		("&gt;", '>'),
		("&quot;", '"'),
		("&#39;", '\''),
	];

	let mut out = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(index) = rest.find('&') {
		out.push_str(&rest[..index]);
		rest = &rest[index..];
		match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
			Some((entity, ch)) => {
				out.push(*ch);
				rest = &rest[entity.len()..];
			}
			None => {
				out.push('&');
				rest = &rest[1..];
			}
		}
	}
	out.push_str(rest);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nested_elements_and_text() {
		let fragment = parse("<div id=\"app\"><p>Hello {{name}}</p><input v-model=user.age></div>").unwrap();
		let app = fragment.first_child().unwrap();
		assert_eq!(app.tag(), Some("div"));
		assert_eq!(app.attribute("id").as_deref(), Some("app"));
		assert_eq!(app.children().len(), 2);
		assert_eq!(app.text_content(), "Hello {{name}}");
		let input = &app.children()[1];
		assert_eq!(input.attribute("v-model").as_deref(), Some("user.age"));
	}

	#[test]
	fn entities_and_comments() {
		let fragment = parse("<p title='a &amp; b'>1 &lt; 2<!-- gone --></p>").unwrap();
		let p = fragment.first_child().unwrap();
		assert_eq!(p.attribute("title").as_deref(), Some("a & b"));
		assert_eq!(p.text_content(), "1 < 2");
		assert_eq!(p.outer_html(), "<p title=\"a &amp; b\">1 &lt; 2</p>");
	}

	#[test]
	fn self_closing_and_void() {
		let fragment = parse("<br><span/>x").unwrap();
		assert_eq!(fragment.children().len(), 3);
		assert_eq!(fragment.inner_html(), "<br><span></span>x");
	}

	#[test]
	fn tag_names_are_case_insensitive() {
		let fragment = parse("<DIV>x<Span>y</SPAN></div>").unwrap();
		assert_eq!(fragment.inner_html(), "<div>x<span>y</span></div>");
	}

	#[test]
	fn unbalanced_tags_fail() {
		assert!(matches!(parse("<div><p></div>"), Err(Error::Markup { .. })));
		assert!(matches!(parse("<div>"), Err(Error::Markup { .. })));
		assert!(matches!(parse("</div>"), Err(Error::Markup { .. })));
	}
}
