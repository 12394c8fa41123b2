use crate::evaluation::Evaluation;
use crate::path::Path;
use crate::Object;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Placeholder(Path),
}

/// Text with interpolation placeholders, e.g. `Hello {{user.name}}!`.
///
/// Placeholders are matched lazily: each one ends at the first closing
/// delimiter after at least one character, and never spans a line break.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
	segments: Vec<Segment>,
}

impl Template {
	pub fn parse(text: &str, open: &str, close: &str) -> Self {
		let mut segments = Vec::new();
		let mut literal = String::new();
		let mut rest = text;

		while let Some(start) = rest.find(open) {
			let body = &rest[start + open.len()..];
			match placeholder_end(body, close) {
				Some(end) => {
					literal.push_str(&rest[..start]);
					if !literal.is_empty() {
						segments.push(Segment::Literal(std::mem::take(&mut literal)));
					}
					segments.push(Segment::Placeholder(Path::parse(&body[..end])));
					rest = &body[end + close.len()..];
				}
				None => {
					// Not a placeholder here; retry one character further.
					let skip = start + rest[start..].chars().next().map_or(1, char::len_utf8);
					literal.push_str(&rest[..skip]);
					rest = &rest[skip..];
				}
			}
		}

		literal.push_str(rest);
		if !literal.is_empty() {
			segments.push(Segment::Literal(literal));
		}

		Template { segments }
	}

	pub fn has_placeholders(&self) -> bool {
		self.placeholders().next().is_some()
	}

	pub fn placeholders(&self) -> impl Iterator<Item = &Path> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Placeholder(path) => Some(path),
			Segment::Literal(_) => None,
		})
	}

	/// Substitutes every placeholder with its current value.
	pub fn render(&self, data: &Object, eval: Option<&Evaluation>) -> String {
		let mut out = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => out.push_str(text),
				Segment::Placeholder(path) => out.push_str(&path.resolve(data, eval).to_string()),
			}
		}
		out
	}
}

fn placeholder_end(body: &str, close: &str) -> Option<usize> {
	let first = body.chars().next().filter(|ch| *ch != '\n')?;
	let from = first.len_utf8();
	let end = from + body[from..].find(close)?;
	if body[..end].contains('\n') {
		return None;
	}
	Some(end)
}
