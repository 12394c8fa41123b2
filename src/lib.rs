//! Minimal reactive data binding.
//!
//! A data tree of [`Object`]s is made reactive with [`observe`]. A
//! [`Watcher`] resolves a dotted [`Path`] against it and subscribes to
//! every property it reads while doing so; writing a different value to
//! one of those properties re-evaluates the watcher and runs its callback
//! if the result changed. The [`Compiler`] finds `{{path}}` placeholders
//! and `v-` directives in a [`Node`] tree and creates one watcher per
//! binding. Everything runs synchronously, before the write returns.
//!
//! ```ignore
//! let root = Node::parse("<p>Hello {{name}}</p>")?;
//! let vm = ViewModel::mount(&root, Options::new(Object::new().with("name", "A")))?;
//! assert_eq!(root.text_content(), "Hello A");
//!
//! vm.set("name", "B");
//! assert_eq!(root.text_content(), "Hello B");
//! ```

pub mod macros;

mod compiler;
mod dependency;
mod directive;
mod dom;
mod error;
mod evaluation;
mod markup;
mod object;
mod path;
mod template;
mod value;
mod vm;
mod watcher;

use std::rc::Rc;

pub use compiler::{Compiler, CompilerOptions, View};
pub use dependency::Dependency;
pub use directive::Directive;
pub use dom::{Event, Handler, ListenerId, Node, NodeKind};
pub use error::{Error, Result};
pub use evaluation::{is_evaluating, Evaluation};
pub use object::{observe, ComputedFn, Object};
pub use path::{Path, Scope};
pub use template::Template;
pub use value::Value;
pub use vm::{Context, Method, Options, ViewModel};
pub use watcher::{Callback, Watcher};

/// Something that re-evaluates when a dependency it read changes.
pub trait Subscriber: 'static {
	fn invalidate(self: Rc<Self>);
}
