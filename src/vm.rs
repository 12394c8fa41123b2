use std::rc::Rc;

use fxhash::FxHashMap;

use crate::compiler::{Compiler, CompilerOptions, View};
use crate::dom::{Event, Node};
use crate::object::{observe, ComputedFn};
use crate::path::Path;
use crate::{Error, Object, Result, Value};

pub type Method = Rc<dyn Fn(&Context, &Event)>;

/// What bindings are compiled against: the data root and the methods
/// event directives may call.
#[derive(Clone, Default)]
pub struct Context {
	data: Object,
	methods: Rc<FxHashMap<String, Method>>,
}

impl Context {
	pub fn new(data: Object) -> Self {
		Context {
			data,
			methods: Default::default(),
		}
	}

	pub fn with_method(mut self, name: impl Into<String>, method: Method) -> Self {
		Rc::make_mut(&mut self.methods).insert(name.into(), method);
		self
	}

	pub fn data(&self) -> &Object {
		&self.data
	}

	pub fn method(&self, name: &str) -> Option<Method> {
		self.methods.get(name).cloned()
	}

	/// Reads a path without subscribing anything.
	pub fn get(&self, path: &str) -> Value {
		Path::parse(path).resolve(&self.data, None)
	}

	/// Writes a path. Returns `false` if an intermediate segment is missing.
	pub fn set(&self, path: &str, value: impl Into<Value>) -> bool {
		Path::parse(path).assign(&self.data, value)
	}

	pub fn call(&self, name: &str, event: &Event) -> Result<()> {
		let method = self
			.method(name)
			.ok_or_else(|| Error::UnknownMethod(name.to_owned()))?;
		method(self, event);
		Ok(())
	}
}

impl std::fmt::Debug for Context {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut methods: Vec<&String> = self.methods.keys().collect();
		methods.sort();
		f.debug_struct("Context")
			.field("data", &self.data)
			.field("methods", &methods)
			.finish()
	}
}

/// Everything needed to mount a [`ViewModel`].
pub struct Options {
	data: Object,
	computed: Vec<(String, ComputedFn)>,
	methods: Vec<(String, Method)>,
	compiler: CompilerOptions,
}

impl Options {
	pub fn new(data: Object) -> Self {
		Options {
			data,
			computed: Vec::new(),
			methods: Vec::new(),
			compiler: CompilerOptions::default(),
		}
	}

	pub fn computed(mut self, name: impl Into<String>, func: ComputedFn) -> Self {
		self.computed.push((name.into(), func));
		self
	}

	pub fn method(mut self, name: impl Into<String>, method: Method) -> Self {
		self.methods.push((name.into(), method));
		self
	}

	pub fn compiler(mut self, options: CompilerOptions) -> Self {
		self.compiler = options;
		self
	}
}

/// A data tree bound to a mounted element.
///
/// Mounting makes the data reactive, installs computed properties on the
/// data root and compiles the element. Reads and writes through the view
/// model are forwarded to the data root.
#[derive(Debug)]
pub struct ViewModel {
	context: Context,
	el: Node,
	view: View,
}

impl ViewModel {
	pub fn mount(el: &Node, options: Options) -> Result<Self> {
		let Options {
			data,
			computed,
			methods,
			compiler,
		} = options;

		observe(&Value::Object(data.clone()));
		for (name, func) in computed {
			data.define_computed(name, func);
		}

		let context = methods
			.into_iter()
			.fold(Context::new(data), |cx, (name, method)| cx.with_method(name, method));

		let view = Compiler::new(compiler).compile(el, &context)?;

		Ok(ViewModel {
			context,
			el: el.clone(),
			view,
		})
	}

	pub fn data(&self) -> &Object {
		self.context.data()
	}

	pub fn context(&self) -> &Context {
		&self.context
	}

	pub fn el(&self) -> &Node {
		&self.el
	}

	pub fn view(&self) -> &View {
		&self.view
	}

	pub fn get(&self, path: &str) -> Value {
		self.context.get(path)
	}

	pub fn set(&self, path: &str, value: impl Into<Value>) -> bool {
		self.context.set(path, value)
	}

	pub fn call(&self, method: &str, event: &Event) -> Result<()> {
		self.context.call(method, event)
	}

	/// Tears down every binding. The rendered markup stays as it is.
	pub fn unmount(mut self) {
		self.view.dispose();
	}
}
