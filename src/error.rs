use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
	#[error("unknown directive `{name}`")]
	UnknownDirective { name: String },

	#[error("directive `{name}` requires an event name, e.g. `{name}:click`")]
	MissingEvent { name: String },

	#[error("no method named `{0}` is defined")]
	UnknownMethod(String),

	#[error("a text node cannot be used as a compilation root")]
	InvalidRoot,

	/// An evaluation was started while another one was still running
	/// on the same thread.
	#[error("an evaluation is already in progress on this thread")]
	ReentrantEvaluation,

	#[error("malformed markup at byte {position}: {message}")]
	Markup { position: usize, message: String },
}
