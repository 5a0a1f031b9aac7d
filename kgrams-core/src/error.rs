use thiserror::Error;

/// Errors surfaced at the public boundary of this crate.
///
/// Per-word "undefined probability" results are *not* represented here;
/// see [`crate::special_tokens::UNDEFINED`] and `Smoother::probability`.
#[derive(Debug, Error)]
pub enum Error {
	/// A parameter was outside its documented domain (order too large,
	/// a discount or lambda outside `[0, 1]`, `k <= 0`, `unique(k)` with
	/// `k` greater than the model's order, ...).
	#[error("{what} must be {constraint}, got {got}")]
	OutOfRange {
		what: &'static str,
		constraint: &'static str,
		got: String,
	},

	/// Malformed input handed to one of the text-preprocessing
	/// collaborators (an erase-regex or EOS-delimiter regex that fails
	/// to compile, a missing input line).
	#[error("invalid input: {0}")]
	InvalidInput(String),
}

impl Error {
	pub(crate) fn out_of_range(what: &'static str, constraint: &'static str, got: impl std::fmt::Display) -> Self {
		Error::OutOfRange { what, constraint, got: got.to_string() }
	}
}

pub type Result<T> = std::result::Result<T, Error>;
