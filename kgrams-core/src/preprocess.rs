//! Input preprocessing: an erase-regex plus optional lower-casing.
//!
//! A pure text transformation that feeds sentences into the core; it has
//! no notion of words, dictionaries, or k-grams.

use regex::Regex;

use crate::error::{Error, Result};

/// Default erase pattern: strips everything that isn't a sentence
/// delimiter, an apostrophe, an alphanumeric or whitespace character.
pub const DEFAULT_ERASE_PATTERN: &str = r"[^.?!:;'[:alnum:][:space:]]";

/// Erases unwanted characters from raw text and optionally lower-cases it.
pub struct Preprocessor {
	erase: Regex,
	lower_case: bool,
}

impl Preprocessor {
	/// Builds a preprocessor from an explicit erase pattern.
	pub fn new(erase_pattern: &str, lower_case: bool) -> Result<Self> {
		let erase = Regex::new(erase_pattern).map_err(|e| Error::InvalidInput(format!("invalid erase regex {erase_pattern:?}: {e}")))?;
		Ok(Self { erase, lower_case })
	}

	/// A preprocessor using [`DEFAULT_ERASE_PATTERN`].
	pub fn with_defaults(lower_case: bool) -> Self {
		Self::new(DEFAULT_ERASE_PATTERN, lower_case).expect("DEFAULT_ERASE_PATTERN always compiles")
	}

	/// Erases disallowed characters, then lower-cases if configured.
	pub fn process(&self, text: &str) -> String {
		let erased = self.erase.replace_all(text, "");
		if self.lower_case {
			erased.to_lowercase()
		} else {
			erased.into_owned()
		}
	}
}

impl Default for Preprocessor {
	fn default() -> Self {
		Self::with_defaults(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn erases_punctuation_outside_allowed_set() {
		let pp = Preprocessor::with_defaults(false);
		assert_eq!(pp.process("Hello, World! (really?)"), "Hello World! really?");
	}

	#[test]
	fn lower_cases_when_enabled() {
		let pp = Preprocessor::with_defaults(true);
		assert_eq!(pp.process("Hello World"), "hello world");
	}

	#[test]
	fn preserves_apostrophes_and_sentence_delimiters() {
		let pp = Preprocessor::with_defaults(false);
		assert_eq!(pp.process("don't stop."), "don't stop.");
	}

	#[test]
	fn invalid_regex_is_reported() {
		assert!(matches!(Preprocessor::new("(unterminated", false), Err(Error::InvalidInput(_))));
	}
}
