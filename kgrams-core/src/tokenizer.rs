//! Sentence tokenization by punctuation: a pure text transformation that
//! turns one block of text into the sentence strings the k-gram engine
//! consumes. Independent of the dictionary and of k-gram counting.

use regex::Regex;

use crate::error::{Error, Result};

/// Default end-of-sentence delimiter: one or more of `.?!:;`.
pub const DEFAULT_EOS_PATTERN: &str = r"[.?!:;]+";

/// Splits a text block into sentences on a configurable punctuation
/// delimiter.
pub struct SentenceTokenizer {
	delimiter: Regex,
	keep_first_char: bool,
}

impl SentenceTokenizer {
	/// Builds a tokenizer from an explicit delimiter pattern.
	pub fn new(delimiter_pattern: &str, keep_first_char: bool) -> Result<Self> {
		let delimiter = Regex::new(delimiter_pattern)
			.map_err(|e| Error::InvalidInput(format!("invalid sentence delimiter {delimiter_pattern:?}: {e}")))?;
		Ok(Self { delimiter, keep_first_char })
	}

	/// A tokenizer using [`DEFAULT_EOS_PATTERN`].
	pub fn with_defaults(keep_first_char: bool) -> Self {
		Self::new(DEFAULT_EOS_PATTERN, keep_first_char).expect("DEFAULT_EOS_PATTERN always compiles")
	}

	/// Splits `text` into trimmed, non-empty sentences. When
	/// `keep_first_char` is set, the first character of the delimiter
	/// match that ended a sentence is appended to it (so `"Hi. Bye."`
	/// yields `["Hi.", "Bye."]` instead of `["Hi", "Bye"]`).
	pub fn split(&self, text: &str) -> Vec<String> {
		let mut sentences = Vec::new();
		let mut last_end = 0;
		for m in self.delimiter.find_iter(text) {
			let mut segment = text[last_end..m.start()].to_string();
			if self.keep_first_char {
				if let Some(c) = m.as_str().chars().next() {
					segment.push(c);
				}
			}
			push_if_nonblank(&mut sentences, &segment);
			last_end = m.end();
		}
		push_if_nonblank(&mut sentences, &text[last_end..]);
		sentences
	}

	/// Like [`Self::split`], but reports a missing input line as
	/// [`Error::InvalidInput`] rather than accepting it silently.
	pub fn split_line(&self, line: Option<&str>) -> Result<Vec<String>> {
		match line {
			Some(text) => Ok(self.split(text)),
			None => Err(Error::InvalidInput("missing input line".to_string())),
		}
	}
}

impl Default for SentenceTokenizer {
	fn default() -> Self {
		Self::with_defaults(false)
	}
}

fn push_if_nonblank(sentences: &mut Vec<String>, segment: &str) {
	let trimmed = segment.trim();
	if !trimmed.is_empty() {
		sentences.push(trimmed.to_string());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_default_delimiters() {
		let tok = SentenceTokenizer::with_defaults(false);
		assert_eq!(tok.split("Hi there. How are you? Fine!"), vec!["Hi there", "How are you", "Fine"]);
	}

	#[test]
	fn keep_first_char_reattaches_the_delimiter() {
		let tok = SentenceTokenizer::with_defaults(true);
		assert_eq!(tok.split("Hi there. Bye!"), vec!["Hi there.", "Bye!"]);
	}

	#[test]
	fn drops_blank_segments() {
		let tok = SentenceTokenizer::with_defaults(false);
		assert_eq!(tok.split("One... Two"), vec!["One", "Two"]);
	}

	#[test]
	fn missing_line_is_invalid_input() {
		let tok = SentenceTokenizer::with_defaults(false);
		assert!(matches!(tok.split_line(None), Err(Error::InvalidInput(_))));
	}
}
