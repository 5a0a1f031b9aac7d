use std::collections::HashMap;

use crate::special_tokens::{BOS_IND, BOS_TOK, EOS_IND, EOS_TOK, UNK_IND, UNK_TOK};
use crate::text::WordStream;

/// Bijection between words and integer-string codes.
///
/// Reserves the BOS and EOS tokens as regular (contained) entries with
/// fixed indices, and UNK as a fallback index that is never itself
/// "contained". Insertion is append-only and idempotent: a word already
/// present keeps its original index.
#[derive(Clone, Debug)]
pub struct Dictionary {
	word_to_ind: HashMap<String, String>,
	ind_to_word: HashMap<String, String>,
	v: usize,
}

impl Default for Dictionary {
	fn default() -> Self {
		Self::new()
	}
}

impl Dictionary {
	/// An empty dictionary, containing only the special tokens.
	pub fn new() -> Self {
		let mut word_to_ind = HashMap::new();
		let mut ind_to_word = HashMap::new();
		word_to_ind.insert(BOS_TOK.to_string(), BOS_IND.to_string());
		ind_to_word.insert(BOS_IND.to_string(), BOS_TOK.to_string());
		word_to_ind.insert(EOS_TOK.to_string(), EOS_IND.to_string());
		ind_to_word.insert(EOS_IND.to_string(), EOS_TOK.to_string());
		// UNK is deliberately not a key of word_to_ind: unseen words map to
		// it through `index`, but it is never "contained".
		ind_to_word.insert(UNK_IND.to_string(), UNK_TOK.to_string());
		Self { word_to_ind, ind_to_word, v: 0 }
	}

	/// Builds a dictionary seeded with `words`, in order.
	pub fn with_words<I, S>(words: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut dict = Self::new();
		for word in words {
			dict.insert(word.as_ref());
		}
		dict
	}

	/// True iff `word` was explicitly inserted (BOS/EOS count; UNK does not).
	pub fn contains(&self, word: &str) -> bool {
		self.word_to_ind.contains_key(word)
	}

	/// Inserts `word`, allocating the next integer index. No-op if already
	/// present.
	pub fn insert(&mut self, word: &str) {
		if self.contains(word) {
			return;
		}
		self.v += 1;
		let index = self.v.to_string();
		log::trace!("dictionary grew to {} words (inserted {:?} -> {})", self.v, word, index);
		self.word_to_ind.insert(word.to_string(), index.clone());
		self.ind_to_word.insert(index, word.to_string());
	}

	/// The word for `index`, or the UNK token if unknown.
	pub fn word(&self, index: &str) -> String {
		self.ind_to_word.get(index).cloned().unwrap_or_else(|| UNK_TOK.to_string())
	}

	/// The index for `word`, or the UNK index if unknown.
	pub fn index(&self, word: &str) -> String {
		self.word_to_ind.get(word).cloned().unwrap_or_else(|| UNK_IND.to_string())
	}

	/// Dictionary size, excluding BOS/EOS/UNK.
	pub fn length(&self) -> usize {
		self.v
	}

	/// Alias for [`Dictionary::length`].
	pub fn size(&self) -> usize {
		self.length()
	}

	/// Encodes a raw k-gram as `(k, code)`, where `code` is the
	/// space-separated concatenation of word indices and `k` is the number
	/// of words consumed before EOS.
	pub fn kgram_code(&self, kgram: &str) -> (usize, String) {
		let mut stream = WordStream::new(kgram);
		let mut k = 0;
		let mut code = String::new();
		loop {
			let word = stream.pop_word();
			if stream.eos() {
				break;
			}
			if !code.is_empty() {
				code.push(' ');
			}
			code.push_str(&self.index(word));
			k += 1;
		}
		(k, code)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn insert_then_lookup_round_trips() {
		let mut dict = Dictionary::new();
		dict.insert("cat");
		assert!(dict.contains("cat"));
		let idx = dict.index("cat");
		assert_eq!(dict.word(&idx), "cat");
	}

	#[test]
	fn insert_is_idempotent() {
		let mut dict = Dictionary::new();
		dict.insert("cat");
		let idx1 = dict.index("cat");
		dict.insert("cat");
		let idx2 = dict.index("cat");
		assert_eq!(idx1, idx2);
		assert_eq!(dict.length(), 1);
	}

	#[test]
	fn unknown_word_maps_to_unk() {
		let dict = Dictionary::new();
		assert_eq!(dict.index("ghost"), UNK_IND);
		assert_eq!(dict.word("999"), UNK_TOK);
	}

	#[test]
	fn unk_is_not_contained() {
		let dict = Dictionary::new();
		assert!(!dict.contains(UNK_TOK));
		assert!(dict.contains(BOS_TOK));
		assert!(dict.contains(EOS_TOK));
	}

	#[test]
	fn length_excludes_special_tokens() {
		let mut dict = Dictionary::new();
		assert_eq!(dict.length(), 0);
		dict.insert("a");
		dict.insert("b");
		assert_eq!(dict.length(), 2);
	}

	#[test]
	fn kgram_code_counts_words_and_joins_indices() {
		let mut dict = Dictionary::new();
		dict.insert("a");
		dict.insert("b");
		let (k, code) = dict.kgram_code("a b a");
		assert_eq!(k, 3);
		assert_eq!(code, "1 2 1");
	}

	#[test]
	fn kgram_code_tolerates_whitespace_and_bos() {
		let dict = Dictionary::new();
		let (k, code) = dict.kgram_code("  ___BOS___   ghost  ");
		assert_eq!(k, 2);
		assert_eq!(code, format!("{} {}", BOS_IND, UNK_IND));
	}
}
