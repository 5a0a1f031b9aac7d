use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::special_tokens::BOS_IND;
use crate::text::{CircularBuffer, WordStream};

/// A derived table that must be rebuilt whenever the k-gram counts it was
/// built from change.
///
/// `update` receives the frequency table by reference rather than storing
/// one: a satellite borrows `KgramFreqs` only for the duration of a
/// refresh, never across calls, which sidesteps the aliasing a long-lived
/// back-reference would otherwise require.
pub trait Satellite {
	fn update(&mut self, freqs: &KgramFreqs);
}

/// k-gram frequency counts, order `1..=N`, plus the 0-gram total.
///
/// `freqs[k]` maps a k-gram code (see [`Dictionary::kgram_code`]) to its
/// raw count. `freqs[0]` has the single key `""`.
pub struct KgramFreqs {
	n: usize,
	freqs: Vec<HashMap<String, u64>>,
	dict: Dictionary,
	satellites: Vec<Rc<RefCell<dyn Satellite>>>,
}

impl KgramFreqs {
	/// An empty model of order `n`, with an empty dictionary.
	pub fn new(n: usize) -> Self {
		let mut freqs = Vec::with_capacity(n + 1);
		for _ in 0..=n {
			freqs.push(HashMap::new());
		}
		freqs[0].insert(String::new(), 0);
		Self { n, freqs, dict: Dictionary::new(), satellites: Vec::new() }
	}

	/// An empty model of order `n`, seeded with `dict`.
	pub fn with_dictionary(n: usize, dict: Dictionary) -> Self {
		let mut model = Self::new(n);
		model.dict = dict;
		model
	}

	/// Maximum k-gram order this model can count.
	pub fn n(&self) -> usize {
		self.n
	}

	/// Dictionary size, excluding BOS/EOS/UNK.
	pub fn v(&self) -> usize {
		self.dict.length()
	}

	/// Total words seen in training (each real word and each EOS counts
	/// once; BOS padding does not).
	pub fn tot_words(&self) -> u64 {
		self.freqs[0][""]
	}

	/// Number of distinct k-grams of order `k` observed so far.
	pub fn unique(&self, k: usize) -> Result<usize> {
		if k > self.n {
			return Err(Error::out_of_range("k", "<= model order N", k));
		}
		Ok(self.freqs[k].len())
	}

	/// The raw table for order `k` (`k` in `0..=N`).
	pub fn table(&self, k: usize) -> &HashMap<String, u64> {
		&self.freqs[k]
	}

	pub fn dict_contains(&self, word: &str) -> bool {
		self.dict.contains(word)
	}

	pub fn word(&self, index: &str) -> String {
		self.dict.word(index)
	}

	pub fn index(&self, word: &str) -> String {
		self.dict.index(word)
	}

	pub fn kgram_code(&self, kgram: &str) -> (usize, String) {
		self.dict.kgram_code(kgram)
	}

	pub fn dictionary(&self) -> &Dictionary {
		&self.dict
	}

	/// Raw count for `kgram`. Zero if its order exceeds `N` or it was
	/// never observed.
	pub fn query(&self, kgram: &str) -> u64 {
		let (k, code) = self.kgram_code(kgram);
		if k > self.n {
			return 0;
		}
		self.freqs[k].get(&code).copied().unwrap_or(0)
	}

	/// Registers a satellite to be refreshed by every future
	/// `process_sentences` call. Does not perform an initial `update`.
	pub fn add_satellite(&mut self, satellite: Rc<RefCell<dyn Satellite>>) {
		self.satellites.push(satellite);
	}

	/// Drops every registered satellite. Callers that rebuild a smoother
	/// repeatedly against the same table (a long-lived server, say)
	/// should call this first, or each rebuild registers another
	/// satellite that keeps refreshing alongside the ones before it.
	pub fn clear_satellites(&mut self) {
		self.satellites.clear();
	}

	/// Immediately refreshes every registered satellite from the current
	/// counts.
	pub fn update_satellites(&self) {
		for satellite in &self.satellites {
			satellite.borrow_mut().update(self);
		}
	}

	/// Ingests `sentences`, then refreshes all registered satellites
	/// exactly once.
	///
	/// If `fixed_dictionary` is `false`, previously unseen words are
	/// inserted into the dictionary as they're encountered; otherwise
	/// they're counted under the UNK code.
	pub fn process_sentences<S: AsRef<str>>(&mut self, sentences: &[S], fixed_dictionary: bool) {
		for k in 0..self.n {
			let mut padding: String = std::iter::repeat_n(format!("{} ", BOS_IND), k).collect();
			if k > 0 {
				padding.pop();
				*self.freqs[k].entry(padding).or_insert(0) += sentences.len() as u64;
			}
		}
		let padding_template = build_padding(self.n);
		for sentence in sentences {
			self.process_sentence(sentence.as_ref(), padding_template.clone(), fixed_dictionary);
		}
		self.update_satellites();
	}

	fn process_sentence(&mut self, sentence: &str, mut prefixes: CircularBuffer<String>, fixed_dictionary: bool) {
		let mut stream = WordStream::new(sentence);
		while !stream.eos() {
			*self.freqs[0].get_mut("").unwrap() += 1;
			let current = stream.pop_word();
			if !self.dict.contains(current) && !fixed_dictionary {
				self.dict.insert(current);
			}
			let code = self.dict.index(current);
			for k in 1..=self.n {
				let prefix = prefixes.read().clone();
				let key = format!("{}{}", prefix, code);
				*self.freqs[k].entry(key).or_insert(0) += 1;
				prefixes.write(format!("{}{} ", prefix, code));
				prefixes.lshift();
			}
			prefixes.rshift();
			prefixes.write(String::new());
		}
	}
}

/// Builds the per-order BOS-padded prefix buffer used while ingesting a
/// single sentence: slot `k` (after construction, reading from position 0)
/// holds `k` copies of `"$BOS "`.
fn build_padding(n: usize) -> CircularBuffer<String> {
	let mut buf = CircularBuffer::new(n, String::new());
	for k in 0..n {
		let padding: String = std::iter::repeat_n(format!("{} ", BOS_IND), k).collect();
		buf.write(padding);
		buf.lshift();
	}
	buf
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn s1_counts_match_worked_example() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);

		assert_eq!(freqs.table(0)[""], 4);
		let a = freqs.index("a");
		let b = freqs.index("b");
		assert_eq!(freqs.table(1)[&a], 2);
		assert_eq!(freqs.table(1)[&b], 1);
		assert_eq!(freqs.table(1)[BOS_IND], 1);
		assert_eq!(freqs.table(1)["0"], 1); // EOS

		assert_eq!(freqs.table(2)[&format!("{} {}", BOS_IND, a)], 1);
		assert_eq!(freqs.table(2)[&format!("{} {}", a, b)], 1);
		assert_eq!(freqs.table(2)[&format!("{} {}", b, a)], 1);
		assert_eq!(freqs.table(2)[&format!("{} 0", a)], 1);
	}

	#[test]
	fn repeated_calls_double_every_count() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		freqs.process_sentences(&["a b a"], false);

		assert_eq!(freqs.table(0)[""], 8);
		assert_eq!(freqs.table(1)[BOS_IND], 2);
		let a = freqs.index("a");
		assert_eq!(freqs.table(1)[&a], 4);
	}

	#[test]
	fn unique_rejects_orders_above_n() {
		let freqs = KgramFreqs::new(2);
		assert!(freqs.unique(2).is_ok());
		assert!(matches!(freqs.unique(3), Err(Error::OutOfRange { .. })));
	}

	#[test]
	fn query_is_zero_for_unseen_kgram() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		assert_eq!(freqs.query("a a"), 0);
	}

	#[test]
	fn fixed_dictionary_routes_new_words_to_unk_counts() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		freqs.process_sentences(&["c"], true);
		assert!(!freqs.dict_contains("c"));
		assert_eq!(freqs.query("___UNK___"), 1);
	}
}
