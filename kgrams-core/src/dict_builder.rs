//! Dictionary-construction heuristics over a text batch: they produce a
//! word list that seeds a [`crate::dictionary::Dictionary`] /
//! [`crate::model::KgramFreqs`], but don't touch either themselves.
//!
//! All three strategies rank words by a max-heap keyed by
//! `(count, Reverse(word))`, so ties break by ascending lexicographic
//! order of the word (a word that sorts earlier wins the tie).

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{Error, Result};
use crate::text::WordStream;

/// Counts word occurrences across a batch of already-split sentences.
pub fn word_frequencies<S: AsRef<str>>(sentences: &[S]) -> HashMap<String, u64> {
	let mut freqs = HashMap::new();
	for sentence in sentences {
		let mut stream = WordStream::new(sentence.as_ref());
		loop {
			let word = stream.pop_word();
			if stream.eos() {
				break;
			}
			*freqs.entry(word.to_string()).or_insert(0) += 1;
		}
	}
	freqs
}

fn ranked_heap(freqs: &HashMap<String, u64>) -> BinaryHeap<(u64, Reverse<String>)> {
	freqs.iter().map(|(w, &c)| (c, Reverse(w.clone()))).collect()
}

/// The `n` most frequent words, ties broken lexicographically.
pub fn top_n(freqs: &HashMap<String, u64>, n: usize) -> Vec<String> {
	let mut heap = ranked_heap(freqs);
	let mut out = Vec::with_capacity(n.min(heap.len()));
	while out.len() < n {
		match heap.pop() {
			Some((_, Reverse(word))) => out.push(word),
			None => break,
		}
	}
	out
}

/// Every word occurring at least `min_count` times, most frequent first.
pub fn frequency_threshold(freqs: &HashMap<String, u64>, min_count: u64) -> Vec<String> {
	let mut heap = ranked_heap(freqs);
	let mut out = Vec::new();
	while let Some((count, Reverse(word))) = heap.pop() {
		if count < min_count {
			break;
		}
		out.push(word);
	}
	out
}

/// The smallest most-frequent-first prefix of the vocabulary whose
/// cumulative token count reaches `target_fraction` of all tokens.
pub fn coverage(freqs: &HashMap<String, u64>, target_fraction: f64) -> Result<Vec<String>> {
	if !(0.0..=1.0).contains(&target_fraction) {
		return Err(Error::out_of_range("target_fraction", "in [0, 1]", target_fraction));
	}
	let total: u64 = freqs.values().sum();
	if total == 0 {
		return Ok(Vec::new());
	}
	let target = total as f64 * target_fraction;
	let mut heap = ranked_heap(freqs);
	let mut out = Vec::new();
	let mut cumulative = 0u64;
	while (cumulative as f64) < target {
		match heap.pop() {
			Some((count, Reverse(word))) => {
				out.push(word);
				cumulative += count;
			}
			None => break,
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn freqs() -> HashMap<String, u64> {
		word_frequencies(&["a b a", "b c", "a b"])
	}

	#[test]
	fn top_n_orders_by_descending_frequency() {
		// a:3, b:3, c:1
		assert_eq!(top_n(&freqs(), 2), vec!["a", "b"]);
	}

	#[test]
	fn ties_break_lexicographically_ascending() {
		let mut f = HashMap::new();
		f.insert("z".to_string(), 5);
		f.insert("a".to_string(), 5);
		assert_eq!(top_n(&f, 1), vec!["a"]);
	}

	#[test]
	fn frequency_threshold_keeps_only_frequent_enough_words() {
		assert_eq!(frequency_threshold(&freqs(), 2), vec!["a", "b"]);
	}

	#[test]
	fn coverage_stops_once_fraction_is_reached() {
		// total = 7 (a:3 b:3 c:1); 80% = 5.6 -> needs a, b (6 >= 5.6)
		let selected = coverage(&freqs(), 0.8).unwrap();
		assert_eq!(selected, vec!["a", "b"]);
	}

	#[test]
	fn coverage_rejects_fraction_outside_unit_interval() {
		assert!(matches!(coverage(&freqs(), 1.5), Err(Error::OutOfRange { .. })));
	}
}
