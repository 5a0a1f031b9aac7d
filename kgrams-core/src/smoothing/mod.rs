//! Conditional word-probability smoothers and the shared string-surgery
//! helpers (`truncate`, `backoff`) they're built from.
//!
//! Every smoother exposes the same small capability set --
//! [`Smoother::probability`], [`Smoother::dict_size`], [`Smoother::word`]
//! and [`Smoother::padding_length`] -- so [`crate::sampler::Sampler`] can
//! be generic over any of them without an inheritance hierarchy.

mod absolute_discount;
mod add_k;
mod kneser_ney;
mod maximum_likelihood;
mod modified_kneser_ney;
mod stupid_backoff;
mod witten_bell;

pub use absolute_discount::AbsoluteDiscount;
pub use add_k::AddK;
pub use kneser_ney::KneserNey;
pub use maximum_likelihood::Ml;
pub use modified_kneser_ney::ModifiedKneserNey;
pub use stupid_backoff::StupidBackoff;
pub use witten_bell::WittenBell;

use crate::special_tokens::{BOS_TOK, EOS_TOK, UNDEFINED};
use crate::text::WordStream;

/// Shared capability set implemented by every smoother in this module.
pub trait Smoother {
	/// `P(word | context)`, or [`UNDEFINED`] when the conditional
	/// probability has no defined value for this context.
	fn probability(&self, word: &str, context: &str) -> f64;

	/// Dictionary size `V`, excluding BOS/EOS/UNK.
	fn dict_size(&self) -> usize;

	/// Word for `index`, delegating to the underlying dictionary.
	fn word(&self, index: &str) -> String;

	/// Length of the BOS padding this smoother prepends when scoring a
	/// whole sentence (`N_eff - 1`).
	fn padding_length(&self) -> usize;
}

/// Keeps only the last `k - 1` whitespace-separated words of `context`,
/// character-exact (a kept word may be preceded by the space that used
/// to separate it from the discarded prefix).
pub fn truncate(context: &str, k: usize) -> &str {
	if k == 0 {
		return context;
	}
	let target_words = k - 1;
	if target_words == 0 {
		return "";
	}
	let bytes = context.as_bytes();
	if bytes.is_empty() {
		return context;
	}
	let mut start = bytes.len() - 1;
	let mut n_words = 0usize;
	loop {
		if n_words >= target_words {
			break;
		}
		let nn = match last_not_of_space(bytes, start) {
			Some(i) if i != 0 => i,
			_ => return context,
		};
		let sp = match last_of_space(bytes, nn) {
			Some(i) if i != 0 => i,
			_ => return context,
		};
		start = sp;
		n_words += 1;
	}
	&context[start..]
}

/// Drops the leftmost whitespace-separated word of `context`.
pub fn backoff(context: &str) -> &str {
	let bytes = context.as_bytes();
	let first_non_space = match first_not_of_space(bytes, 0) {
		Some(i) => i,
		None => return "",
	};
	match first_of_space(bytes, first_non_space) {
		None => "",
		Some(pos) => match first_not_of_space(bytes, pos) {
			None => "",
			Some(_) => &context[pos..],
		},
	}
}

fn first_not_of_space(bytes: &[u8], from: usize) -> Option<usize> {
	(from..bytes.len()).find(|&i| bytes[i] != b' ')
}

fn first_of_space(bytes: &[u8], from: usize) -> Option<usize> {
	(from..bytes.len()).find(|&i| bytes[i] == b' ')
}

fn last_not_of_space(bytes: &[u8], upto: usize) -> Option<usize> {
	(0..=upto).rev().find(|&i| bytes[i] != b' ')
}

fn last_of_space(bytes: &[u8], upto: usize) -> Option<usize> {
	(0..=upto).rev().find(|&i| bytes[i] == b' ')
}

fn ln_or_nan(p: f64) -> f64 {
	if p == UNDEFINED {
		f64::NAN
	} else {
		p.ln()
	}
}

/// Scores a whole sentence against `smoother`: prepends BOS padding,
/// walks the sentence word by word accumulating `log P(word | context)`,
/// then folds in `P(EOS | context)`. Returns `(probability, word_count)`
/// when `log` is false, `(log_probability, word_count)` when true.
///
/// An explicit BOS token appearing mid-sentence is skipped silently,
/// rather than scored or folded into the context -- it cannot be a
/// meaningful prediction target and the context already starts padded
/// with it.
pub fn score<S: Smoother + ?Sized>(smoother: &S, sentence: &str, log: bool) -> (f64, usize) {
	let padding_words = smoother.padding_length();
	let mut context = vec![BOS_TOK; padding_words].join(" ");
	let mut log_prob = 0.0;
	let mut count = 0usize;

	let mut stream = WordStream::new(sentence);
	loop {
		let word = stream.pop_word();
		if stream.eos() {
			break;
		}
		if word == BOS_TOK {
			continue;
		}
		let p = smoother.probability(word, &context);
		log_prob += ln_or_nan(p);
		count += 1;
		context = truncate(&format!("{} {}", context, word), padding_words + 1).to_string();
	}

	let p_eos = smoother.probability(EOS_TOK, &context);
	log_prob += ln_or_nan(p_eos);
	count += 1;

	if log {
		(log_prob, count)
	} else {
		(log_prob.exp(), count)
	}
}

/// Cross-entropy, in bits per word, of `sentences` under `smoother`:
/// the negative mean base-2 log-probability per word, each sentence's
/// EOS included in the word count.
pub fn cross_entropy<S: Smoother + ?Sized>(smoother: &S, sentences: &[impl AsRef<str>]) -> f64 {
	let mut total_log2 = 0.0;
	let mut total_words = 0usize;
	for sentence in sentences {
		let (log_prob, count) = score(smoother, sentence.as_ref(), true);
		total_log2 += log_prob / std::f64::consts::LN_2;
		total_words += count;
	}
	if total_words == 0 {
		return f64::NAN;
	}
	-total_log2 / total_words as f64
}

/// Perplexity of `sentences` under `smoother`: `2^cross_entropy`.
pub fn perplexity<S: Smoother + ?Sized>(smoother: &S, sentences: &[impl AsRef<str>]) -> f64 {
	2f64.powf(cross_entropy(smoother, sentences))
}

#[cfg(test)]
mod tests {
	use approx::assert_relative_eq;

	use super::*;

	#[test]
	fn truncate_keeps_last_k_minus_one_words() {
		assert_eq!(truncate("a b c", 3), " b c");
		assert_eq!(truncate("a b c", 1), "");
		assert_eq!(truncate("a b c", 10), "a b c");
	}

	#[test]
	fn backoff_drops_leading_word() {
		assert_eq!(backoff("a b c"), " b c");
		assert_eq!(backoff("a"), "");
		assert_eq!(backoff(""), "");
	}

	#[test]
	fn cross_entropy_and_perplexity_are_consistent() {
		use crate::model::KgramFreqs;
		use add_k::AddK;

		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let addk = AddK::new(&freqs, 1.0).unwrap();

		let ce = cross_entropy(&addk, &["a b a"]);
		assert!(ce.is_finite() && ce >= 0.0);
		assert_relative_eq!(perplexity(&addk, &["a b a"]), 2f64.powf(ce), epsilon = 1e-9);
	}
}
