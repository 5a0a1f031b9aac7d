use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::model::codes::split_first;
use crate::model::{KgramFreqs, KnFreqs};
use crate::special_tokens::{BOS_TOK, UNDEFINED};

use super::{backoff, truncate, Smoother};

/// Kneser-Ney smoothing: subtracts a fixed discount `D` from the raw
/// count, and backs off to a *continuation* probability -- how many
/// distinct contexts a word completes, rather than how often it occurs
/// -- instead of the lower-order relative frequency.
pub struct KneserNey<'f> {
	freqs: &'f KgramFreqs,
	kn: Rc<RefCell<KnFreqs>>,
	n_eff: usize,
	d: f64,
}

impl<'f> KneserNey<'f> {
	pub fn new(freqs: &'f mut KgramFreqs, d: f64) -> Result<Self> {
		Self::with_order(freqs, freqs.n(), d)
	}

	pub fn with_order(freqs: &'f mut KgramFreqs, n_eff: usize, d: f64) -> Result<Self> {
		if n_eff > freqs.n() || n_eff == 0 {
			return Err(Error::out_of_range("n_eff", "in 1..=N", n_eff));
		}
		if !(0.0..=1.0).contains(&d) {
			return Err(Error::out_of_range("D", "in [0, 1]", d));
		}
		let kn = Rc::new(RefCell::new(KnFreqs::new(n_eff)));
		kn.borrow_mut().update(freqs);
		freqs.add_satellite(kn.clone());
		Ok(Self { freqs: &*freqs, kn, n_eff, d })
	}

	pub fn d(&self) -> f64 {
		self.d
	}

	/// Base case for the top-level `probability()` call: the source bars
	/// `den == 0` (empty training set) from producing anything but zero,
	/// rather than falling all the way back to the uniform floor.
	fn base_case(&self, den: f64, prob_part: f64) -> f64 {
		if den == 0.0 {
			return prob_part;
		}
		prob_part + self.base_backoff_mass(den) * self.floor()
	}

	/// Base case for the `continuation_probability` recursion: unlike
	/// `base_case`, this always blends in the uniform floor (with the
	/// backoff factor defaulting to 1 when `den == 0`), since the
	/// recursion must always bottom out in a well-defined probability.
	fn base_continuation(&self, den: f64, prob_part: f64) -> f64 {
		let backoff_fac = if den != 0.0 { self.base_backoff_mass(den) } else { 1.0 };
		prob_part + backoff_fac * self.floor()
	}

	fn base_backoff_mass(&self, den: f64) -> f64 {
		let type_count = (self.freqs.unique(1).unwrap_or(1) as f64 - 1.0).max(0.0);
		self.d * type_count / den
	}

	fn floor(&self) -> f64 {
		1.0 / (self.freqs.v() as f64 + 2.0)
	}

	/// Continuation probability recursion (operates purely on k-gram
	/// *codes*, never on raw word strings -- it walks the continuation
	/// tables directly).
	fn continuation_probability(&self, word_code: &str, context_code: &str, order: usize) -> f64 {
		let den;
		let l_val;
		{
			let kn = self.kn.borrow();
			den = kn.lr(order.saturating_sub(1), context_code) as f64;
			let l_key = if context_code.is_empty() { word_code.to_string() } else { format!("{} {}", context_code, word_code) };
			l_val = kn.l(order, &l_key) as f64;
		}
		let num = (l_val - self.d).max(0.0);
		let prob_part = if den != 0.0 { num / den } else { 0.0 };

		if context_code.is_empty() {
			return self.base_continuation(den, prob_part);
		}

		let r_val = self.kn.borrow().r(order - 1, context_code) as f64;
		let backoff_fac = if den != 0.0 { self.d * r_val / den } else { 1.0 };
		let backed_off = split_first(context_code).1;
		let lower = self.continuation_probability(word_code, backed_off, order - 1);
		prob_part + backoff_fac * lower
	}
}

impl<'f> Smoother for KneserNey<'f> {
	fn probability(&self, word: &str, context: &str) -> f64 {
		if word == BOS_TOK || word.trim().is_empty() {
			return UNDEFINED;
		}
		let context = truncate(context, self.n_eff);
		let den = self.freqs.query(context) as f64;
		let num = (self.freqs.query(&format!("{} {}", context, word)) as f64 - self.d).max(0.0);
		let prob_part = if den != 0.0 { num / den } else { 0.0 };

		if context.trim().is_empty() {
			return self.base_case(den, prob_part);
		}

		let (k, code) = self.freqs.kgram_code(context);
		let r_val = self.kn.borrow().r(k, &code) as f64;
		let backoff_fac = if den != 0.0 { self.d * r_val / den } else { 1.0 };

		let backed_off_code = split_first(&code).1;
		let word_code = self.freqs.index(word);
		let cont_prob = self.continuation_probability(&word_code, backed_off_code, k);

		prob_part + backoff_fac * cont_prob
	}

	fn dict_size(&self) -> usize {
		self.freqs.v()
	}

	fn word(&self, index: &str) -> String {
		self.freqs.word(index)
	}

	fn padding_length(&self) -> usize {
		self.n_eff - 1
	}
}

#[cfg(test)]
mod tests {
	use approx::assert_relative_eq;

	use super::*;

	#[test]
	fn s5_probabilities_sum_close_to_one() {
		let mut freqs = KgramFreqs::new(3);
		freqs.process_sentences(&["a b a b a"], false);
		let kn = KneserNey::new(&mut freqs, 0.5).unwrap();
		let total: f64 = ["a", "b", "___EOS___", "___UNK___"].iter().map(|w| kn.probability(w, "a b")).sum();
		assert_relative_eq!(total, 1.0, epsilon = 1e-9);
	}

	#[test]
	fn order_one_base_case_still_sums_to_one() {
		let mut freqs = KgramFreqs::new(3);
		freqs.process_sentences(&["a b a b a"], false);
		let kn = KneserNey::with_order(&mut freqs, 1, 0.5).unwrap();
		let total: f64 = ["a", "b", "___EOS___", "___UNK___"].iter().map(|w| kn.probability(w, "")).sum();
		assert_relative_eq!(total, 1.0, epsilon = 1e-9);
	}

	#[test]
	fn bos_as_word_is_undefined() {
		let mut freqs = KgramFreqs::new(3);
		freqs.process_sentences(&["a b a b a"], false);
		let kn = KneserNey::new(&mut freqs, 0.5).unwrap();
		assert_eq!(kn.probability(BOS_TOK, "a b"), UNDEFINED);
	}
}
