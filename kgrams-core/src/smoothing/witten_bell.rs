use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::model::{KgramFreqs, RFreqs};
use crate::special_tokens::{BOS_TOK, UNDEFINED};

use super::{backoff, truncate, Smoother};

/// Witten-Bell smoothing: interpolates the raw relative frequency with
/// the lower-order probability, weighted by how many distinct words
/// have ever followed the context (a context seen with many distinct
/// continuations trusts the lower order more).
pub struct WittenBell<'f> {
	freqs: &'f KgramFreqs,
	r: Rc<RefCell<RFreqs>>,
	n_eff: usize,
}

impl<'f> WittenBell<'f> {
	pub fn new(freqs: &'f mut KgramFreqs) -> Result<Self> {
		Self::with_order(freqs, freqs.n())
	}

	pub fn with_order(freqs: &'f mut KgramFreqs, n_eff: usize) -> Result<Self> {
		if n_eff > freqs.n() || n_eff == 0 {
			return Err(Error::out_of_range("n_eff", "in 1..=N", n_eff));
		}
		let r = Rc::new(RefCell::new(RFreqs::new(n_eff)));
		r.borrow_mut().update(freqs);
		freqs.add_satellite(r.clone());
		Ok(Self { freqs: &*freqs, r, n_eff })
	}

	fn prob_recursive(&self, word: &str, context: &str) -> f64 {
		if context.trim().is_empty() {
			let den = self.freqs.query(context) as f64;
			let num = self.freqs.query(&format!("{} {}", context, word)) as f64;
			if den == 0.0 {
				return 1.0 / (self.freqs.v() as f64 + 2.0);
			}
			return num / den;
		}

		let (m, code) = self.freqs.kgram_code(context);
		let r_val = self.r.borrow().r(m, &code) as f64;
		let den = self.freqs.query(context) as f64;
		let num = self.freqs.query(&format!("{} {}", context, word)) as f64;

		if den + r_val == 0.0 {
			return self.prob_recursive(word, backoff(context));
		}
		let lower = self.prob_recursive(word, backoff(context));
		(num + r_val * lower) / (den + r_val)
	}
}

impl<'f> Smoother for WittenBell<'f> {
	fn probability(&self, word: &str, context: &str) -> f64 {
		if word == BOS_TOK || word.trim().is_empty() {
			return UNDEFINED;
		}
		let context = truncate(context, self.n_eff);
		self.prob_recursive(word, context)
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
	fn probabilities_sum_close_to_one() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let wb = WittenBell::new(&mut freqs).unwrap();
		let total: f64 = ["a", "b", "___EOS___", "___UNK___"].iter().map(|w| wb.probability(w, "a")).sum();
		assert_relative_eq!(total, 1.0, epsilon = 1e-9);
	}
}
