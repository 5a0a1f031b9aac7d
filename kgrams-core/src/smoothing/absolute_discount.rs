use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::model::{KgramFreqs, RFreqs};
use crate::special_tokens::{BOS_TOK, UNDEFINED};

use super::{backoff, truncate, Smoother};

/// Absolute Discount smoothing: subtracts a fixed discount `D` from
/// every nonzero count and redistributes the freed mass to the
/// lower-order model, weighted by the context's right-extension type
/// count.
pub struct AbsoluteDiscount<'f> {
	freqs: &'f KgramFreqs,
	r: Rc<RefCell<RFreqs>>,
	n_eff: usize,
	d: f64,
}

impl<'f> AbsoluteDiscount<'f> {
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
		let r = Rc::new(RefCell::new(RFreqs::new(n_eff)));
		r.borrow_mut().update(freqs);
		freqs.add_satellite(r.clone());
		Ok(Self { freqs: &*freqs, r, n_eff, d })
	}

	pub fn d(&self) -> f64 {
		self.d
	}

	fn prob_recursive(&self, word: &str, context: &str) -> f64 {
		let den = self.freqs.query(context) as f64;
		let num_raw = self.freqs.query(&format!("{} {}", context, word)) as f64;
		let prob_part = if den != 0.0 { (num_raw - self.d).max(0.0) / den } else { 0.0 };

		if context.trim().is_empty() {
			if den == 0.0 {
				return 0.0;
			}
			let type_count = (self.freqs.unique(1).unwrap_or(1) as f64 - 1.0).max(0.0);
			let alpha = if den != 0.0 { self.d * type_count / den } else { 1.0 };
			let floor = 1.0 / (self.freqs.v() as f64 + 2.0);
			return prob_part + alpha * floor;
		}

		let (m, code) = self.freqs.kgram_code(context);
		let r_val = self.r.borrow().r(m, &code) as f64;
		let alpha = if den != 0.0 { self.d * r_val / den } else { 1.0 };
		let lower = self.prob_recursive(word, backoff(context));
		prob_part + alpha * lower
	}
}

impl<'f> Smoother for AbsoluteDiscount<'f> {
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
		let abs = AbsoluteDiscount::new(&mut freqs, 0.5).unwrap();
		let total: f64 = ["a", "b", "___EOS___", "___UNK___"].iter().map(|w| abs.probability(w, "a")).sum();
		assert_relative_eq!(total, 1.0, epsilon = 1e-9);
	}

	#[test]
	fn zero_discount_degenerates_towards_ml() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let abs = AbsoluteDiscount::new(&mut freqs, 0.0).unwrap();
		assert_relative_eq!(abs.probability("b", "a"), 0.5, epsilon = 1e-12);
	}
}
