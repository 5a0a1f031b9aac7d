use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::model::codes::split_first;
use crate::model::{KgramFreqs, MknFreqs};
use crate::special_tokens::{BOS_TOK, UNDEFINED};

use super::{backoff, truncate, Smoother};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bucket {
	One,
	Two,
	ThreePlus,
}

fn bucket_of(count: u64) -> Bucket {
	match count {
		0 | 1 => Bucket::One,
		2 => Bucket::Two,
		_ => Bucket::ThreePlus,
	}
}

/// Modified Kneser-Ney: like [`super::KneserNey`], but the discount
/// applied to a k-gram's count depends on which stratum (exactly 1,
/// exactly 2, or 3-or-more) it falls into, rather than a single fixed
/// `D`. The backoff recursion uses continuation counts stratified the
/// same way, via the "low" satellite tables.
pub struct ModifiedKneserNey<'f> {
	freqs: &'f KgramFreqs,
	mkn: Rc<RefCell<MknFreqs>>,
	n_eff: usize,
	d1: f64,
	d2: f64,
	d3p: f64,
}

impl<'f> ModifiedKneserNey<'f> {
	pub fn new(freqs: &'f mut KgramFreqs, d1: f64, d2: f64, d3p: f64) -> Result<Self> {
		Self::with_order(freqs, freqs.n(), d1, d2, d3p)
	}

	pub fn with_order(freqs: &'f mut KgramFreqs, n_eff: usize, d1: f64, d2: f64, d3p: f64) -> Result<Self> {
		if n_eff > freqs.n() || n_eff == 0 {
			return Err(Error::out_of_range("n_eff", "in 1..=N", n_eff));
		}
		for (what, d) in [("D1", d1), ("D2", d2), ("D3+", d3p)] {
			if !(0.0..=1.0).contains(&d) {
				return Err(Error::out_of_range(what, "in [0, 1]", d));
			}
		}
		let mkn = Rc::new(RefCell::new(MknFreqs::new(n_eff)));
		mkn.borrow_mut().update(freqs);
		freqs.add_satellite(mkn.clone());
		Ok(Self { freqs: &*freqs, mkn, n_eff, d1, d2, d3p })
	}

	fn discount(&self, bucket: Bucket) -> f64 {
		match bucket {
			Bucket::One => self.d1,
			Bucket::Two => self.d2,
			Bucket::ThreePlus => self.d3p,
		}
	}

	fn floor(&self) -> f64 {
		1.0 / (self.freqs.v() as f64 + 2.0)
	}

	/// Base case for the top-level formula's own empty-context edge: the
	/// interpolation structure is kept (unlike `continuation_probability`'s
	/// base case, which is a flat floor), using the top-order stratified
	/// tables at context length 0.
	fn base_case_top(&self, den: f64, prob_part: f64) -> f64 {
		if den == 0.0 {
			return prob_part;
		}
		let mkn = self.mkn.borrow();
		let mass = self.d1 * mkn.r1(0, "") as f64 + self.d2 * mkn.r2(0, "") as f64 + self.d3p * mkn.r3p(0, "") as f64;
		prob_part + (mass / den) * self.floor()
	}

	fn continuation_probability(&self, word_code: &str, context_code: &str, order: usize) -> f64 {
		if context_code.is_empty() {
			return self.floor();
		}
		let (den, l_val) = {
			let mkn = self.mkn.borrow();
			let den = mkn.lr(order.saturating_sub(1), context_code) as f64;
			let l_key = format!("{} {}", context_code, word_code);
			(den, mkn.l(order, &l_key) as f64)
		};
		let d = self.discount(bucket_of(l_val as u64));
		let num = (l_val - d).max(0.0);
		let prob_part = if den != 0.0 { num / den } else { 0.0 };

		let backoff_fac = if den != 0.0 {
			let mkn = self.mkn.borrow();
			let m = order - 1;
			(self.d1 * mkn.r1_low(m, context_code) as f64 + self.d2 * mkn.r2_low(m, context_code) as f64 + self.d3p * mkn.r3p_low(m, context_code) as f64) / den
		} else {
			1.0
		};
		let backed_off = split_first(context_code).1;
		let lower = self.continuation_probability(word_code, backed_off, order - 1);
		prob_part + backoff_fac * lower
	}
}

impl<'f> Smoother for ModifiedKneserNey<'f> {
	fn probability(&self, word: &str, context: &str) -> f64 {
		if word == BOS_TOK || word.trim().is_empty() {
			return UNDEFINED;
		}
		let context = truncate(context, self.n_eff);
		let den = self.freqs.query(context) as f64;
		let raw = self.freqs.query(&format!("{} {}", context, word));
		let d = self.discount(bucket_of(raw));
		let num = (raw as f64 - d).max(0.0);
		let prob_part = if den != 0.0 { num / den } else { 0.0 };

		if context.trim().is_empty() {
			return self.base_case_top(den, prob_part);
		}

		let (k, code) = self.freqs.kgram_code(context);
		let backoff_fac = if den != 0.0 {
			let mkn = self.mkn.borrow();
			(self.d1 * mkn.r1(k, &code) as f64 + self.d2 * mkn.r2(k, &code) as f64 + self.d3p * mkn.r3p(k, &code) as f64) / den
		} else {
			1.0
		};

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
	fn probabilities_sum_close_to_one() {
		let mut freqs = KgramFreqs::new(3);
		freqs.process_sentences(&["a b a b a"], false);
		let mkn = ModifiedKneserNey::new(&mut freqs, 0.5, 0.8, 0.9).unwrap();
		let total: f64 = ["a", "b", "___EOS___", "___UNK___"].iter().map(|w| mkn.probability(w, "a b")).sum();
		assert_relative_eq!(total, 1.0, epsilon = 1e-9);
	}

	#[test]
	fn discounts_outside_unit_interval_rejected() {
		let mut freqs = KgramFreqs::new(3);
		assert!(matches!(ModifiedKneserNey::new(&mut freqs, 1.5, 0.5, 0.5), Err(Error::OutOfRange { .. })));
	}
}
