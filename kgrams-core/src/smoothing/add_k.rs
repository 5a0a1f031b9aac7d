use crate::error::{Error, Result};
use crate::model::KgramFreqs;
use crate::special_tokens::{BOS_TOK, UNDEFINED};

use super::{truncate, Smoother};

/// Add-k (Laplace-style) smoothing: adds a constant `k` to every count
/// before normalizing, with `V + 2` absorbing EOS and UNK into the
/// effective vocabulary.
pub struct AddK<'f> {
	freqs: &'f KgramFreqs,
	n_eff: usize,
	k: f64,
}

impl<'f> AddK<'f> {
	pub fn new(freqs: &'f KgramFreqs, k: f64) -> Result<Self> {
		Self::with_order(freqs, freqs.n(), k)
	}

	pub fn with_order(freqs: &'f KgramFreqs, n_eff: usize, k: f64) -> Result<Self> {
		if n_eff > freqs.n() || n_eff == 0 {
			return Err(Error::out_of_range("n_eff", "in 1..=N", n_eff));
		}
		if !(k > 0.0) {
			return Err(Error::out_of_range("k", "> 0", k));
		}
		Ok(Self { freqs, n_eff, k })
	}

	pub fn k(&self) -> f64 {
		self.k
	}

	pub fn set_k(&mut self, k: f64) -> Result<()> {
		if !(k > 0.0) {
			return Err(Error::out_of_range("k", "> 0", k));
		}
		self.k = k;
		Ok(())
	}
}

impl<'f> Smoother for AddK<'f> {
	fn probability(&self, word: &str, context: &str) -> f64 {
		if word == BOS_TOK || word.trim().is_empty() {
			return UNDEFINED;
		}
		let context = truncate(context, self.n_eff);
		let num = self.freqs.query(&format!("{} {}", context, word)) as f64 + self.k;
		let den = self.freqs.query(context) as f64 + self.k * (self.freqs.v() as f64 + 2.0);
		num / den
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
	fn s3_worked_example() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let addk = AddK::new(&freqs, 1.0).unwrap();
		// F(a) = 2, F(b a) -- wait, query here is P(a|b): F(b,a)=1, F(b)=1
		assert_relative_eq!(addk.probability("a", "b"), 0.4, epsilon = 1e-12);
	}

	#[test]
	fn probabilities_sum_to_one_over_effective_vocabulary() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let addk = AddK::new(&freqs, 1.0).unwrap();
		let a = "a";
		let total: f64 = ["a", "b", "___EOS___", "___UNK___"].iter().map(|w| addk.probability(w, a)).sum();
		assert_relative_eq!(total, 1.0, epsilon = 1e-9);
	}

	#[test]
	fn non_positive_k_rejected() {
		let freqs = KgramFreqs::new(2);
		assert!(matches!(AddK::new(&freqs, 0.0), Err(Error::OutOfRange { .. })));
	}
}
