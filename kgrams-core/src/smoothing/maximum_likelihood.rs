use crate::error::{Error, Result};
use crate::model::KgramFreqs;
use crate::special_tokens::{BOS_TOK, UNDEFINED};

use super::{truncate, Smoother};

/// Maximum-Likelihood continuation probability: the raw relative
/// frequency `F(c, w) / F(c)`, undefined when the context was never
/// observed.
pub struct Ml<'f> {
	freqs: &'f KgramFreqs,
	n_eff: usize,
}

impl<'f> Ml<'f> {
	/// Builds an ML smoother at the model's own order.
	pub fn new(freqs: &'f KgramFreqs) -> Result<Self> {
		Self::with_order(freqs, freqs.n())
	}

	/// Builds an ML smoother truncated to `n_eff <= freqs.N()`.
	pub fn with_order(freqs: &'f KgramFreqs, n_eff: usize) -> Result<Self> {
		if n_eff > freqs.n() || n_eff == 0 {
			return Err(Error::out_of_range("n_eff", "in 1..=N", n_eff));
		}
		Ok(Self { freqs, n_eff })
	}
}

impl<'f> Smoother for Ml<'f> {
	fn probability(&self, word: &str, context: &str) -> f64 {
		if word == BOS_TOK || word.trim().is_empty() {
			return UNDEFINED;
		}
		let context = truncate(context, self.n_eff);
		let den = self.freqs.query(context);
		if den == 0 {
			return UNDEFINED;
		}
		self.freqs.query(&format!("{} {}", context, word)) as f64 / den as f64
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
	use super::*;

	#[test]
	fn s2_worked_example() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let ml = Ml::new(&freqs).unwrap();

		assert_eq!(ml.probability("a", "b"), 1.0);
		assert_eq!(ml.probability("b", "a"), 0.5);
		assert_eq!(ml.probability("___EOS___", "a"), 0.5);
		assert_eq!(ml.probability("a", "zzz_unseen_context"), UNDEFINED);
	}

	#[test]
	fn bos_as_word_is_undefined() {
		let freqs = KgramFreqs::new(2);
		let ml = Ml::new(&freqs).unwrap();
		assert_eq!(ml.probability(BOS_TOK, "a"), UNDEFINED);
	}

	#[test]
	fn order_above_model_order_rejected() {
		let freqs = KgramFreqs::new(2);
		assert!(matches!(Ml::with_order(&freqs, 3), Err(Error::OutOfRange { .. })));
	}
}
