use crate::error::{Error, Result};
use crate::model::KgramFreqs;
use crate::special_tokens::{BOS_TOK, UNDEFINED};

use super::{backoff, truncate, Smoother};

/// Stupid Backoff: a cheap, non-normalized continuation *score* rather
/// than a true probability. Backs off one word at a time, penalizing
/// each step by `lambda`, until it finds a context with a nonzero count
/// or runs out of context.
pub struct StupidBackoff<'f> {
	freqs: &'f KgramFreqs,
	n_eff: usize,
	lambda: f64,
}

impl<'f> StupidBackoff<'f> {
	pub fn new(freqs: &'f KgramFreqs, lambda: f64) -> Result<Self> {
		Self::with_order(freqs, freqs.n(), lambda)
	}

	pub fn with_order(freqs: &'f KgramFreqs, n_eff: usize, lambda: f64) -> Result<Self> {
		if n_eff > freqs.n() || n_eff == 0 {
			return Err(Error::out_of_range("n_eff", "in 1..=N", n_eff));
		}
		if !(0.0..=1.0).contains(&lambda) {
			return Err(Error::out_of_range("lambda", "in [0, 1]", lambda));
		}
		Ok(Self { freqs, n_eff, lambda })
	}

	pub fn lambda(&self) -> f64 {
		self.lambda
	}

	pub fn set_lambda(&mut self, lambda: f64) -> Result<()> {
		if !(0.0..=1.0).contains(&lambda) {
			return Err(Error::out_of_range("lambda", "in [0, 1]", lambda));
		}
		self.lambda = lambda;
		Ok(())
	}
}

impl<'f> Smoother for StupidBackoff<'f> {
	fn probability(&self, word: &str, context: &str) -> f64 {
		if word == BOS_TOK || word.trim().is_empty() {
			return UNDEFINED;
		}
		let mut context = truncate(context, self.n_eff);
		let mut penalization = 1.0;
		loop {
			let kgram_count = self.freqs.query(&format!("{} {}", context, word));
			if kgram_count != 0 {
				let den = self.freqs.query(context);
				return penalization * kgram_count as f64 / den as f64;
			}
			let backed_off = backoff(context);
			penalization *= self.lambda;
			if backed_off.trim().is_empty() && self.freqs.query(word) == 0 {
				return 1.0 / (self.freqs.v() as f64 + 2.0);
			}
			context = backed_off;
		}
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
	fn s4_worked_example() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let sbo = StupidBackoff::new(&freqs, 0.4).unwrap();
		assert_relative_eq!(sbo.probability("x_never_seen", "a"), 0.25, epsilon = 1e-12);
	}

	#[test]
	fn exact_kgram_hit_skips_backoff() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let sbo = StupidBackoff::new(&freqs, 0.4).unwrap();
		assert_eq!(sbo.probability("b", "a"), 0.5);
	}
}
