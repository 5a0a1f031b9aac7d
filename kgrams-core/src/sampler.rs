//! Sentence and word sampling via the Gumbel-Max trick.
//!
//! Generic over any [`Smoother`](crate::smoothing::Smoother): there is no
//! inheritance hierarchy, just a trait bound, so a [`Sampler`] works the
//! same whether it's wrapping [`crate::smoothing::Ml`] or a boxed
//! `dyn Smoother` chosen at runtime.

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::error::{Error, Result};
use crate::smoothing::{truncate, Smoother};
use crate::special_tokens::{BOS_TOK, EOS_TOK, UNDEFINED};

/// Draws words and sentences from a [`Smoother`] at a fixed temperature.
pub struct Sampler<'s, S: Smoother + ?Sized> {
	smoother: &'s S,
	temperature: f64,
}

impl<'s, S: Smoother + ?Sized> Sampler<'s, S> {
	/// Builds a sampler at temperature `t > 0`.
	pub fn new(smoother: &'s S, t: f64) -> Result<Self> {
		if !(t > 0.0) {
			return Err(Error::out_of_range("temperature", "> 0", t));
		}
		Ok(Self { smoother, temperature: t })
	}

	pub fn temperature(&self) -> f64 {
		self.temperature
	}

	pub fn set_temperature(&mut self, t: f64) -> Result<()> {
		if !(t > 0.0) {
			return Err(Error::out_of_range("temperature", "> 0", t));
		}
		self.temperature = t;
		Ok(())
	}

	/// Samples the next word given `context`, via the Gumbel-Max trick:
	/// `argmax_w P(w|context)^(1/T) / Exp(1)`. Never returns UNK (its
	/// index is outside the `1..=V` range this iterates). Words with an
	/// `Undefined` or non-positive probability are skipped rather than
	/// crashing the argmax.
	pub fn sample_word(&self, context: &str) -> String {
		let exp = Exp::new(1.0).expect("rate 1.0 is always a valid Exp parameter");
		let mut rng = rand::rng();

		let mut best_word = EOS_TOK.to_string();
		let mut best_score = f64::NEG_INFINITY;

		for i in 1..=self.smoother.dict_size() {
			let word = self.smoother.word(&i.to_string());
			self.consider(&word, context, &exp, &mut rng, &mut best_word, &mut best_score);
		}
		self.consider(EOS_TOK, context, &exp, &mut rng, &mut best_word, &mut best_score);

		best_word
	}

	fn consider(
		&self,
		word: &str,
		context: &str,
		exp: &Exp<f64>,
		rng: &mut impl Rng,
		best_word: &mut String,
		best_score: &mut f64,
	) {
		let p = self.smoother.probability(word, context);
		if p == UNDEFINED || !(p > 0.0) {
			return;
		}
		let draw: f64 = exp.sample(rng);
		let score = p.powf(1.0 / self.temperature) / draw;
		if score > *best_score {
			*best_score = score;
			*best_word = word.to_string();
		}
	}

	/// Samples a whole sentence: starts from `BOS^(N_eff - 1)` padding,
	/// repeatedly samples the next word and slides the context window,
	/// stopping at EOS (tagged `<EOS>`) or after `max_length` words
	/// (tagged with a truncation marker). The returned sentence never
	/// includes the BOS padding.
	pub fn sample_sentence(&self, max_length: usize) -> String {
		let padding_words = self.smoother.padding_length();
		let mut context = vec![BOS_TOK; padding_words].join(" ");
		let mut words = Vec::new();

		for _ in 0..max_length {
			let word = self.sample_word(&context);
			if word == EOS_TOK {
				words.push("<EOS>".to_string());
				return words.join(" ");
			}
			context = truncate(&format!("{} {}", context, word), padding_words + 1).to_string();
			words.push(word);
		}
		words.push("[...] (truncated output)".to_string());
		words.join(" ")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::KgramFreqs;
	use crate::smoothing::Ml;

	#[test]
	fn s6_low_temperature_matches_argmax() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let ml = Ml::new(&freqs).unwrap();
		let sampler = Sampler::new(&ml, 1e-6).unwrap();

		// P_ML(a|b) = 1.0 exactly, every other candidate is strictly less
		// than 1 (or Undefined) so an extreme low temperature must win
		// regardless of the random Exp(1) draws.
		assert_eq!(sampler.sample_word("b"), "a");
	}

	#[test]
	fn never_samples_unk() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let ml = Ml::new(&freqs).unwrap();
		let sampler = Sampler::new(&ml, 1.0).unwrap();
		for _ in 0..50 {
			assert_ne!(sampler.sample_word("a"), "___UNK___");
		}
	}

	#[test]
	fn sentence_terminates_with_eos_or_truncation_marker() {
		let mut freqs = KgramFreqs::new(2);
		freqs.process_sentences(&["a b a"], false);
		let ml = Ml::new(&freqs).unwrap();
		let sampler = Sampler::new(&ml, 1.0).unwrap();
		let sentence = sampler.sample_sentence(3);
		assert!(sentence.contains("<EOS>") || sentence.contains("(truncated output)"));
	}

	#[test]
	fn rejects_non_positive_temperature() {
		let freqs = KgramFreqs::new(2);
		let ml = Ml::new(&freqs).unwrap();
		assert!(matches!(Sampler::new(&ml, 0.0), Err(Error::OutOfRange { .. })));
	}
}
