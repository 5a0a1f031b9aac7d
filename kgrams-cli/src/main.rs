//! Trains a k-gram language model from a corpus file and samples
//! sentences from it.
//!
//! Demonstrates the library end to end: preprocessing, sentence
//! tokenization, optional dictionary seeding, training, smoother
//! selection, sampling, and a training-set perplexity report.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use kgrams_core::dict_builder;
use kgrams_core::dictionary::Dictionary;
use kgrams_core::model::KgramFreqs;
use kgrams_core::preprocess::Preprocessor;
use kgrams_core::sampler::Sampler;
use kgrams_core::smoothing::{self, AbsoluteDiscount, AddK, KneserNey, Ml, ModifiedKneserNey, Smoother, StupidBackoff, WittenBell};
use kgrams_core::tokenizer::SentenceTokenizer;

#[derive(Clone, ValueEnum)]
enum SmootherKind {
	Ml,
	AddK,
	StupidBackoff,
	AbsoluteDiscount,
	WittenBell,
	KneserNey,
	ModifiedKneserNey,
}

/// Train a k-gram language model and sample sentences from it.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
	/// Training corpus: one sentence (or a punctuation-delimited block
	/// of several) per line.
	#[arg(short, long)]
	corpus: PathBuf,

	/// Maximum k-gram order.
	#[arg(short = 'n', long, default_value_t = 3)]
	order: usize,

	/// Smoothing scheme to sample from.
	#[arg(long, value_enum, default_value_t = SmootherKind::ModifiedKneserNey)]
	smoother: SmootherKind,

	/// Add-k smoothing constant.
	#[arg(long, default_value_t = 1.0)]
	add_k: f64,

	/// Stupid Backoff penalization factor, in [0, 1].
	#[arg(long, default_value_t = 0.4)]
	lambda: f64,

	/// Absolute Discount / Kneser-Ney discount, in [0, 1].
	#[arg(long, default_value_t = 0.75)]
	discount: f64,

	/// Modified Kneser-Ney discount for count-1 k-grams.
	#[arg(long, default_value_t = 0.5)]
	d1: f64,
	/// Modified Kneser-Ney discount for count-2 k-grams.
	#[arg(long, default_value_t = 1.0)]
	d2: f64,
	/// Modified Kneser-Ney discount for count-3-or-more k-grams.
	#[arg(long, default_value_t = 1.5)]
	d3_plus: f64,

	/// Lower-case the corpus before training.
	#[arg(long)]
	lower_case: bool,

	/// Erase-regex override for preprocessing.
	#[arg(long)]
	erase_regex: Option<String>,

	/// Seed the dictionary with only the top `N` most frequent words
	/// (and freeze it: everything else counts as UNK). When unset the
	/// dictionary grows to cover every word seen in training.
	#[arg(long)]
	vocab_size: Option<usize>,

	/// Number of sentences to sample.
	#[arg(long, default_value_t = 5)]
	sentences: usize,

	/// Maximum words per sampled sentence before truncating.
	#[arg(long, default_value_t = 20)]
	max_length: usize,

	/// Sampling temperature (> 0).
	#[arg(long, default_value_t = 1.0)]
	temperature: f64,
}

fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let raw_text = std::fs::read_to_string(&args.corpus).with_context(|| format!("reading corpus at {}", args.corpus.display()))?;

	let preprocessor = match &args.erase_regex {
		Some(pattern) => Preprocessor::new(pattern, args.lower_case)?,
		None => Preprocessor::with_defaults(args.lower_case),
	};
	let tokenizer = SentenceTokenizer::with_defaults(false);

	let mut sentences = Vec::new();
	for line in raw_text.lines() {
		let cleaned = preprocessor.process(line);
		sentences.extend(tokenizer.split(&cleaned));
	}
	info!("tokenized {} sentences from {}", sentences.len(), args.corpus.display());

	let fixed_dictionary = args.vocab_size.is_some();
	let mut freqs = match args.vocab_size {
		Some(vocab_size) => {
			let word_freqs = dict_builder::word_frequencies(&sentences);
			let words = dict_builder::top_n(&word_freqs, vocab_size);
			info!("seeded dictionary with {} of {} distinct words", words.len(), word_freqs.len());
			KgramFreqs::with_dictionary(args.order, Dictionary::with_words(words))
		}
		None => KgramFreqs::new(args.order),
	};

	freqs.process_sentences(&sentences, fixed_dictionary);
	println!("trained model: order={} V={} tokens={}", freqs.n(), freqs.v(), freqs.tot_words());

	let smoother: Box<dyn Smoother + '_> = match args.smoother {
		SmootherKind::Ml => Box::new(Ml::new(&freqs)?),
		SmootherKind::AddK => Box::new(AddK::new(&freqs, args.add_k)?),
		SmootherKind::StupidBackoff => Box::new(StupidBackoff::new(&freqs, args.lambda)?),
		SmootherKind::AbsoluteDiscount => Box::new(AbsoluteDiscount::new(&mut freqs, args.discount)?),
		SmootherKind::WittenBell => Box::new(WittenBell::new(&mut freqs)?),
		SmootherKind::KneserNey => Box::new(KneserNey::new(&mut freqs, args.discount)?),
		SmootherKind::ModifiedKneserNey => Box::new(ModifiedKneserNey::new(&mut freqs, args.d1, args.d2, args.d3_plus)?),
	};

	let sampler = Sampler::new(smoother.as_ref(), args.temperature)?;
	for i in 0..args.sentences {
		println!("{}: {}", i + 1, sampler.sample_sentence(args.max_length));
	}

	let perplexity = smoothing::perplexity(smoother.as_ref(), &sentences);
	println!("training-set perplexity: {perplexity:.3}");

	Ok(())
}
