//! Word-level k-gram (n-gram) statistical language modeling.
//!
//! The core is the k-gram frequency engine ([`model::KgramFreqs`]) and the
//! family of backoff/interpolation smoothers ([`smoothing`]) layered on
//! top of it, tightly coupled to the derived continuation-count
//! satellites the discounting smoothers need. [`sampler::Sampler`] draws
//! words and whole sentences from any smoother via the Gumbel-Max trick.
//!
//! [`preprocess`], [`tokenizer`] and [`dict_builder`] are external
//! collaborators that turn raw text into the sentences and word lists the
//! core consumes; they know nothing about k-grams themselves.

pub mod dict_builder;
pub mod dictionary;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod sampler;
pub mod smoothing;
pub mod special_tokens;
pub mod text;
pub mod tokenizer;

pub use dictionary::Dictionary;
pub use error::{Error, Result};
pub use model::{KgramFreqs, KnFreqs, MknFreqs, RFreqs, Satellite};
pub use sampler::Sampler;
pub use smoothing::{
	AbsoluteDiscount, AddK, KneserNey, Ml, ModifiedKneserNey, Smoother, StupidBackoff, WittenBell,
};
