//! The k-gram counting engine: raw frequency tables plus the derived
//! continuation-count satellites built on top of them.

pub(crate) mod codes;
mod kgram_freqs;
mod satellites;

pub use kgram_freqs::{KgramFreqs, Satellite};
pub use satellites::{KnFreqs, MknFreqs, RFreqs};
