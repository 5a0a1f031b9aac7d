//! Reserved tokens and their fixed k-gram codes.
//!
//! These strings are part of the stable, documented k-gram code format:
//! any storage or wire format built on top of this crate must round-trip
//! them exactly.

/// Begin-of-sentence token.
pub const BOS_TOK: &str = "___BOS___";
/// End-of-sentence token.
pub const EOS_TOK: &str = "___EOS___";
/// Unknown-word token.
pub const UNK_TOK: &str = "___UNK___";

/// Begin-of-sentence index. Never collides with a real word index (which
/// start at 1).
pub const BOS_IND: &str = "-1";
/// End-of-sentence index.
pub const EOS_IND: &str = "0";
/// Unknown-word index.
pub const UNK_IND: &str = "-2";

/// Sentinel returned by `Smoother::probability` for an undefined
/// conditional probability.
pub const UNDEFINED: f64 = -1.0;
