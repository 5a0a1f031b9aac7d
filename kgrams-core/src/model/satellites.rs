//! Derived continuation-count tables ("satellites") used by the
//! discounting smoothers. Each is rebuilt from scratch on every
//! [`KgramFreqs::update_satellites`](super::kgram_freqs::KgramFreqs::update_satellites)
//! call, which is cheap relative to re-deriving them incrementally and
//! keeps them trivially consistent with the count tables.

use std::collections::HashMap;

use super::codes::{is_bos, split_first, split_last, split_outer};
use super::kgram_freqs::{KgramFreqs, Satellite};

/// Right-extension type counts, `R[m][c]` = number of distinct words `w`
/// such that `c w` was observed, for context length `m`.
///
/// Feeds Absolute Discount and Witten-Bell.
#[derive(Clone, Debug)]
pub struct RFreqs {
	n: usize,
	r: Vec<HashMap<String, u64>>,
}

impl RFreqs {
	pub fn new(n: usize) -> Self {
		Self { n, r: vec![HashMap::new(); n] }
	}

	/// `R[m][context_code]`, 0 if never observed.
	pub fn r(&self, m: usize, context_code: &str) -> u64 {
		self.r.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}
}

impl Satellite for RFreqs {
	fn update(&mut self, freqs: &KgramFreqs) {
		for table in &mut self.r {
			table.clear();
		}
		for k in 1..=self.n {
			for code in freqs.table(k).keys() {
				let (prefix, last) = split_last(code);
				if is_bos(last) {
					continue;
				}
				*self.r[k - 1].entry(prefix.to_string()).or_insert(0) += 1;
			}
		}
	}
}

/// Left / right / bidirectional continuation-type counts for
/// (Modified) Kneser-Ney, keyed by context length.
///
/// `l[m]` and `r[m]` are built from `(m+1)`-grams; `lr[m]` is built from
/// `(m+2)`-grams (for `m == 0` this degenerates to a single key, `""`,
/// counting distinct `(u, w)` pairs over all bigrams).
#[derive(Clone, Debug)]
pub struct KnFreqs {
	n: usize,
	l: Vec<HashMap<String, u64>>,
	r: Vec<HashMap<String, u64>>,
	lr: Vec<HashMap<String, u64>>,
}

impl KnFreqs {
	pub fn new(n: usize) -> Self {
		Self { n, l: vec![HashMap::new(); n], r: vec![HashMap::new(); n], lr: vec![HashMap::new(); n.saturating_sub(1)] }
	}

	pub fn l(&self, m: usize, context_code: &str) -> u64 {
		self.l.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn r(&self, m: usize, context_code: &str) -> u64 {
		self.r.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn lr(&self, m: usize, context_code: &str) -> u64 {
		self.lr.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}
}

impl Satellite for KnFreqs {
	fn update(&mut self, freqs: &KgramFreqs) {
		for table in &mut self.l {
			table.clear();
		}
		for table in &mut self.r {
			table.clear();
		}
		for table in &mut self.lr {
			table.clear();
		}
		for k in 2..=self.n {
			for code in freqs.table(k).keys() {
				let (prefix, last) = split_last(code);
				if is_bos(last) {
					continue;
				}
				let (_, suffix) = split_first(code);
				*self.l[k - 1].entry(suffix.to_string()).or_insert(0) += 1;
				*self.r[k - 1].entry(prefix.to_string()).or_insert(0) += 1;
				if k == 2 {
					*self.lr[0].entry(String::new()).or_insert(0) += 1;
				} else {
					let (_, middle, _) = split_outer(code);
					*self.lr[k - 2].entry(middle.to_string()).or_insert(0) += 1;
				}
			}
		}
	}
}

/// Raw-count stratum used to bucket a k-gram for Modified Kneser-Ney:
/// exactly-1, exactly-2, or 3-or-more occurrences.
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

/// Satellites for Modified Kneser-Ney: the plain `L`/`LR` tables shared
/// with single-discount KN, three right-extension tables stratified by
/// the raw count of the extending k-gram (used at the top order), and
/// three more stratified by the extending k-gram's *continuation* count
/// (used when the recursion has backed off below the top order).
#[derive(Clone, Debug)]
pub struct MknFreqs {
	n: usize,
	l: Vec<HashMap<String, u64>>,
	lr: Vec<HashMap<String, u64>>,
	r1: Vec<HashMap<String, u64>>,
	r2: Vec<HashMap<String, u64>>,
	r3p: Vec<HashMap<String, u64>>,
	r1low: Vec<HashMap<String, u64>>,
	r2low: Vec<HashMap<String, u64>>,
	r3plow: Vec<HashMap<String, u64>>,
}

impl MknFreqs {
	pub fn new(n: usize) -> Self {
		Self {
			n,
			l: vec![HashMap::new(); n],
			lr: vec![HashMap::new(); n.saturating_sub(1)],
			r1: vec![HashMap::new(); n],
			r2: vec![HashMap::new(); n],
			r3p: vec![HashMap::new(); n],
			r1low: vec![HashMap::new(); n],
			r2low: vec![HashMap::new(); n],
			r3plow: vec![HashMap::new(); n],
		}
	}

	pub fn l(&self, m: usize, context_code: &str) -> u64 {
		self.l.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn lr(&self, m: usize, context_code: &str) -> u64 {
		self.lr.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn r1(&self, m: usize, context_code: &str) -> u64 {
		self.r1.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn r2(&self, m: usize, context_code: &str) -> u64 {
		self.r2.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn r3p(&self, m: usize, context_code: &str) -> u64 {
		self.r3p.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn r1_low(&self, m: usize, context_code: &str) -> u64 {
		self.r1low.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn r2_low(&self, m: usize, context_code: &str) -> u64 {
		self.r2low.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}

	pub fn r3p_low(&self, m: usize, context_code: &str) -> u64 {
		self.r3plow.get(m).and_then(|t| t.get(context_code)).copied().unwrap_or(0)
	}
}

impl Satellite for MknFreqs {
	fn update(&mut self, freqs: &KgramFreqs) {
		for table in self.l.iter_mut().chain(self.lr.iter_mut()).chain(self.r1.iter_mut()).chain(self.r2.iter_mut()).chain(self.r3p.iter_mut()).chain(self.r1low.iter_mut()).chain(self.r2low.iter_mut()).chain(self.r3plow.iter_mut()) {
			table.clear();
		}

		// L and LR tables: identical construction to single-discount KN.
		for k in 2..=self.n {
			for code in freqs.table(k).keys() {
				let (prefix, last) = split_last(code);
				if is_bos(last) {
					continue;
				}
				let (_, suffix) = split_first(code);
				*self.l[k - 1].entry(suffix.to_string()).or_insert(0) += 1;
				if k == 2 {
					*self.lr[0].entry(String::new()).or_insert(0) += 1;
				} else {
					let (_, middle, _) = split_outer(code);
					*self.lr[k - 2].entry(middle.to_string()).or_insert(0) += 1;
				}
				let _ = prefix;
			}
		}

		// Top-level R1/R2/R3+: stratify each (c, w) extension by the raw
		// count of "c w" itself.
		for k in 1..=self.n {
			for (code, &count) in freqs.table(k) {
				let (prefix, last) = split_last(code);
				if is_bos(last) {
					continue;
				}
				let m = k - 1;
				match bucket_of(count) {
					Bucket::One => *self.r1[m].entry(prefix.to_string()).or_insert(0) += 1,
					Bucket::Two => *self.r2[m].entry(prefix.to_string()).or_insert(0) += 1,
					Bucket::ThreePlus => *self.r3p[m].entry(prefix.to_string()).or_insert(0) += 1,
				}
			}
		}

		// Low-order R1low/R2low/R3+low: stratify by the *continuation*
		// count of "c w" (its L-value at order m+1) rather than its raw
		// count, as used by the recursion below the top order.
		for k in 1..self.n {
			let m = k - 1;
			if m + 1 >= self.l.len() {
				continue;
			}
			for code in freqs.table(k).keys() {
				let (prefix, last) = split_last(code);
				if is_bos(last) {
					continue;
				}
				let lval = self.l[m + 1].get(code).copied().unwrap_or(0);
				match bucket_of(lval) {
					Bucket::One => *self.r1low[m].entry(prefix.to_string()).or_insert(0) += 1,
					Bucket::Two => *self.r2low[m].entry(prefix.to_string()).or_insert(0) += 1,
					Bucket::ThreePlus => *self.r3plow[m].entry(prefix.to_string()).or_insert(0) += 1,
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn built_model() -> KgramFreqs {
		let mut freqs = KgramFreqs::new(3);
		freqs.process_sentences(&["a b a b a"], false);
		freqs
	}

	#[test]
	fn r_freqs_counts_distinct_right_extensions() {
		let freqs = built_model();
		let mut r = RFreqs::new(freqs.n());
		r.update(&freqs);
		let a = freqs.index("a");
		// context "a" (length 1) is followed by "b" and by EOS.
		assert_eq!(r.r(1, &a), 2);
	}

	#[test]
	fn kn_freqs_excludes_kgrams_trailing_in_literal_bos() {
		let mut freqs = KgramFreqs::new(3);
		freqs.process_sentences(&["a ___BOS___ b"], false);
		let mut kn = KnFreqs::new(freqs.n());
		kn.update(&freqs);
		let a = freqs.index("a");
		// "a ___BOS___" occurred, but must never surface as a right
		// extension of "a": literal mid-sentence BOS is excluded from
		// every continuation table.
		assert_eq!(kn.r(1, &a), 0);
	}

	#[test]
	fn mkn_freqs_top_level_buckets_partition_extensions() {
		let freqs = built_model();
		let mut mkn = MknFreqs::new(freqs.n());
		mkn.update(&freqs);
		let a = freqs.index("a");
		let total = mkn.r1(1, &a) + mkn.r2(1, &a) + mkn.r3p(1, &a);
		assert_eq!(total, 2); // "a" -> "b" and "a" -> EOS
	}
}
