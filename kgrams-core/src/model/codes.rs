//! Splitting helpers for space-joined k-gram codes, shared by `KgramFreqs`
//! and the satellite tables.

use crate::special_tokens::BOS_IND;

/// Splits `"$1 $2 ... $k"` into `("$1 ... $(k-1)", "$k")`. Panics on an
/// empty code (0-grams have no last word).
pub fn split_last(code: &str) -> (&str, &str) {
	match code.rfind(' ') {
		Some(i) => (&code[..i], &code[i + 1..]),
		None => ("", code),
	}
}

/// Splits `"$1 $2 ... $k"` into `("$1", "$2 ... $k")`.
pub fn split_first(code: &str) -> (&str, &str) {
	match code.find(' ') {
		Some(i) => (&code[..i], &code[i + 1..]),
		None => (code, ""),
	}
}

/// Splits `"$1 $2 ... $k"` into `("$1", "$2 ... $(k-1)", "$k")`.
pub fn split_outer(code: &str) -> (&str, &str, &str) {
	let (first, rest) = split_first(code);
	let (middle, last) = split_last(rest);
	(first, middle, last)
}

/// Joins two non-empty code fragments with a single space; tolerates
/// either fragment being empty (the 0-gram code).
pub fn join(a: &str, b: &str) -> String {
	if a.is_empty() {
		b.to_string()
	} else if b.is_empty() {
		a.to_string()
	} else {
		format!("{} {}", a, b)
	}
}

/// True iff `code` is exactly the BOS index (used to exclude k-grams
/// ending, or starting, in BOS from continuation counts).
pub fn is_bos(code: &str) -> bool {
	code == BOS_IND
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn split_last_separates_final_word() {
		assert_eq!(split_last("1 2 3"), ("1 2", "3"));
		assert_eq!(split_last("1"), ("", "1"));
	}

	#[test]
	fn split_first_separates_leading_word() {
		assert_eq!(split_first("1 2 3"), ("1", "2 3"));
		assert_eq!(split_first("1"), ("1", ""));
	}

	#[test]
	fn split_outer_separates_both_ends() {
		assert_eq!(split_outer("1 2 3"), ("1", "2", "3"));
		assert_eq!(split_outer("1 2"), ("1", "", "2"));
	}
}
