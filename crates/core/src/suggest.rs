//! Pure ranking over a snapshot of autocomplete candidates.
//!
//! The picker's suggestion list is noisy and inconsistently ordered:
//! screen-reader help rows appear between real places, and a bare country
//! code often sorts above the fully qualified place the user wants. The
//! resolver prefers the longest candidate containing the query's first
//! comma token, so `DE, 10115, Berlin` outranks `DE`.

/// One UI-surfaced suggestion. Ephemeral, never persisted; `position` is
/// the index into the live element list it was sampled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
	pub text: String,
	pub position: usize,
}

/// Resolver outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
	/// Click the candidate at this position.
	Pick(usize),
	/// Nothing qualified: accept the picker's default (topmost) entry.
	ConfirmDefault,
}

/// Help/placeholder rows some pickers interleave with real suggestions.
const NOISE_PHRASES: &[&str] = &[
	"press space",
	"press enter",
	"use arrow",
	"start typing",
	"no results",
	"loading...",
];

/// Picks the best candidate for `query`, or signals that the default
/// should be confirmed. Never errors: an unusable list degrades to
/// [`Resolution::ConfirmDefault`].
pub fn resolve(query: &str, candidates: &[Candidate]) -> Resolution {
	if candidates.len() == 1 {
		return Resolution::Pick(candidates[0].position);
	}

	let needle = query
		.split(',')
		.next()
		.unwrap_or(query)
		.trim()
		.to_lowercase();
	if needle.is_empty() {
		return Resolution::ConfirmDefault;
	}

	let mut best: Option<(usize, usize)> = None; // (position, text length)
	for candidate in candidates {
		let lower = candidate.text.to_lowercase();
		if NOISE_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
			continue;
		}
		if !lower.contains(&needle) {
			continue;
		}
		let len = candidate.text.chars().count();
		// Strictly-greater keeps the first-seen candidate on ties.
		if best.is_none_or(|(_, best_len)| len > best_len) {
			best = Some((candidate.position, len));
		}
	}

	match best {
		Some((position, _)) => Resolution::Pick(position),
		None => Resolution::ConfirmDefault,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidates(texts: &[&str]) -> Vec<Candidate> {
		texts
			.iter()
			.enumerate()
			.map(|(position, text)| Candidate {
				text: (*text).into(),
				position,
			})
			.collect()
	}

	#[test]
	fn longest_qualifying_candidate_wins() {
		let list = candidates(&["DE", "DE, 10115, Berlin"]);
		assert_eq!(resolve("DE, 10115", &list), Resolution::Pick(1));
	}

	#[test]
	fn qualification_uses_first_comma_token_case_insensitively() {
		let list = candidates(&["FR, 75001, Paris", "de, 10115, berlin mitte"]);
		assert_eq!(resolve("DE, 10115", &list), Resolution::Pick(1));
	}

	#[test]
	fn zero_qualifying_candidates_signal_fallback() {
		let list = candidates(&["FR, 75001, Paris", "IT, 00100, Roma"]);
		assert_eq!(resolve("DE, 10115", &list), Resolution::ConfirmDefault);
	}

	#[test]
	fn noise_rows_are_ignored() {
		let list = candidates(&[
			"Press Space to select, use arrow keys to navigate",
			"DE, 10115, Berlin",
		]);
		assert_eq!(resolve("DE", &list), Resolution::Pick(1));
	}

	#[test]
	fn ties_keep_first_seen_order() {
		let list = candidates(&["DE, 10115, AAAA", "DE, 10115, BBBB"]);
		assert_eq!(resolve("DE", &list), Resolution::Pick(0));
	}

	#[test]
	fn single_candidate_short_circuits() {
		let list = candidates(&["anything at all"]);
		assert_eq!(resolve("DE, 10115", &list), Resolution::Pick(0));
	}

	#[test]
	fn empty_query_confirms_default() {
		let list = candidates(&["DE", "DE, 10115, Berlin"]);
		assert_eq!(resolve("   ", &list), Resolution::ConfirmDefault);
	}

	#[test]
	fn empty_list_confirms_default() {
		assert_eq!(resolve("DE", &[]), Resolution::ConfirmDefault);
	}
}
