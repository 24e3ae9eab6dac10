use std::sync::atomic::{AtomicU32, Ordering};

use crate::events::{PlayerId, Verdict};

#[derive(Debug, Default)]
struct Entry {
	score: AtomicU32,
	submitted: AtomicU32,
	accepted: AtomicU32,
	rejected: AtomicU32,
	superseded: AtomicU32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
	pub score: u32,
	pub submitted: u32,
	pub accepted: u32,
	pub rejected: u32,
	pub superseded: u32,
}

impl Tally {
	pub fn verdicts(&self) -> u32 {
		self.accepted + self.rejected + self.superseded
	}
}

/// Scores and verdict counts per player. Each player only ever writes its
/// own entry; the dealer reads all of them when the game ends.
#[derive(Debug)]
pub struct Scoreboard {
	entries: Vec<Entry>,
}

impl Scoreboard {
	pub fn new(player_count: usize) -> Self {
		Self {
			entries: (0..player_count).map(|_| Entry::default()).collect(),
		}
	}

	pub fn player_count(&self) -> usize {
		self.entries.len()
	}

	/// Awards one point and returns the new score.
	pub fn point(&self, player: PlayerId) -> u32 {
		match self.entries.get(player.0) {
			Some(entry) => entry.score.fetch_add(1, Ordering::SeqCst) + 1,
			None => 0,
		}
	}

	pub fn record_submission(&self, player: PlayerId) {
		if let Some(entry) = self.entries.get(player.0) {
			entry.submitted.fetch_add(1, Ordering::SeqCst);
		}
	}

	pub fn record_verdict(&self, player: PlayerId, verdict: Verdict) {
		if let Some(entry) = self.entries.get(player.0) {
			let counter = match verdict {
				Verdict::Accepted => &entry.accepted,
				Verdict::Rejected => &entry.rejected,
				Verdict::Superseded => &entry.superseded,
			};
			counter.fetch_add(1, Ordering::SeqCst);
		}
	}

	pub fn score(&self, player: PlayerId) -> u32 {
		self.entries
			.get(player.0)
			.map(|e| e.score.load(Ordering::SeqCst))
			.unwrap_or(0)
	}

	pub fn scores(&self) -> Vec<u32> {
		self.entries.iter().map(|e| e.score.load(Ordering::SeqCst)).collect()
	}

	pub fn tally(&self, player: PlayerId) -> Tally {
		self.entries
			.get(player.0)
			.map(|e| Tally {
				score: e.score.load(Ordering::SeqCst),
				submitted: e.submitted.load(Ordering::SeqCst),
				accepted: e.accepted.load(Ordering::SeqCst),
				rejected: e.rejected.load(Ordering::SeqCst),
				superseded: e.superseded.load(Ordering::SeqCst),
			})
			.unwrap_or_default()
	}

	/// Everyone sharing the top score, in id order.
	pub fn winners(&self) -> Vec<PlayerId> {
		let scores = self.scores();
		let Some(&best) = scores.iter().max() else {
			return Vec::new();
		};
		scores
			.iter()
			.enumerate()
			.filter(|&(_, &s)| s == best)
			.map(|(i, _)| PlayerId(i))
			.collect()
	}
}
