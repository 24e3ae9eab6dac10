use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl std::fmt::Display for PlayerId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "P{}", self.0)
	}
}

/// A card is identified by its index in the full deck. Features are derived
/// from the index by the oracle; the core only ever compares identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card(pub u32);

impl std::fmt::Display for Card {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Cards `0..deck_size`, stopping at the last id a `Card` can hold.
pub fn full_deck(deck_size: usize) -> Vec<Card> {
	(0..deck_size).map_while(|i| u32::try_from(i).ok().map(Card)).collect()
}

/// The dealer's judgment of a completed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
	Accepted,
	Rejected,
	/// The token set lost a card to someone else's accepted combination
	/// before it was judged.
	Superseded,
}

impl Verdict {
	pub fn description(&self) -> &'static str {
		match self {
			Verdict::Accepted => "accepted",
			Verdict::Rejected => "rejected",
			Verdict::Superseded => "superseded",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
	Countdown {
		remaining_ms: u64,
		urgent: bool,
	},

	ScoreChanged {
		player: PlayerId,
		score: u32,
	},

	Freeze {
		player: PlayerId,
		remaining_ms: u64,
	},

	Winners {
		players: Vec<PlayerId>,
	},

	CardPlaced {
		slot: usize,
		card: Card,
	},

	CardRemoved {
		slot: usize,
	},

	TokenPlaced {
		player: PlayerId,
		slot: usize,
	},

	TokenRemoved {
		player: PlayerId,
		slot: usize,
	},
}
