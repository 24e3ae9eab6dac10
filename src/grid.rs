use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::DisplaySink;
use crate::events::{Card, PlayerId};
use crate::logging::grid as log;

pub type SharedGrid = Arc<Mutex<Grid>>;

/// Locks the grid, recovering the guard if a holder panicked.
pub fn lock_grid(grid: &Mutex<Grid>) -> MutexGuard<'_, Grid> {
	grid.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
	Removed,
	Placed { held: usize },
	Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
	pub cards: Vec<Option<Card>>,
	pub tokens: Vec<Vec<PlayerId>>,
}

impl GridSnapshot {
	pub fn card_count(&self) -> usize {
		self.cards.iter().filter(|c| c.is_some()).count()
	}
}

/// Slots, the cards in them, and every player's tokens.
///
/// The grid does no locking of its own. Callers hold the [`SharedGrid`] lock
/// for the whole of a compound change (remove three cards then refill) so
/// nobody observes the halfway state.
pub struct Grid {
	slot_to_card: Vec<Option<Card>>,
	card_to_slot: HashMap<Card, usize>,
	tokens: Vec<BTreeSet<PlayerId>>,
	holdings: Vec<Vec<usize>>,
	combination_size: usize,
	sink: Arc<dyn DisplaySink>,
}

impl Grid {
	pub fn new(
		slot_count: usize,
		player_count: usize,
		combination_size: usize,
		sink: Arc<dyn DisplaySink>,
	) -> Self {
		Self {
			slot_to_card: vec![None; slot_count],
			card_to_slot: HashMap::new(),
			tokens: vec![BTreeSet::new(); slot_count],
			holdings: vec![Vec::new(); player_count],
			combination_size,
			sink,
		}
	}

	pub fn shared(self) -> SharedGrid {
		Arc::new(Mutex::new(self))
	}

	pub fn slot_count(&self) -> usize {
		self.slot_to_card.len()
	}

	pub fn combination_size(&self) -> usize {
		self.combination_size
	}

	pub fn card_at(&self, slot: usize) -> Option<Card> {
		self.slot_to_card.get(slot).copied().flatten()
	}

	pub fn slot_of(&self, card: Card) -> Option<usize> {
		self.card_to_slot.get(&card).copied()
	}

	pub fn count_cards(&self) -> usize {
		self.card_to_slot.len()
	}

	pub fn cards(&self) -> Vec<Card> {
		self.slot_to_card.iter().flatten().copied().collect()
	}

	pub fn empty_slots(&self) -> Vec<usize> {
		self.slot_to_card
			.iter()
			.enumerate()
			.filter(|(_, c)| c.is_none())
			.map(|(slot, _)| slot)
			.collect()
	}

	/// Slots tokened by `player`, in the order the tokens were placed.
	pub fn tokens_of(&self, player: PlayerId) -> &[usize] {
		self.holdings.get(player.0).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn holders_of(&self, slot: usize) -> Vec<PlayerId> {
		self.tokens
			.get(slot)
			.map(|set| set.iter().copied().collect())
			.unwrap_or_default()
	}

	#[must_use]
	pub fn place_card(&mut self, card: Card, slot: usize) -> bool {
		match self.slot_to_card.get(slot) {
			Some(None) => {}
			_ => return false,
		}
		if self.card_to_slot.contains_key(&card) {
			return false;
		}
		self.slot_to_card[slot] = Some(card);
		self.card_to_slot.insert(card, slot);
		log::card_placed(slot, card);
		self.sink.card_placed(slot, card);
		true
	}

	/// Empties `slot`. Every token on it disappears with the card.
	pub fn remove_card(&mut self, slot: usize) -> Option<Card> {
		let card = self.slot_to_card.get_mut(slot)?.take()?;
		self.card_to_slot.remove(&card);

		let holders = std::mem::take(&mut self.tokens[slot]);
		for player in holders {
			if let Some(held) = self.holdings.get_mut(player.0) {
				held.retain(|&s| s != slot);
			}
			self.sink.token_removed(player, slot);
		}

		log::card_removed(slot, card);
		self.sink.card_removed(slot);
		Some(card)
	}

	#[must_use]
	pub fn place_token(&mut self, player: PlayerId, slot: usize) -> bool {
		if self.card_at(slot).is_none() {
			return false;
		}
		let Some(held) = self.holdings.get_mut(player.0) else {
			return false;
		};
		if held.len() >= self.combination_size || held.contains(&slot) {
			return false;
		}
		held.push(slot);
		self.tokens[slot].insert(player);
		self.sink.token_placed(player, slot);
		true
	}

	#[must_use]
	pub fn remove_token(&mut self, player: PlayerId, slot: usize) -> bool {
		if self.card_at(slot).is_none() {
			return false;
		}
		let Some(held) = self.holdings.get_mut(player.0) else {
			return false;
		};
		let Some(pos) = held.iter().position(|&s| s == slot) else {
			return false;
		};
		held.remove(pos);
		self.tokens[slot].remove(&player);
		self.sink.token_removed(player, slot);
		true
	}

	/// A key press: lifts the player's token from `slot` if there is one,
	/// otherwise tries to place one.
	pub fn toggle_token(&mut self, player: PlayerId, slot: usize) -> Toggle {
		if self.remove_token(player, slot) {
			Toggle::Removed
		} else if self.place_token(player, slot) {
			Toggle::Placed { held: self.tokens_of(player).len() }
		} else {
			Toggle::Ignored
		}
	}

	/// Lifts every token and every card, returning the cards in slot order.
	pub fn clear(&mut self) -> Vec<Card> {
		(0..self.slot_count()).filter_map(|slot| self.remove_card(slot)).collect()
	}

	pub fn snapshot(&self) -> GridSnapshot {
		GridSnapshot {
			cards: self.slot_to_card.clone(),
			tokens: self.tokens.iter().map(|set| set.iter().copied().collect()).collect(),
		}
	}

	/// Cross-checks the slot, card and token indexes against each other.
	pub fn check_invariants(&self) -> Result<(), String> {
		for (slot, card) in self.slot_to_card.iter().enumerate() {
			if let Some(card) = card {
				if self.card_to_slot.get(card) != Some(&slot) {
					return Err(format!("card {} in slot {} is not indexed there", card, slot));
				}
			} else if !self.tokens[slot].is_empty() {
				return Err(format!("empty slot {} carries tokens", slot));
			}
		}
		if self.card_to_slot.len() != self.slot_to_card.iter().flatten().count() {
			return Err("card index and slots disagree on card count".to_string());
		}
		for (id, held) in self.holdings.iter().enumerate() {
			let player = PlayerId(id);
			if held.len() > self.combination_size {
				return Err(format!("{} holds {} tokens", player, held.len()));
			}
			for &slot in held {
				if self.slot_to_card[slot].is_none() {
					return Err(format!("{} holds a token on empty slot {}", player, slot));
				}
				if !self.tokens[slot].contains(&player) {
					return Err(format!("{} token on slot {} missing from slot", player, slot));
				}
			}
		}
		for (slot, holders) in self.tokens.iter().enumerate() {
			for player in holders {
				if !self.tokens_of(*player).contains(&slot) {
					return Err(format!("slot {} lists {} who does not hold it", slot, player));
				}
			}
		}
		Ok(())
	}
}
