use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::events::{Card, GameEvent, PlayerId};

/// Where the game reports what a player would see. Calls are fire-and-forget;
/// nothing the sink does feeds back into the game.
pub trait DisplaySink: Send + Sync {
	fn show_countdown(&self, remaining: Duration, urgent: bool);

	fn show_score(&self, player: PlayerId, score: u32);

	fn show_freeze(&self, player: PlayerId, remaining: Duration);

	fn announce_winners(&self, players: &[PlayerId]);

	fn card_placed(&self, _slot: usize, _card: Card) {}

	fn card_removed(&self, _slot: usize) {}

	fn token_placed(&self, _player: PlayerId, _slot: usize) {}

	fn token_removed(&self, _player: PlayerId, _slot: usize) {}
}

/// Forwards every display call as a [`GameEvent`].
pub struct EventSink {
	event_tx: UnboundedSender<GameEvent>,
}

impl EventSink {
	pub fn new() -> (Self, UnboundedReceiver<GameEvent>) {
		let (event_tx, event_rx) = mpsc::unbounded_channel();
		(Self { event_tx }, event_rx)
	}

	fn emit(&self, event: GameEvent) {
		let _ = self.event_tx.send(event);
	}
}

impl DisplaySink for EventSink {
	fn show_countdown(&self, remaining: Duration, urgent: bool) {
		self.emit(GameEvent::Countdown {
			remaining_ms: remaining.as_millis() as u64,
			urgent,
		});
	}

	fn show_score(&self, player: PlayerId, score: u32) {
		self.emit(GameEvent::ScoreChanged { player, score });
	}

	fn show_freeze(&self, player: PlayerId, remaining: Duration) {
		self.emit(GameEvent::Freeze {
			player,
			remaining_ms: remaining.as_millis() as u64,
		});
	}

	fn announce_winners(&self, players: &[PlayerId]) {
		self.emit(GameEvent::Winners { players: players.to_vec() });
	}

	fn card_placed(&self, slot: usize, card: Card) {
		self.emit(GameEvent::CardPlaced { slot, card });
	}

	fn card_removed(&self, slot: usize) {
		self.emit(GameEvent::CardRemoved { slot });
	}

	fn token_placed(&self, player: PlayerId, slot: usize) {
		self.emit(GameEvent::TokenPlaced { player, slot });
	}

	fn token_removed(&self, player: PlayerId, slot: usize) {
		self.emit(GameEvent::TokenRemoved { player, slot });
	}
}

pub struct NullSink;

impl DisplaySink for NullSink {
	fn show_countdown(&self, _remaining: Duration, _urgent: bool) {}

	fn show_score(&self, _player: PlayerId, _score: u32) {}

	fn show_freeze(&self, _player: PlayerId, _remaining: Duration) {}

	fn announce_winners(&self, _players: &[PlayerId]) {}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_event_sink_forwards_in_order() {
		let (sink, mut rx) = EventSink::new();
		sink.card_placed(3, Card(17));
		sink.show_score(PlayerId(1), 2);
		sink.show_countdown(Duration::from_millis(1500), false);

		assert_eq!(rx.try_recv().unwrap(), GameEvent::CardPlaced { slot: 3, card: Card(17) });
		assert_eq!(rx.try_recv().unwrap(), GameEvent::ScoreChanged { player: PlayerId(1), score: 2 });
		assert_eq!(
			rx.try_recv().unwrap(),
			GameEvent::Countdown { remaining_ms: 1500, urgent: false }
		);
		assert!(rx.try_recv().is_err());
	}

	#[test]
	fn test_event_sink_survives_dropped_receiver() {
		let (sink, rx) = EventSink::new();
		drop(rx);
		sink.announce_winners(&[PlayerId(0)]);
	}
}
