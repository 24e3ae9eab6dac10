use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, oneshot};

use crate::events::{PlayerId, Verdict};

#[derive(Debug)]
pub struct Submission {
	pub player: PlayerId,
	pub verdict_tx: oneshot::Sender<Verdict>,
}

#[derive(Debug, Clone)]
pub struct ParticipantHandle {
	id: PlayerId,
	human: bool,
	action_tx: mpsc::Sender<usize>,
	busy: Arc<AtomicBool>,
}

impl ParticipantHandle {
	pub(crate) fn new(
		id: PlayerId,
		human: bool,
		action_tx: mpsc::Sender<usize>,
		busy: Arc<AtomicBool>,
	) -> Self {
		Self { id, human, action_tx, busy }
	}

	pub fn id(&self) -> PlayerId {
		self.id
	}

	pub fn is_human(&self) -> bool {
		self.human
	}

	pub fn is_busy(&self) -> bool {
		self.busy.load(Ordering::SeqCst)
	}

	pub fn is_closed(&self) -> bool {
		self.action_tx.is_closed()
	}

	/// Queues a toggle of `slot`. Dropped (returns false) while the player is
	/// busy or already has a full set's worth of presses pending.
	pub fn press(&self, slot: usize) -> bool {
		if self.is_busy() {
			return false;
		}
		self.action_tx.try_send(slot).is_ok()
	}
}
