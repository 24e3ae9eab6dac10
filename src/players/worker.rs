use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Instant};

use crate::config::DISPLAY_TICK;
use crate::display::DisplaySink;
use crate::events::{PlayerId, Verdict};
use crate::grid::{lock_grid, SharedGrid, Toggle};
use crate::logging::player as log;
use crate::players::{ParticipantHandle, Submission};
use crate::scoreboard::Scoreboard;
use crate::shutdown::Shutdown;

#[derive(Debug, Clone, Copy)]
pub struct FreezeDurations {
	pub point: Duration,
	pub penalty: Duration,
}

/// One player's loop: take a press off the queue, toggle the token, and once
/// the set is complete hand it to the dealer and wait for the verdict.
pub struct ParticipantWorker {
	id: PlayerId,
	human: bool,
	grid: SharedGrid,
	actions: mpsc::Receiver<usize>,
	busy: Arc<AtomicBool>,
	submissions: mpsc::UnboundedSender<Submission>,
	scoreboard: Arc<Scoreboard>,
	sink: Arc<dyn DisplaySink>,
	freezes: FreezeDurations,
	shutdown: Shutdown,
}

impl ParticipantWorker {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		id: PlayerId,
		human: bool,
		grid: SharedGrid,
		submissions: mpsc::UnboundedSender<Submission>,
		scoreboard: Arc<Scoreboard>,
		sink: Arc<dyn DisplaySink>,
		freezes: FreezeDurations,
		shutdown: Shutdown,
	) -> (Self, ParticipantHandle) {
		let capacity = lock_grid(&grid).combination_size().max(1);
		let (action_tx, actions) = mpsc::channel(capacity);
		let busy = Arc::new(AtomicBool::new(false));

		let worker = Self {
			id,
			human,
			grid,
			actions,
			busy: Arc::clone(&busy),
			submissions,
			scoreboard,
			sink,
			freezes,
			shutdown,
		};
		let handle = ParticipantHandle::new(id, human, action_tx, busy);

		(worker, handle)
	}

	pub fn id(&self) -> PlayerId {
		self.id
	}

	pub async fn run(mut self) {
		log::started(self.id, self.human);

		loop {
			let slot = tokio::select! {
				biased;
				_ = self.shutdown.wait() => break,
				slot = self.actions.recv() => match slot {
					Some(slot) => slot,
					None => break,
				},
			};

			if !self.handle_press(slot).await {
				break;
			}
		}

		log::stopped(self.id);
	}

	/// Returns false once the game is over for this player.
	async fn handle_press(&mut self, slot: usize) -> bool {
		let complete = {
			let mut grid = lock_grid(&self.grid);
			match grid.toggle_token(self.id, slot) {
				Toggle::Placed { held } if held == grid.combination_size() => {
					self.busy.store(true, Ordering::SeqCst);
					Some(grid.tokens_of(self.id).to_vec())
				}
				_ => None,
			}
		};

		match complete {
			Some(slots) => self.submit(&slots).await,
			None => true,
		}
	}

	async fn submit(&mut self, slots: &[usize]) -> bool {
		let (verdict_tx, mut verdict_rx) = oneshot::channel();
		log::submitted(self.id, slots);

		if self.submissions.send(Submission { player: self.id, verdict_tx }).is_err() {
			return false;
		}
		self.scoreboard.record_submission(self.id);

		// the dealer answers or drops every submission it took, even when stopping
		let answer = tokio::select! {
			biased;
			verdict = &mut verdict_rx => verdict,
			_ = self.shutdown.wait() => (&mut verdict_rx).await,
		};
		let Ok(verdict) = answer else {
			return false;
		};
		self.scoreboard.record_verdict(self.id, verdict);

		let still_running = match verdict {
			Verdict::Accepted => {
				self.sink.show_score(self.id, self.scoreboard.score(self.id));
				self.freeze(self.freezes.point).await
			}
			Verdict::Rejected => self.freeze(self.freezes.penalty).await,
			Verdict::Superseded => !self.shutdown.is_triggered(),
		};
		log::verdict(self.id, verdict, self.scoreboard.score(self.id));

		self.busy.store(false, Ordering::SeqCst);
		still_running
	}

	async fn freeze(&mut self, duration: Duration) -> bool {
		if duration.is_zero() {
			return true;
		}
		log::frozen(self.id, duration);

		let until = Instant::now() + duration;
		loop {
			let now = Instant::now();
			if now >= until {
				break;
			}
			let remaining = until - now;
			self.sink.show_freeze(self.id, remaining);

			tokio::select! {
				biased;
				_ = self.shutdown.wait() => return false,
				_ = sleep(remaining.min(DISPLAY_TICK)) => {}
			}
		}

		self.sink.show_freeze(self.id, Duration::ZERO);
		true
	}
}
