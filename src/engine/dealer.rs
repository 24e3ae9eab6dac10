use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

use crate::config::{GameConfig, DISPLAY_TICK, URGENT_TICK};
use crate::display::DisplaySink;
use crate::events::{full_deck, Card, PlayerId, Verdict};
use crate::grid::{lock_grid, Grid, SharedGrid};
use crate::logging::dealer as log;
use crate::oracle::CombinationOracle;
use crate::players::Submission;
use crate::scoreboard::Scoreboard;
use crate::shutdown::Shutdown;

fn deal_into(deck: &mut Vec<Card>, rng: &mut StdRng, grid: &mut Grid) -> usize {
	let mut placed = 0;
	for slot in grid.empty_slots() {
		if deck.is_empty() {
			break;
		}
		let card = deck.swap_remove(rng.random_range(0..deck.len()));
		if grid.place_card(card, slot) {
			placed += 1;
		} else {
			deck.push(card);
		}
	}
	placed
}

pub struct Dealer {
	grid: SharedGrid,
	oracle: Arc<dyn CombinationOracle>,
	sink: Arc<dyn DisplaySink>,
	scoreboard: Arc<Scoreboard>,
	submissions: mpsc::UnboundedReceiver<Submission>,
	shutdown: Shutdown,
	deck: Vec<Card>,
	/// Every card not yet taken out of play by an accepted combination.
	remaining: Vec<Card>,
	turn: Duration,
	warning: Duration,
	deadline: Instant,
	rng: StdRng,
	round: u32,
	stopped: bool,
}

impl Dealer {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		config: &GameConfig,
		grid: SharedGrid,
		oracle: Arc<dyn CombinationOracle>,
		sink: Arc<dyn DisplaySink>,
		scoreboard: Arc<Scoreboard>,
		submissions: mpsc::UnboundedReceiver<Submission>,
		shutdown: Shutdown,
	) -> Self {
		let rng = match config.seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => StdRng::from_os_rng(),
		};
		let deck = full_deck(config.deck_size);

		Self {
			grid,
			oracle,
			sink,
			scoreboard,
			submissions,
			shutdown,
			remaining: deck.clone(),
			deck,
			turn: config.turn_timeout(),
			warning: config.warning_window(),
			deadline: Instant::now(),
			rng,
			round: 0,
			stopped: false,
		}
	}

	pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
		self.remaining = deck.clone();
		self.deck = deck;
		self
	}

	pub fn deck_len(&self) -> usize {
		self.deck.len()
	}

	pub fn remaining(&self) -> &[Card] {
		&self.remaining
	}

	pub fn deadline(&self) -> Instant {
		self.deadline
	}

	/// Plays rounds until no combination is left anywhere or the game is
	/// stopped, then announces and returns the winners.
	pub async fn run(mut self) -> Vec<PlayerId> {
		log::started(self.scoreboard.player_count(), self.deck.len());

		while !self.should_finish() {
			self.round += 1;
			self.place_cards_on_grid();
			self.reset_countdown();
			self.countdown().await;
			self.remove_all_cards_from_grid();
		}

		if self.stopped || self.shutdown.is_triggered() {
			log::terminated("stopped");
		} else {
			log::terminated("no combinations left");
		}
		self.dismiss_pending();
		self.announce_winners()
	}

	// the grid is empty by now, so everything still queued is superseded
	fn dismiss_pending(&mut self) {
		self.submissions.close();
		while let Ok(submission) = self.submissions.try_recv() {
			self.arbitrate(submission);
		}
	}

	pub fn should_finish(&self) -> bool {
		self.stopped || self.shutdown.is_triggered() || !self.oracle.exists_combination(&self.remaining, 1)
	}

	pub fn place_cards_on_grid(&mut self) {
		let grid = Arc::clone(&self.grid);
		let mut grid = lock_grid(&grid);
		deal_into(&mut self.deck, &mut self.rng, &mut grid);
		log::round_started(self.round, grid.count_cards(), self.deck.len());
	}

	pub fn remove_all_cards_from_grid(&mut self) {
		let grid = Arc::clone(&self.grid);
		let returned = lock_grid(&grid).clear();
		log::round_collected(self.round, returned.len());
		self.deck.extend(returned);
	}

	pub fn reset_countdown(&mut self) {
		self.deadline = Instant::now() + self.turn;
		self.sink.show_countdown(self.turn, self.turn <= self.warning);
		log::countdown_reset(self.turn);
	}

	async fn countdown(&mut self) {
		loop {
			let now = Instant::now();
			if self.shutdown.is_triggered() || now >= self.deadline {
				break;
			}
			let remaining = self.deadline - now;
			let urgent = remaining <= self.warning;
			self.sink.show_countdown(remaining, urgent);

			let quantum = if urgent { URGENT_TICK } else { DISPLAY_TICK };
			tokio::select! {
				biased;
				_ = self.shutdown.wait() => {
					self.stopped = true;
					break;
				}
				Some(submission) = self.submissions.recv() => {
					self.arbitrate(submission);
				}
				_ = sleep(quantum.min(remaining)) => {}
			}
		}
		self.sink.show_countdown(Duration::ZERO, true);
	}

	/// Judges one submission and answers it. Holds the grid lock for the whole
	/// check so no deal, collect or other judgment can interleave.
	pub fn arbitrate(&mut self, submission: Submission) -> Verdict {
		let Submission { player, verdict_tx } = submission;

		let grid = Arc::clone(&self.grid);
		let mut grid = lock_grid(&grid);
		let slots = grid.tokens_of(player).to_vec();

		let verdict = if slots.len() != grid.combination_size() {
			Verdict::Superseded
		} else {
			let cards: Option<Vec<Card>> = slots.iter().map(|&slot| grid.card_at(slot)).collect();
			match cards {
				Some(cards) if self.oracle.is_valid_combination(&cards) => {
					for &slot in &slots {
						if let Some(card) = grid.remove_card(slot) {
							self.remaining.retain(|&c| c != card);
						}
					}
					deal_into(&mut self.deck, &mut self.rng, &mut grid);
					self.scoreboard.point(player);
					Verdict::Accepted
				}
				Some(_) => Verdict::Rejected,
				None => Verdict::Superseded,
			}
		};
		drop(grid);

		if verdict == Verdict::Accepted {
			self.reset_countdown();
		}
		log::verdict(player, &slots, verdict);

		let _ = verdict_tx.send(verdict);
		verdict
	}

	pub fn announce_winners(&self) -> Vec<PlayerId> {
		let winners = self.scoreboard.winners();
		let best = winners.first().map(|&p| self.scoreboard.score(p)).unwrap_or(0);
		log::winners(&winners, best);
		self.sink.announce_winners(&winners);
		winners
	}
}
