use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{ConfigError, GameConfig, ParticipantSpec};
use crate::display::DisplaySink;
use crate::engine::dealer::Dealer;
use crate::events::{Card, PlayerId};
use crate::grid::{lock_grid, Grid, GridSnapshot, SharedGrid};
use crate::logging::runner as log;
use crate::oracle::CombinationOracle;
use crate::players::{
	drive, ActionSource, FreezeDurations, ParticipantHandle, ParticipantWorker, RandomSource,
};
use crate::scoreboard::{Scoreboard, Tally};
use crate::shutdown::{self, ShutdownTrigger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
	pub names: Vec<String>,
	pub scores: Vec<u32>,
	pub winners: Vec<PlayerId>,
	pub tallies: Vec<Tally>,
}

pub struct GameRunner {
	participants: Vec<ParticipantSpec>,
	dealer: Dealer,
	workers: Vec<ParticipantWorker>,
	handles: Vec<ParticipantHandle>,
	sources: Vec<Option<Box<dyn ActionSource>>>,
	scoreboard: Arc<Scoreboard>,
	trigger: ShutdownTrigger,
}

#[derive(Clone)]
pub struct GameHandle {
	grid: SharedGrid,
	oracle: Arc<dyn CombinationOracle>,
	scoreboard: Arc<Scoreboard>,
	participants: Vec<ParticipantHandle>,
	trigger: ShutdownTrigger,
}

impl GameRunner {
	pub fn new(
		config: GameConfig,
		oracle: Arc<dyn CombinationOracle>,
		sink: Arc<dyn DisplaySink>,
	) -> Result<(Self, GameHandle), ConfigError> {
		config.validate()?;
		if oracle.combination_size() != config.feature_size {
			return Err(ConfigError::Invalid(format!(
				"oracle judges groups of {} but feature_size is {}",
				oracle.combination_size(),
				config.feature_size
			)));
		}

		let participants = config.participants();
		let grid = Grid::new(
			config.slot_count(),
			participants.len(),
			config.feature_size,
			Arc::clone(&sink),
		)
		.shared();
		let scoreboard = Arc::new(Scoreboard::new(participants.len()));
		let (trigger, shutdown) = shutdown::channel();
		let (submit_tx, submit_rx) = mpsc::unbounded_channel();
		let freezes = FreezeDurations {
			point: config.point_freeze(),
			penalty: config.penalty_freeze(),
		};

		let mut workers = Vec::with_capacity(participants.len());
		let mut handles = Vec::with_capacity(participants.len());
		let mut sources: Vec<Option<Box<dyn ActionSource>>> = Vec::with_capacity(participants.len());
		for spec in &participants {
			log::participant(spec.id, &spec.name, spec.human);
			let (worker, handle) = ParticipantWorker::new(
				spec.id,
				spec.human,
				Arc::clone(&grid),
				submit_tx.clone(),
				Arc::clone(&scoreboard),
				Arc::clone(&sink),
				freezes,
				shutdown.clone(),
			);
			workers.push(worker);
			handles.push(handle);

			let source: Option<Box<dyn ActionSource>> = if spec.human {
				None
			} else {
				let seed = config.seed.map(|s| s.wrapping_add(spec.id.0 as u64 + 1));
				Some(Box::new(RandomSource::new(config.slot_count(), config.computer_pace(), seed)))
			};
			sources.push(source);
		}
		drop(submit_tx);

		let dealer = Dealer::new(
			&config,
			Arc::clone(&grid),
			Arc::clone(&oracle),
			sink,
			Arc::clone(&scoreboard),
			submit_rx,
			shutdown,
		);

		let handle = GameHandle {
			grid,
			oracle,
			scoreboard: Arc::clone(&scoreboard),
			participants: handles.clone(),
			trigger: trigger.clone(),
		};

		let runner = Self {
			participants,
			dealer,
			workers,
			handles,
			sources,
			scoreboard,
			trigger,
		};

		Ok((runner, handle))
	}

	pub fn participants(&self) -> &[ParticipantSpec] {
		&self.participants
	}

	pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
		self.dealer = self.dealer.with_deck(deck);
		self
	}

	pub fn set_source(&mut self, player: PlayerId, source: Box<dyn ActionSource>) -> bool {
		match self.sources.get_mut(player.0) {
			Some(slot) => {
				*slot = Some(source);
				true
			}
			None => false,
		}
	}

	pub async fn run(self) -> GameSummary {
		let Self {
			participants,
			dealer,
			workers,
			handles,
			sources,
			scoreboard,
			trigger,
		} = self;

		let worker_count = workers.len();
		let mut tasks: Vec<(String, JoinHandle<()>)> = workers
			.into_iter()
			.map(|worker| (format!("player {}", worker.id()), tokio::spawn(worker.run())))
			.collect();

		let mut source_count = 0;
		for (handle, source) in handles.into_iter().zip(sources) {
			if let Some(source) = source {
				let name = format!("input {}", handle.id());
				let shutdown = trigger.subscribe();
				tasks.push((name, tokio::spawn(drive(source, handle, shutdown))));
				source_count += 1;
			}
		}
		log::spawned(worker_count, source_count);

		let winners = match tokio::spawn(dealer.run()).await {
			Ok(winners) => winners,
			Err(e) => {
				log::task_failed("dealer", &e.to_string());
				scoreboard.winners()
			}
		};

		trigger.trigger();
		for (name, task) in tasks {
			if let Err(e) = task.await {
				log::task_failed(&name, &e.to_string());
			}
		}

		let scores = scoreboard.scores();
		log::finished(&scores);
		let tallies = (0..scores.len()).map(|i| scoreboard.tally(PlayerId(i))).collect();

		let names = participants.into_iter().map(|p| p.name).collect();

		GameSummary { names, scores, winners, tallies }
	}
}

impl GameHandle {
	pub fn grid(&self) -> &SharedGrid {
		&self.grid
	}

	pub fn scoreboard(&self) -> &Arc<Scoreboard> {
		&self.scoreboard
	}

	pub fn participant(&self, player: PlayerId) -> Option<&ParticipantHandle> {
		self.participants.get(player.0)
	}

	pub fn humans(&self) -> impl Iterator<Item = &ParticipantHandle> {
		self.participants.iter().filter(|p| p.is_human())
	}

	pub fn terminate(&self) {
		self.trigger.trigger();
	}

	pub fn is_terminated(&self) -> bool {
		self.trigger.is_triggered()
	}

	pub fn snapshot(&self) -> GridSnapshot {
		lock_grid(&self.grid).snapshot()
	}

	/// Slots of some valid combination currently on the grid.
	pub fn hint(&self) -> Option<Vec<usize>> {
		let grid = lock_grid(&self.grid);
		let found = self.oracle.find_combinations(&grid.cards(), 1);
		found
			.into_iter()
			.next()
			.map(|cards| cards.iter().filter_map(|&card| grid.slot_of(card)).collect())
	}
}
