use std::fs::{self, File};
use std::sync::Once;

use log::{Level, LevelFilter};
use simplelog::{
	ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

static INIT: Once = Once::new();

fn today() -> String {
	chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Terminal output at `level`, plus everything down to debug in
/// `logs/set-<date>.log`. Safe to call more than once.
pub fn init(level: LevelFilter) {
	INIT.call_once(|| {
		let config = ConfigBuilder::new()
			.set_location_level(LevelFilter::Off)
			.set_thread_level(LevelFilter::Off)
			.build();

		let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
			level,
			config.clone(),
			TerminalMode::Mixed,
			ColorChoice::Auto,
		)];

		let _ = fs::create_dir_all("logs");
		if let Ok(file) = File::options()
			.create(true)
			.append(true)
			.open(format!("logs/set-{}.log", today()))
		{
			loggers.push(WriteLogger::new(LevelFilter::Debug, config, file));
		}

		let _ = CombinedLogger::init(loggers);
	});
}

pub fn log(level: Level, module: &str, log_type: &str, message: &str) {
	log::log!(target: module, level, "[{}] {}", log_type, message);
}

pub mod dealer {
	use super::{log, Level};
	use crate::events::{PlayerId, Verdict};
	use std::time::Duration;

	pub fn started(players: usize, deck: usize) {
		log(Level::Info, "dealer", "GAME", &format!("started players={} deck={}", players, deck));
	}

	pub fn round_started(round: u32, on_grid: usize, in_deck: usize) {
		log(
			Level::Info,
			"dealer",
			"ROUND",
			&format!("#{} dealt grid={} deck={}", round, on_grid, in_deck),
		);
	}

	pub fn round_collected(round: u32, returned: usize) {
		log(Level::Debug, "dealer", "ROUND", &format!("#{} collected {} cards", round, returned));
	}

	pub fn verdict(player: PlayerId, slots: &[usize], verdict: Verdict) {
		log(
			Level::Info,
			"dealer",
			"VERDICT",
			&format!("{} {:?} {}", player, slots, verdict.description()),
		);
	}

	pub fn countdown_reset(turn: Duration) {
		log(Level::Debug, "dealer", "TIMER", &format!("reset to {}ms", turn.as_millis()));
	}

	pub fn winners(players: &[PlayerId], score: u32) {
		let names: Vec<String> = players.iter().map(|p| p.to_string()).collect();
		log(Level::Info, "dealer", "GAME", &format!("winners {} with {}", names.join(","), score));
	}

	pub fn terminated(reason: &str) {
		log(Level::Info, "dealer", "GAME", &format!("ended: {}", reason));
	}
}

pub mod player {
	use super::{log, Level};
	use crate::events::{PlayerId, Verdict};
	use std::time::Duration;

	pub fn started(player: PlayerId, human: bool) {
		let kind = if human { "human" } else { "computer" };
		log(Level::Debug, "player", "START", &format!("{} ({})", player, kind));
	}

	pub fn submitted(player: PlayerId, slots: &[usize]) {
		log(Level::Debug, "player", "SUBMIT", &format!("{} {:?}", player, slots));
	}

	pub fn verdict(player: PlayerId, verdict: Verdict, score: u32) {
		log(
			Level::Debug,
			"player",
			"VERDICT",
			&format!("{} {} score={}", player, verdict.description(), score),
		);
	}

	pub fn frozen(player: PlayerId, duration: Duration) {
		log(Level::Debug, "player", "FREEZE", &format!("{} {}ms", player, duration.as_millis()));
	}

	pub fn stopped(player: PlayerId) {
		log(Level::Debug, "player", "STOP", &player.to_string());
	}
}

pub mod grid {
	use super::{log, Level};
	use crate::events::Card;

	pub fn card_placed(slot: usize, card: Card) {
		log(Level::Trace, "grid", "PLACE", &format!("{} -> slot {}", card, slot));
	}

	pub fn card_removed(slot: usize, card: Card) {
		log(Level::Trace, "grid", "REMOVE", &format!("{} <- slot {}", card, slot));
	}
}

pub mod runner {
	use super::{log, Level};
	use crate::events::PlayerId;

	pub fn participant(player: PlayerId, name: &str, human: bool) {
		let kind = if human { "human" } else { "computer" };
		log(Level::Info, "runner", "SEAT", &format!("{} {} ({})", player, name, kind));
	}

	pub fn spawned(workers: usize, sources: usize) {
		log(
			Level::Info,
			"runner",
			"SPAWN",
			&format!("{} players, {} input sources", workers, sources),
		);
	}

	pub fn task_failed(task: &str, error: &str) {
		log(Level::Error, "runner", "TASK", &format!("{} failed: {}", task, error));
	}

	pub fn finished(scores: &[u32]) {
		log(Level::Info, "runner", "DONE", &format!("final scores {:?}", scores));
	}
}
