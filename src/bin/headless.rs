use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::LevelFilter;

use set_arena::config::{load_config, load_config_auto, GameConfig};
use set_arena::defaults;
use set_arena::display::EventSink;
use set_arena::engine::GameRunner;
use set_arena::events::GameEvent;
use set_arena::logging;
use set_arena::oracle::SetOracle;

#[derive(Parser)]
#[command(name = "set-headless")]
#[command(about = "Run a game of computer players with no display")]
struct Cli {
	/// Game config file. Falls back to game.toml in the usual places, then
	/// the bundled defaults.
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Number of computer players
	#[arg(short, long)]
	players: Option<usize>,

	#[arg(short, long, env = "SET_SEED")]
	seed: Option<u64>,

	#[arg(long)]
	turn_millis: Option<u64>,

	/// Print every game event as a JSON line
	#[arg(long)]
	json: bool,

	#[arg(long, default_value = "warn")]
	log_level: LevelFilter,
}

fn load(cli: &Cli) -> GameConfig {
	let loaded = match &cli.config {
		Some(path) => load_config(path),
		None => {
			for path in defaults::ensure_config() {
				log::info!("installed default config {}", path.display());
			}
			load_config_auto()
		}
	};

	let mut config = match loaded {
		Ok(config) => config,
		Err(e) => {
			if cli.config.is_some() {
				eprintln!("{}", e);
				std::process::exit(1);
			}
			defaults::bundled_config()
		}
	};

	config.computer_players += config.human_players;
	config.human_players = 0;
	if let Some(players) = cli.players {
		config.computer_players = players;
	}
	if let Some(seed) = cli.seed {
		config.seed = Some(seed);
	}
	if let Some(turn) = cli.turn_millis {
		config.turn_timeout_millis = turn;
		config.turn_timeout_warning_millis = config.turn_timeout_warning_millis.min(turn);
	}
	config
}

fn print_event(event: &GameEvent) {
	match event {
		GameEvent::ScoreChanged { player, score } => println!("[SCORE] {} -> {}", player, score),
		GameEvent::Freeze { player, remaining_ms } if *remaining_ms > 0 => {
			println!("[FREEZE] {} {}ms", player, remaining_ms)
		}
		GameEvent::Winners { players } => {
			let names: Vec<String> = players.iter().map(|p| p.to_string()).collect();
			println!("[WINNERS] {}", names.join(", "));
		}
		_ => {}
	}
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init(cli.log_level);

	let config = load(&cli);
	let oracle = Arc::new(SetOracle::new(config.feature_size, config.feature_count));
	let (sink, mut events) = EventSink::new();

	let (runner, handle) = match GameRunner::new(config, oracle, Arc::new(sink)) {
		Ok(pair) => pair,
		Err(e) => {
			eprintln!("{}", e);
			std::process::exit(1);
		}
	};

	let json = cli.json;
	let printer = tokio::spawn(async move {
		while let Some(event) = events.recv().await {
			if json {
				match serde_json::to_string(&event) {
					Ok(line) => println!("{}", line),
					Err(e) => eprintln!("{}", e),
				}
			} else {
				print_event(&event);
			}
		}
	});

	let summary = runner.run().await;
	drop(handle);
	let _ = printer.await;

	if !json {
		println!("\n=== Final scores ===");
		for ((name, score), tally) in summary.names.iter().zip(&summary.scores).zip(&summary.tallies) {
			println!(
				"  {}: {} ({} submitted, {} rejected, {} superseded)",
				name, score, tally.submitted, tally.rejected, tally.superseded
			);
		}
	}
}
