use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use set_arena::config::GameConfig;
use set_arena::display::NullSink;
use set_arena::engine::{GameHandle, GameRunner, GameSummary};
use set_arena::events::{full_deck, PlayerId};
use set_arena::grid::lock_grid;
use set_arena::oracle::{accept_all, reject_all, CombinationOracle, SetOracle};

fn humans_only(count: usize) -> GameConfig {
	GameConfig {
		human_players: count,
		computer_players: 0,
		seed: Some(99),
		..GameConfig::default()
	}
}

fn start(config: GameConfig, oracle: Arc<dyn CombinationOracle>) -> (JoinHandle<GameSummary>, GameHandle) {
	let (runner, handle) = GameRunner::new(config, oracle, Arc::new(NullSink)).unwrap();
	(tokio::spawn(runner.run()), handle)
}

fn press_all(handle: &GameHandle, player: usize, slots: &[usize]) {
	let participant = handle.participant(PlayerId(player)).unwrap();
	for &slot in slots {
		assert!(participant.press(slot), "press on slot {} was dropped", slot);
	}
}

#[tokio::test(start_paused = true)]
async fn test_short_deck_game_finishes_with_top_scorers() {
	let config = GameConfig {
		human_players: 0,
		computer_players: 2,
		seed: Some(5),
		turn_timeout_millis: 1_000,
		turn_timeout_warning_millis: 200,
		point_freeze_millis: 20,
		penalty_freeze_millis: 50,
		computer_pace_millis: 5,
		..GameConfig::default()
	};
	let (runner, _handle) = GameRunner::new(config, Arc::new(accept_all(3)), Arc::new(NullSink)).unwrap();
	let summary = runner.with_deck(full_deck(9)).run().await;

	assert_eq!(summary.scores.iter().sum::<u32>(), 3);
	let best = *summary.scores.iter().max().unwrap();
	let expected: Vec<PlayerId> = (0..2).filter(|&i| summary.scores[i] == best).map(PlayerId).collect();
	assert_eq!(summary.winners, expected);

	for (score, tally) in summary.scores.iter().zip(&summary.tallies) {
		assert_eq!(*score, tally.accepted);
		assert_eq!(tally.rejected, 0);
		assert_eq!(tally.verdicts(), tally.submitted);
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_players_keep_grid_consistent() {
	let config = GameConfig {
		human_players: 0,
		computer_players: 4,
		turn_timeout_millis: 300,
		turn_timeout_warning_millis: 100,
		point_freeze_millis: 10,
		penalty_freeze_millis: 30,
		computer_pace_millis: 0,
		..GameConfig::default()
	};
	let (game, handle) = start(config, Arc::new(SetOracle::new(3, 4)));

	let grid = Arc::clone(handle.grid());
	let scoreboard = Arc::clone(handle.scoreboard());
	let watcher = tokio::spawn(async move {
		let mut checks = 0;
		let mut violations = Vec::new();
		for _ in 0..400 {
			{
				let grid = lock_grid(&grid);
				if let Err(e) = grid.check_invariants() {
					violations.push(e);
				}
				// 81 cards cover 23 accepted refills; until then the grid is
				// either between rounds or full, never halfway through a refill
				let accepted: u32 = scoreboard.scores().iter().sum();
				let cards = grid.count_cards();
				if accepted < 23 && cards != 0 && cards != grid.slot_count() {
					violations.push(format!("grid seen with {} cards", cards));
				}
				for player in 0..4 {
					if grid.tokens_of(PlayerId(player)).len() > 3 {
						violations.push(format!("P{} over capacity", player));
					}
				}
				checks += 1;
			}
			sleep(Duration::from_millis(2)).await;
		}
		(checks, violations)
	});

	let (checks, violations) = watcher.await.unwrap();
	handle.terminate();
	let summary = tokio::time::timeout(Duration::from_secs(5), game)
		.await
		.expect("game did not stop after terminate")
		.unwrap();

	assert_eq!(checks, 400);
	assert!(violations.is_empty(), "{:?}", violations);
	for (score, tally) in summary.scores.iter().zip(&summary.tallies) {
		assert_eq!(*score, tally.accepted);
		assert_eq!(tally.verdicts(), tally.submitted);
	}
}

#[tokio::test(start_paused = true)]
async fn test_accepted_set_scores_and_refills() {
	let (game, handle) = start(humans_only(2), Arc::new(accept_all(3)));
	sleep(Duration::from_millis(10)).await;

	let before = handle.snapshot();
	assert_eq!(before.card_count(), 12);

	press_all(&handle, 1, &[1]);
	sleep(Duration::from_millis(10)).await;
	press_all(&handle, 0, &[0, 1, 2]);
	sleep(Duration::from_millis(50)).await;

	assert_eq!(handle.scoreboard().score(PlayerId(0)), 1);
	let after = handle.snapshot();
	for slot in 0..3 {
		let card = after.cards[slot].expect("slot refilled");
		assert!(!before.cards.contains(&Some(card)));
	}
	assert_eq!(after.cards[3..], before.cards[3..]);
	{
		let grid = lock_grid(handle.grid());
		assert!(grid.tokens_of(PlayerId(0)).is_empty());
		assert!(grid.tokens_of(PlayerId(1)).is_empty());
	}

	// frozen for the point freeze, then playing again
	let p0 = handle.participant(PlayerId(0)).unwrap();
	assert!(p0.is_busy());
	assert!(!p0.press(4));
	sleep(Duration::from_millis(1_000)).await;
	assert!(!p0.is_busy());
	assert!(p0.press(4));

	handle.terminate();
	let summary = game.await.unwrap();
	assert_eq!(summary.winners, vec![PlayerId(0)]);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_set_freezes_and_keeps_tokens() {
	let (game, handle) = start(humans_only(2), Arc::new(reject_all(3)));
	sleep(Duration::from_millis(10)).await;
	let before = handle.snapshot();

	press_all(&handle, 0, &[0, 1, 2]);
	sleep(Duration::from_millis(50)).await;

	let tally = handle.scoreboard().tally(PlayerId(0));
	assert_eq!((tally.score, tally.rejected), (0, 1));
	assert_eq!(handle.snapshot().cards, before.cards);
	assert_eq!(lock_grid(handle.grid()).tokens_of(PlayerId(0)), &[0, 1, 2]);

	let p0 = handle.participant(PlayerId(0)).unwrap();
	assert!(!p0.press(1));
	sleep(Duration::from_millis(3_000)).await;
	assert!(p0.press(1));
	sleep(Duration::from_millis(10)).await;
	assert_eq!(lock_grid(handle.grid()).tokens_of(PlayerId(0)), &[0, 2]);

	// the other player was never affected
	assert!(handle.participant(PlayerId(1)).unwrap().press(5));

	handle.terminate();
	let summary = game.await.unwrap();
	assert_eq!(summary.scores, vec![0, 0]);
	assert_eq!(summary.winners, vec![PlayerId(0), PlayerId(1)]);
}

#[tokio::test(start_paused = true)]
async fn test_turn_timeout_clears_tokens_and_redeals() {
	let config = GameConfig {
		turn_timeout_millis: 5_000,
		turn_timeout_warning_millis: 1_000,
		..humans_only(1)
	};
	let (game, handle) = start(config, Arc::new(SetOracle::new(3, 4)));
	sleep(Duration::from_millis(10)).await;

	press_all(&handle, 0, &[5, 6]);
	sleep(Duration::from_millis(10)).await;
	assert_eq!(lock_grid(handle.grid()).tokens_of(PlayerId(0)), &[5, 6]);

	sleep(Duration::from_millis(5_000)).await;
	{
		let grid = lock_grid(handle.grid());
		assert!(grid.tokens_of(PlayerId(0)).is_empty());
		assert_eq!(grid.count_cards(), 12);
	}

	handle.terminate();
	game.await.unwrap();
}

#[tokio::test]
async fn test_terminate_stops_a_long_game_promptly() {
	let config = GameConfig {
		human_players: 1,
		computer_players: 2,
		computer_pace_millis: 5,
		..GameConfig::default()
	};
	let (game, handle) = start(config, Arc::new(SetOracle::new(3, 4)));
	sleep(Duration::from_millis(50)).await;
	handle.terminate();

	let summary = tokio::time::timeout(Duration::from_secs(2), game)
		.await
		.expect("game did not stop after terminate")
		.unwrap();
	assert_eq!(summary.scores.len(), 3);
	for id in 0..3 {
		assert!(handle.participant(PlayerId(id)).unwrap().is_closed());
	}
}
