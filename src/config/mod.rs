use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::events::PlayerId;

/// Refresh period for countdown and freeze displays.
pub const DISPLAY_TICK: Duration = Duration::from_millis(950);

/// Countdown refresh period inside the warning window.
pub const URGENT_TICK: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Failed to read {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse game config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("Config file '{filename}' not found. Searched: {searched}")]
	NotFound { filename: String, searched: String },

	#[error("Invalid game config: {0}")]
	Invalid(String),
}

fn config_paths(filename: &str) -> Vec<PathBuf> {
	let mut paths = Vec::new();

	if let Some(home) = std::env::var_os("HOME") {
		let user_config = PathBuf::from(home).join(".config/set-arena").join(filename);
		paths.push(user_config);
	}

	paths.push(PathBuf::from("config").join(filename));

	paths
}

fn find_config(filename: &str) -> Option<PathBuf> {
	config_paths(filename).into_iter().find(|p| p.exists())
}

pub fn resolve_config(filename: &str) -> Result<PathBuf, ConfigError> {
	find_config(filename).ok_or_else(|| {
		let searched: Vec<_> = config_paths(filename)
			.iter()
			.map(|p| p.display().to_string())
			.collect();
		ConfigError::NotFound {
			filename: filename.to_string(),
			searched: searched.join(", "),
		}
	})
}

/// Everything the game reads at startup. Fixed for the life of a game.
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
	#[serde(default = "default_rows")]
	pub rows: usize,
	#[serde(default = "default_columns")]
	pub columns: usize,

	/// Cards per combination (K). Also the number of values each feature takes.
	#[serde(default = "default_feature_size")]
	pub feature_size: usize,
	#[serde(default = "default_feature_count")]
	pub feature_count: usize,
	#[serde(default = "default_deck_size")]
	pub deck_size: usize,

	#[serde(default = "default_turn_timeout")]
	pub turn_timeout_millis: u64,
	#[serde(default = "default_turn_timeout_warning")]
	pub turn_timeout_warning_millis: u64,
	#[serde(default = "default_point_freeze")]
	pub point_freeze_millis: u64,
	#[serde(default = "default_penalty_freeze")]
	pub penalty_freeze_millis: u64,

	#[serde(default = "default_human_players")]
	pub human_players: usize,
	#[serde(default = "default_computer_players")]
	pub computer_players: usize,
	#[serde(default)]
	pub player_names: Vec<String>,
	/// Delay between computer key presses; 0 presses as fast as the player
	/// drains them.
	#[serde(default)]
	pub computer_pace_millis: u64,

	#[serde(default)]
	pub seed: Option<u64>,
}

fn default_rows() -> usize { 3 }
fn default_columns() -> usize { 4 }
fn default_feature_size() -> usize { 3 }
fn default_feature_count() -> usize { 4 }
fn default_deck_size() -> usize { 81 }
fn default_turn_timeout() -> u64 { 60_000 }
fn default_turn_timeout_warning() -> u64 { 5_000 }
fn default_point_freeze() -> u64 { 1_000 }
fn default_penalty_freeze() -> u64 { 3_000 }
fn default_human_players() -> usize { 2 }
fn default_computer_players() -> usize { 2 }

impl Default for GameConfig {
	fn default() -> Self {
		Self {
			rows: default_rows(),
			columns: default_columns(),
			feature_size: default_feature_size(),
			feature_count: default_feature_count(),
			deck_size: default_deck_size(),
			turn_timeout_millis: default_turn_timeout(),
			turn_timeout_warning_millis: default_turn_timeout_warning(),
			point_freeze_millis: default_point_freeze(),
			penalty_freeze_millis: default_penalty_freeze(),
			human_players: default_human_players(),
			computer_players: default_computer_players(),
			player_names: Vec::new(),
			computer_pace_millis: 0,
			seed: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSpec {
	pub id: PlayerId,
	pub name: String,
	pub human: bool,
}

impl GameConfig {
	pub fn slot_count(&self) -> usize {
		self.rows * self.columns
	}

	pub fn player_count(&self) -> usize {
		self.human_players + self.computer_players
	}

	pub fn turn_timeout(&self) -> Duration {
		Duration::from_millis(self.turn_timeout_millis)
	}

	pub fn warning_window(&self) -> Duration {
		Duration::from_millis(self.turn_timeout_warning_millis)
	}

	pub fn point_freeze(&self) -> Duration {
		Duration::from_millis(self.point_freeze_millis)
	}

	pub fn penalty_freeze(&self) -> Duration {
		Duration::from_millis(self.penalty_freeze_millis)
	}

	pub fn computer_pace(&self) -> Duration {
		Duration::from_millis(self.computer_pace_millis)
	}

	/// Humans take the low ids, computers follow.
	pub fn participants(&self) -> Vec<ParticipantSpec> {
		(0..self.player_count())
			.map(|i| ParticipantSpec {
				id: PlayerId(i),
				name: self
					.player_names
					.get(i)
					.cloned()
					.unwrap_or_else(|| format!("Player {}", i + 1)),
				human: i < self.human_players,
			})
			.collect()
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		let invalid = |msg: String| Err(ConfigError::Invalid(msg));

		if self.feature_size == 0 {
			return invalid("feature_size must be at least 1".to_string());
		}
		if self.feature_size > self.slot_count() {
			return invalid(format!(
				"feature_size {} exceeds grid capacity {}x{}",
				self.feature_size, self.rows, self.columns
			));
		}
		if self.deck_size < self.feature_size {
			return invalid(format!(
				"deck_size {} is smaller than feature_size {}",
				self.deck_size, self.feature_size
			));
		}
		if u32::try_from(self.deck_size).is_err() {
			return invalid(format!("deck_size {} is too large", self.deck_size));
		}
		let encodable = (self.feature_size as u128).checked_pow(self.feature_count as u32);
		if encodable.is_none_or(|max| self.deck_size as u128 > max) {
			return invalid(format!(
				"deck_size {} does not fit {} features of {} values",
				self.deck_size, self.feature_count, self.feature_size
			));
		}
		if self.player_count() == 0 {
			return invalid("at least one player is required".to_string());
		}
		if self.turn_timeout_millis == 0 {
			return invalid("turn_timeout_millis must be positive".to_string());
		}
		if self.turn_timeout_warning_millis > self.turn_timeout_millis {
			return invalid("turn_timeout_warning_millis exceeds turn_timeout_millis".to_string());
		}
		Ok(())
	}
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GameConfig, ConfigError> {
	let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
		path: path.as_ref().to_path_buf(),
		source,
	})?;

	let config: GameConfig = toml::from_str(&content)?;
	config.validate()?;
	Ok(config)
}

pub fn load_config_auto() -> Result<GameConfig, ConfigError> {
	let path = resolve_config("game.toml")?;
	load_config(&path)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_classic_set() {
		let config = GameConfig::default();
		assert_eq!(config.slot_count(), 12);
		assert_eq!(config.feature_size, 3);
		assert_eq!(config.deck_size, 81);
		assert_eq!(config.player_count(), 4);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_empty_toml_uses_defaults() {
		let config: GameConfig = toml::from_str("").unwrap();
		assert_eq!(config.turn_timeout(), Duration::from_secs(60));
		assert_eq!(config.penalty_freeze(), Duration::from_secs(3));
		assert_eq!(config.seed, None);
	}

	#[test]
	fn test_partial_toml_overrides() {
		let config: GameConfig = toml::from_str(
			r#"
			rows = 2
			columns = 3
			deck_size = 27
			feature_count = 3
			human_players = 0
			computer_players = 3
			seed = 7
			"#,
		)
		.unwrap();
		assert_eq!(config.slot_count(), 6);
		assert_eq!(config.seed, Some(7));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_combination_larger_than_grid_is_rejected() {
		let config = GameConfig {
			rows: 1,
			columns: 2,
			..GameConfig::default()
		};
		assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
	}

	#[test]
	fn test_deck_must_fit_features() {
		let config = GameConfig {
			deck_size: 82,
			..GameConfig::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_deck_beyond_card_ids_is_rejected() {
		let config = GameConfig {
			feature_size: 3,
			feature_count: 30,
			deck_size: u32::MAX as usize + 1,
			..GameConfig::default()
		};
		assert!(matches!(config.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("too large")));
	}

	#[test]
	fn test_no_players_is_rejected() {
		let config = GameConfig {
			human_players: 0,
			computer_players: 0,
			..GameConfig::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_warning_longer_than_turn_is_rejected() {
		let config = GameConfig {
			turn_timeout_millis: 1_000,
			turn_timeout_warning_millis: 2_000,
			..GameConfig::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_participants_humans_first() {
		let config = GameConfig {
			human_players: 1,
			computer_players: 2,
			player_names: vec!["Ada".to_string()],
			..GameConfig::default()
		};
		let participants = config.participants();
		assert_eq!(participants.len(), 3);
		assert_eq!(participants[0], ParticipantSpec { id: PlayerId(0), name: "Ada".to_string(), human: true });
		assert!(!participants[1].human);
		assert_eq!(participants[2].name, "Player 3");
	}

	#[test]
	fn test_missing_file_reports_path() {
		let err = load_config("/nonexistent/game.toml").unwrap_err();
		assert!(err.to_string().contains("/nonexistent/game.toml"));
	}
}
