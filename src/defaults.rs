use include_dir::{include_dir, Dir};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GameConfig;

static CONFIG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/config");

const APP_DIR: &str = "set-arena";

/// Installs any bundled config file the user does not have yet under
/// `<config dir>/set-arena`. Returns the paths written.
pub fn ensure_config() -> Vec<PathBuf> {
	match dirs::config_dir() {
		Some(base) => install_missing(&CONFIG_DIR, &base.join(APP_DIR)),
		None => Vec::new(),
	}
}

fn install_missing(bundle: &Dir, dest: &Path) -> Vec<PathBuf> {
	let mut written = Vec::new();
	let mut pending = vec![bundle];

	while let Some(dir) = pending.pop() {
		pending.extend(dir.dirs());
		for file in dir.files() {
			let target = dest.join(file.path());
			if target.exists() {
				continue;
			}
			let parent_ready = target.parent().is_none_or(|p| fs::create_dir_all(p).is_ok());
			if parent_ready && fs::write(&target, file.contents()).is_ok() {
				written.push(target);
			}
		}
	}
	written
}

/// The game config compiled into the binary.
pub fn bundled_config() -> GameConfig {
	CONFIG_DIR
		.get_file("game.toml")
		.and_then(|f| f.contents_utf8())
		.and_then(|s| toml::from_str(s).ok())
		.unwrap_or_default()
}
