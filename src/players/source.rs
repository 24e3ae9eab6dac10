use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::sleep;

use crate::players::ParticipantHandle;
use crate::shutdown::Shutdown;

/// Something that produces key presses for a player.
#[async_trait]
pub trait ActionSource: Send {
	/// The next slot to toggle, or `None` when the source has nothing more to
	/// say.
	async fn next_slot(&mut self) -> Option<usize>;
}

/// Presses uniformly random slots forever. The player's bounded queue is what
/// paces it; `pace` only adds a delay between presses.
pub struct RandomSource {
	slot_count: usize,
	pace: Duration,
	rng: StdRng,
}

impl RandomSource {
	pub fn new(slot_count: usize, pace: Duration, seed: Option<u64>) -> Self {
		let rng = match seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => StdRng::from_os_rng(),
		};
		Self { slot_count, pace, rng }
	}
}

#[async_trait]
impl ActionSource for RandomSource {
	async fn next_slot(&mut self) -> Option<usize> {
		if self.slot_count == 0 {
			return None;
		}
		if self.pace.is_zero() {
			tokio::task::yield_now().await;
		} else {
			sleep(self.pace).await;
		}
		Some(self.rng.random_range(0..self.slot_count))
	}
}

/// Plays back a fixed list of presses, one per `delay`.
pub struct ScriptedSource {
	slots: VecDeque<usize>,
	delay: Duration,
}

impl ScriptedSource {
	pub fn new(slots: impl IntoIterator<Item = usize>) -> Self {
		Self {
			slots: slots.into_iter().collect(),
			delay: Duration::ZERO,
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}
}

#[async_trait]
impl ActionSource for ScriptedSource {
	async fn next_slot(&mut self) -> Option<usize> {
		if !self.delay.is_zero() {
			sleep(self.delay).await;
		}
		self.slots.pop_front()
	}
}

/// Feeds `source` into a player until the source runs dry, the player stops,
/// or the game shuts down.
pub async fn drive(mut source: Box<dyn ActionSource>, handle: ParticipantHandle, mut shutdown: Shutdown) {
	loop {
		let slot = tokio::select! {
			biased;
			_ = shutdown.wait() => break,
			slot = source.next_slot() => slot,
		};
		let Some(slot) = slot else {
			break;
		};
		if handle.is_closed() {
			break;
		}
		handle.press(slot);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::PlayerId;
	use crate::shutdown;
	use std::sync::Arc;
	use std::sync::atomic::AtomicBool;
	use tokio::sync::mpsc;

	#[tokio::test]
	async fn test_random_source_stays_in_range() {
		let mut source = RandomSource::new(12, Duration::ZERO, Some(7));
		for _ in 0..200 {
			let slot = source.next_slot().await.unwrap();
			assert!(slot < 12);
		}
	}

	#[tokio::test]
	async fn test_random_source_is_seeded() {
		let mut a = RandomSource::new(12, Duration::ZERO, Some(3));
		let mut b = RandomSource::new(12, Duration::ZERO, Some(3));
		for _ in 0..20 {
			assert_eq!(a.next_slot().await, b.next_slot().await);
		}
	}

	#[tokio::test]
	async fn test_scripted_source_runs_dry() {
		let mut source = ScriptedSource::new([4, 1]);
		assert_eq!(source.next_slot().await, Some(4));
		assert_eq!(source.next_slot().await, Some(1));
		assert_eq!(source.next_slot().await, None);
	}

	#[tokio::test]
	async fn test_drive_presses_into_handle() {
		let (tx, mut rx) = mpsc::channel(3);
		let handle = ParticipantHandle::new(PlayerId(0), false, tx, Arc::new(AtomicBool::new(false)));
		let (_trigger, shutdown) = shutdown::channel();

		drive(Box::new(ScriptedSource::new([2, 5, 8])), handle, shutdown).await;

		assert_eq!(rx.recv().await, Some(2));
		assert_eq!(rx.recv().await, Some(5));
		assert_eq!(rx.recv().await, Some(8));
	}

	#[tokio::test(start_paused = true)]
	async fn test_drive_stops_on_shutdown() {
		let (tx, _rx) = mpsc::channel(3);
		let handle = ParticipantHandle::new(PlayerId(0), false, tx, Arc::new(AtomicBool::new(false)));
		let (trigger, shutdown) = shutdown::channel();
		let source = RandomSource::new(12, Duration::from_millis(50), Some(1));

		let task = tokio::spawn(drive(Box::new(source), handle, shutdown));
		sleep(Duration::from_millis(500)).await;
		trigger.trigger();
		task.await.unwrap();
	}
}
