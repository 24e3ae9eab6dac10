use std::sync::Arc;

use tokio::sync::watch;

/// Raises the shared stop flag. Cloning shares the same flag.
#[derive(Clone)]
pub struct ShutdownTrigger {
	tx: Arc<watch::Sender<bool>>,
}

/// A task's view of the stop flag. Every blocking wait in the game selects on
/// [`Shutdown::wait`] so a parked task still sees the stop.
#[derive(Clone)]
pub struct Shutdown {
	rx: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
	let (tx, rx) = watch::channel(false);
	(ShutdownTrigger { tx: Arc::new(tx) }, Shutdown { rx })
}

impl ShutdownTrigger {
	pub fn trigger(&self) {
		self.tx.send_replace(true);
	}

	pub fn is_triggered(&self) -> bool {
		*self.tx.borrow()
	}

	pub fn subscribe(&self) -> Shutdown {
		Shutdown { rx: self.tx.subscribe() }
	}
}

impl Shutdown {
	pub fn is_triggered(&self) -> bool {
		*self.rx.borrow()
	}

	/// Resolves once the flag is raised or every trigger is gone.
	pub async fn wait(&mut self) {
		if *self.rx.borrow_and_update() {
			return;
		}
		while self.rx.changed().await.is_ok() {
			if *self.rx.borrow_and_update() {
				return;
			}
		}
	}
}
