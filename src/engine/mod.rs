mod dealer;
mod runner;

pub use dealer::Dealer;
pub use runner::{GameHandle, GameRunner, GameSummary};
