mod port;
mod source;
mod worker;

pub use port::{ParticipantHandle, Submission};
pub use source::{drive, ActionSource, RandomSource, ScriptedSource};
pub use worker::{FreezeDurations, ParticipantWorker};
