//! Deferred work on an injectable clock.
//!
//! The scripted opponent's "thinking" delays are tasks in a `Scheduler`;
//! the resolver pops whatever is due each time it is polled. With a
//! `ManualClock` this is fully deterministic.

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::Scheduler;
