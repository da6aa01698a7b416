//! Mode resolvers.
//!
//! Each mode answers two questions on top of the shared `Match`: whose
//! input is a click, and what happens between clicks.
//!
//! - `ScriptedResolver`: the human is side A; side B is a `TargetStrategy`
//!   driven by scheduled tasks on an injectable clock.
//! - `HotseatResolver`: both sides on one device, clicks go to the side the
//!   phase or turn names.
//! - `RemoteResolver`: one seat of a `RemoteClient`; the other seat lives
//!   in another process.

pub mod resolver;
pub mod scripted;
pub mod hotseat;
pub mod remote;

pub use resolver::ModeResolver;
pub use scripted::ScriptedResolver;
pub use hotseat::HotseatResolver;
pub use remote::RemoteResolver;
