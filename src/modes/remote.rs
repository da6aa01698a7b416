//! One seat of a remote match.
//!
//! All rules run inside `RemoteClient`; this adapter maps the generic
//! resolver calls onto the client's seat.

use crate::core::{Coord, PlacementChange, Side};
use crate::error::{MatchError, SessionError, SyncError};
use crate::rules::{GuessReport, Match, MatchEvent, Mode};
use crate::sync::{DocumentStore, RemoteClient, RoomStatus};

use super::resolver::ModeResolver;

pub struct RemoteResolver<S: DocumentStore> {
    client: RemoteClient<S>,
}

impl<S: DocumentStore> RemoteResolver<S> {
    #[must_use]
    pub fn new(client: RemoteClient<S>) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &RemoteClient<S> {
        &self.client
    }

}

impl<S: DocumentStore> ModeResolver for RemoteResolver<S> {
    fn mode(&self) -> Mode {
        Mode::Remote
    }

    fn game(&self) -> &Match {
        self.client.game()
    }

    fn acting_side(&self) -> Option<Side> {
        let view = self.client.view()?;
        let placing = view.status == RoomStatus::Setup && !self.client.is_submitted();
        (placing || view.is_my_turn()).then(|| view.role.side())
    }

    /// Only our own seat's name can be written.
    fn set_name(&mut self, side: Side, name: &str) -> Result<(), SessionError> {
        if side != self.client.role().side() {
            return Err(MatchError::WrongPhase {
                action: "rename the opponent",
                phase: self.client.game().phase(),
            }
            .into());
        }
        self.client.set_name(name)
    }

    /// Room status drives the phase; nothing to confirm locally.
    fn confirm_names(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn toggle_cell(&mut self, cell: Coord) -> Result<PlacementChange, SessionError> {
        self.client.toggle_cell(cell)
    }

    fn finish_placement(&mut self) -> Result<(), SessionError> {
        self.client.submit_placement()
    }

    fn guess(&mut self, cell: Coord) -> Result<GuessReport, SessionError> {
        self.client.guess(cell)
    }

    fn rematch(&mut self) -> Result<(), SessionError> {
        self.client.request_rematch()
    }

    fn leave(&mut self) -> Result<(), SessionError> {
        self.client.leave()
    }

    fn poll(&mut self) -> Vec<SyncError> {
        self.client.pump()
    }

    fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.client.drain_events()
    }
}
