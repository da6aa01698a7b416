//! Pure derivation of a client's view from a document snapshot.
//!
//! Nothing here looks at previously cached state: the view is a function of
//! `(document, role)` alone. A reloaded client rebuilds everything from one
//! snapshot, and applying the same snapshot twice gives the same view.

use crate::core::{Ledger, Placement, SideMap};
use crate::rules::{Match, MatchParts, Mode, Phase};

use super::document::{RoomDocument, RoomStatus};
use super::room::Role;

/// One client's reading of the shared document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalView {
    pub role: Role,
    pub status: RoomStatus,
    pub round: u64,
    pub has_guest: bool,
    pub my_name: String,
    pub opponent_name: String,
    pub my_placement: Placement,
    pub opponent_placement: Placement,
    pub my_ledger: Ledger,
    pub opponent_ledger: Ledger,
    /// Role the document attributes the turn to.
    pub turn: Role,
    /// Written winner, or the side whose ledger reached 4 hits.
    pub winner: Option<Role>,
    /// This client must write `winner`/`finished`: its own ledger crossed
    /// 4 hits and nobody has recorded it yet.
    pub must_write_winner: bool,
    /// This client must move the room to `playing` (host only).
    pub must_start: bool,
    /// A new round started and our half still holds the previous one.
    pub must_clear_half: bool,
}

impl LocalView {
    /// Derive the view of `role` from a snapshot.
    #[must_use]
    pub fn derive(doc: &RoomDocument, role: Role) -> Self {
        let winner = derived_winner(doc);
        let mine = doc.moves(role);

        let must_write_winner = doc.status == RoomStatus::Playing
            && doc.winner.is_none()
            && winner == Some(role)
            && mine.has_won();

        let ready = |seat: Role| {
            doc.placed_round(seat) == doc.round
                && doc.bottles(seat).is_complete()
                && doc.moves(seat).is_empty()
        };
        let must_start = role == Role::Host
            && doc.status == RoomStatus::Setup
            && doc.guest.is_some()
            && ready(Role::Host)
            && ready(Role::Guest);

        let must_clear_half = doc.status == RoomStatus::Setup
            && doc.placed_round(role) < doc.round
            && !(doc.bottles(role).is_empty() && mine.is_empty());

        Self {
            role,
            status: doc.status,
            round: doc.round,
            has_guest: doc.guest.is_some(),
            my_name: doc.name(role).to_string(),
            opponent_name: doc.name(role.other()).to_string(),
            my_placement: doc.bottles(role).clone(),
            opponent_placement: doc.bottles(role.other()).clone(),
            my_ledger: mine.clone(),
            opponent_ledger: doc.moves(role.other()).clone(),
            turn: doc.turn,
            winner,
            must_write_winner,
            must_start,
            must_clear_half,
        }
    }

    #[must_use]
    pub fn is_my_turn(&self) -> bool {
        self.status == RoomStatus::Playing && self.winner.is_none() && self.turn == self.role
    }

    /// Local phase implied by the document.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.status {
            RoomStatus::Waiting => Phase::Naming,
            RoomStatus::Setup => Phase::Placing(self.role.side()),
            RoomStatus::Playing if self.winner.is_some() => Phase::Finished,
            RoomStatus::Playing => Phase::Guessing,
            RoomStatus::Finished => Phase::Finished,
            RoomStatus::Abandoned => Phase::Menu,
        }
    }

    /// Match contents in absolute sides (host = A).
    #[must_use]
    pub fn to_parts(&self) -> MatchParts {
        let me = self.role.side();
        let mut parts = MatchParts::default();

        parts.names[me] = self.my_name.clone();
        parts.names[me.other()] = self.opponent_name.clone();
        parts.placements[me] = self.my_placement.clone();
        parts.placements[me.other()] = self.opponent_placement.clone();
        parts.ledgers[me] = self.my_ledger.clone();
        parts.ledgers[me.other()] = self.opponent_ledger.clone();
        parts.locked = SideMap::new(|side| parts.placements[side].is_complete());
        parts.turn = Some(self.turn.side());
        parts.winner = self.winner.map(Role::side);
        parts.phase = Some(self.phase());
        parts
    }

    /// Rebuild the local match.
    #[must_use]
    pub fn to_match(&self) -> Match {
        Match::from_parts(Mode::Remote, self.to_parts())
    }
}

/// Written winner first; otherwise a ledger at 4 hits while guessing.
///
/// Under the turn rule only one ledger can cross 4 hits. If a snapshot
/// somehow shows both, the host's ledger is checked first so every client
/// derives the same answer.
fn derived_winner(doc: &RoomDocument) -> Option<Role> {
    if doc.winner.is_some() {
        return doc.winner;
    }
    if !matches!(doc.status, RoomStatus::Playing | RoomStatus::Finished) {
        return None;
    }
    [Role::Host, Role::Guest]
        .into_iter()
        .find(|&role| doc.moves(role).has_won())
}
