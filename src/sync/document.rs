//! The shared room document.
//!
//! There is no arbiter: both clients write one record. Safety comes from
//! write partitioning. Each field has exactly one kind of writer:
//!
//! | field                        | written by                            |
//! |------------------------------|---------------------------------------|
//! | `host`, `created`            | creator, once                         |
//! | `guest`                      | joiner, once                          |
//! | `hostName` / `guestName`     | that side                             |
//! | `hostBottles` / `guestBottles` | that side                           |
//! | `hostMoves` / `guestMoves`   | that side, append-only within a round |
//! | `turn`                       | the side that just moved              |
//! | `winner`                     | the winning side                      |
//! | `status`, `round`            | either side, per protocol rules       |
//! | `hostRound` / `guestRound`   | stamped on that side's bottles write  |
//!
//! A `DocumentPatch` carries its author, and per-side writes always land in
//! the author's half, so a client cannot express a write into the other
//! half at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Ledger, Placement};
use crate::error::SyncError;

use super::room::{Identity, Role};

/// Room lifecycle as recorded in the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Created, no guest yet.
    Waiting,
    /// Both sides placing.
    Setup,
    /// Both placements complete; guessing.
    Playing,
    /// A winner is set.
    Finished,
    /// One side left.
    Abandoned,
}

/// Strongly typed room record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDocument {
    pub host: Identity,
    pub guest: Option<Identity>,
    pub host_name: String,
    pub guest_name: String,
    pub status: RoomStatus,
    pub turn: Role,
    pub host_bottles: Placement,
    pub guest_bottles: Placement,
    pub host_moves: Ledger,
    pub guest_moves: Ledger,
    pub winner: Option<Role>,
    pub created: DateTime<Utc>,
    /// Rematch counter. Monotonic; a bump means "new round, clear your half".
    #[serde(default)]
    pub round: u64,
    /// Round in which the host last wrote its bottles.
    #[serde(default)]
    pub host_round: u64,
    #[serde(default)]
    pub guest_round: u64,
}

impl RoomDocument {
    /// Fresh document for a newly created room.
    #[must_use]
    pub fn new(host: Identity, host_name: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            host,
            guest: None,
            host_name: host_name.into(),
            guest_name: String::new(),
            status: RoomStatus::Waiting,
            turn: Role::Host,
            host_bottles: Placement::new(),
            guest_bottles: Placement::new(),
            host_moves: Ledger::new(),
            guest_moves: Ledger::new(),
            winner: None,
            created,
            round: 0,
            host_round: 0,
            guest_round: 0,
        }
    }

    #[must_use]
    pub fn name(&self, role: Role) -> &str {
        match role {
            Role::Host => &self.host_name,
            Role::Guest => &self.guest_name,
        }
    }

    #[must_use]
    pub fn bottles(&self, role: Role) -> &Placement {
        match role {
            Role::Host => &self.host_bottles,
            Role::Guest => &self.guest_bottles,
        }
    }

    /// Round stamp of `role`'s bottles. Behind `round` means the half
    /// still holds a previous round.
    #[must_use]
    pub fn placed_round(&self, role: Role) -> u64 {
        match role {
            Role::Host => self.host_round,
            Role::Guest => self.guest_round,
        }
    }

    #[must_use]
    pub fn moves(&self, role: Role) -> &Ledger {
        match role {
            Role::Host => &self.host_moves,
            Role::Guest => &self.guest_moves,
        }
    }

    /// Apply a patch atomically: either every write lands or none does.
    pub fn apply(&mut self, patch: &DocumentPatch) -> Result<(), SyncError> {
        let new_round = patch
            .writes
            .iter()
            .any(|w| matches!(w, FieldWrite::Round(r) if *r > self.round));
        for write in &patch.writes {
            self.check(patch.author, write, new_round)?;
        }

        let author = patch.author;
        for write in &patch.writes {
            match write {
                FieldWrite::Guest(identity) => self.guest = Some(identity.clone()),
                FieldWrite::Name(name) => match author {
                    Role::Host => self.host_name = name.clone(),
                    Role::Guest => self.guest_name = name.clone(),
                },
                FieldWrite::Bottles(placement) => match author {
                    Role::Host => {
                        self.host_bottles = placement.clone();
                        self.host_round = self.round;
                    }
                    Role::Guest => {
                        self.guest_bottles = placement.clone();
                        self.guest_round = self.round;
                    }
                },
                FieldWrite::Moves(ledger) => match author {
                    Role::Host => self.host_moves = ledger.clone(),
                    Role::Guest => self.guest_moves = ledger.clone(),
                },
                FieldWrite::Turn(role) => self.turn = *role,
                FieldWrite::Winner(winner) => self.winner = *winner,
                FieldWrite::Status(status) => self.status = *status,
                FieldWrite::Round(round) => self.round = *round,
            }
        }
        Ok(())
    }

    fn check(&self, author: Role, write: &FieldWrite, new_round: bool) -> Result<(), SyncError> {
        let violation = |field| Err(SyncError::Ownership { role: author, field });

        match write {
            FieldWrite::Guest(identity) => {
                if author != Role::Guest {
                    return violation("guest");
                }
                if self.guest.as_ref().is_some_and(|g| g != identity) {
                    return violation("guest");
                }
            }
            FieldWrite::Bottles(placement) if !placement.is_well_formed() => {
                return violation(bottles_field(author));
            }
            FieldWrite::Moves(ledger) => {
                // Entries may only be dropped by clearing the whole ledger,
                // during setup or in the patch that starts a new round.
                let grows = self.moves(author).is_prefix_of(ledger);
                let clears =
                    ledger.is_empty() && (new_round || self.status == RoomStatus::Setup);
                if !grows && !clears {
                    return violation(moves_field(author));
                }
            }
            FieldWrite::Winner(Some(winner)) if *winner != author => {
                return violation("winner");
            }
            FieldWrite::Round(round) if *round < self.round => {
                return violation("round");
            }
            _ => {}
        }
        Ok(())
    }
}

fn bottles_field(role: Role) -> &'static str {
    match role {
        Role::Host => "hostBottles",
        Role::Guest => "guestBottles",
    }
}

fn moves_field(role: Role) -> &'static str {
    match role {
        Role::Host => "hostMoves",
        Role::Guest => "guestMoves",
    }
}

/// One field-level write. Per-side variants target the author's half.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldWrite {
    Guest(Identity),
    Name(String),
    Bottles(Placement),
    Moves(Ledger),
    Turn(Role),
    Winner(Option<Role>),
    Status(RoomStatus),
    Round(u64),
}

/// A batch of writes by one role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub author: Role,
    pub writes: Vec<FieldWrite>,
}

impl DocumentPatch {
    #[must_use]
    pub fn new(author: Role) -> Self {
        Self {
            author,
            writes: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    #[must_use]
    pub fn guest(mut self, identity: Identity) -> Self {
        self.writes.push(FieldWrite::Guest(identity));
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.writes.push(FieldWrite::Name(name.into()));
        self
    }

    #[must_use]
    pub fn bottles(mut self, placement: Placement) -> Self {
        self.writes.push(FieldWrite::Bottles(placement));
        self
    }

    #[must_use]
    pub fn moves(mut self, ledger: Ledger) -> Self {
        self.writes.push(FieldWrite::Moves(ledger));
        self
    }

    #[must_use]
    pub fn turn(mut self, role: Role) -> Self {
        self.writes.push(FieldWrite::Turn(role));
        self
    }

    #[must_use]
    pub fn winner(mut self, winner: Option<Role>) -> Self {
        self.writes.push(FieldWrite::Winner(winner));
        self
    }

    #[must_use]
    pub fn status(mut self, status: RoomStatus) -> Self {
        self.writes.push(FieldWrite::Status(status));
        self
    }

    #[must_use]
    pub fn round(mut self, round: u64) -> Self {
        self.writes.push(FieldWrite::Round(round));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Coord, Outcome};

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn doc() -> RoomDocument {
        RoomDocument::new(
            Identity::new("h"),
            "Hana",
            DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        )
    }

    #[test]
    fn test_per_side_writes_land_in_author_half() {
        let mut d = doc();
        let placement = Placement::from_cells(["A1", "B2"].map(c)).unwrap();
        d.apply(&DocumentPatch::new(Role::Guest).name("Gus").bottles(placement.clone()))
            .unwrap();

        assert_eq!(d.guest_name, "Gus");
        assert_eq!(d.guest_bottles, placement);
        assert_eq!(d.host_name, "Hana");
        assert!(d.host_bottles.is_empty());
    }

    #[test]
    fn test_winner_only_by_winner() {
        let mut d = doc();
        let err = d
            .apply(&DocumentPatch::new(Role::Host).winner(Some(Role::Guest)))
            .unwrap_err();
        assert!(matches!(err, SyncError::Ownership { field: "winner", .. }));
        assert!(d.winner.is_none());
    }

    #[test]
    fn test_guest_identity_written_once() {
        let mut d = doc();
        d.apply(&DocumentPatch::new(Role::Guest).guest(Identity::new("g1")))
            .unwrap();
        assert!(d
            .apply(&DocumentPatch::new(Role::Guest).guest(Identity::new("g2")))
            .is_err());
        assert!(d
            .apply(&DocumentPatch::new(Role::Host).guest(Identity::new("g1")))
            .is_err());
        assert_eq!(d.guest, Some(Identity::new("g1")));
    }

    #[test]
    fn test_moves_are_append_only_within_round() {
        let mut d = doc();
        let mut ledger = Ledger::new();
        ledger.record(c("A1"), Outcome::Hit).unwrap();
        d.apply(&DocumentPatch::new(Role::Host).moves(ledger)).unwrap();

        let mut rewritten = Ledger::new();
        rewritten.record(c("A1"), Outcome::Miss).unwrap();
        assert!(d.apply(&DocumentPatch::new(Role::Host).moves(rewritten)).is_err());
        assert_eq!(d.host_moves.len(), 1);
    }

    #[test]
    fn test_ledger_wipe_refused_mid_round() {
        let mut d = doc();
        let mut ledger = Ledger::new();
        ledger.record(c("A1"), Outcome::Hit).unwrap();
        d.apply(
            &DocumentPatch::new(Role::Host)
                .status(RoomStatus::Playing)
                .moves(ledger),
        )
        .unwrap();

        let err = d
            .apply(&DocumentPatch::new(Role::Host).moves(Ledger::new()))
            .unwrap_err();
        assert!(matches!(err, SyncError::Ownership { field: "hostMoves", .. }));
        assert_eq!(d.host_moves.len(), 1);

        // A status change in the same patch does not count as a new round.
        assert!(d
            .apply(
                &DocumentPatch::new(Role::Host)
                    .status(RoomStatus::Setup)
                    .moves(Ledger::new())
            )
            .is_err());
        assert_eq!(d.status, RoomStatus::Playing);
    }

    #[test]
    fn test_ledger_cleared_by_new_round_or_during_setup() {
        let mut d = doc();
        let mut ledger = Ledger::new();
        ledger.record(c("A1"), Outcome::Hit).unwrap();
        d.apply(
            &DocumentPatch::new(Role::Host)
                .status(RoomStatus::Finished)
                .moves(ledger.clone()),
        )
        .unwrap();

        d.apply(
            &DocumentPatch::new(Role::Host)
                .round(1)
                .status(RoomStatus::Setup)
                .moves(Ledger::new()),
        )
        .unwrap();
        assert!(d.host_moves.is_empty());

        d.apply(&DocumentPatch::new(Role::Guest).moves(ledger)).unwrap();
        d.apply(&DocumentPatch::new(Role::Guest).moves(Ledger::new()))
            .unwrap();
        assert!(d.guest_moves.is_empty());
    }

    #[test]
    fn test_bottles_are_stamped_with_round() {
        let mut d = doc();
        d.apply(&DocumentPatch::new(Role::Guest).round(2).bottles(Placement::new()))
            .unwrap();
        assert_eq!(d.placed_round(Role::Guest), 2);
        assert_eq!(d.placed_round(Role::Host), 0);
        assert!(d.apply(&DocumentPatch::new(Role::Host).round(1)).is_err());
    }

    #[test]
    fn test_patch_is_atomic() {
        let mut d = doc();
        let patch = DocumentPatch::new(Role::Host)
            .status(RoomStatus::Playing)
            .winner(Some(Role::Guest));
        assert!(d.apply(&patch).is_err());
        assert_eq!(d.status, RoomStatus::Waiting);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(doc()).unwrap();
        for key in [
            "host", "guest", "hostName", "guestName", "status", "turn", "hostBottles",
            "guestBottles", "hostMoves", "guestMoves", "winner", "created",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["status"], "waiting");
        assert_eq!(json["turn"], "host");
    }

    #[test]
    fn test_bincode_round_trip_with_moves() {
        let mut d = doc();
        let mut ledger = Ledger::new();
        ledger.record(c("C4"), Outcome::Miss).unwrap();
        d.apply(&DocumentPatch::new(Role::Host).moves(ledger)).unwrap();

        let bytes = bincode::serialize(&d).unwrap();
        let back: RoomDocument = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, d);
    }
}
