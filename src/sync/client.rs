//! Remote-mode client.
//!
//! A `RemoteClient` owns one subscription to one room and keeps a cached
//! copy of the latest snapshot. Every local action becomes a field-level
//! patch; every inbound snapshot replaces the cache and the local match is
//! re-derived from it with `LocalView`. Nothing about the match is stored
//! outside the document except the unsubmitted placement draft.
//!
//! ## Duties
//!
//! After each drained batch of snapshots, the client checks what the newest
//! document asks of its role:
//!
//! - host: both placements complete during `setup` → write `playing`.
//! - ledger owner: 4 hits and no winner recorded → write the winner.
//! - anyone: a new round started and the own half is still stamped with
//!   an older round → clear it.
//!
//! Duties are pure functions of the document, so a duplicated snapshot
//! cannot fire them twice.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{Coord, GameRng, Ledger, MatchConfig, Placement, PlacementChange};
use crate::error::{JoinError, MatchError, SessionError, SyncError};
use crate::rules::{GuessReport, Match, MatchEvent, MatchParts, Mode, Phase};

use super::document::{DocumentPatch, RoomDocument, RoomStatus};
use super::room::{Identity, Role, RoomCode};
use super::store::{DocumentStore, Snapshot};
use super::view::LocalView;

const CODE_ATTEMPTS: usize = 5;

/// Locally remembered roles, keyed by room.
///
/// Identity alone cannot tell host from guest in self-play, so a process
/// that wants to resume a room remembers which seat it held.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMemory {
    roles: FxHashMap<RoomCode, Role>,
}

impl RoleMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, code: &RoomCode, role: Role) {
        self.roles.insert(code.clone(), role);
    }

    #[must_use]
    pub fn role(&self, code: &RoomCode) -> Option<Role> {
        self.roles.get(code).copied()
    }

    pub fn forget(&mut self, code: &RoomCode) {
        self.roles.remove(code);
    }
}

/// One seat in one remote room.
pub struct RemoteClient<S: DocumentStore> {
    store: S,
    code: RoomCode,
    role: Role,
    identity: Identity,
    /// Newest snapshot. `None` once the room was deleted.
    doc: Option<RoomDocument>,
    draft: Placement,
    seen_round: u64,
    /// Set before writing `abandoned` so our own write is not read as the
    /// opponent leaving.
    leaving: bool,
    opponent_left: bool,
    deleted: bool,
    /// Delivery failures drained inside a write, handed out by the next
    /// `pump`.
    sync_errors: Vec<SyncError>,
    game: Match,
    events: Vec<MatchEvent>,
}

impl<S: DocumentStore> RemoteClient<S> {
    /// Create a room and attach as host.
    ///
    /// Codes are random; a collision is retried a few times before giving
    /// up with the store's error.
    pub fn create_room(
        mut store: S,
        identity: Identity,
        name: &str,
        rng: &mut GameRng,
        created: DateTime<Utc>,
    ) -> Result<Self, JoinError> {
        let doc = RoomDocument::new(identity.clone(), fallback_name(name, Role::Host), created);

        let mut last_err = None;
        for _ in 0..CODE_ATTEMPTS {
            let code = RoomCode::generate(rng);
            match store.create(&code, &doc) {
                Ok(()) => {
                    log::info!("created room {code}");
                    store.subscribe(&code)?;
                    return Ok(Self::attach(store, code, Role::Host, identity, doc));
                }
                Err(SyncError::RoomExists(taken)) => {
                    log::debug!("room code {taken} taken, retrying");
                    last_err = Some(SyncError::RoomExists(taken));
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(last_err
            .unwrap_or_else(|| SyncError::Unavailable("no room code generated".to_string()))
            .into())
    }

    /// Attach to an existing room as guest.
    ///
    /// Re-joining with the identity already recorded as guest resumes the
    /// seat without writing. The host's own identity may join its room as
    /// guest (self-play).
    pub fn join_room(
        mut store: S,
        code: &str,
        identity: Identity,
        name: &str,
    ) -> Result<Self, JoinError> {
        let code: RoomCode = code.parse()?;
        let mut doc = store
            .load(&code)?
            .ok_or_else(|| JoinError::RoomNotFound(code.clone()))?;

        if doc.status == RoomStatus::Abandoned {
            return Err(JoinError::RoomClosed(code));
        }

        match doc.guest.clone() {
            Some(guest) if guest != identity => return Err(JoinError::RoomTaken(code)),
            Some(_) => log::info!("rejoining room {code} as guest"),
            None => {
                let mut patch = DocumentPatch::new(Role::Guest)
                    .guest(identity.clone())
                    .name(fallback_name(name, Role::Guest));
                if doc.status == RoomStatus::Waiting {
                    patch = patch.status(RoomStatus::Setup);
                }
                match store.write(&code, &patch) {
                    Ok(()) => {}
                    // Another guest got there first.
                    Err(SyncError::Ownership { field: "guest", .. }) => {
                        return Err(JoinError::RoomTaken(code));
                    }
                    Err(err) => return Err(err.into()),
                }
                doc.apply(&patch)?;
                log::info!("joined room {code}");
            }
        }

        store.subscribe(&code)?;
        Ok(Self::attach(store, code, Role::Guest, identity, doc))
    }

    /// Reattach to a room this process already sat in.
    ///
    /// A remembered role wins. Without one, the role is inferred from
    /// identity, which fails when the identity holds both seats.
    pub fn resume(
        mut store: S,
        code: &RoomCode,
        identity: Identity,
        memory: &RoleMemory,
    ) -> Result<Self, JoinError> {
        let doc = store
            .load(code)?
            .ok_or_else(|| JoinError::RoomNotFound(code.clone()))?;

        let is_host = doc.host == identity;
        let is_guest = doc.guest.as_ref() == Some(&identity);
        let role = match (memory.role(code), is_host, is_guest) {
            (Some(Role::Host), true, _) => Role::Host,
            (Some(Role::Guest), _, true) => Role::Guest,
            (Some(_), _, _) => return Err(JoinError::NotParticipant(code.clone())),
            (None, true, true) => return Err(JoinError::AmbiguousRole(code.clone())),
            (None, true, false) => Role::Host,
            (None, false, true) => Role::Guest,
            (None, false, false) => return Err(JoinError::NotParticipant(code.clone())),
        };
        if doc.status == RoomStatus::Abandoned {
            return Err(JoinError::RoomClosed(code.clone()));
        }

        log::info!("resuming room {code} as {role}");
        store.subscribe(code)?;
        Ok(Self::attach(store, code.clone(), role, identity, doc))
    }

    fn attach(store: S, code: RoomCode, role: Role, identity: Identity, doc: RoomDocument) -> Self {
        let mut client = Self {
            store,
            code,
            role,
            identity,
            doc: None,
            draft: Placement::new(),
            seen_round: doc.round,
            leaving: false,
            opponent_left: false,
            deleted: false,
            sync_errors: Vec::new(),
            game: Match::from_parts(Mode::Remote, MatchParts::default()),
            events: Vec::new(),
        };
        client.apply_snapshot(Some(doc));
        client
    }

    // === Accessors ===

    #[must_use]
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Newest cached snapshot.
    #[must_use]
    pub fn document(&self) -> Option<&RoomDocument> {
        self.doc.as_ref()
    }

    #[must_use]
    pub fn view(&self) -> Option<LocalView> {
        self.doc.as_ref().map(|doc| LocalView::derive(doc, self.role))
    }

    /// Local match, rebuilt from the newest snapshot.
    #[must_use]
    pub fn game(&self) -> &Match {
        &self.game
    }

    /// Unsubmitted placement.
    #[must_use]
    pub fn draft(&self) -> &Placement {
        &self.draft
    }

    /// Own placement already written to the document.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.doc
            .as_ref()
            .is_some_and(|doc| doc.bottles(self.role).is_complete())
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn remember_role(&self, memory: &mut RoleMemory) {
        memory.remember(&self.code, self.role);
    }

    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    // === Actions ===

    fn current(&self) -> Result<&RoomDocument, SyncError> {
        self.doc
            .as_ref()
            .ok_or_else(|| SyncError::DocumentDeleted(self.code.clone()))
    }

    fn wrong_phase(&self, action: &'static str) -> SessionError {
        MatchError::WrongPhase {
            action,
            phase: self.game.phase(),
        }
        .into()
    }

    /// Write a new display name for our seat. Blank names are ignored.
    pub fn set_name(&mut self, name: &str) -> Result<(), SessionError> {
        self.current()?;
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.write(DocumentPatch::new(self.role).name(name))
    }

    /// Toggle a cell of the local draft. Nothing is written until
    /// `submit_placement`.
    pub fn toggle_cell(&mut self, cell: Coord) -> Result<PlacementChange, SessionError> {
        let status = self.current()?.status;
        if status != RoomStatus::Setup || self.is_submitted() {
            return Err(self.wrong_phase("place"));
        }
        let change = self.draft.toggle(cell)?;
        self.events.push(MatchEvent::Placed {
            side: self.role.side(),
            change,
        });
        self.refresh();
        Ok(change)
    }

    /// Write the draft as our bottles.
    pub fn submit_placement(&mut self) -> Result<(), SessionError> {
        let status = self.current()?.status;
        if status != RoomStatus::Setup || self.is_submitted() {
            return Err(self.wrong_phase("confirm placement"));
        }
        self.draft.validate_complete()?;
        log::info!("{} submitted placement in room {}", self.role, self.code);
        self.write(DocumentPatch::new(self.role).bottles(self.draft.clone()))
    }

    /// Guess a cell of the opponent's board.
    ///
    /// Only accepted while the document attributes the turn to our role.
    /// The rules run on the derived match; what gets written is our grown
    /// ledger plus the turn pass or the win.
    pub fn guess(&mut self, cell: Coord) -> Result<GuessReport, SessionError> {
        let doc = self.current()?;
        let mut game = LocalView::derive(doc, self.role).to_match();
        let me = self.role.side();
        let report = game.guess(me, cell)?;

        let mut patch = DocumentPatch::new(self.role).moves(game.ledger(me).clone());
        if report.winner == Some(me) {
            patch = patch.winner(Some(self.role)).status(RoomStatus::Finished);
        } else if report.next_turn != me {
            patch = patch.turn(self.role.other());
        }
        self.write(patch)?;
        Ok(report)
    }

    /// Start a new round after a finished one.
    ///
    /// Bumps `round`, so a request pair from both seats produces one round:
    /// both write the same next value.
    pub fn request_rematch(&mut self) -> Result<(), SessionError> {
        if !self.game.is_finished() {
            return Err(self.wrong_phase("rematch"));
        }
        let next_round = self.current()?.round + 1;
        log::info!("{} requested round {next_round} in room {}", self.role, self.code);

        let patch = DocumentPatch::new(self.role)
            .round(next_round)
            .status(RoomStatus::Setup)
            .winner(None)
            .turn(Role::Host)
            .bottles(Placement::new())
            .moves(Ledger::new());
        self.write(patch)
    }

    /// Leave the room. One-way: the room becomes `abandoned`.
    pub fn leave(&mut self) -> Result<(), SessionError> {
        if self.doc.is_none() {
            return Ok(());
        }
        self.leaving = true;
        log::info!("{} leaving room {}", self.role, self.code);
        let result = self.write(DocumentPatch::new(self.role).status(RoomStatus::Abandoned));
        if result.is_err() {
            // Still seated: a later abandoned status is the opponent's.
            self.leaving = false;
        }
        result
    }

    // === Snapshots ===

    /// Drain the subscription and process every snapshot in order.
    ///
    /// Failed deliveries are logged and returned, including those drained
    /// while writing since the last call. They change nothing, and the next
    /// good snapshot re-derives everything.
    pub fn pump(&mut self) -> Vec<SyncError> {
        let mut errors = std::mem::take(&mut self.sync_errors);
        loop {
            let batch: Vec<Snapshot> = self.store.poll();
            if batch.is_empty() {
                break;
            }
            for snapshot in batch {
                match snapshot {
                    Ok(doc) => self.apply_snapshot(doc),
                    Err(err) => {
                        log::warn!("room {}: dropped snapshot: {err}", self.code);
                        errors.push(err);
                    }
                }
            }
            self.run_duties();
        }
        errors.append(&mut self.sync_errors);
        errors
    }

    /// Replace the cache with a snapshot and re-derive the match.
    ///
    /// Applying the same snapshot twice is a no-op.
    pub fn apply_snapshot(&mut self, snapshot: Option<RoomDocument>) {
        let Some(next) = snapshot else {
            if !self.deleted {
                log::warn!("room {} was deleted", self.code);
                self.deleted = true;
                self.events.push(MatchEvent::RoomDeleted);
            }
            self.doc = None;
            self.refresh();
            return;
        };

        if self.doc.as_ref() == Some(&next) {
            return;
        }

        let prev = self.doc.take();
        self.events
            .extend(diff_events(prev.as_ref(), &next, self.role));

        let left_mid_round = next.status == RoomStatus::Setup
            && prev
                .as_ref()
                .is_some_and(|p| matches!(p.status, RoomStatus::Playing | RoomStatus::Finished));
        if next.round > self.seen_round || left_mid_round {
            self.seen_round = next.round;
            self.draft.clear();
        }

        if next.status == RoomStatus::Abandoned && !self.leaving && !self.opponent_left {
            log::info!("opponent left room {}", self.code);
            self.opponent_left = true;
            self.events.push(MatchEvent::OpponentLeft);
        }

        self.doc = Some(next);
        self.refresh();
    }

    fn run_duties(&mut self) {
        let Some(doc) = &self.doc else { return };
        let view = LocalView::derive(doc, self.role);

        let patch = if view.must_clear_half {
            log::debug!("{} clearing last round's half", self.role);
            DocumentPatch::new(self.role)
                .bottles(Placement::new())
                .moves(Ledger::new())
        } else if view.must_start {
            log::info!("both placements in, starting room {}", self.code);
            DocumentPatch::new(self.role)
                .status(RoomStatus::Playing)
                .turn(Role::Host)
        } else if view.must_write_winner {
            log::info!("{} recording own win in room {}", self.role, self.code);
            DocumentPatch::new(self.role)
                .winner(Some(self.role))
                .status(RoomStatus::Finished)
        } else {
            return;
        };

        if let Err(err) = self.write(patch) {
            log::warn!("room {}: duty write failed: {err}", self.code);
        }
    }

    /// Validate against the cache, write, then drain the echo.
    fn write(&mut self, patch: DocumentPatch) -> Result<(), SessionError> {
        let mut next = self.current()?.clone();
        next.apply(&patch)?;
        if let Err(err) = self.store.write(&self.code, &patch) {
            log::warn!("room {}: write failed: {err}", self.code);
            return Err(err.into());
        }
        let errors = self.pump();
        self.sync_errors.extend(errors);
        Ok(())
    }

    fn refresh(&mut self) {
        let Some(doc) = &self.doc else {
            self.game = Match::from_parts(
                Mode::Remote,
                MatchParts {
                    phase: Some(Phase::Menu),
                    ..MatchParts::default()
                },
            );
            return;
        };

        let view = LocalView::derive(doc, self.role);
        let mut parts = view.to_parts();
        let me = self.role.side();
        if !view.my_placement.is_complete() {
            parts.placements[me] = self.draft.clone();
            parts.locked[me] = false;
        }
        self.game = Match::from_parts(Mode::Remote, parts);
    }
}

/// Blank names fall back to the seat's default.
fn fallback_name(name: &str, role: Role) -> String {
    let name = name.trim();
    if name.is_empty() {
        MatchConfig::default().default_names[role.side().index()].clone()
    } else {
        name.to_string()
    }
}

/// Edge-triggered events between two snapshots.
///
/// The initial snapshot only announces the phase; replayed history is not
/// re-announced.
fn diff_events(prev: Option<&RoomDocument>, next: &RoomDocument, role: Role) -> Vec<MatchEvent> {
    let next_view = LocalView::derive(next, role);
    let Some(prev) = prev else {
        return vec![MatchEvent::PhaseChanged(next_view.phase())];
    };
    let prev_view = LocalView::derive(prev, role);
    let mut events = Vec::new();

    if next.round > prev.round {
        events.push(MatchEvent::RematchStarted);
    }

    for seat in [Role::Host, Role::Guest] {
        let before = prev.moves(seat);
        let after = next.moves(seat);
        if before.is_prefix_of(after) {
            events.extend(before.new_entries(after).map(|(cell, outcome)| {
                MatchEvent::Guessed {
                    side: seat.side(),
                    cell,
                    outcome,
                }
            }));
        }
    }

    if next.status == RoomStatus::Playing && next_view.winner.is_none() && prev.turn != next.turn {
        events.push(MatchEvent::TurnChanged(next.turn.side()));
    }

    if let Some(winner) = next_view.winner {
        if prev_view.winner != Some(winner) {
            events.push(MatchEvent::Won(winner.side()));
        }
    }

    if prev_view.phase() != next_view.phase() {
        events.push(MatchEvent::PhaseChanged(next_view.phase()));
    }
    events
}
