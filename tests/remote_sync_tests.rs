//! Remote synchronization tests.
//!
//! Two `RemoteClient`s share one room of an in-process `MemoryHub`. Each
//! test drives both seats by hand and pumps their subscriptions in
//! between, so the snapshot sequence is explicit.

use bottle_duel::core::{Coord, GameRng, Ledger, Outcome, Side};
use bottle_duel::error::{JoinError, MatchError, SessionError, SyncError};
use bottle_duel::rules::{MatchEvent, Phase};
use bottle_duel::sync::{
    DocumentPatch, DocumentStore, Identity, LocalView, MemoryHub, MemoryStore, RemoteClient,
    Role, RoleMemory, RoomCode, RoomStatus,
};
use chrono::{DateTime, Utc};

type Client = RemoteClient<MemoryStore>;

const HOST_CELLS: [&str; 4] = ["A1", "A2", "A3", "A4"];
const GUEST_CELLS: [&str; 4] = ["B1", "C2", "D3", "D4"];

fn c(s: &str) -> Coord {
    s.parse().unwrap()
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(0, 0).unwrap()
}

fn create(hub: &MemoryHub, id: &str) -> Client {
    let mut rng = GameRng::new(5);
    RemoteClient::create_room(hub.connect(), Identity::new(id), "Hana", &mut rng, epoch()).unwrap()
}

fn pump(clients: &mut [&mut Client]) {
    for client in clients.iter_mut() {
        assert!(client.pump().is_empty());
    }
}

fn place(client: &mut Client, cells: [&str; 4]) {
    for cell in cells {
        client.toggle_cell(c(cell)).unwrap();
    }
    client.submit_placement().unwrap();
}

/// Host and guest in one room, both placed, guessing with the host to move.
fn playing() -> (MemoryHub, Client, Client) {
    let hub = MemoryHub::new();
    let mut host = create(&hub, "h");
    let mut guest =
        RemoteClient::join_room(hub.connect(), host.code().as_str(), Identity::new("g"), "Gus")
            .unwrap();
    pump(&mut [&mut host, &mut guest]);
    place(&mut host, HOST_CELLS);
    place(&mut guest, GUEST_CELLS);
    pump(&mut [&mut host, &mut guest]);
    pump(&mut [&mut host, &mut guest]);
    host.drain_events();
    guest.drain_events();
    (hub, host, guest)
}

fn assert_converged(host: &Client, guest: &Client) {
    let h = host.view().unwrap();
    let g = guest.view().unwrap();
    assert_eq!(h.my_placement, g.opponent_placement);
    assert_eq!(h.opponent_placement, g.my_placement);
    assert_eq!(h.my_ledger, g.opponent_ledger);
    assert_eq!(h.opponent_ledger, g.my_ledger);
    assert_eq!(h.winner, g.winner);
    for side in Side::BOTH {
        assert_eq!(host.game().ledger(side), guest.game().ledger(side));
        assert_eq!(host.game().placement(side), guest.game().placement(side));
    }
    assert_eq!(host.game().turn(), guest.game().turn());
}

fn count(events: &[MatchEvent], wanted: &MatchEvent) -> usize {
    events.iter().filter(|e| *e == wanted).count()
}

#[test]
fn test_host_starts_once_both_placed() {
    let (hub, host, guest) = playing();
    let doc = hub.peek(host.code()).unwrap().unwrap();
    assert_eq!(doc.status, RoomStatus::Playing);
    assert_eq!(doc.turn, Role::Host);
    assert_eq!(host.game().phase(), Phase::Guessing);
    assert_eq!(guest.game().phase(), Phase::Guessing);
    assert_converged(&host, &guest);
}

#[test]
fn test_guest_cannot_start_alone() {
    let hub = MemoryHub::new();
    let mut host = create(&hub, "h");
    let mut guest =
        RemoteClient::join_room(hub.connect(), host.code().as_str(), Identity::new("g"), "Gus")
            .unwrap();
    pump(&mut [&mut host, &mut guest]);
    place(&mut guest, GUEST_CELLS);
    pump(&mut [&mut host, &mut guest]);
    assert_eq!(guest.document().unwrap().status, RoomStatus::Setup);
    assert_eq!(guest.game().phase(), Phase::Placing(Side::B));
}

#[test]
fn test_turn_follows_document() {
    let (_hub, mut host, mut guest) = playing();

    assert_eq!(
        guest.guess(c("A1")),
        Err(SessionError::Match(MatchError::NotYourTurn))
    );

    host.guess(c("B1")).unwrap();
    host.guess(c("A1")).unwrap();
    pump(&mut [&mut host, &mut guest]);

    assert_eq!(guest.view().unwrap().turn, Role::Guest);
    assert!(guest.view().unwrap().is_my_turn());
    assert_eq!(
        host.guess(c("B2")),
        Err(SessionError::Match(MatchError::NotYourTurn))
    );
    assert_converged(&host, &guest);
}

#[test]
fn test_remote_win_follows_local_finish_path() {
    let (hub, mut host, mut guest) = playing();
    host.guess(c("A1")).unwrap();
    pump(&mut [&mut host, &mut guest]);

    for cell in HOST_CELLS {
        guest.guess(c(cell)).unwrap();
    }
    pump(&mut [&mut host, &mut guest]);

    let doc = hub.peek(host.code()).unwrap().unwrap();
    assert_eq!(doc.winner, Some(Role::Guest));
    assert_eq!(doc.status, RoomStatus::Finished);

    let events = host.drain_events();
    assert_eq!(count(&events, &MatchEvent::Won(Side::B)), 1);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, MatchEvent::Guessed { side: Side::B, .. }))
            .count(),
        4
    );
    assert_eq!(host.game().winner(), Some(Side::B));
    assert_eq!(host.game().phase(), Phase::Finished);
    assert_converged(&host, &guest);
}

#[test]
fn test_duplicate_snapshots_do_not_repeat_effects() {
    let (hub, mut host, mut guest) = playing();
    for cell in GUEST_CELLS {
        host.guess(c(cell)).unwrap();
    }
    pump(&mut [&mut host, &mut guest]);
    host.drain_events();
    guest.drain_events();
    let before = hub.peek(host.code()).unwrap();

    hub.redeliver(host.code());
    hub.redeliver(host.code());
    pump(&mut [&mut host, &mut guest]);

    assert!(guest.drain_events().is_empty());
    assert!(host.drain_events().is_empty());
    assert_eq!(hub.peek(host.code()).unwrap(), before);
}

#[test]
fn test_unrecorded_win_is_written_by_ledger_owner() {
    // The guest's winning ledger lands without the winner field.
    let (hub, mut host, mut guest) = playing();
    host.guess(c("A1")).unwrap();
    pump(&mut [&mut host, &mut guest]);
    let code = host.code().clone();

    let mut ledger = Ledger::new();
    for cell in HOST_CELLS {
        ledger.record(c(cell), Outcome::Hit).unwrap();
    }
    let mut raw = hub.connect();
    raw.write(&code, &DocumentPatch::new(Role::Guest).moves(ledger))
        .unwrap();

    host.pump();
    assert_eq!(hub.peek(&code).unwrap().unwrap().winner, None);
    assert_eq!(host.game().winner(), Some(Side::B));

    guest.pump();
    let doc = hub.peek(&code).unwrap().unwrap();
    assert_eq!(doc.winner, Some(Role::Guest));
    assert_eq!(doc.status, RoomStatus::Finished);
}

#[test]
fn test_both_ledgers_crossing_is_recorded_by_host_only() {
    let (hub, mut host, mut guest) = playing();
    let code = host.code().clone();
    let mut raw = hub.connect();

    let mut host_hits = Ledger::new();
    for cell in GUEST_CELLS {
        host_hits.record(c(cell), Outcome::Hit).unwrap();
    }
    let mut guest_hits = Ledger::new();
    for cell in HOST_CELLS {
        guest_hits.record(c(cell), Outcome::Hit).unwrap();
    }
    raw.write(&code, &DocumentPatch::new(Role::Host).moves(host_hits))
        .unwrap();
    raw.write(&code, &DocumentPatch::new(Role::Guest).moves(guest_hits))
        .unwrap();

    guest.pump();
    assert_eq!(hub.peek(&code).unwrap().unwrap().winner, None);
    host.pump();
    guest.pump();

    let doc = hub.peek(&code).unwrap().unwrap();
    assert_eq!(doc.winner, Some(Role::Host));
    assert_eq!(guest.game().winner(), Some(Side::A));
    assert_converged(&host, &guest);
}

#[test]
fn test_rematch_clears_both_halves_before_start() {
    let (hub, mut host, mut guest) = playing();
    for cell in GUEST_CELLS {
        host.guess(c(cell)).unwrap();
    }
    pump(&mut [&mut host, &mut guest]);
    host.drain_events();
    guest.drain_events();

    host.request_rematch().unwrap();
    place(&mut host, HOST_CELLS);
    host.pump();
    // The guest's bottles still belong to the finished round.
    assert_eq!(host.document().unwrap().status, RoomStatus::Setup);

    guest.pump();
    assert!(guest.document().unwrap().guest_bottles.is_empty());
    assert_eq!(guest.game().phase(), Phase::Placing(Side::B));
    assert_eq!(count(&guest.drain_events(), &MatchEvent::RematchStarted), 1);

    place(&mut guest, ["A1", "B2", "C3", "D4"]);
    pump(&mut [&mut host, &mut guest]);
    let doc = hub.peek(host.code()).unwrap().unwrap();
    assert_eq!(doc.status, RoomStatus::Playing);
    assert_eq!(doc.round, 1);
    assert!(doc.host_moves.is_empty() && doc.guest_moves.is_empty());
    assert_eq!(doc.winner, None);
    assert_eq!(host.game().name(Side::B), "Gus");
}

#[test]
fn test_simultaneous_rematch_requests_start_one_round() {
    let (hub, mut host, mut guest) = playing();
    for cell in GUEST_CELLS {
        host.guess(c(cell)).unwrap();
    }
    pump(&mut [&mut host, &mut guest]);

    host.request_rematch().unwrap();
    guest.request_rematch().unwrap();
    pump(&mut [&mut host, &mut guest]);

    let doc = hub.peek(host.code()).unwrap().unwrap();
    assert_eq!(doc.round, 1);
    assert_eq!(doc.status, RoomStatus::Setup);
    assert_eq!(count(&host.drain_events(), &MatchEvent::RematchStarted), 1);
    assert_eq!(count(&guest.drain_events(), &MatchEvent::RematchStarted), 1);
}

#[test]
fn test_rematch_requires_finished_round() {
    let (_hub, mut host, _guest) = playing();
    assert!(matches!(
        host.request_rematch(),
        Err(SessionError::Match(MatchError::WrongPhase { action: "rematch", .. }))
    ));
}

#[test]
fn test_leaving_notifies_only_the_opponent() {
    let (hub, mut host, mut guest) = playing();
    host.leave().unwrap();
    pump(&mut [&mut host, &mut guest]);
    hub.redeliver(host.code());
    pump(&mut [&mut host, &mut guest]);

    assert_eq!(count(&host.drain_events(), &MatchEvent::OpponentLeft), 0);
    assert_eq!(count(&guest.drain_events(), &MatchEvent::OpponentLeft), 1);
    assert_eq!(guest.game().phase(), Phase::Menu);
}

#[test]
fn test_failed_leave_still_reports_opponent_leaving() {
    let (hub, mut host, mut guest) = playing();
    hub.set_available(false);
    assert!(matches!(
        host.leave(),
        Err(SessionError::Sync(SyncError::Unavailable(_)))
    ));
    hub.set_available(true);

    guest.leave().unwrap();
    assert!(host.pump().is_empty());
    assert_eq!(count(&host.drain_events(), &MatchEvent::OpponentLeft), 1);
    assert_eq!(host.game().phase(), Phase::Menu);
}

#[test]
fn test_deleted_room_is_terminal() {
    let (hub, mut host, mut guest) = playing();
    let code = host.code().clone();
    hub.delete(&code);
    pump(&mut [&mut host, &mut guest]);

    assert!(guest.is_deleted());
    assert_eq!(count(&guest.drain_events(), &MatchEvent::RoomDeleted), 1);
    assert_eq!(guest.game().phase(), Phase::Menu);
    assert_eq!(
        guest.guess(c("A1")),
        Err(SessionError::Sync(SyncError::DocumentDeleted(code)))
    );
}

#[test]
fn test_bad_snapshot_is_reported_and_ignored() {
    let (hub, mut host, _guest) = playing();
    let before = host.view();
    hub.inject_corrupt(host.code());

    let errors = host.pump();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SyncError::Codec(_)));
    assert_eq!(host.view(), before);
}

#[test]
fn test_bad_snapshot_drained_by_a_write_reaches_next_pump() {
    let (hub, mut host, _guest) = playing();
    hub.inject_corrupt(host.code());
    host.guess(c("B1")).unwrap();
    assert_eq!(host.document().unwrap().host_moves.len(), 1);

    let errors = host.pump();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SyncError::Codec(_)));
    assert!(host.pump().is_empty());
}

#[test]
fn test_resume_rebuilds_state_from_document() {
    let (hub, mut host, guest) = playing();
    host.guess(c("B1")).unwrap();
    host.guess(c("A1")).unwrap();
    let code = host.code().clone();
    let expected = host.view();
    drop(host);

    let resumed = RemoteClient::resume(hub.connect(), &code, Identity::new("h"), &RoleMemory::new())
        .unwrap();
    assert_eq!(resumed.role(), Role::Host);
    assert_eq!(resumed.view(), expected);
    assert_eq!(resumed.game().ledger(Side::A).len(), 2);
    assert_eq!(resumed.game().turn(), Side::B);
    drop(guest);
}

#[test]
fn test_self_play_needs_remembered_role() {
    let hub = MemoryHub::new();
    let mut memory = RoleMemory::new();
    let mut host = create(&hub, "same");
    host.remember_role(&mut memory);
    let code = host.code().clone();

    let guest = RemoteClient::join_room(hub.connect(), code.as_str(), Identity::new("same"), "Me")
        .unwrap();
    assert_eq!(guest.role(), Role::Guest);
    host.pump();
    assert_eq!(host.document().unwrap().status, RoomStatus::Setup);

    assert!(matches!(
        RemoteClient::resume(hub.connect(), &code, Identity::new("same"), &RoleMemory::new()),
        Err(JoinError::AmbiguousRole(_))
    ));
    let resumed = RemoteClient::resume(hub.connect(), &code, Identity::new("same"), &memory)
        .unwrap();
    assert_eq!(resumed.role(), Role::Host);
}

#[test]
fn test_join_errors() {
    let hub = MemoryHub::new();
    let host = create(&hub, "h");
    let code = host.code().clone();

    assert!(matches!(
        RemoteClient::join_room(hub.connect(), "nope", Identity::new("g"), "Gus"),
        Err(JoinError::InvalidCode(_))
    ));
    assert!(matches!(
        RemoteClient::join_room(hub.connect(), "ZZZZ99", Identity::new("g"), "Gus"),
        Err(JoinError::RoomNotFound(_))
    ));

    let lowercase = code.as_str().to_ascii_lowercase();
    RemoteClient::join_room(hub.connect(), &lowercase, Identity::new("g"), "Gus").unwrap();
    assert!(matches!(
        RemoteClient::join_room(hub.connect(), code.as_str(), Identity::new("x"), "Xan"),
        Err(JoinError::RoomTaken(_))
    ));
    // Same guest identity rejoins without a write.
    RemoteClient::join_room(hub.connect(), code.as_str(), Identity::new("g"), "Gus").unwrap();

    let mut raw = hub.connect();
    raw.write(&code, &DocumentPatch::new(Role::Host).status(RoomStatus::Abandoned))
        .unwrap();
    assert!(matches!(
        RemoteClient::join_room(hub.connect(), code.as_str(), Identity::new("g"), "Gus"),
        Err(JoinError::RoomClosed(_))
    ));
}

#[test]
fn test_outsider_cannot_resume() {
    let hub = MemoryHub::new();
    let host = create(&hub, "h");
    let code: RoomCode = host.code().clone();
    assert!(matches!(
        RemoteClient::resume(hub.connect(), &code, Identity::new("stranger"), &RoleMemory::new()),
        Err(JoinError::NotParticipant(_))
    ));
}

#[test]
fn test_views_agree_after_every_snapshot() {
    let (_hub, mut host, mut guest) = playing();
    let script = [
        (Role::Host, "B1"),
        (Role::Host, "A1"),
        (Role::Guest, "A1"),
        (Role::Guest, "B1"),
        (Role::Host, "C2"),
        (Role::Host, "D3"),
        (Role::Host, "D4"),
    ];
    for (role, cell) in script {
        let mover = if role == Role::Host { &mut host } else { &mut guest };
        mover.guess(c(cell)).unwrap();
        pump(&mut [&mut host, &mut guest]);
        assert_converged(&host, &guest);
    }
    assert_eq!(guest.game().winner(), Some(Side::A));
    let view = LocalView::derive(guest.document().unwrap(), Role::Guest);
    assert_eq!(view.phase(), Phase::Finished);
}
