//! Document store seam.
//!
//! The store holds one `RoomDocument` per room code and pushes a full
//! snapshot to every subscriber after each change, including the change's
//! own author. Snapshots are not deltas: a client can be handed the same
//! snapshot twice, or skip intermediate ones, and still converge.
//!
//! `MemoryHub` is an in-process store. Documents are kept bincode-encoded
//! so every snapshot crosses a real codec boundary, and a corrupt payload
//! surfaces as `SyncError::Codec` exactly as it would from a remote store.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::SyncError;

use super::document::{DocumentPatch, RoomDocument};
use super::room::RoomCode;

/// One item from a subscription: a snapshot, or `None` once the room's
/// document is gone.
pub type Snapshot = Result<Option<RoomDocument>, SyncError>;

/// Shared-document service used by `RemoteClient`.
pub trait DocumentStore {
    /// Create a room. Fails with `RoomExists` if the code is taken.
    fn create(&mut self, code: &RoomCode, doc: &RoomDocument) -> Result<(), SyncError>;

    /// Read the current document, `None` if the room does not exist.
    fn load(&mut self, code: &RoomCode) -> Result<Option<RoomDocument>, SyncError>;

    /// Apply a field-level patch. Validation failures leave the document
    /// untouched.
    fn write(&mut self, code: &RoomCode, patch: &DocumentPatch) -> Result<(), SyncError>;

    /// Start receiving snapshots for `code`. The current document is
    /// delivered immediately.
    fn subscribe(&mut self, code: &RoomCode) -> Result<(), SyncError>;

    /// Drain pending snapshots in delivery order.
    fn poll(&mut self) -> Vec<Snapshot>;
}

#[derive(Default)]
struct HubInner {
    available: bool,
    rooms: FxHashMap<RoomCode, Vec<u8>>,
    inboxes: Vec<Inbox>,
}

struct Inbox {
    code: Option<RoomCode>,
    pending: VecDeque<Option<Vec<u8>>>,
}

impl HubInner {
    fn require_available(&self) -> Result<(), SyncError> {
        if self.available {
            Ok(())
        } else {
            Err(SyncError::Unavailable("memory hub offline".to_string()))
        }
    }

    fn broadcast(&mut self, code: &RoomCode, payload: Option<Vec<u8>>) {
        for inbox in &mut self.inboxes {
            if inbox.code.as_ref() == Some(code) {
                inbox.pending.push_back(payload.clone());
            }
        }
    }
}

/// In-process document store shared by any number of clients.
///
/// Cloning the hub shares the same rooms.
#[derive(Clone)]
pub struct MemoryHub {
    inner: Rc<RefCell<HubInner>>,
}

impl Default for MemoryHub {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHub {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                available: true,
                ..HubInner::default()
            })),
        }
    }

    /// New client connection with its own subscription inbox.
    #[must_use]
    pub fn connect(&self) -> MemoryStore {
        let mut inner = self.inner.borrow_mut();
        inner.inboxes.push(Inbox {
            code: None,
            pending: VecDeque::new(),
        });
        MemoryStore {
            hub: self.clone(),
            slot: inner.inboxes.len() - 1,
        }
    }

    /// Current document of a room, bypassing any client.
    pub fn peek(&self, code: &RoomCode) -> Result<Option<RoomDocument>, SyncError> {
        let inner = self.inner.borrow();
        inner
            .rooms
            .get(code)
            .map(|bytes| bincode::deserialize(bytes).map_err(SyncError::from))
            .transpose()
    }

    /// Remove a room and notify its subscribers.
    pub fn delete(&self, code: &RoomCode) {
        let mut inner = self.inner.borrow_mut();
        if inner.rooms.remove(code).is_some() {
            log::info!("room {code} deleted");
            inner.broadcast(code, None);
        }
    }

    /// Push an undecodable snapshot to a room's subscribers.
    pub fn inject_corrupt(&self, code: &RoomCode) {
        self.inner
            .borrow_mut()
            .broadcast(code, Some(vec![0xff, 0xff, 0xff]));
    }

    /// Re-deliver the current document to every subscriber of a room.
    pub fn redeliver(&self, code: &RoomCode) {
        let mut inner = self.inner.borrow_mut();
        if let Some(bytes) = inner.rooms.get(code).cloned() {
            inner.broadcast(code, Some(bytes));
        }
    }

    /// Take the hub on- or offline. Offline, every call fails with
    /// `Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.inner.borrow_mut().available = available;
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.inner.borrow().rooms.len()
    }
}

/// One client's connection to a `MemoryHub`.
pub struct MemoryStore {
    hub: MemoryHub,
    slot: usize,
}

impl DocumentStore for MemoryStore {
    fn create(&mut self, code: &RoomCode, doc: &RoomDocument) -> Result<(), SyncError> {
        let mut inner = self.hub.inner.borrow_mut();
        inner.require_available()?;
        if inner.rooms.contains_key(code) {
            return Err(SyncError::RoomExists(code.clone()));
        }
        let bytes = bincode::serialize(doc)?;
        inner.rooms.insert(code.clone(), bytes.clone());
        inner.broadcast(code, Some(bytes));
        Ok(())
    }

    fn load(&mut self, code: &RoomCode) -> Result<Option<RoomDocument>, SyncError> {
        self.hub.inner.borrow().require_available()?;
        self.hub.peek(code)
    }

    fn write(&mut self, code: &RoomCode, patch: &DocumentPatch) -> Result<(), SyncError> {
        let mut inner = self.hub.inner.borrow_mut();
        inner.require_available()?;
        let bytes = inner
            .rooms
            .get(code)
            .ok_or_else(|| SyncError::DocumentDeleted(code.clone()))?;

        let mut doc: RoomDocument = bincode::deserialize(bytes)?;
        doc.apply(patch)?;
        let bytes = bincode::serialize(&doc)?;
        inner.rooms.insert(code.clone(), bytes.clone());
        inner.broadcast(code, Some(bytes));
        Ok(())
    }

    fn subscribe(&mut self, code: &RoomCode) -> Result<(), SyncError> {
        let mut inner = self.hub.inner.borrow_mut();
        inner.require_available()?;
        let current = inner.rooms.get(code).cloned();
        let inbox = &mut inner.inboxes[self.slot];
        inbox.code = Some(code.clone());
        inbox.pending.clear();
        inbox.pending.push_back(current);
        Ok(())
    }

    fn poll(&mut self) -> Vec<Snapshot> {
        let pending: Vec<_> = self.hub.inner.borrow_mut().inboxes[self.slot]
            .pending
            .drain(..)
            .collect();

        pending
            .into_iter()
            .map(|payload| {
                payload
                    .map(|bytes| bincode::deserialize(&bytes).map_err(SyncError::from))
                    .transpose()
            })
            .collect()
    }
}
