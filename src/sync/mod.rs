//! Remote synchronization protocol.
//!
//! Two clients share one `RoomDocument` through a `DocumentStore`, with no
//! arbiter in between. The protocol stays safe because:
//!
//! - every field has one owner, and `DocumentPatch` can only address the
//!   author's half;
//! - a move is only sent while the document gives the turn to the sender;
//! - every local view is re-derived from the newest snapshot with
//!   `LocalView::derive`, never patched incrementally.
//!
//! ## Example
//!
//! ```
//! use bottle_duel::core::GameRng;
//! use bottle_duel::sync::{Identity, MemoryHub, RemoteClient, RoomStatus};
//! use chrono::Utc;
//!
//! let hub = MemoryHub::new();
//! let mut rng = GameRng::new(1);
//! let mut host = RemoteClient::create_room(
//!     hub.connect(), Identity::new("ann"), "Ann", &mut rng, Utc::now(),
//! ).unwrap();
//! let guest = RemoteClient::join_room(
//!     hub.connect(), host.code().as_str(), Identity::new("bo"), "Bo",
//! ).unwrap();
//!
//! host.pump();
//! assert_eq!(host.document().unwrap().status, RoomStatus::Setup);
//! assert_eq!(guest.document(), host.document());
//! ```

pub mod room;
pub mod document;
pub mod view;
pub mod store;
pub mod client;

pub use room::{Identity, Role, RoomCode, ROOM_CODE_LEN};
pub use document::{DocumentPatch, FieldWrite, RoomDocument, RoomStatus};
pub use view::LocalView;
pub use store::{DocumentStore, MemoryHub, MemoryStore, Snapshot};
pub use client::{RemoteClient, RoleMemory};
