//! Room codes, identities and roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{GameRng, Side};
use crate::error::JoinError;

/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 6;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Short, human-shareable room key.
///
/// Stored upper-case; parsing is case-insensitive. Generation is random and
/// only best-effort unique: a collision shows up as a failed create or a
/// rejected join, never as corrupted state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Generate a random code.
    pub fn generate(rng: &mut GameRng) -> Self {
        let code = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.gen_range_usize(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = JoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == ROOM_CODE_LEN && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(JoinError::InvalidCode(s.to_string()))
        }
    }
}

impl TryFrom<String> for RoomCode {
    type Error = JoinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

/// Opaque account identity from the identity provider.
///
/// Only compared for equality. Both roles may share one identity
/// (self-play), so it never decides which half of a room is ours.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A client's role within one room, fixed for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Created the room. Plays side A and guesses first.
    Host,
    /// Joined the room. Plays side B.
    Guest,
}

impl Role {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Role::Host => Role::Guest,
            Role::Guest => Role::Host,
        }
    }

    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Role::Host => Side::A,
            Role::Guest => Side::B,
        }
    }

    #[must_use]
    pub const fn from_side(side: Side) -> Self {
        match side {
            Side::A => Role::Host,
            Side::B => Role::Guest,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => f.write_str("host"),
            Role::Guest => f.write_str("guest"),
        }
    }
}
