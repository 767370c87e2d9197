use crate::model::signaling::SdpKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side of the handshake a process plays.
///
/// The offerer produces the ball video; the answerer consumes it and reports
/// coordinates back.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Offerer,
    Answerer,
}

impl Role {
    /// Kind of description this side creates locally.
    pub fn local_kind(self) -> SdpKind {
        match self {
            Role::Offerer => SdpKind::Offer,
            Role::Answerer => SdpKind::Answer,
        }
    }

    /// Kind of description this side must receive from the peer.
    pub fn expected_remote_kind(self) -> SdpKind {
        match self {
            Role::Offerer => SdpKind::Answer,
            Role::Answerer => SdpKind::Offer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Offerer => f.write_str("offerer"),
            Role::Answerer => f.write_str("answerer"),
        }
    }
}
