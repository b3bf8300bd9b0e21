//! Entity addressing for principals and targets
//!
//! The RBAC core never references concrete tables. Every principal (user,
//! role) and every target (server, node, ...) is an `(entity_id,
//! entity_type)` pair; "global" is modelled as the absence of a type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameapError;

/// Identifier type shared by every persisted RBAC record.
pub type EntityId = u64;

/// Kind of an addressable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "users")]
    User,
    #[serde(rename = "roles")]
    Role,
    #[serde(rename = "servers")]
    Server,
    #[serde(rename = "games")]
    Game,
    #[serde(rename = "game_mods")]
    GameMod,
    #[serde(rename = "nodes")]
    Node,
    #[serde(rename = "client_certificates")]
    ClientCertificate,
    #[serde(rename = "server_tasks")]
    ServerTask,
}

impl EntityType {
    /// All entity types, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::User,
        Self::Role,
        Self::Server,
        Self::Game,
        Self::GameMod,
        Self::Node,
        Self::ClientCertificate,
        Self::ServerTask,
    ];

    /// Stable string tag, also used inside cache keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Role => "roles",
            Self::Server => "servers",
            Self::Game => "games",
            Self::GameMod => "game_mods",
            Self::Node => "nodes",
            Self::ClientCertificate => "client_certificates",
            Self::ServerTask => "server_tasks",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = GameapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GameapError::InvalidInput(format!("Unknown entity type: {s}")))
    }
}
