//! Abilities: atomic, named permission tags
//!
//! An ability is identified by its unique key `(name, entity_id, entity_type,
//! scope)`. Absent fields are their own bucket (SQL `COALESCE` semantics), so
//! `GameServerStart` for server 42 and the global `GameServerStart` are two
//! distinct abilities.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityType};

/// Name of an ability.
///
/// Built-in names are associated constants; plugins create additional names
/// at runtime with [`AbilityName::new`]. Both kinds compare and hash by their
/// string value only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityName(Cow<'static, str>);

impl AbilityName {
    pub const ADMIN_ROLES_PERMISSIONS: Self = Self::from_static("admin roles & permissions");
    pub const GAME_SERVER_COMMON: Self = Self::from_static("game-server-common");
    pub const GAME_SERVER_START: Self = Self::from_static("game-server-start");
    pub const GAME_SERVER_STOP: Self = Self::from_static("game-server-stop");
    pub const GAME_SERVER_RESTART: Self = Self::from_static("game-server-restart");
    pub const GAME_SERVER_PAUSE: Self = Self::from_static("game-server-pause");
    pub const GAME_SERVER_UPDATE: Self = Self::from_static("game-server-update");
    pub const GAME_SERVER_FILES: Self = Self::from_static("game-server-files");
    pub const GAME_SERVER_TASKS: Self = Self::from_static("game-server-tasks");
    pub const GAME_SERVER_SETTINGS: Self = Self::from_static("game-server-settings");
    pub const GAME_SERVER_CONSOLE_VIEW: Self = Self::from_static("game-server-console-view");
    pub const GAME_SERVER_CONSOLE_SEND: Self = Self::from_static("game-server-console-send");
    pub const GAME_SERVER_RCON_CONSOLE: Self = Self::from_static("game-server-rcon-console");
    pub const GAME_SERVER_RCON_PLAYERS: Self = Self::from_static("game-server-rcon-players");

    /// Abilities scoped to a single game server.
    pub const SERVER_ABILITIES: [Self; 13] = [
        Self::GAME_SERVER_COMMON,
        Self::GAME_SERVER_START,
        Self::GAME_SERVER_STOP,
        Self::GAME_SERVER_RESTART,
        Self::GAME_SERVER_PAUSE,
        Self::GAME_SERVER_UPDATE,
        Self::GAME_SERVER_FILES,
        Self::GAME_SERVER_TASKS,
        Self::GAME_SERVER_SETTINGS,
        Self::GAME_SERVER_CONSOLE_VIEW,
        Self::GAME_SERVER_CONSOLE_SEND,
        Self::GAME_SERVER_RCON_CONSOLE,
        Self::GAME_SERVER_RCON_PLAYERS,
    ];

    const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create an ability name from a runtime string (plugin abilities).
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Raw ability name as stored
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AbilityName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Normalized unique key of an ability.
///
/// `None` is the dedicated null bucket for each optional column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbilityKey {
    pub name: AbilityName,
    pub entity_id: Option<EntityId>,
    pub entity_type: Option<EntityType>,
    pub scope: Option<i64>,
}

/// Ability record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub id: EntityId,
    pub name: AbilityName,
    pub title: Option<String>,
    pub entity_id: Option<EntityId>,
    pub entity_type: Option<EntityType>,
    pub only_owned: bool,
    /// Opaque options blob, never interpreted by the RBAC core
    pub options: Option<serde_json::Value>,
    pub scope: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ability {
    /// Unsaved, global ability with the given name.
    pub fn new(name: impl Into<AbilityName>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            title: None,
            entity_id: None,
            entity_type: None,
            only_owned: false,
            options: None,
            scope: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Scope the ability to one concrete entity.
    pub fn for_entity(mut self, entity_type: EntityType, entity_id: EntityId) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = Some(entity_id);
        self
    }

    /// Scope the ability to every entity of one type.
    pub fn for_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = None;
        self
    }

    /// Set the human-readable title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the tenant scope (part of the unique key, not used in resolution)
    pub fn with_scope(mut self, scope: i64) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Unique key: name, target and scope with absent parts treated as empty
    pub fn key(&self) -> AbilityKey {
        AbilityKey {
            name: self.name.clone(),
            entity_id: self.entity_id,
            entity_type: self.entity_type,
            scope: self.scope,
        }
    }

    /// True when the ability targets nothing in particular.
    pub fn is_global(&self) -> bool {
        self.entity_type.is_none() && self.entity_id.is_none()
    }
}

/// Catalogue of known `(name, entity_type)` pairs.
///
/// Seeded with the built-in abilities; plugins register their own pairs at
/// startup. Resolution never consults the registry: it only answers "which
/// abilities exist" for listing endpoints.
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    entries: BTreeMap<AbilityName, Option<EntityType>>,
}

impl AbilityRegistry {
    /// Registry holding only the built-in abilities.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(AbilityName::ADMIN_ROLES_PERMISSIONS, None);
        for name in AbilityName::SERVER_ABILITIES {
            registry.register(name, Some(EntityType::Server));
        }
        registry
    }

    /// Register an ability. Returns false if the name was already known.
    pub fn register(&mut self, name: AbilityName, entity_type: Option<EntityType>) -> bool {
        self.entries.insert(name, entity_type).is_none()
    }

    /// Whether `name` has been registered
    pub fn contains(&self, name: &AbilityName) -> bool {
        self.entries.contains_key(name)
    }

    /// Entity type a registered ability is meant for, if any
    pub fn entity_type_of(&self, name: &AbilityName) -> Option<EntityType> {
        self.entries.get(name).copied().flatten()
    }

    /// All names, sorted.
    pub fn names(&self) -> Vec<AbilityName> {
        self.entries.keys().cloned().collect()
    }

    /// Names registered for one entity type.
    pub fn names_for(&self, entity_type: EntityType) -> Vec<AbilityName> {
        self.entries
            .iter()
            .filter(|(_, t)| **t == Some(entity_type))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of known ability names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
