//! Direct allow/forbid grants

use serde::{Deserialize, Serialize};

use super::ability::{Ability, AbilityName};
use super::entity::{EntityId, EntityType};

/// Direct grant (`forbidden == false`) or denial of one ability to one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: EntityId,
    pub ability_id: EntityId,
    pub entity_id: Option<EntityId>,
    pub entity_type: Option<EntityType>,
    pub forbidden: bool,
    pub scope: Option<i64>,
    /// Joined ability, populated on read
    pub ability: Option<Ability>,
}

impl Permission {
    /// Name of the joined ability, if loaded.
    pub fn ability_name(&self) -> Option<&AbilityName> {
        self.ability.as_ref().map(|ability| &ability.name)
    }

    /// `true` for an allow row, `false` for a forbid row
    pub const fn is_allow(&self) -> bool {
        !self.forbidden
    }
}
