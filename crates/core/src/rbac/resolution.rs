//! Pure precedence rules over gathered permission rows
//!
//! Role-conferred and direct grants arrive here as one flat list of
//! [`Permission`] rows. For each requested name the most specific scope tier
//! holding any matching row decides, and inside that tier a forbid row beats
//! an allow row.

use gameap_domain::{AbilityName, EntityId, EntityType, Permission};

/// How closely an ability's scope matches the request target.
///
/// Ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeTier {
    /// Ability targets nothing in particular
    Global,
    /// Ability targets every entity of the requested type
    EntityType,
    /// Ability targets exactly the requested entity
    Entity,
}

impl ScopeTier {
    /// Most specific first.
    const PRECEDENCE: [Self; 3] = [Self::Entity, Self::EntityType, Self::Global];
}

/// Outcome for one ability name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Allowed at this tier with no forbid at the same tier
    Granted(ScopeTier),
    /// Forbidden at this tier; allows at the same or less specific tiers lose
    Forbidden(ScopeTier),
    /// No applicable row
    NotGranted,
}

impl Decision {
    /// Only an explicit grant counts; `NotGranted` denies
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Tier at which `row` covers `target`, or `None` when it does not apply.
///
/// Without a target only global abilities apply.
pub fn tier_of(row: &Permission, target: Option<(EntityType, EntityId)>) -> Option<ScopeTier> {
    let ability = row.ability.as_ref()?;
    match (ability.entity_type, ability.entity_id, target) {
        (None, None, _) => Some(ScopeTier::Global),
        (Some(ty), None, Some((target_ty, _))) if ty == target_ty => Some(ScopeTier::EntityType),
        (Some(ty), Some(id), Some((target_ty, target_id))) if ty == target_ty && id == target_id => {
            Some(ScopeTier::Entity)
        }
        _ => None,
    }
}

/// Decide one ability name against the gathered rows.
pub fn decide(
    rows: &[Permission],
    name: &AbilityName,
    target: Option<(EntityType, EntityId)>,
) -> Decision {
    let mut allowed = [false; 3];
    let mut forbidden = [false; 3];

    for row in rows.iter().filter(|row| row.ability_name() == Some(name)) {
        if let Some(tier) = tier_of(row, target) {
            let slot = tier as usize;
            if row.forbidden {
                forbidden[slot] = true;
            } else {
                allowed[slot] = true;
            }
        }
    }

    for tier in ScopeTier::PRECEDENCE {
        let slot = tier as usize;
        if forbidden[slot] {
            return Decision::Forbidden(tier);
        }
        if allowed[slot] {
            return Decision::Granted(tier);
        }
    }

    Decision::NotGranted
}

/// Whether the rows hold the admin ability globally without a global forbid.
pub fn holds_admin(rows: &[Permission]) -> bool {
    decide(rows, &AbilityName::ADMIN_ROLES_PERMISSIONS, None).is_granted()
}
