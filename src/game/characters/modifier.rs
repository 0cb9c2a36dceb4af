// Ability pickups

use log::info;

use super::machine::CharacterStateMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    Jump,
    Dash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Enable,
    Disable,
    AddOneAllowedForce,
    RemoveOneAllowedForce,
}

/// Runtime change to one ability, applied when a pickup is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbilityModifier {
    pub ability: Ability,
    pub modifier: Modifier,
}

impl AbilityModifier {
    pub const fn new(ability: Ability, modifier: Modifier) -> Self {
        Self { ability, modifier }
    }

    pub fn apply(&self, machine: &mut CharacterStateMachine) {
        info!("Ability modifier: {:?} {:?}", self.ability, self.modifier);
        match (self.ability, self.modifier) {
            (Ability::Jump, Modifier::Enable) => machine.enable_jump(true),
            (Ability::Jump, Modifier::Disable) => machine.enable_jump(false),
            (Ability::Jump, Modifier::AddOneAllowedForce) => {
                machine.add_maximum_allowed_force_to_jump(1)
            }
            (Ability::Jump, Modifier::RemoveOneAllowedForce) => {
                machine.add_maximum_allowed_force_to_jump(-1)
            }
            (Ability::Dash, Modifier::Enable) => machine.enable_dash(true),
            (Ability::Dash, Modifier::Disable) => machine.enable_dash(false),
            (Ability::Dash, Modifier::AddOneAllowedForce) => {
                machine.add_maximum_allowed_force_to_dash(1)
            }
            (Ability::Dash, Modifier::RemoveOneAllowedForce) => {
                machine.add_maximum_allowed_force_to_dash(-1)
            }
        }
    }
}
