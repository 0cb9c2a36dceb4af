// Character system
//
// The movement controller and everything it is built from:
// - Movement states, transition events and tunables
// - Jump and dash force appliers with per-airtime budgets
// - Ground/wall/slope probing and displacement telemetry
// - The state machine itself, plus the rapier-backed player character

pub mod character;
pub mod dash;
pub mod detector;
pub mod displacement;
pub mod force;
pub mod jump;
pub mod machine;
pub mod modifier;
pub mod settings;
pub mod state;

#[cfg(test)]
mod test_world;

// Re-export commonly used types
pub use character::{PlayerCharacter, CHARACTER_HEIGHT};
pub use dash::Dash;
pub use detector::{CollisionProbeResult, GroundWallSlopeDetector, WallProbe};
pub use displacement::{DisplacementEstimator, MovementDirection};
pub use force::{ForceApplier, ForceBudget, MotionContext};
pub use jump::Jump;
pub use machine::{CharacterStateMachine, ListenerId, PredicateId, StateMachineBuilder};
pub use modifier::{Ability, AbilityModifier, Modifier};
pub use settings::{
    ControllerSettings, DashSettings, ForceResetPolicy, JumpSettings, MovementSettings,
    ProbeSettings, BASE_SETTINGS,
};
pub use state::{ControllerSnapshot, MovementState, StateChanged, StateSet};
