// Movement states and the events fired when they change

use glam::Vec2;

/// Movement state of a character. Exactly one is current at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementState {
    /// Standing or walking on ground
    Grounded,
    /// In the air without having jumped
    Falling,
    /// Thrown by a bumper, controls briefly suspended
    Bumping,
    /// Transient: cascades into `Jumping` within the same transition
    StartJump,
    /// In the air after a jump
    Jumping,
    /// Transient: landing from a jump, followed by `Grounded`
    EndJump,
    /// Stuck to a wall
    WallGrab,
    /// Pushed away from a wall
    WallJump,
    /// Dash impulse in progress
    Dashing,
    /// Hit stun after taking damage
    DamageTaken,
}

impl Default for MovementState {
    fn default() -> Self {
        Self::Grounded
    }
}

impl MovementState {
    pub const ALL: [MovementState; 10] = [
        Self::Grounded,
        Self::Falling,
        Self::Bumping,
        Self::StartJump,
        Self::Jumping,
        Self::EndJump,
        Self::WallGrab,
        Self::WallJump,
        Self::Dashing,
        Self::DamageTaken,
    ];

    fn bit(self) -> u16 {
        1 << self as u16
    }

    /// States that only exist for the duration of a single transition
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StartJump | Self::EndJump)
    }

    /// Check if the character is in the air
    pub fn is_airborne(&self) -> bool {
        matches!(
            self,
            Self::Falling | Self::Bumping | Self::Jumping | Self::WallJump | Self::Dashing
        )
    }

    /// Get the animation name for this state
    pub fn animation_name(&self) -> &'static str {
        match self {
            Self::Grounded => "grounded",
            Self::Falling => "fall",
            Self::Bumping => "bump",
            Self::StartJump => "jump_start",
            Self::Jumping => "jump",
            Self::EndJump => "jump_end",
            Self::WallGrab => "wall_grab",
            Self::WallJump => "wall_jump",
            Self::Dashing => "dash",
            Self::DamageTaken => "hit",
        }
    }
}

/// A set of movement states, used for membership queries only.
///
/// Distinct from [`MovementState`] so that "the current state" can never hold
/// more than one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateSet(u16);

impl StateSet {
    pub const EMPTY: Self = Self(0);

    /// States in which jump, dash and wall-grab presses are recorded
    pub const ACCEPTS_ABILITY_INPUT: Self = Self::from_states(&[
        MovementState::Grounded,
        MovementState::Falling,
        MovementState::Bumping,
        MovementState::Jumping,
        MovementState::WallJump,
        MovementState::Dashing,
    ]);

    /// States in which wall-jump presses are recorded
    pub const ACCEPTS_WALL_JUMP_INPUT: Self = Self::from_states(&[MovementState::WallGrab]);

    pub const fn from_states(states: &[MovementState]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < states.len() {
            bits |= 1 << states[i] as u16;
            i += 1;
        }
        Self(bits)
    }

    pub fn contains(self, state: MovementState) -> bool {
        self.0 & state.bit() != 0
    }

    pub fn insert(&mut self, state: MovementState) {
        self.0 |= state.bit();
    }

    pub fn remove(&mut self, state: MovementState) {
        self.0 &= !state.bit();
    }

    pub fn with(mut self, state: MovementState) -> Self {
        self.insert(state);
        self
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = MovementState> {
        MovementState::ALL
            .into_iter()
            .filter(move |state| self.contains(*state))
    }
}

impl FromIterator<MovementState> for StateSet {
    fn from_iter<I: IntoIterator<Item = MovementState>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for state in iter {
            set.insert(state);
        }
        set
    }
}

/// Controller values captured when a state change fires, before the new
/// state's entry effects run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerSnapshot {
    pub jump_used: u32,
    pub jump_maximum: u32,
    pub dash_used: u32,
    pub dash_maximum: u32,
    pub is_dashing: bool,
    /// Whether the character collider is currently trigger-only
    pub collider_is_trigger: bool,
    pub velocity: Vec2,
}

/// Payload delivered to state-change listeners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateChanged {
    pub previous: MovementState,
    pub current: MovementState,
    pub snapshot: ControllerSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        assert_eq!(MovementState::default(), MovementState::Grounded);
    }

    #[test]
    fn test_state_bits_are_unique() {
        let all: StateSet = MovementState::ALL.into_iter().collect();
        assert_eq!(all.len(), MovementState::ALL.len());
    }

    #[test]
    fn test_transient_states() {
        assert!(MovementState::StartJump.is_transient());
        assert!(MovementState::EndJump.is_transient());
        assert!(!MovementState::Jumping.is_transient());
    }

    #[test]
    fn test_input_acceptance_sets() {
        let ability = StateSet::ACCEPTS_ABILITY_INPUT;
        assert!(ability.contains(MovementState::Dashing));
        assert!(ability.contains(MovementState::WallJump));
        assert!(!ability.contains(MovementState::WallGrab));
        assert!(!ability.contains(MovementState::DamageTaken));
        assert!(!ability.contains(MovementState::StartJump));

        let wall_jump = StateSet::ACCEPTS_WALL_JUMP_INPUT;
        assert!(wall_jump.contains(MovementState::WallGrab));
        assert_eq!(wall_jump.len(), 1);
    }

    #[test]
    fn test_state_set_insert_remove() {
        let mut set = StateSet::EMPTY;
        assert!(set.is_empty());
        set.insert(MovementState::Dashing);
        set.insert(MovementState::WallGrab);
        assert!(set.contains(MovementState::Dashing));
        set.remove(MovementState::Dashing);
        assert!(!set.contains(MovementState::Dashing));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![MovementState::WallGrab]);
    }

    #[test]
    fn test_state_set_union() {
        let a = StateSet::EMPTY.with(MovementState::Falling);
        let b = StateSet::from_states(&[MovementState::Jumping]);
        let both = a.union(b);
        assert!(both.contains(MovementState::Falling));
        assert!(both.contains(MovementState::Jumping));
        assert_eq!(both.len(), 2);
    }
}
