// Player input state
//
// Tracks held actions for continuous queries and queues ability presses for
// the movement controller.

use super::action::{Action, InputEvent};
use std::collections::HashSet;

/// Continuous input read by the movement controller once per logical tick
pub trait ControlInput {
    /// Horizontal axis in [-1, 1]
    fn horizontal_move(&self) -> f32;

    fn is_jump_held(&self) -> bool;
}

/// Fixed input values, for scripted or replayed control
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub horizontal: f32,
    pub jump_held: bool,
}

impl InputSnapshot {
    pub fn new(horizontal: f32, jump_held: bool) -> Self {
        Self {
            horizontal: horizontal.clamp(-1.0, 1.0),
            jump_held,
        }
    }
}

impl ControlInput for InputSnapshot {
    fn horizontal_move(&self) -> f32 {
        self.horizontal
    }

    fn is_jump_held(&self) -> bool {
        self.jump_held
    }
}

#[derive(Debug, Default)]
pub struct PlayerInput {
    /// Actions that are currently pressed
    pressed: HashSet<Action>,

    /// Actions pressed since the last update
    just_pressed: HashSet<Action>,

    /// Actions released since the last update
    just_released: HashSet<Action>,

    /// Ability presses not yet handed to the controller
    pending: Vec<InputEvent>,
}

impl PlayerInput {
    /// Create a new player input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    /// Register an action press; repeats while held are ignored
    pub(crate) fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
            self.pending.extend_from_slice(action.performed_events());
        }
    }

    pub(crate) fn release(&mut self, action: Action) {
        if self.pressed.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Start a new frame. Call once per frame after the logical tick.
    pub(crate) fn update(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Hand over queued ability presses, oldest first
    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Reset all input state
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
        self.just_released.clear();
        self.pending.clear();
    }
}

impl ControlInput for PlayerInput {
    fn horizontal_move(&self) -> f32 {
        let mut horizontal = 0.0;
        if self.is_pressed(Action::MoveLeft) {
            horizontal -= 1.0;
        }
        if self.is_pressed(Action::MoveRight) {
            horizontal += 1.0;
        }
        horizontal
    }

    fn is_jump_held(&self) -> bool {
        self.is_pressed(Action::Jump)
    }
}
