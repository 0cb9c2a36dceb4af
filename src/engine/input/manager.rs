// Input manager - routes window events through the bindings to the player

use super::action::{Action, InputEvent, InputSource};
use super::config::InputConfig;
use super::player::PlayerInput;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::PhysicalKey;

#[derive(Debug, Default)]
pub struct InputManager {
    config: InputConfig,
    player: PlayerInput,
}

impl InputManager {
    /// Create a manager using the given bindings
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            player: PlayerInput::new(),
        }
    }

    /// Process a keyboard event from winit. Returns the bound action.
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) -> Option<Action> {
        let PhysicalKey::Code(key_code) = event.physical_key else {
            return None;
        };
        // Key repeats are not new presses
        if event.repeat && event.state == ElementState::Pressed {
            return None;
        }
        self.process_source(InputSource::key(key_code), event.state)
    }

    /// Process a mouse button event from winit. Returns the bound action.
    pub fn process_mouse_button(
        &mut self,
        button: MouseButton,
        state: ElementState,
    ) -> Option<Action> {
        self.process_source(InputSource::mouse(button), state)
    }

    fn process_source(&mut self, source: InputSource, state: ElementState) -> Option<Action> {
        let action = self.config.get_action(source)?;
        match state {
            ElementState::Pressed => self.player.press(action),
            ElementState::Released => self.player.release(action),
        }
        Some(action)
    }

    /// Ability presses since the last call
    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        self.player.drain_events()
    }

    /// Call once per frame, after the logical tick
    pub fn update(&mut self) {
        self.player.update();
    }

    /// Get the player's input state
    pub fn player(&self) -> &PlayerInput {
        &self.player
    }

    /// Get the bindings
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Get a mutable reference to the bindings
    pub fn config_mut(&mut self) -> &mut InputConfig {
        &mut self.config
    }

    /// Release everything and drop queued presses
    pub fn reset(&mut self) {
        self.player.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::ControlInput;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_bound_source_reaches_player() {
        let mut manager = InputManager::new(InputConfig::with_defaults());
        let action = manager.process_source(InputSource::key(KeyCode::KeyD), ElementState::Pressed);
        assert_eq!(action, Some(Action::MoveRight));
        assert_eq!(manager.player().horizontal_move(), 1.0);

        manager.process_source(InputSource::key(KeyCode::KeyD), ElementState::Released);
        assert_eq!(manager.player().horizontal_move(), 0.0);
    }

    #[test]
    fn test_unbound_source_ignored() {
        let mut manager = InputManager::new(InputConfig::empty());
        let action = manager.process_source(InputSource::key(KeyCode::Space), ElementState::Pressed);
        assert_eq!(action, None);
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn test_mouse_dash() {
        let mut manager = InputManager::new(InputConfig::with_defaults());
        manager.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(manager.drain_events(), vec![InputEvent::DashPerformed]);
    }

    #[test]
    fn test_remap_jump() {
        let mut manager = InputManager::new(InputConfig::with_defaults());
        manager
            .config_mut()
            .bind(InputSource::key(KeyCode::KeyW), Action::Jump);

        manager.process_source(InputSource::key(KeyCode::KeyW), ElementState::Pressed);
        assert!(manager.player().is_jump_held());

        manager.update();
        assert!(!manager.player().just_pressed(Action::Jump));
        assert!(manager.player().is_pressed(Action::Jump));

        manager.reset();
        assert!(!manager.player().is_jump_held());
    }
}
