// Game action definitions and mappings

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Represents all possible in-game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Movement
    MoveLeft,
    MoveRight,

    // Abilities
    Jump,
    Dash,
    WallGrab,

    // Meta actions
    Pause,
    Menu,
}

/// Discrete ability press delivered to the movement controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    JumpPerformed,
    DashPerformed,
    WallGrabPerformed,
    WallJumpPerformed,
}

impl Action {
    /// Events raised when this action is pressed.
    ///
    /// Jump doubles as wall jump; the controller only keeps whichever one its
    /// current state accepts.
    pub fn performed_events(self) -> &'static [InputEvent] {
        match self {
            Action::Jump => &[InputEvent::JumpPerformed, InputEvent::WallJumpPerformed],
            Action::Dash => &[InputEvent::DashPerformed],
            Action::WallGrab => &[InputEvent::WallGrabPerformed],
            Action::MoveLeft | Action::MoveRight | Action::Pause | Action::Menu => &[],
        }
    }
}

/// Represents an input source (keyboard key or mouse button)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
    Mouse(MouseButton),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }

    /// Create a mouse button input source
    pub fn mouse(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

/// Default keyboard/mouse bindings
pub fn default_bindings() -> Vec<(InputSource, Action)> {
    vec![
        // Movement (A/D and arrows)
        (InputSource::key(KeyCode::KeyA), Action::MoveLeft),
        (InputSource::key(KeyCode::KeyD), Action::MoveRight),
        (InputSource::key(KeyCode::ArrowLeft), Action::MoveLeft),
        (InputSource::key(KeyCode::ArrowRight), Action::MoveRight),
        // Abilities
        (InputSource::key(KeyCode::Space), Action::Jump),
        (InputSource::key(KeyCode::ShiftLeft), Action::Dash),
        (InputSource::key(KeyCode::KeyJ), Action::WallGrab),
        (InputSource::mouse(MouseButton::Left), Action::Dash),
        (InputSource::mouse(MouseButton::Right), Action::WallGrab),
        // Meta
        (InputSource::key(KeyCode::KeyP), Action::Pause),
        (InputSource::key(KeyCode::Escape), Action::Menu),
    ]
}
