// Input handling
//
// - `action`: game actions, ability events and default key bindings
// - `config`: remappable bindings
// - `player`: held/pressed state and the controller-facing input trait
// - `manager`: turns window events into player input
//
// ```rust,ignore
// let mut input = InputManager::new(InputConfig::with_defaults());
//
// // In the event loop
// input.process_keyboard_event(&key_event);
//
// // Once per frame
// for event in input.drain_events() {
//     machine.on_input(event);
// }
// machine.tick_logical(dt, input.player(), &mut physics);
// input.update();
// ```

pub mod action;
pub mod config;
pub mod manager;
pub mod player;

pub use action::{Action, InputEvent, InputSource};
pub use config::InputConfig;
pub use manager::InputManager;
pub use player::{ControlInput, InputSnapshot, PlayerInput};
