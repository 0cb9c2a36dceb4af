use anyhow::Result;
use log::info;
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

use ledgecube::engine::game_loop::GameLoop;
use ledgecube::engine::input::{Action, InputConfig};
use ledgecube::game::characters::{MovementState, BASE_SETTINGS};
use ledgecube::game::Level;

fn window_title(state: MovementState) -> String {
    format!("Ledge Cube - {}", state.animation_name())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Ledge Cube...");

    let mut level = Level::demo(BASE_SETTINGS, InputConfig::with_defaults())?;
    level.player.machine_mut().subscribe(|event| {
        info!(
            "{:?} -> {:?} (jumps {}/{}, dashes {}/{})",
            event.previous,
            event.current,
            event.snapshot.jump_used,
            event.snapshot.jump_maximum,
            event.snapshot.dash_used,
            event.snapshot.dash_maximum
        );
    });
    let mut game_loop = GameLoop::new();
    let mut shown_state = level.player.state();

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(window_title(shown_state))
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    info!("Window created successfully");

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event, .. },
                ..
            } => {
                let pressed = event.state == ElementState::Pressed;
                match level.input.process_keyboard_event(&event) {
                    Some(Action::Pause) if pressed => game_loop.toggle_pause(),
                    Some(Action::Menu) if pressed => {
                        info!("Menu requested, shutting down...");
                        elwt.exit();
                    }
                    _ => {}
                }
            }
            Event::WindowEvent {
                event: WindowEvent::MouseInput { state, button, .. },
                ..
            } => {
                level.input.process_mouse_button(button, state);
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                game_loop.tick(&mut level);

                let state = level.player.state();
                if state != shown_state {
                    shown_state = state;
                    window.set_title(&window_title(state));
                }
            }
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
