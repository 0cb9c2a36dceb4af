// Level: physics world, player and input, driven by the game loop

use glam::Vec2;
use log::{debug, error, info};

use crate::engine::game_loop::TickTarget;
use crate::engine::input::{InputConfig, InputManager};
use crate::engine::physics::{presets, PhysicsWorld};
use crate::error::Result;

use super::characters::{ControllerSettings, PlayerCharacter};

/// Falling below this height respawns the player
pub const DEFAULT_KILL_HEIGHT: f32 = -20.0;

pub struct Level {
    pub world: PhysicsWorld,
    pub player: PlayerCharacter,
    pub input: InputManager,
    kill_height: f32,
    respawns: u32,
}

impl Level {
    pub fn new(
        world: PhysicsWorld,
        player: PlayerCharacter,
        input: InputManager,
        kill_height: f32,
    ) -> Self {
        Self {
            world,
            player,
            input,
            kill_height,
            respawns: 0,
        }
    }

    /// Test room: floor, two tall walls, a floating ledge, a low step and a
    /// ramp
    pub fn demo(settings: ControllerSettings, bindings: InputConfig) -> Result<Self> {
        let mut world = PhysicsWorld::new();

        let blocks = [
            // center, size
            (Vec2::new(0.0, -0.5), Vec2::new(60.0, 1.0)),
            (Vec2::new(-12.0, 5.0), Vec2::new(1.0, 10.0)),
            (Vec2::new(12.0, 5.0), Vec2::new(1.0, 10.0)),
            (Vec2::new(-6.0, 3.0), Vec2::new(4.0, 0.5)),
            (Vec2::new(3.0, 0.1), Vec2::new(2.0, 0.2)),
        ];
        for (center, size) in blocks {
            let body = world.add_rigid_body(presets::level_body(center.x, center.y));
            world.add_collider(presets::level_collider(size.x, size.y), body);
        }
        if let Some(ramp) = presets::slope_collider(4.0, 2.0) {
            let body = world.add_rigid_body(presets::level_body(6.0, 0.0));
            world.add_collider(ramp, body);
        }

        let player = PlayerCharacter::spawn("Cube", settings, &mut world, Vec2::new(0.0, 1.0))?;
        info!("Demo level ready");
        Ok(Self::new(
            world,
            player,
            InputManager::new(bindings),
            DEFAULT_KILL_HEIGHT,
        ))
    }

    pub fn respawns(&self) -> u32 {
        self.respawns
    }

    fn check_kill_height(&mut self) -> Result<()> {
        let position = self.player.position(&mut self.world)?;
        if position.y < self.kill_height {
            self.respawns += 1;
            self.player.respawn(&mut self.world)?;
        }
        Ok(())
    }
}

impl TickTarget for Level {
    fn tick_physics(&mut self, dt: f32) {
        if let Err(err) = self.player.tick_physics(dt, &mut self.world) {
            error!("Physics tick for {} failed: {}", self.player.name, err);
        }
        self.world.step();
    }

    fn tick_logical(&mut self, dt: f32) {
        for event in self.input.drain_events() {
            self.player.on_input(event);
        }
        let result = self
            .player
            .tick_logical(dt, self.input.player(), &mut self.world)
            .and_then(|()| self.check_kill_height());
        if let Err(err) = result {
            error!("Logical tick for {} failed: {}", self.player.name, err);
        }
        self.input.update();
    }

    /// Presses made during a pause must not fire on resume
    fn tick_paused(&mut self) {
        let dropped = self.input.drain_events();
        if !dropped.is_empty() {
            debug!("Dropped {} ability presses made while paused", dropped.len());
        }
        self.input.update();
    }
}
