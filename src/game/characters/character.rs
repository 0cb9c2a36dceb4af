// Player character: a rapier body driven by the movement state machine

use glam::Vec2;
use log::info;

use crate::engine::input::{ControlInput, InputEvent};
use crate::engine::physics::{
    presets, CharacterBody, ColliderHandle, PhysicsWorld, RapierCharacter, RigidBodyHandle,
};
use crate::error::Result;

use super::machine::CharacterStateMachine;
use super::modifier::AbilityModifier;
use super::settings::ControllerSettings;
use super::state::MovementState;

/// Character height; the width comes from the probe half extent
pub const CHARACTER_HEIGHT: f32 = 2.0;

/// The player-controlled cube
pub struct PlayerCharacter {
    /// Character name (for display)
    pub name: String,
    /// Handle to the character's rigid body in the physics world
    pub body_handle: RigidBodyHandle,
    /// Handle to the character's collider
    pub collider_handle: ColliderHandle,
    machine: CharacterStateMachine,
    spawn_point: Vec2,
}

impl PlayerCharacter {
    /// Create the controller and add the character's body to the world, feet
    /// at `spawn_point`
    pub fn spawn(
        name: &str,
        settings: ControllerSettings,
        physics: &mut PhysicsWorld,
        spawn_point: Vec2,
    ) -> Result<Self> {
        let machine = CharacterStateMachine::from_settings(settings)?;
        let width = machine.detector().settings().half_extent * 2.0;

        let body_handle = physics.add_rigid_body(presets::character_body(spawn_point.x, spawn_point.y));
        let collider_handle = physics.add_collider(
            presets::character_collider(width, CHARACTER_HEIGHT),
            body_handle,
        );
        info!("Spawned {} at ({:.1}, {:.1})", name, spawn_point.x, spawn_point.y);

        Ok(Self {
            name: name.to_string(),
            body_handle,
            collider_handle,
            machine,
            spawn_point,
        })
    }

    fn body<'w>(&self, physics: &'w mut PhysicsWorld) -> Result<RapierCharacter<'w>> {
        RapierCharacter::new(physics, self.body_handle, self.collider_handle)
    }

    pub fn machine(&self) -> &CharacterStateMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut CharacterStateMachine {
        &mut self.machine
    }

    pub fn state(&self) -> MovementState {
        self.machine.current_state()
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    /// Move the respawn point, e.g. when a checkpoint is reached
    pub fn set_spawn_point(&mut self, spawn_point: Vec2) {
        self.spawn_point = spawn_point;
    }

    pub fn on_input(&mut self, event: InputEvent) {
        self.machine.on_input(event);
    }

    /// Call before the physics world steps
    pub fn tick_physics(&mut self, dt: f32, physics: &mut PhysicsWorld) -> Result<()> {
        let mut body = self.body(physics)?;
        self.machine.tick_physics(dt, &mut body);
        Ok(())
    }

    /// Call once per frame, after the physics ticks
    pub fn tick_logical<I>(&mut self, dt: f32, input: &I, physics: &mut PhysicsWorld) -> Result<()>
    where
        I: ControlInput + ?Sized,
    {
        let mut body = self.body(physics)?;
        self.machine.tick_logical(dt, input, &mut body);
        Ok(())
    }

    pub fn bump(&mut self, physics: &mut PhysicsWorld, impulse: Vec2) -> Result<()> {
        let mut body = self.body(physics)?;
        self.machine.bump(&mut body, impulse);
        Ok(())
    }

    pub fn take_damage(&mut self, physics: &mut PhysicsWorld) -> Result<()> {
        let mut body = self.body(physics)?;
        self.machine.take_damage(&mut body);
        Ok(())
    }

    pub fn collect(&mut self, modifier: AbilityModifier) {
        modifier.apply(&mut self.machine);
    }

    /// Teleport to the spawn point with a clean controller
    pub fn respawn(&mut self, physics: &mut PhysicsWorld) -> Result<()> {
        let spawn_point = self.spawn_point;
        let mut body = self.body(physics)?;
        body.set_position(spawn_point);
        body.set_velocity(Vec2::ZERO);
        body.set_trigger(false);

        // Leave dash or hit stun through their exit effects
        self.machine
            .change_state(MovementState::Falling, true, &mut body);
        self.machine.reset();
        self.machine.reset_telemetry(spawn_point);
        self.machine.force_check_ground(&mut body);
        info!("{} respawned", self.name);
        Ok(())
    }

    pub fn position(&self, physics: &mut PhysicsWorld) -> Result<Vec2> {
        Ok(self.body(physics)?.position())
    }

    pub fn velocity(&self, physics: &mut PhysicsWorld) -> Result<Vec2> {
        Ok(self.body(physics)?.velocity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use crate::game::characters::force::ForceApplier;
    use crate::game::characters::modifier::{Ability, Modifier};
    use crate::game::characters::settings::BASE_SETTINGS;

    fn spawn(world: &mut PhysicsWorld) -> PlayerCharacter {
        PlayerCharacter::spawn("cube", BASE_SETTINGS, world, Vec2::new(0.0, 3.0)).unwrap()
    }

    #[test]
    fn test_spawn_places_body() {
        let mut world = PhysicsWorld::new();
        let player = spawn(&mut world);
        assert_eq!(player.position(&mut world).unwrap(), Vec2::new(0.0, 3.0));
        assert_eq!(player.state(), MovementState::Grounded);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut world = PhysicsWorld::new();
        let mut settings = BASE_SETTINGS;
        settings.movement.gravity = f32::NAN;
        let result = PlayerCharacter::spawn("cube", settings, &mut world, Vec2::ZERO);
        assert!(matches!(
            result,
            Err(ControllerError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_removed_body_reports_error() {
        let mut world = PhysicsWorld::new();
        let mut player = spawn(&mut world);
        world.remove_rigid_body(player.body_handle);
        assert_eq!(
            player.tick_physics(1.0 / 60.0, &mut world),
            Err(ControllerError::MissingBody)
        );
    }

    #[test]
    fn test_respawn_resets_controller() {
        let mut world = PhysicsWorld::new();
        let mut player = spawn(&mut world);
        player.collect(AbilityModifier::new(Ability::Dash, Modifier::AddOneAllowedForce));
        player.take_damage(&mut world).unwrap();
        assert_eq!(player.state(), MovementState::DamageTaken);

        player.set_spawn_point(Vec2::new(5.0, 10.0));
        player.respawn(&mut world).unwrap();

        // Nothing below the spawn point
        assert_eq!(player.state(), MovementState::Falling);
        assert_eq!(player.position(&mut world).unwrap(), Vec2::new(5.0, 10.0));
        assert_eq!(player.velocity(&mut world).unwrap(), Vec2::ZERO);
        // Pickups survive a respawn
        assert_eq!(player.machine().dash().budget().maximum(), 2);
        // The teleport is not movement
        assert_eq!(player.machine().telemetry().sample_count(), 0);
        assert_eq!(player.machine().telemetry().average_speed(), 0.0);
    }

    #[test]
    fn test_bump_sets_velocity() {
        let mut world = PhysicsWorld::new();
        let mut player = spawn(&mut world);
        player.bump(&mut world, Vec2::new(0.0, 12.0)).unwrap();
        assert_eq!(player.state(), MovementState::Bumping);
        assert_eq!(player.velocity(&mut world).unwrap(), Vec2::new(0.0, 12.0));
    }
}
