// Bridges a rapier body/collider pair to the controller's physics traits

use glam::Vec2;
use rapier2d::prelude::*;

use super::collision::LayerMask;
use super::query::{CharacterBody, RayCaster, RayHit};
use super::world::{ColliderHandle, PhysicsWorld, RigidBodyHandle};
use crate::error::{ControllerError, Result};

/// Mutable view of one character inside a [`PhysicsWorld`].
///
/// Built fresh for each tick; ray casts ignore the character's own body.
pub struct RapierCharacter<'w> {
    world: &'w mut PhysicsWorld,
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

impl<'w> RapierCharacter<'w> {
    /// Fails if either handle is missing from the world
    pub fn new(
        world: &'w mut PhysicsWorld,
        body: RigidBodyHandle,
        collider: ColliderHandle,
    ) -> Result<Self> {
        if world.get_rigid_body(body).is_none() || world.get_collider(collider).is_none() {
            return Err(ControllerError::MissingBody);
        }
        Ok(Self {
            world,
            body,
            collider,
        })
    }

    pub fn world(&self) -> &PhysicsWorld {
        self.world
    }

    fn body(&self) -> Option<&RigidBody> {
        self.world.get_rigid_body(self.body)
    }

    fn body_mut(&mut self) -> Option<&mut RigidBody> {
        self.world.get_rigid_body_mut(self.body)
    }
}

impl RayCaster for RapierCharacter<'_> {
    fn cast_ray_all(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit> {
        self.world
            .raycast_all(origin, direction, max_distance, layers, Some(self.body))
    }
}

impl CharacterBody for RapierCharacter<'_> {
    fn position(&self) -> Vec2 {
        self.body()
            .map(|body| Vec2::new(body.translation().x, body.translation().y))
            .unwrap_or_default()
    }

    fn set_position(&mut self, position: Vec2) {
        if let Some(body) = self.body_mut() {
            body.set_translation(vector![position.x, position.y], true);
        }
    }

    fn velocity(&self) -> Vec2 {
        self.body()
            .map(|body| Vec2::new(body.linvel().x, body.linvel().y))
            .unwrap_or_default()
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        if let Some(body) = self.body_mut() {
            body.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    fn set_trigger(&mut self, is_trigger: bool) {
        if let Some(collider) = self.world.get_collider_mut(self.collider) {
            collider.set_sensor(is_trigger);
        }
    }

    fn is_trigger(&self) -> bool {
        self.world
            .get_collider(self.collider)
            .map(|collider| collider.is_sensor())
            .unwrap_or(false)
    }
}
