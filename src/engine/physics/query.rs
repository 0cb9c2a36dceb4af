// Engine-agnostic physics capabilities consumed by the character controller

use glam::Vec2;

use super::collision::LayerMask;

/// A single ray intersection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RayHit {
    /// World position of the hit point
    pub point: Vec2,
    /// Surface normal at the hit point (unit length, pointing away from the surface)
    pub normal: Vec2,
    /// Distance from the ray origin
    pub distance: f32,
}

impl RayHit {
    pub fn new(point: Vec2, normal: Vec2, distance: f32) -> Self {
        Self {
            point,
            normal,
            distance,
        }
    }
}

/// Ray casting against level geometry
pub trait RayCaster {
    /// Every hit along the ray within `max_distance`, nearest first.
    ///
    /// Trigger-only colliders and the caster's own body are never reported.
    fn cast_ray_all(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit>;
}

/// The rigid body the controller drives
pub trait CharacterBody {
    fn position(&self) -> Vec2;

    /// Teleport the body without touching its velocity
    fn set_position(&mut self, position: Vec2);

    fn velocity(&self) -> Vec2;

    fn set_velocity(&mut self, velocity: Vec2);

    /// Mass-independent impulse: adds `delta` to the current velocity
    fn add_velocity_change(&mut self, delta: Vec2) {
        let velocity = self.velocity();
        self.set_velocity(velocity + delta);
    }

    /// Switch the character collider between solid and trigger-only
    fn set_trigger(&mut self, is_trigger: bool);

    fn is_trigger(&self) -> bool;
}

/// Everything a controller tick needs from the physics engine
pub trait CharacterPhysics: CharacterBody + RayCaster {}

impl<T: CharacterBody + RayCaster> CharacterPhysics for T {}
