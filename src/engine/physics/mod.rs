// Physics system using rapier2d

mod adapter;
pub mod body;
mod collision;
mod query;
mod world;

pub use adapter::RapierCharacter;
pub use body::{presets, BodyBuilder, ColliderBuilder2D};
pub use collision::{CollisionLayer, LayerMask};
pub use query::{CharacterBody, CharacterPhysics, RayCaster, RayHit};
pub use world::{ColliderHandle, PhysicsWorld, RigidBodyHandle, PHYSICS_TIMESTEP};

// Re-export commonly used rapier types for convenience
pub use rapier2d::prelude::{Real, Vector};
