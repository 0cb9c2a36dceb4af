use super::collision::CollisionLayer;
use rapier2d::prelude::*;

/// Builder for creating rigid bodies with common configurations
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Isometry<Real>,
    gravity_scale: Real,
    can_sleep: bool,
    locked_axes: LockedAxes,
    ccd: bool,
}

impl BodyBuilder {
    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Isometry::identity(),
            gravity_scale: 1.0,
            can_sleep: true,
            locked_axes: LockedAxes::empty(),
            ccd: false,
        }
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            position: Isometry::identity(),
            gravity_scale: 0.0,
            can_sleep: false,
            locked_axes: LockedAxes::empty(),
            ccd: false,
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: Real, y: Real) -> Self {
        self.position = Isometry::translation(x, y);
        self
    }

    /// Set the gravity scale (1.0 = normal gravity, 0.0 = no gravity)
    pub fn gravity_scale(mut self, scale: Real) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Set whether the body can sleep when inactive
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Lock rotation (characters never tip over)
    pub fn lock_rotation(mut self) -> Self {
        self.locked_axes = LockedAxes::ROTATION_LOCKED;
        self
    }

    /// Continuous collision detection, for bodies that dash through thin geometry
    pub fn ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        RigidBodyBuilder::new(self.body_type)
            .position(self.position)
            .gravity_scale(self.gravity_scale)
            .can_sleep(self.can_sleep)
            .locked_axes(self.locked_axes)
            .ccd_enabled(self.ccd)
            .build()
    }
}

/// Builder for creating colliders with common configurations
pub struct ColliderBuilder2D {
    shape: SharedShape,
    layer: CollisionLayer,
    offset: Vector<Real>,
    is_sensor: bool,
    friction: Real,
    restitution: Real,
    density: Real,
}

impl ColliderBuilder2D {
    fn with_shape(shape: SharedShape) -> Self {
        Self {
            shape,
            layer: CollisionLayer::Default,
            offset: Vector::zeros(),
            is_sensor: false,
            friction: 0.5,
            restitution: 0.0,
            density: 1.0,
        }
    }

    /// Create a box-shaped collider
    pub fn box_shape(half_width: Real, half_height: Real) -> Self {
        Self::with_shape(SharedShape::cuboid(half_width, half_height))
    }

    /// Create a collider from a convex polygon (ramps and slopes)
    pub fn convex_hull(points: &[[Real; 2]]) -> Option<Self> {
        let points: Vec<_> = points.iter().map(|p| point![p[0], p[1]]).collect();
        SharedShape::convex_hull(&points).map(Self::with_shape)
    }

    /// Set the collision layer
    pub fn layer(mut self, layer: CollisionLayer) -> Self {
        self.layer = layer;
        self
    }

    /// Offset the shape relative to its parent body
    pub fn offset(mut self, x: Real, y: Real) -> Self {
        self.offset = vector![x, y];
        self
    }

    /// Make this a sensor (detects collisions but doesn't cause physical response)
    pub fn sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    pub fn restitution(mut self, restitution: Real) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn density(mut self, density: Real) -> Self {
        self.density = density;
        self
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        ColliderBuilder::new(self.shape)
            .translation(self.offset)
            .collision_groups(self.layer.to_interaction_groups())
            .sensor(self.is_sensor)
            .friction(self.friction)
            .restitution(self.restitution)
            .density(self.density)
            .build()
    }
}

/// Common rigid body configurations for the platformer
pub mod presets {
    use super::*;

    /// Character body: dynamic, rotation locked, never sleeps.
    ///
    /// Gravity is integrated by the movement state machine, so rapier's own
    /// gravity is disabled for it.
    pub fn character_body(x: Real, y: Real) -> RigidBody {
        BodyBuilder::new_dynamic()
            .position(x, y)
            .lock_rotation()
            .gravity_scale(0.0)
            .can_sleep(false)
            .ccd(true)
            .build()
    }

    /// Cube collider whose bottom edge sits on the body origin
    pub fn character_collider(width: Real, height: Real) -> Collider {
        ColliderBuilder2D::box_shape(width / 2.0, height / 2.0)
            .offset(0.0, height / 2.0)
            .layer(CollisionLayer::Player)
            .friction(0.0)
            .restitution(0.0)
            .build()
    }

    /// Static level geometry body
    pub fn level_body(x: Real, y: Real) -> RigidBody {
        BodyBuilder::new_fixed().position(x, y).build()
    }

    /// Box collider for floors, walls and ledges
    pub fn level_collider(width: Real, height: Real) -> Collider {
        ColliderBuilder2D::box_shape(width / 2.0, height / 2.0)
            .layer(CollisionLayer::Level)
            .friction(0.3)
            .build()
    }

    /// Ramp rising from `(0, 0)` to `(width, height)` in body space
    pub fn slope_collider(width: Real, height: Real) -> Option<Collider> {
        ColliderBuilder2D::convex_hull(&[[0.0, 0.0], [width, 0.0], [width, height]])
            .map(|builder| builder.layer(CollisionLayer::Level).friction(0.3).build())
    }

    /// Trigger volume (pickups, bumpers, kill zones)
    pub fn trigger_collider(width: Real, height: Real) -> Collider {
        ColliderBuilder2D::box_shape(width / 2.0, height / 2.0)
            .layer(CollisionLayer::Trigger)
            .sensor(true)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_preset() {
        let body = presets::character_body(1.0, 2.0);
        let collider = presets::character_collider(1.0, 2.0);

        assert_eq!(body.body_type(), RigidBodyType::Dynamic);
        assert!(body.is_rotation_locked());
        assert_eq!(body.gravity_scale(), 0.0);
        assert_eq!(body.translation().x, 1.0);
        assert!(!collider.is_sensor());
        assert_eq!(collider.friction(), 0.0);
    }

    #[test]
    fn test_level_collider_is_solid() {
        let collider = presets::level_collider(10.0, 1.0);
        assert!(!collider.is_sensor());
        assert_eq!(collider.friction(), 0.3);
    }

    #[test]
    fn test_trigger_collider_is_sensor() {
        assert!(presets::trigger_collider(1.0, 1.0).is_sensor());
    }

    #[test]
    fn test_slope_collider_builds() {
        assert!(presets::slope_collider(4.0, 2.0).is_some());
    }
}
