use glam::Vec2;
use rapier2d::prelude::*;

use super::collision::LayerMask;
use super::query::RayHit;

/// Handle to identify rigid bodies
pub type RigidBodyHandle = rapier2d::prelude::RigidBodyHandle;

/// Handle to identify colliders
pub type ColliderHandle = rapier2d::prelude::ColliderHandle;

/// Fixed physics timestep (60 Hz)
pub const PHYSICS_TIMESTEP: Real = 1.0 / 60.0;

/// Physics world that manages all physics simulation
pub struct PhysicsWorld {
    /// Gravity vector applied by rapier to bodies with a non-zero gravity scale
    gravity: Vector<Real>,

    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,

    /// Query pipeline for raycasts
    query_pipeline: QueryPipeline,

    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_gravity(vector![0.0, -9.81])
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = PHYSICS_TIMESTEP;

        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
        }
    }

    /// Step the physics simulation forward by one timestep
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Add a rigid body to the physics world
    pub fn add_rigid_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(body)
    }

    /// Add a collider attached to a rigid body
    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent_handle: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent_handle, &mut self.rigid_body_set)
    }

    /// Remove a rigid body and all its attached colliders
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
    }

    /// Get a reference to a rigid body
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Get a mutable reference to a rigid body
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Get a reference to a collider
    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// Get a mutable reference to a collider
    pub fn get_collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.collider_set.get_mut(handle)
    }

    /// Cast a ray and collect every hit, nearest first.
    ///
    /// Sensors are skipped, as are colliders outside `layers` and the
    /// optional excluded body.
    pub fn raycast_all(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: Real,
        layers: LayerMask,
        exclude: Option<RigidBodyHandle>,
    ) -> Vec<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || max_distance <= 0.0 {
            return Vec::new();
        }

        let ray = Ray::new(point![origin.x, origin.y], vector![direction.x, direction.y]);
        let mut filter = QueryFilter::default()
            .exclude_sensors()
            .groups(layers.to_query_groups());
        if let Some(handle) = exclude {
            filter = filter.exclude_rigid_body(handle);
        }

        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            filter,
            |_, intersection| {
                let distance = intersection.time_of_impact;
                let point = origin + direction * distance;
                let normal = Vec2::new(intersection.normal.x, intersection.normal.y);
                hits.push(RayHit::new(point, normal, distance));
                true
            },
        );

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Set gravity for the physics world
    pub fn set_gravity(&mut self, gravity: Vector<Real>) {
        self.gravity = gravity;
    }

    /// Get current gravity
    pub fn gravity(&self) -> Vector<Real> {
        self.gravity
    }

    /// Set the timestep for physics simulation
    pub fn set_timestep(&mut self, dt: Real) {
        self.integration_parameters.dt = dt;
    }

    /// Get the current timestep
    pub fn timestep(&self) -> Real {
        self.integration_parameters.dt
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::body::presets;
    use super::*;
    use approx::assert_relative_eq;

    fn world_with_floor() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        // 20 wide, 1 tall block whose top surface sits at y = 0
        let floor = world.add_rigid_body(presets::level_body(0.0, -0.5));
        world.add_collider(presets::level_collider(20.0, 1.0), floor);
        // Stepping refreshes the query pipeline
        world.step();
        world
    }

    #[test]
    fn test_raycast_all_hits_floor() {
        let world = world_with_floor();
        let hits = world.raycast_all(
            Vec2::new(0.0, 1.0),
            Vec2::NEG_Y,
            5.0,
            LayerMask::WALKABLE,
            None,
        );

        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].distance, 1.0, epsilon = 1e-4);
        assert_relative_eq!(hits[0].point.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(hits[0].normal.y, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_raycast_all_reports_each_collider_distance() {
        let mut world = world_with_floor();
        // Platform whose top surface sits at y = 2
        let platform = world.add_rigid_body(presets::level_body(0.0, 1.75));
        world.add_collider(presets::level_collider(2.0, 0.5), platform);
        world.step();

        let hits = world.raycast_all(
            Vec2::new(0.0, 5.0),
            Vec2::NEG_Y,
            10.0,
            LayerMask::WALKABLE,
            None,
        );

        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 3.0, epsilon = 1e-4);
        assert_relative_eq!(hits[0].point.y, 2.0, epsilon = 1e-4);
        assert_relative_eq!(hits[1].distance, 5.0, epsilon = 1e-4);
        assert_relative_eq!(hits[1].point.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_raycast_all_respects_max_distance() {
        let world = world_with_floor();
        let hits = world.raycast_all(
            Vec2::new(0.0, 1.0),
            Vec2::NEG_Y,
            0.5,
            LayerMask::WALKABLE,
            None,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_raycast_all_filters_layers() {
        let world = world_with_floor();
        let hits = world.raycast_all(
            Vec2::new(0.0, 1.0),
            Vec2::NEG_Y,
            5.0,
            LayerMask::NONE,
            None,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_zero_direction_returns_nothing() {
        let world = world_with_floor();
        assert!(world
            .raycast_all(Vec2::new(0.0, 1.0), Vec2::ZERO, 5.0, LayerMask::ALL, None)
            .is_empty());
    }

    #[test]
    fn test_timestep_default() {
        let world = PhysicsWorld::new();
        assert_relative_eq!(world.timestep(), PHYSICS_TIMESTEP);
    }
}
