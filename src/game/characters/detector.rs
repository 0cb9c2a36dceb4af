// Multi-ray probing of the geometry around the character
//
// Hits are classified by their normal: floor above the slope threshold, wall
// below it, and slope whenever the normal is neither axis aligned.

use glam::Vec2;
use log::trace;

use crate::core::math::{approx_equal, NORMAL_EPSILON};
use crate::engine::physics::{RayCaster, RayHit};

use super::settings::ProbeSettings;

/// A ray fixed to the character, with a temporarily overridable length
#[derive(Debug, Clone, PartialEq)]
pub struct Raycaster {
    offset: Vec2,
    direction: Vec2,
    max_distance: f32,
    cached_max_distance: Option<f32>,
}

impl Raycaster {
    pub fn new(offset: Vec2, direction: Vec2, max_distance: f32) -> Self {
        Self {
            offset,
            direction,
            max_distance,
            cached_max_distance: None,
        }
    }

    pub fn origin(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Override the length, remembering the configured one the first time
    pub fn set_max_distance(&mut self, max_distance: f32) {
        if self.cached_max_distance.is_none() {
            self.cached_max_distance = Some(self.max_distance);
        }
        self.max_distance = max_distance;
    }

    /// Restore the configured length
    pub fn reset_max_distance(&mut self) {
        if let Some(cached) = self.cached_max_distance.take() {
            self.max_distance = cached;
        }
    }

    pub fn cast_all<R: RayCaster + ?Sized>(
        &self,
        physics: &R,
        position: Vec2,
        settings: &ProbeSettings,
    ) -> Vec<RayHit> {
        physics.cast_ray_all(
            self.origin(position),
            self.direction,
            self.max_distance,
            settings.layers,
        )
    }
}

/// First hit whose normal marks it as a wall
pub fn first_wall(hits: &[RayHit], threshold: f32) -> Option<RayHit> {
    hits.iter().copied().find(|hit| hit.normal.y < threshold)
}

/// First hit whose normal marks it as walkable floor
pub fn first_floor(hits: &[RayHit], threshold: f32) -> Option<RayHit> {
    hits.iter().copied().find(|hit| hit.normal.y > threshold)
}

/// First hit whose normal is neither vertical nor horizontal
pub fn first_slope(hits: &[RayHit]) -> Option<RayHit> {
    hits.iter().copied().find(|hit| {
        let lateral = hit.normal.x.abs();
        !approx_equal(lateral, 0.0, NORMAL_EPSILON) && !approx_equal(lateral, 1.0, NORMAL_EPSILON)
    })
}

/// True when a wall normal is perfectly horizontal, i.e. grabbable
pub fn is_straight_wall(normal: Vec2) -> bool {
    approx_equal(normal.x.abs(), 1.0, NORMAL_EPSILON)
}

#[derive(Debug, Clone)]
struct SideRays {
    top: Raycaster,
    mid: Raycaster,
    bottom: Raycaster,
    step: Raycaster,
}

impl SideRays {
    fn new(settings: &ProbeSettings, direction: Vec2) -> Self {
        let ray = |height: f32| {
            Raycaster::new(Vec2::new(0.0, height), direction, settings.wall_ray_length)
        };
        Self {
            top: ray(settings.wall_ray_top),
            mid: ray(settings.wall_ray_mid),
            bottom: ray(settings.wall_ray_bottom),
            step: ray(settings.step_ray_height),
        }
    }

    fn all_mut(&mut self) -> [&mut Raycaster; 4] {
        [&mut self.top, &mut self.mid, &mut self.bottom, &mut self.step]
    }

    fn probe<R: RayCaster + ?Sized>(
        &self,
        physics: &R,
        position: Vec2,
        settings: &ProbeSettings,
    ) -> SideProbe {
        let threshold = settings.slope_normal_threshold;
        let mut side = SideProbe::default();

        // Priority order: top, bottom, mid
        for (index, ray) in [&self.top, &self.bottom, &self.mid].into_iter().enumerate() {
            let hits = ray.cast_all(physics, position, settings);
            if hits.is_empty() {
                continue;
            }
            if let Some(wall) = first_wall(&hits, threshold) {
                side.wall.get_or_insert(wall);
                if index == 1 {
                    side.bottom_is_wall = true;
                }
            } else if let Some(slope) = first_slope(&hits) {
                side.slope.get_or_insert(slope);
            }
        }

        let step_hits = self.step.cast_all(physics, position, settings);
        side.step_is_wall = first_wall(&step_hits, threshold).is_some();
        side
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SideProbe {
    wall: Option<RayHit>,
    slope: Option<RayHit>,
    bottom_is_wall: bool,
    step_is_wall: bool,
}

impl SideProbe {
    fn normal(&self) -> Vec2 {
        self.wall
            .or(self.slope)
            .map(|hit| hit.normal)
            .unwrap_or(Vec2::ZERO)
    }

    /// A low obstacle the character can climb: the bottom ray sees a wall
    /// but the step ray above it is clear
    fn can_step_up(&self) -> bool {
        self.bottom_is_wall && !self.step_is_wall
    }
}

/// Result of one wall/slope probe, not yet applied to the detector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WallProbe {
    /// Height the character should snap to when climbing a low ledge.
    ///
    /// When set, the rest of the probe is discarded.
    pub step_up: Option<f32>,
    pub has_wall_in_front: bool,
    pub has_wall_behind: bool,
    pub has_slope_nearby: bool,
    /// Normal of the wall or slope in the facing direction
    pub wall_normal: Vec2,
    pub slope_normal: Vec2,
    pub wall_hit: Option<RayHit>,
    pub slope_hit: Option<RayHit>,
}

/// Latest collision information, overwritten by each probe
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionProbeResult {
    pub ground_normal: Vec2,
    pub wall_normal: Vec2,
    pub slope_normal: Vec2,
    pub has_wall_in_front: bool,
    pub has_wall_behind: bool,
    pub has_slope_nearby: bool,
    pub last_wall_hit: Option<RayHit>,
    pub last_slope_hit: Option<RayHit>,
}

/// Classifies nearby geometry as ground, wall or slope using fixed rays
#[derive(Debug, Clone)]
pub struct GroundWallSlopeDetector {
    settings: ProbeSettings,
    front_ground: Raycaster,
    back_ground: Raycaster,
    right: SideRays,
    left: SideRays,
    result: CollisionProbeResult,
}

impl GroundWallSlopeDetector {
    pub fn new(settings: ProbeSettings) -> Self {
        let ground = |x: f32| {
            Raycaster::new(
                Vec2::new(x, settings.ground_ray_height),
                Vec2::NEG_Y,
                settings.ground_ray_length,
            )
        };
        let front_ground = ground(settings.ground_ray_spread);
        let back_ground = ground(-settings.ground_ray_spread);
        let right = SideRays::new(&settings, Vec2::X);
        let left = SideRays::new(&settings, Vec2::NEG_X);
        Self {
            settings,
            front_ground,
            back_ground,
            right,
            left,
            result: CollisionProbeResult::default(),
        }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    pub fn result(&self) -> &CollisionProbeResult {
        &self.result
    }

    pub fn ground_normal(&self) -> Vec2 {
        self.result.ground_normal
    }

    pub fn wall_normal(&self) -> Vec2 {
        self.result.wall_normal
    }

    pub fn has_wall_in_front(&self) -> bool {
        self.result.has_wall_in_front
    }

    pub fn has_wall_behind(&self) -> bool {
        self.result.has_wall_behind
    }

    pub fn has_slope_nearby(&self) -> bool {
        self.result.has_slope_nearby
    }

    /// Probe both sides for walls and slopes without changing anything.
    ///
    /// `direction` is the facing direction (-1 or 1) and decides which side
    /// is "in front".
    pub fn probe_walls<R: RayCaster + ?Sized>(
        &self,
        physics: &R,
        position: Vec2,
        direction: i32,
    ) -> WallProbe {
        let right = self.right.probe(physics, position, &self.settings);
        let left = self.left.probe(physics, position, &self.settings);
        let (front, back) = if direction > 0 {
            (right, left)
        } else {
            (left, right)
        };

        if front.can_step_up() {
            let height = position.y + self.settings.step_ray_height;
            trace!("Step-up to y = {:.3}", height);
            return WallProbe {
                step_up: Some(height),
                ..WallProbe::default()
            };
        }

        let probe = WallProbe {
            step_up: None,
            has_wall_in_front: front.wall.is_some(),
            has_wall_behind: back.wall.is_some(),
            has_slope_nearby: front.slope.is_some(),
            wall_normal: front.normal(),
            slope_normal: front.slope.map(|hit| hit.normal).unwrap_or(Vec2::ZERO),
            wall_hit: front.wall,
            slope_hit: front.slope,
        };
        trace!(
            "Wall probe: front {} behind {} slope {} normal {:?}",
            probe.has_wall_in_front,
            probe.has_wall_behind,
            probe.has_slope_nearby,
            probe.wall_normal
        );
        probe
    }

    /// Store a probe as the current wall/slope state. Step-up probes are
    /// ignored; the previous wall state stays.
    pub fn record(&mut self, probe: &WallProbe) {
        if probe.step_up.is_some() {
            return;
        }
        self.result.has_wall_in_front = probe.has_wall_in_front;
        self.result.has_wall_behind = probe.has_wall_behind;
        self.result.has_slope_nearby = probe.has_slope_nearby;
        self.result.wall_normal = probe.wall_normal;
        self.result.slope_normal = probe.slope_normal;
        self.result.last_wall_hit = probe.wall_hit;
        self.result.last_slope_hit = probe.slope_hit;
    }

    /// Look for walkable floor under the character, front ray first.
    ///
    /// Updates the ground normal (zero when airborne).
    pub fn check_ground<R: RayCaster + ?Sized>(&mut self, physics: &R, position: Vec2) -> bool {
        let threshold = self.settings.slope_normal_threshold;
        let floor = first_floor(
            &self.front_ground.cast_all(physics, position, &self.settings),
            threshold,
        )
        .or_else(|| {
            first_floor(
                &self.back_ground.cast_all(physics, position, &self.settings),
                threshold,
            )
        });

        self.result.ground_normal = floor.map(|hit| hit.normal).unwrap_or(Vec2::ZERO);
        floor.is_some()
    }

    /// Horizontal position that puts the character's leading edge against
    /// the last wall hit
    pub fn replacement_x(&self, direction: i32) -> Option<f32> {
        let hit = self.result.last_wall_hit?;
        let extent = self.settings.half_extent;
        Some(if direction > 0 {
            hit.point.x - extent
        } else {
            hit.point.x + extent
        })
    }

    /// Lengthen every wall and step ray
    pub fn set_max_distance(&mut self, max_distance: f32) {
        for side in [&mut self.right, &mut self.left] {
            for ray in side.all_mut() {
                ray.set_max_distance(max_distance);
            }
        }
    }

    pub fn reset_max_distance(&mut self) {
        for side in [&mut self.right, &mut self.left] {
            for ray in side.all_mut() {
                ray.reset_max_distance();
            }
        }
    }

    /// Current wall ray length
    pub fn wall_ray_length(&self) -> f32 {
        self.right.mid.max_distance()
    }

    /// Forget the stored normals
    pub fn reset_current_values(&mut self) {
        self.result.ground_normal = Vec2::ZERO;
        self.result.wall_normal = Vec2::ZERO;
        self.result.slope_normal = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::characters::test_world::TestWorld;
    use approx::assert_relative_eq;

    fn detector() -> GroundWallSlopeDetector {
        GroundWallSlopeDetector::new(ProbeSettings::default())
    }

    fn hit(normal: Vec2) -> RayHit {
        RayHit::new(Vec2::ZERO, normal, 1.0)
    }

    #[test]
    fn test_classification() {
        let floor = hit(Vec2::Y);
        let wall = hit(Vec2::NEG_X);
        let slope = hit(Vec2::new(-0.6, 0.8));
        let steep = hit(Vec2::new(-0.8, 0.6));

        assert!(first_floor(&[floor], 0.7).is_some());
        assert!(first_wall(&[floor], 0.7).is_none());
        assert!(first_wall(&[wall], 0.7).is_some());
        assert!(first_slope(&[wall, floor]).is_none());
        assert!(first_slope(&[slope]).is_some());
        assert!(first_floor(&[slope], 0.7).is_some());
        // Too steep to walk: a wall, but not a grabbable one
        assert!(first_wall(&[steep], 0.7).is_some());
        assert!(!is_straight_wall(steep.normal));
        assert!(is_straight_wall(wall.normal));
    }

    #[test]
    fn test_first_matching_hit_wins() {
        let hits = [hit(Vec2::Y), hit(Vec2::X), hit(Vec2::NEG_X)];
        assert_eq!(first_wall(&hits, 0.7).map(|h| h.normal), Some(Vec2::X));
    }

    #[test]
    fn test_ground_on_flat_floor() {
        let world = TestWorld::with_floor();
        let mut detector = detector();
        assert!(detector.check_ground(&world, world.position));
        assert_eq!(detector.ground_normal(), Vec2::Y);
    }

    #[test]
    fn test_no_ground_in_the_air() {
        let world = TestWorld::with_floor().at(Vec2::new(0.0, 1.0));
        let mut detector = detector();
        assert!(!detector.check_ground(&world, world.position));
        assert_eq!(detector.ground_normal(), Vec2::ZERO);
    }

    #[test]
    fn test_back_ray_catches_ledge() {
        // Floor ends under the character: only the back ray is over ground
        let mut world = TestWorld::empty();
        world.add_block(Vec2::new(-10.0, -1.0), Vec2::new(0.0, 0.0));
        let mut detector = detector();
        assert!(detector.check_ground(&world, Vec2::ZERO));
    }

    #[test]
    fn test_wall_in_front_and_behind() {
        let mut world = TestWorld::with_floor();
        world.add_wall(0.55);
        let detector = detector();

        let probe = detector.probe_walls(&world, Vec2::ZERO, 1);
        assert!(probe.has_wall_in_front);
        assert!(!probe.has_wall_behind);
        assert_eq!(probe.wall_normal, Vec2::NEG_X);

        let probe = detector.probe_walls(&world, Vec2::ZERO, -1);
        assert!(!probe.has_wall_in_front);
        assert!(probe.has_wall_behind);
        assert_eq!(probe.wall_normal, Vec2::ZERO);
    }

    #[test]
    fn test_record_and_replacement() {
        let mut world = TestWorld::with_floor();
        world.add_wall(0.55);
        let mut detector = detector();

        let probe = detector.probe_walls(&world, Vec2::ZERO, 1);
        detector.record(&probe);
        assert!(detector.has_wall_in_front());
        assert_relative_eq!(detector.replacement_x(1).unwrap(), 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_low_ledge_triggers_step_up() {
        let mut world = TestWorld::with_floor();
        // 0.2 high step in front of the character
        world.add_block(Vec2::new(0.55, 0.0), Vec2::new(3.0, 0.2));
        let mut detector = detector();

        let probe = detector.probe_walls(&world, Vec2::ZERO, 1);
        assert_eq!(probe.step_up, Some(0.35));

        // The stored state is left alone
        detector.record(&probe);
        assert!(!detector.has_wall_in_front());
    }

    #[test]
    fn test_tall_wall_does_not_step_up() {
        let mut world = TestWorld::with_floor();
        world.add_wall(0.55);
        let probe = detector().probe_walls(&world, Vec2::ZERO, 1);
        assert_eq!(probe.step_up, None);
    }

    #[test]
    fn test_slope_detection() {
        let mut world = TestWorld::with_floor();
        // 45 degree ramp crossing the bottom ray in front
        world.add_slope(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0));
        let probe = detector().probe_walls(&world, Vec2::new(0.3, 0.3), 1);
        assert!(probe.has_slope_nearby);
        assert!(!probe.has_wall_in_front);
        assert!(probe.slope_hit.is_some());
        assert_relative_eq!(probe.slope_normal.x, -std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn test_max_distance_override() {
        let mut world = TestWorld::with_floor();
        world.add_wall(5.0);
        let mut detector = detector();
        assert!(!detector.probe_walls(&world, Vec2::ZERO, 1).has_wall_in_front);

        detector.set_max_distance(10.0);
        assert_eq!(detector.wall_ray_length(), 10.0);
        assert!(detector.probe_walls(&world, Vec2::ZERO, 1).has_wall_in_front);

        detector.set_max_distance(12.0);
        detector.reset_max_distance();
        assert_eq!(detector.wall_ray_length(), 0.6);
    }
}
