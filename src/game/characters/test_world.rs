// Analytic level used by the controller tests: axis-aligned blocks plus
// one-sided slope segments, and a character body integrated by hand

use glam::Vec2;

use crate::engine::physics::{CharacterBody, LayerMask, RayCaster, RayHit};

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: Vec2,
    b: Vec2,
}

impl Segment {
    fn intersect(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let edge = self.b - self.a;
        let denom = direction.perp_dot(edge);
        if denom.abs() < 1e-6 {
            return None;
        }
        let to_start = self.a - origin;
        let t = to_start.perp_dot(edge) / denom;
        let s = to_start.perp_dot(direction) / denom;
        if !(0.0..=max_distance).contains(&t) || !(0.0..=1.0).contains(&s) {
            return None;
        }
        let mut normal = edge.perp().normalize();
        if normal.dot(direction) > 0.0 {
            normal = -normal;
        }
        Some(RayHit::new(origin + direction * t, normal, t))
    }
}

#[derive(Debug, Clone, Copy)]
struct Block {
    min: Vec2,
    max: Vec2,
}

impl Block {
    fn edges(&self) -> [Segment; 4] {
        let (min, max) = (self.min, self.max);
        [
            Segment { a: Vec2::new(min.x, max.y), b: max },
            Segment { a: min, b: Vec2::new(max.x, min.y) },
            Segment { a: min, b: Vec2::new(min.x, max.y) },
            Segment { a: Vec2::new(max.x, min.y), b: max },
        ]
    }
}

/// Character body plus static level, with feet at `position`
pub struct TestWorld {
    pub position: Vec2,
    pub velocity: Vec2,
    pub trigger: bool,
    pub half_extent: f32,
    pub height: f32,
    blocks: Vec<Block>,
    slopes: Vec<Segment>,
}

impl TestWorld {
    pub fn empty() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            trigger: false,
            half_extent: 0.5,
            height: 2.0,
            blocks: Vec::new(),
            slopes: Vec::new(),
        }
    }

    /// Wide floor whose top surface is y = 0
    pub fn with_floor() -> Self {
        let mut world = Self::empty();
        world.add_block(Vec2::new(-100.0, -1.0), Vec2::new(100.0, 0.0));
        world
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn add_block(&mut self, min: Vec2, max: Vec2) {
        self.blocks.push(Block { min, max });
    }

    /// Tall wall whose face is at `x`, filling the side away from the origin
    pub fn add_wall(&mut self, x: f32) {
        if x >= 0.0 {
            self.add_block(Vec2::new(x, -1.0), Vec2::new(x + 1.0, 20.0));
        } else {
            self.add_block(Vec2::new(x - 1.0, -1.0), Vec2::new(x, 20.0));
        }
    }

    pub fn add_slope(&mut self, a: Vec2, b: Vec2) {
        self.slopes.push(Segment { a, b });
    }

    /// Integrate velocity, then push the character out of blocks unless it is
    /// trigger-only
    pub fn step(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        if self.trigger {
            return;
        }
        for block in &self.blocks {
            let min = Vec2::new(self.position.x - self.half_extent, self.position.y);
            let max = Vec2::new(self.position.x + self.half_extent, self.position.y + self.height);
            let overlap_x = max.x.min(block.max.x) - min.x.max(block.min.x);
            let overlap_y = max.y.min(block.max.y) - min.y.max(block.min.y);
            if overlap_x <= 0.0 || overlap_y <= 0.0 {
                continue;
            }
            if overlap_y <= overlap_x {
                let block_center = (block.min.y + block.max.y) * 0.5;
                if self.position.y + self.height * 0.5 >= block_center {
                    self.position.y += overlap_y;
                } else {
                    self.position.y -= overlap_y;
                }
                self.velocity.y = 0.0;
            } else {
                let block_center = (block.min.x + block.max.x) * 0.5;
                if self.position.x >= block_center {
                    self.position.x += overlap_x;
                } else {
                    self.position.x -= overlap_x;
                }
                self.velocity.x = 0.0;
            }
        }
    }
}

impl RayCaster for TestWorld {
    fn cast_ray_all(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        _layers: LayerMask,
    ) -> Vec<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return Vec::new();
        }
        let mut hits: Vec<RayHit> = self
            .blocks
            .iter()
            .flat_map(|block| block.edges())
            .chain(self.slopes.iter().copied())
            .filter_map(|segment| segment.intersect(origin, direction, max_distance))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

impl CharacterBody for TestWorld {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn set_trigger(&mut self, is_trigger: bool) {
        self.trigger = is_trigger;
    }

    fn is_trigger(&self) -> bool {
        self.trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_hits_floor_top() {
        let world = TestWorld::with_floor();
        let hits = world.cast_ray_all(Vec2::new(0.0, 0.1), Vec2::NEG_Y, 0.2, LayerMask::ALL);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].distance, 0.1, epsilon = 1e-5);
        assert_relative_eq!(hits[0].normal.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_hits_wall_face() {
        let mut world = TestWorld::empty();
        world.add_wall(0.55);
        let hits = world.cast_ray_all(Vec2::new(0.0, 1.0), Vec2::X, 0.6, LayerMask::ALL);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point.x, 0.55, epsilon = 1e-5);
        assert_relative_eq!(hits[0].normal.x, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_step_lands_on_floor() {
        let mut world = TestWorld::with_floor().at(Vec2::new(0.0, 0.05));
        world.velocity = Vec2::new(0.0, -3.0);
        world.step(0.1);
        assert_relative_eq!(world.position.y, 0.0, epsilon = 1e-5);
        assert_eq!(world.velocity.y, 0.0);
    }
}
