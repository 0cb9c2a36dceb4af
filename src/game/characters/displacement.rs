// Displacement telemetry
// Velocity derived from actual position deltas, which unlike the body's
// velocity already includes collision resolution.

use std::collections::VecDeque;

use glam::Vec2;

use crate::core::math::approx_equal;

/// Number of non-zero speed samples averaged by default
pub const DEFAULT_CAPACITY: usize = 20;

const STILL_SPEED: f32 = 1e-5;

/// Directions a velocity points along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementDirection {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

impl MovementDirection {
    pub fn from_velocity(velocity: Vec2) -> Self {
        Self {
            up: velocity.y > 0.0,
            right: velocity.x > 0.0,
            down: velocity.y < 0.0,
            left: velocity.x < 0.0,
        }
    }

    pub fn up_right(&self) -> bool {
        self.up && self.right
    }

    pub fn down_right(&self) -> bool {
        self.down && self.right
    }

    pub fn down_left(&self) -> bool {
        self.down && self.left
    }

    pub fn up_left(&self) -> bool {
        self.up && self.left
    }
}

/// Rolling estimate of how the character actually moved
#[derive(Debug, Clone)]
pub struct DisplacementEstimator {
    capacity: usize,
    speeds: VecDeque<f32>,
    last_position: Option<Vec2>,
    delta_position: Vec2,
    velocity: Vec2,
    average_speed: f32,
}

impl Default for DisplacementEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DisplacementEstimator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            speeds: VecDeque::with_capacity(capacity + 1),
            last_position: None,
            delta_position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            average_speed: 0.0,
        }
    }

    /// Record the position reached after a physics step.
    ///
    /// The oldest sample is dropped when the window overflows, and also on
    /// every still frame so the average decays towards zero at rest.
    pub fn update(&mut self, position: Vec2, dt: f32) {
        let delta = self
            .last_position
            .map(|last| position - last)
            .unwrap_or(Vec2::ZERO);
        let velocity = if dt > 0.0 { delta / dt } else { Vec2::ZERO };
        let speed = velocity.length();

        let moving = !approx_equal(speed, 0.0, STILL_SPEED);
        if moving {
            self.speeds.push_back(speed);
        }
        let count = self.speeds.len();
        if count > 0 && (count > self.capacity || !moving) {
            self.speeds.pop_front();
        }

        // Divided by the count before eviction
        self.average_speed = if count > 0 {
            self.speeds.iter().sum::<f32>() / count as f32
        } else {
            0.0
        };

        self.last_position = Some(position);
        self.delta_position = delta;
        self.velocity = velocity;
    }

    /// Forget all history, e.g. after a teleport
    pub fn reset(&mut self, position: Vec2) {
        self.speeds.clear();
        self.last_position = Some(position);
        self.delta_position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.average_speed = 0.0;
    }

    pub fn delta_position(&self) -> Vec2 {
        self.delta_position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn average_speed(&self) -> f32 {
        self.average_speed
    }

    pub fn movement_direction(&self) -> MovementDirection {
        MovementDirection::from_velocity(self.velocity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently averaged
    pub fn sample_count(&self) -> usize {
        self.speeds.len()
    }
}
