// Jump ability

use glam::Vec2;
use log::debug;

use crate::engine::physics::CharacterBody;

use super::force::{ForceApplier, ForceBudget, MotionContext};
use super::settings::JumpSettings;

/// Vertical velocity change that reaches `height` under `gravity * gravity_scale`.
///
/// A negative height gives a downward impulse of the same magnitude.
pub fn jump_impulse(height: f32, gravity_scale: f32, gravity: f32) -> f32 {
    let magnitude = (2.0 * height.abs() * gravity_scale * gravity.abs()).sqrt();
    if height < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Vertical impulse with a height bonus when jumping out of a fast fall
#[derive(Debug, Clone)]
pub struct Jump {
    settings: JumpSettings,
    budget: ForceBudget,
}

impl Jump {
    pub fn new(settings: JumpSettings) -> Self {
        let budget = ForceBudget::new(settings.max_forces);
        Self { settings, budget }
    }

    pub fn settings(&self) -> &JumpSettings {
        &self.settings
    }

    /// Apex height for the current telemetry
    pub fn target_height(&self, context: &MotionContext) -> f32 {
        let telemetry = context.telemetry;
        if telemetry.movement_direction().down
            && telemetry.average_speed() > self.settings.bonus_speed_threshold
        {
            self.settings.height + self.settings.bonus_height_when_falling
        } else {
            self.settings.height
        }
    }
}

impl ForceApplier for Jump {
    fn name(&self) -> &'static str {
        "jump"
    }

    fn budget(&self) -> &ForceBudget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut ForceBudget {
        &mut self.budget
    }

    fn apply_force(&mut self, body: &mut dyn CharacterBody, context: &MotionContext) {
        let height = self.target_height(context);

        // Stacked jumps never inherit the fall speed
        let mut velocity = body.velocity();
        velocity.y = 0.0;
        body.set_velocity(velocity);

        let impulse = jump_impulse(height, self.settings.gravity_scale, context.gravity);
        debug!("Jump: height {:.2}, impulse {:.3}", height, impulse);
        body.add_velocity_change(Vec2::new(0.0, impulse));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::characters::displacement::DisplacementEstimator;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct TestBody {
        position: Vec2,
        velocity: Vec2,
        trigger: bool,
    }

    impl CharacterBody for TestBody {
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

    fn falling_telemetry(speed: f32) -> DisplacementEstimator {
        let mut telemetry = DisplacementEstimator::default();
        telemetry.update(Vec2::ZERO, 0.1);
        telemetry.update(Vec2::new(0.0, -speed * 0.1), 0.1);
        telemetry
    }

    #[test]
    fn test_impulse_for_default_jump() {
        assert_relative_eq!(jump_impulse(3.0, 5.0, -9.81), 17.155, epsilon = 1e-3);
    }

    #[test]
    fn test_impulse_grows_with_height() {
        let mut previous = 0.0;
        for step in 1..20 {
            let impulse = jump_impulse(step as f32 * 0.5, 5.0, -9.81);
            assert!(impulse > previous);
            previous = impulse;
        }
    }

    #[test]
    fn test_negative_height_pushes_down() {
        assert_relative_eq!(jump_impulse(-3.0, 5.0, -9.81), -17.155, epsilon = 1e-3);
    }

    #[test]
    fn test_apply_keeps_horizontal_velocity() {
        let mut jump = Jump::new(JumpSettings::default());
        let telemetry = DisplacementEstimator::default();
        let context = MotionContext {
            last_movement_direction: 1,
            gravity: -9.81,
            telemetry: &telemetry,
        };
        let mut body = TestBody {
            velocity: Vec2::new(4.0, -20.0),
            ..Default::default()
        };

        assert!(jump.try_apply_force(&mut body, &context));
        assert_eq!(body.velocity.x, 4.0);
        assert_relative_eq!(body.velocity.y, 17.155, epsilon = 1e-3);
        assert_eq!(jump.budget().used(), 1);

        // Budget of one: a second jump is refused without touching the body
        body.velocity = Vec2::new(4.0, -5.0);
        assert!(!jump.try_apply_force(&mut body, &context));
        assert_eq!(body.velocity, Vec2::new(4.0, -5.0));
    }

    #[test]
    fn test_bonus_height_when_falling_fast() {
        let jump = Jump::new(JumpSettings::default());

        let fast = falling_telemetry(15.0);
        let context = MotionContext {
            last_movement_direction: 1,
            gravity: -9.81,
            telemetry: &fast,
        };
        assert_relative_eq!(jump.target_height(&context), 4.0);

        let slow = falling_telemetry(5.0);
        let context = MotionContext {
            telemetry: &slow,
            ..context
        };
        assert_relative_eq!(jump.target_height(&context), 3.0);
    }

    #[test]
    fn test_no_bonus_when_rising_fast() {
        let jump = Jump::new(JumpSettings::default());
        let mut telemetry = DisplacementEstimator::default();
        telemetry.update(Vec2::ZERO, 0.1);
        telemetry.update(Vec2::new(0.0, 2.0), 0.1);
        let context = MotionContext {
            last_movement_direction: -1,
            gravity: -9.81,
            telemetry: &telemetry,
        };
        assert_relative_eq!(jump.target_height(&context), 3.0);
    }
}
