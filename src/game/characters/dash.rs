// Dash ability

use glam::Vec2;
use log::debug;

use crate::core::Timer;
use crate::engine::physics::CharacterBody;

use super::force::{ForceApplier, ForceBudget, MotionContext};
use super::settings::DashSettings;

/// Horizontal burst in the facing direction.
///
/// The character collider is trigger-only while a dash is active so thin
/// obstacles do not stop it.
#[derive(Debug, Clone)]
pub struct Dash {
    settings: DashSettings,
    budget: ForceBudget,
    timer: Timer,
    /// Direction of the dash in progress, -1 or 1
    last_direction: i32,
}

impl Dash {
    pub fn new(settings: DashSettings) -> Self {
        Self {
            budget: ForceBudget::new(settings.max_forces),
            timer: Timer::new(settings.duration),
            settings,
            last_direction: 1,
        }
    }

    pub fn settings(&self) -> &DashSettings {
        &self.settings
    }

    /// Direction of the current or last dash
    pub fn last_direction(&self) -> i32 {
        self.last_direction
    }

    pub fn is_dashing(&self) -> bool {
        self.timer.is_running()
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Advance the dash. Returns true once the dash is over.
    pub fn update_timer(&mut self, dt: f32) -> bool {
        self.timer.update(dt)
    }

    /// Cut the dash short, leaving the body as it is
    pub fn stop_timer(&mut self) {
        self.timer.force_finish();
    }

    /// Restore the solid collider and stop all motion
    pub fn end_dash(&mut self, body: &mut dyn CharacterBody) {
        body.set_trigger(false);
        body.set_velocity(Vec2::ZERO);
        self.stop_timer();
    }
}

impl ForceApplier for Dash {
    fn name(&self) -> &'static str {
        "dash"
    }

    fn budget(&self) -> &ForceBudget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut ForceBudget {
        &mut self.budget
    }

    fn apply_force(&mut self, body: &mut dyn CharacterBody, context: &MotionContext) {
        if self.settings.position_offset > 0.0 {
            let position = body.position() + Vec2::new(0.0, self.settings.position_offset);
            body.set_position(position);
        }

        self.last_direction = if context.last_movement_direction >= 0 { 1 } else { -1 };
        body.set_trigger(true);

        body.set_velocity(Vec2::ZERO);
        body.add_velocity_change(Vec2::new(self.last_direction as f32 * self.settings.force, 0.0));

        debug!(
            "Dash: direction {}, force {:.1}",
            self.last_direction, self.settings.force
        );
        self.timer.start();
    }
}
