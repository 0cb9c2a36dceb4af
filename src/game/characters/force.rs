// Consumable abilities: a force that can only be applied a limited number of
// times before the character lands again

use log::trace;

use crate::engine::physics::CharacterBody;

use super::displacement::DisplacementEstimator;

/// Usage counter of a consumable ability.
///
/// `0 <= used <= maximum` holds after every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceBudget {
    enabled: bool,
    maximum: u32,
    used: u32,
}

impl ForceBudget {
    pub fn new(maximum: u32) -> Self {
        Self {
            enabled: true,
            maximum,
            used: 0,
        }
    }

    pub fn can_apply(&self) -> bool {
        self.enabled && self.used < self.maximum
    }

    /// Count one use. Returns false when the budget is exhausted or disabled.
    pub fn consume(&mut self) -> bool {
        if !self.can_apply() {
            return false;
        }
        self.used += 1;
        true
    }

    /// Set how many uses remain, clamped to `[0, maximum]`
    pub fn reset(&mut self, allowed_remaining: i32) {
        let allowed = (allowed_remaining as i64).clamp(0, self.maximum as i64) as u32;
        self.used = self.maximum - allowed;
    }

    /// Restore every use
    pub fn refill(&mut self) {
        self.used = 0;
    }

    /// Grow or shrink the maximum, never below zero
    pub fn add_maximum(&mut self, delta: i32) {
        let maximum = (self.maximum as i64 + delta as i64).max(0);
        self.maximum = maximum.min(u32::MAX as i64) as u32;
        self.used = self.used.min(self.maximum);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.maximum - self.used
    }
}

/// Character information a force computation reads
#[derive(Debug, Clone, Copy)]
pub struct MotionContext<'a> {
    /// Last non-zero horizontal input direction, -1 or 1
    pub last_movement_direction: i32,
    /// World gravity along y
    pub gravity: f32,
    pub telemetry: &'a DisplacementEstimator,
}

/// An ability that applies a velocity change to the character body and is
/// limited by a [`ForceBudget`]
pub trait ForceApplier {
    fn name(&self) -> &'static str;

    fn budget(&self) -> &ForceBudget;

    fn budget_mut(&mut self) -> &mut ForceBudget;

    /// Ability-specific effect on the body. Called by [`try_apply_force`]
    /// only, which handles the budget.
    ///
    /// [`try_apply_force`]: ForceApplier::try_apply_force
    fn apply_force(&mut self, body: &mut dyn CharacterBody, context: &MotionContext);

    fn can_apply_force(&self) -> bool {
        self.budget().can_apply()
    }

    /// Apply the force once if the budget allows it
    fn try_apply_force(&mut self, body: &mut dyn CharacterBody, context: &MotionContext) -> bool {
        if !self.can_apply_force() {
            trace!("{} unavailable: {:?}", self.name(), self.budget());
            return false;
        }
        self.apply_force(body, context);
        self.budget_mut().consume()
    }

    /// Set how many uses remain; see [`ForceBudget::reset`]
    fn reset_force_count(&mut self, allowed_remaining: i32) {
        self.budget_mut().reset(allowed_remaining);
    }

    fn add_maximum_allowed_forces(&mut self, delta: i32) {
        self.budget_mut().add_maximum(delta);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.budget_mut().set_enabled(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_until_exhausted() {
        let mut budget = ForceBudget::new(2);
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(!budget.consume());
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_disabled_budget_rejects() {
        let mut budget = ForceBudget::new(1);
        budget.set_enabled(false);
        assert!(!budget.can_apply());
        assert!(!budget.consume());
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_reset_sets_remaining_uses() {
        let mut budget = ForceBudget::new(2);
        budget.consume();
        budget.consume();

        // One of two jumps remains
        budget.reset(1);
        assert_eq!(budget.used(), 1);

        budget.reset(2);
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_reset_clamps_allowance() {
        let mut budget = ForceBudget::new(2);
        budget.reset(-5);
        assert_eq!(budget.used(), 2);
        budget.reset(10);
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_add_maximum_never_negative() {
        let mut budget = ForceBudget::new(1);
        budget.consume();
        budget.add_maximum(-3);
        assert_eq!(budget.maximum(), 0);
        assert_eq!(budget.used(), 0);

        budget.add_maximum(2);
        assert_eq!(budget.maximum(), 2);
        assert!(budget.can_apply());
    }

    #[test]
    fn test_budget_invariant_holds() {
        let mut budget = ForceBudget::new(3);
        let ops: [i32; 12] = [1, -1, 0, 5, -2, 1, 3, -4, 2, 0, 7, -1];
        for (i, op) in ops.iter().enumerate() {
            match i % 3 {
                0 => {
                    budget.consume();
                }
                1 => budget.reset(*op),
                _ => budget.add_maximum(*op),
            }
            assert!(budget.used() <= budget.maximum());
        }
    }

    #[test]
    fn test_reset_with_huge_maximum() {
        let mut budget = ForceBudget::new(1);
        budget.add_maximum(i32::MAX);
        budget.add_maximum(i32::MAX);
        assert_eq!(budget.maximum(), u32::MAX);

        budget.consume();
        budget.reset(i32::MAX);
        assert_eq!(budget.remaining(), i32::MAX as u32);
        assert!(budget.used() <= budget.maximum());

        budget.reset(-1);
        assert_eq!(budget.used(), u32::MAX);
        assert!(!budget.can_apply());

        budget.add_maximum(i32::MIN);
        budget.add_maximum(i32::MIN);
        assert_eq!(budget.maximum(), 0);
        assert_eq!(budget.used(), 0);
    }
}
