// Movement state machine
//
// Two entry points per frame: `tick_logical` consumes input intents and
// decides transitions, `tick_physics` recomputes the body velocity at the
// fixed physics rate. Every transition goes through `change_state`.

use glam::Vec2;
use log::{debug, warn};

use crate::core::math::{axis_sign, clamp, clamp_magnitude, move_towards, project_on_plane};
use crate::core::Timer;
use crate::engine::input::{ControlInput, InputEvent};
use crate::engine::physics::{CharacterBody, CharacterPhysics};
use crate::error::{ControllerError, Result};

use super::dash::Dash;
use super::detector::{is_straight_wall, GroundWallSlopeDetector};
use super::displacement::DisplacementEstimator;
use super::force::{ForceApplier, MotionContext};
use super::jump::{jump_impulse, Jump};
use super::settings::{ControllerSettings, MovementSettings};
use super::state::{ControllerSnapshot, MovementState, StateChanged, StateSet};

/// Handle returned when registering a transition predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredicateId(u64);

/// Handle returned when subscribing to state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// `(current, proposed) -> allowed`
pub type StatePredicate = Box<dyn Fn(MovementState, MovementState) -> bool>;
pub type StateListener = Box<dyn FnMut(&StateChanged)>;

/// Ability presses waiting for the next logical tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Intents {
    jump: bool,
    dash: bool,
    wall_grab: bool,
    wall_jump: bool,
}

/// Start a cooldown; a zero-length one is over immediately
fn restart(timer: &mut Timer) {
    if timer.duration() > 0.0 {
        timer.start();
    } else {
        timer.force_finish();
    }
}

/// Remaining uses granted by a reset policy, saturated to the budget API
fn allowance(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Assembles a [`CharacterStateMachine`] from its collaborators
pub struct StateMachineBuilder {
    settings: MovementSettings,
    detector: Option<GroundWallSlopeDetector>,
    jump: Option<Jump>,
    dash: Option<Dash>,
}

impl StateMachineBuilder {
    pub fn new(settings: MovementSettings) -> Self {
        Self {
            settings,
            detector: None,
            jump: None,
            dash: None,
        }
    }

    pub fn detector(mut self, detector: GroundWallSlopeDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn jump(mut self, jump: Jump) -> Self {
        self.jump = Some(jump);
        self
    }

    pub fn dash(mut self, dash: Dash) -> Self {
        self.dash = Some(dash);
        self
    }

    /// Fails when a collaborator was not provided
    pub fn build(self) -> Result<CharacterStateMachine> {
        let detector = self
            .detector
            .ok_or(ControllerError::MissingCollaborator("detector"))?;
        let jump = self.jump.ok_or(ControllerError::MissingCollaborator("jump"))?;
        let dash = self.dash.ok_or(ControllerError::MissingCollaborator("dash"))?;
        Ok(CharacterStateMachine::assemble(self.settings, detector, jump, dash))
    }
}

/// Ten-state platformer movement controller
pub struct CharacterStateMachine {
    settings: MovementSettings,
    detector: GroundWallSlopeDetector,
    jump: Jump,
    dash: Dash,
    telemetry: DisplacementEstimator,

    current_state: MovementState,
    previous_state: MovementState,

    intents: Intents,
    input_movement: f32,
    raw_input_movement: f32,
    last_movement_direction: i32,
    turn_progress: f32,

    // Cooldowns, active while running
    ground_probe_after_jump: Timer,
    ground_probe_after_dash: Timer,
    wall_grab_cooldown: Timer,
    bump_control: Timer,
    damage_control: Timer,

    wall_normal_during_last_wall_grab: Vec2,
    fall_on_jump_release: bool,
    began_falling_from_ground: bool,
    did_jump_since_falling: bool,
    did_dash_since_falling: bool,

    predicates: Vec<(PredicateId, StatePredicate)>,
    listeners: Vec<(ListenerId, StateListener)>,
    next_id: u64,
}

impl CharacterStateMachine {
    pub fn builder(settings: MovementSettings) -> StateMachineBuilder {
        StateMachineBuilder::new(settings)
    }

    /// Sanitize `settings` and build every collaborator from them
    pub fn from_settings(settings: ControllerSettings) -> Result<Self> {
        let settings = settings.sanitize()?;
        Self::builder(settings.movement)
            .detector(GroundWallSlopeDetector::new(settings.probe))
            .jump(Jump::new(settings.jump))
            .dash(Dash::new(settings.dash))
            .build()
    }

    fn assemble(
        settings: MovementSettings,
        detector: GroundWallSlopeDetector,
        jump: Jump,
        dash: Dash,
    ) -> Self {
        let mut machine = Self {
            ground_probe_after_jump: Timer::finished(settings.ground_probe_disable_after_jump),
            ground_probe_after_dash: Timer::finished(settings.ground_probe_disable_after_dash),
            wall_grab_cooldown: Timer::finished(settings.wall_grab_disable_duration),
            bump_control: Timer::finished(settings.bump_control_disable_duration),
            damage_control: Timer::finished(settings.damage_control_disable_duration),
            fall_on_jump_release: settings.change_to_falling_when_releasing_jump,
            settings,
            detector,
            jump,
            dash,
            telemetry: DisplacementEstimator::default(),
            current_state: MovementState::Grounded,
            previous_state: MovementState::Grounded,
            intents: Intents::default(),
            input_movement: 0.0,
            raw_input_movement: 0.0,
            last_movement_direction: 1,
            turn_progress: 1.0,
            wall_normal_during_last_wall_grab: Vec2::ZERO,
            began_falling_from_ground: false,
            did_jump_since_falling: false,
            did_dash_since_falling: false,
            predicates: Vec::new(),
            listeners: Vec::new(),
            next_id: 0,
        };
        machine.reset_current_values();
        machine
    }

    // ---- Queries ----

    pub fn current_state(&self) -> MovementState {
        self.current_state
    }

    pub fn previous_state(&self) -> MovementState {
        self.previous_state
    }

    pub fn is_grounded(&self) -> bool {
        self.current_state == MovementState::Grounded
    }

    pub fn has_wall_in_front(&self) -> bool {
        self.detector.has_wall_in_front()
    }

    pub fn has_wall_behind(&self) -> bool {
        self.detector.has_wall_behind()
    }

    pub fn has_slope_nearby(&self) -> bool {
        self.detector.has_slope_nearby()
    }

    /// Facing direction, -1 or 1, kept after the stick is released
    pub fn last_movement_direction(&self) -> i32 {
        self.last_movement_direction
    }

    /// Horizontal input read at the start of the last logical tick
    pub fn input_movement(&self) -> f32 {
        self.input_movement
    }

    /// Input rounded to -1, 0 or 1
    pub fn raw_input_movement(&self) -> f32 {
        self.raw_input_movement
    }

    /// 0 right after a direction flip, 1 once the turn is complete
    pub fn turn_progress(&self) -> f32 {
        self.turn_progress
    }

    pub fn is_wall_grab_disabled(&self) -> bool {
        self.wall_grab_cooldown.is_running()
    }

    pub fn is_bump_disabling_controls(&self) -> bool {
        self.bump_control.is_running()
    }

    pub fn telemetry(&self) -> &DisplacementEstimator {
        &self.telemetry
    }

    pub fn jump(&self) -> &Jump {
        &self.jump
    }

    pub fn dash(&self) -> &Dash {
        &self.dash
    }

    pub fn detector(&self) -> &GroundWallSlopeDetector {
        &self.detector
    }

    pub fn settings(&self) -> &MovementSettings {
        &self.settings
    }

    // ---- Ability mutators ----

    pub fn enable_jump(&mut self, enabled: bool) {
        self.jump.set_enabled(enabled);
    }

    pub fn enable_dash(&mut self, enabled: bool) {
        self.dash.set_enabled(enabled);
    }

    pub fn add_maximum_allowed_force_to_jump(&mut self, delta: i32) {
        self.jump.add_maximum_allowed_forces(delta);
    }

    pub fn add_maximum_allowed_force_to_dash(&mut self, delta: i32) {
        self.dash.add_maximum_allowed_forces(delta);
    }

    // ---- Predicates and listeners ----

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Register a veto over player-driven transitions (wall grab, wall jump,
    /// jump, dash)
    pub fn add_can_change_state_predicate<F>(&mut self, predicate: F) -> PredicateId
    where
        F: Fn(MovementState, MovementState) -> bool + 'static,
    {
        let id = PredicateId(self.next_id());
        self.predicates.push((id, Box::new(predicate)));
        id
    }

    pub fn remove_can_change_state_predicate(&mut self, id: PredicateId) -> bool {
        let before = self.predicates.len();
        self.predicates.retain(|(existing, _)| *existing != id);
        self.predicates.len() != before
    }

    /// Reject every transition into one of `states`
    pub fn prevent_states(&mut self, states: StateSet) -> PredicateId {
        self.add_can_change_state_predicate(move |_, proposed| !states.contains(proposed))
    }

    /// Listeners run in registration order, after the previous state's exit
    /// effects and before the new state's entry effects
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StateChanged) + 'static,
    {
        let id = ListenerId(self.next_id());
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Whether every registered predicate allows moving to `new_state`
    pub fn can_change_state(&self, new_state: MovementState) -> bool {
        let allowed = self
            .predicates
            .iter()
            .all(|(_, predicate)| predicate(self.current_state, new_state));
        if !allowed {
            debug!(
                "Change to {:?} prevented, staying in {:?}",
                new_state, self.current_state
            );
        }
        allowed
    }

    // ---- Input ----

    /// Record an ability press, if the current state accepts it
    pub fn on_input(&mut self, event: InputEvent) {
        let accepted = match event {
            InputEvent::WallJumpPerformed => {
                StateSet::ACCEPTS_WALL_JUMP_INPUT.contains(self.current_state)
            }
            _ => StateSet::ACCEPTS_ABILITY_INPUT.contains(self.current_state),
        };
        if !accepted {
            return;
        }
        match event {
            InputEvent::JumpPerformed => self.intents.jump = true,
            InputEvent::DashPerformed => self.intents.dash = true,
            InputEvent::WallGrabPerformed => self.intents.wall_grab = true,
            InputEvent::WallJumpPerformed => self.intents.wall_jump = true,
        }
    }

    // ---- Transitions ----

    /// Move to `new_state`, running exit effects, listeners, then entry
    /// effects. Same-state changes are ignored unless `force` is set.
    pub fn change_state(
        &mut self,
        new_state: MovementState,
        force: bool,
        body: &mut dyn CharacterBody,
    ) -> bool {
        if !force && self.current_state == new_state {
            return false;
        }
        debug!("Movement state: {:?} -> {:?}", self.current_state, new_state);

        // Exit
        match self.current_state {
            MovementState::Grounded => {
                if new_state == MovementState::Falling {
                    self.began_falling_from_ground = true;
                }
            }
            MovementState::Dashing => {
                self.dash.end_dash(body);
                self.detector.reset_max_distance();
            }
            MovementState::DamageTaken => self.damage_control.force_finish(),
            _ => {}
        }

        self.previous_state = self.current_state;
        self.current_state = new_state;
        self.notify(body);

        // Enter
        match new_state {
            MovementState::Grounded => self.reset_current_values(),
            MovementState::Bumping => {
                restart(&mut self.bump_control);
                body.set_velocity(Vec2::ZERO);
                let resets = self.settings.jump_resets;
                if resets.reset_when_bumping {
                    self.jump.reset_force_count(allowance(resets.allowed_when_bumping));
                }
                let resets = self.settings.dash_resets;
                if resets.reset_when_bumping {
                    self.dash.reset_force_count(allowance(resets.allowed_when_bumping));
                }
            }
            MovementState::StartJump => {
                if self.previous_state == MovementState::WallJump {
                    self.fall_on_jump_release = false;
                }
                // Already vetted by the jump attempt
                self.change_state(MovementState::Jumping, false, body);
            }
            MovementState::WallGrab => {
                self.wall_normal_during_last_wall_grab = self.detector.wall_normal();
            }
            MovementState::WallJump => {
                restart(&mut self.wall_grab_cooldown);
                let resets = self.settings.jump_resets;
                if resets.reset_when_wall_jumping {
                    self.jump.reset_force_count(allowance(resets.allowed_when_wall_jumping));
                }
                let resets = self.settings.dash_resets;
                if resets.reset_when_wall_jumping {
                    self.dash.reset_force_count(allowance(resets.allowed_when_wall_jumping));
                }
            }
            MovementState::Dashing => {
                if self.settings.reset_wall_grab_disable_when_dashing {
                    self.wall_grab_cooldown.force_finish();
                }
                self.detector
                    .set_max_distance(self.settings.wall_probe_distance_when_dashing);
            }
            MovementState::DamageTaken => restart(&mut self.damage_control),
            MovementState::Falling | MovementState::Jumping | MovementState::EndJump => {}
        }

        true
    }

    fn notify(&mut self, body: &dyn CharacterBody) {
        if self.listeners.is_empty() {
            return;
        }
        let event = StateChanged {
            previous: self.previous_state,
            current: self.current_state,
            snapshot: ControllerSnapshot {
                jump_used: self.jump.budget().used(),
                jump_maximum: self.jump.budget().maximum(),
                dash_used: self.dash.budget().used(),
                dash_maximum: self.dash.budget().maximum(),
                is_dashing: self.dash.is_dashing(),
                collider_is_trigger: body.is_trigger(),
                velocity: body.velocity(),
            },
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Knock the character back, cancelling whatever it was doing
    pub fn bump(&mut self, body: &mut dyn CharacterBody, impulse: Vec2) {
        self.change_state(MovementState::Bumping, true, body);
        body.add_velocity_change(impulse);
    }

    /// Enter hit stun
    pub fn take_damage(&mut self, body: &mut dyn CharacterBody) {
        self.change_state(MovementState::DamageTaken, true, body);
    }

    /// Restore counters, cooldowns, intents and probe results, e.g. after a
    /// respawn
    pub fn reset(&mut self) {
        self.reset_current_values();
    }

    /// Forget the movement history and sample from `position`, e.g. after
    /// a teleport
    pub fn reset_telemetry(&mut self, position: Vec2) {
        self.telemetry.reset(position);
    }

    /// Run the ground check now, ignoring the post-jump/dash cooldowns
    pub fn force_check_ground<P: CharacterPhysics>(&mut self, physics: &mut P) {
        self.check_ground_and_change_state(physics);
    }

    fn reset_current_values(&mut self) {
        self.ground_probe_after_jump.force_finish();
        self.ground_probe_after_dash.force_finish();
        self.bump_control.force_finish();
        self.wall_grab_cooldown.force_finish();
        self.jump.budget_mut().refill();
        self.dash.budget_mut().refill();

        self.detector.reset_current_values();
        self.intents = Intents::default();
        self.fall_on_jump_release = self.settings.change_to_falling_when_releasing_jump;

        self.began_falling_from_ground = false;
        self.did_jump_since_falling = false;
        self.did_dash_since_falling = false;
    }

    // ---- Logical tick ----

    /// Consume intents and resolve transitions. Called once per frame,
    /// after the frame's physics ticks.
    pub fn tick_logical<P, I>(&mut self, dt: f32, input: &I, physics: &mut P)
    where
        P: CharacterPhysics,
        I: ControlInput + ?Sized,
    {
        self.input_movement = input.horizontal_move();
        self.raw_input_movement = axis_sign(self.input_movement);
        self.look_to_direction(dt);

        self.update_state(dt, input, physics);
        self.intents = Intents::default();
    }

    fn update_state<P, I>(&mut self, dt: f32, input: &I, physics: &mut P)
    where
        P: CharacterPhysics,
        I: ControlInput + ?Sized,
    {
        match self.current_state {
            MovementState::Grounded => {
                self.check_ground(physics);
                self.handle_walls(physics);
                self.jump_or_cool_down(dt, physics);
                self.dash_or_cool_down(dt, physics);
            }
            MovementState::Falling | MovementState::Bumping => {
                if !self.release_bump_control(dt, physics.velocity()) {
                    return;
                }
                self.check_ground(physics);
                self.handle_walls(physics);
                self.try_wall_grab(physics);
                self.jump_or_cool_down(dt, physics);
                self.dash_or_cool_down(dt, physics);
            }
            MovementState::StartJump => {}
            MovementState::Jumping => {
                self.check_ground(physics);
                if self.current_state != MovementState::Jumping {
                    return;
                }
                self.handle_walls(physics);
                self.try_wall_grab(physics);

                if self.fall_on_jump_release && !input.is_jump_held() {
                    physics.set_velocity(Vec2::ZERO);
                    self.change_state(MovementState::Falling, false, physics);
                }

                self.jump_or_cool_down(dt, physics);
                self.dash_or_cool_down(dt, physics);
            }
            MovementState::EndJump => self.check_ground(physics),
            MovementState::WallGrab => {
                self.try_wall_jump(physics);
                self.ground_probe_after_jump.update(dt);
            }
            MovementState::WallJump => {
                self.wall_grab_cooldown.update(dt);
                self.check_ground(physics);
                self.handle_walls(physics);
                self.try_wall_grab(physics);
                self.jump_or_cool_down(dt, physics);
                self.dash_or_cool_down(dt, physics);
            }
            MovementState::Dashing => {
                self.ground_probe_after_dash.update(dt);

                if !self.dash.update_timer(dt) {
                    self.handle_walls(physics);
                    self.try_wall_grab(physics);
                    if self.settings.can_jump_during_dash {
                        self.jump_or_cool_down(dt, physics);
                    }
                } else {
                    self.check_ground(physics);
                    if self.current_state == MovementState::Dashing {
                        self.change_state(MovementState::Falling, false, physics);
                    }
                }
            }
            MovementState::DamageTaken => {
                self.ground_probe_after_jump.update(dt);
                self.ground_probe_after_dash.update(dt);
                if self.damage_control.update(dt) {
                    self.check_ground(physics);
                }
            }
        }
    }

    fn look_to_direction(&mut self, dt: f32) {
        let current = if self.input_movement.abs() > f32::EPSILON {
            self.input_movement
        } else {
            self.last_movement_direction as f32
        };
        let direction = if current > 0.0 { 1 } else { -1 };

        if direction != self.last_movement_direction {
            self.turn_progress = 0.0;
            self.last_movement_direction = direction;
        }
        self.turn_progress = clamp(self.turn_progress + self.settings.turn_speed * dt, 0.0, 1.0);
    }

    /// Returns true once controls are back. Suspension ends early past the
    /// apex of the bump, or when grounded after half the duration.
    fn release_bump_control(&mut self, dt: f32, velocity: Vec2) -> bool {
        if !self.bump_control.is_running() {
            return true;
        }
        let half_elapsed = self.bump_control.elapsed() * 2.0 > self.bump_control.duration();
        if velocity.y < 0.0 || (half_elapsed && self.is_grounded()) {
            self.bump_control.force_finish();
        }
        self.bump_control.update(dt);
        false
    }

    /// Ground check, skipped right after a jump or dash
    fn check_ground<P: CharacterPhysics>(&mut self, physics: &mut P) {
        if !self.ground_probe_after_jump.is_running() && !self.ground_probe_after_dash.is_running()
        {
            self.check_ground_and_change_state(physics);
        }
    }

    /// Environment-driven transitions skip the predicates
    fn check_ground_and_change_state<P: CharacterPhysics>(&mut self, physics: &mut P) {
        let position = physics.position();
        if self.detector.check_ground(&*physics, position) {
            if matches!(
                self.current_state,
                MovementState::Jumping | MovementState::WallJump
            ) {
                self.change_state(MovementState::EndJump, false, physics);
            }
            self.change_state(MovementState::Grounded, false, physics);
        } else if self.current_state == MovementState::Grounded {
            self.change_state(MovementState::Falling, false, physics);
        }
    }

    /// Probe walls, then either climb a low ledge or store the result
    fn handle_walls<P: CharacterPhysics>(&mut self, physics: &mut P) {
        let position = physics.position();
        let probe = self
            .detector
            .probe_walls(&*physics, position, self.last_movement_direction);
        match probe.step_up {
            Some(height) => physics.set_position(Vec2::new(position.x, height)),
            None => self.detector.record(&probe),
        }
    }

    fn try_wall_grab<P: CharacterPhysics>(&mut self, physics: &mut P) {
        let wall_normal = self.detector.wall_normal();
        let opposite_wall = wall_normal != self.wall_normal_during_last_wall_grab;
        if self.is_wall_grab_disabled() && !opposite_wall {
            return;
        }
        if self.has_wall_in_front() && is_straight_wall(wall_normal) && self.intents.wall_grab {
            self.intents.wall_grab = false;
            if self.can_change_state(MovementState::WallGrab) {
                self.change_state(MovementState::WallGrab, false, physics);
            }
        }
    }

    fn try_wall_jump<P: CharacterPhysics>(&mut self, physics: &mut P) {
        if !self.intents.wall_jump {
            return;
        }
        self.intents.wall_jump = false;
        if !self.can_change_state(MovementState::WallJump) {
            return;
        }
        let up = jump_impulse(
            self.settings.wall_jump_height,
            self.settings.ascending_gravity_scale,
            self.settings.gravity,
        );
        let impulse =
            self.detector.wall_normal() * self.settings.wall_jump_normal_force + Vec2::new(0.0, up);
        debug!("Wall jump impulse {:?}", impulse);
        physics.add_velocity_change(impulse);
        self.change_state(MovementState::WallJump, false, physics);
    }

    fn jump_or_cool_down<P: CharacterPhysics>(&mut self, dt: f32, physics: &mut P) {
        if !self.try_jump(physics) {
            self.ground_probe_after_jump.update(dt);
        }
    }

    fn dash_or_cool_down<P: CharacterPhysics>(&mut self, dt: f32, physics: &mut P) {
        if !self.try_dash(physics) {
            self.ground_probe_after_dash.update(dt);
        }
    }

    fn try_jump<P: CharacterPhysics>(&mut self, physics: &mut P) -> bool {
        if self.is_wall_grab_disabled() || !self.intents.jump {
            return false;
        }
        self.intents.jump = false;

        let resets = self.settings.jump_resets;
        if self.began_falling_from_ground && !self.did_jump_since_falling && resets.reset_when_falling
        {
            self.jump.reset_force_count(allowance(resets.allowed_when_falling));
            self.did_jump_since_falling = true;
        }

        if !self.jump.can_apply_force() || !self.can_change_state(MovementState::StartJump) {
            return false;
        }

        // Transition first: leaving a dash zeroes the velocity
        self.change_state(MovementState::StartJump, false, physics);
        let context = MotionContext {
            last_movement_direction: self.last_movement_direction,
            gravity: self.settings.gravity,
            telemetry: &self.telemetry,
        };
        self.jump.try_apply_force(physics, &context);
        restart(&mut self.ground_probe_after_jump);
        true
    }

    fn try_dash<P: CharacterPhysics>(&mut self, physics: &mut P) -> bool {
        if !self.intents.dash {
            return false;
        }
        self.intents.dash = false;

        self.handle_walls(physics);
        if self.has_wall_in_front() {
            return false;
        }

        let resets = self.settings.dash_resets;
        if self.began_falling_from_ground && !self.did_dash_since_falling && resets.reset_when_falling
        {
            self.dash.reset_force_count(allowance(resets.allowed_when_falling));
            self.did_dash_since_falling = true;
        }

        if !self.dash.can_apply_force() || !self.can_change_state(MovementState::Dashing) {
            return false;
        }

        self.change_state(MovementState::Dashing, false, physics);
        let context = MotionContext {
            last_movement_direction: self.last_movement_direction,
            gravity: self.settings.gravity,
            telemetry: &self.telemetry,
        };
        let applied = self.dash.try_apply_force(physics, &context);
        if !applied {
            warn!("Dash state entered but the dash force was refused");
        }
        restart(&mut self.ground_probe_after_dash);
        applied
    }

    // ---- Physics tick ----

    /// Recompute and commit the body velocity. Called at the fixed physics
    /// rate, before the physics engine steps.
    pub fn tick_physics<P: CharacterPhysics>(&mut self, dt: f32, physics: &mut P) {
        self.telemetry.update(physics.position(), dt);

        let mut velocity = physics.velocity();
        let grounded = self.is_grounded();

        match self.current_state {
            MovementState::Grounded => {
                self.apply_movement(&mut velocity, grounded);
                self.stop_against_wall_in_front(&mut velocity);
                velocity = project_on_plane(velocity, self.detector.ground_normal());
            }
            MovementState::Falling | MovementState::Bumping => {
                if self.bump_control.is_running() {
                    self.apply_gravity_immediate(dt, physics);
                    return;
                }
                self.apply_movement(&mut velocity, grounded);
                self.stop_against_wall_in_front(&mut velocity);
                self.apply_gravity(&mut velocity, dt);
            }
            MovementState::StartJump | MovementState::EndJump => {}
            MovementState::Jumping => {
                if self.is_wall_grab_disabled() {
                    self.apply_gravity_immediate(dt, physics);
                    return;
                }
                self.apply_movement(&mut velocity, grounded);
                self.stop_against_wall_in_front(&mut velocity);
                self.apply_gravity(&mut velocity, dt);
            }
            MovementState::WallGrab => velocity = Vec2::ZERO,
            MovementState::WallJump => {
                if self.is_wall_grab_disabled() {
                    self.apply_gravity_immediate(dt, physics);
                    return;
                }
                self.apply_movement(&mut velocity, grounded);
                self.apply_gravity(&mut velocity, dt);
            }
            MovementState::Dashing => {
                self.stop_against_wall_in_front(&mut velocity);
                let dash_direction = self.dash.last_direction() as f32;
                if self.raw_input_movement != 0.0 && self.raw_input_movement != dash_direction {
                    self.stop_against_wall_behind(&mut velocity);
                }

                if self.has_wall_in_front() {
                    // Land flush against the wall so a wall grab can follow
                    if let Some(x) = self.detector.replacement_x(self.dash.last_direction()) {
                        let position = physics.position();
                        physics.set_position(Vec2::new(x, position.y));
                    }
                    self.dash.stop_timer();
                    velocity = Vec2::ZERO;
                    self.apply_gravity(&mut velocity, dt);
                }

                if self.has_slope_nearby() {
                    if let Some(hit) = self.detector.result().last_slope_hit {
                        physics.set_position(hit.point);
                    }
                    self.dash.stop_timer();
                    velocity = Vec2::ZERO;
                    self.apply_gravity(&mut velocity, dt);
                }
            }
            MovementState::DamageTaken => self.apply_gravity(&mut velocity, dt),
        }

        physics.set_velocity(clamp_magnitude(velocity, self.settings.max_velocity));
    }

    /// Input drives horizontal speed directly; releasing it on the ground
    /// decelerates by the friction rate
    fn apply_movement(&self, velocity: &mut Vec2, grounded: bool) {
        if self.input_movement != 0.0 {
            // Pushing into a wall right after a wall jump would pin the character
            if self.current_state != MovementState::WallJump || !self.has_wall_in_front() {
                let speed = if grounded {
                    self.settings.ground_move_speed
                } else {
                    self.settings.air_move_speed
                };
                velocity.x = self.input_movement * speed;
            }
        } else if grounded {
            velocity.x = move_towards(velocity.x, 0.0, self.settings.ground_friction);
        }
    }

    fn stop_against_wall_in_front(&self, velocity: &mut Vec2) {
        if self.has_wall_in_front() {
            velocity.x = 0.0;
        }
    }

    fn stop_against_wall_behind(&self, velocity: &mut Vec2) {
        if self.has_wall_behind() {
            velocity.x = 0.0;
        }
    }

    fn apply_gravity(&self, velocity: &mut Vec2, dt: f32) {
        let scale = if velocity.y > 0.0 {
            self.settings.ascending_gravity_scale
        } else {
            self.settings.descending_gravity_scale
        };
        velocity.y += self.settings.gravity * scale * dt;
    }

    /// Gravity only, committed straight to the body
    fn apply_gravity_immediate(&self, dt: f32, body: &mut dyn CharacterBody) {
        let mut velocity = body.velocity();
        self.apply_gravity(&mut velocity, dt);
        body.set_velocity(velocity);
    }
}
