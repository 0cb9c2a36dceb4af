// Controller tunables
// Every character shares the same base settings; gameplay systems change
// abilities at runtime through the state machine, not by editing these.

use log::warn;

use crate::engine::physics::LayerMask;
use crate::error::{ControllerError, Result};

/// How a consumable ability's budget is refilled on specific transitions.
///
/// The `allowed_*` values are the number of uses left after the reset, not
/// the number of uses consumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceResetPolicy {
    /// Refill once on the first use after walking off a ledge
    pub reset_when_falling: bool,
    pub allowed_when_falling: u32,
    pub reset_when_wall_jumping: bool,
    pub allowed_when_wall_jumping: u32,
    pub reset_when_bumping: bool,
    pub allowed_when_bumping: u32,
}

pub const DEFAULT_RESET_POLICY: ForceResetPolicy = ForceResetPolicy {
    reset_when_falling: true,
    allowed_when_falling: 1,
    reset_when_wall_jumping: true,
    allowed_when_wall_jumping: 1,
    reset_when_bumping: true,
    allowed_when_bumping: 1,
};

/// Locomotion, gravity and state-machine timing
#[derive(Debug, Clone, PartialEq)]
pub struct MovementSettings {
    // Movement
    /// Velocity magnitude is clamped to this every physics tick
    pub max_velocity: f32,
    /// Horizontal speed while grounded (units/second at full input)
    pub ground_move_speed: f32,
    /// Horizontal deceleration per physics tick when input is released on ground
    pub ground_friction: f32,
    /// Horizontal speed while airborne
    pub air_move_speed: f32,

    // Gravity
    /// World gravity along y (negative is down)
    pub gravity: f32,
    pub ascending_gravity_scale: f32,
    pub descending_gravity_scale: f32,

    // Jump policy
    /// Releasing jump while `Jumping` drops straight into `Falling`
    pub change_to_falling_when_releasing_jump: bool,
    pub can_jump_during_dash: bool,
    /// Ground checks are skipped this long after a jump starts
    pub ground_probe_disable_after_jump: f32,
    pub jump_resets: ForceResetPolicy,

    // Dash policy
    /// Ground checks are skipped this long after a dash starts
    pub ground_probe_disable_after_dash: f32,
    /// Wall ray length while dashing
    pub wall_probe_distance_when_dashing: f32,
    pub dash_resets: ForceResetPolicy,

    // Wall grab / wall jump
    pub wall_jump_height: f32,
    /// Horizontal push along the wall normal
    pub wall_jump_normal_force: f32,
    /// The same wall cannot be grabbed again for this long after a wall jump
    pub wall_grab_disable_duration: f32,
    pub reset_wall_grab_disable_when_dashing: bool,

    // Bump / damage
    pub bump_control_disable_duration: f32,
    pub damage_control_disable_duration: f32,

    // Facing
    /// Rate at which `turn_progress` goes from 0 to 1 after a direction flip
    pub turn_speed: f32,
}

pub const BASE_MOVEMENT: MovementSettings = MovementSettings {
    max_velocity: 50.0,
    ground_move_speed: 8.0,
    ground_friction: 1.0,
    air_move_speed: 6.0,

    gravity: -9.81,
    ascending_gravity_scale: 5.0,
    descending_gravity_scale: 5.0,

    change_to_falling_when_releasing_jump: false,
    can_jump_during_dash: true,
    ground_probe_disable_after_jump: 0.5,
    jump_resets: DEFAULT_RESET_POLICY,

    ground_probe_disable_after_dash: 0.5,
    wall_probe_distance_when_dashing: 10.0,
    dash_resets: DEFAULT_RESET_POLICY,

    wall_jump_height: 3.0,
    wall_jump_normal_force: 8.0,
    wall_grab_disable_duration: 0.5,
    reset_wall_grab_disable_when_dashing: true,

    bump_control_disable_duration: 0.5,
    damage_control_disable_duration: 0.5,

    turn_speed: 8.0,
};

/// Jump ability tunables
#[derive(Debug, Clone, PartialEq)]
pub struct JumpSettings {
    /// Apex height; a negative height pushes downwards
    pub height: f32,
    pub gravity_scale: f32,
    /// Extra height when jumping out of a fast fall
    pub bonus_height_when_falling: f32,
    /// Average speed above which the falling bonus applies
    pub bonus_speed_threshold: f32,
    /// Jumps allowed before landing
    pub max_forces: u32,
}

pub const BASE_JUMP: JumpSettings = JumpSettings {
    height: 3.0,
    gravity_scale: 5.0,
    bonus_height_when_falling: 1.0,
    bonus_speed_threshold: 10.0,
    max_forces: 1,
};

/// Dash ability tunables
#[derive(Debug, Clone, PartialEq)]
pub struct DashSettings {
    /// Horizontal velocity change at dash start
    pub force: f32,
    pub duration: f32,
    /// Upward nudge at dash start to avoid snagging on the floor
    pub position_offset: f32,
    /// Dashes allowed before landing
    pub max_forces: u32,
}

pub const BASE_DASH: DashSettings = DashSettings {
    force: 30.0,
    duration: 0.2,
    position_offset: 0.5,
    max_forces: 1,
};

/// Ray layout of the ground/wall/slope detector.
///
/// Offsets are relative to the character origin, which sits at the bottom
/// centre of its collider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSettings {
    /// Horizontal offset of the two ground rays from the centre
    pub ground_ray_spread: f32,
    /// Height of the ground ray origins above the feet
    pub ground_ray_height: f32,
    pub ground_ray_length: f32,

    pub wall_ray_top: f32,
    pub wall_ray_mid: f32,
    pub wall_ray_bottom: f32,
    /// Height of the step-up rays that look for a wall above a low ledge
    pub step_ray_height: f32,
    /// Wall ray length, measured from the character centre line
    pub wall_ray_length: f32,

    /// Normal y above which a surface is floor, below which it is wall
    pub slope_normal_threshold: f32,
    /// Half the character width
    pub half_extent: f32,
    /// Layers the rays collide with
    pub layers: LayerMask,
}

pub const BASE_PROBE: ProbeSettings = ProbeSettings {
    ground_ray_spread: 0.45,
    ground_ray_height: 0.1,
    ground_ray_length: 0.2,

    wall_ray_top: 1.9,
    wall_ray_mid: 1.0,
    wall_ray_bottom: 0.05,
    step_ray_height: 0.35,
    wall_ray_length: 0.6,

    slope_normal_threshold: 0.7,
    half_extent: 0.5,
    layers: LayerMask::WALKABLE,
};

/// Everything needed to build a character controller
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub movement: MovementSettings,
    pub jump: JumpSettings,
    pub dash: DashSettings,
    pub probe: ProbeSettings,
}

/// The ONE controller configuration used by all players
pub const BASE_SETTINGS: ControllerSettings = ControllerSettings {
    movement: BASE_MOVEMENT,
    jump: BASE_JUMP,
    dash: BASE_DASH,
    probe: BASE_PROBE,
};

impl Default for ControllerSettings {
    fn default() -> Self {
        BASE_SETTINGS
    }
}

impl Default for MovementSettings {
    fn default() -> Self {
        BASE_MOVEMENT
    }
}

impl Default for JumpSettings {
    fn default() -> Self {
        BASE_JUMP
    }
}

impl Default for DashSettings {
    fn default() -> Self {
        BASE_DASH
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        BASE_PROBE
    }
}

/// Non-finite values are rejected
fn ensure_finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ControllerError::InvalidSetting { name, value })
    }
}

/// Negative values are clamped to zero with a warning
fn clamp_non_negative(name: &'static str, value: &mut f32) -> Result<()> {
    ensure_finite(name, *value)?;
    if *value < 0.0 {
        warn!("Setting `{}` was negative ({}), clamped to 0", name, value);
        *value = 0.0;
    }
    Ok(())
}

impl ControllerSettings {
    /// Clamp out-of-range tunables and reject unusable ones.
    ///
    /// Gravity and jump height keep their sign; every other distance, speed
    /// and duration is clamped to zero.
    pub fn sanitize(mut self) -> Result<Self> {
        let m = &mut self.movement;
        ensure_finite("movement.gravity", m.gravity)?;
        clamp_non_negative("movement.max_velocity", &mut m.max_velocity)?;
        clamp_non_negative("movement.ground_move_speed", &mut m.ground_move_speed)?;
        clamp_non_negative("movement.ground_friction", &mut m.ground_friction)?;
        clamp_non_negative("movement.air_move_speed", &mut m.air_move_speed)?;
        clamp_non_negative("movement.ascending_gravity_scale", &mut m.ascending_gravity_scale)?;
        clamp_non_negative("movement.descending_gravity_scale", &mut m.descending_gravity_scale)?;
        clamp_non_negative(
            "movement.ground_probe_disable_after_jump",
            &mut m.ground_probe_disable_after_jump,
        )?;
        clamp_non_negative(
            "movement.ground_probe_disable_after_dash",
            &mut m.ground_probe_disable_after_dash,
        )?;
        clamp_non_negative(
            "movement.wall_probe_distance_when_dashing",
            &mut m.wall_probe_distance_when_dashing,
        )?;
        clamp_non_negative("movement.wall_jump_height", &mut m.wall_jump_height)?;
        clamp_non_negative("movement.wall_jump_normal_force", &mut m.wall_jump_normal_force)?;
        clamp_non_negative("movement.wall_grab_disable_duration", &mut m.wall_grab_disable_duration)?;
        clamp_non_negative(
            "movement.bump_control_disable_duration",
            &mut m.bump_control_disable_duration,
        )?;
        clamp_non_negative(
            "movement.damage_control_disable_duration",
            &mut m.damage_control_disable_duration,
        )?;
        clamp_non_negative("movement.turn_speed", &mut m.turn_speed)?;

        let j = &mut self.jump;
        ensure_finite("jump.height", j.height)?;
        clamp_non_negative("jump.gravity_scale", &mut j.gravity_scale)?;
        clamp_non_negative("jump.bonus_height_when_falling", &mut j.bonus_height_when_falling)?;
        clamp_non_negative("jump.bonus_speed_threshold", &mut j.bonus_speed_threshold)?;

        let d = &mut self.dash;
        clamp_non_negative("dash.force", &mut d.force)?;
        clamp_non_negative("dash.duration", &mut d.duration)?;
        clamp_non_negative("dash.position_offset", &mut d.position_offset)?;

        let p = &mut self.probe;
        clamp_non_negative("probe.ground_ray_spread", &mut p.ground_ray_spread)?;
        ensure_finite("probe.ground_ray_height", p.ground_ray_height)?;
        clamp_non_negative("probe.ground_ray_length", &mut p.ground_ray_length)?;
        ensure_finite("probe.wall_ray_top", p.wall_ray_top)?;
        ensure_finite("probe.wall_ray_mid", p.wall_ray_mid)?;
        ensure_finite("probe.wall_ray_bottom", p.wall_ray_bottom)?;
        ensure_finite("probe.step_ray_height", p.step_ray_height)?;
        clamp_non_negative("probe.wall_ray_length", &mut p.wall_ray_length)?;
        clamp_non_negative("probe.slope_normal_threshold", &mut p.slope_normal_threshold)?;
        clamp_non_negative("probe.half_extent", &mut p.half_extent)?;

        Ok(self)
    }
}
