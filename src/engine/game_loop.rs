/// Game loop timing and control system
///
/// Fixed timestep for physics, one logical tick per frame. Each frame runs
/// its physics ticks first, then the logical tick, so logic always sees the
/// bodies after the frame's integration.
use std::time::{Duration, Instant};

/// Target physics rate (60 ticks per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667); // ~1/60 second

/// Maximum number of physics steps per frame to prevent spiral of death
pub const MAX_PHYSICS_STEPS: u32 = 5;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Something driven by the game loop
pub trait TickTarget {
    /// Fixed-rate tick, `dt` is always [`FIXED_TIMESTEP`]
    fn tick_physics(&mut self, dt: f32);

    /// Once per frame, after the physics ticks, with the frame's duration
    fn tick_logical(&mut self, dt: f32);

    /// Once per frame instead of the ticks while the loop is paused
    fn tick_paused(&mut self) {}
}

/// Game loop timing state
pub struct GameLoop {
    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Instant,

    paused: bool,

    /// Frame timing history for FPS calculation
    frame_times: Vec<Duration>,

    frame_count: u64,

    /// Total physics ticks executed
    physics_tick_count: u64,

    current_fps: f32,
}

impl GameLoop {
    /// Create a new game loop
    pub fn new() -> Self {
        Self {
            accumulator: Duration::ZERO,
            last_frame_time: Instant::now(),
            paused: false,
            frame_times: Vec::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            physics_tick_count: 0,
            current_fps: 0.0,
        }
    }

    /// Run one frame measured against the wall clock
    pub fn tick<T: TickTarget + ?Sized>(&mut self, target: &mut T) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time, target)
    }

    /// Run one frame of `frame_time`. Returns the number of physics ticks.
    ///
    /// Time beyond [`MAX_PHYSICS_STEPS`] ticks is dropped rather than carried
    /// into the next frame.
    pub fn advance<T: TickTarget + ?Sized>(&mut self, frame_time: Duration, target: &mut T) -> u32 {
        self.frame_count += 1;
        self.frame_times.push(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.remove(0);
        }
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        // If paused, nothing moves
        if self.paused {
            target.tick_paused();
            return 0;
        }

        self.accumulator += frame_time;

        let mut ticks = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && ticks < MAX_PHYSICS_STEPS {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            target.tick_physics(FIXED_TIMESTEP);
            ticks += 1;
        }
        if ticks == MAX_PHYSICS_STEPS && self.accumulator >= FIXED_TIMESTEP_DURATION {
            log::debug!(
                "Frame of {:?} hit the physics step cap, dropping {:?}",
                frame_time,
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }

        target.tick_logical(frame_time.as_secs_f32());

        self.physics_tick_count += ticks as u64;
        ticks
    }

    /// Interpolation alpha between the last two physics states
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / FIXED_TIMESTEP
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total physics ticks executed
    pub fn physics_tick_count(&self) -> u64 {
        self.physics_tick_count
    }

    /// Check if game is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the game
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Game paused");
        }
    }

    /// Resume the game
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            self.last_frame_time = Instant::now();
            log::info!("Game resumed");
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Update FPS calculation
    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Tick {
        Physics,
        Logical(f32),
        Paused,
    }

    #[derive(Default)]
    struct Recorder {
        ticks: Vec<Tick>,
    }

    impl TickTarget for Recorder {
        fn tick_physics(&mut self, dt: f32) {
            assert_eq!(dt, FIXED_TIMESTEP);
            self.ticks.push(Tick::Physics);
        }

        fn tick_logical(&mut self, dt: f32) {
            self.ticks.push(Tick::Logical(dt));
        }

        fn tick_paused(&mut self) {
            self.ticks.push(Tick::Paused);
        }
    }

    #[test]
    fn test_physics_before_logic() {
        let mut game_loop = GameLoop::new();
        let mut recorder = Recorder::default();

        let ticks = game_loop.advance(Duration::from_millis(34), &mut recorder);
        assert_eq!(ticks, 2);
        assert_eq!(recorder.ticks.len(), 3);
        assert_eq!(recorder.ticks[0], Tick::Physics);
        assert_eq!(recorder.ticks[1], Tick::Physics);
        assert!(matches!(recorder.ticks[2], Tick::Logical(dt) if (dt - 0.034).abs() < 1e-6));
    }

    #[test]
    fn test_short_frame_still_ticks_logic() {
        let mut game_loop = GameLoop::new();
        let mut recorder = Recorder::default();

        assert_eq!(game_loop.advance(Duration::from_millis(5), &mut recorder), 0);
        assert_eq!(recorder.ticks.len(), 1);

        // Remainders accumulate across frames
        assert_eq!(game_loop.advance(Duration::from_millis(12), &mut recorder), 1);
    }

    #[test]
    fn test_max_physics_steps_limit() {
        let mut game_loop = GameLoop::new();
        let mut recorder = Recorder::default();

        let ticks = game_loop.advance(Duration::from_millis(300), &mut recorder);
        assert_eq!(ticks, MAX_PHYSICS_STEPS);
        assert!(game_loop.alpha() < 1.0);

        // The dropped time does not replay next frame
        let ticks = game_loop.advance(Duration::from_millis(1), &mut recorder);
        assert_eq!(ticks, 0);
        assert_eq!(game_loop.physics_tick_count(), MAX_PHYSICS_STEPS as u64);
    }

    #[test]
    fn test_paused_no_ticks() {
        let mut game_loop = GameLoop::new();
        let mut recorder = Recorder::default();
        game_loop.pause();

        assert_eq!(game_loop.advance(Duration::from_millis(50), &mut recorder), 0);
        assert_eq!(recorder.ticks, vec![Tick::Paused]);
        assert_eq!(game_loop.frame_count(), 1);

        game_loop.resume();
        assert!(game_loop.alpha() == 0.0);
    }

    #[test]
    fn test_toggle_pause() {
        let mut game_loop = GameLoop::new();
        game_loop.toggle_pause();
        assert!(game_loop.is_paused());
        game_loop.toggle_pause();
        assert!(!game_loop.is_paused());
    }

    #[test]
    fn test_fps_from_frame_times() {
        let mut game_loop = GameLoop::new();
        let mut recorder = Recorder::default();
        for _ in 0..10 {
            game_loop.advance(Duration::from_millis(20), &mut recorder);
        }
        assert!((game_loop.fps() - 50.0).abs() < 0.5);
    }
}
