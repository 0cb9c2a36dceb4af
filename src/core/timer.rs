// Restartable countdown used for cooldowns and ability durations

/// Lifecycle of a [`Timer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    /// Never started; `update` is a no-op and returns false
    #[default]
    Stopped,
    /// Counting; `update` returns true on the tick it finishes
    Running,
    /// Elapsed; `update` keeps returning true until restarted
    Finished,
}

/// Countdown advanced explicitly by the owner every tick.
///
/// Finishing is sticky: once `update` has returned true it keeps doing so
/// until the timer is started again.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    duration: f32,
    elapsed: f32,
    state: TimerState,
}

impl Timer {
    /// Create a stopped timer with the given duration (seconds)
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            state: TimerState::Stopped,
        }
    }

    /// Create a timer that already reports itself as finished
    pub fn finished(duration: f32) -> Self {
        let mut timer = Self::new(duration);
        timer.force_finish();
        timer
    }

    /// Restart with the current duration
    pub fn start(&mut self) {
        self.start_with(self.duration);
    }

    /// Restart with a new duration
    pub fn start_with(&mut self, duration: f32) {
        self.elapsed = 0.0;
        self.duration = duration;
        self.state = TimerState::Running;
    }

    /// Advance by `dt`. Returns true on the finishing tick and on every call
    /// after it while finished.
    pub fn update(&mut self, dt: f32) -> bool {
        match self.state {
            TimerState::Stopped => false,
            TimerState::Running => {
                self.elapsed += dt;
                if self.elapsed > self.duration {
                    self.state = TimerState::Finished;
                    true
                } else {
                    false
                }
            }
            TimerState::Finished => true,
        }
    }

    /// Jump straight to the finished state, whatever the elapsed time
    pub fn force_finish(&mut self) {
        self.state = TimerState::Finished;
    }

    /// Return to the stopped state and clear the elapsed time
    pub fn stop(&mut self) {
        self.elapsed = 0.0;
        self.state = TimerState::Stopped;
    }

    /// Elapsed time divided by duration, unclamped.
    ///
    /// A zero-length timer reports 1.0 instead of dividing by zero.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        self.elapsed / self.duration
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }
}
