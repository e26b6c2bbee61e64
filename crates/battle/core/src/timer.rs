//! Pausable countdown/count-up timer driven by frame deltas.
//!
//! Every timed behaviour in the combat core (participant state windows,
//! status effect durations, the entrance sequence) is a [`Timer`]. Timers
//! never read a clock: progress only happens through [`Timer::update`], so a
//! timer that is not updated (frozen battle, paused timer) loses no progress
//! and gains none.

/// Lifecycle of a [`Timer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimerState {
    /// Configured but not started.
    #[default]
    Initial,
    Running,
    Paused,
    Finished,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    state: TimerState,
    duration_ms: u32,
    elapsed_ms: u32,
}

impl Timer {
    pub const fn new(duration_ms: u32) -> Self {
        Self {
            state: TimerState::Initial,
            duration_ms,
            elapsed_ms: 0,
        }
    }

    /// Replaces the duration and resets progress. The timer is left in
    /// `Initial`; call [`Timer::run`] to start it.
    pub fn initialize(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
        self.reset();
    }

    /// Clears progress while keeping the duration.
    pub fn reset(&mut self) {
        self.state = TimerState::Initial;
        self.elapsed_ms = 0;
    }

    /// Resets and immediately starts the timer.
    pub fn restart(&mut self) {
        self.reset();
        self.run();
    }

    /// Starts an initial timer or resumes a paused one. Finished timers stay
    /// finished.
    pub fn run(&mut self) {
        if matches!(self.state, TimerState::Initial | TimerState::Paused) {
            self.state = TimerState::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    /// Advances a running timer by `dt_ms`.
    ///
    /// Returns `true` only on the update in which the timer finishes.
    pub fn update(&mut self, dt_ms: u32) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms).min(self.duration_ms);
        if self.elapsed_ms >= self.duration_ms {
            self.state = TimerState::Finished;
            return true;
        }
        false
    }

    #[inline]
    pub fn state(&self) -> TimerState {
        self.state
    }

    #[inline]
    pub fn is_initial(&self) -> bool {
        self.state == TimerState::Initial
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    pub fn duration(&self) -> u32 {
        self.duration_ms
    }

    /// Count-up view.
    pub fn elapsed(&self) -> u32 {
        self.elapsed_ms
    }

    /// Countdown view.
    pub fn time_left(&self) -> u32 {
        self.duration_ms - self.elapsed_ms
    }

    /// Fraction complete in `[0.0, 1.0]`. A zero-length timer reads as
    /// complete once finished and empty before.
    pub fn percent_complete(&self) -> f32 {
        if self.duration_ms == 0 {
            return if self.is_finished() { 1.0 } else { 0.0 };
        }
        self.elapsed_ms as f32 / self.duration_ms as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_finishes_once() {
        let mut timer = Timer::new(100);
        timer.run();

        assert!(!timer.update(40));
        assert_eq!(timer.elapsed(), 40);
        assert_eq!(timer.time_left(), 60);

        assert!(timer.update(80));
        assert!(timer.is_finished());
        assert_eq!(timer.elapsed(), 100);

        // Further updates never report a second completion.
        assert!(!timer.update(10));
    }

    #[test]
    fn initial_timer_does_not_advance() {
        let mut timer = Timer::new(50);
        assert!(!timer.update(100));
        assert_eq!(timer.elapsed(), 0);
        assert!(timer.is_initial());
    }

    #[test]
    fn paused_time_is_not_counted() {
        let mut timer = Timer::new(100);
        timer.run();
        timer.update(30);
        timer.pause();
        timer.update(500);
        assert_eq!(timer.elapsed(), 30);

        timer.run();
        assert!(!timer.update(60));
        assert_eq!(timer.elapsed(), 90);
    }

    #[test]
    fn zero_duration_finishes_on_first_update() {
        let mut timer = Timer::new(0);
        timer.run();
        assert_eq!(timer.percent_complete(), 0.0);
        assert!(timer.update(0));
        assert_eq!(timer.percent_complete(), 1.0);
    }

    #[test]
    fn percent_complete_tracks_progress() {
        let mut timer = Timer::new(200);
        timer.run();
        timer.update(50);
        assert!((timer.percent_complete() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn initialize_resets_progress() {
        let mut timer = Timer::new(100);
        timer.run();
        timer.update(100);
        timer.initialize(300);
        assert!(timer.is_initial());
        assert_eq!(timer.elapsed(), 0);
        assert_eq!(timer.duration(), 300);
    }
}
