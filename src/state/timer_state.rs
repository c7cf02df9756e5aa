//! Timer state structure and the pure display computations

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Color classification shown next to a running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorState {
    #[default]
    None,
    Yellow,
    Green,
    Red,
}

/// Elapsed-time marks in milliseconds. A missing or zero mark is never reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub yellow: Option<u64>,
    pub green: Option<u64>,
    pub red: Option<u64>,
}

impl Thresholds {
    pub fn new(yellow: Option<u64>, green: Option<u64>, red: Option<u64>) -> Self {
        Self { yellow, green, red }
    }

    /// Build thresholds from whole seconds, treating 0 as disabled
    pub fn from_secs(yellow: u64, green: u64, red: u64) -> Self {
        let ms = |secs: u64| (secs > 0).then(|| secs * 1000);
        Self::new(ms(yellow), ms(green), ms(red))
    }

    /// Prepared speech marks: 4, 5 and 6 minutes
    pub fn prepared_speech() -> Self {
        Self::from_secs(4 * 60, 5 * 60, 6 * 60)
    }

    /// Table topics marks: 1 minute, 1:30 and 1:45
    pub fn table_topics() -> Self {
        Self::from_secs(60, 90, 105)
    }

    /// Classify an elapsed time. Red wins over green, green over yellow.
    pub fn color_for(&self, elapsed_ms: u64) -> ColorState {
        let reached = |mark: Option<u64>| matches!(mark, Some(m) if m > 0 && elapsed_ms >= m);

        if reached(self.red) {
            ColorState::Red
        } else if reached(self.green) {
            ColorState::Green
        } else if reached(self.yellow) {
            ColorState::Yellow
        } else {
            ColorState::None
        }
    }
}

/// Format milliseconds as `MM:SS`. Minutes are not capped at 59.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let total_secs = elapsed_ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// What a timer sink is asked to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDisplay {
    pub text: String,
    pub color: ColorState,
}

impl TimerDisplay {
    pub fn for_elapsed(elapsed_ms: u64, thresholds: &Thresholds) -> Self {
        Self {
            text: format_elapsed(elapsed_ms),
            color: thresholds.color_for(elapsed_ms),
        }
    }

    /// The cleared display shown after a reset
    pub fn zero() -> Self {
        Self {
            text: format_elapsed(0),
            color: ColorState::None,
        }
    }
}

impl Default for TimerDisplay {
    fn default() -> Self {
        Self::zero()
    }
}

/// Timer state for one speech timer
#[derive(Debug, Clone)]
pub struct TimerState {
    pub running: bool,
    pub elapsed_ms: u64,
    pub thresholds: Thresholds,
    origin: Option<Instant>,
}

impl TimerState {
    /// Create a stopped timer at zero
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            running: false,
            elapsed_ms: 0,
            thresholds,
            origin: None,
        }
    }

    /// Begin running from `now`, keeping previously accumulated time.
    /// Returns false if the timer was already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        let elapsed = Duration::from_millis(self.elapsed_ms);
        self.origin = Some(now.checked_sub(elapsed).unwrap_or(now));
        self.running = true;
        true
    }

    /// Pause. Elapsed time keeps its last ticked value.
    /// Returns false if the timer was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.origin = None;
        true
    }

    /// Stop and zero the elapsed time
    pub fn reset(&mut self) {
        self.stop();
        self.elapsed_ms = 0;
    }

    /// Recompute elapsed time from the origin and return what to display
    pub fn tick(&mut self, now: Instant) -> TimerDisplay {
        if let Some(origin) = self.origin {
            self.elapsed_ms = now.saturating_duration_since(origin).as_millis() as u64;
        }
        self.display()
    }

    pub fn color(&self) -> ColorState {
        self.thresholds.color_for(self.elapsed_ms)
    }

    pub fn display(&self) -> TimerDisplay {
        TimerDisplay::for_elapsed(self.elapsed_ms, &self.thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks() -> Thresholds {
        Thresholds::new(Some(100), Some(200), Some(300))
    }

    #[test]
    fn red_takes_precedence_over_lower_marks() {
        let t = marks();
        assert_eq!(t.color_for(300), ColorState::Red);
        assert_eq!(t.color_for(250), ColorState::Green);
        assert_eq!(t.color_for(150), ColorState::Yellow);
        assert_eq!(t.color_for(50), ColorState::None);
    }

    #[test]
    fn missing_and_zero_marks_are_never_reached() {
        let t = Thresholds::new(Some(0), None, Some(500));
        assert_eq!(t.color_for(0), ColorState::None);
        assert_eq!(t.color_for(499), ColorState::None);
        assert_eq!(t.color_for(500), ColorState::Red);
        assert_eq!(Thresholds::default().color_for(u64::MAX), ColorState::None);
    }

    #[test]
    fn out_of_order_marks_skip_yellow() {
        let t = Thresholds::new(Some(300), None, Some(100));
        assert_eq!(t.color_for(50), ColorState::None);
        assert_eq!(t.color_for(150), ColorState::Red);
        assert_eq!(t.color_for(400), ColorState::Red);
    }

    #[test]
    fn from_secs_treats_zero_as_disabled() {
        let t = Thresholds::from_secs(0, 90, 105);
        assert_eq!(t, Thresholds::new(None, Some(90_000), Some(105_000)));
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(999), "00:00");
        assert_eq!(format_elapsed(61_500), "01:01");
        assert_eq!(format_elapsed(125 * 60 * 1000), "125:00");
        assert_eq!(format_elapsed(61_500), format_elapsed(61_500));
    }

    #[test]
    fn start_is_a_no_op_while_running() {
        let now = Instant::now();
        let mut state = TimerState::new(marks());
        assert!(state.start(now));
        assert!(!state.start(now + Duration::from_secs(5)));
        state.tick(now + Duration::from_millis(1200));
        assert_eq!(state.elapsed_ms, 1200);
    }

    #[test]
    fn restart_continues_from_accumulated_time() {
        let now = Instant::now();
        let mut state = TimerState::new(marks());
        state.start(now);
        state.tick(now + Duration::from_millis(150));
        assert!(state.stop());
        assert!(!state.stop());

        let later = now + Duration::from_secs(10);
        state.start(later);
        let display = state.tick(later + Duration::from_millis(100));
        assert_eq!(state.elapsed_ms, 250);
        assert_eq!(display.color, ColorState::Green);
    }

    #[test]
    fn reset_clears_everything() {
        let now = Instant::now();
        let mut state = TimerState::new(marks());
        state.start(now);
        state.tick(now + Duration::from_millis(400));
        assert_eq!(state.color(), ColorState::Red);

        state.reset();
        assert!(!state.running);
        assert_eq!(state.elapsed_ms, 0);
        assert_eq!(state.color(), ColorState::None);
        assert_eq!(state.display(), TimerDisplay::zero());
    }
}
