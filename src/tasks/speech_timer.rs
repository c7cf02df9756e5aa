//! Speech timer with a background tick task

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, info};

use crate::{
    state::{ColorState, Thresholds, TimerDisplay, TimerState},
    utils::lock,
};

/// How often a running timer refreshes its display
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Output surface a timer writes its formatted time and color to
pub trait TimerSink: Send + Sync {
    fn render(&self, display: &TimerDisplay);
}

impl TimerSink for watch::Sender<TimerDisplay> {
    fn render(&self, display: &TimerDisplay) {
        // send_replace never fails, even with no receivers left
        self.send_replace(display.clone());
    }
}

/// Point-in-time view of a timer for the status endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub name: String,
    pub running: bool,
    pub elapsed_ms: u64,
    pub display: String,
    pub color: ColorState,
    pub thresholds: Thresholds,
}

/// A start/stop/reset timer that ticks every [`TICK_INTERVAL`] while running
pub struct Timer {
    name: String,
    state: Arc<Mutex<TimerState>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    sink: Arc<dyn TimerSink>,
}

impl Timer {
    pub fn new(name: impl Into<String>, thresholds: Thresholds, sink: Arc<dyn TimerSink>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(TimerState::new(thresholds))),
            ticker: Mutex::new(None),
            sink,
        }
    }

    /// Start or resume counting. Does nothing if already running.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut ticker = lock(&self.ticker);
        if !lock(&self.state).start(Instant::now()) {
            debug!("Timer {} already running", self.name);
            return;
        }

        info!("Starting timer {}", self.name);
        *ticker = Some(tokio::spawn(tick_task(
            self.name.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.sink),
        )));
    }

    /// Pause, keeping the elapsed time. Does nothing if not running.
    pub fn stop(&self) {
        let mut ticker = lock(&self.ticker);
        if !lock(&self.state).stop() {
            return;
        }
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        info!("Stopped timer {} at {}", self.name, lock(&self.state).display().text);
    }

    /// Stop and return to `00:00` with no color
    pub fn reset(&self) {
        let mut ticker = lock(&self.ticker);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        let mut state = lock(&self.state);
        state.reset();
        self.sink.render(&TimerDisplay::zero());
        drop(state);
        info!("Reset timer {}", self.name);
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let state = lock(&self.state);
        let display = state.display();
        TimerSnapshot {
            name: self.name.clone(),
            running: state.running,
            elapsed_ms: state.elapsed_ms,
            display: display.text,
            color: display.color,
            thresholds: state.thresholds,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("name", &self.name)
            .field("state", &*lock(&self.state))
            .finish()
    }
}

/// Background task refreshing one running timer
async fn tick_task(name: String, state: Arc<Mutex<TimerState>>, sink: Arc<dyn TimerSink>) {
    let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

    loop {
        interval.tick().await;

        // Render under the state lock so a concurrent reset cannot be overwritten
        let mut timer = lock(&state);
        if !timer.running {
            break;
        }
        let display = timer.tick(Instant::now());
        sink.render(&display);
    }

    debug!("Tick task for timer {} finished", name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<TimerDisplay>>,
    }

    impl RecordingSink {
        fn frames(&self) -> Vec<TimerDisplay> {
            self.frames.lock().unwrap().clone()
        }

        fn last(&self) -> Option<TimerDisplay> {
            self.frames.lock().unwrap().last().cloned()
        }
    }

    impl TimerSink for RecordingSink {
        fn render(&self, display: &TimerDisplay) {
            self.frames.lock().unwrap().push(display.clone());
        }
    }

    fn timer(thresholds: Thresholds) -> (Timer, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let timer = Timer::new("test", thresholds, sink.clone());
        (timer, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_every_200ms_while_running() {
        let (timer, sink) = timer(Thresholds::new(Some(500), Some(800), Some(2000)));
        timer.start();

        sleep(Duration::from_millis(1100)).await;
        let frames = sink.frames();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].color, ColorState::None);
        assert_eq!(frames[2].color, ColorState::Yellow);
        assert_eq!(frames[4], TimerDisplay { text: "00:01".to_string(), color: ColorState::Green });

        let snapshot = timer.snapshot();
        assert!(snapshot.running);
        assert_eq!(snapshot.elapsed_ms, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_does_not_double_tick() {
        let (timer, sink) = timer(Thresholds::default());
        timer.start();
        sleep(Duration::from_millis(100)).await;
        timer.start();

        sleep(Duration::from_millis(350)).await;
        assert_eq!(sink.frames().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_then_start_resumes_from_accumulated_time() {
        let (timer, sink) = timer(Thresholds::default());
        timer.start();
        sleep(Duration::from_millis(1100)).await;
        timer.stop();
        assert_eq!(timer.snapshot().elapsed_ms, 1000);

        sleep(Duration::from_secs(30)).await;
        let frames_while_paused = sink.frames().len();
        assert_eq!(frames_while_paused, 5);
        assert!(!timer.snapshot().running);

        timer.start();
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(timer.snapshot().elapsed_ms, 2000);
        assert_eq!(sink.last().unwrap().text, "00:02");
    }

    #[tokio::test(start_paused = true)]
    async fn reset_zeroes_and_silences_the_timer() {
        let (timer, sink) = timer(Thresholds::new(Some(100), Some(200), Some(300)));
        timer.start();
        sleep(Duration::from_millis(700)).await;
        assert_eq!(timer.snapshot().color, ColorState::Red);

        timer.reset();
        assert_eq!(sink.last(), Some(TimerDisplay::zero()));
        let snapshot = timer.snapshot();
        assert!(!snapshot.running);
        assert_eq!(snapshot.elapsed_ms, 0);
        assert_eq!(snapshot.color, ColorState::None);

        let frames = sink.frames().len();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.frames().len(), frames);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_on_a_stopped_timer_still_clears_display() {
        let (timer, sink) = timer(Thresholds::default());
        timer.stop();
        timer.reset();
        assert_eq!(sink.frames(), vec![TimerDisplay::zero()]);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_sender_sink_publishes_latest_frame() {
        let (tx, rx) = watch::channel(TimerDisplay::zero());
        let timer = Timer::new("watched", Thresholds::default(), Arc::new(tx));
        timer.start();
        sleep(Duration::from_millis(2100)).await;
        assert_eq!(rx.borrow().text, "00:02");
    }
}
