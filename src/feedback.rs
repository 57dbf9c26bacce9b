//! Feedback signals (haptics/sound) emitted by the simulation
//!
//! The simulation only names *what* happened; a [`FeedbackDevice`] decides
//! how to render it. Device drivers live outside this crate.

use serde::{Deserialize, Serialize};

/// Feedback signal types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackSignal {
    /// Run started (idle tap or restart)
    Start,
    /// Character jumped
    Click,
    /// Character hit an obstacle
    Failure,
}

/// Vibration envelope for a signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    /// Strength (0.0 - 1.0)
    pub intensity: f32,
    /// Length in milliseconds
    pub duration_ms: u32,
    /// Number of repeats
    pub count: u32,
}

impl FeedbackSignal {
    /// Suggested envelope for devices that vibrate
    pub fn pulse(&self) -> Pulse {
        match self {
            FeedbackSignal::Start => Pulse {
                intensity: 0.5,
                duration_ms: 40,
                count: 1,
            },
            FeedbackSignal::Click => Pulse {
                intensity: 0.25,
                duration_ms: 10,
                count: 1,
            },
            FeedbackSignal::Failure => Pulse {
                intensity: 1.0,
                duration_ms: 80,
                count: 2,
            },
        }
    }
}

/// Sink for feedback signals
pub trait FeedbackDevice {
    fn signal(&mut self, signal: FeedbackSignal);
}

/// Writes every signal to the log (headless runs)
#[derive(Debug, Default, Clone)]
pub struct LogFeedback {
    /// Signals seen so far
    pub count: u64,
}

impl FeedbackDevice for LogFeedback {
    fn signal(&mut self, signal: FeedbackSignal) {
        self.count += 1;
        let pulse = signal.pulse();
        log::debug!(
            "feedback {:?}: {}x {}ms @ {:.2}",
            signal,
            pulse.count,
            pulse.duration_ms,
            pulse.intensity
        );
    }
}
