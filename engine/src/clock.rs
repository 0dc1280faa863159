//! Graph time and pulse semantics.

use crate::model::value::{GraphTime, Loop};

/// Monotonic simulation clock, advanced once per tick by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphClock {
    frame_rate: f64,
    frame: u64,
}

impl GraphClock {
    pub fn new(frame_rate: f64) -> Self {
        let frame_rate = if frame_rate.is_finite() && frame_rate > 0.0 {
            frame_rate
        } else {
            log::warn!("Invalid frame rate {}, using 60", frame_rate);
            60.0
        };
        Self {
            frame_rate,
            frame: 0,
        }
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current graph time in seconds.
    pub fn current_graph_time(&self) -> GraphTime {
        self.frame as f64 / self.frame_rate
    }

    /// Advances one tick and returns the new graph time.
    pub fn advance(&mut self) -> GraphTime {
        self.frame += 1;
        self.current_graph_time()
    }

    /// Graph time of the next tick; what a pulse scheduled "now" should carry.
    pub fn next_tick_time(&self) -> GraphTime {
        (self.frame + 1) as f64 / self.frame_rate
    }
}

impl Default for GraphClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}

/// A pulse fires on exactly the tick it was scheduled for.
#[allow(clippy::float_cmp)]
pub fn should_pulse(pulse_time: GraphTime, current_time: GraphTime) -> bool {
    pulse_time == current_time
}

/// Whether any pulse in `pulses` fires at `current_time`. Non-pulse values
/// never fire.
pub fn some_index_pulsed(pulses: &Loop, current_time: GraphTime) -> bool {
    pulses
        .iter()
        .filter_map(|v| v.as_pulse())
        .any(|t| should_pulse(t, current_time))
}
