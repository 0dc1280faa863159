//! Exponential-decay momentum for canvas panning and content scrolling.
//!
//! When a gesture ends, its velocity is turned into an amplitude: the total
//! displacement still to travel. Each tick moves by `amplitude /
//! time_constant` and shrinks the amplitude by the same amount, until either
//! the step budget is spent or the amplitude is negligible. The two axes run
//! and finish independently.

pub mod consumers;

use serde::Deserialize;

pub use consumers::{CanvasPan, ScrollAxis, ScrollMomentum};

/// A pair of per-axis scalars (velocity, position, delta).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Axes {
    pub x: f64,
    pub y: f64,
}

impl Axes {
    pub const ZERO: Axes = Axes { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Axes {
    type Output = Axes;

    fn add(self, rhs: Axes) -> Axes {
        Axes::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Tuning for one momentum consumer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Minimum gesture speed (per axis) for momentum to run at all.
    pub velocity_threshold: f64,
    /// Derives both the time constant and the step budget.
    pub duration: f64,
    pub min_velocity_magnitude: f64,
    pub max_velocity_magnitude: f64,
    pub damp_factor: f64,
    pub amplitude_minimum: f64,
}

impl MomentumConfig {
    /// Canvas panning.
    pub fn graph() -> Self {
        Self {
            velocity_threshold: 220.0,
            duration: 70.0,
            min_velocity_magnitude: 1.0,
            max_velocity_magnitude: 1000.0,
            damp_factor: 2.8,
            amplitude_minimum: 0.001,
        }
    }

    /// Scrolling inside previewed content. Stops once a step would move
    /// less than 0.1.
    pub fn scroll() -> Self {
        let base = Self::graph();
        Self {
            velocity_threshold: 40.0,
            amplitude_minimum: 0.1 * base.time_constant(),
            ..base
        }
    }

    pub fn time_constant(&self) -> f64 {
        1.0 + self.duration / 6.0
    }

    pub fn end_step_count(&self) -> f64 {
        6.0 * self.time_constant()
    }

    /// Clamps the magnitude of `velocity` into
    /// `[min_velocity_magnitude, max_velocity_magnitude]`, keeping its sign.
    pub fn bound_velocity(&self, velocity: f64) -> f64 {
        let sign = if velocity < 0.0 { -1.0 } else { 1.0 };
        let magnitude = velocity.abs();
        if magnitude < self.min_velocity_magnitude {
            sign * self.min_velocity_magnitude
        } else if magnitude > self.max_velocity_magnitude {
            sign * self.max_velocity_magnitude
        } else {
            velocity
        }
    }

    /// Initial amplitude for `velocity`. Zooming in (zoom < 1) travels
    /// further in graph space.
    pub fn amplitude(&self, velocity: f64, zoom: f64) -> f64 {
        let zoom = if zoom > 0.0 && zoom.is_finite() {
            zoom
        } else {
            log::warn!("Invalid zoom {} for momentum, using 1", zoom);
            1.0
        };
        self.bound_velocity(velocity / self.damp_factor) * (1.0 / zoom)
    }
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self::graph()
    }
}

/// Momentum of a pair of axes: `Idle -> Running -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MomentumState {
    pub amplitude: Axes,
    pub delta: Axes,
    pub step_x: u32,
    pub step_y: u32,
    pub should_run_x: bool,
    pub should_run_y: bool,
}

impl MomentumState {
    /// State after a gesture ends with `velocity`. Each axis runs only if
    /// its speed exceeds the threshold.
    pub fn start(config: &MomentumConfig, velocity: Axes, zoom: f64) -> Self {
        let state = Self {
            amplitude: Axes::new(
                config.amplitude(velocity.x, zoom),
                config.amplitude(velocity.y, zoom),
            ),
            should_run_x: velocity.x.abs() > config.velocity_threshold,
            should_run_y: velocity.y.abs() > config.velocity_threshold,
            ..Self::default()
        };
        log::debug!(
            "Momentum start: velocity {:?}, amplitude {:?}, running x={} y={}",
            velocity,
            state.amplitude,
            state.should_run_x,
            state.should_run_y
        );
        state
    }

    pub fn is_running(&self) -> bool {
        self.should_run_x || self.should_run_y
    }

    /// Advances every running axis once and returns the displacement applied
    /// this step (zero for idle axes).
    pub fn step(&mut self, config: &MomentumConfig) -> Axes {
        let time_constant = config.time_constant();
        let mut moved = Axes::ZERO;
        if self.should_run_y {
            self.delta.y = self.amplitude.y / time_constant;
            self.amplitude.y -= self.delta.y;
            self.step_y += 1;
            moved.y = self.delta.y;
        }
        if self.should_run_x {
            self.delta.x = self.amplitude.x / time_constant;
            self.amplitude.x -= self.delta.x;
            self.step_x += 1;
            moved.x = self.delta.x;
        }
        moved
    }

    /// Step budget spent or amplitude negligible. Whether the axis was
    /// running at all is not considered.
    pub fn did_x_finish(&self, config: &MomentumConfig) -> bool {
        self.step_x as f64 > config.end_step_count()
            || self.amplitude.x.abs() < config.amplitude_minimum
    }

    pub fn did_y_finish(&self, config: &MomentumConfig) -> bool {
        self.step_y as f64 > config.end_step_count()
            || self.amplitude.y.abs() < config.amplitude_minimum
    }

    /// Stops finished or idle axes; once neither runs the whole state is
    /// reset.
    pub fn settle(&mut self, config: &MomentumConfig) {
        if self.did_x_finish(config) || !self.should_run_x {
            self.should_run_x = false;
            self.amplitude.x = 0.0;
            self.delta.x = 0.0;
            self.step_x = 0;
        }
        if self.did_y_finish(config) || !self.should_run_y {
            self.should_run_y = false;
            self.amplitude.y = 0.0;
            self.delta.y = 0.0;
            self.step_y = 0;
        }
        if !self.is_running() {
            self.reset();
        }
    }

    /// Zeroes everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_constants() {
        let config = MomentumConfig::graph();
        assert!((config.time_constant() - (1.0 + 70.0 / 6.0)).abs() < 1e-12);
        assert!((config.end_step_count() - 76.0).abs() < 1e-9);
    }

    #[test]
    fn test_bound_velocity_keeps_sign() {
        let config = MomentumConfig::graph();
        assert_eq!(config.bound_velocity(0.2), 1.0);
        assert_eq!(config.bound_velocity(-0.2), -1.0);
        assert_eq!(config.bound_velocity(-5000.0), -1000.0);
        assert_eq!(config.bound_velocity(300.0), 300.0);
    }

    #[test]
    fn test_amplitude_scales_with_inverse_zoom() {
        let config = MomentumConfig::graph();
        let at_one = config.amplitude(560.0, 1.0);
        assert!((at_one - 200.0).abs() < 1e-9);
        assert!((config.amplitude(560.0, 0.5) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_velocity_does_not_run() {
        let config = MomentumConfig::graph();
        let state = MomentumState::start(&config, Axes::new(220.0, -220.0), 1.0);
        assert!(!state.is_running());
    }

    #[test]
    fn test_axes_run_independently() {
        let config = MomentumConfig::graph();
        let mut state = MomentumState::start(&config, Axes::new(900.0, 10.0), 1.0);
        assert!(state.should_run_x);
        assert!(!state.should_run_y);
        let moved = state.step(&config);
        assert!(moved.x > 0.0);
        assert_eq!(moved.y, 0.0);
        assert_eq!(state.step_y, 0);
    }

    #[test]
    fn test_step_moves_by_amplitude_over_time_constant() {
        let config = MomentumConfig::graph();
        let mut state = MomentumState::start(&config, Axes::new(0.0, -2800.0), 1.0);
        let amplitude = state.amplitude.y;
        let moved = state.step(&config);
        assert!((moved.y - amplitude / config.time_constant()).abs() < 1e-12);
        assert!((state.amplitude.y - (amplitude - moved.y)).abs() < 1e-12);
        assert_eq!(state.step_y, 1);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let config = MomentumConfig::graph();
        let mut state = MomentumState::start(&config, Axes::new(900.0, 900.0), 1.0);
        state.step(&config);
        state.reset();
        assert_eq!(state, MomentumState::default());
    }
}
