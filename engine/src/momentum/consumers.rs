use super::{Axes, MomentumConfig, MomentumState};

/// Inertia for free-form canvas panning.
#[derive(Debug, Clone)]
pub struct CanvasPan {
    config: MomentumConfig,
    state: MomentumState,
    zoom: f64,
}

impl CanvasPan {
    pub fn new(config: MomentumConfig) -> Self {
        Self {
            config,
            state: MomentumState::default(),
            zoom: 1.0,
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn state(&self) -> &MomentumState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// A new drag cancels any momentum still running.
    pub fn begin_drag(&mut self) {
        self.state.reset();
    }

    pub fn end_drag(&mut self, velocity: Axes) {
        self.state = MomentumState::start(&self.config, velocity, self.zoom);
        self.state.settle(&self.config);
    }

    /// Advances one tick and returns the new canvas offset.
    pub fn tick(&mut self, position: Axes) -> Axes {
        if !self.state.is_running() {
            return position;
        }
        let moved = self.state.step(&self.config);
        self.state.settle(&self.config);
        position + moved
    }
}

impl Default for CanvasPan {
    fn default() -> Self {
        Self::new(MomentumConfig::graph())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
    Both,
}

/// Momentum for scrolling content along its permitted axes. Zoom does not
/// apply.
#[derive(Debug, Clone)]
pub struct ScrollMomentum {
    config: MomentumConfig,
    state: MomentumState,
    axis: ScrollAxis,
}

impl ScrollMomentum {
    pub fn new(config: MomentumConfig, axis: ScrollAxis) -> Self {
        Self {
            config,
            state: MomentumState::default(),
            axis,
        }
    }

    pub fn state(&self) -> &MomentumState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn begin_drag(&mut self) {
        self.state.reset();
    }

    pub fn end_drag(&mut self, velocity: Axes) {
        let velocity = match self.axis {
            ScrollAxis::Horizontal => Axes::new(velocity.x, 0.0),
            ScrollAxis::Vertical => Axes::new(0.0, velocity.y),
            ScrollAxis::Both => velocity,
        };
        self.state = MomentumState::start(&self.config, velocity, 1.0);
        self.state.settle(&self.config);
    }

    /// Advances one tick and returns the new scroll offset.
    pub fn tick(&mut self, position: Axes) -> Axes {
        if !self.state.is_running() {
            return position;
        }
        let moved = self.state.step(&self.config);
        self.state.settle(&self.config);
        position + moved
    }
}

impl Default for ScrollMomentum {
    fn default() -> Self {
        Self::new(MomentumConfig::scroll(), ScrollAxis::Vertical)
    }
}
