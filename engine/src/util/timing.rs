use std::borrow::Cow;
use std::time::{Duration, Instant};

use log::Level;

/// Logs how long a scope took when dropped.
pub struct ScopedTimer {
    label: Option<Cow<'static, str>>,
    level: Level,
    start: Instant,
}

impl ScopedTimer {
    /// Builds the label only when debug logging is enabled; otherwise the
    /// timer stays silent.
    pub fn debug_lazy<F>(label_gen: F) -> Self
    where
        F: FnOnce() -> String,
    {
        let label = log::log_enabled!(Level::Debug).then(|| Cow::Owned(label_gen()));
        Self {
            label,
            level: Level::Debug,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if let Some(label) = &self.label {
            log::log!(self.level, "{} took {} µs", label, self.elapsed().as_micros());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_label_not_built_when_disabled() {
        let mut built = false;
        let timer = ScopedTimer::debug_lazy(|| {
            built = true;
            "tick".to_string()
        });
        assert_eq!(built, log::log_enabled!(Level::Debug));
        assert!(timer.elapsed() >= Duration::ZERO);
    }
}
