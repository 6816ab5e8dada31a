//! A single playback clock and the time-indexed tracks sampled from it.
//!
//! Every animated property is a [`Track`]: a pure function of elapsed time. The render loop
//! ticks one [`Clock`] per frame and samples each track independently, so tracks never wait
//! on each other and their order does not matter.

use crate::{
    error::{Result, ZPlaneError},
    interp::lerp,
    types::Value,
};

/// Slack applied when comparing accumulated time against segment boundaries.
pub const TIME_EPSILON: Value = 1e-9;

/// An animated property described as a function of elapsed seconds.
pub trait Track {
    type Output;

    /// Time after which the output no longer changes.
    fn duration(&self) -> Value;

    /// Value of the property at `elapsed` seconds since the run started.
    fn sample(&self, elapsed: Value) -> Self::Output;

    fn is_finished(&self, elapsed: Value) -> bool {
        elapsed >= self.duration() - TIME_EPSILON
    }
}

/// Checks a tick delta: finite and non-negative.
pub fn validate_delta(delta: Value) -> Result<()> {
    if !delta.is_finite() || delta < 0.0 {
        return Err(ZPlaneError::InvalidDelta { delta });
    }
    Ok(())
}

/// Accumulates frame deltas into elapsed run time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    elapsed: Value,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by `delta` seconds and returns the new elapsed time.
    pub fn tick(&mut self, delta: Value) -> Result<Value> {
        validate_delta(delta)?;
        self.elapsed += delta;
        Ok(self.elapsed)
    }

    pub fn elapsed(&self) -> Value {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Linear opacity ramp from `from` to `to`, starting at `start` and lasting `duration` seconds.
///
/// Holds `from` before the ramp and `to` after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub start: Value,
    pub duration: Value,
    pub from: Value,
    pub to: Value,
}

impl Fade {
    pub fn new(start: Value, duration: Value, from: Value, to: Value) -> Self {
        Self {
            start,
            duration,
            from,
            to,
        }
    }

    pub fn fade_in(start: Value, duration: Value) -> Self {
        Self::new(start, duration, 0.0, 1.0)
    }
}

impl Track for Fade {
    type Output = Value;

    fn duration(&self) -> Value {
        self.start + self.duration.max(0.0)
    }

    fn sample(&self, elapsed: Value) -> Value {
        if elapsed <= self.start {
            return self.from;
        }
        if self.duration <= 0.0 || elapsed >= self.start + self.duration {
            return self.to;
        }
        lerp(self.from, self.to, (elapsed - self.start) / self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_accumulates() {
        let mut clock = Clock::new();
        clock.tick(0.5).unwrap();
        assert_eq!(clock.tick(1.0).unwrap(), 1.5);
        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_clock_rejects_negative_delta() {
        let mut clock = Clock::new();
        assert!(matches!(
            clock.tick(-0.1),
            Err(ZPlaneError::InvalidDelta { .. })
        ));
        assert!(clock.tick(Value::INFINITY).is_err());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_fade_ramp() {
        let fade = Fade::new(1.0, 2.0, 1.0, 0.1);
        assert_eq!(fade.sample(0.0), 1.0);
        assert_eq!(fade.sample(1.0), 1.0);
        assert!((fade.sample(2.0) - 0.55).abs() < 1e-12);
        assert_eq!(fade.sample(3.0), 0.1);
        assert_eq!(fade.sample(100.0), 0.1);
        assert_eq!(fade.duration(), 3.0);
        assert!(fade.is_finished(3.0));
        assert!(!fade.is_finished(2.5));
    }

    #[test]
    fn test_instant_fade() {
        let fade = Fade::fade_in(2.0, 0.0);
        assert_eq!(fade.sample(2.0), 0.0);
        assert_eq!(fade.sample(2.0 + 1e-6), 1.0);
    }
}
