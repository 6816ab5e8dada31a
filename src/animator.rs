use tracing::{debug, trace};

use crate::{
    error::{Result, ZPlaneError},
    interp::lerp_complex,
    timeline::{Clock, TIME_EPSILON, Track, validate_delta},
    types::{Complex, Value},
};

/// A target z-plane coordinate and the time spent leaving it.
///
/// `duration` is the length of the transition from this waypoint to the next one. For the
/// final waypoint it is a dwell at the final position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub target: Complex,
    /// Seconds. Must be finite and non-negative.
    pub duration: Value,
}

impl Waypoint {
    pub fn new(re: Value, im: Value, duration: Value) -> Self {
        Self {
            target: Complex::new(re, im),
            duration,
        }
    }

    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ZPlaneError::InvalidDuration {
                index,
                duration: self.duration,
            });
        }
        for (name, value) in [("waypoint.re", self.target.re), ("waypoint.im", self.target.im)] {
            if !value.is_finite() {
                return Err(ZPlaneError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Where on the path a given elapsed time falls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathLocation {
    /// Inside segment `segment` at `progress` ∈ [0, 1].
    Segment { segment: usize, progress: Value },
    /// At or past the end of the last segment.
    End,
}

/// Ordered, immutable list of waypoints with precomputed segment end times.
///
/// ```text
/// segment i:  waypoint[i] ──(waypoint[i].duration)──▶ waypoint[i + 1]
/// last:       waypoint[n-1] dwells for waypoint[n-1].duration
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPath {
    waypoints: Vec<Waypoint>,
    /// `ends[i]` = sum of durations `0..=i`.
    ends: Vec<Value>,
}

impl WaypointPath {
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self> {
        let mut ends = Vec::with_capacity(waypoints.len());
        let mut total = 0.0;
        for (index, waypoint) in waypoints.iter().enumerate() {
            waypoint.validate(index)?;
            total += waypoint.duration;
            ends.push(total);
        }
        Ok(Self { waypoints, ends })
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Sum of all segment durations.
    pub fn total_duration(&self) -> Value {
        self.ends.last().copied().unwrap_or(0.0)
    }

    /// Finds the segment active at `elapsed`. Zero-length segments are never active.
    pub fn locate(&self, elapsed: Value) -> PathLocation {
        if self.is_empty() || elapsed >= self.total_duration() - TIME_EPSILON {
            return PathLocation::End;
        }
        // First segment whose end lies strictly after `elapsed`.
        let segment = self.ends.partition_point(|&end| end <= elapsed);
        let start = if segment == 0 { 0.0 } else { self.ends[segment - 1] };
        let duration = self.waypoints[segment].duration;
        let progress = ((elapsed - start) / duration).clamp(0.0, 1.0);
        PathLocation::Segment { segment, progress }
    }

    /// Position inside `segment` at `progress`.
    pub fn position(&self, segment: usize, progress: Value) -> Complex {
        let from = self.waypoints[segment].target;
        let to = self
            .waypoints
            .get(segment + 1)
            .map_or(from, |waypoint| waypoint.target);
        lerp_complex(from, to, progress.clamp(0.0, 1.0))
    }

    fn final_position(&self) -> Option<Complex> {
        self.waypoints.last().map(|waypoint| waypoint.target)
    }
}

impl Track for WaypointPath {
    type Output = Option<Complex>;

    fn duration(&self) -> Value {
        self.total_duration()
    }

    fn sample(&self, elapsed: Value) -> Option<Complex> {
        match self.locate(elapsed) {
            PathLocation::Segment { segment, progress } => Some(self.position(segment, progress)),
            PathLocation::End => self.final_position(),
        }
    }
}

/// Phase of a [`WaypointAnimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorState {
    Idle,
    Transitioning { segment: usize, progress: Value },
    Done,
}

/// Live state exposed to the readout: segment, progress and current position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub segment: usize,
    pub progress: Value,
    pub position: Complex,
}

/// Outcome of one [`WaypointAnimator::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Still transitioning.
    Moving,
    /// Entered [`AnimatorState::Done`] during this call.
    Finished,
    /// Was already done; nothing changed.
    Done,
}

/// Time-driven state machine moving a point along a [`WaypointPath`].
///
/// ```text
/// Idle ──start / first advance──▶ Transitioning(0, 0) ──…──▶ Transitioning(n-1, 1) ──▶ Done
///   └──────────────── empty path ─────────────────────────────────────────────────────▲
/// ```
///
/// The state is derived from total elapsed time, so the position at a given time does not
/// depend on how many `advance` calls it took to get there.
#[derive(Debug, Clone)]
pub struct WaypointAnimator {
    path: WaypointPath,
    clock: Clock,
    state: AnimatorState,
}

impl WaypointAnimator {
    pub fn new(path: WaypointPath) -> Self {
        Self {
            path,
            clock: Clock::new(),
            state: AnimatorState::Idle,
        }
    }

    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Result<Self> {
        Ok(Self::new(WaypointPath::new(waypoints)?))
    }

    pub fn path(&self) -> &WaypointPath {
        &self.path
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    /// Seconds advanced since [`start`](WaypointAnimator::start).
    pub fn elapsed(&self) -> Value {
        self.clock.elapsed()
    }

    pub fn is_done(&self) -> bool {
        self.state == AnimatorState::Done
    }

    /// Resets to the first segment. An empty path goes straight to `Done`.
    pub fn start(&mut self) -> Step {
        self.clock.reset();
        self.state = AnimatorState::Idle;
        self.settle()
    }

    /// Advances by `delta` seconds. Starts the animation if it is still idle.
    ///
    /// Once `Done`, further calls are no-ops returning [`Step::Done`].
    pub fn advance(&mut self, delta: Value) -> Result<Step> {
        validate_delta(delta)?;
        match self.state {
            AnimatorState::Done => return Ok(Step::Done),
            AnimatorState::Idle => {
                if self.start() == Step::Finished {
                    return Ok(Step::Finished);
                }
            }
            AnimatorState::Transitioning { .. } => {}
        }
        self.clock.tick(delta)?;
        Ok(self.settle())
    }

    /// Recomputes the state from elapsed time.
    fn settle(&mut self) -> Step {
        let previous = self.state;
        self.state = match self.path.locate(self.clock.elapsed()) {
            PathLocation::Segment { segment, progress } => {
                AnimatorState::Transitioning { segment, progress }
            }
            PathLocation::End => AnimatorState::Done,
        };

        match (previous, self.state) {
            (AnimatorState::Done, _) => Step::Done,
            (_, AnimatorState::Done) => {
                debug!(
                    elapsed = self.clock.elapsed(),
                    waypoints = self.path.len(),
                    "waypoint animation finished"
                );
                Step::Finished
            }
            (prev, AnimatorState::Transitioning { segment, .. }) => {
                let same_segment = matches!(
                    prev,
                    AnimatorState::Transitioning { segment: s, .. } if s == segment
                );
                if !same_segment {
                    trace!(segment, elapsed = self.clock.elapsed(), "entered segment");
                }
                Step::Moving
            }
            (_, AnimatorState::Idle) => Step::Moving,
        }
    }

    /// Current position. `None` before the first advance and for an empty path.
    pub fn position(&self) -> Option<Complex> {
        match self.state {
            AnimatorState::Idle => None,
            AnimatorState::Transitioning { segment, progress } => {
                Some(self.path.position(segment, progress))
            }
            AnimatorState::Done => self.path.final_position(),
        }
    }

    /// Segment, progress and position, when a position is defined.
    pub fn animation_state(&self) -> Option<AnimationState> {
        let position = self.position()?;
        let (segment, progress) = match self.state {
            AnimatorState::Transitioning { segment, progress } => (segment, progress),
            _ => (self.path.len().saturating_sub(1), 1.0),
        };
        Some(AnimationState {
            segment,
            progress,
            position,
        })
    }
}
