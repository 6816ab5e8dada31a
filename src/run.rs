use std::sync::Arc;

use tracing::info;

use crate::{
    animator::{AnimatorState, Step, WaypointAnimator},
    config::RunConfig,
    error::Result,
    mesh::MeshDescriptor,
    readout::{ReadoutSnapshot, ReadoutText, snapshot_from},
    surface::SurfaceMesh,
    types::{Complex, Value},
};

/// What the renderer receives for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Seconds since the run started.
    pub elapsed: Value,
    /// Marker position, `None` when the path is empty.
    pub position: Option<Complex>,
    pub readout: Option<ReadoutSnapshot>,
    /// `true` on exactly one tick: the one where the animator entered `Done`, or the first
    /// tick when the path had already finished at construction (empty or zero-length path).
    pub finished: bool,
}

/// One playback of a visualization: configuration, surface and marker animation.
///
/// The configuration and surface are shared read-only behind [`Arc`]s. Only the animator
/// changes, once per [`tick`](Run::tick):
///
/// ```text
/// tick(Δ)
///   → animator.advance(Δ)          (position at elapsed time)
///   → readout::snapshot_from       (exact H(z), queried once)
///   → Frame
/// ```
///
/// Dropping a run at any point is a complete teardown.
#[derive(Debug, Clone)]
pub struct Run {
    config: Arc<RunConfig>,
    surface: Arc<SurfaceMesh>,
    animator: WaypointAnimator,
    /// Set when `start` already finished the path; reported by the next tick.
    finish_pending: bool,
}

impl Run {
    /// Validates `config`, evaluates the surface and resets the animator to its first segment.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let surface = SurfaceMesh::build(&config)?;
        let mut animator = WaypointAnimator::from_waypoints(config.waypoints.clone())?;
        let finish_pending = animator.start() == Step::Finished;

        info!(
            grid = config.grid_resolution,
            waypoints = config.waypoints.len(),
            duration = animator.path().total_duration(),
            "run ready: {}",
            config.transfer
        );

        Ok(Self {
            config: Arc::new(config),
            surface: Arc::new(surface),
            animator,
            finish_pending,
        })
    }

    pub fn config(&self) -> &Arc<RunConfig> {
        &self.config
    }

    pub fn surface(&self) -> &Arc<SurfaceMesh> {
        &self.surface
    }

    pub fn animator(&self) -> &WaypointAnimator {
        &self.animator
    }

    pub fn elapsed(&self) -> Value {
        self.animator.elapsed()
    }

    /// Sum of all waypoint durations.
    pub fn duration(&self) -> Value {
        self.animator.path().total_duration()
    }

    pub fn is_done(&self) -> bool {
        self.animator.is_done()
    }

    /// Tessellates the surface at the configured tessellation resolution.
    pub fn mesh(&self) -> MeshDescriptor {
        self.surface.tessellate(self.config.tessellation_resolution)
    }

    /// Readout for the current animator state. Recomputed on every call.
    pub fn readout(&self) -> Option<ReadoutSnapshot> {
        self.animator
            .animation_state()
            .map(|state| snapshot_from(&self.config.transfer, &state))
    }

    /// Formats a readout with the configured precision.
    pub fn readout_text(&self, snapshot: &ReadoutSnapshot) -> ReadoutText {
        snapshot.format(&self.config.transfer, self.config.readout_precision)
    }

    /// Advances the animator by `delta` seconds, then queries the readout once.
    pub fn tick(&mut self, delta: Value) -> Result<Frame> {
        let step = self.animator.advance(delta)?;
        let finished = step == Step::Finished || std::mem::take(&mut self.finish_pending);
        Ok(Frame {
            elapsed: self.animator.elapsed(),
            position: self.animator.position(),
            readout: self.readout(),
            finished,
        })
    }

    /// Restarts playback from the first waypoint. The surface is kept.
    pub fn restart(&mut self) {
        self.finish_pending = self.animator.start() == Step::Finished;
    }

    /// Plays the run to the end at the quality preset's frame rate.
    ///
    /// The first frame is the state at time zero; each following frame advances by one frame
    /// length. Stops after the frame that finishes the animation.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames {
            delta: self.config.quality.frame_duration(),
            run: self,
            started: false,
        }
    }
}

/// Iterator returned by [`Run::frames`].
pub struct Frames<'a> {
    run: &'a mut Run,
    delta: Value,
    started: bool,
}

impl Iterator for Frames<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some(self.run.tick(0.0));
        }
        if self.run.animator.state() == AnimatorState::Done {
            return None;
        }
        Some(self.run.tick(self.delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{animator::Waypoint, config::QualityPreset, error::ZPlaneError};

    fn two_point_config() -> RunConfig {
        RunConfig::default().with_waypoints(vec![
            Waypoint::new(0.0, 0.0, 5.0),
            Waypoint::new(1.0, 0.0, 5.0),
        ])
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = RunConfig::default().with_grid_resolution(0);
        assert!(matches!(
            Run::new(config),
            Err(ZPlaneError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn test_run_starts_on_first_waypoint() {
        let run = Run::new(two_point_config()).unwrap();
        assert_eq!(
            run.animator().state(),
            AnimatorState::Transitioning {
                segment: 0,
                progress: 0.0
            }
        );
        assert_eq!(run.animator().position(), Some(Complex::new(0.0, 0.0)));
    }

    #[test]
    fn test_tick_produces_readout() {
        let mut run = Run::new(two_point_config()).unwrap();
        let frame = run.tick(2.5).unwrap();
        assert_eq!(frame.position, Some(Complex::new(0.5, 0.0)));
        let readout = frame.readout.unwrap();
        assert_eq!(readout.position, Complex::new(0.5, 0.0));
        assert_eq!(readout.value, Complex::new(0.0, 0.0));
        assert!(!frame.finished);
    }

    #[test]
    fn test_frames_cover_the_whole_duration() {
        let mut run = Run::new(two_point_config().with_quality(QualityPreset::Low)).unwrap();
        let frames: Vec<Frame> = run.frames().collect::<Result<_>>().unwrap();
        assert_eq!(frames.first().unwrap().elapsed, 0.0);
        let last = frames.last().unwrap();
        assert!(last.finished);
        assert!((last.elapsed - 10.0).abs() < 1e-9);
        assert_eq!(frames.iter().filter(|f| f.finished).count(), 1);
        assert_eq!(frames.len(), 151);
    }

    #[test]
    fn test_empty_run_never_produces_a_position() {
        let mut run = Run::new(RunConfig::default().with_waypoints(vec![])).unwrap();
        assert!(run.is_done());
        for frame in run.frames() {
            let frame = frame.unwrap();
            assert_eq!(frame.position, None);
            assert_eq!(frame.readout, None);
        }
        assert_eq!(run.tick(1.0).unwrap().position, None);
    }

    #[test]
    fn test_zero_length_path_reports_finished_on_first_tick() {
        let config = RunConfig::default().with_waypoints(vec![Waypoint::new(0.0, 0.0, 0.0)]);
        let mut run = Run::new(config).unwrap();
        assert!(run.is_done());

        let first = run.tick(0.0).unwrap();
        assert!(first.finished);
        assert_eq!(first.position, Some(Complex::new(0.0, 0.0)));
        assert!(!run.tick(1.0).unwrap().finished);

        run.restart();
        let frames: Vec<Frame> = run.frames().collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].finished);
    }

    #[test]
    fn test_mesh_uses_tessellation_resolution() {
        let run = Run::new(two_point_config().with_tessellation_resolution(20)).unwrap();
        let mesh = run.mesh();
        assert_eq!(mesh.vertices.len(), 400);
        assert_eq!(mesh.normals.len(), 400);
    }

    #[test]
    fn test_restart_keeps_surface() {
        let mut run = Run::new(two_point_config()).unwrap();
        let surface = Arc::clone(run.surface());
        run.tick(20.0).unwrap();
        assert!(run.is_done());
        run.restart();
        assert!(!run.is_done());
        assert_eq!(run.elapsed(), 0.0);
        assert!(Arc::ptr_eq(&surface, run.surface()));
    }
}
