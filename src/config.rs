use crate::{
    animator::Waypoint,
    error::{Result, ZPlaneError},
    transfer::TransferFunction,
    types::{Complex, Value},
};

/// Closed interval `[min, max]` on one axis of the z-plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: Value,
    pub max: Value,
}

impl AxisRange {
    pub const fn new(min: Value, max: Value) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> Value {
        self.max - self.min
    }

    fn validate(&self, axis: &'static str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ZPlaneError::InvalidDomain {
                axis,
                min: self.min,
                max: self.max,
            });
        }
        if self.min == self.max {
            return Err(ZPlaneError::DegenerateDomain {
                axis,
                value: self.min,
            });
        }
        Ok(())
    }
}

/// Rectangular region of the z-plane that is sampled and rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub real: AxisRange,
    pub imag: AxisRange,
}

impl Default for Domain {
    fn default() -> Self {
        Self::square(-1.5, 1.5)
    }
}

impl Domain {
    /// A domain using the same range on both axes.
    pub const fn square(min: Value, max: Value) -> Self {
        Self {
            real: AxisRange::new(min, max),
            imag: AxisRange::new(min, max),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.real.validate("real")?;
        self.imag.validate("imaginary")
    }
}

/// Output quality, mirroring the usual low/medium/high/production render presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
    Production,
}

impl QualityPreset {
    /// Frames per second; also the virtual tick rate for offline playback.
    pub fn frame_rate(&self) -> u32 {
        match self {
            QualityPreset::Low => 15,
            QualityPreset::Medium => 30,
            QualityPreset::High | QualityPreset::Production => 60,
        }
    }

    /// Output resolution in pixels, `(width, height)`.
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            QualityPreset::Low => (854, 480),
            QualityPreset::Medium => (1280, 720),
            QualityPreset::High => (1920, 1080),
            QualityPreset::Production => (3840, 2160),
        }
    }

    /// Length of one frame in seconds.
    pub fn frame_duration(&self) -> Value {
        1.0 / self.frame_rate() as Value
    }
}

/// Everything a run needs, resolved once and immutable for the run's lifetime.
///
/// ```rust,ignore
/// let config = RunConfig::default()
///     .with_grid_resolution(100)
///     .with_waypoints(vec![
///         Waypoint::new(0.0, 0.0, 5.0),
///         Waypoint::new(1.0, 0.0, 5.0),
///     ]);
/// let run = Run::new(config)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Sampled region of the z-plane.
    pub domain: Domain,
    /// Samples per axis of the magnitude grid.
    pub grid_resolution: usize,
    /// Zero, pole and regularization constant.
    pub transfer: TransferFunction,
    /// Magnitudes are clipped to `[0, magnitude_cap]`. Must be positive.
    pub magnitude_cap: Value,
    /// Vertices per axis of the rendered surface.
    pub tessellation_resolution: usize,
    /// Marker path. May be empty.
    pub waypoints: Vec<Waypoint>,
    pub quality: QualityPreset,
    /// Digits after the decimal point in the readout text.
    pub readout_precision: usize,
}

/// Points of interest visited by the reference scene, in order.
const POINTS_OF_INTEREST: [(Value, Value); 21] = [
    (0.5, 0.5),
    (0.5, -0.5),
    (0.5, 0.5),
    (0.5, -0.5),
    (0.5, 0.5),
    (0.0, 0.0),
    (0.5, -0.5),
    (0.0, 0.0),
    (0.5, 0.5),
    (0.0, 0.0),
    (0.5, -0.5),
    (0.0, 0.0),
    (1.0, 0.0),
    (0.0, 0.0),
    (1.0, 0.0),
    (0.0, 0.0),
    (1.0, 0.0),
    (0.5, -0.5),
    (-0.5, -0.5),
    (-0.5, 0.5),
    (0.5, 0.5),
];

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            grid_resolution: 50,
            transfer: TransferFunction::default(),
            magnitude_cap: 10.0,
            tessellation_resolution: 50,
            waypoints: POINTS_OF_INTEREST
                .iter()
                .map(|&(re, im)| Waypoint::new(re, im, 5.0))
                .collect(),
            quality: QualityPreset::default(),
            readout_precision: 2,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_grid_resolution(mut self, resolution: usize) -> Self {
        self.grid_resolution = resolution;
        self
    }

    pub fn with_transfer(mut self, transfer: TransferFunction) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn with_zero(mut self, zero: Complex) -> Self {
        self.transfer.zero = zero;
        self
    }

    pub fn with_pole(mut self, pole: Complex) -> Self {
        self.transfer.pole = pole;
        self
    }

    pub fn with_epsilon(mut self, epsilon: Value) -> Self {
        self.transfer.epsilon = epsilon;
        self
    }

    pub fn with_magnitude_cap(mut self, cap: Value) -> Self {
        self.magnitude_cap = cap;
        self
    }

    pub fn with_tessellation_resolution(mut self, resolution: usize) -> Self {
        self.tessellation_resolution = resolution;
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Waypoint>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn with_quality(mut self, quality: QualityPreset) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_readout_precision(mut self, precision: usize) -> Self {
        self.readout_precision = precision;
        self
    }

    /// Checks every parameter. Called once before anything is evaluated.
    pub fn validate(&self) -> Result<()> {
        self.domain.validate()?;
        if self.grid_resolution == 0 {
            return Err(ZPlaneError::InvalidResolution {
                what: "grid",
                value: self.grid_resolution,
                minimum: 1,
            });
        }
        // A surface needs at least one cell.
        if self.tessellation_resolution < 2 {
            return Err(ZPlaneError::InvalidResolution {
                what: "tessellation",
                value: self.tessellation_resolution,
                minimum: 2,
            });
        }
        self.transfer.validate()?;
        if !self.magnitude_cap.is_finite() || self.magnitude_cap <= 0.0 {
            return Err(ZPlaneError::InvalidParameter {
                name: "magnitude_cap",
                value: self.magnitude_cap,
            });
        }
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            waypoint.validate(index)?;
        }
        Ok(())
    }
}
