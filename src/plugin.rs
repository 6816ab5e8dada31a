use std::sync::Arc;

use bevy::{
    asset::RenderAssetUsages,
    ecs::error::BevyError,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
};

use crate::{
    config::RunConfig,
    interp::remap,
    mesh::MeshDescriptor,
    run::{Frame, Run},
    timeline::{Fade, Track},
    types::{Complex, Point, Value},
};

/// System sets for the z-plane pipeline.
///
/// ```text
/// FixedUpdate:  ZPlaneSet::Advance   (run.tick(Δ) → Frame)
/// Update:       ZPlaneSet::Present   (marker transforms, readout text, overlay fades)
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZPlaneSet {
    /// Advances the active run by the fixed timestep and stores the resulting [`Frame`].
    Advance,
    /// Copies the latest [`Frame`] into entities.
    Present,
}

/// The run configuration, shared read-only by every system.
#[derive(Resource, Clone)]
pub struct ZPlaneConfig(pub Arc<RunConfig>);

/// The playback in progress and the last frame it produced.
///
/// Remove it (see [`abort_run`]) to stop playback. Removing an absent resource is a no-op.
#[derive(Resource)]
pub struct ActiveRun {
    pub run: Run,
    pub last_frame: Option<Frame>,
}

/// How domain units map onto Bevy's Y-up world.
///
/// The domain is centred on the origin: real → `+X`, imaginary → `-Z`, magnitude → `+Y`.
/// Defaults match a 7 × 7 plane with a 5 unit tall magnitude axis.
#[derive(Resource, Debug, Clone, Copy)]
pub struct WorldAxes {
    pub real_length: f32,
    pub imag_length: f32,
    pub magnitude_length: f32,
}

impl Default for WorldAxes {
    fn default() -> Self {
        Self {
            real_length: 7.0,
            imag_length: 7.0,
            magnitude_length: 5.0,
        }
    }
}

impl WorldAxes {
    /// Maps a surface point `(re, im, height)` to world space.
    pub fn to_world(&self, config: &RunConfig, point: Point) -> Vec3 {
        let d = &config.domain;
        let half_re = (self.real_length / 2.0) as Value;
        let half_im = (self.imag_length / 2.0) as Value;
        let x = remap(point.x, [d.real.min, d.real.max], [-half_re, half_re]);
        let z = -remap(point.y, [d.imag.min, d.imag.max], [-half_im, half_im]);
        let y = remap(
            point.z,
            [0.0, config.magnitude_cap],
            [0.0, self.magnitude_length as Value],
        );
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Maps a z-plane coordinate at `height` (in magnitude units) to world space.
    pub fn position_to_world(&self, config: &RunConfig, z: Complex, height: Value) -> Vec3 {
        self.to_world(config, Point::new(z.re, z.im, height))
    }

    /// Maps a domain-space normal to world space (inverse-transpose of the axis scaling).
    pub fn normal_to_world(&self, config: &RunConfig, normal: [Value; 3]) -> [f32; 3] {
        let sx = self.real_length as Value / config.domain.real.span();
        let sz = self.imag_length as Value / config.domain.imag.span();
        let sy = self.magnitude_length as Value / config.magnitude_cap;
        let n = Vec3::new(
            (normal[0] / sx) as f32,
            (normal[2] / sy) as f32,
            (-normal[1] / sz) as f32,
        );
        n.normalize_or(Vec3::Y).to_array()
    }
}

/// Marker component for the magnitude surface entity spawned by [`ZPlanePlugin`].
#[derive(Component)]
pub struct ZPlaneSurface;

/// An entity that follows the animated position.
///
/// With `follow_surface` the marker rides the rendered (quantized) surface; otherwise it
/// stays on the z-plane.
#[derive(Component, Default)]
#[require(Transform)]
pub struct Marker {
    pub follow_surface: bool,
}

/// A [`Text`] entity that shows the live readout.
#[derive(Component)]
#[require(Text)]
pub struct ReadoutText;

/// Drives the alpha of the entity's [`StandardMaterial`] from the run clock.
#[derive(Component)]
pub struct Overlay(pub Fade);

/// Bevy plugin that renders the `|H(z)|` surface and plays the marker animation.
///
/// When the `auto_play` feature is enabled the run is built at startup and ticked at the
/// quality preset's frame rate:
///
/// ```text
/// Startup
///   → Run::new(config)              (validate, evaluate grid)
///   → ZPlaneSurface + Mesh3d        (tessellated surface)
///   → ActiveRun inserted
/// FixedUpdate (ZPlaneSet::Advance)
///   → run.tick(Δ)                   (animator, then exact readout)
/// Update (ZPlaneSet::Present)
///   → Marker transforms, ReadoutText, Overlay alpha
/// ```
///
/// Spawn your own [`Marker`], [`ReadoutText`] and [`Overlay`] entities; the plugin only
/// spawns the surface.
#[derive(Default)]
pub struct ZPlanePlugin {
    pub config: RunConfig,
    pub axes: WorldAxes,
}

impl ZPlanePlugin {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }
}

impl Plugin for ZPlanePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ZPlaneConfig(Arc::new(self.config.clone())))
            .insert_resource(self.axes);

        #[cfg(feature = "auto_play")]
        app.insert_resource(Time::<Fixed>::from_hz(
            self.config.quality.frame_rate() as f64,
        ))
        .configure_sets(FixedUpdate, ZPlaneSet::Advance)
        .configure_sets(Update, ZPlaneSet::Present)
        .add_systems(Startup, start_run)
        .add_systems(
            FixedUpdate,
            advance_run
                .in_set(ZPlaneSet::Advance)
                .run_if(resource_exists::<ActiveRun>),
        )
        .add_systems(
            Update,
            (move_markers, write_readout, apply_overlays)
                .in_set(ZPlaneSet::Present)
                .run_if(resource_exists::<ActiveRun>),
        );
    }
}

/// Converts a [`MeshDescriptor`] into a Bevy [`Mesh`] laid out by `axes`.
pub fn to_bevy_mesh(descriptor: &MeshDescriptor, config: &RunConfig, axes: &WorldAxes) -> Mesh {
    let positions: Vec<[f32; 3]> = descriptor
        .vertices
        .iter()
        .map(|p| axes.to_world(config, *p).to_array())
        .collect();
    let normals: Vec<[f32; 3]> = descriptor
        .normals
        .iter()
        .map(|n| axes.normal_to_world(config, *n))
        .collect();

    let mut bevy_mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    bevy_mesh.insert_indices(Indices::U32(descriptor.indices_u32()));
    bevy_mesh
}

/// Builds the run, spawns the surface mesh and inserts [`ActiveRun`].
///
/// Fails (and leaves the world untouched) if the configuration is invalid or the grid
/// produces a non-finite magnitude.
pub fn start_run(
    mut commands: Commands,
    config: Res<ZPlaneConfig>,
    axes: Res<WorldAxes>,
    mut meshes: ResMut<Assets<Mesh>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) -> Result<(), BevyError> {
    let run = Run::new(config.0.as_ref().clone())?;
    let bevy_mesh = to_bevy_mesh(&run.mesh(), run.config(), &axes);

    let mut surface = commands.spawn((
        ZPlaneSurface,
        Mesh3d(meshes.add(bevy_mesh)),
        Transform::default(),
    ));
    if let Some(mut materials) = materials {
        surface.insert(MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(0.25, 0.45, 0.95, 0.8),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            ..Default::default()
        })));
    }

    log::info!("z-plane run started: {}", run.config().transfer);
    commands.insert_resource(ActiveRun {
        run,
        last_frame: None,
    });
    Ok(())
}

/// Ticks the active run by the fixed timestep.
fn advance_run(time: Res<Time>, mut active: ResMut<ActiveRun>) -> Result<(), BevyError> {
    let frame = active.run.tick(time.delta_secs_f64())?;
    if frame.finished {
        log::info!("z-plane run finished after {:.2}s", frame.elapsed);
    }
    active.last_frame = Some(frame);
    Ok(())
}

/// Moves every [`Marker`] to the latest position.
fn move_markers(
    active: Res<ActiveRun>,
    axes: Res<WorldAxes>,
    mut markers: Query<(&Marker, &mut Transform)>,
) {
    let Some(position) = active.last_frame.as_ref().and_then(|frame| frame.position) else {
        return;
    };
    let config = active.run.config();
    for (marker, mut transform) in markers.iter_mut() {
        let height = if marker.follow_surface {
            active.run.surface().height_at(position.re, position.im)
        } else {
            0.0
        };
        transform.translation = axes.position_to_world(config, position, height);
    }
}

/// Writes the latest readout into every [`ReadoutText`].
fn write_readout(active: Res<ActiveRun>, mut texts: Query<&mut Text, With<ReadoutText>>) {
    let Some(snapshot) = active.last_frame.as_ref().and_then(|frame| frame.readout) else {
        return;
    };
    let text = active.run.readout_text(&snapshot).to_string();
    for mut t in texts.iter_mut() {
        if t.0 != text {
            t.0.clone_from(&text);
        }
    }
}

/// Samples each [`Overlay`] at the run's elapsed time and applies it as material alpha.
fn apply_overlays(
    active: Res<ActiveRun>,
    overlays: Query<(&Overlay, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let elapsed = active.run.elapsed();
    for (overlay, material) in overlays.iter() {
        let alpha = overlay.0.sample(elapsed).clamp(0.0, 1.0) as f32;
        if let Some(mut material) = materials.get_mut(&material.0) {
            material.base_color.set_alpha(alpha);
        }
    }
}

/// Stops playback by dropping the active run. Safe to call any number of times.
pub fn abort_run(mut commands: Commands) {
    commands.remove_resource::<ActiveRun>();
}
