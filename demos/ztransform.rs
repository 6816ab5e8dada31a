use std::f32::consts::FRAC_PI_2;

use bevy::{input::common_conditions::input_just_pressed, prelude::*};
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use bevy_zplane::{
    ZPlanePlugin,
    config::{QualityPreset, RunConfig},
    plugin::{
        ActiveRun, Marker, Overlay, ReadoutText, WorldAxes, ZPlaneConfig, ZPlaneSurface, abort_run,
    },
    timeline::Fade,
    types::Complex,
};

// cargo run --example ztransform -- high
fn main() {
    let quality = match std::env::args().nth(1).as_deref() {
        Some("low") => QualityPreset::Low,
        Some("high") => QualityPreset::High,
        Some("production") => QualityPreset::Production,
        _ => QualityPreset::Medium,
    };

    App::new()
        .add_plugins((
            DefaultPlugins,
            PanOrbitCameraPlugin,
            InfiniteGridPlugin,
            ZPlanePlugin::new(RunConfig::default().with_quality(quality)),
        ))
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                fade_in_surface,
                draw_plane_markers,
                abort_run.run_if(input_just_pressed(KeyCode::KeyQ)),
                restart.run_if(input_just_pressed(KeyCode::KeyR)),
            ),
        )
        .run();
}

fn setup(
    mut commands: Commands,
    config: Res<ZPlaneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            fadeout_distance: 100.0,
            ..Default::default()
        },
        ..Default::default()
    });

    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera {
            button_orbit: MouseButton::Right,
            button_pan: MouseButton::Middle,
            ..default()
        },
        Transform::from_xyz(-2.0, 9.0, 9.0).looking_at(Vec3::new(-0.5, 0.0, 0.0), Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    commands.spawn((
        Marker::default(),
        Mesh3d(meshes.add(Sphere::new(0.1))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.1, 0.9, 0.3),
            ..Default::default()
        })),
    ));

    commands.spawn((
        Text::new(config.0.transfer.to_string()),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));

    commands.spawn((
        ReadoutText,
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

/// Fades the surface in over the first two seconds of playback.
fn fade_in_surface(mut commands: Commands, surfaces: Query<Entity, Added<ZPlaneSurface>>) {
    for entity in surfaces.iter() {
        commands
            .entity(entity)
            .insert(Overlay(Fade::new(0.0, 2.0, 0.0, 0.8)));
    }
}

/// Unit circle, zero, pole and points of interest on the z-plane.
fn draw_plane_markers(mut gizmos: Gizmos, config: Res<ZPlaneConfig>, axes: Res<WorldAxes>) {
    let config = config.0.as_ref();
    let on_plane = |z: Complex| axes.position_to_world(config, z, 0.0);
    let flat = Quat::from_rotation_x(FRAC_PI_2);

    let unit_radius = on_plane(Complex::new(1.0, 0.0)).x - on_plane(Complex::new(0.0, 0.0)).x;
    gizmos.circle(
        Isometry3d::new(on_plane(Complex::new(0.0, 0.0)), flat),
        unit_radius,
        Color::srgb(1.0, 0.9, 0.1),
    );

    let zero = on_plane(config.transfer.zero);
    gizmos.circle(Isometry3d::new(zero, flat), 0.1, Color::srgb(0.2, 0.4, 1.0));

    let pole = on_plane(config.transfer.pole);
    let red = Color::srgb(1.0, 0.1, 0.1);
    gizmos.line(pole + Vec3::new(-0.1, 0.0, -0.1), pole + Vec3::new(0.1, 0.0, 0.1), red);
    gizmos.line(pole + Vec3::new(-0.1, 0.0, 0.1), pole + Vec3::new(0.1, 0.0, -0.1), red);

    for waypoint in &config.waypoints {
        gizmos.sphere(
            Isometry3d::from_translation(on_plane(waypoint.target)),
            0.05,
            Color::srgb(0.1, 0.9, 0.3),
        );
    }
}

fn restart(active: Option<ResMut<ActiveRun>>) {
    if let Some(mut active) = active {
        active.run.restart();
        active.last_frame = None;
    }
}
