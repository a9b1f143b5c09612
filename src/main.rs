use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

mod components;
mod events;
mod race;
mod resources;
mod systems;

use components::*;
use events::{LapCompleted, RaceFinished};
use race::RaceSession;
use resources::{Notifications, TrackLayout};
use systems::ai::*;
use systems::input::*;
use systems::movement::*;
use systems::net::*;
use systems::notify::*;
use systems::progress::*;

const LAP_TARGET: u32 = 3;
const CAR_HALF_EXTENTS: Vec2 = Vec2::new(18.0, 10.0);
// Linear damping on the car bodies; rapier applies it every physics step
// whether or not the player is on the throttle.
const CAR_DRAG: f32 = 1.2;
const WALL_THICKNESS: f32 = 20.0;

fn main() {
    let track = TrackLayout::default();
    let session = match RaceSession::new(track.checkpoints.len(), LAP_TARGET) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Invalid race configuration: {err}");
            std::process::exit(1);
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Slipstream".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(100.0))
        .add_event::<LapCompleted>()
        .add_event::<RaceFinished>()
        .insert_resource(track)
        .insert_resource(session)
        .init_resource::<Notifications>()
        .init_resource::<ChannelClient>()
        .add_systems(Startup, setup_race)
        .add_systems(
            Update,
            (
                player_input_system,
                pause_input_system,
                steer_player_system,
                ai_steering_system,
                race_progress_system,
                rival_progress_system,
                broadcast_position_system,
                broadcast_finish_system,
                race_notification_system,
                drain_notifications_system,
                restart_race_system,
                connect_channel_system.run_if(run_once()),
            ),
        )
        .run();
}

fn setup_race(mut commands: Commands, track: Res<TrackLayout>) {
    // Spawn camera
    commands.spawn(Camera2d::default());

    // Tarmac and infield
    commands.spawn((
        Sprite {
            color: Color::srgb(0.24, 0.24, 0.27),
            custom_size: Some(track.arena_half * 2.0),
            ..default()
        },
        Transform::from_translation(Vec3::new(0.0, 0.0, -0.3)),
    ));
    commands.spawn((
        Sprite {
            color: Color::srgb(0.22, 0.5, 0.25),
            custom_size: Some(track.island_half * 2.0),
            ..default()
        },
        Transform::from_translation(Vec3::new(0.0, 0.0, -0.2)),
        RigidBody::Fixed,
        Collider::cuboid(track.island_half.x, track.island_half.y),
    ));

    // Outer walls, slightly wider than the arena so the corners close
    let x_reach = track.arena_half.x + WALL_THICKNESS;
    spawn_wall(
        &mut commands,
        Vec2::new(0.0, track.arena_half.y + WALL_THICKNESS / 2.0),
        Vec2::new(x_reach, WALL_THICKNESS / 2.0),
    );
    spawn_wall(
        &mut commands,
        Vec2::new(0.0, -track.arena_half.y - WALL_THICKNESS / 2.0),
        Vec2::new(x_reach, WALL_THICKNESS / 2.0),
    );
    spawn_wall(
        &mut commands,
        Vec2::new(track.arena_half.x + WALL_THICKNESS / 2.0, 0.0),
        Vec2::new(WALL_THICKNESS / 2.0, track.arena_half.y),
    );
    spawn_wall(
        &mut commands,
        Vec2::new(-track.arena_half.x - WALL_THICKNESS / 2.0, 0.0),
        Vec2::new(WALL_THICKNESS / 2.0, track.arena_half.y),
    );

    // Gate markers
    for gate in &track.checkpoints {
        commands.spawn((
            Sprite {
                color: Color::srgba(0.9, 0.8, 0.2, 0.25),
                custom_size: Some(gate.half_extents * 2.0),
                ..default()
            },
            Transform::from_translation(gate.center.extend(-0.1)),
        ));
    }

    let gate_count = track.checkpoints.len();

    // Player car
    let player_color = Color::srgb(0.2, 0.7, 0.9);
    commands.spawn((
        Sprite {
            color: player_color,
            custom_size: Some(CAR_HALF_EXTENTS * 2.0),
            ..default()
        },
        Transform::from_translation(track.player_start.extend(10.0)),
        RigidBody::Dynamic,
        Collider::cuboid(CAR_HALF_EXTENTS.x, CAR_HALF_EXTENTS.y),
        Velocity::zero(),
        Damping {
            linear_damping: CAR_DRAG,
            angular_damping: 0.0,
        },
        LockedAxes::ROTATION_LOCKED,
        GravityScale(0.0),
        Car,
        PlayerControlled,
        Heading::new(track.start_heading),
        DriveControls::default(),
        GateMembership::new(gate_count),
        GridSlot {
            position: track.player_start,
            heading: track.start_heading,
        },
    ));

    // Rival cars, slowest at the front of the pack
    let mut rng = rand::rng();
    for (index, start) in track.rival_starts.iter().enumerate() {
        let jitter = rng.random_range(-10.0..10.0);
        let position = Vec2::new(start.x + jitter, start.y);

        commands.spawn((
            Sprite {
                color: Color::srgb(0.85, 0.3 + 0.2 * index as f32, 0.2),
                custom_size: Some(CAR_HALF_EXTENTS * 2.0),
                ..default()
            },
            Transform::from_translation(position.extend(10.0)),
            RigidBody::Dynamic,
            Collider::cuboid(CAR_HALF_EXTENTS.x, CAR_HALF_EXTENTS.y),
            Velocity::zero(),
            Damping {
                linear_damping: CAR_DRAG,
                angular_damping: 0.0,
            },
            LockedAxes::ROTATION_LOCKED,
            GravityScale(0.0),
            Car,
            AiDriver {
                speed_offset: index as f32 * AI_SPEED_STEP,
            },
            Heading::new(track.start_heading),
            GateMembership::new(gate_count),
            RivalProgress::default(),
            GridSlot {
                position,
                heading: track.start_heading,
            },
        ));
    }
}

fn spawn_wall(commands: &mut Commands, center: Vec2, half_extents: Vec2) {
    commands.spawn((
        Sprite {
            color: Color::srgb(0.55, 0.12, 0.12),
            custom_size: Some(half_extents * 2.0),
            ..default()
        },
        Transform::from_translation(center.extend(1.0)),
        RigidBody::Fixed,
        Collider::cuboid(half_extents.x, half_extents.y),
    ));
}

// Discard the session and put every car back on its grid slot.
fn restart_race_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    track: Res<TrackLayout>,
    mut session: ResMut<RaceSession>,
    mut cars: Query<
        (
            &GridSlot,
            &mut Transform,
            &mut Velocity,
            &mut Heading,
            &mut GateMembership,
            Option<&mut RivalProgress>,
            Option<&mut DriveControls>,
        ),
        With<Car>,
    >,
) {
    if !keyboard_input.just_pressed(KeyCode::KeyR) {
        return;
    }

    match RaceSession::new(track.checkpoints.len(), LAP_TARGET) {
        Ok(fresh) => *session = fresh,
        Err(err) => {
            warn!("Cannot restart race: {err}");
            return;
        }
    }

    for (slot, mut transform, mut velocity, mut heading, mut membership, rival, controls) in
        cars.iter_mut()
    {
        transform.translation = slot.position.extend(transform.translation.z);
        transform.rotation = Quat::from_rotation_z(slot.heading);
        *velocity = Velocity::zero();
        heading.angle = slot.heading;
        membership.reset();
        if let Some(mut progress) = rival {
            *progress = RivalProgress::default();
        }
        if let Some(mut drive) = controls {
            *drive = DriveControls::default();
        }
    }

    info!("Race restarted");
}

// Helper for running a system only once
fn run_once() -> impl FnMut() -> bool {
    let mut has_run = false;
    move || {
        if !has_run {
            has_run = true;
            true
        } else {
            false
        }
    }
}
