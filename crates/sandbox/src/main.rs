//! Headless scene sandbox
//!
//! Builds a small test level (floor, stairs, scattered crates, a player and a
//! skinned arm) and drives the scene coordinator with a fixed frame delta,
//! logging what the pipeline does.
//!
//! Usage: `sandbox [config.toml|config.ron] [frames]`

use nalgebra::UnitQuaternion;
use rand::{rngs::StdRng, Rng, SeedableRng};
use scene_engine::config::MotionGate;
use scene_engine::foundation::logging;
use scene_engine::foundation::time::Timer;
use scene_engine::prelude::*;
use thiserror::Error;

const DEFAULT_FRAMES: u64 = 600;
const CRATE_COUNT: usize = 12;
const SCATTER_SEED: u64 = 0x5EED;
const JUMP_INTERVAL: u64 = 90;
const STATUS_INTERVAL: u64 = 60;

#[derive(Error, Debug)]
enum SandboxError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Invalid frame count '{0}'")]
    FrameCount(String),
}

struct SandboxApp {
    coordinator: SceneCoordinator,
    player: NodeIndex,
    timer: Timer,
}

impl SandboxApp {
    fn new(config: SimulationConfig) -> Result<Self, SandboxError> {
        log::info!("Building sandbox level...");
        let mut nodes = NodeTable::new();

        nodes.push(static_box("Floor", Vec3::new(-20.0, -1.0, -20.0), Vec3::new(20.0, 0.0, 20.0)));
        for step in 0..3_u8 {
            let x = 4.0 + f32::from(step);
            let top = 0.3 * f32::from(step + 1);
            nodes.push(static_box(
                &format!("Stair{step}"),
                Vec3::new(x, -1.0, -1.5),
                Vec3::new(x + 1.0, top, 1.5),
            ));
        }
        nodes.push(static_box("Wall", Vec3::new(-8.0, -1.0, -20.0), Vec3::new(-7.5, 4.0, 20.0)));

        let mut rng = StdRng::seed_from_u64(SCATTER_SEED);
        for index in 0..CRATE_COUNT {
            let position = Vec3::new(rng.gen_range(-6.0..-1.0), rng.gen_range(1.0..6.0), rng.gen_range(-8.0..8.0));
            let yaw = rng.gen_range(0.0..std::f32::consts::TAU);
            let crate_node = SceneNode::new(format!("Crate{index}"))
                .with_mass(rng.gen_range(0.5..3.0))?
                .with_gravity(true)
                .with_position(position)
                .with_rotation(UnitQuaternion::from_euler_angles(0.0, yaw, 0.0))
                .with_primitive(Primitive::from_bounds(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.0, 0.5)));
            nodes.push(crate_node);
        }

        let player = nodes.push(
            SceneNode::new(PLAYER_NAME)
                .with_mass(1.0)?
                .with_position(Vec3::new(0.0, 0.5, 0.0))
                .with_velocity(Vec3::new(1.5, 0.0, 0.0))
                .with_primitive(Primitive::from_bounds(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 1.8, 0.3))),
        );

        let armature = nodes.push(SceneNode::new("Armature").with_position(Vec3::new(0.0, 3.0, 10.0)));
        let shoulder = nodes.push(
            SceneNode::new("Shoulder")
                .with_parent(armature)
                .with_movement_class(MovementClass::MoveableRoot),
        );
        let elbow = nodes.push(SceneNode::new("Elbow").with_parent(shoulder).with_position(Vec3::new(0.0, 1.0, 0.0)));
        let hand = nodes.push(SceneNode::new("Hand").with_parent(elbow).with_position(Vec3::new(0.0, 1.0, 0.0)));

        let mut coordinator = SceneCoordinator::new(nodes, config)?;

        // Joint space starts at the shoulder once the skin is registered
        let mut chain = Mat4::identity();
        let bind_pose: Vec<Mat4> = [shoulder, elbow, hand]
            .iter()
            .map(|&joint| {
                chain *= coordinator.nodes()[joint].local_matrix();
                chain.try_inverse().unwrap_or_else(Mat4::identity)
            })
            .collect();
        coordinator.add_skin(Skin::new("Arm", vec![shoulder, elbow, hand], bind_pose)?)?;
        coordinator.add_clip(wave_clip(elbow)?)?;

        log::info!(
            "Sandbox level ready: {} nodes, {} primitives",
            coordinator.nodes().len(),
            coordinator.nodes().primitive_count()
        );

        Ok(Self {
            coordinator,
            player,
            timer: Timer::new(),
        })
    }

    fn run(&mut self, frames: u64) -> Result<(), SandboxError> {
        let delta_ms = self.coordinator.config().fixed_time_step_ms;
        let mut adjusted_frames = 0_u64;
        let mut peak_candidates = 0_usize;

        for frame_index in 1..=frames {
            if frame_index % JUMP_INTERVAL == 0 {
                self.coordinator.request_jump(self.player)?;
            }

            let frame = self.coordinator.update(delta_ms);
            self.timer.update();

            adjusted_frames += u64::from(frame.nodes_adjusted);
            peak_candidates = peak_candidates.max(frame.candidate_pairs);

            if frame_index % STATUS_INTERVAL == 0 {
                let player = &self.coordinator.nodes()[self.player];
                log::info!(
                    "Frame {frame_index}: player at ({:.2}, {:.2}, {:.2}), grounded = {}, {} candidate pairs, {} debug lines",
                    player.position().x,
                    player.position().y,
                    player.position().z,
                    player.motion.grounded,
                    frame.candidate_pairs,
                    frame.debug_lines.len()
                );
            }
        }

        log::info!(
            "Simulated {frames} frames at {delta_ms:.2} ms: {adjusted_frames} with collision response, peak {peak_candidates} candidate pairs, {:.3} ms average update",
            self.timer.average_frame_ms()
        );
        Ok(())
    }
}

fn static_box(name: &str, min: Vec3, max: Vec3) -> SceneNode {
    SceneNode::new(name)
        .with_movement_class(MovementClass::Static)
        .with_primitive(Primitive::from_bounds(min, max))
}

/// Elbow swinging back and forth about Z over two seconds
fn wave_clip(elbow: NodeIndex) -> Result<AnimationClip, SceneError> {
    let swing = |degrees: f32| Quat::from_axis_angle(&Vec3::z_axis(), degrees.to_radians());
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![swing(0.0), swing(90.0), swing(0.0)],
        "LINEAR".parse()?,
    )?;
    Ok(AnimationClip::new("Wave", vec![AnimationChannel::rotation(elbow, track)]))
}

fn load_config(path: Option<&str>) -> Result<SimulationConfig, SandboxError> {
    match path {
        Some(path) => {
            log::info!("Loading simulation config from {path}");
            Ok(SimulationConfig::load_from_file(path)?)
        }
        None => Ok(SimulationConfig::default().with_motion_gate(MotionGate::Either)),
    }
}

fn run() -> Result<(), SandboxError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let frames = match args.get(1) {
        Some(arg) => arg.parse().map_err(|_| SandboxError::FrameCount(arg.clone()))?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Collision mode: {}, motion gate: {:?}", config.collision_mode, config.motion_gate);
    SandboxApp::new(config)?.run(frames)
}

fn main() {
    logging::init_with_level(log::LevelFilter::Info);

    if let Err(e) = run() {
        log::error!("Sandbox error: {e}");
        std::process::exit(1);
    }
}
