//! Simulation settings read by the scene coordinator once per frame

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Narrow-phase collision mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionMode {
    /// Discrete separating axis test at the current pose
    #[serde(rename = "sat")]
    Sat,
    /// Swept separating axis test walking back toward the previous pose
    #[serde(rename = "satContinuous")]
    SatContinuous,
    /// No collision detection or response
    #[serde(rename = "disabled")]
    Disabled,
}

impl CollisionMode {
    /// Name used in configuration files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sat => "sat",
            Self::SatContinuous => "satContinuous",
            Self::Disabled => "disabled",
        }
    }
}

impl FromStr for CollisionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sat" => Ok(Self::Sat),
            "satContinuous" => Ok(Self::SatContinuous),
            "disabled" => Ok(Self::Disabled),
            other => Err(ConfigError::UnknownCollisionMode(other.to_string())),
        }
    }
}

impl fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which candidate pairs the narrow phase considers moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionGate {
    /// Both nodes must have moved more than the movement epsilon
    #[default]
    #[serde(rename = "both")]
    Both,
    /// At least one node must have moved (resting contact against static geometry)
    #[serde(rename = "either")]
    Either,
}

impl MotionGate {
    /// Whether a pair with these per-frame displacements is tested
    pub fn admits(self, moved_a: bool, moved_b: bool) -> bool {
        match self {
            Self::Both => moved_a && moved_b,
            Self::Either => moved_a || moved_b,
        }
    }
}

/// Per-frame simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Narrow-phase mode
    pub collision_mode: CollisionMode,

    /// Fixed simulation step in milliseconds, clamps how far a swept test rewinds
    pub fixed_time_step_ms: f32,

    /// Animation clock advance per elapsed millisecond (0.001 plays clips in real time)
    pub animation_playback_speed: f32,

    /// Downward acceleration in units per second squared
    pub gravity: f32,

    /// Cap on the gravity accumulator in units per second
    pub max_fall_speed: f32,

    /// Upward speed given to a grounded player on jump
    pub player_jump_speed: f32,

    /// Minimum per-frame displacement for a node to count as moving
    pub movement_epsilon: f32,

    /// How per-node movement gates narrow-phase testing
    pub motion_gate: MotionGate,

    /// Longest distance a swept test may back a node up, in units
    pub max_continuous_backstep: f32,

    /// Swept subdivisions per unit of combined displacement
    pub continuous_steps_per_unit: f32,

    /// Emit debug line lists for bounding volumes
    pub debug_draw: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            collision_mode: CollisionMode::Sat,
            fixed_time_step_ms: 1000.0 / 60.0,
            animation_playback_speed: 0.001,
            gravity: 9.81,
            max_fall_speed: 50.0,
            player_jump_speed: 5.0,
            movement_epsilon: 0.001,
            motion_gate: MotionGate::Both,
            max_continuous_backstep: 0.1,
            continuous_steps_per_unit: 4.0,
            debug_draw: false,
        }
    }
}

impl Config for SimulationConfig {}

impl SimulationConfig {
    /// Builder pattern: set collision mode
    #[must_use]
    pub fn with_collision_mode(mut self, mode: CollisionMode) -> Self {
        self.collision_mode = mode;
        self
    }

    /// Builder pattern: set motion gate
    #[must_use]
    pub fn with_motion_gate(mut self, gate: MotionGate) -> Self {
        self.motion_gate = gate;
        self
    }

    /// Builder pattern: set gravity
    #[must_use]
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_time_step_ms.is_finite() && self.fixed_time_step_ms > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "fixed_time_step_ms",
                reason: format!("must be positive, got {}", self.fixed_time_step_ms),
            });
        }
        if !(self.animation_playback_speed.is_finite() && self.animation_playback_speed >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "animation_playback_speed",
                reason: format!("must be non-negative, got {}", self.animation_playback_speed),
            });
        }
        if !(self.movement_epsilon.is_finite() && self.movement_epsilon >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "movement_epsilon",
                reason: format!("must be non-negative, got {}", self.movement_epsilon),
            });
        }
        if !(self.max_continuous_backstep.is_finite() && self.max_continuous_backstep >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "max_continuous_backstep",
                reason: format!("must be non-negative, got {}", self.max_continuous_backstep),
            });
        }
        if !(self.continuous_steps_per_unit.is_finite() && self.continuous_steps_per_unit > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "continuous_steps_per_unit",
                reason: format!("must be positive, got {}", self.continuous_steps_per_unit),
            });
        }
        Ok(())
    }
}
