//! Keyframe tracks and interpolation

use std::fmt;
use std::str::FromStr;

use crate::foundation::math::{Quat, Vec3};
use crate::SceneError;

/// How values between two keyframes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Hold the earlier keyframe value
    Step,
    /// Lerp vectors, slerp rotations
    Linear,
}

impl FromStr for InterpolationMode {
    type Err = SceneError;

    /// Parse the asset interpolation name; anything but `STEP` and `LINEAR` is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STEP" => Ok(Self::Step),
            "LINEAR" => Ok(Self::Linear),
            other => Err(SceneError::UnknownInterpolation(other.to_string())),
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => f.write_str("STEP"),
            Self::Linear => f.write_str("LINEAR"),
        }
    }
}

/// Values a keyframe track can carry
pub trait Interpolate: Copy {
    /// Blend `start` toward `end` by `t` in `[0, 1]`
    fn interpolate(start: &Self, end: &Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(start: &Self, end: &Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(start: &Self, end: &Self, t: f32) -> Self {
        // Opposite rotations have no unique arc
        start
            .try_slerp(end, t, 1.0e-6)
            .unwrap_or(if t < 0.5 { *start } else { *end })
    }
}

/// Sorted keyframe times with one value per time
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: InterpolationMode,
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Create a track, checking times and values line up
    ///
    /// Times must be finite and non-decreasing, and there must be exactly
    /// one value per time.
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Result<Self, SceneError> {
        if times.is_empty() {
            return Err(SceneError::MalformedTrack("track has no keyframes".to_string()));
        }
        if times.len() != values.len() {
            return Err(SceneError::MalformedTrack(format!(
                "{} times but {} values",
                times.len(),
                values.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(SceneError::MalformedTrack("non-finite keyframe time".to_string()));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(SceneError::MalformedTrack("keyframe times are not sorted".to_string()));
        }

        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Keyframe times
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    /// Keyframe values
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Interpolation mode
    pub const fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    /// Earliest and latest keyframe time
    pub fn time_bounds(&self) -> (f32, f32) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// Sample the track at `time`, holding the end values outside the range
    pub fn sample(&self, time: f32) -> T {
        // First keyframe strictly after `time`
        let next = self.times.partition_point(|&t| t <= time);
        if next == 0 {
            return self.values[0];
        }
        if next == self.times.len() {
            return self.values[next - 1];
        }

        let index = next - 1;
        match self.interpolation {
            InterpolationMode::Step => self.values[index],
            InterpolationMode::Linear => {
                let t0 = self.times[index];
                let span = self.times[next] - t0;
                let t = if span > 0.0 { ((time - t0) / span).clamp(0.0, 1.0) } else { 0.0 };
                T::interpolate(&self.values[index], &self.values[next], t)
            }
        }
    }
}
