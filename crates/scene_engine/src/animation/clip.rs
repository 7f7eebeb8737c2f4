//! Animation clips and their channels

use std::str::FromStr;

use crate::animation::track::KeyframeTrack;
use crate::foundation::math::{Quat, Vec3};
use crate::scene::{NodeIndex, SceneNode};
use crate::SceneError;

/// Local transform property a channel drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPath {
    /// Local position
    Translation,
    /// Local rotation
    Rotation,
    /// Local scale
    Scale,
}

impl FromStr for ChannelPath {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translation" => Ok(Self::Translation),
            "rotation" => Ok(Self::Rotation),
            "scale" => Ok(Self::Scale),
            other => Err(SceneError::MalformedTrack(format!("unknown channel path '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ChannelTrack {
    Translation(KeyframeTrack<Vec3>),
    Rotation(KeyframeTrack<Quat>),
    Scale(KeyframeTrack<Vec3>),
}

/// One animated property of one node, with its own clock
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannel {
    target: NodeIndex,
    track: ChannelTrack,
    clock: f32,
}

impl AnimationChannel {
    /// Channel driving the local position of `target`
    pub fn translation(target: NodeIndex, track: KeyframeTrack<Vec3>) -> Self {
        Self::with_track(target, ChannelTrack::Translation(track))
    }

    /// Channel driving the local rotation of `target`
    pub fn rotation(target: NodeIndex, track: KeyframeTrack<Quat>) -> Self {
        Self::with_track(target, ChannelTrack::Rotation(track))
    }

    /// Channel driving the local scale of `target`
    pub fn scale(target: NodeIndex, track: KeyframeTrack<Vec3>) -> Self {
        Self::with_track(target, ChannelTrack::Scale(track))
    }

    fn with_track(target: NodeIndex, track: ChannelTrack) -> Self {
        let mut channel = Self {
            target,
            track,
            clock: 0.0,
        };
        channel.clock = channel.time_bounds().0;
        channel
    }

    /// Node this channel writes to
    pub const fn target(&self) -> NodeIndex {
        self.target
    }

    /// Property this channel writes
    pub const fn path(&self) -> ChannelPath {
        match self.track {
            ChannelTrack::Translation(_) => ChannelPath::Translation,
            ChannelTrack::Rotation(_) => ChannelPath::Rotation,
            ChannelTrack::Scale(_) => ChannelPath::Scale,
        }
    }

    /// Current clock in track time
    pub const fn clock(&self) -> f32 {
        self.clock
    }

    /// Earliest and latest keyframe time of the track
    pub fn time_bounds(&self) -> (f32, f32) {
        match &self.track {
            ChannelTrack::Translation(t) | ChannelTrack::Scale(t) => t.time_bounds(),
            ChannelTrack::Rotation(t) => t.time_bounds(),
        }
    }

    /// Advance the clock by `delta` and wrap it into the track's time range
    pub fn advance(&mut self, delta: f32) {
        let (min, max) = self.time_bounds();
        self.clock = wrap_time(self.clock + delta, min, max);
    }

    /// Write the value at the current clock into the node's local transform
    pub fn apply(&self, node: &mut SceneNode) {
        match &self.track {
            ChannelTrack::Translation(t) => node.transform.position = t.sample(self.clock),
            ChannelTrack::Rotation(t) => node.transform.rotation = t.sample(self.clock),
            ChannelTrack::Scale(t) => node.transform.scale = t.sample(self.clock),
        }
    }
}

/// Wrap `time` into `[min, max]`; a zero-length range pins to `min`
pub fn wrap_time(time: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span <= 0.0 || !time.is_finite() {
        return min;
    }
    if (min..=max).contains(&time) {
        time
    } else {
        min + (time - min).rem_euclid(span)
    }
}

/// Named set of channels played together
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    /// Whether the clip advances on update
    pub playing: bool,
    channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    /// Create a playing clip
    pub fn new(name: impl Into<String>, channels: Vec<AnimationChannel>) -> Self {
        Self {
            name: name.into(),
            playing: true,
            channels,
        }
    }

    /// Channels of the clip
    pub fn channels(&self) -> &[AnimationChannel] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [AnimationChannel] {
        &mut self.channels
    }

    /// Latest keyframe time over all channels
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .map(|c| c.time_bounds().1)
            .fold(0.0_f32, f32::max)
    }
}
