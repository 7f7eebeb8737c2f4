//! Skeletal animator: owns clips and skins, drives local transforms

use slotmap::SlotMap;

use crate::animation::clip::AnimationClip;
use crate::animation::skin::Skin;
use crate::animation::{ClipKey, SkinKey};
use crate::foundation::math::Mat4;
use crate::scene::{NodeFlags, NodeTable};
use crate::SceneError;

/// Samples active clips into node local transforms once per frame
///
/// Only local transforms are written; world matrices are resolved afterward.
#[derive(Debug)]
pub struct SkeletalAnimator {
    clips: SlotMap<ClipKey, AnimationClip>,
    skins: SlotMap<SkinKey, Skin>,
    playback_speed: f32,
}

impl SkeletalAnimator {
    /// Create an animator; `playback_speed` is clip time per elapsed millisecond
    pub fn new(playback_speed: f32) -> Self {
        Self {
            clips: SlotMap::with_key(),
            skins: SlotMap::with_key(),
            playback_speed,
        }
    }

    /// Clip time per elapsed millisecond
    pub const fn playback_speed(&self) -> f32 {
        self.playback_speed
    }

    /// Change the playback speed
    pub fn set_playback_speed(&mut self, playback_speed: f32) {
        self.playback_speed = playback_speed;
    }

    /// Add a clip after checking every channel targets an existing node
    pub fn add_clip(&mut self, clip: AnimationClip, nodes: &NodeTable) -> Result<ClipKey, SceneError> {
        if let Some(channel) = clip.channels().iter().find(|c| c.target() >= nodes.len()) {
            return Err(SceneError::NodeOutOfRange(channel.target()));
        }
        log::debug!("Added clip '{}' with {} channels", clip.name, clip.channels().len());
        Ok(self.clips.insert(clip))
    }

    /// Remove a clip
    pub fn remove_clip(&mut self, key: ClipKey) -> Option<AnimationClip> {
        self.clips.remove(key)
    }

    /// Clip by key
    pub fn clip(&self, key: ClipKey) -> Option<&AnimationClip> {
        self.clips.get(key)
    }

    /// Pause or resume a clip; returns false for an unknown key
    pub fn set_playing(&mut self, key: ClipKey, playing: bool) -> bool {
        match self.clips.get_mut(key) {
            Some(clip) => {
                clip.playing = playing;
                true
            }
            None => false,
        }
    }

    /// Number of clips
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Register a skin and mark its joints
    pub fn add_skin(&mut self, skin: Skin, nodes: &mut NodeTable) -> Result<SkinKey, SceneError> {
        if let Some(&joint) = skin.joints().iter().find(|&&j| j >= nodes.len()) {
            return Err(SceneError::NodeOutOfRange(joint));
        }
        for &joint in skin.joints() {
            nodes[joint].flags.insert(NodeFlags::JOINT);
        }
        log::debug!("Added skin '{}' with {} joints", skin.name, skin.joints().len());
        Ok(self.skins.insert(skin))
    }

    /// Skin by key
    pub fn skin(&self, key: SkinKey) -> Option<&Skin> {
        self.skins.get(key)
    }

    /// Advance every playing clip by `elapsed_ms` and write sampled values
    pub fn update(&mut self, elapsed_ms: f32, nodes: &mut NodeTable) {
        let delta = elapsed_ms * self.playback_speed;
        for clip in self.clips.values_mut().filter(|c| c.playing) {
            for channel in clip.channels_mut() {
                channel.advance(delta);
                if let Some(node) = nodes.get_mut(channel.target()) {
                    channel.apply(node);
                }
            }
        }
    }

    /// Joint matrices of every skin, in key order
    pub fn joint_matrices(&self, nodes: &NodeTable) -> Vec<(SkinKey, Vec<Mat4>)> {
        self.skins
            .iter()
            .map(|(key, skin)| (key, skin.joint_matrices(nodes)))
            .collect()
    }
}
