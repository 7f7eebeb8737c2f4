//! Skeletal animation
//!
//! Keyframe channels (translation, rotation, scale) are sampled into node
//! local transforms; skins turn resolved joint world matrices into the
//! per-joint matrices the skinning shader consumes.

mod animator;
mod clip;
mod skin;
mod track;

pub use animator::SkeletalAnimator;
pub use clip::{wrap_time, AnimationChannel, AnimationClip, ChannelPath};
pub use skin::Skin;
pub use track::{Interpolate, InterpolationMode, KeyframeTrack};

slotmap::new_key_type! {
    /// Handle to a clip owned by the animator
    pub struct ClipKey;

    /// Handle to a skin owned by the animator
    pub struct SkinKey;
}
