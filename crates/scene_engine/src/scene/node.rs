//! Scene node: the leaf data entity of the pipeline
//!
//! A node carries its local TRS transform, a non-owning parent index, the
//! cached world matrix, per-primitive bounding data and the physical and
//! kinematic state used by collision response.

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Quat, Transform, Vec3, UP};
use crate::scene::bounds::{Aabb, Obb};
use crate::SceneError;

/// Index of a node in the [`NodeTable`](crate::scene::NodeTable)
pub type NodeIndex = usize;

/// Reserved node name that identifies the player entity
pub const PLAYER_NAME: &str = "Player";

/// How a node's world transform is derived from its ancestry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementClass {
    /// Pre-baked into world space by the asset pipeline; never re-derived
    Static,
    /// Member of a subtree that moves as one rigid unit with its top ancestor
    MoveableRoot,
    /// Fully hierarchical; composed with every ancestor up to a stopping node
    #[default]
    Free,
}

/// Entity kind, selects kind-specific motion updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    /// Any scene object
    #[default]
    Generic,
    /// The player character (step climbing, jumping)
    Player,
}

impl EntityKind {
    fn from_name(name: &str) -> Self {
        if name == PLAYER_NAME {
            Self::Player
        } else {
            Self::Generic
        }
    }
}

bitflags! {
    /// Per-node state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u32 {
        /// Suppressed from debug rendering
        const HIDDEN = 1 << 0;
        /// Member of a skin joint set
        const JOINT = 1 << 1;
    }
}

/// Renderable primitive with its bounding data
///
/// The local-space corners are fixed at load time; the world-space OBB and
/// AABB are recomputed every frame by the bounding volume updater.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    local_min: Vec3,
    local_max: Vec3,
    obb: Obb,
    aabb: Aabb,
}

impl Primitive {
    /// Create a primitive from its local-space bounding corners
    pub fn from_bounds(local_min: Vec3, local_max: Vec3) -> Self {
        let min = local_min.inf(&local_max);
        let max = local_min.sup(&local_max);
        let obb = Obb::from_local_bounds(&Mat4::identity(), &min, &max);
        let aabb = obb.enclosing_aabb();
        Self {
            local_min: min,
            local_max: max,
            obb,
            aabb,
        }
    }

    /// Create a unit-sized cube primitive centred on the node origin
    pub fn unit_cube() -> Self {
        Self::from_bounds(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5))
    }

    /// Local-space minimum corner
    pub const fn local_min(&self) -> &Vec3 {
        &self.local_min
    }

    /// Local-space maximum corner
    pub const fn local_max(&self) -> &Vec3 {
        &self.local_max
    }

    /// Current world-space oriented bounding box
    pub const fn obb(&self) -> &Obb {
        &self.obb
    }

    /// Current world-space axis-aligned bounding box
    pub const fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub(crate) fn set_bounds(&mut self, obb: Obb, aabb: Aabb) {
        self.obb = obb;
        self.aabb = aabb;
    }
}

/// Kinematic state used by motion integration and collision response
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    /// Driven velocity in units per second (input, scripts)
    pub velocity: Vec3,

    /// Position at the start of the current frame
    pub previous_position: Vec3,

    /// Accumulated fall speed in units per second
    pub gravity_accumulator: f32,

    /// Whether the node rests on something this frame
    pub grounded: bool,

    /// Whether gravity accumulates on this node
    pub uses_gravity: bool,

    /// A jump was requested and will be applied on the next integration
    pub jump_requested: bool,
}

impl MotionState {
    /// Create a resting motion state at `position`
    pub fn at_rest(position: Vec3, uses_gravity: bool) -> Self {
        Self {
            velocity: Vec3::zeros(),
            previous_position: position,
            gravity_accumulator: 0.0,
            grounded: false,
            uses_gravity,
            jump_requested: false,
        }
    }

    /// Velocity including the gravity accumulator
    pub fn current_velocity(&self) -> Vec3 {
        self.velocity - UP * self.gravity_accumulator
    }

    /// Mark as landed: grounded with no accumulated fall speed
    pub fn land(&mut self) {
        self.grounded = true;
        self.gravity_accumulator = 0.0;
    }
}

/// A node of the scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Local transform relative to the parent
    pub transform: Transform,

    /// Kinematic state
    pub motion: MotionState,

    /// State flags
    pub flags: NodeFlags,

    name: String,
    kind: EntityKind,
    movement_class: MovementClass,
    parent: Option<NodeIndex>,
    world_matrix: Mat4,
    primitives: Vec<Primitive>,
    mass: Option<f32>,
}

impl SceneNode {
    /// Create a free-moving node at the origin
    ///
    /// A node named [`PLAYER_NAME`] becomes a [`EntityKind::Player`] and uses gravity.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = EntityKind::from_name(&name);

        Self {
            name,
            transform: Transform::identity(),
            motion: MotionState::at_rest(Vec3::zeros(), kind == EntityKind::Player),
            flags: NodeFlags::empty(),
            kind,
            movement_class: MovementClass::Free,
            parent: None,
            world_matrix: Mat4::identity(),
            primitives: Vec::new(),
            mass: None,
        }
    }

    /// Builder pattern: set movement class
    #[must_use]
    pub fn with_movement_class(mut self, class: MovementClass) -> Self {
        self.movement_class = class;
        self
    }

    /// Builder pattern: set parent index
    #[must_use]
    pub fn with_parent(mut self, parent: NodeIndex) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder pattern: set local position
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self.motion.previous_position = position;
        self
    }

    /// Builder pattern: set local rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Builder pattern: set local scale
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Builder pattern: add a renderable primitive
    #[must_use]
    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    /// Builder pattern: set a finite mass
    pub fn with_mass(mut self, mass: f32) -> Result<Self, SceneError> {
        self.set_mass(Some(mass))?;
        Ok(self)
    }

    /// Builder pattern: set driven velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.motion.velocity = velocity;
        self
    }

    /// Builder pattern: enable or disable gravity
    #[must_use]
    pub fn with_gravity(mut self, uses_gravity: bool) -> Self {
        self.motion.uses_gravity = uses_gravity;
        self
    }

    /// Builder pattern: hide from debug rendering
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.flags.insert(NodeFlags::HIDDEN);
        self
    }

    /// Node name (not unique)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node, re-deriving its entity kind from the new name
    ///
    /// The motion state (gravity included) is left as it is.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.kind = EntityKind::from_name(&self.name);
    }

    /// Entity kind
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Whether this is the player entity
    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }

    /// Movement class
    pub const fn movement_class(&self) -> MovementClass {
        self.movement_class
    }

    /// Whether the node is static
    pub fn is_static(&self) -> bool {
        self.movement_class == MovementClass::Static
    }

    /// Parent index, if any
    pub const fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeIndex>) {
        self.parent = parent;
    }

    /// Local position
    pub const fn position(&self) -> &Vec3 {
        &self.transform.position
    }

    /// Set local position
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Local transform as a matrix
    pub fn local_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// Cached world matrix from the last transform resolution
    pub const fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    pub(crate) fn set_world_matrix(&mut self, matrix: Mat4) {
        self.world_matrix = matrix;
    }

    /// Renderable primitives
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub(crate) fn primitives_mut(&mut self) -> &mut [Primitive] {
        &mut self.primitives
    }

    /// Whether the node has any bounding geometry
    pub fn has_geometry(&self) -> bool {
        !self.primitives.is_empty()
    }

    /// Mass, `None` for infinite (immovable)
    pub const fn mass(&self) -> Option<f32> {
        self.mass
    }

    /// Set the mass; `None` makes the node immovable
    pub fn set_mass(&mut self, mass: Option<f32>) -> Result<(), SceneError> {
        if let Some(value) = mass {
            if !(value.is_finite() && value > 0.0) {
                return Err(SceneError::InvalidMass(value));
            }
        }
        self.mass = mass;
        Ok(())
    }

    /// Whether the node belongs to a skin joint set
    pub fn is_joint(&self) -> bool {
        self.flags.contains(NodeFlags::JOINT)
    }

    /// Whether the node is hidden
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(NodeFlags::HIDDEN)
    }

    /// Displacement since the start of the frame
    pub fn frame_displacement(&self) -> Vec3 {
        self.transform.position - self.motion.previous_position
    }

    /// Union of all primitive AABBs, `None` without geometry
    pub fn combined_aabb(&self) -> Option<Aabb> {
        self.primitives
            .iter()
            .map(Primitive::aabb)
            .copied()
            .reduce(|a, b| a.union(&b))
    }
}
