//! Scene graph and per-frame pipeline
//!
//! The node table is the single owner of scene state. The transform
//! resolver, bounding volume updater and [`SceneCoordinator`] each borrow it
//! explicitly for their phase of the frame.

pub mod node;
pub mod node_table;
pub mod bounds;
pub mod transform_resolver;
pub mod frame;
pub mod coordinator;

pub use bounds::{update_all_bounds, update_node_bounds, Aabb, Obb};
pub use coordinator::SceneCoordinator;
pub use frame::{to_gpu_matrix, FrameOutput, GpuMatrix, PrimitiveBounds, SkinMatrices};
pub use node::{EntityKind, MotionState, MovementClass, NodeFlags, NodeIndex, Primitive, SceneNode, PLAYER_NAME};
pub use node_table::{NodeTable, RenderableEntry};
pub use transform_resolver::TransformResolver;
