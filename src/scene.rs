//! Live-scene query surface.
//!
//! The host editor owns the meshes and the rig; calibration only borrows them through
//! [`SceneSource`]. [`SceneSnapshot`] is the JSON form used by the CLI and by tests.

pub mod live;
pub mod mirror;
pub mod sampler;

pub use live::{LiveBone, LiveMesh, LiveRig, LiveShapeKey, SceneSnapshot, SceneSource};
pub use mirror::mirror_document;
pub use sampler::{SampledBones, sample_bone_transforms, sample_vertices};
