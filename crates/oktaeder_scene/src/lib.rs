//! Scene graph.
//!
//! - [`Scene`]: arena of nodes, cameras and lights, plus the root list
//! - [`Node`]: hierarchy links, a [`Transform`] and optional attachments
//! - [`Transform`]: TRS with lazily recomputed local and world matrices
//! - [`transform_system`]: dirty propagation and on-demand world matrix resolution
//! - [`Camera`] / [`Light`]: sum types attached to at most one node
//!
//! Parent, camera and light links are slotmap keys, so there are no ownership
//! cycles between nodes and their attachments.

pub mod camera;
pub mod light;
pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform;
pub mod transform_system;
pub mod traversal;
pub mod wrapper;

pub use camera::{Camera, Projection};
pub use light::{Light, LightKind};
pub use node::Node;
pub use scene::Scene;
pub use transform::Transform;
pub use traversal::PreOrder;
pub use wrapper::SceneNode;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct CameraKey;
    pub struct LightKey;
}
