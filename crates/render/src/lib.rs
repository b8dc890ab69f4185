//! Rendering adapter: camera, scene graph and a backend-agnostic surface.
//!
//! # Invariants
//! - The scene graph is a tree: every node except the root has one parent.
//! - Surfaces never mutate the scene; they only read it to draw a frame.
//! - Backends consume [`DrawList`]s, so GPU and headless output agree.

mod camera;
mod draw;
mod headless;
mod scene;
mod surface;

pub use camera::PerspectiveCamera;
pub use draw::{DrawList, DrawVertex};
pub use headless::HeadlessSurface;
pub use scene::{
    LineGeometry, LineMaterial, MeshGeometry, MeshMaterial, Node, NodeId, NodeKind, SceneError,
    SceneGraph,
};
pub use surface::{RenderError, RenderSurface, ShadowFilter, ShadowMap};
