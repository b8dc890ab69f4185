use glam::Vec3;
use wavescape_render::{LineMaterial, Node, NodeId, SceneError, SceneGraph};

/// A polyline whose vertices are rewritten every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wave {
    node: NodeId,
}

impl Wave {
    /// Add a line through `points` to the scene root.
    pub fn spawn(scene: &mut SceneGraph, name: &str, points: &[Vec3], material: LineMaterial) -> Self {
        let node = scene.add(Node::line(points, material).named(name));
        Self { node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn set_points(&self, scene: &mut SceneGraph, points: &[Vec3]) -> Result<(), SceneError> {
        scene
            .get_mut(self.node)
            .and_then(|n| n.line_geometry_mut())
            .ok_or(SceneError::NodeNotFound(self.node))?
            .set_from_points(points);
        Ok(())
    }

    /// Rotate the whole line about the X axis.
    pub fn set_rotation_x(&self, scene: &mut SceneGraph, angle: f32) -> Result<(), SceneError> {
        scene
            .get_mut(self.node)
            .ok_or(SceneError::NodeNotFound(self.node))?
            .transform
            .set_rotation_euler(angle, 0.0, 0.0);
        Ok(())
    }
}
