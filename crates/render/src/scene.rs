use glam::{Mat4, Vec3};
use std::collections::BTreeMap;
use wavescape_common::{Color, SceneSettings, Transform};

/// Identifier of a node in a [`SceneGraph`]. Never reused within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Errors from scene graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("scene node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("the root node cannot be removed or reparented")]
    RootImmutable,
    #[error("moving {node:?} under {parent:?} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },
}

/// Polyline vertices in node-local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGeometry {
    pub points: Vec<Vec3>,
}

impl LineGeometry {
    pub fn from_points(points: &[Vec3]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    /// Replace the vertices, reusing the allocation.
    pub fn set_from_points(&mut self, points: &[Vec3]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMaterial {
    pub color: Color,
}

/// Indexed triangle list in node-local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    /// Axis-aligned box centred on the origin.
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 2, 3, 0, // +Z
            5, 4, 7, 7, 6, 5, // -Z
            1, 5, 6, 6, 2, 1, // +X
            4, 0, 3, 3, 7, 4, // -X
            3, 2, 6, 6, 7, 3, // +Y
            4, 5, 1, 1, 0, 4, // -Y
        ];
        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
}

impl MeshMaterial {
    pub fn opaque(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
        }
    }
}

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Draws nothing; only groups children under a shared transform.
    Group,
    Line {
        geometry: LineGeometry,
        material: LineMaterial,
    },
    Mesh {
        geometry: MeshGeometry,
        material: MeshMaterial,
    },
    /// Red/green/blue lines of length `size` along +X/+Y/+Z.
    AxesHelper { size: f32 },
    /// Square grid of side `size` in the XZ plane.
    GridHelper { size: f32, divisions: u32 },
}

/// A scene graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::default(),
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    pub fn line(points: &[Vec3], material: LineMaterial) -> Self {
        Self::new(NodeKind::Line {
            geometry: LineGeometry::from_points(points),
            material,
        })
    }

    pub fn mesh(geometry: MeshGeometry, material: MeshMaterial) -> Self {
        Self::new(NodeKind::Mesh { geometry, material })
    }

    pub fn axes_helper(size: f32) -> Self {
        Self::new(NodeKind::AxesHelper { size })
    }

    pub fn grid_helper(size: f32, divisions: u32) -> Self {
        Self::new(NodeKind::GridHelper { size, divisions })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Line vertices, if this is a line node.
    pub fn line_geometry_mut(&mut self) -> Option<&mut LineGeometry> {
        match &mut self.kind {
            NodeKind::Line { geometry, .. } => Some(geometry),
            _ => None,
        }
    }
}

/// Tree of drawable and group nodes under a single root.
///
/// Nodes live in an arena keyed by [`NodeId`]; parent/child links are only
/// changed through graph operations, which keep the tree acyclic.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    background: Color,
}

impl SceneGraph {
    pub fn new(background: Color) -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, Node::group().named("scene"));
        Self {
            nodes,
            root,
            next_id: 1,
            background,
        }
    }

    /// Build the root scene from settings, adding any requested helpers.
    pub fn from_settings(settings: &SceneSettings) -> Self {
        let mut scene = Self::new(settings.background);
        if let Some(size) = settings.axes_helper {
            scene.add(Node::axes_helper(size).named("axes-helper"));
        }
        if let Some(grid) = settings.grid_helper {
            scene.add(Node::grid_helper(grid.size, grid.divisions).named("grid-helper"));
        }
        tracing::debug!(
            "scene background={} nodes={}",
            settings.background,
            scene.len()
        );
        scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(Node::children).unwrap_or_default()
    }

    /// Attach a node directly under the root.
    pub fn add(&mut self, node: Node) -> NodeId {
        let root = self.root;
        self.insert_under(root, node)
    }

    /// Attach a node under `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        Ok(self.insert_under(parent, node))
    }

    fn insert_under(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.parent = Some(parent);
        node.children.clear();
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its whole subtree. Returns the removed node.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, SceneError> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let parent = self
            .nodes
            .get(&id)
            .ok_or(SceneError::NodeNotFound(id))?
            .parent;
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }

        let mut pending: Vec<NodeId> = self.children(id).to_vec();
        while let Some(child) = pending.pop() {
            if let Some(node) = self.nodes.remove(&child) {
                pending.extend(node.children);
            }
        }
        let mut removed = self.nodes.remove(&id).ok_or(SceneError::NodeNotFound(id))?;
        removed.parent = None;
        removed.children.clear();
        Ok(removed)
    }

    /// Move `id` (with its subtree) under `new_parent`.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        if !self.contains(id) {
            return Err(SceneError::NodeNotFound(id));
        }
        if !self.contains(new_parent) {
            return Err(SceneError::NodeNotFound(new_parent));
        }
        let mut cursor = Some(new_parent);
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(SceneError::Cycle {
                    node: id,
                    parent: new_parent,
                });
            }
            cursor = self.nodes.get(&ancestor).and_then(Node::parent);
        }

        let old_parent = self.nodes.get(&id).and_then(Node::parent);
        if let Some(p) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        if let Some(p) = self.nodes.get_mut(&new_parent) {
            p.children.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
        }
        Ok(())
    }

    /// Local-to-world matrix of a node.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    /// Depth-first walk from the root, parents before children, children in
    /// insertion order. Invisible nodes are skipped along with their subtree.
    pub fn traverse(&self, mut visit: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_matrix)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = parent_matrix * node.transform.matrix();
            visit(id, node, world);
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
    }
}
