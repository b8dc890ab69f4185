use glam::Vec3;
use wavescape_common::Transform;
use wavescape_render::{MeshGeometry, MeshMaterial, Node, NodeId, SceneError, SceneGraph};

/// Layout of a [`Fence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FenceOptions {
    pub position: Vec3,
    pub material: MeshMaterial,
    /// Span along X, centred on `position`.
    pub length: f32,
    pub height: f32,
    pub posts: u32,
}

impl FenceOptions {
    pub fn new(position: Vec3, material: MeshMaterial) -> Self {
        Self {
            position,
            material,
            length: 20.0,
            height: 2.0,
            posts: 11,
        }
    }
}

const POST_WIDTH: f32 = 0.1;
const RAIL_THICKNESS: f32 = 0.05;

/// Group of evenly spaced posts joined by a top and a bottom rail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    group: NodeId,
    parts: Vec<NodeId>,
}

impl Fence {
    pub fn spawn(scene: &mut SceneGraph, options: &FenceOptions) -> Result<Self, SceneError> {
        let group = scene.add(
            Node::group()
                .named("fence")
                .with_transform(Transform::from_position(options.position)),
        );
        let mut parts = Vec::new();

        let half = options.length / 2.0;
        let posts = options.posts.max(2);
        let spacing = options.length / (posts - 1) as f32;
        let post = MeshGeometry::cuboid(Vec3::new(POST_WIDTH, options.height, POST_WIDTH));
        for i in 0..posts {
            let x = -half + spacing * i as f32;
            let node = Node::mesh(post.clone(), options.material)
                .named(format!("fence-post-{i}"))
                .with_transform(Transform::from_position(Vec3::new(x, 0.0, 0.0)));
            parts.push(scene.add_child(group, node)?);
        }

        let rail = MeshGeometry::cuboid(Vec3::new(options.length, RAIL_THICKNESS, RAIL_THICKNESS));
        for (name, y) in [("fence-rail-top", 0.4), ("fence-rail-bottom", -0.4)] {
            let node = Node::mesh(rail.clone(), options.material)
                .named(name)
                .with_transform(Transform::from_position(Vec3::new(0.0, y * options.height, 0.0)));
            parts.push(scene.add_child(group, node)?);
        }

        Ok(Self { group, parts })
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn parts(&self) -> &[NodeId] {
        &self.parts
    }
}
