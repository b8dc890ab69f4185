use crate::scene::{NodeKind, SceneGraph};
use glam::{Mat4, Vec3};
use wavescape_common::Color;

const AXIS_X: Color = Color::from_hex(0xff0000);
const AXIS_Y: Color = Color::from_hex(0x00ff00);
const AXIS_Z: Color = Color::from_hex(0x0000ff);
const GRID_CENTER: Color = Color::from_hex(0x444444);
const GRID_LINE: Color = Color::from_hex(0x888888);

/// A world-space vertex with a linear-light RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawVertex {
    pub position: Vec3,
    pub color: [f32; 4],
}

/// Backend-neutral flattening of a scene graph into world-space primitives.
///
/// `lines` holds segment endpoint pairs; the triangle lists hold three
/// vertices per triangle. Transparent triangles are kept apart so backends
/// can draw them after everything opaque.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub background: Option<Color>,
    pub lines: Vec<DrawVertex>,
    pub opaque_triangles: Vec<DrawVertex>,
    pub transparent_triangles: Vec<DrawVertex>,
}

impl DrawList {
    pub fn collect(scene: &SceneGraph) -> Self {
        let mut list = Self::default();
        list.rebuild(scene);
        list
    }

    /// Refill from `scene`, keeping the existing allocations.
    pub fn rebuild(&mut self, scene: &SceneGraph) {
        self.background = Some(scene.background());
        self.lines.clear();
        self.opaque_triangles.clear();
        self.transparent_triangles.clear();

        scene.traverse(|_, node, world| match &node.kind {
            NodeKind::Group => {}
            NodeKind::Line { geometry, material } => {
                let color = rgba(material.color, 1.0);
                for pair in geometry.points.windows(2) {
                    self.push_segment(world, pair[0], pair[1], color);
                }
            }
            NodeKind::Mesh { geometry, material } => {
                let (target, alpha) = if material.transparent {
                    (&mut self.transparent_triangles, material.opacity)
                } else {
                    (&mut self.opaque_triangles, 1.0)
                };
                let color = rgba(material.color, alpha);
                for tri in geometry.indices.chunks_exact(3) {
                    for &index in tri {
                        if let Some(p) = geometry.positions.get(index as usize) {
                            target.push(DrawVertex {
                                position: world.transform_point3(*p),
                                color,
                            });
                        }
                    }
                }
            }
            NodeKind::AxesHelper { size } => {
                let s = *size;
                self.push_segment(world, Vec3::ZERO, Vec3::X * s, rgba(AXIS_X, 1.0));
                self.push_segment(world, Vec3::ZERO, Vec3::Y * s, rgba(AXIS_Y, 1.0));
                self.push_segment(world, Vec3::ZERO, Vec3::Z * s, rgba(AXIS_Z, 1.0));
            }
            NodeKind::GridHelper { size, divisions } => {
                let divisions = (*divisions).max(1);
                let half = size / 2.0;
                let step = size / divisions as f32;
                let center = divisions / 2;
                for i in 0..=divisions {
                    let k = -half + i as f32 * step;
                    let color = if divisions % 2 == 0 && i == center {
                        rgba(GRID_CENTER, 1.0)
                    } else {
                        rgba(GRID_LINE, 1.0)
                    };
                    self.push_segment(world, Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k), color);
                    self.push_segment(world, Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half), color);
                }
            }
        });
    }

    fn push_segment(&mut self, world: Mat4, a: Vec3, b: Vec3, color: [f32; 4]) {
        self.lines.push(DrawVertex {
            position: world.transform_point3(a),
            color,
        });
        self.lines.push(DrawVertex {
            position: world.transform_point3(b),
            color,
        });
    }

    pub fn segment_count(&self) -> usize {
        self.lines.len() / 2
    }

    pub fn triangle_count(&self) -> usize {
        (self.opaque_triangles.len() + self.transparent_triangles.len()) / 3
    }
}

fn rgba(color: Color, alpha: f32) -> [f32; 4] {
    let [r, g, b] = color.to_linear();
    [r, g, b, alpha]
}
